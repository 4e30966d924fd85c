//! Opens a finished PDF in the system viewer.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

fn opener(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

pub fn open<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        bail!("Can't preview {}, it doesn't exist", path.display());
    }
    let mut cmd = opener(path);
    log::debug!("Opening preview with {cmd:?}");
    cmd.spawn()
        .with_context(|| format!("Failed to open {} in the system viewer", path.display()))?;
    Ok(())
}
