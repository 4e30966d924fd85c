use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Document description to render (TOML, or JSON with a .json extension)
    #[clap(short, long, default_value = booklet::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    /// Open the PDF in the system viewer once it's written
    #[clap(long)]
    pub open: bool,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the example configuration
    #[clap(default_value = booklet::config::DEFAULT_CONFIG_FILE)]
    pub path: PathBuf,
    /// Overwrite an existing file
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    #[clap(short, long, default_value = "booklet1.pdf")]
    pub outfile: PathBuf,
    /// An image to resize and include as a figure
    #[clap(short, long)]
    pub image: Option<PathBuf>,
    /// Seed for the graph data
    #[clap(short, long)]
    pub seed: Option<u64>,
    /// Open the PDF in the system viewer once it's written
    #[clap(long)]
    pub open: bool,
}

#[derive(Args, Debug)]
pub struct ResizeArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Target width in pixels
    #[clap(long)]
    pub width: Option<u32>,
    /// Target height in pixels
    #[clap(long)]
    pub height: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Renders the booklet described by a booklet.toml file
    Render(RenderArgs),
    /// Writes an example booklet.toml
    Init(InitArgs),
    /// Renders the built-in sample booklet
    Demo(DemoArgs),
    /// Resizes an image, keeping its aspect ratio when only one side is given
    Resize(ResizeArgs),
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}
