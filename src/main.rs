use anyhow::{bail, Context, Result};
use booklet::booklet::{Booklet, BuildStats};
use booklet::config::Configuration;
use booklet::demo::{sample_booklet, DemoOptions};
use cli::Cli;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

mod cli;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn build_with_spinner(doc: &Booklet) -> Result<BuildStats> {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .with_context(|| "Failed to parse progress style")?,
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_message(format!("Rendering {}...", doc.outfile().display()));
    let stats = doc.build();
    progress.finish_and_clear();
    stats
}

fn print_stats(stats: &BuildStats) {
    println!("  PDF:          {}", console::style(stats.outfile.display()).green());
    println!("  Pages:        {}", stats.page_count);
    println!("  TOC entries:  {}", stats.toc_entries);
    println!("  Passes:       {}", stats.passes);
    println!("  Size:         {} bytes", stats.bytes);
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::Render(args) => {
            println!("Loading configuration...");
            let config = Configuration::load(&args.config)?;
            let base_dir = args
                .config
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let doc = config.to_booklet(base_dir)?;
            let stats = build_with_spinner(&doc).with_context(|| "Failed to render booklet")?;
            print_stats(&stats);
            if args.open {
                booklet::preview::open(&stats.outfile)?;
            }
            Ok(())
        }
        cli::Commands::Init(args) => {
            if args.path.exists() && !args.force {
                bail!(
                    "{} already exists, pass --force to overwrite it",
                    args.path.display()
                );
            }
            let contents = Configuration::example().to_toml()?;
            std::fs::write(&args.path, contents)
                .with_context(|| format!("Failed to write {}", args.path.display()))?;
            println!("Wrote {}", console::style(args.path.display()).green());
            Ok(())
        }
        cli::Commands::Demo(args) => {
            let options = DemoOptions {
                outfile: args.outfile.clone(),
                image: args.image.clone(),
                seed: args.seed,
            };
            let (doc, _scratch) = sample_booklet(&options)?;
            let stats = build_with_spinner(&doc).with_context(|| "Failed to render demo")?;
            print_stats(&stats);
            if args.open {
                booklet::preview::open(&stats.outfile)?;
            }
            Ok(())
        }
        cli::Commands::Resize(args) => {
            booklet::figure::resize_image(&args.input, &args.output, args.width, args.height)?;
            println!("Wrote {}", console::style(args.output.display()).green());
            Ok(())
        }
    }
}
