mod app;
mod output;
mod summary;

use anyhow::Context;
use clap::Parser;
use pescope::File;

use crate::app::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // pescope info+ on stderr; --verbose enables debug; RUST_LOG overrides
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("pescope", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    for path in &cli.paths {
        let file = File::from_file(path)
            .with_context(|| format!("failed to decode {}", path.display()))?;

        if cli.summary {
            summary::print(path, &file);
        } else {
            println!("{}:", path.display());
            println!("{file:#?}");
        }
    }

    Ok(())
}
