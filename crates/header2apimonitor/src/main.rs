use anyhow::{Context, Result};
use clap::Parser;
use header2apimonitor::cli::Cli;
use header2apimonitor::convert;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("H2AM_LOG", "info")).init();

    let args = Cli::parse();
    if args.error_return_type != "int" {
        log::warn!(
            "--error-return-type {} has no effect",
            args.error_return_type
        );
    }

    let options = args.into_options();
    let report = convert::run(&options)
        .with_context(|| format!("failed to convert {}", options.header_file.display()))?;

    if !report.unknown_types.is_empty() {
        let unknown: Vec<&str> = report.unknown_types.iter().map(String::as_str).collect();
        println!("unknown types: {}", unknown.join(", "));
    }

    Ok(())
}
