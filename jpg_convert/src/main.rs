use anyhow::Context;
use clap::Parser;
use gallery_utils::logging::{init_logging, LogConfig};
use gallery_utils::{
    print_summary_report, report_to_json, run_convert, Backend, ConvertConfig,
    FileCommandInspector, CONVERT_TAG, DEFAULT_CONVERT_ROOT,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "jpg-convert")]
#[command(version, about = "Convert HEIC/PNG gallery assets into real JPEG files", long_about = None)]
struct Cli {
    /// Directory to scan recursively (relative to the working directory).
    #[arg(long, value_name = "DIR", default_value = DEFAULT_CONVERT_ROOT)]
    root: PathBuf,

    /// External tool that performs the conversion: sips or magick.
    #[arg(long, default_value_t = Backend::Sips)]
    backend: Backend,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_logging("jpg_convert", LogConfig::default().verbose(cli.verbose)) {
        eprintln!("⚠️  Logging unavailable: {:#}", e);
    }

    let config = ConvertConfig {
        root: cli.root,
        ..ConvertConfig::default()
    };
    let transcoder = cli.backend.transcoder();
    let inspector = FileCommandInspector::new();

    let start_time = Instant::now();
    let report = run_convert(&config, &inspector, transcoder.as_ref())
        .with_context(|| format!("[{}] Cannot scan {}", CONVERT_TAG, config.root.display()))?;

    if cli.json {
        println!("{}", report_to_json(&report)?);
    } else {
        print_summary_report(&report, start_time.elapsed());
    }

    Ok(())
}
