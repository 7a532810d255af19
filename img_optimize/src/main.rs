use anyhow::Context;
use clap::Parser;
use gallery_utils::logging::{init_logging, LogConfig};
use gallery_utils::{
    print_summary_report, report_to_json, run_optimize, Backend, OptimizeConfig, OptimizeParams,
    DEFAULT_OPTIMIZE_ROOT, DEFAULT_SIZE_THRESHOLD, OPTIMIZE_TAG,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "img-optimize")]
#[command(version, about = "Resize and recompress oversized gallery JPEGs in place", long_about = None)]
struct Cli {
    /// Directory holding the JPEGs (relative to the working directory).
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OPTIMIZE_ROOT)]
    root: PathBuf,

    /// Files smaller than this many bytes are skipped.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_SIZE_THRESHOLD)]
    threshold: u64,

    /// Longest edge after resizing, in pixels.
    #[arg(long, value_name = "PX", default_value_t = OptimizeParams::default().max_dimension,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_dimension: u32,

    /// JPEG quality percentage.
    #[arg(long, value_name = "PERCENT", default_value_t = OptimizeParams::default().quality,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Also process subdirectories.
    #[arg(short, long)]
    recursive: bool,

    /// External tool that performs the resize: sips or magick.
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

    if let Err(e) = init_logging("img_optimize", LogConfig::default().verbose(cli.verbose)) {
        eprintln!("⚠️  Logging unavailable: {:#}", e);
    }

    let config = OptimizeConfig {
        root: cli.root,
        threshold: cli.threshold,
        params: OptimizeParams {
            max_dimension: cli.max_dimension,
            quality: cli.quality,
        },
        recursive: cli.recursive,
    };
    let transcoder = cli.backend.transcoder();

    let start_time = Instant::now();
    let report = run_optimize(&config, transcoder.as_ref())
        .with_context(|| format!("[{}] Cannot process {}", OPTIMIZE_TAG, config.root.display()))?;

    if cli.json {
        println!("{}", report_to_json(&report)?);
    } else {
        print_summary_report(&report, start_time.elapsed());
    }

    Ok(())
}
