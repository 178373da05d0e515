//! artag CLI: run the rover tag detector on a recorded color + depth frame.

use artag::detect;
use artag::detector::{TagDetectConfig, TagDetectReport, TagReport};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "artag")]
#[command(about = "Detect rover AR tags in a color + depth frame and report their bearings")]
#[command(version)]
struct Cli {
    /// Enable debug logging (otherwise `ARTAG_LOG`, or `RUST_LOG` with tracing).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect up to two tags in one frame.
    Detect(DetectArgs),

    /// Print dictionary statistics.
    DictInfo {
        /// Path to the dictionary JSON resource.
        #[arg(long)]
        dictionary: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Detector config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Color image (any format the `image` crate reads).
    #[arg(long)]
    color: PathBuf,

    /// Depth image: 16-bit or 8-bit gray PNG in depth units.
    #[arg(long)]
    depth: PathBuf,

    /// Report path; defaults to the config's `output_path`.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the filtered frame with rejected candidates boxed in white.
    #[arg(long)]
    rejected_overlay: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::DictInfo { dictionary } => run_dict_info(&dictionary),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(verbose: bool) -> CliResult<()> {
    artag::core::init_tracing(false, verbose.then_some(log::LevelFilter::Debug));
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: bool) -> CliResult<()> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        artag::core::level_from_env(log::LevelFilter::Info)
    };
    artag::core::init_with_level(level)?;
    Ok(())
}

fn run_dict_info(path: &Path) -> CliResult<()> {
    let dict = artag::Dictionary::load_json(path)?;
    println!("dictionary {}", dict.name());
    println!("  markers:             {}", dict.codes().len());
    println!(
        "  bits:                {}x{}",
        dict.marker_size(),
        dict.marker_size()
    );
    println!("  max correction bits: {}", dict.max_correction_bits());
    Ok(())
}

fn run_detect(args: &DetectArgs) -> CliResult<()> {
    let config = TagDetectConfig::load_json(&args.config)?;
    let out_path = args.report.clone().unwrap_or_else(|| config.output_path());
    let mut report = TagDetectReport::new(&args.color, &args.depth, &args.config, 0, 0);

    let outcome = detect_into_report(args, &config, &mut report);
    if let Err(err) = &outcome {
        log::warn!("detection failed: {err}");
        report.set_error(err);
    }
    report.write_json(&out_path)?;
    log::info!("report written to {}", out_path.display());
    outcome
}

/// Load the frame, detect, and fill `report`; any failure is returned for
/// the caller to record.
fn detect_into_report(
    args: &DetectArgs,
    config: &TagDetectConfig,
    report: &mut TagDetectReport,
) -> CliResult<()> {
    let detector = config.build_detector(&args.config)?;

    log::info!("loading frame: {}", args.color.display());
    let color = image::open(&args.color)
        .map_err(|e| -> CliError {
            format!("failed to open image {}: {}", args.color.display(), e).into()
        })?
        .to_rgba8();
    report.width = color.width() as usize;
    report.height = color.height() as usize;
    let depth = detect::load_depth(&args.depth)?;

    let res = detect::detect_tags(&detector, &color, &depth)?;
    report.set_detection(&detector, &res);
    log::info!(
        "{} markers accepted, {} candidates rejected",
        res.candidates.accepted.len(),
        res.candidates.rejected.len()
    );

    for (name, slot) in [("first", &report.first), ("second", &report.second)] {
        match slot {
            Some(TagReport {
                tag,
                bearing_deg: Some(bearing),
            }) => println!(
                "{name}: id={} x={:.1} y={:.1} bearing={bearing:.2}",
                tag.id(),
                tag.loc().x,
                tag.loc().y
            ),
            _ => println!("{name}: none"),
        }
    }

    if let Some(path) = &args.rejected_overlay {
        detect::rejected_overlay(&res)?.save(path)?;
        log::info!("rejected overlay written to {}", path.display());
    }
    Ok(())
}
