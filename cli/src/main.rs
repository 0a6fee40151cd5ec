//! Command-line front end: mirror a PowerPoint presentation to a
//! right-to-left layout and inject translated text.
//!
//! # Usage
//!
//! Mirror without translating:
//! ```sh
//! mirrordeck deck.pptx deck-rtl.pptx
//! ```
//!
//! Selected slides, mock translations, audit records:
//! ```sh
//! mirrordeck deck.pptx deck-rtl.pptx --slides 1,3-5 --backend mock \
//!     --audit-dir audit/ -vv
//! ```
//!
//! Exit codes: 0 success, 2 delivered with warnings, 3 rejected input,
//! 4 failed validation, 1 any other error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use mirrordeck::config::EngineConfig;
use mirrordeck::pipeline::{DocumentOutcome, DocumentReport, Engine, write_audit};
use mirrordeck::translate::{BuiltinTranslator, IdentityTranslator, MockTranslator};
use mirrordeck::SlideSelection;

/// Mirror .pptx presentations to right-to-left layouts
#[derive(Parser, Debug)]
#[command(
    name = "mirrordeck",
    about = "Mirror a PowerPoint presentation to a right-to-left layout",
    long_about = "Mirrors every shape, table and chart of a .pptx presentation for right-to-left reading,\n\
                  sets paragraph and run direction, and replaces text with translations from the\n\
                  selected backend. Relationship integrity is checked before the output is written.",
    version
)]
struct Args {
    /// Presentation to transform
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the transformed presentation
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Slides to transform: `all`, or numbers and ranges such as `1,3-5`
    #[arg(long, default_value = "all")]
    slides: SlideSelection,

    /// Translation backend
    #[arg(long, value_enum, default_value = "identity")]
    backend: BackendArg,

    /// YAML configuration file
    #[arg(long, value_name = "FILE", env = "MIRRORDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the target locale written into translated runs
    #[arg(long)]
    locale: Option<String>,

    /// Directory for extracted and translated record sets and the report
    #[arg(long, value_name = "DIR")]
    audit_dir: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Translation backends selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    /// Keep the source text
    Identity,
    /// Tagged sample text for checking placement
    Mock,
    /// JSON over HTTP, endpoint from MIRRORDECK_HTTP_ENDPOINT
    #[cfg(feature = "http")]
    Http,
}

impl BackendArg {
    #[cfg_attr(not(feature = "http"), allow(unused_variables))]
    fn build(self, config: &EngineConfig) -> Result<BuiltinTranslator, Box<dyn std::error::Error>> {
        Ok(match self {
            BackendArg::Identity => BuiltinTranslator::Identity(IdentityTranslator),
            BackendArg::Mock => BuiltinTranslator::Mock(MockTranslator),
            #[cfg(feature = "http")]
            BackendArg::Http => BuiltinTranslator::Http(mirrordeck::translate::HttpTranslator::from_env(
                config.target_locale.as_str(),
            )?),
        })
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        },
    }
}

async fn run(args: Args) -> Result<u8, Box<dyn std::error::Error>> {
    if !args.input.is_file() {
        return Err(format!("Input file does not exist: {}", args.input.display()).into());
    }
    if args.output.exists() && !args.force {
        return Err(format!(
            "Output file already exists: {} (use --force to overwrite)",
            args.output.display()
        )
        .into());
    }

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(locale) = args.locale {
        config.target_locale = locale;
    }

    let translator = args.backend.build(&config)?;
    let engine = Engine::new(config, translator).with_selection(args.slides);

    let token = engine.cancellation().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupted, cancelling pending translations");
            token.cancel();
        }
    });

    let processed = engine.transform_file(&args.input, &args.output).await?;

    if let (Some(dir), Some(source), Some(translated)) =
        (&args.audit_dir, &processed.source, &processed.translated)
    {
        let stem = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        write_audit(dir, &stem, source, translated, &processed.report)?;
    }

    print_summary(&processed.report);
    Ok(u8::try_from(processed.report.exit_code()).unwrap_or(1))
}

fn print_summary(report: &DocumentReport) {
    let stats = &report.statistics;
    match &report.outcome {
        DocumentOutcome::Complete => println!("✓ {}", report.document),
        DocumentOutcome::Partial => println!("⚠ {} ({} warnings)", report.document, report.warnings.len()),
        DocumentOutcome::Rejected(rejection) => {
            eprintln!("✗ {}: {}", report.document, rejection.reason());
            return;
        },
    }
    println!(
        "  {} slides, {} charts, {} shapes mirrored, {} tables reversed, {}/{} text records translated",
        stats.slides,
        stats.charts,
        stats.shapes_mirrored,
        stats.tables_reversed,
        stats.records_injected,
        stats.records
    );
    for warning in &report.warnings {
        match &warning.element {
            Some(element) => eprintln!("  {} [{}]: {}", warning.part, element, warning.message),
            None => eprintln!("  {}: {}", warning.part, warning.message),
        }
    }
}
