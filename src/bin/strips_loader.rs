use std::path::PathBuf;

use clap::Parser;
use strips_model::{LoaderConfig, PlanFailurePolicy, PlanningProblemLoader, RecordFailurePolicy, Res};

/// Loads STRIPS planning problems and prints them.
#[derive(Debug, Parser)]
#[command(name = "strips-loader")]
struct Args {
    /// Logging level to use: one of "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: tracing::Level,

    /// Do not print any problem of a file if one of its records is invalid.
    #[arg(long)]
    atomic: bool,

    /// Reject a problem if one of its reference plans is invalid, instead of dropping the plan.
    #[arg(long)]
    strict_plans: bool,

    /// Problem descriptions to load.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Res<()> {
    let args = Args::parse();

    // logs go to stderr, leaving stdout to the problems
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = LoaderConfig::from_env();
    if args.atomic {
        config = config.with_record_failure(RecordFailurePolicy::Atomic);
    }
    if args.strict_plans {
        config = config.with_plan_failure(PlanFailurePolicy::Fail);
    }
    tracing::debug!(?config);
    let loader = PlanningProblemLoader::new(config);

    let mut failed = false;
    for file in &args.files {
        let _span = tracing::span!(tracing::Level::INFO, "load", file = %file.display()).entered();
        let (problems, error) = match loader.load_file(file) {
            Ok(problems) => (problems, None),
            Err(failure) => (failure.loaded, Some(failure.error)),
        };
        for problem in &problems {
            println!("{problem}\n");
        }
        tracing::info!("{} problem(s) loaded", problems.len());
        if let Some(error) = error {
            eprintln!("{}", error.to_message());
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
