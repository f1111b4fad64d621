use anyhow::{Context, Result};
use clap::Parser;
use commonware_runtime::{deterministic, tokio, Runner};
use curvepay_simulator::{ScenarioFile, Simulator};
use std::{io::Write, path::PathBuf, str::FromStr};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Replay a curvepay scenario and print the outcome as JSON lines."
)]
struct Args {
    /// Scenario file (YAML).
    #[arg(short, long)]
    scenario: PathBuf,

    /// Log level written to stderr.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Seed for a deterministic runtime (wall clock when omitted).
    #[arg(long)]
    deterministic_seed: Option<u64>,

    /// Stop at the first rejected step and exit with an error.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

fn init_tracing(level: &str) -> Result<()> {
    let level = Level::from_str(level).context("Invalid log level")?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn replay<E: commonware_runtime::Clock>(
    context: E,
    scenario: curvepay_simulator::Scenario,
    strict: bool,
) -> Result<()> {
    let mut simulator = Simulator::new(context, &scenario, strict).await?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    simulator.run(&scenario.steps, &mut out).await?;
    out.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let scenario = ScenarioFile::load(&args.scenario)
        .and_then(ScenarioFile::validate)
        .with_context(|| format!("invalid scenario {}", args.scenario.display()))?;
    tracing::info!(scenario = %args.scenario.display(), "loaded scenario");

    match args.deterministic_seed {
        Some(seed) => deterministic::Runner::seeded(seed)
            .start(|context| async move { replay(context, scenario, args.strict).await }),
        None => tokio::Runner::new(tokio::Config::default())
            .start(|context| async move { replay(context, scenario, args.strict).await }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_args() {
        let args = Args::parse_from([
            "curvepay-simulator",
            "--scenario",
            "demos/launch_and_pay.yaml",
            "--deterministic-seed",
            "7",
            "--strict",
        ]);
        assert_eq!(args.scenario, PathBuf::from("demos/launch_and_pay.yaml"));
        assert_eq!(args.deterministic_seed, Some(7));
        assert!(args.strict);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert!(Level::from_str("chatty").is_err());
    }
}
