//! Settlement command-line tool
//!
//! Reads a JSON array of member balances and prints who pays whom.

use anyhow::{bail, Context};
use settlement::{EngineConfig, MemberBalance, SettlementEngine};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

const USAGE: &str = "\
usage: cashflow-settle [--json] [--verify] [--metrics] [--group ID] [--config FILE] <balances.json | ->

  --verify  exit non-zero if any member is left outside tolerance, which also
            happens for balanced input when cent dust has no counterparty";

/// Parsed command-line arguments
#[derive(Debug, Default, PartialEq)]
struct Args {
    input: String,
    json: bool,
    verify: bool,
    metrics: bool,
    group: Option<String>,
    config: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut input = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        // Anything that is not a flag is the input path ("-" for stdin)
        if !arg.starts_with("--") && arg != "-h" {
            if input.replace(arg).is_some() {
                bail!("more than one input given\n{}", USAGE);
            }
            continue;
        }

        match arg.as_str() {
            "--json" => parsed.json = true,
            "--verify" => parsed.verify = true,
            "--metrics" => parsed.metrics = true,
            "--group" => {
                parsed.group = Some(args.next().context("--group needs a value")?);
            }
            "--config" => {
                parsed.config = Some(args.next().context("--config needs a value")?.into());
            }
            "-h" | "--help" => bail!(USAGE),
            flag => bail!("unknown option {}\n{}", flag, USAGE),
        }
    }

    parsed.input = input.context(USAGE)?;
    Ok(parsed)
}

async fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .context("Failed to read balances from stdin")?;
        Ok(buffer)
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read balances from {}", input))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::from_env()?,
    };
    let engine = SettlementEngine::new(config)?;

    let raw = read_input(&args.input).await?;
    let members: Vec<MemberBalance> =
        serde_json::from_str(&raw).context("Failed to parse member balances")?;

    let plan = match &args.group {
        Some(group) => engine.settle_group(group.clone(), &members)?,
        None => engine.settle(&members)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else if plan.is_settled() {
        println!("All transactions settled.");
    } else {
        for transfer in &plan.transfers {
            println!("{}", transfer);
        }
    }

    if args.metrics {
        eprint!("{}", engine.metrics().render()?);
    }

    if args.verify {
        let outstanding = engine.verify_plan(&members, &plan);
        if !outstanding.is_empty() {
            for residual in &outstanding {
                eprintln!("{} still has {} outstanding", residual.name, residual.remaining);
            }
            bail!("{} members left unsettled", outstanding.len());
        }
        tracing::info!("Verified: all balances settle to zero");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(args(&["--json", "--group", "trip", "balances.json"])).unwrap();

        assert_eq!(
            parsed,
            Args {
                input: "balances.json".to_string(),
                json: true,
                group: Some("trip".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_args_stdin() {
        let parsed = parse_args(args(&["--verify", "-"])).unwrap();
        assert_eq!(parsed.input, "-");
        assert!(parsed.verify);
    }

    #[test]
    fn test_usage_documents_verify_exit() {
        let err = parse_args(args(&["--help"])).unwrap_err().to_string();
        assert!(err.starts_with("usage: cashflow-settle"));
        assert!(err.contains("--verify  exit non-zero"));
        assert!(err.contains("cent dust"));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["--group"])).is_err());
        assert!(parse_args(args(&["--bogus", "a.json"])).is_err());
        assert!(parse_args(args(&["a.json", "b.json"])).is_err());
    }
}
