//! # Trip Report
//!
//! Prints one member's view of a trip snapshot: totals, who they owe or
//! are owed by, and the Smart Route transfers that square everyone up.
//!
//! ## Usage
//! ```bash
//! cargo run -p tripledger-service --bin tripledger-report -- trip.json ana
//! cargo run -p tripledger-service --bin tripledger-report -- trip.json ana --config ./tripledger.toml
//! ```

use std::env;
use std::path::PathBuf;

use tripledger_core::MemberId;
use tripledger_service::{logging, LedgerConfig, TripLedger, TripSnapshot};

fn print_usage() {
    println!("Trip Ledger Report");
    println!();
    println!("Usage: tripledger-report <SNAPSHOT.json> <VIEWER-ID> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>  Config file (default: platform config dir)");
    println!("  -j, --json           Print the report as JSON");
    println!("  -h, --help           Show this help message");
}

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    snapshot: PathBuf,
    viewer: String,
    config_path: Option<PathBuf>,
    as_json: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut positional: Vec<&str> = Vec::new();

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = rest
                    .next()
                    .ok_or_else(|| format!("{arg} requires a path"))?;
                parsed.config_path = Some(PathBuf::from(path));
            }
            "-j" | "--json" => parsed.as_json = true,
            "-h" | "--help" => {
                parsed.help = true;
                return Ok(parsed);
            }
            other => positional.push(other),
        }
    }

    let [snapshot, viewer] = positional.as_slice() else {
        return Err("expected a snapshot path and a viewer id".into());
    };
    parsed.snapshot = PathBuf::from(*snapshot);
    parsed.viewer = viewer.to_string();
    Ok(parsed)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let Args {
        snapshot: snapshot_path,
        viewer,
        config_path,
        as_json,
        help,
    } = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            print_usage();
            return Err(message.into());
        }
    };

    if help {
        print_usage();
        return Ok(());
    }

    let config = LedgerConfig::load(config_path)?;
    logging::init(&config.logging);

    let snapshot = TripSnapshot::load(&snapshot_path)?;
    let viewer = MemberId::from(viewer);
    let ledger = TripLedger::new(config);
    let report = ledger.report_for(&snapshot, &viewer)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let roster = snapshot.roster();
    let name = |id: &MemberId| roster.name_of(id.as_str()).unwrap_or(id.as_str()).to_string();

    println!("Trip report for {}", name(&viewer));
    println!("================================");
    println!("Spent:     {}", report.balances.spent_total);
    println!("Paid:      {}", report.balances.paid_total);
    println!("Received:  {}", report.balances.received_total);
    println!("Net:       {}", report.balances.net_of(viewer.as_str()));
    if report.hidden_entries > 0 {
        println!("({} private entries by others not shown)", report.hidden_entries);
    }

    println!();
    if report.balances.pairwise.is_empty() {
        println!("✓ All square with everyone");
    } else {
        for (other, amount) in &report.balances.pairwise {
            if amount.is_positive() {
                println!("  {} owes you {}", name(other), amount);
            } else {
                println!("  You owe {} {}", name(other), amount.abs());
            }
        }
    }

    println!();
    println!("Smart Route ({} transfers):", report.transfers.len());
    for transfer in &report.transfers {
        println!(
            "  {} → {}: {}",
            name(&transfer.from),
            name(&transfer.to),
            transfer.amount
        );
    }

    if !report.balances.issues.is_empty() {
        println!();
        println!("⚠ {} data issues:", report.balances.issues.len());
        for issue in &report.balances.issues {
            println!("  {}", issue);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("tripledger-report")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(&argv(&["trip.json", "ana", "--config", "ledger.toml", "-j"])).unwrap();
        assert_eq!(
            parsed,
            Args {
                snapshot: PathBuf::from("trip.json"),
                viewer: "ana".into(),
                config_path: Some(PathBuf::from("ledger.toml")),
                as_json: true,
                help: false,
            }
        );
    }

    #[test]
    fn test_config_without_path_is_an_error() {
        let err = parse_args(&argv(&["trip.json", "ana", "--config"])).unwrap_err();
        assert_eq!(err, "--config requires a path");

        let err = parse_args(&argv(&["trip.json", "ana", "-c"])).unwrap_err();
        assert_eq!(err, "-c requires a path");
    }

    #[test]
    fn test_wrong_positional_count() {
        assert!(parse_args(&argv(&["trip.json"])).is_err());
        assert!(parse_args(&argv(&["trip.json", "ana", "extra"])).is_err());
    }

    #[test]
    fn test_help_skips_positionals() {
        let parsed = parse_args(&argv(&["--help"])).unwrap();
        assert!(parsed.help);
    }
}
