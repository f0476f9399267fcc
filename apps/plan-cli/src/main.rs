#![deny(warnings)]

//! Headless CLI: load a catalog, run one calculation, print JSON.

use anyhow::{bail, Context, Result};
use catalog::{load_snapshot, save_snapshot, sample_catalog, Catalog};
use plan_core::{validate_config, GoodId, PlannerConfig, ProcessId};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: planner [--data <catalog.json|yaml>] [--config <config.yaml>] <command>
       planner --help

commands:
  chain <good-id> <quantity>             downstream goods from a starting quantity
  revenue <process-id>... [--months <n>] gross and net result of running processes
  capacity <process-id>                  input requirements at full throughput
  cycle-time <cycles-per-month>          duration of one cycle
  export [--out <file>]                  dump the catalog
  goods                                  list goods
  processes                              list processes";

#[derive(Debug, PartialEq)]
enum Command {
    Chain { good: GoodId, quantity: Decimal },
    Revenue { processes: Vec<ProcessId>, months: Option<Decimal> },
    Capacity { process: ProcessId },
    CycleTime { cycles_per_month: Decimal },
    Export { out: Option<PathBuf> },
    Goods,
    Processes,
    Help,
}

#[derive(Debug, PartialEq)]
struct Args {
    data: Option<PathBuf>,
    config: Option<PathBuf>,
    command: Command,
}

fn parse_decimal(s: Option<String>, what: &str) -> Result<Decimal> {
    let s = s.with_context(|| format!("missing {what}"))?;
    s.parse::<Decimal>()
        .with_context(|| format!("invalid {what}: {s}"))
}

fn path_arg(s: Option<String>, flag: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(s.with_context(|| format!("{flag} needs a path"))?))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut help = false;
    let mut data = None;
    let mut config = None;
    let mut out = None;
    let mut months = None;
    let mut positional = Vec::new();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--data" => data = Some(path_arg(it.next(), "--data")?),
            "--config" => config = Some(path_arg(it.next(), "--config")?),
            "--out" => out = Some(path_arg(it.next(), "--out")?),
            "--months" => months = Some(parse_decimal(it.next(), "months")?),
            "-h" | "--help" => help = true,
            _ => positional.push(arg),
        }
    }
    if help {
        return Ok(Args {
            data,
            config,
            command: Command::Help,
        });
    }

    let mut pos = positional.into_iter();
    let name = pos.next().with_context(|| format!("missing command\n{USAGE}"))?;
    let command = match name.as_str() {
        "chain" => {
            let good = GoodId::new(pos.next().context("missing good id")?);
            let quantity = parse_decimal(pos.next(), "quantity")?;
            Command::Chain { good, quantity }
        }
        "revenue" => {
            let processes: Vec<ProcessId> = pos.by_ref().map(ProcessId::new).collect();
            if processes.is_empty() {
                bail!("revenue needs at least one process id");
            }
            Command::Revenue {
                processes,
                months: months.take(),
            }
        }
        "capacity" => Command::Capacity {
            process: ProcessId::new(pos.next().context("missing process id")?),
        },
        "cycle-time" => Command::CycleTime {
            cycles_per_month: parse_decimal(pos.next(), "cycles per month")?,
        },
        "export" => Command::Export { out: out.take() },
        "goods" => Command::Goods,
        "processes" => Command::Processes,
        other => bail!("unknown command: {other}\n{USAGE}"),
    };
    if let Some(extra) = pos.next() {
        bail!("unexpected argument: {extra}");
    }
    if months.is_some() {
        bail!("--months only applies to revenue");
    }
    if out.is_some() {
        bail!("--out only applies to export");
    }
    Ok(Args {
        data,
        config,
        command,
    })
}

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    let Some(path) = path else {
        return Ok(PlannerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let mut config: PlannerConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    validate_config(&config)?;
    // Relative catalog paths are read from the config file's directory.
    if let (Some(catalog), Some(dir)) = (&config.catalog_path, path.parent()) {
        if catalog.is_relative() {
            config.catalog_path = Some(dir.join(catalog));
        }
    }
    Ok(config)
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => {
            let snapshot = load_snapshot(path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            Catalog::from_snapshot(snapshot)
        }
        None => {
            info!("no catalog file given, using sample data");
            sample_catalog()
        }
    };
    if let Err(e) = catalog.validate() {
        warn!(error = %e, "catalog failed validation, continuing with partial data");
    }
    Ok(catalog)
}

fn run(catalog: &Catalog, config: &PlannerConfig, command: Command) -> Result<serde_json::Value> {
    let value = match command {
        Command::Chain { good, quantity } => {
            serde_json::to_value(plan_econ::resolve_chain(catalog, &good, quantity))?
        }
        Command::Revenue { processes, months } => {
            let months = months.unwrap_or(config.default_runtime_months);
            serde_json::to_value(plan_econ::aggregate_revenue(catalog, &processes, months))?
        }
        Command::Capacity { process } => {
            serde_json::to_value(plan_econ::project_capacity(catalog, &process)?)?
        }
        Command::CycleTime { cycles_per_month } => {
            serde_json::to_value(plan_econ::cycle_duration(cycles_per_month))?
        }
        Command::Export { out } => {
            let snapshot = catalog.export();
            match out {
                Some(path) => {
                    save_snapshot(&snapshot, &path)
                        .with_context(|| format!("writing {}", path.display()))?;
                    serde_json::json!({ "written": path.display().to_string() })
                }
                None => serde_json::to_value(snapshot)?,
            }
        }
        Command::Goods => serde_json::to_value(catalog.goods().collect::<Vec<_>>())?,
        Command::Processes => serde_json::to_value(catalog.processes().collect::<Vec<_>>())?,
        Command::Help => serde_json::Value::String(USAGE.to_string()),
    };
    Ok(value)
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    if args.command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }
    let config = load_config(args.config.as_deref())?;

    // Logging setup; stdout is reserved for results.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!(command = ?args.command, "starting planner");

    let data = args.data.as_deref().or(config.catalog_path.as_deref());
    let catalog = load_catalog(data)?;
    let value = run(&catalog, &config, args.command)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
