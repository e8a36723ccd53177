use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use anyhow::{Context, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use stockcast_planner::{PlannerConfig, ProductSnapshot, RestockPlanner};

const USAGE: &str = "usage: stockcast <forecast|scan> <snapshot.json>";

fn main() -> anyhow::Result<()> {
    match std::env::var("STOCKCAST_LOG_FORMAT").as_deref() {
        Ok("pretty") => stockcast_observability::init_pretty(),
        _ => stockcast_observability::init(),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [command, path] = args.as_slice() else {
        bail!(USAGE);
    };

    let config = PlannerConfig::from_env();
    info!(command = %command, path = %path, ?config, "stockcast starting");
    let planner = RestockPlanner::new(config);

    match command.as_str() {
        "forecast" => {
            let snapshot: ProductSnapshot = read_json(Path::new(path))?;
            let report = planner
                .forecast(&snapshot)
                .with_context(|| format!("forecast failed for product {}", snapshot.product_id))?;
            write_json(&report)
        }
        "scan" => {
            let snapshots: Vec<ProductSnapshot> = read_json(Path::new(path))?;
            write_json(&planner.scan(&snapshots))
        }
        other => bail!("unknown command `{other}`; {USAGE}"),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("writing report")?;
    writeln!(stdout)?;
    Ok(())
}
