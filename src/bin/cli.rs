//! CLI for placement suggestions

use anyhow::Context;
use clap::{Parser, Subcommand};
use miniplan::suggester::{suggest_table_blueprint, ShardPlacement};
use miniplan::{suggest_blueprints, Blueprint, ClusterState, Config, KeyRange, UsageTally};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "miniplan")]
#[command(about = "Suggest replica placement blueprints for sharded tables")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest blueprints
    Suggest {
        /// Cluster-state document (JSON)
        #[arg(long)]
        input: PathBuf,

        /// Only this table (all tables if omitted)
        #[arg(long)]
        table: Option<Uuid>,

        /// Balance usage before minimizing backfill
        #[arg(long)]
        prioritize_distribution: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate shard boundaries and pins
    Check {
        /// Cluster-state document (JSON)
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Serialize)]
struct TableReport {
    fingerprint: Option<String>,
    shards: Vec<ShardPlacement<KeyRange>>,
    error: Option<String>,
}

impl TableReport {
    fn from_result(result: miniplan::Result<Blueprint<KeyRange>>) -> Self {
        let blueprint = match result {
            Ok(blueprint) => blueprint,
            Err(e) => {
                return Self {
                    fingerprint: None,
                    shards: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        match blueprint.fingerprint() {
            Ok(fingerprint) => Self {
                fingerprint: Some(fingerprint),
                shards: blueprint.shard_placements(),
                error: None,
            },
            Err(e) => Self {
                fingerprint: None,
                shards: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

fn load_state(path: &Path) -> anyhow::Result<ClusterState<KeyRange>> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Suggest {
            input,
            table,
            prioritize_distribution,
            pretty,
        } => {
            if prioritize_distribution {
                config.suggester.prioritize_distribution = true;
            }
            let state = load_state(&input)?;
            let mut usage = UsageTally::new();

            let results = match table {
                Some(table_id) => {
                    let result =
                        suggest_table_blueprint(&state, &table_id, &config.suggester, &mut usage);
                    BTreeMap::from([(table_id, result)])
                }
                None => suggest_blueprints(&state, &config.suggester, &mut usage),
            };

            let failed = results.values().filter(|r| r.is_err()).count();
            let reports: BTreeMap<Uuid, TableReport> = results
                .into_iter()
                .map(|(id, result)| (id, TableReport::from_result(result)))
                .collect();

            let output = if pretty {
                serde_json::to_string_pretty(&reports)?
            } else {
                serde_json::to_string(&reports)?
            };
            println!("{}", output);

            if failed > 0 {
                anyhow::bail!("{} of {} tables could not be placed", failed, reports.len());
            }
        }

        Commands::Check { input } => {
            let state = load_state(&input)?;
            let mut invalid = 0;
            for (table_id, table) in &state.tables {
                match table.check(&state.servers) {
                    Ok(shards) => println!("{}: ok ({} shards)", table_id, shards.len()),
                    Err(e) => {
                        invalid += 1;
                        println!("{}: invalid: {}", table_id, e);
                    }
                }
            }
            if invalid > 0 {
                anyhow::bail!("{} invalid tables", invalid);
            }
        }
    }

    Ok(())
}
