use anyhow::{bail, Context, Result};
use bedrock_packs_sqlite::{
    cli::{Cli, Commands},
    schema::Catalog,
    writer::PackStore,
};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse_args();
    let catalog = Catalog::builtin().context("Failed to build schema catalog")?;

    match cli.command {
        Commands::Init { output_db } => {
            let start = Instant::now();
            let store = PackStore::create(Some(output_db.as_path()), &catalog)
                .with_context(|| format!("Failed to create database: {:?}", output_db))?;
            store.finalize()?;
            println!(
                "Created {:?} ({} tables) in {:.1}s",
                output_db,
                catalog.tables().len(),
                start.elapsed().as_secs_f64()
            );
        }

        Commands::ListTables { relations } => {
            println!("Available tables:\n");
            for table in catalog.tables() {
                println!("  {}", table.name);
                if relations {
                    for rel in catalog.graph().edges_from(table.name) {
                        let kind = if rel.unique { "unique" } else { "shared" };
                        println!(
                            "      {}.{} -> {}.{} ({})",
                            rel.from_table, rel.from_column, rel.to_table, rel.to_column, kind
                        );
                    }
                }
            }
        }

        Commands::Query(args) => {
            let request = args.to_request()?;
            let plan = catalog.build_query(&request)?;

            let Some(db) = &args.db else {
                println!("{}", plan);
                return Ok(());
            };
            if !db.exists() {
                bail!("Database not found: {:?}", db);
            }

            let store = PackStore::open(db)?;
            let rows = plan
                .run(store.connection())
                .with_context(|| format!("Failed to run query on {:?}", db))?;

            if args.json {
                let objects: Vec<serde_json::Value> = rows
                    .iter()
                    .map(|row| {
                        plan.tables()
                            .iter()
                            .zip(row)
                            .map(|(table, pk)| (table.to_string(), serde_json::Value::from(*pk)))
                            .collect::<serde_json::Map<_, _>>()
                            .into()
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&objects)?);
            } else {
                println!("{}", plan.tables().join("\t"));
                for row in &rows {
                    let cells: Vec<String> = row
                        .iter()
                        .map(|pk| pk.map_or_else(|| "NULL".to_string(), |pk| pk.to_string()))
                        .collect();
                    println!("{}", cells.join("\t"));
                }
                println!("\n{} rows", rows.len());
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
