use std::io::Write;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use itertools::Itertools;
use mimalloc::MiMalloc;
use tabgraph_convert::Conversion;
use tabgraph_schemas::{ConversionConfig, TableKind};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Convert node and edge tables into GEXF graph documents, driven by a
/// declarative column schema.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the tables named in a configuration file into a GEXF document
    ///
    /// Table paths and `saveAs` are resolved relative to the configuration
    /// file. Without `saveAs` or `--output`, the document is written to
    /// stdout.
    Convert {
        /// Path to the JSON configuration file
        config: Utf8PathBuf,

        /// Output file path (overrides `saveAs`)
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Load, validate, and coerce both tables without building a document
    Check {
        /// Path to the JSON configuration file
        config: Utf8PathBuf,
    },

    /// Print the JSON Schema of the configuration file
    ConfigSchema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Output goes to stderr so the document on stdout stays clean for
    // piping. Default to warn, allowlist our crates.
    const CRATES: &[&str] = &[
        "tabgraph",
        "tabgraph_convert",
        "tabgraph_gexf",
        "tabgraph_schemas",
    ];
    let level = cli.verbose.tracing_level_filter();
    let allowlist = CRATES.iter().map(|c| format!("{c}={level}")).join(",");
    let filter = EnvFilter::new(format!("warn,{allowlist}"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
        .init();

    match cli.command {
        Commands::Convert { config, output } => {
            let mut config = read_config(&config)?;
            if let Some(output) = output {
                config.save_as = Some(output);
            }
            match tabgraph_convert::convert(&config)? {
                Conversion::Saved(path) => info!(%path, "done"),
                Conversion::Document(gexf) => {
                    let mut stdout = std::io::stdout().lock();
                    gexf.write_to(&mut stdout)?;
                    stdout.flush()?;
                }
            }
            Ok(())
        }
        Commands::Check { config } => {
            let config = read_config(&config)?;
            let mut stdout = std::io::stdout().lock();
            for (table, kind) in [
                (&config.nodes, TableKind::Node),
                (&config.edges, TableKind::Edge),
            ] {
                let loaded = tabgraph_convert::load(table, kind)?;
                writeln!(
                    stdout,
                    "{kind} table {}: {} rows, {} columns, {} attributes",
                    table.file,
                    loaded.records.len(),
                    loaded.schema.len(),
                    loaded.schema.attributes().count(),
                )?;
            }
            Ok(())
        }
        Commands::ConfigSchema => {
            let schema = schemars::schema_for!(ConversionConfig);
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &schema)?;
            writeln!(stdout)?;
            Ok(())
        }
    }
}

/// Loads a configuration and rebases its paths onto the file's directory.
fn read_config(path: &Utf8Path) -> Result<ConversionConfig> {
    let mut config = ConversionConfig::from_path(path)
        .with_context(|| format!("failed to read configuration {path}"))?;
    if let Some(dir) = path.parent() {
        config.resolve_relative_to(dir);
    }
    Ok(config)
}
