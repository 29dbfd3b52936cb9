//! DocType Explorer CLI
//!
//! Generates DocType documentation from a directory of DocType definition
//! files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use doctype_explorer::{DirectoryStore, DocumentationService, ExplorerConfig};
use doctype_explorer::store::LoadConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "doctype-explorer")]
#[command(about = "Explore DocType references and generate documentation")]
struct Cli {
    /// Configuration file (defaults to doctype-explorer.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory of DocType definition files (overrides the config)
    #[arg(short, long, global = true)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the JSON documentation of a DocType
    Generate {
        /// DocType name
        name: String,
        /// Traversal depth (0 for unbounded)
        #[arg(short, long)]
        level: Option<i64>,
        /// Write the JSON artifact instead of printing the document
        #[arg(short, long)]
        write: bool,
    },

    /// Export the HTML report of a DocType
    ExportHtml {
        /// DocType name
        name: String,
    },

    /// Write JSON documentation for several DocTypes
    Bulk {
        /// DocType names
        names: Vec<String>,
        /// Document every DocType of this module instead
        #[arg(short, long)]
        module: Option<String>,
    },

    /// Compare the fields of two DocTypes
    Compare {
        first: String,
        second: String,
    },

    /// Show the link and child table dependencies of a DocType
    Deps {
        /// DocType name
        name: String,
        /// How many levels of links to follow
        #[arg(short, long, default_value_t = 1)]
        depth: usize,
    },

    /// Write the effective configuration to a TOML file
    InitConfig {
        /// Output file
        #[arg(default_value = "doctype-explorer.toml")]
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ExplorerConfig::load_from(cli.config.as_deref())?;
    if let Some(dir) = cli.schema_dir {
        config.store.path = dir;
    }
    let default_level = config.traversal.default_level;

    match cli.command {
        Commands::Generate { name, level, write } => {
            let service = open_service(config)?;
            let response = service.generate_doctype_documentation(&name, !write, level.unwrap_or(default_level));
            if !response.success {
                anyhow::bail!(response.message);
            }
            match response.data {
                Some(data) => println!("{}", serde_json::to_string_pretty(&data)?),
                None => {
                    println!("✅ {}", response.message);
                    if let Some(path) = response.file_path {
                        println!("  Path: {}", path);
                    }
                    if let Some(url) = response.url {
                        println!("  URL:  {}", url);
                    }
                }
            }
        }
        Commands::ExportHtml { name } => {
            let artifact = open_service(config)?.export_html(&name)?;
            println!("✅ HTML exported for {}", name);
            println!("  Path:     {}", artifact.path.display());
            println!("  URL:      {}", artifact.url);
            println!("  Checksum: {}", artifact.checksum);
        }
        Commands::Bulk { names, module } => {
            let report = open_service(config)?.bulk_generate_documentation(&names, module.as_deref());
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.success {
                std::process::exit(1);
            }
        }
        Commands::Compare { first, second } => {
            let comparison = open_service(config)?.compare_doctypes(&first, &second)?;
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        Commands::Deps { name, depth } => {
            let report = open_service(config)?.get_doctype_dependencies(&name, depth)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::InitConfig { path } => {
            config.save(&path)?;
            println!("✅ Configuration written to {}", path.display());
        }
    }

    Ok(())
}

/// Load the schema directory named by the configuration
fn open_service(config: ExplorerConfig) -> anyhow::Result<DocumentationService<DirectoryStore>> {
    let load_config = LoadConfig {
        skip_prefixes: LoadConfig::default()
            .skip_prefixes
            .into_iter()
            .chain(config.store.skip_prefixes.iter().cloned())
            .collect(),
        include_prefixes: Vec::new(),
    };
    let store = DirectoryStore::load_with(config.store_path(), &load_config)?;
    Ok(DocumentationService::new(store, config))
}
