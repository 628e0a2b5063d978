use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use pxml_rs::pxml::condition;
use pxml_rs::pxml::document::DocumentLoader;
use pxml_rs::pxml::overlay::{
    ConfigLoader, OverlayConfig, OverlayGenerator, TextNodeStrategy, VariablePool,
};
use pxml_rs::pxml::probability::{MemoryTable, ProbabilityResolver, ProbabilityTable};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge descriptors into one, dropping duplicate conditions
    Combine {
        /// Descriptors such as "x=1 y=0"
        #[arg(required = true)]
        descriptors: Vec<String>,
    },
    /// Check that a descriptor never binds a variable to two values
    Consistent { descriptor: String },
    /// Check whether two descriptors can never hold together
    Exclusive { first: String, second: String },
    /// Resolve the probability of descriptors in one session
    Probability {
        /// YAML probability table (`x: {0: 0.3, 1: 0.7}`)
        #[arg(
            short,
            long,
            conflicts_with = "document",
            required_unless_present = "document"
        )]
        table: Option<PathBuf>,

        /// Overlaid document whose variables pool supplies probabilities
        #[arg(short, long)]
        document: Option<PathBuf>,

        /// Overlay configuration the document was generated with
        #[arg(long)]
        config: Option<PathBuf>,

        /// Namespace of the variables pool, overriding the configuration
        #[arg(long)]
        ns_uri: Option<String>,

        /// Cache context for this session
        #[arg(short, long, default_value = "default")]
        context: String,

        #[arg(required = true)]
        descriptors: Vec<String>,
    },
    /// Overlay probability nodes onto a document snapshot
    Overlay {
        /// Input document (YAML snapshot)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the overlaid document
        #[arg(short, long)]
        output: PathBuf,

        /// Overlay configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Prefix for generated elements and attributes
        #[arg(long)]
        ns_prefix: Option<String>,

        /// Namespace URI for generated elements and attributes
        #[arg(long)]
        ns_uri: Option<String>,

        /// Random seed; falls back to PXML_SEED
        #[arg(long)]
        seed: Option<u64>,

        /// Fraction of elements that get wrapped
        #[arg(long)]
        pnodes: Option<f64>,

        /// Random variables per expected events node
        #[arg(long)]
        num_vars: Option<f64>,

        /// Text children of probability nodes: keep or wrap
        #[arg(long)]
        text_nodes: Option<TextNodeStrategy>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Combine { descriptors } => {
            println!("{}", condition::combine(&descriptors[..])?);
        }
        Commands::Consistent { descriptor } => {
            println!("{}", condition::consistent(&descriptor)?);
        }
        Commands::Exclusive { first, second } => {
            println!("{}", condition::mutually_exclusive(&first, &second)?);
        }
        Commands::Probability {
            table,
            document,
            config,
            ns_uri,
            context,
            descriptors,
        } => match (table, document) {
            (Some(path), _) => {
                let table = MemoryTable::load(&path)
                    .with_context(|| format!("Failed to load table {}", path.display()))?;
                resolve_all(&table, &context, &descriptors)?;
            }
            (None, Some(path)) => {
                let doc = DocumentLoader::new()
                    .load_document(&path)
                    .with_context(|| format!("Failed to load document {}", path.display()))?;
                let mut config = load_config(config)?;
                if let Some(uri) = ns_uri {
                    config.namespace_uri = uri;
                }
                let pool = VariablePool::for_config(&doc, &config);
                if !pool.exists() {
                    log::warn!("{} has no variables pool", path.display());
                }
                resolve_all(&pool, &context, &descriptors)?;
            }
            (None, None) => bail!("either --table or --document is required"),
        },
        Commands::Overlay {
            input,
            output,
            config,
            ns_prefix,
            ns_uri,
            seed,
            pnodes,
            num_vars,
            text_nodes,
        } => {
            let mut config = load_config(config)?;
            if let Some(prefix) = ns_prefix {
                config.namespace_prefix = prefix;
            }
            if let Some(uri) = ns_uri {
                config.namespace_uri = uri;
            }
            if let Some(pnodes) = pnodes {
                config.occurrence = pnodes;
            }
            if let Some(ratio) = num_vars {
                config.variables_ratio = ratio;
            }
            if let Some(strategy) = text_nodes {
                config.text_nodes = strategy;
            }
            let seed = match seed {
                Some(seed) => Some(seed),
                None => env_seed()?,
            };
            if seed.is_some() {
                config.seed = seed;
            }

            let loader = DocumentLoader::new();
            let mut doc = loader
                .load_document(&input)
                .with_context(|| format!("Failed to load document {}", input.display()))?;

            let mut generator = OverlayGenerator::new(config)?;
            let summary = generator.transform(&mut doc)?;
            log::info!(
                "inserted {} probability nodes into {}",
                summary.insertions,
                input.display()
            );

            loader
                .save_document(&doc, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<OverlayConfig> {
    match path {
        Some(path) => ConfigLoader::new()
            .load_config(&path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(OverlayConfig::default()),
    }
}

/// Seed from the environment, if set
fn env_seed() -> anyhow::Result<Option<u64>> {
    match std::env::var("PXML_SEED") {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("PXML_SEED is not a valid seed: '{}'", value)),
        Err(_) => Ok(None),
    }
}

fn resolve_all<T: ProbabilityTable>(
    table: &T,
    context: &str,
    descriptors: &[String],
) -> anyhow::Result<()> {
    let mut resolver = ProbabilityResolver::new();
    for descriptor in descriptors {
        let p = resolver.probability(table, context, descriptor)?;
        println!("{}\t{}", descriptor, p);
    }
    log::debug!(
        "cache: {} entries, {} hits, {} misses",
        resolver.cache().len(),
        resolver.cache().hits(),
        resolver.cache().misses()
    );
    Ok(())
}
