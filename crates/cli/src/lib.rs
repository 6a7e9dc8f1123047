mod cache;
mod discover;
mod resolve;

use cache::CacheCommands;
use clap::{Parser, Subcommand, ValueEnum};
use classcope_api::{ContextRef, MatchMode};
use classcope_core::{DiscoveryOptions, FsLoadingContext, Properties};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "classcope",
    version,
    about = "Locate the runtime classpath of an embedded compiler inside a host",
    long_about = "Classcope walks a loading-context hierarchy, unpacks nested collection archives \
                  (web applications, fat archives) into a shared cache exactly once, and picks out \
                  the library files a caller asks for by versioned name."
)]
pub struct Cli {
    /// Also print logs to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover a classpath satisfying a set of required library names
    #[command(
        long_about = "Builds a context from ROOTS (directories and archives), optionally delegating \
                            to parent layers, and filters every discovered entry against the required names."
    )]
    Discover {
        /// Innermost context roots
        #[arg(value_name = "ROOT", required = true)]
        roots: Vec<PathBuf>,
        /// Parent layer as a path list; repeat to add outer layers
        #[arg(long = "parent", value_name = "PATH_LIST")]
        parents: Vec<String>,
        /// Required library name, e.g. runtime.jar; repeatable
        #[arg(short, long = "require", value_name = "NAME")]
        required: Vec<String>,
        #[arg(long, value_enum, default_value_t = Mode::All)]
        mode: Mode,
        #[command(flatten)]
        cache: CacheArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a well-known library, or the compiler or script classpath
    Resolve {
        /// Library id (compiler, stdlib, reflect, script-runtime, trove4j),
        /// `compiler-classpath` or `script-classpath`
        #[arg(value_name = "TARGET")]
        target: String,
        /// Roots of the context to search
        #[arg(value_name = "ROOT")]
        roots: Vec<PathBuf>,
        /// Roots of the context that defines the marker classes
        #[arg(long, value_name = "PATH_LIST")]
        marker_home: Option<String>,
        #[command(flatten)]
        cache: CacheArgs,
        #[arg(long)]
        json: bool,
    },
    /// Unpack one collection archive into the cache and list its entries
    Unpack {
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
        #[arg(long, value_name = "DIR")]
        cache_dir: Option<PathBuf>,
    },
    /// Inspect or clear unpacked collections
    Cache {
        #[arg(long, global = true, value_name = "DIR")]
        cache_dir: Option<PathBuf>,
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(clap::Args)]
pub struct CacheArgs {
    /// Unpack nested collections under this directory
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,
    /// Do not unpack nested collections
    #[arg(long, conflicts_with = "cache_dir")]
    no_cache: bool,
}

impl CacheArgs {
    fn options(&self, properties: &Properties) -> DiscoveryOptions {
        let options = DiscoveryOptions::from_properties(properties);
        if self.no_cache {
            return options;
        }
        let root = self
            .cache_dir
            .clone()
            .unwrap_or_else(DiscoveryOptions::default_cache_root);
        options.with_cache_root(root)
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Whole list, if every name matches
    All,
    /// Only the first match per name
    Minimal,
    /// Whole list, if any name matches
    Any,
}

impl From<Mode> for MatchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::All => MatchMode::RequireAll,
            Mode::Minimal => MatchMode::RequireAllMinimal,
            Mode::Any => MatchMode::RequireAny,
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let component = match &cli.command {
        Commands::Discover { .. } => "discover",
        Commands::Resolve { .. } => "resolve",
        Commands::Unpack { .. } => "unpack",
        Commands::Cache { .. } => "cache",
    };
    let _guard = classcope_core::logging::init_logging(component, cli.verbose);

    let properties = Properties::from_env();

    match cli.command {
        Commands::Discover {
            roots,
            parents,
            required,
            mode,
            cache,
            json,
        } => {
            let mut layers = vec![roots];
            layers.extend(parents.iter().map(|list| split_path_list(list)));
            let options = cache.options(&properties);
            discover::run(build_chain(layers)?, &required, mode.into(), &options, json)
        }
        Commands::Resolve {
            target,
            roots,
            marker_home,
            cache,
            json,
        } => {
            let context = if roots.is_empty() {
                None
            } else {
                Some(build_chain(vec![roots])?)
            };
            let home = marker_home
                .map(|list| build_chain(vec![split_path_list(&list)]))
                .transpose()?;
            let options = cache.options(&properties);
            resolve::run(&target, properties, options, context, home, json)
        }
        Commands::Unpack { archive, cache_dir } => {
            let root = cache_dir.unwrap_or_else(DiscoveryOptions::default_cache_root);
            cache::unpack(&archive, root, properties.lock_timeout())
        }
        Commands::Cache { cache_dir, command } => {
            let root = cache_dir.unwrap_or_else(DiscoveryOptions::default_cache_root);
            cache::run(command, root)
        }
    }
}

fn split_path_list(list: &str) -> Vec<PathBuf> {
    std::env::split_paths(list)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Chain of file-system contexts; roots are made absolute so resource URIs can be built
fn build_chain(layers: Vec<Vec<PathBuf>>) -> Result<ContextRef, Box<dyn std::error::Error>> {
    let layers = layers
        .into_iter()
        .map(|roots| {
            roots
                .into_iter()
                .map(|root| std::path::absolute(&root))
                .collect::<std::io::Result<Vec<_>>>()
        })
        .collect::<std::io::Result<Vec<_>>>()?;
    FsLoadingContext::chain(layers).ok_or_else(|| "no context roots given".into())
}
