use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Herramientas del pipeline de steps: combinación de zips y mantenimiento
/// de la caché de outputs.
#[derive(Parser, Debug)]
#[command(name = "forge", version, about = "Step pipeline tooling: zip injection and output cache maintenance")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose output")]
    pub verbose: bool,

    #[arg(short = 'q', long, global = true, conflicts_with = "verbose", help = "Only report errors")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Merge zip archives and directories into one archive",
              long_about = "Copies every source into OUTPUT in the given order. When two sources \
                            contain the same file the first one wins and the duplicate is reported.\n\n\
                            Examples:\n  \
                            forge inject --output merged.jar base.jar patches/\n  \
                            forge inject --output merged.jar --exclude 'META-INF/' a.jar b.jar")]
    Inject(InjectArgs),

    #[command(about = "Extract a zip archive into a directory")]
    Extract(ExtractArgs),

    #[command(about = "Inspect and maintain the step output cache")]
    Cache(CacheArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long = "include", value_name = "PATTERN", help = "Ant-style include pattern (repeatable)")]
    pub includes: Vec<String>,

    #[arg(long = "exclude", value_name = "PATTERN", help = "Ant-style exclude pattern (repeatable)")]
    pub excludes: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct InjectArgs {
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(value_name = "SOURCE", required = true, help = "Zip archives or directories, highest priority first")]
    pub sources: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CacheArgs {
    #[arg(long, value_name = "DIR", help = "Cache root (defaults to FORGE_CACHE_DIR)")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheCommand {
    #[command(about = "List cache entries")]
    List {
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Check every entry against its recorded checksum")]
    Verify,
    #[command(about = "Remove entries not used recently")]
    Prune {
        #[arg(long, value_name = "DAYS", help = "Defaults to FORGE_CACHE_RETENTION_DAYS")]
        max_age_days: Option<u64>,
    },
    #[command(about = "Remove abandoned partial outputs")]
    Sweep,
    #[command(about = "Entry count and disk usage")]
    Stats {
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Remove one entry")]
    Remove { fingerprint: String },
}
