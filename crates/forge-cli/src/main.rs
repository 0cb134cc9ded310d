mod commands;
mod handlers;

use std::env;

use clap::Parser;
use log::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{CliArgs, Commands};

fn main() {
    forge_cache::config::init_dotenv();
    let args = CliArgs::parse();
    init_logging(&args);
    debug!("arguments: {args:?}");

    let exit_code = match &args.command {
        Commands::Inject(a) => handlers::handle_inject(a),
        Commands::Extract(a) => handlers::handle_extract(a),
        Commands::Cache(a) => handlers::handle_cache(a),
    };
    std::process::exit(exit_code);
}

fn init_logging(args: &CliArgs) {
    let level = match (&args.log_level, args.verbose, args.quiet) {
        (Some(level), _, _) => level.to_lowercase(),
        (None, true, _) => "debug".to_string(),
        (None, _, true) => "error".to_string(),
        _ => env::var("FORGE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
    };
    let filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(format!("forge={level},forge_core={level},forge_cache={level},forge_adapters={level}"))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::registry().with(filter)
                                          .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                                          .try_init();
}
