use clap::Parser;
use custseg::config::Config;
use custseg::error::{ConfigError, StartupError};
use custseg::report::print_cluster_report;
use custseg::server;
use custseg::SegmentationContextBuilder;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Customer segmentation service.
#[derive(Debug, Parser)]
#[command(name = "custseg", version, about)]
struct Cli {
    /// YAML configuration file. Built-in defaults are used when the default file is absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration.
    #[arg(short, long)]
    port: Option<u16>,

    /// Dataset path, tried before the configured candidates.
    #[arg(short, long)]
    data: Option<String>,
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None if std::path::Path::new(DEFAULT_CONFIG_PATH).is_file() => {
            Config::from_file(DEFAULT_CONFIG_PATH)?
        }
        None => Config::default(),
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(data) = &cli.data {
        config.data.candidate_paths.insert(0, data.clone());
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let config = load_config(&cli)?;
    config.setup_logging();
    info!("{}", config);

    let context = SegmentationContextBuilder::new(&config).build()?;
    if config.report.on_startup {
        print_cluster_report(&context);
    }

    server::serve(Arc::new(context), &config.server).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
