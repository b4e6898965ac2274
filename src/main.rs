use clap::Parser;
use gemrelay::cli::{Cli, Commands, ConfigAction};
use gemrelay::config::Config;
use gemrelay::gateway::GatewayServer;
use gemrelay::logging;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(opts) => {
            info!("Starting gemrelay server");
            let config = Config::load(opts.config.as_deref())?;
            let server = GatewayServer::start(config, opts).await?;
            server.run_until_shutdown().await?;
        }
        Commands::Config(opts) => {
            match opts.action {
                ConfigAction::Show => {
                    let config = Config::load(opts.config.as_deref())?;
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
                ConfigAction::Validate => {
                    Config::load(opts.config.as_deref())?;
                    info!("Configuration is valid");
                }
                ConfigAction::Init => {
                    Config::write_default(opts.config.as_deref().unwrap_or("gemrelay.json"))?;
                    info!("Configuration file created");
                }
            }
        }
        Commands::Version => {
            println!("gemrelay {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
