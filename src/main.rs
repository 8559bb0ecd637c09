use clap::Parser;
use scan_alerts::cli::{Cli, Commands};
use scan_alerts::config::{Config, ConfigError};

fn load_config(path: &str) -> anyhow::Result<Config> {
    let mut config = match Config::load(path) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("Warning: {} not found, using default configuration", path);
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;

    // Initialize telemetry
    scan_alerts::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            args.execute(&config).await?;
        }
        Commands::Replay(args) => {
            tracing::info!(dry_run = args.dry_run, "Starting replay");
            args.execute(&config).await?;
        }
        Commands::Config => {
            let mut shown = config.clone();
            if !shown.telegram.bot_token.is_empty() {
                shown.telegram.bot_token = "<redacted>".to_string();
            }
            println!("{}", toml::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}
