use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use francisco_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "francisco-server")]
#[command(about = "Serve the Francisco-IA theme handlers")]
struct Cli {
    /// Address to listen on (overrides config and FRANCISCO_BIND)
    #[arg(short, long)]
    bind: Option<String>,
    /// Completion model (overrides config and FRANCISCO_MODEL)
    #[arg(short, long)]
    model: Option<String>,
    /// Read settings from this file instead of the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the file settings, with --bind and --model applied, back to the config file
    #[arg(long)]
    save: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("francisco=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    let mut config = Config::load_from(&path)?;
    cli.apply(&mut config);
    if cli.save {
        // Env values are never written to the file.
        config.save_to(&path)?;
        tracing::info!("Saved settings to {}", path.display());
    }

    // Flags win over the environment, which wins over the file.
    config.apply_env(|key| std::env::var(key).ok());
    cli.apply(&mut config);

    let addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.bind))?;

    let client = config.completion_client()?;
    tracing::info!("Using model {} at {}", client.model(), config.base_url);

    francisco_server::serve(Arc::new(client), addr).await
}
