mod api;
mod commands;
mod directive;
mod gateway;
mod personality;

use clap::{Parser, Subcommand};
use secretaria_channels::whatsapp::WhatsAppChannel;
use secretaria_core::{config, context::Context, crypto::MessageCodec, traits::Provider};
use secretaria_memory::Store;
use secretaria_providers::OllamaProvider;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "secretaria",
    version,
    about = "SecretarIA — encrypted WhatsApp secretary with reminders"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the secretary.
    Start,
    /// Check configuration, provider, and channel health.
    Status,
    /// Send a one-shot message to the model, bypassing WhatsApp and memory.
    Ask {
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;

            // Codec first: a bad or missing key must stop startup before
            // anything touches the network or the database.
            let codec = MessageCodec::new(&cfg.crypto.message_key)?;

            let provider: Arc<dyn Provider> =
                Arc::new(OllamaProvider::from_config(&cfg.provider.ollama)?);
            if !provider.is_available().await {
                anyhow::bail!(
                    "Ollama is not reachable at {}. Is it running?",
                    cfg.provider.ollama.base_url
                );
            }

            if !cfg.channel.whatsapp.enabled {
                anyhow::bail!("WhatsApp is disabled in config.toml; nothing to do.");
            }
            let data_dir = config::shellexpand(&cfg.secretaria.data_dir);
            let whatsapp = Arc::new(WhatsAppChannel::new(cfg.channel.whatsapp.clone(), &data_dir));

            let memory = Store::new(&cfg.memory).await?;

            // QR endpoint runs beside the gateway for headless pairing.
            tokio::spawn(api::serve(cfg.api.clone(), Arc::clone(&whatsapp)));

            println!("SecretarIA — starting...");
            let gw = Arc::new(gateway::Gateway::new(
                provider,
                whatsapp,
                memory,
                codec,
                cfg.scheduler.clone(),
            ));
            gw.run().await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("SecretarIA — Status Check\n");
            println!("Config: {}", cli.config);

            println!(
                "  message key: {}",
                match MessageCodec::new(&cfg.crypto.message_key) {
                    Ok(_) => "valid".to_string(),
                    Err(e) => format!("invalid ({e})"),
                }
            );

            let provider = OllamaProvider::from_config(&cfg.provider.ollama)?;
            println!(
                "  ollama ({}): {}",
                cfg.provider.ollama.model,
                if provider.is_available().await {
                    "available"
                } else {
                    "not reachable"
                }
            );

            println!(
                "  whatsapp: {}",
                if cfg.channel.whatsapp.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!(
                "  scheduler: {}",
                if cfg.scheduler.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!("  api: {}:{}", cfg.api.host, cfg.api.port);
        }
        Commands::Ask { message } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: secretaria ask <message>");
            }

            let prompt = message.join(" ");
            let cfg = config::load(&cli.config)?;
            let provider = OllamaProvider::from_config(&cfg.provider.ollama)?;

            if !provider.is_available().await {
                anyhow::bail!(
                    "Ollama is not reachable at {}. Is it running?",
                    cfg.provider.ollama.base_url
                );
            }

            let context = Context::new(&prompt);
            let response = provider.complete(&context).await?;
            println!("{}", response.text);
        }
    }

    Ok(())
}
