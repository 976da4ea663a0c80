mod bot;
mod commands;
mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use pictor_channels::telegram::TelegramChannel;
use pictor_core::{
    config,
    deploy::{Descriptor, Runtime, ServiceSpec, WorkerProfile},
    traits::ImageGenerator,
};
use pictor_providers::gemini::GeminiImageGenerator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "pictor",
    version,
    about = "Pictor — Telegram image generation worker backed by Google Gemini"
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
    /// Start the bot (long-running worker).
    Start,
    /// Check configuration and provider availability.
    Status,
    /// Generate a single image and write it to disk.
    Generate {
        /// Output file.
        #[arg(short, long, default_value = "generated_image.png")]
        out: PathBuf,
        /// The image description.
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,
    },
    /// Inspect the deployment descriptor.
    Descriptor {
        #[command(subcommand)]
        action: DescriptorAction,
    },
}

#[derive(Subcommand)]
enum DescriptorAction {
    /// Validate a descriptor against the worker contract.
    Check {
        /// Descriptor file.
        #[arg(default_value = "render.yaml")]
        path: PathBuf,
        /// Expected runtime. Defaults to the runtime the descriptor declares.
        #[arg(long, value_enum)]
        runtime: Option<RuntimeArg>,
    },
    /// Print the canonical descriptor.
    Emit {
        #[arg(long, value_enum, default_value_t = RuntimeArg::Rust)]
        runtime: RuntimeArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RuntimeArg {
    Python,
    Rust,
}

impl From<RuntimeArg> for Runtime {
    fn from(r: RuntimeArg) -> Self {
        match r {
            RuntimeArg::Python => Runtime::Python,
            RuntimeArg::Rust => Runtime::Rust,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let dotenv = config::load_dotenv()?;
    let (cfg, source) = config::load(&cli.config)?;
    let _log_guard = logging::init(&cfg.pictor)?;

    match dotenv {
        Some(path) => info!("loaded environment variables from {}", path.display()),
        None => info!("no .env file found, relying on system environment variables"),
    }
    match &source.file {
        Some(path) => info!("loaded config from {}", path.display()),
        None => info!("Config file not found at {}, using defaults", cli.config),
    }
    if !source.env_overrides.is_empty() {
        debug!(
            "environment overrides: {}",
            source.env_overrides.join(", ")
        );
    }

    match cli.command {
        Commands::Start => {
            let missing = cfg.missing_secrets();
            if !missing.is_empty() {
                anyhow::bail!(
                    "missing required secrets: {}. Set them in the environment or config.toml.",
                    missing.join(", ")
                );
            }

            let generator = GeminiImageGenerator::from_config(cfg.gemini.clone())?;
            info!("Google AI configured with model: {}", generator.model());
            let channel = TelegramChannel::new(cfg.telegram.clone());

            info!("{} starting bot polling...", cfg.pictor.name);
            let bot = Arc::new(bot::Bot::new(Arc::new(generator), Arc::new(channel)));
            bot.run().await?;
        }
        Commands::Status => {
            println!("{} — Status Check\n", cfg.pictor.name);
            println!("Config: {}", cli.config);
            println!("Model: {}", cfg.gemini.model);
            println!();
            for secret in [config::ENV_TELEGRAM_BOT_TOKEN, config::ENV_GOOGLE_API_KEY] {
                let state = if cfg.missing_secrets().contains(&secret) {
                    "missing"
                } else {
                    "set"
                };
                println!("  {secret}: {state}");
            }

            if !cfg.gemini.api_key.is_empty() {
                let generator = GeminiImageGenerator::from_config(cfg.gemini.clone())?;
                let available = generator.is_available().await;
                println!(
                    "  gemini: {}",
                    if available { "available" } else { "unreachable" }
                );
            }
        }
        Commands::Generate { out, prompt } => {
            let prompt = prompt.join(" ");
            if cfg.gemini.api_key.is_empty() {
                anyhow::bail!("{} is not set", config::ENV_GOOGLE_API_KEY);
            }
            let generator = GeminiImageGenerator::from_config(cfg.gemini.clone())?;
            let image = generator.generate(&prompt).await?;
            std::fs::write(&out, &image.data)?;
            println!(
                "wrote {} ({} bytes, {}) in {}ms",
                out.display(),
                image.data.len(),
                image.mime_type,
                image.processing_time_ms
            );
            if let Some(text) = image.caption {
                println!("{text}");
            }
        }
        Commands::Descriptor { action } => run_descriptor(action)?,
    }

    Ok(())
}

fn run_descriptor(action: DescriptorAction) -> anyhow::Result<()> {
    match action {
        DescriptorAction::Check { path, runtime } => {
            let descriptor = Descriptor::load(&path)?;
            let runtime = match runtime {
                Some(r) => r.into(),
                None => descriptor
                    .services
                    .first()
                    .map(|s| s.env.clone())
                    .unwrap_or(Runtime::Rust),
            };
            let findings = descriptor.check_worker(&WorkerProfile::telegram_bot(runtime));
            if findings.is_empty() {
                println!("{}: ok", path.display());
                return Ok(());
            }
            for finding in &findings {
                println!("{}: {finding}", path.display());
            }
            anyhow::bail!("{} problem(s) in {}", findings.len(), path.display());
        }
        DescriptorAction::Emit { runtime } => {
            let service = match runtime {
                RuntimeArg::Python => ServiceSpec::telegram_worker(),
                RuntimeArg::Rust => ServiceSpec::pictor_worker(),
            };
            print!("{}", Descriptor::single(service).to_yaml()?);
        }
    }
    Ok(())
}
