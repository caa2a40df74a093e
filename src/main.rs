use anyhow::Context;
use ares_research::cli::init::{self, InitConfig, InitResult};
use ares_research::cli::output::Output;
use ares_research::cli::run::{self, RunOptions};
use ares_research::cli::{Cli, Commands};
use ares_research::utils::toml_config::{AppConfig, LogFormat, LoggingConfig};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match execute(cli, output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli, output: Output) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init { path, force } => {
            init_logging(&LoggingConfig::default(), cli.verbose);
            match init::run(InitConfig { path, force }, &output) {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => Err(anyhow::anyhow!(e)),
            }
        }
        Commands::Config { validate } => {
            let config = AppConfig::load(&cli.config)
                .with_context(|| format!("Invalid configuration in {}", cli.config.display()))?;
            init_logging(&config.logging, cli.verbose);
            if validate {
                output.success(&format!("{} is valid", cli.config.display()));
                return Ok(());
            }
            output.header("Configuration");
            output.kv("file", &cli.config.display().to_string());
            output.kv("exists", &cli.config.exists().to_string());
            output.newline();
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Run {
            query,
            no_clarify,
            json,
        } => {
            let config = AppConfig::load(&cli.config)
                .with_context(|| format!("Invalid configuration in {}", cli.config.display()))?;
            init_logging(&config.logging, cli.verbose);

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupt received, cancelling research");
                    on_signal.cancel();
                }
            });

            let options = RunOptions {
                query,
                no_clarify,
                json,
            };
            run::run(config, options, output, cancel)
                .await
                .context("Research failed")
        }
    }
}

/// Logs go to stderr; RUST_LOG overrides the configured level.
fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ares_research={}", default_level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
