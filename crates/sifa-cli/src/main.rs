use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use sifa_core::{AppConfig, ExitCode, FormProfile, FormState, Provider, SifaError, SuggestionPanel};
use sifa_suggest::{HttpSuggestionFetcher, SuggestError};
use sifa_tui::app::App;

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "sifa",
    about = "Product suggestions for pharmacy order forms",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format.
    /// Also enabled by setting SIFA_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open the terminal form (default).
    Form {
        /// dual (order form) or single (product quick-add).
        #[arg(long)]
        profile: Option<FormProfile>,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        provider: Option<Provider>,
        /// Start the order form in "create new product" mode.
        #[arg(long)]
        create: bool,
    },

    /// Query the suggestion endpoint once.
    Suggest {
        query: String,
        #[arg(long)]
        provider: Option<Provider>,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective config.
    Show,
    /// Print the config file location.
    Path,
    /// Write a default config file.
    Init {
        #[arg(long)]
        force: bool,
    },
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = clap_exit_code(&e);
            let _ = e.print();
            std::process::exit(code);
        }
    };
    let code = match run(cli).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_code_for(&e)
        }
    };
    std::process::exit(code as i32);
}

async fn run(cli: Cli) -> Result<()> {
    let start = Instant::now();
    let json_output = cli.json || std::env::var("SIFA_JSON").as_deref() == Ok("1");
    let command = cli.command.unwrap_or(Commands::Form {
        profile: None,
        endpoint: None,
        provider: None,
        create: false,
    });

    let interactive = matches!(command, Commands::Form { .. });
    init_logging(interactive)?;

    let mut config = AppConfig::load()?;

    match command {
        Commands::Form {
            profile,
            endpoint,
            provider,
            create,
        } => {
            apply_overrides(&mut config, endpoint, provider)?;
            let profile = profile.unwrap_or(config.form.profile);
            let form = match profile {
                FormProfile::DualMode => FormState::medication_order(
                    Vec::new(),
                    create || config.form.start_in_create_mode,
                ),
                FormProfile::SingleField => FormState::product_quick(),
            };
            let fetcher = HttpSuggestionFetcher::from_config(&config.suggest, profile)?;
            tracing::info!(%profile, endpoint = %config.suggest.endpoint, "starting terminal form");

            let mut app = App::new(form, Arc::new(fetcher), &config.suggest);
            tokio::task::block_in_place(|| sifa_tui::run_tui(&mut app))?;

            match app.submitted {
                Some(draft) => print_json(&serde_json::to_value(&draft)?)?,
                None => tracing::info!("form closed without submitting"),
            }
        }

        Commands::Suggest {
            query,
            provider,
            endpoint,
            limit,
        } => {
            apply_overrides(&mut config, endpoint, provider)?;
            if let Some(limit) = limit {
                config.suggest.limit = limit;
            }
            let fetcher = HttpSuggestionFetcher::from_config(&config.suggest, FormProfile::SingleField)?;
            // Unlike the form, a one-shot query reports failures.
            let results = fetcher.try_fetch(&query).await?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": results, "total": results.len(), "query": query },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if results.is_empty() {
                println!("No suggestions for: {query}");
            } else {
                let mut panel = SuggestionPanel::new(FormProfile::SingleField);
                panel.render(results);
                for row in panel.rows() {
                    println!("  {:<50}  {}", row.text, row.badge.text());
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({ "status": "ok", "data": config }))?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => {
                println!("{}", AppConfig::config_path().display());
            }
            ConfigAction::Init { force } => {
                let path = AppConfig::config_path();
                if path.exists() && !force {
                    return Err(SifaError::ConfigError(format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    ))
                    .into());
                }
                AppConfig::default().save_to(&path)?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn apply_overrides(
    config: &mut AppConfig,
    endpoint: Option<String>,
    provider: Option<Provider>,
) -> Result<()> {
    if let Some(endpoint) = endpoint {
        config.suggest.endpoint = endpoint;
    }
    if provider.is_some() {
        config.suggest.provider = provider;
    }
    config.suggest.validate()?;
    Ok(())
}

/// One-shot commands log to stderr. The terminal form owns the screen, so it
/// logs to a file instead.
fn init_logging(to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sifa=info"));

    if to_file {
        let dir = AppConfig::log_dir();
        std::fs::create_dir_all(&dir)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("sifa.log"))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if let Some(e) = err.downcast_ref::<SuggestError>() {
        if e.is_network() {
            return ExitCode::NetworkError;
        }
    }
    match err.downcast_ref::<SifaError>() {
        Some(SifaError::InvalidProvider(_) | SifaError::InvalidProfile(_)) => ExitCode::InvalidArgs,
        _ => ExitCode::GeneralError,
    }
}

/// Bad `--provider` / `--profile` values exit like the other invalid
/// arguments; everything else keeps clap's own code (0 for help, 2 for usage).
fn clap_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::ValueValidation | ErrorKind::InvalidValue => ExitCode::InvalidArgs as i32,
        _ => err.exit_code(),
    }
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_code(args: &[&str]) -> i32 {
        match Cli::try_parse_from(args) {
            Ok(_) => ExitCode::Success as i32,
            Err(e) => clap_exit_code(&e),
        }
    }

    #[test]
    fn bad_provider_or_profile_is_invalid_args() {
        assert_eq!(parse_code(&["sifa", "suggest", "ibu", "--provider", "bogus"]), 3);
        assert_eq!(parse_code(&["sifa", "form", "--profile", "triple"]), 3);
    }

    #[test]
    fn valid_values_parse() {
        assert_eq!(parse_code(&["sifa", "suggest", "ibu", "--provider", "cima"]), 0);
        assert_eq!(parse_code(&["sifa", "form", "--profile", "single"]), 0);
        assert_eq!(parse_code(&["sifa"]), 0);
    }

    #[test]
    fn usage_errors_keep_clap_code() {
        assert_eq!(parse_code(&["sifa", "suggest"]), 2);
        assert_eq!(parse_code(&["sifa", "frobnicate"]), 2);
        assert_eq!(parse_code(&["sifa", "--help"]), 0);
    }

    #[test]
    fn run_errors_map_to_exit_codes() {
        let bad = anyhow::Error::from(SifaError::InvalidProvider("x".to_string()));
        assert_eq!(exit_code_for(&bad) as i32, 3);

        let invalid_url = anyhow::Error::from(SuggestError::InvalidEndpoint(
            "/rel".to_string(),
            "relative URL".to_string(),
        ));
        assert_eq!(exit_code_for(&invalid_url) as i32, 1);
    }
}
