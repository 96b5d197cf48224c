use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use clan_rating::config::RankingParameters;
use clan_rating::discord::DiscordClient;
use clan_rating::evaluation::{evaluate, fetch_inputs, notify, publish};
use clan_rating::sheets::SheetStore;
use clan_rating::RatingError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_DATA: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rate all clan members and publish the results (default if no subcommand)
    Evaluate {
        /// Compute and print the ranking without writing files, sheets or notifications
        #[arg(long)]
        dry_run: bool,

        /// Keep sheets as ;-separated files in this directory instead of Google Sheets
        #[arg(long, value_name = "DIR", env = "CLAN_RATING_SHEETS_DIR")]
        sheets_dir: Option<PathBuf>,

        /// Do not announce pending promotions
        #[arg(long)]
        no_notify: bool,
    },
    /// Validate the config and print the rating weights in effect right now
    Check,
}

#[derive(Parser, Debug)]
#[command(name = "clan-rating")]
#[command(about = "Clan member performance rating CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/clan-rating/ranking_parameters.yaml)
    #[arg(short, long, global = true, env = "CLAN_RATING_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(e: &anyhow::Error) -> i32 {
    if e.downcast_ref::<RatingError>().is_some() {
        EXIT_DATA
    } else {
        EXIT_NETWORK
    }
}

struct RunOptions {
    dry_run: bool,
    discord: Option<DiscordClient>,
}

async fn run<S: SheetStore>(
    api: &clan_rating::clan::RoyaleApi,
    store: &S,
    params: &RankingParameters,
    options: &RunOptions,
) -> anyhow::Result<()> {
    let inputs = fetch_inputs(api, store, params).await?;
    let now = Utc::now();
    let evaluation = evaluate(inputs, params, now)?;

    let use_colors = clan_rating::output::should_use_colors();
    println!(
        "{}",
        clan_rating::output::format_ranking_table(&evaluation.ranked, use_colors)
    );

    if options.dry_run {
        warn!("Dry run, nothing was written");
        return Ok(());
    }
    publish(&evaluation, store, params, now).await?;
    notify(&evaluation, options.discord.as_ref(), params).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Evaluate {
        dry_run: false,
        sheets_dir: None,
        no_notify: false,
    });
    let start_time = Instant::now();

    // Load config
    let params = match clan_rating::config::load_config(cli.config) {
        Ok(p) => p,
        Err(e) => {
            error!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate ranking parameters at startup
    if let Err(errors) = clan_rating::scoring::validate_parameters(&params) {
        error!("Ranking parameter errors:");
        for e in errors {
            error!("  - {}", e);
        }
        std::process::exit(EXIT_CONFIG);
    }

    match command {
        Commands::Check => {
            match clan_rating::evaluation::redistribute_weights(params.rating_weights, Utc::now()) {
                Ok((weights, war, season)) => {
                    println!("War progress:    {:.3}", war);
                    println!("Season progress: {:.3}", season);
                    println!();
                    println!("{}", clan_rating::output::format_weights(&weights));
                    println!();
                    println!("{}", weights.formula());
                }
                Err(e) => {
                    error!("{}", e);
                    std::process::exit(EXIT_DATA);
                }
            }
        }
        Commands::Evaluate {
            dry_run,
            sheets_dir,
            no_notify,
        } => {
            let creds = match clan_rating::credentials::Credentials::from_env(sheets_dir.is_none()) {
                Ok(c) => c,
                Err(e) => {
                    error!("Credential error: {}", e);
                    std::process::exit(EXIT_AUTH);
                }
            };

            let client = match clan_rating::clan::create_client(&creds.api_token) {
                Ok(c) => c,
                Err(e) => {
                    error!("Failed to create game API client: {:#}", e);
                    std::process::exit(EXIT_NETWORK);
                }
            };
            let api = clan_rating::clan::RoyaleApi::new(client, params.api_endpoint(), &params.clan_tag);

            let discord = match (&creds.discord_webhook, no_notify || dry_run) {
                (_, true) => None,
                (Some(webhook), false) => match DiscordClient::new(webhook) {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("{:#}", e);
                        std::process::exit(EXIT_NETWORK);
                    }
                },
                (None, false) => {
                    warn!(
                        "{} is not set, promotions will not be announced",
                        clan_rating::credentials::ENV_DISCORD_WEBHOOK
                    );
                    None
                }
            };
            let options = RunOptions { dry_run, discord };

            let result = match (sheets_dir, &creds.sheets) {
                (Some(dir), _) => {
                    debug!("Using sheets in {}", dir.display());
                    let store = clan_rating::sheets::DirectorySheetStore::new(dir);
                    run(&api, &store, &params, &options).await
                }
                (None, Some(sheets)) => {
                    match clan_rating::sheets::GoogleSheetsStore::new(
                        &sheets.spreadsheet_id,
                        &sheets.access_token,
                    ) {
                        Ok(store) => run(&api, &store, &params, &options).await,
                        Err(e) => Err(e),
                    }
                }
                (None, None) => {
                    // from_env requires sheets credentials without a sheets directory
                    error!("No sheet store configured");
                    std::process::exit(EXIT_AUTH);
                }
            };

            if let Err(e) = result {
                error!("{:#}", e);
                std::process::exit(exit_code(&e));
            }
            debug!("Evaluation of {} finished in {:?}", params.clan_tag, start_time.elapsed());
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_paths_from_environment() {
        std::env::set_var("CLAN_RATING_CONFIG", "/tmp/clan-rating-env.yaml");
        std::env::set_var("CLAN_RATING_SHEETS_DIR", "/tmp/clan-rating-sheets");
        let cli = Cli::try_parse_from(["clan-rating", "evaluate"]).unwrap();
        std::env::remove_var("CLAN_RATING_CONFIG");
        std::env::remove_var("CLAN_RATING_SHEETS_DIR");

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/clan-rating-env.yaml")));
        match cli.command {
            Some(Commands::Evaluate { sheets_dir, .. }) => {
                assert_eq!(sheets_dir, Some(PathBuf::from("/tmp/clan-rating-sheets")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
