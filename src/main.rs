use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use story_report_client::api::auth::{SessionStore, DEFAULT_ACCOUNT};
use story_report_client::api::normalize::has_error_flag;
use story_report_client::api::token::{StaticToken, TokenProvider};
use story_report_client::api::types::{
    Credentials, NewReport, Photo, PushKeys, PushSubscription, ReportQuery,
};
use story_report_client::api::{self, ApiClient};
use story_report_client::ClientConfig;

#[derive(Parser, Debug)]
#[command(name = "story-report-client", version, about = "Story report backend client")]
struct Cli {
    /// Backend base URL (overrides STORY_API_URL / API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Access token to use instead of the keychain session
    #[arg(long, global = true, env = "STORY_ACCESS_TOKEN")]
    token: Option<String>,

    /// Keychain account holding the session token
    #[arg(long, global = true, default_value = DEFAULT_ACCOUNT)]
    account: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and store the session token in the keychain
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Remove the stored session token
    Logout,
    /// Show the current user's profile
    Me,
    /// List stories
    Stories {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
        /// Only stories with a location (true) or without filtering (false)
        #[arg(long)]
        location: Option<bool>,
    },
    /// Post a new story with a photo
    Post {
        #[arg(long)]
        description: String,
        #[arg(long)]
        photo: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Subscribe a web push endpoint
    Subscribe {
        #[arg(long)]
        endpoint: String,
        #[arg(long)]
        p256dh: String,
        #[arg(long)]
        auth: String,
    },
    /// Unsubscribe a web push endpoint
    Unsubscribe {
        #[arg(long)]
        endpoint: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before parsing so STORY_ACCESS_TOKEN can come from it
    let _ = dotenvy::dotenv();
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run one command. Returns whether the backend reported success.
async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env()?;
    if let Some(ref url) = cli.base_url {
        config = config.with_base_url(url);
    }
    log::info!("Using story API at {}", config.base_url);

    let session = Arc::new(SessionStore::open(cli.account.clone())?);
    let tokens: Arc<dyn TokenProvider> = match cli.token {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => session.clone(),
    };
    let client = ApiClient::from_config(&config, tokens)?;

    match cli.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            let credentials = Credentials {
                name: Some(name),
                email,
                password,
            };
            let result = api::register(&client, &credentials).await?;
            print_json(&result)?;
            Ok(result.ok)
        }
        Command::Login { email, password } => {
            let credentials = Credentials {
                name: None,
                email,
                password,
            };
            let result = api::login(&client, &credentials).await;
            print_json(&result)?;
            if result.ok {
                match session_token(&result.data) {
                    Some(token) => {
                        session.save(token)?;
                        log::info!("Session stored for account {}", cli.account);
                    }
                    None => log::warn!("Login response carried no token"),
                }
            }
            Ok(result.ok)
        }
        Command::Logout => {
            session.clear()?;
            log::info!("Session removed for account {}", cli.account);
            Ok(true)
        }
        Command::Me => {
            let result = api::my_user_info(&client).await?;
            print_json(&result)?;
            Ok(result.ok)
        }
        Command::Stories {
            page,
            size,
            location,
        } => {
            let query = ReportQuery {
                page,
                size,
                location,
            };
            let result = api::get_all_reports(&client, &query).await;
            print_json(&result)?;
            Ok(result.ok)
        }
        Command::Post {
            description,
            photo,
            lat,
            lon,
        } => {
            let photo = Photo::from_path(&photo)
                .map_err(|e| format!("Failed to read photo {}: {}", photo.display(), e))?;
            let report = NewReport {
                description,
                photo,
                lat,
                lon,
            };
            let result = api::store_new_report(&client, &report).await;
            print_json(&result)?;
            Ok(result.ok)
        }
        Command::Subscribe {
            endpoint,
            p256dh,
            auth,
        } => {
            let subscription = PushSubscription {
                endpoint,
                keys: PushKeys { p256dh, auth },
            };
            let body = api::subscribe_push_notification(&client, &subscription).await?;
            print_json(&body)?;
            Ok(!body_has_error(&body))
        }
        Command::Unsubscribe { endpoint } => {
            let body = api::unsubscribe_push_notification(&client, &endpoint).await?;
            print_json(&body)?;
            Ok(!body_has_error(&body))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Token from a login `data` value: `loginResult.token` or a top-level `token`.
fn session_token(data: &Value) -> Option<&str> {
    data.get("loginResult")
        .and_then(|r| r.get("token"))
        .or_else(|| data.get("token"))
        .and_then(Value::as_str)
}

/// Push bodies use the same truthy `error` flag as the other operations.
fn body_has_error(body: &Value) -> bool {
    has_error_flag(body)
}
