use chrono::Local;
use clap::Parser;
use dotenvy::dotenv;
use messmate::{
    auth::{AccountAuth, AuthService},
    cli::{App, Cli},
    config::{self, database},
    core::{MessRepository, UserRepository, seed_menu},
    errors::Result,
    store::{DocumentStore, SeaOrmStore},
};
use std::{process::ExitCode, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Parse the command before touching the database; .env may supply credentials
    let cli = Cli::parse();
    let credentials = cli.credentials();

    // 4. Load the application configuration
    let app_config = config::load_default_config()?;
    info!("Loaded application configuration");

    // 5. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))?;

    // 6. Seed menu items listed in config.toml
    let store: Arc<dyn DocumentStore> = Arc::new(SeaOrmStore::new(db.clone()));
    seed_menu(store.as_ref(), &app_config.menu)
        .await
        .inspect_err(|e| error!("Failed to seed menu: {}", e))?;

    // 7. Run the command
    let auth: Arc<dyn AuthService> = Arc::new(AccountAuth::new(db));
    let settings = app_config.settings();
    let app = App {
        mess: MessRepository::new(Arc::clone(&store), Arc::clone(&auth), settings.clone()),
        users: UserRepository::new(store, auth, settings),
    };

    let today = Local::now().date_naive();
    match app.run(cli.command, credentials.as_ref(), today).await {
        Ok(outcome) if outcome.success => {
            println!("{}", outcome.text);
            Ok(ExitCode::SUCCESS)
        }
        Ok(outcome) => {
            eprintln!("{}", outcome.text);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
