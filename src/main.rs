use clap::Parser;
use std::io;
use std::path::Path;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

mod api;
mod cli;
mod core;
mod db;
mod logging;
mod mailer;
mod messages;
mod models;
mod recovery;
mod utils;

use crate::cli::Args;
use crate::core::auth::AuthManager;
use crate::core::config::Config;
use crate::core::AppState;
use crate::logging::Logger;
use crate::mailer::Mailer;

#[tokio::main]
async fn main() -> Result<(), io::Error> {
    if Path::new(".env").exists() {
        dotenvy::dotenv().ok();
    }

    let args = Args::parse();
    let config = Config::load();
    config.ensure_directories_exist();

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .format_timestamp_secs()
        .format_target(true)
        .init();

    log::info!("🌳 Starting FamilyTree web services");

    let db_url = if args.db.is_empty() {
        config.database_url.clone()
    } else {
        args.db.clone()
    };

    let db = match db::init_db(&db_url).await {
        Ok(db) => {
            log::info!("✅ Database connection successful ({})", db.get_backend_type());
            db
        }
        Err(e) => {
            eprintln!("❌ Database connection failed: {e}");
            eprintln!("Troubleshooting:");
            eprintln!("• Is your DB server running?");
            eprintln!("• Are credentials correct?");
            eprintln!("• For SQLite: does the path exist?");
            eprintln!("• Use --db or set DATABASE_URL in `.env`");
            return Ok(());
        }
    };

    let logger = match Logger::new(config.log_dir.clone()) {
        Ok(logger) => Arc::new(logger),
        Err(e) => {
            eprintln!("❌ Failed to open application log: {e}");
            return Ok(());
        }
    };

    let state = AppState {
        auth: AuthManager::new(&config),
        mailer: Mailer::from_config(&config),
        db,
        logger,
        config: config.clone(),
    };

    // one-shot administrative commands run and exit
    if let Some(command) = &args.command {
        return cli::commands::run(command, &state).await.map_err(|e| {
            log::error!("Command failed: {}", e);
            io::Error::new(io::ErrorKind::Other, e.to_string())
        });
    }

    let should_exit = Arc::new(AtomicBool::new(false));
    {
        let should_exit = Arc::clone(&should_exit);
        ctrlc::set_handler(move || {
            log::info!("🔴 Ctrl+C received. Initiating shutdown...");
            should_exit.store(true, Ordering::SeqCst);
            std::process::exit(0);
        })
        .expect("Failed to set Ctrl+C handler");
    }

    // Periodic cleanup of expired sessions and reset codes
    {
        let db = state.db.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                match db.purge_expired_sessions().await {
                    Ok(0) => {}
                    Ok(purged) => log::info!("Purged {} expired session(s)", purged),
                    Err(e) => log::warn!("Session purge failed: {}", e),
                }
                let dropped = recovery::cleanup_expired_codes();
                if dropped > 0 {
                    log::info!("Dropped {} expired reset code(s)", dropped);
                }
            }
        });
    }

    let api_port = args.api_port.unwrap_or(config.web_port);

    // API-only mode (blocks forever)
    if args.api_only {
        log::info!("🌐 API-only mode active. Administrator CLI disabled.");
        return api::start_server(state, api_port).await.map_err(|e| {
            log::error!("API server failed: {}", e);
            io::Error::new(io::ErrorKind::Other, e.to_string())
        });
    }

    // Start the API server on a separate thread with its own runtime,
    // leaving this one to the interactive CLI
    {
        let server_state = state.clone();
        std::thread::spawn(move || match tokio::runtime::Runtime::new() {
            Ok(rt) => {
                rt.block_on(async {
                    if let Err(e) = api::start_server(server_state, api_port).await {
                        log::error!("API server error: {:?}", e);
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to create tokio runtime: {:?}", e);
            }
        });
        log::info!("🚀 API server started on port {}", api_port);
    }

    cli::menu::run_cli_menu(state, should_exit).await.map_err(|e| {
        log::error!("CLI menu error: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;

    log::info!("✅ FamilyTree shutdown complete.");

    Ok(())
}
