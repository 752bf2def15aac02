// src/core/config.rs
use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Configuration for the web services
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Session
    pub session_duration: Duration,
    pub persistence_duration: Duration,

    // Web Interface
    pub web_port: u16,
    pub web_address: String,
    /// Base URL used when building links placed in outgoing e-mail.
    pub public_base_url: String,

    // Outbound mail
    pub mail_relay_url: Option<String>,
    pub mail_from: String,

    // Localization
    pub default_lang: String,

    // Logging
    pub log_level: LevelFilter,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/familytree.db".to_string(),

            session_duration: Duration::from_secs(60 * 60), // 1 hour
            persistence_duration: Duration::from_secs(60 * 60 * 24 * 7), // 7 days

            web_port: 5000,
            web_address: "127.0.0.1".to_string(),
            public_base_url: "http://localhost:5000".to_string(),

            mail_relay_url: None,
            mail_from: "webmaster@familytree.example".to_string(),

            default_lang: "en".to_string(),

            log_level: LevelFilter::Info,
            log_dir: PathBuf::from("./logs"),
        }
    }
}

impl Config {
    // Load configuration from environment variables
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(val) = env::var("SESSION_DURATION_MINUTES") {
            if let Ok(minutes) = val.parse::<u64>() {
                config.session_duration = Duration::from_secs(minutes * 60);
            }
        }

        if let Ok(val) = env::var("PERSISTENCE_DURATION_DAYS") {
            if let Ok(days) = val.parse::<u64>() {
                config.persistence_duration = Duration::from_secs(days * 60 * 60 * 24);
            }
        }

        if let Ok(val) = env::var("WEB_PORT") {
            if let Ok(port) = val.parse() {
                config.web_port = port;
            }
        }

        if let Ok(address) = env::var("WEB_ADDRESS") {
            config.web_address = address;
        }

        if let Ok(url) = env::var("PUBLIC_BASE_URL") {
            config.public_base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(url) = env::var("MAIL_RELAY_URL") {
            if !url.trim().is_empty() {
                config.mail_relay_url = Some(url);
            }
        }

        if let Ok(from) = env::var("MAIL_FROM") {
            config.mail_from = from;
        }

        if let Ok(lang) = env::var("DEFAULT_LANG") {
            if lang.len() >= 2 {
                config.default_lang = lang[..2].to_lowercase();
            }
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            match level.to_lowercase().as_str() {
                "error" => config.log_level = LevelFilter::Error,
                "warn" => config.log_level = LevelFilter::Warn,
                "info" => config.log_level = LevelFilter::Info,
                "debug" => config.log_level = LevelFilter::Debug,
                "trace" => config.log_level = LevelFilter::Trace,
                _ => {}
            }
        }

        if let Ok(dir) = env::var("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        config
    }

    // Create directories needed for operation
    pub fn ensure_directories_exist(&self) {
        if !self.log_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.log_dir) {
                log::warn!("Failed to create log directory: {}", e);
            }
        }

        // Ensure the SQLite database directory exists if using SQLite
        if self.database_url.starts_with("sqlite:") {
            let db_path = PathBuf::from(&self.database_url[7..]);
            if let Some(parent) = db_path.parent() {
                if !parent.exists() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        log::warn!("Failed to create SQLite database directory: {}", e);
                    }
                }
            }
        }
    }
}
