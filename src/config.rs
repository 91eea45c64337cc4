use crate::dotenv;
use crate::error::Error;

pub static DATABASE_URL: &str = "DATABASE_URL";
pub static ADMIN_TOKEN: &str = "ADMIN_TOKEN";
pub static BIND_ADDR: &str = "BIND_ADDR";
pub static PORT: &str = "PORT";
pub static DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub static DEFAULT_LABEL_PREFIX: &str = "DEFAULT_LABEL_PREFIX";
pub static DEDUPE_BY_IP: &str = "DEDUPE_BY_IP";

/// Process-wide settings, read once at startup and shared read-only through `web::Data`.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub admin_token: String,
    pub bind_addr: String,
    pub port: u16,
    pub max_connections: u32,
    pub label_prefix: String,
    pub dedupe_by_ip: bool,
}

impl Config {
    /// Loads `.env` when present, then reads the process environment. A
    /// missing `.env` is fine; a malformed one is an error.
    pub fn from_env() -> Result<Self, Error> {
        if let Err(e) = dotenv::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::ServerError(format!("environment variable {} not been set", key)))
        };
        let parsed = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        Ok(Self {
            database_url: required(DATABASE_URL)?,
            admin_token: required(ADMIN_TOKEN)?,
            bind_addr: parsed(BIND_ADDR, "0.0.0.0"),
            port: parsed(PORT, "8000")
                .parse()
                .map_err(|_| Error::ServerError(format!("{} must be a port number", PORT)))?,
            max_connections: parsed(DB_MAX_CONNECTIONS, "5")
                .parse()
                .map_err(|_| Error::ServerError(format!("{} must be a positive integer", DB_MAX_CONNECTIONS)))?,
            label_prefix: parsed(DEFAULT_LABEL_PREFIX, "Soru"),
            dedupe_by_ip: !matches!(parsed(DEDUPE_BY_IP, "true").trim().to_lowercase().as_str(), "false" | "0" | "no" | "off"),
        })
    }
}
