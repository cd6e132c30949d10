use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::error::{self, ServiceError};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MONGODB_DATABASE: &str = "website";
const DEFAULT_SQLITE_PATH: &str = "contacts.db";
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const LOCAL_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:8000"];

/// Which storage backend the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendSelector {
    Hosted,
    Document,
    File,
    /// Nothing requested; decided from which credentials are present.
    Infer,
}

impl FromStr for BackendSelector {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supabase" | "hosted" => Ok(BackendSelector::Hosted),
            "mongodb" | "mongo" | "document" => Ok(BackendSelector::Document),
            "sqlite" | "file" => Ok(BackendSelector::File),
            "" => Ok(BackendSelector::Infer),
            other => Err(ServiceError::configuration(format!(
                "Unknown DB_BACKEND value '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub selector: BackendSelector,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub sqlite_path: PathBuf,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn has_hosted_credentials(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_key.is_some()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            selector: BackendSelector::Infer,
            supabase_url: None,
            supabase_key: None,
            mongodb_uri: None,
            mongodb_database: DEFAULT_MONGODB_DATABASE.to_string(),
            sqlite_path: PathBuf::from(DEFAULT_SQLITE_PATH),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
    /// Operator inbox that receives every new inquiry.
    pub business_email: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            email_user: None,
            email_pass: None,
            business_email: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub allowed_origins: Vec<String>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            mail: MailConfig::default(),
            allowed_origins: LOCAL_ORIGINS.iter().map(|x| x.to_string()).collect(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> error::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> error::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let selector = match get("DB_BACKEND") {
            Some(value) => value.parse()?,
            None => BackendSelector::Infer,
        };

        let connect_timeout = match get("DB_CONNECT_TIMEOUT_MS") {
            Some(value) => Duration::from_millis(value.parse().map_err(|_| {
                ServiceError::configuration(format!("DB_CONNECT_TIMEOUT_MS is not a number: {}", value))
            })?),
            None => Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        };

        let database = DatabaseConfig {
            selector,
            supabase_url: get("SUPABASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            supabase_key: get("SUPABASE_KEY"),
            mongodb_uri: get("MONGODB_URI"),
            mongodb_database: get("MONGODB_DATABASE")
                .unwrap_or_else(|| DEFAULT_MONGODB_DATABASE.to_string()),
            sqlite_path: get("SQLITE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_PATH)),
            connect_timeout,
        };

        let mail = MailConfig {
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            email_user: get("EMAIL_USER"),
            email_pass: get("EMAIL_PASS"),
            business_email: get("BUSINESS_EMAIL"),
        };

        let mut allowed_origins: Vec<String> = match get("FRONTEND_URL") {
            Some(value) => vec![parse_origin(&value)?],
            None => Vec::new(),
        };
        for origin in LOCAL_ORIGINS {
            if !allowed_origins.iter().any(|x| x == origin) {
                allowed_origins.push(origin.to_string());
            }
        }

        let port = match get("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ServiceError::configuration(format!("PORT is not a valid port: {}", value)))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            database,
            mail,
            allowed_origins,
            port,
        })
    }
}

/// Reduces `value` to a CORS origin (`scheme://host[:port]`). Anything with a
/// path, query or non-http scheme is rejected.
fn parse_origin(value: &str) -> error::Result<String> {
    let invalid = || ServiceError::configuration(format!("FRONTEND_URL is not a valid origin: {}", value));

    let url = reqwest::Url::parse(value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https")
        || url.host_str().is_none()
        || !matches!(url.path(), "" | "/")
        || url.query().is_some()
        || url.fragment().is_some()
    {
        return Err(invalid());
    }
    Ok(url.origin().ascii_serialization())
}
