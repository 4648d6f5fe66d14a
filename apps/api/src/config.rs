use anyhow::{bail, Context, Result};

const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if a variable required by the selected backend is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub port: u16,
    pub rust_log: String,
    pub session_ttl_secs: u64,
    pub max_resume_bytes: usize,
}

/// Where users, jobs, sessions and resumes live.
#[derive(Debug, Clone)]
pub enum Backend {
    /// In-process stores. Nothing survives a restart.
    Memory,
    Postgres(InfraConfig),
}

/// Connection settings for PostgreSQL, Redis and S3 / MinIO.
#[derive(Debug, Clone)]
pub struct InfraConfig {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => Backend::Postgres(InfraConfig {
                database_url: require_var(&lookup, "DATABASE_URL")?,
                redis_url: require_var(&lookup, "REDIS_URL")?,
                s3_bucket: require_var(&lookup, "S3_BUCKET")?,
                s3_endpoint: require_var(&lookup, "S3_ENDPOINT")?,
                aws_access_key_id: require_var(&lookup, "AWS_ACCESS_KEY_ID")?,
                aws_secret_access_key: require_var(&lookup, "AWS_SECRET_ACCESS_KEY")?,
            }),
            Some("memory") => Backend::Memory,
            Some(other) => bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let session_ttl_secs = match lookup("SESSION_TTL_SECS") {
            Some(v) => v
                .parse()
                .context("SESSION_TTL_SECS must be a whole number of seconds")?,
            None => DEFAULT_SESSION_TTL_SECS,
        };
        if session_ttl_secs == 0 {
            bail!("SESSION_TTL_SECS must be greater than zero");
        }

        Ok(Config {
            backend,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            session_ttl_secs,
            max_resume_bytes: match lookup("MAX_RESUME_BYTES") {
                Some(v) => v.parse().context("MAX_RESUME_BYTES must be a byte count")?,
                None => DEFAULT_MAX_RESUME_BYTES,
            },
        })
    }

    /// In-memory configuration with default limits.
    #[cfg(test)]
    pub fn memory() -> Self {
        Config {
            backend: Backend::Memory,
            port: 8080,
            rust_log: "info".to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            max_resume_bytes: DEFAULT_MAX_RESUME_BYTES,
        }
    }
}

fn require_var<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
