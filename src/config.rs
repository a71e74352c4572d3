use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// Only the token settings; `None` when `JWT_SECRET` is unset.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(var: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        var("JWT_SECRET").map(|secret| Self {
            secret,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "product-api".into()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "product-api-clients".into()),
        })
    }
}

/// Where product documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub api_key: Option<String>,
    pub jwt: Option<JwtConfig>,
    /// Include raw error text in 4xx/5xx bodies caused by store failures.
    pub expose_error_details: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt = JwtConfig::from_lookup(&var);
        // blank values count as unset
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let store = match var("STORE_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => StoreBackend::Postgres {
                database_url: var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: var("DB_MAX_CONNECTIONS")
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10),
            },
            "memory" => StoreBackend::Memory,
            other => anyhow::bail!("unknown STORE_BACKEND {other:?} (expected postgres or memory)"),
        };

        let api_key = var("API_KEY");
        if jwt.is_none() && api_key.is_none() {
            anyhow::bail!("no credentials configured: set API_KEY and/or JWT_SECRET");
        }

        let port = match var("APP_PORT").or_else(|| var("PORT")) {
            Some(p) => p.parse::<u16>().with_context(|| format!("invalid port {p:?}"))?,
            None => 4000,
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            store,
            api_key,
            jwt,
            expose_error_details: var("EXPOSE_ERROR_DETAILS")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off"))
                .unwrap_or(true),
        })
    }
}
