use super::{non_blank, ConfigError};

pub const DEFAULT_PORT: u16 = 4000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Host used for public upload URLs when the request carries none.
    pub public_host: String,
    pub cors_allowed_origins: Option<Vec<String>>,
    /// Honour `X-Forwarded-Host`; only safe behind a proxy that sets it.
    pub trust_forwarded_host: bool,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match non_blank(&lookup, "PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                expected: "a valid u16",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let public_host =
            non_blank(&lookup, "PUBLIC_HOST").unwrap_or_else(|| format!("localhost:{}", port));

        let cors_allowed_origins = non_blank(&lookup, "CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        });

        let trust_forwarded_host = match non_blank(&lookup, "TRUST_FORWARDED_HOST") {
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "TRUST_FORWARDED_HOST",
                        expected: "a boolean",
                        value: raw,
                    })
                }
            },
            None => false,
        };

        Ok(Self {
            port,
            public_host,
            cors_allowed_origins,
            trust_forwarded_host,
            database_url: non_blank(&lookup, "DATABASE_URL"),
            jwt_secret: non_blank(&lookup, "JWT_SECRET"),
        })
    }
}
