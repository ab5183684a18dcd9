use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Account created on startup when no user with `email` exists yet.
#[derive(Debug, Clone, Deserialize)]
pub struct FirstSuperuser {
    pub email: String,
    pub password: String,
}

/// HTTP email API settings. Present only when emails are enabled.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub project_name: String,
    /// `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub first_superuser: Option<FirstSuperuser>,
    pub emails: Option<EmailConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let project_name = get("PROJECT_NAME").unwrap_or_else(|| "blogapi".into());
        let database_url = get("DATABASE_URL").filter(|v| !v.trim().is_empty());

        let jwt = JwtConfig {
            secret: get("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "blogapi".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "blogapi-users".into()),
            ttl_minutes: get("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: get("JWT_REFRESH_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };

        let first_superuser = match (get("FIRST_SUPERUSER"), get("FIRST_SUPERUSER_PASSWORD")) {
            (Some(email), Some(password)) => Some(FirstSuperuser {
                email: email.trim().to_lowercase(),
                password,
            }),
            (None, None) => None,
            _ => anyhow::bail!("FIRST_SUPERUSER and FIRST_SUPERUSER_PASSWORD must be set together"),
        };

        let emails_enabled = get("EMAILS_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let emails = if emails_enabled {
            Some(EmailConfig {
                api_url: get("EMAIL_API_URL")
                    .context("EMAIL_API_URL must be set when EMAILS_ENABLED is on")?,
                api_key: get("EMAIL_API_KEY"),
                from: get("EMAILS_FROM").unwrap_or_else(|| format!("noreply@{project_name}.local")),
            })
        } else {
            None
        };

        Ok(Self {
            project_name,
            database_url,
            jwt,
            first_superuser,
            emails,
        })
    }
}
