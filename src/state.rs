use crate::config::AppConfig;
use crate::mail::{DisabledMailer, HttpMailer, Mailer};
use crate::store::{memory::InMemoryStore, postgres::PgStore, Store};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.database_url {
            Some(url) => Arc::new(PgStore::connect(url).await?) as Arc<dyn Store>,
            None => {
                warn!("DATABASE_URL not set; using the in-memory store, data is lost on restart");
                Arc::new(InMemoryStore::new()) as Arc<dyn Store>
            }
        };

        let mailer = match &config.emails {
            Some(cfg) => Arc::new(HttpMailer::new(cfg.clone())?) as Arc<dyn Mailer>,
            None => Arc::new(DisabledMailer) as Arc<dyn Mailer>,
        };

        Ok(Self {
            store,
            config,
            mailer,
        })
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store,
            config,
            mailer,
        }
    }

    /// In-memory store, test JWT settings, emails disabled.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            project_name: "blogapi".into(),
            database_url: None,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            first_superuser: None,
            emails: None,
        });

        Self {
            store: Arc::new(InMemoryStore::new()),
            config,
            mailer: Arc::new(DisabledMailer),
        }
    }
}
