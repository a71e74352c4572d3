use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::products::{memory::MemoryProductStore, repo::PgProductStore, ProductStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = match &config.store {
            StoreBackend::Postgres {
                database_url,
                max_connections,
            } => {
                let pool = db::connect(database_url, *max_connections).await?;
                db::migrate(&pool).await?;
                Arc::new(PgProductStore::new(pool)) as Arc<dyn ProductStore>
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory product store; data is lost on restart");
                Arc::new(MemoryProductStore::new()) as Arc<dyn ProductStore>
            }
        };

        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn ProductStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }
}
