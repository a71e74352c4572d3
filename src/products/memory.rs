use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::ProductStore;
use super::repo_types::{NewProduct, Page, Product, ProductFilter, ProductPatch};

/// Process-local store. Records are kept in insertion order.
#[derive(Default)]
pub struct MemoryProductStore {
    records: RwLock<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find(&self, filter: &ProductFilter, page: Page) -> anyhow::Result<Vec<Product>> {
        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|p| filter.matches(p))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> anyhow::Result<u64> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, new: NewProduct) -> anyhow::Result<Product> {
        let now = OffsetDateTime::now_utc();
        let product = Product {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            price: new.price,
            category: new.category,
            in_stock: new.in_stock,
            created_at: now,
            updated_at: now,
        };
        self.records.write().await.push(product.clone());
        Ok(product)
    }

    async fn update_by_id(&self, id: Uuid, patch: ProductPatch) -> anyhow::Result<Option<Product>> {
        let mut records = self.records.write().await;
        let Some(product) = records.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        patch.apply(product);
        // updated_at must move forward even when the clock hasn't
        let now = OffsetDateTime::now_utc();
        product.updated_at = if now > product.updated_at {
            now
        } else {
            product.updated_at + Duration::microseconds(1)
        };
        Ok(Some(product.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let mut records = self.records.write().await;
        let idx = records.iter().position(|p| p.id == id);
        Ok(idx.map(|i| records.remove(i)))
    }
}
