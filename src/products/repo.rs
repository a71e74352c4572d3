use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewProduct, Page, Product, ProductFilter, ProductPatch};

/// Persistence capability the handlers depend on.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Matching products in store-native order, windowed by `page`.
    async fn find(&self, filter: &ProductFilter, page: Page) -> anyhow::Result<Vec<Product>>;
    async fn count(&self, filter: &ProductFilter) -> anyhow::Result<u64>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>>;
    /// Assigns id and timestamps.
    async fn create(&self, new: NewProduct) -> anyhow::Result<Product>;
    /// Refreshes `updated_at`. `None` when no such record exists.
    async fn update_by_id(&self, id: Uuid, patch: ProductPatch) -> anyhow::Result<Option<Product>>;
    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>>;
}

#[derive(Clone)]
pub struct PgProductStore {
    db: PgPool,
}

impl PgProductStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// LIMIT/OFFSET bind values; Postgres wants signed integers.
fn sql_window(page: Page) -> (i64, i64) {
    let clamp = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
    (clamp(page.limit), clamp(page.skip()))
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find(&self, filter: &ProductFilter, page: Page) -> anyhow::Result<Vec<Product>> {
        let (limit, offset) = sql_window(page);
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category, in_stock, created_at, updated_at
            FROM products
            WHERE ($1::text IS NULL OR strpos(lower(category), lower($1)) > 0)
              AND ($2::text IS NULL OR strpos(lower(name), lower($2)) > 0)
            ORDER BY created_at ASC, id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.category.as_deref())
        .bind(filter.search.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list products")?;
        Ok(rows)
    }

    async fn count(&self, filter: &ProductFilter) -> anyhow::Result<u64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::text IS NULL OR strpos(lower(category), lower($1)) > 0)
              AND ($2::text IS NULL OR strpos(lower(name), lower($2)) > 0)
            "#,
        )
        .bind(filter.category.as_deref())
        .bind(filter.search.as_deref())
        .fetch_one(&self.db)
        .await
        .context("count products")?;
        Ok(total.max(0) as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category, in_stock, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get product")?;
        Ok(row)
    }

    async fn create(&self, new: NewProduct) -> anyhow::Result<Product> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, name, description, price, category, in_stock, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now(), now())
            RETURNING id, name, description, price, category, in_stock, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.name)
        .bind(new.description)
        .bind(new.price)
        .bind(new.category)
        .bind(new.in_stock)
        .fetch_one(&self.db)
        .await
        .context("insert product")?;
        Ok(row)
    }

    async fn update_by_id(&self, id: Uuid, patch: ProductPatch) -> anyhow::Result<Option<Product>> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
               SET name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   price = COALESCE($4, price),
                   category = COALESCE($5, category),
                   in_stock = COALESCE($6, in_stock),
                   updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
             WHERE id = $1
            RETURNING id, name, description, price, category, in_stock, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.price)
        .bind(patch.category)
        .bind(patch.in_stock)
        .fetch_optional(&self.db)
        .await
        .context("update product")?;
        Ok(row)
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            DELETE FROM products
             WHERE id = $1
            RETURNING id, name, description, price, category, in_stock, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("delete product")?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_converts_page_to_limit_offset() {
        assert_eq!(sql_window(Page::default()), (5, 0));
        assert_eq!(sql_window(Page { page: 4, limit: 10 }), (10, 30));
        assert_eq!(
            sql_window(Page { page: u64::MAX, limit: 100 }),
            (100, i64::MAX)
        );
    }

    // The tests below need a reachable Postgres via DATABASE_URL:
    // `cargo test -- --ignored`.

    fn item(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: format!("{name} description"),
            price: 2.5,
            category: category.into(),
            in_stock: true,
        }
    }

    async fn seed(store: &PgProductStore, items: &[(&str, &str)]) -> Vec<Product> {
        let mut out = Vec::new();
        for (name, category) in items {
            out.push(store.create(item(name, category)).await.unwrap());
            // keep created_at distinct so insertion order is unambiguous
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        out
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn filters_match_case_insensitive_substrings(pool: PgPool) {
        let store = PgProductStore::new(pool);
        seed(
            &store,
            &[("Blue Pen", "Stationery"), ("Pencil", "stationery"), ("Mug", "Kitchen")],
        )
        .await;

        let by_category = ProductFilter::new(Some("STATION".into()), None);
        assert_eq!(store.count(&by_category).await.unwrap(), 2);

        let by_name = ProductFilter::new(None, Some("pen".into()));
        let names: Vec<String> = store
            .find(&by_name, Page::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Blue Pen", "Pencil"]);

        // LIKE metacharacters are plain text here
        let literal = ProductFilter::new(Some("%".into()), None);
        assert_eq!(store.count(&literal).await.unwrap(), 0);

        let both = ProductFilter::new(Some("kitchen".into()), Some("pen".into()));
        assert_eq!(store.count(&both).await.unwrap(), 0);
        assert_eq!(store.count(&ProductFilter::default()).await.unwrap(), 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn pages_follow_insertion_order(pool: PgPool) {
        let store = PgProductStore::new(pool);
        let created = seed(
            &store,
            &[("a", "c"), ("b", "c"), ("c", "c"), ("d", "c"), ("e", "c")],
        )
        .await;

        let all = ProductFilter::default();
        let second = store.find(&all, Page { page: 2, limit: 2 }).await.unwrap();
        let ids: Vec<Uuid> = second.iter().map(|p| p.id).collect();
        assert_eq!(ids, [created[2].id, created[3].id]);

        let last = store.find(&all, Page { page: 3, limit: 2 }).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].id, created[4].id);

        assert!(store.find(&all, Page { page: 9, limit: 2 }).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn partial_update_keeps_unset_columns(pool: PgPool) {
        let store = PgProductStore::new(pool);
        let before = store.create(item("Pen", "Stationery")).await.unwrap();

        let patch = ProductPatch {
            price: Some(9.75),
            in_stock: Some(false),
            ..ProductPatch::default()
        };
        let after = store.update_by_id(before.id, patch).await.unwrap().unwrap();
        assert_eq!(after.name, before.name);
        assert_eq!(after.description, before.description);
        assert_eq!(after.category, before.category);
        assert_eq!(after.price, 9.75);
        assert!(!after.in_stock);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);

        let again = store
            .update_by_id(before.id, ProductPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert!(again.updated_at > after.updated_at);

        let missing = store.update_by_id(Uuid::new_v4(), ProductPatch::default()).await.unwrap();
        assert!(missing.is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn delete_returns_row_once(pool: PgPool) {
        let store = PgProductStore::new(pool);
        let product = store.create(item("Pen", "Stationery")).await.unwrap();

        let deleted = store.delete_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, product.id);
        assert!(store.delete_by_id(product.id).await.unwrap().is_none());
        assert!(store.find_by_id(product.id).await.unwrap().is_none());
    }
}
