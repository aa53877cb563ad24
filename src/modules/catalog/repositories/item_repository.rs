use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

use crate::core::Result;
use crate::modules::catalog::models::CatalogItem;

/// Read access to a tenant's catalog; the engine never mutates it
#[async_trait]
pub trait CatalogItemRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: i64, id: &str) -> Result<Option<CatalogItem>>;
}

pub struct MySqlCatalogItemRepository {
    pool: MySqlPool,
}

impl MySqlCatalogItemRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogItemRepository for MySqlCatalogItemRepository {
    async fn find_by_id(&self, tenant_id: i64, id: &str) -> Result<Option<CatalogItem>> {
        let row = sqlx::query(
            r#"
            SELECT id, tenant_id, code, name, description, unit, unit_price, tax_rate, created_at
            FROM catalog_items
            WHERE tenant_id = ? AND id = ?
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(CatalogItem {
            id: row.try_get("id")?,
            tenant_id: row.try_get("tenant_id")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            unit: row.try_get("unit")?,
            unit_price: row.try_get("unit_price")?,
            tax_rate: row.try_get("tax_rate")?,
            created_at: row.try_get("created_at")?,
        }))
    }
}
