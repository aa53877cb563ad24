// Document persistence.
//
// `insert_with_lines` writes the document and its lines in one transaction;
// the UNIQUE (tenant_id, kind, document_number) index is the serialization
// point for concurrent number assignment, surfaced to the caller as
// Ok(false) so the creating service can recompute and retry.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::str::FromStr;

use crate::core::{EngineError, Result};
use crate::modules::documents::models::{
    DocumentKind, DocumentLine, DocumentStatus, FinancialDocument,
};
use crate::modules::documents::services::sequencer::PeriodKey;

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Highest sequence already used for the (tenant, kind, period) triple;
    /// 0 when the period is empty
    async fn highest_sequence(
        &self,
        tenant_id: i64,
        kind: DocumentKind,
        period: &PeriodKey,
    ) -> Result<u32>;

    /// Atomically insert the document and its lines.
    ///
    /// Returns Ok(false) when the document number is already taken for the
    /// tenant and kind (the caller retries with a fresh number); any other
    /// failure rolls back and propagates.
    async fn insert_with_lines(
        &self,
        document: &FinancialDocument,
        lines: &[DocumentLine],
    ) -> Result<bool>;

    async fn find_by_id(&self, tenant_id: i64, id: &str) -> Result<Option<FinancialDocument>>;

    async fn find_lines(&self, document_id: &str) -> Result<Vec<DocumentLine>>;

    /// Persist a manual status transition (vocabulary checks are the
    /// service's job)
    async fn update_status(&self, tenant_id: i64, id: &str, status: DocumentStatus) -> Result<()>;
}

pub struct MySqlDocumentRepository {
    pool: MySqlPool,
}

impl MySqlDocumentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_document(row: &MySqlRow) -> Result<FinancialDocument> {
        let kind: String = row.try_get("kind")?;
        let status: String = row.try_get("status")?;

        Ok(FinancialDocument {
            id: row.try_get("id")?,
            tenant_id: row.try_get("tenant_id")?,
            kind: DocumentKind::from_str(&kind)
                .map_err(|e| EngineError::internal(format!("Invalid kind in database: {}", e)))?,
            document_number: row.try_get("document_number")?,
            client_id: row.try_get("client_id")?,
            site_id: row.try_get("site_id")?,
            status: DocumentStatus::from_str(&status)
                .map_err(|e| EngineError::internal(format!("Invalid status in database: {}", e)))?,
            subtotal: row.try_get("subtotal")?,
            discount_percentage: row.try_get("discount_percentage")?,
            discount_amount: row.try_get("discount_amount")?,
            total_ht: row.try_get("total_ht")?,
            tax_amount: row.try_get("tax_amount")?,
            total_ttc: row.try_get("total_ttc")?,
            remaining_balance: row.try_get("remaining_balance")?,
            amount_in_words: row.try_get("amount_in_words")?,
            issued_date: row.try_get("issued_date")?,
            due_date: row.try_get("due_date")?,
            project_description: row.try_get("project_description")?,
            contract_number: row.try_get("contract_number")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_line(row: &MySqlRow) -> Result<DocumentLine> {
        Ok(DocumentLine {
            id: row.try_get("id")?,
            document_id: row.try_get("document_id")?,
            item_id: row.try_get("item_id")?,
            item_code: row.try_get("item_code")?,
            item_name: row.try_get("item_name")?,
            item_description: row.try_get("item_description")?,
            unit: row.try_get("unit")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            tax_rate: row.try_get("tax_rate")?,
            subtotal: row.try_get("subtotal")?,
            tax_amount: row.try_get("tax_amount")?,
            total: row.try_get("total")?,
            position: row.try_get("position")?,
        })
    }
}

#[async_trait]
impl DocumentRepository for MySqlDocumentRepository {
    async fn highest_sequence(
        &self,
        tenant_id: i64,
        kind: DocumentKind,
        period: &PeriodKey,
    ) -> Result<u32> {
        // the sequence is everything after the `{yyyy}-{mm}-` prefix
        let max: Option<u64> = sqlx::query_scalar(
            r#"
            SELECT MAX(CAST(SUBSTRING(document_number, 9) AS UNSIGNED))
            FROM documents
            WHERE tenant_id = ? AND kind = ? AND document_number LIKE ?
            "#,
        )
        .bind(tenant_id)
        .bind(kind.as_str())
        .bind(format!("{}-%", period.prefix()))
        .fetch_one(&self.pool)
        .await?;

        Ok(max.unwrap_or(0) as u32)
    }

    async fn insert_with_lines(
        &self,
        document: &FinancialDocument,
        lines: &[DocumentLine],
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO documents (
                id, tenant_id, kind, document_number, client_id, site_id, status,
                subtotal, discount_percentage, discount_amount, total_ht, tax_amount,
                total_ttc, remaining_balance, amount_in_words, issued_date, due_date,
                project_description, contract_number, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&document.id)
        .bind(document.tenant_id)
        .bind(document.kind.as_str())
        .bind(&document.document_number)
        .bind(document.client_id)
        .bind(document.site_id)
        .bind(document.status.as_str())
        .bind(document.subtotal)
        .bind(document.discount_percentage)
        .bind(document.discount_amount)
        .bind(document.total_ht)
        .bind(document.tax_amount)
        .bind(document.total_ttc)
        .bind(document.remaining_balance)
        .bind(&document.amount_in_words)
        .bind(document.issued_date)
        .bind(document.due_date)
        .bind(&document.project_description)
        .bind(&document.contract_number)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    tx.rollback().await?;
                    return Ok(false);
                }
            }
            return Err(e.into());
        }

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO document_lines (
                    id, document_id, item_id, item_code, item_name, item_description,
                    unit, quantity, unit_price, tax_rate, subtotal, tax_amount, total,
                    position
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&line.id)
            .bind(&document.id)
            .bind(&line.item_id)
            .bind(&line.item_code)
            .bind(&line.item_name)
            .bind(&line.item_description)
            .bind(&line.unit)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.tax_rate)
            .bind(line.subtotal)
            .bind(line.tax_amount)
            .bind(line.total)
            .bind(line.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn find_by_id(&self, tenant_id: i64, id: &str) -> Result<Option<FinancialDocument>> {
        let row = sqlx::query(
            r#"
            SELECT id, tenant_id, kind, document_number, client_id, site_id, status,
                   subtotal, discount_percentage, discount_amount, total_ht, tax_amount,
                   total_ttc, remaining_balance, amount_in_words, issued_date, due_date,
                   project_description, contract_number, created_at, updated_at
            FROM documents
            WHERE tenant_id = ? AND id = ?
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn find_lines(&self, document_id: &str) -> Result<Vec<DocumentLine>> {
        let rows = sqlx::query(
            r#"
            SELECT id, document_id, item_id, item_code, item_name, item_description,
                   unit, quantity, unit_price, tax_rate, subtotal, tax_amount, total,
                   position
            FROM document_lines
            WHERE document_id = ?
            ORDER BY position
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_line).collect()
    }

    async fn update_status(&self, tenant_id: i64, id: &str, status: DocumentStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET status = ?, updated_at = ?
            WHERE tenant_id = ? AND id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(tenant_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::not_found(format!(
                "Document '{}' not found",
                id
            )));
        }

        Ok(())
    }
}
