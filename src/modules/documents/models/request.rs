use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::DocumentKind;
use super::line::LineInput;
use crate::core::Language;

/// Validated input for document creation, as handed over by the API layer.
///
/// Tenant and client identity are owned by upstream collaborators; the
/// engine only scopes by them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub tenant_id: i64,
    pub kind: DocumentKind,
    pub client_id: i64,
    pub site_id: Option<i64>,
    pub lines: Vec<LineInput>,
    pub discount_percentage: Decimal,
    pub issued_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub language: Language,
    pub project_description: Option<String>,
    pub contract_number: Option<String>,
}
