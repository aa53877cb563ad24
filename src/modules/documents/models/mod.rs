pub mod document;
pub mod line;
pub mod request;
pub mod totals;

pub use document::{DocumentKind, DocumentStatus, FinancialDocument};
pub use line::{DocumentLine, LineInput};
pub use request::CreateDocumentRequest;
pub use totals::DocumentTotals;
