pub mod amount_in_words;
pub mod document_service;
pub mod line_calculator;
pub mod sequencer;
pub mod totals;

pub use document_service::DocumentService;
pub use line_calculator::LineItemCalculator;
pub use sequencer::{DocumentNumberSequencer, PeriodKey};
pub use totals::DocumentTotalsAggregator;
