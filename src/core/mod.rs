pub mod error;
pub mod money;
pub mod telemetry;

pub use error::{EngineError, Result};
pub use money::Language;
