//! bigspender-core: canonical transaction model, normalization, and run-window state.

pub mod error;
pub mod normalize;
pub mod range;
pub mod time;
pub mod transaction;
pub mod watermark;

pub use error::Error;
pub use normalize::{SourceRecord, normalize};
pub use range::{DateRange, DateSection, RangeMode, resolve_range};
pub use transaction::Transaction;
pub use watermark::WatermarkStore;
