//! Record and schema model shared with the pipeline host.

pub mod record;
pub mod types;

pub use record::{RecordBuilder, RecordError, StructuredRecord, Value};
pub use types::{Field, LogicalType, Schema};
