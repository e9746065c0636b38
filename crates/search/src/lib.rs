//! Find engine for command trees: locate the next (or previous) node whose
//! label matches a text or regex pattern, starting from a cursor.

mod error;
mod find;
mod label;
mod predicate;

pub use capture_protocol::{FindSummary, StopReason};
pub use error::{Result, SearchError};
pub use find::find;
pub use label::node_label;
pub use predicate::Predicate;
pub use tokio_util::sync::CancellationToken;
