//! Publishes catalog snapshots to multiple independent destinations with
//! partial-failure tolerance.

mod error;
mod pipeline;
mod sink;
pub mod sinks;

pub use error::{PublishError, Result};
pub use pipeline::{DependentRefresh, PublishPipeline, PublishReport, PublishTarget, SinkOutcome};
pub use sink::{CatalogSink, MemorySink, SinkError};
pub use sinks::{ConditionalPutSink, FileBlobSink, JsonPostSink};
