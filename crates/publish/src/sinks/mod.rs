//! Concrete sink implementations.

mod blob;
mod conditional;
mod http_post;

pub use blob::FileBlobSink;
pub use conditional::ConditionalPutSink;
pub use http_post::JsonPostSink;
