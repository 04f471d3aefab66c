//! Domain error types.

mod ingest_error;
mod transport_error;

pub use ingest_error::{IngestError, REUPLOAD_HINT};
pub use transport_error::TransportError;
