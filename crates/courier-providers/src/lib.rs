//! Transport and observability-sink implementations for the courier router.

/// HTTP transport implementation.
pub mod http;
/// Mock transport for testing dispatch flows.
pub mod mock;
/// Observability sink implementations.
pub mod sink;

pub use http::HttpTransport;
pub use mock::MockTransport;
pub use sink::{LogSink, MemorySink};
