//! Outbound HTTP/JSON client plumbing.

mod memory;
mod outbound;
mod request;
mod transport;

pub use memory::StaticTransport;
pub use outbound::OutboundClient;
pub use request::{RequestBody, RequestSpec};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportError};
