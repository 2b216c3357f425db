// Sync adapter modules: verb selection, request composition, transport seam
// and the facade tying them together.

pub mod config;
pub mod request;
pub mod service;
pub mod transport;
pub mod verbs;

// Re-export main types for convenience
pub use config::{SyncConfig, TokenProvider, REQUESTED_WITH_HEADER, REQUEST_TOKEN_HEADER};
pub use request::{merge_headers, RequestDescriptor};
pub use service::{SyncOptions, SyncService};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use verbs::{default_read_depth, plan, RequestPlan, Verb};
