//! Adapter between a generic object-persistence vocabulary
//! (create/read/update/patch/delete on models and collections) and a
//! resource-oriented, property-based wire protocol (PROPFIND, PROPPATCH,
//! MKCOL, PUT, POST, DELETE).
//!
//! The adapter is stateless: it translates operations into wire requests,
//! issues them through an injected [`Transport`], parses multi-status
//! responses back into logical records and classifies success vs. failure.
//! It never retries, caches or manages authentication beyond attaching the
//! configured headers.

pub mod error;
pub mod models;
pub mod multistatus_parser;
pub mod namespaces;
pub mod property_map;
pub mod services;

pub use error::SyncError;
pub use models::{
    Attributes, Depth, Model, Operation, Resource, ResourceKind, ResponseRecord, SyncOutcome,
};
pub use multistatus_parser::{parse_id_from_href, parse_multistatus};
pub use namespaces::NamespaceSet;
pub use property_map::PropertyMap;
pub use services::sync::{
    HttpTransport, RequestDescriptor, SyncConfig, SyncOptions, SyncService, TokenProvider,
    Transport, TransportResponse, Verb,
};
