//! Orchestrates the hybrid function-call resolution strategy: an on-device
//! multi-attempt resolver (`local_resolver`), conjunction-based multi-intent
//! recovery and cloud fallback (`hybrid_router`), and the process-wide model
//! slot (`context`) that owns the only mutable handle to the on-device
//! model.

pub mod cloud;
pub mod context;
pub mod error;
pub mod hybrid_router;
pub mod local_resolver;
pub mod model;

pub use cloud::{CloudAdapter, CloudResponse};
pub use context::ModelSlot;
pub use error::ResolverError;
pub use hybrid_router::resolve;
pub use local_resolver::{resolve_locally, LocalResolution};
pub use model::{ModelHandle, ModelOptions, ModelRequest};
