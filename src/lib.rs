//! Facade crate: wires the resolver engine's `resolve` entry point together
//! with the ambient configuration and logging this binary owns. Downstream
//! callers only need this crate plus concrete `ModelHandle`/`CloudAdapter`
//! implementations for their own inference runtime and cloud provider.

pub mod config;
pub mod logger;

pub use resolver_engine::{resolve, CloudAdapter, CloudResponse, ModelHandle, ModelOptions, ModelRequest, ModelSlot, ResolverError};
pub use resolver_types::{ArgValue, Call, ChatTurn, ResolutionResult, ResolutionSource, Role, ToolSchema};
