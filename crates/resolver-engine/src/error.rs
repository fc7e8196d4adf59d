//! Errors the resolver surfaces to callers. Most of the failure modes a
//! caller might imagine — malformed model JSON, a local attempt coming up
//! empty, a call naming a tool outside the catalog — are handled inside the
//! strategy ladder and never reach here; only a cloud-adapter failure or an
//! unrecoverable model handle propagates.

use resolver_types::ResolutionResult;

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// The cloud adapter failed or was never configured. Carries the local
    /// attempt's (empty) result so the caller can still inspect
    /// `local_confidence` and `total_time_ms` even though resolution
    /// ultimately failed.
    #[error("cloud adapter unavailable: {reason}")]
    CloudUnavailable {
        reason: String,
        local_result: Box<ResolutionResult>,
    },

    /// The on-device model handle itself failed (not malformed output —
    /// an actual I/O/runtime failure from the host application).
    #[error("model handle failure: {0}")]
    ModelHandleFailure(String),
}
