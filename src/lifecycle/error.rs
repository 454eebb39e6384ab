//! Errors raised by the mount lifecycle.

/// Failure of a lifecycle call.
///
/// Only `attach` can fail; `detach` and the resize responder never surface
/// errors.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The container handed to `attach` is not live (closed, hidden, or
    /// otherwise not part of the UI tree).
    #[error("mount container is not live")]
    InvalidContainer,

    /// `attach` was called while another container is still bound.
    #[error("surface is already attached; detach it before attaching again")]
    AlreadyAttached,

    /// The surface could not bind its output to the container.
    #[error("failed to insert surface output: {0}")]
    Surface(#[source] Box<dyn std::error::Error + Send + Sync>),
}
