//! # Surface Lifecycle
//!
//! Binding of a render surface to a mount container, with symmetric teardown.
//!
//! - [`MountContainer`] - what a host hands to `attach`
//! - [`RenderSurface`] - what the manager drives
//! - [`DrawableObject`] - one geometry plus its material resources
//! - [`LifecycleManager`] - `attach`, `detach`, resize responder, frame tick
//!
//! Everything here is backend-agnostic; the wgpu implementation lives in
//! [`crate::gfx::surface`].

pub mod binding;
pub mod drawable;
pub mod error;
pub mod manager;

pub use binding::{MountBinding, MountContainer};
pub use drawable::{DrawableObject, GpuResource, Materials, ReleaseStats};
pub use error::LifecycleError;
pub use manager::{FrameControl, FrameStatus, LifecycleManager, RenderSurface, Viewport};
