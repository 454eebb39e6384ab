//! Vitrine
//!
//! Mounts a wgpu-rendered scene into a window and takes it down again
//! without leaking GPU resources.

pub mod app;
pub mod config;
pub mod gfx;
pub mod lifecycle;
pub mod logging;
pub mod wgpu_utils;

pub use app::{AppError, VitrineApp};
pub use config::SceneConfig;
pub use lifecycle::{LifecycleError, LifecycleManager};
