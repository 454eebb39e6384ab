//! Embedded WGSL sources

/// Lit pipeline used by every [`StandardMaterial`](crate::gfx::resources::material::StandardMaterial).
pub const STANDARD_SHADER: &str = include_str!("shaders/standard.wgsl");

/// Default vertex stage of the portal plane.
pub const PLANE_VERTEX_SHADER: &str = include_str!("shaders/portal_plane.vert.wgsl");

/// Default fragment stage of the portal plane.
pub const PLANE_FRAGMENT_SHADER: &str = include_str!("shaders/portal_plane.frag.wgsl");
