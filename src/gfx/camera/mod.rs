pub mod camera_controller;
pub mod camera_utils;
pub mod orbit_camera;

// Re-export main types
pub use camera_controller::OrbitControls;
pub use camera_utils::{Camera, CameraUniform};
pub use orbit_camera::OrbitCamera;
