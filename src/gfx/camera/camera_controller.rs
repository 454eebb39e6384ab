//! Damped orbit controls
//!
//! Input events only accumulate motion. [`OrbitControls::update`] is called
//! once per frame and applies a `damping_factor` share of the pending motion
//! to the camera, letting the rest decay over the following frames.

use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;
use crate::config::ControlsConfig;

/// Pending motion below this magnitude is dropped.
const REST_THRESHOLD: f32 = 1e-6;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct PendingMotion {
    yaw: f32,
    pitch: f32,
    zoom: f32,
    pan: (f32, f32),
}

impl PendingMotion {
    fn scaled(&self, factor: f32) -> Self {
        Self {
            yaw: self.yaw * factor,
            pitch: self.pitch * factor,
            zoom: self.zoom * factor,
            pan: (self.pan.0 * factor, self.pan.1 * factor),
        }
    }

    fn is_at_rest(&self) -> bool {
        [self.yaw, self.pitch, self.zoom, self.pan.0, self.pan.1]
            .iter()
            .all(|v| v.abs() < REST_THRESHOLD)
    }
}

pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    damping_factor: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    pending: PendingMotion,
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig) -> Self {
        let mut controls = Self {
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            damping_factor: 1.0,
            is_shift_held: false,
            is_mouse_pressed: false,
            pending: PendingMotion::default(),
        };
        controls.set_damping_factor(config.damping_factor);
        controls
    }

    /// Sets the damping factor, clamped to `(0, 1]`. `1.0` disables damping.
    pub fn set_damping_factor(&mut self, damping_factor: f32) {
        self.damping_factor = damping_factor.clamp(f32::EPSILON, 1.0);
    }

    pub fn damping_factor(&self) -> f32 {
        self.damping_factor
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                self.pending.zoom += scroll_amount * self.zoom_speed;
            }
            DeviceEvent::MouseMotion { delta } => {
                if !self.is_mouse_pressed {
                    return;
                }
                if self.is_shift_held {
                    // SHIFT + DRAG = PAN
                    self.pending.pan.0 += -delta.0 as f32 * self.pan_speed;
                    self.pending.pan.1 += delta.1 as f32 * self.pan_speed;
                } else {
                    // DRAG = ROTATE
                    self.pending.yaw += -delta.0 as f32 * self.rotate_speed;
                    self.pending.pitch += delta.1 as f32 * self.rotate_speed;
                }
            }
            _ => (),
        }
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight) = event.physical_key {
            self.set_shift_held(event.state == ElementState::Pressed);
        }
    }

    pub fn set_shift_held(&mut self, held: bool) {
        if self.is_shift_held != held {
            log::trace!("shift held: {held}");
        }
        self.is_shift_held = held;
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.is_mouse_pressed && self.is_shift_held
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed && !self.is_shift_held
    }

    /// Applies one frame of damped motion to `camera`.
    ///
    /// Returns `true` while motion is still pending.
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        if self.pending.is_at_rest() {
            self.pending = PendingMotion::default();
            return false;
        }

        let step = self.pending.scaled(self.damping_factor);
        if step.yaw != 0.0 {
            camera.add_yaw(step.yaw);
        }
        if step.pitch != 0.0 {
            camera.add_pitch(step.pitch);
        }
        if step.zoom != 0.0 {
            camera.add_distance(step.zoom);
        }
        if step.pan != (0.0, 0.0) {
            camera.pan(step.pan);
        }

        self.pending = self.pending.scaled(1.0 - self.damping_factor);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cgmath::{InnerSpace, Vector3, Zero};

    fn camera() -> OrbitCamera {
        OrbitCamera::new(10.0, 0.2, 0.0, Vector3::zero(), 1.0)
    }

    fn press(controls: &mut OrbitControls) {
        controls.process_device_event(&DeviceEvent::Button {
            button: 0,
            state: ElementState::Pressed,
        });
    }

    #[test]
    fn test_motion_without_button_is_ignored() {
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        let mut camera = camera();

        controls.process_device_event(&DeviceEvent::MouseMotion { delta: (-50.0, 0.0) });
        assert!(!controls.update(&mut camera));
        assert_abs_diff_eq!(camera.yaw, 0.0);
    }

    #[test]
    fn test_rotation_is_damped() {
        let config = ControlsConfig::default();
        let mut controls = OrbitControls::new(&config);
        let mut camera = camera();
        press(&mut controls);
        assert!(controls.is_rotating());

        controls.process_device_event(&DeviceEvent::MouseMotion { delta: (-100.0, 0.0) });
        let total = 100.0 * config.rotate_speed;

        assert!(controls.update(&mut camera));
        assert_abs_diff_eq!(camera.yaw, total * 0.25, epsilon = 1e-6);

        assert!(controls.update(&mut camera));
        assert_abs_diff_eq!(camera.yaw, total * (0.25 + 0.25 * 0.75), epsilon = 1e-6);

        while controls.update(&mut camera) {}
        assert_abs_diff_eq!(camera.yaw, total, epsilon = 1e-4);
    }

    #[test]
    fn test_undamped_controls_apply_at_once() {
        let mut controls = OrbitControls::new(&ControlsConfig {
            damping_factor: 1.0,
            ..ControlsConfig::default()
        });
        let mut camera = camera();
        press(&mut controls);

        controls.process_device_event(&DeviceEvent::MouseMotion { delta: (0.0, 20.0) });
        controls.update(&mut camera);
        assert_abs_diff_eq!(camera.pitch, 0.2 + 20.0 * 0.005, epsilon = 1e-6);
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_shift_drag_pans() {
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        let mut camera = camera();
        press(&mut controls);
        controls.set_shift_held(true);
        assert!(controls.is_panning());

        controls.process_device_event(&DeviceEvent::MouseMotion { delta: (30.0, 0.0) });
        while controls.update(&mut camera) {}

        assert_abs_diff_eq!(camera.yaw, 0.0);
        assert!(camera.target.magnitude() > 0.0);
    }

    #[test]
    fn test_wheel_zooms_out() {
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        let mut camera = camera();

        controls.process_device_event(&DeviceEvent::MouseWheel {
            delta: MouseScrollDelta::LineDelta(0.0, -3.0),
        });
        while controls.update(&mut camera) {}

        assert!(camera.distance > 10.0);
    }

    #[test]
    fn test_damping_factor_is_clamped() {
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        controls.set_damping_factor(3.0);
        assert_abs_diff_eq!(controls.damping_factor(), 1.0);
        controls.set_damping_factor(-1.0);
        assert!(controls.damping_factor() > 0.0);
    }
}
