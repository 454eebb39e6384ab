use std::sync::Arc;

use winit::{dpi::PhysicalSize, window::Window};

use crate::lifecycle::MountContainer;

/// A winit window used as mount container.
#[derive(Debug, Clone)]
pub struct WindowContainer {
    window: Arc<Window>,
}

impl WindowContainer {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl MountContainer for WindowContainer {
    fn is_live(&self) -> bool {
        // Platforms that cannot report visibility return `None`.
        self.window.is_visible().unwrap_or(true)
    }

    fn client_size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }
}
