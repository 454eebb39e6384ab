//! Mount container contract and the binding that tracks the active one.

use winit::dpi::PhysicalSize;

/// A UI element the surface output can be mounted into.
///
/// Implementations are cheap handles (an `Arc<Window>`, a shared node, ...);
/// the binding keeps one for as long as the surface is attached.
pub trait MountContainer {
    /// Whether the container is still part of the live UI tree.
    fn is_live(&self) -> bool;

    /// Current drawable size of the container in physical pixels.
    fn client_size(&self) -> PhysicalSize<u32>;
}

/// Holds at most one active container reference.
#[derive(Debug)]
pub struct MountBinding<C> {
    container: Option<C>,
}

impl<C> Default for MountBinding<C> {
    fn default() -> Self {
        Self { container: None }
    }
}

impl<C> MountBinding<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.container.is_some()
    }

    /// Records `container` as the active one.
    ///
    /// Returns the rejected container back if one is already bound.
    pub fn bind(&mut self, container: C) -> Result<(), C> {
        if self.container.is_some() {
            return Err(container);
        }
        self.container = Some(container);
        Ok(())
    }

    /// Clears the binding, handing back the previously bound container.
    pub fn unbind(&mut self) -> Option<C> {
        self.container.take()
    }

    pub fn container(&self) -> Option<&C> {
        self.container.as_ref()
    }
}
