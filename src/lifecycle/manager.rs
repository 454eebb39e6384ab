//! Mount/unmount lifecycle of a render surface
//!
//! The [`LifecycleManager`] binds a [`RenderSurface`] to a [`MountContainer`]
//! and guarantees that everything acquired on `attach` is given back on
//! `detach`: drawables, backing buffers, and the output element itself.
//!
//! The frame loop is gated on the binding. [`LifecycleManager::tick`] returns
//! [`FrameControl::Stop`] as soon as the surface is detached, so the host only
//! reschedules frames while something is mounted.

use winit::dpi::PhysicalSize;

use super::{
    binding::{MountBinding, MountContainer},
    drawable::{DrawableObject, GpuResource, ReleaseStats},
    error::LifecycleError,
};

/// Outcome of rendering a single frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// A frame was drawn and presented.
    Presented,
    /// The output was lost or outdated and has been reconfigured.
    Reconfigured,
    /// Transient failure; nothing was drawn this frame.
    Skipped,
    /// The surface can no longer render (commonly out of memory).
    Fatal,
}

/// Whether the host should schedule another frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// Viewport size tracked by the manager, in physical pixels.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Projection aspect ratio, or `None` for an empty viewport.
    pub fn aspect(&self) -> Option<f32> {
        (!self.is_empty()).then(|| self.width as f32 / self.height as f32)
    }
}

impl From<PhysicalSize<u32>> for Viewport {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

/// A GPU-backed drawable surface that can be mounted into a container.
pub trait RenderSurface {
    type Container: MountContainer;
    type Geometry: GpuResource;
    type Material: GpuResource;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Inserts the surface output into `container` and acquires whatever the
    /// output needs to render (backing buffers, drawables).
    fn insert_output(&mut self, container: &Self::Container) -> Result<(), Self::Error>;

    /// Removes the output from `container`.
    fn remove_output(&mut self, container: &Self::Container);

    /// Resizes the output and updates the projection to match.
    fn fit_viewport(&mut self, viewport: Viewport);

    /// Drawables currently owned by the surface.
    fn drawables_mut(&mut self) -> &mut [DrawableObject<Self::Geometry, Self::Material>];

    /// Frees the surface's own backing resources (frame/depth buffers etc).
    fn release_backing(&mut self);

    /// Advances per-frame state: animated uniforms, controls, camera.
    fn advance(&mut self);

    /// Draws and presents one frame.
    fn render_frame(&mut self) -> FrameStatus;
}

/// Binds a render surface to at most one container at a time.
pub struct LifecycleManager<S: RenderSurface> {
    surface: S,
    binding: MountBinding<S::Container>,
    viewport: Viewport,
    frames_rendered: u64,
    last_frame: Option<FrameStatus>,
}

impl<S: RenderSurface> LifecycleManager<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            binding: MountBinding::new(),
            viewport: Viewport::default(),
            frames_rendered: 0,
            last_frame: None,
        }
    }

    /// Mounts the surface output into `container`.
    ///
    /// Fails with [`LifecycleError::InvalidContainer`] if the container is not
    /// live and with [`LifecycleError::AlreadyAttached`] if a previous
    /// container has not been detached. Nothing is recorded on failure.
    pub fn attach(&mut self, container: S::Container) -> Result<(), LifecycleError> {
        if self.binding.is_attached() {
            return Err(LifecycleError::AlreadyAttached);
        }
        if !container.is_live() {
            return Err(LifecycleError::InvalidContainer);
        }

        let size = container.client_size();
        self.surface
            .insert_output(&container)
            .map_err(|err| LifecycleError::Surface(Box::new(err)))?;

        if self.binding.bind(container).is_err() {
            // Checked above; the binding cannot have been filled in between.
            return Err(LifecycleError::AlreadyAttached);
        }
        self.last_frame = None;
        self.fit(size.into());

        log::info!(
            "surface attached ({}x{})",
            self.viewport.width,
            self.viewport.height
        );
        Ok(())
    }

    /// Unmounts the surface and releases every resource it acquired.
    ///
    /// Calling this while unattached does nothing.
    pub fn detach(&mut self) -> ReleaseStats {
        // Unbind first so that no tick can reach released resources.
        let Some(container) = self.binding.unbind() else {
            log::debug!("detach called while unattached");
            return ReleaseStats::default();
        };

        let mut stats = ReleaseStats::default();
        for drawable in self.surface.drawables_mut() {
            let released = drawable.release();
            log::debug!(
                "released '{}': {} geometry, {} material(s)",
                drawable.name,
                released.geometries,
                released.materials
            );
            stats += released;
        }

        self.surface.release_backing();
        self.surface.remove_output(&container);

        log::info!(
            "surface detached, released {} resource(s) after {} frame(s)",
            stats.released(),
            self.frames_rendered
        );
        stats
    }

    /// Refits the viewport to the bound container's current size.
    ///
    /// Returns `false` without doing anything when unattached.
    pub fn handle_resize(&mut self) -> bool {
        let Some(size) = self.binding.container().map(MountContainer::client_size) else {
            return false;
        };
        self.fit(size.into());
        true
    }

    /// Runs one frame of the render loop.
    ///
    /// The host should schedule the next frame only on
    /// [`FrameControl::Continue`].
    pub fn tick(&mut self) -> FrameControl {
        if !self.binding.is_attached() {
            return FrameControl::Stop;
        }

        self.surface.advance();
        let status = self.surface.render_frame();
        self.last_frame = Some(status);
        match status {
            FrameStatus::Presented => {
                self.frames_rendered += 1;
                FrameControl::Continue
            }
            FrameStatus::Reconfigured => {
                log::warn!("surface output reconfigured, retrying next frame");
                FrameControl::Continue
            }
            FrameStatus::Skipped => FrameControl::Continue,
            FrameStatus::Fatal => {
                log::error!("surface can no longer render, detaching");
                self.detach();
                FrameControl::Stop
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_attached()
    }

    pub fn container(&self) -> Option<&S::Container> {
        self.binding.container()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Status of the most recent frame since the last attach.
    ///
    /// Stays [`FrameStatus::Fatal`] after a fatal frame detached the surface,
    /// so the host can tell that stop apart from a regular detach.
    pub fn last_frame_status(&self) -> Option<FrameStatus> {
        self.last_frame
    }

    /// Live geometry and material resources across all drawables.
    pub fn live_resource_count(&mut self) -> usize {
        self.surface
            .drawables_mut()
            .iter()
            .map(DrawableObject::live_resources)
            .sum()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn fit(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        // Minimised windows report zero; keep the last usable configuration.
        if viewport.is_empty() {
            return;
        }
        self.surface.fit_viewport(viewport);
    }
}

impl<S: RenderSurface> Drop for LifecycleManager<S> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::drawable::{tests::TrackedResource, Materials};
    use std::{cell::Cell, cell::RefCell, rc::Rc};

    #[derive(Debug)]
    struct FakeNode {
        live: bool,
        size: PhysicalSize<u32>,
        children: Vec<u32>,
    }

    /// Shared handle to a fake UI node, cloned between the test and the manager.
    #[derive(Debug, Clone)]
    struct FakeContainer(Rc<RefCell<FakeNode>>);

    impl FakeContainer {
        fn new(width: u32, height: u32) -> Self {
            Self(Rc::new(RefCell::new(FakeNode {
                live: true,
                size: PhysicalSize::new(width, height),
                children: Vec::new(),
            })))
        }

        fn unmounted() -> Self {
            let container = Self::new(300, 200);
            container.0.borrow_mut().live = false;
            container
        }

        fn resize(&self, width: u32, height: u32) {
            self.0.borrow_mut().size = PhysicalSize::new(width, height);
        }

        fn children(&self) -> Vec<u32> {
            self.0.borrow().children.clone()
        }
    }

    impl MountContainer for FakeContainer {
        fn is_live(&self) -> bool {
            self.0.borrow().live
        }

        fn client_size(&self) -> PhysicalSize<u32> {
            self.0.borrow().size
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("output refused")]
    struct OutputRefused;

    const OUTPUT_ELEMENT: u32 = 7;

    struct FakeSurface {
        live: Rc<Cell<usize>>,
        drawables: Vec<DrawableObject<TrackedResource, TrackedResource>>,
        backing: bool,
        aspect: Option<f32>,
        fits: usize,
        advances: usize,
        frames: usize,
        next_status: FrameStatus,
        refuse_output: bool,
    }

    impl FakeSurface {
        fn new() -> Self {
            Self {
                live: Rc::new(Cell::new(0)),
                drawables: Vec::new(),
                backing: false,
                aspect: None,
                fits: 0,
                advances: 0,
                frames: 0,
                next_status: FrameStatus::Presented,
                refuse_output: false,
            }
        }
    }

    impl RenderSurface for FakeSurface {
        type Container = FakeContainer;
        type Geometry = TrackedResource;
        type Material = TrackedResource;
        type Error = OutputRefused;

        fn insert_output(&mut self, container: &FakeContainer) -> Result<(), OutputRefused> {
            if self.refuse_output {
                return Err(OutputRefused);
            }
            container.0.borrow_mut().children.push(OUTPUT_ELEMENT);
            self.backing = true;
            self.drawables = vec![
                DrawableObject::new(
                    "plane",
                    TrackedResource::new(&self.live),
                    Materials::Single(TrackedResource::new(&self.live)),
                ),
                DrawableObject::new(
                    "model",
                    TrackedResource::new(&self.live),
                    Materials::Multi(vec![
                        TrackedResource::new(&self.live),
                        TrackedResource::new(&self.live),
                    ]),
                ),
            ];
            Ok(())
        }

        fn remove_output(&mut self, container: &FakeContainer) {
            container
                .0
                .borrow_mut()
                .children
                .retain(|child| *child != OUTPUT_ELEMENT);
        }

        fn fit_viewport(&mut self, viewport: Viewport) {
            self.fits += 1;
            self.aspect = viewport.aspect();
        }

        fn drawables_mut(&mut self) -> &mut [DrawableObject<TrackedResource, TrackedResource>] {
            &mut self.drawables
        }

        fn release_backing(&mut self) {
            self.backing = false;
        }

        fn advance(&mut self) {
            self.advances += 1;
        }

        fn render_frame(&mut self) -> FrameStatus {
            self.frames += 1;
            self.next_status
        }
    }

    #[test]
    fn test_attach_resize_detach_reattach_scenario() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        let a = FakeContainer::new(300, 200);

        manager.attach(a.clone()).unwrap();
        assert_eq!(manager.viewport().aspect(), Some(1.5));
        assert_eq!(manager.surface().aspect, Some(1.5));
        assert_eq!(a.children(), vec![OUTPUT_ELEMENT]);

        a.resize(600, 200);
        assert!(manager.handle_resize());
        assert_eq!(manager.viewport().aspect(), Some(3.0));
        assert_eq!(manager.surface().aspect, Some(3.0));

        let stats = manager.detach();
        assert_eq!(stats.geometries, 2);
        assert_eq!(stats.materials, 3);
        assert!(a.children().is_empty());
        assert_eq!(manager.live_resource_count(), 0);
        assert_eq!(manager.surface().live.get(), 0);
        assert!(!manager.surface().backing);

        let b = FakeContainer::new(400, 400);
        manager.attach(b.clone()).unwrap();
        assert_eq!(b.children(), vec![OUTPUT_ELEMENT]);
        assert!(a.children().is_empty());
        assert_eq!(manager.viewport().aspect(), Some(1.0));
    }

    #[test]
    fn test_attach_rejects_unmounted_container() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        let container = FakeContainer::unmounted();

        let err = manager.attach(container.clone()).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidContainer));
        assert!(!manager.is_attached());
        assert!(container.children().is_empty());
        assert_eq!(manager.surface().fits, 0);
    }

    #[test]
    fn test_double_attach_fails_explicitly() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        let a = FakeContainer::new(300, 200);
        let b = FakeContainer::new(100, 100);

        manager.attach(a.clone()).unwrap();
        let err = manager.attach(b.clone()).unwrap_err();

        assert!(matches!(err, LifecycleError::AlreadyAttached));
        assert_eq!(a.children(), vec![OUTPUT_ELEMENT]);
        assert!(b.children().is_empty());
        assert_eq!(manager.viewport().aspect(), Some(1.5));
        assert_eq!(manager.surface().live.get(), 5);
    }

    #[test]
    fn test_surface_failure_leaves_manager_unattached() {
        let mut surface = FakeSurface::new();
        surface.refuse_output = true;
        let mut manager = LifecycleManager::new(surface);
        let container = FakeContainer::new(300, 200);

        let err = manager.attach(container.clone()).unwrap_err();
        assert!(matches!(err, LifecycleError::Surface(_)));
        assert!(!manager.is_attached());
        assert_eq!(manager.tick(), FrameControl::Stop);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        assert_eq!(manager.detach(), ReleaseStats::default());

        let container = FakeContainer::new(300, 200);
        manager.attach(container.clone()).unwrap();

        let first = manager.detach();
        assert_eq!(first.released(), 5);
        let second = manager.detach();
        assert_eq!(second, ReleaseStats::default());
        assert!(container.children().is_empty());
        assert_eq!(manager.surface().live.get(), 0);
    }

    #[test]
    fn test_resize_while_unattached_has_no_effect() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        assert!(!manager.handle_resize());
        assert_eq!(manager.viewport(), Viewport::default());
        assert_eq!(manager.surface().fits, 0);

        let container = FakeContainer::new(300, 200);
        manager.attach(container.clone()).unwrap();
        manager.detach();
        container.resize(800, 100);

        assert!(!manager.handle_resize());
        assert_eq!(manager.viewport().aspect(), Some(1.5));
        assert_eq!(manager.surface().fits, 1);
    }

    #[test]
    fn test_zero_sized_container_keeps_projection() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        let container = FakeContainer::new(300, 200);
        manager.attach(container.clone()).unwrap();

        container.resize(0, 0);
        assert!(manager.handle_resize());
        assert_eq!(manager.viewport().aspect(), None);
        assert_eq!(manager.surface().aspect, Some(1.5));
        assert_eq!(manager.surface().fits, 1);
    }

    #[test]
    fn test_tick_runs_only_while_attached() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        assert_eq!(manager.tick(), FrameControl::Stop);
        assert_eq!(manager.surface().frames, 0);

        manager.attach(FakeContainer::new(300, 200)).unwrap();
        assert_eq!(manager.tick(), FrameControl::Continue);
        assert_eq!(manager.tick(), FrameControl::Continue);
        assert_eq!(manager.frames_rendered(), 2);
        assert_eq!(manager.surface().advances, 2);

        manager.detach();
        assert_eq!(manager.tick(), FrameControl::Stop);
        assert_eq!(manager.surface().frames, 2);
        assert_eq!(manager.surface().advances, 2);
    }

    #[test]
    fn test_transient_frame_failures_keep_looping() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        manager.attach(FakeContainer::new(300, 200)).unwrap();

        manager.surface_mut().next_status = FrameStatus::Skipped;
        assert_eq!(manager.tick(), FrameControl::Continue);
        manager.surface_mut().next_status = FrameStatus::Reconfigured;
        assert_eq!(manager.tick(), FrameControl::Continue);

        assert_eq!(manager.frames_rendered(), 0);
        assert!(manager.is_attached());
    }

    #[test]
    fn test_fatal_frame_detaches() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        let container = FakeContainer::new(300, 200);
        manager.attach(container.clone()).unwrap();

        manager.surface_mut().next_status = FrameStatus::Fatal;
        assert_eq!(manager.tick(), FrameControl::Stop);
        assert!(!manager.is_attached());
        assert!(container.children().is_empty());
        assert_eq!(manager.surface().live.get(), 0);
        assert_eq!(manager.last_frame_status(), Some(FrameStatus::Fatal));

        // A later tick stays stopped and keeps the fatal status visible.
        assert_eq!(manager.tick(), FrameControl::Stop);
        assert_eq!(manager.last_frame_status(), Some(FrameStatus::Fatal));

        manager.surface_mut().next_status = FrameStatus::Presented;
        manager.attach(container.clone()).unwrap();
        assert_eq!(manager.last_frame_status(), None);
        assert_eq!(manager.tick(), FrameControl::Continue);
        assert_eq!(manager.last_frame_status(), Some(FrameStatus::Presented));
    }

    #[test]
    fn test_regular_detach_is_not_reported_as_fatal() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        manager.attach(FakeContainer::new(300, 200)).unwrap();
        assert_eq!(manager.tick(), FrameControl::Continue);

        manager.detach();
        assert_eq!(manager.tick(), FrameControl::Stop);
        assert_ne!(manager.last_frame_status(), Some(FrameStatus::Fatal));
    }

    #[test]
    fn test_output_present_iff_last_call_was_successful_attach() {
        let mut manager = LifecycleManager::new(FakeSurface::new());
        let containers = [
            FakeContainer::new(300, 200),
            FakeContainer::new(640, 480),
            FakeContainer::unmounted(),
        ];

        // (container index, attach?) pairs; detach ignores the index.
        let calls = [
            (0, true),
            (1, true),
            (0, false),
            (2, true),
            (1, true),
            (1, false),
            (1, false),
            (0, true),
            (0, false),
        ];

        let mut mounted: Option<usize> = None;
        for (index, attach) in calls {
            if attach {
                let result = manager.attach(containers[index].clone());
                if result.is_ok() {
                    mounted = Some(index);
                }
            } else {
                manager.detach();
                mounted = None;
            }

            for (i, container) in containers.iter().enumerate() {
                let expected = if mounted == Some(i) {
                    vec![OUTPUT_ELEMENT]
                } else {
                    Vec::new()
                };
                assert_eq!(container.children(), expected, "container {i}");
            }
            assert_eq!(manager.is_attached(), mounted.is_some());
        }
    }

    #[test]
    fn test_drop_detaches() {
        let container = FakeContainer::new(300, 200);
        let live = {
            let mut manager = LifecycleManager::new(FakeSurface::new());
            manager.attach(container.clone()).unwrap();
            manager.surface().live.clone()
        };
        assert_eq!(live.get(), 0);
        assert!(container.children().is_empty());
    }
}
