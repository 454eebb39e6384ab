//! Device-level GPU state shared by every surface

use log::info;

use super::error::GpuError;

/// Instance, adapter, device and queue.
///
/// Created once by the host and handed to surfaces, so attaching and
/// detaching never re-acquires the device.
pub struct RenderContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl RenderContext {
    pub async fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // No window exists yet; surface support is checked on attach.
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let adapter_info = adapter.get_info();
        info!(
            "Using adapter '{}' ({:?}), max texture size {}",
            adapter_info.name,
            adapter_info.backend,
            device.limits().max_texture_dimension_2d
        );

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }
}
