/// Failures while acquiring or configuring GPU objects
#[derive(thiserror::Error, Debug)]
pub enum GpuError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("adapter cannot present to this surface")]
    UnsupportedSurface,

    #[error("surface reports no texture formats")]
    NoSurfaceFormat,

    #[error("{label} is {size} px, larger than the device limit of {max} px")]
    TextureTooLarge { label: String, size: u32, max: u32 },

    #[error("pipeline '{label}' failed validation: {message}")]
    Pipeline { label: String, message: String },
}
