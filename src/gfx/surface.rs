//! wgpu render surface mounted into a window
//!
//! [`SceneSurface`] owns a [`Scene`] and everything the GPU needs to draw it.
//! Nothing GPU-side exists until the surface is inserted into a
//! [`WindowContainer`]; on detach every buffer and texture is destroyed and
//! the presentation surface dropped, so a later attach starts from scratch.

use std::sync::Arc;

use log::{debug, error, info, warn};
use winit::event::{DeviceEvent, KeyEvent};

use super::{
    camera::OrbitControls,
    container::WindowContainer,
    context::RenderContext,
    error::GpuError,
    rendering::{
        mesh::{DrawMesh, GpuMesh},
        pipeline_manager::{PipelineConfig, PipelineManager},
        shaders::STANDARD_SHADER,
    },
    resources::{
        material::DEFAULT_MATERIAL_ID, DepthTexture, GlobalBindings, GlobalUniform, GpuMaterial,
        Material, PipelineKey, TextureResource,
    },
    scene::{Scene, SceneObject},
};
use crate::{
    config::{ControlsConfig, SurfaceConfig},
    lifecycle::{DrawableObject, FrameStatus, Materials, RenderSurface, Viewport},
    wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
};

type SceneDrawable = DrawableObject<GpuMesh, GpuMaterial>;

/// Presentation surface of the window the output is inserted into.
struct PresentTarget {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl PresentTarget {
    fn handle_surface_error(&self, device: &wgpu::Device, err: wgpu::SurfaceError) -> FrameStatus {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                warn!("Surface {err}, reconfiguring");
                self.surface.configure(device, &self.config);
                FrameStatus::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => {
                error!("Surface out of memory");
                FrameStatus::Fatal
            }
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => {
                warn!("Skipping frame: {err}");
                FrameStatus::Skipped
            }
        }
    }
}

/// GPU resources owned by the surface itself rather than by a drawable.
struct SurfaceBacking {
    depth: DepthTexture,
    globals: GlobalBindings,
    environment: TextureResource,
    environment_bind_group: wgpu::BindGroup,
    transform_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,
    pipelines: PipelineManager,
}

pub struct SceneSurface {
    ctx: Arc<RenderContext>,
    scene: Scene,
    controls: OrbitControls,
    clear_color: wgpu::Color,
    vsync: bool,
    output: Option<PresentTarget>,
    backing: Option<SurfaceBacking>,
    drawables: Vec<SceneDrawable>,
}

impl SceneSurface {
    pub fn new(
        ctx: Arc<RenderContext>,
        scene: Scene,
        controls: &ControlsConfig,
        surface: &SurfaceConfig,
    ) -> Self {
        let [r, g, b, a] = surface.clear_color;
        Self {
            ctx,
            scene,
            controls: OrbitControls::new(controls),
            clear_color: wgpu::Color { r, g, b, a },
            vsync: surface.vsync,
            output: None,
            backing: None,
            drawables: Vec::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Whether the output currently has a presentation surface.
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        self.controls.process_device_event(event);
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        self.controls.process_keyboard_event(event);
    }

    fn create_present_target(
        &self,
        container: &WindowContainer,
    ) -> Result<PresentTarget, GpuError> {
        let ctx = &self.ctx;
        let surface = ctx.instance.create_surface(container.window().clone())?;
        if !ctx.adapter.is_surface_supported(&surface) {
            return Err(GpuError::UnsupportedSurface);
        }

        let capabilities = surface.get_capabilities(&ctx.adapter);
        let format = choose_surface_format(&capabilities).ok_or(GpuError::NoSurfaceFormat)?;

        let size = container.window().inner_size();
        let (width, height) = fit_to_limit(
            size.width,
            size.height,
            ctx.device.limits().max_texture_dimension_2d,
        );
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: if self.vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&ctx.device, &config);

        debug!("Configured {:?} surface {}x{}", format, config.width, config.height);
        Ok(PresentTarget { surface, config })
    }

    fn create_backing(&self, config: &wgpu::SurfaceConfiguration) -> Result<SurfaceBacking, GpuError> {
        let device = &self.ctx.device;

        check_texture_size(
            "environment cubemap",
            self.scene.environment.size(),
            device.limits().max_texture_dimension_2d,
        )?;

        let depth = DepthTexture::new(device, config.width, config.height, "depth_texture");
        let globals = GlobalBindings::new(
            device,
            &GlobalUniform::new(&self.scene.camera.uniform, &self.scene.lights),
        );

        let environment = TextureResource::create_cubemap(
            device,
            &self.ctx.queue,
            &self.scene.environment,
            "Environment",
        );
        let environment_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_cube())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Environment Bind Group Layout");
        let environment_bind_group = BindGroupBuilder::new(&environment_layout)
            .texture(&environment.view)
            .sampler(&environment.sampler)
            .create(device, "Environment Bind Group");

        let transform_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Transform Bind Group Layout");
        let material_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Material Bind Group Layout");

        let mut pipelines = PipelineManager::new();
        let shared_layouts = vec![
            globals.bind_group_layout().clone(),
            transform_layout.layout.clone(),
            material_layout.layout.clone(),
        ];

        let mut standard_layouts = shared_layouts.clone();
        standard_layouts.push(environment_layout.layout.clone());
        pipelines.create_pipeline(
            device,
            PipelineKey::Standard,
            STANDARD_SHADER,
            STANDARD_SHADER,
            &PipelineConfig::new("Standard", config.format)
                .with_bind_group_layouts(standard_layouts)
                .with_depth_format(DepthTexture::FORMAT),
        )?;

        for material in self.scene.materials.iter() {
            if let Material::Shader(shader) = material {
                let cull_mode = (!shader.double_sided).then_some(wgpu::Face::Back);
                pipelines.create_pipeline(
                    device,
                    material.pipeline_key(),
                    &shader.vertex_source,
                    &shader.fragment_source,
                    &PipelineConfig::new(&shader.name, config.format)
                        .with_bind_group_layouts(shared_layouts.clone())
                        .with_cull_mode(cull_mode)
                        .with_depth_format(DepthTexture::FORMAT),
                )?;
            }
        }

        Ok(SurfaceBacking {
            depth,
            globals,
            environment,
            environment_bind_group,
            transform_layout,
            material_layout,
            pipelines,
        })
    }

    fn upload_drawable(&self, backing: &SurfaceBacking, object: &SceneObject) -> SceneDrawable {
        let device = &self.ctx.device;
        let geometry = GpuMesh::new(device, &backing.transform_layout, object);

        let mut gpu_materials: Vec<GpuMaterial> = object
            .material_ids
            .iter()
            .map(|id| {
                let material = self.scene.materials.get_or_default(id);
                GpuMaterial::new(device, &backing.material_layout.layout, material)
            })
            .collect();

        let materials = match gpu_materials.len() {
            0 => Materials::Single(GpuMaterial::new(
                device,
                &backing.material_layout.layout,
                self.scene.materials.get_or_default(DEFAULT_MATERIAL_ID),
            )),
            1 => Materials::Single(gpu_materials.remove(0)),
            _ => Materials::Multi(gpu_materials),
        };

        DrawableObject::new(object.name.clone(), geometry, materials)
    }
}

impl RenderSurface for SceneSurface {
    type Container = WindowContainer;
    type Geometry = GpuMesh;
    type Material = GpuMaterial;
    type Error = GpuError;

    fn insert_output(&mut self, container: &WindowContainer) -> Result<(), GpuError> {
        let output = self.create_present_target(container)?;
        let backing = self.create_backing(&output.config)?;

        let drawables = self
            .scene
            .objects
            .iter()
            .map(|object| self.upload_drawable(&backing, object))
            .collect();

        self.drawables = drawables;
        self.backing = Some(backing);
        self.output = Some(output);

        info!(
            "Output inserted into window {:?} with {} drawable(s)",
            container.window().id(),
            self.drawables.len()
        );
        Ok(())
    }

    fn remove_output(&mut self, container: &WindowContainer) {
        if self.output.take().is_some() {
            info!("Output removed from window {:?}", container.window().id());
        }
    }

    fn fit_viewport(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }

        if let Some(output) = self.output.as_mut() {
            let device = &self.ctx.device;
            let (width, height) = fit_to_limit(
                viewport.width,
                viewport.height,
                device.limits().max_texture_dimension_2d,
            );
            if (width, height) != (viewport.width, viewport.height) {
                debug!(
                    "Viewport {}x{} exceeds the device limit, rendering at {width}x{height}",
                    viewport.width, viewport.height
                );
            }
            output.config.width = width;
            output.config.height = height;
            output.surface.configure(device, &output.config);

            if let Some(backing) = self.backing.as_mut() {
                let depth = DepthTexture::new(device, width, height, "depth_texture");
                std::mem::replace(&mut backing.depth, depth).destroy();
            }
        }

        self.scene.camera.resize_projection(viewport.width, viewport.height);
        self.scene.camera.update_view_proj();
    }

    fn drawables_mut(&mut self) -> &mut [SceneDrawable] {
        &mut self.drawables
    }

    fn release_backing(&mut self) {
        // Drawables have been released slot by slot already.
        self.drawables.clear();

        if let Some(backing) = self.backing.take() {
            let pipeline_count = backing.pipelines.len();
            backing.depth.destroy();
            backing.environment.destroy();
            backing.globals.release();
            debug!("Released surface backing and {pipeline_count} pipeline(s)");
        }
    }

    fn advance(&mut self) {
        self.scene.advance();
        self.controls.update(&mut self.scene.camera);
        self.scene.camera.update_view_proj();

        let Some(backing) = self.backing.as_mut() else {
            return;
        };
        let queue = &self.ctx.queue;
        backing.globals.update(
            queue,
            GlobalUniform::new(&self.scene.camera.uniform, &self.scene.lights),
        );

        for drawable in &self.drawables {
            let Some(materials) = drawable.materials() else {
                continue;
            };
            for gpu_material in materials.iter() {
                if let PipelineKey::Shader(_) = gpu_material.pipeline {
                    let material = self.scene.materials.get_or_default(&gpu_material.material_id);
                    gpu_material.write(queue, material);
                }
            }
        }
    }

    fn render_frame(&mut self) -> FrameStatus {
        let (Some(output), Some(backing)) = (self.output.as_ref(), self.backing.as_ref()) else {
            return FrameStatus::Skipped;
        };
        let device = &self.ctx.device;

        let frame = match output.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => return output.handle_surface_error(device, err),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &backing.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, backing.globals.bind_group(), &[]);

            let mut bound_pipeline: Option<&PipelineKey> = None;
            for drawable in &self.drawables {
                let (Some(mesh), Some(materials)) = (drawable.geometry(), drawable.materials())
                else {
                    continue;
                };
                render_pass.set_mesh(mesh);

                for group in 0..mesh.groups().len() {
                    let Some(material) = materials.get(group) else {
                        continue;
                    };
                    if bound_pipeline != Some(&material.pipeline) {
                        let Some(pipeline) = backing.pipelines.get(&material.pipeline) else {
                            continue;
                        };
                        render_pass.set_pipeline(pipeline);
                        if material.pipeline == PipelineKey::Standard {
                            render_pass.set_bind_group(3, &backing.environment_bind_group, &[]);
                        }
                        bound_pipeline = Some(&material.pipeline);
                    }
                    render_pass.set_bind_group(2, material.bind_group(), &[]);
                    render_pass.draw_group(mesh, group);
                }
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        FrameStatus::Presented
    }
}

fn choose_surface_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    let preferred = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    preferred
        .into_iter()
        .find(|format| caps.formats.contains(format))
        .or_else(|| caps.formats.first().copied())
}

/// Scales `width`x`height` down, keeping its aspect, until neither side
/// exceeds `max`. Zero sides become 1.
fn fit_to_limit(width: u32, height: u32, max: u32) -> (u32, u32) {
    let (width, height) = (width.max(1), height.max(1));
    let largest = width.max(height);
    if largest <= max {
        return (width, height);
    }

    let scale = f64::from(max) / f64::from(largest);
    let shrink = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max);
    (shrink(width), shrink(height))
}

fn check_texture_size(label: &str, size: u32, max: u32) -> Result<(), GpuError> {
    if size > max {
        return Err(GpuError::TextureTooLarge {
            label: label.to_string(),
            size,
            max,
        });
    }
    Ok(())
}
