//! Render pipeline management
//!
//! One pipeline per [`PipelineKey`]: a shared pipeline for every standard
//! material and one per shader material, built when the surface is attached
//! and dropped when it is detached.

use std::collections::HashMap;

use log::debug;
use wgpu::*;

use crate::gfx::{error::GpuError, resources::PipelineKey, scene::Vertex3D};

/// Configuration for creating a render pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub cull_mode: Option<Face>,
    pub color_format: TextureFormat,
    pub depth_format: Option<TextureFormat>,
}

impl PipelineConfig {
    pub fn new(label: &str, color_format: TextureFormat) -> Self {
        Self {
            label: label.to_string(),
            bind_group_layouts: Vec::new(),
            cull_mode: Some(Face::Back),
            color_format,
            depth_format: None,
        }
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn with_depth_format(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }
}

/// Owns the render pipelines of an attached surface.
#[derive(Default)]
pub struct PipelineManager {
    pipelines: HashMap<PipelineKey, RenderPipeline>,
}

impl PipelineManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `vertex_source` (entry `vs_main`) and `fragment_source`
    /// (entry `fs_main`) into a pipeline stored under `key`.
    ///
    /// Validation errors are captured and returned instead of reaching the
    /// device's uncaptured error handler.
    pub fn create_pipeline(
        &mut self,
        device: &Device,
        key: PipelineKey,
        vertex_source: &str,
        fragment_source: &str,
        config: &PipelineConfig,
    ) -> Result<(), GpuError> {
        device.push_error_scope(ErrorFilter::Validation);

        let vertex_module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(&format!("{} Vertex", config.label)),
            source: ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment_module = if fragment_source == vertex_source {
            None
        } else {
            Some(device.create_shader_module(ShaderModuleDescriptor {
                label: Some(&format!("{} Fragment", config.label)),
                source: ShaderSource::Wgsl(fragment_source.into()),
            }))
        };

        let bind_group_layout_refs: Vec<&BindGroupLayout> =
            config.bind_group_layouts.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", config.label)),
            bind_group_layouts: &bind_group_layout_refs,
            push_constant_ranges: &[],
        });

        let depth_stencil = config.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&config.label),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &vertex_module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: fragment_module.as_ref().unwrap_or(&vertex_module),
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: config.color_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: config.cull_mode,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::Pipeline {
                label: config.label.clone(),
                message: error.to_string(),
            });
        }

        debug!("Created pipeline '{}'", config.label);
        self.pipelines.insert(key, pipeline);
        Ok(())
    }

    pub fn get(&self, key: &PipelineKey) -> Option<&RenderPipeline> {
        self.pipelines.get(key)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}
