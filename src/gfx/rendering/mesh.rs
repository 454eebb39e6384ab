use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::{
    gfx::scene::SceneObject,
    lifecycle::GpuResource,
    wgpu_utils::{BindGroupBuilder, BindGroupLayoutWithDesc, UniformBuffer},
};

/// Per-object model matrix, bound at group 1.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
}

/// Geometry of one scene object uploaded to the GPU.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    transform: UniformBuffer<TransformUniform>,
    transform_bind_group: wgpu::BindGroup,
    groups: Vec<Range<u32>>,
}

impl GpuMesh {
    pub fn new(
        device: &wgpu::Device,
        transform_layout: &BindGroupLayoutWithDesc,
        object: &SceneObject,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", object.name)),
            contents: bytemuck::cast_slice(&object.mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", object.name)),
            contents: bytemuck::cast_slice(&object.mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let transform = UniformBuffer::new_with_data(
            device,
            &TransformUniform {
                model: object.transform.into(),
            },
        );
        let transform_bind_group = BindGroupBuilder::new(transform_layout)
            .resource(transform.binding_resource())
            .create(device, &format!("{} Transform Bind Group", object.name));

        Self {
            vertex_buffer,
            index_buffer,
            transform,
            transform_bind_group,
            groups: object.mesh.groups.clone(),
        }
    }

    /// Index range of every material group.
    pub fn groups(&self) -> &[Range<u32>] {
        &self.groups
    }
}

impl GpuResource for GpuMesh {
    fn release(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.transform.destroy();
    }
}

pub trait DrawMesh<'a> {
    /// Binds the mesh buffers and transform (group 1).
    fn set_mesh(&mut self, mesh: &'a GpuMesh);
    /// Draws one material group of the bound mesh.
    fn draw_group(&mut self, mesh: &'a GpuMesh, group: usize);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn set_mesh(&mut self, mesh: &'b GpuMesh) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(1, &mesh.transform_bind_group, &[]);
    }

    fn draw_group(&mut self, mesh: &'b GpuMesh, group: usize) {
        if let Some(range) = mesh.groups.get(group) {
            if !range.is_empty() {
                self.draw_indexed(range.clone(), 0, 0..1);
            }
        }
    }
}
