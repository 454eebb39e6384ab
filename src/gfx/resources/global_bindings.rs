//! Global uniform bindings for camera and scene lights
//!
//! Bound to slot 0 in every render pipeline.

use crate::{
    gfx::{camera::CameraUniform, scene::Lights},
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        UniformBuffer,
    },
};

/// Global uniform buffer content
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    pub light_position: [f32; 4],
    /// RGB colour, intensity in `w`.
    pub light_color: [f32; 4],
    /// RGB colour, intensity in `w`.
    pub ambient: [f32; 4],
}

impl GlobalUniform {
    pub fn new(camera: &CameraUniform, lights: &Lights) -> Self {
        let directional = &lights.directional;
        let ambient = &lights.ambient;
        let [lx, ly, lz] = directional.position;
        let [dr, dg, db] = directional.color;
        let [ar, ag, ab] = ambient.color;

        Self {
            view_proj: camera.view_proj,
            view_position: camera.view_position,
            light_position: [lx, ly, lz, 1.0],
            light_color: [dr, dg, db, directional.intensity],
            ambient: [ar, ag, ab, ambient.intensity],
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Global uniform buffer plus its layout and bind group
pub struct GlobalBindings {
    ubo: GlobalUBO,
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, initial: &GlobalUniform) -> Self {
        let ubo = GlobalUBO::new_with_data(device, initial);
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Globals Bind Group");

        Self {
            ubo,
            bind_group_layout,
            bind_group,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, content: GlobalUniform) {
        self.ubo.update_content(queue, content);
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn release(self) {
        self.ubo.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_packs_lights() {
        let lights = Lights::default();
        let uniform = GlobalUniform::new(&CameraUniform::default(), &lights);

        assert_eq!(uniform.light_position, [20.0, 20.0, 20.0, 1.0]);
        assert_eq!(uniform.light_color, [1.0, 1.0, 1.0, 3.0]);
        assert_eq!(uniform.ambient, [1.0, 1.0, 1.0, 0.7]);
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 128);
    }
}
