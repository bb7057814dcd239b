use crate::coords::UVec2;
use crate::resource::LoadError;

use super::ShaderLibrary;

/// Compute pipeline built from a named program with one bind group.
pub struct ComputePipeline {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,

    /// Must match the program's `@workgroup_size(x, y)`.
    workgroup_size: UVec2,
}

impl ComputePipeline {
    pub fn new(
        device: &wgpu::Device,
        library: &ShaderLibrary,
        program: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
        workgroup_size: UVec2,
    ) -> Result<Self, LoadError> {
        let module = library.module(device, program)?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(program),
            entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(program),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(program),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("cs_main"),
            compilation_options: Default::default(),
            cache: None,
        });

        log::debug!("compute pipeline '{program}' created");

        Ok(Self {
            pipeline,
            bind_group_layout,
            workgroup_size,
        })
    }

    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        entries: &[wgpu::BindGroupEntry<'_>],
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries,
        })
    }

    /// Workgroup counts covering `extent` (partial tiles round up).
    pub fn workgroups_for(&self, extent: UVec2) -> UVec2 {
        extent.div_ceil(self.workgroup_size)
    }

    pub fn raw(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }
}
