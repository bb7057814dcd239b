use crate::resource::LoadError;

use super::ShaderLibrary;

/// Full-screen graphics pipeline built from a named program.
///
/// No vertex buffers: the program derives a covering triangle from
/// `vertex_index`, so draws are always `draw(0..3, 0..1)`.
pub struct GraphicsPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl GraphicsPipeline {
    pub fn new(
        device: &wgpu::Device,
        library: &ShaderLibrary,
        program: &str,
        entries: &[wgpu::BindGroupLayoutEntry],
        target_format: wgpu::TextureFormat,
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

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(program),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("graphics pipeline '{program}' created for {target_format:?}");

        Ok(Self {
            pipeline,
            bind_group_layout,
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

    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}
