//! GPU side of a frame: what the sequencer asks for, and the wgpu implementation.

use anyhow::{Context, Result};
use winit::window::Window;

use kiln_engine::coords::UVec2;
use kiln_engine::device::{FrameError, Gpu, GpuFrame};
use kiln_engine::frames::Timeline;
use kiln_engine::pipeline::{
    sampled_image, sampler, storage_image, uniform, ComputePipeline, GraphicsPipeline,
    ShaderLibrary,
};
use kiln_engine::resource::{Image, Sampler, UniformBuffer};

use crate::config::TaskConfig;
use crate::params::ShaderParams;
use crate::shaders::{SHADER_TOY, TEXTURE_SHADER_TOY, TEXTURE_WORKGROUP};

/// Operations the sequencer drives, in the order it drives them.
///
/// The backend's [`Timeline`] is the one the frame ring waits on, so
/// `Self::Submission` is what `submit` hands back.
pub trait FrameBackend: Timeline {
    /// Per-slot parameter storage.
    type ParamsBuffer;

    /// One frame being recorded.
    type Frame;

    fn create_params_buffer(&mut self, slot: usize) -> Self::ParamsBuffer;

    /// Acquires a presentable image and starts recording.
    fn acquire(&mut self) -> Result<Self::Frame, FrameError>;

    /// Host write into `buffer`. Only called on a reclaimed slot.
    fn write_params(&mut self, buffer: &Self::ParamsBuffer, params: &ShaderParams);

    /// Stage A: dispatch the procedural-texture program.
    fn texture_stage(&mut self, frame: &mut Self::Frame, buffer: &Self::ParamsBuffer);

    /// Ends Stage A so its writes are visible to Stage B.
    fn stage_barrier(&mut self, frame: &mut Self::Frame);

    /// Stage B: composite into the presentable image.
    fn draw_stage(&mut self, frame: &mut Self::Frame, buffer: &Self::ParamsBuffer);

    /// Submits and presents; returns the marker the slot is retired with.
    fn submit(&mut self, frame: Self::Frame) -> Self::Submission;

    /// Recreates swapchain-dependent state. Callers drain in-flight frames first.
    fn resize(&mut self, size: UVec2);
}

const PROCEDURAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Pipelines, images and samplers shared by every frame.
pub struct ToyResources {
    texture_pipeline: ComputePipeline,
    draw_pipeline: GraphicsPipeline,

    procedural: Image,
    procedural_sampler: Sampler,

    texture: Image,
    texture_sampler: Sampler,
}

impl ToyResources {
    pub fn load(gpu: &Gpu<'_>, library: &ShaderLibrary, config: &TaskConfig) -> Result<Self> {
        let device = gpu.device();
        let params_size = UniformBuffer::<ShaderParams>::min_binding_size();

        let texture_pipeline = ComputePipeline::new(
            device,
            library,
            TEXTURE_SHADER_TOY,
            &[
                uniform(0, wgpu::ShaderStages::COMPUTE, params_size),
                storage_image(1, wgpu::ShaderStages::COMPUTE, PROCEDURAL_FORMAT),
            ],
            UVec2::new(TEXTURE_WORKGROUP, TEXTURE_WORKGROUP),
        )?;

        let fragment = wgpu::ShaderStages::FRAGMENT;
        let draw_pipeline = GraphicsPipeline::new(
            device,
            library,
            SHADER_TOY,
            &[
                uniform(0, fragment, params_size),
                sampled_image(1, fragment),
                sampler(2, fragment),
                sampled_image(3, fragment),
                sampler(4, fragment),
            ],
            gpu.surface_format(),
        )?;

        anyhow::ensure!(
            !config.procedural_texture_size.has_zero_area(),
            "procedural texture size must be non-zero"
        );
        let procedural = Image::storage(
            device,
            "procedural texture",
            config.procedural_texture_size,
            PROCEDURAL_FORMAT,
        );
        let procedural_sampler = Sampler::new(
            device,
            "procedural sampler",
            wgpu::FilterMode::Linear,
            wgpu::AddressMode::Repeat,
        );

        let texture = Image::load(device, gpu.queue(), &config.texture_path)
            .with_context(|| format!("loading {}", config.texture_path.display()))?;
        let texture_sampler = Sampler::new(
            device,
            "texture sampler",
            wgpu::FilterMode::Linear,
            wgpu::AddressMode::ClampToEdge,
        );

        Ok(Self {
            texture_pipeline,
            draw_pipeline,
            procedural,
            procedural_sampler,
            texture,
            texture_sampler,
        })
    }

    fn params_slot(&self, device: &wgpu::Device, slot: usize) -> ParamsSlot {
        let label = format!("params {slot}");
        let uniform = UniformBuffer::<ShaderParams>::new(device, &label);

        let compute_bind_group = self.texture_pipeline.bind_group(
            device,
            &label,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(self.procedural.view()),
                },
            ],
        );

        let draw_bind_group = self.draw_pipeline.bind_group(
            device,
            &label,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(self.procedural.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(self.procedural_sampler.raw()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(self.texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(self.texture_sampler.raw()),
                },
            ],
        );

        ParamsSlot {
            uniform,
            compute_bind_group,
            draw_bind_group,
        }
    }
}

/// One slot's parameter buffer plus the bind groups that reference it.
pub struct ParamsSlot {
    uniform: UniformBuffer<ShaderParams>,
    compute_bind_group: wgpu::BindGroup,
    draw_bind_group: wgpu::BindGroup,
}

/// A frame under construction on the wgpu backend.
pub struct WgpuFrame {
    gpu_frame: GpuFrame,

    /// Open Stage A pass. Holds the encoder until dropped.
    texture_pass: Option<wgpu::ComputePass<'static>>,
}

/// Borrowed view of the GPU used for one callback.
pub struct WgpuBackend<'a, 'w> {
    gpu: &'a mut Gpu<'w>,
    window: Option<&'a Window>,
    resources: &'a ToyResources,
}

impl<'a, 'w> WgpuBackend<'a, 'w> {
    pub fn new(gpu: &'a mut Gpu<'w>, resources: &'a ToyResources) -> Self {
        Self {
            gpu,
            window: None,
            resources,
        }
    }

    /// Window to notify right before presenting.
    pub fn with_window(mut self, window: &'a Window) -> Self {
        self.window = Some(window);
        self
    }
}

impl Timeline for WgpuBackend<'_, '_> {
    type Submission = wgpu::SubmissionIndex;

    fn wait(&self, submission: &wgpu::SubmissionIndex) -> Result<(), FrameError> {
        self.gpu.wait(submission)
    }
}

impl FrameBackend for WgpuBackend<'_, '_> {
    type ParamsBuffer = ParamsSlot;
    type Frame = WgpuFrame;

    fn create_params_buffer(&mut self, slot: usize) -> ParamsSlot {
        self.resources.params_slot(self.gpu.device(), slot)
    }

    fn acquire(&mut self) -> Result<WgpuFrame, FrameError> {
        let gpu_frame = self.gpu.begin_frame()?;
        Ok(WgpuFrame {
            gpu_frame,
            texture_pass: None,
        })
    }

    fn write_params(&mut self, buffer: &ParamsSlot, params: &ShaderParams) {
        buffer.uniform.write(self.gpu.queue(), params);
    }

    fn texture_stage(&mut self, frame: &mut WgpuFrame, buffer: &ParamsSlot) {
        let pipeline = &self.resources.texture_pipeline;
        let groups = pipeline.workgroups_for(self.resources.procedural.extent());

        let mut pass = frame
            .gpu_frame
            .encoder
            .begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("texture stage"),
                timestamp_writes: None,
            })
            .forget_lifetime();

        pass.set_pipeline(pipeline.raw());
        pass.set_bind_group(0, &buffer.compute_bind_group, &[]);
        pass.dispatch_workgroups(groups.x, groups.y, 1);

        frame.texture_pass = Some(pass);
    }

    fn stage_barrier(&mut self, frame: &mut WgpuFrame) {
        // Ending the compute pass lets wgpu transition the procedural image
        // from storage write to sampled read before the render pass.
        drop(frame.texture_pass.take());
    }

    fn draw_stage(&mut self, frame: &mut WgpuFrame, buffer: &ParamsSlot) {
        debug_assert!(frame.texture_pass.is_none(), "draw stage began inside texture stage");

        let GpuFrame { encoder, view, .. } = &mut frame.gpu_frame;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("draw stage"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(self.resources.draw_pipeline.raw());
        pass.set_bind_group(0, &buffer.draw_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    fn submit(&mut self, mut frame: WgpuFrame) -> wgpu::SubmissionIndex {
        drop(frame.texture_pass.take());
        if let Some(window) = self.window {
            window.pre_present_notify();
        }
        self.gpu.submit(frame.gpu_frame)
    }

    fn resize(&mut self, size: UVec2) {
        self.gpu.resize(size);
    }
}
