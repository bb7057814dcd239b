use std::marker::PhantomData;
use std::num::NonZeroU64;

use bytemuck::Pod;

/// Uniform buffer holding exactly one `T`.
///
/// Writes go through `Queue::write_buffer` and become visible to the next
/// submission.
pub struct UniformBuffer<T> {
    buffer: wgpu::Buffer,
    _marker: PhantomData<T>,
}

impl<T: Pod> UniformBuffer<T> {
    pub fn new(device: &wgpu::Device, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<T>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            _marker: PhantomData,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, value: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }

    pub fn binding(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    /// Minimum binding size for bind group layouts; `None` for zero-sized `T`.
    pub fn min_binding_size() -> Option<NonZeroU64> {
        NonZeroU64::new(std::mem::size_of::<T>() as u64)
    }
}
