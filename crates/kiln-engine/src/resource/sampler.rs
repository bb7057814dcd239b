/// Immutable texture sampler.
pub struct Sampler {
    sampler: wgpu::Sampler,
}

impl Sampler {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        filter: wgpu::FilterMode,
        address_mode: wgpu::AddressMode,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self { sampler }
    }

    pub fn raw(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
