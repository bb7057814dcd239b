use std::path::Path;

use crate::coords::UVec2;

use super::LoadError;

/// 2D texture plus its default view.
pub struct Image {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    extent: UVec2,
}

impl Image {
    /// Image written by compute shaders and sampled afterwards.
    pub fn storage(
        device: &wgpu::Device,
        label: &str,
        extent: UVec2,
        format: wgpu::TextureFormat,
    ) -> Self {
        let usage = wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING;
        Self::create(device, label, extent, format, usage)
    }

    /// sRGB image uploaded once from tightly packed RGBA8 pixels.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        extent: UVec2,
        pixels: &[u8],
    ) -> Self {
        debug_assert_eq!(pixels.len() as u64, extent.area() * 4);

        let usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
        let image = Self::create(
            device,
            label,
            extent,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            usage,
        );

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &image.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(extent.x * 4),
                rows_per_image: Some(extent.y),
            },
            extent.into(),
        );

        image
    }

    /// Loads and uploads an image file (any format enabled on the `image` crate).
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (extent, pixels) = decode_rgba8(&bytes, path)?;

        let limit = device.limits().max_texture_dimension_2d;
        if extent.x > limit || extent.y > limit {
            return Err(LoadError::TooLarge {
                path: path.to_path_buf(),
                width: extent.x,
                height: extent.y,
                limit,
            });
        }

        log::info!("loaded {} ({}x{})", path.display(), extent.x, extent.y);
        let label = path.file_name().and_then(|n| n.to_str()).unwrap_or("image");
        Ok(Self::from_rgba8(device, queue, label, extent, &pixels))
    }

    fn create(
        device: &wgpu::Device,
        label: &str,
        extent: UVec2,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent.into(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            extent,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn extent(&self) -> UVec2 {
        self.extent
    }
}

/// Decodes an encoded image into tightly packed RGBA8 pixels.
///
/// `path` is only used for error reporting.
pub fn decode_rgba8(bytes: &[u8], path: &Path) -> Result<(UVec2, Vec<u8>), LoadError> {
    let decoded = ::image::load_from_memory(bytes).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let rgba = decoded.to_rgba8();
    let extent = UVec2::new(rgba.width(), rgba.height());
    if extent.has_zero_area() {
        return Err(LoadError::EmptyImage {
            path: path.to_path_buf(),
        });
    }

    Ok((extent, rgba.into_raw()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = ::image::RgbaImage::from_fn(width, height, |x, y| {
            ::image::Rgba([x as u8, y as u8, 7, 255])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ::image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_to_packed_rgba() {
        let (extent, pixels) = decode_rgba8(&png(3, 2), Path::new("t.png")).unwrap();
        assert_eq!(extent, UVec2::new(3, 2));
        assert_eq!(pixels.len(), 3 * 2 * 4);
        // Pixel (2, 1).
        let i = (3 + 2) * 4;
        assert_eq!(&pixels[i..i + 4], &[2, 1, 7, 255]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_rgba8(b"not an image", Path::new("bad.png")).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
        assert!(err.to_string().contains("bad.png"));
    }
}
