use bytemuck::{Pod, Zeroable};
use winit::dpi::PhysicalSize;

/// Unsigned 2D extent or position in physical pixels.
///
/// Layout matches WGSL `vec2<u32>`, so the type can be embedded directly in
/// uniform structs.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct UVec2 {
    pub x: u32,
    pub y: u32,
}

impl UVec2 {
    pub const ZERO: UVec2 = UVec2 { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// True if either axis is zero (minimized window, empty image).
    #[inline]
    pub const fn has_zero_area(self) -> bool {
        self.x == 0 || self.y == 0
    }

    #[inline]
    pub const fn area(self) -> u64 {
        self.x as u64 * self.y as u64
    }

    /// Clamps a floating-point position into `[0, self - 1]` on both axes.
    ///
    /// Negative and non-finite inputs map to zero. A zero extent yields `ZERO`.
    pub fn clamp_position(self, x: f32, y: f32) -> UVec2 {
        fn axis(v: f32, len: u32) -> u32 {
            if len == 0 || !v.is_finite() || v <= 0.0 {
                return 0;
            }
            (v as u32).min(len - 1)
        }
        UVec2::new(axis(x, self.x), axis(y, self.y))
    }

    /// Number of `tile`-sized groups needed to cover this extent.
    #[inline]
    pub fn div_ceil(self, tile: UVec2) -> UVec2 {
        UVec2::new(self.x.div_ceil(tile.x.max(1)), self.y.div_ceil(tile.y.max(1)))
    }
}

impl From<PhysicalSize<u32>> for UVec2 {
    #[inline]
    fn from(size: PhysicalSize<u32>) -> Self {
        UVec2::new(size.width, size.height)
    }
}

impl From<UVec2> for PhysicalSize<u32> {
    #[inline]
    fn from(v: UVec2) -> Self {
        PhysicalSize::new(v.x, v.y)
    }
}

impl From<UVec2> for wgpu::Extent3d {
    #[inline]
    fn from(v: UVec2) -> Self {
        wgpu::Extent3d {
            width: v.x,
            height: v.y,
            depth_or_array_layers: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── clamp_position ────────────────────────────────────────────────────

    #[test]
    fn clamp_interior_truncates() {
        let ext = UVec2::new(800, 600);
        assert_eq!(ext.clamp_position(10.7, 20.2), UVec2::new(10, 20));
    }

    #[test]
    fn clamp_outside_hits_last_pixel() {
        let ext = UVec2::new(800, 600);
        assert_eq!(ext.clamp_position(5000.0, 601.0), UVec2::new(799, 599));
    }

    #[test]
    fn clamp_negative_and_nan_are_zero() {
        let ext = UVec2::new(800, 600);
        assert_eq!(ext.clamp_position(-3.0, f32::NAN), UVec2::ZERO);
    }

    #[test]
    fn clamp_into_zero_extent() {
        assert_eq!(UVec2::ZERO.clamp_position(12.0, 12.0), UVec2::ZERO);
    }

    // ── div_ceil ──────────────────────────────────────────────────────────

    #[test]
    fn div_ceil_rounds_up_partial_tiles() {
        let groups = UVec2::new(513, 512).div_ceil(UVec2::new(8, 8));
        assert_eq!(groups, UVec2::new(65, 64));
    }

    #[test]
    fn zero_area() {
        assert!(UVec2::new(0, 10).has_zero_area());
        assert!(!UVec2::new(1, 1).has_zero_area());
        assert_eq!(UVec2::new(3, 4).area(), 12);
    }
}
