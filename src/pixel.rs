//! 像素格式与 premultiplied ARGB 像素缓冲

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::PixelError;
use crate::geometry::{Point, Rect};

/// 表面的像素格式，取值为 DRM fourcc 编码
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u32)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Argb8888 = 0x3432_5241,
    Xrgb8888 = 0x3432_5258,
    Rgb565 = 0x3631_4752,
}

impl PixelFormat {
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Argb8888 | Self::Xrgb8888 => 32,
            Self::Rgb565 => 16,
        }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Argb8888)
    }

    /// 能否作为 source-over 合成的目标
    pub const fn is_composable(self) -> bool {
        self.bits_per_pixel() == 32
    }
}

/// Source-over with premultiplied alpha: `dst = src + dst * (1 - src.a)`.
pub fn blend_over(src: u32, dst: u32) -> u32 {
    let alpha = src >> 24;
    if alpha == 0xff {
        return src;
    }
    if src == 0 {
        return dst;
    }
    let inverse = 0xff - alpha;
    let mut out = 0;
    for shift in [0, 8, 16, 24] {
        let s = (src >> shift) & 0xff;
        let d = (dst >> shift) & 0xff;
        out |= (s + mul_div_255(d, inverse)).min(0xff) << shift;
    }
    out
}

fn mul_div_255(a: u32, b: u32) -> u32 {
    let t = a * b + 0x80;
    (t + (t >> 8)) >> 8
}

fn alloc_pixels(width: u32, height: u32, fill: u32) -> Result<Vec<u32>, PixelError> {
    let failed = || PixelError::Allocation { width, height };
    let len = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(failed)?;
    let mut pixels = Vec::new();
    pixels.try_reserve_exact(len).map_err(|_| failed())?;
    pixels.resize(len, fill);
    Ok(pixels)
}

/// 裁剪一次从 `src_rect` 到 `dst` 的拷贝，两端分别受各自边界约束
fn clip_copy(src_bounds: Rect, dst_bounds: Rect, src_rect: Rect, dst: Point) -> Option<(Rect, Point)> {
    let dx = dst.x.saturating_sub(src_rect.x);
    let dy = dst.y.saturating_sub(src_rect.y);
    let src = src_rect.intersect(&src_bounds)?;
    let landed = src.translate(dx, dy).intersect(&dst_bounds)?;
    Some((landed.translate(dx.saturating_neg(), dy.saturating_neg()), landed.origin()))
}

/// 行优先的 `0xAARRGGBB` 像素缓冲
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self, PixelError> {
        Self::filled(width, height, 0)
    }

    pub fn filled(width: u32, height: u32, color: u32) -> Result<Self, PixelError> {
        Ok(Self {
            width,
            height,
            pixels: alloc_pixels(width, height, color)?,
        })
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, PixelError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(PixelError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.bounds()
            .contains(x, y)
            .then(|| self.pixels[self.index(x, y)])
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if self.bounds().contains(x, y) {
            let i = self.index(x, y);
            self.pixels[i] = color;
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: u32) {
        let Some(area) = rect.intersect(&self.bounds()) else {
            return;
        };
        for y in area.y..area.bottom() {
            let start = self.index(area.x, y);
            self.pixels[start..start + area.width as usize].fill(color);
        }
    }

    /// 读出 `rect` 内的像素，`rect` 必须完全落在缓冲内
    pub fn read_rect(&self, rect: Rect) -> Result<PixelBuffer, PixelError> {
        let inside = rect.is_empty() || rect.intersect(&self.bounds()) == Some(rect);
        if rect.width < 0 || rect.height < 0 || !inside {
            return Err(PixelError::OutOfBounds {
                rect,
                width: self.width,
                height: self.height,
            });
        }
        let (width, height) = (rect.width as u32, rect.height as u32);
        let mut out = PixelBuffer::new(width, height)?;
        let w = rect.width as usize;
        for row in 0..rect.height {
            let src = self.index(rect.x, rect.y + row);
            let dst = out.index(0, row);
            out.pixels[dst..dst + w].copy_from_slice(&self.pixels[src..src + w]);
        }
        Ok(out)
    }

    /// 把 `src` 中的 `src_rect` 拷到自身的 `dst`，越界部分被丢弃
    pub fn copy_from(&mut self, src: &PixelBuffer, src_rect: Rect, dst: Point) {
        let Some((area, at)) = clip_copy(src.bounds(), self.bounds(), src_rect, dst) else {
            return;
        };
        let w = area.width as usize;
        for row in 0..area.height {
            let s = src.index(area.x, area.y + row);
            let d = self.index(at.x, at.y + row);
            self.pixels[d..d + w].copy_from_slice(&src.pixels[s..s + w]);
        }
    }

    /// Buffer-internal copy; source and destination may overlap.
    pub fn copy_within(&mut self, src_rect: Rect, dst: Point) {
        let bounds = self.bounds();
        let Some((area, at)) = clip_copy(bounds, bounds, src_rect, dst) else {
            return;
        };
        let w = area.width as usize;
        let downward = at.y > area.y;
        for i in 0..area.height {
            let row = if downward { area.height - 1 - i } else { i };
            let s = self.index(area.x, area.y + row);
            let d = self.index(at.x, at.y + row);
            self.pixels.copy_within(s..s + w, d);
        }
    }

    /// 以 source-over 把整个 `src` 合成到 `at`。`opaque` 为真时结果 alpha 强制为 0xff
    pub fn blend_from(&mut self, src: &PixelBuffer, at: Point, opaque: bool) {
        let Some((area, at)) = clip_copy(src.bounds(), self.bounds(), src.bounds(), at) else {
            return;
        };
        let w = area.width as usize;
        for row in 0..area.height {
            let s = src.index(area.x, area.y + row);
            let d = self.index(at.x, at.y + row);
            let src_row = &src.pixels[s..s + w];
            for (dst, &px) in self.pixels[d..d + w].iter_mut().zip(src_row) {
                let blended = blend_over(px, *dst);
                *dst = if opaque { blended | 0xff00_0000 } else { blended };
            }
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let pixels = (0..width * height).map(|i| 0xff00_0000 | i).collect();
        PixelBuffer::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn format_codes_round_trip_through_num_enum() {
        assert_eq!(
            PixelFormat::try_from(0x3432_5241_u32).ok(),
            Some(PixelFormat::Argb8888)
        );
        assert_eq!(u32::from(PixelFormat::Xrgb8888), 0x3432_5258);
        assert!(PixelFormat::try_from(0xdead_beef_u32).is_err());
        assert!(!PixelFormat::Rgb565.is_composable());
    }

    #[test]
    fn blend_opaque_and_transparent() {
        assert_eq!(blend_over(0xff11_2233, 0xffaa_bbcc), 0xff11_2233);
        assert_eq!(blend_over(0, 0xffaa_bbcc), 0xffaa_bbcc);
    }

    #[test]
    fn blend_half_alpha_over_white() {
        assert_eq!(blend_over(0x8040_4040, 0xffff_ffff), 0xffbf_bfbf);
    }

    #[test]
    fn read_rect_rejects_out_of_bounds() {
        let buf = gradient(8, 8);
        assert!(buf.read_rect(Rect::new(6, 6, 4, 4)).is_err());
        let part = buf.read_rect(Rect::new(2, 3, 2, 2)).unwrap();
        assert_eq!(part.pixels(), &[0xff00_001a, 0xff00_001b, 0xff00_0022, 0xff00_0023]);
    }

    #[test]
    fn copy_from_clips_both_sides() {
        let src = gradient(4, 4);
        let mut dst = PixelBuffer::new(4, 4).unwrap();
        dst.copy_from(&src, Rect::new(-1, -1, 3, 3), Point::new(2, 2));
        // only src (0,0)..(2,2) lands, at dst (3,3)
        assert_eq!(dst.pixel(3, 3), src.pixel(0, 0));
        assert_eq!(dst.pixel(2, 2), Some(0));
    }

    #[test]
    fn copy_within_handles_overlap() {
        let mut buf = gradient(6, 6);
        let before = buf.clone();
        buf.copy_within(Rect::new(0, 0, 4, 4), Point::new(1, 1));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(buf.pixel(x + 1, y + 1), before.pixel(x, y));
            }
        }
    }

    #[test]
    fn oversized_allocation_fails_cleanly() {
        assert!(matches!(
            PixelBuffer::new(u32::MAX, u32::MAX),
            Err(PixelError::Allocation { .. })
        ));
    }
}
