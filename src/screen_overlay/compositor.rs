use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::OverlayError;
use crate::geometry::{Point, Rect};
use crate::pixel::{PixelBuffer, PixelFormat};
use crate::surface::Framebuffer;

use super::{OverlayContent, OverlaySource};

/// 已经实现成像素的叠加层内容
struct Realized {
    content: Rc<OverlayContent>,
    pixels: PixelBuffer,
}

/// 叠加层的像素后端：实现内容，合成到表面上，保存和恢复底下的像素。
///
/// 每个表面一个，除当前实现的内容和一块只增不减的备份缓冲外没有别的状态。
#[derive(Default)]
pub struct OverlayCompositor {
    realized: Option<Realized>,
    save: Option<PixelBuffer>,
    allocations: u32,
}

impl OverlayCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_format(format: PixelFormat) -> Result<(), OverlayError> {
        if format.is_composable() {
            Ok(())
        } else {
            Err(OverlayError::UnsupportedFormat(format))
        }
    }

    /// 把 `content` 画进离屏缓冲，替换并释放之前实现的内容
    pub fn realize(&mut self, content: &Rc<OverlayContent>) -> Result<(), OverlayError> {
        let (width, height) = (content.width(), content.height());
        let mut pixels = PixelBuffer::new(width.into(), height.into())?;
        match content.source() {
            OverlaySource::Painter(painter) => painter.paint(&mut pixels),
            OverlaySource::Argb(argb) => {
                if argb.len() != pixels.pixels().len() {
                    return Err(OverlayError::ContentSize {
                        width,
                        height,
                        actual: argb.len(),
                    });
                }
                pixels.pixels_mut().copy_from_slice(argb);
            }
        }
        self.realized = Some(Realized {
            content: Rc::clone(content),
            pixels,
        });
        Ok(())
    }

    pub fn unrealize(&mut self) {
        self.realized = None;
    }

    /// 当前实现的是不是这份内容
    pub fn is_realized(&self, content: &Rc<OverlayContent>) -> bool {
        self.realized
            .as_ref()
            .is_some_and(|r| Rc::ptr_eq(&r.content, content))
    }

    /// 实现 `content` 并以 source-over 合成到 `at`
    pub fn put_up(
        &mut self,
        fb: &mut Framebuffer,
        content: &Rc<OverlayContent>,
        at: Point,
    ) -> Result<(), OverlayError> {
        let format = fb.format();
        Self::check_format(format)?;
        self.realize(content)?;
        if let Some(realized) = &self.realized {
            fb.buffer_mut()
                .blend_from(&realized.pixels, at, !format.has_alpha());
        }
        Ok(())
    }

    /// 把表面上 `area` 的像素存进备份缓冲，缓冲不够大时才重新分配
    pub fn save_under(&mut self, fb: &Framebuffer, area: Rect) -> Result<(), OverlayError> {
        Self::check_format(fb.format())?;
        let too_small = self.save.as_ref().is_none_or(|save| {
            (save.width() as i32) < area.width || (save.height() as i32) < area.height
        });
        if too_small {
            let (width, height) = (area.width.max(0) as u32, area.height.max(0) as u32);
            self.save = None;
            self.save = Some(PixelBuffer::new(width, height)?);
            self.allocations += 1;
            debug!(width, height, "allocated overlay backing buffer");
        }
        if let Some(save) = self.save.as_mut() {
            save.copy_from(fb.buffer(), area, Point::new(0, 0));
        }
        trace!(?area, "saved pixels under overlay");
        Ok(())
    }

    /// 把 [`save_under`](Self::save_under) 存下的像素写回 `area`
    pub fn restore_under(&self, fb: &mut Framebuffer, area: Rect) -> Result<(), OverlayError> {
        Self::check_format(fb.format())?;
        let Some(save) = &self.save else {
            return Err(OverlayError::NothingSaved);
        };
        fb.buffer_mut().copy_from(
            save,
            Rect::new(0, 0, area.width, area.height),
            area.origin(),
        );
        trace!(?area, "restored pixels under overlay");
        Ok(())
    }

    pub fn backing_size(&self) -> Option<(u32, u32)> {
        self.save.as_ref().map(|s| (s.width(), s.height()))
    }

    /// 备份缓冲被分配过的次数
    pub fn backing_allocations(&self) -> u32 {
        self.allocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned(format: PixelFormat) -> Framebuffer {
        let mut fb = Framebuffer::new(32, 32, format).unwrap();
        for (i, px) in fb.buffer_mut().pixels_mut().iter_mut().enumerate() {
            *px = 0xff00_0000 | ((i as u32).wrapping_mul(2_654_435_761) & 0x00ff_ffff);
        }
        fb
    }

    fn solid(width: u16, height: u16, color: u32) -> Rc<OverlayContent> {
        let argb = vec![color; width as usize * height as usize];
        Rc::new(OverlayContent::from_argb(width, height, argb))
    }

    #[test]
    fn save_mutate_restore_is_bit_identical() {
        let mut fb = patterned(PixelFormat::Argb8888);
        let before = fb.clone();
        let area = Rect::new(3, 5, 12, 9);
        let mut compositor = OverlayCompositor::new();
        compositor.save_under(&fb, area).unwrap();
        fb.buffer_mut().fill_rect(area, 0xffff_0000);
        compositor.restore_under(&mut fb, area).unwrap();
        assert_eq!(fb.buffer(), before.buffer());
    }

    #[test]
    fn partially_offscreen_area_round_trips() {
        let mut fb = patterned(PixelFormat::Argb8888);
        let before = fb.clone();
        let area = Rect::new(-4, 26, 12, 12);
        let mut compositor = OverlayCompositor::new();
        compositor.save_under(&fb, area).unwrap();
        fb.buffer_mut().fill_rect(area, 0);
        compositor.restore_under(&mut fb, area).unwrap();
        assert_eq!(fb.buffer(), before.buffer());
    }

    #[test]
    fn restore_without_save_fails() {
        let mut fb = patterned(PixelFormat::Argb8888);
        let compositor = OverlayCompositor::new();
        assert_eq!(
            compositor.restore_under(&mut fb, Rect::new(0, 0, 4, 4)),
            Err(OverlayError::NothingSaved)
        );
    }

    #[test]
    fn backing_grows_but_never_shrinks() {
        let fb = patterned(PixelFormat::Argb8888);
        let mut compositor = OverlayCompositor::new();
        compositor.save_under(&fb, Rect::new(0, 0, 10, 10)).unwrap();
        compositor.save_under(&fb, Rect::new(0, 0, 6, 8)).unwrap();
        assert_eq!(compositor.backing_allocations(), 1);
        assert_eq!(compositor.backing_size(), Some((10, 10)));
        compositor.save_under(&fb, Rect::new(0, 0, 6, 12)).unwrap();
        assert_eq!(compositor.backing_allocations(), 2);
        assert_eq!(compositor.backing_size(), Some((6, 12)));
    }

    #[test]
    fn put_up_blends_over_destination() {
        let mut fb = Framebuffer::new(8, 8, PixelFormat::Argb8888).unwrap();
        let bounds = fb.bounds();
        fb.buffer_mut().fill_rect(bounds, 0xffff_ffff);
        let content = solid(2, 2, 0x8040_4040);
        let mut compositor = OverlayCompositor::new();
        compositor.put_up(&mut fb, &content, Point::new(3, 3)).unwrap();
        assert!(compositor.is_realized(&content));
        assert_eq!(fb.buffer().pixel(3, 3), Some(0xffbf_bfbf));
        assert_eq!(fb.buffer().pixel(5, 5), Some(0xffff_ffff));
    }

    #[test]
    fn xrgb_destination_stays_opaque() {
        let mut fb = Framebuffer::new(4, 4, PixelFormat::Xrgb8888).unwrap();
        let content = solid(1, 1, 0x4020_2020);
        let mut compositor = OverlayCompositor::new();
        compositor.put_up(&mut fb, &content, Point::new(0, 0)).unwrap();
        assert_eq!(fb.buffer().pixel(0, 0), Some(0xff20_2020));
    }

    #[test]
    fn painter_runs_on_a_content_sized_buffer() {
        let mut fb = Framebuffer::new(8, 8, PixelFormat::Argb8888).unwrap();
        let content = Rc::new(OverlayContent::with_painter(3, 2, |target: &mut PixelBuffer| {
            assert_eq!((target.width(), target.height()), (3, 2));
            target.fill_rect(target.bounds(), 0xff00_ff00);
        }));
        let mut compositor = OverlayCompositor::new();
        compositor.put_up(&mut fb, &content, Point::new(1, 1)).unwrap();
        assert_eq!(fb.buffer().pixel(3, 2), Some(0xff00_ff00));
        assert_eq!(fb.buffer().pixel(4, 2), Some(0));
    }

    #[test]
    fn wrong_sized_argb_is_rejected() {
        let mut fb = Framebuffer::new(8, 8, PixelFormat::Argb8888).unwrap();
        let content = Rc::new(OverlayContent::from_argb(4, 4, vec![0; 3]));
        let mut compositor = OverlayCompositor::new();
        let err = compositor
            .put_up(&mut fb, &content, Point::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, OverlayError::ContentSize { actual: 3, .. }));
        assert!(fb.buffer().pixels().iter().all(|&px| px == 0));
    }

    #[test]
    fn rgb565_surfaces_are_refused() {
        let mut fb = Framebuffer::new(8, 8, PixelFormat::Rgb565).unwrap();
        let mut compositor = OverlayCompositor::new();
        assert_eq!(
            compositor.save_under(&fb, Rect::new(0, 0, 2, 2)),
            Err(OverlayError::UnsupportedFormat(PixelFormat::Rgb565))
        );
        let content = solid(1, 1, 0xffff_ffff);
        assert!(compositor.put_up(&mut fb, &content, Point::new(0, 0)).is_err());
    }
}
