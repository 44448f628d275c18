use std::cell::RefCell;
use std::rc::Rc;

use crate::error::SurfaceError;
use crate::geometry::{Point, Rect, Region, Span};
use crate::pixel::PixelBuffer;
use crate::surface::{Drawable, Framebuffer, SurfaceOps, Window};

use super::sprite::OverlaySprite;

/// 包在表面操作外面的一层：读或搬移的区域碰到叠加层时，先撤下叠加层再交给内层。
///
/// 像素图不是帧缓冲，对它的读取不做检查。
pub struct OverlayInterceptor {
    inner: Box<dyn SurfaceOps>,
    sprite: Rc<RefCell<OverlaySprite>>,
}

impl OverlayInterceptor {
    pub fn wrap(inner: Box<dyn SurfaceOps>, sprite: Rc<RefCell<OverlaySprite>>) -> Self {
        Self { inner, sprite }
    }

    fn check_area(&self, fb: &mut Framebuffer, drawable: Drawable<'_>, area: Rect, trigger: &str) {
        if let Some(area) = drawable.to_screen(area) {
            self.sprite
                .borrow_mut()
                .remove_if_overlapping(fb, &area, trigger);
        }
    }
}

impl SurfaceOps for OverlayInterceptor {
    fn get_image(
        &mut self,
        fb: &mut Framebuffer,
        drawable: Drawable<'_>,
        area: Rect,
    ) -> Result<PixelBuffer, SurfaceError> {
        self.check_area(fb, drawable, area, "get_image");
        self.inner.get_image(fb, drawable, area)
    }

    fn get_spans(
        &mut self,
        fb: &mut Framebuffer,
        drawable: Drawable<'_>,
        spans: &[Span],
    ) -> Result<Vec<Vec<u32>>, SurfaceError> {
        if let Some(window) = drawable.window() {
            let mut sprite = self.sprite.borrow_mut();
            // 第一条碰到的扫描线就够了
            let hit = spans
                .iter()
                .map(|span| span.as_rect().translate(window.x, window.y))
                .find(|area| sprite.overlaps_saved(area));
            if let Some(area) = hit {
                sprite.remove_if_overlapping(fb, &area, "get_spans");
            }
        }
        self.inner.get_spans(fb, drawable, spans)
    }

    fn source_validate(&mut self, fb: &mut Framebuffer, drawable: Drawable<'_>, area: Rect) {
        self.check_area(fb, drawable, area, "source_validate");
        self.inner.source_validate(fb, drawable, area);
    }

    fn copy_window(
        &mut self,
        fb: &mut Framebuffer,
        window: &Window,
        old_origin: Point,
        src: &Region,
    ) {
        // 目标区域由脏区域上报负责
        self.sprite
            .borrow_mut()
            .remove_if_region_overlaps(fb, src, "copy_window");
        self.inner.copy_window(fb, window, old_origin, src);
    }

    fn into_inner(self: Box<Self>) -> Result<Box<dyn SurfaceOps>, Box<dyn SurfaceOps>> {
        Ok(self.inner)
    }
}
