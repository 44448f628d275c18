use crate::error::SurfaceError;
use crate::geometry::{Point, Region, Rect, Span};
use crate::pixel::PixelBuffer;

use super::framebuffer::Framebuffer;
use super::window::{Drawable, Window};

/// 会读取或搬移表面像素的入口。
///
/// 叠加层通过包一层实现来拦截这些调用，见
/// [`OverlayInterceptor`](crate::screen_overlay::intercept::OverlayInterceptor)。
pub trait SurfaceOps {
    /// 读出 `drawable` 上 `area` 范围的像素
    fn get_image(
        &mut self,
        fb: &mut Framebuffer,
        drawable: Drawable<'_>,
        area: Rect,
    ) -> Result<PixelBuffer, SurfaceError>;

    /// 逐条读出扫描线
    fn get_spans(
        &mut self,
        fb: &mut Framebuffer,
        drawable: Drawable<'_>,
        spans: &[Span],
    ) -> Result<Vec<Vec<u32>>, SurfaceError>;

    /// 以 `drawable` 为源做拷贝之前调用
    fn source_validate(&mut self, _fb: &mut Framebuffer, _drawable: Drawable<'_>, _area: Rect) {}

    /// 窗口从 `old_origin` 移到当前位置时，搬移 `src`（屏幕坐标）内的像素
    fn copy_window(
        &mut self,
        fb: &mut Framebuffer,
        window: &Window,
        old_origin: Point,
        src: &Region,
    );

    /// 拆掉包装层。没有包装的实现原样返回 `Err(self)`
    fn into_inner(self: Box<Self>) -> Result<Box<dyn SurfaceOps>, Box<dyn SurfaceOps>>;
}

/// 直接读写帧缓冲的基础实现
#[derive(Debug, Default, Clone, Copy)]
pub struct FramebufferOps;

impl SurfaceOps for FramebufferOps {
    fn get_image(
        &mut self,
        fb: &mut Framebuffer,
        drawable: Drawable<'_>,
        area: Rect,
    ) -> Result<PixelBuffer, SurfaceError> {
        let image = match drawable {
            Drawable::Window(window) => fb.buffer().read_rect(area.translate(window.x, window.y))?,
            Drawable::Pixmap(pixmap) => pixmap.read_rect(area)?,
        };
        Ok(image)
    }

    fn get_spans(
        &mut self,
        fb: &mut Framebuffer,
        drawable: Drawable<'_>,
        spans: &[Span],
    ) -> Result<Vec<Vec<u32>>, SurfaceError> {
        spans
            .iter()
            .map(|span| {
                self.get_image(fb, drawable, span.as_rect())
                    .map(PixelBuffer::into_pixels)
            })
            .collect()
    }

    fn copy_window(
        &mut self,
        fb: &mut Framebuffer,
        window: &Window,
        old_origin: Point,
        src: &Region,
    ) {
        let dx = window.x.saturating_sub(old_origin.x);
        let dy = window.y.saturating_sub(old_origin.y);
        for rect in src.rects() {
            let to = Point::new(rect.x.saturating_add(dx), rect.y.saturating_add(dy));
            fb.buffer_mut().copy_within(*rect, to);
        }
    }

    fn into_inner(self: Box<Self>) -> Result<Box<dyn SurfaceOps>, Box<dyn SurfaceOps>> {
        Err(self)
    }
}
