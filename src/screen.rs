//! 显示表面：帧缓冲、窗口、表面操作链和可选的叠加层

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::SurfaceError;
use crate::geometry::{Point, Rect, Region, Span};
use crate::pipeline::UpdateSink;
use crate::pixel::PixelBuffer;
use crate::screen_overlay::{
    OverlayCompositor, OverlayContent, OverlayInterceptor, OverlayPhase, OverlaySprite,
};
use crate::surface::{
    Drawable, Framebuffer, FramebufferOps, ROOT_WINDOW, ScreenId, SurfaceOps, Window, WindowId,
};

pub struct Screen {
    id: ScreenId,
    framebuffer: Framebuffer,
    windows: BTreeMap<WindowId, Window>,
    next_window: WindowId,
    ops: Box<dyn SurfaceOps>,
    overlay: Option<Rc<RefCell<OverlaySprite>>>,
    updates: Rc<dyn UpdateSink>,
}

impl Screen {
    pub fn new(id: ScreenId, framebuffer: Framebuffer, updates: Rc<dyn UpdateSink>) -> Self {
        let root = Window::new(ROOT_WINDOW, framebuffer.bounds());
        Self {
            id,
            framebuffer,
            windows: BTreeMap::from([(ROOT_WINDOW, root)]),
            next_window: ROOT_WINDOW + 1,
            ops: Box::new(FramebufferOps),
            overlay: None,
            updates,
        }
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn root(&self) -> Window {
        self.window(ROOT_WINDOW)
            .unwrap_or_else(|| Window::new(ROOT_WINDOW, self.framebuffer.bounds()))
    }

    pub fn window(&self, id: WindowId) -> Option<Window> {
        self.windows.get(&id).copied()
    }

    /// 安装叠加层支持：创建叠加层状态并包装表面操作。
    ///
    /// 像素格式不支持 alpha 合成时返回 `false`，表面本身不受影响。
    pub fn install_overlay_support(&mut self) -> bool {
        if self.overlay.is_some() {
            return true;
        }
        if let Err(err) = OverlayCompositor::check_format(self.framebuffer.format()) {
            warn!(screen = self.id, %err, "overlay support unavailable");
            return false;
        }

        let sprite = Rc::new(RefCell::new(OverlaySprite::new(
            self.id,
            ROOT_WINDOW,
            Rc::clone(&self.updates),
        )));
        let inner = std::mem::replace(&mut self.ops, Box::new(FramebufferOps));
        self.ops = Box::new(OverlayInterceptor::wrap(inner, Rc::clone(&sprite)));
        self.overlay = Some(sprite);
        debug!(screen = self.id, "overlay support installed");
        true
    }

    /// 撤下叠加层，拆掉包装，释放叠加层状态
    pub fn uninstall_overlay_support(&mut self) {
        let Some(sprite) = self.overlay.take() else {
            return;
        };
        sprite.borrow_mut().teardown(&mut self.framebuffer);

        let ops = std::mem::replace(&mut self.ops, Box::new(FramebufferOps));
        self.ops = match ops.into_inner() {
            Ok(inner) => inner,
            Err(ops) => ops,
        };
        debug!(screen = self.id, "overlay support uninstalled");
    }

    pub fn has_overlay_support(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn overlay(&self) -> Option<Ref<'_, OverlaySprite>> {
        self.overlay.as_ref().map(|sprite| sprite.borrow())
    }

    pub fn overlay_phase(&self) -> OverlayPhase {
        self.overlay()
            .map_or(OverlayPhase::Absent, |sprite| sprite.phase())
    }

    /// 见 [`OverlaySprite::set_overlay`]。没有安装叠加层支持时返回 `false`
    pub fn set_overlay(&mut self, content: Option<Rc<OverlayContent>>, at: Point) -> bool {
        let Some(sprite) = &self.overlay else {
            debug!(screen = self.id, "set_overlay without overlay support");
            return false;
        };
        sprite
            .borrow_mut()
            .set_overlay(&mut self.framebuffer, content, at)
    }

    /// 表面将整体改变之前调用，保证叠加层不在帧缓冲里
    pub fn force_remove(&mut self) -> bool {
        match &self.overlay {
            Some(sprite) => sprite.borrow_mut().remove(&mut self.framebuffer),
            None => true,
        }
    }

    /// 把被撤下、但仍然需要显示的叠加层放回去
    pub fn force_restore(&mut self) -> bool {
        match &self.overlay {
            Some(sprite) => sprite.borrow_mut().restore(&mut self.framebuffer),
            None => false,
        }
    }

    /// 普通绘制写入 `region` 之前上报
    fn report_damage(&mut self, region: &Region) {
        if let Some(sprite) = &self.overlay {
            sprite
                .borrow_mut()
                .report_damage(&mut self.framebuffer, region);
        }
    }

    pub fn fill_rect(&mut self, area: Rect, color: u32) {
        let Some(area) = area.intersect(&self.framebuffer.bounds()) else {
            return;
        };
        self.report_damage(&Region::from(area));
        self.framebuffer.buffer_mut().fill_rect(area, color);
        self.updates.mark_modified(self.id, area);
    }

    pub fn put_image(&mut self, at: Point, image: &PixelBuffer) {
        let area = image.bounds().translate(at.x, at.y);
        let Some(area) = area.intersect(&self.framebuffer.bounds()) else {
            return;
        };
        self.report_damage(&Region::from(area));
        self.framebuffer
            .buffer_mut()
            .copy_from(image, image.bounds(), at);
        self.updates.mark_modified(self.id, area);
    }

    pub fn get_image(&mut self, window: WindowId, area: Rect) -> Result<PixelBuffer, SurfaceError> {
        let window = self.window(window).ok_or(SurfaceError::NoSuchWindow(window))?;
        self.ops
            .get_image(&mut self.framebuffer, Drawable::Window(&window), area)
    }

    pub fn get_pixmap_image(
        &mut self,
        pixmap: &PixelBuffer,
        area: Rect,
    ) -> Result<PixelBuffer, SurfaceError> {
        self.ops
            .get_image(&mut self.framebuffer, Drawable::Pixmap(pixmap), area)
    }

    pub fn get_spans(
        &mut self,
        window: WindowId,
        spans: &[Span],
    ) -> Result<Vec<Vec<u32>>, SurfaceError> {
        let window = self.window(window).ok_or(SurfaceError::NoSuchWindow(window))?;
        self.ops
            .get_spans(&mut self.framebuffer, Drawable::Window(&window), spans)
    }

    /// 把窗口 `src` 内的 `area` 拷到屏幕坐标 `dst`
    pub fn copy_area(&mut self, src: WindowId, area: Rect, dst: Point) -> Result<(), SurfaceError> {
        let window = self.window(src).ok_or(SurfaceError::NoSuchWindow(src))?;
        self.ops
            .source_validate(&mut self.framebuffer, Drawable::Window(&window), area);

        let from = area.translate(window.x, window.y);
        let to = Rect::new(dst.x, dst.y, from.width, from.height);
        let Some(landed) = to.intersect(&self.framebuffer.bounds()) else {
            return Ok(());
        };
        self.report_damage(&Region::from(landed));
        self.framebuffer.buffer_mut().copy_within(from, dst);
        self.updates.mark_modified(self.id, landed);
        Ok(())
    }

    pub fn create_window(&mut self, rect: Rect) -> WindowId {
        let id = self.next_window;
        self.next_window += 1;
        self.windows.insert(id, Window::new(id, rect));
        id
    }

    /// 根窗口不能销毁
    pub fn destroy_window(&mut self, id: WindowId) -> bool {
        id != ROOT_WINDOW && self.windows.remove(&id).is_some()
    }

    /// 移动窗口并把它可见的像素搬过去
    pub fn move_window(&mut self, id: WindowId, to: Point) -> Result<(), SurfaceError> {
        let old = self.window(id).ok_or(SurfaceError::NoSuchWindow(id))?;
        let moved = Window {
            x: to.x,
            y: to.y,
            ..old
        };
        let bounds = self.framebuffer.bounds();
        let src = Region::from(old.rect()).intersect_rect(&bounds);
        let dst = src
            .translate(to.x.saturating_sub(old.x), to.y.saturating_sub(old.y))
            .intersect_rect(&bounds);
        self.windows.insert(id, moved);

        self.report_damage(&dst);
        self.ops
            .copy_window(&mut self.framebuffer, &moved, old.origin(), &src);
        for rect in dst.rects() {
            self.updates.mark_modified(self.id, *rect);
        }
        Ok(())
    }

    /// 销毁表面，交回帧缓冲
    pub fn close(mut self) -> Framebuffer {
        self.uninstall_overlay_support();
        self.framebuffer
    }
}
