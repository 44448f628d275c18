use crate::geometry::{Point, Rect};
use crate::pixel::PixelBuffer;

pub type WindowId = u32;

/// 根窗口覆盖整个表面
pub const ROOT_WINDOW: WindowId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub id: WindowId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Window {
    pub fn new(id: WindowId, rect: Rect) -> Self {
        Self {
            id,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// 窗口在屏幕坐标下的矩形
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// 读操作的对象：屏幕上的窗口（坐标相对窗口原点），或者离屏像素图
#[derive(Debug, Clone, Copy)]
pub enum Drawable<'a> {
    Window(&'a Window),
    Pixmap(&'a PixelBuffer),
}

impl Drawable<'_> {
    pub fn window(&self) -> Option<&Window> {
        match self {
            Drawable::Window(window) => Some(window),
            Drawable::Pixmap(_) => None,
        }
    }

    /// 把相对 drawable 的矩形换算成屏幕坐标；像素图没有屏幕坐标
    pub fn to_screen(&self, area: Rect) -> Option<Rect> {
        self.window().map(|w| area.translate(w.x, w.y))
    }
}
