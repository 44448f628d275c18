//! # Screen overlay
//!
//! 直接画进共享帧缓冲的临时弹出层（状态提示、不活动倒计时）。
//!
//! 叠加层不是独立的合成层：它和推流、普通绘制共用同一块像素。
//! 所以任何可能读到或搬走这些像素的操作都会先把它撤下（恢复底下的像素），
//! 之后调用方可以再把它放回去。
//!
//! - [`sprite`] 维护每个表面的叠加层状态机
//! - [`compositor`] 负责实现内容、合成、保存和恢复像素
//! - [`intercept`] 包装四个表面读操作
//! - [`damage`] 接收普通绘制的脏区域
pub mod compositor;
pub mod countdown;
pub mod damage;
pub mod intercept;
pub mod sprite;


use std::fmt;

use crate::geometry::{Point, Rect};
use crate::pixel::PixelBuffer;

pub use compositor::OverlayCompositor;
pub use countdown::InactivityWarning;
pub use damage::DamageBridge;
pub use intercept::OverlayInterceptor;
pub use sprite::{OverlayPhase, OverlaySprite, SAVE_PADDING, SpriteStats};

/// 把叠加层内容画进一块与内容同尺寸的离屏缓冲。
///
/// 用户数据由实现自己持有，闭包也可以直接当作画笔。
pub trait PaintOverlay {
    fn paint(&self, target: &mut PixelBuffer);
}

impl<F> PaintOverlay for F
where
    F: Fn(&mut PixelBuffer),
{
    fn paint(&self, target: &mut PixelBuffer) {
        self(target)
    }
}

pub enum OverlaySource {
    /// 实现时调用画笔
    Painter(Box<dyn PaintOverlay>),
    /// 现成的 premultiplied ARGB 像素，行优先
    Argb(Vec<u32>),
}

/// 调用方提供的叠加层内容，创建后不再改变。
///
/// 以 `Rc` 共享给协调器，协调器只在它是当前内容期间持有引用。
pub struct OverlayContent {
    width: u16,
    height: u16,
    source: OverlaySource,
}

impl OverlayContent {
    pub fn with_painter(width: u16, height: u16, painter: impl PaintOverlay + 'static) -> Self {
        Self {
            width,
            height,
            source: OverlaySource::Painter(Box::new(painter)),
        }
    }

    pub fn from_argb(width: u16, height: u16, argb: Vec<u32>) -> Self {
        Self {
            width,
            height,
            source: OverlaySource::Argb(argb),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn source(&self) -> &OverlaySource {
        &self.source
    }

    /// 放在 `at` 时占据的矩形
    pub fn bounds_at(&self, at: Point) -> Rect {
        Rect::new(at.x, at.y, self.width.into(), self.height.into())
    }
}

impl fmt::Debug for OverlayContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            OverlaySource::Painter(_) => "painter",
            OverlaySource::Argb(_) => "argb",
        };
        f.debug_struct("OverlayContent")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("source", &source)
            .finish()
    }
}
