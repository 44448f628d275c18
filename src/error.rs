//! 错误类型

use thiserror::Error;

use crate::geometry::Rect;
use crate::pixel::PixelFormat;
use crate::surface::WindowId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PixelError {
    #[error("cannot allocate a {width}x{height} pixel buffer")]
    Allocation { width: u32, height: u32 },

    #[error("{width}x{height} needs {expected} pixels, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("{rect:?} lies outside the {width}x{height} buffer")]
    OutOfBounds { rect: Rect, width: u32, height: u32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error(transparent)]
    Pixel(#[from] PixelError),

    #[error("unknown pixel format code {0:#010x}")]
    UnknownFormat(u32),

    #[error("no window with id {0}")]
    NoSuchWindow(WindowId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("pixel format {0:?} cannot take an alpha-composited overlay")]
    UnsupportedFormat(PixelFormat),

    #[error(transparent)]
    Pixel(#[from] PixelError),

    #[error("overlay content is {width}x{height} but carries {actual} pixels")]
    ContentSize {
        width: u16,
        height: u16,
        actual: usize,
    },

    #[error("nothing was saved under the overlay")]
    NothingSaved,
}
