use crate::error::{PixelError, SurfaceError};
use crate::geometry::Rect;
use crate::pixel::{PixelBuffer, PixelFormat};

/// 一个显示表面的像素存储，远端推流和普通绘制读写的都是它
#[derive(Debug, Clone)]
pub struct Framebuffer {
    format: PixelFormat,
    buffer: PixelBuffer,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, PixelError> {
        Ok(Self {
            format,
            buffer: PixelBuffer::new(width, height)?,
        })
    }

    /// 按 fourcc 编码创建
    pub fn with_fourcc(width: u32, height: u32, fourcc: u32) -> Result<Self, SurfaceError> {
        let format =
            PixelFormat::try_from(fourcc).map_err(|_| SurfaceError::UnknownFormat(fourcc))?;
        Ok(Self::new(width, height, format)?)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn bounds(&self) -> Rect {
        self.buffer.bounds()
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fourcc_is_rejected() {
        let err = Framebuffer::with_fourcc(4, 4, 0x1234_5678).unwrap_err();
        assert_eq!(err, SurfaceError::UnknownFormat(0x1234_5678));
        let fb = Framebuffer::with_fourcc(4, 2, 0x3432_5258).unwrap();
        assert_eq!(fb.format(), PixelFormat::Xrgb8888);
        assert_eq!(fb.bounds(), Rect::new(0, 0, 4, 2));
    }
}
