//! 显示表面：像素存储、窗口，以及会读取或搬移像素的表面操作

pub mod framebuffer;
pub mod ops;
pub mod window;

pub use framebuffer::Framebuffer;
pub use ops::{FramebufferOps, SurfaceOps};
pub use window::{Drawable, ROOT_WINDOW, Window, WindowId};

pub type ScreenId = u32;
