use std::collections::HashMap;
use std::rc::Rc;

use tracing::{info, warn};

use crate::pipeline::FramebufferUpdates;
use crate::screen::Screen;
use crate::surface::{Framebuffer, ScreenId};

/// 服务端的全部显示表面，以及它们共用的更新管线
pub struct Display {
    screens: HashMap<ScreenId, Screen>,
    next_id: ScreenId,
    updates: Rc<FramebufferUpdates>,
}

impl Display {
    pub fn new() -> Self {
        Self {
            screens: HashMap::new(),
            next_id: 0,
            updates: Rc::new(FramebufferUpdates::new()),
        }
    }

    pub fn updates(&self) -> &Rc<FramebufferUpdates> {
        &self.updates
    }

    /// 添加一个表面；`with_overlay` 时尝试安装叠加层支持，失败不影响表面本身
    pub fn add_screen(&mut self, framebuffer: Framebuffer, with_overlay: bool) -> ScreenId {
        let id = self.next_id;
        self.next_id += 1;

        let format = framebuffer.format();
        let (width, height) = (framebuffer.width(), framebuffer.height());
        let mut screen = Screen::new(id, framebuffer, self.updates.clone());
        if with_overlay && !screen.install_overlay_support() {
            warn!(screen = id, ?format, "screen runs without overlays");
        }
        info!(screen = id, width, height, ?format, "screen added");
        self.screens.insert(id, screen);
        id
    }

    pub fn screen(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.get(&id)
    }

    pub fn screen_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.screens.get_mut(&id)
    }

    pub fn screen_ids(&self) -> Vec<ScreenId> {
        let mut ids: Vec<_> = self.screens.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// 卸载叠加层支持并移除表面，交回它的帧缓冲
    pub fn close_screen(&mut self, id: ScreenId) -> Option<Framebuffer> {
        let screen = self.screens.remove(&id)?;
        info!(screen = id, "screen closed");
        Some(screen.close())
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}
