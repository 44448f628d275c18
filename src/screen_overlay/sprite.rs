use std::rc::Rc;

use tracing::{debug, warn};

use crate::geometry::{Point, Rect, Region};
use crate::pipeline::UpdateSink;
use crate::surface::{Framebuffer, ScreenId, WindowId};

use super::OverlayContent;
use super::compositor::OverlayCompositor;
use super::damage::DamageBridge;

/// 保存区域在叠加层四周额外留出的像素，容纳边缘的抗锯齿和取整误差
pub const SAVE_PADDING: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    /// 没有请求叠加层
    Absent,
    /// 请求了，但像素当前不在帧缓冲里
    Requested,
    /// 像素已合成进帧缓冲
    Up,
}

/// 协调器对后端发起的操作计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteStats {
    pub saves: u32,
    pub put_ups: u32,
    pub removals: u32,
}

/// 一个表面上的叠加层状态与生命周期协调。
///
/// `should_be_up` 是调用方想要的可见性，`is_up` 是像素实际是否在帧缓冲里。
/// 被强制撤下时只清 `is_up`，这样之后还知道要把它放回去。
pub struct OverlaySprite {
    screen: ScreenId,
    root: WindowId,
    current: Option<Rc<OverlayContent>>,
    position: Point,
    should_be_up: bool,
    is_up: bool,
    saved: Option<Rect>,
    cache_window: Option<WindowId>,
    active_overlays: u32,
    damage: DamageBridge,
    compositor: OverlayCompositor,
    updates: Rc<dyn UpdateSink>,
    stats: SpriteStats,
}

impl OverlaySprite {
    pub fn new(screen: ScreenId, root: WindowId, updates: Rc<dyn UpdateSink>) -> Self {
        Self {
            screen,
            root,
            current: None,
            position: Point::default(),
            should_be_up: false,
            is_up: false,
            saved: None,
            cache_window: None,
            active_overlays: 0,
            damage: DamageBridge::new(),
            compositor: OverlayCompositor::new(),
            updates,
            stats: SpriteStats::default(),
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        if self.is_up {
            OverlayPhase::Up
        } else if self.should_be_up && self.current.is_some() {
            OverlayPhase::Requested
        } else {
            OverlayPhase::Absent
        }
    }

    pub fn is_up(&self) -> bool {
        self.is_up
    }

    pub fn should_be_up(&self) -> bool {
        self.should_be_up
    }

    pub fn current(&self) -> Option<&Rc<OverlayContent>> {
        self.current.as_ref()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// 当前备份的区域，只在备份存在时有值
    pub fn saved_region(&self) -> Option<Rect> {
        self.saved
    }

    pub fn cache_window(&self) -> Option<WindowId> {
        self.cache_window
    }

    pub fn active_overlays(&self) -> u32 {
        self.active_overlays
    }

    pub fn damage(&self) -> &DamageBridge {
        &self.damage
    }

    pub fn compositor(&self) -> &OverlayCompositor {
        &self.compositor
    }

    pub fn stats(&self) -> SpriteStats {
        self.stats
    }

    /// 设置（`Some`）或清除（`None`）这个表面的叠加层。
    ///
    /// 已经画着的旧内容会先被撤下。返回叠加层是否达到了期望的可见性。
    pub fn set_overlay(
        &mut self,
        fb: &mut Framebuffer,
        content: Option<Rc<OverlayContent>>,
        at: Point,
    ) -> bool {
        let Some(content) = content else {
            self.clear_overlay(fb);
            return !self.is_up;
        };

        if !self.should_be_up {
            self.active_overlays += 1;
        }
        self.should_be_up = true;
        self.position = at;
        self.cache_window = None;
        self.current = Some(content);
        self.sync_damage();

        if self.is_up {
            debug!(screen = self.screen, "set_overlay remove");
            self.remove(fb);
        }
        if !self.is_up {
            debug!(screen = self.screen, "set_overlay restore");
            self.restore(fb)
        } else {
            false
        }
    }

    fn clear_overlay(&mut self, fb: &mut Framebuffer) {
        if self.should_be_up {
            self.active_overlays = self.active_overlays.saturating_sub(1);
        }
        self.should_be_up = false;
        if self.is_up {
            self.remove(fb);
        }
        self.sync_damage();
        // 撤不下来时保留内容，之后还能重试
        if !self.is_up {
            self.current = None;
            self.compositor.unrealize();
        }
    }

    /// 有叠加层需要显示时才接收脏区域
    fn sync_damage(&mut self) {
        self.damage.set_registered(self.active_overlays > 0);
    }

    /// 撤下叠加层，恢复它底下的像素。没画着时什么也不做。
    ///
    /// 恢复失败时叠加层保持 `Up`，返回 `false`。
    pub fn remove(&mut self, fb: &mut Framebuffer) -> bool {
        if !self.is_up {
            return true;
        }
        let Some(saved) = self.saved else {
            warn!(screen = self.screen, "overlay is up without a saved region");
            return false;
        };

        self.updates.set_updates_suspended(true);
        // 自己的写入直接落到帧缓冲，不走 Screen::report_damage；写入期间桥保持关闭
        let registered = self.damage.unregister();
        self.cache_window = None;
        let removed = match self.compositor.restore_under(fb, saved) {
            Ok(()) => {
                self.mark_up(false);
                self.stats.removals += 1;
                self.updates.mark_modified(self.screen, saved);
                true
            }
            Err(err) => {
                warn!(screen = self.screen, %err, "could not restore pixels under overlay");
                false
            }
        };
        self.damage.set_registered(registered);
        self.updates.set_updates_suspended(false);
        removed
    }

    /// 保存底下的像素并把当前内容画上去
    pub fn restore(&mut self, fb: &mut Framebuffer) -> bool {
        if self.is_up {
            return true;
        }
        if !self.should_be_up || self.current.is_none() {
            return false;
        }
        self.save_under(fb) && self.put_up(fb)
    }

    /// 叠加层四周加上 [`SAVE_PADDING`] 的矩形
    fn compute_saved(&mut self) -> Option<Rect> {
        let content = self.current.as_ref()?;
        let saved = content.bounds_at(self.position).expand(SAVE_PADDING);
        self.saved = Some(saved);
        Some(saved)
    }

    fn save_under(&mut self, fb: &mut Framebuffer) -> bool {
        let Some(saved) = self.compute_saved() else {
            return false;
        };

        self.updates.set_updates_suspended(true);
        let registered = self.damage.unregister();
        let result = self.compositor.save_under(fb, saved);
        self.damage.set_registered(registered);
        self.updates.set_updates_suspended(false);

        match result {
            Ok(()) => {
                self.stats.saves += 1;
                true
            }
            Err(err) => {
                warn!(screen = self.screen, %err, "could not save pixels under overlay");
                self.saved = None;
                false
            }
        }
    }

    fn put_up(&mut self, fb: &mut Framebuffer) -> bool {
        let (Some(content), Some(saved)) = (self.current.clone(), self.saved) else {
            return false;
        };

        self.updates.set_updates_suspended(true);
        let registered = self.damage.unregister();
        let shown = match self.compositor.put_up(fb, &content, self.position) {
            Ok(()) => {
                self.mark_up(true);
                self.cache_window = Some(self.root);
                self.stats.put_ups += 1;
                self.updates.mark_modified(self.screen, saved);
                true
            }
            Err(err) => {
                warn!(screen = self.screen, %err, "could not put up overlay");
                false
            }
        };
        self.damage.set_registered(registered);
        self.updates.set_updates_suspended(false);
        shown
    }

    fn mark_up(&mut self, up: bool) {
        self.is_up = up;
        self.updates.set_overlay_materialized(self.screen, up);
    }

    /// 叠加层画着，且 `area`（屏幕坐标）与保存区域有面积重叠
    pub fn overlaps_saved(&self, area: &Rect) -> bool {
        self.is_up && self.saved.is_some_and(|saved| saved.overlaps(area))
    }

    /// `area` 为屏幕坐标；与保存区域重叠时撤下叠加层。返回是否撤下了
    pub fn remove_if_overlapping(&mut self, fb: &mut Framebuffer, area: &Rect, trigger: &str) -> bool {
        if !self.overlaps_saved(area) {
            return false;
        }
        debug!(screen = self.screen, trigger, "overlay in the way");
        self.remove(fb)
    }

    pub fn remove_if_region_overlaps(
        &mut self,
        fb: &mut Framebuffer,
        region: &Region,
        trigger: &str,
    ) -> bool {
        let hit = self.is_up && self.saved.is_some_and(|saved| region.overlaps_rect(&saved));
        if !hit {
            return false;
        }
        debug!(screen = self.screen, trigger, "overlay in the way");
        self.remove(fb)
    }

    /// 普通绘制即将写入 `region` 时调用
    pub fn report_damage(&mut self, fb: &mut Framebuffer, region: &Region) -> bool {
        let hit = match self.saved {
            Some(saved) => self.is_up && self.damage.hits(region, &saved),
            None => false,
        };
        if !hit {
            return false;
        }
        debug!(screen = self.screen, "damage remove");
        self.remove(fb)
    }

    /// 表面销毁前调用：撤下叠加层并清掉全部状态
    pub fn teardown(&mut self, fb: &mut Framebuffer) {
        if self.is_up && !self.remove(fb) {
            warn!(screen = self.screen, "overlay pixels left behind on teardown");
            self.mark_up(false);
        }
        self.current = None;
        self.should_be_up = false;
        self.active_overlays = 0;
        self.saved = None;
        self.cache_window = None;
        self.damage.unregister();
        self.compositor.unrealize();
    }
}
