//! 帧缓冲更新管线中与叠加层相关的部分
//!
//! 推流端只关心两件事：现在能不能发更新，以及哪些区域改过了。
//! 叠加层在写像素期间挂起发送，远端因此看不到合成或恢复到一半的画面。

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::{Rect, Region};
use crate::surface::ScreenId;

/// 由叠加层协调器驱动的推流开关
pub trait UpdateSink {
    /// 挂起或恢复向远端发送帧缓冲更新
    fn set_updates_suspended(&self, suspended: bool);

    /// 某个表面上的叠加层像素是否正画在帧缓冲里
    fn set_overlay_materialized(&self, screen: ScreenId, materialized: bool);

    /// 记录一块被改写、需要发给远端的区域
    fn mark_modified(&self, screen: ScreenId, area: Rect);
}

/// 默认的更新管线：累积脏区域，挂起期间拒绝取出
#[derive(Debug, Default)]
pub struct FramebufferUpdates {
    suspended: Cell<bool>,
    deferred: Cell<u32>,
    materialized: RefCell<BTreeSet<ScreenId>>,
    pending: RefCell<BTreeMap<ScreenId, Region>>,
}

impl FramebufferUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates_suspended(&self) -> bool {
        self.suspended.get()
    }

    /// 任意表面上有叠加层画着
    pub fn overlay_materialized(&self) -> bool {
        !self.materialized.borrow().is_empty()
    }

    pub fn is_materialized_on(&self, screen: ScreenId) -> bool {
        self.materialized.borrow().contains(&screen)
    }

    /// 取出某个表面待发送的区域；挂起期间返回 `None` 并保留累积的区域
    pub fn take_update(&self, screen: ScreenId) -> Option<Region> {
        if self.suspended.get() {
            self.deferred.set(self.deferred.get() + 1);
            return None;
        }
        self.pending
            .borrow_mut()
            .remove(&screen)
            .filter(|region| !region.is_empty())
    }

    /// 挂起期间被推迟的发送次数
    pub fn deferred_sends(&self) -> u32 {
        self.deferred.get()
    }
}

impl UpdateSink for FramebufferUpdates {
    fn set_updates_suspended(&self, suspended: bool) {
        self.suspended.set(suspended);
    }

    fn set_overlay_materialized(&self, screen: ScreenId, materialized: bool) {
        let mut screens = self.materialized.borrow_mut();
        if materialized {
            screens.insert(screen);
        } else {
            screens.remove(&screen);
        }
    }

    fn mark_modified(&self, screen: ScreenId, area: Rect) {
        self.pending.borrow_mut().entry(screen).or_default().push(area);
    }
}
