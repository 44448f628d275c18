use tracing::trace;

use crate::geometry::{Rect, Region};

/// 表面脏区域上报的开关。
///
/// 只有表面上有叠加层需要显示时才注册，免得每次写像素都付出检查的代价；
/// 协调器自己写像素期间会临时注销，避免自己的写入把正在放置的叠加层撤掉。
#[derive(Debug, Default)]
pub struct DamageBridge {
    registered: bool,
    registrations: u32,
}

impl DamageBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn register(&mut self) {
        if !self.registered {
            self.registered = true;
            self.registrations += 1;
            trace!("damage reporting registered");
        }
    }

    /// 注销并返回之前是否已注册
    pub fn unregister(&mut self) -> bool {
        let was = self.registered;
        if was {
            self.registered = false;
            trace!("damage reporting unregistered");
        }
        was
    }

    pub fn set_registered(&mut self, registered: bool) {
        if registered {
            self.register();
        } else {
            self.unregister();
        }
    }

    /// 注册后一份脏区域是否碰到了 `saved`
    pub fn hits(&self, region: &Region, saved: &Rect) -> bool {
        self.registered && region.overlaps_rect(saved)
    }

    pub fn registrations(&self) -> u32 {
        self.registrations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_bridge_reports_nothing() {
        let mut bridge = DamageBridge::new();
        let saved = Rect::new(0, 0, 10, 10);
        let region = Region::from(Rect::new(5, 5, 2, 2));
        assert!(!bridge.hits(&region, &saved));
        bridge.register();
        assert!(bridge.hits(&region, &saved));
        assert!(!bridge.hits(&Region::from(Rect::new(10, 0, 2, 2)), &saved));
    }

    #[test]
    fn unregister_remembers_previous_state() {
        let mut bridge = DamageBridge::new();
        assert!(!bridge.unregister());
        bridge.register();
        bridge.register();
        assert_eq!(bridge.registrations(), 1);
        let was = bridge.unregister();
        assert!(was && !bridge.is_registered());
        bridge.set_registered(was);
        assert!(bridge.is_registered());
        assert_eq!(bridge.registrations(), 2);
    }
}
