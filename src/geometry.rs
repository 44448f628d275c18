//! 像素坐标下的点、矩形、扫描线和区域

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// 半开矩形 `[x, x + width) × [y, y + height)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// 坐标运算一律饱和，极端坐标的矩形被截在 `i32` 范围内
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// 交集面积大于零才算重叠，只共用一条边的两个矩形互不重叠
    pub fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        if r > x && b > y {
            Some(Rect::new(x, y, r.saturating_sub(x), b.saturating_sub(y)))
        } else {
            None
        }
    }

    /// Bounding box of both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        Rect::new(x, y, r.saturating_sub(x), b.saturating_sub(y))
    }

    /// Grow by `n` pixels on every side.
    pub fn expand(&self, n: i32) -> Rect {
        let grow = n.saturating_mul(2);
        Rect::new(
            self.x.saturating_sub(n),
            self.y.saturating_sub(n),
            self.width.saturating_add(grow).max(0),
            self.height.saturating_add(grow).max(0),
        )
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }
}

/// 一条水平扫描线，`width` 个像素从 `(x, y)` 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub x: i32,
    pub y: i32,
    pub width: i32,
}

impl Span {
    pub const fn new(x: i32, y: i32, width: i32) -> Self {
        Self { x, y, width }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, 1)
    }
}

/// 若干矩形的并集，矩形之间允许相交
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn overlaps_rect(&self, rect: &Rect) -> bool {
        self.rects.iter().any(|r| r.overlaps(rect))
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Region {
        self.rects.iter().map(|r| r.translate(dx, dy)).collect()
    }

    pub fn intersect_rect(&self, rect: &Rect) -> Region {
        self.rects.iter().filter_map(|r| r.intersect(rect)).collect()
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.rects.iter().copied().reduce(|acc, r| acc.union(&r))
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        let mut region = Region::new();
        region.push(rect);
        region
    }
}

impl FromIterator<Rect> for Region {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        let mut region = Region::new();
        for rect in iter {
            region.push(rect);
        }
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_edge_is_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.overlaps(&Rect::new(10, 0, 5, 5)));
        assert!(!a.overlaps(&Rect::new(0, 10, 5, 5)));
        assert!(a.overlaps(&Rect::new(9, 9, 5, 5)));
    }

    #[test]
    fn empty_rect_never_overlaps() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.overlaps(&Rect::new(2, 2, 0, 4)));
        assert!(a.intersect(&Rect::new(2, 2, 0, 4)).is_none());
    }

    #[test]
    fn expand_pads_every_side() {
        let padded = Rect::new(10, 10, 40, 20).expand(8);
        assert_eq!(padded, Rect::new(2, 2, 56, 36));
        assert_eq!(padded.right(), 58);
        assert_eq!(padded.bottom(), 38);
    }

    #[test]
    fn extreme_coordinates_saturate() {
        let far = Rect::new(i32::MAX - 2, i32::MIN + 2, 10, 10);
        assert_eq!(far.right(), i32::MAX);
        assert_eq!(far.expand(8).y, i32::MIN);
        assert_eq!(far.translate(5, -5).origin(), Point::new(i32::MAX, i32::MIN));

        let screen = Rect::new(0, 0, 128, 96);
        assert!(!far.overlaps(&screen));
        assert!(far.intersect(&screen).is_none());

        let wide = Rect::new(i32::MIN + 2, 0, i32::MAX, 4);
        assert_eq!(
            wide.union(&screen),
            Rect::new(i32::MIN + 2, 0, i32::MAX, 96)
        );
        assert_eq!(
            Rect::new(i32::MIN, 0, 4, 4).intersect(&Rect::new(i32::MIN, 0, i32::MAX, 4)),
            Some(Rect::new(i32::MIN, 0, 4, 4))
        );
    }

    #[test]
    fn region_drops_empty_rects() {
        let region: Region = [Rect::new(0, 0, 0, 5), Rect::new(1, 1, 2, 2)]
            .into_iter()
            .collect();
        assert_eq!(region.rects().len(), 1);
        assert!(region.overlaps_rect(&Rect::new(2, 2, 1, 1)));
        assert!(!region.overlaps_rect(&Rect::new(3, 3, 1, 1)));
    }

    #[test]
    fn region_bounds_and_clip() {
        let region: Region = [Rect::new(0, 0, 4, 4), Rect::new(10, 10, 4, 4)]
            .into_iter()
            .collect();
        assert_eq!(region.bounds(), Some(Rect::new(0, 0, 14, 14)));
        let clipped = region.intersect_rect(&Rect::new(2, 2, 10, 10));
        assert_eq!(
            clipped.rects(),
            &[Rect::new(2, 2, 2, 2), Rect::new(10, 10, 2, 2)]
        );
    }
}
