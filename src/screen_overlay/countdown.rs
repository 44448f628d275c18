use std::f64::consts::PI;

use crate::geometry::Rect;
use crate::pixel::PixelBuffer;

use super::{OverlayContent, PaintOverlay};

/// 倒计时圆环上的刻度数
pub const TICK_COUNT: u32 = 16;

const BACKGROUND: u32 = 0xe630_3030;
const FOREGROUND: u32 = 0xe6a0_a0a0;

/// 电源符号顶部缺口的半角，单位度
const POWER_GAP_DEGREES: f64 = 35.0;

/// 不活动断开前的提示：一圈随剩余时间减少的刻度，中间一个电源符号
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InactivityWarning {
    amount_left: f64,
}

impl InactivityWarning {
    /// `amount_left` 是剩余时间占比，会被限制在 `0.0..=1.0`
    pub fn new(amount_left: f64) -> Self {
        let amount_left = if amount_left.is_nan() {
            0.0
        } else {
            amount_left.clamp(0.0, 1.0)
        };
        Self { amount_left }
    }

    pub fn amount_left(&self) -> f64 {
        self.amount_left
    }

    pub fn ticks_left(&self) -> u32 {
        (f64::from(TICK_COUNT) * self.amount_left) as u32
    }

    pub fn content(self, width: u16, height: u16) -> OverlayContent {
        OverlayContent::with_painter(width, height, self)
    }
}

impl PaintOverlay for InactivityWarning {
    fn paint(&self, target: &mut PixelBuffer) {
        let bounds = target.bounds();
        target.fill_rect(bounds, BACKGROUND);
        for edge in [
            Rect::new(0, 0, bounds.width, 1),
            Rect::new(0, bounds.height - 1, bounds.width, 1),
            Rect::new(0, 0, 1, bounds.height),
            Rect::new(bounds.width - 1, 0, 1, bounds.height),
        ] {
            target.fill_rect(edge, FOREGROUND);
        }

        let cx = f64::from(bounds.width) / 2.0;
        let cy = f64::from(bounds.height) / 2.0;
        let size = f64::from(bounds.width.min(bounds.height));
        paint_power_symbol(target, cx, cy, size * 0.1);
        paint_ticks(target, cx, cy, size * 0.45, self.ticks_left());
    }
}

fn paint_power_symbol(target: &mut PixelBuffer, cx: f64, cy: f64, r_out: f64) {
    let r_in = r_out * 0.71;
    for py in span(cy - r_out, cy + r_out, target.height()) {
        for px in span(cx - r_out, cx + r_out, target.width()) {
            let dx = f64::from(px) + 0.5 - cx;
            let dy = f64::from(py) + 0.5 - cy;
            let d = dx.hypot(dy);
            if d < r_in || d > r_out {
                continue;
            }
            if dx.atan2(-dy).abs().to_degrees() < POWER_GAP_DEGREES {
                continue;
            }
            target.set_pixel(px, py, FOREGROUND);
        }
    }

    let bar_width = r_out - r_in;
    let bar = Rect::new(
        (cx - bar_width / 2.0) as i32,
        (cy - r_out - r_in * 0.1) as i32,
        bar_width.ceil() as i32,
        (r_out - r_in * 0.17).ceil() as i32,
    );
    target.fill_rect(bar, FOREGROUND);
}

fn paint_ticks(target: &mut PixelBuffer, cx: f64, cy: f64, r: f64, ticks_left: u32) {
    let ri = r * 0.6;
    // 每个刻度所占角度的一半
    let half_angle = 2.0 * PI / f64::from(TICK_COUNT) * 0.3;
    let half_width = ri * half_angle.sin();
    let dist = ri * half_angle.cos();
    let length = -dist + (r * r - half_width * half_width).sqrt();
    let quad = [
        (-half_width, -dist),
        (-half_width, -dist - length),
        (half_width, -dist - length),
        (half_width, -dist),
    ];

    for i in (TICK_COUNT - ticks_left + 1)..=TICK_COUNT {
        let angle = f64::from(i) * 2.0 * PI / f64::from(TICK_COUNT);
        let (sin, cos) = angle.sin_cos();
        let corners = quad.map(|(x, y)| (x * cos - y * sin + cx, x * sin + y * cos + cy));
        fill_convex(target, &corners, FOREGROUND);
    }
}

/// `[lo, hi]` 覆盖到的像素下标，裁剪到 `0..limit`
fn span(lo: f64, hi: f64, limit: u32) -> std::ops::Range<i32> {
    let start = lo.floor().max(0.0) as i32;
    let end = hi.ceil().min(f64::from(limit)) as i32;
    start..end.max(start)
}

fn fill_convex(target: &mut PixelBuffer, poly: &[(f64, f64)], color: u32) {
    let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for &(x, y) in poly {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    for py in span(y0, y1, target.height()) {
        for px in span(x0, x1, target.width()) {
            let center = (f64::from(px) + 0.5, f64::from(py) + 0.5);
            if inside_convex(poly, center) {
                target.set_pixel(px, py, color);
            }
        }
    }
}

fn inside_convex(poly: &[(f64, f64)], (px, py): (f64, f64)) -> bool {
    let mut sign = 0.0;
    for (i, &(ax, ay)) in poly.iter().enumerate() {
        let (bx, by) = poly[(i + 1) % poly.len()];
        let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted(amount_left: f64) -> PixelBuffer {
        let mut target = PixelBuffer::new(200, 120).unwrap();
        InactivityWarning::new(amount_left).paint(&mut target);
        target
    }

    fn foreground_count(target: &PixelBuffer) -> usize {
        target.pixels().iter().filter(|&&px| px == FOREGROUND).count()
    }

    #[test]
    fn ticks_follow_remaining_time() {
        assert_eq!(InactivityWarning::new(1.0).ticks_left(), 16);
        assert_eq!(InactivityWarning::new(0.5).ticks_left(), 8);
        assert_eq!(InactivityWarning::new(3.0).ticks_left(), 16);
        assert_eq!(InactivityWarning::new(-1.0).ticks_left(), 0);
        assert_eq!(InactivityWarning::new(f64::NAN).ticks_left(), 0);
    }

    #[test]
    fn box_has_border_and_background() {
        let target = painted(1.0);
        assert_eq!(target.pixel(0, 0), Some(FOREGROUND));
        assert_eq!(target.pixel(199, 119), Some(FOREGROUND));
        assert_eq!(target.pixel(3, 3), Some(BACKGROUND));
    }

    #[test]
    fn top_tick_disappears_last() {
        // 12 点方向的刻度中部
        assert_eq!(painted(0.5).pixel(100, 17), Some(FOREGROUND));
        assert_eq!(painted(0.0).pixel(100, 17), Some(BACKGROUND));
    }

    #[test]
    fn fewer_ticks_paint_less() {
        let full = foreground_count(&painted(1.0));
        let half = foreground_count(&painted(0.5));
        let none = foreground_count(&painted(0.0));
        assert!(full > half && half > none);
    }

    #[test]
    fn content_wraps_the_painter() {
        let content = InactivityWarning::new(0.25).content(64, 48);
        assert_eq!((content.width(), content.height()), (64, 48));
    }
}
