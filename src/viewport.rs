// SPDX: CC0-1.0

//! Mapping between graph space and a square pixel canvas.
//!
//! The transform is a pure function of the current bounds: the midpoint of
//! the bounds always lands on the canvas center, so two viewports with equal
//! bounds map identically no matter how they were panned there.

use crate::{Number, Point};
use core::{fmt, num::NonZeroU32, ops::Range};

#[derive(Clone, Debug, PartialEq)]
pub enum ViewportErr {
    /// A range is empty, reversed, or not finite.
    BadRange { axis: char, range: Range<Number> },
}

impl fmt::Display for ViewportErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRange { axis, range } => write!(
                f,
                "{axis} range {start}..{end} must be finite with min < max",
                start = range.start,
                end = range.end
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    x: Range<Number>,
    y: Range<Number>,
    pixel_size: NonZeroU32,
}

fn check_range(axis: char, range: &Range<Number>) -> Result<(), ViewportErr> {
    if range.start.is_finite() && range.end.is_finite() && range.start < range.end {
        Ok(())
    } else {
        Err(ViewportErr::BadRange {
            axis,
            range: range.clone(),
        })
    }
}

impl Viewport {
    pub fn new(
        x: Range<Number>,
        y: Range<Number>,
        pixel_size: NonZeroU32,
    ) -> Result<Self, ViewportErr> {
        check_range('x', &x)?;
        check_range('y', &y)?;
        Ok(Self { x, y, pixel_size })
    }

    pub fn x(&self) -> &Range<Number> {
        &self.x
    }

    pub fn y(&self) -> &Range<Number> {
        &self.y
    }

    pub const fn pixel_size(&self) -> NonZeroU32 {
        self.pixel_size
    }

    fn size(&self) -> Number {
        Number::from(self.pixel_size.get())
    }

    pub fn scale_x(&self) -> Number {
        self.size() / (self.x.end - self.x.start)
    }

    /// Negative: screen y grows downward, graph y grows upward.
    pub fn scale_y(&self) -> Number {
        -self.size() / (self.y.end - self.y.start)
    }

    pub fn offset_x(&self) -> Number {
        -((self.x.end + self.x.start) / 2.0) * self.scale_x() + self.size() / 2.0
    }

    pub fn offset_y(&self) -> Number {
        -((self.y.end + self.y.start) / 2.0) * self.scale_y() + self.size() / 2.0
    }

    pub fn center(&self) -> Point<Number> {
        Point::new(
            (self.x.start + self.x.end) / 2.0,
            (self.y.start + self.y.end) / 2.0,
        )
    }

    pub fn to_screen(&self, p: Point<Number>) -> Point<Number> {
        Point::new(
            p.x * self.scale_x() + self.offset_x(),
            p.y * self.scale_y() + self.offset_y(),
        )
    }

    pub fn to_graph(&self, p: Point<Number>) -> Point<Number> {
        Point::new(
            (p.x - self.offset_x()) / self.scale_x(),
            (p.y - self.offset_y()) / self.scale_y(),
        )
    }

    /// Whether a screen coordinate lies on the canvas, edges included.
    pub fn on_canvas(&self, screen: Number) -> bool {
        (0.0..=self.size()).contains(&screen)
    }

    /// Shifts the bounds by a pixel delta. Does not resample.
    pub fn translate(&mut self, dx_pixels: Number, dy_pixels: Number) {
        // both shifts use the scale from before the move
        let dx = dx_pixels / self.scale_x();
        let dy = dy_pixels / self.scale_y();
        self.x.start += dx;
        self.x.end += dx;
        self.y.start += dy;
        self.y.end += dy;
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("x range", &self.x)
            .field("y range", &self.y)
            .field("pixel size", &self.pixel_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: Number = 1e-9;

    fn default_viewport() -> Viewport {
        Viewport::new(-10.0..10.0, -10.0..10.0, NonZeroU32::new(600).unwrap()).unwrap()
    }

    fn close(a: Number, b: Number, tol: Number) -> bool {
        (a - b).abs() <= tol * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn test_default_scenario() {
        let vp = default_viewport();
        assert_eq!(vp.scale_x(), 30.0);
        assert_eq!(vp.scale_y(), -30.0);
        assert_eq!(vp.to_screen(Point::new(0.0, 0.0)), Point::new(300.0, 300.0));
        assert_eq!(vp.to_screen(Point::new(10.0, 0.0)), Point::new(600.0, 300.0));
        assert_eq!(vp.to_screen(Point::new(0.0, 10.0)), Point::new(300.0, 0.0));
    }

    #[test]
    fn test_rejects_bad_ranges() {
        let size = NonZeroU32::new(100).unwrap();
        assert!(Viewport::new(1.0..1.0, 0.0..1.0, size).is_err());
        assert!(Viewport::new(0.0..1.0, 2.0..1.0, size).is_err());
        assert!(matches!(
            Viewport::new(0.0..Number::NAN, 0.0..1.0, size),
            Err(ViewportErr::BadRange { axis: 'x', .. })
        ));
        assert!(Viewport::new(0.0..1.0, 0.0..Number::INFINITY, size).is_err());
    }

    #[test]
    fn test_translate_moves_by_pre_translation_scale() {
        let mut vp = default_viewport();
        vp.translate(30.0, 30.0);
        assert_eq!(vp.x(), &(-9.0..11.0));
        assert_eq!(vp.y(), &(-11.0..9.0));
    }

    #[test]
    fn test_repeated_pans_equal_one_big_pan() {
        let mut small = default_viewport();
        for _ in 0..4 {
            small.translate(50.0, 0.0);
        }
        let mut big = default_viewport();
        big.translate(200.0, 0.0);
        assert!(close(small.x().start, big.x().start, EPS));
        assert!(close(small.x().end, big.x().end, EPS));
        assert_eq!(small.y(), big.y());
        assert!(close(big.x().start, -10.0 + 200.0 / 30.0, EPS));
    }

    #[test]
    fn test_same_bounds_same_mapping() {
        let mut panned = default_viewport();
        panned.translate(120.0, -45.0);
        panned.translate(-120.0, 45.0);
        let fresh = default_viewport();
        let p = Point::new(3.5, -7.25);
        let a = panned.to_screen(p);
        let b = fresh.to_screen(p);
        assert!(close(a.x, b.x, EPS) && close(a.y, b.y, EPS));
    }

    proptest! {
        #[test]
        fn prop_center_maps_to_canvas_center(
            x0 in -1e4f64..1e4,
            w in 1e-2f64..1e4,
            y0 in -1e4f64..1e4,
            h in 1e-2f64..1e4,
            size in 1u32..4096,
        ) {
            let vp = Viewport::new(x0..x0 + w, y0..y0 + h, NonZeroU32::new(size).unwrap()).unwrap();
            let c = vp.to_screen(vp.center());
            let half = Number::from(size) / 2.0;
            prop_assert!((c.x - half).abs() < 1e-6 * (1.0 + half), "{c:?}");
            prop_assert!((c.y - half).abs() < 1e-6 * (1.0 + half), "{c:?}");
        }

        #[test]
        fn prop_translate_inverse(
            x0 in -1e3f64..1e3,
            w in 1e-2f64..1e3,
            dx in -1e4f64..1e4,
            dy in -1e4f64..1e4,
        ) {
            let mut vp = Viewport::new(x0..x0 + w, x0..x0 + w, NonZeroU32::new(600).unwrap()).unwrap();
            let before = vp.clone();
            vp.translate(dx, dy);
            vp.translate(-dx, -dy);
            prop_assert!(close(vp.x().start, before.x().start, EPS));
            prop_assert!(close(vp.x().end, before.x().end, EPS));
            prop_assert!(close(vp.y().start, before.y().start, EPS));
            prop_assert!(close(vp.y().end, before.y().end, EPS));
        }

        #[test]
        fn prop_to_graph_inverts_to_screen(px in -1e3f64..1e3, py in -1e3f64..1e3) {
            let vp = default_viewport();
            let back = vp.to_graph(vp.to_screen(Point::new(px, py)));
            prop_assert!(close(back.x, px, EPS) && close(back.y, py, EPS));
        }
    }
}
