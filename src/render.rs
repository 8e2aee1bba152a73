// SPDX: CC0-1.0

//! Turning a viewport and a sampled series into screen-space primitives.

use crate::{viewport::Viewport, Number, Point};
use core::ops::Range;
use log::debug;

/// Grid lines per axis above which the grid is not drawn at all.
pub const MAX_GRID_LINES: usize = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

pub const BACKGROUND: Rgba = Rgba::new(128, 128, 128, 255);
pub const VIEWER_BACKGROUND: Rgba = Rgba::new(255, 255, 255, 255);
pub const GRID: Rgba = Rgba::new(220, 220, 220, 255);
pub const AXIS: Rgba = Rgba::new(0, 0, 0, 255);
pub const CURVE: Rgba = Rgba::new(255, 0, 0, 255);
pub const LEGEND_BACKGROUND: Rgba = Rgba::new(255, 255, 255, 200);
pub const TEXT: Rgba = Rgba::new(0, 0, 0, 255);

pub const GRID_WIDTH: Number = 1.0;
pub const AXIS_WIDTH: Number = 1.0;
pub const CURVE_WIDTH: Number = 3.0;

pub const LEGEND_ORIGIN: Point<Number> = Point::new(10.0, 10.0);
pub const LEGEND_SIZE: Point<Number> = Point::new(300.0, 70.0);
pub const FONT_SIZE: Number = 15.0;

/// Line segment in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Point<Number>,
    pub to: Point<Number>,
}

impl Segment {
    pub const fn new(from: Point<Number>, to: Point<Number>) -> Self {
        Self { from, to }
    }
}

/// A surface that frames are drawn on.
pub trait Canvas {
    type Err;

    fn fill_rect(
        &mut self,
        origin: Point<Number>,
        size: Point<Number>,
        color: Rgba,
    ) -> Result<(), Self::Err>;

    fn line(&mut self, seg: Segment, color: Rgba, width: Number) -> Result<(), Self::Err>;

    fn text(
        &mut self,
        at: Point<Number>,
        size: Number,
        color: Rgba,
        text: &str,
    ) -> Result<(), Self::Err>;
}

/// Shifts everything drawn through it by a fixed offset.
#[derive(Debug)]
pub struct Translated<'c, C> {
    inner: &'c mut C,
    by: Point<Number>,
}

impl<'c, C: Canvas> Translated<'c, C> {
    pub fn new(inner: &'c mut C, by: Point<Number>) -> Self {
        Self { inner, by }
    }

    fn shift(&self, p: Point<Number>) -> Point<Number> {
        Point::new(p.x + self.by.x, p.y + self.by.y)
    }
}

impl<C: Canvas> Canvas for Translated<'_, C> {
    type Err = C::Err;

    fn fill_rect(
        &mut self,
        origin: Point<Number>,
        size: Point<Number>,
        color: Rgba,
    ) -> Result<(), Self::Err> {
        let origin = self.shift(origin);
        self.inner.fill_rect(origin, size, color)
    }

    fn line(&mut self, seg: Segment, color: Rgba, width: Number) -> Result<(), Self::Err> {
        let seg = Segment::new(self.shift(seg.from), self.shift(seg.to));
        self.inner.line(seg, color, width)
    }

    fn text(
        &mut self,
        at: Point<Number>,
        size: Number,
        color: Rgba,
        text: &str,
    ) -> Result<(), Self::Err> {
        let at = self.shift(at);
        self.inner.text(at, size, color, text)
    }
}

/// World-space multiples of `gap` inside `range`, ends included.
pub fn grid_positions(range: &Range<Number>, gap: Number) -> Vec<Number> {
    if !(gap.is_finite() && gap > 0.0) {
        return Vec::new();
    }
    let first = (range.start / gap).floor();
    let last = (range.end / gap).floor();
    let count = last - first + 1.0;
    if !count.is_finite() || count > MAX_GRID_LINES as Number {
        debug!("skipping grid: gap {gap} is too fine for {range:?}");
        return Vec::new();
    }
    (0..count as usize)
        .map(|k| (first + k as Number) * gap)
        .filter(|v| range.start <= *v && *v <= range.end)
        .collect()
}

/// Grid lines at multiples of `gap`, fixed in world space so that panning
/// scrolls them.
pub fn grid_lines(viewport: &Viewport, gap: Number) -> Vec<Segment> {
    let size = Number::from(viewport.pixel_size().get());
    let vertical = grid_positions(viewport.x(), gap).into_iter().map(|x| {
        let sx = viewport.to_screen(Point::new(x, 0.0)).x;
        Segment::new(Point::new(sx, 0.0), Point::new(sx, size))
    });
    let horizontal = grid_positions(viewport.y(), gap).into_iter().map(|y| {
        let sy = viewport.to_screen(Point::new(0.0, y)).y;
        Segment::new(Point::new(0.0, sy), Point::new(size, sy))
    });
    vertical.chain(horizontal).collect()
}

/// The x = 0 and y = 0 lines, each left out when panned off the canvas.
pub fn axes(viewport: &Viewport) -> Vec<Segment> {
    let size = Number::from(viewport.pixel_size().get());
    let origin = viewport.to_screen(Point::new(0.0, 0.0));
    let mut ret = Vec::with_capacity(2);
    if viewport.on_canvas(origin.y) {
        ret.push(Segment::new(
            Point::new(0.0, origin.y),
            Point::new(size, origin.y),
        ));
    }
    if viewport.on_canvas(origin.x) {
        ret.push(Segment::new(
            Point::new(origin.x, 0.0),
            Point::new(origin.x, size),
        ));
    }
    ret
}

pub fn polyline(series: &[Point<Number>], viewport: &Viewport) -> Vec<Segment> {
    series
        .windows(2)
        .map(|pair| Segment::new(viewport.to_screen(pair[0]), viewport.to_screen(pair[1])))
        .collect()
}

/// Text overlay shown in the corner of the viewer.
#[derive(Clone, Debug)]
pub struct Legend<'a> {
    pub expr: &'a str,
    pub tips: &'a str,
}

#[derive(Clone, Debug)]
pub struct Frame<'a> {
    pub viewport: &'a Viewport,
    pub series: &'a [Point<Number>],
    pub grid_gap: Number,
    pub legend: Option<Legend<'a>>,
}

/// Where a square of side `size` sits when centered on a `canvas`.
pub fn letterbox(canvas: Point<Number>, size: Number) -> Point<Number> {
    Point::new(
        ((canvas.x - size) / 2.0).max(0.0),
        ((canvas.y - size) / 2.0).max(0.0),
    )
}

fn draw_legend<C: Canvas>(
    canvas: &mut C,
    viewport: &Viewport,
    legend: &Legend<'_>,
) -> Result<(), C::Err> {
    canvas.fill_rect(LEGEND_ORIGIN, LEGEND_SIZE, LEGEND_BACKGROUND)?;
    let (x, y) = (viewport.x(), viewport.y());
    let lines = [
        format!("f(x) = {}", legend.expr),
        format!(
            "x: [{:.3}, {:.3}]  y: [{:.3}, {:.3}]",
            x.start, x.end, y.start, y.end
        ),
        legend.tips.to_string(),
    ];
    for (i, line) in lines.iter().enumerate() {
        let at = Point::new(
            LEGEND_ORIGIN.x + 5.0,
            LEGEND_ORIGIN.y + FONT_SIZE * (i as Number + 1.0) + 2.0,
        );
        canvas.text(at, FONT_SIZE, TEXT, line)?;
    }
    Ok(())
}

/// Draws the viewer screen, centering the square viewport on a canvas of
/// size `canvas_size`.
pub fn draw_frame<C: Canvas>(
    canvas: &mut C,
    canvas_size: Point<Number>,
    frame: &Frame<'_>,
) -> Result<(), C::Err> {
    let size = Number::from(frame.viewport.pixel_size().get());
    canvas.fill_rect(Point::new(0.0, 0.0), canvas_size, BACKGROUND)?;

    let mut canvas = Translated::new(canvas, letterbox(canvas_size, size));
    canvas.fill_rect(Point::new(0.0, 0.0), Point::new(size, size), VIEWER_BACKGROUND)?;
    for seg in grid_lines(frame.viewport, frame.grid_gap) {
        canvas.line(seg, GRID, GRID_WIDTH)?;
    }
    for seg in axes(frame.viewport) {
        canvas.line(seg, AXIS, AXIS_WIDTH)?;
    }
    for seg in polyline(frame.series, frame.viewport) {
        canvas.line(seg, CURVE, CURVE_WIDTH)?;
    }
    if let Some(ref legend) = frame.legend {
        draw_legend(&mut canvas, frame.viewport, legend)?;
    }
    Ok(())
}
