// SPDX: CC0-1.0

pub mod app;
pub mod eval;
pub mod lex;
pub mod parse;
pub mod render;
pub mod sample;
pub mod shell;
pub mod stdlib;
pub mod svg;
pub mod viewport;

pub type Number = f64;

/// A pair of coordinates, in graph space or screen space depending on
/// where it came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}
