// SPDX: CC0-1.0

use crate::{
    render::{Canvas, Rgba, Segment},
    Number, Point,
};
use std::io::{self, Write};

/// Writes frames as standalone SVG documents.
#[derive(Debug)]
pub struct SvgCanvas<W: Write> {
    out: W,
}

fn paint(attr: &str, color: Rgba) -> String {
    format!(
        r#"{attr}="rgb({},{},{})" {attr}-opacity="{:.3}""#,
        color.r,
        color.g,
        color.b,
        Number::from(color.a) / 255.0
    )
}

fn escape(text: &str) -> String {
    let mut ret = String::with_capacity(text.len());
    for chr in text.chars() {
        match chr {
            '&' => ret.push_str("&amp;"),
            '<' => ret.push_str("&lt;"),
            '>' => ret.push_str("&gt;"),
            '"' => ret.push_str("&quot;"),
            '\'' => ret.push_str("&apos;"),
            _ => ret.push(chr),
        }
    }
    ret
}

impl<W: Write> SvgCanvas<W> {
    /// Writes the document header for a canvas of `size` pixels.
    pub fn begin(mut out: W, size: Point<Number>) -> io::Result<Self> {
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = size.x,
            h = size.y
        )?;
        Ok(Self { out })
    }

    /// Closes the document and hands back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        writeln!(self.out, "</svg>")?;
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> Canvas for SvgCanvas<W> {
    type Err = io::Error;

    fn fill_rect(
        &mut self,
        origin: Point<Number>,
        size: Point<Number>,
        color: Rgba,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            r#"  <rect x="{}" y="{}" width="{}" height="{}" {}/>"#,
            origin.x,
            origin.y,
            size.x,
            size.y,
            paint("fill", color)
        )
    }

    fn line(&mut self, seg: Segment, color: Rgba, width: Number) -> io::Result<()> {
        writeln!(
            self.out,
            r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" {} stroke-width="{width}" stroke-linecap="round"/>"#,
            seg.from.x,
            seg.from.y,
            seg.to.x,
            seg.to.y,
            paint("stroke", color)
        )
    }

    fn text(
        &mut self,
        at: Point<Number>,
        size: Number,
        color: Rgba,
        text: &str,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            r#"  <text x="{}" y="{}" font-family="Consolas, monospace" font-size="{size}" {}>{}</text>"#,
            at.x,
            at.y,
            paint("fill", color),
            escape(text)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CURVE, TEXT};

    #[test]
    fn test_document_structure() {
        let mut svg = SvgCanvas::begin(Vec::new(), Point::new(800.0, 600.0)).unwrap();
        svg.line(
            Segment::new(Point::new(0.0, 1.5), Point::new(2.0, 3.0)),
            CURVE,
            3.0,
        )
        .unwrap();
        svg.text(Point::new(1.0, 2.0), 15.0, TEXT, "f(x) = x < 1 & y")
            .unwrap();
        let out = String::from_utf8(svg.finish().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("<svg ") && lines[0].contains(r#"width="800""#));
        assert_eq!(
            lines[1],
            r#"  <line x1="0" y1="1.5" x2="2" y2="3" stroke="rgb(255,0,0)" stroke-opacity="1.000" stroke-width="3" stroke-linecap="round"/>"#
        );
        assert!(lines[2].contains(r#"fill="rgb(0,0,0)" fill-opacity="1.000""#));
        assert!(lines[2].ends_with(">f(x) = x &lt; 1 &amp; y</text>"));
        assert_eq!(lines[3], "</svg>");
    }
}
