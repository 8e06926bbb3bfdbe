use kurbo::{BezPath, Circle, PathEl, Shape, Stroke, StrokeOpts};

use crate::foundation::core::{FrameRGBA, FrameSize, Point, Rect, Rgb8};
use crate::foundation::error::{HudError, HudResult};
use crate::hud::text::{TextBrush, TextEngine};

const PATH_TOLERANCE: f64 = 0.1;

/// Opaque-shape drawing surface for one HUD overlay.
///
/// Everything drawn is opaque; translucency is assigned afterwards by the alpha mask.
/// Pixels never touched stay fully transparent, which is how the mask tells them apart.
pub struct HudCanvas<'t> {
    size: FrameSize,
    ctx: vello_cpu::RenderContext,
    text: &'t mut TextEngine,
}

impl std::fmt::Debug for HudCanvas<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HudCanvas")
            .field("size", &self.size)
            .finish()
    }
}

impl<'t> HudCanvas<'t> {
    /// Blank surface setting its labels with `text`. Fails when a dimension does not fit the
    /// rasterizer's 16-bit range.
    pub fn new(size: FrameSize, text: &'t mut TextEngine) -> HudResult<Self> {
        let (w, h) = surface_dims(size)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(Self { size, ctx, text })
    }

    /// Surface dimensions.
    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgb8) {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        self.paint(color);
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    /// Fill a closed polygon.
    pub fn fill_polygon(&mut self, pts: &[Point], color: Rgb8) {
        if pts.len() < 3 {
            return;
        }
        let mut path = polyline_path(pts);
        path.close_path();
        self.fill_bezpath(&path, color);
    }

    /// Fill a disc.
    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Rgb8) {
        if radius <= 0.0 {
            return;
        }
        let path = Circle::new(center, radius).to_path(PATH_TOLERANCE);
        self.fill_bezpath(&path, color);
    }

    /// Outline a circle.
    pub fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, color: Rgb8) {
        if radius <= 0.0 {
            return;
        }
        let path = Circle::new(center, radius).to_path(PATH_TOLERANCE);
        self.stroke_bezpath(&path, width, color);
    }

    /// Draw an open (or closed) polyline with round joins and caps.
    pub fn stroke_polyline(&mut self, pts: &[Point], width: f64, color: Rgb8, closed: bool) {
        if pts.len() < 2 {
            return;
        }
        let mut path = polyline_path(pts);
        if closed {
            path.close_path();
        }
        self.stroke_bezpath(&path, width, color);
    }

    /// Draw one line segment.
    pub fn line(&mut self, a: Point, b: Point, width: f64, color: Rgb8) {
        self.stroke_polyline(&[a, b], width, color, false);
    }

    /// Draw a single-line label with its baseline-left corner at `origin` and capitals
    /// `height` pixels tall. Returns the advance width.
    pub fn text(&mut self, origin: Point, height: f64, text: &str, color: Rgb8) -> f64 {
        if text.is_empty() || height.is_nan() || height <= 0.0 {
            return 0.0;
        }
        let layout = self.text.shape(text, height, TextBrush::from(color));
        let (ox, oy) = (origin.x as f32, origin.y as f32);

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, 255,
                ));

                let baseline = run.baseline();
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: ox + g.x,
                    y: oy + g.y - baseline,
                });
                self.ctx
                    .glyph_run(self.text.font())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        f64::from(layout.width())
    }

    /// Advance width of `text` as [`HudCanvas::text`] would draw it.
    pub fn text_width(&mut self, text: &str, height: f64) -> f64 {
        self.text.measure(text, height)
    }

    /// Rasterize and hand over the premultiplied pixels.
    pub fn finish(mut self) -> HudResult<FrameRGBA> {
        let (w, h) = surface_dims(self.size)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: self.size.width,
            height: self.size.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn paint(&mut self, color: Rgb8) {
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, 255,
        ));
    }

    fn fill_bezpath(&mut self, path: &BezPath, color: Rgb8) {
        self.paint(color);
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    fn stroke_bezpath(&mut self, path: &BezPath, width: f64, color: Rgb8) {
        if width.is_nan() || width <= 0.0 {
            return;
        }
        let outline = kurbo::stroke(
            path.elements().iter().copied(),
            &Stroke::new(width),
            &StrokeOpts::default(),
            PATH_TOLERANCE,
        );
        self.fill_bezpath(&outline, color);
    }
}

fn surface_dims(size: FrameSize) -> HudResult<(u16, u16)> {
    let w = u16::try_from(size.width).map_err(|_| {
        HudError::invalid_config(format!("overlay width {} exceeds 65535", size.width))
    })?;
    let h = u16::try_from(size.height).map_err(|_| {
        HudError::invalid_config(format!("overlay height {} exceeds 65535", size.height))
    })?;
    Ok((w, h))
}

fn polyline_path(pts: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    for (i, &p) in pts.iter().enumerate() {
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/hud/canvas.rs"]
mod tests;
