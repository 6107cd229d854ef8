use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8};
use crate::foundation::error::{TrackreelError, TrackreelResult};
use crate::render::FrameRGBA;
use crate::render::text::{TextBlock, TextBrush};

/// Vector overlay surface backed by `vello_cpu`.
///
/// Shapes accumulate in the render context; [`Painter::composite_onto`] rasterizes them and
/// blends the result over a frame region.
pub(crate) struct Painter {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    width: u32,
    height: u32,
}

impl Painter {
    pub(crate) fn new(width: u32, height: u32) -> TrackreelResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| TrackreelError::render("overlay width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| TrackreelError::render("overlay height exceeds u16"))?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            width,
            height,
        })
    }

    /// Drop everything drawn since the last composite.
    pub(crate) fn begin(&mut self) {
        self.ctx.reset();
    }

    pub(crate) fn fill_path(&mut self, path: &BezPath, transform: Affine, color: Rgba8) {
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(paint(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    pub(crate) fn stroke_path(
        &mut self,
        path: &BezPath,
        transform: Affine,
        width: f64,
        color: Rgba8,
    ) {
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(paint(color));
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        self.ctx.stroke_path(&bezpath_to_cpu(path));
    }

    /// Filled polygon with an outline, in the local space of `transform`.
    pub(crate) fn polygon(
        &mut self,
        pts: &[Point],
        transform: Affine,
        fill: Rgba8,
        outline: Option<(f64, Rgba8)>,
    ) {
        let path = polygon_path(pts);
        self.fill_path(&path, transform, fill);
        if let Some((w, c)) = outline {
            self.stroke_path(&path, transform, w, c);
        }
    }

    pub(crate) fn line(&mut self, a: Point, b: Point, width: f64, color: Rgba8) {
        let mut p = BezPath::new();
        p.move_to(a);
        p.line_to(b);
        self.stroke_path(&p, Affine::IDENTITY, width, color);
    }

    pub(crate) fn circle(
        &mut self,
        center: Point,
        radius: f64,
        fill: Rgba8,
        outline: Option<(f64, Rgba8)>,
    ) {
        use kurbo::Shape as _;
        let path = kurbo::Circle::new(center, radius).to_path(0.05);
        self.fill_path(&path, Affine::IDENTITY, fill);
        if let Some((w, c)) = outline {
            self.stroke_path(&path, Affine::IDENTITY, w, c);
        }
    }

    pub(crate) fn rect(&mut self, rect: Rect, fill: Rgba8, outline: Option<(f64, Rgba8)>) {
        use kurbo::Shape as _;
        let path = rect.to_path(0.1);
        self.fill_path(&path, Affine::IDENTITY, fill);
        if let Some((w, c)) = outline {
            self.stroke_path(&path, Affine::IDENTITY, w, c);
        }
    }

    /// Draw laid-out text with its top-left corner at `origin`.
    ///
    /// When `outline` is set, glyphs are first stroked with that width and color, then filled.
    pub(crate) fn text(
        &mut self,
        block: &TextBlock,
        font: &vello_cpu::peniko::FontData,
        origin: Point,
        outline: Option<(f64, Rgba8)>,
    ) {
        self.ctx
            .set_transform(affine_to_cpu(Affine::translate(origin.to_vec2())));
        for line in block.layout().lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let size = run.run().font_size();
                if let Some((w, c)) = outline {
                    self.ctx.set_paint(paint(c));
                    self.ctx
                        .set_stroke(vello_cpu::kurbo::Stroke::new(w * 2.0));
                    self.ctx
                        .glyph_run(font)
                        .font_size(size)
                        .stroke_glyphs(positioned(&run));
                }
                let TextBrush { r, g, b, a } = run.style().brush;
                self.ctx
                    .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                self.ctx
                    .glyph_run(font)
                    .font_size(size)
                    .fill_glyphs(positioned(&run));
            }
        }
    }

    /// Rasterize pending shapes and source-over them onto `dst` at `(x, y)`.
    ///
    /// vello_cpu renders into a fresh buffer, so render into the private pixmap first and then
    /// premul-over onto the destination.
    pub(crate) fn composite_onto(&mut self, dst: &mut FrameRGBA, x: i64, y: i64) {
        self.ctx.flush();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.render_to_pixmap(&mut self.pixmap);
        dst.blend_block(
            x,
            y,
            self.width,
            self.height,
            self.pixmap.data_as_u8_slice(),
        );
        self.ctx.reset();
    }
}

pub(crate) fn polygon_path(pts: &[Point]) -> BezPath {
    let mut p = BezPath::new();
    let mut it = pts.iter();
    if let Some(first) = it.next() {
        p.move_to(*first);
        for q in it {
            p.line_to(*q);
        }
        p.close_path();
    }
    p
}

fn paint(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn positioned<'a>(
    run: &'a parley::layout::GlyphRun<'a, TextBrush>,
) -> impl Iterator<Item = vello_cpu::Glyph> + 'a {
    run.positioned_glyphs().map(|g| vello_cpu::Glyph {
        id: g.id,
        x: g.x,
        y: g.y,
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
