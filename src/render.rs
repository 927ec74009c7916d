use crate::{
    assets::{LayerCache, LayerImage, LayerSlot},
    color::Color,
    core::{Affine, BezPath, CanvasSize, Point, Rect},
    error::{BannercraftError, BannercraftResult},
    model::{CaptionStyle, CtaStyle, MaskRect, Template, TextAlign},
    shapes::rounded_rect_path,
    state::EditState,
    text::{self, TextBrush, TextEngine},
};

/// Corner radius of the CTA button background in pixels.
pub const CTA_CORNER_RADIUS: f64 = 10.0;
/// Horizontal padding between CTA text and its background edge.
pub const CTA_HPAD: f64 = 10.0;

/// One rendered frame of **premultiplied** RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// CPU compositor for one creative.
///
/// Every call to [`Renderer::render`] rebuilds the frame from scratch in
/// fixed order: background fill, template layers (mask, stroke, design
/// pattern), wrapped caption, CTA button, uploaded image. Re-rendering with
/// identical inputs produces byte-identical pixels.
pub struct Renderer {
    canvas: CanvasSize,
    text: TextEngine,
    font_data: vello_cpu::peniko::FontData,
}

impl Renderer {
    pub fn new(canvas: CanvasSize, font_bytes: Vec<u8>) -> BannercraftResult<Self> {
        let text = TextEngine::new(font_bytes)?;
        let font_data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(text.font_bytes().as_ref().clone()),
            0,
        );
        Ok(Self {
            canvas,
            text,
            font_data,
        })
    }

    /// Convenience constructor that picks up a system sans-serif font.
    pub fn with_system_font(canvas: CanvasSize) -> BannercraftResult<Self> {
        Self::new(canvas, text::find_system_font()?)
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    #[tracing::instrument(skip_all)]
    pub fn render(
        &mut self,
        state: &EditState,
        template: Option<&Template>,
        layers: &LayerCache,
    ) -> BannercraftResult<FrameRgba> {
        let width_u16: u16 = self
            .canvas
            .width
            .try_into()
            .map_err(|_| BannercraftError::render("canvas width exceeds u16"))?;
        let height_u16: u16 = self
            .canvas
            .height
            .try_into()
            .map_err(|_| BannercraftError::render("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        self.fill_background(&mut ctx, state.background_color);

        if let Some(template) = template {
            self.draw_template_layers(&mut ctx, layers)?;
            self.draw_caption(&mut ctx, &state.caption, &template.caption)?;
            self.draw_cta(&mut ctx, &state.cta, &template.cta)?;
            self.draw_upload(&mut ctx, layers, template.image_mask)?;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRgba {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn fill_background(&self, ctx: &mut vello_cpu::RenderContext, color: Color) {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint_color(color));
        ctx.fill_rect(&rect_to_cpu(self.canvas.to_rect()));
    }

    fn draw_template_layers(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        layers: &LayerCache,
    ) -> BannercraftResult<()> {
        for slot in [LayerSlot::Mask, LayerSlot::Stroke, LayerSlot::DesignPattern] {
            let Some(image) = layers.get(slot) else {
                continue;
            };
            draw_image(ctx, image, Affine::IDENTITY)?;
        }
        Ok(())
    }

    fn draw_caption(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        caption: &str,
        style: &CaptionStyle,
    ) -> BannercraftResult<()> {
        let lines = text::wrap(caption, style.max_characters_per_line);
        let size_px = style.font_size as f32;
        let brush = brush_for(style.text_color);

        let mut y = style.position.y;
        for line in lines {
            let layout = self.text.layout_line(&line, size_px, brush)?;
            let width = f64::from(layout.width());
            let x = match style.alignment {
                TextAlign::Left => style.position.x,
                TextAlign::Center => style.position.x - width / 2.0,
                TextAlign::Right => style.position.x - width,
            };
            // Place the baseline on the caption's y coordinate.
            let top = y - text::first_baseline(&layout);
            self.draw_layout(ctx, &layout, Point::new(x, top));
            y += style.font_size;
        }
        Ok(())
    }

    fn draw_cta(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        cta: &str,
        style: &CtaStyle,
    ) -> BannercraftResult<()> {
        let lines = text::wrap(cta, style.wrap_length);
        if lines.is_empty() {
            return Ok(());
        }

        let size_px = style.font_size as f32;
        let brush = brush_for(style.text_color);
        let line_height = self.text.line_height(size_px)?;

        let mut y = style.position.y;
        for line in lines {
            let layout = self.text.layout_line(&line, size_px, brush)?;
            let width = f64::from(layout.width());

            let pill = Rect::new(
                style.position.x - width / 2.0 - CTA_HPAD,
                y - line_height / 2.0,
                style.position.x + width / 2.0 + CTA_HPAD,
                y + line_height / 2.0,
            );
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(paint_color(style.background_color));
            ctx.fill_path(&bezpath_to_cpu(&rounded_rect_path(pill, CTA_CORNER_RADIUS)));

            // Text centered both ways inside the pill.
            let top = y - f64::from(layout.height()) / 2.0;
            self.draw_layout(ctx, &layout, Point::new(style.position.x - width / 2.0, top));

            y += line_height;
        }
        Ok(())
    }

    fn draw_upload(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        layers: &LayerCache,
        mask: MaskRect,
    ) -> BannercraftResult<()> {
        let Some(image) = layers.get(LayerSlot::Upload) else {
            return Ok(());
        };
        if image.width == 0 || image.height == 0 {
            return Ok(());
        }
        let dest = mask.to_rect();
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Ok(());
        }

        let transform = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(
                dest.width() / f64::from(image.width),
                dest.height() / f64::from(image.height),
            );
        draw_image(ctx, image, transform)
    }

    fn draw_layout(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &parley::Layout<TextBrush>,
        origin: Point,
    ) {
        ctx.set_transform(affine_to_cpu(Affine::translate((origin.x, origin.y))));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    image: &LayerImage,
    transform: Affine,
) -> BannercraftResult<()> {
    let paint = image.to_paint()?;
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(image.width),
        f64::from(image.height),
    ));
    Ok(())
}

fn paint_color(color: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn brush_for(color: Color) -> TextBrush {
    TextBrush {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

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
