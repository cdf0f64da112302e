use crate::foundation::core::{GeoBounds, LatLng, Point, Rect, Rgba8Premul, Vec2};
use crate::foundation::error::{VizError, VizResult};
use crate::render::color::ColorF;
use crate::render::surface::{DrawingSurface, EntityHandle, RenderKey};
use crate::scene::model::Style;
use kurbo::Shape;
use std::collections::BTreeMap;
use std::path::Path;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are premultiplied alpha; with an opaque background every pixel ends up opaque.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some(Rgba8Premul {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Encode the frame as PNG at `path`.
    pub fn save_png(&self, path: &Path) -> VizResult<()> {
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| VizError::Other(anyhow::anyhow!("write png '{}': {e}", path.display())))
    }
}

/// Options for [`RasterSurface`].
#[derive(Debug, Clone, Copy)]
pub struct RasterOpts {
    /// Output width in pixels.
    pub width: u16,
    /// Output height in pixels.
    pub height: u16,
    /// Empty border kept around fitted bounds, in pixels.
    pub padding_px: f64,
    /// Straight-alpha RGBA8 background.
    pub background: [u8; 4],
}

impl Default for RasterOpts {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            padding_px: 24.0,
            background: [18, 20, 28, 255],
        }
    }
}

#[derive(Debug, Clone)]
enum RasterShape {
    Marker(LatLng),
    Line(Vec<LatLng>),
}

#[derive(Debug, Clone)]
struct RasterEntity {
    key: RenderKey,
    shape: RasterShape,
    rgba: [u8; 4],
    size: f64,
}

/// CPU raster implementation of [`DrawingSurface`] built on `vello_cpu`.
///
/// Geometry is projected equirectangularly into the viewport set by the last `fit_bounds` (or the
/// extent of all live entities before the first fit). Lines are painted under markers; within a
/// layer entities paint in creation order.
pub struct RasterSurface {
    opts: RasterOpts,
    entities: BTreeMap<EntityHandle, RasterEntity>,
    next_handle: u64,
    viewport: Option<GeoBounds>,
    ctx: Option<vello_cpu::RenderContext>,
}

impl RasterSurface {
    /// Create an empty surface.
    pub fn new(opts: RasterOpts) -> Self {
        Self {
            opts,
            entities: BTreeMap::new(),
            next_handle: 0,
            viewport: None,
            ctx: None,
        }
    }

    /// Surface options.
    pub fn opts(&self) -> RasterOpts {
        self.opts
    }

    /// Current viewport.
    pub fn viewport(&self) -> Option<GeoBounds> {
        self.viewport
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Keys of live entities in creation order.
    pub fn keys(&self) -> impl Iterator<Item = &RenderKey> {
        self.entities.values().map(|e| &e.key)
    }

    /// Rasterize every live entity into a new frame.
    pub fn render(&mut self) -> VizResult<FrameRGBA> {
        let (w, h) = (self.opts.width, self.opts.height);
        if w == 0 || h == 0 {
            return Err(VizError::surface("raster surface size must be non-zero"));
        }
        let proj = Projection::new(self.effective_viewport(), self.opts);

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let [r, g, b, a] = self.opts.background;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w as f64, h as f64));

        for e in self.entities.values() {
            let RasterShape::Line(path) = &e.shape else {
                continue;
            };
            let [r, g, b, a] = e.rgba;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            let pts: Vec<Point> = path.iter().map(|p| proj.apply(*p)).collect();
            for seg in pts.windows(2) {
                if let Some(quad) = segment_quad(seg[0], seg[1], e.size.max(1.0)) {
                    ctx.fill_path(&bezpath_to_cpu(&quad));
                }
            }
        }
        for e in self.entities.values() {
            let RasterShape::Marker(at) = &e.shape else {
                continue;
            };
            let [r, g, b, a] = e.rgba;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            let circle = kurbo::Circle::new(proj.apply(*at), (e.size * 0.5).max(1.0));
            ctx.fill_path(&bezpath_to_cpu(&circle.to_path(0.1)));
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        let data = pixmap.data_as_u8_slice().to_vec();
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: u32::from(w),
            height: u32::from(h),
            data,
            premultiplied: true,
        })
    }

    fn effective_viewport(&self) -> Option<GeoBounds> {
        self.viewport.or_else(|| {
            GeoBounds::from_points(self.entities.values().flat_map(|e| match &e.shape {
                RasterShape::Marker(at) => vec![*at],
                RasterShape::Line(path) => path.clone(),
            }))
        })
    }

    fn alloc(&mut self, key: &RenderKey, shape: RasterShape, style: &Style) -> EntityHandle {
        let color = ColorF::parse(&style.color).unwrap_or_else(|e| {
            tracing::warn!(%key, error = %e, "unparseable color; using grey");
            ColorF::rgba(0.5, 0.5, 0.5, 1.0)
        });
        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;
        self.entities.insert(
            handle,
            RasterEntity {
                key: key.clone(),
                shape,
                rgba: color.with_opacity(style.opacity).to_rgba8(),
                size: if style.size.is_finite() { style.size } else { 1.0 },
            },
        );
        handle
    }
}

impl DrawingSurface for RasterSurface {
    fn draw_marker(
        &mut self,
        key: &RenderKey,
        at: LatLng,
        style: &Style,
    ) -> VizResult<EntityHandle> {
        Ok(self.alloc(key, RasterShape::Marker(at), style))
    }

    fn draw_line(
        &mut self,
        key: &RenderKey,
        path: &[LatLng],
        style: &Style,
    ) -> VizResult<EntityHandle> {
        Ok(self.alloc(key, RasterShape::Line(path.to_vec()), style))
    }

    fn remove(&mut self, handle: EntityHandle) -> VizResult<()> {
        self.entities
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| VizError::surface(format!("remove of unknown handle {}", handle.0)))
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) -> VizResult<()> {
        self.viewport = Some(bounds);
        Ok(())
    }
}

/// Equirectangular lat/lng to pixel mapping that keeps the aspect ratio.
struct Projection {
    center: Point,
    scale: f64,
    origin: Point,
}

impl Projection {
    fn new(viewport: Option<GeoBounds>, opts: RasterOpts) -> Self {
        let (w, h) = (f64::from(opts.width), f64::from(opts.height));
        let origin = Point::new(w * 0.5, h * 0.5);
        let Some(vp) = viewport else {
            return Self {
                center: Point::ORIGIN,
                scale: 1.0,
                origin,
            };
        };
        let rect: Rect = vp.to_rect();
        let avail_w = (w - 2.0 * opts.padding_px).max(1.0);
        let avail_h = (h - 2.0 * opts.padding_px).max(1.0);
        let sx = (rect.width() > 0.0).then(|| avail_w / rect.width());
        let sy = (rect.height() > 0.0).then(|| avail_h / rect.height());
        let scale = match (sx, sy) {
            (Some(x), Some(y)) => x.min(y),
            (Some(s), None) | (None, Some(s)) => s,
            (None, None) => 1.0,
        };
        Self {
            center: rect.center(),
            scale,
            origin,
        }
    }

    fn apply(&self, p: LatLng) -> Point {
        let d = p.to_point() - self.center;
        // Latitude grows northwards, pixel rows grow downwards.
        self.origin + Vec2::new(d.x * self.scale, -d.y * self.scale)
    }
}

fn segment_quad(a: Point, b: Point, width: f64) -> Option<kurbo::BezPath> {
    let d = b - a;
    let len = d.hypot();
    if len < 1e-9 {
        return None;
    }
    let n = Vec2::new(-d.y / len, d.x / len) * (width * 0.5);
    let mut p = kurbo::BezPath::new();
    p.move_to(a + n);
    p.line_to(b + n);
    p.line_to(b - n);
    p.line_to(a - n);
    p.close_path();
    Some(p)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
