//! CPU rasterizer built on tiny-skia.

use crate::renderer::{CircleClip, RenderContext, RenderResult, RenderedImage, Renderer, RendererError};
use bonkskin_core::selection::{HANDLE_SIZE, HandleKind, TransformAffordance};
use bonkskin_core::shapes::{Image, ImageFormat, SerializableColor, Shape, ShapeId, ShapeTrait};
use kurbo::{Affine, BezPath, PathEl, Shape as KurboShape};
use peniko::Color;
use resvg::tiny_skia::{
    self, FillRule, FilterQuality, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};
use resvg::usvg;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A decoded raster image and the hash of the data it came from.
struct CachedImage {
    data_hash: u64,
    pixmap: Pixmap,
}

/// Software renderer producing straight-alpha RGBA frames.
#[derive(Default)]
pub struct CpuRenderer {
    /// Decoded raster images by shape id. Pruned to the rendered scene.
    image_cache: HashMap<ShapeId, CachedImage>,
}

impl CpuRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of decoded images held.
    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }

    fn draw_shape(&mut self, pixmap: &mut Pixmap, shape: &Shape, transform: Affine) {
        if let Shape::Image(image) = shape {
            self.draw_image(pixmap, image, transform);
            return;
        }
        let Some(path) = to_skia_path(&shape.to_path()) else {
            return;
        };
        let ts = to_skia_transform(transform);
        let style = shape.style();
        if let Some(fill) = style.fill_color {
            pixmap.fill_path(&path, &paint(fill), FillRule::Winding, ts, None);
        }
        if let (true, Some(color)) = (style.has_stroke(), style.stroke_color) {
            let stroke = Stroke {
                width: style.stroke_width as f32,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint(color), &stroke, ts, None);
        }
    }

    fn draw_image(&mut self, pixmap: &mut Pixmap, image: &Image, transform: Affine) {
        let bounds = image.as_rect();
        match image.format {
            ImageFormat::Png => {
                let data_hash = hash_data(&image.data_base64);
                let fresh = self
                    .image_cache
                    .get(&image.id())
                    .is_some_and(|cached| cached.data_hash == data_hash);
                if !fresh {
                    match decode_raster(image) {
                        Some(pixmap) => {
                            let cached = CachedImage { data_hash, pixmap };
                            self.image_cache.insert(image.id(), cached);
                        }
                        None => {
                            log::warn!("Could not decode image {}", image.id());
                            draw_placeholder(pixmap, image, transform);
                            return;
                        }
                    }
                }
                let Some(source) = self.image_cache.get(&image.id()).map(|c| &c.pixmap) else {
                    return;
                };
                let image_transform = transform
                    * Affine::translate((bounds.x0, bounds.y0))
                    * Affine::scale_non_uniform(
                        bounds.width() / source.width() as f64,
                        bounds.height() / source.height() as f64,
                    );
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                pixmap.draw_pixmap(
                    0,
                    0,
                    source.as_ref(),
                    &paint,
                    to_skia_transform(image_transform),
                    None,
                );
            }
            ImageFormat::Svg => {
                let Some(tree) = image
                    .data()
                    .and_then(|data| usvg::Tree::from_data(&data, &usvg::Options::default()).ok())
                else {
                    log::warn!("Could not parse SVG image {}", image.id());
                    draw_placeholder(pixmap, image, transform);
                    return;
                };
                let size = tree.size();
                let image_transform = transform
                    * Affine::translate((bounds.x0, bounds.y0))
                    * Affine::scale_non_uniform(
                        bounds.width() / size.width() as f64,
                        bounds.height() / size.height() as f64,
                    );
                resvg::render(&tree, to_skia_transform(image_transform), &mut pixmap.as_mut());
            }
        }
    }
}

impl Renderer for CpuRenderer {
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<RenderedImage> {
        let (width, height) = ctx.output_size();
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RendererError::InvalidSize { width, height })?;

        let base = Affine::scale(ctx.pixel_ratio);
        for node in ctx.document.nodes() {
            self.draw_shape(&mut pixmap, &node.shape, base * node.shape.transform());
        }

        if let Some(affordance) = ctx.affordance.filter(|a| a.visible) {
            if let Some(node) = ctx.document.node(affordance.target()) {
                draw_affordance(&mut pixmap, &node.shape, affordance, base, ctx.selection_color);
            }
        }

        if let Some(clip) = ctx.clip {
            apply_circle_clip(&mut pixmap, clip, ctx.pixel_ratio);
        }
        self.image_cache.retain(|id, _| ctx.document.node(*id).is_some());

        Ok(RenderedImage {
            rgba_data: demultiplied(&pixmap),
            width,
            height,
        })
    }
}

fn hash_data(data: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}

fn paint(color: SerializableColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn to_skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Decode a PNG image into a premultiplied pixmap.
fn decode_raster(image: &Image) -> Option<Pixmap> {
    let data = image.data()?;
    let decoded = ::image::load_from_memory_with_format(&data, ::image::ImageFormat::Png).ok()?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixels = rgba.into_raw();
    for px in pixels.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(pixels, IntSize::from_wh(width, height)?)
}

/// Grey box for images that could not be decoded.
fn draw_placeholder(pixmap: &mut Pixmap, image: &Image, transform: Affine) {
    if let Some(path) = to_skia_path(&image.as_rect().to_path(0.1)) {
        pixmap.fill_path(
            &path,
            &paint(SerializableColor::rgb(200, 200, 200)),
            FillRule::Winding,
            to_skia_transform(transform),
            None,
        );
    }
}

fn draw_affordance(
    pixmap: &mut Pixmap,
    shape: &Shape,
    affordance: &TransformAffordance,
    base: Affine,
    color: Color,
) {
    let outline_color = SerializableColor::from(color);
    let outline = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    if let Some(path) = to_skia_path(&shape.bounds().to_path(0.1)) {
        let ts = to_skia_transform(base * shape.transform());
        pixmap.stroke_path(&path, &paint(outline_color), &outline, ts, None);
    }

    let scale = base.as_coeffs()[0];
    let half = (HANDLE_SIZE / 2.0 * scale) as f32;
    for handle in affordance.handles(shape) {
        let p = base * handle.position;
        let (x, y) = (p.x as f32, p.y as f32);
        let path = match handle.kind {
            HandleKind::Corner(_) => tiny_skia::Rect::from_xywh(x - half, y - half, half * 2.0, half * 2.0)
                .map(PathBuilder::from_rect),
            HandleKind::Rotate => PathBuilder::from_circle(x, y, half),
        };
        let Some(path) = path else { continue };
        pixmap.fill_path(
            &path,
            &paint(SerializableColor::white()),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        pixmap.stroke_path(&path, &paint(outline_color), &outline, Transform::identity(), None);
    }
}

/// Fade out everything outside the clip circle, anti-aliasing its edge.
fn apply_circle_clip(pixmap: &mut Pixmap, clip: CircleClip, pixel_ratio: f64) {
    let cx = clip.center.x * pixel_ratio;
    let cy = clip.center.y * pixel_ratio;
    let radius = clip.radius * pixel_ratio;
    let width = pixmap.width() as usize;
    for (i, px) in pixmap.data_mut().chunks_exact_mut(4).enumerate() {
        let x = (i % width) as f64 + 0.5;
        let y = (i / width) as f64 + 0.5;
        let dist = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
        let coverage = (radius - dist + 0.5).clamp(0.0, 1.0);
        if coverage >= 1.0 {
            continue;
        }
        // Premultiplied, so scaling every channel keeps colours intact.
        for c in px.iter_mut() {
            *c = (*c as f64 * coverage).round() as u8;
        }
    }
}

fn demultiplied(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonkskin_core::{ActiveMode, EditorConfig, EditorSession, NewShape, SkinDocument, Snapshot};
    use kurbo::Size;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = ::image::RgbaImage::from_pixel(width, height, ::image::Rgba(rgba));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ::image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn render(session: &EditorSession, clip: bool) -> RenderedImage {
        let ctx = RenderContext::new(session.document(), session.stage_size())
            .with_clip(clip.then(|| CircleClip::for_stage(session.stage_size())));
        CpuRenderer::new().render(&ctx).unwrap()
    }

    #[test]
    fn test_default_skin_colors() {
        let session = EditorSession::with_default_skin(EditorConfig::default()).unwrap();
        let image = render(&session, true);
        assert_eq!((image.width, image.height), (500, 500));
        assert_eq!(image.pixel(250, 250), Some([0x00, 0xc3, 0xff, 255]));
        assert_eq!(image.pixel(250, 20), Some([0x22, 0x22, 0x22, 255]));
        assert_eq!(image.pixel(0, 0).map(|p| p[3]), Some(0));
        assert_eq!(image.pixel(500, 0), None);
    }

    #[test]
    fn test_clip_removes_outside_content() {
        // A 100x100 rect fills the whole 100x100 stage.
        let config = EditorConfig::default().with_stage_size(100.0, 100.0);
        let mut session = EditorSession::new(config);
        session.add_shape(NewShape::Rect).unwrap();

        let unclipped = render(&session, false);
        assert_eq!(unclipped.pixel(0, 0).map(|p| p[3]), Some(255));
        let clipped = render(&session, true);
        assert_eq!(clipped.pixel(0, 0).map(|p| p[3]), Some(0));
        assert_eq!(clipped.pixel(50, 50).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_png_image_is_drawn() {
        let mut session = EditorSession::new(EditorConfig::default());
        session
            .import_file("skin.png", &png_bytes(20, 20, [255, 0, 0, 255]))
            .unwrap();
        let image = render(&session, true);
        assert_eq!(image.pixel(250, 250), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_svg_image_is_drawn() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#00ff00"/></svg>"##;
        let mut session = EditorSession::new(EditorConfig::default());
        session.import_file("skin.svg", svg).unwrap();
        let image = render(&session, true);
        assert_eq!(image.pixel(250, 250), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_image_cache_follows_scene() {
        let mut session = EditorSession::new(EditorConfig::default());
        let mut renderer = CpuRenderer::new();
        let render_with = |renderer: &mut CpuRenderer, document: &SkinDocument| {
            let ctx = RenderContext::new(document, Size::new(500.0, 500.0));
            renderer.render(&ctx).unwrap()
        };

        session
            .import_file("red.png", &png_bytes(20, 20, [255, 0, 0, 255]))
            .unwrap();
        let red = render_with(&mut renderer, session.document());
        assert_eq!(red.pixel(250, 250), Some([255, 0, 0, 255]));
        assert_eq!(renderer.cached_images(), 1);

        // Same shape id, different pixels: the cached decode must not be reused.
        let blue_data = Image::new(
            kurbo::Point::ZERO,
            &png_bytes(20, 20, [0, 0, 255, 255]),
            20,
            20,
            ImageFormat::Png,
        )
        .data_base64;
        let Some(Shape::Image(current)) = session.selected_node().map(|n| &n.shape) else {
            panic!("imported image should be selected");
        };
        let json = session
            .document()
            .to_snapshot()
            .unwrap()
            .as_str()
            .replace(&current.data_base64, &blue_data);
        let swapped = SkinDocument::from_snapshot(&Snapshot::new(json)).unwrap();
        let blue = render_with(&mut renderer, &swapped);
        assert_eq!(blue.pixel(250, 250), Some([0, 0, 255, 255]));

        // Images that left the scene are evicted.
        session.reset().unwrap();
        render_with(&mut renderer, session.document());
        assert_eq!(renderer.cached_images(), 0);
    }

    #[test]
    fn test_affordance_only_when_visible() {
        let mut session = EditorSession::with_default_skin(EditorConfig::default()).unwrap();
        session.set_mode(ActiveMode::Resize);
        let draw = |session: &EditorSession| {
            let ctx = RenderContext::new(session.document(), Size::new(500.0, 500.0))
                .with_affordance(session.selection().affordance());
            CpuRenderer::new().render(&ctx).unwrap()
        };
        let shown = draw(&session);
        session.set_affordance_visible(false);
        let hidden = draw(&session);
        assert_ne!(shown, hidden);
        // Bottom-right anchor of the circle's box sits at (375, 375).
        assert_eq!(shown.pixel(375, 375), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_invalid_size() {
        let session = EditorSession::new(EditorConfig::default());
        let ctx = RenderContext::new(session.document(), Size::new(0.0, 10.0));
        assert!(matches!(
            CpuRenderer::new().render(&ctx),
            Err(RendererError::InvalidSize { .. })
        ));
    }
}
