// SPDX-License-Identifier: MPL-2.0
//! The export renderer: flattens image + style + strokes + vignette +
//! overlays + decorative frame into one raster.
//!
//! The algorithm is stateless and deterministic: rendering the same
//! [`ExportSnapshot`] twice produces byte-identical output. The draw order
//! is fixed and each stage is fully opaque to the next:
//!
//! 1. allocate the target surface at `frame * multiplier`;
//! 2. styled base image through the display transform;
//! 3. the annotation layer through the *same* transform (erasers punch
//!    holes in that layer only, never in the base image);
//! 4. radial vignette;
//! 5. overlays at frame-relative positions;
//! 6. optional decorative frame border, content-box sized.

use crate::domain::annotation::Stroke;
use crate::domain::color::Rgba;
use crate::domain::geometry::{Bounds, Vec2};
use crate::domain::overlay::Overlay;
use crate::domain::source::PixelSource;
use crate::domain::style::ResolvedStyle;
use crate::domain::transform::{DisplayMatrix, Transform};
use crate::error::{Error, Result};
use crate::render::style_paint;
use image_rs::RgbaImage;
use std::io::Cursor;
use tiny_skia::{
    BlendMode, Color, FillRule, FilterQuality, GradientStop, LineCap, LineJoin, Paint,
    PathBuilder, Pixmap, PixmapPaint, Point, RadialGradient, Rect, SpreadMode,
    Transform as SkTransform,
};

// =============================================================================
// Inputs
// =============================================================================

/// A decorative border composited around the finished raster.
///
/// Sizing is content-box: the border sits outside the content area, so the
/// exported raster grows by the border width on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameDecoration {
    /// A single solid border.
    Solid { width: f32, color: Rgba },
    /// A wide mat with a thin trim line between mat and content.
    Mat {
        mat_width: f32,
        mat_color: Rgba,
        trim_width: f32,
        trim_color: Rgba,
    },
}

impl FrameDecoration {
    /// Total border thickness per side, in frame pixels.
    #[must_use]
    pub fn total_border(&self) -> f32 {
        match *self {
            FrameDecoration::Solid { width, .. } => width.max(0.0),
            FrameDecoration::Mat {
                mat_width,
                trim_width,
                ..
            } => mat_width.max(0.0) + trim_width.max(0.0),
        }
    }
}

/// Every input the renderer needs, captured by value.
///
/// The snapshot owns (or `Arc`-shares) all of its data, so edits made to
/// the live session after an export begins cannot affect the render.
#[derive(Debug, Clone)]
pub struct ExportSnapshot {
    pub source: PixelSource,
    pub image_bounds: Bounds,
    pub frame_bounds: Bounds,
    pub transform: Transform,
    pub style: ResolvedStyle,
    pub strokes: Vec<Stroke>,
    pub overlays: Vec<Overlay>,
    pub decoration: Option<FrameDecoration>,
    /// Output size as a multiple of the frame size.
    pub multiplier: f32,
}

/// The flattened result, straight-alpha RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ExportedImage {
    /// Reads one pixel, for inspection and tests.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ])
    }

    /// Encodes the raster as PNG (lossless) for the save/download surface.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let image = RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .ok_or_else(|| Error::Encode("raster buffer/dimension mismatch".to_string()))?;
        let mut bytes = Vec::new();
        image_rs::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), image_rs::ImageFormat::Png)
            .map_err(|e| Error::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Renders the snapshot to a flattened raster.
///
/// Fails as a whole if any pixel source does not decode; no partial raster
/// is ever returned.
pub fn render_export(snapshot: &ExportSnapshot) -> Result<ExportedImage> {
    let multiplier = snapshot.multiplier;
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(Error::Render(format!(
            "invalid output multiplier {multiplier}"
        )));
    }
    if !snapshot.frame_bounds.is_measurable() || !snapshot.image_bounds.is_measurable() {
        return Err(Error::Render("frame or image not measured".to_string()));
    }

    let out_w = (snapshot.frame_bounds.width * multiplier).round().max(1.0) as u32;
    let out_h = (snapshot.frame_bounds.height * multiplier).round().max(1.0) as u32;
    let mut surface = Pixmap::new(out_w, out_h)
        .ok_or_else(|| Error::Render(format!("cannot allocate {out_w}x{out_h} surface")))?;

    // Stage 2: styled base image through the display transform.
    let mut decoded = snapshot.source.decode()?;
    style_paint::apply_ops(&mut decoded, &snapshot.style.ops);
    let source_pixmap = pixmap_from_rgba(&decoded)?;
    let matrix = snapshot
        .transform
        .display_matrix(snapshot.image_bounds, snapshot.frame_bounds, multiplier);
    let (dw, dh) = decoded.dimensions();
    // Decoded pixels may differ from the model's natural size (e.g. a
    // pre-downsampled preview source); map them onto the natural box.
    let image_transform = to_skia(matrix).pre_scale(
        snapshot.image_bounds.width / dw as f32,
        snapshot.image_bounds.height / dh as f32,
    );
    surface.draw_pixmap(
        0,
        0,
        source_pixmap.as_ref(),
        &smooth_paint(),
        image_transform,
        None,
    );

    // Stage 3: annotation layer, filter reset to none, same transform.
    if !snapshot.strokes.is_empty() {
        let layer = render_stroke_layer(
            out_w,
            out_h,
            &snapshot.strokes,
            &matrix,
            snapshot.transform.scale * multiplier,
        )?;
        surface.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &PixmapPaint::default(),
            SkTransform::identity(),
            None,
        );
    }

    // Stage 4: vignette.
    if snapshot.style.vignette > 0.0 {
        paint_vignette(&mut surface, snapshot.style.vignette)?;
    }

    // Stage 5: overlays, independent of the image transform.
    for overlay in &snapshot.overlays {
        draw_overlay(&mut surface, overlay, snapshot.frame_bounds, multiplier)?;
    }

    // Stage 6: decorative frame, content-box sized.
    let surface = match snapshot.decoration {
        Some(decoration) => apply_decoration(&surface, decoration, multiplier)?,
        None => surface,
    };

    log::debug!("exported {}x{} raster", surface.width(), surface.height());
    Ok(ExportedImage {
        width: surface.width(),
        height: surface.height(),
        rgba: rgba_from_pixmap(&surface),
    })
}

fn render_stroke_layer(
    width: u32,
    height: u32,
    strokes: &[Stroke],
    matrix: &DisplayMatrix,
    pixel_scale: f32,
) -> Result<Pixmap> {
    let mut layer = Pixmap::new(width, height)
        .ok_or_else(|| Error::Render("cannot allocate annotation layer".to_string()))?;

    for stroke in strokes {
        if stroke.points.is_empty() {
            continue;
        }
        let mut paint = Paint::default();
        paint.anti_alias = true;
        if stroke.is_eraser {
            paint.set_color(Color::BLACK);
            paint.blend_mode = BlendMode::DestinationOut;
        } else {
            paint.set_color_rgba8(
                stroke.color.r,
                stroke.color.g,
                stroke.color.b,
                stroke.color.a,
            );
        }

        // Points are mapped explicitly so stroke thickness scales with
        // zoom exactly like image pixels do.
        let mapped: Vec<Vec2> = stroke.points.iter().map(|p| matrix.map(*p)).collect();
        let stroke_width = (stroke.width * pixel_scale).max(0.1);

        if mapped.len() == 1 {
            // A tap leaves a dot.
            if let Some(path) =
                PathBuilder::from_circle(mapped[0].x, mapped[0].y, stroke_width * 0.5)
            {
                layer.fill_path(&path, &paint, FillRule::Winding, SkTransform::identity(), None);
            }
            continue;
        }

        let mut builder = PathBuilder::new();
        builder.move_to(mapped[0].x, mapped[0].y);
        for point in &mapped[1..] {
            builder.line_to(point.x, point.y);
        }
        let Some(path) = builder.finish() else {
            continue;
        };
        let sk_stroke = tiny_skia::Stroke {
            width: stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..tiny_skia::Stroke::default()
        };
        layer.stroke_path(&path, &paint, &sk_stroke, SkTransform::identity(), None);
    }
    Ok(layer)
}

fn paint_vignette(surface: &mut Pixmap, strength: f32) -> Result<()> {
    let width = surface.width() as f32;
    let height = surface.height() as f32;
    let center = Point::from_xy(width * 0.5, height * 0.5);
    let outer_radius = (width * 0.5).hypot(height * 0.5);
    let strength = strength.clamp(0.0, 1.0);

    let inner_stop = (1.0 - strength).clamp(0.0, 1.0);
    let dark = Color::from_rgba8(0, 0, 0, (strength * 255.0).round() as u8);
    let shader = RadialGradient::new(
        center,
        center,
        outer_radius,
        vec![
            GradientStop::new(inner_stop, Color::TRANSPARENT),
            GradientStop::new(1.0, dark),
        ],
        SpreadMode::Pad,
        SkTransform::identity(),
    )
    .ok_or_else(|| Error::Render("vignette gradient construction failed".to_string()))?;

    let mut paint = Paint::default();
    paint.shader = shader;
    paint.anti_alias = false;
    let rect = Rect::from_xywh(0.0, 0.0, width, height)
        .ok_or_else(|| Error::Render("degenerate vignette rect".to_string()))?;
    surface.fill_rect(rect, &paint, SkTransform::identity(), None);
    Ok(())
}

fn draw_overlay(
    surface: &mut Pixmap,
    overlay: &Overlay,
    frame: Bounds,
    multiplier: f32,
) -> Result<()> {
    let decoded = overlay.source.decode().map_err(|e| {
        Error::Decode(format!("overlay {}: {e}", overlay.id.value()))
    })?;
    let (src_w, src_h) = decoded.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(Error::Decode(format!(
            "overlay {} has no pixels",
            overlay.id.value()
        )));
    }
    let pixmap = pixmap_from_rgba(&decoded)?;

    let display_w = overlay.width * overlay.scale * multiplier;
    let display_h = overlay.height * overlay.scale * multiplier;
    let center = (frame.center() + overlay.position) * multiplier;

    let transform = SkTransform::from_translate(center.x, center.y)
        .pre_concat(SkTransform::from_rotate(overlay.rotation_degrees))
        .pre_scale(display_w / src_w as f32, display_h / src_h as f32)
        .pre_translate(-(src_w as f32) * 0.5, -(src_h as f32) * 0.5);

    surface.draw_pixmap(0, 0, pixmap.as_ref(), &smooth_paint(), transform, None);
    Ok(())
}

fn apply_decoration(
    content: &Pixmap,
    decoration: FrameDecoration,
    multiplier: f32,
) -> Result<Pixmap> {
    let border = (decoration.total_border() * multiplier).round().max(0.0) as u32;
    if border == 0 {
        return Ok(content.clone());
    }
    let out_w = content.width() + 2 * border;
    let out_h = content.height() + 2 * border;
    let mut framed = Pixmap::new(out_w, out_h)
        .ok_or_else(|| Error::Render(format!("cannot allocate {out_w}x{out_h} frame")))?;

    match decoration {
        FrameDecoration::Solid { color, .. } => {
            framed.fill(to_skia_color(color));
        }
        FrameDecoration::Mat {
            mat_width,
            mat_color,
            trim_width,
            trim_color,
            ..
        } => {
            framed.fill(to_skia_color(mat_color));
            let mat_px = (mat_width.max(0.0) * multiplier).round();
            let trim_px = (trim_width.max(0.0) * multiplier).round();
            if trim_px > 0.0 {
                let rect = Rect::from_xywh(
                    mat_px,
                    mat_px,
                    content.width() as f32 + 2.0 * trim_px,
                    content.height() as f32 + 2.0 * trim_px,
                )
                .ok_or_else(|| Error::Render("degenerate trim rect".to_string()))?;
                let mut paint = Paint::default();
                paint.set_color(to_skia_color(trim_color));
                paint.anti_alias = false;
                framed.fill_rect(rect, &paint, SkTransform::identity(), None);
            }
        }
    }

    framed.draw_pixmap(
        border as i32,
        border as i32,
        content.as_ref(),
        &PixmapPaint::default(),
        SkTransform::identity(),
        None,
    );
    Ok(framed)
}

// =============================================================================
// Pixel plumbing
// =============================================================================

fn smooth_paint() -> PixmapPaint {
    PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    }
}

fn to_skia(m: DisplayMatrix) -> SkTransform {
    SkTransform::from_row(m.sx, m.ky, m.kx, m.sy, m.tx, m.ty)
}

fn to_skia_color(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Converts a straight-alpha RGBA buffer into a premultiplied pixmap.
fn pixmap_from_rgba(image: &RgbaImage) -> Result<Pixmap> {
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| Error::Render(format!("cannot allocate {width}x{height} pixmap")))?;
    for (pixel, slot) in image.pixels().zip(pixmap.pixels_mut().iter_mut()) {
        let [r, g, b, a] = pixel.0;
        *slot = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Converts a premultiplied pixmap back into straight-alpha RGBA bytes.
fn rgba_from_pixmap(pixmap: &Pixmap) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixmap.pixels().len() * 4);
    for pixel in pixmap.pixels() {
        let demultiplied = pixel.demultiply();
        bytes.extend_from_slice(&[
            demultiplied.red(),
            demultiplied.green(),
            demultiplied.blue(),
            demultiplied.alpha(),
        ]);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotation::{Brush, StrokeHistory};

    fn solid_source(width: u32, height: u32, color: [u8; 4]) -> PixelSource {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        PixelSource::from_rgba(width, height, data).unwrap()
    }

    fn base_snapshot() -> ExportSnapshot {
        ExportSnapshot {
            source: solid_source(100, 100, [255, 255, 255, 255]),
            image_bounds: Bounds::new(100.0, 100.0),
            frame_bounds: Bounds::new(100.0, 100.0),
            transform: Transform::default(),
            style: ResolvedStyle::default(),
            strokes: Vec::new(),
            overlays: Vec::new(),
            decoration: None,
            multiplier: 1.0,
        }
    }

    #[test]
    fn renders_base_image_at_frame_size() {
        let snapshot = ExportSnapshot {
            source: solid_source(100, 100, [200, 30, 30, 255]),
            ..base_snapshot()
        };
        let out = render_export(&snapshot).unwrap();
        assert_eq!((out.width, out.height), (100, 100));
        let center = out.pixel(50, 50).unwrap();
        assert_eq!(center, [200, 30, 30, 255]);
    }

    #[test]
    fn multiplier_scales_output_surface() {
        let snapshot = ExportSnapshot {
            multiplier: 2.0,
            ..base_snapshot()
        };
        let out = render_export(&snapshot).unwrap();
        assert_eq!((out.width, out.height), (200, 200));
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut history = StrokeHistory::default();
        history.start_stroke(Vec2::new(20.0, 20.0), Brush::default());
        history.extend_stroke(Vec2::new(60.0, 70.0));
        history.end_stroke();

        let snapshot = ExportSnapshot {
            strokes: history.strokes().to_vec(),
            style: ResolvedStyle {
                ops: vec![crate::domain::style::Effect::Brightness(1.2)],
                vignette: 0.4,
            },
            ..base_snapshot()
        };
        let a = render_export(&snapshot).unwrap();
        let b = render_export(&snapshot).unwrap();
        assert_eq!(a.rgba, b.rgba);
    }

    #[test]
    fn stroke_lands_at_transformed_position() {
        // Scale 2 with a 2x multiplier: image point (40..60, 50) must appear
        // at output coordinates scaled by 4 around the centers.
        let mut history = StrokeHistory::default();
        history.start_stroke(
            Vec2::new(40.0, 50.0),
            Brush {
                color: Rgba::opaque(255, 0, 0),
                width: 4.0,
                is_eraser: false,
            },
        );
        history.extend_stroke(Vec2::new(50.0, 50.0));
        history.extend_stroke(Vec2::new(60.0, 50.0));
        history.end_stroke();

        let snapshot = ExportSnapshot {
            transform: Transform {
                scale: 2.0,
                ..Transform::default()
            },
            strokes: history.strokes().to_vec(),
            multiplier: 2.0,
            ..base_snapshot()
        };
        let out = render_export(&snapshot).unwrap();
        // Image center (50,50) maps to the output center (100,100); the
        // stroke runs horizontally through it.
        let on_stroke = out.pixel(100, 100).unwrap();
        assert_eq!(on_stroke[0], 255);
        assert_eq!(on_stroke[1], 0);
        // 20 image pixels to the left of the stroke start: untouched white.
        let off_stroke = out.pixel(100, 20).unwrap();
        assert_eq!(off_stroke, [255, 255, 255, 255]);
    }

    #[test]
    fn eraser_clears_annotations_but_not_base_image() {
        let mut history = StrokeHistory::default();
        history.start_stroke(
            Vec2::new(30.0, 50.0),
            Brush {
                color: Rgba::opaque(255, 0, 0),
                width: 10.0,
                is_eraser: false,
            },
        );
        history.extend_stroke(Vec2::new(70.0, 50.0));
        history.end_stroke();
        history.start_stroke(
            Vec2::new(30.0, 50.0),
            Brush {
                width: 20.0,
                is_eraser: true,
                ..Brush::default()
            },
        );
        history.extend_stroke(Vec2::new(70.0, 50.0));
        history.end_stroke();

        let snapshot = ExportSnapshot {
            strokes: history.strokes().to_vec(),
            ..base_snapshot()
        };
        let out = render_export(&snapshot).unwrap();
        // The eraser removed the red ink; the white base shows through.
        assert_eq!(out.pixel(50, 50).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn vignette_darkens_corners_only() {
        let snapshot = ExportSnapshot {
            style: ResolvedStyle {
                ops: Vec::new(),
                vignette: 0.8,
            },
            ..base_snapshot()
        };
        let out = render_export(&snapshot).unwrap();
        let center = out.pixel(50, 50).unwrap();
        let corner = out.pixel(0, 0).unwrap();
        assert_eq!(center, [255, 255, 255, 255]);
        assert!(corner[0] < center[0]);
    }

    #[test]
    fn overlay_draws_at_frame_relative_position() {
        let frame = Bounds::new(100.0, 100.0);
        let mut registry = crate::domain::overlay::OverlayRegistry::default();
        let id = registry.add(solid_source(10, 10, [0, 0, 255, 255]), frame);
        registry.move_to(id, Vec2::new(20.0, 0.0), frame);

        let snapshot = ExportSnapshot {
            overlays: registry.overlays().to_vec(),
            ..base_snapshot()
        };
        let out = render_export(&snapshot).unwrap();
        // Overlay center sits at frame center + (20, 0).
        assert_eq!(out.pixel(70, 50).unwrap(), [0, 0, 255, 255]);
        // Untouched area left of the overlay stays white.
        assert_eq!(out.pixel(20, 50).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn corrupt_source_fails_whole_export() {
        let snapshot = ExportSnapshot {
            source: PixelSource::from_encoded(vec![0xde, 0xad, 0xbe, 0xef]),
            ..base_snapshot()
        };
        assert!(matches!(render_export(&snapshot), Err(Error::Decode(_))));
    }

    #[test]
    fn corrupt_overlay_fails_whole_export() {
        let mut registry = crate::domain::overlay::OverlayRegistry::default();
        let id = registry.add(
            PixelSource::from_encoded(vec![1, 2, 3]),
            Bounds::new(100.0, 100.0),
        );
        let snapshot = ExportSnapshot {
            overlays: vec![registry.get(id).unwrap().clone()],
            ..base_snapshot()
        };
        assert!(matches!(render_export(&snapshot), Err(Error::Decode(_))));
    }

    #[test]
    fn solid_decoration_grows_output_content_box() {
        let snapshot = ExportSnapshot {
            decoration: Some(FrameDecoration::Solid {
                width: 5.0,
                color: Rgba::opaque(10, 20, 30),
            }),
            multiplier: 2.0,
            ..base_snapshot()
        };
        let out = render_export(&snapshot).unwrap();
        // 100*2 content + 2 * (5*2) border per axis.
        assert_eq!((out.width, out.height), (220, 220));
        assert_eq!(out.pixel(1, 1).unwrap(), [10, 20, 30, 255]);
        // Content is untouched inside the border.
        assert_eq!(out.pixel(110, 110).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn mat_decoration_paints_trim_between_mat_and_content() {
        let snapshot = ExportSnapshot {
            decoration: Some(FrameDecoration::Mat {
                mat_width: 8.0,
                mat_color: Rgba::WHITE,
                trim_width: 2.0,
                trim_color: Rgba::opaque(40, 40, 40),
            }),
            source: solid_source(100, 100, [200, 200, 0, 255]),
            ..base_snapshot()
        };
        let out = render_export(&snapshot).unwrap();
        assert_eq!((out.width, out.height), (120, 120));
        assert_eq!(out.pixel(2, 60).unwrap(), [255, 255, 255, 255]); // mat
        assert_eq!(out.pixel(9, 60).unwrap(), [40, 40, 40, 255]); // trim
        assert_eq!(out.pixel(60, 60).unwrap(), [200, 200, 0, 255]); // content
    }

    #[test]
    fn unmeasured_frame_is_a_render_error() {
        let snapshot = ExportSnapshot {
            frame_bounds: Bounds::new(0.0, 100.0),
            ..base_snapshot()
        };
        assert!(matches!(render_export(&snapshot), Err(Error::Render(_))));
    }

    #[test]
    fn invalid_multiplier_is_a_render_error() {
        for multiplier in [0.0, -2.0, f32::NAN] {
            let snapshot = ExportSnapshot {
                multiplier,
                ..base_snapshot()
            };
            assert!(matches!(render_export(&snapshot), Err(Error::Render(_))));
        }
    }

    #[test]
    fn png_encoding_round_trips() {
        let out = render_export(&base_snapshot()).unwrap();
        let png = out.encode_png().unwrap();
        let decoded = image_rs::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), out.width);
        assert_eq!(decoded.height(), out.height);
    }
}
