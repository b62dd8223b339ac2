pub mod font;
pub mod layout;

use crate::config::{BrandingConfig, CaptionConfig, Color};
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

/// Rasterizes caption and branding text onto transparent full-frame layers.
pub struct OverlayRenderer {
    font: FontVec,
    width: u32,
    height: u32,
    captions: CaptionConfig,
    branding: BrandingConfig,
}

struct TextStyle {
    scale: PxScale,
    fill: Color,
    stroke: Option<(Color, u32)>,
}

impl OverlayRenderer {
    pub fn new(
        font: FontVec,
        width: u32,
        height: u32,
        captions: &CaptionConfig,
        branding: &BrandingConfig,
    ) -> Self {
        Self {
            font,
            width,
            height,
            captions: captions.clone(),
            branding: branding.clone(),
        }
    }

    pub fn blank(&self) -> RgbaImage {
        RgbaImage::new(self.width, self.height)
    }

    /// Caption plus branding on one layer. `None` draws branding only.
    pub fn compose(&self, caption: Option<&str>) -> RgbaImage {
        let mut layer = self.blank();
        if let Some(text) = caption {
            self.draw_caption(&mut layer, text);
        }
        self.draw_branding(&mut layer);
        layer
    }

    pub fn caption_layer(&self, text: &str) -> RgbaImage {
        let mut layer = self.blank();
        self.draw_caption(&mut layer, text);
        layer
    }

    pub fn branding_layer(&self) -> Option<RgbaImage> {
        let mut layer = self.blank();
        self.draw_branding(&mut layer).then_some(layer)
    }

    pub fn caption_lines(&self, text: &str) -> Vec<String> {
        let text = if self.captions.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        let scale = PxScale::from(self.captions.font_size);
        layout::wrap_to_width(&text, self.captions.max_width as f32, |line| {
            self.measure(scale, line)
        })
    }

    pub fn draw_caption(&self, canvas: &mut RgbaImage, text: &str) {
        let lines = self.caption_lines(text);
        if lines.is_empty() {
            return;
        }

        let style = TextStyle {
            scale: PxScale::from(self.captions.font_size),
            fill: self.captions.color,
            stroke: self
                .captions
                .stroke_color
                .filter(|_| self.captions.stroke_width > 0)
                .map(|color| (color, self.captions.stroke_width)),
        };
        let scaled = self.font.as_scaled(style.scale);
        let advance = self.captions.font_size * self.captions.line_spacing;
        let glyph_height = scaled.ascent() - scaled.descent();
        let block_height = advance * (lines.len() - 1) as f32 + glyph_height;
        let top = layout::block_top(self.height, block_height, self.captions.vertical_anchor);

        for (i, line) in lines.iter().enumerate() {
            let baseline = top + scaled.ascent() + advance * i as f32;
            let x = (self.width as f32 - self.measure(style.scale, line)) / 2.0;
            self.draw_line(canvas, &style, x, baseline, line);
        }
    }

    /// Returns false when no branding text is configured.
    pub fn draw_branding(&self, canvas: &mut RgbaImage) -> bool {
        let Some(text) = self.branding.text.as_deref().filter(|t| !t.trim().is_empty()) else {
            return false;
        };

        let style = TextStyle {
            scale: PxScale::from(self.branding.font_size),
            fill: self.branding.color,
            stroke: None,
        };
        let scaled = self.font.as_scaled(style.scale);
        let lines = layout::wrap_to_width(text, self.width as f32 * 0.95, |line| {
            self.measure(style.scale, line)
        });
        let advance = self.branding.font_size * 1.2;
        let top = self.height.saturating_sub(self.branding.bottom_margin) as f32;

        for (i, line) in lines.iter().enumerate() {
            let baseline = top + scaled.ascent() + advance * i as f32;
            let x = (self.width as f32 - self.measure(style.scale, line)) / 2.0;
            self.draw_line(canvas, &style, x, baseline, line);
        }
        true
    }

    pub fn measure(&self, scale: PxScale, text: &str) -> f32 {
        let scaled = self.font.as_scaled(scale);
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    fn draw_line(&self, canvas: &mut RgbaImage, style: &TextStyle, x: f32, baseline: f32, text: &str) {
        if let Some((color, radius)) = style.stroke {
            let r = radius as i32;
            for dy in -r..=r {
                for dx in -r..=r {
                    if (dx == 0 && dy == 0) || dx * dx + dy * dy > r * r {
                        continue;
                    }
                    self.draw_glyphs(
                        canvas,
                        style.scale,
                        color,
                        x + dx as f32,
                        baseline + dy as f32,
                        text,
                    );
                }
            }
        }
        self.draw_glyphs(canvas, style.scale, style.fill, x, baseline, text);
    }

    fn draw_glyphs(
        &self,
        canvas: &mut RgbaImage,
        scale: PxScale,
        color: Color,
        x: f32,
        baseline: f32,
        text: &str,
    ) {
        let scaled = self.font.as_scaled(scale);
        let mut caret = x;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + i64::from(gx);
                let py = bounds.min.y as i64 + i64::from(gy);
                blend_over(canvas, px, py, color, coverage);
            });
        }
    }
}

/// Straight-alpha source-over of `color` scaled by `coverage`.
pub fn blend_over(canvas: &mut RgbaImage, x: i64, y: i64, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let src_a = f32::from(color.0[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }

    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let dst_a = f32::from(dst.0[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let s = f32::from(color.0[c]);
        let d = f32::from(dst.0[c]);
        out[c] = ((s * src_a + d * dst_a * (1.0 - src_a)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba(out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_color_replaces_pixel() {
        let mut img = RgbaImage::new(2, 2);
        blend_over(&mut img, 1, 1, Color::rgb(255, 0, 0), 1.0);
        assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn partial_coverage_on_transparent_keeps_color() {
        let mut img = RgbaImage::new(1, 1);
        blend_over(&mut img, 0, 0, Color::rgb(255, 255, 255), 0.5);
        let px = img.get_pixel(0, 0).0;
        assert_eq!(&px[..3], &[255, 255, 255]);
        assert_eq!(px[3], 128);
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut img = RgbaImage::new(1, 1);
        blend_over(&mut img, -1, 0, Color::white(), 1.0);
        blend_over(&mut img, 0, 5, Color::white(), 1.0);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }
}
