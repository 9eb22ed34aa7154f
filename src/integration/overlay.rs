//! Annotation drawing on frames.

use std::fs;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect as PixelRect;
use tracing::warn;

use crate::config::OverlayConfig;
use crate::counting::{Detection, Rect};
use crate::error::{Error, Result};

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const ANCHOR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BANNER_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

const BOX_THICKNESS: i32 = 2;
const ANCHOR_RADIUS: i32 = 5;
const LABEL_OFFSET: i32 = 8;
const BANNER_POSITION: (i32, i32) = (20, 40);

/// Draws boxes, anchor points, id labels and the count banner.
pub struct Overlay {
    font: Option<FontVec>,
    label_scale: PxScale,
    banner_scale: PxScale,
    banner_label: Option<String>,
}

impl Overlay {
    pub fn new(config: &OverlayConfig) -> Result<Self> {
        let font = match &config.font {
            Some(path) => {
                let data = fs::read(path)
                    .map_err(|e| Error::Font(format!("{}: {}", path.display(), e)))?;
                let font = FontVec::try_from_vec(data)
                    .map_err(|e| Error::Font(format!("{}: {}", path.display(), e)))?;
                Some(font)
            }
            None => {
                warn!("No overlay font configured, text labels are disabled");
                None
            }
        };
        Ok(Self {
            font,
            label_scale: PxScale::from(config.label_scale),
            banner_scale: PxScale::from(config.banner_scale),
            banner_label: config.banner_label.clone(),
        })
    }

    /// Boxes and anchors only.
    pub fn without_text() -> Self {
        let defaults = OverlayConfig::default();
        Self {
            font: None,
            label_scale: PxScale::from(defaults.label_scale),
            banner_scale: PxScale::from(defaults.banner_scale),
            banner_label: defaults.banner_label,
        }
    }

    pub fn has_text(&self) -> bool {
        self.font.is_some()
    }

    /// Box, anchor point and `ID n` label for one detection.
    pub fn annotate(&self, image: &mut RgbImage, detection: &Detection) {
        let (x1, y1, x2, y2) = clamped_corners(image, &detection.bbox);
        draw_box(image, x1, y1, x2, y2);

        let anchor = ((x1 + x2) / 2, y2);
        draw_filled_circle_mut(image, anchor, ANCHOR_RADIUS, ANCHOR_COLOR);

        if let (Some(font), Some(track_id)) = (&self.font, detection.track_id) {
            let (x, y) = label_origin(x1, y1, self.label_scale);
            let text = format!("ID {track_id}");
            draw_text_mut(image, LABEL_COLOR, x, y, self.label_scale, font, &text);
        }
    }

    /// Running count in the top-left corner.
    pub fn draw_count(&self, image: &mut RgbImage, target_class: &str, count: usize) {
        let Some(font) = &self.font else {
            return;
        };
        let (x, y) = BANNER_POSITION;
        let text = banner_text(target_class, self.banner_label.as_deref(), count);
        draw_text_mut(image, BANNER_COLOR, x, y, self.banner_scale, font, &text);
    }
}

/// Box corners in pixels, limited to just outside the image on every side.
fn clamped_corners(image: &RgbImage, bbox: &Rect) -> (i32, i32, i32, i32) {
    let min = -BOX_THICKNESS as f32;
    let max_x = image.width().min(i32::MAX as u32 / 2) as f32 + BOX_THICKNESS as f32;
    let max_y = image.height().min(i32::MAX as u32 / 2) as f32 + BOX_THICKNESS as f32;
    let clamp = |v: f32, max: f32| if v.is_nan() { 0 } else { v.clamp(min, max) as i32 };

    let [x1, y1, x2, y2] = bbox.to_tlbr();
    (clamp(x1, max_x), clamp(y1, max_y), clamp(x2, max_x), clamp(y2, max_y))
}

/// Top-left corner of the id label. Text is positioned by its top edge, so
/// the glyph height is subtracted to keep the label clear of the box.
fn label_origin(x1: i32, y1: i32, scale: PxScale) -> (i32, i32) {
    (x1, y1 - LABEL_OFFSET - scale.y.ceil() as i32)
}

fn draw_box(image: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32) {
    let left = x1.min(x2);
    let top = y1.min(y2);
    let width = x1.abs_diff(x2).max(1);
    let height = y1.abs_diff(y2).max(1);

    for inset in 0..BOX_THICKNESS {
        let w = width.saturating_sub(2 * inset as u32).max(1);
        let h = height.saturating_sub(2 * inset as u32).max(1);
        let rect = PixelRect::at(left + inset, top + inset).of_size(w, h);
        draw_hollow_rect_mut(image, rect, BOX_COLOR);
    }
}

/// `"Cars Counted: 3"` for class `car`. `label` replaces the derived plural.
pub fn banner_text(target_class: &str, label: Option<&str>, count: usize) -> String {
    let label = match label {
        Some(label) => label.to_string(),
        None => plural_title(target_class),
    };
    format!("{label} Counted: {count}")
}

fn plural_title(class: &str) -> String {
    let mut chars = class.chars();
    let title: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => return String::new(),
    };

    if ["s", "x", "z", "ch", "sh"].iter().any(|end| title.ends_with(end)) {
        return format!("{title}es");
    }
    match title.strip_suffix('y') {
        Some(stem) if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) => format!("{stem}ies"),
        _ => format!("{title}s"),
    }
}
