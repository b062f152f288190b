use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const MIN_BRUSH_SIZE: u32 = 2;
pub const MAX_BRUSH_SIZE: u32 = 50;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";
const HIGHLIGHTER_ALPHA: f32 = 0.3;
const HIGHLIGHTER_WIDTH_FACTOR: u32 = 4;
const ERASER_WIDTH_FACTOR: u32 = 3;

#[derive(Debug)]
pub enum CanvasError {
    InvalidColor(String),
    Encode(String),
    Decode(String),
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanvasError::InvalidColor(value) => write!(f, "invalid color '{value}'"),
            CanvasError::Encode(message) => write!(f, "failed to encode canvas: {message}"),
            CanvasError::Decode(message) => write!(f, "failed to decode canvas image: {message}"),
        }
    }
}

impl std::error::Error for CanvasError {}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Pen configuration for a single stroke. The effective line width depends on
/// the tool: the eraser paints at three times the brush size and the
/// highlighter at four times with reduced opacity, matching the drawing
/// surface this replaces.
#[derive(Debug, Clone, Copy)]
pub struct BrushStyle {
    pub color: [u8; 3],
    pub size: u32,
    pub highlighter: bool,
}

pub fn parse_color(value: &str) -> Result<[u8; 3], CanvasError> {
    let hex = value
        .strip_prefix('#')
        .filter(|rest| rest.len() == 6)
        .ok_or_else(|| CanvasError::InvalidColor(value.to_string()))?;
    let mut channels = [0u8; 3];
    for (index, channel) in channels.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[index * 2..index * 2 + 2], 16)
            .map_err(|_| CanvasError::InvalidColor(value.to_string()))?;
    }
    Ok(channels)
}

/// Brush sizes move in steps of 2; odd inputs land on the next step up
/// before clamping to the supported range.
pub fn clamp_brush_size(size: u32) -> u32 {
    (size.div_ceil(2) * 2).clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}

/// Freehand drawing surface: an RGBA raster that strokes and erasures are
/// composited onto. Fully transparent means "nothing drawn".
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resizing clears all drawn content. Known data-loss limitation carried
    /// over from the original surface; do not "fix" without a requirements
    /// decision (see DESIGN.md).
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize * 4];
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Paints an opaque round-cap stroke along `points`.
    pub fn draw_stroke(&mut self, points: &[Point], style: &BrushStyle) {
        let width = if style.highlighter {
            style.size * HIGHLIGHTER_WIDTH_FACTOR
        } else {
            style.size
        };
        let mask = self.stroke_mask(points, width);
        if style.highlighter {
            self.blend(&mask, style.color, HIGHLIGHTER_ALPHA);
        } else {
            self.paint(&mask, style.color);
        }
    }

    /// Destructive erasure: clears previously drawn pixels along the stroke.
    pub fn erase_stroke(&mut self, points: &[Point], brush_size: u32) {
        let mask = self.stroke_mask(points, brush_size * ERASER_WIDTH_FACTOR);
        for (index, covered) in mask.iter().enumerate() {
            if *covered {
                self.pixels[index * 4..index * 4 + 4].fill(0);
            }
        }
    }

    /// Coverage mask of round stamps laid along the polyline, one pixel per
    /// cell. Computing coverage first keeps the highlighter's translucency
    /// uniform for the whole stroke instead of compounding where stamps
    /// overlap.
    fn stroke_mask(&self, points: &[Point], width: u32) -> Vec<bool> {
        let mut mask = vec![false; self.width as usize * self.height as usize];
        let radius = (width as f32 / 2.0).max(0.5);
        match points {
            [] => {}
            [only] => self.stamp(&mut mask, *only, radius),
            _ => {
                for pair in points.windows(2) {
                    let (from, to) = (pair[0], pair[1]);
                    let distance = ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt();
                    let steps = distance.ceil().max(1.0) as u32;
                    for step in 0..=steps {
                        let t = step as f32 / steps as f32;
                        let at = Point {
                            x: from.x + (to.x - from.x) * t,
                            y: from.y + (to.y - from.y) * t,
                        };
                        self.stamp(&mut mask, at, radius);
                    }
                }
            }
        }
        mask
    }

    fn stamp(&self, mask: &mut [bool], center: Point, radius: f32) {
        let min_x = (center.x - radius).floor().max(0.0) as u32;
        let max_x = ((center.x + radius).ceil() as i64).min(self.width as i64 - 1);
        let min_y = (center.y - radius).floor().max(0.0) as u32;
        let max_y = ((center.y + radius).ceil() as i64).min(self.height as i64 - 1);
        if max_x < 0 || max_y < 0 {
            return;
        }
        for y in min_y..=max_y as u32 {
            for x in min_x..=max_x as u32 {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius * radius {
                    mask[y as usize * self.width as usize + x as usize] = true;
                }
            }
        }
    }

    fn paint(&mut self, mask: &[bool], color: [u8; 3]) {
        for (index, covered) in mask.iter().enumerate() {
            if *covered {
                let base = index * 4;
                self.pixels[base..base + 3].copy_from_slice(&color);
                self.pixels[base + 3] = 255;
            }
        }
    }

    fn blend(&mut self, mask: &[bool], color: [u8; 3], alpha: f32) {
        for (index, covered) in mask.iter().enumerate() {
            if !*covered {
                continue;
            }
            let base = index * 4;
            let dst_alpha = self.pixels[base + 3] as f32 / 255.0;
            let out_alpha = alpha + dst_alpha * (1.0 - alpha);
            for channel in 0..3 {
                let src = color[channel] as f32 / 255.0;
                let dst = self.pixels[base + channel] as f32 / 255.0;
                let out = (src * alpha + dst * dst_alpha * (1.0 - alpha)) / out_alpha.max(f32::EPSILON);
                self.pixels[base + channel] = (out * 255.0).round().min(255.0) as u8;
            }
            self.pixels[base + 3] = (out_alpha * 255.0).round().min(255.0) as u8;
        }
    }

    /// Serializes the surface as a PNG data URL; an untouched surface encodes
    /// to the empty string.
    pub fn encode(&self) -> Result<String, CanvasError> {
        if self.is_blank() {
            return Ok(String::new());
        }
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(&self.pixels, self.width, self.height, ExtendedColorType::Rgba8)
            .map_err(|err| CanvasError::Encode(err.to_string()))?;
        Ok(format!("{DATA_URL_PREFIX}{}", BASE64.encode(&png)))
    }

    /// Replaces the surface content with a previously encoded data URL,
    /// anchored at the top-left corner. An empty string restores a blank
    /// surface.
    pub fn restore(&mut self, data_url: &str) -> Result<(), CanvasError> {
        self.clear();
        if data_url.is_empty() {
            return Ok(());
        }
        let encoded = data_url
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| CanvasError::Decode("unsupported data URL".to_string()))?;
        let bytes = BASE64
            .decode(encoded)
            .map_err(|err| CanvasError::Decode(err.to_string()))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|err| CanvasError::Decode(err.to_string()))?
            .to_rgba8();
        let copy_width = decoded.width().min(self.width);
        let copy_height = decoded.height().min(self.height);
        for y in 0..copy_height {
            for x in 0..copy_width {
                let pixel = decoded.get_pixel(x, y);
                let base = (y as usize * self.width as usize + x as usize) * 4;
                self.pixels[base..base + 4].copy_from_slice(&pixel.0);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let base = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[base],
            self.pixels[base + 1],
            self.pixels[base + 2],
            self.pixels[base + 3],
        ]
    }
}
