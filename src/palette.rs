use image::Rgb;
use std::fs;
use std::path::Path;

use crate::error::PaletteError;

/// Largest number of class colours an 8-bit indexed image can carry; index
/// 255 is kept for the ignore label.
pub const MAX_COLORS: usize = 255;

/// Class id -> RGB colour, in class-table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    colors: Vec<Rgb<u8>>,
}

impl ColorPalette {
    pub fn new(colors: Vec<Rgb<u8>>) -> Result<Self, PaletteError> {
        if colors.len() > MAX_COLORS {
            return Err(PaletteError::TooManyColors(colors.len()));
        }
        Ok(Self { colors })
    }

    /// Parse a palette file with one `(r, g, b)` triple per line. Brackets
    /// are optional and components may be separated by commas or spaces.
    pub fn parse(text: &str) -> Result<Self, PaletteError> {
        let mut colors = Vec::new();
        for (line, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let color = parse_triple(trimmed).ok_or_else(|| PaletteError::Parse {
                line: line + 1,
                text: trimmed.to_string(),
            })?;
            colors.push(color);
        }
        Self::new(colors)
    }

    pub fn from_file(path: &Path) -> Result<Self, PaletteError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// The bit-interleaved VOC colormap: 0 is black, 1 dark red, 2 dark green...
    pub fn label_colormap(n: usize) -> Self {
        let colors = (0..n.min(MAX_COLORS))
            .map(|label| {
                let mut id = label;
                let (mut r, mut g, mut b) = (0u8, 0u8, 0u8);
                for shift in (0..8).rev() {
                    r |= ((id & 1) as u8) << shift;
                    g |= (((id >> 1) & 1) as u8) << shift;
                    b |= (((id >> 2) & 1) as u8) << shift;
                    id >>= 3;
                }
                Rgb([r, g, b])
            })
            .collect();
        Self { colors }
    }

    /// Fails unless there is exactly one colour per class.
    pub fn ensure_len(&self, classes: usize) -> Result<(), PaletteError> {
        if self.colors.len() != classes {
            return Err(PaletteError::CountMismatch {
                classes,
                colors: self.colors.len(),
            });
        }
        Ok(())
    }

    pub fn color(&self, id: usize) -> Option<Rgb<u8>> {
        self.colors.get(id).copied()
    }

    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Flat `r g b r g b ...` bytes, the layout of a PNG `PLTE` chunk.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.0).collect()
    }
}

fn parse_triple(text: &str) -> Option<Rgb<u8>> {
    let inner = text.trim_matches(|c: char| matches!(c, '(' | ')' | '[' | ']' | '{' | '}'));
    let mut parts = inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u8>());

    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rgb([r, g, b]))
}
