//! Plain text to PDF.
//!
//! Layout: one built-in Helvetica font, fixed margins,
//! greedy word wrapping and a new page whenever the next line would cross the
//! bottom margin. Glyph widths are estimated rather than measured.

use printpdf::{
    BuiltinFont, Mm, PdfDocument,
    lopdf::{self, Object, StringFormat},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::RenderError;

const DOCUMENT_TITLE: &str = "Money Distribution Details";
const LINE_SPACING: f32 = 1.2;
const AVERAGE_GLYPH_WIDTH: f32 = 0.5;
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Turns report text into a binary document.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, text: &str) -> Result<Vec<u8>, RenderError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
        }
    }
}

/// Page geometry and typography, all lengths in points.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub page_size: PageSize,
    pub font_size: f32,
    pub margin: f32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            font_size: 12.0,
            margin: 72.0,
        }
    }
}

impl PdfConfig {
    fn line_height(&self) -> f32 {
        self.font_size * LINE_SPACING
    }

    fn lines_per_page(&self) -> usize {
        let (_, height) = self.page_size.dimensions();
        let usable = height - 2.0 * self.margin;
        ((usable / self.line_height()).floor() as usize).max(1)
    }

    fn chars_per_line(&self) -> usize {
        let (width, _) = self.page_size.dimensions();
        let usable = width - 2.0 * self.margin;
        ((usable / (self.font_size * AVERAGE_GLYPH_WIDTH)).floor() as usize).max(1)
    }
}

/// Split `text` into pages of wrapped lines.
///
/// Always returns at least one page, so empty text still yields a valid
/// (blank) document.
pub fn layout_pages(text: &str, config: &PdfConfig) -> Vec<Vec<String>> {
    let width = config.chars_per_line();
    let lines: Vec<String> = text.lines().flat_map(|line| wrap(line, width)).collect();

    if lines.is_empty() {
        return vec![Vec::new()];
    }

    lines
        .chunks(config.lines_per_page())
        .map(<[String]>::to_vec)
        .collect()
}

fn wrap(line: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word = word;
        // Words wider than a whole line are hard-split.
        while word.chars().count() > width {
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(width)
                .map_or(word.len(), |(index, _)| index);
            wrapped.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() || wrapped.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

/// [`DocumentRenderer`] producing PDF bytes with `printpdf`.
///
/// The document id, the trailer `/ID` and all dates are pinned. The id is
/// derived from the text and configuration, so the same input always
/// renders to the same bytes.
#[derive(Clone, Debug, Default)]
pub struct PdfRenderer {
    config: PdfConfig,
}

impl PdfRenderer {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PdfConfig {
        &self.config
    }

    /// Hex digest of `text` and the page geometry, 32 characters long.
    fn fingerprint(&self, text: &str) -> String {
        let (width, height) = self.config.page_size.dimensions();
        let mut hasher = Sha256::new();
        for value in [width, height, self.config.font_size, self.config.margin] {
            hasher.update(value.to_le_bytes());
        }
        hasher.update(text.as_bytes());
        hex::encode(&hasher.finalize()[..16])
    }
}

/// Replace the random trailer `/ID` written by `printpdf` with `id`.
fn pin_trailer_id(bytes: &[u8], id: &str) -> Result<Vec<u8>, RenderError> {
    let mut document =
        lopdf::Document::load_mem(bytes).map_err(|err| RenderError::Write(err.to_string()))?;
    let id = Object::String(id.as_bytes().to_vec(), StringFormat::Literal);
    document.trailer.set("ID", Object::Array(vec![id.clone(), id]));

    let mut pinned = Vec::with_capacity(bytes.len());
    document
        .save_to(&mut pinned)
        .map_err(|err| RenderError::Write(err.to_string()))?;
    Ok(pinned)
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, text: &str) -> Result<Vec<u8>, RenderError> {
        let config = &self.config;
        let fingerprint = self.fingerprint(text);
        let (width, height) = config.page_size.dimensions();
        let (page_width, page_height) = (Mm(width * MM_PER_PT), Mm(height * MM_PER_PT));

        let (doc, first_page, first_layer) =
            PdfDocument::new(DOCUMENT_TITLE, page_width, page_height, "Layer 1");
        let doc = doc
            .with_document_id(fingerprint.clone())
            .with_creation_date(OffsetDateTime::UNIX_EPOCH)
            .with_mod_date(OffsetDateTime::UNIX_EPOCH)
            .with_metadata_date(OffsetDateTime::UNIX_EPOCH);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| RenderError::Font(err.to_string()))?;

        for (index, lines) in layout_pages(text, config).iter().enumerate() {
            let (page, layer) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(page_width, page_height, "Layer 1")
            };
            let layer = doc.get_page(page).get_layer(layer);

            for (row, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let baseline =
                    height - config.margin - config.font_size - row as f32 * config.line_height();
                layer.use_text(
                    line.as_str(),
                    config.font_size,
                    Mm(config.margin * MM_PER_PT),
                    Mm(baseline * MM_PER_PT),
                    &font,
                );
            }
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|err| RenderError::Write(err.to_string()))?;
        pin_trailer_id(&bytes, &fingerprint)
    }
}
