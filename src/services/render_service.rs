use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle, TextStyle};
use uuid::Uuid;

use crate::models::ReceiptRecord;
use crate::services::html_service;
use crate::utils::errors::ReceiptError;

pub const WORDMARK: &str = "MockPay";
pub const RECEIPT_TITLE: &str = "Transaction Receipt";
pub const WATERMARK_LABEL: &str = "SAMPLE";
pub const FOOTER_DISCLAIMER: &str = "This is a SAMPLE receipt produced by the MockPay demo \
    service for design and testing purposes only. It is not proof of payment, no funds were \
    moved, and MockPay is a fictional provider not affiliated with any bank or payment company.";

pub const CANVAS_WIDTH: u32 = 400;
pub const CANVAS_HEIGHT: u32 = 640;
/// Ceiling for the layout pass; tall receipts grow up to this
pub const MAX_CANVAS_HEIGHT: u32 = 1600;

const MARGIN: i32 = 24;
const HEADER_HEIGHT: i32 = 64;
const SECTION_LINE_HEIGHT: i32 = 20;
const FOOTER_LINE_HEIGHT: i32 = 18;

const ACCENT: RGBColor = RGBColor(0x2F, 0x5B, 0xEA);
const TEXT_DARK: RGBColor = RGBColor(0x11, 0x11, 0x11);
const TEXT_MUTED: RGBColor = RGBColor(0x66, 0x66, 0x66);
const RULE: RGBColor = RGBColor(0xE5, 0xE5, 0xE5);
const DASH: RGBColor = RGBColor(0xC8, 0xC8, 0xC8);

/// One decorative background label; position is a percentage of the receipt box
#[derive(Debug, Clone, Copy)]
pub struct Watermark {
    pub top_pct: u32,
    pub left_pct: u32,
    pub size_px: u32,
    pub alpha: f64,
}

const fn mark(top_pct: u32, left_pct: u32, size_px: u32, alpha: f64) -> Watermark {
    Watermark { top_pct, left_pct, size_px, alpha }
}

pub const WATERMARKS: [Watermark; 18] = [
    mark(8, 10, 14, 0.08),
    mark(8, 40, 12, 0.08),
    mark(8, 70, 10, 0.07),
    mark(25, 5, 16, 0.07),
    mark(25, 35, 11, 0.08),
    mark(25, 65, 13, 0.07),
    mark(25, 95, 9, 0.08),
    mark(42, 15, 15, 0.07),
    mark(42, 45, 12, 0.07),
    mark(42, 75, 14, 0.08),
    mark(59, 5, 16, 0.09),
    mark(59, 35, 14, 0.09),
    mark(59, 65, 12, 0.08),
    mark(59, 95, 13, 0.08),
    mark(76, 15, 15, 0.09),
    mark(76, 45, 17, 0.09),
    mark(76, 75, 13, 0.08),
    mark(93, 25, 15, 0.09),
];

/// Something that can turn a receipt record into markup or pixels
pub trait ReceiptRenderer {
    fn render_html(&self, record: &ReceiptRecord) -> String;
    fn render_image(&self, record: &ReceiptRecord) -> Result<Vec<u8>, ReceiptError>;
}

/// Draws receipts onto a plotters bitmap and encodes them as PNG
#[derive(Debug, Clone, Copy)]
pub struct CanvasRenderer {
    width: u32,
    height: u32,
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

impl ReceiptRenderer for CanvasRenderer {
    fn render_html(&self, record: &ReceiptRecord) -> String {
        html_service::receipt_document(record, None)
    }

    fn render_image(&self, record: &ReceiptRecord) -> Result<Vec<u8>, ReceiptError> {
        // BitMapBackend encodes on present(), so render through a scratch file
        let temp_file = std::env::temp_dir().join(format!("mockpay_receipt_{}.png", Uuid::new_v4()));

        let result = self
            .draw_to_file(&temp_file, record)
            .and_then(|_| {
                fs::read(&temp_file)
                    .map_err(|e| ReceiptError::RenderFailure(format!("Failed to read image: {}", e)))
            });

        let _ = fs::remove_file(&temp_file);

        let bytes = result?;
        if bytes.is_empty() {
            return Err(ReceiptError::RenderFailure("Encoder produced no data".to_string()));
        }
        tracing::debug!("Rendered receipt {} ({} bytes)", record.transaction_id, bytes.len());
        Ok(bytes)
    }
}

impl CanvasRenderer {
    /// Lay the receipt out on a scratch buffer and return the height that fits it,
    /// never less than the configured canvas height
    fn fitted_height(&self, record: &ReceiptRecord) -> Result<u32, ReceiptError> {
        let mut scratch = vec![0u8; (self.width * MAX_CANVAS_HEIGHT * 3) as usize];
        let bottom = {
            let root = BitMapBackend::with_buffer(&mut scratch, (self.width, MAX_CANVAS_HEIGHT))
                .into_drawing_area();
            paint_receipt(&root, record)?
        };

        let needed = (bottom + MARGIN).max(0) as u32;
        if needed > MAX_CANVAS_HEIGHT {
            return Err(ReceiptError::RenderFailure(format!(
                "Receipt needs {}px, more than the {}px limit",
                needed, MAX_CANVAS_HEIGHT
            )));
        }
        Ok(needed.max(self.height))
    }

    fn draw_to_file(&self, path: &Path, record: &ReceiptRecord) -> Result<(), ReceiptError> {
        let height = self.fitted_height(record)?;
        let backend = BitMapBackend::new(path, (self.width, height));
        let root = backend.into_drawing_area();

        let bottom = paint_receipt(&root, record)?;
        if bottom > height as i32 {
            return Err(ReceiptError::RenderFailure(format!(
                "Layout ran to {}px on a {}px canvas",
                bottom, height
            )));
        }
        root.present().map_err(render_err)
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> ReceiptError {
    ReceiptError::RenderFailure(e.to_string())
}

fn font(size: f64, style: FontStyle) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, style)
}

/// Split `text` into lines no wider than `max_width` according to `measure`.
///
/// A single word wider than `max_width` is placed on a line by itself.
pub fn wrap_text<F, E>(text: &str, max_width: u32, mut measure: F) -> Result<Vec<String>, E>
where
    F: FnMut(&str) -> Result<u32, E>,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", current, word);
        if measure(&candidate)? > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    Ok(lines)
}

fn text_width<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    text: &str,
    style: &TextStyle,
) -> Result<i32, ReceiptError> {
    canvas
        .estimate_text_size(text, style)
        .map(|(w, _)| w as i32)
        .map_err(render_err)
}

fn draw_centered<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    text: &str,
    style: &TextStyle,
    y: i32,
) -> Result<(), ReceiptError> {
    let (width, _) = canvas.dim_in_pixel();
    let x = (width as i32 - text_width(canvas, text, style)?) / 2;
    canvas.draw_text(text, style, (x, y)).map_err(render_err)
}

fn draw_right_aligned<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    text: &str,
    style: &TextStyle,
    y: i32,
) -> Result<(), ReceiptError> {
    let (width, _) = canvas.dim_in_pixel();
    let x = width as i32 - MARGIN - text_width(canvas, text, style)?;
    canvas.draw_text(text, style, (x, y)).map_err(render_err)
}

fn draw_dashed_rule<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    y: i32,
) -> Result<(), ReceiptError> {
    let (width, _) = canvas.dim_in_pixel();
    let right = width as i32 - MARGIN;
    let mut x = MARGIN;
    while x < right {
        let end = (x + 6).min(right);
        canvas
            .draw(&Rectangle::new([(x, y), (end, y + 1)], DASH.filled()))
            .map_err(render_err)?;
        x += 10;
    }
    Ok(())
}

/// Paint the full receipt layout onto `canvas`, returning the y just below the footer
pub fn paint_receipt<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    record: &ReceiptRecord,
) -> Result<i32, ReceiptError> {
    let (width, height) = canvas.dim_in_pixel();
    let (width, height) = (width as i32, height as i32);
    let content_width = (width - 2 * MARGIN).max(1) as u32;

    canvas.fill(&WHITE).map_err(render_err)?;

    // Background labels sit under everything else
    for mark in WATERMARKS.iter() {
        let style = font(mark.size_px as f64 * 1.4, FontStyle::Bold).color(&BLACK.mix(mark.alpha));
        let x = width * mark.left_pct as i32 / 100;
        let y = height * mark.top_pct as i32 / 100;
        canvas.draw_text(WATERMARK_LABEL, &style, (x, y)).map_err(render_err)?;
    }

    // Header band
    canvas
        .draw(&Rectangle::new([(0, 0), (width, HEADER_HEIGHT)], ACCENT.filled()))
        .map_err(render_err)?;
    canvas
        .draw(&Circle::new((MARGIN + 10, HEADER_HEIGHT / 2), 10, WHITE.stroke_width(3)))
        .map_err(render_err)?;
    let wordmark_style = font(22.0, FontStyle::Bold).color(&WHITE);
    canvas
        .draw_text(WORDMARK, &wordmark_style, (MARGIN + 28, HEADER_HEIGHT / 2 - 12))
        .map_err(render_err)?;
    let title_style = font(15.0, FontStyle::Normal).color(&WHITE);
    draw_right_aligned(canvas, RECEIPT_TITLE, &title_style, HEADER_HEIGHT / 2 - 8)?;

    // Amount block
    let amount = format!("NGN {}", record.amount_formatted);
    let amount_style = font(30.0, FontStyle::Bold).color(&TEXT_DARK);
    draw_centered(canvas, &amount, &amount_style, HEADER_HEIGHT + 24)?;

    let (r, g, b) = record.status.color();
    let status_style = font(16.0, FontStyle::Bold).color(&RGBColor(r, g, b));
    draw_centered(canvas, record.status_label(), &status_style, HEADER_HEIGHT + 70)?;

    let date_style = font(13.0, FontStyle::Normal).color(&TEXT_MUTED);
    draw_centered(canvas, &record.transaction_date, &date_style, HEADER_HEIGHT + 94)?;

    let mut y = HEADER_HEIGHT + 124;
    canvas
        .draw(&Rectangle::new([(MARGIN, y), (width - MARGIN, y + 1)], RULE.filled()))
        .map_err(render_err)?;
    y += 16;

    // Detail rows: label on the left, value block on the right
    let label_style = font(13.0, FontStyle::Normal).color(&TEXT_MUTED);
    let value_bold = font(14.0, FontStyle::Bold).color(&TEXT_DARK);
    let value_style = font(13.0, FontStyle::Normal).color(&TEXT_DARK);

    let sections: [(&str, Vec<String>); 3] = [
        (
            "Recipient Details",
            vec![
                record.recipient_name.clone(),
                format!("{} | {}", record.recipient_bank, record.recipient_account),
            ],
        ),
        (
            "Sender Details",
            vec![
                record.sender_name.clone(),
                format!("{} | {}", WORDMARK, record.sender_account_masked),
            ],
        ),
        ("Transaction No.", vec![record.transaction_id.clone()]),
    ];

    for (label, values) in sections.iter() {
        canvas.draw_text(label, &label_style, (MARGIN, y)).map_err(render_err)?;
        let label_width = text_width(canvas, label, &label_style)?;
        let value_width = (content_width as i32 - label_width - 16).max(1) as u32;

        let mut line_y = y;
        for (i, value) in values.iter().enumerate() {
            let style = if i == 0 && values.len() > 1 { &value_bold } else { &value_style };
            let lines = wrap_text(value, value_width, |s| text_width(canvas, s, style).map(|w| w as u32))?;
            for line in lines {
                draw_right_aligned(canvas, &line, style, line_y)?;
                line_y += SECTION_LINE_HEIGHT;
            }
        }
        y = line_y.max(y + SECTION_LINE_HEIGHT) + 12;
    }

    draw_dashed_rule(canvas, y)?;
    y += 16;

    // Footer disclaimer, wrapped to the content width
    let footer_style = font(12.0, FontStyle::Normal).color(&TEXT_MUTED);
    let footer_lines = wrap_text(FOOTER_DISCLAIMER, content_width, |s| {
        text_width(canvas, s, &footer_style).map(|w| w as u32)
    })?;
    for line in footer_lines {
        canvas.draw_text(&line, &footer_style, (MARGIN, y)).map_err(render_err)?;
        y += FOOTER_LINE_HEIGHT;
    }

    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReceiptStatus;
    use std::convert::Infallible;

    fn fixed_width(char_px: u32) -> impl FnMut(&str) -> Result<u32, Infallible> {
        move |s: &str| Ok(s.chars().count() as u32 * char_px)
    }

    fn record() -> ReceiptRecord {
        ReceiptRecord {
            sender_name: "JOHN DOE".into(),
            sender_account_masked: "912****789".into(),
            recipient_name: "JANE SMITH".into(),
            recipient_bank: "Access Bank".into(),
            recipient_account: "9876543210".into(),
            amount_formatted: "5,000.00".into(),
            transaction_id: "26101614300001123456".into(),
            status: ReceiptStatus::Successful,
            transaction_date: "Oct 16th, 2026 14:30:00".into(),
        }
    }

    #[test]
    fn test_wrap_text_basic() {
        let lines = wrap_text("aa bb cc dd", 50, fixed_width(10)).unwrap();
        assert_eq!(lines, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn test_wrap_text_empty_input() {
        assert!(wrap_text("   ", 100, fixed_width(7)).unwrap().is_empty());
    }

    #[test]
    fn test_wrap_text_long_word_sits_alone() {
        let lines = wrap_text("a supercalifragilistic b", 60, fixed_width(10)).unwrap();
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_wrap_text_never_exceeds_width() {
        let texts = [FOOTER_DISCLAIMER, "one two three four five six seven eight nine ten"];
        for text in texts {
            for max_width in [40, 90, 150, 352, 1000] {
                let mut measure = fixed_width(7);
                let lines = wrap_text(text, max_width, &mut measure).unwrap();

                for line in &lines {
                    let width = measure(line).unwrap();
                    assert!(
                        width <= max_width || !line.contains(' '),
                        "line '{}' is {}px, limit {}",
                        line,
                        width,
                        max_width
                    );
                }
                // Nothing is lost or reordered
                assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
            }
        }
    }

    #[test]
    fn test_watermark_grid() {
        assert_eq!(WATERMARKS.len(), 18);
        assert!(WATERMARKS.iter().all(|m| m.top_pct < 100 && m.left_pct < 100));
    }

    #[test]
    fn test_render_image_produces_png() {
        let png = CanvasRenderer::default().render_image(&record()).unwrap();
        assert!(png.len() > 8);
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    fn png_height(png: &[u8]) -> u32 {
        u32::from_be_bytes([png[20], png[21], png[22], png[23]])
    }

    /// Widest text the validator lets through, in many short words
    fn oversized_record() -> ReceiptRecord {
        let long = "WM ".repeat(21).trim_end().to_string() + " W";
        ReceiptRecord {
            sender_name: long.clone(),
            recipient_name: long.clone(),
            recipient_bank: long,
            transaction_id: "X".repeat(32),
            ..record()
        }
    }

    #[test]
    fn test_canvas_grows_to_fit_content() {
        let renderer = CanvasRenderer {
            width: CANVAS_WIDTH,
            height: 200,
        };
        let png = renderer.render_image(&record()).unwrap();
        assert!(png_height(&png) > 200);
    }

    #[test]
    fn test_oversized_fields_keep_the_footer_on_canvas() {
        let renderer = CanvasRenderer::default();
        let record = oversized_record();
        assert_eq!(record.recipient_bank.chars().count(), 64);

        let height = renderer.fitted_height(&record).unwrap();
        assert!(height >= CANVAS_HEIGHT);

        let mut buffer = vec![0u8; (CANVAS_WIDTH * height * 3) as usize];
        let root = BitMapBackend::with_buffer(&mut buffer, (CANVAS_WIDTH, height)).into_drawing_area();
        let bottom = paint_receipt(&root, &record).unwrap();
        assert!(bottom <= height as i32, "footer ends at {} on a {}px canvas", bottom, height);

        let png = renderer.render_image(&record).unwrap();
        assert_eq!(png_height(&png), height);
    }

    #[test]
    fn test_render_html_uses_template() {
        let html = CanvasRenderer::default().render_html(&record());
        assert!(html.contains("JANE SMITH"));
        assert!(html.contains(WATERMARK_LABEL));
    }
}
