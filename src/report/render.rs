//! Document Renderer
//!
//! Draws the statistics report onto a single A4 page with `printpdf`.
//!
//! Positions are expressed in PDF points from the top-left corner of the page,
//! matching [`ChartLayout`], and flipped to PDF's bottom-left origin only at the
//! drawing calls. Page order, top to bottom:
//!
//! 1. Title, period subtitle, generation timestamp
//! 2. Totals section: one bullet per entity kind
//! 3. Horizontal rule
//! 4. Chart: axes, bars, bucket labels, legend
//! 5. Narrative summary
//! 6. Footer

use crate::report::aggregate::SeriesSet;
use crate::report::chart::{series_color, ChartBounds, ChartLayout, RgbColor};
use crate::report::engine::ReportSettings;
use crate::report::error::{ReportError, ReportResult};
use crate::report::period::ResolvedPeriod;
use chrono::{DateTime, Utc};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Polygon,
    Rgb,
};
use std::io::BufWriter;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const PT_PER_MM: f32 = 72.0 / 25.4;
const PAGE_HEIGHT_PT: f32 = PAGE_HEIGHT_MM * PT_PER_MM;

const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = 500.0;
const RULE_RIGHT: f32 = 545.0;

const TITLE_Y: f32 = 60.0;
const SUBTITLE_Y: f32 = 89.0;
const GENERATED_Y: f32 = 111.0;
const TOTALS_HEADING_Y: f32 = 150.0;
const TOTALS_FIRST_Y: f32 = 173.0;
const TOTALS_LINE_HEIGHT: f32 = 16.0;
const RULE_Y: f32 = 268.0;
const CHART_HEADING_Y: f32 = 282.0;
const CHART_TOP: f32 = 310.0;
const CHART_HEIGHT: f32 = 200.0;
const FOOTER_Y: f32 = 780.0;

const SUMMARY_FONT_SIZE: f32 = 12.0;
const SUMMARY_LINE_HEIGHT: f32 = 16.0;

/// Average Helvetica glyph width as a share of the font size
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Alpha the series colours are painted with
const BAR_ALPHA: f32 = 0.8;

const INK: RgbColor = RgbColor::new(0, 0, 0);
const TITLE_INK: RgbColor = RgbColor::new(0x33, 0x33, 0x33);
const HEADING_INK: RgbColor = RgbColor::new(0x2c, 0x3e, 0x50);
const MUTED_INK: RgbColor = RgbColor::new(0x55, 0x55, 0x55);
const RULE_INK: RgbColor = RgbColor::new(0xaa, 0xaa, 0xaa);
const FOOTER_INK: RgbColor = RgbColor::new(0x88, 0x88, 0x88);

/// Where the chart goes on the page
pub fn chart_bounds() -> ChartBounds {
    ChartBounds::new(MARGIN, CHART_TOP, CONTENT_WIDTH, CHART_HEIGHT)
}

/// Everything the renderer needs; computed before a single byte is drawn
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub period: ResolvedPeriod,
    pub series: SeriesSet,
    pub layout: ChartLayout,
    pub settings: ReportSettings,
    pub generated_at: DateTime<Utc>,
}

/// Render the report to PDF bytes
pub fn render_pdf(doc: &ReportDocument) -> ReportResult<Vec<u8>> {
    let locale = doc.settings.locale;
    let hospital = doc.settings.branding.hospital_name.as_str();
    let title = locale.title(hospital);
    let totals = doc.series.totals();

    let (pdf, page, layer) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Report");
    let canvas = Canvas {
        layer: pdf.get_page(page).get_layer(layer),
        regular: pdf
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::RenderingFailure(format!("PDF font error: {e}")))?,
        bold: pdf
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::RenderingFailure(format!("PDF font error: {e}")))?,
    };

    // Header
    canvas.text_centered(&title, 20.0, TITLE_Y, TITLE_INK, &canvas.bold);
    canvas.text_centered(
        &locale.period_line(&doc.period.label),
        14.0,
        SUBTITLE_Y,
        HEADING_INK,
        &canvas.regular,
    );
    let generated = doc.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    canvas.text_right(
        &locale.generated_line(&generated),
        10.0,
        GENERATED_Y,
        MUTED_INK,
    );

    // Totals
    canvas.heading(locale.totals_heading(), TOTALS_HEADING_Y);
    for (i, (kind, total)) in totals.iter().enumerate() {
        let top = TOTALS_FIRST_Y + TOTALS_LINE_HEIGHT * i as f32;
        canvas.rect(MARGIN + 6.0, top + 4.0, 4.0, 4.0, INK);
        canvas.text(
            &locale.total_item(kind, total),
            12.0,
            MARGIN + 20.0,
            top,
            INK,
            &canvas.regular,
        );
    }

    canvas.line(MARGIN, RULE_Y, RULE_RIGHT, RULE_Y, RULE_INK, 1.0);

    // Chart
    canvas.heading(locale.chart_heading(), CHART_HEADING_Y);
    draw_chart(&canvas, doc);

    // Summary
    let summary_heading_y = doc.layout.extent_bottom() + 20.0;
    canvas.heading(&locale.summary_heading(hospital), summary_heading_y);

    let max_chars = (CONTENT_WIDTH / (SUMMARY_FONT_SIZE * AVG_GLYPH_WIDTH)) as usize;
    let mut top = summary_heading_y + 20.0;
    for paragraph in locale.summary(&doc.period.label, &totals, hospital) {
        for line in wrap_text(&paragraph, max_chars) {
            canvas.text(&line, SUMMARY_FONT_SIZE, MARGIN, top, INK, &canvas.regular);
            top += SUMMARY_LINE_HEIGHT;
        }
        top += SUMMARY_LINE_HEIGHT;
    }

    // Footer
    canvas.text_centered(
        &doc.settings.branding.footer,
        8.0,
        FOOTER_Y,
        FOOTER_INK,
        &canvas.regular,
    );

    let mut buf = BufWriter::new(Vec::new());
    pdf.save(&mut buf)
        .map_err(|e| ReportError::RenderingFailure(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::RenderingFailure(format!("PDF buffer error: {e}")))
}

fn draw_chart(canvas: &Canvas, doc: &ReportDocument) {
    let layout = &doc.layout;
    let bounds = layout.bounds;
    let locale = doc.settings.locale;

    // Axes
    canvas.line(bounds.x, bounds.y, bounds.x, bounds.bottom(), INK, 1.0);
    canvas.line(bounds.x, bounds.bottom(), bounds.right(), bounds.bottom(), INK, 1.0);

    for bar in layout.bars.iter().filter(|bar| bar.height > 0.0) {
        canvas.rect(
            bar.x,
            bar.y,
            bar.width,
            bar.height,
            series_color(bar.kind).over_white(BAR_ALPHA),
        );
    }

    let labels = doc.period.buckets.labels();
    for anchor in &layout.labels {
        if let Some(label) = labels.get(anchor.bucket) {
            let width = text_width(label, 8.0);
            canvas.text(
                label,
                8.0,
                anchor.center_x - width / 2.0,
                anchor.y,
                INK,
                &canvas.regular,
            );
        }
    }

    for swatch in &layout.legend {
        canvas.rect(
            swatch.x,
            swatch.y,
            swatch.size,
            swatch.size,
            series_color(swatch.kind).over_white(BAR_ALPHA),
        );
        canvas.text(
            locale.legend_label(swatch.kind),
            9.0,
            swatch.text_x,
            swatch.y - 1.0,
            INK,
            &canvas.regular,
        );
    }
}

/// A page layer plus the fonts drawn with, addressed in top-left points
struct Canvas {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Canvas {
    fn text(&self, text: &str, size: f32, x: f32, top: f32, color: RgbColor, font: &IndirectFontRef) {
        self.layer.set_fill_color(to_pdf_color(color));
        // Baseline sits roughly 0.8em below the top of the line box
        self.layer
            .use_text(text, size, to_mm(x), to_mm(flip(top + size * 0.8)), font);
    }

    fn text_centered(&self, text: &str, size: f32, top: f32, color: RgbColor, font: &IndirectFontRef) {
        let x = MARGIN + (CONTENT_WIDTH - text_width(text, size)).max(0.0) / 2.0;
        self.text(text, size, x, top, color, font);
    }

    fn text_right(&self, text: &str, size: f32, top: f32, color: RgbColor) {
        let x = MARGIN + (CONTENT_WIDTH - text_width(text, size)).max(0.0);
        self.text(text, size, x, top, color, &self.regular);
    }

    /// Underlined section heading
    fn heading(&self, text: &str, top: f32) {
        self.text(text, 14.0, MARGIN, top, HEADING_INK, &self.regular);
        let underline = top + 15.0;
        self.line(
            MARGIN,
            underline,
            MARGIN + text_width(text, 14.0).min(CONTENT_WIDTH),
            underline,
            HEADING_INK,
            0.5,
        );
    }

    fn rect(&self, x: f32, top: f32, width: f32, height: f32, color: RgbColor) {
        let (left, right) = (to_mm(x), to_mm(x + width));
        let (upper, lower) = (to_mm(flip(top)), to_mm(flip(top + height)));

        self.layer.set_fill_color(to_pdf_color(color));
        self.layer.add_polygon(Polygon {
            rings: vec![vec![
                (Point::new(left, lower), false),
                (Point::new(right, lower), false),
                (Point::new(right, upper), false),
                (Point::new(left, upper), false),
            ]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn line(&self, x1: f32, y1: f32, x2: f32, y2: f32, color: RgbColor, thickness: f32) {
        self.layer.set_outline_color(to_pdf_color(color));
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(to_mm(x1), to_mm(flip(y1))), false),
                (Point::new(to_mm(x2), to_mm(flip(y2))), false),
            ],
            is_closed: false,
        });
    }
}

/// Top-left y in points to PDF's bottom-left y in points
fn flip(y: f32) -> f32 {
    PAGE_HEIGHT_PT - y
}

fn to_mm(pt: f32) -> Mm {
    Mm(pt / PT_PER_MM)
}

fn to_pdf_color(color: RgbColor) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(color.r) / 255.0,
        f32::from(color.g) / 255.0,
        f32::from(color.b) / 255.0,
        None,
    ))
}

/// Estimated rendered width; built-in fonts carry no metrics in printpdf
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH
}

/// Greedy word wrap to at most `max_chars` per line
///
/// A single word longer than `max_chars` gets a line of its own.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
