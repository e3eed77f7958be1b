//! Chart Layout Engine
//!
//! Computes the geometry of the grouped bar chart: one group per bucket, one
//! bar per entity kind inside each group. The layout is pure geometry in PDF
//! points with a top-left origin, so any renderer can consume it.
//!
//! ```text
//!  |  gap  [P A R L X .]  gap  [P A R L X .]  gap ... gap |
//!          <- group ->
//! ```
//!
//! 80% of the chart width goes to bar groups and the remaining 20% is split into
//! `n + 1` equal gaps. Each group is cut into six slots: five bars and one slot
//! of padding.

use crate::report::aggregate::SeriesSet;
use crate::store::EntityKind;

/// Share of the chart width occupied by bar groups
const GROUP_WIDTH_SHARE: f32 = 0.8;

/// Slots per group: one per series plus padding
const SLOTS_PER_GROUP: f32 = 6.0;

/// Headroom kept above the tallest bar
const TOP_HEADROOM: f32 = 20.0;

/// Distance from the axis to the bucket labels
const LABEL_OFFSET: f32 = 5.0;

/// Distance from the axis to the legend row
const LEGEND_OFFSET: f32 = 25.0;

/// Horizontal pitch between legend entries
const LEGEND_PITCH: f32 = 100.0;

/// Side of a legend swatch
const LEGEND_SWATCH: f32 = 10.0;

/// An sRGB colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// This colour painted at `alpha` opacity over white
    pub fn over_white(&self, alpha: f32) -> Self {
        let blend = |c: u8| (f32::from(c) * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        Self::new(blend(self.r), blend(self.g), blend(self.b))
    }
}

/// Series colours, in series order: patients, appointments, reports, lab results, prescriptions
pub const PALETTE: [RgbColor; 5] = [
    RgbColor::new(52, 152, 219),
    RgbColor::new(46, 204, 113),
    RgbColor::new(231, 76, 60),
    RgbColor::new(155, 89, 182),
    RgbColor::new(241, 196, 15),
];

/// Colour of an entity kind's bars and legend swatch
pub fn series_color(kind: EntityKind) -> RgbColor {
    PALETTE[kind.series_index()]
}

/// Area the chart occupies on the page, in points, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ChartBounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Y coordinate of the horizontal axis
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// One bar, anchored on the axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub kind: EntityKind,
    pub bucket: usize,
    pub count: u64,
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Where a bucket's label sits below the axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    pub bucket: usize,
    /// Horizontal centre of the bar group
    pub center_x: f32,
    /// Top of the label text
    pub y: f32,
}

/// A legend entry: a coloured square followed by the series name
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendSwatch {
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Left edge of the caption
    pub text_x: f32,
}

/// Full chart geometry derived from a series set
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub bounds: ChartBounds,
    /// Largest count, floored at 1
    pub max_count: u64,
    pub group_width: f32,
    pub space_between: f32,
    pub bar_width: f32,
    pub bars: Vec<BarRect>,
    pub labels: Vec<LabelAnchor>,
    pub legend: Vec<LegendSwatch>,
}

impl ChartLayout {
    /// Lay out one bar per bucket per series inside `bounds`
    pub fn compute(bounds: ChartBounds, series: &SeriesSet) -> Self {
        let n = series.bucket_count();
        let max_count = series.max_count().max(1);

        let (group_width, space_between) = if n == 0 {
            (0.0, 0.0)
        } else {
            let groups = bounds.width * GROUP_WIDTH_SHARE;
            (
                groups / n as f32,
                (bounds.width - groups) / (n as f32 + 1.0),
            )
        };
        let bar_width = group_width / SLOTS_PER_GROUP;
        let plot_height = (bounds.height - TOP_HEADROOM).max(0.0);

        let group_x = |bucket: usize| {
            bounds.x + space_between * (bucket as f32 + 1.0) + group_width * bucket as f32
        };

        let mut bars = Vec::with_capacity(n * EntityKind::ALL.len());
        for counts in series.iter() {
            let slot = counts.kind.series_index() as f32;
            for (bucket, count) in counts.counts().iter().enumerate() {
                let height = (*count as f32 / max_count as f32) * plot_height;
                bars.push(BarRect {
                    kind: counts.kind,
                    bucket,
                    count: *count,
                    x: group_x(bucket) + bar_width * slot,
                    y: bounds.bottom() - height,
                    width: bar_width,
                    height,
                });
            }
        }

        let labels = (0..n)
            .map(|bucket| LabelAnchor {
                bucket,
                center_x: group_x(bucket) + group_width / 2.0,
                y: bounds.bottom() + LABEL_OFFSET,
            })
            .collect();

        let legend = EntityKind::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let x = bounds.x + i as f32 * LEGEND_PITCH;
                LegendSwatch {
                    kind: *kind,
                    x,
                    y: bounds.bottom() + LEGEND_OFFSET,
                    size: LEGEND_SWATCH,
                    text_x: x + LEGEND_SWATCH + 5.0,
                }
            })
            .collect();

        Self {
            bounds,
            max_count,
            group_width,
            space_between,
            bar_width,
            bars,
            labels,
            legend,
        }
    }

    /// Bars of one series, in bucket order
    pub fn bars_for(&self, kind: EntityKind) -> impl Iterator<Item = &BarRect> {
        self.bars.iter().filter(move |bar| bar.kind == kind)
    }

    /// Lowest point the chart draws on, legend included
    pub fn extent_bottom(&self) -> f32 {
        self.legend
            .iter()
            .map(|swatch| swatch.y + swatch.size)
            .fold(self.bounds.bottom(), f32::max)
    }
}
