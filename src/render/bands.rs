use std::ops::Range;

use super::display::DisplayMode;
use super::geometry::Geometry;

/// Share of the pitch a bar fills.
const BAR_FILL: f64 = 0.8;
/// Upper bound for the stretched last bar, as a share of the pitch.
const LAST_BAR_CAP: f64 = 0.95;

/// How `bin_count` bins are split into bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandLayout {
    pub bin_count: usize,
    pub bar_count: usize,
    pub group_size: usize,
}

impl BandLayout {
    /// `width` is the drawable width in pixels; `band_count` is used in
    /// grouped mode.
    pub fn plan(bin_count: usize, mode: DisplayMode, width: f64, band_count: usize) -> Self {
        let bar_count = match mode {
            DisplayMode::Detail => bin_count.min(width.max(0.0).floor() as usize),
            DisplayMode::Grouped => band_count,
        };
        let group_size = if bar_count == 0 {
            0
        } else {
            (bin_count / bar_count).max(1)
        };
        Self {
            bin_count,
            bar_count,
            group_size,
        }
    }

    /// Source bins of bar `i`. The last bar runs to the end of the frame.
    pub fn range(&self, i: usize) -> Range<usize> {
        let start = (i * self.group_size).min(self.bin_count);
        let end = if i + 1 == self.bar_count {
            self.bin_count
        } else {
            (start + self.group_size).min(self.bin_count)
        };
        start..end
    }
}

/// One aggregated bar, positioned horizontally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub index: usize,
    pub center_x: f64,
    pub left_x: f64,
    pub width: f64,
    /// Peak sample of the bar's bins.
    pub magnitude: u8,
}

/// Reduces a magnitude frame to bars using peak-hold over each bin range.
pub fn aggregate(frame: &[u8], layout: &BandLayout, geometry: &Geometry) -> Vec<Bar> {
    let count = layout.bar_count;
    if count == 0 || frame.is_empty() {
        return Vec::new();
    }

    let pitch = geometry.pitch(count);
    let bar_width = pitch * BAR_FILL;
    let end_x = geometry.end_x();

    (0..count)
        .map(|i| {
            let range = layout.range(i);
            let magnitude = frame
                .get(range)
                .and_then(|bins| bins.iter().copied().max())
                .unwrap_or(0);

            let center_x = geometry.start_x + geometry.width * (i as f64 + 0.5) / count as f64;
            let left_x = center_x - bar_width / 2.0;

            let mut width = bar_width;
            if i + 1 == count {
                let right = left_x + bar_width;
                if right > end_x {
                    width = (end_x - left_x).max(0.0);
                } else if right < end_x {
                    width = (bar_width + (end_x - right)).min(pitch * LAST_BAR_CAP);
                }
            }

            Bar {
                index: i,
                center_x,
                left_x,
                width,
                magnitude,
            }
        })
        .collect()
}
