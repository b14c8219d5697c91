//! Depth legend.
//!
//! Swatch colors are sampled from the color function at `boundary + 1`
//! instead of being stored, so the legend cannot disagree with the markers.
//! The sample point only lands inside the intended range when boundaries
//! are at least one unit apart; [`Legend::misalignments`] reports sets where
//! that does not hold.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::encoding::{color_from_depth, depth_bucket_index};
use crate::html::escape;

/// Lower edges of the legend rows, in kilometers.
pub const DEPTH_LEGEND_BOUNDARIES: [f64; 5] = [-10.0, 30.0, 50.0, 70.0, 90.0];

/// Offset from a boundary to the point whose color represents its row.
pub const SAMPLE_OFFSET: f64 = 1.0;

pub const DEPTH_LEGEND_TITLE: &str = "Depth (km)";

/// Corner of the map a control is pinned to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl ControlPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlPosition::TopLeft => "topleft",
            ControlPosition::TopRight => "topright",
            ControlPosition::BottomLeft => "bottomleft",
            ControlPosition::BottomRight => "bottomright",
        }
    }
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub lower: f64,
    /// `None` for the terminal, open-ended row.
    pub upper: Option<f64>,
    pub swatch_color: String,
    pub range_label: String,
}

/// A row whose sample point does not fall in a later bucket than the row before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Misalignment {
    pub entry: usize,
    pub sample: f64,
    pub bucket: usize,
}

/// The depth key shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub title: String,
    pub position: ControlPosition,
    pub entries: Vec<LegendEntry>,
}

/// Build legend rows for `boundaries`, sampling `color_of` at each `boundary + 1`.
pub fn build_legend<F>(boundaries: &[f64], color_of: F) -> Vec<LegendEntry>
where
    F: Fn(f64) -> &'static str,
{
    boundaries
        .iter()
        .enumerate()
        .map(|(i, &lower)| {
            let upper = boundaries.get(i + 1).copied();
            let range_label = match upper {
                Some(upper) => format!("{}\u{2013}{}", lower, upper),
                None => format!("{}+", lower),
            };
            LegendEntry {
                lower,
                upper,
                swatch_color: color_of(lower + SAMPLE_OFFSET).to_string(),
                range_label,
            }
        })
        .collect()
}

/// The standard depth legend, with misaligned boundaries logged.
pub fn build_depth_legend() -> Legend {
    let legend = Legend {
        title: DEPTH_LEGEND_TITLE.to_string(),
        position: ControlPosition::BottomRight,
        entries: build_legend(&DEPTH_LEGEND_BOUNDARIES, color_from_depth),
    };

    for m in legend.misalignments(depth_bucket_index) {
        warn!(
            entry = m.entry,
            sample = m.sample,
            bucket = m.bucket,
            "Legend row samples the same or an earlier bucket than the row before it"
        );
    }

    legend
}

impl Legend {
    /// Rows whose sample point is not strictly inside their own range, or whose bucket does
    /// not come after the previous row's bucket.
    pub fn misalignments<F>(&self, bucket_of: F) -> Vec<Misalignment>
    where
        F: Fn(f64) -> usize,
    {
        let mut found = Vec::new();
        let mut previous: Option<usize> = None;

        for (i, entry) in self.entries.iter().enumerate() {
            let sample = entry.lower + SAMPLE_OFFSET;
            let bucket = bucket_of(sample);
            let outside_range = entry.upper.is_some_and(|upper| sample >= upper);
            let not_increasing = previous.is_some_and(|p| bucket <= p);
            if outside_range || not_increasing {
                found.push(Misalignment {
                    entry: i,
                    sample,
                    bucket,
                });
            }
            previous = Some(bucket);
        }

        found
    }

    /// Render the legend control body. Called once when the control is attached.
    pub fn to_html(&self) -> String {
        let mut html = String::from(
            "<div class=\"info legend\" style=\"background-color: #f5f5dc; padding: 6px; \
             border: 1px solid rgba(0,0,0,0.2); border-radius: 5px;\">",
        );
        html.push_str(&format!("<h4>{}</h4>", escape(&self.title)));

        for entry in &self.entries {
            html.push_str(&format!(
                "<i style=\"background:{}; width: 18px; height: 18px; float: left; \
                 margin-right: 8px; opacity: 0.75;\"></i> \
                 <span style=\"line-height: 18px;\">{}</span><br>",
                escape(&entry.swatch_color),
                escape(&entry.range_label)
            ));
        }

        html.push_str("</div>");
        html
    }
}
