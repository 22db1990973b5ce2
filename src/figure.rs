//! Histogram figures for the phase chart
//!
//! Produces the JSON shape plotly.js accepts in `Plotly.react(el, data, layout)`.
//! Binning is left to plotly; only the hit values and labels come from here.

use crate::aggregate::{hit_values, view_filter, PhaseSelector};
use crate::error::Result;
use crate::measures::HIT;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<HistogramTrace>,
    pub layout: FigureLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramTrace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub x: Vec<i64>,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub line: MarkerLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLine {
    pub width: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureLayout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

/// Column → axis label mapping for the chart
#[derive(Debug, Clone)]
pub struct ChartLabels {
    /// Plural game piece name, e.g. "Cubes"
    pub category: String,
    pub columns: BTreeMap<String, String>,
}

impl ChartLabels {
    pub fn for_category(category: &str) -> Self {
        let mut columns = BTreeMap::new();
        columns.insert(
            HIT.to_string(),
            format!("{} Placed by a Team in a Single Match", category),
        );
        Self {
            category: category.to_string(),
            columns,
        }
    }

    fn column(&self, name: &str) -> String {
        self.columns
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

/// Histogram of per-match totals for the selected phase.
///
/// `selector` is shown verbatim in the title, so an unrecognized value
/// still appears as typed while the data falls back to all phases.
pub fn phase_histogram(summary: &DataFrame, selector: &str, labels: &ChartLabels) -> Result<Figure> {
    let view = view_filter(summary, PhaseSelector::parse(selector))?;
    histogram(&view, selector, labels)
}

/// Histogram over the `hit` column of an already-filtered view.
pub fn histogram(view: &DataFrame, selector: &str, labels: &ChartLabels) -> Result<Figure> {
    let trace = HistogramTrace {
        trace_type: "histogram",
        x: hit_values(view)?,
        marker: Marker {
            line: MarkerLine {
                width: 1,
                color: "lightgrey".to_string(),
            },
        },
    };

    let layout = FigureLayout {
        title: Title {
            text: format!(
                "Histogram of {} Placed Per Match: {}",
                labels.category, selector
            ),
        },
        xaxis: Axis {
            title: Title {
                text: labels.column(HIT),
            },
        },
        yaxis: Axis {
            title: Title {
                text: "Count".to_string(),
            },
        },
    };

    Ok(Figure {
        data: vec![trace],
        layout,
    })
}
