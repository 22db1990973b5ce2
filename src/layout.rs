//! Page description
//!
//! The dashboard page is a flat list of components. The HTML renderer and
//! the `/api/layout` endpoint both read from this one description.

use crate::aggregate::PhaseSelector;
use crate::config::Config;
use crate::table::{ColumnSpec, TableData};
use serde::Serialize;

pub const GRAPH_ID: &str = "cube_hist";
pub const PHASE_CONTROL_ID: &str = "phase-control";
pub const TABLE_ID: &str = "measures-table";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "component", rename_all = "snake_case")]
pub enum Component {
    Heading {
        level: u8,
        text: String,
    },
    /// Placeholder filled by a callback output
    Graph {
        id: String,
    },
    /// Single-select control
    RadioItems {
        id: String,
        options: Vec<String>,
        value: String,
    },
    DataTable {
        id: String,
        columns: Vec<ColumnSpec>,
        page_size: usize,
        sort_action: &'static str,
        filter_action: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub components: Vec<Component>,
}

impl Layout {
    /// Build the dashboard page: headings, histogram, phase control, table.
    pub fn build(config: &Config, table: &TableData) -> Self {
        let options = PhaseSelector::OPTIONS
            .iter()
            .map(|o| o.label().to_string())
            .collect();

        let components = vec![
            Component::Heading {
                level: 1,
                text: config.page.title.clone(),
            },
            Component::Heading {
                level: 3,
                text: config.page.subtitle.clone(),
            },
            Component::Graph {
                id: GRAPH_ID.to_string(),
            },
            Component::RadioItems {
                id: PHASE_CONTROL_ID.to_string(),
                options,
                value: PhaseSelector::default().label().to_string(),
            },
            Component::Heading {
                level: 4,
                text: "Measures Table".to_string(),
            },
            Component::DataTable {
                id: TABLE_ID.to_string(),
                columns: table.columns.clone(),
                page_size: table.page_size,
                sort_action: "native",
                filter_action: "native",
            },
        ];

        Self {
            title: config.page.title.clone(),
            components,
        }
    }

    /// Initial value of a control, if `id` names one
    pub fn initial_value(&self, id: &str) -> Option<&str> {
        self.components.iter().find_map(|c| match c {
            Component::RadioItems {
                id: control, value, ..
            } if control == id => Some(value.as_str()),
            _ => None,
        })
    }
}
