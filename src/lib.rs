//! scoutviz - Scouting data dashboard
//!
//! Load team measures, total one task category per match, and explore the
//! totals in an interactive histogram and data table.
//!
//! # Overview
//!
//! Measures are read once from a Feather file. Rows whose task starts with a
//! category prefix (`cube` by default) are summed per team, match and phase.
//! The page offers a phase control that narrows the histogram to autonomous
//! or teleoperated play, or folds both phases together.
//!
//! | Selector | View |
//! |----------|------|
//! | `All` (or anything unrecognized) | hits summed per `team`, `match` |
//! | `Auto` | rows with `phase == "auto"` |
//! | `Tele` | rows with `phase == "tele"` |
//!
//! # Quick Start
//!
//! ```no_run
//! use scoutviz::{Config, Dashboard};
//!
//! let dashboard = Dashboard::load(Config::load()).unwrap();
//!
//! // Same handler the page calls when the phase control changes
//! let outputs = dashboard.dispatch("phase-control", "Auto").unwrap();
//! println!("{}", outputs[0].figure.layout.title.text);
//! ```

pub mod aggregate;
pub mod callback;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod figure;
pub mod layout;
pub mod measures;
pub mod page;
pub mod serve;
pub mod table;

pub use aggregate::{category_totals, hit_total, view_filter, PhaseSelector};
pub use callback::{CallbackOutput, CallbackRegistry};
pub use config::{Config, TableSource};
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use figure::{ChartLabels, Figure};
pub use layout::{Component, Layout, GRAPH_ID, PHASE_CONTROL_ID, TABLE_ID};
pub use measures::{load_team_measures, REQUIRED_COLUMNS};
pub use table::{TableData, TablePage, TableQuery};
