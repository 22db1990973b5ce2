//! Category totals and the phase view
//!
//! `category_totals` turns raw measures into one row per (team, match, phase)
//! holding the summed hits of a single task category. `view_filter` narrows
//! that summary to one phase, or folds the phases together.

use crate::error::Result;
use crate::measures::{require_columns, HIT, MATCH, PHASE, REQUIRED_COLUMNS, TASK, TEAM};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase choice offered by the dashboard control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PhaseSelector {
    /// Both phases summed per team and match
    #[default]
    All,
    Auto,
    Tele,
}

impl PhaseSelector {
    /// Options in the order the control lists them
    pub const OPTIONS: [PhaseSelector; 3] =
        [PhaseSelector::All, PhaseSelector::Auto, PhaseSelector::Tele];

    /// Case-insensitive; anything other than auto/tele means `All`.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "auto" => PhaseSelector::Auto,
            "tele" => PhaseSelector::Tele,
            "all" => PhaseSelector::All,
            _ => {
                log::debug!("Unrecognized phase selector {:?}, showing all phases", value);
                PhaseSelector::All
            }
        }
    }

    /// Value stored in the `phase` column, `None` for the folded view
    pub fn phase(self) -> Option<&'static str> {
        match self {
            PhaseSelector::All => None,
            PhaseSelector::Auto => Some("auto"),
            PhaseSelector::Tele => Some("tele"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PhaseSelector::All => "All",
            PhaseSelector::Auto => "Auto",
            PhaseSelector::Tele => "Tele",
        }
    }
}

impl From<&str> for PhaseSelector {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for PhaseSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Total hits per (team, match, phase) over tasks starting with `task_prefix`.
///
/// Output columns: `team`, `match`, `phase`, `hit`, sorted by the keys.
pub fn category_totals(measures: &DataFrame, task_prefix: &str) -> Result<DataFrame> {
    require_columns(measures, &REQUIRED_COLUMNS)?;

    let summary = measures
        .clone()
        .lazy()
        .select([
            col(TEAM),
            col(MATCH),
            col(PHASE).cast(DataType::String),
            col(TASK).cast(DataType::String),
            col(HIT).cast(DataType::Int64),
        ])
        .filter(col(TASK).str().starts_with(lit(task_prefix)))
        .group_by([col(TEAM), col(MATCH), col(PHASE)])
        .agg([col(HIT).sum()])
        .sort_by_exprs(
            [col(TEAM), col(MATCH), col(PHASE)],
            SortMultipleOptions::default(),
        )
        .select([col(TEAM), col(MATCH), col(PHASE), col(HIT)])
        .collect()?;

    Ok(summary)
}

/// Rows of the summary shown for a phase selection.
///
/// `Auto`/`Tele` keep the matching rows with all four columns. `All` sums
/// across phases and drops the `phase` column.
pub fn view_filter(summary: &DataFrame, selector: PhaseSelector) -> Result<DataFrame> {
    let view = match selector.phase() {
        Some(phase) => {
            require_columns(summary, &[TEAM, MATCH, PHASE, HIT])?;
            summary
                .clone()
                .lazy()
                .filter(col(PHASE).cast(DataType::String).eq(lit(phase)))
                .select([col(TEAM), col(MATCH), col(PHASE), col(HIT)])
                .collect()?
        }
        None => {
            require_columns(summary, &[TEAM, MATCH, HIT])?;
            summary
                .clone()
                .lazy()
                .group_by([col(TEAM), col(MATCH)])
                .agg([col(HIT).cast(DataType::Int64).sum()])
                .sort_by_exprs([col(TEAM), col(MATCH)], SortMultipleOptions::default())
                .select([col(TEAM), col(MATCH), col(HIT)])
                .collect()?
        }
    };
    Ok(view)
}

/// Sum of the `hit` column.
pub fn hit_total(df: &DataFrame) -> Result<i64> {
    require_columns(df, &[HIT])?;
    let hits = df.column(HIT)?.cast(&DataType::Int64)?;
    Ok(hits.i64()?.into_iter().flatten().sum())
}

/// `hit` values in row order, nulls skipped.
pub fn hit_values(df: &DataFrame) -> Result<Vec<i64>> {
    require_columns(df, &[HIT])?;
    let hits = df.column(HIT)?.cast(&DataType::Int64)?;
    Ok(hits.i64()?.into_iter().flatten().collect())
}
