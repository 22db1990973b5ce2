//! Interactive data table backend
//!
//! A DataFrame is flattened once into column specs and cell rows; the page
//! then asks for sorted, filtered, paged slices through [`TableQuery`].

use crate::error::Result;
use polars::prelude::*;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;

/// Column type as the table widget sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Any,
}

/// Column description handed to the table widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub id: String,
    pub deletable: bool,
    pub selectable: bool,
    #[serde(rename = "type")]
    pub kind: ColumnKind,
}

/// One table value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    fn from_any_value(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Cell::Null,
            AnyValue::Boolean(b) => Cell::Int(i64::from(b)),
            AnyValue::Int8(v) => Cell::Int(i64::from(v)),
            AnyValue::Int16(v) => Cell::Int(i64::from(v)),
            AnyValue::Int32(v) => Cell::Int(i64::from(v)),
            AnyValue::Int64(v) => Cell::Int(v),
            AnyValue::UInt8(v) => Cell::Int(i64::from(v)),
            AnyValue::UInt16(v) => Cell::Int(i64::from(v)),
            AnyValue::UInt32(v) => Cell::Int(i64::from(v)),
            AnyValue::UInt64(v) => match i64::try_from(v) {
                Ok(v) => Cell::Int(v),
                Err(_) => Cell::Float(v as f64),
            },
            AnyValue::Float32(v) => Cell::Float(f64::from(v)),
            AnyValue::Float64(v) => Cell::Float(v),
            AnyValue::String(s) => Cell::Text(s.to_string()),
            AnyValue::StringOwned(s) => Cell::Text(s.to_string()),
            other => Cell::Text(other.str_value().into_owned()),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Null => None,
        }
    }

    fn as_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Nulls last, numbers before text, numbers by value, text lexically
    fn sort_cmp(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Null, Cell::Null) => Ordering::Equal,
            (Cell::Null, _) => Ordering::Greater,
            (_, Cell::Null) => Ordering::Less,
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            (Cell::Text(_), _) => Ordering::Greater,
            (_, Cell::Text(_)) => Ordering::Less,
            (a, b) => {
                let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                a.total_cmp(&b)
            }
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Int(v) => serializer.serialize_i64(*v),
            Cell::Float(v) => serializer.serialize_f64(*v),
            Cell::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Comparison used by a column filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
}

/// A parsed per-column filter such as `>= 3` or `frc`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub op: FilterOp,
    pub operand: String,
}

impl ColumnFilter {
    /// Parse filter text for a column. Without an operator, numeric columns
    /// match by equality and everything else by substring. Blank text yields `None`.
    pub fn parse(column: &str, text: &str, kind: ColumnKind) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        // Two-character operators first so ">=" isn't read as ">"
        const OPERATORS: [(&str, FilterOp); 6] = [
            (">=", FilterOp::Ge),
            ("<=", FilterOp::Le),
            ("!=", FilterOp::Ne),
            ("=", FilterOp::Eq),
            (">", FilterOp::Gt),
            ("<", FilterOp::Lt),
        ];

        let (op, operand) = OPERATORS
            .iter()
            .find_map(|(prefix, op)| text.strip_prefix(*prefix).map(|rest| (*op, rest.trim())))
            .unwrap_or(match kind {
                ColumnKind::Numeric => (FilterOp::Eq, text),
                ColumnKind::Any => (FilterOp::Contains, text),
            });

        Some(Self {
            column: column.to_string(),
            op,
            operand: operand.to_string(),
        })
    }

    fn matches(&self, cell: &Cell) -> bool {
        if self.op == FilterOp::Contains {
            return cell.as_text().contains(&self.operand);
        }

        let ordering = match (cell.as_f64(), self.operand.parse::<f64>()) {
            (Some(value), Ok(operand)) => value.total_cmp(&operand),
            _ if *cell == Cell::Null => return self.op == FilterOp::Ne,
            _ => cell.as_text().as_str().cmp(self.operand.as_str()),
        };

        match self.op {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Ne => ordering != Ordering::Equal,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Ge => ordering != Ordering::Less,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Le => ordering != Ordering::Greater,
            FilterOp::Contains => unreachable!("handled above"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Slice of the table the page asks for
#[derive(Debug, Clone, Default)]
pub struct TableQuery {
    pub sort_by: Option<String>,
    pub direction: SortDirection,
    pub filters: Vec<(String, String)>,
    pub page: usize,
}

impl TableQuery {
    /// Build from URL query pairs: `sort`, `dir` (`asc`/`desc`), `page`, `filter_<column>`.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut query = TableQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "sort" if !value.is_empty() => query.sort_by = Some(value.clone()),
                "dir" => {
                    query.direction = if value.eq_ignore_ascii_case("desc") {
                        SortDirection::Desc
                    } else {
                        SortDirection::Asc
                    }
                }
                "page" => query.page = value.parse().unwrap_or(0),
                _ => {
                    if let Some(column) = key.strip_prefix("filter_") {
                        query.filters.push((column.to_string(), value.clone()));
                    }
                }
            }
        }
        query
    }
}

/// One page of query results
#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Vec<Cell>>,
    pub page: usize,
    pub page_count: usize,
    pub total_rows: usize,
}

fn is_cell_native(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Null
            | DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::String
    )
}

/// Flattened table held for the life of the dashboard
#[derive(Debug, Clone)]
pub struct TableData {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Vec<Cell>>,
    pub page_size: usize,
}

impl TableData {
    pub fn from_dataframe(df: &DataFrame, page_size: usize) -> Result<Self> {
        let columns: Vec<ColumnSpec> = df
            .get_columns()
            .iter()
            .map(|col| {
                let name = col.name().to_string();
                ColumnSpec {
                    id: name.clone(),
                    name,
                    deletable: true,
                    selectable: true,
                    kind: if matches!(col.dtype(), DataType::Int64) {
                        ColumnKind::Numeric
                    } else {
                        ColumnKind::Any
                    },
                }
            })
            .collect();

        // Categoricals, dates and the like are shown as their string form
        let flat = df
            .get_columns()
            .iter()
            .map(|col| {
                if is_cell_native(col.dtype()) {
                    Ok(col.clone())
                } else {
                    col.cast(&DataType::String)
                }
            })
            .collect::<PolarsResult<Vec<Column>>>()?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let row = flat
                .iter()
                .map(|col| col.get(i).map(Cell::from_any_value))
                .collect::<PolarsResult<Vec<Cell>>>()?;
            rows.push(row);
        }

        Ok(Self {
            columns,
            rows,
            page_size: page_size.max(1),
        })
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == name)
    }

    /// Apply filters, then sort, then cut out the requested page.
    /// Unknown filter or sort columns are ignored; the page is clamped.
    pub fn query(&self, query: &TableQuery) -> TablePage {
        let filters: Vec<(usize, ColumnFilter)> = query
            .filters
            .iter()
            .filter_map(|(column, text)| {
                let idx = self.column_index(column)?;
                let filter = ColumnFilter::parse(column, text, self.columns[idx].kind)?;
                Some((idx, filter))
            })
            .collect();

        let mut matched: Vec<&Vec<Cell>> = self
            .rows
            .iter()
            .filter(|row| filters.iter().all(|(idx, f)| f.matches(&row[*idx])))
            .collect();

        if let Some(idx) = query.sort_by.as_deref().and_then(|c| self.column_index(c)) {
            matched.sort_by(|a, b| {
                let ord = a[idx].sort_cmp(&b[idx]);
                match query.direction {
                    SortDirection::Asc => ord,
                    // Nulls stay last when descending
                    SortDirection::Desc => match (&a[idx], &b[idx]) {
                        (Cell::Null, _) | (_, Cell::Null) => ord,
                        _ => ord.reverse(),
                    },
                }
            });
        }

        let total_rows = matched.len();
        let page_count = total_rows.div_ceil(self.page_size).max(1);
        let page = query.page.min(page_count - 1);
        let rows = matched
            .into_iter()
            .skip(page * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect();

        TablePage {
            columns: self.columns.clone(),
            rows,
            page,
            page_count,
            total_rows,
        }
    }

    /// All rows as JSON objects keyed by column id, keys in column order
    pub fn records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| {
                        let value = serde_json::to_value(cell).unwrap_or(serde_json::Value::Null);
                        (col.id.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(page_size: usize) -> TableData {
        let df = df!(
            "team" => [254i64, 1678, 118, 254, 971],
            "match" => [1i64, 1, 2, 2, 3],
            "phase" => ["auto", "tele", "auto", "tele", "auto"],
            "hit" => [3i64, 2, 5, 0, 2]
        )
        .unwrap();
        TableData::from_dataframe(&df, page_size).unwrap()
    }

    fn teams(page: &TablePage) -> Vec<i64> {
        page.rows
            .iter()
            .map(|row| match row[0] {
                Cell::Int(v) => v,
                ref other => panic!("unexpected cell {other:?}"),
            })
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_column_specs_mark_int64_numeric() {
        let table = fixture(15);
        let kinds: Vec<ColumnKind> = table.columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Numeric,
                ColumnKind::Numeric,
                ColumnKind::Any,
                ColumnKind::Numeric
            ]
        );
        assert!(table.columns.iter().all(|c| c.deletable && c.selectable));
        assert_eq!(table.columns[2].name, "phase");
    }

    #[test]
    fn test_column_spec_serializes_type_key() {
        let table = fixture(15);
        let json = serde_json::to_string(&table.columns[0]).unwrap();
        assert!(json.contains("\"type\":\"numeric\""));
        assert!(json.contains("\"id\":\"team\""));
    }

    #[test]
    fn test_unfiltered_query_returns_first_page() {
        let page = fixture(2).query(&TableQuery::default());
        assert_eq!(page.total_rows, 5);
        assert_eq!(page.page_count, 3);
        assert_eq!(teams(&page), vec![254, 1678]);
    }

    #[test]
    fn test_page_is_clamped() {
        let query = TableQuery {
            page: 99,
            ..Default::default()
        };
        let page = fixture(2).query(&query);
        assert_eq!(page.page, 2);
        assert_eq!(teams(&page), vec![971]);
    }

    #[test]
    fn test_sort_descending() {
        let query = TableQuery::from_pairs(&pairs(&[("sort", "hit"), ("dir", "desc")]));
        let page = fixture(15).query(&query);
        assert_eq!(teams(&page), vec![118, 254, 1678, 971, 254]);
    }

    #[test]
    fn test_sort_ascending_is_stable() {
        let query = TableQuery::from_pairs(&pairs(&[("sort", "team")]));
        let page = fixture(15).query(&query);
        assert_eq!(teams(&page), vec![118, 254, 254, 971, 1678]);
    }

    #[test]
    fn test_numeric_filter_operators() {
        let table = fixture(15);
        let gt = table.query(&TableQuery::from_pairs(&pairs(&[("filter_hit", "> 2")])));
        assert_eq!(teams(&gt), vec![254, 118]);

        let eq = table.query(&TableQuery::from_pairs(&pairs(&[("filter_hit", "2")])));
        assert_eq!(teams(&eq), vec![1678, 971]);

        let le = table.query(&TableQuery::from_pairs(&pairs(&[("filter_hit", "<=0")])));
        assert_eq!(teams(&le), vec![254]);
    }

    #[test]
    fn test_text_filter_is_substring() {
        let table = fixture(15);
        let page = table.query(&TableQuery::from_pairs(&pairs(&[("filter_phase", "tel")])));
        assert_eq!(teams(&page), vec![1678, 254]);
    }

    #[test]
    fn test_filters_combine() {
        let table = fixture(15);
        let query = TableQuery::from_pairs(&pairs(&[
            ("filter_phase", "=auto"),
            ("filter_hit", ">=3"),
        ]));
        assert_eq!(teams(&table.query(&query)), vec![254, 118]);
    }

    #[test]
    fn test_unknown_columns_and_blank_filters_ignored() {
        let table = fixture(15);
        let query = TableQuery::from_pairs(&pairs(&[
            ("filter_nope", "1"),
            ("filter_hit", "  "),
            ("sort", "nope"),
        ]));
        assert_eq!(table.query(&query).total_rows, 5);
    }

    #[test]
    fn test_filter_parse_prefers_two_char_operators() {
        let f = ColumnFilter::parse("hit", ">= 4", ColumnKind::Numeric).unwrap();
        assert_eq!(f.op, FilterOp::Ge);
        assert_eq!(f.operand, "4");
        let f = ColumnFilter::parse("phase", "!=tele", ColumnKind::Any).unwrap();
        assert_eq!(f.op, FilterOp::Ne);
        assert!(ColumnFilter::parse("hit", "", ColumnKind::Numeric).is_none());
    }

    #[test]
    fn test_nulls_sort_last_both_directions() {
        let df = df!(
            "team" => [Some(1i64), None, Some(3)]
        )
        .unwrap();
        let table = TableData::from_dataframe(&df, 15).unwrap();

        for dir in ["asc", "desc"] {
            let page = table.query(&TableQuery::from_pairs(&pairs(&[
                ("sort", "team"),
                ("dir", dir),
            ])));
            assert_eq!(page.rows[2][0], Cell::Null, "direction {dir}");
        }
    }

    #[test]
    fn test_records_are_keyed_by_column() {
        let records = fixture(15).records();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0]["team"], serde_json::json!(254));
        assert_eq!(records[0]["phase"], serde_json::json!("auto"));
    }

    #[test]
    fn test_records_keep_column_order() {
        let json = serde_json::to_string(&fixture(15).records()[..1]).unwrap();
        assert_eq!(json, r#"[{"team":254,"match":1,"phase":"auto","hit":3}]"#);
    }

    #[test]
    fn test_categorical_columns_flatten_to_text() {
        let mut df = df!(
            "team" => [1i64, 2],
            "phase" => ["auto", "\"tele\""]
        )
        .unwrap();
        let phase = df
            .column("phase")
            .unwrap()
            .cast(&DataType::Categorical(None, CategoricalOrdering::Physical))
            .unwrap();
        df.with_column(phase).unwrap();

        let table = TableData::from_dataframe(&df, 15).unwrap();
        assert_eq!(table.columns[1].kind, ColumnKind::Any);
        assert_eq!(table.rows[0][1], Cell::Text("auto".to_string()));
        // Quotes that belong to the data survive
        assert_eq!(table.rows[1][1], Cell::Text("\"tele\"".to_string()));

        let page = table.query(&TableQuery::from_pairs(&pairs(&[("filter_phase", "auto")])));
        assert_eq!(teams(&page), vec![1]);
    }
}
