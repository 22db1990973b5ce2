//! Application context
//!
//! Everything the page and its handlers read is built once here and never
//! mutated afterwards; request handlers borrow `&Dashboard`.

use crate::aggregate::{category_totals, view_filter, PhaseSelector};
use crate::callback::{CallbackOutput, CallbackRegistry};
use crate::config::{Config, TableSource};
use crate::error::Result;
use crate::figure::{phase_histogram, ChartLabels, Figure};
use crate::layout::{Layout, GRAPH_ID, PHASE_CONTROL_ID};
use crate::measures::load_team_measures;
use crate::table::TableData;
use polars::prelude::DataFrame;

pub struct Dashboard {
    config: Config,
    measures: DataFrame,
    summary: DataFrame,
    table: TableData,
    layout: Layout,
    labels: ChartLabels,
    callbacks: CallbackRegistry,
}

impl Dashboard {
    /// Read the measures file named by `config` and build the dashboard.
    pub fn load(config: Config) -> Result<Self> {
        let path = config.data_path();
        let measures = load_team_measures(&path)?;
        log::info!("Loaded {} measures from {}", measures.height(), path.display());
        Self::from_measures(config, measures)
    }

    pub fn from_measures(config: Config, measures: DataFrame) -> Result<Self> {
        let summary = category_totals(&measures, &config.data.task_prefix)?;
        log::info!(
            "Summarized {} team/match/phase rows for tasks starting with {:?}",
            summary.height(),
            config.data.task_prefix
        );

        let seed = match config.table.source {
            TableSource::Summary => &summary,
            TableSource::Measures => &measures,
        };
        let table = TableData::from_dataframe(seed, config.table.page_size)?;
        let layout = Layout::build(&config, &table);
        let labels = ChartLabels::for_category(&config.chart.category_label);

        let mut callbacks = CallbackRegistry::new();
        callbacks.register(PHASE_CONTROL_ID, GRAPH_ID, update_phase_histogram);

        Ok(Self {
            config,
            measures,
            summary,
            table,
            layout,
            labels,
            callbacks,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn measures(&self) -> &DataFrame {
        &self.measures
    }

    pub fn summary(&self) -> &DataFrame {
        &self.summary
    }

    pub fn table(&self) -> &TableData {
        &self.table
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn labels(&self) -> &ChartLabels {
        &self.labels
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Summary rows shown for a phase selector value
    pub fn view(&self, selector: &str) -> Result<DataFrame> {
        view_filter(&self.summary, PhaseSelector::parse(selector))
    }

    /// Outputs of every callback for the page as first rendered
    pub fn initial_outputs(&self) -> Result<Vec<CallbackOutput>> {
        self.callbacks.initial_outputs(self, &self.layout)
    }

    /// Outputs for a change of the control `input`
    pub fn dispatch(&self, input: &str, value: &str) -> Result<Vec<CallbackOutput>> {
        self.callbacks.dispatch(self, input, value)
    }
}

fn update_phase_histogram(dashboard: &Dashboard, phase: &str) -> Result<Figure> {
    phase_histogram(&dashboard.summary, phase, &dashboard.labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::hit_total;
    use crate::config::{Config, TableSource};
    use crate::error::Error;
    use crate::table::Cell;
    use polars::prelude::*;
    use std::fs::File;

    fn measures() -> DataFrame {
        df!(
            "team" => [1i64, 1, 2, 2],
            "match" => [1i64, 1, 1, 1],
            "phase" => ["auto", "tele", "auto", "tele"],
            "task" => ["cube_high", "cube_mid", "cube_low", "cone_high"],
            "hit" => [3i64, 2, 1, 4]
        )
        .unwrap()
    }

    #[test]
    fn test_summary_built_at_startup() {
        let dashboard = Dashboard::from_measures(Config::default(), measures()).unwrap();
        assert_eq!(dashboard.measures().height(), 4);
        assert_eq!(dashboard.summary().height(), 3);
        assert_eq!(hit_total(dashboard.summary()).unwrap(), 6);
    }

    #[test]
    fn test_table_seeded_from_summary_by_default() {
        let dashboard = Dashboard::from_measures(Config::default(), measures()).unwrap();
        assert_eq!(dashboard.table().rows.len(), 3);
        let ids: Vec<&str> = dashboard.table().columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["team", "match", "phase", "hit"]);
    }

    #[test]
    fn test_table_can_be_seeded_from_measures() {
        let mut config = Config::default();
        config.table.source = TableSource::Measures;
        let dashboard = Dashboard::from_measures(config, measures()).unwrap();
        assert_eq!(dashboard.table().rows.len(), 4);
        assert_eq!(dashboard.table().rows[3][3], Cell::Text("cone_high".to_string()));
    }

    #[test]
    fn test_task_prefix_comes_from_config() {
        let mut config = Config::default();
        config.data.task_prefix = "cone".to_string();
        let dashboard = Dashboard::from_measures(config, measures()).unwrap();
        assert_eq!(dashboard.summary().height(), 1);
        assert_eq!(hit_total(dashboard.summary()).unwrap(), 4);
    }

    #[test]
    fn test_view_and_dispatch_agree() {
        let dashboard = Dashboard::from_measures(Config::default(), measures()).unwrap();
        let view = dashboard.view("auto").unwrap();
        let outputs = dashboard.dispatch(PHASE_CONTROL_ID, "AUTO").unwrap();
        assert_eq!(outputs[0].figure.data[0].x.len(), view.height());
        assert_eq!(outputs[0].figure.data[0].x, vec![3, 1]);
    }

    #[test]
    fn test_initial_outputs_render_all_phases() {
        let dashboard = Dashboard::from_measures(Config::default(), measures()).unwrap();
        let outputs = dashboard.initial_outputs().unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].output, GRAPH_ID);
        assert_eq!(outputs[0].figure.data[0].x, vec![5, 1]);
    }

    #[test]
    fn test_load_reads_feather_from_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team-measures.feather");
        let mut df = measures();
        let mut file = File::create(&path).unwrap();
        IpcWriter::new(&mut file).finish(&mut df).unwrap();

        let mut config = Config::default();
        config.data.path = path;
        let dashboard = Dashboard::load(config).unwrap();
        assert_eq!(dashboard.summary().height(), 3);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let mut config = Config::default();
        config.data.path = "/definitely/not/here.feather".into();
        assert!(matches!(
            Dashboard::load(config),
            Err(Error::Storage { .. })
        ));
    }

    #[test]
    fn test_malformed_measures_fail_at_startup() {
        let df = df!(
            "team" => [1i64],
            "hit" => [1i64]
        )
        .unwrap();
        assert!(matches!(
            Dashboard::from_measures(Config::default(), df),
            Err(Error::MissingColumns(_))
        ));
    }
}
