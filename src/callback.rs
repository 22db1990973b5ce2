//! Explicit callback registration
//!
//! A callback binds one input control to one output component. Handlers are
//! plain functions of the control value; the registry runs them once eagerly
//! when the page is built and again whenever the page reports a change.

use crate::dashboard::Dashboard;
use crate::error::{Error, Result};
use crate::figure::Figure;
use crate::layout::Layout;
use serde::Serialize;

pub type Handler = fn(&Dashboard, &str) -> Result<Figure>;

#[derive(Clone)]
pub struct Callback {
    /// Id of the control whose `value` feeds the handler
    pub input: String,
    /// Id of the component whose `figure` the handler produces
    pub output: String,
    pub handler: Handler,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackOutput {
    pub output: String,
    pub figure: Figure,
}

#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: Vec<Callback>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, input: &str, output: &str, handler: Handler) {
        self.callbacks.push(Callback {
            input: input.to_string(),
            output: output.to_string(),
            handler,
        });
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run every handler bound to `input` with the new value.
    pub fn dispatch(
        &self,
        dashboard: &Dashboard,
        input: &str,
        value: &str,
    ) -> Result<Vec<CallbackOutput>> {
        let bound: Vec<&Callback> = self.callbacks.iter().filter(|c| c.input == input).collect();
        if bound.is_empty() {
            return Err(Error::UnknownComponent(input.to_string()));
        }

        bound
            .into_iter()
            .map(|c| {
                log::debug!("Callback {} -> {} with {:?}", c.input, c.output, value);
                Ok(CallbackOutput {
                    output: c.output.clone(),
                    figure: (c.handler)(dashboard, value)?,
                })
            })
            .collect()
    }

    /// Run every handler once with its control's initial value from `layout`.
    /// A control missing from the layout is dispatched with an empty value.
    pub fn initial_outputs(
        &self,
        dashboard: &Dashboard,
        layout: &Layout,
    ) -> Result<Vec<CallbackOutput>> {
        self.callbacks
            .iter()
            .map(|c| {
                let value = layout.initial_value(&c.input).unwrap_or_default();
                Ok(CallbackOutput {
                    output: c.output.clone(),
                    figure: (c.handler)(dashboard, value)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::{Error, Result};
    use crate::figure::{histogram, ChartLabels};
    use crate::layout::{GRAPH_ID, PHASE_CONTROL_ID};
    use polars::prelude::*;

    fn dashboard() -> Dashboard {
        let measures = df!(
            "team" => [1i64, 1, 2],
            "match" => [1i64, 1, 1],
            "phase" => ["auto", "tele", "auto"],
            "task" => ["cube_high", "cube_mid", "cube_low"],
            "hit" => [3i64, 2, 1]
        )
        .unwrap();
        Dashboard::from_measures(Config::default(), measures).unwrap()
    }

    fn echo_handler(dashboard: &Dashboard, value: &str) -> Result<Figure> {
        histogram(dashboard.summary(), value, &ChartLabels::for_category("Echo"))
    }

    #[test]
    fn test_dispatch_runs_bound_handlers() {
        let dashboard = dashboard();
        let outputs = dashboard
            .callbacks()
            .dispatch(&dashboard, PHASE_CONTROL_ID, "Tele")
            .unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].output, GRAPH_ID);
        assert_eq!(outputs[0].figure.data[0].x, vec![2]);
    }

    #[test]
    fn test_dispatch_unknown_input_is_error() {
        let dashboard = dashboard();
        let err = dashboard
            .callbacks()
            .dispatch(&dashboard, "nope", "Tele")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownComponent(id) if id == "nope"));
    }

    #[test]
    fn test_initial_outputs_use_layout_defaults() {
        let dashboard = dashboard();
        let outputs = dashboard
            .callbacks()
            .initial_outputs(&dashboard, dashboard.layout())
            .unwrap();
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].figure.layout.title.text.ends_with(": All"));
        assert_eq!(outputs[0].figure.data[0].x, vec![5, 1]);
    }

    #[test]
    fn test_multiple_handlers_on_one_input() {
        let dashboard = dashboard();
        let mut registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        registry.register("control", "first", echo_handler);
        registry.register("control", "second", echo_handler);
        registry.register("other", "third", echo_handler);
        assert_eq!(registry.len(), 3);

        let outputs = registry.dispatch(&dashboard, "control", "x").unwrap();
        let ids: Vec<&str> = outputs.iter().map(|o| o.output.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_initial_outputs_without_layout_control_use_empty_value() {
        let dashboard = dashboard();
        let mut registry = CallbackRegistry::new();
        registry.register("missing", "out", echo_handler);

        let outputs = registry
            .initial_outputs(&dashboard, dashboard.layout())
            .unwrap();
        assert_eq!(
            outputs[0].figure.layout.title.text,
            "Histogram of Echo Placed Per Match: "
        );
    }
}
