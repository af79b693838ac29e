use std::collections::BTreeMap;
use std::str::FromStr;

use crate::environment::repository::CoverageStatusFilterConfig;
use crate::environment::types::{CoverageStatus, Navigation};
use crate::loc;

pub const COVERAGE_STATUS_FIELD: &str = "coverage_status";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchState {
    pub active_query: Option<String>,
    /// field -> selected values
    pub active_filter: BTreeMap<String, Vec<String>>,
    pub active_navigation: Vec<String>,
    pub navigations: Vec<Navigation>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchAction {
    SetQuery(String),
    /// `None` clears the field. With `single`, the field holds at most one
    /// value and selecting the current one again clears it.
    ToggleFilter {
        field: String,
        value: Option<String>,
        single: bool,
    },
    ResetFilter,
    ToggleNavigation(String),
}

pub fn reduce(action: SearchAction, state: &mut SearchState) {
    match action {
        SearchAction::SetQuery(query) => {
            let query = query.trim().to_string();
            state.active_query = (!query.is_empty()).then_some(query);
        }
        SearchAction::ToggleFilter {
            field,
            value,
            single,
        } => {
            let Some(value) = value else {
                state.active_filter.remove(&field);
                return;
            };
            let values = state.active_filter.entry(field.clone()).or_default();
            let selected = values.contains(&value);
            if single {
                values.clear();
                if !selected {
                    values.push(value);
                }
            } else if selected {
                values.retain(|v| v != &value);
            } else {
                values.push(value);
            }
            if values.is_empty() {
                state.active_filter.remove(&field);
            }
        }
        SearchAction::ResetFilter => state.active_filter.clear(),
        SearchAction::ToggleNavigation(id) => {
            if state.active_navigation.contains(&id) {
                state.active_navigation.retain(|n| n != &id);
            } else {
                state.active_navigation.push(id);
            }
        }
    }
}

impl SearchState {
    pub fn coverage_status(&self) -> Option<CoverageStatus> {
        self.active_filter
            .get(COVERAGE_STATUS_FIELD)
            .and_then(|values| values.first())
            .and_then(|v| CoverageStatus::from_str(v).ok())
    }

    /// Label of the coverage status dropdown: the configured button label
    /// of the active status, or the generic label
    pub fn coverage_status_label(&self, config: &CoverageStatusFilterConfig) -> String {
        self.coverage_status()
            .and_then(|status| config.get(status))
            .map(|option| option.button_label.clone())
            .unwrap_or_else(|| loc!("Any coverage status").to_string())
    }

    pub fn active_navigation(&self) -> Vec<&Navigation> {
        self.navigations
            .iter()
            .filter(|n| self.active_navigation.contains(&n.id))
            .collect()
    }
}
