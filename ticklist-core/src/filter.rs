//! View filter and the controller that tracks the active one.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseFilterError;
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}

/// Holds the active filter and whether the view needs redrawing because of it.
#[derive(Debug, Default, Clone)]
pub struct FilterController {
    current: Filter,
    redraw_requested: bool,
}

impl FilterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Filter {
        self.current
    }

    /// Always requests a redraw, even when the filter is unchanged.
    pub fn set_filter(&mut self, filter: Filter) {
        self.current = filter;
        self.redraw_requested = true;
    }

    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}
