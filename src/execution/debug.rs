//! Debug output controls
//!
//! Observability only: nothing here changes what a pipeline computes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DebugGranularity {
    /// Block boundaries and output summaries
    #[default]
    Minimal,
    /// Summaries plus a preview of each block's output
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DebugTargets {
    #[default]
    All,
    Named(BTreeSet<String>),
}

impl DebugTargets {
    /// An empty name list means every block
    pub fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        let names: BTreeSet<String> = names.into_iter().collect();
        if names.is_empty() {
            DebugTargets::All
        } else {
            DebugTargets::Named(names)
        }
    }

    pub fn includes(&self, block: &str) -> bool {
        match self {
            DebugTargets::All => true,
            DebugTargets::Named(names) => names.contains(block),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub granularity: DebugGranularity,
    pub targets: DebugTargets,
}

impl DebugConfig {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled_for(&self, block: &str) -> bool {
        self.enabled && self.targets.includes(block)
    }

    /// Output rows shown per block
    pub fn preview_rows(&self) -> usize {
        match self.granularity {
            DebugGranularity::Minimal => 0,
            DebugGranularity::Full => 10,
        }
    }
}
