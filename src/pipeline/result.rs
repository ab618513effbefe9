//! Outcome of one pipeline run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRunReport {
    pub pipeline: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Block name and state, in declaration order
    pub states: Vec<(String, BlockState)>,
}

impl PipelineRunReport {
    /// Fresh report with every block pending
    pub fn start(pipeline: &Pipeline) -> Self {
        Self {
            pipeline: pipeline.name.clone(),
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            states: pipeline
                .blocks
                .iter()
                .map(|block| (block.name.clone(), BlockState::Pending))
                .collect(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn state(&self, block: &str) -> Option<BlockState> {
        self.states
            .iter()
            .find(|(name, _)| name == block)
            .map(|(_, state)| *state)
    }

    pub fn set_state(&mut self, block: &str, state: BlockState) {
        if let Some(entry) = self.states.iter_mut().find(|(name, _)| name == block) {
            entry.1 = state;
        }
    }

    pub fn count(&self, state: BlockState) -> usize {
        self.states.iter().filter(|(_, s)| *s == state).count()
    }

    /// True when every block succeeded
    pub fn succeeded(&self) -> bool {
        self.states.iter().all(|(_, state)| *state == BlockState::Succeeded)
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds())
    }

    /// `3 succeeded, 1 failed, 2 skipped`
    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed, {} skipped",
            self.count(BlockState::Succeeded),
            self.count(BlockState::Failed),
            self.count(BlockState::Skipped)
        )
    }
}
