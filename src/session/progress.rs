use crate::foundation::core::VertexId;
use crate::scene::model::Snapshot;
use serde::Serialize;
use std::fmt;

/// Position of the controller within its sequence, for progress bars and step counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInfo {
    /// 1-based current step, `0` when the sequence is empty.
    pub current_step: usize,
    /// Sequence length.
    pub total_steps: usize,
    /// `current_step / total_steps * 100`, `0` when empty.
    pub percent: f64,
}

impl ProgressInfo {
    pub(crate) fn new(index: usize, len: usize) -> Self {
        if len == 0 {
            return Self::default();
        }
        let current_step = index.min(len - 1) + 1;
        Self {
            current_step,
            total_steps: len,
            percent: (current_step as f64) / (len as f64) * 100.0,
        }
    }
}

/// Human-oriented description of one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    /// 1-based step number.
    pub step: usize,
    /// Sequence length.
    pub total: usize,
    /// Vertex being expanded, if any.
    pub current_id: Option<VertexId>,
    /// Vertices flagged visited in this snapshot.
    pub visited: usize,
    /// Vertices not yet visited.
    pub remaining: usize,
    /// Tentative distance of the current vertex.
    pub distance: Option<f64>,
}

impl StepSummary {
    /// Summarize `snap`, the step at `index` of a `len`-step sequence.
    pub fn new(index: usize, len: usize, snap: &Snapshot) -> Self {
        let visited = snap.visited_count();
        Self {
            step: index + 1,
            total: len,
            current_id: snap.current_id.clone(),
            visited,
            remaining: snap.vertices.len().saturating_sub(visited),
            distance: snap.current_vertex().and_then(|v| v.distance),
        }
    }
}

impl fmt::Display for StepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}/{}", self.step, self.total)?;
        match &self.current_id {
            Some(id) => write!(f, ", exploring {id}")?,
            None => f.write_str(", no active vertex")?,
        }
        write!(f, ", visited {}, remaining {}", self.visited, self.remaining)?;
        if let Some(d) = self.distance {
            write!(f, ", distance {d:.2}km")?;
        }
        Ok(())
    }
}
