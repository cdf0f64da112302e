use crate::foundation::error::{VizError, VizResult};
use crate::scene::model::Snapshot;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Ordered, immutable list of snapshots produced by one search request.
///
/// Cloning is cheap; clones share the same snapshot storage. A sequence has no notion of a
/// "current" step, that belongs to [`crate::PlaybackController`].
#[derive(Debug, Clone, Default)]
pub struct StepSequence {
    steps: Arc<[Snapshot]>,
}

impl StepSequence {
    /// Build a sequence from already-parsed snapshots.
    pub fn new(steps: Vec<Snapshot>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// Replace the contents with the snapshots in a JSON array.
    ///
    /// Anything other than an array, or an array element that is not a valid snapshot, fails with
    /// [`VizError::InvalidInput`] and leaves `self` unchanged. An empty array is accepted.
    pub fn load(&mut self, value: serde_json::Value) -> VizResult<()> {
        *self = Self::from_json_value(value)?;
        Ok(())
    }

    /// Parse a sequence from a JSON array value.
    pub fn from_json_value(value: serde_json::Value) -> VizResult<Self> {
        let serde_json::Value::Array(items) = value else {
            return Err(VizError::invalid_input(format!(
                "step sequence must be a JSON array, got {}",
                json_kind(&value)
            )));
        };
        let mut steps = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let snap: Snapshot = serde_json::from_value(item)
                .map_err(|e| VizError::invalid_input(format!("step {i}: {e}")))?;
            steps.push(snap);
        }
        tracing::debug!(steps = steps.len(), "loaded step sequence");
        Ok(Self::new(steps))
    }

    /// Parse a sequence from a JSON reader.
    ///
    /// Both a bare array and the backend response envelope are accepted.
    pub fn from_reader<R: std::io::Read>(r: R) -> VizResult<Self> {
        let value: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| VizError::invalid_input(format!("parse step sequence JSON: {e}")))?;
        if value.is_object() {
            Self::from_response(value)
        } else {
            Self::from_json_value(value)
        }
    }

    /// Parse a sequence from a JSON file on disk. Accepts the same forms as
    /// [`StepSequence::from_reader`].
    pub fn from_path(path: impl AsRef<Path>) -> VizResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VizError::invalid_input(format!("open step sequence '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f)).map_err(|e| match e {
            VizError::InvalidInput(msg) => {
                VizError::invalid_input(format!("'{}': {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Unwrap a pathfinding response envelope: `{"success": true, "steps": [...]}`.
    ///
    /// `{"error": "..."}` or `"success": false` becomes [`VizError::InvalidInput`] carrying the
    /// backend message.
    pub fn from_response(value: serde_json::Value) -> VizResult<Self> {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(default)]
            success: Option<bool>,
            #[serde(default)]
            error: Option<String>,
            #[serde(default)]
            steps: Option<serde_json::Value>,
        }

        let env: Envelope = serde_json::from_value(value)
            .map_err(|e| VizError::invalid_input(format!("response envelope: {e}")))?;
        if let Some(msg) = env.error {
            return Err(VizError::invalid_input(format!("backend error: {msg}")));
        }
        if env.success == Some(false) {
            return Err(VizError::invalid_input("backend reported failure"));
        }
        let steps = env
            .steps
            .ok_or_else(|| VizError::invalid_input("response has no \"steps\" field"))?;
        Self::from_json_value(steps)
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Return `true` when the sequence holds no snapshots.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Snapshot at `index`, or `None` outside `[0, len)`.
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.steps.get(index)
    }

    /// Snapshot at `index`, or [`VizError::NotFound`] outside `[0, len)`.
    pub fn try_get(&self, index: usize) -> VizResult<&Snapshot> {
        self.get(index).ok_or_else(|| {
            VizError::not_found(format!("step {index} (sequence has {})", self.len()))
        })
    }

    /// Index of the last snapshot, or `None` when empty.
    pub fn last_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// Iterate snapshots in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.steps.iter()
    }
}

impl From<Vec<Snapshot>> for StepSequence {
    fn from(steps: Vec<Snapshot>) -> Self {
        Self::new(steps)
    }
}

impl<'a> IntoIterator for &'a StepSequence {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/sequence.rs"]
mod tests;
