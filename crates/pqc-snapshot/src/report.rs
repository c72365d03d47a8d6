//! Per-project outcomes of a reconciliation batch.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use pqc_model::ProjectId;

use crate::diff::RewriteReason;
use crate::error::ReconcileError;

/// What happened to one snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotAction {
    /// No file existed; header and rows were written.
    Created { rows: usize },
    /// New rows were appended.
    Appended { rows: usize },
    Unchanged,
    Rewritten { rows: usize, reason: RewriteReason },
    /// No file existed and there were no rows to write.
    Skipped,
}

impl SnapshotAction {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Appended { .. } => "appended",
            Self::Unchanged => "unchanged",
            Self::Rewritten { .. } => "rewritten",
            Self::Skipped => "skipped",
        }
    }

    /// Rows written to disk by this action.
    pub const fn rows_written(&self) -> usize {
        match self {
            Self::Created { rows } | Self::Appended { rows } | Self::Rewritten { rows, .. } => {
                *rows
            }
            Self::Unchanged | Self::Skipped => 0,
        }
    }

    pub const fn reason(&self) -> Option<RewriteReason> {
        match self {
            Self::Rewritten { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ProjectOutcome {
    pub project_id: ProjectId,
    pub result: Result<SnapshotAction, ReconcileError>,
}

impl ProjectOutcome {
    pub fn label(&self) -> &'static str {
        match &self.result {
            Ok(action) => action.label(),
            Err(_) => "failed",
        }
    }
}

impl Serialize for ProjectOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProjectOutcome", 5)?;
        state.serialize_field("project_id", &self.project_id)?;
        state.serialize_field("status", self.label())?;
        match &self.result {
            Ok(action) => {
                state.serialize_field("rows_written", &action.rows_written())?;
                state.serialize_field("reason", &action.reason())?;
                state.serialize_field("error", &None::<String>)?;
            }
            Err(error) => {
                state.serialize_field("rows_written", &0usize)?;
                state.serialize_field("reason", &None::<RewriteReason>)?;
                state.serialize_field("error", &Some(error.to_string()))?;
            }
        }
        state.end()
    }
}

/// Outcomes of one reconciliation pass, in project order.
#[derive(Debug, Default, serde::Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<ProjectOutcome>,
}

impl BatchReport {
    pub fn push(&mut self, project_id: ProjectId, result: Result<SnapshotAction, ReconcileError>) {
        self.outcomes.push(ProjectOutcome { project_id, result });
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, label: &str) -> usize {
        self.outcomes.iter().filter(|o| o.label() == label).count()
    }

    pub fn created(&self) -> usize {
        self.count("created")
    }

    pub fn appended(&self) -> usize {
        self.count("appended")
    }

    pub fn unchanged(&self) -> usize {
        self.count("unchanged")
    }

    pub fn rewritten(&self) -> usize {
        self.count("rewritten")
    }

    pub fn skipped(&self) -> usize {
        self.count("skipped")
    }

    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ProjectId, &ReconcileError)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.project_id, e)))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn outcome(&self, project_id: &str) -> Option<&ProjectOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.project_id.as_str() == project_id)
    }
}
