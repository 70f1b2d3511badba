//! Run results

use a10bridge_common::{ApplianceError, Error};

/// What happened on one appliance instance during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceReport {
    /// Instance name
    pub instance: String,
    /// Session could not be established; nothing else was attempted
    pub connection_error: Option<ApplianceError>,
    /// Nodes whose server could not be converged
    pub failed_nodes: Vec<String>,
    /// Service groups whose monitor, group or members could not be converged
    pub failed_groups: Vec<String>,
    /// Session could not be closed cleanly
    pub close_error: Option<ApplianceError>,
}

impl InstanceReport {
    /// Report for an instance about to be processed
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            ..Default::default()
        }
    }

    /// Whether every entity on this instance converged
    ///
    /// A failed close does not count against the instance.
    pub fn is_clean(&self) -> bool {
        self.connection_error.is_none()
            && self.failed_nodes.is_empty()
            && self.failed_groups.is_empty()
    }
}

/// Results of one reconciliation run over every instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per configured instance, in processing order
    pub instances: Vec<InstanceReport>,
}

impl RunReport {
    /// Whether every instance converged
    pub fn is_clean(&self) -> bool {
        self.instances.iter().all(InstanceReport::is_clean)
    }
}

/// Final state of one bounded run
#[derive(Debug)]
pub enum RunOutcome {
    /// Every instance converged
    Normal(RunReport),
    /// The run completed but some instances or entities failed
    Degraded(RunReport),
    /// Desired state could not be built; no appliance was touched
    Failed(Error),
    /// The run did not finish in time and was abandoned
    TimedOut,
}

impl RunOutcome {
    /// Classify a completed run by its report
    pub fn from_report(report: RunReport) -> Self {
        if report.is_clean() {
            Self::Normal(report)
        } else {
            Self::Degraded(report)
        }
    }

    /// Whether a daemon should schedule the next run after this one
    pub fn should_continue(&self) -> bool {
        matches!(self, Self::Normal(_) | Self::Degraded(_))
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Normal(_) => 0,
            Self::Failed(_) => 1,
            Self::TimedOut => 2,
            Self::Degraded(_) => 3,
        }
    }

    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal(_) => "normal",
            Self::Degraded(_) => "degraded",
            Self::Failed(_) => "failed",
            Self::TimedOut => "timed out",
        }
    }
}
