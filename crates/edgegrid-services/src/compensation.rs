//! Configuration teardown and the report of a provisioning rollback.

use std::fmt;

use tracing::{debug, warn};

use edge_core::{ServiceKind, advanced_category};

use crate::collaborators::Configuration;

/// One configuration removal performed when a service goes away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensationAction {
    DeleteCategory { category: String },
    UnlinkChild { parent: String, child: String },
    UnlinkChildren { parent: String },
}

impl CompensationAction {
    pub(crate) async fn apply(&self, configuration: &dyn Configuration) -> anyhow::Result<()> {
        match self {
            CompensationAction::DeleteCategory { category } => {
                configuration.delete_category(category).await
            }
            CompensationAction::UnlinkChild { parent, child } => {
                configuration.delete_child_link(parent, child).await
            }
            CompensationAction::UnlinkChildren { parent } => {
                configuration.delete_child_links(parent).await
            }
        }
    }
}

impl fmt::Display for CompensationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompensationAction::DeleteCategory { category } => {
                write!(f, "delete category {category}")
            }
            CompensationAction::UnlinkChild { parent, child } => {
                write!(f, "unlink {child} from {parent}")
            }
            CompensationAction::UnlinkChildren { parent } => {
                write!(f, "unlink children of {parent}")
            }
        }
    }
}

/// Everything that removes a service's configuration, in order: its
/// category, the advanced sibling, the link from each umbrella, then the
/// links to any categories it parents.
pub(crate) fn teardown_actions(name: &str, umbrellas: &[ServiceKind]) -> Vec<CompensationAction> {
    let mut actions = vec![
        CompensationAction::DeleteCategory {
            category: name.to_string(),
        },
        CompensationAction::DeleteCategory {
            category: advanced_category(name),
        },
    ];
    actions.extend(umbrellas.iter().map(|kind| CompensationAction::UnlinkChild {
        parent: kind.umbrella_category().to_string(),
        child: name.to_string(),
    }));
    actions.push(CompensationAction::UnlinkChildren {
        parent: name.to_string(),
    });
    actions
}

/// Outcome of a single compensating action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationStep {
    pub action: CompensationAction,
    /// `None` when the action succeeded.
    pub error: Option<String>,
}

/// What a provisioning rollback did, step by step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationReport {
    pub service: String,
    pub steps: Vec<CompensationStep>,
}

impl CompensationReport {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            steps: Vec::new(),
        }
    }

    /// True when every compensating action succeeded.
    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(|s| s.error.is_none())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CompensationStep> {
        self.steps.iter().filter(|s| s.error.is_some())
    }
}

/// Run every teardown action, best-effort. Failures are recorded and
/// logged, never returned.
pub(crate) async fn compensate(
    configuration: &dyn Configuration,
    name: &str,
    kind: ServiceKind,
) -> CompensationReport {
    let mut report = CompensationReport::new(name);
    for action in teardown_actions(name, &[kind]) {
        let error = match action.apply(configuration).await {
            Ok(()) => {
                debug!(service = %name, step = %action, "compensating step done");
                None
            }
            Err(e) => {
                warn!(service = %name, step = %action, error = %e, "compensating step failed");
                Some(e.to_string())
            }
        };
        report.steps.push(CompensationStep { action, error });
    }

    let failed = report.failures().count();
    if failed == 0 {
        debug!(service = %name, steps = report.steps.len(), "rollback complete");
    } else {
        warn!(service = %name, steps = report.steps.len(), failed, "rollback incomplete");
    }
    report
}
