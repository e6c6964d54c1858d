use common::{EntityType, SiteReplicationStatus};
use serde::Serialize;

use crate::matrix::{EntityLookup, LookupOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Info,
}

/// Message for the shared snackbar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub detailed: String,
}

impl Notification {
    pub fn error(message: impl Into<String>, detailed: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            detailed: detailed.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            detailed: String::new(),
        }
    }
}

/// One summary card. `synced` is the server's `max*` count, `failed` the
/// number of entities listed in the matching `*Stats` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub entity: EntityType,
    pub label: &'static str,
    pub synced: u64,
    pub failed: usize,
}

pub fn summarize(status: &SiteReplicationStatus) -> Vec<EntitySummary> {
    EntityType::ALL
        .into_iter()
        .map(|entity| EntitySummary {
            entity,
            label: entity.plural_label(),
            synced: status.max_for(entity),
            failed: status.stats_len_for(entity),
        })
        .collect()
}

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LookupState {
    #[default]
    Idle,
    Loading {
        lookup: EntityLookup,
    },
    Ready {
        lookup: EntityLookup,
        outcome: LookupOutcome,
    },
    Failed {
        lookup: EntityLookup,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    RefreshStarted {
        request: RequestId,
    },
    RefreshSucceeded {
        request: RequestId,
        status: SiteReplicationStatus,
    },
    RefreshFailed {
        request: RequestId,
        error: Notification,
    },
    LookupStarted {
        request: RequestId,
        lookup: EntityLookup,
    },
    LookupSucceeded {
        request: RequestId,
        status: SiteReplicationStatus,
    },
    LookupFailed {
        request: RequestId,
        error: Notification,
    },
    SnackbarDismissed,
}

/// Replication dashboard state. Only [`DashboardState::apply`] changes it.
///
/// Refresh and lookup each track the id of the request issued last; a
/// completion carrying any other id is stale and ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardState {
    pub loading: bool,
    pub status: SiteReplicationStatus,
    pub summary: Vec<EntitySummary>,
    pub lookup: LookupState,
    pub snackbar: Option<Notification>,
    #[serde(skip)]
    refresh_request: Option<RequestId>,
    #[serde(skip)]
    lookup_request: Option<RequestId>,
}

/// Whether an action changed the state or was dropped as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    Stale,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: DashboardAction) -> Applied {
        match action {
            DashboardAction::RefreshStarted { request } => {
                self.refresh_request = Some(request);
                self.loading = true;
            }
            DashboardAction::RefreshSucceeded { request, status } => {
                if self.refresh_request != Some(request) {
                    return Applied::Stale;
                }
                self.loading = false;
                self.summary = summarize(&status);
                self.status = status;
            }
            DashboardAction::RefreshFailed { request, error } => {
                if self.refresh_request != Some(request) {
                    return Applied::Stale;
                }
                self.loading = false;
                self.status = SiteReplicationStatus::default();
                self.summary = summarize(&self.status);
                self.snackbar = Some(error);
            }
            DashboardAction::LookupStarted { request, lookup } => {
                self.lookup_request = Some(request);
                self.lookup = LookupState::Loading { lookup };
            }
            DashboardAction::LookupSucceeded { request, status } => {
                if self.lookup_request != Some(request) {
                    return Applied::Stale;
                }
                let LookupState::Loading { lookup } = &self.lookup else {
                    return Applied::Stale;
                };
                let lookup = lookup.clone();
                let outcome = lookup.resolve(&status);
                self.lookup = LookupState::Ready { lookup, outcome };
            }
            DashboardAction::LookupFailed { request, error } => {
                if self.lookup_request != Some(request) {
                    return Applied::Stale;
                }
                let LookupState::Loading { lookup } = &self.lookup else {
                    return Applied::Stale;
                };
                let lookup = lookup.clone();
                self.lookup = LookupState::Failed { lookup };
                self.snackbar = Some(error);
            }
            DashboardAction::SnackbarDismissed => {
                self.snackbar = None;
            }
        }
        Applied::Updated
    }
}
