use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use common::{EntityType, StatusQuery};
use console_core::{
    Applied, DashboardAction, DashboardState, EntityLookup, EntitySummary, LookupError,
    LookupOutcome, Notification, RequestId, summarize,
};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};

use crate::ConsoleClient;

const NOTIFICATION_BACKLOG: usize = 16;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Invalid(#[from] LookupError),
    /// The console rejected or never answered this request.
    #[error("{}", .0.message)]
    Upstream(Notification),
}

/// Result of one refresh, independent of requests issued concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct Refreshed {
    pub summary: Vec<EntitySummary>,
    /// Shared state after this refresh was applied.
    pub state: DashboardState,
}

/// Result of one lookup, independent of requests issued concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct LookedUp {
    pub lookup: EntityLookup,
    pub outcome: LookupOutcome,
    /// Shared state after this lookup was applied.
    pub state: DashboardState,
}

/// Drives [`DashboardState`] from console requests.
///
/// Every refresh and lookup gets a fresh request id; results of requests
/// superseded in the meantime are discarded by the state. Each call still
/// returns its own response to the caller.
#[derive(Clone)]
pub struct ReplicationDashboard {
    client: ConsoleClient,
    state: Arc<Mutex<DashboardState>>,
    next_request: Arc<AtomicU64>,
    notifications: broadcast::Sender<Notification>,
}

impl ReplicationDashboard {
    pub fn new(client: ConsoleClient) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_BACKLOG);
        Self {
            client,
            state: Arc::new(Mutex::new(DashboardState::new())),
            next_request: Arc::new(AtomicU64::new(1)),
            notifications,
        }
    }

    pub fn client(&self) -> &ConsoleClient {
        &self.client
    }

    /// Error notifications as they are raised, in addition to the snackbar.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.lock().await.clone()
    }

    pub async fn refresh(&self) -> Result<Refreshed, DashboardError> {
        let request = self.issue();
        self.apply(DashboardAction::RefreshStarted { request }).await;

        match self.client.replication_summary().await {
            Ok(status) => {
                let summary = summarize(&status);
                let state = self
                    .apply(DashboardAction::RefreshSucceeded { request, status })
                    .await;
                Ok(Refreshed { summary, state })
            }
            Err(err) => {
                warn!(request_id = request, error = %err, "replication summary failed");
                let error = err.notification();
                self.apply(DashboardAction::RefreshFailed {
                    request,
                    error: error.clone(),
                })
                .await;
                Err(DashboardError::Upstream(error))
            }
        }
    }

    /// Validates the input before any request is made.
    pub async fn lookup(&self, entity: EntityType, value: &str) -> Result<LookedUp, DashboardError> {
        let lookup = EntityLookup::new(entity, value)?;
        let request = self.issue();
        self.apply(DashboardAction::LookupStarted {
            request,
            lookup: lookup.clone(),
        })
        .await;

        match self
            .client
            .site_replication_status(&StatusQuery::lookup(lookup.entity, &lookup.value))
            .await
        {
            Ok(status) => {
                let outcome = lookup.resolve(&status);
                let state = self
                    .apply(DashboardAction::LookupSucceeded { request, status })
                    .await;
                Ok(LookedUp {
                    lookup,
                    outcome,
                    state,
                })
            }
            Err(err) => {
                warn!(request_id = request, entity = %lookup.entity, value = %lookup.value, error = %err, "replication lookup failed");
                let error = err.notification();
                self.apply(DashboardAction::LookupFailed {
                    request,
                    error: error.clone(),
                })
                .await;
                Err(DashboardError::Upstream(error))
            }
        }
    }

    pub async fn dismiss_snackbar(&self) -> DashboardState {
        self.apply(DashboardAction::SnackbarDismissed).await
    }

    fn issue(&self) -> RequestId {
        self.next_request.fetch_add(1, Ordering::Relaxed)
    }

    async fn apply(&self, action: DashboardAction) -> DashboardState {
        let raised = match &action {
            DashboardAction::RefreshFailed { error, .. }
            | DashboardAction::LookupFailed { error, .. } => Some(error.clone()),
            _ => None,
        };

        let mut state = self.state.lock().await;
        match state.apply(action) {
            Applied::Updated => {
                if let Some(notification) = raised {
                    // Sending fails only when nobody is subscribed.
                    let _ = self.notifications.send(notification);
                }
            }
            Applied::Stale => debug!("dropping result of superseded request"),
        }
        state.clone()
    }
}
