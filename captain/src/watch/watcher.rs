//! Reconciliation watcher
//!
//! Polls the status of a HelmRequest until the controller reports it synced,
//! the failure budget runs out, or the deadline passes. The controller
//! retries failed syncs on its own, so a single `Failed` observation is not
//! treated as final.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use helm_crds::{EventType, HelmRequest, ObjectReference, ResourceId};

use crate::errors::CaptainError;
use crate::kube::api::{EventSink, StatusAccessor};
use crate::watch::budget::{observe, FailureBudget, WatchState, DEFAULT_FAILURE_TOLERANCE};
use crate::watch::clock::Clock;

/// Watch settings
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Delay before each status fetch
    pub poll_interval: Duration,

    /// Overall deadline, `None` waits forever
    pub timeout: Option<Duration>,

    /// Failed observations tolerated before giving up
    pub failure_tolerance: u32,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: None,
            failure_tolerance: DEFAULT_FAILURE_TOLERANCE,
        }
    }
}

/// What the caller did to the request before watching it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Created,
    Updated,
}

impl fmt::Display for RequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestAction::Created => write!(f, "Created"),
            RequestAction::Updated => write!(f, "Updated"),
        }
    }
}

/// The request being watched and what was asked of it
#[derive(Debug, Clone)]
pub struct WatchTarget {
    pub subject: ObjectReference,
    pub action: RequestAction,
    /// Requested chart version
    pub version: String,
    /// `--set` overrides as given on the command line
    pub overrides: Vec<String>,
}

impl WatchTarget {
    pub fn new(request: &HelmRequest, action: RequestAction, overrides: Vec<String>) -> Self {
        Self {
            subject: request.object_reference(),
            action,
            version: request.spec.version.clone(),
            overrides,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.subject.id()
    }

    /// Human readable summary of a finished watch
    pub fn describe(&self, error: Option<&WatchError>) -> String {
        let values = format!("[{}]", self.overrides.join(" "));
        match error {
            None => format!(
                "{} helmrequest {} with version: {} values: {}",
                self.action,
                self.id(),
                self.version,
                values
            ),
            Some(e) => format!(
                "{} helmrequest {} error with version: {} values: {}, err: {}",
                self.action,
                self.id(),
                self.version,
                values,
                e
            ),
        }
    }
}

/// Why a watch did not end synced
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("failed to get helmrequest {id}: {source}")]
    Fetch {
        id: ResourceId,
        #[source]
        source: Box<CaptainError>,
    },

    #[error("helmrequest {id} failed after {failures} failed observations{}", events_suffix(.diagnostics))]
    Failed {
        id: ResourceId,
        failures: u32,
        diagnostics: Option<String>,
    },

    #[error("timed out after {timeout:?} waiting for helmrequest {id} to be synced")]
    TimedOut { id: ResourceId, timeout: Duration },
}

impl WatchError {
    /// Terminal state this error corresponds to, `None` for fetch errors
    pub fn state(&self) -> Option<WatchState> {
        match self {
            WatchError::Fetch { .. } => None,
            WatchError::Failed { .. } => Some(WatchState::Failed),
            WatchError::TimedOut { .. } => Some(WatchState::TimedOut),
        }
    }
}

fn events_suffix(diagnostics: &Option<String>) -> String {
    match diagnostics {
        Some(events) if !events.is_empty() => format!(", events: {events}"),
        _ => String::new(),
    }
}

/// Drives one or more watch sessions against the same collaborators
pub struct Watcher<'a> {
    status: &'a dyn StatusAccessor,
    events: &'a dyn EventSink,
    clock: &'a dyn Clock,
    options: WatchOptions,
}

impl<'a> Watcher<'a> {
    pub fn new(
        status: &'a dyn StatusAccessor,
        events: &'a dyn EventSink,
        clock: &'a dyn Clock,
        options: WatchOptions,
    ) -> Self {
        Self {
            status,
            events,
            clock,
            options,
        }
    }

    /// Block until `target` is synced, failed or timed out
    ///
    /// Emits exactly one event describing the outcome. Event failures are
    /// logged and do not change the result.
    pub async fn watch(&self, target: &WatchTarget) -> Result<(), WatchError> {
        info!("Start wait for helmrequest {} to be synced", target.id());

        let result = self.poll(target).await;
        self.report(target, &result).await;
        result
    }

    async fn poll(&self, target: &WatchTarget) -> Result<(), WatchError> {
        let id = target.id();
        let deadline = self
            .options
            .timeout
            .map(|timeout| self.clock.elapsed() + timeout);
        let mut budget = FailureBudget::new(self.options.failure_tolerance);

        let outcome = loop {
            // never start a fetch once the deadline has passed
            let wait = match deadline {
                Some(deadline) => {
                    let now = self.clock.elapsed();
                    if now >= deadline {
                        break WatchState::TimedOut;
                    }
                    self.options.poll_interval.min(deadline - now)
                }
                None => self.options.poll_interval,
            };
            self.clock.sleep(wait).await;
            if deadline.is_some_and(|deadline| self.clock.elapsed() >= deadline) {
                break WatchState::TimedOut;
            }

            let status = self
                .status
                .fetch_status(&id)
                .await
                .map_err(|e| WatchError::Fetch {
                    id: id.clone(),
                    source: Box::new(e),
                })?;
            debug!("helmrequest {} is {:?}", id, status.phase);

            let (next, state) = observe(budget, &status.phase);
            if next.failures() > budget.failures() && !state.is_terminal() {
                warn!(
                    "helmrequest {} reported Failed ({}/{}), waiting for the controller to retry",
                    id,
                    next.failures(),
                    next.limit()
                );
            }
            budget = next;

            if state.is_terminal() {
                break state;
            }
        };

        if budget.failures() > 0 {
            warn!("Retried failed helmrequest {}...", id);
        }

        match outcome {
            WatchState::Synced => Ok(()),
            WatchState::Failed => Err(WatchError::Failed {
                id: id.clone(),
                failures: budget.failures(),
                diagnostics: self.diagnostics(&id).await,
            }),
            WatchState::TimedOut | WatchState::Pending => Err(WatchError::TimedOut {
                id,
                timeout: self.options.timeout.unwrap_or_default(),
            }),
        }
    }

    /// Event log for a failed request; failures here only get logged
    async fn diagnostics(&self, id: &ResourceId) -> Option<String> {
        match self.status.fetch_diagnostics(id).await {
            Ok(messages) => {
                let joined = messages.join(",");
                info!("helmrequest {} failed, events are: {}", id, joined);
                Some(joined)
            }
            Err(e) => {
                error!("get events for helmrequest {} error: {}", id, e);
                None
            }
        }
    }

    async fn report(&self, target: &WatchTarget, result: &Result<(), WatchError>) {
        let message = target.describe(result.as_ref().err());
        let (event_type, reason) = match result {
            Ok(()) => (EventType::Normal, "Synced"),
            Err(_) => (EventType::Warning, "FailedSync"),
        };

        if let Err(e) = self
            .events
            .emit(event_type, reason, &message, &target.subject)
            .await
        {
            error!("create event for helmrequest {} error: {}", target.id(), e);
        }
    }
}
