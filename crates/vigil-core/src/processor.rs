//! The incident state machine.
//!
//! One pass per check run. The check's status and the presence of a stored
//! incident decide what happens:
//!
//! | run     | stored incident | effect                                            |
//! |---------|-----------------|---------------------------------------------------|
//! | failing | none            | open incident, notify "started"                   |
//! | failing | present         | update; notify "updated" if confirmed, renotify   |
//! |         |                 | is on and the output changed                      |
//! | passing | present         | notify "resolved" if confirmed, delete            |
//! | passing | none            | nothing                                           |
//!
//! Storage failures are logged and the pass continues with what it has.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use vigil_protocols::{Check, Event, Incident, Message, Storage, StorageError};

use crate::policy::DeliveryPolicy;

/// Default deadline applied to each storage call.
pub const STORAGE_DEADLINE: Duration = Duration::from_secs(10);

/// Outcome of one state-machine pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The check has no handlers; nothing was done.
    Skipped,
    /// A new incident was opened.
    Opened { incident_id: String },
    /// An existing incident recorded another failure.
    Updated { incident_id: String, attempts: u32 },
    /// An incident was closed. `notified` is false for unconfirmed incidents.
    Resolved { incident_id: String, notified: bool },
    /// Passing run with no incident.
    Unchanged,
}

/// Drives incidents from check results.
pub struct EventProcessor {
    storage: Arc<dyn Storage>,
    policy: DeliveryPolicy,
    deadline: Duration,
}

impl EventProcessor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            policy: DeliveryPolicy::default(),
            deadline: STORAGE_DEADLINE,
        }
    }

    pub fn with_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn policy(&self) -> &DeliveryPolicy {
        &self.policy
    }

    /// Run one pass for the event's check.
    pub async fn process(&self, event: Event<'_>) -> Transition {
        let Event { id, check, .. } = event;
        debug!(event = %id, check = %check.name(), status = check.state.status, "Processing event");

        if check.handlers().is_empty() {
            error!("Check '{}' does not have any handler", check.name());
            return Transition::Skipped;
        }

        if check.is_failing() {
            self.on_failure(check).await
        } else {
            self.on_success(check).await
        }
    }

    async fn on_failure(&self, check: &mut Check) -> Transition {
        let Some(mut incident) = self.fetch(check).await else {
            let incident = Incident::open(check);
            if let Err(e) = self.bounded(self.storage.set(&incident)).await {
                error!("Failed to store incident for check '{}': {}", check.name(), e);
            }
            info!(incident = %incident.id, "Opened incident for check '{}'", check.name());

            self.dispatch(check, &Message::incident_started(&incident)).await;
            return Transition::Opened {
                incident_id: incident.id,
            };
        };

        check.previous_output = std::mem::take(&mut incident.state.output);
        incident.record_failure(&check.state.output);
        check.state.attempts = incident.state.attempts;

        if let Err(e) = self
            .bounded(self.storage.update(check.name(), &incident))
            .await
        {
            error!("Failed to update incident for check '{}': {}", check.name(), e);
        }
        debug!(
            incident = %incident.id,
            attempts = incident.state.attempts,
            "Updated incident for check '{}'",
            check.name()
        );

        if incident.is_confirmed()
            && check.definition.renotify
            && check.state.output != check.previous_output
        {
            self.dispatch(check, &Message::incident_updated(&incident)).await;
        }

        Transition::Updated {
            attempts: incident.state.attempts,
            incident_id: incident.id,
        }
    }

    async fn on_success(&self, check: &mut Check) -> Transition {
        let Some(incident) = self.fetch(check).await else {
            return Transition::Unchanged;
        };

        let notified = incident.is_confirmed();
        if notified {
            let message = Message::incident_resolved(&incident, &check.state.output);
            self.dispatch(check, &message).await;
        } else {
            debug!(
                incident = %incident.id,
                "Incident for check '{}' resolved before confirmation",
                check.name()
            );
        }

        if let Err(e) = self.bounded(self.storage.delete(check.name())).await {
            error!("Failed to delete incident for check '{}': {}", check.name(), e);
        }
        info!(incident = %incident.id, "Resolved incident for check '{}'", check.name());

        Transition::Resolved {
            incident_id: incident.id,
            notified,
        }
    }

    /// Lookup failures are treated as "no incident".
    async fn fetch(&self, check: &Check) -> Option<Incident> {
        match self.bounded(self.storage.get(check.name())).await {
            Ok(incident) => incident,
            Err(e) => {
                error!("Failed to fetch incident for check '{}': {}", check.name(), e);
                None
            }
        }
    }

    /// Send to every bound handler the policy admits. Returns the number of
    /// successful deliveries.
    async fn dispatch(&self, check: &Check, message: &Message) -> usize {
        if !self.policy.allows(check.state.status) {
            debug!(
                status = check.state.status,
                "Delivery suppressed for check '{}'",
                check.name()
            );
            return 0;
        }

        let mut delivered = 0;
        for handler in check.handlers() {
            match handler.send(message).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    handler = %handler.name(),
                    "Failed to deliver '{}': {}",
                    message.title,
                    e
                ),
            }
        }
        delivered
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        tokio::time::timeout(self.deadline, call)
            .await
            .map_err(|_| StorageError::Timeout(self.deadline))?
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
