use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use vpdctl_api::ConfigSettings;

/// Issued by [`ConfigStore::begin_fetch`] before a fetch starts.
///
/// Tickets are strictly increasing, so ticket order is request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One wholesale configuration snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    pub settings: ConfigSettings,
    /// Ticket of the fetch that produced this snapshot.
    pub version: u64,
    pub fetched_at: DateTime<Utc>,
}

/// What [`ConfigStore::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The snapshot was replaced.
    Applied { version: u64 },
    /// A newer snapshot was already held; nothing changed.
    Stale { ticket: u64, held: u64 },
}

impl ApplyOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Single-writer store for the backend configuration.
///
/// Starts empty. Each successful fetch replaces the whole snapshot; there is
/// no merging. Subscribers are notified through a `watch` channel.
pub struct ConfigStore {
    current: watch::Sender<Option<Arc<ConfigSnapshot>>>,
    next_ticket: AtomicU64,
}

impl ConfigStore {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Reserve a ticket for a fetch that is about to start.
    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed))
    }

    /// Replace the snapshot with `settings` unless a snapshot from a later
    /// ticket is already held.
    ///
    /// The version check and the write happen under the channel's lock, so
    /// two racing fetches resolve in ticket order regardless of which one
    /// finishes first.
    pub fn apply(&self, ticket: FetchTicket, settings: ConfigSettings) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::Applied { version: ticket.0 };

        self.current.send_if_modified(|slot| {
            let newer_held = slot
                .as_ref()
                .map(|snap| snap.version)
                .filter(|held| *held >= ticket.0);
            if let Some(held) = newer_held {
                outcome = ApplyOutcome::Stale {
                    ticket: ticket.0,
                    held,
                };
                return false;
            }
            *slot = Some(Arc::new(ConfigSnapshot {
                settings,
                version: ticket.0,
                fetched_at: Utc::now(),
            }));
            true
        });

        match outcome {
            ApplyOutcome::Applied { version } => info!(version, "config snapshot replaced"),
            ApplyOutcome::Stale { ticket, held } => {
                debug!(ticket, held, "dropping stale config snapshot");
            }
        }
        outcome
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The current snapshot, or `None` before the first successful fetch.
    pub fn snapshot(&self) -> Option<Arc<ConfigSnapshot>> {
        self.current.borrow().clone()
    }

    /// Version of the held snapshot.
    pub fn version(&self) -> Option<u64> {
        self.current.borrow().as_ref().map(|snap| snap.version)
    }

    /// How long ago the held snapshot was fetched.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.current
            .borrow()
            .as_ref()
            .map(|snap| Utc::now() - snap.fetched_at)
    }

    /// Watch for snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<ConfigSnapshot>>> {
        self.current.subscribe()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
