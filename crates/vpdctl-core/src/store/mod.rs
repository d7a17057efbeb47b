// ── Configuration store ──
//
// Owns the last backend configuration snapshot. Writes are ticketed so a
// slow fetch that started earlier can never replace a newer snapshot.

mod config_store;

pub use config_store::{ApplyOutcome, ConfigSnapshot, ConfigStore, FetchTicket};
