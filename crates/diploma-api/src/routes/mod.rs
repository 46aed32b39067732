//! # Route Modules
//!
//! - `students`: registration, eligibility, removal, and fee payment.
//! - `diplomas`: diploma issuance and verification.
//! - `registry`: registry settings, event history, and balances.
//!
//! Mutating handlers run the registry operation under the runtime lock and
//! answer with the event the operation published.

pub mod diplomas;
pub mod registry;
pub mod students;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use diploma_state::{EventRecord, RegistryError, RegistryEvent, RegistryRuntime};

use crate::error::AppError;
use crate::state::AppState;

/// One published registry event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventView {
    /// Position in the event history, starting at 1.
    pub sequence: u64,
    /// Publication time (RFC 3339, UTC).
    pub timestamp: String,
    /// Event name, e.g. `credential_submitted`.
    pub name: String,
    /// Event payload, tagged by `event`.
    #[schema(value_type = Object)]
    pub event: RegistryEvent,
}

impl From<&EventRecord> for EventView {
    fn from(record: &EventRecord) -> Self {
        Self {
            sequence: record.sequence,
            timestamp: record.timestamp.to_iso8601(),
            name: record.event.name().to_string(),
            event: record.event.clone(),
        }
    }
}

/// Run a mutating operation under the runtime lock.
pub(crate) fn apply(
    state: &AppState,
    op: impl FnOnce(&mut RegistryRuntime) -> Result<RegistryEvent, RegistryError>,
) -> Result<EventView, AppError> {
    let mut runtime = state.runtime.lock();
    let event = op(&mut runtime)?;
    let view = match runtime.events.last() {
        Some(record) if record.event == event => EventView::from(record),
        _ => EventView {
            sequence: 0,
            timestamp: String::new(),
            name: event.name().to_string(),
            event,
        },
    };
    Ok(view)
}
