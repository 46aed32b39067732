//! # Registry Events
//!
//! Every successful mutating operation publishes exactly one
//! [`RegistryEvent`] through an [`EventSink`]. Failed operations and reads
//! publish nothing.
//!
//! [`EventLog`] is the in-memory append-only sink. It numbers records from
//! 1 and stamps each with the UTC time of publication.

use serde::{Deserialize, Serialize};

use diploma_core::{AccountId, Amount, CredentialId, CredentialSignature, DiplomaSignature, Timestamp};

use crate::error::SnapshotError;

// ─── Events ──────────────────────────────────────────────────────────

/// A state change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A new credential identifier was registered.
    CredentialSubmitted { id: CredentialId },
    /// The authority made a student eligible.
    StudentEligible { id: CredentialId },
    /// The authority revoked a student's eligibility.
    StudentIneligible { id: CredentialId },
    /// Eligibility was requested for a student who already had it.
    AlreadyEligible { id: CredentialId },
    /// Ineligibility was requested for a student who already had it.
    AlreadyIneligible { id: CredentialId },
    /// A student record was removed.
    StudentRemoved { id: CredentialId },
    /// A student's fee was received and forwarded to the authority.
    PaymentReceived {
        id: CredentialId,
        payer: AccountId,
        amount: Amount,
    },
    /// The authority cleared a student's paid flag.
    PaymentReset { id: CredentialId },
    /// A diploma signature was recorded against a credential signature.
    DiplomaIssued {
        diploma_signature: DiplomaSignature,
        credential_signature: CredentialSignature,
    },
}

impl RegistryEvent {
    /// The event's snake_case name, as it appears in serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CredentialSubmitted { .. } => "credential_submitted",
            Self::StudentEligible { .. } => "student_eligible",
            Self::StudentIneligible { .. } => "student_ineligible",
            Self::AlreadyEligible { .. } => "already_eligible",
            Self::AlreadyIneligible { .. } => "already_ineligible",
            Self::StudentRemoved { .. } => "student_removed",
            Self::PaymentReceived { .. } => "payment_received",
            Self::PaymentReset { .. } => "payment_reset",
            Self::DiplomaIssued { .. } => "diploma_issued",
        }
    }

    /// The credential identifier this event concerns, if any.
    pub fn credential_id(&self) -> Option<&CredentialId> {
        match self {
            Self::CredentialSubmitted { id }
            | Self::StudentEligible { id }
            | Self::StudentIneligible { id }
            | Self::AlreadyEligible { id }
            | Self::AlreadyIneligible { id }
            | Self::StudentRemoved { id }
            | Self::PaymentReceived { id, .. }
            | Self::PaymentReset { id } => Some(id),
            Self::DiplomaIssued { .. } => None,
        }
    }

    /// Whether this event records a no-op eligibility request.
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::AlreadyEligible { .. } | Self::AlreadyIneligible { .. }
        )
    }
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PaymentReceived { id, payer, amount } => {
                write!(f, "{} {id} payer={payer} amount={amount}", self.name())
            }
            Self::DiplomaIssued {
                diploma_signature,
                credential_signature,
            } => write!(
                f,
                "{} diploma={diploma_signature} credential={credential_signature}",
                self.name()
            ),
            other => match other.credential_id() {
                Some(id) => write!(f, "{} {id}", other.name()),
                None => f.write_str(other.name()),
            },
        }
    }
}

// ─── Sinks ───────────────────────────────────────────────────────────

/// Append-only notification channel.
pub trait EventSink {
    /// Publish one event.
    fn publish(&mut self, event: RegistryEvent);
}

impl EventSink for Vec<RegistryEvent> {
    fn publish(&mut self, event: RegistryEvent) {
        self.push(event);
    }
}

/// A published event with its position and publication time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// 1-based, strictly increasing.
    pub sequence: u64,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub event: RegistryEvent,
}

/// In-memory event history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<EventRecord>", try_from = "Vec<EventRecord>")]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Records with a sequence number strictly greater than `after`.
    pub fn since(&self, after: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.sequence <= after);
        &self.records[start..]
    }

    fn next_sequence(&self) -> u64 {
        self.records.last().map_or(1, |r| r.sequence + 1)
    }
}

impl EventSink for EventLog {
    fn publish(&mut self, event: RegistryEvent) {
        let sequence = self.next_sequence();
        tracing::trace!(sequence, event = event.name(), "event published");
        self.records.push(EventRecord {
            sequence,
            timestamp: Timestamp::now(),
            event,
        });
    }
}

impl From<EventLog> for Vec<EventRecord> {
    fn from(log: EventLog) -> Self {
        log.records
    }
}

impl TryFrom<Vec<EventRecord>> for EventLog {
    type Error = SnapshotError;

    fn try_from(records: Vec<EventRecord>) -> Result<Self, Self::Error> {
        for pair in records.windows(2) {
            if pair[1].sequence <= pair[0].sequence {
                return Err(SnapshotError::EventOutOfOrder {
                    previous: pair[0].sequence,
                    found: pair[1].sequence,
                });
            }
        }
        Ok(Self { records })
    }
}
