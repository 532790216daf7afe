use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::PaymentId;

/// all events that can be emitted by the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaymentEvent {
    // form events
    DraftPrepared {
        school_id: String,
        purpose_id: String,
        amount: Money,
        scheduled_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    DraftRejected {
        field_errors: usize,
        timestamp: DateTime<Utc>,
    },

    // submission events
    PaymentSubmitted {
        payment_id: PaymentId,
        amount: Money,
        reference: String,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    SubmissionFailed {
        amount: Money,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // history events
    PaymentScheduled {
        payment_id: PaymentId,
        scheduled_at: DateTime<Utc>,
        is_recurring: bool,
    },
    PaymentEdited {
        payment_id: PaymentId,
        old_amount: Money,
        new_amount: Money,
        scheduled_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    EditIgnored {
        payment_id: PaymentId,
        timestamp: DateTime<Utc>,
    },
    PaymentCancelled {
        payment_id: PaymentId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    PaymentSettled {
        payment_id: PaymentId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    RecurrenceScheduled {
        previous_id: PaymentId,
        payment_id: PaymentId,
        scheduled_at: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<PaymentEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: PaymentEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<PaymentEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[PaymentEvent] {
        &self.events
    }
}
