use hourglass_rs::SafeTimeProvider;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::PaymentsConfig;
use crate::errors::{PaymentError, Result};
use crate::events::{EventStore, PaymentEvent};
use crate::gateway::{PaymentGateway, SubmissionRequest};
use crate::payments::draft;
use crate::payments::history::Settlement;
use crate::payments::{
    ConfirmationParams, ConfirmationSummary, EditForm, FormSchema, PaymentForm, PaymentHistory,
};
use crate::types::{PaymentDraft, PaymentHistoryItem, PaymentId, StatusFilter};

/// owns the payment history for one session and drives the
/// form -> draft -> confirmation -> history flow
pub struct PaymentScheduler<G: PaymentGateway> {
    config: PaymentsConfig,
    history: PaymentHistory,
    events: EventStore,
    gateway: G,
}

impl<G: PaymentGateway> PaymentScheduler<G> {
    pub fn new(config: PaymentsConfig, gateway: G) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            history: PaymentHistory::new(),
            events: EventStore::new(),
            gateway,
        })
    }

    pub fn config(&self) -> &PaymentsConfig {
        &self.config
    }

    /// blank payment form scheduled for the current time
    pub fn new_form(&self, time_provider: &SafeTimeProvider) -> PaymentForm {
        PaymentForm::new(time_provider.now())
    }

    /// validate a submitted form and build its draft
    pub fn prepare(&mut self, form: &PaymentForm, time_provider: &SafeTimeProvider) -> Result<PaymentDraft> {
        let now = time_provider.now();
        let schema = FormSchema::from_config(&self.config)?;

        match draft::build(form, &schema, now) {
            Ok(draft) => {
                debug!(
                    school = %draft.school_name,
                    purpose = %draft.purpose_name,
                    amount = %draft.formatted_amount,
                    "draft prepared"
                );
                self.events.emit(PaymentEvent::DraftPrepared {
                    school_id: draft.school_id.clone(),
                    purpose_id: draft.purpose_id.clone(),
                    amount: draft.amount(),
                    scheduled_at: draft.scheduled_at,
                    timestamp: now,
                });
                Ok(draft)
            }
            Err(PaymentError::Validation(errors)) => {
                debug!(%errors, "payment form rejected");
                self.events.emit(PaymentEvent::DraftRejected {
                    field_errors: errors.len(),
                    timestamp: now,
                });
                Err(PaymentError::Validation(errors))
            }
            Err(err) => Err(err),
        }
    }

    /// parameters handed to the confirmation step
    pub fn confirmation(&self, draft: &PaymentDraft) -> ConfirmationParams {
        ConfirmationParams::from_draft(draft)
    }

    pub fn summary(&self, draft: &PaymentDraft) -> Result<ConfirmationSummary> {
        ConfirmationSummary::from_draft(draft, &self.config)
    }

    /// submit a confirmed payment and record it as upcoming
    ///
    /// The draft is re-checked against the catalog and the clock before it
    /// reaches the gateway. A failed submission is logged and returned; the
    /// history is only touched once the gateway has accepted the payment.
    pub fn confirm(
        &mut self,
        params: &ConfirmationParams,
        virtual_account_number: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentHistoryItem> {
        let draft = params.to_draft()?;
        let schema = FormSchema::from_config(&self.config)?;
        if let Err(err) = draft::verify(&draft, &schema, time_provider.now()) {
            warn!(error = %err, "confirmation rejected before submission");
            return Err(err);
        }

        let amount = draft.amount();
        let request = SubmissionRequest {
            amount,
            virtual_account_number: virtual_account_number.to_string(),
        };

        let receipt = match self.gateway.submit(&request) {
            Ok(receipt) => receipt,
            Err(err) => {
                error!(%amount, error = %err, "payment submission failed");
                self.events.emit(PaymentEvent::SubmissionFailed {
                    amount,
                    reason: err.to_string(),
                    timestamp: time_provider.now(),
                });
                return Err(PaymentError::SubmissionFailed {
                    amount,
                    message: err.to_string(),
                });
            }
        };

        let item = PaymentHistoryItem::from_draft(Uuid::new_v4(), &draft);
        self.history.add(item.clone())?;

        info!(
            payment_id = %item.id,
            reference = %receipt.reference,
            amount = %item.formatted_amount,
            "payment scheduled"
        );
        self.events.emit(PaymentEvent::PaymentSubmitted {
            payment_id: item.id,
            amount,
            reference: receipt.reference,
            new_balance: receipt.new_balance,
            timestamp: time_provider.now(),
        });
        self.events.emit(PaymentEvent::PaymentScheduled {
            payment_id: item.id,
            scheduled_at: item.scheduled_at,
            is_recurring: item.is_recurring,
        });

        Ok(item)
    }

    /// edit an upcoming payment
    ///
    /// Invalid edits surface as validation errors. Edits aimed at a
    /// completed or unknown payment are ignored and yield `Ok(false)`.
    pub fn edit(&mut self, id: PaymentId, edit: &EditForm, time_provider: &SafeTimeProvider) -> Result<bool> {
        let now = time_provider.now();
        let schema = FormSchema::from_config(&self.config)?;
        let patch = schema
            .validate_edit(edit, now)
            .map_err(PaymentError::Validation)?;

        let old_amount = self.history.get(id).map(|item| item.amount());
        let applied = self.history.edit(id, &patch);

        match (applied, old_amount, self.history.get(id)) {
            (true, Some(old_amount), Some(item)) => {
                self.events.emit(PaymentEvent::PaymentEdited {
                    payment_id: id,
                    old_amount,
                    new_amount: item.amount(),
                    scheduled_at: item.scheduled_at,
                    timestamp: now,
                });
            }
            _ => {
                warn!(%id, "edit ignored, payment is not upcoming");
                self.events.emit(PaymentEvent::EditIgnored {
                    payment_id: id,
                    timestamp: now,
                });
            }
        }

        Ok(applied)
    }

    /// cancel an upcoming payment; completed or unknown ids are ignored
    pub fn cancel(&mut self, id: PaymentId, time_provider: &SafeTimeProvider) -> Option<PaymentHistoryItem> {
        let removed = self.history.cancel(id)?;
        info!(%id, amount = %removed.formatted_amount, "payment cancelled");
        self.events.emit(PaymentEvent::PaymentCancelled {
            payment_id: id,
            amount: removed.amount(),
            timestamp: time_provider.now(),
        });
        Some(removed)
    }

    /// settlement hook for an external settlement notice
    pub fn settle(&mut self, id: PaymentId, time_provider: &SafeTimeProvider) -> Option<Settlement> {
        let settlement = self.history.settle(id, Uuid::new_v4())?;
        info!(%id, "payment settled");
        self.events.emit(PaymentEvent::PaymentSettled {
            payment_id: id,
            amount: settlement.settled.amount(),
            timestamp: time_provider.now(),
        });

        if let Some(next) = &settlement.next {
            info!(%id, next_id = %next.id, scheduled_at = %next.scheduled_at, "next occurrence scheduled");
            self.events.emit(PaymentEvent::RecurrenceScheduled {
                previous_id: id,
                payment_id: next.id,
                scheduled_at: next.scheduled_at,
            });
        }

        Some(settlement)
    }

    pub fn history(&self) -> &PaymentHistory {
        &self.history
    }

    pub fn filter(&self, filter: StatusFilter) -> Vec<&PaymentHistoryItem> {
        self.history.filter(filter)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn events(&self) -> &[PaymentEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<PaymentEvent> {
        self.events.take_events()
    }
}
