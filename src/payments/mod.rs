pub mod confirmation;
pub mod draft;
pub mod history;
pub mod validation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;

pub use confirmation::{ConfirmationParams, ConfirmationSummary};
pub use history::PaymentHistory;
pub use validation::{FormField, FormSchema, ValidationErrors};

/// payment form as the user filled it in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    pub school_id: String,
    pub purpose_id: String,
    /// amount exactly as displayed in the field, separators included
    pub amount: String,
    pub is_recurring: bool,
    pub account_name: String,
    pub account_number: String,
    pub scheduled_at: DateTime<Utc>,
}

impl PaymentForm {
    /// blank form scheduled for `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            school_id: String::new(),
            purpose_id: String::new(),
            amount: String::new(),
            is_recurring: false,
            account_name: String::new(),
            account_number: String::new(),
            scheduled_at: now,
        }
    }

    pub fn school(mut self, id: &str) -> Self {
        self.school_id = id.to_string();
        self
    }

    pub fn purpose(mut self, id: &str) -> Self {
        self.purpose_id = id.to_string();
        self
    }

    /// set the amount field, formatting it the way the input does
    pub fn amount(mut self, raw: &str) -> Self {
        self.amount = crate::amount::format(raw);
        self
    }

    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = is_recurring;
        self
    }

    pub fn account(mut self, name: &str, number: &str) -> Self {
        self.account_name = name.to_string();
        self.account_number = number.to_string();
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = at;
        self
    }
}

/// edit form for an upcoming payment, `None` leaves a field as is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EditForm {
    pub purpose_id: Option<String>,
    pub amount: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// resolved changes applied to a history item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PaymentPatch {
    pub purpose_name: Option<String>,
    pub amount: Option<Money>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl PaymentPatch {
    pub fn is_empty(&self) -> bool {
        self.purpose_name.is_none() && self.amount.is_none() && self.scheduled_at.is_none()
    }
}
