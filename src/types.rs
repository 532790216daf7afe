use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a scheduled payment
pub type PaymentId = Uuid;

/// school that fees can be paid to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    pub name: String,
    /// has a registered collection account, so no bank details are needed
    pub is_merchant: bool,
}

impl School {
    pub fn new(id: &str, name: &str, is_merchant: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            is_merchant,
        }
    }
}

/// what a payment is for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPurpose {
    pub id: String,
    pub name: String,
}

impl PaymentPurpose {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// static catalog the payment form selects from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReferenceData {
    pub schools: Vec<School>,
    pub purposes: Vec<PaymentPurpose>,
}

impl ReferenceData {
    pub fn find_school(&self, id: &str) -> Option<&School> {
        self.schools.iter().find(|s| s.id == id)
    }

    pub fn find_purpose(&self, id: &str) -> Option<&PaymentPurpose> {
        self.purposes.iter().find(|p| p.id == id)
    }
}

/// bank details for schools without a collection account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAccount {
    pub name: String,
    pub number: String,
}

/// validated payment request that has not been submitted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub school_id: String,
    pub school_name: String,
    pub is_merchant: bool,
    pub purpose_id: String,
    pub purpose_name: String,
    pub amount_minor: i64,
    pub formatted_amount: String,
    pub is_recurring: bool,
    /// present exactly when `is_merchant` is false
    pub external_account: Option<ExternalAccount>,
    pub scheduled_at: DateTime<Utc>,
}

impl PaymentDraft {
    pub fn amount(&self) -> Money {
        Money::from_minor(self.amount_minor)
    }
}

/// lifecycle of a scheduled payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// scheduled, still editable and cancellable
    Upcoming,
    /// settled, immutable
    Completed,
}

/// history view selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Upcoming,
}

impl StatusFilter {
    pub fn matches(&self, status: PaymentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => status == PaymentStatus::Completed,
            StatusFilter::Upcoming => status == PaymentStatus::Upcoming,
        }
    }
}

/// entry in the payment history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHistoryItem {
    pub id: PaymentId,
    pub school_name: String,
    pub purpose_name: String,
    pub amount_minor: i64,
    pub formatted_amount: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: PaymentStatus,
    pub is_recurring: bool,
}

impl PaymentHistoryItem {
    /// upcoming entry for a submitted draft
    pub fn from_draft(id: PaymentId, draft: &PaymentDraft) -> Self {
        Self {
            id,
            school_name: draft.school_name.clone(),
            purpose_name: draft.purpose_name.clone(),
            amount_minor: draft.amount_minor,
            formatted_amount: draft.formatted_amount.clone(),
            scheduled_at: draft.scheduled_at,
            status: PaymentStatus::Upcoming,
            is_recurring: draft.is_recurring,
        }
    }

    pub fn amount(&self) -> Money {
        Money::from_minor(self.amount_minor)
    }

    pub fn is_upcoming(&self) -> bool {
        self.status == PaymentStatus::Upcoming
    }
}
