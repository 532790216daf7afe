//! handoff between the payment form and the confirmation step
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::amount;
use crate::config::PaymentsConfig;
use crate::decimal::Money;
use crate::display;
use crate::errors::{PaymentError, Result};
use crate::types::{ExternalAccount, PaymentDraft};

use super::draft::check_invariants;

/// parameter keys carried across the screen boundary
pub mod keys {
    pub const SCHOOL_ID: &str = "schoolId";
    pub const SCHOOL_NAME: &str = "schoolName";
    pub const IS_MERCHANT: &str = "isMerchant";
    pub const PAYMENT_PURPOSE: &str = "paymentPurpose";
    pub const PURPOSE_NAME: &str = "purposeName";
    pub const AMOUNT: &str = "amount";
    pub const FORMATTED_AMOUNT: &str = "formattedAmount";
    pub const IS_RECURRING: &str = "isRecurring";
    pub const ACCOUNT_NAME: &str = "accountName";
    pub const ACCOUNT_NUMBER: &str = "accountNumber";
    pub const PAYMENT_DATE_TIME: &str = "paymentDateTime";
}

/// recurring payment notice shown before confirming
pub const RECURRING_NOTICE: &str =
    "This payment will be automatically processed on the same date each month until you cancel.";

pub fn encode_bool(value: bool) -> String {
    let text = if value { "true" } else { "false" };
    text.to_string()
}

pub fn decode_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(PaymentError::InvalidParameter {
            key: key.to_string(),
            message: format!("expected \"true\" or \"false\", got {:?}", other),
        }),
    }
}

/// iso-8601 with millisecond precision, utc designator `Z`
pub fn encode_datetime(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_datetime(key: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| PaymentError::InvalidParameter {
            key: key.to_string(),
            message: e.to_string(),
        })
}

/// raw numeric string without trailing zeros, e.g. "150000" or "25000.5"
pub fn encode_amount(amount: Money) -> String {
    amount.as_decimal().normalize().to_string()
}

pub fn decode_amount(key: &str, value: &str) -> Result<i64> {
    amount::parse_money(value)
        .and_then(|m| m.to_minor())
        .filter(|minor| *minor > 0)
        .ok_or_else(|| PaymentError::InvalidParameter {
            key: key.to_string(),
            message: format!("not a positive amount: {:?}", value),
        })
}

/// flat string parameters describing a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationParams {
    pub school_id: String,
    pub school_name: String,
    pub is_merchant: String,
    pub payment_purpose: String,
    pub purpose_name: String,
    pub amount: String,
    pub formatted_amount: String,
    pub is_recurring: String,
    pub account_name: String,
    pub account_number: String,
    pub payment_date_time: String,
}

impl ConfirmationParams {
    pub fn from_draft(draft: &PaymentDraft) -> Self {
        let (account_name, account_number) = match &draft.external_account {
            Some(account) => (account.name.clone(), account.number.clone()),
            None => (String::new(), String::new()),
        };

        Self {
            school_id: draft.school_id.clone(),
            school_name: draft.school_name.clone(),
            is_merchant: encode_bool(draft.is_merchant),
            payment_purpose: draft.purpose_id.clone(),
            purpose_name: draft.purpose_name.clone(),
            amount: encode_amount(draft.amount()),
            formatted_amount: draft.formatted_amount.clone(),
            is_recurring: encode_bool(draft.is_recurring),
            account_name,
            account_number,
            payment_date_time: encode_datetime(draft.scheduled_at),
        }
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        [
            (keys::SCHOOL_ID, &self.school_id),
            (keys::SCHOOL_NAME, &self.school_name),
            (keys::IS_MERCHANT, &self.is_merchant),
            (keys::PAYMENT_PURPOSE, &self.payment_purpose),
            (keys::PURPOSE_NAME, &self.purpose_name),
            (keys::AMOUNT, &self.amount),
            (keys::FORMATTED_AMOUNT, &self.formatted_amount),
            (keys::IS_RECURRING, &self.is_recurring),
            (keys::ACCOUNT_NAME, &self.account_name),
            (keys::ACCOUNT_NUMBER, &self.account_number),
            (keys::PAYMENT_DATE_TIME, &self.payment_date_time),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }

    /// read parameters back; account fields and the display amount may be absent
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
        let required = |key: &str| {
            map.get(key)
                .cloned()
                .ok_or_else(|| PaymentError::MissingParameter {
                    key: key.to_string(),
                })
        };
        let optional = |key: &str| map.get(key).cloned().unwrap_or_default();

        let amount = required(keys::AMOUNT)?;
        let formatted_amount = match map.get(keys::FORMATTED_AMOUNT) {
            Some(formatted) if !formatted.is_empty() => formatted.clone(),
            _ => amount::format(&amount),
        };

        Ok(Self {
            school_id: required(keys::SCHOOL_ID)?,
            school_name: required(keys::SCHOOL_NAME)?,
            is_merchant: required(keys::IS_MERCHANT)?,
            payment_purpose: required(keys::PAYMENT_PURPOSE)?,
            purpose_name: required(keys::PURPOSE_NAME)?,
            amount,
            formatted_amount,
            is_recurring: required(keys::IS_RECURRING)?,
            account_name: optional(keys::ACCOUNT_NAME),
            account_number: optional(keys::ACCOUNT_NUMBER),
            payment_date_time: required(keys::PAYMENT_DATE_TIME)?,
        })
    }

    /// decode the typed draft the parameters describe
    pub fn to_draft(&self) -> Result<PaymentDraft> {
        let is_merchant = decode_bool(keys::IS_MERCHANT, &self.is_merchant)?;
        let is_recurring = decode_bool(keys::IS_RECURRING, &self.is_recurring)?;
        let amount_minor = decode_amount(keys::AMOUNT, &self.amount)?;
        let scheduled_at = decode_datetime(keys::PAYMENT_DATE_TIME, &self.payment_date_time)?;

        let external_account = if is_merchant {
            None
        } else {
            Some(ExternalAccount {
                name: self.account_name.clone(),
                number: self.account_number.clone(),
            })
        };

        let draft = PaymentDraft {
            school_id: self.school_id.clone(),
            school_name: self.school_name.clone(),
            is_merchant,
            purpose_id: self.payment_purpose.clone(),
            purpose_name: self.purpose_name.clone(),
            amount_minor,
            formatted_amount: self.formatted_amount.clone(),
            is_recurring,
            external_account,
            scheduled_at,
        };
        check_invariants(&draft)?;
        Ok(draft)
    }
}

/// bank details section of the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub name: String,
    pub number: String,
}

/// serializable view of what the user is about to confirm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationSummary {
    pub school_name: String,
    pub purpose_name: String,
    pub amount: String,
    pub processing_fee: String,
    pub total: String,
    pub payment_date: String,
    pub payment_time: String,
    pub payment_type: String,
    pub recurring_notice: Option<String>,
    pub account: Option<AccountView>,
}

impl ConfirmationSummary {
    pub fn from_draft(draft: &PaymentDraft, config: &PaymentsConfig) -> Result<Self> {
        let offset = config.display_offset()?;
        let symbol = config.currency.symbol.as_str();
        let total = draft.amount() + config.processing_fee;

        Ok(Self {
            school_name: draft.school_name.clone(),
            purpose_name: draft.purpose_name.clone(),
            amount: display::with_currency(symbol, &draft.formatted_amount),
            processing_fee: display::with_currency(symbol, &config.processing_fee.formatted_fixed()),
            total: display::with_currency(symbol, &total.formatted()),
            payment_date: display::format_date(draft.scheduled_at, offset),
            payment_time: display::format_time(draft.scheduled_at, offset),
            payment_type: display::payment_type_label(draft.is_recurring).to_string(),
            recurring_notice: draft.is_recurring.then(|| RECURRING_NOTICE.to_string()),
            account: draft.external_account.as_ref().map(|account| AccountView {
                name: account.name.clone(),
                number: account.number.clone(),
            }),
        })
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
