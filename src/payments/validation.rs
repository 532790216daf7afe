//! Declarative rules for the payment and edit forms.
//!
//! Validation is a pure check of the current form state: it never touches
//! the history and reports every failing field at once, keyed by the same
//! field names the confirmation boundary uses.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::amount;
use crate::config::PaymentsConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{PaymentPurpose, ReferenceData, School};

use super::{EditForm, PaymentForm, PaymentPatch};

/// form fields that can carry an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormField {
    #[serde(rename = "schoolId")]
    School,
    #[serde(rename = "purposeId")]
    Purpose,
    #[serde(rename = "amount")]
    Amount,
    #[serde(rename = "accountName")]
    AccountName,
    #[serde(rename = "accountNumber")]
    AccountNumber,
    #[serde(rename = "scheduledAt")]
    ScheduledAt,
}

impl FormField {
    /// field name as used across the screen boundary
    pub fn name(&self) -> &'static str {
        match self {
            FormField::School => "schoolId",
            FormField::Purpose => "purposeId",
            FormField::Amount => "amount",
            FormField::AccountName => "accountName",
            FormField::AccountNumber => "accountNumber",
            FormField::ScheduledAt => "scheduledAt",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// field errors from one validation pass; empty means valid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidationErrors {
    errors: BTreeMap<FormField, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// record an error, keeping the first message for a field
    pub fn add(&mut self, field: FormField, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> Vec<FormField> {
        self.errors.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// validation rules bound to a catalog and a local calendar
#[derive(Debug, Clone)]
pub struct FormSchema<'a> {
    reference: &'a ReferenceData,
    offset: FixedOffset,
    account_number_length: usize,
}

impl<'a> FormSchema<'a> {
    pub fn new(reference: &'a ReferenceData, offset: FixedOffset, account_number_length: usize) -> Self {
        Self {
            reference,
            offset,
            account_number_length,
        }
    }

    pub fn from_config(config: &'a PaymentsConfig) -> Result<Self> {
        Ok(Self::new(
            &config.reference,
            config.display_offset()?,
            config.account_number_length,
        ))
    }

    pub fn reference(&self) -> &'a ReferenceData {
        self.reference
    }

    /// check a submitted payment form against every rule
    pub fn validate(&self, form: &PaymentForm, now: DateTime<Utc>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let school = self.check_school(&form.school_id, &mut errors);
        self.check_purpose(&form.purpose_id, &mut errors);
        check_amount(&form.amount, &mut errors);

        if let Some(school) = school {
            if !school.is_merchant {
                self.check_account(&form.account_name, &form.account_number, &mut errors);
            }
        }

        self.check_schedule(form.scheduled_at, now, &mut errors);

        errors
    }

    /// check an edit of an upcoming payment and resolve it into a patch
    pub fn validate_edit(
        &self,
        edit: &EditForm,
        now: DateTime<Utc>,
    ) -> std::result::Result<PaymentPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut patch = PaymentPatch::default();

        if let Some(purpose_id) = &edit.purpose_id {
            patch.purpose_name = self
                .check_purpose(purpose_id, &mut errors)
                .map(|p| p.name.clone());
        }

        if let Some(amount) = &edit.amount {
            patch.amount = check_amount(amount, &mut errors);
        }

        if let Some(at) = edit.scheduled_at {
            self.check_schedule(at, now, &mut errors);
            patch.scheduled_at = Some(at);
        }

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }

    fn check_school(&self, id: &str, errors: &mut ValidationErrors) -> Option<&'a School> {
        if id.trim().is_empty() {
            errors.add(FormField::School, "Please select a school");
            return None;
        }
        let reference: &'a ReferenceData = self.reference;
        let school = reference.find_school(id);
        if school.is_none() {
            errors.add(FormField::School, "Selected school does not exist");
        }
        school
    }

    fn check_purpose(
        &self,
        id: &str,
        errors: &mut ValidationErrors,
    ) -> Option<&'a PaymentPurpose> {
        if id.trim().is_empty() {
            errors.add(FormField::Purpose, "Please select a payment purpose");
            return None;
        }
        let reference: &'a ReferenceData = self.reference;
        let purpose = reference.find_purpose(id);
        if purpose.is_none() {
            errors.add(FormField::Purpose, "Selected payment purpose does not exist");
        }
        purpose
    }

    fn check_account(&self, name: &str, number: &str, errors: &mut ValidationErrors) {
        if name.trim().is_empty() {
            errors.add(
                FormField::AccountName,
                "Account name is required for schools without a collection account",
            );
        }

        let number = number.trim();
        if number.is_empty() {
            errors.add(
                FormField::AccountNumber,
                "Account number is required for schools without a collection account",
            );
        } else if number.len() != self.account_number_length
            || !number.chars().all(|c| c.is_ascii_digit())
        {
            errors.add(
                FormField::AccountNumber,
                format!("Account number must be {} digits", self.account_number_length),
            );
        }
    }

    pub(super) fn check_schedule(&self, at: DateTime<Utc>, now: DateTime<Utc>, errors: &mut ValidationErrors) {
        let day = at.with_timezone(&self.offset).date_naive();
        let today = now.with_timezone(&self.offset).date_naive();
        if day < today {
            errors.add(FormField::ScheduledAt, "Payment date cannot be in the past");
        }
    }
}

/// positive amount that fits in minor units
fn check_amount(display: &str, errors: &mut ValidationErrors) -> Option<Money> {
    if display.trim().is_empty() {
        errors.add(FormField::Amount, "Please enter an amount");
        return None;
    }

    match amount::parse_money(display) {
        Some(money) if !money.is_positive() => {
            errors.add(FormField::Amount, "Amount must be greater than zero");
            None
        }
        Some(money) if money.to_minor().is_some() => Some(money),
        _ => {
            errors.add(FormField::Amount, "Please enter a valid amount");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::{SafeTimeProvider, TimeSource};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    fn schema(config: &PaymentsConfig) -> FormSchema<'_> {
        FormSchema::from_config(config).unwrap()
    }

    #[test]
    fn test_valid_merchant_form() {
        let config = PaymentsConfig::for_testing();
        let form = PaymentForm::new(now())
            .school("1")
            .purpose("1")
            .amount("150000")
            .scheduled_at(now() + Duration::days(1));

        assert!(schema(&config).validate(&form, now()).is_empty());
    }

    #[test]
    fn test_empty_school_always_errors() {
        let config = PaymentsConfig::for_testing();
        let schema = schema(&config);

        for form in [
            PaymentForm::new(now()),
            PaymentForm::new(now()).purpose("1").amount("5000"),
            PaymentForm::new(now()).school("   ").purpose("2").amount("1"),
        ] {
            let errors = schema.validate(&form, now());
            assert_eq!(errors.get(FormField::School), Some("Please select a school"));
        }
    }

    #[test]
    fn test_unknown_references() {
        let config = PaymentsConfig::for_testing();
        let form = PaymentForm::new(now()).school("99").purpose("42").amount("100");
        let errors = schema(&config).validate(&form, now());

        assert_eq!(errors.fields(), vec![FormField::School, FormField::Purpose]);
    }

    #[test]
    fn test_non_merchant_requires_both_account_fields() {
        let config = PaymentsConfig::for_testing();
        let form = PaymentForm::new(now())
            .school("3")
            .purpose("1")
            .amount("80000");

        let errors = schema(&config).validate(&form, now());
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(FormField::AccountName));
        assert!(errors.contains(FormField::AccountNumber));
    }

    #[test]
    fn test_merchant_ignores_account_fields() {
        let config = PaymentsConfig::for_testing();
        let form = PaymentForm::new(now())
            .school("2")
            .purpose("1")
            .amount("80000")
            .account("", "not-a-number");

        assert!(schema(&config).validate(&form, now()).is_empty());
    }

    #[test]
    fn test_account_number_format() {
        let config = PaymentsConfig::for_testing();
        let schema = schema(&config);
        let base = PaymentForm::new(now()).school("4").purpose("2").amount("1000");

        let errors = schema.validate(&base.clone().account("Community College", "12345"), now());
        assert_eq!(errors.get(FormField::AccountNumber), Some("Account number must be 10 digits"));

        let errors = schema.validate(&base.clone().account("Community College", "01234abcde"), now());
        assert!(errors.contains(FormField::AccountNumber));

        let errors = schema.validate(&base.account("Community College", "0123456789"), now());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_amount_rules() {
        let config = PaymentsConfig::for_testing();
        let schema = schema(&config);
        let base = PaymentForm::new(now()).school("1").purpose("1");

        let mut form = base.clone();
        form.amount = String::new();
        assert_eq!(schema.validate(&form, now()).get(FormField::Amount), Some("Please enter an amount"));

        form.amount = "abc".to_string();
        assert_eq!(schema.validate(&form, now()).get(FormField::Amount), Some("Please enter a valid amount"));

        form.amount = "0.00".to_string();
        assert_eq!(
            schema.validate(&form, now()).get(FormField::Amount),
            Some("Amount must be greater than zero")
        );

        form.amount = "0.01".to_string();
        assert!(schema.validate(&form, now()).is_empty());
    }

    #[test]
    fn test_amount_too_large_for_minor_units() {
        let config = PaymentsConfig::for_testing();
        let schema = schema(&config);
        let form = PaymentForm::new(now())
            .school("1")
            .purpose("1")
            .amount(&format!("1{}", "0".repeat(27)));

        assert_eq!(form.amount, "1,000,000,000,000,000,000,000,000,000");
        let errors = schema.validate(&form, now());
        assert_eq!(errors.fields(), vec![FormField::Amount]);
        assert_eq!(errors.get(FormField::Amount), Some("Please enter a valid amount"));

        let edit = EditForm {
            amount: Some(form.amount.clone()),
            ..EditForm::default()
        };
        assert!(schema.validate_edit(&edit, now()).is_err());
    }

    #[test]
    fn test_schedule_uses_local_date() {
        let config = PaymentsConfig::for_testing();
        let schema = schema(&config);

        // 23:30 utc on the 19th is already the 20th at +01:00
        let late = Utc.with_ymd_and_hms(2026, 10, 19, 23, 30, 0).unwrap();
        let earlier_today = Utc.with_ymd_and_hms(2026, 10, 19, 23, 5, 0).unwrap();
        let yesterday_local = Utc.with_ymd_and_hms(2026, 10, 19, 22, 0, 0).unwrap();

        let form = PaymentForm::new(late).school("1").purpose("1").amount("10");
        assert!(schema.validate(&form.clone().scheduled_at(earlier_today), late).is_empty());

        let errors = schema.validate(&form.scheduled_at(yesterday_local), late);
        assert_eq!(errors.fields(), vec![FormField::ScheduledAt]);
    }

    #[test]
    fn test_date_becomes_past_as_time_moves() {
        let config = PaymentsConfig::for_testing();
        let schema = schema(&config);
        let time = SafeTimeProvider::new(TimeSource::Test(now()));
        let control = time.test_control().unwrap();

        let form = PaymentForm::new(time.now()).school("1").purpose("1").amount("10");
        assert!(schema.validate(&form, time.now()).is_empty());

        control.advance(Duration::days(2));
        assert!(schema.validate(&form, time.now()).contains(FormField::ScheduledAt));
    }

    #[test]
    fn test_validate_edit() {
        let config = PaymentsConfig::for_testing();
        let schema = schema(&config);

        let edit = EditForm {
            purpose_id: Some("2".to_string()),
            amount: Some("45,000".to_string()),
            scheduled_at: Some(now() + Duration::days(3)),
        };
        let patch = schema.validate_edit(&edit, now()).unwrap();
        assert_eq!(patch.purpose_name.as_deref(), Some("Accommodation"));
        assert_eq!(patch.amount, Some(Money::from_major(45_000)));

        let edit = EditForm {
            purpose_id: Some("9".to_string()),
            amount: Some("0".to_string()),
            scheduled_at: Some(now() - Duration::days(3)),
        };
        let errors = schema.validate_edit(&edit, now()).unwrap_err();
        assert_eq!(
            errors.fields(),
            vec![FormField::Purpose, FormField::Amount, FormField::ScheduledAt]
        );

        assert!(schema.validate_edit(&EditForm::default(), now()).unwrap().is_empty());
    }

    #[test]
    fn test_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.add(FormField::AccountNumber, "required");
        errors.add(FormField::AccountName, "required");
        errors.add(FormField::AccountName, "ignored");
        assert_eq!(errors.to_string(), "accountName: required, accountNumber: required");
    }
}
