use chrono::{DateTime, Utc};

use crate::amount;
use crate::errors::{PaymentError, Result};
use crate::types::{ExternalAccount, PaymentDraft};

use super::validation::{FormSchema, ValidationErrors};
use super::PaymentForm;

/// assemble a validated form into a payment draft
///
/// Runs the full schema first, so a draft only exists for a form that
/// passed every rule. Inputs are borrowed and never modified.
pub fn build(form: &PaymentForm, schema: &FormSchema<'_>, now: DateTime<Utc>) -> Result<PaymentDraft> {
    let errors = schema.validate(form, now);
    if !errors.is_empty() {
        return Err(PaymentError::Validation(errors));
    }

    let reference = schema.reference();
    let school = reference
        .find_school(&form.school_id)
        .ok_or_else(|| PaymentError::SchoolNotFound {
            id: form.school_id.clone(),
        })?;
    let purpose = reference
        .find_purpose(&form.purpose_id)
        .ok_or_else(|| PaymentError::PurposeNotFound {
            id: form.purpose_id.clone(),
        })?;

    let raw = amount::parse(&form.amount);
    let amount_minor = amount::parse_money(&raw)
        .and_then(|m| m.to_minor())
        .filter(|minor| *minor > 0)
        .ok_or_else(|| PaymentError::InvalidAmount {
            amount: form.amount.clone(),
        })?;

    // bank details only travel with schools lacking a collection account
    let external_account = if school.is_merchant {
        None
    } else {
        Some(ExternalAccount {
            name: form.account_name.trim().to_string(),
            number: form.account_number.trim().to_string(),
        })
    };

    let draft = PaymentDraft {
        school_id: school.id.clone(),
        school_name: school.name.clone(),
        is_merchant: school.is_merchant,
        purpose_id: purpose.id.clone(),
        purpose_name: purpose.name.clone(),
        amount_minor,
        formatted_amount: amount::format(&raw),
        is_recurring: form.is_recurring,
        external_account,
        scheduled_at: form.scheduled_at,
    };

    check_invariants(&draft)?;
    Ok(draft)
}

/// re-check a draft that arrived from outside against the catalog and clock
///
/// School and purpose must still exist, the merchant flag must match the
/// school, and the payment date must not be in the past.
pub fn verify(draft: &PaymentDraft, schema: &FormSchema<'_>, now: DateTime<Utc>) -> Result<()> {
    check_invariants(draft)?;

    let reference = schema.reference();
    let school = reference
        .find_school(&draft.school_id)
        .ok_or_else(|| PaymentError::SchoolNotFound {
            id: draft.school_id.clone(),
        })?;
    if reference.find_purpose(&draft.purpose_id).is_none() {
        return Err(PaymentError::PurposeNotFound {
            id: draft.purpose_id.clone(),
        });
    }
    if school.is_merchant != draft.is_merchant {
        return Err(PaymentError::InvalidDraft {
            message: format!("merchant flag does not match school {}", school.id),
        });
    }

    let mut errors = ValidationErrors::new();
    schema.check_schedule(draft.scheduled_at, now, &mut errors);
    if !errors.is_empty() {
        return Err(PaymentError::Validation(errors));
    }
    Ok(())
}

/// positive amount, and bank details present exactly for non-merchants
pub fn check_invariants(draft: &PaymentDraft) -> Result<()> {
    if draft.amount_minor <= 0 {
        return Err(PaymentError::InvalidDraft {
            message: format!("amount must be positive, got {} minor units", draft.amount_minor),
        });
    }

    match (&draft.external_account, draft.is_merchant) {
        (Some(_), true) => Err(PaymentError::InvalidDraft {
            message: format!("merchant school {} cannot carry bank details", draft.school_id),
        }),
        (None, false) => Err(PaymentError::InvalidDraft {
            message: format!("school {} requires bank details", draft.school_id),
        }),
        (Some(account), false) if account.name.is_empty() || account.number.is_empty() => {
            Err(PaymentError::InvalidDraft {
                message: format!("incomplete bank details for school {}", draft.school_id),
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaymentsConfig;
    use crate::payments::FormField;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_build_merchant_draft() {
        let config = PaymentsConfig::for_testing();
        let schema = FormSchema::from_config(&config).unwrap();
        let tomorrow = now() + Duration::days(1);
        let form = PaymentForm::new(now())
            .school("1")
            .purpose("1")
            .amount("150000")
            .scheduled_at(tomorrow);

        assert_eq!(amount::parse(&form.amount), "150000");

        let draft = build(&form, &schema, now()).unwrap();
        assert_eq!(draft.school_name, "State University");
        assert_eq!(draft.purpose_name, "Tuition Fees");
        assert_eq!(draft.amount_minor, 15_000_000);
        assert_eq!(draft.formatted_amount, "150,000");
        assert!(draft.is_merchant);
        assert!(draft.external_account.is_none());
        assert!(!draft.is_recurring);
        assert_eq!(draft.scheduled_at, tomorrow);
    }

    #[test]
    fn test_build_non_merchant_draft() {
        let config = PaymentsConfig::for_testing();
        let schema = FormSchema::from_config(&config).unwrap();
        let form = PaymentForm::new(now())
            .school("3")
            .purpose("4")
            .amount("25000.5")
            .recurring(true)
            .account("  Technical Institute Bursary ", "0123456789");

        let draft = build(&form, &schema, now()).unwrap();
        let account = draft.external_account.as_ref().unwrap();
        assert_eq!(account.name, "Technical Institute Bursary");
        assert_eq!(account.number, "0123456789");
        assert_eq!(draft.amount_minor, 2_500_050);
        assert_eq!(draft.formatted_amount, "25,000.50");
        assert!(draft.is_recurring);
    }

    #[test]
    fn test_merchant_drops_stray_account_fields() {
        let config = PaymentsConfig::for_testing();
        let schema = FormSchema::from_config(&config).unwrap();
        let form = PaymentForm::new(now())
            .school("5")
            .purpose("1")
            .amount("1000")
            .account("Leftover", "0000000000");

        let draft = build(&form, &schema, now()).unwrap();
        assert!(draft.external_account.is_none());
    }

    #[test]
    fn test_build_reports_validation_errors() {
        let config = PaymentsConfig::for_testing();
        let schema = FormSchema::from_config(&config).unwrap();
        let form = PaymentForm::new(now())
            .school("3")
            .purpose("1")
            .amount("150000");

        match build(&form, &schema, now()) {
            Err(PaymentError::Validation(errors)) => {
                assert_eq!(errors.fields(), vec![FormField::AccountName, FormField::AccountNumber]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_leaves_inputs_untouched() {
        let config = PaymentsConfig::for_testing();
        let schema = FormSchema::from_config(&config).unwrap();
        let form = PaymentForm::new(now()).school("2").purpose("3").amount("7,500");
        let before = form.clone();

        let first = build(&form, &schema, now()).unwrap();
        let second = build(&form, &schema, now()).unwrap();

        assert_eq!(form, before);
        assert_eq!(first, second);
        assert_eq!(config.reference, crate::config::stock_catalog());
    }

    #[test]
    fn test_invariants() {
        let config = PaymentsConfig::for_testing();
        let schema = FormSchema::from_config(&config).unwrap();
        let form = PaymentForm::new(now()).school("1").purpose("1").amount("10");
        let mut draft = build(&form, &schema, now()).unwrap();

        draft.amount_minor = 0;
        assert!(check_invariants(&draft).is_err());

        draft.amount_minor = 1_000;
        draft.external_account = Some(ExternalAccount {
            name: "x".to_string(),
            number: "0123456789".to_string(),
        });
        assert!(check_invariants(&draft).is_err());

        draft.is_merchant = false;
        assert!(check_invariants(&draft).is_ok());
    }

    #[test]
    fn test_verify_against_catalog_and_clock() {
        let config = PaymentsConfig::for_testing();
        let schema = FormSchema::from_config(&config).unwrap();
        let form = PaymentForm::new(now()).school("1").purpose("1").amount("10");
        let draft = build(&form, &schema, now()).unwrap();
        assert!(verify(&draft, &schema, now()).is_ok());

        let mut unknown = draft.clone();
        unknown.school_id = "99".to_string();
        assert_eq!(
            verify(&unknown, &schema, now()),
            Err(PaymentError::SchoolNotFound { id: "99".to_string() })
        );

        let mut unknown = draft.clone();
        unknown.purpose_id = "42".to_string();
        assert!(matches!(
            verify(&unknown, &schema, now()),
            Err(PaymentError::PurposeNotFound { .. })
        ));

        // school 3 has no collection account
        let mut mismatched = draft.clone();
        mismatched.school_id = "3".to_string();
        assert!(matches!(
            verify(&mismatched, &schema, now()),
            Err(PaymentError::InvalidDraft { .. })
        ));

        match verify(&draft, &schema, now() + Duration::days(3)) {
            Err(PaymentError::Validation(errors)) => {
                assert_eq!(errors.fields(), vec![FormField::ScheduledAt]);
            }
            other => panic!("expected a past-date error, got {:?}", other),
        }
    }
}
