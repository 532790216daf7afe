use std::collections::HashSet;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{PaymentError, Result};
use crate::types::{PaymentPurpose, ReferenceData, School};

/// payments configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentsConfig {
    pub currency: CurrencyConfig,
    /// offset used for date checks and display, in minutes east of utc
    pub display_offset_minutes: i32,
    pub processing_fee: Money,
    /// digits in an external bank account number
    pub account_number_length: usize,
    /// fixed delay of the stub submission call
    pub submission_delay_ms: u64,
    pub reference: ReferenceData,
}

/// currency shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    pub code: String,
    pub symbol: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyConfig {
                code: "NGN".to_string(),
                symbol: "₦".to_string(),
            },
            display_offset_minutes: 60,
            processing_fee: Money::ZERO,
            account_number_length: 10,
            submission_delay_ms: 1500,
            reference: stock_catalog(),
        }
    }
}

impl PaymentsConfig {
    /// stock configuration without the simulated network delay
    pub fn for_testing() -> Self {
        Self {
            submission_delay_ms: 0,
            ..Self::default()
        }
    }

    /// load configuration from a json document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PaymentsConfig =
            serde_json::from_str(json).map_err(|e| PaymentError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PaymentError::InvalidConfiguration {
            message: e.to_string(),
        })
    }

    /// display offset as a chrono offset
    pub fn display_offset(&self) -> Result<FixedOffset> {
        self.display_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| PaymentError::InvalidConfiguration {
                message: format!("display offset out of range: {} minutes", self.display_offset_minutes),
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.currency.symbol.trim().is_empty() {
            return Err(PaymentError::InvalidConfiguration {
                message: "currency symbol is empty".to_string(),
            });
        }

        if self.account_number_length == 0 {
            return Err(PaymentError::InvalidConfiguration {
                message: "account number length must be positive".to_string(),
            });
        }

        if self.processing_fee.is_negative() {
            return Err(PaymentError::InvalidConfiguration {
                message: format!("negative processing fee: {}", self.processing_fee),
            });
        }

        self.display_offset()?;

        if self.reference.schools.is_empty() || self.reference.purposes.is_empty() {
            return Err(PaymentError::InvalidConfiguration {
                message: "reference data needs at least one school and one purpose".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for school in &self.reference.schools {
            if !seen.insert(school.id.as_str()) {
                return Err(PaymentError::InvalidConfiguration {
                    message: format!("duplicate school id: {}", school.id),
                });
            }
        }

        let mut seen = HashSet::new();
        for purpose in &self.reference.purposes {
            if !seen.insert(purpose.id.as_str()) {
                return Err(PaymentError::InvalidConfiguration {
                    message: format!("duplicate purpose id: {}", purpose.id),
                });
            }
        }

        Ok(())
    }
}

/// schools and purposes shipped with the app
pub fn stock_catalog() -> ReferenceData {
    ReferenceData {
        schools: vec![
            School::new("1", "State University", true),
            School::new("2", "City College", true),
            School::new("3", "Technical Institute", false),
            School::new("4", "Community College", false),
            School::new("5", "Private Academy", true),
        ],
        purposes: vec![
            PaymentPurpose::new("1", "Tuition Fees"),
            PaymentPurpose::new("2", "Accommodation"),
            PaymentPurpose::new("3", "Books & Materials"),
            PaymentPurpose::new("4", "Examination Fees"),
            PaymentPurpose::new("5", "Other"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PaymentsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reference.schools.len(), 5);
        assert_eq!(config.display_offset().unwrap().local_minus_utc(), 3600);
    }

    #[test]
    fn test_json_round_trip() {
        let config = PaymentsConfig::for_testing();
        let json = config.to_json_pretty().unwrap();
        let loaded = PaymentsConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.submission_delay_ms, 0);
    }

    #[test]
    fn test_rejects_duplicate_school_ids() {
        let mut config = PaymentsConfig::default();
        config.reference.schools.push(School::new("1", "Shadow University", false));
        assert!(matches!(
            config.validate(),
            Err(PaymentError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_catalog_and_bad_offset() {
        let mut config = PaymentsConfig::default();
        config.reference.purposes.clear();
        assert!(config.validate().is_err());

        let mut config = PaymentsConfig::default();
        config.display_offset_minutes = 24 * 60;
        assert!(config.validate().is_err());

        config.display_offset_minutes = i32::MAX;
        assert!(matches!(
            config.display_offset(),
            Err(PaymentError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            PaymentsConfig::from_json("{ not json"),
            Err(PaymentError::InvalidConfiguration { .. })
        ));
    }
}
