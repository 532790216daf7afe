use thiserror::Error;

use crate::decimal::Money;
use crate::payments::validation::ValidationErrors;
use crate::types::PaymentId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaymentError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("school not found: {id}")]
    SchoolNotFound {
        id: String,
    },

    #[error("payment purpose not found: {id}")]
    PurposeNotFound {
        id: String,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidAmount {
        amount: String,
    },

    #[error("duplicate payment id: {id}")]
    DuplicatePayment {
        id: PaymentId,
    },

    #[error("missing parameter: {key}")]
    MissingParameter {
        key: String,
    },

    #[error("invalid parameter {key}: {message}")]
    InvalidParameter {
        key: String,
        message: String,
    },

    #[error("invalid draft: {message}")]
    InvalidDraft {
        message: String,
    },

    #[error("submission of {amount} failed: {message}")]
    SubmissionFailed {
        amount: Money,
        message: String,
    },

    #[error("installment not found: {id}")]
    InstallmentNotFound {
        id: String,
    },

    #[error("installment already paid: {id}")]
    InstallmentAlreadyPaid {
        id: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, PaymentError>;
