use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::Money;
use crate::errors::{PaymentError, Result};

/// body of the payment call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub amount: Money,
    pub virtual_account_number: String,
}

/// what the backend answers with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub reference: String,
    pub new_balance: Money,
}

/// trait for submitting confirmed payments to a backend
pub trait PaymentGateway {
    fn submit(&mut self, request: &SubmissionRequest) -> Result<SubmissionReceipt>;
}

/// stand-in backend: waits a fixed delay, then always accepts
#[derive(Debug, Clone)]
pub struct StubGateway {
    balance: Money,
    delay: Duration,
    submissions: Vec<SubmissionRequest>,
}

impl StubGateway {
    pub fn new(opening_balance: Money, delay_ms: u64) -> Self {
        Self {
            balance: opening_balance,
            delay: Duration::from_millis(delay_ms),
            submissions: Vec::new(),
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn submissions(&self) -> &[SubmissionRequest] {
        &self.submissions
    }
}

impl PaymentGateway for StubGateway {
    fn submit(&mut self, request: &SubmissionRequest) -> Result<SubmissionReceipt> {
        if !request.amount.is_positive() {
            return Err(PaymentError::InvalidAmount {
                amount: request.amount.to_string(),
            });
        }

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        self.balance -= request.amount;
        self.submissions.push(request.clone());
        let reference = format!("PAY-{:06}", self.submissions.len());
        debug!(%reference, amount = %request.amount, "stub gateway accepted payment");

        Ok(SubmissionReceipt {
            reference,
            new_balance: self.balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(naira: i64) -> SubmissionRequest {
        SubmissionRequest {
            amount: Money::from_major(naira),
            virtual_account_number: "9012345678".to_string(),
        }
    }

    #[test]
    fn test_stub_debits_balance() {
        let mut gateway = StubGateway::new(Money::from_major(200_000), 0);

        let receipt = gateway.submit(&request(150_000)).unwrap();
        assert_eq!(receipt.reference, "PAY-000001");
        assert_eq!(receipt.new_balance, Money::from_major(50_000));

        let receipt = gateway.submit(&request(20_000)).unwrap();
        assert_eq!(receipt.reference, "PAY-000002");
        assert_eq!(gateway.balance(), Money::from_major(30_000));
        assert_eq!(gateway.submissions().len(), 2);
    }

    #[test]
    fn test_stub_rejects_non_positive_amount() {
        let mut gateway = StubGateway::new(Money::ZERO, 0);
        assert!(gateway.submit(&request(0)).is_err());
        assert!(gateway.submissions().is_empty());
    }
}
