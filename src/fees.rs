use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::decimal::{Money, Rate};
use crate::errors::{PaymentError, Result};
use crate::payments::PaymentForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    Paid,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeePlanStatus {
    /// nothing paid yet
    Pending,
    Partial,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub id: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
}

impl Installment {
    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }
}

/// semester fees split into monthly installments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePlan {
    pub semester: String,
    pub installments: Vec<Installment>,
}

impl FeePlan {
    /// split `total` into `count` monthly installments starting at `first_due`
    ///
    /// Installments are equal to the minor unit; whatever does not divide
    /// evenly lands on the last one.
    pub fn split(semester: &str, total: Money, count: u32, first_due: NaiveDate) -> Result<Self> {
        if count == 0 {
            return Err(PaymentError::InvalidConfiguration {
                message: "installment count must be positive".to_string(),
            });
        }
        let total_minor = match total.to_minor() {
            Some(minor) if minor > 0 => minor,
            _ => {
                return Err(PaymentError::InvalidAmount {
                    amount: total.to_string(),
                })
            }
        };

        let share = total_minor / i64::from(count);
        let remainder = total_minor % i64::from(count);

        let mut installments = Vec::with_capacity(count as usize);
        for i in 0..count {
            let due_date = first_due.checked_add_months(Months::new(i)).ok_or_else(|| {
                PaymentError::InvalidConfiguration {
                    message: format!("installment {} due date out of range", i + 1),
                }
            })?;
            let minor = if i + 1 == count { share + remainder } else { share };

            installments.push(Installment {
                id: format!("inst-{}", i + 1),
                amount: Money::from_minor(minor),
                due_date,
                status: InstallmentStatus::Pending,
            });
        }

        Ok(Self {
            semester: semester.to_string(),
            installments,
        })
    }

    pub fn total_amount(&self) -> Money {
        self.installments.iter().map(|i| i.amount).sum()
    }

    pub fn paid_amount(&self) -> Money {
        self.installments
            .iter()
            .filter(|i| i.is_paid())
            .map(|i| i.amount)
            .sum()
    }

    pub fn remaining(&self) -> Money {
        self.total_amount() - self.paid_amount()
    }

    /// share of the plan already paid, never above 100%
    pub fn progress(&self) -> Rate {
        Rate::from_ratio(self.paid_amount(), self.total_amount()).min(Rate::ONE)
    }

    /// days until the final installment falls due, zero once it has passed
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        self.installments
            .iter()
            .map(|i| i.due_date)
            .max()
            .map(|last| (last - today).num_days().max(0))
            .unwrap_or(0)
    }

    pub fn status(&self) -> FeePlanStatus {
        if self.installments.iter().all(|i| i.is_paid()) {
            FeePlanStatus::Completed
        } else if self.installments.iter().any(|i| i.is_paid()) {
            FeePlanStatus::Partial
        } else {
            FeePlanStatus::Pending
        }
    }

    /// earliest pending installment
    pub fn next_pending(&self) -> Option<&Installment> {
        self.installments
            .iter()
            .filter(|i| !i.is_paid())
            .min_by_key(|i| i.due_date)
    }

    pub fn installment(&self, id: &str) -> Option<&Installment> {
        self.installments.iter().find(|i| i.id == id)
    }

    /// mark an installment paid and return its amount
    pub fn mark_paid(&mut self, id: &str) -> Result<Money> {
        let installment = self
            .installments
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| PaymentError::InstallmentNotFound { id: id.to_string() })?;

        if installment.is_paid() {
            return Err(PaymentError::InstallmentAlreadyPaid { id: id.to_string() });
        }

        installment.status = InstallmentStatus::Paid;
        info!(semester = %self.semester, installment = id, amount = %installment.amount, "installment paid");
        Ok(installment.amount)
    }

    /// payment form prefilled for a pending installment
    pub fn payment_form(
        &self,
        id: &str,
        school_id: &str,
        purpose_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PaymentForm> {
        let installment = self
            .installment(id)
            .ok_or_else(|| PaymentError::InstallmentNotFound { id: id.to_string() })?;

        if installment.is_paid() {
            return Err(PaymentError::InstallmentAlreadyPaid { id: id.to_string() });
        }

        let raw = installment.amount.as_decimal().normalize().to_string();
        Ok(PaymentForm::new(now)
            .school(school_id)
            .purpose(purpose_id)
            .amount(&raw))
    }
}
