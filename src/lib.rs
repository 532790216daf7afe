pub mod amount;
pub mod config;
pub mod decimal;
pub mod display;
pub mod errors;
pub mod events;
pub mod fees;
pub mod gateway;
pub mod payments;
pub mod scheduler;
pub mod types;

// re-export key types
pub use config::{CurrencyConfig, PaymentsConfig};
pub use decimal::{Money, Rate};
pub use errors::{PaymentError, Result};
pub use events::{EventStore, PaymentEvent};
pub use fees::{FeePlan, FeePlanStatus, Installment, InstallmentStatus};
pub use gateway::{PaymentGateway, StubGateway, SubmissionReceipt, SubmissionRequest};
pub use payments::history::Settlement;
pub use payments::{
    ConfirmationParams, ConfirmationSummary, EditForm, FormField, FormSchema, PaymentForm,
    PaymentHistory, PaymentPatch, ValidationErrors,
};
pub use scheduler::PaymentScheduler;
pub use types::{
    ExternalAccount, PaymentDraft, PaymentHistoryItem, PaymentId, PaymentPurpose, PaymentStatus,
    ReferenceData, School, StatusFilter,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
