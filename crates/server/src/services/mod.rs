//! Business logic over the stores.

pub mod analytics;
pub mod auth;
pub mod clock;
pub mod inventory;
pub mod lockout;
pub mod payroll;
pub mod receipts;

pub use auth::{AuthError, AuthService, SignUp};
pub use clock::{Clock, SystemClock};
pub use inventory::{InventoryReconciler, LineOutcome, ReconcileReport};
pub use lockout::{LockState, LockoutPolicy};
pub use receipts::{ReceiptError, ReceiptOutcome, ReceiptService};
