//! Domain models for the shop server.
//!
//! These are validated domain types, separate from the database row types in
//! [`crate::db`]. Input types (`*Input`) are what the JSON API accepts.

pub mod account;
pub mod expense;
pub mod receipt;
pub mod session;
pub mod staff;
pub mod stock;
pub mod validation;

pub use account::{NewShopAccount, ProfileUpdate, ShopAccount};
pub use expense::{Expense, ExpenseInput};
pub use receipt::{NewReceipt, Receipt, ReceiptContent, ReceiptInput, ReceiptLine, ReturnLine};
pub use session::{CurrentShop, keys as session_keys};
pub use staff::{
    AttendanceInput, AttendanceRecord, Employee, EmployeeInput, SalaryPayment, SalaryPaymentInput,
};
pub use stock::{StockItem, StockItemInput};
pub use validation::ValidationError;
