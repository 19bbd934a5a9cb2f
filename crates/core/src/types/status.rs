//! Status and category enums stored as text.
//!
//! Each enum round-trips through its snake_case name: that name is what goes
//! over the wire (serde) and what is stored in the database column.

use serde::{Deserialize, Serialize};

/// Error returned when a stored or submitted name matches no variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enum failed to parse.
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The snake_case name used on the wire and in the database.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

/// Lifecycle status of a shop account.
///
/// Only `Active` accounts may sign in. `Locked` is entered automatically after
/// too many failed sign-ins and left again when the lock expires or on the next
/// successful sign-in after expiry. The remaining statuses are set by an
/// operator through the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    /// Signed up, waiting for operator approval.
    Pending,
    /// Suspended by an operator.
    Frozen,
    /// Sign-up refused by an operator.
    Rejected,
    /// Temporarily locked after repeated failed sign-ins.
    Locked,
}

text_enum!(AccountStatus, "account status", {
    Active => "active",
    Pending => "pending",
    Frozen => "frozen",
    Rejected => "rejected",
    Locked => "locked",
});

impl AccountStatus {
    /// Statuses that an operator decision put in place; these are never
    /// changed by the sign-in flow.
    #[must_use]
    pub const fn is_administrative_block(self) -> bool {
        matches!(self, Self::Pending | Self::Frozen | Self::Rejected)
    }
}

/// How a receipt was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Upi,
    BankTransfer,
    Credit,
    Other,
}

text_enum!(PaymentMethod, "payment method", {
    Cash => "cash",
    Card => "card",
    Upi => "upi",
    BankTransfer => "bank_transfer",
    Credit => "credit",
    Other => "other",
});

/// Attendance mark for one employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    /// Paid leave.
    Leave,
}

text_enum!(AttendanceStatus, "attendance status", {
    Present => "present",
    Absent => "absent",
    HalfDay => "half_day",
    Leave => "leave",
});

/// Expense bookkeeping category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Rent,
    Utilities,
    Supplies,
    Salary,
    Transport,
    Maintenance,
    #[default]
    Other,
}

text_enum!(ExpenseCategory, "expense category", {
    Rent => "rent",
    Utilities => "utilities",
    Supplies => "supplies",
    Salary => "salary",
    Transport => "transport",
    Maintenance => "maintenance",
    Other => "other",
});
