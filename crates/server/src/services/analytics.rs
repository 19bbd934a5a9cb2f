//! Sales analytics computed from receipts.
//!
//! Everything here is a pure fold over receipts (and expenses) already loaded
//! for the requested period. Days are calendar days in UTC.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shopdesk_core::{ExpenseCategory, PaymentMethod, YearMonth};

use crate::models::{Expense, Receipt, ValidationError};

/// Longest range the daily breakdown accepts.
pub const MAX_DAILY_SPAN_DAYS: u64 = 366;

/// Number of entries in the top items list.
pub const TOP_ITEMS: usize = 10;

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns `ValidationError` if `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::new("from", "must not be after `to`"));
        }
        Ok(Self { from, to })
    }

    /// The whole of `month`.
    #[must_use]
    pub fn month(month: YearMonth) -> Self {
        Self {
            from: month.first_day(),
            to: month.last_day(),
        }
    }

    /// The whole of `year`, or `None` if the year is out of range.
    #[must_use]
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            from: NaiveDate::from_ymd_opt(year, 1, 1)?,
            to: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Number of days covered.
    #[must_use]
    pub fn days(&self) -> u64 {
        u64::try_from((self.to - self.from).num_days()).map_or(0, |d| d + 1)
    }

    /// Half-open timestamp bounds `[from 00:00, to+1 00:00)` for queries.
    #[must_use]
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.from.and_time(NaiveTime::MIN).and_utc();
        let end = self
            .to
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc();
        (start, end)
    }
}

/// Sales figures for a set of receipts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub receipts: usize,
    /// Sum of receipt totals, after discounts.
    pub sales: Decimal,
    /// Σ `cost_price × quantity`.
    pub cost: Decimal,
    /// `sales − cost`.
    pub profit: Decimal,
    pub discount: Decimal,
}

impl Totals {
    fn add(&mut self, receipt: &Receipt) {
        self.receipts += 1;
        self.sales += receipt.total_amount;
        self.cost += receipt.total_cost();
        self.profit += receipt.profit();
        self.discount += receipt.discount;
    }

    fn of<'r>(receipts: impl IntoIterator<Item = &'r Receipt>) -> Self {
        let mut totals = Self::default();
        for receipt in receipts {
            totals.add(receipt);
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentBreakdown {
    pub method: PaymentMethod,
    pub receipts: usize,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSales {
    pub name: String,
    pub quantity: Decimal,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub amount: Decimal,
}

/// Report for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub range: DateRange,
    #[serde(flatten)]
    pub totals: Totals,
    pub expenses: Decimal,
    /// `profit − expenses`.
    pub net_profit: Decimal,
    pub payment_methods: Vec<PaymentBreakdown>,
    pub top_items: Vec<ItemSales>,
    pub expenses_by_category: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub month: YearMonth,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyBucket {
    pub year: i32,
    #[serde(flatten)]
    pub totals: Totals,
}

fn day_of(receipt: &Receipt) -> NaiveDate {
    receipt.timestamp.date_naive()
}

/// Summarize receipts and expenses that fall inside `range`.
#[must_use]
pub fn summarize(receipts: &[Receipt], expenses: &[Expense], range: DateRange) -> Summary {
    let in_range: Vec<&Receipt> = receipts
        .iter()
        .filter(|r| range.contains(day_of(r)))
        .collect();
    let totals = Totals::of(in_range.iter().copied());

    let mut by_category: BTreeMap<&str, CategoryTotal> = BTreeMap::new();
    for expense in expenses.iter().filter(|e| range.contains(e.spent_on)) {
        by_category
            .entry(expense.category.as_str())
            .or_insert(CategoryTotal {
                category: expense.category,
                amount: Decimal::ZERO,
            })
            .amount += expense.amount;
    }
    let expenses_by_category: Vec<CategoryTotal> = by_category.into_values().collect();
    let expense_total: Decimal = expenses_by_category.iter().map(|c| c.amount).sum();

    Summary {
        range,
        totals,
        expenses: expense_total,
        net_profit: totals.profit - expense_total,
        payment_methods: payment_breakdown(&in_range),
        top_items: top_items(&in_range, TOP_ITEMS),
        expenses_by_category,
    }
}

/// Receipt count and amount per payment method, largest amount first.
#[must_use]
pub fn payment_breakdown(receipts: &[&Receipt]) -> Vec<PaymentBreakdown> {
    let mut by_method: BTreeMap<&str, PaymentBreakdown> = BTreeMap::new();
    for receipt in receipts {
        let entry = by_method
            .entry(receipt.payment_method.as_str())
            .or_insert(PaymentBreakdown {
                method: receipt.payment_method,
                receipts: 0,
                amount: Decimal::ZERO,
            });
        entry.receipts += 1;
        entry.amount += receipt.total_amount;
    }
    let mut breakdown: Vec<PaymentBreakdown> = by_method.into_values().collect();
    breakdown.sort_by(|a, b| b.amount.cmp(&a.amount));
    breakdown
}

/// Best-selling items by revenue. Names are grouped case-insensitively and
/// reported as first seen.
#[must_use]
pub fn top_items(receipts: &[&Receipt], limit: usize) -> Vec<ItemSales> {
    let mut by_name: BTreeMap<String, ItemSales> = BTreeMap::new();
    for line in receipts.iter().flat_map(|r| &r.items) {
        let entry = by_name
            .entry(line.name.trim().to_lowercase())
            .or_insert_with(|| ItemSales {
                name: line.name.trim().to_owned(),
                quantity: Decimal::ZERO,
                revenue: Decimal::ZERO,
            });
        entry.quantity += line.quantity;
        entry.revenue += line.revenue();
    }
    let mut items: Vec<ItemSales> = by_name.into_values().collect();
    items.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    items.truncate(limit);
    items
}

/// One bucket per day of `range`, including days without sales.
///
/// # Errors
///
/// Returns `ValidationError` if the range is longer than
/// [`MAX_DAILY_SPAN_DAYS`].
pub fn daily(receipts: &[Receipt], range: DateRange) -> Result<Vec<DailyBucket>, ValidationError> {
    if range.days() > MAX_DAILY_SPAN_DAYS {
        return Err(ValidationError::new(
            "to",
            format!("daily breakdown covers at most {MAX_DAILY_SPAN_DAYS} days"),
        ));
    }

    let mut buckets: BTreeMap<NaiveDate, Totals> = range
        .from
        .iter_days()
        .take_while(|d| *d <= range.to)
        .map(|d| (d, Totals::default()))
        .collect();
    for receipt in receipts {
        if let Some(totals) = buckets.get_mut(&day_of(receipt)) {
            totals.add(receipt);
        }
    }
    Ok(buckets
        .into_iter()
        .map(|(date, totals)| DailyBucket { date, totals })
        .collect())
}

/// Twelve buckets for `year`.
#[must_use]
pub fn monthly(receipts: &[Receipt], year: i32) -> Vec<MonthlyBucket> {
    let mut buckets: BTreeMap<YearMonth, Totals> = (1..=12)
        .filter_map(|m| YearMonth::new(year, m).ok())
        .map(|m| (m, Totals::default()))
        .collect();
    for receipt in receipts {
        if let Some(totals) = buckets.get_mut(&YearMonth::of(day_of(receipt))) {
            totals.add(receipt);
        }
    }
    buckets
        .into_iter()
        .map(|(month, totals)| MonthlyBucket { month, totals })
        .collect()
}

/// One bucket per year that has receipts, oldest first.
#[must_use]
pub fn yearly(receipts: &[Receipt]) -> Vec<YearlyBucket> {
    let mut buckets: BTreeMap<i32, Totals> = BTreeMap::new();
    for receipt in receipts {
        buckets.entry(day_of(receipt).year()).or_default().add(receipt);
    }
    buckets
        .into_iter()
        .map(|(year, totals)| YearlyBucket { year, totals })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::models::receipt::fixtures::line;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use shopdesk_core::{ExpenseId, ReceiptId, ShopId};

    fn receipt(id: i32, at: DateTime<Utc>, method: PaymentMethod, total: Decimal) -> Receipt {
        let mut tea = line("Tea", total, dec!(1));
        tea.cost_price = total / dec!(2);
        Receipt {
            id: ReceiptId::new(id),
            shop_id: ShopId::new(1),
            transaction_id: format!("TXN-{id}"),
            items: vec![tea],
            total_amount: total,
            discount: Decimal::ZERO,
            payment_method: method,
            timestamp: at,
            created_at: at,
            updated_at: at,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn expense(id: i32, category: ExpenseCategory, amount: Decimal, on: NaiveDate) -> Expense {
        Expense {
            id: ExpenseId::new(id),
            shop_id: ShopId::new(1),
            category,
            description: String::new(),
            amount,
            spent_on: on,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_range_rejects_reversed_dates() {
        assert!(DateRange::new(date(2026, 10, 2), date(2026, 10, 1)).is_err());
        assert_eq!(
            DateRange::new(date(2026, 10, 1), date(2026, 10, 1))
                .unwrap()
                .days(),
            1
        );
    }

    #[test]
    fn test_range_bounds_are_half_open() {
        let range = DateRange::new(date(2026, 10, 1), date(2026, 10, 3)).unwrap();
        let (start, end) = range.bounds();
        assert_eq!(start, at(2026, 10, 1, 0));
        assert_eq!(end, at(2026, 10, 4, 0));
    }

    #[test]
    fn test_summary_totals_and_net_profit() {
        let receipts = vec![
            receipt(1, at(2026, 10, 1, 9), PaymentMethod::Cash, dec!(10)),
            receipt(2, at(2026, 10, 2, 9), PaymentMethod::Card, dec!(30)),
            receipt(3, at(2026, 10, 9, 9), PaymentMethod::Cash, dec!(100)),
        ];
        let expenses = vec![
            expense(1, ExpenseCategory::Rent, dec!(5), date(2026, 10, 1)),
            expense(2, ExpenseCategory::Rent, dec!(1), date(2026, 10, 2)),
            expense(3, ExpenseCategory::Supplies, dec!(50), date(2026, 11, 1)),
        ];
        let range = DateRange::new(date(2026, 10, 1), date(2026, 10, 7)).unwrap();

        let summary = summarize(&receipts, &expenses, range);
        assert_eq!(summary.totals.receipts, 2);
        assert_eq!(summary.totals.sales, dec!(40));
        assert_eq!(summary.totals.cost, dec!(20));
        assert_eq!(summary.totals.profit, dec!(20));
        assert_eq!(summary.expenses, dec!(6));
        assert_eq!(summary.net_profit, dec!(14));
        assert_eq!(summary.expenses_by_category.len(), 1);

        assert_eq!(summary.payment_methods[0].method, PaymentMethod::Card);
        assert_eq!(summary.payment_methods[0].amount, dec!(30));
        assert_eq!(summary.top_items[0].name, "Tea");
        assert_eq!(summary.top_items[0].quantity, dec!(2));
    }

    #[test]
    fn test_daily_includes_empty_days() {
        let receipts = vec![
            receipt(1, at(2026, 10, 1, 23), PaymentMethod::Cash, dec!(10)),
            receipt(2, at(2026, 10, 3, 0), PaymentMethod::Cash, dec!(5)),
        ];
        let range = DateRange::new(date(2026, 10, 1), date(2026, 10, 3)).unwrap();

        let days = daily(&receipts, range).unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].totals.sales, dec!(10));
        assert_eq!(days[1].totals, Totals::default());
        assert_eq!(days[2].totals.sales, dec!(5));
    }

    #[test]
    fn test_daily_rejects_huge_range() {
        let range = DateRange::new(date(2024, 1, 1), date(2026, 1, 1)).unwrap();
        assert!(daily(&[], range).is_err());
    }

    #[test]
    fn test_monthly_has_twelve_buckets() {
        let receipts = vec![
            receipt(1, at(2026, 2, 14, 12), PaymentMethod::Cash, dec!(10)),
            receipt(2, at(2025, 2, 14, 12), PaymentMethod::Cash, dec!(99)),
        ];
        let months = monthly(&receipts, 2026);
        assert_eq!(months.len(), 12);
        assert_eq!(months[1].month.to_string(), "2026-02");
        assert_eq!(months[1].totals.sales, dec!(10));
        assert_eq!(months[0].totals.receipts, 0);
    }

    #[test]
    fn test_yearly_only_years_present() {
        let receipts = vec![
            receipt(1, at(2024, 6, 1, 12), PaymentMethod::Cash, dec!(1)),
            receipt(2, at(2026, 6, 1, 12), PaymentMethod::Cash, dec!(2)),
            receipt(3, at(2026, 7, 1, 12), PaymentMethod::Upi, dec!(3)),
        ];
        let years = yearly(&receipts);
        assert_eq!(years.iter().map(|y| y.year).collect::<Vec<_>>(), vec![2024, 2026]);
        assert_eq!(years[1].totals.sales, dec!(5));
    }

    #[test]
    fn test_top_items_groups_names_case_insensitively() {
        let mut a = receipt(1, at(2026, 1, 1, 1), PaymentMethod::Cash, dec!(4));
        a.items = vec![line("Milk", dec!(2), dec!(2)), line("Tea", dec!(1), dec!(1))];
        let mut b = receipt(2, at(2026, 1, 1, 2), PaymentMethod::Cash, dec!(2));
        b.items = vec![line("milk", dec!(2), dec!(1))];

        let items = top_items(&[&a, &b], 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Milk");
        assert_eq!(items[0].revenue, dec!(6));
    }
}
