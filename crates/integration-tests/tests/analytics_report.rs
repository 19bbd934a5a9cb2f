//! Reports over receipts recorded through the receipt service.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use shopdesk_core::{ExpenseCategory, ExpenseId, PaymentMethod, YearMonth};
use shopdesk_integration_tests::{SHOP, TestShop, line, sale, start_time};
use shopdesk_server::models::{Expense, Receipt, ReceiptLine};
use shopdesk_server::services::analytics::{self, DateRange};

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, m, d).unwrap()
}

fn costed(name: &str, price: Decimal, quantity: Decimal, cost_price: Decimal) -> ReceiptLine {
    ReceiptLine {
        cost_price,
        ..line(name, price, quantity)
    }
}

/// Four sales: two in October, one in November, one in January 2027.
async fn record_sales(shop: &TestShop) -> Vec<Receipt> {
    let receipts = shop.receipts();
    let mut recorded = Vec::new();

    let tea = sale(vec![costed("Tea", dec!(10), dec!(3), dec!(6))]);
    recorded.push(receipts.create(SHOP, tea).await.unwrap().receipt);

    shop.clock.advance(Duration::days(1));
    let mut rice = sale(vec![line("Rice", dec!(60), dec!(1))]);
    rice.discount = dec!(10);
    rice.payment_method = PaymentMethod::Card;
    recorded.push(receipts.create(SHOP, rice).await.unwrap().receipt);

    let mut november = sale(vec![line("tea", dec!(10), dec!(2))]);
    november.timestamp = Some(Utc.with_ymd_and_hms(2026, 11, 15, 18, 30, 0).unwrap());
    recorded.push(receipts.create(SHOP, november).await.unwrap().receipt);

    let mut january = sale(vec![line("Soap", dec!(20), dec!(2))]);
    january.timestamp = Some(Utc.with_ymd_and_hms(2027, 1, 5, 8, 0, 0).unwrap());
    recorded.push(receipts.create(SHOP, january).await.unwrap().receipt);

    recorded
}

fn rent(amount: Decimal, spent_on: NaiveDate) -> Expense {
    Expense {
        id: ExpenseId::new(1),
        shop_id: SHOP,
        category: ExpenseCategory::Rent,
        description: "October rent".to_owned(),
        amount,
        spent_on,
        created_at: start_time(),
        updated_at: start_time(),
    }
}

#[tokio::test]
async fn test_month_summary_nets_expenses() {
    let shop = TestShop::new();
    let receipts = record_sales(&shop).await;
    let october = DateRange::month(YearMonth::new(2026, 10).unwrap());

    let summary = analytics::summarize(&receipts, &[rent(dec!(50), day(10, 3))], october);

    assert_eq!(summary.totals.receipts, 2);
    assert_eq!(summary.totals.sales, dec!(80));
    assert_eq!(summary.totals.cost, dec!(18));
    assert_eq!(summary.totals.profit, dec!(62));
    assert_eq!(summary.totals.discount, dec!(10));
    assert_eq!(summary.expenses, dec!(50));
    assert_eq!(summary.net_profit, dec!(12));

    assert_eq!(summary.payment_methods[0].method, PaymentMethod::Card);
    assert_eq!(summary.payment_methods[0].amount, dec!(50));
    assert_eq!(summary.payment_methods[1].method, PaymentMethod::Cash);

    assert_eq!(summary.top_items[0].name, "Rice");
    assert_eq!(summary.top_items[1].name, "Tea");
}

#[tokio::test]
async fn test_top_items_merge_names_across_case() {
    let shop = TestShop::new();
    let receipts = record_sales(&shop).await;
    let year = DateRange::year(2026).unwrap();

    let summary = analytics::summarize(&receipts, &[], year);
    let tea = summary.top_items.iter().find(|i| i.name == "Tea").unwrap();
    assert_eq!(tea.quantity, dec!(5));
    assert_eq!(tea.revenue, dec!(50));
    assert!(summary.top_items.iter().all(|i| i.name != "tea"));
}

#[tokio::test]
async fn test_daily_includes_quiet_days() {
    let shop = TestShop::new();
    let receipts = record_sales(&shop).await;
    let range = DateRange::new(day(10, 1), day(10, 3)).unwrap();

    let days = analytics::daily(&receipts, range).unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0].totals.sales, dec!(30));
    assert_eq!(days[1].totals.sales, dec!(50));
    assert_eq!(days[2].totals, analytics::Totals::default());
}

#[test]
fn test_daily_rejects_spans_over_a_year() {
    let range = DateRange::new(day(1, 1), NaiveDate::from_ymd_opt(2027, 6, 1).unwrap()).unwrap();
    assert!(analytics::daily(&[], range).is_err());
}

#[tokio::test]
async fn test_monthly_and_yearly_rollups() {
    let shop = TestShop::new();
    let receipts = record_sales(&shop).await;

    let months = analytics::monthly(&receipts, 2026);
    assert_eq!(months.len(), 12);
    assert_eq!(months[9].month, YearMonth::new(2026, 10).unwrap());
    assert_eq!(months[9].totals.receipts, 2);
    assert_eq!(months[10].totals.sales, dec!(20));
    assert_eq!(months[0].totals.receipts, 0);

    let years = analytics::yearly(&receipts);
    assert_eq!(years.len(), 2);
    assert_eq!((years[0].year, years[0].totals.sales), (2026, dec!(100)));
    assert_eq!((years[1].year, years[1].totals.sales), (2027, dec!(40)));
}

#[tokio::test]
async fn test_listed_receipts_feed_the_same_report() {
    let shop = TestShop::new();
    record_sales(&shop).await;
    let october = DateRange::month(YearMonth::new(2026, 10).unwrap());
    let (from, to) = october.bounds();

    let listed = shop
        .receipts()
        .list(SHOP, Some(from), Some(to))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);

    let summary = analytics::summarize(&listed, &[], october);
    assert_eq!(summary.totals.sales, dec!(80));
}
