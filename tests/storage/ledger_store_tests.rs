//! LedgerStore interface tests.
//!
//! These tests verify the contract of the LedgerStore trait.
//! Each storage implementation should run these tests.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use rewards_ledger::model::{CreatorTier, Earning, Ticket};
use rewards_ledger::storage::{CoinPurchase, LedgerStore, ReelUpdate, StorageError};

/// A user id no other test uses.
pub fn unique_user(prefix: &str) -> String {
    format!("test_{}_{}", prefix, Uuid::new_v4().simple())
}

fn reel(views: u64, points: i64, earning: Option<Earning>) -> ReelUpdate {
    ReelUpdate {
        views,
        points,
        reason: format!("Reel posted with {} views", views),
        earning,
        at: Utc::now(),
    }
}

// =============================================================================
// Users and points
// =============================================================================

pub async fn test_create_user_defaults<S: LedgerStore>(store: &S) {
    let user = unique_user("create");
    let account = store.create_user(&user).await.expect("create should succeed");

    assert_eq!(account.id, user);
    assert_eq!(account.reward_points, 0);
    assert_eq!(account.total_views, 0);
    assert_eq!(account.reels_count, 0);
    assert_eq!(account.creator_level, CreatorTier::Beginner);
}

pub async fn test_create_user_idempotent<S: LedgerStore>(store: &S) {
    let user = unique_user("idempotent");
    store.create_user(&user).await.expect("create should succeed");
    store
        .add_reward_points(&user, 42, "seed", Utc::now())
        .await
        .expect("add should succeed");

    let again = store.create_user(&user).await.expect("create should succeed");
    assert_eq!(again.reward_points, 42, "re-register must not reset the ledger");
}

pub async fn test_get_unknown_user<S: LedgerStore>(store: &S) {
    let user = store
        .get_user(&unique_user("ghost"))
        .await
        .expect("get should succeed");
    assert!(user.is_none());
}

pub async fn test_add_points_unknown_user<S: LedgerStore>(store: &S) {
    let result = store
        .add_reward_points(&unique_user("ghost"), 5, "test", Utc::now())
        .await;
    assert!(matches!(result, Err(StorageError::UserNotFound(_))));
}

pub async fn test_history_records_signed_deltas<S: LedgerStore>(store: &S) {
    let user = unique_user("history");
    store.create_user(&user).await.expect("create should succeed");

    let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    for (i, delta) in [10i64, 5, -3, 1].iter().enumerate() {
        store
            .add_reward_points(
                &user,
                *delta,
                &format!("step {}", i),
                start + Duration::minutes(i as i64),
            )
            .await
            .expect("add should succeed");
    }

    let history = store.reward_history(&user).await.expect("history should succeed");
    let amounts: Vec<i64> = history.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![10, 5, -3, 1], "history keeps insertion order");
    assert_eq!(history[2].reason, "step 2");
    assert_eq!(history[3].timestamp, start + Duration::minutes(3));

    let account = store.get_user(&user).await.unwrap().unwrap();
    assert_eq!(account.reward_points, 13);
}

pub async fn test_overdraft_rejected_atomically<S: LedgerStore>(store: &S) {
    let user = unique_user("overdraft");
    store.create_user(&user).await.expect("create should succeed");
    store
        .add_reward_points(&user, 10, "seed", Utc::now())
        .await
        .expect("add should succeed");

    let result = store.add_reward_points(&user, -11, "spend", Utc::now()).await;
    assert!(matches!(
        result,
        Err(StorageError::InsufficientBalance {
            balance: 10,
            required: 11,
            ..
        })
    ));

    let history = store.reward_history(&user).await.unwrap();
    assert_eq!(history.len(), 1, "rejected delta must not be logged");
    assert_eq!(store.get_user(&user).await.unwrap().unwrap().reward_points, 10);
}

pub async fn test_history_unknown_user<S: LedgerStore>(store: &S) {
    let result = store.reward_history(&unique_user("ghost")).await;
    assert!(matches!(result, Err(StorageError::UserNotFound(_))));
}

// =============================================================================
// Reels
// =============================================================================

pub async fn test_record_reel_accumulates<S: LedgerStore>(store: &S) {
    let user = unique_user("reel");
    store.create_user(&user).await.expect("create should succeed");

    let account = store
        .record_reel(&user, &reel(600, 10, None))
        .await
        .expect("record should succeed");
    assert_eq!(account.total_views, 600);
    assert_eq!(account.creator_level, CreatorTier::Beginner);

    let account = store
        .record_reel(&user, &reel(500, 10, None))
        .await
        .expect("record should succeed");
    assert_eq!(account.total_views, 1100);
    assert_eq!(account.reels_count, 2);
    assert_eq!(account.creator_level, CreatorTier::Bronze);
    assert_eq!(account.reward_points, 20);

    let stored = store.get_user(&user).await.unwrap().unwrap();
    assert_eq!(stored, account);
    assert_eq!(store.reward_history(&user).await.unwrap().len(), 2);
}

pub async fn test_record_reel_with_earning<S: LedgerStore>(store: &S) {
    let user = unique_user("reel_earning");
    store.create_user(&user).await.expect("create should succeed");

    let earning = Earning::unpaid(&user, Decimal::new(15, 0), "Reel earnings: 6000 views", Utc::now());
    let account = store
        .record_reel(&user, &reel(6000, 80, Some(earning.clone())))
        .await
        .expect("record should succeed");
    assert_eq!(account.creator_level, CreatorTier::Silver);
    assert_eq!(account.reward_points, 80);

    let earnings = store.earnings(&user).await.unwrap();
    assert_eq!(earnings.len(), 1);
    assert_eq!(earnings[0].id, earning.id);
    assert_eq!(earnings[0].amount, Decimal::new(15, 0));
    assert!(!earnings[0].is_paid);
}

pub async fn test_record_reel_unknown_user<S: LedgerStore>(store: &S) {
    let result = store
        .record_reel(&unique_user("ghost"), &reel(100, 10, None))
        .await;
    assert!(matches!(result, Err(StorageError::UserNotFound(_))));
}

// =============================================================================
// Earnings
// =============================================================================

pub async fn test_earnings_round_trip<S: LedgerStore>(store: &S) {
    let user = unique_user("earnings");
    store.create_user(&user).await.expect("create should succeed");

    let first = Earning::unpaid(&user, Decimal::new(1999, 2), "Referral", Utc::now());
    let second = Earning::unpaid(&user, Decimal::new(5, 0), "Reel", Utc::now());
    store.add_earning(&first).await.expect("add should succeed");
    store.add_earning(&second).await.expect("add should succeed");

    let earnings = store.earnings(&user).await.expect("earnings should succeed");
    assert_eq!(earnings.len(), 2);
    assert_eq!(earnings[0].id, first.id);
    assert_eq!(earnings[0].amount, Decimal::new(1999, 2));
    assert_eq!(earnings[0].source, "Referral");
    assert_eq!(earnings[1].id, second.id);
}

pub async fn test_earnings_fresh_user_empty<S: LedgerStore>(store: &S) {
    let user = unique_user("no_earnings");
    store.create_user(&user).await.expect("create should succeed");
    assert!(store.earnings(&user).await.unwrap().is_empty());
}

pub async fn test_add_earning_unknown_user<S: LedgerStore>(store: &S) {
    let earning = Earning::unpaid(unique_user("ghost"), Decimal::ONE, "x", Utc::now());
    let result = store.add_earning(&earning).await;
    assert!(matches!(result, Err(StorageError::UserNotFound(_))));
}

pub async fn test_mark_paid_once<S: LedgerStore>(store: &S) {
    let user = unique_user("payout");
    store.create_user(&user).await.expect("create should succeed");
    let earning = Earning::unpaid(&user, Decimal::new(30, 0), "Reel", Utc::now());
    store.add_earning(&earning).await.unwrap();

    let paid = store.mark_earning_paid(earning.id).await.expect("mark should succeed");
    assert!(paid.is_paid);
    assert!(store.earnings(&user).await.unwrap()[0].is_paid);

    let again = store.mark_earning_paid(earning.id).await;
    assert!(matches!(again, Err(StorageError::EarningAlreadyPaid(id)) if id == earning.id));

    let missing = store.mark_earning_paid(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(StorageError::EarningNotFound(_))));
}

// =============================================================================
// Coin purchases
// =============================================================================

pub async fn test_purchase_deducts_and_stores<S: LedgerStore>(store: &S) {
    let user = unique_user("purchase");
    let event = format!("{}_event", user);
    store.create_user(&user).await.unwrap();
    store
        .add_reward_points(&user, 250, "seed", Utc::now())
        .await
        .unwrap();

    let now = Utc::now();
    let purchase = CoinPurchase {
        user_id: user.clone(),
        cost: 200,
        reason: "ticket purchase".to_string(),
        tickets: vec![Ticket::mint(&user, &event, now), Ticket::mint(&user, &event, now)],
        at: now,
    };
    let balance = store.purchase_tickets(&purchase).await.expect("purchase should succeed");
    assert_eq!(balance, 50);

    let history = store.reward_history(&user).await.unwrap();
    let last = history.last().unwrap();
    assert_eq!(last.amount, -200);
    assert_eq!(last.reason, "ticket purchase");
}

pub async fn test_purchase_insufficient_writes_nothing<S: LedgerStore>(store: &S) {
    let user = unique_user("broke");
    let event = format!("{}_event", user);
    store.create_user(&user).await.unwrap();
    store
        .add_reward_points(&user, 99, "seed", Utc::now())
        .await
        .unwrap();

    let now = Utc::now();
    let purchase = CoinPurchase {
        user_id: user.clone(),
        cost: 100,
        reason: "ticket purchase".to_string(),
        tickets: vec![Ticket::mint(&user, &event, now)],
        at: now,
    };
    let result = store.purchase_tickets(&purchase).await;
    assert!(matches!(
        result,
        Err(StorageError::InsufficientBalance { balance: 99, required: 100, .. })
    ));
    assert_eq!(store.get_user(&user).await.unwrap().unwrap().reward_points, 99);
    assert_eq!(store.reward_history(&user).await.unwrap().len(), 1);
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all LedgerStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_ledger_store_tests {
    ($store:expr) => {
        use $crate::storage::ledger_store_tests::*;

        // users and points
        test_create_user_defaults($store).await;
        println!("  test_create_user_defaults: PASSED");

        test_create_user_idempotent($store).await;
        println!("  test_create_user_idempotent: PASSED");

        test_get_unknown_user($store).await;
        println!("  test_get_unknown_user: PASSED");

        test_add_points_unknown_user($store).await;
        println!("  test_add_points_unknown_user: PASSED");

        test_history_records_signed_deltas($store).await;
        println!("  test_history_records_signed_deltas: PASSED");

        test_overdraft_rejected_atomically($store).await;
        println!("  test_overdraft_rejected_atomically: PASSED");

        test_history_unknown_user($store).await;
        println!("  test_history_unknown_user: PASSED");

        // reels
        test_record_reel_accumulates($store).await;
        println!("  test_record_reel_accumulates: PASSED");

        test_record_reel_with_earning($store).await;
        println!("  test_record_reel_with_earning: PASSED");

        test_record_reel_unknown_user($store).await;
        println!("  test_record_reel_unknown_user: PASSED");

        // earnings
        test_earnings_round_trip($store).await;
        println!("  test_earnings_round_trip: PASSED");

        test_earnings_fresh_user_empty($store).await;
        println!("  test_earnings_fresh_user_empty: PASSED");

        test_add_earning_unknown_user($store).await;
        println!("  test_add_earning_unknown_user: PASSED");

        test_mark_paid_once($store).await;
        println!("  test_mark_paid_once: PASSED");

        // coin purchases
        test_purchase_deducts_and_stores($store).await;
        println!("  test_purchase_deducts_and_stores: PASSED");

        test_purchase_insufficient_writes_nothing($store).await;
        println!("  test_purchase_insufficient_writes_nothing: PASSED");
    };
}
