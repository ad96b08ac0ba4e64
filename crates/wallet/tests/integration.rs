//! End-to-end wallet service scenarios over both store backends.

use std::sync::Arc;
use std::thread;

use gruha_core::{SpendingCategory, TokenAmount, TokenType};
use gruha_fraud::{FraudConfig, FraudEngine};
use gruha_ledger::{MemoryWalletStore, SqliteWalletStore, TransactionStatus, WalletStore};
use gruha_wallet::{AllocateRequest, SpendRequest, WalletError, WalletService};

fn service_with(store: Arc<dyn WalletStore>) -> WalletService {
    WalletService::new(store, FraudEngine::new(FraudConfig::default()))
}

fn memory_service() -> WalletService {
    service_with(Arc::new(MemoryWalletStore::new()))
}

fn allocate(
    svc: &WalletService,
    msme_id: &str,
    token_type: TokenType,
    amount: u64,
    categories: Vec<SpendingCategory>,
) {
    svc.allocate(AllocateRequest {
        msme_id: msme_id.to_string(),
        disaster_id: "disaster_1".to_string(),
        token_type,
        amount: TokenAmount::from(amount),
        validity_days: 30,
        categories,
        allocated_by: "authority_1".to_string(),
    })
    .unwrap();
}

fn spend(
    svc: &WalletService,
    msme_id: &str,
    vendor_id: &str,
    token_type: TokenType,
    category: SpendingCategory,
    amount: u64,
) -> Result<gruha_wallet::SpendReceipt, WalletError> {
    svc.spend(SpendRequest {
        msme_id: msme_id.to_string(),
        vendor_id: vendor_id.to_string(),
        token_type,
        category,
        amount: TokenAmount::from(amount),
        booking_id: None,
    })
}

#[test]
fn test_allocate_spend_reject_insufficient_chain() {
    let svc = memory_service();

    allocate(
        &svc,
        "msme_1",
        TokenType::ResilienceCredit,
        10_000,
        vec![SpendingCategory::Storage, SpendingCategory::Transport],
    );
    let balance = svc.balance("msme_1").unwrap();
    assert_eq!(balance.resilience_credits, TokenAmount::from(10_000));
    assert_eq!(balance.active_allocations.len(), 1);

    // A permitted spend completes and debits.
    let receipt = spend(
        &svc,
        "msme_1",
        "v1",
        TokenType::ResilienceCredit,
        SpendingCategory::Storage,
        2_500,
    )
    .unwrap();
    assert_eq!(receipt.transaction.status, TransactionStatus::Completed);
    assert_eq!(receipt.balance.resilience_credits, TokenAmount::from(7_500));

    // Resilience credits cannot buy repairs, whatever the balance.
    let err = spend(
        &svc,
        "msme_1",
        "v1",
        TokenType::ResilienceCredit,
        SpendingCategory::Repairs,
        2_500,
    )
    .unwrap_err();
    assert_eq!(err.code(), "CATEGORY_NOT_ALLOWED");
    assert_eq!(
        svc.balance("msme_1").unwrap().resilience_credits,
        TokenAmount::from(7_500)
    );

    // More than the wallet holds.
    let err = spend(
        &svc,
        "msme_1",
        "v2",
        TokenType::ResilienceCredit,
        SpendingCategory::Storage,
        15_000,
    )
    .unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_BALANCE");
    assert_eq!(
        svc.balance("msme_1").unwrap().resilience_credits,
        TokenAmount::from(7_500)
    );
}

#[test]
fn test_wage_share_flags_then_approval_debits() {
    let svc = memory_service();
    allocate(
        &svc,
        "msme_1",
        TokenType::ReliefToken,
        100_000,
        vec![
            SpendingCategory::Storage,
            SpendingCategory::Wages,
            SpendingCategory::Utilities,
        ],
    );

    // Establish history: 2,500 of 10,000 on wages (25%).
    spend(
        &svc,
        "msme_1",
        "staff_1",
        TokenType::ReliefToken,
        SpendingCategory::Wages,
        2_500,
    )
    .unwrap();
    spend(
        &svc,
        "msme_1",
        "v1",
        TokenType::ReliefToken,
        SpendingCategory::Storage,
        7_500,
    )
    .unwrap();

    // This wage spend pushes the cumulative share past 30%.
    let receipt = spend(
        &svc,
        "msme_1",
        "staff_2",
        TokenType::ReliefToken,
        SpendingCategory::Wages,
        1_000,
    )
    .unwrap();
    assert_eq!(receipt.transaction.status, TransactionStatus::Flagged);
    assert!(receipt
        .fraud_flags
        .contains(&"WAGE_LIMIT_EXCEEDED".to_string()));
    assert!(receipt.fraud_score >= 30);

    // Not debited while under review.
    let balance_before = svc.balance("msme_1").unwrap().relief_tokens;
    assert_eq!(balance_before, TokenAmount::from(90_000));
    assert_eq!(svc.flagged().unwrap().len(), 1);

    // Authority approves; now the debit lands.
    let txn_id = receipt.transaction.id.clone();
    let approved = svc.approve_flagged(&txn_id).unwrap();
    assert_eq!(approved.transaction.status, TransactionStatus::Completed);
    assert_eq!(
        svc.balance("msme_1").unwrap().relief_tokens,
        TokenAmount::from(89_000)
    );
    assert!(svc.flagged().unwrap().is_empty());
}

#[test]
fn test_double_approval_debits_once() {
    let svc = memory_service();
    allocate(
        &svc,
        "msme_1",
        TokenType::ReliefToken,
        100_000,
        vec![SpendingCategory::Storage, SpendingCategory::Wages],
    );

    spend(
        &svc,
        "msme_1",
        "staff_1",
        TokenType::ReliefToken,
        SpendingCategory::Wages,
        2_500,
    )
    .unwrap();
    spend(
        &svc,
        "msme_1",
        "v1",
        TokenType::ReliefToken,
        SpendingCategory::Storage,
        7_500,
    )
    .unwrap();
    let receipt = spend(
        &svc,
        "msme_1",
        "staff_2",
        TokenType::ReliefToken,
        SpendingCategory::Wages,
        1_000,
    )
    .unwrap();
    assert_eq!(receipt.transaction.status, TransactionStatus::Flagged);

    let txn_id = receipt.transaction.id;
    svc.approve_flagged(&txn_id).unwrap();

    let err = svc.approve_flagged(&txn_id).unwrap_err();
    assert_eq!(err.code(), "NOT_FLAGGED");

    // Debited exactly once: 100,000 - 2,500 - 7,500 - 1,000.
    assert_eq!(
        svc.balance("msme_1").unwrap().relief_tokens,
        TokenAmount::from(89_000)
    );
}

#[test]
fn test_rejection_never_debits() {
    let svc = memory_service();
    allocate(
        &svc,
        "msme_1",
        TokenType::ReliefToken,
        100_000,
        vec![SpendingCategory::Storage, SpendingCategory::Wages],
    );

    spend(
        &svc,
        "msme_1",
        "staff_1",
        TokenType::ReliefToken,
        SpendingCategory::Wages,
        2_500,
    )
    .unwrap();
    spend(
        &svc,
        "msme_1",
        "v1",
        TokenType::ReliefToken,
        SpendingCategory::Storage,
        7_500,
    )
    .unwrap();
    let receipt = spend(
        &svc,
        "msme_1",
        "staff_2",
        TokenType::ReliefToken,
        SpendingCategory::Wages,
        1_000,
    )
    .unwrap();

    let rejected = svc.reject_flagged(&receipt.transaction.id).unwrap();
    assert_eq!(rejected.transaction.status, TransactionStatus::Failed);
    assert_eq!(
        svc.balance("msme_1").unwrap().relief_tokens,
        TokenAmount::from(90_000)
    );
}

#[test]
fn test_racing_spends_never_overdraw() {
    let svc = Arc::new(memory_service());
    allocate(
        &svc,
        "msme_1",
        TokenType::ResilienceCredit,
        5_000,
        vec![SpendingCategory::Storage, SpendingCategory::Transport],
    );

    // Ten racing spends of 1,000 against a 5,000 balance; distinct
    // vendors keep the fraud score below the flag threshold.
    let handles: Vec<_> = (0..10)
        .map(|i| {
            let svc = Arc::clone(&svc);
            thread::spawn(move || {
                spend(
                    &svc,
                    "msme_1",
                    &format!("v{i}"),
                    TokenType::ResilienceCredit,
                    SpendingCategory::Storage,
                    1_000,
                )
            })
        })
        .collect();

    let mut completed = 0;
    let mut insufficient = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(receipt) => {
                assert_eq!(receipt.transaction.status, TransactionStatus::Completed);
                completed += 1;
            }
            Err(err) => {
                assert_eq!(err.code(), "INSUFFICIENT_BALANCE");
                insufficient += 1;
            }
        }
    }

    assert_eq!(completed, 5);
    assert_eq!(insufficient, 5);
    assert!(svc.balance("msme_1").unwrap().resilience_credits.is_zero());
}

#[test]
fn test_sqlite_backed_service_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gruha.db");

    let txn_id = {
        let svc = service_with(Arc::new(SqliteWalletStore::new(&path).unwrap()));
        allocate(
            &svc,
            "msme_1",
            TokenType::ResilienceCredit,
            10_000,
            vec![SpendingCategory::Storage, SpendingCategory::Transport],
        );
        spend(
            &svc,
            "msme_1",
            "v1",
            TokenType::ResilienceCredit,
            SpendingCategory::Storage,
            2_500,
        )
        .unwrap()
        .transaction
        .id
    };

    let svc = service_with(Arc::new(SqliteWalletStore::new(&path).unwrap()));
    let balance = svc.balance("msme_1").unwrap();
    assert_eq!(balance.resilience_credits, TokenAmount::from(7_500));
    assert_eq!(balance.active_allocations.len(), 1);

    let txns = svc.transactions("msme_1", None).unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].id, txn_id);
    assert_eq!(txns[0].status, TransactionStatus::Completed);
}

#[test]
fn test_disaster_summary_across_msmes() {
    let svc = memory_service();
    allocate(
        &svc,
        "msme_1",
        TokenType::ResilienceCredit,
        10_000,
        vec![SpendingCategory::Storage],
    );
    allocate(
        &svc,
        "msme_2",
        TokenType::ReliefToken,
        20_000,
        vec![SpendingCategory::Repairs, SpendingCategory::Wages],
    );

    let summary = svc.disaster_summary("disaster_1").unwrap();
    assert_eq!(summary.total_allocations, 2);
    assert_eq!(summary.total_allocated, TokenAmount::from(30_000));
    assert_eq!(summary.total_remaining, TokenAmount::from(30_000));
    assert_eq!(summary.allocations.len(), 2);
}
