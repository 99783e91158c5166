// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::operation::{
    AccountOpenOp, PointsOp, RedemptionCreateOp, RedemptionTransitionOp, RewardCreateOp, StockOp,
};
use kudos_core::{AccountId, EntryReason, RedemptionStatus, RewardId, Stock};
use std::io::Write;
use tempfile::TempDir;

fn temp_store_dir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().to_path_buf();
    (dir, path)
}

fn open_commit(account: &str, opening: u64) -> Commit {
    let mut commit = Commit::new();
    commit.expect(RecordKey::Account(AccountId::from(account)), 0);
    commit.push(Operation::AccountOpen(AccountOpenOp {
        account: account.to_string(),
        opened_at_micros: 0,
    }));
    commit.push(Operation::PointsCredit(PointsOp {
        account: account.to_string(),
        amount: opening,
        reason: EntryReason::Opening,
        redemption: None,
        at_micros: 0,
    }));
    commit
}

fn debit_commit(account: &str, amount: u64, expected_version: u64) -> Commit {
    let mut commit = Commit::new();
    commit.expect(RecordKey::Account(AccountId::from(account)), expected_version);
    commit.push(Operation::PointsDebit(PointsOp {
        account: account.to_string(),
        amount,
        reason: EntryReason::Deduction("late homework".to_string()),
        redemption: None,
        at_micros: 0,
    }));
    commit
}

fn balance(store: &WalStore, account: &str) -> Option<u64> {
    store.read(|s| s.account(&AccountId::from(account)).map(|a| a.balance))
}

#[test]
fn store_creates_directory() {
    let (_dir, path) = temp_store_dir();
    let subdir = path.join("nested");

    let store = WalStore::open(&subdir, "test-machine").unwrap();

    assert!(subdir.exists());
    assert_eq!(store.base_dir(), subdir.as_path());
    assert_eq!(store.sequence(), 0);
}

#[test]
fn commit_survives_reopen() {
    let (_dir, path) = temp_store_dir();
    {
        let store = WalStore::open(&path, "test-machine").unwrap();
        assert_eq!(store.commit(open_commit("student-1", 100)).unwrap(), 0);
        assert_eq!(store.commit(debit_commit("student-1", 30, 2)).unwrap(), 1);
    }

    let store = WalStore::open(&path, "test-machine").unwrap();
    assert_eq!(balance(&store, "student-1"), Some(70));
    assert_eq!(store.sequence(), 2);
    let history = store.read(|s| s.history(&AccountId::from("student-1")).to_vec());
    assert_eq!(history.len(), 2);
}

#[test]
fn stale_version_is_a_conflict_and_writes_nothing() {
    let (_dir, path) = temp_store_dir();
    let store = WalStore::open(&path, "test-machine").unwrap();
    store.commit(open_commit("student-1", 100)).unwrap();
    let wal_len = std::fs::metadata(path.join("wal.jsonl")).unwrap().len();

    let err = store.commit(debit_commit("student-1", 30, 1)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Conflict {
            expected: 1,
            found: 2,
            ..
        }
    ));
    assert_eq!(balance(&store, "student-1"), Some(100));
    assert_eq!(
        std::fs::metadata(path.join("wal.jsonl")).unwrap().len(),
        wal_len
    );
}

#[test]
fn invalid_batch_is_rejected_whole() {
    let (_dir, path) = temp_store_dir();
    let store = WalStore::open(&path, "test-machine").unwrap();
    store.commit(open_commit("student-1", 100)).unwrap();

    let mut commit = debit_commit("student-1", 60, 2);
    commit.operations.extend(debit_commit("student-1", 60, 2).operations);
    let err = store.commit(commit).unwrap_err();

    assert!(matches!(
        EconomyError::from(err),
        EconomyError::InsufficientFunds { balance: 40, .. }
    ));
    assert_eq!(balance(&store, "student-1"), Some(100));
    assert_eq!(store.sequence(), 1);
}

#[test]
fn empty_commit_writes_nothing() {
    let (_dir, path) = temp_store_dir();
    let store = WalStore::open(&path, "test-machine").unwrap();
    assert_eq!(store.commit(Commit::new()).unwrap(), 0);
    assert_eq!(store.sequence(), 0);
}

#[test]
fn torn_tail_is_discarded_on_open() {
    let (_dir, path) = temp_store_dir();
    {
        let store = WalStore::open(&path, "test-machine").unwrap();
        store.commit(open_commit("student-1", 100)).unwrap();
    }
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(path.join("wal.jsonl"))
        .unwrap();
    file.write_all(br#"{"sequence":1,"timest"#).unwrap();
    drop(file);

    let store = WalStore::open(&path, "test-machine").unwrap();
    assert_eq!(balance(&store, "student-1"), Some(100));
    assert_eq!(store.commit(debit_commit("student-1", 10, 2)).unwrap(), 1);

    let reopened = WalStore::open(&path, "test-machine").unwrap();
    assert_eq!(balance(&reopened, "student-1"), Some(90));
}

#[test]
fn mid_log_corruption_requires_repair() {
    let (_dir, path) = temp_store_dir();
    {
        let store = WalStore::open(&path, "test-machine").unwrap();
        store.commit(open_commit("student-1", 100)).unwrap();
    }
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(path.join("wal.jsonl"))
        .unwrap();
    file.write_all(b"garbage\n").unwrap();
    drop(file);

    assert!(matches!(
        WalStore::open(&path, "test-machine"),
        Err(StoreError::Corrupted { line: 2, .. })
    ));
    assert_eq!(WalStore::repair(&path).unwrap(), "garbage\n".len() as u64);

    let store = WalStore::open(&path, "test-machine").unwrap();
    assert_eq!(balance(&store, "student-1"), Some(100));
}

#[test]
fn store_errors_map_to_economy_errors() {
    let conflict = StoreError::Conflict {
        key: RecordKey::Account(AccountId::from("student-1")),
        expected: 1,
        found: 2,
    };
    assert_eq!(
        EconomyError::from(conflict),
        EconomyError::Busy {
            resource: "account student-1".to_string()
        }
    );
    assert!(matches!(
        EconomyError::from(StoreError::Unavailable("disk gone".to_string())),
        EconomyError::StorageUnavailable(_)
    ));
}

/// Open an account, stock a reward, claim it and reject the claim
fn rejected_claim(store: &WalStore) {
    store.commit(open_commit("student-1", 100)).unwrap();

    let mut reward = Commit::new();
    reward.push(Operation::RewardCreate(RewardCreateOp {
        id: "rwd-1".to_string(),
        name: "Pizza lunch".to_string(),
        description: String::new(),
        cost: 30,
        stock: Stock::Finite(2),
        active: true,
        created_at_micros: 0,
    }));
    store.commit(reward).unwrap();

    let mut claim = Commit::new();
    claim.push(Operation::PointsDebit(PointsOp {
        account: "student-1".to_string(),
        amount: 30,
        reason: EntryReason::Redemption,
        redemption: Some("rdm-1".to_string()),
        at_micros: 0,
    }));
    claim.push(Operation::StockReserve(StockOp {
        reward: "rwd-1".to_string(),
        quantity: 1,
    }));
    claim.push(Operation::RedemptionCreate(RedemptionCreateOp {
        id: "rdm-1".to_string(),
        account: "student-1".to_string(),
        reward: "rwd-1".to_string(),
        quantity: 1,
        points_spent: 30,
        created_at_micros: 0,
    }));
    store.commit(claim).unwrap();

    let mut reject = Commit::new();
    reject.push(Operation::PointsCredit(PointsOp {
        account: "student-1".to_string(),
        amount: 30,
        reason: EntryReason::Refund,
        redemption: Some("rdm-1".to_string()),
        at_micros: 0,
    }));
    reject.push(Operation::StockRelease(StockOp {
        reward: "rwd-1".to_string(),
        quantity: 1,
    }));
    reject.push(Operation::RedemptionTransition(RedemptionTransitionOp {
        id: "rdm-1".to_string(),
        from: RedemptionStatus::Pending,
        to: RedemptionStatus::Rejected,
        updated_at_micros: 0,
    }));
    store.commit(reject).unwrap();
}

#[test]
fn duplicated_rejection_is_never_replayed_in_part() {
    let (_dir, path) = temp_store_dir();
    {
        let store = WalStore::open(&path, "test-machine").unwrap();
        rejected_claim(&store);
        assert_eq!(balance(&store, "student-1"), Some(100));
    }
    let wal_path = path.join("wal.jsonl");
    let content = std::fs::read_to_string(&wal_path).unwrap();
    let last = content.lines().last().unwrap().to_string();
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(&wal_path)
        .unwrap();
    writeln!(file, "{}", last).unwrap();
    drop(file);

    assert!(matches!(
        WalStore::open(&path, "test-machine"),
        Err(StoreError::Corrupted { line: 5, .. })
    ));

    assert_eq!(WalStore::repair(&path).unwrap(), last.len() as u64 + 1);
    let store = WalStore::open(&path, "test-machine").unwrap();
    assert_eq!(balance(&store, "student-1"), Some(100));
    let stock = store.read(|s| s.reward(&RewardId::from("rwd-1")).map(|r| r.stock));
    assert_eq!(stock, Some(Stock::Finite(2)));
    assert_eq!(store.sequence(), 4);
}
