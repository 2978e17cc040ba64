//! Thread-safe in-memory store
//!
//! This module provides [`MemoryStore`], a [`Store`] backed by `DashMap`
//! tables with fine-grained sharded locking.
//!
//! # Design
//!
//! Each entity type lives in its own table keyed by id. Accounts carry a
//! secondary index from account number and email to account id so an
//! identifier lookup is a single keyed read.
//!
//! # Atomicity
//!
//! [`Store::commit`] validates the whole batch before touching any table, so
//! a rejected batch leaves no trace. Applying a batch holds the write side of
//! a store-wide `RwLock` and every read holds the read side, so readers see
//! either none or all of a batch. Callers serialize conflicting batches with
//! entity locks (see [`EntityLocks`](super::EntityLocks)).

use super::batch::WriteBatch;
use super::traits::Store;
use crate::types::{
    Account, AccountId, HistoryId, PlanType, SavingsHistoryRecord, SavingsId, SavingsPlan,
    StoreError, TransactionId, TransactionRecord,
};
use dashmap::DashMap;
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory store using `DashMap` tables
#[derive(Debug)]
pub struct MemoryStore {
    accounts: DashMap<AccountId, Account>,

    /// Account number and email -> account id
    identifiers: DashMap<String, AccountId>,

    transactions: DashMap<TransactionId, TransactionRecord>,

    plans: DashMap<SavingsId, SavingsPlan>,

    history: DashMap<HistoryId, SavingsHistoryRecord>,

    /// Held for writing while a batch is applied, for reading by lookups
    visibility: RwLock<()>,

    transaction_seq: AtomicU64,
    savings_seq: AtomicU64,
    history_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            identifiers: DashMap::new(),
            transactions: DashMap::new(),
            plans: DashMap::new(),
            history: DashMap::new(),
            visibility: RwLock::new(()),
            transaction_seq: AtomicU64::new(1),
            savings_seq: AtomicU64::new(1),
            history_seq: AtomicU64::new(1),
        }
    }

    /// Store seeded with the given accounts
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = Self::new();
        for account in accounts {
            store.put_account(account);
        }
        store
    }

    /// Provision an account outside of any unit of work
    pub fn insert_account(&self, account: Account) {
        let _applying = self.visibility.write();
        self.put_account(account);
    }

    pub fn transaction_count(&self) -> usize {
        let _visible = self.visible();
        self.transactions.len()
    }

    pub fn history_count(&self) -> usize {
        let _visible = self.visible();
        self.history.len()
    }

    fn visible(&self) -> RwLockReadGuard<'_, ()> {
        self.visibility.read()
    }

    // New identifier keys go in before stale ones come out.
    fn put_account(&self, account: Account) {
        let previous = self.accounts.insert(account.id, account.clone());

        self.identifiers
            .insert(account.account_number.clone(), account.id);
        self.identifiers.insert(account.email.clone(), account.id);

        if let Some(previous) = previous {
            for key in [&previous.account_number, &previous.email] {
                if *key != account.account_number && *key != account.email {
                    self.identifiers.remove_if(key, |_, id| *id == account.id);
                }
            }
        }
    }

    fn account_unlocked(&self, id: AccountId) -> Option<Account> {
        self.accounts.get(&id).map(|entry| entry.value().clone())
    }

    fn unindex(&self, account: &Account) {
        for key in [&account.account_number, &account.email] {
            self.identifiers.remove_if(key, |_, id| *id == account.id);
        }
    }

    /// Remove an account together with everything it owns
    fn remove_account(&self, id: AccountId) {
        if let Some((_, account)) = self.accounts.remove(&id) {
            self.unindex(&account);
        }
        self.transactions.retain(|_, record| record.account != id);

        let owned: Vec<SavingsId> = self
            .plans
            .iter()
            .filter(|entry| entry.value().account == id)
            .map(|entry| *entry.key())
            .collect();
        for plan in owned {
            self.remove_plan(plan);
        }
    }

    fn remove_plan(&self, id: SavingsId) {
        self.plans.remove(&id);
        self.history.retain(|_, record| record.savings != id);
    }

    fn validate(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        for id in &batch.deleted_accounts {
            if !self.accounts.contains_key(id) {
                return Err(StoreError::Missing {
                    entity: "account",
                    id: *id,
                });
            }
        }
        for id in &batch.deleted_plans {
            if !self.plans.contains_key(id) {
                return Err(StoreError::Missing {
                    entity: "savings plan",
                    id: *id,
                });
            }
        }
        for plan in &batch.plans {
            let owner_known = self.accounts.contains_key(&plan.account)
                || batch.accounts.iter().any(|a| a.id == plan.account);
            if !owner_known {
                return Err(StoreError::Missing {
                    entity: "account",
                    id: plan.account,
                });
            }
        }
        Ok(())
    }

    fn sorted<K: Ord + Copy, V: Clone>(
        table: &DashMap<K, V>,
        key: impl Fn(&V) -> K,
        keep: impl Fn(&V) -> bool,
    ) -> Vec<V>
    where
        K: std::hash::Hash + Eq,
    {
        let mut rows: Vec<V> = table
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|row| key(row));
        rows
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let _visible = self.visible();
        Ok(self.account_unlocked(id))
    }

    fn account_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        let _visible = self.visible();
        let id = match self.identifiers.get(identifier) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        Ok(self.account_unlocked(id))
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        let _visible = self.visible();
        Ok(Self::sorted(&self.accounts, |a| a.id, |_| true))
    }

    fn savings_plan(&self, id: SavingsId) -> Result<Option<SavingsPlan>, StoreError> {
        let _visible = self.visible();
        Ok(self.plans.get(&id).map(|entry| entry.value().clone()))
    }

    fn savings_plan_for_account(
        &self,
        id: SavingsId,
        account: AccountId,
    ) -> Result<Option<SavingsPlan>, StoreError> {
        let _visible = self.visible();
        Ok(self
            .plans
            .get(&id)
            .filter(|entry| entry.value().account == account)
            .map(|entry| entry.value().clone()))
    }

    fn savings_for_account(&self, account: AccountId) -> Result<Vec<SavingsPlan>, StoreError> {
        let _visible = self.visible();
        Ok(Self::sorted(&self.plans, |p| p.id, |p| p.account == account))
    }

    fn savings_by_type(&self, plan_type: PlanType) -> Result<Vec<SavingsPlan>, StoreError> {
        let _visible = self.visible();
        Ok(Self::sorted(
            &self.plans,
            |p| p.id,
            |p| p.plan_type == plan_type,
        ))
    }

    fn active_savings(&self) -> Result<Vec<SavingsPlan>, StoreError> {
        let _visible = self.visible();
        Ok(Self::sorted(&self.plans, |p| p.id, |p| p.active))
    }

    fn transactions_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let _visible = self.visible();
        Ok(Self::sorted(
            &self.transactions,
            |t| t.id,
            |t| t.account == account,
        ))
    }

    fn history_for_plan(
        &self,
        savings: SavingsId,
    ) -> Result<Vec<SavingsHistoryRecord>, StoreError> {
        let _visible = self.visible();
        Ok(Self::sorted(
            &self.history,
            |h| h.id,
            |h| h.savings == savings,
        ))
    }

    fn next_transaction_id(&self) -> Result<TransactionId, StoreError> {
        Ok(self.transaction_seq.fetch_add(1, Ordering::SeqCst))
    }

    fn next_savings_id(&self) -> Result<SavingsId, StoreError> {
        Ok(self.savings_seq.fetch_add(1, Ordering::SeqCst))
    }

    fn next_history_id(&self) -> Result<HistoryId, StoreError> {
        Ok(self.history_seq.fetch_add(1, Ordering::SeqCst))
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let _applying = self.visibility.write();
        self.validate(&batch)?;

        let WriteBatch {
            accounts,
            deleted_accounts,
            transactions,
            plans,
            deleted_plans,
            history,
        } = batch;

        for account in accounts {
            self.put_account(account);
        }
        for record in transactions {
            self.transactions.insert(record.id, record);
        }
        for plan in plans {
            self.plans.insert(plan.id, plan);
        }
        for record in history {
            self.history.insert(record.id, record);
        }
        for id in deleted_plans {
            self.remove_plan(id);
        }
        for id in deleted_accounts {
            self.remove_account(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{customer, date, plan};
    use crate::types::{BankName, HistoryEvent};
    use rust_decimal::Decimal;

    #[test]
    fn test_identifier_lookup_matches_number_and_email() {
        let store = MemoryStore::with_accounts([customer(1, "RowBank", 100)]);

        let by_number = store.account_by_identifier("0000000001").unwrap();
        let by_email = store.account_by_identifier("user1@example.com").unwrap();

        assert_eq!(by_number.map(|a| a.id), Some(1));
        assert_eq!(by_email.map(|a| a.id), Some(1));
        assert!(store.account_by_identifier("nobody").unwrap().is_none());
    }

    #[test]
    fn test_saving_account_reindexes_identifiers() {
        let store = MemoryStore::with_accounts([customer(1, "RowBank", 100)]);
        let mut account = store.account(1).unwrap().unwrap();
        account.email = "new@example.com".to_string();

        let mut batch = WriteBatch::new();
        batch.save_account(account);
        store.commit(batch).unwrap();

        assert!(store
            .account_by_identifier("user1@example.com")
            .unwrap()
            .is_none());
        assert!(store
            .account_by_identifier("new@example.com")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_commit_applies_every_staged_write() {
        let store = MemoryStore::with_accounts([customer(1, "RowBank", 100)]);
        let mut account = store.account(1).unwrap().unwrap();
        account.balance = Decimal::new(40, 0);
        let saved = plan(store.next_savings_id().unwrap(), 1, PlanType::Flexible, 60);

        let mut batch = WriteBatch::new();
        batch
            .save_account(account)
            .save_plan(saved.clone())
            .append_history(SavingsHistoryRecord {
                id: store.next_history_id().unwrap(),
                savings: saved.id,
                event: HistoryEvent::Deposit,
                amount: Decimal::new(60, 0),
                timestamp: date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap(),
            });
        assert_eq!(batch.len(), 3);
        store.commit(batch).unwrap();

        assert_eq!(store.account(1).unwrap().unwrap().balance, Decimal::new(40, 0));
        assert_eq!(store.savings_plan(saved.id).unwrap(), Some(saved.clone()));
        assert_eq!(store.history_for_plan(saved.id).unwrap().len(), 1);
    }

    #[test]
    fn test_rejected_batch_leaves_no_trace() {
        let store = MemoryStore::with_accounts([customer(1, "RowBank", 100)]);
        let mut account = store.account(1).unwrap().unwrap();
        account.balance = Decimal::ZERO;

        let mut batch = WriteBatch::new();
        batch.save_account(account).delete_plan(99);

        let result = store.commit(batch);

        assert_eq!(
            result,
            Err(StoreError::Missing {
                entity: "savings plan",
                id: 99
            })
        );
        assert_eq!(store.account(1).unwrap().unwrap().balance, Decimal::new(100, 0));
    }

    #[test]
    fn test_plan_for_unknown_owner_is_rejected() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.save_plan(plan(1, 42, PlanType::Flexible, 10));

        assert!(matches!(
            store.commit(batch),
            Err(StoreError::Missing { entity: "account", id: 42 })
        ));
        assert!(store.savings_plan(1).unwrap().is_none());
    }

    #[test]
    fn test_plan_lookup_enforces_ownership() {
        let store = MemoryStore::with_accounts([
            customer(1, "RowBank", 0),
            customer(2, "RowBank", 0),
        ]);
        let mut batch = WriteBatch::new();
        batch.save_plan(plan(5, 1, PlanType::Flexible, 10));
        store.commit(batch).unwrap();

        assert!(store.savings_plan_for_account(5, 1).unwrap().is_some());
        assert!(store.savings_plan_for_account(5, 2).unwrap().is_none());
    }

    #[test]
    fn test_listings_are_filtered_and_ordered() {
        let store = MemoryStore::with_accounts([customer(1, "RowBank", 0)]);
        let mut inactive = plan(2, 1, PlanType::Fixed, 10);
        inactive.active = false;

        let mut batch = WriteBatch::new();
        batch
            .save_plan(plan(3, 1, PlanType::Flexible, 10))
            .save_plan(inactive)
            .save_plan(plan(1, 1, PlanType::Fixed, 10));
        store.commit(batch).unwrap();

        let fixed: Vec<_> = store
            .savings_by_type(PlanType::Fixed)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        let active: Vec<_> = store.active_savings().unwrap().iter().map(|p| p.id).collect();

        assert_eq!(fixed, vec![1, 2]);
        assert_eq!(active, vec![1, 3]);
    }

    #[test]
    fn test_deleting_account_cascades_to_owned_records() {
        let store = MemoryStore::with_accounts([
            customer(1, "RowBank", 0),
            customer(2, "RowBank", 0),
        ]);
        let mut batch = WriteBatch::new();
        batch
            .save_plan(plan(1, 1, PlanType::Flexible, 10))
            .save_plan(plan(2, 2, PlanType::Flexible, 10))
            .append_transaction(TransactionRecord::credit(
                1,
                1,
                BankName::from("RowBank"),
                Decimal::ONE,
                date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap(),
                None,
            ));
        store.commit(batch).unwrap();

        let mut batch = WriteBatch::new();
        batch.delete_account(1);
        store.commit(batch).unwrap();

        assert!(store.account(1).unwrap().is_none());
        assert!(store.account_by_identifier("0000000001").unwrap().is_none());
        assert!(store.savings_plan(1).unwrap().is_none());
        assert!(store.savings_plan(2).unwrap().is_some());
        assert_eq!(store.transaction_count(), 0);
    }

    #[test]
    fn test_id_sequences_are_monotonic() {
        let store = MemoryStore::new();
        let first = store.next_transaction_id().unwrap();
        let second = store.next_transaction_id().unwrap();
        assert!(second > first);
        assert_eq!(store.next_savings_id().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_id_allocation_never_repeats() {
        use std::collections::HashSet;
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryStore::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                (0..100)
                    .map(|_| store.next_history_id().unwrap())
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 800);
    }
}
