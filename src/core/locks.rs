//! Per-entity mutual exclusion
//!
//! Every account and savings plan gets its own mutex, created on first use
//! and dropped from the registry once its last holder releases it. A unit of
//! work takes all the locks it needs up front through
//! [`EntityLocks::acquire`], which always locks in the same global order
//! (accounts by ascending id, then plans by ascending id). Two operations on
//! unrelated entities never touch the same mutex; two operations sharing an
//! entity are serialized and cannot deadlock.

use crate::types::{AccountId, SavingsId};
use dashmap::DashMap;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::sync::Arc;

type EntityLock = Arc<Mutex<()>>;

/// Registry of per-account and per-plan locks
#[derive(Debug, Default)]
pub struct EntityLocks {
    accounts: DashMap<AccountId, EntityLock>,
    plans: DashMap<SavingsId, EntityLock>,
}

/// Guards held for the duration of one unit of work
///
/// Dropping the set releases every lock and prunes registry entries nobody
/// else is waiting on.
#[must_use = "locks are released as soon as the LockSet is dropped"]
pub struct LockSet<'a> {
    registry: &'a EntityLocks,
    accounts: Vec<AccountId>,
    plans: Vec<SavingsId>,
    guards: Vec<ArcMutexGuard<RawMutex, ()>>,
}

impl Drop for LockSet<'_> {
    fn drop(&mut self) {
        self.guards.clear();
        for id in &self.accounts {
            EntityLocks::prune(&self.registry.accounts, *id);
        }
        for id in &self.plans {
            EntityLocks::prune(&self.registry.plans, *id);
        }
    }
}

impl LockSet<'_> {
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the given accounts and plans, blocking until all are held
    ///
    /// Duplicate ids are locked once.
    pub fn acquire(&self, accounts: &[AccountId], plans: &[SavingsId]) -> LockSet<'_> {
        let accounts = canonical(accounts);
        let plans = canonical(plans);
        let mut guards = Vec::with_capacity(accounts.len() + plans.len());

        for id in &accounts {
            guards.push(Self::entry(&self.accounts, *id).lock_arc());
        }
        for id in &plans {
            guards.push(Self::entry(&self.plans, *id).lock_arc());
        }

        LockSet {
            registry: self,
            accounts,
            plans,
            guards,
        }
    }

    /// Number of entities that currently have a lock registered
    pub fn tracked(&self) -> usize {
        self.accounts.len() + self.plans.len()
    }

    // The map guard must be released before blocking on the entity mutex,
    // otherwise a waiter would stall the whole shard.
    fn entry(table: &DashMap<u64, EntityLock>, id: u64) -> EntityLock {
        Arc::clone(
            table
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    // Only the registry holds the Arc once every guard and waiter is gone.
    // Clones are taken under the same shard lock, so none can appear mid-check.
    fn prune(table: &DashMap<u64, EntityLock>, id: u64) {
        table.remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

fn canonical(ids: &[u64]) -> Vec<u64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
