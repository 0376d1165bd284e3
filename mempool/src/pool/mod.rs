// Copyright (c) 2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://spdx.org/licenses/MIT
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use parking_lot::RwLock;
use std::{cmp::Ordering, collections::BTreeSet, num::NonZeroUsize, sync::Arc, time::Duration};

use common::{
    chain::{ChainConfig, OutPoint, OutPointSourceId, SignedTransaction, Transaction},
    primitives::{Amount, BlockHeight, Id, Idable},
    time_getter::TimeGetter,
};
use enumflags2::BitFlags;
use logging::log;
use randomness::Rng;
use utils::{
    eventhandler::{EventHandler, EventsController},
    tap_error_log::LogError,
};
use utxo::UtxosView;

use self::{
    entry::TxMempoolEntry,
    fee::Fee,
    feerate::{FeeRate, INCREMENTAL_RELAY_FEE_RATE, INCREMENTAL_RELAY_THRESHOLD},
    reorg::LockTimeFlag,
    rolling_fee_rate::RollingFeeRate,
    store::{Ancestors, Descendants, MempoolRemovalReason, MempoolStore},
};
use crate::{
    config::*,
    error::MempoolPolicyError,
    event::MempoolEvent,
    get_memory_usage::GetMemoryUsage,
    tx_accumulator::TransactionAccumulator,
};

mod check;
pub mod entry;
pub mod fee;
pub mod feerate;
pub mod reorg;
pub mod rolling_fee_rate;
pub mod store;
mod utxos_view;

pub use utxos_view::MempoolUtxosView;

/// What the relay layer gets to know about one entry.
#[derive(Debug, Clone)]
pub struct TxMempoolInfo {
    pub tx: SignedTransaction,
    pub time: Time,
    pub feerate: FeeRate,
    pub fee_delta: Fee,
}

/// The transaction pool.
///
/// A single logical object: the caller serializes all access behind one
/// exclusive lock and holds it for the duration of each operation. Event
/// handlers fire while that lock is held and must not reenter the pool.
pub struct Mempool {
    chain_config: Arc<ChainConfig>,
    store: MempoolStore,
    rolling_fee_rate: RwLock<RollingFeeRate>,
    max_size: usize,
    max_tx_age: Duration,
    chain_limits: ChainLimits,
    check_frequency: u32,
    clock: TimeGetter,
    events_controller: EventsController<MempoolEvent>,
    transactions_updated: u64,
}

impl std::fmt::Debug for Mempool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.store)
    }
}

impl Mempool {
    pub fn new(chain_config: Arc<ChainConfig>, clock: TimeGetter) -> Self {
        Self {
            chain_config,
            store: MempoolStore::new(),
            rolling_fee_rate: RwLock::new(RollingFeeRate::new(clock.get_time())),
            max_size: MAX_MEMPOOL_SIZE_BYTES,
            max_tx_age: DEFAULT_MEMPOOL_EXPIRY,
            chain_limits: ChainLimits::default(),
            check_frequency: 0,
            clock,
            events_controller: Default::default(),
            transactions_updated: 0,
        }
    }

    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain_config
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }

    pub fn set_max_tx_age(&mut self, max_tx_age: Duration) {
        self.max_tx_age = max_tx_age;
    }

    pub fn chain_limits(&self) -> &ChainLimits {
        &self.chain_limits
    }

    pub fn set_chain_limits(&mut self, limits: ChainLimits) {
        self.chain_limits = limits;
    }

    /// Enable the probabilistic self-audit: `frequency` is the probability
    /// that any given [Mempool::check] call actually runs the audit.
    pub fn set_check_frequency(&mut self, frequency: f64) {
        self.check_frequency = (frequency * u32::MAX as f64) as u32;
    }

    /// Monotonic change counter. Bumped by every mutation that adds or
    /// removes an entry or touches an in-pool entry's prioritisation.
    pub fn transactions_updated(&self) -> u64 {
        self.transactions_updated
    }

    pub fn subscribe_to_events(&mut self, handler: EventHandler<MempoolEvent>) {
        self.events_controller.subscribe_to_events(handler)
    }

    /// Drop every entry. Prioritisation deltas survive, consistent with
    /// their lifecycle being independent of pool membership.
    pub fn clear(&mut self) {
        self.store.clear();
        *self.rolling_fee_rate.write() = RollingFeeRate::new(self.clock.get_time());
        self.transactions_updated += 1;
    }
}

// Rolling-fee-related methods
impl Mempool {
    fn rolling_fee_halflife(&self, size_limit: usize) -> Time {
        let mem_usage = self.store.dynamic_memory_usage();
        if mem_usage < size_limit / 4 {
            ROLLING_FEE_BASE_HALFLIFE / 4
        } else if mem_usage < size_limit / 2 {
            ROLLING_FEE_BASE_HALFLIFE / 2
        } else {
            ROLLING_FEE_BASE_HALFLIFE
        }
    }

    /// Raise the rolling minimum to the feerate of an evicted package.
    fn track_package_removed(&self, rate: FeeRate) {
        let mut rolling_fee_rate = self.rolling_fee_rate.write();
        if rate.atoms_per_kb() > rolling_fee_rate.rolling_minimum_fee_rate().atoms_per_kb() {
            rolling_fee_rate.set_rolling_minimum_fee_rate(rate);
            rolling_fee_rate.set_block_since_last_rolling_fee_bump(false);
        }
    }

    /// The feerate floor the relay layer should enforce, decayed lazily.
    ///
    /// `size_limit` is the byte cap the pool is being run with; a pool well
    /// below the cap decays its floor faster.
    pub fn get_min_fee(&self, size_limit: usize) -> FeeRate {
        {
            let rolling_fee_rate = self.rolling_fee_rate.read();
            if !rolling_fee_rate.block_since_last_rolling_fee_bump()
                || rolling_fee_rate.rolling_minimum_fee_rate() == FeeRate::new(Amount::ZERO)
            {
                return rolling_fee_rate.rolling_minimum_fee_rate();
            }
        }

        let time = self.clock.get_time();
        if time
            > self.rolling_fee_rate.read().last_rolling_fee_update() + ROLLING_FEE_DECAY_INTERVAL
        {
            let halflife = self.rolling_fee_halflife(size_limit);
            let mut rolling_fee_rate = self.rolling_fee_rate.write();
            *rolling_fee_rate = rolling_fee_rate.decay_fee(halflife, time);

            if rolling_fee_rate.rolling_minimum_fee_rate() < INCREMENTAL_RELAY_THRESHOLD {
                log::trace!(
                    "rolling fee rate {:?} fell below half of the incremental relay fee, dropping to zero",
                    rolling_fee_rate.rolling_minimum_fee_rate(),
                );
                rolling_fee_rate.set_rolling_minimum_fee_rate(FeeRate::new(Amount::ZERO));
                return FeeRate::new(Amount::ZERO);
            }
        }

        std::cmp::max(
            self.rolling_fee_rate.read().rolling_minimum_fee_rate(),
            INCREMENTAL_RELAY_FEE_RATE,
        )
    }
}

// Admission
impl Mempool {
    /// Admit a validated entry.
    ///
    /// The entry's ancestor set is computed under the configured chain
    /// limits first; on a limit violation the error is returned and nothing
    /// changes. The caller guarantees the transaction has not been admitted
    /// before. `valid_fee_estimate` is passed through to the added event for
    /// the fee estimator to pick up.
    pub fn add_transaction(
        &mut self,
        entry: TxMempoolEntry,
        valid_fee_estimate: bool,
    ) -> Result<(), MempoolPolicyError> {
        let tx_id = entry.tx_id();
        assert!(!self.store.contains(&tx_id), "Transaction {tx_id} already in the pool");

        let ancestors = self
            .store
            .calculate_mempool_ancestors(&entry, &self.chain_limits, true)
            .log_err_pfx("Transaction rejected")?;
        let tx = entry.tx().clone();
        self.store.add_tx(entry, ancestors)?;
        self.transactions_updated += 1;
        self.events_controller.broadcast(MempoolEvent::TransactionAdded {
            tx,
            valid_fee_estimate,
        });
        Ok(())
    }
}

// Queries
impl Mempool {
    pub fn contains_transaction(&self, tx_id: &Id<Transaction>) -> bool {
        self.store.contains(tx_id)
    }

    pub fn get(&self, tx_id: &Id<Transaction>) -> Option<&SignedTransaction> {
        self.store.get_entry(tx_id).map(TxMempoolEntry::tx)
    }

    pub fn entry(&self, tx_id: &Id<Transaction>) -> Option<&TxMempoolEntry> {
        self.store.get_entry(tx_id)
    }

    pub fn info(&self, tx_id: &Id<Transaction>) -> Option<TxMempoolInfo> {
        self.store.get_entry(tx_id).map(Self::entry_info)
    }

    fn entry_info(entry: &TxMempoolEntry) -> TxMempoolInfo {
        TxMempoolInfo {
            tx: entry.tx().clone(),
            time: entry.time(),
            feerate: FeeRate::from_total_tx_fee(
                entry.fee(),
                NonZeroUsize::new(entry.vsize()).expect("nonzero vsize"),
            )
            .expect("feerate of a pool entry"),
            fee_delta: entry.fee_delta(),
        }
    }

    pub fn info_all(&self) -> Vec<TxMempoolInfo> {
        self.entries_by_depth_and_score().into_iter().map(Self::entry_info).collect()
    }

    /// All ids, ordered by (ancestor count, own feerate): parents before
    /// children, better-paying first among equals. This is the order the
    /// relay layer announces in.
    pub fn query_hashes_sorted(&self) -> Vec<Id<Transaction>> {
        self.entries_by_depth_and_score().into_iter().map(TxMempoolEntry::tx_id).collect()
    }

    /// Whether `tx_id_a` sorts strictly before `tx_id_b` in announcement
    /// order. An absent first transaction sorts last, an absent second one
    /// first.
    pub fn compare_depth_and_score(
        &self,
        tx_id_a: &Id<Transaction>,
        tx_id_b: &Id<Transaction>,
    ) -> bool {
        let entry_a = match self.store.get_entry(tx_id_a) {
            Some(entry) => entry,
            None => return false,
        };
        let entry_b = match self.store.get_entry(tx_id_b) {
            Some(entry) => entry,
            None => return true,
        };
        depth_and_score_cmp(entry_a, entry_b) == Ordering::Less
    }

    fn entries_by_depth_and_score(&self) -> Vec<&TxMempoolEntry> {
        let mut entries: Vec<&TxMempoolEntry> = self.store.txs_by_id.values().collect();
        entries.sort_by(|a, b| depth_and_score_cmp(a, b));
        entries
    }

    pub fn is_spent(&self, outpoint: &OutPoint) -> bool {
        self.store.is_spent(outpoint)
    }

    /// Whether no input of the given transaction spends an in-pool output.
    pub fn has_no_inputs_of(&self, tx: &Transaction) -> bool {
        !tx.inputs().iter().any(|input| {
            input
                .outpoint()
                .tx_id()
                .get_tx_id()
                .is_some_and(|id| self.store.contains(id))
        })
    }

    /// Relay-side probe: true if the transaction is absent, or sits in a
    /// package whose depth both ways is below the given limit.
    pub fn is_within_chain_limit(&self, tx_id: &Id<Transaction>, chain_limit: usize) -> bool {
        self.store.get_entry(tx_id).map_or(true, |entry| {
            entry.count_with_ancestors() < chain_limit
                && entry.count_with_descendants() < chain_limit
        })
    }

    pub fn fee_delta(&self, tx_id: &Id<Transaction>) -> Option<Fee> {
        self.store.fee_delta(tx_id)
    }

    pub fn dynamic_memory_usage(&self) -> usize {
        self.store.dynamic_memory_usage()
    }

    pub fn calculate_ancestors(
        &self,
        entry: &TxMempoolEntry,
        limits: &ChainLimits,
        search_for_parents: bool,
    ) -> Result<Ancestors, MempoolPolicyError> {
        self.store.calculate_mempool_ancestors(entry, limits, search_for_parents)
    }

    /// In-pool descendants of the given transaction, itself included.
    /// Empty if the transaction is not in the pool.
    pub fn calculate_descendants(&self, tx_id: &Id<Transaction>) -> Descendants {
        if self.store.contains(tx_id) {
            self.store.calculate_descendants(tx_id)
        } else {
            BTreeSet::new().into()
        }
    }
}

// Removal
impl Mempool {
    fn remove_staged(
        &mut self,
        stage: &BTreeSet<Id<Transaction>>,
        update_descendants: bool,
        reason: MempoolRemovalReason,
    ) -> usize {
        let removed = self.store.remove_staged(stage, update_descendants, reason);
        let count = removed.len();
        for entry in removed {
            self.transactions_updated += 1;
            self.events_controller.broadcast(MempoolEvent::TransactionRemoved {
                tx: entry.into_tx(),
                reason,
            });
        }
        count
    }

    /// Remove the transaction and everything in the pool that spends any of
    /// its outputs. If the transaction itself is absent, its in-pool
    /// spenders are still removed; this cleans up after a conflicting
    /// transaction confirmed elsewhere.
    pub fn remove_recursive(&mut self, tx: &Transaction, reason: MempoolRemovalReason) {
        let tx_id = tx.get_id();
        let mut to_remove: BTreeSet<Id<Transaction>> = BTreeSet::new();
        if self.store.contains(&tx_id) {
            to_remove.insert(tx_id);
        } else {
            for index in 0..tx.outputs().len() {
                let outpoint = OutPoint::new(OutPointSourceId::Transaction(tx_id), index as u32);
                if let Some(spender) = self.store.find_conflicting_tx(&outpoint) {
                    to_remove.insert(spender);
                }
            }
        }

        let mut stage: BTreeSet<Id<Transaction>> = BTreeSet::new();
        for id in &to_remove {
            if stage.contains(id) {
                continue;
            }
            stage.extend(BTreeSet::from(self.store.calculate_descendants(id)));
        }
        self.remove_staged(&stage, false, reason);
    }

    /// For each input of `tx`, recursively remove the in-pool package that
    /// spends the same outpoint.
    pub fn remove_conflicts(&mut self, tx: &Transaction) {
        let tx_id = tx.get_id();
        let conflicts: Vec<Id<Transaction>> = tx
            .inputs()
            .iter()
            .filter_map(|input| self.store.find_conflicting_tx(input.outpoint()))
            .filter(|conflict_id| *conflict_id != tx_id)
            .collect();

        for conflict_id in conflicts {
            if let Some(entry) = self.store.get_entry(&conflict_id) {
                let conflict_tx = entry.transaction().clone();
                self.store.clear_fee_delta(&conflict_id);
                self.remove_recursive(&conflict_tx, MempoolRemovalReason::Conflict);
            }
        }
    }

    /// A block was connected: drop exactly the confirmed transactions (their
    /// descendants remain valid and stay, with one fewer in-pool ancestor
    /// each), purge whatever conflicts with the block, and let the rolling
    /// fee floor start decaying again.
    pub fn remove_for_block(&mut self, txs: &[SignedTransaction], block_height: BlockHeight) {
        log::debug!("remove_for_block: {} transactions at height {block_height}", txs.len());
        for tx in txs {
            let tx_id = tx.get_id();
            if self.store.contains(&tx_id) {
                let stage = BTreeSet::from([tx_id]);
                self.remove_staged(&stage, true, MempoolRemovalReason::Block);
            }
            self.remove_conflicts(tx.transaction());
            self.store.clear_fee_delta(&tx_id);
        }
        let mut rolling_fee_rate = self.rolling_fee_rate.write();
        rolling_fee_rate.set_last_rolling_fee_update(self.clock.get_time());
        rolling_fee_rate.set_block_since_last_rolling_fee_bump(true);
    }

    /// The chain tip changed in a way that may invalidate entries: purge
    /// everything whose time locks no longer hold against the new tip, and
    /// every coinbase spender whose source is now immature or gone.
    pub fn remove_for_reorg<V: UtxosView>(
        &mut self,
        view: &V,
        tip_height: BlockHeight,
        tip_time: Time,
        flags: BitFlags<LockTimeFlag>,
    ) {
        reorg::remove_for_reorg(self, view, tip_height, tip_time, flags)
    }

    /// Remove entries older than the cutoff, descendants included.
    /// Returns the number of entries removed.
    pub fn expire(&mut self, cutoff: Time) -> usize {
        let expired: Vec<Id<Transaction>> = self
            .store
            .txs_by_creation_time
            .iter()
            .take_while(|(time, _)| **time < cutoff)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();

        let mut stage: BTreeSet<Id<Transaction>> = BTreeSet::new();
        for id in expired {
            if stage.contains(&id) {
                continue;
            }
            log::trace!("expire: tx {id} is past the cutoff {cutoff:?}");
            stage.extend(BTreeSet::from(self.store.calculate_descendants(&id)));
        }
        self.remove_staged(&stage, false, MempoolRemovalReason::Expiry)
    }

    /// Expire entries older than the configured maximum age.
    pub fn remove_expired_transactions(&mut self) -> usize {
        let cutoff = self.clock.get_time().saturating_sub(self.max_tx_age);
        self.expire(cutoff)
    }

    /// Evict worst-feerate packages until memory usage fits the byte limit.
    ///
    /// Each eviction bumps the rolling minimum fee to the evicted package's
    /// feerate plus the incremental relay fee. If `no_spends_remaining` is
    /// given, it receives the outpoints that no longer have any in-pool
    /// spender, so the caller can drop related caches.
    pub fn trim_to_size(
        &mut self,
        size_limit: usize,
        mut no_spends_remaining: Option<&mut Vec<OutPoint>>,
    ) {
        let mut txns_removed = 0;
        let mut max_fee_rate_removed = FeeRate::new(Amount::ZERO);

        while !self.store.is_empty() && self.store.dynamic_memory_usage() > size_limit {
            let worst_id = *self
                .store
                .txs_by_descendant_score
                .values()
                .flatten()
                .next()
                .expect("pool not empty");
            let entry = self.store.get_entry(&worst_id).expect("worst entry in the pool");

            let package_rate = FeeRate::from_total_tx_fee(
                entry.fees_with_descendants(),
                NonZeroUsize::new(entry.size_with_descendants()).expect("nonzero package size"),
            )
            .expect("package feerate");
            let removed_rate =
                (package_rate + INCREMENTAL_RELAY_FEE_RATE).expect("feerate bump overflow");
            self.track_package_removed(removed_rate);
            max_fee_rate_removed = std::cmp::max(max_fee_rate_removed, removed_rate);

            let stage = BTreeSet::from(self.store.calculate_descendants(&worst_id));
            txns_removed += stage.len();

            let removed =
                self.store.remove_staged(&stage, false, MempoolRemovalReason::SizeLimit);
            if let Some(out) = no_spends_remaining.as_mut() {
                for removed_entry in &removed {
                    for input in removed_entry.transaction().inputs() {
                        let outpoint = input.outpoint();
                        match outpoint.tx_id().get_tx_id() {
                            Some(source) if self.store.contains(source) => {}
                            _ => out.push(outpoint.clone()),
                        }
                    }
                }
            }
            for removed_entry in removed {
                self.transactions_updated += 1;
                self.events_controller.broadcast(MempoolEvent::TransactionRemoved {
                    tx: removed_entry.into_tx(),
                    reason: MempoolRemovalReason::SizeLimit,
                });
            }
        }

        if txns_removed > 0 {
            log::debug!(
                "trim_to_size: removed {txns_removed} txs, rolling minimum fee bumped to {:?}",
                max_fee_rate_removed,
            );
        }
    }

    /// Trim against the configured byte cap.
    pub fn limit_mempool_size(&mut self) {
        self.trim_to_size(self.max_size, None)
    }
}

// Prioritisation
impl Mempool {
    /// Bias the effective fee of a transaction by `delta`. Applies to the
    /// in-pool entry (and all aggregates that include it) immediately if
    /// present, and is remembered for later admission otherwise.
    pub fn prioritise_transaction(&mut self, tx_id: Id<Transaction>, delta: Amount) {
        let in_pool = self.store.prioritise(tx_id, delta);
        if in_pool {
            self.transactions_updated += 1;
        }
        log::debug!("prioritise_transaction: {tx_id} fee += {delta}");
    }

    pub fn clear_prioritisation(&mut self, tx_id: &Id<Transaction>) {
        self.store.clear_fee_delta(tx_id);
    }
}

// Block template selection
impl Mempool {
    /// Feed transactions into the accumulator in ancestor-score order, best
    /// first, until it reports it is done.
    pub fn collect_txs(
        &self,
        mut tx_accumulator: Box<dyn TransactionAccumulator>,
    ) -> Box<dyn TransactionAccumulator> {
        let mut tx_iter = self.store.txs_by_ancestor_score.values().flatten().rev();
        while !tx_accumulator.done() {
            match tx_iter.next() {
                Some(tx_id) => {
                    let next_tx = self.store.txs_by_id.get(tx_id).expect("tx to exist");
                    match tx_accumulator.add_tx(next_tx.tx().clone(), next_tx.fee()) {
                        Ok(()) => (),
                        Err(err) => {
                            log::error!(
                                "collect_txs: failed to add transaction {}: {err}",
                                next_tx.tx_id(),
                            )
                        }
                    }
                }
                None => break,
            }
        }
        tx_accumulator
    }
}

// Self-audit
impl Mempool {
    /// Probabilistic deep audit of every invariant the pool maintains,
    /// cross-checked against the given confirmed-utxo view at the given
    /// spend height. Any mismatch is a bug in the pool or its callers, and
    /// aborts the process.
    pub fn check<V: UtxosView>(&self, view: &V, spend_height: BlockHeight) {
        if self.check_frequency == 0 {
            return;
        }
        if randomness::make_true_rng().gen::<u32>() >= self.check_frequency {
            return;
        }
        check::check_pool(self, view, spend_height);
    }
}

impl GetMemoryUsage for Mempool {
    fn get_memory_usage(&self) -> usize {
        self.store.dynamic_memory_usage()
    }
}

/// Announcement order: entries with fewer in-pool ancestors first, then by
/// own modified feerate (higher first), then by id.
fn depth_and_score_cmp(a: &TxMempoolEntry, b: &TxMempoolEntry) -> Ordering {
    a.count_with_ancestors()
        .cmp(&b.count_with_ancestors())
        .then_with(|| {
            let rate_a = a.modified_fee().into_amount().into_atoms() * b.vsize() as i128;
            let rate_b = b.modified_fee().into_amount().into_atoms() * a.vsize() as i128;
            rate_b.cmp(&rate_a)
        })
        .then_with(|| a.tx_id().cmp(&b.tx_id()))
}

#[cfg(test)]
mod tests;
