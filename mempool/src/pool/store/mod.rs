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

use std::{
    cmp::Ordering,
    collections::{btree_map::Entry::Occupied, BTreeMap, BTreeSet},
};

use common::{
    chain::{OutPoint, Transaction},
    primitives::{Amount, Id},
};
use logging::log;
use utils::{ensure, newtype};

use self::mem_usage::MemUsage;
use super::{entry::TxMempoolEntry, fee::Fee};
use crate::{
    config::{ChainLimits, Time},
    error::MempoolPolicyError,
};

pub mod mem_usage;

newtype! {
    #[derive(Debug, Clone)]
    pub struct Ancestors(BTreeSet<Id<Transaction>>);
}

impl Ancestors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

newtype! {
    #[derive(Debug, Clone)]
    pub struct Descendants(BTreeSet<Id<Transaction>>);
}

impl Descendants {
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Why an entry left the pool, as reported to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MempoolRemovalReason {
    Expiry,
    SizeLimit,
    Reorg,
    Block,
    Conflict,
    Replaced,
    Unknown,
}

/// Eviction key: the feerate of an entry's whole descendant package,
/// compared exactly as the rational `fees / size` by cross-multiplication.
/// Entries whose packages have equal feerates share one index slot; the
/// per-slot id set breaks the tie by hash.
#[derive(Debug, Clone, Copy)]
pub struct DescendantScore {
    fees: Amount,
    size: usize,
}

impl DescendantScore {
    fn of(entry: &TxMempoolEntry) -> Self {
        Self {
            fees: entry.fees_with_descendants().into_amount(),
            size: entry.size_with_descendants(),
        }
    }

    fn cross_cmp(&self, other: &Self) -> Ordering {
        let a = self.fees.into_atoms() * other.size as i128;
        let b = other.fees.into_atoms() * self.size as i128;
        a.cmp(&b)
    }
}

impl PartialEq for DescendantScore {
    fn eq(&self, other: &Self) -> bool {
        self.cross_cmp(other) == Ordering::Equal
    }
}

impl Eq for DescendantScore {}

impl PartialOrd for DescendantScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cross_cmp(other))
    }
}

impl Ord for DescendantScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cross_cmp(other)
    }
}

/// Selection key: the feerate of an entry's whole ancestor package. Same
/// comparison scheme as [DescendantScore].
#[derive(Debug, Clone, Copy)]
pub struct AncestorScore {
    fees: Amount,
    size: usize,
}

impl AncestorScore {
    fn of(entry: &TxMempoolEntry) -> Self {
        Self {
            fees: entry.fees_with_ancestors().into_amount(),
            size: entry.size_with_ancestors(),
        }
    }

    fn cross_cmp(&self, other: &Self) -> Ordering {
        let a = self.fees.into_atoms() * other.size as i128;
        let b = other.fees.into_atoms() * self.size as i128;
        a.cmp(&b)
    }
}

impl PartialEq for AncestorScore {
    fn eq(&self, other: &Self) -> bool {
        self.cross_cmp(other) == Ordering::Equal
    }
}

impl Eq for AncestorScore {}

impl PartialOrd for AncestorScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cross_cmp(other))
    }
}

impl Ord for AncestorScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cross_cmp(other)
    }
}

#[derive(Debug)]
pub struct MempoolStore {
    // This is the "main" data structure storing Mempool entries. All other structures in the
    // MempoolStore contain ids (hashes) of entries, sorted according to some order of interest.
    pub txs_by_id: BTreeMap<Id<Transaction>, TxMempoolEntry>,

    // Entries sorted by the feerate of their descendant package, worst first.
    // When the pool grows past its byte cap, the head of this index names the
    // most economically reasonable package to evict.
    pub txs_by_descendant_score: BTreeMap<DescendantScore, BTreeSet<Id<Transaction>>>,

    // Entries sorted by the feerate of their ancestor package. Block
    // production walks this index from the best end.
    pub txs_by_ancestor_score: BTreeMap<AncestorScore, BTreeSet<Id<Transaction>>>,

    // Entries sorted by insertion time, earliest first, for expiry.
    pub txs_by_creation_time: BTreeMap<Time, BTreeSet<Id<Transaction>>>,

    // For every input of every entry, the entry spending it. Used to detect
    // conflicts (double-spends) and to discover in-pool children.
    pub spender_txs: BTreeMap<OutPoint, Id<Transaction>>,

    // Prioritisation deltas by transaction id. Outlives pool membership: a
    // delta declared before admission is applied when the transaction shows
    // up, and one left after removal applies on re-admission.
    fee_deltas: BTreeMap<Id<Transaction>, Fee>,

    // Sum of entry virtual sizes.
    total_tx_size: usize,

    // Bytes held indirectly by entries (tx payload buffers) and by the
    // per-entry parent/child link sets. Kept in lock-step with mutations.
    cached_inner_usage: usize,
}

impl MempoolStore {
    pub fn new() -> Self {
        Self {
            txs_by_id: BTreeMap::new(),
            txs_by_descendant_score: BTreeMap::new(),
            txs_by_ancestor_score: BTreeMap::new(),
            txs_by_creation_time: BTreeMap::new(),
            spender_txs: BTreeMap::new(),
            fee_deltas: BTreeMap::new(),
            total_tx_size: 0,
            cached_inner_usage: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.txs_by_id.is_empty()
    }

    /// Drop all entries and indices. Fee deltas are kept: their lifecycle is
    /// independent of pool membership.
    pub fn clear(&mut self) {
        let fee_deltas = std::mem::take(&mut self.fee_deltas);
        *self = Self::new();
        self.fee_deltas = fee_deltas;
    }

    pub fn get_entry(&self, id: &Id<Transaction>) -> Option<&TxMempoolEntry> {
        self.txs_by_id.get(id)
    }

    pub fn contains(&self, id: &Id<Transaction>) -> bool {
        self.txs_by_id.contains_key(id)
    }

    pub fn is_spent(&self, outpoint: &OutPoint) -> bool {
        self.spender_txs.contains_key(outpoint)
    }

    pub fn find_conflicting_tx(&self, outpoint: &OutPoint) -> Option<Id<Transaction>> {
        self.spender_txs.get(outpoint).cloned()
    }

    pub fn fee_delta(&self, id: &Id<Transaction>) -> Option<Fee> {
        self.fee_deltas.get(id).copied()
    }

    pub fn clear_fee_delta(&mut self, id: &Id<Transaction>) {
        self.fee_deltas.remove(id);
    }

    pub fn total_tx_size(&self) -> usize {
        self.total_tx_size
    }

    pub fn cached_inner_usage(&self) -> usize {
        self.cached_inner_usage
    }

    /// A conservative estimate of the heap memory held by the pool: the
    /// estimated node structures of every index, plus the cached indirect
    /// usage of the entries and their link sets.
    pub fn dynamic_memory_usage(&self) -> usize {
        let num_entries = self.txs_by_id.len();
        mem_usage::btree::usage::<Id<Transaction>, TxMempoolEntry>(num_entries)
            + mem_usage::btree::usage::<DescendantScore, BTreeSet<Id<Transaction>>>(
                self.txs_by_descendant_score.len(),
            )
            + mem_usage::btree::usage::<AncestorScore, BTreeSet<Id<Transaction>>>(
                self.txs_by_ancestor_score.len(),
            )
            + mem_usage::btree::usage::<Time, BTreeSet<Id<Transaction>>>(
                self.txs_by_creation_time.len(),
            )
            + 3 * mem_usage::btree::usage::<Id<Transaction>, ()>(num_entries)
            + mem_usage::btree::usage::<OutPoint, Id<Transaction>>(self.spender_txs.len())
            + mem_usage::btree::usage::<Id<Transaction>, Fee>(self.fee_deltas.len())
            + self.cached_inner_usage
    }
}

/// Indirect bytes attributable to one entry: its transaction's heap data plus
/// its two link sets.
pub fn entry_dynamic_usage(entry: &TxMempoolEntry) -> usize {
    entry.tx().indirect_memory_usage()
        + mem_usage::btree::usage::<Id<Transaction>, ()>(entry.parents().count())
        + mem_usage::btree::usage::<Id<Transaction>, ()>(entry.children().count())
}

// Ancestor/descendant traversal
impl MempoolStore {
    /// Collect the in-pool ancestor set of `entry`, enforcing the chain
    /// limits as the set grows. This is the admission gate: a limit violation
    /// reports which transaction's package would be overloaded, and nothing
    /// has been mutated at that point.
    ///
    /// With `search_for_parents`, direct parents are resolved from the
    /// entry's inputs (the entry need not be in the pool yet); otherwise the
    /// entry's recorded parent links seed the walk. Each ancestor is visited
    /// at most once.
    pub fn calculate_mempool_ancestors(
        &self,
        entry: &TxMempoolEntry,
        limits: &ChainLimits,
        search_for_parents: bool,
    ) -> Result<Ancestors, MempoolPolicyError> {
        let mut to_process: Vec<Id<Transaction>> = if search_for_parents {
            entry
                .transaction()
                .inputs()
                .iter()
                .filter_map(|input| input.outpoint().tx_id().get_tx_id().copied())
                .filter(|id| self.txs_by_id.contains_key(id))
                .collect()
        } else {
            entry.parents().copied().collect()
        };

        let mut ancestors = Ancestors(BTreeSet::new());
        // Includes the entry itself, so the total chain size is limited.
        let mut total_size_with_ancestors = entry.vsize();

        while let Some(candidate_id) = to_process.pop() {
            if !ancestors.insert(candidate_id) {
                continue;
            }
            let candidate =
                self.txs_by_id.get(&candidate_id).expect("ancestor of a pool entry is in the pool");

            // The entry itself is the `+ 1`.
            ensure!(
                ancestors.len() + 1 <= limits.max_ancestor_count,
                MempoolPolicyError::TooManyAncestors {
                    limit: limits.max_ancestor_count,
                }
            );
            total_size_with_ancestors += candidate.vsize();
            ensure!(
                total_size_with_ancestors <= limits.max_ancestor_size,
                MempoolPolicyError::AncestorSizeExceeded {
                    limit: limits.max_ancestor_size,
                }
            );
            // The new entry would join this ancestor's descendant package.
            ensure!(
                candidate.size_with_descendants() + entry.vsize() <= limits.max_descendant_size,
                MempoolPolicyError::DescendantSizeExceededFor(candidate_id)
            );
            ensure!(
                candidate.count_with_descendants() + 1 <= limits.max_descendant_count,
                MempoolPolicyError::TooManyDescendantsFor(candidate_id)
            );

            to_process.extend(candidate.parents().copied());
        }

        Ok(ancestors)
    }

    /// Collect the in-pool descendant set of the given entry. The result
    /// includes the entry itself.
    pub fn calculate_descendants(&self, entry_id: &Id<Transaction>) -> Descendants {
        let mut descendants = BTreeSet::new();
        let mut stage = vec![*entry_id];
        while let Some(id) = stage.pop() {
            if !descendants.insert(id) {
                continue;
            }
            let entry = self.txs_by_id.get(&id).expect("descendant of a pool entry is in the pool");
            stage.extend(entry.children().copied().filter(|child| !descendants.contains(child)));
        }
        Descendants(descendants)
    }
}

// Insertion
impl MempoolStore {
    /// Insert an entry whose ancestor set has already been computed (and
    /// limit-checked) by the caller.
    ///
    /// Applies any pre-declared fee delta first, then installs the link
    /// edges, propagates the entry into every ancestor's descendant
    /// aggregates, derives the entry's own ancestor aggregates from the scan,
    /// records the spent outpoints, and finally files the entry in all
    /// indices. The only fallible step, summing the ancestor state, happens
    /// before anything is mutated.
    pub fn add_tx(
        &mut self,
        mut entry: TxMempoolEntry,
        ancestors: Ancestors,
    ) -> Result<(), MempoolPolicyError> {
        let tx_id = entry.tx_id();
        assert!(!self.txs_by_id.contains_key(&tx_id), "Duplicate transaction added: {tx_id}");

        if let Some(delta) = self.fee_deltas.get(&tx_id) {
            entry.update_fee_delta(*delta);
        }

        let parents: BTreeSet<Id<Transaction>> = entry
            .transaction()
            .inputs()
            .iter()
            .filter_map(|input| input.outpoint().tx_id().get_tx_id().copied())
            .filter(|id| self.txs_by_id.contains_key(id))
            .collect();

        let mut ancestor_size: usize = 0;
        let mut ancestor_sigops: usize = 0;
        let mut ancestor_fees = Amount::ZERO;
        for ancestor_id in ancestors.iter() {
            let ancestor = self.txs_by_id.get(ancestor_id).expect("ancestor in the pool");
            ancestor_size += ancestor.vsize();
            ancestor_sigops += ancestor.sigop_cost();
            ancestor_fees = (ancestor_fees + ancestor.modified_fee().into_amount())
                .ok_or(MempoolPolicyError::AncestorFeeOverflow)?;
        }

        *entry.parents_mut() = parents.clone();
        entry.update_ancestor_state(
            ancestor_size as isize,
            ancestor_fees,
            ancestors.len() as isize,
            ancestor_sigops as isize,
        );

        for parent in &parents {
            self.update_child(parent, &tx_id, true);
        }

        let entry_size = entry.vsize() as isize;
        let entry_fee = entry.modified_fee().into_amount();
        for ancestor_id in ancestors.iter() {
            self.modify_descendant_state(ancestor_id, entry_size, entry_fee, 1);
        }

        self.mark_outpoints_as_spent(&entry);

        self.total_tx_size += entry.vsize();
        self.cached_inner_usage += entry_dynamic_usage(&entry);

        self.txs_by_creation_time.entry(entry.time()).or_default().insert(tx_id);
        self.txs_by_descendant_score
            .entry(DescendantScore::of(&entry))
            .or_default()
            .insert(tx_id);
        self.txs_by_ancestor_score.entry(AncestorScore::of(&entry)).or_default().insert(tx_id);
        self.txs_by_id.insert(tx_id, entry);

        log::debug!("added tx {tx_id} with {} in-pool parents", parents.len());
        Ok(())
    }

    fn mark_outpoints_as_spent(&mut self, entry: &TxMempoolEntry) {
        let id = entry.tx_id();
        for input in entry.transaction().inputs() {
            let previous = self.spender_txs.insert(input.outpoint().clone(), id);
            assert!(
                previous.is_none(),
                "Outpoint {:?} already spent in the pool",
                input.outpoint()
            );
        }
    }

    fn unspend_outpoints(&mut self, entry: &TxMempoolEntry) {
        for input in entry.transaction().inputs() {
            let spender = self.spender_txs.remove(input.outpoint());
            assert_eq!(spender, Some(entry.tx_id()), "Spender map out of sync");
        }
    }
}

// Removal
impl MempoolStore {
    /// Remove a set of entries that is going away as a whole, reversing
    /// their contributions to the aggregates of everything that stays.
    ///
    /// `update_descendants` is passed when descendants survive the removal
    /// (confirmation in a block): each removed entry is then subtracted from
    /// its descendants' ancestor aggregates. When the descendants are part of
    /// the same stage (eviction, expiry, recursive removal), that work is
    /// skipped.
    ///
    /// Returns the removed entries so the caller can report them.
    pub fn remove_staged(
        &mut self,
        stage: &BTreeSet<Id<Transaction>>,
        update_descendants: bool,
        reason: MempoolRemovalReason,
    ) -> Vec<TxMempoolEntry> {
        self.update_for_remove_from_mempool(stage, update_descendants);
        stage.iter().map(|id| self.remove_unchecked(id, reason)).collect()
    }

    fn update_for_remove_from_mempool(
        &mut self,
        stage: &BTreeSet<Id<Transaction>>,
        update_descendants: bool,
    ) {
        if update_descendants {
            for id in stage {
                let entry = self.txs_by_id.get(id).expect("staged entry in the pool");
                let size = entry.vsize() as isize;
                let sigops = entry.sigop_cost() as isize;
                let fee = (-entry.modified_fee().into_amount()).expect("fee negation");
                let descendants = self.calculate_descendants(id);
                for descendant in descendants.iter().filter(|descendant| *descendant != id) {
                    self.modify_ancestor_state(descendant, -size, fee, -1, -sigops);
                }
            }
        }

        for id in stage {
            let entry = self.txs_by_id.get(id).expect("staged entry in the pool");
            let size = entry.vsize() as isize;
            let fee = (-entry.modified_fee().into_amount()).expect("fee negation");
            let parents: Vec<Id<Transaction>> = entry.parents().copied().collect();
            let ancestors = self
                .calculate_mempool_ancestors(entry, &ChainLimits::no_limits(), false)
                .expect("no-limit ancestor traversal cannot fail");

            for parent in &parents {
                self.update_child(parent, id, false);
            }
            for ancestor_id in ancestors.iter() {
                self.modify_descendant_state(ancestor_id, -size, fee, -1);
            }
        }

        for id in stage {
            let children: Vec<Id<Transaction>> =
                self.txs_by_id.get(id).expect("staged entry in the pool").children().copied().collect();
            for child in &children {
                self.update_parent(child, id, false);
            }
        }
    }

    fn remove_unchecked(
        &mut self,
        tx_id: &Id<Transaction>,
        reason: MempoolRemovalReason,
    ) -> TxMempoolEntry {
        // De-index while the aggregates backing the keys are still in place.
        self.remove_from_descendant_score_index(tx_id);
        self.remove_from_ancestor_score_index(tx_id);
        self.remove_from_creation_time_index(tx_id);

        let entry = self.txs_by_id.remove(tx_id).expect("removed entry in the pool");
        self.unspend_outpoints(&entry);
        self.total_tx_size -= entry.vsize();
        self.cached_inner_usage -= entry_dynamic_usage(&entry);

        log::debug!("removed tx {tx_id}, reason: {reason:?}");
        entry
    }
}

// Aggregate updates and index re-keying
impl MempoolStore {
    /// Apply a delta to an entry's descendant-side aggregates, moving it to
    /// its new slot in the descendant-score index.
    fn modify_descendant_state(
        &mut self,
        id: &Id<Transaction>,
        modify_size: isize,
        modify_fee: Amount,
        modify_count: isize,
    ) {
        self.remove_from_descendant_score_index(id);
        self.txs_by_id
            .get_mut(id)
            .expect("modified entry in the pool")
            .update_descendant_state(modify_size, modify_fee, modify_count);
        self.add_to_descendant_score_index(id);
    }

    /// Apply a delta to an entry's ancestor-side aggregates, moving it to
    /// its new slot in the ancestor-score index.
    fn modify_ancestor_state(
        &mut self,
        id: &Id<Transaction>,
        modify_size: isize,
        modify_fee: Amount,
        modify_count: isize,
        modify_sigops: isize,
    ) {
        self.remove_from_ancestor_score_index(id);
        self.txs_by_id
            .get_mut(id)
            .expect("modified entry in the pool")
            .update_ancestor_state(modify_size, modify_fee, modify_count, modify_sigops);
        self.add_to_ancestor_score_index(id);
    }

    fn add_to_descendant_score_index(&mut self, id: &Id<Transaction>) {
        let entry = self.txs_by_id.get(id).expect("indexed entry in the pool");
        self.txs_by_descendant_score.entry(DescendantScore::of(entry)).or_default().insert(*id);
    }

    fn remove_from_descendant_score_index(&mut self, id: &Id<Transaction>) {
        let entry = self.txs_by_id.get(id).expect("indexed entry in the pool");
        let map_entry =
            self.txs_by_descendant_score.entry(DescendantScore::of(entry)).and_modify(|ids| {
                ids.remove(id);
            });
        match map_entry {
            Occupied(ids) if ids.get().is_empty() => drop(ids.remove_entry()),
            _ => {}
        };
    }

    fn add_to_ancestor_score_index(&mut self, id: &Id<Transaction>) {
        let entry = self.txs_by_id.get(id).expect("indexed entry in the pool");
        self.txs_by_ancestor_score.entry(AncestorScore::of(entry)).or_default().insert(*id);
    }

    fn remove_from_ancestor_score_index(&mut self, id: &Id<Transaction>) {
        let entry = self.txs_by_id.get(id).expect("indexed entry in the pool");
        let map_entry =
            self.txs_by_ancestor_score.entry(AncestorScore::of(entry)).and_modify(|ids| {
                ids.remove(id);
            });
        match map_entry {
            Occupied(ids) if ids.get().is_empty() => drop(ids.remove_entry()),
            _ => {}
        };
    }

    fn remove_from_creation_time_index(&mut self, id: &Id<Transaction>) {
        let time = self.txs_by_id.get(id).expect("indexed entry in the pool").time();
        let map_entry = self.txs_by_creation_time.entry(time).and_modify(|ids| {
            ids.remove(id);
        });
        match map_entry {
            Occupied(ids) if ids.get().is_empty() => drop(ids.remove_entry()),
            _ => {}
        };
    }
}

// Link edges
impl MempoolStore {
    fn update_child(&mut self, entry_id: &Id<Transaction>, child_id: &Id<Transaction>, add: bool) {
        let entry = self.txs_by_id.get_mut(entry_id).expect("link endpoint in the pool");
        let before = entry.children_mut().len();
        if add {
            entry.children_mut().insert(*child_id);
        } else {
            entry.children_mut().remove(child_id);
        }
        let after = entry.children_mut().len();
        self.apply_link_usage_change(before, after);
    }

    fn update_parent(&mut self, entry_id: &Id<Transaction>, parent_id: &Id<Transaction>, add: bool) {
        let entry = self.txs_by_id.get_mut(entry_id).expect("link endpoint in the pool");
        let before = entry.parents_mut().len();
        if add {
            entry.parents_mut().insert(*parent_id);
        } else {
            entry.parents_mut().remove(parent_id);
        }
        let after = entry.parents_mut().len();
        self.apply_link_usage_change(before, after);
    }

    fn apply_link_usage_change(&mut self, len_before: usize, len_after: usize) {
        let before = mem_usage::btree::usage::<Id<Transaction>, ()>(len_before);
        let after = mem_usage::btree::usage::<Id<Transaction>, ()>(len_after);
        if after >= before {
            self.cached_inner_usage += after - before;
        } else {
            self.cached_inner_usage -= before - after;
        }
    }
}

// Prioritisation
impl MempoolStore {
    /// Accumulate a fee delta for the given transaction. If it is currently
    /// in the pool, its own aggregates and every relative's aggregates move
    /// with it, and all touched entries are re-keyed in the score indices.
    ///
    /// Returns whether an in-pool entry was touched.
    pub fn prioritise(&mut self, tx_id: Id<Transaction>, delta: Amount) -> bool {
        let old_delta = self.fee_deltas.get(&tx_id).copied().unwrap_or(Fee::ZERO);
        let new_delta =
            Fee::from((old_delta.into_amount() + delta).expect("fee delta accumulation overflow"));
        self.fee_deltas.insert(tx_id, new_delta);

        if !self.txs_by_id.contains_key(&tx_id) {
            return false;
        }

        // The entry's own modified fee is part of both of its own aggregate
        // blocks, so both indices re-key.
        self.remove_from_descendant_score_index(&tx_id);
        self.remove_from_ancestor_score_index(&tx_id);
        self.txs_by_id
            .get_mut(&tx_id)
            .expect("prioritised entry in the pool")
            .update_fee_delta(new_delta);
        self.add_to_descendant_score_index(&tx_id);
        self.add_to_ancestor_score_index(&tx_id);

        let ancestors = {
            let entry = self.txs_by_id.get(&tx_id).expect("prioritised entry in the pool");
            self.calculate_mempool_ancestors(entry, &ChainLimits::no_limits(), false)
                .expect("no-limit ancestor traversal cannot fail")
        };
        for ancestor_id in ancestors.iter() {
            self.modify_descendant_state(ancestor_id, 0, delta, 0);
        }

        let descendants = self.calculate_descendants(&tx_id);
        for descendant in descendants.iter().filter(|descendant| **descendant != tx_id) {
            self.modify_ancestor_state(descendant, 0, delta, 0, 0);
        }

        true
    }
}

// Test-only consistency checks; the full audit lives with the pool.
impl MempoolStore {
    pub fn assert_valid(&self) {
        #[cfg(test)]
        self.assert_valid_inner()
    }

    #[cfg(test)]
    fn assert_valid_inner(&self) {
        let entries = self.txs_by_descendant_score.values().flatten().collect::<Vec<_>>();
        for id in self.txs_by_id.keys() {
            assert_eq!(entries.iter().filter(|entry_id| ***entry_id == *id).count(), 1);
        }
        for (id, entry) in &self.txs_by_id {
            for child in entry.children() {
                assert!(self.txs_by_id.get(child).expect("child").parents().any(|p| p == id));
            }
            for parent in entry.parents() {
                assert!(self.txs_by_id.get(parent).expect("parent").children().any(|c| c == id));
            }
        }
    }
}
