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

use std::collections::BTreeSet;

use common::{
    chain::{SignedTransaction, Transaction},
    primitives::{Amount, BlockHeight, Id, Idable},
};
use serialization::Encode;

use super::fee::Fee;
use crate::config::{Time, BYTES_PER_SIGOP, WITNESS_SCALE_FACTOR};

/// Cached result of evaluating an entry's relative time locks against the
/// chain it was admitted under. Re-checked, not recomputed, after a reorg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPoints {
    height: BlockHeight,
    time: Time,
    /// Height of the highest input block the evaluation depended on. A reorg
    /// below this height invalidates the cached values.
    max_input_height: Option<BlockHeight>,
}

impl LockPoints {
    pub fn new(height: BlockHeight, time: Time, max_input_height: Option<BlockHeight>) -> Self {
        Self {
            height,
            time,
            max_input_height,
        }
    }

    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn max_input_height(&self) -> Option<BlockHeight> {
        self.max_input_height
    }
}

impl Default for LockPoints {
    fn default() -> Self {
        Self::new(BlockHeight::new(0), Time::ZERO, None)
    }
}

/// One transaction in the pool, together with its metadata and the aggregate
/// state over its in-pool relatives.
///
/// The descendant-side aggregates cover the entry itself plus every in-pool
/// descendant; the ancestor-side ones cover the entry plus every in-pool
/// ancestor. The store keeps them exact under every mutation.
#[derive(Debug, Clone)]
pub struct TxMempoolEntry {
    tx: SignedTransaction,
    fee: Fee,
    time: Time,
    entry_height: BlockHeight,
    spends_coinbase: bool,
    sigop_cost: usize,
    tx_weight: usize,
    vsize: usize,
    lock_points: LockPoints,
    fee_delta: Fee,

    parents: BTreeSet<Id<Transaction>>,
    children: BTreeSet<Id<Transaction>>,

    count_with_descendants: usize,
    size_with_descendants: usize,
    fees_with_descendants: Fee,

    count_with_ancestors: usize,
    size_with_ancestors: usize,
    fees_with_ancestors: Fee,
    sigops_with_ancestors: usize,
}

impl TxMempoolEntry {
    pub fn new(
        tx: SignedTransaction,
        fee: Fee,
        time: Time,
        entry_height: BlockHeight,
        spends_coinbase: bool,
        sigop_cost: usize,
        lock_points: LockPoints,
    ) -> Self {
        let tx_weight = transaction_weight(&tx);
        let vsize = virtual_transaction_size(tx_weight, sigop_cost);
        Self {
            tx,
            fee,
            time,
            entry_height,
            spends_coinbase,
            sigop_cost,
            tx_weight,
            vsize,
            lock_points,
            fee_delta: Fee::ZERO,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            count_with_descendants: 1,
            size_with_descendants: vsize,
            fees_with_descendants: fee,
            count_with_ancestors: 1,
            size_with_ancestors: vsize,
            fees_with_ancestors: fee,
            sigops_with_ancestors: sigop_cost,
        }
    }

    pub fn tx_id(&self) -> Id<Transaction> {
        self.tx.get_id()
    }

    pub fn tx(&self) -> &SignedTransaction {
        &self.tx
    }

    pub fn transaction(&self) -> &Transaction {
        self.tx.transaction()
    }

    pub fn into_tx(self) -> SignedTransaction {
        self.tx
    }

    pub fn fee(&self) -> Fee {
        self.fee
    }

    /// The base fee biased by the prioritisation delta. This is the fee all
    /// aggregates, scores and eviction decisions are based on.
    pub fn modified_fee(&self) -> Fee {
        (self.fee + self.fee_delta).expect("fee delta overflow")
    }

    pub fn fee_delta(&self) -> Fee {
        self.fee_delta
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn entry_height(&self) -> BlockHeight {
        self.entry_height
    }

    pub fn spends_coinbase(&self) -> bool {
        self.spends_coinbase
    }

    pub fn sigop_cost(&self) -> usize {
        self.sigop_cost
    }

    pub fn tx_weight(&self) -> usize {
        self.tx_weight
    }

    pub fn vsize(&self) -> usize {
        self.vsize
    }

    pub fn lock_points(&self) -> &LockPoints {
        &self.lock_points
    }

    pub fn parents(&self) -> impl Iterator<Item = &Id<Transaction>> {
        self.parents.iter()
    }

    pub fn children(&self) -> impl Iterator<Item = &Id<Transaction>> {
        self.children.iter()
    }

    pub fn count_with_descendants(&self) -> usize {
        self.count_with_descendants
    }

    pub fn size_with_descendants(&self) -> usize {
        self.size_with_descendants
    }

    pub fn fees_with_descendants(&self) -> Fee {
        self.fees_with_descendants
    }

    pub fn count_with_ancestors(&self) -> usize {
        self.count_with_ancestors
    }

    pub fn size_with_ancestors(&self) -> usize {
        self.size_with_ancestors
    }

    pub fn fees_with_ancestors(&self) -> Fee {
        self.fees_with_ancestors
    }

    pub fn sigops_with_ancestors(&self) -> usize {
        self.sigops_with_ancestors
    }

    pub(super) fn parents_mut(&mut self) -> &mut BTreeSet<Id<Transaction>> {
        &mut self.parents
    }

    pub(super) fn children_mut(&mut self) -> &mut BTreeSet<Id<Transaction>> {
        &mut self.children
    }

    pub(super) fn update_descendant_state(
        &mut self,
        modify_size: isize,
        modify_fee: Amount,
        modify_count: isize,
    ) {
        self.size_with_descendants = self
            .size_with_descendants
            .checked_add_signed(modify_size)
            .expect("descendant size stays non-negative");
        self.fees_with_descendants = Fee::from(
            (Amount::from(self.fees_with_descendants) + modify_fee)
                .expect("descendant fee overflow"),
        );
        self.count_with_descendants = self
            .count_with_descendants
            .checked_add_signed(modify_count)
            .expect("descendant count stays non-negative");
        assert!(self.count_with_descendants >= 1);
        assert!(self.size_with_descendants >= self.vsize);
    }

    pub(super) fn update_ancestor_state(
        &mut self,
        modify_size: isize,
        modify_fee: Amount,
        modify_count: isize,
        modify_sigops: isize,
    ) {
        self.size_with_ancestors = self
            .size_with_ancestors
            .checked_add_signed(modify_size)
            .expect("ancestor size stays non-negative");
        self.fees_with_ancestors = Fee::from(
            (Amount::from(self.fees_with_ancestors) + modify_fee).expect("ancestor fee overflow"),
        );
        self.count_with_ancestors = self
            .count_with_ancestors
            .checked_add_signed(modify_count)
            .expect("ancestor count stays non-negative");
        self.sigops_with_ancestors = self
            .sigops_with_ancestors
            .checked_add_signed(modify_sigops)
            .expect("ancestor sigop cost stays non-negative");
        assert!(self.count_with_ancestors >= 1);
        assert!(self.size_with_ancestors >= self.vsize);
    }

    /// Replace the prioritisation delta with a new total. The entry's own
    /// modified fee is part of both aggregate blocks, so both move by the
    /// difference.
    pub(super) fn update_fee_delta(&mut self, new_delta: Fee) {
        let diff = (Amount::from(new_delta) - Amount::from(self.fee_delta))
            .expect("fee delta difference overflow");
        self.fees_with_descendants = Fee::from(
            (Amount::from(self.fees_with_descendants) + diff).expect("descendant fee overflow"),
        );
        self.fees_with_ancestors = Fee::from(
            (Amount::from(self.fees_with_ancestors) + diff).expect("ancestor fee overflow"),
        );
        self.fee_delta = new_delta;
    }
}

/// Transaction weight: witness bytes count once, all other bytes count
/// `WITNESS_SCALE_FACTOR` times.
fn transaction_weight(tx: &SignedTransaction) -> usize {
    tx.transaction().encoded_size() * (WITNESS_SCALE_FACTOR - 1) + tx.encoded_size()
}

/// Virtual size in bytes, derived from the weight with a floor proportional
/// to the signature-operation cost.
fn virtual_transaction_size(tx_weight: usize, sigop_cost: usize) -> usize {
    let sigop_weight = sigop_cost * BYTES_PER_SIGOP * WITNESS_SCALE_FACTOR;
    (std::cmp::max(tx_weight, sigop_weight) + WITNESS_SCALE_FACTOR - 1) / WITNESS_SCALE_FACTOR
}
