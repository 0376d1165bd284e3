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

use std::sync::{
    atomic::{AtomicU64, Ordering as AtomicOrdering},
    Arc, Mutex,
};

use common::{
    chain::{
        config::create_unit_test_config, signature::inputsig::InputWitness, Destination,
        OutPoint, OutPointSourceId, SignedTransaction, Transaction, TxInput, TxOutput,
    },
    primitives::{Amount, BlockHeight, Id, Idable, H256},
    time_getter::TimeGetter,
};
use utxo::{InMemoryUtxosView, Utxo, UtxosView};

use super::*;
use crate::error::MempoolPolicyError;

mod eviction;

fn mocked_time_getter_seconds(seconds: Arc<AtomicU64>) -> TimeGetter {
    TimeGetter::new(Arc::new(move || {
        Duration::from_secs(seconds.load(AtomicOrdering::SeqCst))
    }))
}

fn make_mempool() -> Mempool {
    Mempool::new(Arc::new(create_unit_test_config()), TimeGetter::default())
}

fn make_mempool_with_clock(seconds: Arc<AtomicU64>) -> Mempool {
    Mempool::new(
        Arc::new(create_unit_test_config()),
        mocked_time_getter_seconds(seconds),
    )
}

/// An outpoint pretending to come from a transaction confirmed long ago.
fn confirmed_outpoint(seed: u8) -> OutPoint {
    let id: Id<Transaction> = Id::new(H256([seed; 32]));
    OutPoint::new(OutPointSourceId::Transaction(id), 0)
}

fn tx_spending(outpoints: Vec<OutPoint>, output_values: Vec<i128>) -> SignedTransaction {
    let num_inputs = outpoints.len();
    let inputs = outpoints
        .into_iter()
        .map(|outpoint| TxInput::new(outpoint.tx_id(), outpoint.output_index()))
        .collect();
    let outputs = output_values
        .into_iter()
        .map(|value| TxOutput::new(Amount::from_atoms(value), Destination::AnyoneCanSpend))
        .collect();
    let transaction = Transaction::new(0, inputs, outputs, 0).expect("tx creation");
    SignedTransaction::new(transaction, vec![InputWitness::NoSignature(None); num_inputs])
        .expect("signed tx creation")
}

fn outpoint_of(tx: &SignedTransaction, index: u32) -> OutPoint {
    OutPoint::new(OutPointSourceId::Transaction(tx.get_id()), index)
}

fn entry_with_fee_and_time(tx: &SignedTransaction, fee: i128, time_secs: u64) -> TxMempoolEntry {
    TxMempoolEntry::new(
        tx.clone(),
        Fee::from(Amount::from_atoms(fee)),
        Duration::from_secs(time_secs),
        BlockHeight::new(1),
        false,
        0,
        entry::LockPoints::default(),
    )
}

fn entry_with_fee(tx: &SignedTransaction, fee: i128) -> TxMempoolEntry {
    entry_with_fee_and_time(tx, fee, 100)
}

/// A chain of transactions, each spending output 0 of the previous one,
/// rooted at a distinct confirmed outpoint. Output values descend so every
/// transaction in the chain is unique.
fn tx_chain(root_seed: u8, length: usize) -> Vec<SignedTransaction> {
    let mut txs = vec![tx_spending(vec![confirmed_outpoint(root_seed)], vec![10_000])];
    for height in 1..length {
        let parent_outpoint = outpoint_of(txs.last().expect("chain is nonempty"), 0);
        txs.push(tx_spending(vec![parent_outpoint], vec![10_000 - height as i128]));
    }
    txs
}

/// A view containing the confirmed outputs that the given transactions spend
/// from outside the pool.
fn view_with_confirmed_inputs(txs: &[SignedTransaction]) -> InMemoryUtxosView {
    let in_pool: std::collections::BTreeSet<Id<Transaction>> =
        txs.iter().map(|tx| tx.get_id()).collect();
    let mut view = InMemoryUtxosView::new();
    for tx in txs {
        for input in tx.inputs() {
            let outpoint = input.outpoint();
            let from_pool =
                outpoint.tx_id().get_tx_id().is_some_and(|id| in_pool.contains(id));
            if !from_pool {
                let output =
                    TxOutput::new(Amount::from_atoms(1_000_000), Destination::AnyoneCanSpend);
                view.add_unchecked(
                    outpoint.clone(),
                    Utxo::new_for_blockchain(output, false, BlockHeight::new(0)),
                );
            }
        }
    }
    view
}

fn collect_removal_events(mempool: &mut Mempool) -> Arc<Mutex<Vec<(Id<Transaction>, MempoolRemovalReason)>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_ = Arc::clone(&events);
    mempool.subscribe_to_events(Arc::new(move |event| {
        if let MempoolEvent::TransactionRemoved { tx, reason } = event {
            events_.lock().expect("event log lock").push((tx.get_id(), reason));
        }
    }));
    events
}

#[test]
fn add_and_query_single_transaction() {
    let mut mempool = make_mempool();
    let tx = tx_spending(vec![confirmed_outpoint(1)], vec![900]);
    let tx_id = tx.get_id();

    let added = Arc::new(Mutex::new(Vec::new()));
    let added_ = Arc::clone(&added);
    mempool.subscribe_to_events(Arc::new(move |event| {
        if let MempoolEvent::TransactionAdded { tx, .. } = event {
            added_.lock().expect("event log lock").push(tx.get_id());
        }
    }));

    let updates_before = mempool.transactions_updated();
    mempool.add_transaction(entry_with_fee(&tx, 100), true).expect("admission");

    assert!(mempool.contains_transaction(&tx_id));
    assert_eq!(mempool.get(&tx_id), Some(&tx));
    assert!(mempool.is_spent(&confirmed_outpoint(1)));
    assert_eq!(mempool.transactions_updated(), updates_before + 1);
    assert_eq!(*added.lock().expect("event log lock"), vec![tx_id]);

    let info = mempool.info(&tx_id).expect("info for a present tx");
    assert_eq!(info.tx, tx);
    assert_eq!(info.fee_delta, Fee::ZERO);

    let entry = mempool.entry(&tx_id).expect("entry for a present tx");
    assert_eq!(entry.count_with_ancestors(), 1);
    assert_eq!(entry.count_with_descendants(), 1);
    assert_eq!(entry.size_with_ancestors(), entry.vsize());
    assert_eq!(entry.fees_with_descendants(), Fee::from(Amount::from_atoms(100)));

    assert_eq!(mempool.query_hashes_sorted(), vec![tx_id]);
    mempool.store.assert_valid();
}

#[test]
fn absent_transaction_queries_are_empty() {
    let mempool = make_mempool();
    let absent: Id<Transaction> = Id::new(H256([0xab; 32]));
    assert!(!mempool.contains_transaction(&absent));
    assert!(mempool.get(&absent).is_none());
    assert!(mempool.info(&absent).is_none());
    assert!(mempool.calculate_descendants(&absent).is_empty());
}

#[test]
fn chain_aggregates_propagate_on_add() {
    let mut mempool = make_mempool();
    let txs = tx_chain(2, 3);
    let fees = [300i128, 200, 100];
    for (tx, fee) in txs.iter().zip(fees) {
        mempool.add_transaction(entry_with_fee(tx, fee), true).expect("admission");
    }

    let [a, b, c] = [&txs[0], &txs[1], &txs[2]].map(|tx| {
        mempool.entry(&tx.get_id()).expect("entry in the pool").clone()
    });

    assert_eq!(a.count_with_descendants(), 3);
    assert_eq!(a.fees_with_descendants(), Fee::from(Amount::from_atoms(600)));
    assert_eq!(a.size_with_descendants(), a.vsize() + b.vsize() + c.vsize());
    assert_eq!(a.count_with_ancestors(), 1);

    assert_eq!(b.count_with_descendants(), 2);
    assert_eq!(b.count_with_ancestors(), 2);
    assert_eq!(b.fees_with_ancestors(), Fee::from(Amount::from_atoms(500)));

    assert_eq!(c.count_with_ancestors(), 3);
    assert_eq!(c.fees_with_ancestors(), Fee::from(Amount::from_atoms(600)));
    assert_eq!(c.size_with_ancestors(), a.vsize() + b.vsize() + c.vsize());
    assert_eq!(c.count_with_descendants(), 1);

    mempool.store.assert_valid();
}

#[test]
fn ancestor_chain_limit_rejects_fourth_link() {
    let mut mempool = make_mempool();
    mempool.set_chain_limits(ChainLimits {
        max_ancestor_count: 3,
        ..ChainLimits::default()
    });

    let txs = tx_chain(3, 4);
    for tx in &txs[..3] {
        mempool.add_transaction(entry_with_fee(tx, 100), true).expect("chain of three fits");
    }

    let rejected = mempool.add_transaction(entry_with_fee(&txs[3], 100), true);
    assert_eq!(
        rejected,
        Err(MempoolPolicyError::TooManyAncestors { limit: 3 })
    );

    // The failed admission left no trace.
    assert!(!mempool.contains_transaction(&txs[3].get_id()));
    assert!(!mempool.is_spent(&outpoint_of(&txs[2], 0)));
    let a = mempool.entry(&txs[0].get_id()).expect("root in the pool");
    assert_eq!(a.count_with_descendants(), 3);
    mempool.store.assert_valid();
}

#[test]
fn descendant_fanout_limit_rejects_extra_child() {
    let mut mempool = make_mempool();
    mempool.set_chain_limits(ChainLimits {
        max_descendant_count: 26,
        ..ChainLimits::default()
    });

    let parent = tx_spending(vec![confirmed_outpoint(4)], vec![500; 26]);
    let parent_id = parent.get_id();
    mempool.add_transaction(entry_with_fee(&parent, 1000), true).expect("parent admission");

    let children: Vec<SignedTransaction> = (0..26)
        .map(|index| tx_spending(vec![outpoint_of(&parent, index)], vec![100 + index as i128]))
        .collect();
    for child in &children[..25] {
        mempool.add_transaction(entry_with_fee(child, 100), true).expect("child fits");
    }

    let rejected = mempool.add_transaction(entry_with_fee(&children[25], 100), true);
    assert_eq!(
        rejected,
        Err(MempoolPolicyError::TooManyDescendantsFor(parent_id))
    );

    let parent_entry = mempool.entry(&parent_id).expect("parent in the pool");
    assert_eq!(parent_entry.count_with_descendants(), 26);
    mempool.store.assert_valid();
}

#[rstest::rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn chain_of_exactly_the_ancestor_limit_fits(#[case] limit: usize) {
    let mut mempool = make_mempool();
    mempool.set_chain_limits(ChainLimits {
        max_ancestor_count: limit,
        ..ChainLimits::default()
    });

    let txs = tx_chain(60, limit + 1);
    for tx in &txs[..limit] {
        mempool.add_transaction(entry_with_fee(tx, 100), true).expect("chain at the limit fits");
    }
    let rejected = mempool.add_transaction(entry_with_fee(&txs[limit], 100), true);
    assert_eq!(rejected, Err(MempoolPolicyError::TooManyAncestors { limit }));
}

#[test]
fn ancestor_size_limit_is_enforced() {
    let mut mempool = make_mempool();
    let txs = tx_chain(5, 2);
    let parent_vsize = entry_with_fee(&txs[0], 100).vsize();
    mempool.set_chain_limits(ChainLimits {
        // Room for the parent alone, not for any chain on top of it.
        max_ancestor_size: parent_vsize + 1,
        ..ChainLimits::default()
    });

    mempool.add_transaction(entry_with_fee(&txs[0], 100), true).expect("parent admission");
    let rejected = mempool.add_transaction(entry_with_fee(&txs[1], 100), true);
    assert_eq!(
        rejected,
        Err(MempoolPolicyError::AncestorSizeExceeded {
            limit: parent_vsize + 1
        })
    );
}

#[test]
fn descendant_size_limit_names_the_overloaded_ancestor() {
    let mut mempool = make_mempool();
    let txs = tx_chain(6, 2);
    let parent_entry = entry_with_fee(&txs[0], 100);
    let parent_vsize = parent_entry.vsize();
    mempool.set_chain_limits(ChainLimits {
        max_descendant_size: parent_vsize + 1,
        ..ChainLimits::default()
    });

    mempool.add_transaction(parent_entry, true).expect("parent admission");
    let rejected = mempool.add_transaction(entry_with_fee(&txs[1], 100), true);
    assert_eq!(
        rejected,
        Err(MempoolPolicyError::DescendantSizeExceededFor(txs[0].get_id()))
    );
}

#[test]
fn diamond_graph_counts_shared_ancestor_once() {
    let mut mempool = make_mempool();

    // A has two outputs spent by B and C; D spends one output of each.
    let a = tx_spending(vec![confirmed_outpoint(7)], vec![700, 600]);
    let b = tx_spending(vec![outpoint_of(&a, 0)], vec![500]);
    let c = tx_spending(vec![outpoint_of(&a, 1)], vec![400]);
    let d = tx_spending(vec![outpoint_of(&b, 0), outpoint_of(&c, 0)], vec![300]);

    for (tx, fee) in [(&a, 400i128), (&b, 300), (&c, 200), (&d, 100)] {
        mempool.add_transaction(entry_with_fee(tx, fee), true).expect("admission");
    }

    let d_entry = mempool.entry(&d.get_id()).expect("entry in the pool");
    assert_eq!(d_entry.count_with_ancestors(), 4);
    assert_eq!(d_entry.fees_with_ancestors(), Fee::from(Amount::from_atoms(1000)));

    let a_entry = mempool.entry(&a.get_id()).expect("entry in the pool");
    assert_eq!(a_entry.count_with_descendants(), 4);
    assert_eq!(a_entry.fees_with_descendants(), Fee::from(Amount::from_atoms(1000)));

    let descendants = mempool.calculate_descendants(&a.get_id());
    assert_eq!(descendants.len(), 4);
    mempool.store.assert_valid();
}

#[test]
fn add_then_remove_restores_previous_state() {
    let mut mempool = make_mempool();
    let txs = tx_chain(8, 2);
    for tx in &txs {
        mempool.add_transaction(entry_with_fee(tx, 100), true).expect("admission");
    }

    let usage_before = mempool.dynamic_memory_usage();
    let parent_desc_fees_before = mempool
        .entry(&txs[0].get_id())
        .expect("parent in the pool")
        .fees_with_descendants();

    let extra = tx_spending(vec![outpoint_of(&txs[1], 0)], vec![50]);
    mempool.add_transaction(entry_with_fee(&extra, 100), true).expect("admission");
    assert_ne!(mempool.dynamic_memory_usage(), usage_before);

    mempool.remove_recursive(extra.transaction(), MempoolRemovalReason::Unknown);

    assert!(!mempool.contains_transaction(&extra.get_id()));
    assert_eq!(mempool.dynamic_memory_usage(), usage_before);
    assert_eq!(
        mempool
            .entry(&txs[0].get_id())
            .expect("parent in the pool")
            .fees_with_descendants(),
        parent_desc_fees_before,
    );
    for tx in &txs {
        let entry = mempool.entry(&tx.get_id()).expect("entry in the pool");
        assert_eq!(entry.count_with_descendants() + entry.count_with_ancestors(), 3);
    }
    mempool.store.assert_valid();
}

#[test]
fn remove_recursive_takes_the_whole_subtree() {
    let mut mempool = make_mempool();
    let txs = tx_chain(9, 3);
    let unrelated = tx_spending(vec![confirmed_outpoint(10)], vec![42]);
    for tx in txs.iter().chain(std::iter::once(&unrelated)) {
        mempool.add_transaction(entry_with_fee(tx, 100), true).expect("admission");
    }
    let events = collect_removal_events(&mut mempool);

    mempool.remove_recursive(txs[1].transaction(), MempoolRemovalReason::Unknown);

    assert!(mempool.contains_transaction(&txs[0].get_id()));
    assert!(!mempool.contains_transaction(&txs[1].get_id()));
    assert!(!mempool.contains_transaction(&txs[2].get_id()));
    assert!(mempool.contains_transaction(&unrelated.get_id()));

    let root = mempool.entry(&txs[0].get_id()).expect("root in the pool");
    assert_eq!(root.count_with_descendants(), 1);
    assert_eq!(root.size_with_descendants(), root.vsize());

    let removed = events.lock().expect("event log lock").clone();
    assert_eq!(removed.len(), 2);
    assert!(removed
        .iter()
        .all(|(_, reason)| *reason == MempoolRemovalReason::Unknown));
    mempool.store.assert_valid();
}

#[test]
fn remove_recursive_of_absent_tx_reaps_spenders_of_its_outputs() {
    let mut mempool = make_mempool();

    // `phantom` itself is never admitted; only a child spending its output.
    let phantom = tx_spending(vec![confirmed_outpoint(11)], vec![123]);
    let child = tx_spending(vec![outpoint_of(&phantom, 0)], vec![60]);
    let grandchild = tx_spending(vec![outpoint_of(&child, 0)], vec![30]);
    mempool.add_transaction(entry_with_fee(&child, 100), true).expect("admission");
    mempool.add_transaction(entry_with_fee(&grandchild, 100), true).expect("admission");

    mempool.remove_recursive(phantom.transaction(), MempoolRemovalReason::Conflict);
    assert!(mempool.store.is_empty());
}

#[test]
fn remove_of_absent_transaction_is_a_no_op() {
    let mut mempool = make_mempool();
    let tx = tx_spending(vec![confirmed_outpoint(12)], vec![1]);
    mempool.remove_recursive(tx.transaction(), MempoolRemovalReason::Unknown);
    mempool.remove_conflicts(tx.transaction());
    assert!(mempool.store.is_empty());
    assert_eq!(mempool.transactions_updated(), 0);
}

#[test]
fn conflicting_package_is_removed_on_demand() {
    let mut mempool = make_mempool();
    let original = tx_spending(vec![confirmed_outpoint(13)], vec![77]);
    let dependent = tx_spending(vec![outpoint_of(&original, 0)], vec![33]);
    mempool.add_transaction(entry_with_fee(&original, 100), true).expect("admission");
    mempool.add_transaction(entry_with_fee(&dependent, 100), true).expect("admission");
    let events = collect_removal_events(&mut mempool);

    // A different transaction spending the same confirmed outpoint.
    let replacement = tx_spending(vec![confirmed_outpoint(13)], vec![88]);
    mempool.remove_conflicts(replacement.transaction());

    assert!(mempool.store.is_empty());
    let removed = events.lock().expect("event log lock").clone();
    assert_eq!(removed.len(), 2);
    assert!(removed
        .iter()
        .all(|(_, reason)| *reason == MempoolRemovalReason::Conflict));
}

#[test]
fn announcement_order_puts_parents_first() {
    let mut mempool = make_mempool();
    let txs = tx_chain(14, 3);
    // Children pay better than their parents; depth still dominates.
    for (tx, fee) in txs.iter().zip([100i128, 500, 900]) {
        mempool.add_transaction(entry_with_fee(tx, fee), true).expect("admission");
    }
    let lone = tx_spending(vec![confirmed_outpoint(15)], vec![5]);
    mempool.add_transaction(entry_with_fee(&lone, 50), true).expect("admission");

    let order = mempool.query_hashes_sorted();
    let position = |id: &Id<Transaction>| {
        order.iter().position(|x| x == id).expect("id in announcement order")
    };
    assert!(position(&txs[0].get_id()) < position(&txs[1].get_id()));
    assert!(position(&txs[1].get_id()) < position(&txs[2].get_id()));
    // Among depth-one entries, the better-paying one goes first.
    assert!(position(&txs[0].get_id()) < position(&lone.get_id()));

    assert_eq!(mempool.info_all().len(), 4);
    assert!(mempool.compare_depth_and_score(&txs[0].get_id(), &txs[2].get_id()));
    // An absent first argument sorts last.
    let absent: Id<Transaction> = Id::new(H256([0xcd; 32]));
    assert!(!mempool.compare_depth_and_score(&absent, &txs[0].get_id()));
    assert!(mempool.compare_depth_and_score(&txs[0].get_id(), &absent));
}

#[test]
fn has_no_inputs_of_sees_only_in_pool_sources() {
    let mut mempool = make_mempool();
    let parent = tx_spending(vec![confirmed_outpoint(16)], vec![11, 12]);
    mempool.add_transaction(entry_with_fee(&parent, 100), true).expect("admission");

    let child = tx_spending(vec![outpoint_of(&parent, 0)], vec![6]);
    assert!(!mempool.has_no_inputs_of(child.transaction()));

    let stranger = tx_spending(vec![confirmed_outpoint(17)], vec![3]);
    assert!(mempool.has_no_inputs_of(stranger.transaction()));
}

#[test]
fn chain_limit_probe_reflects_package_depth() {
    let mut mempool = make_mempool();
    let txs = tx_chain(18, 3);
    for tx in &txs {
        mempool.add_transaction(entry_with_fee(tx, 100), true).expect("admission");
    }
    let absent: Id<Transaction> = Id::new(H256([0xef; 32]));
    assert!(mempool.is_within_chain_limit(&absent, 1));
    assert!(mempool.is_within_chain_limit(&txs[1].get_id(), 3));
    assert!(!mempool.is_within_chain_limit(&txs[0].get_id(), 3));
    assert!(!mempool.is_within_chain_limit(&txs[2].get_id(), 3));
}

#[test]
fn full_audit_passes_after_a_mixed_history() {
    let mut mempool = make_mempool();
    mempool.set_check_frequency(1.0);

    let chain = tx_chain(19, 3);
    let a = tx_spending(vec![confirmed_outpoint(20)], vec![70, 71]);
    let b = tx_spending(vec![outpoint_of(&a, 0)], vec![35]);
    let c = tx_spending(vec![outpoint_of(&a, 1), outpoint_of(&b, 0)], vec![20]);
    let all: Vec<SignedTransaction> =
        chain.iter().cloned().chain([a.clone(), b.clone(), c.clone()]).collect();

    for (index, tx) in all.iter().enumerate() {
        mempool
            .add_transaction(entry_with_fee(tx, 100 + index as i128), true)
            .expect("admission");
    }
    mempool.prioritise_transaction(b.get_id(), Amount::from_atoms(500));
    mempool.remove_recursive(chain[1].transaction(), MempoolRemovalReason::Unknown);

    let view = view_with_confirmed_inputs(&all);
    mempool.check(&view, BlockHeight::new(2));
}

#[test]
fn block_selection_takes_the_best_ancestor_scores_first() {
    use crate::tx_accumulator::{AccumulatorError, TransactionAccumulator};

    struct CollectForBlock {
        collected: Arc<Mutex<Vec<Id<Transaction>>>>,
        limit: usize,
    }

    impl TransactionAccumulator for CollectForBlock {
        fn add_tx(&mut self, tx: SignedTransaction, _tx_fee: Fee) -> Result<(), AccumulatorError> {
            let mut collected = self.collected.lock().expect("accumulator lock");
            if collected.len() >= self.limit {
                return Err(AccumulatorError::Full);
            }
            collected.push(tx.get_id());
            Ok(())
        }

        fn done(&self) -> bool {
            self.collected.lock().expect("accumulator lock").len() >= self.limit
        }
    }

    let mut mempool = make_mempool();
    let cheap = tx_spending(vec![confirmed_outpoint(70)], vec![21]);
    let rich = tx_spending(vec![confirmed_outpoint(71)], vec![22]);
    let chain = tx_chain(72, 2);
    mempool.add_transaction(entry_with_fee(&cheap, 100), true).expect("admission");
    mempool.add_transaction(entry_with_fee(&rich, 10_000), true).expect("admission");
    mempool.add_transaction(entry_with_fee(&chain[0], 10), true).expect("admission");
    mempool.add_transaction(entry_with_fee(&chain[1], 50), true).expect("admission");

    let collected = Arc::new(Mutex::new(Vec::new()));
    mempool.collect_txs(Box::new(CollectForBlock {
        collected: Arc::clone(&collected),
        limit: 2,
    }));

    assert_eq!(
        *collected.lock().expect("accumulator lock"),
        vec![rich.get_id(), cheap.get_id()]
    );
}

#[test]
fn mempool_utxo_view_overlays_pool_outputs() {
    let mut mempool = make_mempool();
    let tx = tx_spending(vec![confirmed_outpoint(21)], vec![64]);
    mempool.add_transaction(entry_with_fee(&tx, 100), true).expect("admission");

    let mut base = InMemoryUtxosView::new();
    let confirmed = confirmed_outpoint(22);
    base.add_unchecked(
        confirmed.clone(),
        Utxo::new_for_blockchain(
            TxOutput::new(Amount::from_atoms(1), Destination::AnyoneCanSpend),
            false,
            BlockHeight::new(3),
        ),
    );

    let overlay = MempoolUtxosView::new(&mempool, &base);

    let pool_coin = overlay.utxo(&outpoint_of(&tx, 0)).expect("pool output visible");
    assert_eq!(pool_coin.output().value(), Amount::from_atoms(64));
    assert_eq!(*pool_coin.source(), utxo::UtxoSource::Mempool);

    // An out-of-range index of an in-pool tx resolves to nothing, not to the base.
    assert!(overlay.utxo(&outpoint_of(&tx, 7)).is_none());

    // Everything else falls through.
    assert!(overlay.utxo(&confirmed).is_some());
}

#[test]
fn clear_resets_the_pool_but_keeps_deltas() {
    let mut mempool = make_mempool();
    let tx = tx_spending(vec![confirmed_outpoint(23)], vec![9]);
    let other: Id<Transaction> = Id::new(H256([0x44; 32]));
    mempool.add_transaction(entry_with_fee(&tx, 100), true).expect("admission");
    mempool.prioritise_transaction(other, Amount::from_atoms(777));

    mempool.clear();
    assert!(mempool.store.is_empty());
    assert_eq!(mempool.fee_delta(&other), Some(Fee::from(Amount::from_atoms(777))));
}
