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

use super::*;

#[test]
fn trim_evicts_the_cheapest_package_first() {
    let mut mempool = make_mempool();

    // A uniform crowd, plus one entry paying ten times the crowd's feerate.
    let crowd: Vec<SignedTransaction> =
        (0..10).map(|seed| tx_spending(vec![confirmed_outpoint(100 + seed)], vec![seed as i128])).collect();
    for tx in &crowd {
        mempool.add_transaction(entry_with_fee(tx, 1000), true).expect("admission");
    }
    let rich = tx_spending(vec![confirmed_outpoint(120)], vec![999]);
    mempool.add_transaction(entry_with_fee(&rich, 10_000), true).expect("admission");

    let events = collect_removal_events(&mut mempool);

    // A limit just below the current usage forces at least one eviction.
    let limit = mempool.dynamic_memory_usage() - 1;
    mempool.trim_to_size(limit, None);

    assert!(mempool.dynamic_memory_usage() <= limit);
    assert!(mempool.contains_transaction(&rich.get_id()));
    let removed = events.lock().expect("event log lock").clone();
    assert!(!removed.is_empty());
    assert!(removed
        .iter()
        .all(|(id, reason)| *reason == MempoolRemovalReason::SizeLimit && *id != rich.get_id()));

    // Eviction set a floor above the crowd's feerate.
    let crowd_entry = entry_with_fee(&crowd[9], 1000);
    let crowd_rate = FeeRate::from_total_tx_fee(
        Fee::from(Amount::from_atoms(1000)),
        std::num::NonZeroUsize::new(crowd_entry.vsize()).expect("nonzero vsize"),
    )
    .expect("crowd feerate");
    let floor = mempool.get_min_fee(MAX_MEMPOOL_SIZE_BYTES);
    assert!(
        floor.atoms_per_kb()
            >= (crowd_rate + feerate::INCREMENTAL_RELAY_FEE_RATE)
                .expect("rate addition")
                .atoms_per_kb()
    );
}

#[test]
fn trim_removes_whole_packages() {
    let mut mempool = make_mempool();

    // A cheap chain and an expensive loner.
    let chain = tx_chain(130, 3);
    for tx in &chain {
        mempool.add_transaction(entry_with_fee(tx, 10), true).expect("admission");
    }
    let rich = tx_spending(vec![confirmed_outpoint(140)], vec![1]);
    mempool.add_transaction(entry_with_fee(&rich, 100_000), true).expect("admission");

    let mut gone_spends = Vec::new();
    let limit = mempool.dynamic_memory_usage() - 1;
    mempool.trim_to_size(limit, Some(&mut gone_spends));

    // The cheap package went as a unit, root included.
    for tx in &chain {
        assert!(!mempool.contains_transaction(&tx.get_id()));
    }
    assert!(mempool.contains_transaction(&rich.get_id()));

    // The chain's confirmed root outpoint has no in-pool spender anymore.
    assert!(gone_spends.contains(&confirmed_outpoint(130)));
    assert!(!mempool.is_spent(&confirmed_outpoint(130)));
    mempool.store.assert_valid();
}

#[test]
fn trim_to_generous_limit_removes_nothing() {
    let mut mempool = make_mempool();
    let tx = tx_spending(vec![confirmed_outpoint(150)], vec![8]);
    mempool.add_transaction(entry_with_fee(&tx, 100), true).expect("admission");

    let usage = mempool.dynamic_memory_usage();
    mempool.trim_to_size(usage * 2, None);
    assert!(mempool.contains_transaction(&tx.get_id()));
    assert_eq!(mempool.dynamic_memory_usage(), usage);
    // No eviction, no floor.
    assert_eq!(
        mempool.get_min_fee(MAX_MEMPOOL_SIZE_BYTES),
        FeeRate::new(Amount::ZERO)
    );
}

#[test]
fn memory_usage_never_grows_while_trimming() {
    let mut mempool = make_mempool();
    for seed in 0..20u8 {
        let tx = tx_spending(vec![confirmed_outpoint(160 + seed as u8)], vec![seed as i128]);
        mempool.add_transaction(entry_with_fee(&tx, 100 + seed as i128), true).expect("admission");
    }

    let mut limit = mempool.dynamic_memory_usage();
    while !mempool.store.is_empty() {
        limit = limit.saturating_sub(limit / 4).saturating_sub(1);
        let before = mempool.dynamic_memory_usage();
        mempool.trim_to_size(limit, None);
        let after = mempool.dynamic_memory_usage();
        assert!(after <= before);
        assert!(after <= limit || mempool.store.is_empty());
    }
}

#[test]
fn rolling_fee_decays_once_a_block_arrives() {
    let time = Arc::new(AtomicU64::new(1_000_000));
    let mut mempool = make_mempool_with_clock(Arc::clone(&time));

    let crowd: Vec<SignedTransaction> =
        (0..5).map(|seed| tx_spending(vec![confirmed_outpoint(180 + seed)], vec![seed as i128])).collect();
    for tx in &crowd {
        mempool.add_transaction(entry_with_fee(tx, 1000), true).expect("admission");
    }
    let limit = mempool.dynamic_memory_usage() - 1;
    mempool.trim_to_size(limit, None);

    let floor_after_trim = mempool.get_min_fee(MAX_MEMPOOL_SIZE_BYTES);
    assert!(floor_after_trim.atoms_per_kb() > Amount::ZERO);

    // Without a block, the floor does not decay no matter how long we wait.
    time.fetch_add(24 * 60 * 60, AtomicOrdering::SeqCst);
    assert_eq!(mempool.get_min_fee(MAX_MEMPOOL_SIZE_BYTES), floor_after_trim);

    // A block arrives; from then on time erodes the floor.
    mempool.remove_for_block(&[], BlockHeight::new(5));
    // The pool is far below a quarter of the cap, so the half-life is
    // ROLLING_FEE_BASE_HALFLIFE / 4. Wait two of those.
    time.fetch_add(2 * ROLLING_FEE_BASE_HALFLIFE.as_secs() / 4, AtomicOrdering::SeqCst);
    let decayed = mempool.get_min_fee(MAX_MEMPOOL_SIZE_BYTES);
    assert!(decayed < floor_after_trim);

    // Far enough in the future the floor collapses to zero.
    time.fetch_add(40 * ROLLING_FEE_BASE_HALFLIFE.as_secs(), AtomicOrdering::SeqCst);
    assert_eq!(
        mempool.get_min_fee(MAX_MEMPOOL_SIZE_BYTES),
        FeeRate::new(Amount::ZERO)
    );
}

#[test]
fn expiry_removes_old_entries_with_their_descendants() {
    let mut mempool = make_mempool();

    let old_chain = tx_chain(200, 2);
    mempool
        .add_transaction(entry_with_fee_and_time(&old_chain[0], 100, 50), true)
        .expect("admission");
    // The child is fresh, but goes down with its expired parent.
    mempool
        .add_transaction(entry_with_fee_and_time(&old_chain[1], 100, 500), true)
        .expect("admission");
    let fresh = tx_spending(vec![confirmed_outpoint(210)], vec![4]);
    mempool.add_transaction(entry_with_fee_and_time(&fresh, 100, 500), true).expect("admission");

    let events = collect_removal_events(&mut mempool);
    let removed = mempool.expire(Duration::from_secs(100));

    assert_eq!(removed, 2);
    assert!(!mempool.contains_transaction(&old_chain[0].get_id()));
    assert!(!mempool.contains_transaction(&old_chain[1].get_id()));
    assert!(mempool.contains_transaction(&fresh.get_id()));
    assert!(events
        .lock()
        .expect("event log lock")
        .iter()
        .all(|(_, reason)| *reason == MempoolRemovalReason::Expiry));
}

#[test]
fn expiry_cutoff_is_exclusive_of_newer_entries() {
    let time = Arc::new(AtomicU64::new(1_000));
    let mut mempool = make_mempool_with_clock(Arc::clone(&time));
    mempool.set_max_tx_age(Duration::from_secs(300));

    let old = tx_spending(vec![confirmed_outpoint(220)], vec![2]);
    let new = tx_spending(vec![confirmed_outpoint(221)], vec![3]);
    mempool.add_transaction(entry_with_fee_and_time(&old, 100, 600), true).expect("admission");
    mempool.add_transaction(entry_with_fee_and_time(&new, 100, 900), true).expect("admission");

    time.store(1_100, AtomicOrdering::SeqCst);
    let removed = mempool.remove_expired_transactions();
    assert_eq!(removed, 1);
    assert!(!mempool.contains_transaction(&old.get_id()));
    assert!(mempool.contains_transaction(&new.get_id()));
}
