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

//! Purging entries invalidated by a change of chain tip.

use std::collections::BTreeSet;

use common::{
    chain::{Transaction, TxInput},
    primitives::{BlockHeight, Id},
};
use enumflags2::{bitflags, BitFlags};
use logging::log;
use utxo::UtxosView;

use super::{entry::LockPoints, store::MempoolRemovalReason, Mempool};
use crate::config::Time;

#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTimeFlag {
    /// Re-check cached sequence-lock points against the new tip.
    VerifySequence = 0b01,
    /// Compare time locks against the caller-supplied tip time (median-time
    /// semantics) instead of the wall clock.
    MedianTimePast = 0b10,
}

pub(super) fn remove_for_reorg<V: UtxosView>(
    mempool: &mut Mempool,
    view: &V,
    tip_height: BlockHeight,
    tip_time: Time,
    flags: BitFlags<LockTimeFlag>,
) {
    // Height the pool's transactions would confirm at.
    let spend_height = tip_height.checked_add(1).expect("height overflow");
    let time_cutoff = if flags.contains(LockTimeFlag::MedianTimePast) {
        tip_time
    } else {
        mempool.clock.get_time()
    };
    let maturity = mempool.chain_config.coinbase_maturity();

    let mut to_remove: BTreeSet<Id<Transaction>> = BTreeSet::new();
    for (tx_id, entry) in &mempool.store.txs_by_id {
        let locks_fail = !is_final_tx(entry.transaction(), spend_height, time_cutoff)
            || (flags.contains(LockTimeFlag::VerifySequence)
                && !sequence_locks_hold(entry.lock_points(), tip_height, spend_height, tip_time));
        if locks_fail {
            to_remove.insert(*tx_id);
            continue;
        }

        if entry.spends_coinbase() {
            for input in entry.transaction().inputs() {
                if spent_reward_is_immature(mempool, view, input, spend_height, maturity) {
                    to_remove.insert(*tx_id);
                    break;
                }
            }
        }
    }

    // The union of descendants over all marked entries. An entry already
    // collected as someone's descendant is not traversed again; on a deep
    // reorg this keeps the walk linear in the number of removals.
    let mut stage: BTreeSet<Id<Transaction>> = BTreeSet::new();
    for id in &to_remove {
        if stage.contains(id) {
            continue;
        }
        stage.extend(BTreeSet::from(mempool.store.calculate_descendants(id)));
    }

    log::debug!(
        "remove_for_reorg: purging {} entries at tip height {tip_height}",
        stage.len(),
    );
    mempool.remove_staged(&stage, false, MempoolRemovalReason::Reorg);
}

/// Whether an input's source output, looked up outside the pool, is a block
/// reward that the new tip considers spent or not yet mature.
fn spent_reward_is_immature<V: UtxosView>(
    mempool: &Mempool,
    view: &V,
    input: &TxInput,
    spend_height: BlockHeight,
    maturity: BlockHeight,
) -> bool {
    let outpoint = input.outpoint();
    if outpoint.tx_id().get_tx_id().is_some_and(|id| mempool.store.contains(id)) {
        // In-pool parents are not coinbases.
        return false;
    }
    match view.utxo(outpoint) {
        // The source output is gone from the new chain.
        None => true,
        Some(utxo) => {
            utxo.is_block_reward()
                && utxo.source().blockchain_height().is_some_and(|utxo_height| {
                    spend_height.into_int() < utxo_height.into_int() + maturity.into_int()
                })
        }
    }
}

fn is_final_tx(tx: &Transaction, spend_height: BlockHeight, time: Time) -> bool {
    if tx.lock_time() == 0 {
        return true;
    }
    let cutoff = if tx.is_height_locked() {
        spend_height.into_int()
    } else {
        time.as_secs()
    };
    u64::from(tx.lock_time()) < cutoff
}

/// Evaluate cached lock points against the new tip.
///
/// If the evaluation depended on an input block the new chain no longer
/// reaches, the cache cannot be trusted; recomputing it requires consensus
/// machinery this pool does not have, so the check conservatively fails.
fn sequence_locks_hold(
    lock_points: &LockPoints,
    tip_height: BlockHeight,
    spend_height: BlockHeight,
    tip_time: Time,
) -> bool {
    let cache_valid = lock_points.max_input_height().map_or(true, |height| height <= tip_height);
    cache_valid
        && lock_points.height() < spend_height
        && lock_points.time() < tip_time
}
