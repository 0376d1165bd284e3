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

use common::chain::OutPoint;
use utxo::{Utxo, UtxosView};

use super::Mempool;

/// A coin view that lays the pool's not-yet-confirmed outputs over a base
/// view of the confirmed utxo set.
///
/// This is what validation consults when checking inputs of a candidate
/// child of an in-pool parent: the parent's outputs appear here as spendable
/// mempool coins.
pub struct MempoolUtxosView<'a, V> {
    mempool: &'a Mempool,
    base: V,
}

impl<'a, V: UtxosView> MempoolUtxosView<'a, V> {
    pub fn new(mempool: &'a Mempool, base: V) -> Self {
        Self { mempool, base }
    }
}

impl<V: UtxosView> UtxosView for MempoolUtxosView<'_, V> {
    fn utxo(&self, outpoint: &OutPoint) -> Option<Utxo> {
        if let Some(tx_id) = outpoint.tx_id().get_tx_id() {
            if let Some(entry) = self.mempool.store.get_entry(tx_id) {
                // An in-pool source resolves here or not at all: an index
                // past the end of its outputs must not fall through to the
                // base view.
                return entry
                    .transaction()
                    .outputs()
                    .get(outpoint.output_index() as usize)
                    .map(|output| Utxo::new_for_mempool(output.clone()));
            }
        }
        self.base.utxo(outpoint)
    }
}
