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

use std::collections::BTreeMap;

use common::chain::OutPoint;

use crate::{Utxo, UtxosView};

/// A self-contained utxo set held in a map. Serves as the bottom view where
/// no chainstate is involved.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUtxosView {
    utxos: BTreeMap<OutPoint, Utxo>,
}

impl InMemoryUtxosView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unchecked(&mut self, outpoint: OutPoint, utxo: Utxo) {
        self.utxos.insert(outpoint, utxo);
    }

    pub fn remove(&mut self, outpoint: &OutPoint) -> Option<Utxo> {
        self.utxos.remove(outpoint)
    }
}

impl UtxosView for InMemoryUtxosView {
    fn utxo(&self, outpoint: &OutPoint) -> Option<Utxo> {
        self.utxos.get(outpoint).cloned()
    }
}
