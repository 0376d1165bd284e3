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

use common::{
    chain::{OutPoint, OutPointSourceId, Transaction},
    primitives::{BlockHeight, Idable},
};

use crate::{Error, Utxo, UtxosView};

/// A mutable overlay over a read-only view.
///
/// Entries present in the local map shadow the parent: `Some` is an unspent
/// output, `None` marks an output of the parent as spent.
pub struct UtxosCache<'a> {
    parent: &'a dyn UtxosView,
    utxos: BTreeMap<OutPoint, Option<Utxo>>,
}

impl<'a> UtxosCache<'a> {
    pub fn new(parent: &'a dyn UtxosView) -> Self {
        Self {
            parent,
            utxos: BTreeMap::new(),
        }
    }

    pub fn add_utxo(&mut self, outpoint: &OutPoint, utxo: Utxo) -> Result<(), Error> {
        if self.has_utxo(outpoint) {
            return Err(Error::UtxoAlreadyExists(outpoint.clone()));
        }
        self.utxos.insert(outpoint.clone(), Some(utxo));
        Ok(())
    }

    pub fn spend_utxo(&mut self, outpoint: &OutPoint) -> Result<Utxo, Error> {
        let utxo = self.utxo(outpoint).ok_or_else(|| Error::NoUtxoFound(outpoint.clone()))?;
        self.utxos.insert(outpoint.clone(), None);
        Ok(utxo)
    }

    /// Whether every input of the transaction refers to an unspent output in
    /// this view.
    pub fn has_inputs(&self, tx: &Transaction) -> bool {
        tx.inputs().iter().all(|input| self.has_utxo(input.outpoint()))
    }

    /// Spend the transaction's inputs and create its outputs, as if it were
    /// confirmed at the given height.
    pub fn connect_transaction(
        &mut self,
        tx: &Transaction,
        height: BlockHeight,
    ) -> Result<(), Error> {
        for input in tx.inputs() {
            self.spend_utxo(input.outpoint())?;
        }
        let tx_id = tx.get_id();
        for (index, output) in tx.outputs().iter().enumerate() {
            let outpoint = OutPoint::new(OutPointSourceId::Transaction(tx_id), index as u32);
            let utxo = Utxo::new_for_blockchain(output.clone(), false, height);
            self.add_utxo(&outpoint, utxo)?;
        }
        Ok(())
    }
}

impl UtxosView for UtxosCache<'_> {
    fn utxo(&self, outpoint: &OutPoint) -> Option<Utxo> {
        match self.utxos.get(outpoint) {
            Some(overlay) => overlay.clone(),
            None => self.parent.utxo(outpoint),
        }
    }
}
