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

use super::{
    signature::inputsig::InputWitness, Transaction, TransactionCreationError, TxInput, TxOutput,
};
use crate::primitives::{Id, Idable};
use serialization::{Decode, Encode};

/// A transaction together with the witnesses authorizing its inputs.
///
/// The id is the id of the contained transaction; witness data does not
/// affect it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Encode, Decode)]
pub struct SignedTransaction {
    transaction: Transaction,
    signatures: Vec<InputWitness>,
}

impl SignedTransaction {
    pub fn new(
        transaction: Transaction,
        signatures: Vec<InputWitness>,
    ) -> Result<Self, TransactionCreationError> {
        if signatures.len() != transaction.inputs().len() {
            return Err(TransactionCreationError::InvalidWitnessCount);
        }
        Ok(Self {
            transaction,
            signatures,
        })
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn signatures(&self) -> &[InputWitness] {
        &self.signatures
    }

    pub fn inputs(&self) -> &Vec<TxInput> {
        self.transaction.inputs()
    }

    pub fn outputs(&self) -> &Vec<TxOutput> {
        self.transaction.outputs()
    }
}

impl Idable for SignedTransaction {
    type Tag = Transaction;

    fn get_id(&self) -> Id<Transaction> {
        self.transaction.get_id()
    }
}
