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

use crate::primitives::{id, Id, Idable};
use crypto::hash::StreamHasher;
use serialization::{Decode, Encode};
use thiserror::Error;

pub mod input;
pub mod output;
pub mod signature;
pub mod signed_transaction;

pub use input::{OutPoint, OutPointSourceId, TxInput};
pub use output::{Destination, TxOutput};
pub use signed_transaction::SignedTransaction;

/// Time locks with a `lock_time` below this value are height locks, at or
/// above it they are Unix-time locks.
pub const LOCK_TIME_THRESHOLD: u32 = 500_000_000;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum TransactionCreationError {
    #[error("The number of signatures does not match the number of inputs")]
    InvalidWitnessCount,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Encode, Decode)]
pub struct Transaction {
    flags: u32,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    lock_time: u32,
}

impl Transaction {
    // Included in the id hash so future transaction formats hash differently.
    const VERSION_BYTE: u8 = 0x01;

    pub fn new(
        flags: u32,
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
        lock_time: u32,
    ) -> Result<Self, TransactionCreationError> {
        Ok(Transaction {
            flags,
            inputs,
            outputs,
            lock_time,
        })
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn inputs(&self) -> &Vec<TxInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TxOutput> {
        &self.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.lock_time
    }

    /// Whether the time lock is a height lock, as opposed to a Unix-time one.
    pub fn is_height_locked(&self) -> bool {
        self.lock_time < LOCK_TIME_THRESHOLD
    }
}

impl Idable for Transaction {
    type Tag = Transaction;

    fn get_id(&self) -> Id<Transaction> {
        // The id covers the transaction contents but never the witnesses, so
        // it is stable under signing.
        let mut hash_stream = id::DefaultHashAlgoStream::new();
        id::hash_encoded_to(&Self::VERSION_BYTE, &mut hash_stream);
        id::hash_encoded_to(&self.flags, &mut hash_stream);
        id::hash_encoded_to(&self.inputs, &mut hash_stream);
        id::hash_encoded_to(&self.outputs, &mut hash_stream);
        id::hash_encoded_to(&self.lock_time, &mut hash_stream);
        Id::new(hash_stream.finalize().into())
    }
}
