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

use crate::{
    chain::{GenBlock, Transaction},
    primitives::Id,
};
use serialization::{Decode, Encode};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub enum OutPointSourceId {
    #[codec(index = 0)]
    Transaction(Id<Transaction>),
    #[codec(index = 1)]
    BlockReward(Id<GenBlock>),
}

impl OutPointSourceId {
    pub fn get_tx_id(&self) -> Option<&Id<Transaction>> {
        match self {
            OutPointSourceId::Transaction(id) => Some(id),
            OutPointSourceId::BlockReward(_) => None,
        }
    }
}

impl From<Id<Transaction>> for OutPointSourceId {
    fn from(id: Id<Transaction>) -> Self {
        OutPointSourceId::Transaction(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct OutPoint {
    id: OutPointSourceId,
    index: u32,
}

impl OutPoint {
    pub fn new(outpoint_source_id: OutPointSourceId, output_index: u32) -> Self {
        OutPoint {
            id: outpoint_source_id,
            index: output_index,
        }
    }

    pub fn tx_id(&self) -> OutPointSourceId {
        self.id.clone()
    }

    pub fn output_index(&self) -> u32 {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Encode, Decode)]
pub struct TxInput {
    outpoint: OutPoint,
}

impl TxInput {
    pub fn new(outpoint_source_id: OutPointSourceId, output_index: u32) -> Self {
        TxInput {
            outpoint: OutPoint::new(outpoint_source_id, output_index),
        }
    }

    pub fn outpoint(&self) -> &OutPoint {
        &self.outpoint
    }
}
