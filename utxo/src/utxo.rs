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

use common::{chain::TxOutput, primitives::BlockHeight};
use serialization::{Decode, Encode};

/// Where an unspent output comes from: a confirmed block at some height, or
/// a transaction that is still in the mempool.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum UtxoSource {
    #[codec(index = 0)]
    Blockchain(BlockHeight),
    #[codec(index = 1)]
    Mempool,
}

impl UtxoSource {
    pub fn blockchain_height(&self) -> Option<BlockHeight> {
        match self {
            UtxoSource::Blockchain(height) => Some(*height),
            UtxoSource::Mempool => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Utxo {
    output: TxOutput,
    is_block_reward: bool,
    source: UtxoSource,
}

impl Utxo {
    pub fn new_for_blockchain(output: TxOutput, is_block_reward: bool, height: BlockHeight) -> Self {
        Self {
            output,
            is_block_reward,
            source: UtxoSource::Blockchain(height),
        }
    }

    pub fn new_for_mempool(output: TxOutput) -> Self {
        Self {
            output,
            is_block_reward: false,
            source: UtxoSource::Mempool,
        }
    }

    pub fn output(&self) -> &TxOutput {
        &self.output
    }

    pub fn is_block_reward(&self) -> bool {
        self.is_block_reward
    }

    pub fn source(&self) -> &UtxoSource {
        &self.source
    }
}
