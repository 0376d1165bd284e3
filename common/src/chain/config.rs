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

use crate::primitives::BlockHeight;

const DEFAULT_COINBASE_MATURITY: BlockHeight = BlockHeight::new(100);

/// Consensus-level parameters of the chain the node runs on.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    coinbase_maturity: BlockHeight,
}

impl ChainConfig {
    /// Number of blocks that must elapse before a block-reward output may be
    /// spent.
    pub fn coinbase_maturity(&self) -> BlockHeight {
        self.coinbase_maturity
    }
}

#[derive(Clone)]
pub struct Builder {
    coinbase_maturity: BlockHeight,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            coinbase_maturity: DEFAULT_COINBASE_MATURITY,
        }
    }

    pub fn coinbase_maturity(mut self, maturity: BlockHeight) -> Self {
        self.coinbase_maturity = maturity;
        self
    }

    pub fn build(self) -> ChainConfig {
        let Self { coinbase_maturity } = self;
        ChainConfig { coinbase_maturity }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_mainnet() -> ChainConfig {
    Builder::new().build()
}

/// A config with parameters convenient for unit tests.
pub fn create_unit_test_config() -> ChainConfig {
    Builder::new().build()
}
