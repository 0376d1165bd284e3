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

use std::time::Duration;

pub type Time = Duration;

pub const MAX_MEMPOOL_SIZE_BYTES: usize = 300_000_000;

pub const DEFAULT_MEMPOOL_EXPIRY: Duration = Duration::new(336 * 60 * 60, 0);

pub const ROLLING_FEE_BASE_HALFLIFE: Time = Duration::new(60 * 60 * 12, 0);

// How long a decayed value is served before it is recomputed.
pub const ROLLING_FEE_DECAY_INTERVAL: Time = Duration::new(10, 0);

// Virtual sizing: a signature operation weighs in as this many bytes, and
// witness bytes are discounted by the scale factor.
pub const BYTES_PER_SIGOP: usize = 20;
pub const WITNESS_SCALE_FACTOR: usize = 4;

pub const DEFAULT_MAX_ANCESTOR_COUNT: usize = 25;
pub const DEFAULT_MAX_ANCESTOR_SIZE: usize = 101_000;
pub const DEFAULT_MAX_DESCENDANT_COUNT: usize = 25;
pub const DEFAULT_MAX_DESCENDANT_SIZE: usize = 101_000;

/// Limits on the unconfirmed chain an entry may participate in, checked at
/// admission time. Sizes are in virtual bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLimits {
    pub max_ancestor_count: usize,
    pub max_ancestor_size: usize,
    pub max_descendant_count: usize,
    pub max_descendant_size: usize,
}

impl ChainLimits {
    /// The sentinel used internally when ancestors are collected for
    /// bookkeeping rather than admission.
    pub const fn no_limits() -> Self {
        ChainLimits {
            max_ancestor_count: usize::MAX,
            max_ancestor_size: usize::MAX,
            max_descendant_count: usize::MAX,
            max_descendant_size: usize::MAX,
        }
    }
}

impl Default for ChainLimits {
    fn default() -> Self {
        ChainLimits {
            max_ancestor_count: DEFAULT_MAX_ANCESTOR_COUNT,
            max_ancestor_size: DEFAULT_MAX_ANCESTOR_SIZE,
            max_descendant_count: DEFAULT_MAX_DESCENDANT_COUNT,
            max_descendant_size: DEFAULT_MAX_DESCENDANT_SIZE,
        }
    }
}
