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

use common::primitives::Amount;
use logging::log;

use super::feerate::FeeRate;
use crate::config::Time;

/// The decaying feerate floor below which the pool refuses entry.
///
/// Eviction bumps the floor to the evicted package's feerate; the floor then
/// halves once per half-life, but only after a block has arrived since the
/// last bump.
#[derive(Debug, Clone, Copy)]
pub struct RollingFeeRate {
    rolling_minimum_fee_rate: FeeRate,
    block_since_last_rolling_fee_bump: bool,
    last_rolling_fee_update: Time,
}

impl RollingFeeRate {
    pub fn new(creation_time: Time) -> Self {
        Self {
            rolling_minimum_fee_rate: FeeRate::new(Amount::ZERO),
            block_since_last_rolling_fee_bump: false,
            last_rolling_fee_update: creation_time,
        }
    }

    pub fn rolling_minimum_fee_rate(&self) -> FeeRate {
        self.rolling_minimum_fee_rate
    }

    pub fn set_rolling_minimum_fee_rate(&mut self, rate: FeeRate) {
        self.rolling_minimum_fee_rate = rate;
    }

    pub fn block_since_last_rolling_fee_bump(&self) -> bool {
        self.block_since_last_rolling_fee_bump
    }

    pub fn set_block_since_last_rolling_fee_bump(&mut self, block_since: bool) {
        self.block_since_last_rolling_fee_bump = block_since;
    }

    pub fn last_rolling_fee_update(&self) -> Time {
        self.last_rolling_fee_update
    }

    pub fn set_last_rolling_fee_update(&mut self, time: Time) {
        self.last_rolling_fee_update = time;
    }

    /// Halve the rate once per elapsed half-life.
    #[must_use]
    pub fn decay_fee(mut self, halflife: Time, current_time: Time) -> Self {
        log::trace!(
            "decay_fee: old fee rate: {:?}, halflife: {halflife:?}",
            self.rolling_minimum_fee_rate,
        );

        let elapsed = current_time.saturating_sub(self.last_rolling_fee_update);
        let divisor = (elapsed.as_secs_f64() / halflife.as_secs_f64()).exp2();
        let old_atoms = self.rolling_minimum_fee_rate.atoms_per_kb().into_atoms();
        let new_atoms = (old_atoms as f64 / divisor) as i128;
        self.rolling_minimum_fee_rate = FeeRate::new(Amount::from_atoms(new_atoms));
        self.last_rolling_fee_update = current_time;

        log::trace!("decay_fee: new fee rate: {:?}", self.rolling_minimum_fee_rate);
        self
    }
}
