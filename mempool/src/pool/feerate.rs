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

use std::num::NonZeroUsize;

use common::primitives::Amount;

use super::fee::Fee;
use crate::error::MempoolPolicyError;

/// The feerate charged on top of an evicted package's feerate before a
/// would-be replacement is allowed back in.
pub const INCREMENTAL_RELAY_FEE_RATE: FeeRate = FeeRate::new(Amount::from_atoms(1000));

/// Below half the incremental relay feerate, the rolling minimum collapses to
/// zero instead of decaying forever.
pub const INCREMENTAL_RELAY_THRESHOLD: FeeRate = FeeRate::new(Amount::from_atoms(500));

/// A fee per 1000 virtual bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FeeRate {
    atoms_per_kb: Amount,
}

impl FeeRate {
    pub const fn new(atoms_per_kb: Amount) -> Self {
        FeeRate { atoms_per_kb }
    }

    pub fn from_total_tx_fee(
        total_tx_fee: Fee,
        tx_size: NonZeroUsize,
    ) -> Result<Self, MempoolPolicyError> {
        let fee = Amount::from(total_tx_fee);
        let atoms_per_kb = (fee * 1000)
            .and_then(|scaled| scaled / tx_size.get() as i128)
            .ok_or(MempoolPolicyError::FeeOverflow)?;
        Ok(FeeRate { atoms_per_kb })
    }

    /// The fee this rate charges for a transaction of the given virtual size.
    pub fn compute_fee(&self, tx_size: usize) -> Result<Fee, MempoolPolicyError> {
        let fee = (self.atoms_per_kb * tx_size as i128)
            .and_then(|scaled| scaled / 1000)
            .ok_or(MempoolPolicyError::FeeOverflow)?;
        Ok(fee.into())
    }

    pub const fn atoms_per_kb(&self) -> Amount {
        self.atoms_per_kb
    }
}

impl std::ops::Add for FeeRate {
    type Output = Option<FeeRate>;

    fn add(self, other: FeeRate) -> Self::Output {
        (self.atoms_per_kb + other.atoms_per_kb).map(|atoms_per_kb| FeeRate { atoms_per_kb })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_round_trips_through_fee() {
        let rate = FeeRate::new(Amount::from_atoms(2000));
        assert_eq!(rate.compute_fee(500).unwrap(), Fee::from(Amount::from_atoms(1000)));

        let derived =
            FeeRate::from_total_tx_fee(Amount::from_atoms(1000).into(), NonZeroUsize::new(500).unwrap())
                .unwrap();
        assert_eq!(derived, rate);
    }

    #[test]
    fn truncating_division() {
        let rate = FeeRate::new(Amount::from_atoms(999));
        assert_eq!(rate.compute_fee(1).unwrap(), Fee::from(Amount::from_atoms(0)));
    }
}
