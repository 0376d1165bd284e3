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
use utils::newtype;

newtype! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Fee(Amount);
}

impl Fee {
    pub const ZERO: Fee = Fee(Amount::ZERO);

    pub fn into_amount(self) -> Amount {
        self.0
    }
}

impl std::ops::Add for Fee {
    type Output = Option<Fee>;

    fn add(self, other: Fee) -> Self::Output {
        (self.0 + other.0).map(Fee)
    }
}

impl std::ops::Sub for Fee {
    type Output = Option<Fee>;

    fn sub(self, other: Fee) -> Self::Output {
        (self.0 - other.0).map(Fee)
    }
}

impl std::iter::Sum<Fee> for Option<Fee> {
    fn sum<I: Iterator<Item = Fee>>(iter: I) -> Self {
        iter.map(Amount::from).sum::<Option<Amount>>().map(Fee)
    }
}

impl std::fmt::Display for Fee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
