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

use common::{chain::Transaction, primitives::Id};
use thiserror::Error;

/// Admission failures. None of these change pool state.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum MempoolPolicyError {
    #[error("Transaction has too many unconfirmed ancestors (limit: {limit})")]
    TooManyAncestors { limit: usize },
    #[error("Transaction would exceed the unconfirmed ancestor size limit (limit: {limit})")]
    AncestorSizeExceeded { limit: usize },
    #[error("Transaction would exceed the descendant size limit of transaction {0}")]
    DescendantSizeExceededFor(Id<Transaction>),
    #[error("Transaction would create too many descendants of transaction {0}")]
    TooManyDescendantsFor(Id<Transaction>),
    #[error("Overflow while summing ancestor fees")]
    AncestorFeeOverflow,
    #[error("Fee overflow")]
    FeeOverflow,
}
