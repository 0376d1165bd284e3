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

use common::chain::SignedTransaction;

use crate::pool::fee::Fee;

/// The seam between the pool and the block assembler.
///
/// `collect_txs` feeds transactions in ancestor-score order until the
/// accumulator reports it is done (typically: the block weight budget is
/// exhausted). The knapsack logic itself lives with the assembler.
pub trait TransactionAccumulator {
    /// Add a transaction to the accumulator. The accumulator keeps whatever
    /// bookkeeping it needs to decide when it is done.
    fn add_tx(&mut self, tx: SignedTransaction, tx_fee: Fee) -> Result<(), AccumulatorError>;

    fn done(&self) -> bool;
}

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum AccumulatorError {
    #[error("Accumulator cannot take further transactions")]
    Full,
}
