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

use crate::pool::store::MempoolRemovalReason;

/// Notifications about entries entering and leaving the pool.
///
/// Handlers run while the pool's caller still holds its lock; a handler must
/// not call back into the pool.
#[derive(Debug, Clone)]
pub enum MempoolEvent {
    TransactionAdded {
        tx: SignedTransaction,
        /// Whether the entry is suitable as a fee-estimator data point (set
        /// by the caller; the estimator subscribes to these events).
        valid_fee_estimate: bool,
    },
    TransactionRemoved {
        tx: SignedTransaction,
        reason: MempoolRemovalReason,
    },
}
