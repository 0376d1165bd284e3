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

//! An in-memory pool of candidate transactions, with full ancestor and
//! descendant package accounting.
//!
//! Every entry carries aggregate statistics over its in-pool ancestors and
//! descendants. The aggregates drive chain-limit admission, feerate-based
//! eviction under a byte cap, and the ordering used for block template
//! selection. The pool is a plain object: callers serialize access behind
//! their own lock, and event callbacks fire while that lock is held.

pub mod config;
pub mod error;
pub mod event;
pub mod get_memory_usage;
pub mod pool;
pub mod tx_accumulator;

pub use crate::{
    event::MempoolEvent,
    pool::{
        entry::{LockPoints, TxMempoolEntry},
        fee::Fee,
        feerate::FeeRate,
        reorg::LockTimeFlag,
        store::MempoolRemovalReason,
        Mempool, MempoolUtxosView, TxMempoolInfo,
    },
};
