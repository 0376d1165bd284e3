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

//! Utxo abstractions: the single coin type, the read view trait and an
//! overlay cache over a view.

mod cache;
mod in_memory;
mod utxo;
mod view;

pub use crate::{
    cache::UtxosCache,
    in_memory::InMemoryUtxosView,
    utxo::{Utxo, UtxoSource},
    view::UtxosView,
};

use common::chain::OutPoint;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("No utxo found for outpoint {0:?}")]
    NoUtxoFound(OutPoint),
    #[error("Utxo for outpoint {0:?} already exists")]
    UtxoAlreadyExists(OutPoint),
}
