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

use crate::Utxo;
use common::chain::OutPoint;

/// Read access to some set of unspent outputs.
pub trait UtxosView {
    fn utxo(&self, outpoint: &OutPoint) -> Option<Utxo>;

    fn has_utxo(&self, outpoint: &OutPoint) -> bool {
        self.utxo(outpoint).is_some()
    }
}

impl<T: UtxosView + ?Sized> UtxosView for &T {
    fn utxo(&self, outpoint: &OutPoint) -> Option<Utxo> {
        (**self).utxo(outpoint)
    }
}
