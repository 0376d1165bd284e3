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

use blake2::digest::{consts::U32, Digest};

type Blake2b32 = blake2::Blake2b<U32>;

/// Incremental hashing over a stream of byte chunks.
pub trait StreamHasher {
    fn new() -> Self;
    fn write<T: AsRef<[u8]>>(&mut self, data: T) -> &mut Self;
    fn finalize(&mut self) -> [u8; 32];
}

/// Blake2b with a 256-bit output, the hash used for all object ids.
pub struct Blake2b32Stream {
    state: Blake2b32,
}

impl StreamHasher for Blake2b32Stream {
    fn new() -> Self {
        Self {
            state: Blake2b32::new(),
        }
    }

    fn write<T: AsRef<[u8]>>(&mut self, data: T) -> &mut Self {
        Digest::update(&mut self.state, data);
        self
    }

    fn finalize(&mut self) -> [u8; 32] {
        let state = std::mem::replace(&mut self.state, Blake2b32::new());
        state.finalize().into()
    }
}

/// One-shot Blake2b-256 of the given bytes.
pub fn blake2b_256<T: AsRef<[u8]>>(data: T) -> [u8; 32] {
    Blake2b32::digest(data).into()
}
