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

//! A wrapper around all randomness functionality, to make audits easier.

pub use rand::{seq, CryptoRng, Rng, RngCore, SeedableRng};

pub mod rngs {
    pub use rand::rngs::StdRng;
}

/// A cryptographically secure RNG seeded from the operating system.
pub fn make_true_rng() -> impl Rng + CryptoRng {
    rngs::StdRng::from_entropy()
}

/// A fast RNG for uses where unpredictability is not a requirement.
pub fn make_pseudo_rng() -> impl Rng {
    rand::thread_rng()
}
