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

use std::marker::PhantomData;

use crypto::hash::StreamHasher;
use serialization::{Decode, Encode};

pub type DefaultHashAlgoStream = crypto::hash::Blake2b32Stream;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct H256(pub [u8; 32]);

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }
}

impl std::fmt::Display for H256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for H256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A hash-based identifier tagged with the type of the object it identifies,
/// so that ids of different entities cannot be mixed up.
pub struct Id<T> {
    hash: H256,
    _shape: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn new(hash: H256) -> Self {
        Self {
            hash,
            _shape: PhantomData,
        }
    }

    pub const fn to_hash(&self) -> H256 {
        self.hash
    }
}

// The impls below are written out by hand so they do not put bounds on `T`,
// which is only ever a phantom tag.

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.hash.cmp(&other.hash)
    }
}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state)
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.hash.fmt(f)
    }
}

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id<{}>{{{}}}", std::any::type_name::<T>(), self.hash)
    }
}

impl<T> Encode for Id<T> {
    fn encode_to<O: serialization::Output + ?Sized>(&self, dest: &mut O) {
        self.hash.encode_to(dest)
    }
}

impl<T> Decode for Id<T> {
    fn decode<I: serialization::Input>(input: &mut I) -> Result<Self, serialization::Error> {
        H256::decode(input).map(Self::new)
    }
}

pub trait Idable {
    type Tag;

    fn get_id(&self) -> Id<Self::Tag>;
}

/// Hash the SCALE encoding of the given value into the given hash stream.
pub fn hash_encoded_to<T: Encode, H: StreamHasher>(value: &T, stream: &mut H) {
    value.encode_to(&mut HashedStreamWriter(stream))
}

/// Hash the SCALE encoding of the given value.
pub fn hash_encoded<T: Encode>(value: &T) -> H256 {
    let mut stream = DefaultHashAlgoStream::new();
    hash_encoded_to(value, &mut stream);
    H256(stream.finalize())
}

struct HashedStreamWriter<'a, H: StreamHasher>(&'a mut H);

impl<H: StreamHasher> serialization::Output for HashedStreamWriter<'_, H> {
    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_encoded_matches_streamed_hash() {
        let value = (42u64, vec![1u8, 2, 3]);
        let mut stream = DefaultHashAlgoStream::new();
        hash_encoded_to(&value, &mut stream);
        assert_eq!(hash_encoded(&value), H256(stream.finalize()));
    }

    #[test]
    fn ids_of_distinct_values_differ() {
        assert_ne!(hash_encoded(&1u64), hash_encoded(&2u64));
    }
}
