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

//! Estimate memory usage taken by data structures.

use std::mem;

use common::chain::{
    signature::inputsig::InputWitness, SignedTransaction, TxInput, TxOutput,
};

// Code to estimate size taken up by [std::collections::BTreeSet] or [std::collections::BTreeMap].
pub mod btree {
    use std::{marker::PhantomData, mem};

    // The following structs are laid out in the same way as the real standard library equivalents
    // to give a reasonably precise estimation of their sizes. It is possible that the library
    // implementations change in the future. In that case, the estimation becomes less precise
    // although hopefully will remain good enough for our purposes until the structs below are
    // updated to reflect the change. It's still just an estimate after all.

    const B: usize = 6;
    const CAP: usize = B * 2 - 1;
    const BF: usize = 2 * B; // branching factor

    struct _LeafNode<K, V> {
        _parent: *mut (),
        _parent_idx: u16,
        _len: u16,
        _keys: [K; CAP],
        _vals: [V; CAP],
    }

    struct _InternalNode<K, V> {
        _data: _LeafNode<K, V>,
        _children: [*mut (); BF],
    }

    pub struct Tree<K, V>(PhantomData<fn() -> (K, V)>);

    /// Estimate the memory usage of the B-tree structure.
    ///
    /// This includes the space taken up by the keys and values stored in the
    /// tree, but not any memory they point to indirectly.
    pub fn usage<K, V>(num_elems: usize) -> usize {
        // Use u64 internally to avoid possible overflow issues on 32-bit platforms
        let num_elems = num_elems as u64;

        // Size of B-tree nodes:
        let leaf_size = mem::size_of::<_LeafNode<K, V>>() as u64;
        let internal_size = mem::size_of::<_InternalNode<K, V>>() as u64;

        // Size of all leaf elements.
        let leaves = (leaf_size * num_elems) / CAP as u64;

        // Size of internal nodes. We add extra 10% overhead for all the levels of the tree
        let elems_per_internal_node = (CAP * BF) as u64;
        let internals = (internal_size * num_elems * 11) / (elems_per_internal_node * 10);

        // Total size of the B-tree structure. Assuming nodes are on average 75% full, an
        // additional overhead is added for the unused occupied space.
        let total = 4 * (leaves + internals) / 3;

        total as usize
    }
}

/// Trait for data types capable of reporting their current memory usage
pub trait MemUsage {
    /// Get amount of memory taken by the data owned by `self` (e.g. if it contains `Box` or `Vec`)
    fn indirect_memory_usage(&self) -> usize;
}

impl MemUsage for u8 {
    fn indirect_memory_usage(&self) -> usize {
        0
    }
}

impl<T: MemUsage> MemUsage for Option<T> {
    fn indirect_memory_usage(&self) -> usize {
        self.as_ref().map_or(0, |x| x.indirect_memory_usage())
    }
}

impl<T: MemUsage> MemUsage for [T] {
    fn indirect_memory_usage(&self) -> usize {
        self.iter().map(T::indirect_memory_usage).sum::<usize>() + self.len() * mem::size_of::<T>()
    }
}

impl<T: MemUsage> MemUsage for Vec<T> {
    fn indirect_memory_usage(&self) -> usize {
        self.as_slice().indirect_memory_usage()
    }
}

impl MemUsage for SignedTransaction {
    /// Only data held indirectly (via pointers). The transaction object
    /// itself is accounted for by whatever structure contains it.
    fn indirect_memory_usage(&self) -> usize {
        let ins = self.inputs().indirect_memory_usage();
        let outs = self.outputs().indirect_memory_usage();
        let sigs = self.signatures().indirect_memory_usage();
        ins + outs + sigs
    }
}

impl MemUsage for TxInput {
    fn indirect_memory_usage(&self) -> usize {
        // No data owned by this object
        0
    }
}

impl MemUsage for TxOutput {
    fn indirect_memory_usage(&self) -> usize {
        0
    }
}

impl MemUsage for InputWitness {
    fn indirect_memory_usage(&self) -> usize {
        match self {
            InputWitness::NoSignature(data) => data.indirect_memory_usage(),
            InputWitness::Standard(sig) => sig.raw_signature().indirect_memory_usage(),
        }
    }
}
