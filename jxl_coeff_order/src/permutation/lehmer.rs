// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{error::Result, util::TryWithCapacity};

/// Set of the still-available values of `0..n`, as a Fenwick tree of
/// presence counts. Supports rank queries and k-th smallest lookups in
/// `O(log n)`.
#[derive(Debug)]
pub struct OrderStatisticsTree {
    // tree[i - 1] holds the number of present values in (i - lowbit(i), i].
    tree: Vec<u32>,
    // Values in n..padded_n are never present.
    n: usize,
    remaining: usize,
}

fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}

impl OrderStatisticsTree {
    /// Creates the set `{0, 1, ..., n - 1}`.
    pub fn new(n: usize) -> Result<OrderStatisticsTree> {
        let padded_n = n.next_power_of_two();
        let mut tree = Vec::try_with_capacity(padded_n)?;
        // Every value present: each node counts its whole range. Padding
        // values are then cleared so that prefix counts stay exact.
        tree.extend((1..=padded_n).map(|i| lowbit(i) as u32));
        let mut set = OrderStatisticsTree {
            tree,
            n,
            remaining: padded_n,
        };
        for value in n..padded_n {
            set.remove(value);
        }
        debug_assert_eq!(set.remaining, n);
        Ok(set)
    }

    /// Number of values still present.
    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Number of present values smaller than `value`.
    pub fn count_less(&self, value: usize) -> usize {
        debug_assert!(value <= self.n);
        let mut count = 0;
        let mut i = value;
        while i != 0 {
            count += self.tree[i - 1] as usize;
            i &= i - 1;
        }
        count
    }

    pub fn contains(&self, value: usize) -> bool {
        value < self.n && self.count_less(value + 1) != self.count_less(value)
    }

    /// Removes `value`, which must be present.
    pub fn remove(&mut self, value: usize) {
        let mut i = value + 1;
        while i <= self.tree.len() {
            self.tree[i - 1] -= 1;
            i += lowbit(i);
        }
        self.remaining -= 1;
    }

    /// Returns the `k`-th smallest (0-based) present value without removing
    /// it, or `None` if fewer than `k + 1` values are present.
    pub fn kth(&self, k: usize) -> Option<usize> {
        if k >= self.remaining {
            return None;
        }
        let mut rank = k as u32 + 1;
        let mut pos = 0;
        let mut bit = self.tree.len();
        while bit != 0 {
            let cand = pos + bit;
            if cand <= self.tree.len() && self.tree[cand - 1] < rank {
                pos = cand;
                rank -= self.tree[cand - 1];
            }
            bit >>= 1;
        }
        debug_assert!(pos < self.n);
        Some(pos)
    }

    /// Removes and returns the `k`-th smallest present value.
    pub fn remove_kth(&mut self, k: usize) -> Option<usize> {
        let value = self.kth(k)?;
        self.remove(value);
        Some(value)
    }
}
