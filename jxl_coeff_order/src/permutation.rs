// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Transport of arbitrary permutations as Lehmer codes.
//!
//! Element `i` of a permutation with a `skip`-long identity prefix is coded as
//! its rank among the values not used by elements `skip..i`. The stream holds
//! the number `end` of ranks up to the last non-zero one, in
//! `ceil_log2(size - skip + 1)` bits, followed by those ranks, each in
//! `ceil_log2(size - i)` bits. Trailing zero ranks are implied, so the
//! identity permutation costs the `end` field only.

pub mod lehmer;

use crate::{
    bit_reader::BitReader,
    bit_writer::BitWriter,
    error::{Error, Result},
    util::{CeilLog2, TryWithCapacity, tracing_wrappers::*},
};
use lehmer::OrderStatisticsTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(Vec<u32>);

impl std::ops::Deref for Permutation {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        &self.0
    }
}

impl From<Permutation> for Vec<u32> {
    fn from(permutation: Permutation) -> Vec<u32> {
        permutation.0
    }
}

fn bits_for_end(size: u32, skip: u32) -> usize {
    (size - skip + 1).ceil_log2() as usize
}

fn bits_for_rank(size: u32, idx: u32) -> usize {
    (size - idx).ceil_log2() as usize
}

impl Permutation {
    pub fn identity(size: u32) -> Result<Self> {
        let mut permutation = Vec::try_with_capacity(size as usize)?;
        permutation.extend(0..size);
        Ok(Self(permutation))
    }

    /// Replaces `self` with `self ∘ other`, i.e. `self[other[i]]` at `i`.
    pub fn compose(&mut self, other: &[u32]) {
        debug_assert_eq!(self.0.len(), other.len());
        self.0 = other.iter().map(|&i| self.0[i as usize]).collect();
    }

    /// Computes the Lehmer code of `order[skip..]`, checking that `order` is
    /// a permutation of `0..order.len()` whose first `skip` elements are the
    /// identity.
    pub fn lehmer_code(order: &[u32], skip: u32) -> Result<Vec<u32>> {
        let size = u32::try_from(order.len()).map_err(|_| Error::ArithmeticOverflow)?;
        if skip > size {
            return Err(Error::InvalidPermutationSize { size, skip, end: 0 });
        }
        let invalid = |idx: usize, value: u32| Error::InvalidPermutation {
            size,
            skip,
            idx: idx as u32,
            value,
        };
        if let Some((idx, &value)) = order[..skip as usize]
            .iter()
            .enumerate()
            .find(|(idx, value)| **value as usize != *idx)
        {
            return Err(invalid(idx, value));
        }

        let mut available = OrderStatisticsTree::new((size - skip) as usize)?;
        let mut lehmer = Vec::try_with_capacity((size - skip) as usize)?;
        for (idx, &value) in order.iter().enumerate().skip(skip as usize) {
            let candidate = value.wrapping_sub(skip) as usize;
            if value < skip || !available.contains(candidate) {
                return Err(invalid(idx, value));
            }
            lehmer.push(available.count_less(candidate) as u32);
            available.remove(candidate);
        }
        Ok(lehmer)
    }

    /// Writes `order`, whose first `skip` elements must be the identity.
    pub fn encode(order: &[u32], skip: u32, bw: &mut BitWriter) -> Result<()> {
        let lehmer = Self::lehmer_code(order, skip)?;
        let size = order.len() as u32;
        let end = lehmer
            .iter()
            .rposition(|&val| val != 0)
            .map_or(0, |last| last + 1);
        #[cfg(feature = "tracing")]
        let bits_before = bw.total_bits_written();
        bw.write(bits_for_end(size, skip), end as u64)?;
        for (idx, &val) in (skip..).zip(lehmer[..end].iter()) {
            bw.write(bits_for_rank(size, idx), val as u64)?;
        }
        trace!(
            size,
            skip,
            end,
            bits = bw.total_bits_written() - bits_before,
            "encoded permutation"
        );
        Ok(())
    }

    /// Reads a permutation of `0..size` whose first `skip` elements are the
    /// identity.
    pub fn decode(size: u32, skip: u32, br: &mut BitReader) -> Result<Self> {
        if skip > size {
            return Err(Error::InvalidPermutationSize { size, skip, end: 0 });
        }
        let end = br.read(bits_for_end(size, skip))? as u32;
        Self::decode_inner(size, skip, end, |idx| {
            Ok(br.read(bits_for_rank(size, idx))? as u32)
        })
    }

    /// Rebuilds the permutation from `end` Lehmer code values obtained from
    /// `read`, which receives the index of the element being decoded.
    fn decode_inner(
        size: u32,
        skip: u32,
        end: u32,
        mut read: impl FnMut(u32) -> Result<u32>,
    ) -> Result<Self> {
        if skip > size || end > size - skip {
            return Err(Error::InvalidPermutationSize { size, skip, end });
        }

        let mut available = OrderStatisticsTree::new((size - skip) as usize)?;
        let mut permutation = Vec::try_with_capacity(size as usize)?;
        permutation.extend(0..skip);
        for idx in skip..size {
            let lehmer = if idx < skip + end { read(idx)? } else { 0 };
            let invalid = Error::InvalidPermutationLehmerCode { size, idx, lehmer };
            if lehmer >= size - idx {
                return Err(invalid);
            }
            let value = available.remove_kth(lehmer as usize).ok_or(invalid)?;
            permutation.push(skip + value as u32);
        }
        Ok(Self(permutation))
    }
}
