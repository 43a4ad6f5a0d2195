// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::bit_reader::BitReader;
use crate::bit_writer::BitWriter;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug)]
pub enum U32 {
    Bits(usize),
    BitsOffset { n: usize, off: u32 },
    Val(u32),
}

impl U32 {
    pub fn read(&self, br: &mut BitReader) -> Result<u32> {
        match *self {
            U32::Bits(n) => Ok(br.read(n)? as u32),
            U32::BitsOffset { n, off } => (br.read(n)? as u32)
                .checked_add(off)
                .ok_or(Error::ArithmeticOverflow),
            U32::Val(val) => Ok(val),
        }
    }

    /// Number of payload bits needed to write `value`, if representable.
    fn cost(&self, value: u32) -> Option<usize> {
        match *self {
            U32::Bits(n) => ((value as u64) >> n == 0).then_some(n),
            U32::BitsOffset { n, off } => value
                .checked_sub(off)
                .filter(|v| (*v as u64) >> n == 0)
                .map(|_| n),
            U32::Val(val) => (val == value).then_some(0),
        }
    }

    fn write(&self, value: u32, bw: &mut BitWriter) -> Result<()> {
        match *self {
            U32::Bits(n) => bw.write(n, value as u64),
            U32::BitsOffset { n, off } => bw.write(n, (value - off) as u64),
            U32::Val(_) => Ok(()),
        }
    }
}

/// Self-describing integer encoding: either a single distribution, or a 2-bit
/// selector followed by the payload of the selected distribution.
#[derive(Clone, Copy, Debug)]
pub enum U32Coder {
    Direct(U32),
    Select(U32, U32, U32, U32),
}

impl U32Coder {
    pub fn read(&self, br: &mut BitReader) -> Result<u32> {
        match self {
            U32Coder::Direct(u) => u.read(br),
            U32Coder::Select(u0, u1, u2, u3) => {
                let selector = br.read(2)?;
                match selector {
                    0 => u0.read(br),
                    1 => u1.read(br),
                    2 => u2.read(br),
                    _ => u3.read(br),
                }
            }
        }
    }

    /// Writes `value` with the cheapest distribution that can represent it.
    /// Ties go to the lowest selector.
    pub fn write(&self, value: u32, bw: &mut BitWriter) -> Result<()> {
        match self {
            U32Coder::Direct(u) => {
                u.cost(value).ok_or(Error::U32NotRepresentable(value))?;
                u.write(value, bw)
            }
            U32Coder::Select(u0, u1, u2, u3) => {
                let (selector, dist) = [u0, u1, u2, u3]
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, u)| u.cost(value).map(|cost| (cost, i, u)))
                    .min_by_key(|(cost, i, _)| (*cost, *i))
                    .map(|(_, i, u)| (i, u))
                    .ok_or(Error::U32NotRepresentable(value))?;
                bw.write(2, selector as u64)?;
                dist.write(value, bw)
            }
        }
    }
}
