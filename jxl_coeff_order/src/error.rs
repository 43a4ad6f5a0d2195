// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Read out of bounds")]
    OutOfBounds,
    #[error("Non-zero padding bits")]
    NonZeroPadding,
    #[error("Cannot write {0} bits at once")]
    WriteTooLarge(usize),
    #[error("Value {0} does not fit in {1} bits")]
    ValueTooLarge(u64, usize),
    #[error("Value {0} cannot be represented by this U32 distribution")]
    U32NotRepresentable(u32),
    // Permutation format errors
    #[error("Invalid permutation: skip {skip}, size {size}, end {end}")]
    InvalidPermutationSize { size: u32, skip: u32, end: u32 },
    #[error("Invalid permutation: Lehmer code {lehmer} out of bounds at index {idx} (size {size})")]
    InvalidPermutationLehmerCode { size: u32, idx: u32, lehmer: u32 },
    #[error(
        "Not a permutation of {skip}..{size} with identity prefix: value {value} at index {idx}"
    )]
    InvalidPermutation {
        size: u32,
        skip: u32,
        idx: u32,
        value: u32,
    },
    #[error("Invalid used orders mask {0:#x}")]
    InvalidUsedOrders(u32),
    #[error("Invalid transform type for VarDCT: {0}")]
    InvalidVarDCTTransform(i32),
    #[error("Block ({0}, {1}) is not the first block of a varblock")]
    NotFirstBlock(usize, usize),
    #[error(
        "Varblock at ({bx}, {by}) has {found} coefficients, its order has {expected}"
    )]
    CoefficientLayoutMismatch {
        bx: usize,
        by: usize,
        expected: usize,
        found: usize,
    },
    #[error("Varblock at ({0}, {1}) overlaps part of another varblock")]
    VarblockOverlap(usize, usize),
    #[error("Image size mismatch: {0}x{1} vs {2}x{3}")]
    ImageSizeMismatch(usize, usize, usize, usize),
    #[error("Rect out of bounds: {0}x{1}+{2}+{3} rect in {4}x{5} view")]
    RectOutOfBounds(usize, usize, usize, usize, usize, usize),
    #[error("Image size too large: {0}x{1}")]
    ImageSizeTooLarge(usize, usize),
    #[error("Unknown speed tier: {0}")]
    InvalidSpeedTier(String),
    // Generic arithmetic overflow. Prefer using other errors if possible.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
