// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Static geometry of the coefficient order buckets.

use std::mem;

use crate::{
    BLOCK_DIM, BLOCK_SIZE, NUM_CHANNELS,
    error::Result,
    transform_map::{
        COVERED_BLOCKS_X, COVERED_BLOCKS_Y, HfTransformType, NUM_TRANSFORM_TYPES,
        covered_blocks_x, covered_blocks_y,
    },
    util::{CeilLog2, TryWithCapacity},
};

pub const NUM_ORDERS: usize = 13;

/// A strategy with the natural order of each bucket.
pub const TRANSFORM_TYPE_LUT: [HfTransformType; NUM_ORDERS] = [
    HfTransformType::DCT,
    HfTransformType::IDENTITY, // a.k.a. "Hornuss"
    HfTransformType::DCT16X16,
    HfTransformType::DCT32X32,
    HfTransformType::DCT8X16,
    HfTransformType::DCT8X32,
    HfTransformType::DCT16X32,
    HfTransformType::DCT64X64,
    HfTransformType::DCT32X64,
    HfTransformType::DCT128X128,
    HfTransformType::DCT64X128,
    HfTransformType::DCT256X256,
    HfTransformType::DCT128X256,
];

// Those offsets get multiplied by BLOCK_SIZE.
const COEFF_ORDER_OFFSET: [usize; NUM_CHANNELS * NUM_ORDERS + 1] = [
    0, 1, 2, 3, 4, 5, 6, 10, 14, 18, 34, 50, 66, 68, 70, 72, 76, 80, 84, 92, 100, 108, 172, 236,
    300, 332, 364, 396, 652, 908, 1164, 1292, 1420, 1548, 2572, 3596, 4620, 5132, 5644, 6156,
];

/// Total number of elements of all orders of all channels.
pub const COEFF_ORDER_SIZE: usize = COEFF_ORDER_OFFSET[NUM_CHANNELS * NUM_ORDERS] * BLOCK_SIZE;

/// Mapping from transform strategy to order bucket. Strategies with different
/// natural orders must have different buckets.
const STRATEGY_ORDER: [u8; NUM_TRANSFORM_TYPES] = [
    0, 1, 1, 1, 2, 3, 4, 4, 5, 5, 6, 6, 1, 1, 1, 1, 1, 1, 7, 8, 8, 9, 10, 10, 11, 12, 12,
];

/// Buckets above this one hold varblocks larger than 32x32.
pub const MAX_SMALL_ORDER: usize = 6;

const _: () = {
    let mut i = 0;
    while i < NUM_CHANNELS * NUM_ORDERS {
        assert!(COEFF_ORDER_OFFSET[i] < COEFF_ORDER_OFFSET[i + 1]);
        i += 1;
    }
    let mut ord = 0;
    while ord < NUM_ORDERS {
        let base = NUM_CHANNELS * ord;
        let blocks = COEFF_ORDER_OFFSET[base + 1] - COEFF_ORDER_OFFSET[base];
        let mut c = 1;
        while c < NUM_CHANNELS {
            assert!(COEFF_ORDER_OFFSET[base + c + 1] - COEFF_ORDER_OFFSET[base + c] == blocks);
            c += 1;
        }
        let transform = TRANSFORM_TYPE_LUT[ord] as usize;
        assert!(STRATEGY_ORDER[transform] as usize == ord);
        // The natural order is defined for wide varblocks.
        assert!(COVERED_BLOCKS_X[transform] >= COVERED_BLOCKS_Y[transform]);
        ord += 1;
    }
    let mut strategy = 0;
    while strategy < NUM_TRANSFORM_TYPES {
        let ord = STRATEGY_ORDER[strategy] as usize;
        assert!(ord < NUM_ORDERS);
        let base = NUM_CHANNELS * ord;
        let blocks = (COVERED_BLOCKS_X[strategy] * COVERED_BLOCKS_Y[strategy]) as usize;
        assert!(COEFF_ORDER_OFFSET[base + 1] - COEFF_ORDER_OFFSET[base] == blocks);
        strategy += 1;
    }
    assert!(MAX_SMALL_ORDER < NUM_ORDERS);
    // Used orders must fit a u32 bitmask.
    assert!(NUM_ORDERS <= 32);
};

/// Element offset of the order of bucket `order`, channel `c`.
pub const fn coeff_order_offset(order: usize, c: usize) -> usize {
    COEFF_ORDER_OFFSET[NUM_CHANNELS * order + c] * BLOCK_SIZE
}

/// Bucket used by `transform`.
pub const fn strategy_order(transform: HfTransformType) -> usize {
    STRATEGY_ORDER[transform as usize] as usize
}

/// Number of elements in one channel's order of bucket `order`.
pub const fn order_size(order: usize) -> usize {
    coeff_order_offset(order, 1) - coeff_order_offset(order, 0)
}

/// Number of leading natural-order positions of bucket `order` that are never
/// permuted: one LLF coefficient per covered block.
pub const fn order_skip(order: usize) -> usize {
    order_size(order) / BLOCK_SIZE
}

/// Zig-zag scan of the coefficients of a `transform` varblock, as raster
/// positions in its wide layout: tall varblocks are transposed, so the
/// rectangle is `max(covered_blocks_x, covered_blocks_y) * 8` wide. The LLF
/// coefficients come first.
pub fn natural_coeff_order(transform: HfTransformType) -> Result<Vec<u32>> {
    let (cx, cy) = (covered_blocks_x(transform), covered_blocks_y(transform));
    let (cx, cy) = (cx.max(cy) as usize, cx.min(cy) as usize);
    let xsize: usize = cx * BLOCK_DIM;
    // We compute the zigzag order for a cx x cx block, then discard all the
    // lines that are not multiple of the ratio between cx and cy.
    let xs = cx / cy;
    let xsm = xs - 1;
    let xss = xs.ceil_log2();
    let mut out = Vec::try_with_capacity(cx * cy * BLOCK_SIZE)?;
    out.resize(cx * cy * BLOCK_SIZE, 0u32);
    // First half of the block
    let mut cur = cx * cy;
    for i in 0..xsize {
        for j in 0..(i + 1) {
            let mut x = j;
            let mut y = i - j;
            if i % 2 != 0 {
                mem::swap(&mut x, &mut y);
            }
            if (y & xsm) != 0 {
                continue;
            }
            y >>= xss;
            let val;
            if x < cx && y < cy {
                val = y * cx + x;
            } else {
                val = cur;
                cur += 1;
            }
            out[val] = (y * xsize + x) as u32;
        }
    }
    // Second half
    for ir in 1..xsize {
        let ip = xsize - ir;
        let i = ip - 1;
        for j in 0..(i + 1) {
            let mut x = xsize - 1 - (i - j);
            let mut y = xsize - 1 - j;
            if i % 2 != 0 {
                mem::swap(&mut x, &mut y);
            }
            if (y & xsm) != 0 {
                continue;
            }
            y >>= xss;
            let val = cur;
            cur += 1;
            out[val] = (y * xsize + x) as u32;
        }
    }
    Ok(out)
}

/// Natural orders of every bucket, computed once and shared.
pub struct NaturalOrders([Vec<u32>; NUM_ORDERS]);

impl NaturalOrders {
    pub fn new() -> Result<NaturalOrders> {
        Ok(NaturalOrders(array_init::try_array_init(|order| {
            natural_coeff_order(TRANSFORM_TYPE_LUT[order])
        })?))
    }

    pub fn get(&self, order: usize) -> &[u32] {
        &self.0[order]
    }
}
