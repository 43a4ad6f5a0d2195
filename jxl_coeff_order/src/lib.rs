// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![deny(unsafe_code)]
pub mod bit_reader;
pub mod bit_writer;
pub mod coeff_order;
pub mod coefficients;
pub mod encodings;
pub mod error;
pub mod frame_dimensions;
pub mod image;
pub mod permutation;
pub mod speed_tier;
pub mod transform_map;
pub mod util;

pub const BLOCK_DIM: usize = 8;
pub const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;
pub const GROUP_DIM: usize = 256;
pub const GROUP_DIM_IN_BLOCKS: usize = GROUP_DIM / BLOCK_DIM;
/// Number of color channels (X, Y, B) that carry their own coefficient order.
pub const NUM_CHANNELS: usize = 3;
