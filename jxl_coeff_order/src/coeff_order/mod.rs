// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Selection, computation and transport of custom coefficient orders.
//!
//! Orders are grouped in buckets of transform strategies sharing a natural
//! (zig-zag) order. The encoder picks the buckets worth customizing with
//! [`compute_used_orders`], builds the orders with [`compute_coeff_order`]
//! and writes them with [`encode_coeff_orders`]; the decoder reads them back
//! with [`decode_used_orders`] and [`decode_coeff_orders`].

mod bitstream;
pub mod catalog;
mod compute;
mod used_orders;

pub use bitstream::*;
pub use compute::*;
pub use used_orders::*;
