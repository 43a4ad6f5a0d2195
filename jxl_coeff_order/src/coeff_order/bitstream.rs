// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{
    CoeffOrder, UsedOrders,
    catalog::{NUM_ORDERS, order_size, order_skip},
};
use crate::{
    NUM_CHANNELS,
    bit_reader::BitReader,
    bit_writer::BitWriter,
    encodings::{U32, U32Coder},
    error::Result,
    permutation::Permutation,
    util::{TryWithCapacity, tracing_wrappers::*},
};

/// Encoding of the used orders mask. The two most common masks and the empty
/// one cost 2 bits.
pub const USED_ORDERS_ENCODING: U32Coder = U32Coder::Select(
    U32::Val(0x5F),
    U32::Val(0x13),
    U32::Val(0),
    U32::Bits(NUM_ORDERS),
);

pub fn encode_used_orders(used_orders: UsedOrders, bw: &mut BitWriter) -> Result<()> {
    USED_ORDERS_ENCODING.write(used_orders.bits(), bw)
}

pub fn decode_used_orders(br: &mut BitReader) -> Result<UsedOrders> {
    let used_orders = UsedOrders::from_bits(USED_ORDERS_ENCODING.read(br)?)?;
    debug!(?used_orders);
    Ok(used_orders)
}

/// Writes the used orders mask followed by the permutation of every channel
/// of every used bucket.
pub fn encode_coeff_orders(
    used_orders: UsedOrders,
    order: &CoeffOrder,
    bw: &mut BitWriter,
) -> Result<()> {
    #[cfg(feature = "tracing")]
    let bits_before = bw.total_bits_written();
    encode_used_orders(used_orders, bw)?;
    for bucket in used_orders.iter() {
        for c in 0..NUM_CHANNELS {
            Permutation::encode(order.get(bucket, c), order_skip(bucket) as u32, bw)?;
        }
    }
    debug!(
        ?used_orders,
        bits = bw.total_bits_written() - bits_before,
        "wrote coefficient orders"
    );
    Ok(())
}

/// Reads the permutations of the buckets in `used_orders` into `order`.
///
/// `order` is only modified if every permutation decodes successfully; the
/// sub-arrays of unused buckets are never touched, so `order` should start out
/// as [`CoeffOrder::natural`].
pub fn decode_coeff_orders(
    used_orders: UsedOrders,
    order: &mut CoeffOrder,
    br: &mut BitReader,
) -> Result<()> {
    let mut decoded = Vec::try_with_capacity(used_orders.iter().count() * NUM_CHANNELS)?;
    for bucket in used_orders.iter() {
        let size = order_size(bucket) as u32;
        let skip = order_skip(bucket) as u32;
        for c in 0..NUM_CHANNELS {
            let permutation = Permutation::decode(size, skip, br)?;
            trace!(bucket, c, bits_read = br.total_bits_read(), "decoded order");
            decoded.push((bucket, c, permutation));
        }
    }
    for (bucket, c, permutation) in decoded {
        order.get_mut(bucket, c).copy_from_slice(&permutation);
    }
    Ok(())
}
