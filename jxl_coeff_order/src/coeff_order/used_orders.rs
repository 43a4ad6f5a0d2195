// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt;

use super::catalog::{MAX_SMALL_ORDER, NUM_ORDERS, strategy_order};
use crate::{
    error::{Error, Result},
    image::Rect,
    speed_tier::SpeedTier,
    transform_map::StrategyImage,
    util::tracing_wrappers::*,
};

/// Set of order buckets whose order is customized and transmitted.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UsedOrders(u32);

impl UsedOrders {
    pub const fn empty() -> UsedOrders {
        UsedOrders(0)
    }

    pub fn from_bits(bits: u32) -> Result<UsedOrders> {
        if bits >> NUM_ORDERS != 0 {
            return Err(Error::InvalidUsedOrders(bits));
        }
        Ok(UsedOrders(bits))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_used(self, order: usize) -> bool {
        order < NUM_ORDERS && self.0 & (1 << order) != 0
    }

    pub fn set(&mut self, order: usize) {
        assert!(order < NUM_ORDERS);
        self.0 |= 1 << order;
    }

    pub fn clear(&mut self, order: usize) {
        assert!(order < NUM_ORDERS);
        self.0 &= !(1 << order);
    }

    /// Used buckets in increasing order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..NUM_ORDERS).filter(move |&order| self.is_used(order))
    }
}

impl FromIterator<usize> for UsedOrders {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> UsedOrders {
        let mut used = UsedOrders::empty();
        for order in iter {
            used.set(order);
        }
        used
    }
}

impl fmt::Debug for UsedOrders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Buckets used by the strategies of `rect` (in blocks) that `speed` allows
/// customizing.
pub fn compute_used_orders(
    speed: SpeedTier,
    strategy: &StrategyImage,
    rect: Rect,
) -> Result<UsedOrders> {
    let rows = strategy.rows(rect)?;
    if !speed.customizes_orders() {
        return Ok(UsedOrders::empty());
    }
    let mut used = UsedOrders::empty();
    for row in rows {
        for &raw in row {
            let (transform, _) = StrategyImage::decode_entry(raw)?;
            let order = strategy_order(transform);
            // Do not customize coefficient orders for blocks bigger than 32x32.
            if order > MAX_SMALL_ORDER && !speed.customizes_large_orders() {
                continue;
            }
            used.set(order);
        }
    }
    debug!(%speed, ?rect, ?used, "computed used orders");
    Ok(used)
}
