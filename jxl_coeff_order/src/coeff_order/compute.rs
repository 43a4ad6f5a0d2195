// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{
    UsedOrders,
    catalog::{
        COEFF_ORDER_SIZE, NUM_ORDERS, NaturalOrders, coeff_order_offset, order_size, order_skip,
        strategy_order,
    },
};
use crate::{
    NUM_CHANNELS,
    coefficients::AcCoefficients,
    error::{Error, Result},
    frame_dimensions::FrameDimensions,
    permutation::Permutation,
    speed_tier::SpeedTier,
    transform_map::StrategyImage,
    util::{TryWithCapacity, tracing_wrappers::*, try_filled_vec},
};

fn order_range(order: usize, c: usize) -> Range<usize> {
    let start = coeff_order_offset(order, c);
    start..start + order_size(order)
}

/// Scan orders of every bucket and channel, stored in one flat buffer.
///
/// Each `(bucket, channel)` sub-array maps scan positions to natural-order
/// indices and is a permutation of `0..order_size(bucket)` whose first
/// `order_skip(bucket)` entries are the identity.
#[derive(Clone, PartialEq, Eq)]
pub struct CoeffOrder(Vec<u32>);

impl std::fmt::Debug for CoeffOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CoeffOrder [{} entries]", self.0.len())
    }
}

impl CoeffOrder {
    /// The natural order for every bucket and channel.
    pub fn natural() -> Result<CoeffOrder> {
        let mut order = Vec::try_with_capacity(COEFF_ORDER_SIZE)?;
        for bucket in 0..NUM_ORDERS {
            for _ in 0..NUM_CHANNELS {
                order.extend(0..order_size(bucket) as u32);
            }
        }
        debug_assert_eq!(order.len(), COEFF_ORDER_SIZE);
        Ok(CoeffOrder(order))
    }

    pub fn get(&self, order: usize, c: usize) -> &[u32] {
        &self.0[order_range(order, c)]
    }

    pub fn get_mut(&mut self, order: usize, c: usize) -> &mut [u32] {
        &mut self.0[order_range(order, c)]
    }

    /// Raster coefficient positions, in scan order, for bucket `order` and
    /// channel `c`.
    pub fn scan_positions(
        &self,
        natural: &NaturalOrders,
        order: usize,
        c: usize,
    ) -> Result<Permutation> {
        let mut positions = Permutation::identity(order_size(order) as u32)?;
        positions.compose(natural.get(order));
        positions.compose(self.get(order, c));
        Ok(positions)
    }

    /// Disjoint mutable views of every `(bucket, channel)` sub-array.
    fn channel_orders_mut(&mut self) -> Vec<(usize, usize, &mut [u32])> {
        let mut views = Vec::with_capacity(NUM_ORDERS * NUM_CHANNELS);
        let mut rest = &mut self.0[..];
        for order in 0..NUM_ORDERS {
            for c in 0..NUM_CHANNELS {
                let (view, tail) = rest.split_at_mut(order_size(order));
                views.push((order, c, view));
                rest = tail;
            }
        }
        views
    }
}

/// Deterministic xorshift128+ stream deciding which blocks contribute to the
/// zero statistics.
struct BlockSampler {
    state: [u64; 2],
    threshold: u64,
}

impl BlockSampler {
    fn new(fraction: f64) -> BlockSampler {
        BlockSampler {
            state: [0x94D049BB133111EB, 0xBF58476D1CE4E5B9],
            threshold: ((u64::MAX >> 32) as f64 * fraction) as u64,
        }
    }

    fn use_sample(&mut self) -> bool {
        let mut s1 = self.state[0];
        let s0 = self.state[1];
        let bits = s1.wrapping_add(s0);
        self.state[0] = s0;
        s1 ^= s1 << 23;
        s1 ^= s0 ^ (s1 >> 18) ^ (s0 >> 5);
        self.state[1] = s1;
        (bits >> 32) <= self.threshold
    }
}

/// Counts, for every bucket in `used` and every raster coefficient position,
/// how many varblocks have a zero there.
fn count_zeros(
    speed: SpeedTier,
    coefficients: &AcCoefficients,
    strategy: &StrategyImage,
    frame_dim: &FrameDimensions,
    used: UsedOrders,
) -> Result<Vec<u32>> {
    let mut num_zeros = try_filled_vec(COEFF_ORDER_SIZE, 0u32)?;
    // If compressing at high speed and only using 8x8 DCTs, only consider a
    // subset of blocks.
    let only_dct8 = used.bits() == 1;
    let fraction = if speed.samples_blocks() && only_dct8 { 0.5 } else { 1.0 };
    let mut sampler = BlockSampler::new(fraction);
    for group in 0..frame_dim.num_groups {
        let rect = frame_dim.group_rect(group);
        for (y, row) in strategy.rows(rect)?.enumerate() {
            for (x, &raw) in row.iter().enumerate() {
                let (transform, is_first) = StrategyImage::decode_entry(raw)?;
                if !is_first || !sampler.use_sample() {
                    continue;
                }
                let order = strategy_order(transform);
                if !used.is_used(order) {
                    continue;
                }
                let (bx, by) = (rect.origin.0 + x, rect.origin.1 + y);
                for c in 0..NUM_CHANNELS {
                    let block = coefficients.block(c, bx, by)?;
                    let counts = &mut num_zeros[order_range(order, c)];
                    if block.len() != counts.len() {
                        return Err(Error::CoefficientLayoutMismatch {
                            bx,
                            by,
                            expected: counts.len(),
                            found: block.len(),
                        });
                    }
                    for (count, &coeff) in counts.iter_mut().zip(block) {
                        *count += (coeff == 0) as u32;
                    }
                }
            }
        }
    }
    debug!(fraction, "counted zero coefficients");
    Ok(num_zeros)
}

/// Moves natural positions with more zeros towards the end of `order`,
/// keeping the relative order of positions with equal counts. Returns whether
/// the result differs from the natural order.
fn sort_by_zeros(bucket: usize, order: &mut [u32], natural: &[u32], zeros: &[u32]) -> bool {
    let skip = order_skip(bucket);
    order[skip..].sort_by_key(|&idx| zeros[natural[idx as usize] as usize]);
    order
        .iter()
        .enumerate()
        .any(|(idx, &value)| value as usize != idx)
}

/// Builds the coefficient orders of the buckets in `used_orders` from the zero
/// statistics of `coefficients`. Buckets whose orders all end up natural are
/// removed from `used_orders`; every other sub-array keeps the natural order.
pub fn compute_coeff_order(
    speed: SpeedTier,
    coefficients: &AcCoefficients,
    strategy: &StrategyImage,
    frame_dim: &FrameDimensions,
    used_orders: &mut UsedOrders,
) -> Result<CoeffOrder> {
    for size in [strategy.size(), coefficients.size_blocks()] {
        if size != frame_dim.size_blocks() {
            return Err(Error::ImageSizeMismatch(
                size.0,
                size.1,
                frame_dim.xsize_blocks,
                frame_dim.ysize_blocks,
            ));
        }
    }
    let mut order = CoeffOrder::natural()?;
    // No need to compute number of zero coefficients if all orders are the
    // default.
    if used_orders.is_empty() {
        return Ok(order);
    }
    let num_zeros = count_zeros(speed, coefficients, strategy, frame_dim, *used_orders)?;
    let natural = NaturalOrders::new()?;

    let used = *used_orders;
    let channel_orders: Vec<_> = order
        .channel_orders_mut()
        .into_iter()
        .filter(|(bucket, _, _)| used.is_used(*bucket))
        .collect();
    let sort = |(bucket, c, view): (usize, usize, &mut [u32])| {
        let zeros = &num_zeros[order_range(bucket, c)];
        (bucket, sort_by_zeros(bucket, view, natural.get(bucket), zeros))
    };
    #[cfg(feature = "parallel")]
    let changed: Vec<(usize, bool)> = channel_orders.into_par_iter().map(sort).collect();
    #[cfg(not(feature = "parallel"))]
    let changed: Vec<(usize, bool)> = channel_orders.into_iter().map(sort).collect();

    for bucket in used.iter() {
        let is_nondefault = changed
            .iter()
            .any(|&(changed_bucket, differs)| changed_bucket == bucket && differs);
        if !is_nondefault {
            used_orders.clear(bucket);
        }
        trace!(bucket, is_nondefault, "computed coefficient order");
    }
    debug!(?used_orders, "computed coefficient orders");
    Ok(order)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        BLOCK_SIZE,
        coeff_order::compute_used_orders,
        transform_map::HfTransformType,
    };
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;
    use test_log::test;

    fn dct8_frame(xsize: usize, ysize: usize) -> Result<(StrategyImage, AcCoefficients)> {
        let strategy = StrategyImage::new_uniform(xsize, ysize, HfTransformType::DCT)?;
        let coefficients = AcCoefficients::new(&strategy)?;
        Ok((strategy, coefficients))
    }

    fn fill_random(
        strategy: &StrategyImage,
        coefficients: &mut AcCoefficients,
        rng: &mut XorShiftRng,
    ) -> Result<()> {
        let (xsize, ysize) = strategy.size();
        for by in 0..ysize {
            for bx in 0..xsize {
                if !strategy.get(bx, by)?.1 {
                    continue;
                }
                for c in 0..NUM_CHANNELS {
                    let block = coefficients.block_mut(c, bx, by)?;
                    for (k, coeff) in block.iter_mut().enumerate() {
                        // Low frequencies are more likely to be non-zero.
                        let p_zero = 0.2 + 0.7 * (k as f64 / (k as f64 + 64.0));
                        *coeff = if rng.random_bool(p_zero) {
                            0
                        } else {
                            rng.random_range(1..5)
                        };
                    }
                }
            }
        }
        Ok(())
    }

    // A 2x2 group frame with at least one varblock of each bucket.
    fn mixed_frame(rng: &mut XorShiftRng) -> Result<(StrategyImage, AcCoefficients)> {
        let mut strategy = StrategyImage::new_uniform(64, 64, HfTransformType::DCT)?;
        let placements = [
            (1, 0, HfTransformType::IDENTITY),
            (2, 0, HfTransformType::DCT16X16),
            (4, 0, HfTransformType::DCT32X32),
            (8, 0, HfTransformType::DCT8X16),
            (12, 0, HfTransformType::DCT8X32),
            (16, 0, HfTransformType::DCT16X32),
            (24, 0, HfTransformType::DCT64X64),
            (0, 8, HfTransformType::DCT32X64),
            (16, 16, HfTransformType::DCT128X128),
            (0, 16, HfTransformType::DCT64X128),
            (32, 0, HfTransformType::DCT256X256),
            (0, 32, HfTransformType::DCT128X256),
            // Tall varblocks, stored transposed.
            (32, 32, HfTransformType::DCT16X8),
            (33, 32, HfTransformType::DCT32X8),
            (34, 32, HfTransformType::DCT32X16),
            (36, 32, HfTransformType::DCT64X32),
        ];
        for (bx, by, transform) in placements {
            strategy.set(bx, by, transform)?;
        }
        let mut coefficients = AcCoefficients::new(&strategy)?;
        fill_random(&strategy, &mut coefficients, rng)?;
        Ok((strategy, coefficients))
    }

    // Checks the bijection and identity prefix of every sub-array, and the
    // zero-count ordering of the used ones.
    fn check_orders(order: &CoeffOrder, used: UsedOrders, zeros: Option<&[u32]>) -> Result<()> {
        let natural = NaturalOrders::new()?;
        for bucket in 0..NUM_ORDERS {
            let skip = order_skip(bucket);
            for c in 0..NUM_CHANNELS {
                let sub = order.get(bucket, c);
                assert_eq!(sub.len(), order_size(bucket));
                let mut seen = vec![false; sub.len()];
                for &idx in sub {
                    assert!(!seen[idx as usize], "duplicate {idx} in bucket {bucket}");
                    seen[idx as usize] = true;
                }
                assert!(sub[..skip].iter().enumerate().all(|(i, &v)| v as usize == i));
                if !used.is_used(bucket) {
                    assert!(sub.iter().enumerate().all(|(i, &v)| v as usize == i));
                    continue;
                }
                let Some(zeros) = zeros else { continue };
                let zeros = &zeros[order_range(bucket, c)];
                let count = |idx: u32| zeros[natural.get(bucket)[idx as usize] as usize];
                for pair in sub[skip..].windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    assert!(
                        count(a) < count(b) || (count(a) == count(b) && a < b),
                        "bucket {bucket} channel {c}: {a} before {b}"
                    );
                }
            }
        }
        Ok(())
    }

    #[test]
    fn single_block_moves_nonzeros_first() -> Result<()> {
        let (strategy, mut coefficients) = dct8_frame(1, 1)?;
        let natural = NaturalOrders::new()?;
        let dct = natural.get(0);
        for idx in [40, 10, 5] {
            coefficients.block_mut(0, 0, 0)?[dct[idx] as usize] = 3;
        }
        let frame_dim = FrameDimensions::new(1, 1);
        let mut used = UsedOrders::from_iter([0]);
        let order = compute_coeff_order(
            SpeedTier::Tortoise,
            &coefficients,
            &strategy,
            &frame_dim,
            &mut used,
        )?;
        assert_eq!(used, UsedOrders::from_iter([0]));
        let mut expected = vec![0, 5, 10, 40];
        expected.extend((1..BLOCK_SIZE as u32).filter(|i| ![5, 10, 40].contains(i)));
        assert_eq!(order.get(0, 0), expected);
        // Channels without non-zeros keep the natural order.
        assert!(order.get(0, 1).iter().enumerate().all(|(i, &v)| v as usize == i));
        assert_eq!(order, {
            let mut natural_order = CoeffOrder::natural()?;
            natural_order.get_mut(0, 0).copy_from_slice(&expected);
            natural_order
        });

        let positions = order.scan_positions(&natural, 0, 0)?;
        assert_eq!(positions[1], dct[5]);
        assert_eq!(positions[3], dct[40]);
        Ok(())
    }

    #[test]
    fn sorted_by_zero_count() -> Result<()> {
        let mut rng = XorShiftRng::seed_from_u64(3);
        let (strategy, coefficients) = mixed_frame(&mut rng)?;
        let frame_dim = FrameDimensions::new(64, 64);
        let rect = frame_dim.block_rect();
        let mut used = compute_used_orders(SpeedTier::Tortoise, &strategy, rect)?;
        assert_eq!(used.bits(), (1 << NUM_ORDERS) - 1);
        let order = compute_coeff_order(
            SpeedTier::Tortoise,
            &coefficients,
            &strategy,
            &frame_dim,
            &mut used,
        )?;
        let zeros = count_zeros(
            SpeedTier::Tortoise,
            &coefficients,
            &strategy,
            &frame_dim,
            UsedOrders::from_bits((1 << NUM_ORDERS) - 1)?,
        )?;
        // Bucket 0 is seen in hundreds of blocks, so its order changed.
        assert!(used.is_used(0));
        check_orders(&order, used, Some(&zeros[..]))
    }

    #[test]
    fn deterministic() -> Result<()> {
        let mut rng = XorShiftRng::seed_from_u64(4);
        let (strategy, coefficients) = mixed_frame(&mut rng)?;
        let frame_dim = FrameDimensions::new(64, 64);
        let compute = |speed: SpeedTier| -> Result<(CoeffOrder, UsedOrders)> {
            let mut used = compute_used_orders(speed, &strategy, frame_dim.block_rect())?;
            let order =
                compute_coeff_order(speed, &coefficients, &strategy, &frame_dim, &mut used)?;
            Ok((order, used))
        };
        for speed in [SpeedTier::Kitten, SpeedTier::Hare, SpeedTier::Thunder] {
            let (order, used) = compute(speed)?;
            assert_eq!((order.clone(), used), compute(speed)?);
            check_orders(&order, used, None)?;
        }
        let (order, used) = compute(SpeedTier::Thunder)?;
        assert!(used.is_empty());
        assert_eq!(order, CoeffOrder::natural()?);
        Ok(())
    }

    #[test]
    fn unchanged_orders_are_dropped() -> Result<()> {
        let (strategy, coefficients) = dct8_frame(40, 33)?;
        let frame_dim = FrameDimensions::new(40, 33);
        let mut used = UsedOrders::from_iter([0, 3]);
        let order = compute_coeff_order(
            SpeedTier::Tortoise,
            &coefficients,
            &strategy,
            &frame_dim,
            &mut used,
        )?;
        assert!(used.is_empty());
        assert_eq!(order, CoeffOrder::natural()?);
        Ok(())
    }

    #[test]
    fn sampled_dct8_statistics() -> Result<()> {
        let mut rng = XorShiftRng::seed_from_u64(5);
        let (strategy, mut coefficients) = dct8_frame(48, 48)?;
        fill_random(&strategy, &mut coefficients, &mut rng)?;
        let frame_dim = FrameDimensions::new(48, 48);
        let used = UsedOrders::from_iter([0]);
        let sampled = count_zeros(SpeedTier::Squirrel, &coefficients, &strategy, &frame_dim, used)?;
        let full = count_zeros(SpeedTier::Kitten, &coefficients, &strategy, &frame_dim, used)?;
        // Sampling sees a subset of the blocks.
        assert!(sampled.iter().zip(&full).all(|(s, f)| s <= f));
        let total = |zeros: &[u32]| zeros.iter().map(|&z| z as u64).sum::<u64>();
        assert!(total(&sampled[..]) < total(&full[..]));
        assert!(total(&sampled[..]) > total(&full[..]) / 4);
        let mut used_sampled = used;
        let order = compute_coeff_order(
            SpeedTier::Squirrel,
            &coefficients,
            &strategy,
            &frame_dim,
            &mut used_sampled,
        )?;
        check_orders(&order, used_sampled, Some(&sampled[..]))
    }

    #[test]
    fn sampler_fraction() {
        let mut sampler = BlockSampler::new(0.5);
        let taken = (0..10000).filter(|_| sampler.use_sample()).count();
        assert!((4000..6000).contains(&taken), "{taken}");
        let mut sampler = BlockSampler::new(1.0);
        assert!((0..1000).all(|_| sampler.use_sample()));
    }

    #[test]
    fn tall_varblocks_use_wide_layout() -> Result<()> {
        // 8 wide, 16 tall: coefficients form a 16x8 rectangle.
        let strategy = StrategyImage::new_uniform(2, 4, HfTransformType::DCT16X8)?;
        let mut coefficients = AcCoefficients::new(&strategy)?;
        for by in [0, 2] {
            for bx in 0..2 {
                for c in 0..NUM_CHANNELS {
                    coefficients.block_mut(c, bx, by)?[..16].fill(1);
                }
            }
        }
        let frame_dim = FrameDimensions::new(2, 4);
        let bucket = strategy_order(HfTransformType::DCT16X8);
        let mut used = compute_used_orders(SpeedTier::Tortoise, &strategy, frame_dim.block_rect())?;
        assert_eq!(used, UsedOrders::from_iter([bucket]));
        let order = compute_coeff_order(
            SpeedTier::Tortoise,
            &coefficients,
            &strategy,
            &frame_dim,
            &mut used,
        )?;
        assert_eq!(used, UsedOrders::from_iter([bucket]));
        let natural = NaturalOrders::new()?;
        for c in 0..NUM_CHANNELS {
            // The LLF prefix is on the first row, then the rest of that row.
            let positions = order.scan_positions(&natural, bucket, c)?;
            assert!(positions[..16].iter().all(|&pos| pos < 16), "channel {c}");
            assert!(positions[16..].iter().all(|&pos| pos >= 16), "channel {c}");
        }
        Ok(())
    }

    #[test]
    fn coefficient_layout_mismatch() -> Result<()> {
        let (_, coefficients) = dct8_frame(2, 2)?;
        let strategy = StrategyImage::new_uniform(2, 2, HfTransformType::DCT16X16)?;
        let mut used = UsedOrders::from_iter([2]);
        let result = compute_coeff_order(
            SpeedTier::Tortoise,
            &coefficients,
            &strategy,
            &FrameDimensions::new(2, 2),
            &mut used,
        );
        assert!(matches!(
            result,
            Err(Error::CoefficientLayoutMismatch {
                bx: 0,
                by: 0,
                expected: 256,
                found: 64,
            })
        ));
        Ok(())
    }

    #[test]
    fn size_mismatch() -> Result<()> {
        let (strategy, coefficients) = dct8_frame(8, 8)?;
        let mut used = UsedOrders::from_iter([0]);
        let result = compute_coeff_order(
            SpeedTier::Tortoise,
            &coefficients,
            &strategy,
            &FrameDimensions::new(8, 9),
            &mut used,
        );
        assert!(matches!(result, Err(Error::ImageSizeMismatch(8, 8, 8, 9))));
        Ok(())
    }
}
