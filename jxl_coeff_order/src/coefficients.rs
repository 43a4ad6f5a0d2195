// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    BLOCK_SIZE, NUM_CHANNELS,
    error::{Error, Result},
    image::{Image, Rect},
    transform_map::{StrategyImage, covered_blocks_x, covered_blocks_y},
    util::try_filled_vec,
};

const NO_BLOCK: usize = usize::MAX;

/// Quantized AC coefficients of a frame, one contiguous run per varblock and
/// channel.
///
/// A varblock covering `cx`x`cy` blocks owns `cx * cy * 64` coefficients,
/// laid out row-major as a `max(cx, cy) * 8` wide rectangle (tall varblocks
/// are stored transposed). This is the layout indexed by
/// [`natural_coeff_order`](crate::coeff_order::catalog::natural_coeff_order).
#[derive(Debug, Clone)]
pub struct AcCoefficients {
    // (start, len) of each varblock's coefficients, at its first block.
    ranges: Image<(usize, usize)>,
    data: [Vec<i32>; NUM_CHANNELS],
}

impl AcCoefficients {
    /// Allocates zeroed storage for every varblock of `strategy`. Every block
    /// of `strategy` must be covered by a varblock.
    pub fn new(strategy: &StrategyImage) -> Result<AcCoefficients> {
        let (xsize, ysize) = strategy.size();
        let mut ranges = Image::new_with_value((xsize, ysize), (NO_BLOCK, 0))?;
        let mut total = 0usize;
        for by in 0..ysize {
            for bx in 0..xsize {
                let (transform, is_first) = strategy.get(bx, by)?;
                if !is_first {
                    continue;
                }
                let num_blocks =
                    (covered_blocks_x(transform) * covered_blocks_y(transform)) as usize;
                let len = num_blocks * BLOCK_SIZE;
                ranges.row_mut(by)[bx] = (total, len);
                total = total.checked_add(len).ok_or(Error::ArithmeticOverflow)?;
            }
        }
        let data = array_init::try_array_init(|_| try_filled_vec(total, 0i32))?;
        Ok(AcCoefficients { ranges, data })
    }

    pub fn size_blocks(&self) -> (usize, usize) {
        self.ranges.size()
    }

    fn range(&self, c: usize, bx: usize, by: usize) -> Result<std::ops::Range<usize>> {
        debug_assert!(c < NUM_CHANNELS);
        Rect::new((bx, by), (1, 1)).is_within(self.ranges.size())?;
        let (start, len) = self.ranges.row(by)[bx];
        if start == NO_BLOCK {
            return Err(Error::NotFirstBlock(bx, by));
        }
        Ok(start..start + len)
    }

    /// Coefficients of channel `c` of the varblock whose first block is
    /// `(bx, by)`.
    pub fn block(&self, c: usize, bx: usize, by: usize) -> Result<&[i32]> {
        let range = self.range(c, bx, by)?;
        Ok(&self.data[c][range])
    }

    pub fn block_mut(&mut self, c: usize, bx: usize, by: usize) -> Result<&mut [i32]> {
        let range = self.range(c, bx, by)?;
        Ok(&mut self.data[c][range])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transform_map::HfTransformType;

    #[test]
    fn block_layout() -> Result<()> {
        let mut strategy = StrategyImage::new_uniform(4, 2, HfTransformType::DCT)?;
        strategy.set(1, 0, HfTransformType::DCT16X16)?;
        let mut coefficients = AcCoefficients::new(&strategy)?;
        assert_eq!(coefficients.block(0, 0, 0)?.len(), 64);
        assert_eq!(coefficients.block(2, 1, 0)?.len(), 256);
        assert_eq!(coefficients.block(1, 3, 1)?.len(), 64);
        assert!(matches!(
            coefficients.block(0, 2, 1),
            Err(Error::NotFirstBlock(2, 1))
        ));
        assert!(coefficients.block(0, 4, 0).is_err());

        coefficients.block_mut(1, 1, 0)?[255] = 7;
        assert_eq!(coefficients.block(1, 1, 0)?[255], 7);
        assert_eq!(coefficients.block(1, 3, 0)?[0], 0);
        assert_eq!(coefficients.block(0, 1, 0)?[255], 0);
        Ok(())
    }
}
