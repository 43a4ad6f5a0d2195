// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::{Error, Result};
use crate::image::{Image, Rect};
use enum_iterator::{Sequence, cardinality};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Sequence, FromPrimitive)]
pub enum HfTransformType {
    // Regular block size DCT
    DCT = 0,
    // Encode pixels without transforming
    IDENTITY = 1, // a.k.a HORNUSS
    // Use 2-by-2 DCT
    DCT2X2 = 2,
    // Use 4-by-4 DCT
    DCT4X4 = 3,
    // Use 16-by-16 DCT
    DCT16X16 = 4,
    // Use 32-by-32 DCT
    DCT32X32 = 5,
    // Use 16-by-8 DCT
    DCT16X8 = 6,
    // Use 8-by-16 DCT
    DCT8X16 = 7,
    // Use 32-by-8 DCT
    DCT32X8 = 8,
    // Use 8-by-32 DCT
    DCT8X32 = 9,
    // Use 32-by-16 DCT
    DCT32X16 = 10,
    // Use 16-by-32 DCT
    DCT16X32 = 11,
    // 4x8 and 8x4 DCT
    DCT4X8 = 12,
    DCT8X4 = 13,
    // Corner-DCT.
    AFV0 = 14,
    AFV1 = 15,
    AFV2 = 16,
    AFV3 = 17,
    // Larger DCTs
    DCT64X64 = 18,
    DCT64X32 = 19,
    DCT32X64 = 20,
    DCT128X128 = 21,
    DCT128X64 = 22,
    DCT64X128 = 23,
    DCT256X256 = 24,
    DCT256X128 = 25,
    DCT128X256 = 26,
}

pub const NUM_TRANSFORM_TYPES: usize = cardinality::<HfTransformType>();

pub const INVALID_TRANSFORM: u8 = NUM_TRANSFORM_TYPES as u8;

// Set on the entry of the top-left block of each varblock.
const FIRST_BLOCK_FLAG: u8 = 128;

pub fn get_transform_type(raw_type: i32) -> Result<HfTransformType> {
    if raw_type < 0 {
        return Err(Error::InvalidVarDCTTransform(raw_type));
    }
    HfTransformType::from_i32(raw_type).ok_or(Error::InvalidVarDCTTransform(raw_type))
}

pub(crate) const COVERED_BLOCKS_X: [u32; NUM_TRANSFORM_TYPES] = [
    1, 1, 1, 1, 2, 4, 1, 2, 1, 4, 2, 4, 1, 1, 1, 1, 1, 1, 8, 4, 8, 16, 8, 16, 32, 16, 32,
];

pub(crate) const COVERED_BLOCKS_Y: [u32; NUM_TRANSFORM_TYPES] = [
    1, 1, 1, 1, 2, 4, 2, 1, 4, 1, 4, 2, 1, 1, 1, 1, 1, 1, 8, 8, 4, 16, 16, 8, 32, 32, 16,
];

pub const fn covered_blocks_x(transform: HfTransformType) -> u32 {
    COVERED_BLOCKS_X[transform as usize]
}

pub const fn covered_blocks_y(transform: HfTransformType) -> u32 {
    COVERED_BLOCKS_Y[transform as usize]
}

/// Per-block map of the transform strategy chosen for each varblock, in
/// block units. Every block covered by a varblock stores its raw strategy id;
/// the top-left one is additionally flagged as the first block.
#[derive(Debug, Clone)]
pub struct StrategyImage {
    map: Image<u8>,
}

impl StrategyImage {
    /// Creates a map of the given size with every block unassigned.
    pub fn new(xsize_blocks: usize, ysize_blocks: usize) -> Result<StrategyImage> {
        Ok(StrategyImage {
            map: Image::new_with_value((xsize_blocks, ysize_blocks), INVALID_TRANSFORM)?,
        })
    }

    /// Creates a map covered entirely by varblocks of `transform`, which must
    /// tile the image.
    pub fn new_uniform(
        xsize_blocks: usize,
        ysize_blocks: usize,
        transform: HfTransformType,
    ) -> Result<StrategyImage> {
        let mut image = Self::new(xsize_blocks, ysize_blocks)?;
        let cx = covered_blocks_x(transform) as usize;
        let cy = covered_blocks_y(transform) as usize;
        for by in (0..ysize_blocks).step_by(cy) {
            for bx in (0..xsize_blocks).step_by(cx) {
                image.set(bx, by, transform)?;
            }
        }
        Ok(image)
    }

    pub fn size(&self) -> (usize, usize) {
        self.map.size()
    }

    /// Places a varblock of type `transform` with its top-left block at
    /// `(bx, by)`. Varblocks already in its footprint are replaced; one that
    /// is only partly covered is an `Error::VarblockOverlap`.
    pub fn set(&mut self, bx: usize, by: usize, transform: HfTransformType) -> Result<()> {
        let cx = covered_blocks_x(transform) as usize;
        let cy = covered_blocks_y(transform) as usize;
        Rect::new((bx, by), (cx, cy)).is_within(self.map.size())?;
        // Blocks of varblocks starting inside the footprint and fitting in it,
        // against all assigned blocks: any difference belongs to a varblock
        // starting outside.
        let mut replaced = 0;
        let mut assigned = 0;
        for y in by..by + cy {
            for x in bx..bx + cx {
                let raw = self.map.row(y)[x];
                if raw == INVALID_TRANSFORM {
                    continue;
                }
                assigned += 1;
                let (old, is_first) = Self::decode_entry(raw)?;
                if !is_first {
                    continue;
                }
                let old_cx = covered_blocks_x(old) as usize;
                let old_cy = covered_blocks_y(old) as usize;
                if x + old_cx > bx + cx || y + old_cy > by + cy {
                    return Err(Error::VarblockOverlap(bx, by));
                }
                replaced += old_cx * old_cy;
            }
        }
        if replaced != assigned {
            return Err(Error::VarblockOverlap(bx, by));
        }
        for y in by..by + cy {
            self.map.row_mut(y)[bx..bx + cx].fill(transform as u8);
        }
        self.map.row_mut(by)[bx] |= FIRST_BLOCK_FLAG;
        Ok(())
    }

    /// Returns the strategy covering block `(bx, by)` and whether this is the
    /// varblock's first block.
    pub fn get(&self, bx: usize, by: usize) -> Result<(HfTransformType, bool)> {
        Rect::new((bx, by), (1, 1)).is_within(self.map.size())?;
        Self::decode_entry(self.map.row(by)[bx])
    }

    /// Raw entries of `rect`, row by row.
    pub(crate) fn rows(&self, rect: Rect) -> Result<impl Iterator<Item = &[u8]>> {
        let view = self.map.as_rect().rect(rect)?;
        Ok((0..rect.size.1).map(move |y| view.row(y)))
    }

    pub(crate) fn decode_entry(raw: u8) -> Result<(HfTransformType, bool)> {
        let transform = get_transform_type((raw & !FIRST_BLOCK_FLAG) as i32)?;
        Ok((transform, raw & FIRST_BLOCK_FLAG != 0))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use enum_iterator::all;

    #[test]
    fn raw_ids_round_trip() -> Result<()> {
        for transform in all::<HfTransformType>() {
            assert_eq!(get_transform_type(transform as i32)?, transform);
        }
        assert!(get_transform_type(-1).is_err());
        assert!(get_transform_type(INVALID_TRANSFORM as i32).is_err());
        Ok(())
    }

    #[test]
    fn set_marks_footprint() -> Result<()> {
        let mut image = StrategyImage::new(6, 4)?;
        // 4 blocks wide, 2 blocks tall.
        image.set(1, 0, HfTransformType::DCT16X32)?;
        assert_eq!(image.get(1, 0)?, (HfTransformType::DCT16X32, true));
        assert_eq!(image.get(4, 1)?, (HfTransformType::DCT16X32, false));
        assert!(image.get(0, 0).is_err());
        assert!(image.get(5, 2).is_err());
        assert!(image.set(5, 3, HfTransformType::DCT16X16).is_err());
        Ok(())
    }

    #[test]
    fn partial_overlap() -> Result<()> {
        let mut image = StrategyImage::new_uniform(6, 4, HfTransformType::DCT)?;
        image.set(1, 0, HfTransformType::DCT16X32)?;
        // Cuts the left column of the 16x32 varblock.
        assert!(matches!(
            image.set(0, 0, HfTransformType::DCT16X16),
            Err(Error::VarblockOverlap(0, 0))
        ));
        // Lies inside it without covering it.
        assert!(matches!(
            image.set(2, 1, HfTransformType::DCT),
            Err(Error::VarblockOverlap(2, 1))
        ));
        // Starts inside it and sticks out.
        assert!(image.set(3, 0, HfTransformType::DCT16X16).is_err());
        assert_eq!(image.get(1, 0)?, (HfTransformType::DCT16X32, true));
        assert_eq!(image.get(2, 1)?, (HfTransformType::DCT16X32, false));
        assert_eq!(image.get(0, 0)?, (HfTransformType::DCT, true));

        // Covering it whole replaces it.
        image.set(1, 0, HfTransformType::DCT32X32)?;
        assert_eq!(image.get(4, 3)?, (HfTransformType::DCT32X32, false));
        assert_eq!(image.get(5, 0)?, (HfTransformType::DCT, true));
        Ok(())
    }

    #[test]
    fn uniform() -> Result<()> {
        // 1 block wide, 2 blocks tall.
        let image = StrategyImage::new_uniform(3, 4, HfTransformType::DCT16X8)?;
        let firsts: Vec<bool> = (0..4).map(|by| image.get(1, by).unwrap().1).collect();
        assert_eq!(firsts, [true, false, true, false]);
        Ok(())
    }
}
