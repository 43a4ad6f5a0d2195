// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{BLOCK_DIM, GROUP_DIM_IN_BLOCKS, image::Rect};

/// Block grid of a frame and its split into groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDimensions {
    pub xsize_blocks: usize,
    pub ysize_blocks: usize,
    pub xsize_groups: usize,
    pub ysize_groups: usize,
    pub num_groups: usize,
}

impl FrameDimensions {
    pub fn new(xsize_blocks: usize, ysize_blocks: usize) -> FrameDimensions {
        let xsize_groups = xsize_blocks.div_ceil(GROUP_DIM_IN_BLOCKS);
        let ysize_groups = ysize_blocks.div_ceil(GROUP_DIM_IN_BLOCKS);
        FrameDimensions {
            xsize_blocks,
            ysize_blocks,
            xsize_groups,
            ysize_groups,
            num_groups: xsize_groups * ysize_groups,
        }
    }

    /// Dimensions of a frame of `xsize`x`ysize` pixels.
    pub fn from_pixels(xsize: usize, ysize: usize) -> FrameDimensions {
        Self::new(xsize.div_ceil(BLOCK_DIM), ysize.div_ceil(BLOCK_DIM))
    }

    pub fn size_blocks(&self) -> (usize, usize) {
        (self.xsize_blocks, self.ysize_blocks)
    }

    /// The whole frame, in block units.
    pub fn block_rect(&self) -> Rect {
        Rect::new((0, 0), self.size_blocks())
    }

    /// Block-unit rect of group `group_id`, clamped to the frame.
    pub fn group_rect(&self, group_id: usize) -> Rect {
        debug_assert!(group_id < self.num_groups);
        let gx = group_id % self.xsize_groups;
        let gy = group_id / self.xsize_groups;
        let origin = (gx * GROUP_DIM_IN_BLOCKS, gy * GROUP_DIM_IN_BLOCKS);
        Rect::new(
            origin,
            (
                (self.xsize_blocks - origin.0).min(GROUP_DIM_IN_BLOCKS),
                (self.ysize_blocks - origin.1).min(GROUP_DIM_IN_BLOCKS),
            ),
        )
    }
}
