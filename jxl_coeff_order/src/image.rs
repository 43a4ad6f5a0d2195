// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::{
    error::{Error, Result},
    util::tracing_wrappers::*,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub origin: (usize, usize),
    // width, height
    pub size: (usize, usize),
}

impl Rect {
    pub fn new(origin: (usize, usize), size: (usize, usize)) -> Rect {
        Rect { origin, size }
    }

    pub fn is_within(&self, size: (usize, usize)) -> Result<()> {
        if self
            .origin
            .0
            .checked_add(self.size.0)
            .ok_or(Error::ArithmeticOverflow)?
            > size.0
            || self
                .origin
                .1
                .checked_add(self.size.1)
                .ok_or(Error::ArithmeticOverflow)?
                > size.1
        {
            Err(Error::RectOutOfBounds(
                self.size.0,
                self.size.1,
                self.origin.0,
                self.origin.1,
                size.0,
                size.1,
            ))
        } else {
            Ok(())
        }
    }
}

/// Row-major 2D plane.
#[derive(Clone)]
pub struct Image<T> {
    size: (usize, usize),
    data: Vec<T>,
}

impl<T> Debug for Image<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Image {}x{}", self.size.0, self.size.1)
    }
}

#[derive(Clone, Copy)]
pub struct ImageRect<'a, T> {
    rect: Rect,
    image: &'a Image<T>,
}

impl<T: Copy + Default> Image<T> {
    pub fn new(size: (usize, usize)) -> Result<Image<T>> {
        Self::new_with_value(size, T::default())
    }

    pub fn new_with_value(size: (usize, usize), value: T) -> Result<Image<T>> {
        let (xsize, ysize) = size;
        // These limits let us not worry about overflows.
        if xsize as u64 >= i64::MAX as u64 / 4 || ysize as u64 >= i64::MAX as u64 / 4 {
            return Err(Error::ImageSizeTooLarge(xsize, ysize));
        }
        let total_size = xsize
            .checked_mul(ysize)
            .ok_or(Error::ImageSizeTooLarge(xsize, ysize))?;
        trace!("allocating {xsize}x{ysize} image");
        let mut data = vec![];
        data.try_reserve_exact(total_size)?;
        data.resize(total_size, value);
        Ok(Image {
            size: (xsize, ysize),
            data,
        })
    }
}

impl<T> Image<T> {
    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn row(&self, row: usize) -> &[T] {
        debug_assert!(row < self.size.1);
        &self.data[row * self.size.0..(row + 1) * self.size.0]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        debug_assert!(row < self.size.1);
        &mut self.data[row * self.size.0..(row + 1) * self.size.0]
    }

    pub fn as_rect(&self) -> ImageRect<'_, T> {
        ImageRect {
            rect: Rect::new((0, 0), self.size),
            image: self,
        }
    }
}

impl<'a, T> ImageRect<'a, T> {
    /// Restricts the view to `rect`, given relative to the current view.
    pub fn rect(&self, rect: Rect) -> Result<ImageRect<'a, T>> {
        rect.is_within(self.rect.size)?;
        Ok(ImageRect {
            rect: Rect::new(
                (
                    rect.origin.0 + self.rect.origin.0,
                    rect.origin.1 + self.rect.origin.1,
                ),
                rect.size,
            ),
            image: self.image,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        self.rect.size
    }

    pub fn row(&self, row: usize) -> &'a [T] {
        debug_assert!(row < self.rect.size.1);
        let start = self.rect.origin.0;
        &self.image.row(row + self.rect.origin.1)[start..start + self.rect.size.0]
    }
}
