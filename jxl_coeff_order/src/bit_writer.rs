// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    bit_reader::MAX_BITS_PER_CALL,
    error::{Error, Result},
};
use byteorder::{ByteOrder, LittleEndian};

/// Writes bits into a growable byte buffer, in the order `BitReader` reads
/// them back: least significant bit first, bytes in little-endian order.
#[derive(Debug, Default)]
pub struct BitWriter {
    storage: Vec<u8>,
    bit_buf: u64,
    // Always < 8 between calls.
    bits_in_buf: usize,
    total_bits_written: usize,
}

impl BitWriter {
    pub fn new() -> BitWriter {
        BitWriter::default()
    }

    /// Appends the `num` low bits of `value`.
    /// ```
    /// # use jxl_coeff_order::{bit_reader::BitReader, bit_writer::BitWriter};
    /// let mut bw = BitWriter::new();
    /// bw.write(3, 0b101)?;
    /// bw.write(13, 0x1234)?;
    /// assert_eq!(bw.total_bits_written(), 16);
    /// let data = bw.finalize()?;
    /// let mut br = BitReader::new(&data);
    /// assert_eq!(br.read(3)?, 0b101);
    /// assert_eq!(br.read(13)?, 0x1234);
    /// # Ok::<(), jxl_coeff_order::error::Error>(())
    /// ```
    pub fn write(&mut self, num: usize, value: u64) -> Result<()> {
        if num > MAX_BITS_PER_CALL {
            return Err(Error::WriteTooLarge(num));
        }
        if value >> num != 0 {
            return Err(Error::ValueTooLarge(value, num));
        }
        if num == 0 {
            return Ok(());
        }
        self.bit_buf |= value << self.bits_in_buf;
        self.bits_in_buf += num;
        self.total_bits_written += num;

        let full_bytes = self.bits_in_buf / 8;
        if full_bytes > 0 {
            self.storage.try_reserve(full_bytes)?;
            let mut bytes = [0u8; 8];
            LittleEndian::write_u64(&mut bytes, self.bit_buf);
            self.storage.extend_from_slice(&bytes[..full_bytes]);
            self.bit_buf >>= full_bytes * 8;
            self.bits_in_buf -= full_bytes * 8;
        }
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write(1, value as u64)
    }

    /// Returns the total number of bits written so far, padding included.
    pub fn total_bits_written(&self) -> usize {
        self.total_bits_written
    }

    /// Writes zero bits up to the next byte boundary.
    pub fn zero_pad_to_byte(&mut self) -> Result<()> {
        let padding = (8 - self.bits_in_buf) % 8;
        self.write(padding, 0)
    }

    /// Pads to a byte boundary and returns the written bytes.
    pub fn finalize(mut self) -> Result<Vec<u8>> {
        self.zero_pad_to_byte()?;
        debug_assert_eq!(self.bits_in_buf, 0);
        Ok(self.storage)
    }
}
