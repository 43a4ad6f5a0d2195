// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt;
use std::str::FromStr;

use enum_iterator::{Sequence, all};

use crate::error::Error;

/// Encoder speed/effort setting. Slower tiers spend more effort on
/// customizing coefficient orders:
///
/// * `Lightning`, `Thunder`, `Falcon`: natural orders only, nothing is
///   transmitted.
/// * `Cheetah` to `Squirrel`: custom orders for every bucket in use, except
///   varblocks larger than 32x32. From `Squirrel` on, zero statistics of
///   DCT8-only frames are gathered from a deterministic half of the blocks.
/// * `Kitten`, `Tortoise`: custom orders for every bucket in use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum SpeedTier {
    Tortoise = 1,
    Kitten = 2,
    #[default]
    Squirrel = 3,
    Wombat = 4,
    Hare = 5,
    Cheetah = 6,
    Falcon = 7,
    Thunder = 8,
    Lightning = 9,
}

impl SpeedTier {
    /// The `1..=9` effort value (higher is slower) of this tier.
    pub fn effort(self) -> u32 {
        10 - self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            SpeedTier::Tortoise => "tortoise",
            SpeedTier::Kitten => "kitten",
            SpeedTier::Squirrel => "squirrel",
            SpeedTier::Wombat => "wombat",
            SpeedTier::Hare => "hare",
            SpeedTier::Cheetah => "cheetah",
            SpeedTier::Falcon => "falcon",
            SpeedTier::Thunder => "thunder",
            SpeedTier::Lightning => "lightning",
        }
    }

    /// Whether any coefficient order may differ from the natural one.
    pub fn customizes_orders(self) -> bool {
        self < SpeedTier::Falcon
    }

    /// Whether orders of varblocks larger than 32x32 may be customized.
    pub fn customizes_large_orders(self) -> bool {
        self <= SpeedTier::Kitten
    }

    /// Whether zero statistics may be gathered from a subset of the blocks.
    pub fn samples_blocks(self) -> bool {
        self >= SpeedTier::Squirrel
    }
}

impl TryFrom<u32> for SpeedTier {
    type Error = Error;

    /// Converts an effort value in `1..=9`.
    fn try_from(effort: u32) -> Result<SpeedTier, Error> {
        all::<SpeedTier>()
            .find(|tier| tier.effort() == effort)
            .ok_or_else(|| Error::InvalidSpeedTier(effort.to_string()))
    }
}

impl FromStr for SpeedTier {
    type Err = Error;

    /// Accepts a tier name (case-insensitive) or an effort value.
    fn from_str(s: &str) -> Result<SpeedTier, Error> {
        if let Ok(effort) = s.parse::<u32>() {
            return SpeedTier::try_from(effort);
        }
        all::<SpeedTier>()
            .find(|tier| tier.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidSpeedTier(s.to_string()))
    }
}

impl fmt::Display for SpeedTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn effort_conversions() -> Result<(), Error> {
        assert_eq!(SpeedTier::default().effort(), 7);
        assert_eq!(SpeedTier::try_from(9)?, SpeedTier::Tortoise);
        assert_eq!(SpeedTier::try_from(1)?, SpeedTier::Lightning);
        assert!(SpeedTier::try_from(0).is_err());
        assert!(SpeedTier::try_from(10).is_err());
        assert_eq!("Kitten".parse::<SpeedTier>()?, SpeedTier::Kitten);
        assert_eq!("3".parse::<SpeedTier>()?, SpeedTier::Falcon);
        assert!("snail".parse::<SpeedTier>().is_err());
        for tier in all::<SpeedTier>() {
            assert_eq!(tier.to_string().parse::<SpeedTier>()?, tier);
        }
        Ok(())
    }

    #[test]
    fn customization_levels() {
        assert!(!SpeedTier::Lightning.customizes_orders());
        assert!(!SpeedTier::Falcon.customizes_orders());
        assert!(SpeedTier::Cheetah.customizes_orders());
        assert!(!SpeedTier::Squirrel.customizes_large_orders());
        assert!(SpeedTier::Kitten.customizes_large_orders());
        assert!(SpeedTier::Squirrel.samples_blocks());
        assert!(!SpeedTier::Kitten.samples_blocks());
    }
}
