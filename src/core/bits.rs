// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bit-field extraction over 64-bit words
//!
//! Every GS register and GIFtag field is a run of bits inside a 64-bit
//! little-endian half of a quadword. These helpers are the only place
//! where shifting and masking happens.

/// Extract `width` bits starting at bit `offset` of `word`
///
/// Bits past the top of the word read as zero, so a field that would
/// straddle bit 63 is simply truncated.
///
/// # Arguments
///
/// * `word` - Source 64-bit word
/// * `offset` - Index of the lowest bit of the field (0-63)
/// * `width` - Field width in bits (0-64)
///
/// # Returns
///
/// The field value, right-aligned
///
/// # Examples
///
/// ```
/// use gsdump::core::bits::bits;
///
/// assert_eq!(bits(0xABCD, 4, 8), 0xBC);
/// assert_eq!(bits(u64::MAX, 0, 64), u64::MAX);
/// assert_eq!(bits(0x8000_0000_0000_0000, 63, 1), 1);
/// ```
#[inline(always)]
pub fn bits(word: u64, offset: u32, width: u32) -> u64 {
    if offset >= 64 || width == 0 {
        return 0;
    }
    let shifted = word >> offset;
    if width >= 64 {
        shifted
    } else {
        shifted & ((1u64 << width) - 1)
    }
}

/// Test a single bit of `word`
#[inline(always)]
pub fn bit(word: u64, offset: u32) -> bool {
    bits(word, offset, 1) != 0
}

/// Reinterpret a 32-bit field as an IEEE-754 single
///
/// GS float registers hold raw bit patterns, so this is a bit cast,
/// not a numeric conversion.
///
/// # Examples
///
/// ```
/// use gsdump::core::bits::float_bits;
///
/// assert_eq!(float_bits(0x3F80_0000_0000_0000, 32), 1.0);
/// ```
#[inline(always)]
pub fn float_bits(word: u64, offset: u32) -> f32 {
    f32::from_bits(bits(word, offset, 32) as u32)
}

/// Decode a 12.4 fixed-point coordinate field
///
/// Coordinates carry four fractional bits (1/16 pixel).
#[inline(always)]
pub fn fixed4(word: u64, offset: u32, width: u32) -> f32 {
    bits(word, offset, width) as f32 / 16.0
}
