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

//! GIF (Graphics Interface) tag decoding
//!
//! Data reaching the GS through any of the three GIF paths is framed by
//! 128-bit GIFtags. A tag says how many quadwords follow and how to read
//! them:
//!
//! ```text
//! Bits    Field   Meaning
//! 0-14    NLOOP   Number of loop iterations
//! 15      EOP     End of packet
//! 16-45   -       Padding (preserved, unused)
//! 46      PRE     PRIM field is valid
//! 47-57   PRIM    Initial PRIM register value
//! 58-59   FLG     Data format (PACKED, REGLIST, IMAGE)
//! 60-63   NREG    Register descriptors per loop (0 = 16)
//! 64-127  REGS    Up to 16 four-bit register descriptors
//! ```
//!
//! Each loop iteration carries one quadword per register descriptor. In
//! PACKED mode the quadword is a compact vertex-oriented layout; in REGLIST
//! mode the low half is the raw 64-bit register; in IMAGE mode the data is
//! opaque texture upload payload.
//!
//! # Example
//!
//! ```
//! use gsdump::core::gif::{decode_gif_tag, GifFlag};
//!
//! // NLOOP=0, EOP=1, PACKED, NREG=1
//! let mut payload = [0u8; 16];
//! payload[0..8].copy_from_slice(&((1u64 << 15) | (1u64 << 60)).to_le_bytes());
//!
//! let decoded = decode_gif_tag(&payload).unwrap();
//! assert!(decoded.tag.eop);
//! assert_eq!(decoded.tag.flag, GifFlag::Packed);
//! assert_eq!(decoded.consumed, 16);
//! ```

mod decoder;
pub mod registers;
mod tag;

#[cfg(test)]
mod tests;

use serde::Serialize;

pub use decoder::{decode_gif_packets, decode_gif_tag, DecodedGifTag, GifPackets, SkippedRegister};
pub use registers::{
    Clamp, Fog, GifRegister, Prim, PrimFlags, PrimitiveType, Rgbaq, St, Tex0, Uv, Xyz, Xyzf,
};
pub use tag::{GifTag, GIF_TAG_SIZE, QUADWORD_SIZE};

/// Four-bit GIFtag register descriptor
///
/// Descriptors 0x0-0xD name GS registers directly. A+D (0xE) means the
/// quadword carries its own register address, and NOP (0xF) discards the
/// data.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RegisterDescriptor {
    Prim = 0x0,
    Rgbaq = 0x1,
    St = 0x2,
    Uv = 0x3,
    Xyzf2 = 0x4,
    Xyz2 = 0x5,
    Tex0_1 = 0x6,
    Tex0_2 = 0x7,
    Clamp1 = 0x8,
    Clamp2 = 0x9,
    Fog = 0xA,
    Reserved = 0xB,
    Xyzf3 = 0xC,
    Xyz3 = 0xD,
    Ad = 0xE,
    Nop = 0xF,
}

impl RegisterDescriptor {
    /// Every descriptor, in encoding order
    pub const ALL: [RegisterDescriptor; 16] = [
        RegisterDescriptor::Prim,
        RegisterDescriptor::Rgbaq,
        RegisterDescriptor::St,
        RegisterDescriptor::Uv,
        RegisterDescriptor::Xyzf2,
        RegisterDescriptor::Xyz2,
        RegisterDescriptor::Tex0_1,
        RegisterDescriptor::Tex0_2,
        RegisterDescriptor::Clamp1,
        RegisterDescriptor::Clamp2,
        RegisterDescriptor::Fog,
        RegisterDescriptor::Reserved,
        RegisterDescriptor::Xyzf3,
        RegisterDescriptor::Xyz3,
        RegisterDescriptor::Ad,
        RegisterDescriptor::Nop,
    ];

    /// Decode a descriptor from the low four bits of `value`
    ///
    /// Every nibble names a descriptor, so this cannot fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use gsdump::core::gif::RegisterDescriptor;
    ///
    /// assert_eq!(RegisterDescriptor::from_nibble(0xE), RegisterDescriptor::Ad);
    /// assert_eq!(RegisterDescriptor::from_nibble(0x15), RegisterDescriptor::Xyz2);
    /// ```
    pub fn from_nibble(value: u8) -> Self {
        Self::ALL[(value & 0xF) as usize]
    }

    /// Short register name as used in GS documentation
    pub fn name(self) -> &'static str {
        match self {
            RegisterDescriptor::Prim => "PRIM",
            RegisterDescriptor::Rgbaq => "RGBAQ",
            RegisterDescriptor::St => "ST",
            RegisterDescriptor::Uv => "UV",
            RegisterDescriptor::Xyzf2 => "XYZF2",
            RegisterDescriptor::Xyz2 => "XYZ2",
            RegisterDescriptor::Tex0_1 => "TEX0_1",
            RegisterDescriptor::Tex0_2 => "TEX0_2",
            RegisterDescriptor::Clamp1 => "CLAMP_1",
            RegisterDescriptor::Clamp2 => "CLAMP_2",
            RegisterDescriptor::Fog => "FOG",
            RegisterDescriptor::Reserved => "RESERVED",
            RegisterDescriptor::Xyzf3 => "XYZF3",
            RegisterDescriptor::Xyz3 => "XYZ3",
            RegisterDescriptor::Ad => "A+D",
            RegisterDescriptor::Nop => "NOP",
        }
    }
}

impl std::fmt::Display for RegisterDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// GIFtag data format (FLG field)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GifFlag {
    /// One quadword per register, vertex-friendly layout
    Packed = 0,
    /// Raw 64-bit register values
    RegList = 1,
    /// Opaque image data for host-to-local transfers
    Image = 2,
    /// Behaves as IMAGE
    Image2 = 3,
}

impl GifFlag {
    /// Decode the two-bit FLG field
    pub fn from_bits(value: u8) -> Self {
        match value & 0x3 {
            0 => GifFlag::Packed,
            1 => GifFlag::RegList,
            2 => GifFlag::Image,
            _ => GifFlag::Image2,
        }
    }

    /// Whether data under this mode is opaque image payload
    pub fn is_image(self) -> bool {
        matches!(self, GifFlag::Image | GifFlag::Image2)
    }
}
