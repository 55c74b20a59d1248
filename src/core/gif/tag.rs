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

use serde::Serialize;

use super::registers::{Prim, Quadword};
use super::{GifFlag, RegisterDescriptor};
use crate::core::bits::{bit, bits};
use crate::core::error::{DumpError, Result};

/// Size of a GIFtag header in bytes
pub const GIF_TAG_SIZE: usize = 16;

/// Size of one GIF data unit in bytes
pub const QUADWORD_SIZE: usize = 16;

/// Parsed 128-bit GIFtag header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GifTag {
    /// Loop count (NLOOP)
    pub nloop: u16,

    /// End of packet (EOP)
    pub eop: bool,

    /// Bits 16-31, carried through untouched
    pub padding: u16,

    /// Bits 32-45, carried through untouched
    pub padding2: u16,

    /// PRIM field is valid and should be written to the PRIM register (PRE)
    pub pre: bool,

    /// Embedded PRIM value
    pub prim: Prim,

    /// Data format
    pub flag: GifFlag,

    /// Register slots per loop, 1-16
    pub nreg: u8,

    /// Raw REGS field
    pub regs: u64,
}

impl GifTag {
    /// Parse the 16-byte header at the start of `bytes`
    ///
    /// # Arguments
    ///
    /// * `bytes` - Payload starting at a GIFtag; only the first 16 bytes are read
    ///
    /// # Returns
    ///
    /// - `Ok(GifTag)` if at least 16 bytes are available
    /// - `Err(DumpError::MalformedGifTag)` otherwise
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let header: [u8; GIF_TAG_SIZE] = bytes
            .get(..GIF_TAG_SIZE)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| DumpError::MalformedGifTag {
                event_index: None,
                offset: 0,
                reason: format!(
                    "header needs {} bytes, {} available",
                    GIF_TAG_SIZE,
                    bytes.len()
                ),
            })?;

        Ok(Self::from_quadword(Quadword::from_le_bytes(header)))
    }

    pub(crate) fn from_quadword(qw: Quadword) -> Self {
        let word = qw.low;
        let nreg = bits(word, 60, 4) as u8;

        Self {
            nloop: bits(word, 0, 15) as u16,
            eop: bit(word, 15),
            padding: bits(word, 16, 16) as u16,
            padding2: bits(word, 32, 14) as u16,
            pre: bit(word, 46),
            prim: Prim::from_raw(bits(word, 47, 11)),
            flag: GifFlag::from_bits(bits(word, 58, 2) as u8),
            nreg: if nreg == 0 { 16 } else { nreg },
            regs: qw.high,
        }
    }

    /// Descriptor for register slot `slot` (0-15)
    pub fn descriptor(&self, slot: usize) -> RegisterDescriptor {
        RegisterDescriptor::from_nibble(bits(self.regs, (slot as u32 & 0xF) * 4, 4) as u8)
    }

    /// Descriptors of the active register slots, in slot order
    pub fn descriptors(&self) -> Vec<RegisterDescriptor> {
        (0..self.nreg as usize).map(|slot| self.descriptor(slot)).collect()
    }

    /// Bytes of data following the header
    pub fn data_size(&self) -> usize {
        self.nloop as usize * self.nreg as usize * QUADWORD_SIZE
    }

    /// Header plus data, in bytes
    pub fn total_size(&self) -> usize {
        GIF_TAG_SIZE + self.data_size()
    }

    /// Re-encode the header to its 16-byte form
    pub fn to_le_bytes(&self) -> [u8; GIF_TAG_SIZE] {
        let nreg = if self.nreg >= 16 { 0 } else { self.nreg as u64 };
        let low = (self.nloop as u64 & 0x7FFF)
            | (self.eop as u64) << 15
            | (self.padding as u64) << 16
            | (self.padding2 as u64 & 0x3FFF) << 32
            | (self.pre as u64) << 46
            | (self.prim.to_raw() as u64 & 0x7FF) << 47
            | (self.flag as u64) << 58
            | nreg << 60;

        let mut out = [0u8; GIF_TAG_SIZE];
        out[0..8].copy_from_slice(&low.to_le_bytes());
        out[8..16].copy_from_slice(&self.regs.to_le_bytes());
        out
    }
}
