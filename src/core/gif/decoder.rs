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

use super::registers::{unpack, GifRegister, Packing, Quadword, UnpackState};
use super::tag::{GifTag, GIF_TAG_SIZE, QUADWORD_SIZE};
use super::{GifFlag, RegisterDescriptor};
use crate::core::error::{DumpError, Result};

/// A register slot that could not be decoded
///
/// Skips never abort a tag; they are collected so callers can count them.
#[derive(Debug)]
pub struct SkippedRegister {
    /// Loop iteration the register belongs to
    pub loop_index: usize,
    /// Register slot within the iteration
    pub slot: usize,
    /// Descriptor of the slot
    pub descriptor: RegisterDescriptor,
    /// Why the register was skipped
    pub reason: DumpError,
}

/// A GIFtag together with everything decoded from its data
#[derive(Debug)]
pub struct DecodedGifTag {
    /// Parsed header
    pub tag: GifTag,

    /// Offset of the header within the payload
    pub offset: usize,

    /// Decoded registers in stream order (PACKED and REGLIST)
    pub registers: Vec<GifRegister>,

    /// Raw quadwords of IMAGE data, verbatim
    pub image: Vec<[u8; QUADWORD_SIZE]>,

    /// Registers that were skipped
    pub skipped: Vec<SkippedRegister>,

    /// Bytes consumed, header included
    pub consumed: usize,
}

impl DecodedGifTag {
    /// Number of register slots the tag declared
    pub fn slot_count(&self) -> usize {
        self.tag.nloop as usize * self.tag.nreg as usize
    }
}

/// Decode the GIFtag at the start of `payload`
///
/// Bytes past the end of the tag's data are left alone; `consumed` tells
/// the caller where the next tag begins.
///
/// # Returns
///
/// - `Ok(DecodedGifTag)` if the header and all of its data fit
/// - `Err(DumpError::MalformedGifTag)` if the payload is too short
pub fn decode_gif_tag(payload: &[u8]) -> Result<DecodedGifTag> {
    decode_at(payload, 0)
}

/// Decode every GIFtag packed back-to-back in `payload`
///
/// An empty payload yields no tags. The first malformed tag ends the walk.
pub fn decode_gif_packets(payload: &[u8]) -> Result<Vec<DecodedGifTag>> {
    GifPackets::new(payload).collect()
}

/// Iterator over consecutive GIFtags in a transfer payload
///
/// Yields at most one error, after which it is exhausted.
pub struct GifPackets<'a> {
    payload: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> GifPackets<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            payload,
            offset: 0,
            failed: false,
        }
    }
}

impl Iterator for GifPackets<'_> {
    type Item = Result<DecodedGifTag>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.payload.len() {
            return None;
        }

        match decode_at(self.payload, self.offset) {
            Ok(decoded) => {
                self.offset += decoded.consumed;
                Some(Ok(decoded))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

fn decode_at(payload: &[u8], offset: usize) -> Result<DecodedGifTag> {
    let remaining = &payload[offset.min(payload.len())..];

    let tag = GifTag::parse(remaining).map_err(|_| DumpError::MalformedGifTag {
        event_index: None,
        offset,
        reason: format!(
            "header needs {} bytes, {} available",
            GIF_TAG_SIZE,
            remaining.len()
        ),
    })?;

    let total = tag.total_size();
    if remaining.len() < total {
        return Err(DumpError::MalformedGifTag {
            event_index: None,
            offset,
            reason: format!(
                "NLOOP={} NREG={} needs {} bytes, {} available",
                tag.nloop,
                tag.nreg,
                total,
                remaining.len()
            ),
        });
    }

    let mut decoded = DecodedGifTag {
        tag,
        offset,
        registers: Vec::new(),
        image: Vec::new(),
        skipped: Vec::new(),
        consumed: total,
    };

    let data = &remaining[GIF_TAG_SIZE..total];
    if decoded.tag.flag.is_image() {
        decoded.image = data
            .chunks_exact(QUADWORD_SIZE)
            .map(|chunk| {
                let mut qw = [0u8; QUADWORD_SIZE];
                qw.copy_from_slice(chunk);
                qw
            })
            .collect();
        return Ok(decoded);
    }

    let packing = match decoded.tag.flag {
        GifFlag::Packed => Packing::Packed,
        _ => Packing::Unpacked,
    };
    let nreg = decoded.tag.nreg as usize;
    let descriptors = decoded.tag.descriptors();
    let mut state = UnpackState::new();
    decoded.registers.reserve(decoded.slot_count());

    for (index, chunk) in data.chunks_exact(QUADWORD_SIZE).enumerate() {
        let slot = index % nreg;
        let descriptor = descriptors[slot];
        let mut bytes = [0u8; QUADWORD_SIZE];
        bytes.copy_from_slice(chunk);

        match unpack(descriptor, Quadword::from_le_bytes(bytes), packing, &mut state) {
            Ok(register) => decoded.registers.push(register),
            Err(reason) => {
                log::debug!(
                    "Skipping GIF register {} (loop {}, slot {}) at payload offset 0x{:X}: {}",
                    descriptor,
                    index / nreg,
                    slot,
                    offset + GIF_TAG_SIZE + index * QUADWORD_SIZE,
                    reason
                );
                decoded.skipped.push(SkippedRegister {
                    loop_index: index / nreg,
                    slot,
                    descriptor,
                    reason,
                });
            }
        }
    }

    Ok(decoded)
}
