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

//! Test fixtures: raw dump and GIF packet builders
//!
//! The builders write bytes by hand rather than through the crate's writer,
//! so reader tests do not depend on the code under test.

/// Byte-level builder for a GS dump
#[allow(dead_code)]
pub struct DumpBuilder {
    bytes: Vec<u8>,
}

#[allow(dead_code)]
impl DumpBuilder {
    /// Header with the given CRC, empty state and zeroed registers
    pub fn new(crc: i32) -> Self {
        Self::with_state(crc, &[])
    }

    pub fn with_state(crc: i32, state: &[u8]) -> Self {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&(state.len() as i32).to_le_bytes());
        bytes.extend_from_slice(state);
        bytes.extend_from_slice(&[0u8; 8192]);
        Self { bytes }
    }

    pub fn transfer(mut self, path: u8, payload: &[u8]) -> Self {
        self.bytes.push(0);
        self.bytes.push(path);
        self.bytes.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn vsync(mut self, field: u8) -> Self {
        self.bytes.extend_from_slice(&[1, field]);
        self
    }

    pub fn read_fifo(mut self, size: i32) -> Self {
        self.bytes.push(2);
        self.bytes.extend_from_slice(&size.to_le_bytes());
        self
    }

    pub fn registers(mut self, fill: u8) -> Self {
        self.bytes.push(3);
        self.bytes.extend_from_slice(&[fill; 8192]);
        self
    }

    /// Append arbitrary bytes, e.g. a bad tag
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// GIFtag header
///
/// `regs` lists descriptor nibbles in slot order; NREG is their count.
#[allow(dead_code)]
pub fn gif_tag(nloop: u16, eop: bool, flag: u8, regs: &[u8]) -> Vec<u8> {
    gif_tag_with_prim(nloop, eop, flag, regs, None)
}

/// GIFtag header with PRE set and an embedded PRIM value
#[allow(dead_code)]
pub fn gif_tag_with_prim(nloop: u16, eop: bool, flag: u8, regs: &[u8], prim: Option<u16>) -> Vec<u8> {
    let nreg = (regs.len() as u64) & 0xF;
    let mut low = (nloop as u64 & 0x7FFF) | (eop as u64) << 15 | (flag as u64 & 3) << 58 | nreg << 60;
    if let Some(prim) = prim {
        low |= 1 << 46 | (prim as u64 & 0x7FF) << 47;
    }

    let high = regs
        .iter()
        .enumerate()
        .fold(0u64, |acc, (slot, &desc)| acc | ((desc as u64 & 0xF) << (slot * 4)));

    let mut bytes = low.to_le_bytes().to_vec();
    bytes.extend_from_slice(&high.to_le_bytes());
    bytes
}

/// One data quadword from its two halves
#[allow(dead_code)]
pub fn quadword(low: u64, high: u64) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[0..8].copy_from_slice(&low.to_le_bytes());
    bytes[8..16].copy_from_slice(&high.to_le_bytes());
    bytes
}

/// A PATH3 sprite: PRE PRIM=Sprite, then RGBAQ and two XYZ2 vertices
#[allow(dead_code)]
pub fn sprite_packet() -> Vec<u8> {
    let mut packet = gif_tag_with_prim(1, true, 0, &[0x1, 0x5, 0x5], Some(0x6));
    packet.extend_from_slice(&quadword(0x80 | 0x40 << 32, 0x20 | 0xFF << 32));
    packet.extend_from_slice(&quadword(160 | 320 << 32, 0x10 << 4));
    packet.extend_from_slice(&quadword(480 | 640 << 32, 0x10 << 4));
    packet
}
