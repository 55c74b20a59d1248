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

//! GIF module tests
//!
//! Tests are organized into the following modules:
//! - `header`: GIFtag header fields and re-encoding
//! - `packed`: PACKED-mode register layouts, Q carry and A+D redirection
//! - `reglist`: REGLIST-mode (raw register) layouts
//! - `image`: IMAGE data and walking multi-tag payloads


use super::*;

/// Build a GIFtag header
pub(super) fn tag_header(
    nloop: u16,
    eop: bool,
    flag: GifFlag,
    descriptors: &[RegisterDescriptor],
) -> Vec<u8> {
    let nreg = descriptors.len() as u64 & 0xF;
    let low = (nloop as u64 & 0x7FFF) | (eop as u64) << 15 | (flag as u64) << 58 | nreg << 60;
    let regs = descriptors
        .iter()
        .enumerate()
        .fold(0u64, |acc, (slot, &d)| acc | (d as u64) << (slot * 4));

    let mut out = Vec::with_capacity(16);
    out.extend_from_slice(&low.to_le_bytes());
    out.extend_from_slice(&regs.to_le_bytes());
    out
}

/// Append one quadword given its two halves
pub(super) fn push_qw(payload: &mut Vec<u8>, low: u64, high: u64) {
    payload.extend_from_slice(&low.to_le_bytes());
    payload.extend_from_slice(&high.to_le_bytes());
}

/// Single-register PACKED tag with one loop
pub(super) fn packed_one(descriptor: RegisterDescriptor, low: u64, high: u64) -> Vec<u8> {
    let mut payload = tag_header(1, true, GifFlag::Packed, &[descriptor]);
    push_qw(&mut payload, low, high);
    payload
}
