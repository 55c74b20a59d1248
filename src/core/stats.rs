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

//! Dump statistics
//!
//! A single pass over a [`CaptureFile`] that counts events, transferred
//! bytes and decoded GIF registers. Malformed GIFtags are counted rather
//! than reported, so statistics can be gathered for damaged dumps.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::dump::{CaptureFile, Event, GifPath};
use super::gif::{GifFlag, GifPackets, RegisterDescriptor};

/// Counters for one dump
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DumpStats {
    pub transfers: usize,
    pub vsyncs: usize,
    pub read_fifos: usize,
    pub register_writes: usize,

    /// Frames, one per VSync
    pub frames: usize,

    /// Transferred payload bytes per GIF path
    pub bytes_per_path: BTreeMap<GifPath, u64>,

    /// GIFtags seen per data format
    pub tags_per_mode: BTreeMap<GifFlag, usize>,

    /// Decoded registers per descriptor, A+D targets counted as their target
    pub registers: BTreeMap<RegisterDescriptor, usize>,

    /// Registers that arrived through A+D
    pub address_data: usize,

    /// IMAGE quadwords
    pub image_quadwords: usize,

    pub skipped_registers: usize,

    /// Transfers whose GIFtag walk stopped at a malformed tag
    pub malformed_tags: usize,
}

impl DumpStats {
    /// Walk every event of `capture` once
    pub fn collect(capture: &CaptureFile) -> Self {
        let mut stats = Self::default();

        for (index, event) in capture.events().iter().enumerate() {
            match event {
                Event::Transfer { path, payload } => {
                    stats.transfers += 1;
                    *stats.bytes_per_path.entry(*path).or_default() += payload.len() as u64;
                    stats.count_packets(index, payload);
                }
                Event::VSync { .. } => {
                    stats.vsyncs += 1;
                    stats.frames += 1;
                }
                Event::ReadFifo { .. } => stats.read_fifos += 1,
                Event::Registers { .. } => stats.register_writes += 1,
            }
        }

        stats
    }

    fn count_packets(&mut self, index: usize, payload: &[u8]) {
        for result in GifPackets::new(payload) {
            let decoded = match result {
                Ok(decoded) => decoded,
                Err(e) => {
                    log::debug!("Event {}: {}", index, e.with_event_index(index));
                    self.malformed_tags += 1;
                    break;
                }
            };

            *self.tags_per_mode.entry(decoded.tag.flag).or_default() += 1;
            self.image_quadwords += decoded.image.len();
            self.skipped_registers += decoded.skipped.len();

            for register in &decoded.registers {
                if register.descriptor() == RegisterDescriptor::Ad {
                    self.address_data += 1;
                }
                *self
                    .registers
                    .entry(register.resolved().descriptor())
                    .or_default() += 1;
            }
        }
    }

    /// Total decoded registers
    pub fn register_count(&self) -> usize {
        self.registers.values().sum()
    }
}

impl fmt::Display for DumpStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Events:")?;
        writeln!(f, "  Transfer:  {}", self.transfers)?;
        writeln!(f, "  VSync:     {}", self.vsyncs)?;
        writeln!(f, "  ReadFIFO:  {}", self.read_fifos)?;
        writeln!(f, "  Registers: {}", self.register_writes)?;
        writeln!(f, "Frames: {}", self.frames)?;

        writeln!(f, "Bytes per path:")?;
        for (path, bytes) in &self.bytes_per_path {
            writeln!(f, "  {:<9} {}", path.name(), bytes)?;
        }

        writeln!(f, "GIFtags per mode:")?;
        for (flag, count) in &self.tags_per_mode {
            writeln!(f, "  {:<9} {}", format!("{:?}", flag), count)?;
        }

        writeln!(f, "Registers ({} total, {} via A+D):", self.register_count(), self.address_data)?;
        for (descriptor, count) in &self.registers {
            writeln!(f, "  {:<9} {}", descriptor.name(), count)?;
        }

        writeln!(f, "IMAGE quadwords: {}", self.image_quadwords)?;
        writeln!(f, "Skipped registers: {}", self.skipped_registers)?;
        write!(f, "Malformed GIFtags: {}", self.malformed_tags)
    }
}
