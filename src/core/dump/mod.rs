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

//! GS dump container
//!
//! A GS dump captures everything the emulator handed to the GS plugin:
//! the plugin's frozen state, the privileged registers, and then every
//! transfer, vsync and FIFO read in the order they happened. Replaying the
//! events against a fresh plugin reproduces the captured frames.
//!
//! # Dump Format
//!
//! All integers are little-endian:
//!
//! ```text
//! 0x0000:      i32       CRC of the running game
//! 0x0004:      i32       State length N
//! 0x0008:      u8[N]     Frozen GS state
//! 0x0008+N:    u8[8192]  Privileged registers
//! 0x2008+N:    events until end of file:
//!   u8 tag
//!   0 Transfer:  u8 path, i32 length, u8[length] data
//!   1 VSync:     u8 field
//!   2 ReadFIFO:  i32 size
//!   3 Registers: u8[8192]
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gsdump::core::dump::CaptureFile;
//!
//! let capture = CaptureFile::load("game.gs").unwrap();
//! println!("CRC 0x{:08X}, {} events", capture.crc(), capture.len());
//! for index in 0..capture.len().min(10) {
//!     println!("{}", capture.event_summary(index).unwrap());
//! }
//! ```

mod reader;
mod writer;


use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use super::config::ReaderConfig;
use super::error::{DumpError, Result};
use super::gif::{decode_gif_packets, DecodedGifTag};

pub use writer::DumpWriter;

/// Size of the GS privileged register block
pub const REGISTER_SNAPSHOT_SIZE: usize = 8192;

/// Snapshot of the GS privileged registers
///
/// Always exactly [`REGISTER_SNAPSHOT_SIZE`] bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterSnapshot(Box<[u8; REGISTER_SNAPSHOT_SIZE]>);

impl RegisterSnapshot {
    /// All-zero register block
    pub fn zeroed() -> Self {
        Self(Box::new([0u8; REGISTER_SNAPSHOT_SIZE]))
    }

    /// Copy a register block out of `bytes`
    ///
    /// # Returns
    ///
    /// `None` unless `bytes` is exactly [`REGISTER_SNAPSHOT_SIZE`] long
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.to_vec().into_boxed_slice().try_into().ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; REGISTER_SNAPSHOT_SIZE] {
        &self.0
    }

    /// Read a 64-bit privileged register at byte `offset`
    ///
    /// Privileged registers sit 16 bytes apart (PMODE at 0x0000, SMODE1 at
    /// 0x0010, ..., CSR at 0x1000).
    pub fn read64(&self, offset: usize) -> Option<u64> {
        let bytes = self.0.get(offset..offset + 8)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(bytes);
        Some(u64::from_le_bytes(word))
    }
}

impl Default for RegisterSnapshot {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for RegisterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nonzero = self.0.iter().filter(|&&b| b != 0).count();
        write!(f, "RegisterSnapshot({} bytes, {} nonzero)", REGISTER_SNAPSHOT_SIZE, nonzero)
    }
}

/// GIF path a transfer came through
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GifPath {
    /// PATH1 as written by older emulator versions
    Path1Old = 0,
    Path2 = 1,
    Path3 = 2,
    Path1New = 3,
}

impl GifPath {
    pub const ALL: [GifPath; 4] = [
        GifPath::Path1Old,
        GifPath::Path2,
        GifPath::Path3,
        GifPath::Path1New,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            GifPath::Path1Old => "Path1Old",
            GifPath::Path2 => "Path2",
            GifPath::Path3 => "Path3",
            GifPath::Path1New => "Path1New",
        }
    }
}

impl fmt::Display for GifPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event record kinds and their tag bytes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    Transfer = 0,
    VSync = 1,
    ReadFifo = 2,
    Registers = 3,
}

impl EventKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(EventKind::Transfer),
            1 => Some(EventKind::VSync),
            2 => Some(EventKind::ReadFifo),
            3 => Some(EventKind::Registers),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Transfer => "Transfer",
            EventKind::VSync => "VSync",
            EventKind::ReadFifo => "ReadFIFO",
            EventKind::Registers => "Registers",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One recorded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// GIF data sent to the GS
    Transfer { path: GifPath, payload: Vec<u8> },

    /// Vertical sync; `field` is the interlace field being displayed
    VSync { field: u8 },

    /// Local-to-host FIFO read, stored as the raw little-endian size
    ReadFifo { size: [u8; 4] },

    /// Privileged register block rewrite
    Registers { payload: RegisterSnapshot },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Transfer { .. } => EventKind::Transfer,
            Event::VSync { .. } => EventKind::VSync,
            Event::ReadFifo { .. } => EventKind::ReadFifo,
            Event::Registers { .. } => EventKind::Registers,
        }
    }

    /// Build a FIFO read event from its size
    pub fn read_fifo(size: i32) -> Self {
        Event::ReadFifo {
            size: size.to_le_bytes(),
        }
    }

    /// Decoded size of a FIFO read, in quadwords
    pub fn fifo_size(&self) -> Option<i32> {
        match self {
            Event::ReadFifo { size } => Some(i32::from_le_bytes(*size)),
            _ => None,
        }
    }

    /// Number of payload bytes the event carries on disk
    pub fn payload_len(&self) -> usize {
        match self {
            Event::Transfer { payload, .. } => payload.len(),
            Event::VSync { .. } => 1,
            Event::ReadFifo { .. } => 4,
            Event::Registers { .. } => REGISTER_SNAPSHOT_SIZE,
        }
    }
}

/// One-line description of an event for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub index: usize,
    pub kind: EventKind,
    pub detail: String,
    pub length: usize,
}

impl EventSummary {
    fn new(index: usize, event: &Event) -> Self {
        let detail = match event {
            Event::Transfer { path, .. } => path.name().to_string(),
            Event::VSync { field } => format!("field {}", field),
            Event::ReadFifo { .. } => format!("size {}", event.fifo_size().unwrap_or_default()),
            Event::Registers { .. } => "-".to_string(),
        };
        Self {
            index,
            kind: event.kind(),
            detail,
            length: event.payload_len(),
        }
    }
}

impl fmt::Display for EventSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6} | {:<9} | {:<9} | {} bytes",
            self.index,
            self.kind.name(),
            self.detail,
            self.length
        )
    }
}

/// A loaded GS dump
///
/// Immutable once built: the state blob and register block keep the size
/// they were loaded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFile {
    crc: i32,
    state: Box<[u8]>,
    registers: RegisterSnapshot,
    events: Vec<Event>,
}

impl CaptureFile {
    /// Assemble a dump from its parts
    pub fn new(crc: i32, state: Vec<u8>, registers: RegisterSnapshot, events: Vec<Event>) -> Self {
        Self {
            crc,
            state: state.into_boxed_slice(),
            registers,
            events,
        }
    }

    /// Parse a dump held in memory, with default limits
    ///
    /// # Returns
    ///
    /// - `Ok(CaptureFile)` with every event in file order
    /// - `Err(DumpError)` on the first structural problem; nothing partial
    ///   is returned
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with_config(data, &ReaderConfig::default())
    }

    /// Parse a dump held in memory
    pub fn parse_with_config(data: &[u8], config: &ReaderConfig) -> Result<Self> {
        reader::parse(data, config)
    }

    /// Read a whole dump from `source` and parse it
    pub fn from_reader<R: Read>(mut source: R, config: &ReaderConfig) -> Result<Self> {
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;
        Self::parse_with_config(&data, config)
    }

    /// Load a dump file with default limits
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, &ReaderConfig::default())
    }

    /// Load a dump file
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: &ReaderConfig) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        log::info!("Loading GS dump: {} ({} bytes)", path.display(), data.len());
        Self::parse_with_config(&data, config)
    }

    /// CRC of the game the dump was recorded from
    pub fn crc(&self) -> i32 {
        self.crc
    }

    /// Frozen GS plugin state
    pub fn state(&self) -> &[u8] {
        &self.state
    }

    /// Version word leading the frozen state, if the state has one
    pub fn state_version(&self) -> Option<u32> {
        let bytes: [u8; 4] = self.state.get(..4)?.try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }

    /// Privileged registers at the start of the dump
    pub fn registers(&self) -> &RegisterSnapshot {
        &self.registers
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of frames, counted as VSync events
    pub fn frame_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| event.kind() == EventKind::VSync)
            .count()
    }

    /// Listing line for event `index`
    ///
    /// The format is for display only and may change.
    pub fn event_summary(&self, index: usize) -> Option<String> {
        self.summary(index).map(|summary| summary.to_string())
    }

    /// Structured summary for event `index`
    pub fn summary(&self, index: usize) -> Option<EventSummary> {
        self.events
            .get(index)
            .map(|event| EventSummary::new(index, event))
    }

    /// Structured summaries for every event
    pub fn summaries(&self) -> Vec<EventSummary> {
        self.events
            .iter()
            .enumerate()
            .map(|(index, event)| EventSummary::new(index, event))
            .collect()
    }

    /// Decode the GIFtags of Transfer event `index`
    ///
    /// # Returns
    ///
    /// - `Ok(tags)` in payload order
    /// - `Err(DumpError::MalformedGifTag)` naming this event if a tag does not fit
    /// - `Err(DumpError::NotATransfer)` / `Err(DumpError::EventOutOfRange)`
    pub fn decode_transfer(&self, index: usize) -> Result<Vec<DecodedGifTag>> {
        match self.events.get(index) {
            Some(Event::Transfer { payload, .. }) => {
                decode_gif_packets(payload).map_err(|e| e.with_event_index(index))
            }
            Some(_) => Err(DumpError::NotATransfer { index }),
            None => Err(DumpError::EventOutOfRange {
                index,
                count: self.events.len(),
            }),
        }
    }

    /// Copy of this dump cut after its first `frames` VSync events
    ///
    /// Events after the last kept VSync are dropped. Asking for more frames
    /// than the dump holds returns a full copy.
    pub fn first_frames(&self, frames: usize) -> Self {
        let mut seen = 0;
        let mut end = self.events.len();
        for (index, event) in self.events.iter().enumerate() {
            if event.kind() == EventKind::VSync {
                seen += 1;
                if seen == frames {
                    end = index + 1;
                    break;
                }
            }
        }
        if frames == 0 {
            end = 0;
        }

        Self {
            crc: self.crc,
            state: self.state.clone(),
            registers: self.registers.clone(),
            events: self.events[..end].to_vec(),
        }
    }

    /// Serialize to the on-disk layout
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Write the dump to `sink` in the on-disk layout
    pub fn write_to<W: std::io::Write>(&self, sink: W) -> Result<()> {
        let mut writer = DumpWriter::new(sink, self.crc, &self.state, &self.registers)?;
        for event in &self.events {
            writer.write_event(event)?;
        }
        writer.finish()?;
        Ok(())
    }

    /// Write the dump to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
    }
}
