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

//! Dump replay
//!
//! Drives a [`GsBackend`] with the events of a [`CaptureFile`]. A frame is
//! every event up to and including the next VSync. Dumps replay in a loop:
//! after the last event the replayer starts again from the first one
//! without reloading the state.
//!
//! # Example
//!
//! ```
//! use gsdump::core::dump::{CaptureFile, Event, RegisterSnapshot};
//! use gsdump::core::replay::{NullBackend, Replayer};
//!
//! let capture = CaptureFile::new(
//!     0,
//!     Vec::new(),
//!     RegisterSnapshot::zeroed(),
//!     vec![Event::VSync { field: 0 }, Event::VSync { field: 1 }],
//! );
//!
//! let mut backend = NullBackend::new();
//! let mut replayer = Replayer::new(&capture);
//! replayer.start(&mut backend).unwrap();
//! replayer.run_frame(&mut backend).unwrap();
//! assert_eq!(backend.vsyncs, 1);
//! assert_eq!(replayer.position(), 1);
//! ```

mod backend;

#[cfg(test)]
mod tests;

pub use backend::{GsBackend, NullBackend};

use super::dump::{CaptureFile, Event, EventKind};
use super::error::Result;

/// Replay cursor over a borrowed dump
#[derive(Debug, Clone)]
pub struct Replayer<'a> {
    capture: &'a CaptureFile,
    position: usize,
    frames: u64,
    loops: u64,
}

impl<'a> Replayer<'a> {
    pub fn new(capture: &'a CaptureFile) -> Self {
        Self {
            capture,
            position: 0,
            frames: 0,
            loops: 0,
        }
    }

    /// Prepare `backend` and rewind to the first event
    ///
    /// Resets the backend, then loads the frozen state and the initial
    /// registers.
    ///
    /// # Errors
    ///
    /// Whatever the backend returns, unchanged. A backend that cannot read
    /// the state reports `DumpError::StateTooOld`.
    pub fn start<B: GsBackend + ?Sized>(&mut self, backend: &mut B) -> Result<()> {
        backend.reset();
        backend.load_state(self.capture.state())?;
        backend.set_registers(self.capture.registers())?;

        self.position = 0;
        self.frames = 0;
        self.loops = 0;

        log::debug!(
            "Replay started: CRC=0x{:08X}, {} events",
            self.capture.crc(),
            self.capture.len()
        );
        Ok(())
    }

    /// Replay one event
    ///
    /// # Returns
    ///
    /// The kind of event replayed, or `None` if the dump has no events
    pub fn step<B: GsBackend + ?Sized>(&mut self, backend: &mut B) -> Result<Option<EventKind>> {
        if self.capture.is_empty() {
            return Ok(None);
        }

        let event = &self.capture.events()[self.position];
        match event {
            Event::Transfer { path, payload } => backend.transfer(*path, payload)?,
            Event::VSync { field } => {
                backend.vsync(*field)?;
                self.frames += 1;
            }
            Event::ReadFifo { .. } => backend.read_fifo(event.fifo_size().unwrap_or_default())?,
            Event::Registers { payload } => backend.set_registers(payload)?,
        }

        self.position += 1;
        if self.position == self.capture.len() {
            self.position = 0;
            self.loops += 1;
            log::trace!("Replay wrapped to event 0 (loop {})", self.loops);
        }

        Ok(Some(event.kind()))
    }

    /// Replay up to and including the next VSync
    ///
    /// A dump without any VSync replays one full pass instead, so this
    /// always returns.
    ///
    /// # Returns
    ///
    /// Number of events replayed
    pub fn run_frame<B: GsBackend + ?Sized>(&mut self, backend: &mut B) -> Result<usize> {
        let limit = self.capture.len();
        let mut replayed = 0;

        while replayed < limit {
            let kind = self.step(backend)?;
            replayed += 1;
            if kind == Some(EventKind::VSync) {
                break;
            }
        }

        Ok(replayed)
    }

    /// Index of the next event to replay
    pub fn position(&self) -> usize {
        self.position
    }

    /// VSyncs replayed since `start`
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Times the replay wrapped back to the first event
    pub fn loops(&self) -> u64 {
        self.loops
    }
}
