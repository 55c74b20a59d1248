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

use std::io::Write;

use super::{Event, RegisterSnapshot};
use crate::core::error::{DumpError, Result};

/// Streaming dump writer
///
/// Writes the header on construction and one record per
/// [`write_event`](Self::write_event) call, producing exactly the layout
/// [`CaptureFile::parse`](super::CaptureFile::parse) reads.
///
/// # Example
///
/// ```
/// use gsdump::core::dump::{CaptureFile, DumpWriter, Event, RegisterSnapshot};
///
/// let mut out = Vec::new();
/// let mut writer = DumpWriter::new(&mut out, 0x1234, &[], &RegisterSnapshot::zeroed()).unwrap();
/// writer.write_event(&Event::VSync { field: 1 }).unwrap();
/// writer.finish().unwrap();
///
/// let capture = CaptureFile::parse(&out).unwrap();
/// assert_eq!(capture.events(), &[Event::VSync { field: 1 }]);
/// ```
pub struct DumpWriter<W: Write> {
    sink: W,
    events: usize,
    written: usize,
}

impl<W: Write> DumpWriter<W> {
    /// Start a dump by writing its header
    ///
    /// # Arguments
    ///
    /// * `sink` - Destination
    /// * `crc` - Game CRC
    /// * `state` - Frozen GS state blob
    /// * `registers` - Initial privileged registers
    pub fn new(mut sink: W, crc: i32, state: &[u8], registers: &RegisterSnapshot) -> Result<Self> {
        let state_len = i32::try_from(state.len()).map_err(|_| DumpError::CorruptHeader {
            offset: 4,
            length: state.len() as i64,
        })?;

        sink.write_all(&crc.to_le_bytes())?;
        sink.write_all(&state_len.to_le_bytes())?;
        sink.write_all(state)?;
        sink.write_all(registers.as_bytes())?;

        Ok(Self {
            sink,
            events: 0,
            written: 8 + state.len() + registers.as_bytes().len(),
        })
    }

    /// Append one event record
    pub fn write_event(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::Transfer { path, payload } => {
                // tag and path bytes precede the length field
                let length = transfer_length(payload.len(), self.events, self.written + 2)?;
                self.sink.write_all(&[event.kind() as u8, *path as u8])?;
                self.sink.write_all(&length.to_le_bytes())?;
                self.sink.write_all(payload)?;
            }
            Event::VSync { field } => self.sink.write_all(&[event.kind() as u8, *field])?,
            Event::ReadFifo { size } => {
                self.sink.write_all(&[event.kind() as u8])?;
                self.sink.write_all(size)?;
            }
            Event::Registers { payload } => {
                self.sink.write_all(&[event.kind() as u8])?;
                self.sink.write_all(payload.as_bytes())?;
            }
        }

        self.events += 1;
        self.written += 1 + event_body_len(event);
        Ok(())
    }

    /// Bytes written so far, header included
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    /// Number of events written so far
    pub fn event_count(&self) -> usize {
        self.events
    }

    /// Flush and hand back the sink
    pub fn finish(mut self) -> Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Length of a Transfer payload as stored on disk
///
/// `offset` is where the length field lands in the output.
pub(super) fn transfer_length(len: usize, event_index: usize, offset: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| DumpError::InvalidLength {
        event_index,
        offset,
        length: len as i64,
    })
}

fn event_body_len(event: &Event) -> usize {
    match event {
        Event::Transfer { payload, .. } => 1 + 4 + payload.len(),
        Event::VSync { .. } => 1,
        Event::ReadFifo { size } => size.len(),
        Event::Registers { payload } => payload.as_bytes().len(),
    }
}
