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

use super::{CaptureFile, Event, EventKind, GifPath, RegisterSnapshot, REGISTER_SNAPSHOT_SIZE};
use crate::core::config::ReaderConfig;
use crate::core::error::{DumpError, Result};

/// Forward-only cursor over the dump bytes
///
/// Every read states how many bytes it needs up front, so a short read
/// reports the exact offset and shortfall.
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    fn take(&mut self, len: usize, event_index: Option<usize>) -> Result<&'a [u8]> {
        let available = self.data.len() - self.offset;
        if len > available {
            return Err(DumpError::TruncatedStream {
                event_index,
                offset: self.offset,
                expected: len,
                available,
            });
        }

        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_u8(&mut self, event_index: Option<usize>) -> Result<u8> {
        Ok(self.take(1, event_index)?[0])
    }

    fn read_raw4(&mut self, event_index: Option<usize>) -> Result<[u8; 4]> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4, event_index)?);
        Ok(raw)
    }

    fn read_i32(&mut self, event_index: Option<usize>) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_raw4(event_index)?))
    }
}

/// Parse a complete dump
///
/// # Arguments
///
/// * `data` - Whole file contents, starting at the CRC
/// * `config` - Size limits for the state blob and transfer payloads
///
/// # Returns
///
/// - `Ok(CaptureFile)` once the event stream ends cleanly at end of input
/// - `Err(DumpError)` on the first structural problem
pub(super) fn parse(data: &[u8], config: &ReaderConfig) -> Result<CaptureFile> {
    let mut reader = ByteReader::new(data);

    let crc = reader.read_i32(None)?;

    let length_offset = reader.offset();
    let state_len = reader.read_i32(None)?;
    if state_len < 0 || state_len as usize > config.max_state_size {
        return Err(DumpError::CorruptHeader {
            offset: length_offset,
            length: state_len as i64,
        });
    }
    let state = reader.take(state_len as usize, None)?.to_vec();

    let registers = read_snapshot(&mut reader, None)?;

    log::debug!(
        "GS dump header: CRC=0x{:08X}, state {} bytes, events start at 0x{:X}",
        crc,
        state.len(),
        reader.offset()
    );

    let mut events = Vec::new();
    while !reader.is_empty() {
        let index = events.len();
        let tag_offset = reader.offset();
        let tag = reader.read_u8(Some(index))?;

        let event = match EventKind::from_tag(tag) {
            Some(EventKind::Transfer) => read_transfer(&mut reader, index, config)?,
            Some(EventKind::VSync) => Event::VSync {
                field: reader.read_u8(Some(index))?,
            },
            Some(EventKind::ReadFifo) => Event::ReadFifo {
                size: reader.read_raw4(Some(index))?,
            },
            Some(EventKind::Registers) => Event::Registers {
                payload: read_snapshot(&mut reader, Some(index))?,
            },
            None => {
                return Err(DumpError::UnknownEventTag {
                    tag,
                    event_index: index,
                    offset: tag_offset,
                })
            }
        };

        log::trace!(
            "Event {} at 0x{:X}: {} ({} bytes)",
            index,
            tag_offset,
            event.kind(),
            event.payload_len()
        );
        events.push(event);
    }

    let capture = CaptureFile::new(crc, state, registers, events);
    log::info!(
        "Loaded GS dump: CRC=0x{:08X}, {} events, {} frames",
        capture.crc(),
        capture.len(),
        capture.frame_count()
    );

    Ok(capture)
}

fn read_transfer(reader: &mut ByteReader<'_>, index: usize, config: &ReaderConfig) -> Result<Event> {
    let path_offset = reader.offset();
    let path_byte = reader.read_u8(Some(index))?;
    let path = GifPath::from_u8(path_byte).ok_or(DumpError::UnknownTransferPath {
        path: path_byte,
        event_index: index,
        offset: path_offset,
    })?;

    let length_offset = reader.offset();
    let length = reader.read_i32(Some(index))?;
    if length < 0 || length as usize > config.max_transfer_size {
        return Err(DumpError::InvalidLength {
            event_index: index,
            offset: length_offset,
            length: length as i64,
        });
    }

    let payload = reader.take(length as usize, Some(index))?.to_vec();
    Ok(Event::Transfer { path, payload })
}

fn read_snapshot(reader: &mut ByteReader<'_>, event_index: Option<usize>) -> Result<RegisterSnapshot> {
    let offset = reader.offset();
    let bytes = reader.take(REGISTER_SNAPSHOT_SIZE, event_index)?;
    RegisterSnapshot::from_slice(bytes).ok_or(DumpError::TruncatedStream {
        event_index,
        offset,
        expected: REGISTER_SNAPSHOT_SIZE,
        available: bytes.len(),
    })
}
