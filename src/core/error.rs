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

/// Dump and decoder error types
use thiserror::Error;

use super::gif::RegisterDescriptor;

/// Result type for dump operations
pub type Result<T> = std::result::Result<T, DumpError>;

/// Main error type for dump loading, GIFtag decoding and replay
#[derive(Error, Debug)]
pub enum DumpError {
    #[error(
        "Truncated stream at offset 0x{offset:X}{}: expected {expected} bytes, {available} available",
        event_suffix(.event_index)
    )]
    TruncatedStream {
        /// Index of the event being read, `None` while reading the header
        event_index: Option<usize>,
        offset: usize,
        expected: usize,
        available: usize,
    },

    #[error("Corrupt dump header at offset 0x{offset:X}: implausible state length {length}")]
    CorruptHeader { offset: usize, length: i64 },

    #[error("Unknown event tag {tag} at offset 0x{offset:X} (event {event_index})")]
    UnknownEventTag {
        tag: u8,
        event_index: usize,
        offset: usize,
    },

    #[error("Unknown transfer path {path} at offset 0x{offset:X} (event {event_index})")]
    UnknownTransferPath {
        path: u8,
        event_index: usize,
        offset: usize,
    },

    #[error("Invalid transfer length {length} at offset 0x{offset:X} (event {event_index})")]
    InvalidLength {
        event_index: usize,
        offset: usize,
        length: i64,
    },

    #[error(
        "Malformed GIFtag at payload offset 0x{offset:X}{}: {reason}",
        event_suffix(.event_index)
    )]
    MalformedGifTag {
        /// Owning Transfer event, filled in when decoding through a `CaptureFile`
        event_index: Option<usize>,
        offset: usize,
        reason: String,
    },

    #[error("Unimplemented GIF register: {descriptor:?}")]
    UnimplementedRegister { descriptor: RegisterDescriptor },

    #[error("A+D register redirects to A+D")]
    NestedAddressData,

    #[error("State snapshot version {found} is incompatible (backend supports up to {supported})")]
    StateTooOld { found: u32, supported: u32 },

    #[error("Event {index} is not a Transfer event")]
    NotATransfer { index: usize },

    #[error("Event index {index} out of range ({count} events)")]
    EventOutOfRange { index: usize, count: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DumpError {
    /// Attach the owning event index to a GIFtag error
    ///
    /// Decoding a raw payload has no notion of which event it came from;
    /// callers that do know stamp it in here. Other variants pass through.
    pub fn with_event_index(self, index: usize) -> Self {
        match self {
            DumpError::MalformedGifTag { offset, reason, .. } => DumpError::MalformedGifTag {
                event_index: Some(index),
                offset,
                reason,
            },
            other => other,
        }
    }

    /// Whether the error ends a whole-file parse
    ///
    /// Register-level failures only cost the single register being decoded.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DumpError::UnimplementedRegister { .. }
                | DumpError::NestedAddressData
        )
    }
}

fn event_suffix(event_index: &Option<usize>) -> String {
    match event_index {
        Some(index) => format!(" (event {})", index),
        None => String::new(),
    }
}
