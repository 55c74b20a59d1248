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

//! GS Backend Trait
//!
//! A backend is whatever consumes the replayed command stream: a rendering
//! plugin, a software rasterizer, or a counter used for testing. The
//! replayer only knows the backend through this trait.
//!
//! # Example
//!
//! ```
//! use gsdump::core::dump::{GifPath, RegisterSnapshot};
//! use gsdump::core::error::Result;
//! use gsdump::core::replay::GsBackend;
//!
//! #[derive(Default)]
//! struct FrameCounter {
//!     frames: usize,
//! }
//!
//! impl GsBackend for FrameCounter {
//!     fn reset(&mut self) {
//!         self.frames = 0;
//!     }
//!
//!     fn load_state(&mut self, _state: &[u8]) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn set_registers(&mut self, _registers: &RegisterSnapshot) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn transfer(&mut self, _path: GifPath, _payload: &[u8]) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn vsync(&mut self, _field: u8) -> Result<()> {
//!         self.frames += 1;
//!         Ok(())
//!     }
//!
//!     fn read_fifo(&mut self, _size: i32) -> Result<()> {
//!         Ok(())
//!     }
//! }
//! ```

use crate::core::dump::{GifPath, RegisterSnapshot};
use crate::core::error::{DumpError, Result};

/// Sink for a replayed GS command stream
///
/// Calls arrive in dump order. `reset`, `load_state` and `set_registers`
/// are issued once by [`Replayer::start`](super::Replayer::start); the
/// remaining methods mirror the dump's event records.
pub trait GsBackend {
    /// Return the backend to power-on state
    fn reset(&mut self);

    /// Restore a frozen GS state
    ///
    /// # Errors
    ///
    /// Returns `DumpError::StateTooOld` if the state was written by a
    /// format version the backend cannot read.
    fn load_state(&mut self, state: &[u8]) -> Result<()>;

    /// Overwrite the privileged register block
    fn set_registers(&mut self, registers: &RegisterSnapshot) -> Result<()>;

    /// Feed GIF data arriving on `path`
    fn transfer(&mut self, path: GifPath, payload: &[u8]) -> Result<()>;

    /// Vertical sync for interlace `field`
    fn vsync(&mut self, field: u8) -> Result<()>;

    /// Local-to-host FIFO read of `size` quadwords
    fn read_fifo(&mut self, size: i32) -> Result<()>;
}

/// Backend that only counts what it receives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullBackend {
    /// Newest state version accepted, `None` to accept anything
    pub supported_version: Option<u32>,

    pub resets: usize,
    pub states_loaded: usize,
    pub register_writes: usize,
    pub transfers: usize,
    pub transfer_bytes: u64,
    pub vsyncs: usize,
    pub fifo_reads: usize,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that rejects states newer than `version`
    pub fn with_supported_version(version: u32) -> Self {
        Self {
            supported_version: Some(version),
            ..Self::default()
        }
    }
}

impl GsBackend for NullBackend {
    fn reset(&mut self) {
        *self = Self {
            supported_version: self.supported_version,
            resets: self.resets + 1,
            ..Self::default()
        };
    }

    fn load_state(&mut self, state: &[u8]) -> Result<()> {
        if let (Some(supported), Some(bytes)) = (self.supported_version, state.get(..4)) {
            let mut word = [0u8; 4];
            word.copy_from_slice(bytes);
            let found = u32::from_le_bytes(word);
            if found > supported {
                return Err(DumpError::StateTooOld { found, supported });
            }
        }

        self.states_loaded += 1;
        Ok(())
    }

    fn set_registers(&mut self, _registers: &RegisterSnapshot) -> Result<()> {
        self.register_writes += 1;
        Ok(())
    }

    fn transfer(&mut self, _path: GifPath, payload: &[u8]) -> Result<()> {
        self.transfers += 1;
        self.transfer_bytes += payload.len() as u64;
        Ok(())
    }

    fn vsync(&mut self, _field: u8) -> Result<()> {
        self.vsyncs += 1;
        Ok(())
    }

    fn read_fifo(&mut self, _size: i32) -> Result<()> {
        self.fifo_reads += 1;
        Ok(())
    }
}
