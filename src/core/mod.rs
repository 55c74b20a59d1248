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

//! Core dump handling components
//!
//! - Bit-field extraction over 64-bit words
//! - GIFtag and GIF register decoding
//! - Dump container reading and writing
//! - Statistics
//! - Replay against a GS backend
//! - Reader configuration

pub mod bits;
pub mod config;
pub mod dump;
pub mod error;
pub mod gif;
pub mod replay;
pub mod stats;

// Re-export commonly used types
pub use config::ReaderConfig;
pub use dump::{CaptureFile, Event, EventKind, GifPath, RegisterSnapshot};
pub use error::{DumpError, Result};
pub use gif::{decode_gif_packets, decode_gif_tag, DecodedGifTag, GifRegister, GifTag};
pub use replay::{GsBackend, NullBackend, Replayer};
pub use stats::DumpStats;
