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

//! PS2 GS dump reader and GIFtag decoder
//!
//! This library reads GS dump captures, decodes the GIF command stream held
//! in their transfer events, and replays them against a pluggable backend.
//!
//! # Example
//!
//! ```
//! use gsdump::core::dump::{CaptureFile, Event, RegisterSnapshot};
//!
//! let capture = CaptureFile::new(0x1234, Vec::new(), RegisterSnapshot::zeroed(), vec![
//!     Event::VSync { field: 1 },
//! ]);
//! let bytes = capture.to_bytes().unwrap();
//!
//! let loaded = CaptureFile::parse(&bytes).unwrap();
//! assert_eq!(loaded.crc(), 0x1234);
//! assert_eq!(loaded.frame_count(), 1);
//! ```

pub mod core;
