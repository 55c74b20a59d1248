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

//! Custom assertions for dump tests

use gsdump::core::dump::{CaptureFile, EventKind};

/// Assert the dump's events have exactly these kinds, in order
#[allow(dead_code)]
pub fn assert_event_kinds(capture: &CaptureFile, expected: &[EventKind]) {
    let actual: Vec<EventKind> = capture.events().iter().map(|event| event.kind()).collect();
    assert_eq!(actual, expected, "Event kind mismatch");
}

/// Assert two floats are equal to within one ULP-ish tolerance
#[allow(dead_code)]
pub fn assert_f32_eq(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() <= f32::EPSILON * expected.abs().max(1.0),
        "Float mismatch: expected {}, got {}",
        expected,
        actual
    );
}
