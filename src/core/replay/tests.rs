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

use super::*;
use crate::core::dump::{GifPath, RegisterSnapshot};
use crate::core::error::DumpError;

fn transfer(len: usize) -> Event {
    Event::Transfer {
        path: GifPath::Path3,
        payload: vec![0u8; len],
    }
}

/// Two frames: T T V | T F R V
fn two_frames(state: Vec<u8>) -> CaptureFile {
    CaptureFile::new(
        0x2A,
        state,
        RegisterSnapshot::zeroed(),
        vec![
            transfer(16),
            transfer(32),
            Event::VSync { field: 0 },
            transfer(48),
            Event::read_fifo(8),
            Event::Registers {
                payload: RegisterSnapshot::zeroed(),
            },
            Event::VSync { field: 1 },
        ],
    )
}

#[test]
fn test_start_loads_state_and_registers() {
    let capture = two_frames(vec![6, 0, 0, 0]);
    let mut backend = NullBackend::new();
    let mut replayer = Replayer::new(&capture);

    replayer.start(&mut backend).unwrap();

    assert_eq!(backend.resets, 1);
    assert_eq!(backend.states_loaded, 1);
    assert_eq!(backend.register_writes, 1);
    assert_eq!(backend.transfers, 0);
    assert_eq!(replayer.position(), 0);
}

#[test]
fn test_run_frame_stops_after_vsync() {
    let capture = two_frames(Vec::new());
    let mut backend = NullBackend::new();
    let mut replayer = Replayer::new(&capture);
    replayer.start(&mut backend).unwrap();

    assert_eq!(replayer.run_frame(&mut backend).unwrap(), 3);
    assert_eq!(replayer.position(), 3);
    assert_eq!(backend.transfers, 2);
    assert_eq!(backend.transfer_bytes, 48);
    assert_eq!(backend.vsyncs, 1);

    assert_eq!(replayer.run_frame(&mut backend).unwrap(), 4);
    assert_eq!(backend.fifo_reads, 1);
    assert_eq!(backend.register_writes, 2);
    assert_eq!(backend.vsyncs, 2);
    assert_eq!(replayer.frames(), 2);
}

#[test]
fn test_run_frame_wraps_at_end() {
    let capture = two_frames(Vec::new());
    let mut backend = NullBackend::new();
    let mut replayer = Replayer::new(&capture);
    replayer.start(&mut backend).unwrap();

    replayer.run_frame(&mut backend).unwrap();
    replayer.run_frame(&mut backend).unwrap();
    assert_eq!(replayer.position(), 0);
    assert_eq!(replayer.loops(), 1);

    assert_eq!(replayer.run_frame(&mut backend).unwrap(), 3);
    assert_eq!(replayer.position(), 3);
    assert_eq!(backend.vsyncs, 3);
    assert_eq!(backend.states_loaded, 1);
}

#[test]
fn test_run_frame_without_vsync_does_one_pass() {
    let capture = CaptureFile::new(
        0,
        Vec::new(),
        RegisterSnapshot::zeroed(),
        vec![transfer(16), transfer(16)],
    );
    let mut backend = NullBackend::new();
    let mut replayer = Replayer::new(&capture);
    replayer.start(&mut backend).unwrap();

    assert_eq!(replayer.run_frame(&mut backend).unwrap(), 2);
    assert_eq!(backend.transfers, 2);
    assert_eq!(replayer.position(), 0);
}

#[test]
fn test_step_on_empty_dump() {
    let capture = CaptureFile::new(0, Vec::new(), RegisterSnapshot::zeroed(), Vec::new());
    let mut backend = NullBackend::new();
    let mut replayer = Replayer::new(&capture);
    replayer.start(&mut backend).unwrap();

    assert_eq!(replayer.step(&mut backend).unwrap(), None);
    assert_eq!(replayer.run_frame(&mut backend).unwrap(), 0);
}

#[test]
fn test_step_reports_kind() {
    let capture = two_frames(Vec::new());
    let mut backend = NullBackend::new();
    let mut replayer = Replayer::new(&capture);

    assert_eq!(replayer.step(&mut backend).unwrap(), Some(EventKind::Transfer));
    assert_eq!(replayer.step(&mut backend).unwrap(), Some(EventKind::Transfer));
    assert_eq!(replayer.step(&mut backend).unwrap(), Some(EventKind::VSync));
}

#[test]
fn test_state_too_old_propagates_from_start() {
    let capture = two_frames(vec![9, 0, 0, 0]);
    let mut backend = NullBackend::with_supported_version(6);
    let mut replayer = Replayer::new(&capture);

    match replayer.start(&mut backend) {
        Err(DumpError::StateTooOld { found, supported }) => {
            assert_eq!(found, 9);
            assert_eq!(supported, 6);
        }
        other => panic!("expected StateTooOld, got {:?}", other),
    }
    assert_eq!(backend.states_loaded, 0);
    assert_eq!(backend.register_writes, 0);
}

#[test]
fn test_supported_version_accepts_older_state() {
    let capture = two_frames(vec![6, 0, 0, 0]);
    let mut backend = NullBackend::with_supported_version(6);
    Replayer::new(&capture).start(&mut backend).unwrap();
    assert_eq!(backend.states_loaded, 1);
}

#[test]
fn test_restart_resets_backend_counters() {
    let capture = two_frames(Vec::new());
    let mut backend = NullBackend::new();
    let mut replayer = Replayer::new(&capture);

    replayer.start(&mut backend).unwrap();
    replayer.run_frame(&mut backend).unwrap();
    replayer.start(&mut backend).unwrap();

    assert_eq!(backend.resets, 2);
    assert_eq!(backend.transfers, 0);
    assert_eq!(backend.vsyncs, 0);
    assert_eq!(replayer.position(), 0);
}

#[test]
fn test_dyn_backend() {
    let capture = two_frames(Vec::new());
    let mut backend: Box<dyn GsBackend> = Box::new(NullBackend::new());
    let mut replayer = Replayer::new(&capture);

    replayer.start(backend.as_mut()).unwrap();
    assert_eq!(replayer.run_frame(backend.as_mut()).unwrap(), 3);
}
