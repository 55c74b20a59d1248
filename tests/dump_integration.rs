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

//! End-to-end tests: dump files on disk through decoding, stats and replay

mod common;

use common::assertions::{assert_event_kinds, assert_f32_eq};
use common::fixtures::{gif_tag, quadword, sprite_packet, DumpBuilder};
use gsdump::core::dump::{CaptureFile, Event, EventKind, GifPath};
use gsdump::core::error::{DumpError, Result};
use gsdump::core::gif::{GifRegister, PrimitiveType, RegisterDescriptor};
use gsdump::core::replay::{NullBackend, Replayer};
use gsdump::core::{DumpStats, ReaderConfig};

fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new()
        .prefix("gsdump")
        .suffix(".gs")
        .tempfile()
        .expect("Failed to create temp dump");
    std::fs::write(file.path(), bytes).expect("Failed to write temp dump");
    file
}

#[test]
fn test_minimal_dump_from_disk() -> Result<()> {
    let file = write_temp(&DumpBuilder::new(0x1234).vsync(1).build());

    let capture = CaptureFile::load(file.path())?;
    assert_eq!(capture.crc(), 0x1234);
    assert!(capture.state().is_empty());
    assert!(capture.registers().as_bytes().iter().all(|&b| b == 0));
    assert_eq!(capture.events(), &[Event::VSync { field: 1 }]);
    Ok(())
}

#[test]
fn test_unknown_tag_fails_whole_load() {
    let file = write_temp(&DumpBuilder::new(0).vsync(0).raw(&[99]).build());

    match CaptureFile::load(file.path()) {
        Err(DumpError::UnknownEventTag { tag, event_index, .. }) => {
            assert_eq!(tag, 99);
            assert_eq!(event_index, 1);
        }
        other => panic!("expected UnknownEventTag, got {:?}", other.map(|c| c.len())),
    }
}

#[test]
fn test_mixed_stream() -> Result<()> {
    let bytes = DumpBuilder::with_state(0x0D15EA5E_u32 as i32, &[7, 0, 0, 0, 0xAB, 0xCD])
        .transfer(2, &sprite_packet())
        .read_fifo(16)
        .registers(0x11)
        .vsync(0)
        .transfer(3, &[])
        .vsync(1)
        .build();

    let capture = CaptureFile::parse(&bytes)?;
    assert_event_kinds(
        &capture,
        &[
            EventKind::Transfer,
            EventKind::ReadFifo,
            EventKind::Registers,
            EventKind::VSync,
            EventKind::Transfer,
            EventKind::VSync,
        ],
    );
    assert_eq!(capture.state_version(), Some(7));
    assert_eq!(capture.frame_count(), 2);
    assert_eq!(capture.event(1).and_then(|e| e.fifo_size()), Some(16));

    match capture.event(4) {
        Some(Event::Transfer { path, payload }) => {
            assert_eq!(*path, GifPath::Path1New);
            assert!(payload.is_empty());
        }
        other => panic!("unexpected event {:?}", other),
    }
    Ok(())
}

#[test]
fn test_decode_sprite_packet() -> Result<()> {
    let capture = CaptureFile::parse(&DumpBuilder::new(0).transfer(2, &sprite_packet()).build())?;
    let tags = capture.decode_transfer(0)?;
    assert_eq!(tags.len(), 1);

    let decoded = &tags[0];
    assert!(decoded.tag.eop);
    assert!(decoded.tag.pre);
    assert_eq!(decoded.tag.prim.primitive, PrimitiveType::Sprite);
    assert_eq!(decoded.consumed, 16 + 3 * 16);
    assert_eq!(decoded.registers.len(), 3);
    assert!(decoded.skipped.is_empty());

    match &decoded.registers[0] {
        GifRegister::Rgbaq(c) => {
            assert_eq!((c.r, c.g, c.b, c.a), (0x80, 0x40, 0x20, 0xFF));
            assert_f32_eq(c.q, 1.0);
        }
        other => panic!("expected RGBAQ, got {:?}", other),
    }
    match (&decoded.registers[1], &decoded.registers[2]) {
        (GifRegister::Xyz(a), GifRegister::Xyz(b)) => {
            assert_f32_eq(a.x, 10.0);
            assert_f32_eq(a.y, 20.0);
            assert_eq!(a.z, 0x10);
            assert_f32_eq(b.x, 30.0);
            assert_f32_eq(b.y, 40.0);
            assert!(!a.adc && !b.adc);
        }
        other => panic!("expected two XYZ2, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_decode_multiple_packets_with_address_data() -> Result<()> {
    // A+D: TEX0_1 (0x06) then 0x3F, whose low nibble is NOP
    let mut payload = gif_tag(2, false, 0, &[0xE]);
    payload.extend_from_slice(&quadword(0x1234, 0x06));
    payload.extend_from_slice(&quadword(0, 0x3F));
    payload.extend(sprite_packet());

    let capture = CaptureFile::parse(&DumpBuilder::new(0).transfer(1, &payload).build())?;
    let tags = capture.decode_transfer(0)?;
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[1].offset, 48);

    let first = &tags[0];
    assert!(first.skipped.is_empty());
    assert_eq!(first.registers.len(), 2);
    assert_eq!(first.registers[0].descriptor(), RegisterDescriptor::Ad);
    assert_eq!(first.registers[0].resolved().descriptor(), RegisterDescriptor::Tex0_1);
    assert_eq!(first.registers[1].resolved().descriptor(), RegisterDescriptor::Nop);
    Ok(())
}

#[test]
fn test_truncated_gif_tag_names_event() -> Result<()> {
    // NLOOP=2 NREG=1 promises 32 data bytes, only 16 follow
    let mut payload = gif_tag(2, true, 0, &[0x1]);
    payload.extend_from_slice(&quadword(0, 0));

    let capture = CaptureFile::parse(&DumpBuilder::new(0).vsync(0).transfer(2, &payload).build())?;
    match capture.decode_transfer(1) {
        Err(DumpError::MalformedGifTag { event_index, offset, .. }) => {
            assert_eq!(event_index, Some(1));
            assert_eq!(offset, 0);
        }
        other => panic!("expected MalformedGifTag, got {:?}", other.map(|t| t.len())),
    }

    let stats = DumpStats::collect(&capture);
    assert_eq!(stats.malformed_tags, 1);
    Ok(())
}

#[test]
fn test_stats_over_dump() -> Result<()> {
    let capture = CaptureFile::parse(
        &DumpBuilder::new(0)
            .transfer(2, &sprite_packet())
            .vsync(0)
            .transfer(2, &sprite_packet())
            .vsync(1)
            .build(),
    )?;

    let stats = DumpStats::collect(&capture);
    assert_eq!(stats.transfers, 2);
    assert_eq!(stats.frames, 2);
    assert_eq!(stats.registers[&RegisterDescriptor::Rgbaq], 2);
    assert_eq!(stats.registers[&RegisterDescriptor::Xyz2], 4);
    assert_eq!(stats.bytes_per_path[&GifPath::Path3], 2 * 64);

    let json = serde_json::to_string(&stats).expect("stats serialize");
    assert!(json.contains("\"Path3\""));
    Ok(())
}

#[test]
fn test_trim_and_reload() -> Result<()> {
    let capture = CaptureFile::parse(
        &DumpBuilder::with_state(5, &[1, 0, 0, 0])
            .transfer(2, &sprite_packet())
            .vsync(0)
            .transfer(2, &sprite_packet())
            .vsync(1)
            .transfer(2, &sprite_packet())
            .build(),
    )?;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let out = dir.path().join("trimmed.gs");
    capture.first_frames(1).save(&out)?;

    let trimmed = CaptureFile::load(&out)?;
    assert_eq!(trimmed.crc(), 5);
    assert_eq!(trimmed.state(), capture.state());
    assert_event_kinds(&trimmed, &[EventKind::Transfer, EventKind::VSync]);
    Ok(())
}

#[test]
fn test_round_trip_preserves_bytes() -> Result<()> {
    let bytes = DumpBuilder::with_state(-7, &[9; 33])
        .transfer(0, &sprite_packet())
        .read_fifo(-1)
        .registers(0xEE)
        .vsync(1)
        .build();

    let capture = CaptureFile::parse(&bytes)?;
    assert_eq!(capture.to_bytes()?, bytes);
    Ok(())
}

#[test]
fn test_config_limits_apply_to_files() {
    let bytes = DumpBuilder::new(0).transfer(2, &sprite_packet()).build();
    let file = write_temp(&bytes);

    let config = ReaderConfig::parse("max_transfer_size = 32\n").expect("valid config");
    assert!(matches!(
        CaptureFile::load_with_config(file.path(), &config),
        Err(DumpError::InvalidLength { length: 64, .. })
    ));
    assert!(CaptureFile::load(file.path()).is_ok());
}

#[test]
fn test_replay_loop() -> Result<()> {
    let capture = CaptureFile::parse(
        &DumpBuilder::with_state(0, &[3, 0, 0, 0])
            .transfer(2, &sprite_packet())
            .vsync(0)
            .registers(0)
            .vsync(1)
            .build(),
    )?;

    let mut backend = NullBackend::with_supported_version(3);
    let mut replayer = Replayer::new(&capture);
    replayer.start(&mut backend)?;
    for _ in 0..5 {
        replayer.run_frame(&mut backend)?;
    }

    assert_eq!(backend.vsyncs, 5);
    assert_eq!(backend.transfers, 3);
    assert_eq!(replayer.loops(), 2);
    assert_eq!(replayer.position(), 2);
    Ok(())
}
