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

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use gsdump::core::dump::CaptureFile;
use gsdump::core::error::{DumpError, Result};
use gsdump::core::gif::{DecodedGifTag, GifRegister, GifTag};
use gsdump::core::replay::{NullBackend, Replayer};
use gsdump::core::{DumpStats, ReaderConfig};
use log::{error, info};
use serde::Serialize;

/// PS2 GS dump inspector
#[derive(Parser)]
#[command(name = "gsdump")]
#[command(about = "Inspect, decode and replay PS2 GS dumps", long_about = None)]
struct Args {
    /// Reader limits as TOML (max_state_size, max_transfer_size)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the dump header and totals
    Info {
        /// Path to the GS dump (.gs)
        dump: PathBuf,
    },

    /// List every event
    List {
        dump: PathBuf,

        /// Print JSON instead of one line per event
        #[arg(long)]
        json: bool,
    },

    /// Decode the GIFtags of a Transfer event
    Decode {
        dump: PathBuf,

        /// Event index, as shown by `list`
        index: usize,

        #[arg(long)]
        json: bool,
    },

    /// Count events, bytes and registers
    Stats {
        dump: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Replay the dump into a counting backend
    Replay {
        dump: PathBuf,

        /// Number of frames to replay
        #[arg(short = 'f', long, default_value = "1")]
        frames: usize,
    },

    /// Write the first N frames to a new dump
    Trim {
        dump: PathBuf,

        /// Output path
        output: PathBuf,

        #[arg(short = 'f', long)]
        frames: usize,
    },
}

/// JSON view of one decoded GIFtag
#[derive(Serialize)]
struct TagView<'a> {
    offset: usize,
    tag: &'a GifTag,
    registers: &'a [GifRegister],
    image_quadwords: usize,
    skipped: Vec<String>,
}

impl<'a> From<&'a DecodedGifTag> for TagView<'a> {
    fn from(decoded: &'a DecodedGifTag) -> Self {
        Self {
            offset: decoded.offset,
            tag: &decoded.tag,
            registers: &decoded.registers,
            image_quadwords: decoded.image.len(),
            skipped: decoded
                .skipped
                .iter()
                .map(|skip| {
                    format!(
                        "loop {} slot {} {}: {}",
                        skip.loop_index, skip.slot, skip.descriptor, skip.reason
                    )
                })
                .collect(),
        }
    }
}

fn main() {
    // .env is optional; only report it when present but unreadable
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = ReaderConfig::resolve(args.config.as_deref())?;

    match args.command {
        Command::Info { dump } => info_command(&load(&dump, &config)?),
        Command::List { dump, json } => list_command(&load(&dump, &config)?, json),
        Command::Decode { dump, index, json } => decode_command(&load(&dump, &config)?, index, json),
        Command::Stats { dump, json } => stats_command(&load(&dump, &config)?, json),
        Command::Replay { dump, frames } => replay_command(&load(&dump, &config)?, frames),
        Command::Trim {
            dump,
            output,
            frames,
        } => trim_command(&load(&dump, &config)?, &output, frames),
    }
}

fn load(path: &Path, config: &ReaderConfig) -> Result<CaptureFile> {
    CaptureFile::load_with_config(path, config)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| DumpError::Io(e.into()))
}

fn info_command(capture: &CaptureFile) -> Result<()> {
    println!("CRC:           0x{:08X}", capture.crc());
    println!("State size:    {} bytes", capture.state().len());
    match capture.state_version() {
        Some(version) => println!("State version: {}", version),
        None => println!("State version: -"),
    }
    println!("Events:        {}", capture.len());
    println!("Frames:        {}", capture.frame_count());
    Ok(())
}

fn list_command(capture: &CaptureFile, json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(&capture.summaries())?);
        return Ok(());
    }

    for summary in capture.summaries() {
        println!("{}", summary);
    }
    Ok(())
}

fn decode_command(capture: &CaptureFile, index: usize, json: bool) -> Result<()> {
    let tags = capture.decode_transfer(index)?;

    if json {
        let views: Vec<TagView<'_>> = tags.iter().map(TagView::from).collect();
        println!("{}", to_json(&views)?);
        return Ok(());
    }

    for decoded in &tags {
        let tag = &decoded.tag;
        println!(
            "GIFtag @0x{:04X}: NLOOP={} EOP={} PRE={} FLG={:?} NREG={} PRIM={:?}",
            decoded.offset, tag.nloop, tag.eop, tag.pre, tag.flag, tag.nreg, tag.prim
        );
        for register in &decoded.registers {
            println!("    {:?}", register);
        }
        if !decoded.image.is_empty() {
            println!("    IMAGE: {} quadwords", decoded.image.len());
        }
        for skip in &decoded.skipped {
            println!(
                "    skipped loop {} slot {} ({}): {}",
                skip.loop_index, skip.slot, skip.descriptor, skip.reason
            );
        }
    }
    Ok(())
}

fn stats_command(capture: &CaptureFile, json: bool) -> Result<()> {
    let stats = DumpStats::collect(capture);
    if json {
        println!("{}", to_json(&stats)?);
    } else {
        println!("{}", stats);
    }
    Ok(())
}

fn replay_command(capture: &CaptureFile, frames: usize) -> Result<()> {
    let mut backend = NullBackend::new();
    let mut replayer = Replayer::new(capture);
    replayer.start(&mut backend)?;

    for _ in 0..frames {
        replayer.run_frame(&mut backend)?;
    }

    info!(
        "Replayed {} frames: {} transfers ({} bytes), {} FIFO reads, {} register writes, {} loops",
        replayer.frames(),
        backend.transfers,
        backend.transfer_bytes,
        backend.fifo_reads,
        backend.register_writes,
        replayer.loops()
    );
    Ok(())
}

fn trim_command(capture: &CaptureFile, output: &Path, frames: usize) -> Result<()> {
    let trimmed = capture.first_frames(frames);
    trimmed.save(output)?;
    info!(
        "Wrote {} events ({} frames) to {}",
        trimmed.len(),
        trimmed.frame_count(),
        output.display()
    );
    Ok(())
}
