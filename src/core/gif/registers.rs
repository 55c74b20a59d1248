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

//! GS register values and their unpackers
//!
//! Each register kind has one unpacker that understands both the PACKED
//! quadword layout and the raw 64-bit register layout used by REGLIST and
//! A+D. Unpackers are looked up through `UNPACKERS`, a static table
//! indexed by descriptor.
//!
//! PACKED layouts (quadword split into `low` and `high` halves):
//!
//! ```text
//! RGBAQ  R=low[0:8)  G=low[32:40)  B=high[0:8)  A=high[32:40)
//! ST     S=low[0:32) T=low[32:64)  Q=high[0:32)
//! UV     U=low[0:14) V=low[32:46)
//! XYZ2   X=low[0:16) Y=low[32:48)  Z=high[4:28)               ADC=high[46]
//! XYZF2  X=low[0:16) Y=low[32:48)  Z=high[4:28) F=high[36:44) ADC=high[47]
//! FOG    F=high[36:44)
//! ```

use bitflags::bitflags;
use serde::Serialize;

use super::RegisterDescriptor;
use crate::core::bits::{bit, bits, fixed4, float_bits};
use crate::core::error::{DumpError, Result};

/// One 128-bit unit of GIF data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Quadword {
    pub low: u64,
    pub high: u64,
}

impl Quadword {
    /// Split 16 little-endian bytes into their two 64-bit halves
    pub(crate) fn from_le_bytes(bytes: [u8; 16]) -> Self {
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];
        low.copy_from_slice(&bytes[0..8]);
        high.copy_from_slice(&bytes[8..16]);
        Self {
            low: u64::from_le_bytes(low),
            high: u64::from_le_bytes(high),
        }
    }
}

/// How a quadword should be interpreted by an unpacker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Packing {
    /// PACKED-mode quadword layout
    Packed,
    /// Raw 64-bit register value in `low`
    Unpacked,
}

/// State shared by the unpackers of a single GIFtag
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnpackState {
    /// Q latched by a packed ST, consumed by the next packed RGBAQ
    pub q: f32,
    /// A+D redirection depth
    depth: u8,
}

impl UnpackState {
    /// Fresh per-tag state; the GS resets Q to 1.0 at each tag
    pub(crate) fn new() -> Self {
        Self { q: 1.0, depth: 0 }
    }
}

/// GS primitive type (PRIM bits 0-2)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimitiveType {
    Point = 0,
    Line = 1,
    LineStrip = 2,
    Triangle = 3,
    TriangleStrip = 4,
    TriangleFan = 5,
    Sprite = 6,
    /// Reserved encoding, kept so no value is lost
    Invalid = 7,
}

impl PrimitiveType {
    fn from_bits(value: u64) -> Self {
        match value & 0x7 {
            0 => PrimitiveType::Point,
            1 => PrimitiveType::Line,
            2 => PrimitiveType::LineStrip,
            3 => PrimitiveType::Triangle,
            4 => PrimitiveType::TriangleStrip,
            5 => PrimitiveType::TriangleFan,
            6 => PrimitiveType::Sprite,
            _ => PrimitiveType::Invalid,
        }
    }
}

bitflags! {
    /// PRIM attribute bits, at their register bit positions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    #[serde(transparent)]
    pub struct PrimFlags: u16 {
        /// Gouraud shading
        const IIP = 1 << 3;
        /// Texture mapping
        const TME = 1 << 4;
        /// Fogging
        const FGE = 1 << 5;
        /// Alpha blending
        const ABE = 1 << 6;
        /// Antialiasing
        const AA1 = 1 << 7;
        /// UV (rather than STQ) texture coordinates
        const FST = 1 << 8;
        /// Drawing context 2
        const CTXT = 1 << 9;
        /// Fixed fragment value control
        const FIX = 1 << 10;
    }
}

/// PRIM register: primitive type and drawing attributes
///
/// The same eleven bits appear in the GIFtag header and in the PRIM
/// register itself.
///
/// # Examples
///
/// ```
/// use gsdump::core::gif::{Prim, PrimitiveType};
///
/// // Gouraud-shaded triangle strip
/// let prim = Prim::from_raw(0b000_0000_1100);
/// assert_eq!(prim.primitive, PrimitiveType::TriangleStrip);
/// assert!(prim.iip());
/// assert!(!prim.tme());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Prim {
    pub primitive: PrimitiveType,
    pub flags: PrimFlags,
}

impl Prim {
    /// Decode the eleven PRIM bits held in the low bits of `raw`
    pub fn from_raw(raw: u64) -> Self {
        Self {
            primitive: PrimitiveType::from_bits(bits(raw, 0, 3)),
            flags: PrimFlags::from_bits_truncate(bits(raw, 0, 11) as u16),
        }
    }

    /// Re-encode to the eleven-bit register value
    pub fn to_raw(&self) -> u16 {
        self.primitive as u16 | self.flags.bits()
    }

    pub fn iip(&self) -> bool {
        self.flags.contains(PrimFlags::IIP)
    }

    pub fn tme(&self) -> bool {
        self.flags.contains(PrimFlags::TME)
    }

    pub fn fge(&self) -> bool {
        self.flags.contains(PrimFlags::FGE)
    }

    pub fn abe(&self) -> bool {
        self.flags.contains(PrimFlags::ABE)
    }

    pub fn aa1(&self) -> bool {
        self.flags.contains(PrimFlags::AA1)
    }

    pub fn fst(&self) -> bool {
        self.flags.contains(PrimFlags::FST)
    }

    /// Drawing context (0 or 1)
    pub fn ctxt(&self) -> u8 {
        self.flags.contains(PrimFlags::CTXT) as u8
    }

    pub fn fix(&self) -> bool {
        self.flags.contains(PrimFlags::FIX)
    }
}

/// RGBAQ register: vertex color and texture Q
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgbaq {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    pub q: f32,
}

/// ST register: perspective texture coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct St {
    pub s: f32,
    pub t: f32,
    pub q: f32,
}

/// UV register: texel coordinates in 1/16 texel units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Uv {
    pub u: f32,
    pub v: f32,
}

/// XYZ2/XYZ3 register: vertex position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Xyz {
    pub x: f32,
    pub y: f32,
    pub z: u32,
    /// Vertex is queued without drawing kick (XYZ3 semantics)
    pub adc: bool,
}

/// XYZF2/XYZF3 register: vertex position with fog coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Xyzf {
    pub x: f32,
    pub y: f32,
    pub z: u32,
    pub f: u8,
    /// Vertex is queued without drawing kick (XYZF3 semantics)
    pub adc: bool,
}

/// FOG register: per-vertex fog coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fog {
    pub f: u8,
}

/// TEX0_1/TEX0_2 register: texture buffer and CLUT setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tex0 {
    /// Drawing context the register belongs to (0 or 1)
    pub context: u8,
    pub tbp0: u16,
    pub tbw: u8,
    pub psm: u8,
    pub tw: u8,
    pub th: u8,
    pub tcc: bool,
    pub tfx: u8,
    pub cbp: u16,
    pub cpsm: u8,
    pub csm: bool,
    pub csa: u8,
    pub cld: u8,
}

/// CLAMP_1/CLAMP_2 register: texture wrap modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Clamp {
    /// Drawing context the register belongs to (0 or 1)
    pub context: u8,
    pub wms: u8,
    pub wmt: u8,
    pub minu: u16,
    pub maxu: u16,
    pub minv: u16,
    pub maxv: u16,
}

/// A decoded GIF register
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GifRegister {
    Prim(Prim),
    Rgbaq(Rgbaq),
    St(St),
    Uv(Uv),
    Xyz(Xyz),
    Xyzf(Xyzf),
    Tex0(Tex0),
    Clamp(Clamp),
    Fog(Fog),
    /// A+D write, carrying the register it resolved to
    AddressData {
        /// Raw low byte of the high word
        address: u8,
        register: Box<GifRegister>,
    },
    Nop,
}

impl GifRegister {
    /// Descriptor this value decodes
    ///
    /// Vertex registers report their kick variant (XYZ3/XYZF3) when ADC is
    /// set.
    pub fn descriptor(&self) -> RegisterDescriptor {
        match self {
            GifRegister::Prim(_) => RegisterDescriptor::Prim,
            GifRegister::Rgbaq(_) => RegisterDescriptor::Rgbaq,
            GifRegister::St(_) => RegisterDescriptor::St,
            GifRegister::Uv(_) => RegisterDescriptor::Uv,
            GifRegister::Xyz(xyz) if xyz.adc => RegisterDescriptor::Xyz3,
            GifRegister::Xyz(_) => RegisterDescriptor::Xyz2,
            GifRegister::Xyzf(xyzf) if xyzf.adc => RegisterDescriptor::Xyzf3,
            GifRegister::Xyzf(_) => RegisterDescriptor::Xyzf2,
            GifRegister::Tex0(tex0) if tex0.context == 1 => RegisterDescriptor::Tex0_2,
            GifRegister::Tex0(_) => RegisterDescriptor::Tex0_1,
            GifRegister::Clamp(clamp) if clamp.context == 1 => RegisterDescriptor::Clamp2,
            GifRegister::Clamp(_) => RegisterDescriptor::Clamp1,
            GifRegister::Fog(_) => RegisterDescriptor::Fog,
            GifRegister::AddressData { .. } => RegisterDescriptor::Ad,
            GifRegister::Nop => RegisterDescriptor::Nop,
        }
    }

    /// The register actually written, looking through A+D
    pub fn resolved(&self) -> &GifRegister {
        match self {
            GifRegister::AddressData { register, .. } => register,
            other => other,
        }
    }
}

/// Register unpacker signature
pub(crate) type Unpacker =
    fn(RegisterDescriptor, Quadword, Packing, &mut UnpackState) -> Result<GifRegister>;

/// Unpackers indexed by descriptor value
///
/// Built once at compile time; RESERVED falls through to
/// `unpack_unimplemented`.
pub(crate) static UNPACKERS: [Unpacker; 16] = [
    unpack_prim,          // 0x0 PRIM
    unpack_rgbaq,         // 0x1 RGBAQ
    unpack_st,            // 0x2 ST
    unpack_uv,            // 0x3 UV
    unpack_xyzf,          // 0x4 XYZF2
    unpack_xyz,           // 0x5 XYZ2
    unpack_tex0,          // 0x6 TEX0_1
    unpack_tex0,          // 0x7 TEX0_2
    unpack_clamp,         // 0x8 CLAMP_1
    unpack_clamp,         // 0x9 CLAMP_2
    unpack_fog,           // 0xA FOG
    unpack_unimplemented, // 0xB RESERVED
    unpack_xyzf,          // 0xC XYZF3
    unpack_xyz,           // 0xD XYZ3
    unpack_address_data,  // 0xE A+D
    unpack_nop,           // 0xF NOP
];

/// Dispatch a quadword to the unpacker for `descriptor`
pub(crate) fn unpack(
    descriptor: RegisterDescriptor,
    qw: Quadword,
    packing: Packing,
    state: &mut UnpackState,
) -> Result<GifRegister> {
    UNPACKERS[descriptor as usize](descriptor, qw, packing, state)
}

fn unpack_prim(
    _: RegisterDescriptor,
    qw: Quadword,
    _: Packing,
    _: &mut UnpackState,
) -> Result<GifRegister> {
    Ok(GifRegister::Prim(Prim::from_raw(qw.low)))
}

fn unpack_rgbaq(
    _: RegisterDescriptor,
    qw: Quadword,
    packing: Packing,
    state: &mut UnpackState,
) -> Result<GifRegister> {
    let rgbaq = match packing {
        Packing::Packed => Rgbaq {
            r: bits(qw.low, 0, 8) as u8,
            g: bits(qw.low, 32, 8) as u8,
            b: bits(qw.high, 0, 8) as u8,
            a: bits(qw.high, 32, 8) as u8,
            q: state.q,
        },
        Packing::Unpacked => Rgbaq {
            r: bits(qw.low, 0, 8) as u8,
            g: bits(qw.low, 8, 8) as u8,
            b: bits(qw.low, 16, 8) as u8,
            a: bits(qw.low, 24, 8) as u8,
            q: float_bits(qw.low, 32),
        },
    };
    Ok(GifRegister::Rgbaq(rgbaq))
}

fn unpack_st(
    _: RegisterDescriptor,
    qw: Quadword,
    packing: Packing,
    state: &mut UnpackState,
) -> Result<GifRegister> {
    let st = St {
        s: float_bits(qw.low, 0),
        t: float_bits(qw.low, 32),
        q: float_bits(qw.high, 0),
    };
    if packing == Packing::Packed {
        state.q = st.q;
    }
    Ok(GifRegister::St(st))
}

fn unpack_uv(
    _: RegisterDescriptor,
    qw: Quadword,
    packing: Packing,
    _: &mut UnpackState,
) -> Result<GifRegister> {
    let v_offset = match packing {
        Packing::Packed => 32,
        Packing::Unpacked => 16,
    };
    Ok(GifRegister::Uv(Uv {
        u: fixed4(qw.low, 0, 14),
        v: fixed4(qw.low, v_offset, 14),
    }))
}

fn unpack_xyz(
    descriptor: RegisterDescriptor,
    qw: Quadword,
    packing: Packing,
    _: &mut UnpackState,
) -> Result<GifRegister> {
    let xyz = match packing {
        Packing::Packed => Xyz {
            x: fixed4(qw.low, 0, 16),
            y: fixed4(qw.low, 32, 16),
            z: bits(qw.high, 4, 24) as u32,
            adc: bit(qw.high, 46),
        },
        Packing::Unpacked => Xyz {
            x: fixed4(qw.low, 0, 16),
            y: fixed4(qw.low, 16, 16),
            z: bits(qw.low, 32, 32) as u32,
            adc: descriptor == RegisterDescriptor::Xyz3,
        },
    };
    Ok(GifRegister::Xyz(xyz))
}

fn unpack_xyzf(
    descriptor: RegisterDescriptor,
    qw: Quadword,
    packing: Packing,
    _: &mut UnpackState,
) -> Result<GifRegister> {
    let xyzf = match packing {
        Packing::Packed => Xyzf {
            x: fixed4(qw.low, 0, 16),
            y: fixed4(qw.low, 32, 16),
            z: bits(qw.high, 4, 24) as u32,
            f: bits(qw.high, 36, 8) as u8,
            adc: bit(qw.high, 47),
        },
        Packing::Unpacked => Xyzf {
            x: fixed4(qw.low, 0, 16),
            y: fixed4(qw.low, 16, 16),
            z: bits(qw.low, 32, 24) as u32,
            f: bits(qw.low, 56, 8) as u8,
            adc: descriptor == RegisterDescriptor::Xyzf3,
        },
    };
    Ok(GifRegister::Xyzf(xyzf))
}

fn unpack_fog(
    _: RegisterDescriptor,
    qw: Quadword,
    packing: Packing,
    _: &mut UnpackState,
) -> Result<GifRegister> {
    let f = match packing {
        Packing::Packed => bits(qw.high, 36, 8),
        Packing::Unpacked => bits(qw.low, 56, 8),
    };
    Ok(GifRegister::Fog(Fog { f: f as u8 }))
}

fn unpack_tex0(
    descriptor: RegisterDescriptor,
    qw: Quadword,
    _: Packing,
    _: &mut UnpackState,
) -> Result<GifRegister> {
    let raw = qw.low;
    Ok(GifRegister::Tex0(Tex0 {
        context: (descriptor == RegisterDescriptor::Tex0_2) as u8,
        tbp0: bits(raw, 0, 14) as u16,
        tbw: bits(raw, 14, 6) as u8,
        psm: bits(raw, 20, 6) as u8,
        tw: bits(raw, 26, 4) as u8,
        th: bits(raw, 30, 4) as u8,
        tcc: bit(raw, 34),
        tfx: bits(raw, 35, 2) as u8,
        cbp: bits(raw, 37, 14) as u16,
        cpsm: bits(raw, 51, 4) as u8,
        csm: bit(raw, 55),
        csa: bits(raw, 56, 5) as u8,
        cld: bits(raw, 61, 3) as u8,
    }))
}

fn unpack_clamp(
    descriptor: RegisterDescriptor,
    qw: Quadword,
    _: Packing,
    _: &mut UnpackState,
) -> Result<GifRegister> {
    let raw = qw.low;
    Ok(GifRegister::Clamp(Clamp {
        context: (descriptor == RegisterDescriptor::Clamp2) as u8,
        wms: bits(raw, 0, 2) as u8,
        wmt: bits(raw, 2, 2) as u8,
        minu: bits(raw, 4, 10) as u16,
        maxu: bits(raw, 14, 10) as u16,
        minv: bits(raw, 24, 10) as u16,
        maxv: bits(raw, 34, 10) as u16,
    }))
}

/// A+D: the target descriptor is the low nibble of `high`
///
/// Only one level of redirection exists; an A+D that resolves to A+D is
/// rejected rather than followed.
fn unpack_address_data(
    _: RegisterDescriptor,
    qw: Quadword,
    _: Packing,
    state: &mut UnpackState,
) -> Result<GifRegister> {
    if state.depth > 0 {
        return Err(DumpError::NestedAddressData);
    }

    let address = bits(qw.high, 0, 8) as u8;
    let target = RegisterDescriptor::from_nibble(bits(qw.high, 0, 4) as u8);
    if target == RegisterDescriptor::Ad {
        return Err(DumpError::NestedAddressData);
    }

    state.depth += 1;
    let register = unpack(target, qw, Packing::Unpacked, state);
    state.depth -= 1;

    Ok(GifRegister::AddressData {
        address,
        register: Box::new(register?),
    })
}

fn unpack_nop(
    _: RegisterDescriptor,
    _: Quadword,
    _: Packing,
    _: &mut UnpackState,
) -> Result<GifRegister> {
    Ok(GifRegister::Nop)
}

fn unpack_unimplemented(
    descriptor: RegisterDescriptor,
    _: Quadword,
    _: Packing,
    _: &mut UnpackState,
) -> Result<GifRegister> {
    Err(DumpError::UnimplementedRegister { descriptor })
}
