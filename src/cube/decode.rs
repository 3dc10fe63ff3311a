// Copyright 2026 Daniel Pelikan
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

//! Decoding of the packed 16-byte cube state.
//!
//! # Payload layout (32 nibbles, high nibble first)
//!
//! ```text
//! nibbles 0-7   : corner permutation, 1-based index of the home corner
//!                 occupying each corner slot
//! nibbles 8-15  : corner orientation code per slot, 1..=3
//! nibbles 16-27 : edge permutation, 1-based index of the home edge
//!                 occupying each edge slot
//! bits of bytes 14-15, MSB first: one flip bit per edge slot
//! low nibble of byte 15 : padding, must be zero
//! ```
//!
//! Centers never move relative to each other and their orientation is not
//! reported, so they decode to their canonical layout.

use super::cubelet::{Cubelet, Position};
use super::face::{cross, Face};
use super::state::CubeState;
use crate::error::ProtocolError;

/// Length of the packed state payload.
pub const STATE_LEN: usize = 16;

/// Corner slots in payload order.
pub const CORNER_SLOTS: [Position; 8] = [
    [0, 0, 2],
    [0, 0, 0],
    [2, 0, 0],
    [2, 0, 2],
    [0, 2, 2],
    [0, 2, 0],
    [2, 2, 0],
    [2, 2, 2],
];

/// Edge slots in payload order.
pub const EDGE_SLOTS: [Position; 12] = [
    [1, 0, 2],
    [0, 0, 1],
    [1, 0, 0],
    [2, 0, 1],
    [0, 1, 2],
    [0, 1, 0],
    [2, 1, 0],
    [2, 1, 2],
    [1, 2, 2],
    [0, 2, 1],
    [1, 2, 0],
    [2, 2, 1],
];

fn nibble(bytes: &[u8], i: usize) -> u8 {
    (bytes[i / 2] >> (4 - 4 * (i % 2))) & 0x0f
}

fn edge_flipped(bytes: &[u8], slot: usize) -> bool {
    (bytes[14 + slot / 8] >> (7 - slot % 8)) & 1 == 1
}

/// Face pointing outwards along `axis` for a piece at `home`.
fn outward(home: Position, axis: usize) -> Face {
    let face = Face::positive(axis);
    if home[axis] > 0 {
        face
    } else {
        face.opposite()
    }
}

/// Label for local axis `axis` of a piece sitting at `pos`, given the face
/// that points outwards along that axis.
fn axis_label(pos: Position, axis: usize, outward: Face) -> Face {
    if pos[axis] > 0 {
        outward
    } else {
        outward.opposite()
    }
}

/// The two axes on which an edge position is not in the middle layer.
fn outer_axes(pos: Position) -> [usize; 2] {
    match pos.iter().position(|&c| c == 1) {
        Some(0) => [1, 2],
        Some(1) => [0, 2],
        _ => [0, 1],
    }
}

fn lookup(
    slots: &[Position],
    field: &'static str,
    slot: usize,
    value: u8,
) -> Result<(usize, Position), ProtocolError> {
    (value as usize)
        .checked_sub(1)
        .and_then(|i| slots.get(i).map(|&home| (i, home)))
        .ok_or(ProtocolError::InvalidNibble { field, slot, value })
}

fn decode_corner(bytes: &[u8], slot: usize, pos: Position, home: Position) -> Result<Cubelet, ProtocolError> {
    let orientation = nibble(bytes, 8 + slot);
    if !(1..=3).contains(&orientation) {
        return Err(ProtocolError::InvalidNibble {
            field: "corner orientation",
            slot,
            value: orientation,
        });
    }

    let mut outward_faces: [Face; 3] = std::array::from_fn(|axis| outward(home, axis));
    let parity = (pos[0] == home[0]) ^ (pos[1] == home[1]) ^ (pos[2] == home[2]);
    if !parity {
        outward_faces.reverse();
    }

    let twist = orientation as usize;
    let faces = std::array::from_fn(|axis| {
        axis_label(pos, axis, outward_faces[(axis + 3 - twist) % 3])
    });
    Ok(Cubelet::with_faces(home, faces))
}

fn decode_edge(bytes: &[u8], slot: usize, pos: Position, home: Position) -> Result<Cubelet, ProtocolError> {
    let [ha, hb] = outer_axes(home);
    let mut outward_faces = [outward(home, ha), outward(home, hb)];
    if !((home[0] != 1) ^ (pos[0] == 1)) {
        outward_faces.reverse();
    }
    if edge_flipped(bytes, slot) {
        outward_faces.reverse();
    }

    let [pa, pb] = outer_axes(pos);
    let middle = 3 - pa - pb;
    let mut faces = [Face::R; 3];
    faces[pa] = axis_label(pos, pa, outward_faces[0]);
    faces[pb] = axis_label(pos, pb, outward_faces[1]);

    let normal = cross(
        faces[(middle + 1) % 3].direction(),
        faces[(middle + 2) % 3].direction(),
    );
    faces[middle] = Face::from_direction(normal).ok_or(ProtocolError::UnresolvedAxis(slot))?;

    Ok(Cubelet::with_faces(home, faces))
}

/// Decode a packed state payload.
///
/// Pure: the same bytes always decode to the same state.
pub fn decode_state(bytes: &[u8]) -> Result<CubeState, ProtocolError> {
    if bytes.len() != STATE_LEN {
        return Err(ProtocolError::FrameLength {
            expected: STATE_LEN,
            actual: bytes.len(),
        });
    }

    let padding = bytes[STATE_LEN - 1] & 0x0f;
    if padding != 0 {
        return Err(ProtocolError::MalformedPadding(padding));
    }

    let mut state = CubeState::solved();

    let mut seen = [false; 8];
    for (slot, &pos) in CORNER_SLOTS.iter().enumerate() {
        let (index, home) = lookup(&CORNER_SLOTS, "corner permutation", slot, nibble(bytes, slot))?;
        if std::mem::replace(&mut seen[index], true) {
            return Err(ProtocolError::DuplicateCubelet(home));
        }
        state.place(pos, decode_corner(bytes, slot, pos, home)?);
    }

    let mut seen = [false; 12];
    for (slot, &pos) in EDGE_SLOTS.iter().enumerate() {
        let (index, home) = lookup(&EDGE_SLOTS, "edge permutation", slot, nibble(bytes, 16 + slot))?;
        if std::mem::replace(&mut seen[index], true) {
            return Err(ProtocolError::DuplicateCubelet(home));
        }
        state.place(pos, decode_edge(bytes, slot, pos, home)?);
    }

    Ok(state)
}

impl CubeState {
    /// Decode a packed state payload. See [`decode_state`].
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        decode_state(bytes)
    }
}
