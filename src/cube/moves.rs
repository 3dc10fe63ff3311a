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

//! Face turns and their geometry.
//!
//! Every move is identified on the wire by one byte: the high nibble selects
//! the face (U=1, F=2, R=3, B=4, L=5, D=6) and the low nibble the kind of
//! turn (1 = clockwise, 3 = counter-clockwise, 9 = clockwise half turn,
//! 8 = counter-clockwise half turn).

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use super::face::{Direction, Face};
use crate::error::ProtocolError;

/// Integer 3x3 rotation matrix, applied to row vectors (`v * M`).
pub type RotationMatrix = [[i32; 3]; 3];

/// One of the 24 turns the cube reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Move {
    U = 0x11,
    Ui = 0x13,
    U2 = 0x19,
    U2i = 0x18,
    F = 0x21,
    Fi = 0x23,
    F2 = 0x29,
    F2i = 0x28,
    R = 0x31,
    Ri = 0x33,
    R2 = 0x39,
    R2i = 0x38,
    B = 0x41,
    Bi = 0x43,
    B2 = 0x49,
    B2i = 0x48,
    L = 0x51,
    Li = 0x53,
    L2 = 0x59,
    L2i = 0x58,
    D = 0x61,
    Di = 0x63,
    D2 = 0x69,
    D2i = 0x68,
}

impl Move {
    pub const ALL: [Move; 24] = [
        Move::U,
        Move::Ui,
        Move::U2,
        Move::U2i,
        Move::F,
        Move::Fi,
        Move::F2,
        Move::F2i,
        Move::R,
        Move::Ri,
        Move::R2,
        Move::R2i,
        Move::B,
        Move::Bi,
        Move::B2,
        Move::B2i,
        Move::L,
        Move::Li,
        Move::L2,
        Move::L2i,
        Move::D,
        Move::Di,
        Move::D2,
        Move::D2i,
    ];

    /// Parse a move from its wire code.
    pub fn from_code(code: u8) -> Result<Self, ProtocolError> {
        Self::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .ok_or(ProtocolError::UnknownMove(code))
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn face(&self) -> Face {
        match self.code() >> 4 {
            1 => Face::U,
            2 => Face::F,
            3 => Face::R,
            4 => Face::B,
            5 => Face::L,
            _ => Face::D,
        }
    }

    pub fn is_ccw(&self) -> bool {
        matches!(self.code() & 0x0f, 0x3 | 0x8)
    }

    pub fn is_double(&self) -> bool {
        matches!(self.code() & 0x0f, 0x8 | 0x9)
    }

    /// The turn that undoes this one.
    pub fn inverse(&self) -> Self {
        let kind = match self.code() & 0x0f {
            0x1 => 0x3,
            0x3 => 0x1,
            0x9 => 0x8,
            _ => 0x9,
        };
        let code = (self.code() & 0xf0) | kind;
        Self::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .unwrap_or(*self)
    }

    /// Signed rotation angle in radians, clockwise positive.
    pub fn angle(&self) -> f64 {
        let sign = if self.is_ccw() { -1.0 } else { 1.0 };
        let turns = if self.is_double() { 2.0 } else { 1.0 };
        sign * turns * FRAC_PI_2
    }

    /// Quarter-turn rotation matrix of the move's face and direction.
    pub fn quarter_matrix(&self) -> RotationMatrix {
        let face = self.face();
        let s = if self.is_ccw() ^ face.is_negative() { -1 } else { 1 };
        match face.axis() {
            0 => [[1, 0, 0], [0, 0, -s], [0, s, 0]],
            1 => [[0, 0, s], [0, 1, 0], [-s, 0, 0]],
            _ => [[0, -s, 0], [s, 0, 0], [0, 0, 1]],
        }
    }

    /// Full rotation matrix; half turns use the squared quarter turn.
    pub fn rotation_matrix(&self) -> RotationMatrix {
        let quarter = self.quarter_matrix();
        if self.is_double() {
            multiply(&quarter, &quarter)
        } else {
            quarter
        }
    }
}

impl TryFrom<u8> for Move {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match (self.is_double(), self.is_ccw()) {
            (false, false) => "",
            (false, true) => "'",
            (true, false) => "2",
            (true, true) => "2'",
        };
        write!(f, "{}{}", self.face(), suffix)
    }
}

/// Rotate a row vector: `v * m`.
pub fn rotate(v: Direction, m: &RotationMatrix) -> Direction {
    let mut out = [0; 3];
    for (ni, slot) in out.iter_mut().enumerate() {
        *slot = (0..3).map(|oi| m[oi][ni] * v[oi]).sum();
    }
    out
}

fn multiply(a: &RotationMatrix, b: &RotationMatrix) -> RotationMatrix {
    let mut out = [[0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}
