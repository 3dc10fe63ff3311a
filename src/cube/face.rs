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

//! Cube faces, their directions and sticker colors.

use std::fmt;

/// Integer direction vector along one of the cube axes.
pub type Direction = [i32; 3];

/// Sticker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Yellow,
    Red,
    Green,
    Blue,
    Orange,
}

impl Color {
    /// Single-letter color code.
    pub fn as_char(&self) -> char {
        match self {
            Self::White => 'W',
            Self::Yellow => 'Y',
            Self::Red => 'R',
            Self::Green => 'G',
            Self::Blue => 'B',
            Self::Orange => 'O',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One of the six outer faces of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    L,
    R,
    U,
    D,
    F,
    B,
}

impl Face {
    /// All faces, in facelet-string order.
    pub const ALL: [Face; 6] = [Face::L, Face::R, Face::U, Face::D, Face::F, Face::B];

    /// Outward unit normal of the face.
    pub fn direction(&self) -> Direction {
        match self {
            Self::L => [-1, 0, 0],
            Self::R => [1, 0, 0],
            Self::U => [0, 1, 0],
            Self::D => [0, -1, 0],
            Self::F => [0, 0, 1],
            Self::B => [0, 0, -1],
        }
    }

    /// Face with the given outward normal, if the vector is a unit axis vector.
    pub fn from_direction(direction: Direction) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.direction() == direction)
    }

    /// Face on the positive end of an axis (0 = x, 1 = y, 2 = z).
    pub fn positive(axis: usize) -> Self {
        match axis {
            0 => Self::R,
            1 => Self::U,
            _ => Self::F,
        }
    }

    /// Index of the axis the face normal lies on.
    pub fn axis(&self) -> usize {
        match self {
            Self::L | Self::R => 0,
            Self::U | Self::D => 1,
            Self::F | Self::B => 2,
        }
    }

    /// Whether the face normal points along the negative half of its axis.
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::L | Self::D | Self::B)
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::L => Self::R,
            Self::R => Self::L,
            Self::U => Self::D,
            Self::D => Self::U,
            Self::F => Self::B,
            Self::B => Self::F,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::L => Color::Red,
            Self::R => Color::Orange,
            Self::U => Color::Blue,
            Self::D => Color::Green,
            Self::F => Color::Yellow,
            Self::B => Color::White,
        }
    }

    /// Whether grid position `(x, y, z)` lies on this face's outer layer.
    pub fn is_on_face(&self, x: usize, y: usize, z: usize) -> bool {
        let position = [x, y, z];
        self.direction()
            .iter()
            .zip(position)
            .all(|(&d, c)| d == 0 || c as i32 == d + 1)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Cross product of two direction vectors.
pub fn cross(a: Direction, b: Direction) -> Direction {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
