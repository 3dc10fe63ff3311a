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

//! Individual cube pieces.

use super::face::{Color, Face};

/// Grid coordinate triple, each component in `0..3`.
pub type Position = [usize; 3];

/// Canonical face labels of an unturned cubelet (+x, +y, +z).
pub const CANONICAL_FACES: [Face; 3] = [Face::R, Face::U, Face::F];

/// Piece class, derived from the home position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeletKind {
    Corner,
    Edge,
    Center,
}

/// One of the 27 pieces of the cube.
///
/// `faces[axis]` names the face whose color points along the cubelet's
/// local `+axis` direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cubelet {
    pub home: Position,
    pub faces: [Face; 3],
}

impl Cubelet {
    /// Create a cubelet sitting at `home` with the canonical orientation.
    pub fn new(home: Position) -> Self {
        Self {
            home,
            faces: CANONICAL_FACES,
        }
    }

    pub fn with_faces(home: Position, faces: [Face; 3]) -> Self {
        Self { home, faces }
    }

    pub fn kind(&self) -> CubeletKind {
        match self.home.iter().filter(|&&c| c == 1).count() {
            0 => CubeletKind::Corner,
            1 => CubeletKind::Edge,
            _ => CubeletKind::Center,
        }
    }

    pub fn is_center(&self) -> bool {
        self.kind() == CubeletKind::Center
    }

    pub fn is_edge(&self) -> bool {
        self.kind() == CubeletKind::Edge
    }

    pub fn is_corner(&self) -> bool {
        self.kind() == CubeletKind::Corner
    }

    pub fn has_canonical_orientation(&self) -> bool {
        self.faces == CANONICAL_FACES
    }

    /// Color showing on the given outward face of the cubelet.
    pub fn face_color(&self, face: Face) -> Color {
        let label = self.faces[face.axis()];
        if face.is_negative() {
            label.opposite().color()
        } else {
            label.color()
        }
    }
}
