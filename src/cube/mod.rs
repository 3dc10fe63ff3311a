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

//! Cube state model.
//!
//! Pure and I/O free: 27 cubelets on a 3x3x3 grid, face turns, and the
//! decoder for the packed state the cube sends with every move.

mod cubelet;
mod decode;
mod face;
mod moves;
mod state;

pub use cubelet::{Cubelet, CubeletKind, Position, CANONICAL_FACES};
pub use decode::{decode_state, CORNER_SLOTS, EDGE_SLOTS, STATE_LEN};
pub use face::{Color, Direction, Face};
pub use moves::{Move, RotationMatrix};
pub use state::CubeState;
