//! Facing direction of objects and the rotation of relative vectors.
//!
//! Relative action vectors are authored as if the object faced UP. Rotating a
//! vector into an object's frame maps the UP unit vector onto the object's
//! facing unit vector; `None` behaves like UP.

use super::Offset;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    None,
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Derives a direction from a vector. Only axis-aligned non-zero vectors
    /// have a direction; their magnitude is ignored.
    pub fn from_vector(vector: Offset) -> Self {
        match (vector.x.signum(), vector.y.signum()) {
            (0, -1) => Self::Up,
            (1, 0) => Self::Right,
            (0, 1) => Self::Down,
            (-1, 0) => Self::Left,
            _ => Self::None,
        }
    }

    pub const fn unit_vector(self) -> Offset {
        match self {
            Self::None => Offset::ZERO,
            Self::Up => Offset::new(0, -1),
            Self::Right => Offset::new(1, 0),
            Self::Down => Offset::new(0, 1),
            Self::Left => Offset::new(-1, 0),
        }
    }

    /// Rotates a vector authored in the UP frame into this direction's frame.
    pub const fn rotate(self, vector: Offset) -> Offset {
        let Offset { x, y } = vector;
        match self {
            Self::None | Self::Up => vector,
            Self::Right => Offset::new(-y, x),
            Self::Down => Offset::new(-x, -y),
            Self::Left => Offset::new(y, -x),
        }
    }

    pub(crate) const fn digest_byte(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Up => 1,
            Self::Right => 2,
            Self::Down => 3,
            Self::Left => 4,
        }
    }
}
