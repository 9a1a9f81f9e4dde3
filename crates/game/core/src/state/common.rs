use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Player identifier. `0` is the environment: it owns unowned objects and may
/// act on any object.
pub type PlayerId = u32;

/// Stable identifier of an object held in the grid's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Identifier carried by instances that have not been added to a grid yet.
    pub const UNASSIGNED: Self = Self(u32::MAX);

    #[inline]
    pub const fn is_assigned(self) -> bool {
        self.0 != Self::UNASSIGNED.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid position expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Displacement between two positions. Also used for orientation vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

impl Add<Offset> for Position {
    type Output = Position;
    fn add(self, rhs: Offset) -> Position {
        Position::new(self.x.wrapping_add(rhs.x), self.y.wrapping_add(rhs.y))
    }
}

impl Sub for Position {
    type Output = Offset;
    fn sub(self, rhs: Position) -> Offset {
        Offset::new(self.x.wrapping_sub(rhs.x), self.y.wrapping_sub(rhs.y))
    }
}

impl Neg for Offset {
    type Output = Offset;
    fn neg(self) -> Offset {
        Offset::new(self.x.wrapping_neg(), self.y.wrapping_neg())
    }
}

/// Discrete simulation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_arithmetic() {
        let a = Position::new(2, 3);
        let b = Position::new(5, 1);
        assert_eq!(b - a, Offset::new(3, -2));
        assert_eq!(a + (b - a), b);
        assert_eq!(a.manhattan_distance(b), 5);
    }

    #[test]
    fn manhattan_distance_saturates() {
        let far = Position::new(i32::MIN, i32::MIN);
        let near = Position::new(i32::MAX, i32::MAX);
        assert_eq!(far.manhattan_distance(near), u32::MAX);
    }

    #[test]
    fn tick_advances() {
        assert_eq!(Tick(10) + 3, Tick(13));
        assert_eq!(Tick::ZERO.next(), Tick(1));
    }

    #[test]
    fn unassigned_object_id() {
        assert!(!ObjectId::UNASSIGNED.is_assigned());
        assert!(ObjectId(0).is_assigned());
        assert_eq!(ObjectId(7).to_string(), "#7");
    }
}
