use super::Operand;

/// Comparison operators usable in preconditions and conditional blocks.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Neq,
}

impl Comparison {
    pub fn holds(self, lhs: i32, rhs: i32) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Gt => lhs > rhs,
            Self::Gte => lhs >= rhs,
            Self::Lt => lhs < rhs,
            Self::Lte => lhs <= rhs,
            Self::Neq => lhs != rhs,
        }
    }
}

/// Compiled `lhs <op> rhs` test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub comparison: Comparison,
    pub lhs: Operand,
    pub rhs: Operand,
}
