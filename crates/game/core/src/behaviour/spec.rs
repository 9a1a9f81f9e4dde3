//! Uncompiled command definitions as a rule loader hands them over.
//!
//! Positional arguments are stored under the keys `"0"`, `"1"`, ...; named
//! arguments (`Action`, `Delay`, `Search`, ...) under their own key.

use std::collections::BTreeMap;

/// Argument value of a command definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<ArgValue>),
    Map(BTreeMap<String, ArgValue>),
}

impl ArgValue {
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ArgValue>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Integers, or text that parses as one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Booleans, or the text `true` / `false`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// One command of a behaviour list, or a conditional block when `then` holds
/// sub-commands.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandSpec {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub args: BTreeMap<String, ArgValue>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub then: Vec<CommandSpec>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: BTreeMap::new(),
            then: Vec::new(),
        }
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        let key = self.positional_len().to_string();
        self.args.insert(key, value.into());
        self
    }

    #[must_use]
    pub fn named(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Turns the command into a conditional block over `commands`.
    #[must_use]
    pub fn then(mut self, commands: Vec<CommandSpec>) -> Self {
        self.then = commands;
        self
    }

    pub fn positional(&self, index: usize) -> Option<&ArgValue> {
        self.args.get(&index.to_string())
    }

    pub fn positional_len(&self) -> usize {
        (0usize..)
            .take_while(|index| self.args.contains_key(&index.to_string()))
            .count()
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.args.get(key)
    }

    pub fn is_conditional(&self) -> bool {
        !self.then.is_empty()
    }
}
