//! Three-state partial update value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field in a partial update.
///
/// Distinguishes "leave as is" from "clear" for nullable fields, which a
/// plain `Option<T>` cannot express. In JSON an absent key is
/// [`Patch::Unchanged`] (requires `#[serde(default)]` on the field),
/// `null` is [`Patch::Clear`], and any value is [`Patch::Set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Keep the current value.
    #[default]
    Unchanged,
    /// Reset the field to null.
    Clear,
    /// Replace the field with the given value.
    Set(T),
}

impl<T> Patch<T> {
    /// Resolve the patch against the current value of a nullable field.
    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Unchanged => current,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }

    /// Returns `true` if the patch leaves the field untouched.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `Some(v)` sets, `None` clears.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Clear,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Into::into)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => serializer.serialize_some(value),
            Self::Unchanged | Self::Clear => serializer.serialize_none(),
        }
    }
}
