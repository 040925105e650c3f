//! Identity and ordering types for the dialog sequence model
//!
//! This module replaces stringly-typed wiring with proper Rust types
//! that provide compile-time validation and exhaustive matching.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// Stable identity of one wizard dialog.
///
/// Dialogs are referenced by identity from transitions and actions,
/// never embedded. Identifiers are validated (non-empty) when a
/// transition is installed, not at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogId(String);

impl DialogId {
    /// Create a new dialog identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is usable as a dialog name
    pub(crate) fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DialogId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DialogId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DialogId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Button (control) that triggers a transition on a dialog.
///
/// The navigation set is closed; arbitrary controls are covered by the
/// `Named` variant. Parsing falls back to `Named` for unknown names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
pub enum Button {
    Next,
    Back,
    Cancel,
    Finish,
    #[strum(default)]
    Named(String),
}

impl Button {
    /// Create a custom (named) control trigger
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns true if the control name is usable as a transition key
    pub(crate) fn is_valid(&self) -> bool {
        match self {
            Self::Named(name) => !name.trim().is_empty(),
            _ => true,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("Next"),
            Self::Back => f.write_str("Back"),
            Self::Cancel => f.write_str("Cancel"),
            Self::Finish => f.write_str("Finish"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Explicit execution order of an action within a transition.
///
/// Actions run in ascending order; equal values keep their insertion
/// sequence. `Order::DEFAULT` is the sentinel used for actions appended
/// after any explicitly ordered work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order(pub i32);

impl Order {
    /// Sentinel order for "append after the stock actions"
    pub const DEFAULT: Order = Order(1000);

    /// The raw order value
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns true if this is the append-last sentinel
    #[inline]
    pub const fn is_default(self) -> bool {
        self.0 == Self::DEFAULT.0
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a `CloseDialog` action ends the wizard session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum CloseDisposition {
    /// Terminate the session (the canonical cancel path)
    #[default]
    Exit,
    /// Return control to the previous dialog
    Return,
    /// Restart the failed operation
    Retry,
    /// Ignore the failure and continue
    Ignore,
}

/// Reference to an externally-defined custom action routine, by name.
///
/// The routine's execution at install time is outside this crate; the
/// sequence only records which routine a transition invokes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomActionRef(String);

impl CustomActionRef {
    /// Create a reference to a named custom action routine
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The routine name
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for CustomActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomActionRef {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for CustomActionRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}
