//! Atomic effects executed when a transition fires
//!
//! An [`Action`] pairs one effect ([`ActionKind`]) with an execution
//! [`Order`] and an optional [`Condition`] guard. The variant set is closed:
//! rewiring logic matches on it exhaustively instead of probing runtime
//! types.

use crate::condition::Condition;
use crate::error::{Result, SequenceError};
use crate::types::{CloseDisposition, CustomActionRef, DialogId, Order};
use serde::Serialize;

/// The effect an action performs when its guard (if any) holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Navigate to the named dialog
    ShowDialog { dialog: DialogId },
    /// Invoke an externally-registered custom action routine
    ExecuteCustomAction { action: CustomActionRef },
    /// End the wizard session with the given disposition
    CloseDialog { disposition: CloseDisposition },
    /// Assign an installer property
    SetProperty { name: String, value: String },
}

/// One ordered, optionally guarded effect inside a transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    #[serde(flatten)]
    kind: ActionKind,
    order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
}

impl Action {
    fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            order: Order::DEFAULT,
            condition: None,
        }
    }

    /// Navigate to `dialog` when this action fires
    pub fn show_dialog(dialog: impl Into<DialogId>) -> Self {
        Self::new(ActionKind::ShowDialog {
            dialog: dialog.into(),
        })
    }

    /// Invoke the named custom action routine
    pub fn execute_custom_action(action: impl Into<CustomActionRef>) -> Self {
        Self::new(ActionKind::ExecuteCustomAction {
            action: action.into(),
        })
    }

    /// End the wizard session
    pub fn close_dialog(disposition: CloseDisposition) -> Self {
        Self::new(ActionKind::CloseDialog { disposition })
    }

    /// Assign `value` to the installer property `name`
    pub fn set_property(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ActionKind::SetProperty {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Replace the default append-last order with an explicit one
    #[must_use]
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Attach a guard condition
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// The effect this action performs
    #[inline]
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// The execution order within the owning transition
    #[inline]
    pub fn order(&self) -> Order {
        self.order
    }

    /// The guard condition, if any
    #[inline]
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Returns true if this is a `ShowDialog` targeting `dialog`
    pub fn shows(&self, dialog: &DialogId) -> bool {
        self.show_target() == Some(dialog)
    }

    /// The navigation target, for `ShowDialog` actions
    pub fn show_target(&self) -> Option<&DialogId> {
        match &self.kind {
            ActionKind::ShowDialog { dialog } => Some(dialog),
            _ => None,
        }
    }

    /// Reject empty identifiers inside the action payload.
    pub(crate) fn validate(&self) -> Result<()> {
        match &self.kind {
            ActionKind::ShowDialog { dialog } if !dialog.is_valid() => Err(
                SequenceError::invalid_identifier("ShowDialog target must not be empty"),
            ),
            ActionKind::ExecuteCustomAction { action } if !action.is_valid() => Err(
                SequenceError::invalid_identifier("custom action name must not be empty"),
            ),
            ActionKind::SetProperty { name, .. } if name.trim().is_empty() => Err(
                SequenceError::invalid_identifier("property name must not be empty"),
            ),
            _ => Ok(()),
        }
    }
}
