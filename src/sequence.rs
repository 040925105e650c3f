//! Dialog sequence graph
//!
//! This module provides the authoritative model of a wizard's navigation
//! flow. States are dialogs, inputs are button activations, and each
//! transition carries the ordered, conditionally-guarded actions that run
//! when its button is pressed on its dialog.
//!
//! # Design Principles
//!
//! - **Single Owner**: one [`DialogSequence`] per installer definition,
//!   passed by exclusive ownership; no global or static state
//! - **One Transition per Key**: at most one transition exists for a
//!   (dialog, button) pair; [`DialogSequence::on`] appends to it
//! - **No Empty Transitions**: removal operations prune transitions left
//!   without actions, so querying them reports "absent", never "empty"
//! - **Fail Fast**: malformed identifiers are rejected at `on`-time
//!
//! # Flow Shape
//!
//! ```text
//! WelcomeDlg --Next--> InstallDirDlg --Next--> VerifyReadyDlg
//!            <--Back--               <--Back--
//! ```
//!
//! Each arrow above is one transition whose action list typically holds a
//! single `ShowDialog`; rewired flows hold several guarded actions per
//! transition.

use crate::action::Action;
use crate::error::{Result, SequenceError};
use crate::types::{Button, CustomActionRef, DialogId};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// The ordered action list triggered by one button on one dialog.
///
/// Actions are kept in execution order: ascending by explicit
/// [`Order`](crate::types::Order) value, ties resolved by insertion
/// sequence. A transition with no actions is never observable; the owning
/// sequence prunes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    dialog: DialogId,
    button: Button,
    actions: Vec<Action>,
}

impl Transition {
    fn new(dialog: DialogId, button: Button) -> Self {
        Self {
            dialog,
            button,
            actions: Vec::new(),
        }
    }

    /// The dialog this transition belongs to
    #[inline]
    pub fn dialog(&self) -> &DialogId {
        &self.dialog
    }

    /// The button that triggers this transition
    #[inline]
    pub fn button(&self) -> &Button {
        &self.button
    }

    /// The actions in execution order
    #[inline]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of actions in this transition
    #[inline]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if the transition holds no actions
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns true if any action navigates to `dialog`
    pub fn contains_show_of(&self, dialog: &DialogId) -> bool {
        self.actions.iter().any(|a| a.shows(dialog))
    }

    /// Insert keeping execution order: after every action whose order is
    /// less than or equal to the new one, so equal orders preserve
    /// insertion sequence.
    fn push(&mut self, action: Action) {
        let at = self
            .actions
            .partition_point(|a| a.order().value() <= action.order().value());
        self.actions.insert(at, action);
    }

    fn retain(&mut self, keep: impl FnMut(&Action) -> bool) {
        self.actions.retain(keep);
    }
}

/// The wizard's navigation graph: every transition, the installer
/// properties the guards require, and the custom actions the flow invokes.
///
/// Built once per installer definition, mutated synchronously through the
/// builder-style calls below, then handed off read-only to the markup
/// emitter. All mutators return `&mut Self` for chaining.
///
/// # Example
///
/// ```
/// use wizflow::{Action, Button, DialogSequence};
///
/// let mut seq = DialogSequence::new();
/// seq.on("WelcomeDlg", Button::Next, Action::show_dialog("InstallDirDlg"))?
///    .on("InstallDirDlg", Button::Back, Action::show_dialog("WelcomeDlg"))?;
/// assert!(seq.transition("WelcomeDlg", &Button::Next).is_some());
/// # Ok::<(), wizflow::SequenceError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DialogSequence {
    transitions: Vec<Transition>,
    properties: BTreeMap<String, String>,
    custom_actions: Vec<CustomActionRef>,
    ui_configured: bool,
}

impl DialogSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `action` to the transition at (`dialog`, `button`), creating
    /// the transition if absent.
    ///
    /// Properties referenced by the action's guard are auto-registered in
    /// the property registry (seeded with `"0"`, existing values kept).
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` if the dialog name, button name, or an
    /// identifier inside the action is empty.
    pub fn on(
        &mut self,
        dialog: impl Into<DialogId>,
        button: Button,
        action: Action,
    ) -> Result<&mut Self> {
        let dialog = dialog.into();
        if !dialog.is_valid() {
            return Err(SequenceError::invalid_identifier(
                "dialog name must not be empty",
            ));
        }
        if !button.is_valid() {
            return Err(SequenceError::invalid_identifier(
                "button name must not be empty",
            ));
        }
        action.validate()?;

        if let Some(condition) = action.condition() {
            for property in condition.distinct_properties() {
                if !self.properties.contains_key(property) {
                    self.properties.insert(property.to_string(), "0".to_string());
                }
            }
        }

        debug!(dialog = %dialog, button = %button, "appending transition action");

        match self.position(&dialog, &button) {
            Some(at) => self.transitions[at].push(action),
            None => {
                let mut transition = Transition::new(dialog, button);
                transition.push(action);
                self.transitions.push(transition);
            }
        }
        Ok(self)
    }

    /// The transition at (`dialog`, `button`), if present
    pub fn transition(&self, dialog: impl AsRef<str>, button: &Button) -> Option<&Transition> {
        let dialog = dialog.as_ref();
        self.transitions
            .iter()
            .find(|t| t.dialog.as_str() == dialog && t.button == *button)
    }

    /// Every transition, in installation order
    #[inline]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Strip the direct Next/Back adjacency between two dialogs: removes
    /// `ShowDialog(second)` actions from (`first`, Next) and
    /// `ShowDialog(first)` actions from (`second`, Back). Transitions left
    /// empty are deleted.
    pub fn remove_actions_between(
        &mut self,
        first: impl Into<DialogId>,
        second: impl Into<DialogId>,
    ) -> &mut Self {
        let first = first.into();
        let second = second.into();
        debug!(from = %first, to = %second, "removing Next/Back adjacency");

        if let Some(at) = self.position(&first, &Button::Next) {
            self.transitions[at].retain(|a| !a.shows(&second));
        }
        if let Some(at) = self.position(&second, &Button::Back) {
            self.transitions[at].retain(|a| !a.shows(&first));
        }
        self.prune_empty();
        self
    }

    /// Set an installer property the emitted UI requires
    pub fn set_property(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// The registered installer properties
    #[inline]
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Record a custom action routine the flow invokes; duplicates are
    /// kept out so the emitter registers each routine once.
    pub fn register_custom_action(&mut self, action: CustomActionRef) -> &mut Self {
        if !self.custom_actions.contains(&action) {
            self.custom_actions.push(action);
        }
        self
    }

    /// The custom action routines referenced by the flow
    #[inline]
    pub fn custom_actions(&self) -> &[CustomActionRef] {
        &self.custom_actions
    }

    /// Returns true once a one-shot UI configuration has been installed
    #[inline]
    pub fn is_ui_configured(&self) -> bool {
        self.ui_configured
    }

    pub(crate) fn mark_ui_configured(&mut self) {
        self.ui_configured = true;
    }

    fn position(&self, dialog: &DialogId, button: &Button) -> Option<usize> {
        self.transitions
            .iter()
            .position(|t| t.dialog == *dialog && t.button == *button)
    }

    fn prune_empty(&mut self) {
        self.transitions.retain(|t| !t.is_empty());
    }
}
