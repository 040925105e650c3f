//! Flow rewiring built on the sequence primitives
//!
//! Two higher-level operations edit an existing wizard flow:
//!
//! - [`DialogSequence::remove_dialogs_between`] makes two dialogs behave as
//!   if adjacent, dropping whatever used to sit between them
//! - [`DialogSequence::splice_dialog`] inserts a new dialog into an
//!   existing adjacency, preserving round-trip Next/Back navigability
//!
//! Both validate their preconditions before touching the sequence: a
//! failed call leaves the graph exactly as it was.

use crate::action::Action;
use crate::condition::Condition;
use crate::error::{Result, SequenceError};
use crate::sequence::DialogSequence;
use crate::types::{Button, CloseDisposition, CustomActionRef, DialogId, Order};
use std::collections::BTreeSet;
use tracing::{debug, info};

impl DialogSequence {
    /// Rewire `start` and `end` to behave as adjacent dialogs.
    ///
    /// Clears the Next/Back wiring along the existing forward chain from
    /// `start` to `end` (or just the direct pair when no chain connects
    /// them), then installs `ShowDialog(end)` on (`start`, Next) and
    /// `ShowDialog(start)` on (`end`, Back) at the default order. Dialogs
    /// that sat between the pair keep any transitions not part of that
    /// chain.
    ///
    /// Calling this twice with the same arguments is safe: the second call
    /// removes the wiring the first one installed and installs it again.
    /// A call with `start == end` is a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` if either dialog name is empty.
    pub fn remove_dialogs_between(
        &mut self,
        start: impl Into<DialogId>,
        end: impl Into<DialogId>,
    ) -> Result<&mut Self> {
        let start = start.into();
        let end = end.into();
        if !start.is_valid() || !end.is_valid() {
            return Err(SequenceError::invalid_identifier(
                "dialog name must not be empty",
            ));
        }
        if start == end {
            debug!(dialog = %start, "start and end are the same dialog; nothing to rewire");
            return Ok(self);
        }

        match self.next_chain(&start, &end) {
            Some(path) => {
                for pair in path.windows(2) {
                    self.remove_actions_between(pair[0].clone(), pair[1].clone());
                }
            }
            // No forward chain to dismantle; clear any direct wiring so
            // repeated calls stay idempotent.
            None => {
                self.remove_actions_between(start.clone(), end.clone());
            }
        }

        self.on(
            start.clone(),
            Button::Next,
            Action::show_dialog(end.clone()).with_order(Order::DEFAULT),
        )?
        .on(
            end.clone(),
            Button::Back,
            Action::show_dialog(start.clone()).with_order(Order::DEFAULT),
        )?;

        info!(start = %start, end = %end, "rewired dialogs as adjacent");
        Ok(self)
    }

    /// Splice `new_dialog` between two already-connected dialogs.
    ///
    /// The caller-supplied `show_action` names the routine that constructs
    /// and presents the new dialog; it is registered with the sequence and
    /// invoked from both directions. After the splice:
    ///
    /// - (`prev_dialog`, Next) runs the routine, then navigates to
    ///   `new_dialog` when its Next button was pressed, or closes the
    ///   wizard when Cancel was pressed (ordered ahead of the navigation
    ///   actions so cancellation short-circuits them)
    /// - (`next_dialog`, Back) runs the routine, then navigates to
    ///   `prev_dialog` when its Back button was pressed
    ///
    /// The navigation guards test the same property against distinct
    /// values, so at most one of them fires per activation.
    ///
    /// This operation is one-shot per sequence. All preconditions are
    /// checked before any mutation, so a failed call leaves the sequence
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - `DuplicateUiConfiguration` if a UI configuration was already
    ///   installed on this sequence
    /// - `InvalidIdentifier` if any dialog or routine name is empty
    /// - `DisconnectedDialogs` if `prev_dialog` and `next_dialog` have no
    ///   Next/Back relationship to splice into
    ///
    /// # Example
    ///
    /// ```
    /// use wizflow::{dialogs, DialogSequence};
    ///
    /// let mut seq = DialogSequence::common_ui()?;
    /// seq.splice_dialog(
    ///     "SettingsDlg",
    ///     dialogs::INSTALL_DIR,
    ///     dialogs::VERIFY_READY,
    ///     "ShowSettingsDialog",
    /// )?;
    /// assert!(seq.is_ui_configured());
    /// # Ok::<(), wizflow::SequenceError>(())
    /// ```
    pub fn splice_dialog(
        &mut self,
        new_dialog: impl Into<DialogId>,
        prev_dialog: impl Into<DialogId>,
        next_dialog: impl Into<DialogId>,
        show_action: impl Into<CustomActionRef>,
    ) -> Result<&mut Self> {
        let new_dialog = new_dialog.into();
        let prev_dialog = prev_dialog.into();
        let next_dialog = next_dialog.into();
        let show_action = show_action.into();

        // Precondition phase: nothing below may mutate until all checks pass.
        if self.is_ui_configured() {
            return Err(SequenceError::DuplicateUiConfiguration);
        }
        if ![&new_dialog, &prev_dialog, &next_dialog]
            .iter()
            .all(|d| d.is_valid())
        {
            return Err(SequenceError::invalid_identifier(
                "dialog name must not be empty",
            ));
        }
        if !show_action.is_valid() {
            return Err(SequenceError::invalid_identifier(
                "custom action name must not be empty",
            ));
        }
        let forward = self
            .transition(prev_dialog.as_str(), &Button::Next)
            .is_some_and(|t| t.contains_show_of(&next_dialog));
        let backward = self
            .transition(next_dialog.as_str(), &Button::Back)
            .is_some_and(|t| t.contains_show_of(&prev_dialog));
        if !forward && !backward {
            return Err(SequenceError::disconnected(
                prev_dialog.as_str(),
                next_dialog.as_str(),
            ));
        }

        // Mutation phase: disconnect the pair, then wire the new dialog in
        // both directions.
        self.remove_actions_between(prev_dialog.clone(), next_dialog.clone());
        self.register_custom_action(show_action.clone());

        self.on(
            prev_dialog.clone(),
            Button::Next,
            Action::execute_custom_action(show_action.clone()),
        )?
        .on(
            prev_dialog.clone(),
            Button::Next,
            Action::show_dialog(new_dialog.clone()).with_condition(Condition::next_pressed()),
        )?
        .on(
            prev_dialog.clone(),
            Button::Next,
            Action::close_dialog(CloseDisposition::Exit)
                .with_condition(Condition::cancel_pressed())
                .with_order(Order(2)),
        )?
        .on(
            next_dialog.clone(),
            Button::Back,
            Action::execute_custom_action(show_action.clone()),
        )?
        .on(
            next_dialog.clone(),
            Button::Back,
            Action::show_dialog(prev_dialog.clone()).with_condition(Condition::back_pressed()),
        )?;

        self.mark_ui_configured();
        info!(
            new = %new_dialog,
            prev = %prev_dialog,
            next = %next_dialog,
            action = %show_action,
            "spliced dialog into wizard flow"
        );
        Ok(self)
    }

    /// Follow `ShowDialog` targets of Next transitions from `start` until
    /// `end`, returning the dialogs on the path. `None` when the chain
    /// dead-ends or loops before reaching `end`.
    fn next_chain(&self, start: &DialogId, end: &DialogId) -> Option<Vec<DialogId>> {
        let mut path = vec![start.clone()];
        let mut visited = BTreeSet::from([start.clone()]);
        let mut current = start.clone();

        while current != *end {
            let transition = self.transition(current.as_str(), &Button::Next)?;
            let target = transition
                .actions()
                .iter()
                .find_map(|a| a.show_target())?
                .clone();
            if !visited.insert(target.clone()) {
                return None;
            }
            path.push(target.clone());
            current = target;
        }
        Some(path)
    }
}
