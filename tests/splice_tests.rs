//! Tests for splicing a custom dialog into an existing wizard flow
//!
//! These tests verify:
//! - The rewired transitions after a splice (both directions)
//! - Guard conditions and cancellation ordering
//! - One-shot enforcement and all-or-nothing failure behavior
//! - The serialized handoff consumed by a markup emitter

use wizflow::{
    dialogs, Action, ActionKind, Button, CloseDisposition, Condition, CustomActionRef, DialogId,
    DialogSequence, Order, SequenceError,
};

fn spliced() -> DialogSequence {
    let mut seq = DialogSequence::common_ui().unwrap();
    seq.splice_dialog(
        "SettingsDlg",
        dialogs::INSTALL_DIR,
        dialogs::VERIFY_READY,
        "ShowSettingsDialog",
    )
    .unwrap();
    seq
}

// =============================================================================
// Splice Wiring
// =============================================================================

#[test]
fn test_splice_rewires_forward_transition() {
    let seq = spliced();
    let t = seq.transition(dialogs::INSTALL_DIR, &Button::Next).unwrap();

    // The old direct link is gone
    assert!(!t.contains_show_of(&DialogId::from(dialogs::VERIFY_READY)));

    // The routine runs, then navigation to the new dialog on "next"
    assert!(t.actions().iter().any(|a| matches!(
        a.kind(),
        ActionKind::ExecuteCustomAction { action } if action.as_str() == "ShowSettingsDialog"
    )));
    let show = t
        .actions()
        .iter()
        .find(|a| a.shows(&DialogId::from("SettingsDlg")))
        .expect("ShowDialog(SettingsDlg) must be installed");
    assert_eq!(
        show.condition().unwrap().to_string(),
        "Custom_UI_Command = \"next\""
    );
}

#[test]
fn test_splice_orders_cancellation_ahead_of_navigation() {
    let seq = spliced();
    let t = seq.transition(dialogs::INSTALL_DIR, &Button::Next).unwrap();

    let close = &t.actions()[0];
    assert!(matches!(
        close.kind(),
        ActionKind::CloseDialog {
            disposition: CloseDisposition::Exit
        }
    ));
    assert_eq!(close.order(), Order(2));
    assert_eq!(
        close.condition().unwrap().to_string(),
        "Custom_UI_Command = \"cancel\""
    );

    // Everything else keeps the append-last sentinel
    for action in &t.actions()[1..] {
        assert_eq!(action.order(), Order::DEFAULT);
    }
}

#[test]
fn test_splice_rewires_backward_transition() {
    let seq = spliced();
    let t = seq.transition(dialogs::VERIFY_READY, &Button::Back).unwrap();
    assert_eq!(t.len(), 2);

    assert!(t.actions().iter().any(|a| matches!(
        a.kind(),
        ActionKind::ExecuteCustomAction { action } if action.as_str() == "ShowSettingsDialog"
    )));
    let show = t
        .actions()
        .iter()
        .find(|a| a.shows(&DialogId::from(dialogs::INSTALL_DIR)))
        .expect("ShowDialog back to the previous dialog must be installed");
    assert_eq!(
        show.condition().unwrap().to_string(),
        "Custom_UI_Command = \"back\""
    );
}

#[test]
fn test_splice_guards_are_mutually_exclusive() {
    let seq = spliced();
    let t = seq.transition(dialogs::INSTALL_DIR, &Button::Next).unwrap();

    let guards: Vec<&Condition> = t.actions().iter().filter_map(|a| a.condition()).collect();
    assert_eq!(guards.len(), 2);
    assert!(guards[0].excludes(guards[1]));
}

#[test]
fn test_splice_registers_routine_and_guard_property() {
    let seq = spliced();

    assert_eq!(
        seq.custom_actions(),
        &[CustomActionRef::new("ShowSettingsDialog")]
    );
    // The navigation guard property was auto-registered
    assert!(seq.properties().contains_key("Custom_UI_Command"));
    assert!(seq.is_ui_configured());
}

#[test]
fn test_splice_leaves_rest_of_flow_untouched() {
    let seq = spliced();

    // Welcome/License wiring from the stock flow is unchanged
    assert!(seq
        .transition(dialogs::WELCOME, &Button::Next)
        .unwrap()
        .contains_show_of(&DialogId::from(dialogs::LICENSE_AGREEMENT)));
    assert!(seq
        .transition(dialogs::INSTALL_DIR, &Button::Back)
        .unwrap()
        .contains_show_of(&DialogId::from(dialogs::LICENSE_AGREEMENT)));
}

// =============================================================================
// One-Shot Enforcement and Atomicity
// =============================================================================

#[test]
fn test_second_splice_fails_without_mutating() {
    let mut seq = spliced();
    let before = seq.clone();

    let err = seq
        .splice_dialog(
            "OtherDlg",
            dialogs::WELCOME,
            dialogs::LICENSE_AGREEMENT,
            "ShowOtherDialog",
        )
        .unwrap_err();

    assert_eq!(err, SequenceError::DuplicateUiConfiguration);
    assert_eq!(seq, before);
}

#[test]
fn test_splice_into_disconnected_pair_fails_without_mutating() {
    let mut seq = DialogSequence::common_ui().unwrap();
    let before = seq.clone();

    let err = seq
        .splice_dialog("SettingsDlg", dialogs::WELCOME, dialogs::VERIFY_READY, "Show")
        .unwrap_err();

    assert!(matches!(err, SequenceError::DisconnectedDialogs { .. }));
    assert_eq!(seq, before);
}

#[test]
fn test_splice_rejects_empty_identifiers_without_mutating() {
    let mut seq = DialogSequence::common_ui().unwrap();
    let before = seq.clone();

    assert!(matches!(
        seq.splice_dialog("", dialogs::INSTALL_DIR, dialogs::VERIFY_READY, "Show"),
        Err(SequenceError::InvalidIdentifier(_))
    ));
    assert!(matches!(
        seq.splice_dialog("New", "", dialogs::VERIFY_READY, "Show"),
        Err(SequenceError::InvalidIdentifier(_))
    ));
    assert!(matches!(
        seq.splice_dialog("New", dialogs::INSTALL_DIR, dialogs::VERIFY_READY, ""),
        Err(SequenceError::InvalidIdentifier(_))
    ));
    assert_eq!(seq, before);
}

#[test]
fn test_remove_dialogs_between_still_allowed_after_splice() {
    // Only the one-shot splice is guarded; plain rewiring may follow it.
    let mut seq = spliced();
    seq.remove_dialogs_between(dialogs::WELCOME, dialogs::INSTALL_DIR)
        .unwrap();
    assert!(seq
        .transition(dialogs::WELCOME, &Button::Next)
        .unwrap()
        .contains_show_of(&DialogId::from(dialogs::INSTALL_DIR)));
}

// =============================================================================
// Emitter Handoff
// =============================================================================

#[test]
fn test_finalized_sequence_serializes_for_the_emitter() {
    let seq = spliced();
    let json = serde_json::to_value(&seq).unwrap();

    assert!(json["transitions"].is_array());
    assert_eq!(json["ui_configured"], true);
    assert_eq!(json["custom_actions"][0], "ShowSettingsDialog");
    assert_eq!(json["properties"]["WIXUI_INSTALLDIR"], "INSTALLDIR");

    // Conditions serialize as canonical expression text
    let rendered = json.to_string();
    assert!(rendered.contains("Custom_UI_Command = \\\"next\\\""));
}

#[test]
fn test_full_build_script_flow() {
    // The shape of a real installer-definition build script: start from the
    // stock flow, skip the license screen, and keep editing fluently.
    let mut seq = DialogSequence::common_ui().unwrap();
    seq.remove_dialogs_between(dialogs::WELCOME, dialogs::INSTALL_DIR)
        .unwrap()
        .on(
            dialogs::VERIFY_READY,
            Button::Next,
            Action::set_property("QuickLaunch", "1"),
        )
        .unwrap();

    assert!(seq
        .transition(dialogs::WELCOME, &Button::Next)
        .unwrap()
        .contains_show_of(&DialogId::from(dialogs::INSTALL_DIR)));
    assert!(seq.transition(dialogs::LICENSE_AGREEMENT, &Button::Next).is_none());
    assert!(seq.transition(dialogs::LICENSE_AGREEMENT, &Button::Back).is_none());
}
