//! Standard wizard dialog identifiers and the stock flow preset

use crate::action::Action;
use crate::condition::Condition;
use crate::error::Result;
use crate::sequence::DialogSequence;
use crate::types::Button;

/// First screen of the wizard
pub const WELCOME: &str = "WelcomeDlg";
/// License text with an acceptance checkbox
pub const LICENSE_AGREEMENT: &str = "LicenseAgreementDlg";
/// Destination folder selection
pub const INSTALL_DIR: &str = "InstallDirDlg";
/// Summary screen before the install proceeds
pub const VERIFY_READY: &str = "VerifyReadyDlg";
/// Folder browser reachable from the destination screen
pub const BROWSE: &str = "BrowseDlg";
/// Disk space requirements
pub const DISK_COST: &str = "DiskCostDlg";
/// Installation progress
pub const PROGRESS: &str = "ProgressDlg";
/// Final screen of a successful session
pub const EXIT: &str = "ExitDialog";
/// Entry screen when the product is already installed
pub const MAINTENANCE_WELCOME: &str = "MaintenanceWelcomeDlg";
/// Repair/change/remove selection
pub const MAINTENANCE_TYPE: &str = "MaintenanceTypeDlg";
/// Resume screen for a suspended installation
pub const RESUME: &str = "ResumeDlg";
/// Confirmation prompt shown when the user cancels
pub const CANCEL: &str = "CancelDlg";
/// Terminal screen after a failed session
pub const FATAL_ERROR: &str = "FatalError";
/// Terminal screen after a user-aborted session
pub const USER_EXIT: &str = "UserExit";

impl DialogSequence {
    /// The stock wizard flow:
    ///
    /// ```text
    /// WelcomeDlg <-> LicenseAgreementDlg <-> InstallDirDlg <-> VerifyReadyDlg
    /// ```
    ///
    /// Forward navigation out of the license screen is guarded on the
    /// acceptance property. This is the sequence callers typically splice
    /// a custom dialog into.
    pub fn common_ui() -> Result<Self> {
        let mut seq = Self::new();
        seq.set_property("WIXUI_INSTALLDIR", "INSTALLDIR");
        seq.on(WELCOME, Button::Next, Action::show_dialog(LICENSE_AGREEMENT))?
            .on(LICENSE_AGREEMENT, Button::Back, Action::show_dialog(WELCOME))?
            .on(
                LICENSE_AGREEMENT,
                Button::Next,
                Action::show_dialog(INSTALL_DIR)
                    .with_condition(Condition::parse("LicenseAccepted = \"1\"")?),
            )?
            .on(INSTALL_DIR, Button::Back, Action::show_dialog(LICENSE_AGREEMENT))?
            .on(INSTALL_DIR, Button::Next, Action::show_dialog(VERIFY_READY))?
            .on(VERIFY_READY, Button::Back, Action::show_dialog(INSTALL_DIR))?;
        Ok(seq)
    }
}
