// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the editor surfaces.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::{ErrorClass, ThresholdError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing to edit; the user has to start over (retake or pick a photo).
    Terminal,
    /// The edit did not apply but the session keeps working.
    Recoverable,
    /// The user must change something (permissions, storage) first.
    ActionRequired,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ThresholdError` into a `HumanError`.
pub fn humanize_error(err: &ThresholdError) -> HumanError {
    match err {
        ThresholdError::CameraDenied => HumanError {
            message: "Threshold can't use the camera.".into(),
            suggestion: "Allow camera access in Settings, then try again.".into(),
            severity: Severity::ActionRequired,
        },

        ThresholdError::Acquisition(detail) => HumanError {
            message: "We couldn't get a photo.".into(),
            suggestion: format!("Take the picture again or choose another image. ({detail})"),
            severity: Severity::Terminal,
        },

        ThresholdError::Export(_) => HumanError {
            message: "Export is unavailable right now.".into(),
            suggestion: "Your edits are safe. Try exporting again in a moment.".into(),
            severity: Severity::Recoverable,
        },

        ThresholdError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The image couldn't be saved.".into(),
                suggestion: "Threshold doesn't have permission to write there.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "Check the path and try again.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Something went wrong reading or writing a file.".into(),
                suggestion: "Make sure the device has free storage, then try again.".into(),
                severity: Severity::Recoverable,
            },
        },

        ThresholdError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on this device.".into(),
            suggestion: "Open an image file instead.".into(),
            severity: Severity::Terminal,
        },

        other => match other.class() {
            ErrorClass::Transform => HumanError {
                message: "That adjustment didn't apply.".into(),
                suggestion: format!("The previous image is still shown. ({other})"),
                severity: Severity::Recoverable,
            },
            _ => HumanError {
                message: "Something unexpected happened.".into(),
                suggestion: format!("Restart the editor and try again. ({other})"),
                severity: Severity::Recoverable,
            },
        },
    }
}
