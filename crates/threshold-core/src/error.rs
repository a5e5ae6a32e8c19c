// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Threshold.

use thiserror::Error;

/// Top-level error type for all Threshold operations.
#[derive(Debug, Error)]
pub enum ThresholdError {
    // -- Acquisition errors --
    #[error("image acquisition failed: {0}")]
    Acquisition(String),

    #[error("camera access denied")]
    CameraDenied,

    // -- Transform errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    // -- Export errors --
    #[error("export failed: {0}")]
    Export(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    #[error("editor session has shut down")]
    SessionClosed,
}

/// Coarse classification used by callers to pick a recovery strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// No source image could be obtained. Terminal for the session.
    Acquisition,
    /// Crop/scale/threshold produced nothing. Fall back or keep the last render.
    Transform,
    /// Export is unavailable; session state is untouched.
    Export,
    /// Native collaborator or runtime plumbing failed.
    Platform,
}

impl ThresholdError {
    /// Classify this error for recovery decisions.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Acquisition(_) | Self::CameraDenied => ErrorClass::Acquisition,
            Self::ImageError(_)
            | Self::InvalidDimensions { .. }
            | Self::BufferSizeMismatch { .. }
            | Self::InvalidGeometry(_) => ErrorClass::Transform,
            Self::Export(_) | Self::Io(_) => ErrorClass::Export,
            Self::Serialization(_)
            | Self::Bridge(_)
            | Self::PlatformUnavailable
            | Self::SessionClosed => ErrorClass::Platform,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ThresholdError>;
