// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where native mobile APIs are unavailable.
//
// The camera is never authorized and captures fail with `PlatformUnavailable`.
// Haptics are traced and otherwise ignored.

use std::path::Path;

use threshold_core::error::{Result, ThresholdError};

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativeCamera for StubBridge {
    fn authorization_status(&self) -> CameraAuthorization {
        CameraAuthorization::NotDetermined
    }

    fn request_access(&self) -> Result<bool> {
        tracing::warn!("NativeCamera::request_access called on stub bridge");
        Ok(false)
    }

    fn capture_photo(&self) -> PendingCapture {
        tracing::warn!("NativeCamera::capture_photo called on stub bridge");
        PendingCapture::ready(Err(ThresholdError::PlatformUnavailable))
    }
}

impl NativeShare for StubBridge {
    fn share_file(&self, path: &Path, _mime_type: &str) -> Result<()> {
        tracing::warn!(path = %path.display(), "NativeShare::share_file called on stub bridge");
        Err(ThresholdError::PlatformUnavailable)
    }
}

impl NativeHaptics for StubBridge {
    fn tap(&self) {
        tracing::trace!("haptic tap (stub)");
    }

    fn success(&self) {
        tracing::trace!("haptic success (stub)");
    }
}
