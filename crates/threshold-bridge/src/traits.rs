// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.

use std::path::Path;

use threshold_core::error::{Result, ThresholdError};
use tokio::sync::oneshot;

/// Unified bridge that groups all native capabilities the app uses.
pub trait PlatformBridge: NativeCamera + NativeShare + NativeHaptics + Send + Sync {
    /// Human-readable platform name (e.g. "iOS 17", "Android 14").
    fn platform_name(&self) -> &str;
}

/// Camera permission as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAuthorization {
    Authorized,
    Denied,
    /// Blocked by policy (parental controls, MDM); the user cannot grant it.
    Restricted,
    NotDetermined,
}

/// Capture photos from the device camera.
pub trait NativeCamera {
    fn authorization_status(&self) -> CameraAuthorization;

    /// Prompt for camera access. `Ok(true)` when granted.
    fn request_access(&self) -> Result<bool>;

    /// Take one photo. The bytes are delivered later through the returned
    /// [`PendingCapture`].
    fn capture_photo(&self) -> PendingCapture;
}

/// Share content via the OS share sheet.
pub trait NativeShare {
    /// Offer a file to other apps via the native share sheet.
    fn share_file(&self, path: &Path, mime_type: &str) -> Result<()>;
}

/// Light tactile feedback.
pub trait NativeHaptics {
    fn tap(&self);
    fn success(&self);
}

type CaptureResult = Result<Vec<u8>>;

/// Create a linked completion/pending pair for one capture request.
pub fn capture_channel() -> (CaptureCompletion, PendingCapture) {
    let (tx, rx) = oneshot::channel();
    (CaptureCompletion { tx }, PendingCapture { rx })
}

/// Platform side of a capture: resolves the request exactly once.
#[derive(Debug)]
pub struct CaptureCompletion {
    tx: oneshot::Sender<CaptureResult>,
}

impl CaptureCompletion {
    /// Deliver the encoded photo.
    pub fn complete(self, photo: Vec<u8>) {
        let _ = self.tx.send(Ok(photo));
    }

    pub fn fail(self, error: ThresholdError) {
        let _ = self.tx.send(Err(error));
    }
}

/// App side of a capture: await the photo bytes.
#[derive(Debug)]
pub struct PendingCapture {
    rx: oneshot::Receiver<CaptureResult>,
}

impl PendingCapture {
    /// A capture that has already resolved.
    pub fn ready(result: Result<Vec<u8>>) -> Self {
        let (completion, pending) = capture_channel();
        match result {
            Ok(photo) => completion.complete(photo),
            Err(error) => completion.fail(error),
        }
        pending
    }

    /// Wait for the photo. A completion dropped without answering counts as
    /// an acquisition failure.
    pub async fn wait(self) -> Result<Vec<u8>> {
        self.rx.await.unwrap_or_else(|_| {
            Err(ThresholdError::Acquisition(
                "camera closed without delivering a photo".into(),
            ))
        })
    }
}
