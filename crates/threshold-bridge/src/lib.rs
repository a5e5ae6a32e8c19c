// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Threshold — Native platform bridge abstractions.
//
// The editor core never talks to a camera, share sheet, or haptic engine
// directly. It goes through the traits here, and each target supplies an
// implementation.

pub mod traits;

pub mod stub;

pub use traits::{
    CameraAuthorization, CaptureCompletion, NativeCamera, NativeHaptics, NativeShare,
    PendingCapture, PlatformBridge, capture_channel,
};

/// Bridge implementation for the running process.
///
/// Mobile shells inject their native bridge directly. Everything else gets
/// the stub, which reports every native capability as unavailable.
pub fn platform_bridge() -> Box<dyn PlatformBridge> {
    Box::new(stub::StubBridge)
}
