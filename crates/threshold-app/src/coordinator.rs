// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// App coordinator — decides which screen the user sees and where the photo
// for the editor comes from.

use std::sync::Arc;

use image::{DynamicImage, Rgba, RgbaImage};
use threshold_bridge::{CameraAuthorization, PlatformBridge};
use threshold_core::error::{Result, ThresholdError};
use tracing::{info, warn};

/// Dimensions of the built-in test gradient.
const DEBUG_IMAGE_WIDTH: u32 = 200;
const DEBUG_IMAGE_HEIGHT: u32 = 250;

/// Top-level screen.
#[derive(Debug, Clone)]
pub enum Route {
    Camera,
    Editor(DynamicImage),
    PermissionDenied,
    /// Acquisition failed. Terminal until the user goes back to the camera.
    Failure { reason: String },
}

pub struct AppCoordinator {
    bridge: Arc<dyn PlatformBridge>,
    route: Route,
}

impl AppCoordinator {
    pub fn new(bridge: Arc<dyn PlatformBridge>) -> Self {
        Self {
            bridge,
            route: Route::Camera,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Resolve camera permission and pick the initial route.
    pub fn start(&mut self) -> &Route {
        self.route = match self.bridge.authorization_status() {
            CameraAuthorization::Authorized => Route::Camera,
            CameraAuthorization::NotDetermined => match self.bridge.request_access() {
                Ok(true) => Route::Camera,
                Ok(false) => Route::PermissionDenied,
                Err(err) => {
                    warn!(error = %err, "camera access request failed");
                    Route::PermissionDenied
                }
            },
            CameraAuthorization::Denied | CameraAuthorization::Restricted => {
                Route::PermissionDenied
            }
        };
        info!(route = route_name(&self.route), "coordinator started");
        &self.route
    }

    /// Take a photo through the bridge and open it in the editor.
    pub async fn capture(&mut self) -> &Route {
        let photo = self.bridge.capture_photo().wait().await;
        self.handle_capture(photo)
    }

    /// Route an encoded photo (or an acquisition error) to the editor.
    pub fn handle_capture(&mut self, photo: Result<Vec<u8>>) -> &Route {
        let decoded = photo.and_then(|bytes| {
            image::load_from_memory(&bytes)
                .map_err(|err| ThresholdError::Acquisition(format!("photo could not be decoded: {err}")))
        });
        self.route = match decoded {
            Ok(image) => {
                info!(width = image.width(), height = image.height(), "photo acquired");
                Route::Editor(image)
            }
            Err(err) => {
                warn!(error = %err, "photo acquisition failed");
                Route::Failure {
                    reason: err.to_string(),
                }
            }
        };
        &self.route
    }

    /// Open the editor on a synthetic gradient instead of a camera photo.
    pub fn load_debug_image(&mut self) -> &Route {
        self.route = Route::Editor(debug_image());
        &self.route
    }

    pub fn reset_to_camera(&mut self) -> &Route {
        self.route = Route::Camera;
        self.start()
    }

    /// Take the editor photo out of the route, leaving `Camera` behind.
    pub fn take_editor_image(&mut self) -> Option<DynamicImage> {
        match std::mem::replace(&mut self.route, Route::Camera) {
            Route::Editor(image) => Some(image),
            other => {
                self.route = other;
                None
            }
        }
    }
}

/// Horizontal grey ramp in red and blue with green fading out downwards.
pub fn debug_image() -> DynamicImage {
    let (w, h) = (DEBUG_IMAGE_WIDTH, DEBUG_IMAGE_HEIGHT);
    let image = RgbaImage::from_fn(w, h, |x, y| {
        let ramp = (x as f64 / (w - 1) as f64 * 255.0) as u8;
        let green = ((1.0 - y as f64 / h as f64) * 255.0) as u8;
        Rgba([ramp, green, ramp, 255])
    });
    DynamicImage::ImageRgba8(image)
}

fn route_name(route: &Route) -> &'static str {
    match route {
        Route::Camera => "camera",
        Route::Editor(_) => "editor",
        Route::PermissionDenied => "permission_denied",
        Route::Failure { .. } => "failure",
    }
}
