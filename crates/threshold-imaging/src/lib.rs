// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// threshold-imaging — Imaging pipeline for the Threshold editor.
//
// Provides geometric preparation (center-crop, exact scale to the working
// resolution), grayscale extraction and global thresholding, the brush mask
// overlay with its circle-stamping renderer, and the mask-over-base composite.

pub mod brush;
pub mod mask;
pub mod processor;

// Re-export the primary structs so callers can use `threshold_imaging::ImageProcessor` etc.
pub use brush::BrushRenderer;
pub use mask::BrushMask;
pub use processor::ImageProcessor;
