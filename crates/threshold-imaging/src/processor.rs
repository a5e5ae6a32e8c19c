// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — center-crop, exact scale, grayscale, threshold, and
// mask compositing. Operates on in-memory images using the `image` crate.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};
use threshold_core::error::{Result, ThresholdError};
use threshold_core::paint::NEUTRAL;
use threshold_core::{EditorConfig, PixelSize};
use tracing::{debug, info, instrument};

use crate::mask::BrushMask;

/// Floating-point slack when snapping crop edges to whole pixels.
const EDGE_EPSILON: f64 = 1e-6;

/// Imaging pipeline bound to one fixed working resolution.
///
/// Every crop and scale targets `target`. Buffers are row-major with pixel
/// (0, 0) at the top-left, matching the `image` crate.
///
/// ```ignore
/// let processor = ImageProcessor::default();
/// let working = processor.prepare_working_image(&photo)?;
/// let base = processor.threshold(&working, 128)?;
/// let shown = processor.composite(&base, &mask);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageProcessor {
    target: PixelSize,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self {
            target: PixelSize::new(2000, 2500),
        }
    }
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor for the given working resolution.
    pub fn new(target: PixelSize) -> Result<Self> {
        if target.is_empty() {
            return Err(ThresholdError::InvalidDimensions {
                width: target.width,
                height: target.height,
            });
        }
        Ok(Self { target })
    }

    pub fn from_config(config: &EditorConfig) -> Result<Self> {
        Self::new(config.working_size())
    }

    // -- Accessors ------------------------------------------------------------

    /// Working resolution every prepared image is scaled to.
    pub fn target_size(&self) -> PixelSize {
        self.target
    }

    /// Width / height of the working resolution.
    pub fn target_aspect_ratio(&self) -> f64 {
        self.target.aspect_ratio()
    }

    // -- Geometry -------------------------------------------------------------

    /// Center-crop to the working aspect ratio, then scale to the working size.
    #[instrument(skip_all, fields(src_w = image.width(), src_h = image.height()))]
    pub fn prepare_working_image(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let cropped = self.center_crop(image, self.target_aspect_ratio())?;
        let scaled = self.scale(&cropped, self.target)?;
        info!(
            width = scaled.width(),
            height = scaled.height(),
            "Working image prepared"
        );
        Ok(scaled)
    }

    /// Crop the largest centred region with the given width/height ratio.
    ///
    /// Wider sources lose columns on both sides, taller sources lose rows top
    /// and bottom. The crop rectangle is rounded outward to whole pixels and
    /// never exceeds the source.
    #[instrument(skip(self, image), fields(src_w = image.width(), src_h = image.height()))]
    pub fn center_crop(&self, image: &DynamicImage, aspect_ratio: f64) -> Result<DynamicImage> {
        let (x, y, width, height) = crop_rect(image.width(), image.height(), aspect_ratio)?;
        debug!(x, y, width, height, "Center-cropping image");
        Ok(image.crop_imm(x, y, width, height))
    }

    /// Resample into a fresh image of exactly `size` (Lanczos3).
    #[instrument(skip(self, image), fields(from_w = image.width(), from_h = image.height()))]
    pub fn scale(&self, image: &DynamicImage, size: PixelSize) -> Result<DynamicImage> {
        check_dimensions(image.width(), image.height())?;
        check_dimensions(size.width, size.height)?;
        if image.width() == size.width && image.height() == size.height {
            return Ok(image.clone());
        }
        let scaled = image.resize_exact(size.width, size.height, FilterType::Lanczos3);
        debug!(new_w = scaled.width(), new_h = scaled.height(), "Scale complete");
        Ok(scaled)
    }

    // -- Tone -----------------------------------------------------------------

    /// Luminance as an 8-bit single-channel image of identical dimensions.
    pub fn grayscale(&self, image: &DynamicImage) -> Result<GrayImage> {
        check_dimensions(image.width(), image.height())?;
        Ok(image.to_luma8())
    }

    /// Binarize: luminance `>= cutoff` becomes 255, everything else 0.
    #[instrument(skip(self, image))]
    pub fn threshold(&self, image: &DynamicImage, cutoff: u8) -> Result<GrayImage> {
        let mut gray = self
            .grayscale(image)
            .map_err(|err| ThresholdError::ImageError(format!("grayscale extraction failed: {err}")))?;
        binarize_in_place(&mut gray, cutoff);
        debug!(width = gray.width(), height = gray.height(), "Threshold complete");
        Ok(gray)
    }

    // -- Compositing ----------------------------------------------------------

    /// Overlay `mask` on `base`: every non-neutral mask byte replaces the
    /// base pixel. Both must have the same dimensions.
    pub fn composite(&self, base: &GrayImage, mask: &BrushMask) -> GrayImage {
        debug_assert_eq!(
            (base.width(), base.height()),
            (mask.width(), mask.height()),
            "composite requires matching dimensions"
        );
        let mut output = base.clone();
        for (out, &value) in output.iter_mut().zip(mask.as_raw()) {
            if value != NEUTRAL {
                *out = value;
            }
        }
        output
    }

    /// Rebuild a displayable grayscale image from raw row-major bytes.
    pub fn make_image(&self, data: Vec<u8>, width: u32, height: u32) -> Result<GrayImage> {
        let expected = width as usize * height as usize;
        let actual = data.len();
        GrayImage::from_raw(width, height, data)
            .filter(|_| actual == expected)
            .ok_or(ThresholdError::BufferSizeMismatch { expected, actual })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode a grayscale image as single-channel PNG bytes.
    pub fn encode_png(&self, image: &GrayImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ThresholdError::Export(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Compute the center-crop rectangle `(x, y, width, height)` for a
/// `width`x`height` source and the requested aspect ratio.
pub fn crop_rect(width: u32, height: u32, aspect_ratio: f64) -> Result<(u32, u32, u32, u32)> {
    check_dimensions(width, height)?;
    if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
        return Err(ThresholdError::InvalidGeometry(format!(
            "crop aspect ratio {aspect_ratio} must be positive"
        )));
    }

    let (w, h) = (width as f64, height as f64);
    let (mut crop_w, mut crop_h) = (w, h);
    if w / h > aspect_ratio {
        crop_w = h * aspect_ratio;
    } else {
        crop_h = w / aspect_ratio;
    }

    let x = (w - crop_w) / 2.0;
    let y = (h - crop_h) / 2.0;

    // Outward "integral" rounding: floor the origin, ceil the far edge.
    let x0 = snap(x).floor().max(0.0);
    let y0 = snap(y).floor().max(0.0);
    let x1 = snap(x + crop_w).ceil().min(w);
    let y1 = snap(y + crop_h).ceil().min(h);

    let rect = (x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32);
    check_dimensions(rect.2, rect.3)?;
    Ok(rect)
}

/// Map every byte to 255 if `>= cutoff`, else 0.
pub fn binarize_in_place(gray: &mut GrayImage, cutoff: u8) {
    for value in gray.iter_mut() {
        *value = if *value >= cutoff { 255 } else { 0 };
    }
}

/// Round values within [`EDGE_EPSILON`] of an integer onto it so float noise
/// does not grow the crop by a pixel.
fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < EDGE_EPSILON {
        rounded
    } else {
        value
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ThresholdError::InvalidDimensions { width, height });
    }
    Ok(())
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};
    use threshold_core::paint::{BLACK, WHITE};

    fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
    }

    fn gray_from(pixels: &[u8], width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, pixels.to_vec()).unwrap())
    }

    #[test]
    fn wide_image_crops_to_portrait_center() {
        let processor = ImageProcessor::default();
        let cropped = processor
            .center_crop(&solid(4000, 2000, 128), processor.target_aspect_ratio())
            .unwrap();
        assert_eq!((cropped.width(), cropped.height()), (1600, 2000));
    }

    #[test]
    fn tall_image_crops_to_portrait_center() {
        let processor = ImageProcessor::default();
        let cropped = processor
            .center_crop(&solid(1800, 3000, 128), processor.target_aspect_ratio())
            .unwrap();
        assert_eq!((cropped.width(), cropped.height()), (1800, 2250));
    }

    #[test]
    fn crop_rect_is_centred() {
        assert_eq!(crop_rect(4000, 2000, 0.8).unwrap(), (1200, 0, 1600, 2000));
        assert_eq!(crop_rect(1800, 3000, 0.8).unwrap(), (0, 375, 1800, 2250));
    }

    #[test]
    fn crop_preserves_aspect_and_stays_inside_source() {
        let ratio = 0.8;
        for (w, h) in [(4032, 3024), (3024, 4032), (1000, 1000), (801, 999), (7, 5), (1, 3000)] {
            let (x, y, cw, ch) = crop_rect(w, h, ratio).unwrap();
            assert!(cw <= w && ch <= h, "{w}x{h} -> {cw}x{ch}");
            assert!(x + cw <= w && y + ch <= h);
            // Each edge rounds outward by less than one pixel.
            if (w as f64 / h as f64) > ratio {
                assert!((cw as f64 - h as f64 * ratio).abs() < 2.0);
                assert_eq!(ch, h);
            } else {
                assert!((ch as f64 - w as f64 / ratio).abs() < 2.0);
                assert_eq!(cw, w);
            }
        }
    }

    #[test]
    fn crop_keeps_top_left_origin() {
        // Left half black, right half white: a centred 1:1 crop of a 4x2
        // image keeps columns 1..3, so its left column is black.
        let mut img = GrayImage::from_pixel(4, 2, Luma([255]));
        for y in 0..2 {
            for x in 0..2 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        let processor = ImageProcessor::default();
        let cropped = processor.center_crop(&DynamicImage::ImageLuma8(img), 1.0).unwrap().to_luma8();
        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(cropped.get_pixel(0, 0).0[0], 0);
        assert_eq!(cropped.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn crop_rejects_degenerate_input() {
        assert!(crop_rect(0, 10, 0.8).is_err());
        assert!(crop_rect(10, 10, 0.0).is_err());
        assert!(crop_rect(10, 10, f64::NAN).is_err());
    }

    #[test]
    fn prepare_hits_working_resolution() {
        let processor = ImageProcessor::new(PixelSize::new(40, 50)).unwrap();
        let working = processor.prepare_working_image(&solid(120, 80, 90)).unwrap();
        assert_eq!((working.width(), working.height()), (40, 50));
    }

    #[test]
    fn zero_target_is_rejected() {
        assert!(ImageProcessor::new(PixelSize::new(0, 2500)).is_err());
    }

    #[test]
    fn threshold_produces_expected_pixels() {
        let processor = ImageProcessor::default();
        let out = processor.threshold(&gray_from(&[50, 150, 200, 10], 2, 2), 128).unwrap();
        assert_eq!(out.as_raw().as_slice(), &[0, 255, 255, 0]);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let processor = ImageProcessor::default();
        let out = processor.threshold(&gray_from(&[127, 128, 129], 3, 1), 128).unwrap();
        assert_eq!(out.as_raw().as_slice(), &[0, 255, 255]);
    }

    #[test]
    fn threshold_is_idempotent_on_binary_input() {
        let processor = ImageProcessor::default();
        let binary = [0u8, 255, 255, 0, 0, 255];
        for cutoff in [1u8, 2, 64, 128, 200, 254, 255] {
            let out = processor.threshold(&gray_from(&binary, 3, 2), cutoff).unwrap();
            assert_eq!(out.as_raw().as_slice(), &binary, "cutoff {cutoff}");
        }
    }

    #[test]
    fn threshold_output_is_strictly_binary() {
        let processor = ImageProcessor::default();
        let rgba = RgbaImage::from_fn(16, 16, |x, y| Rgba([(x * 16) as u8, (y * 16) as u8, 77, 255]));
        let out = processor.threshold(&DynamicImage::ImageRgba8(rgba), 100).unwrap();
        assert!(out.as_raw().iter().all(|&v| v == 0 || v == 255));
        assert_eq!(out.dimensions(), (16, 16));
    }

    #[test]
    fn composite_with_neutral_mask_is_identity() {
        let processor = ImageProcessor::default();
        let base = GrayImage::from_raw(3, 2, vec![0, 255, 0, 12, 99, 255]).unwrap();
        let out = processor.composite(&base, &BrushMask::new(3, 2));
        assert_eq!(out, base);
    }

    #[test]
    fn composite_overrides_non_neutral_pixels() {
        let processor = ImageProcessor::default();
        let base = GrayImage::from_raw(2, 2, vec![0, 0, 255, 255]).unwrap();
        let mut mask = BrushMask::new(2, 2);
        mask.set(0, 0, WHITE);
        mask.set(1, 1, BLACK);
        let out = processor.composite(&base, &mask);
        assert_eq!(out.as_raw().as_slice(), &[255, 0, 255, 0]);
    }

    #[test]
    fn make_image_checks_length() {
        let processor = ImageProcessor::default();
        assert!(processor.make_image(vec![0; 6], 3, 2).is_ok());
        match processor.make_image(vec![0; 5], 3, 2) {
            Err(ThresholdError::BufferSizeMismatch { expected, actual }) => {
                assert_eq!((expected, actual), (6, 5));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn png_output_decodes_as_single_channel() {
        let processor = ImageProcessor::default();
        let img = GrayImage::from_raw(2, 2, vec![0, 255, 255, 0]).unwrap();
        let bytes = processor.encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
        assert_eq!(decoded.to_luma8(), img);
    }
}
