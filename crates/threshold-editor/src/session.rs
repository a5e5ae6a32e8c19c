// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor session — the single owner of working image, mask, history,
// threshold value, and brush settings.
//
// Threshold recomputes are split into a `ThresholdJob` (pure, runs anywhere)
// and `apply_threshold` (runs on the owner). A monotonically increasing
// generation counter makes sure only the most recent request is observed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use threshold_core::error::{Result, ThresholdError};
use threshold_core::{
    BrushMode, BrushSettings, BrushSize, EditorConfig, Point, Size, clamp_threshold,
    cutoff_from_value,
};
use threshold_imaging::{BrushMask, BrushRenderer, ImageProcessor};
use tracing::{debug, info, instrument, warn};

use crate::events::{EditorEvent, Listeners};
use crate::history::MaskHistory;
use crate::remap::ViewMapping;

/// A threshold recompute captured at request time.
///
/// Issuing a job makes every earlier one stale, so a dropped job leaves the
/// base image out of date.
#[derive(Debug, Clone)]
#[must_use = "the base image only updates once this job is run and applied"]
pub struct ThresholdJob {
    generation: u64,
    cutoff: u8,
    working: Arc<DynamicImage>,
    processor: ImageProcessor,
}

impl ThresholdJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }

    /// Binarize the captured working image. Touches no session state.
    #[instrument(skip(self), fields(generation = self.generation, cutoff = self.cutoff))]
    pub fn run(self) -> ThresholdOutcome {
        let result = self.processor.threshold(&self.working, self.cutoff);
        ThresholdOutcome {
            generation: self.generation,
            cutoff: self.cutoff,
            result,
        }
    }
}

/// Result of a [`ThresholdJob`], handed back to the session.
#[derive(Debug)]
pub struct ThresholdOutcome {
    pub(crate) generation: u64,
    pub(crate) cutoff: u8,
    pub(crate) result: Result<GrayImage>,
}

impl ThresholdOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Editing state for one photo.
pub struct EditorSession {
    config: EditorConfig,
    processor: ImageProcessor,
    renderer: BrushRenderer,
    working: Arc<DynamicImage>,
    degraded: bool,
    mask: BrushMask,
    history: MaskHistory,
    threshold_value: f64,
    brush: BrushSettings,
    generation: u64,
    base: Option<GrayImage>,
    rendered: Option<Arc<GrayImage>>,
    listeners: Listeners,
}

impl EditorSession {
    /// Start a session on `source`. The first threshold is not computed
    /// here; run [`EditorSession::initial_job`].
    #[instrument(skip_all, fields(src_w = source.width(), src_h = source.height()))]
    pub fn new(source: DynamicImage, config: EditorConfig) -> Result<Self> {
        let processor = ImageProcessor::from_config(&config)?;
        let (working, degraded) = prepare(&processor, source);
        let mask = BrushMask::with_size(config.working_size());
        let threshold_value = clamp_threshold(config.default_threshold);
        let brush = config.default_brush();
        let history = MaskHistory::new(config.history_limit);

        info!(
            width = mask.width(),
            height = mask.height(),
            degraded,
            "Editor session started"
        );

        Ok(Self {
            config,
            processor,
            renderer: BrushRenderer::new(),
            working: Arc::new(working),
            degraded,
            mask,
            history,
            threshold_value,
            brush,
            generation: 0,
            base: None,
            rendered: None,
            listeners: Listeners::default(),
        })
    }

    // -- Threshold ------------------------------------------------------------

    /// Job for the initial threshold value.
    #[must_use]
    pub fn initial_job(&mut self) -> ThresholdJob {
        self.set_threshold_value(self.threshold_value)
    }

    /// Store the slider value and return the job that recomputes the base.
    /// Any job issued earlier becomes stale.
    #[must_use]
    pub fn set_threshold_value(&mut self, value: f64) -> ThresholdJob {
        self.threshold_value = clamp_threshold(value);
        self.generation += 1;
        let job = ThresholdJob {
            generation: self.generation,
            cutoff: cutoff_from_value(self.threshold_value),
            working: Arc::clone(&self.working),
            processor: self.processor,
        };
        debug!(generation = job.generation, cutoff = job.cutoff, "Threshold job issued");
        job
    }

    /// Install a finished recompute. Returns `true` when it became the base.
    pub fn apply_threshold(&mut self, outcome: ThresholdOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                stale = outcome.generation,
                latest = self.generation,
                "Dropping stale threshold result"
            );
            return false;
        }

        let mut base = match outcome.result {
            Ok(base) => base,
            Err(err) => {
                warn!(error = %err, "Threshold recompute failed; keeping previous image");
                return false;
            }
        };

        if (base.width(), base.height()) != (self.mask.width(), self.mask.height()) {
            debug!(
                from_w = base.width(),
                from_h = base.height(),
                "Resizing thresholded base to mask resolution"
            );
            base = imageops::resize(&base, self.mask.width(), self.mask.height(), FilterType::Nearest);
        }

        self.base = Some(base);
        self.listeners.emit(&EditorEvent::ThresholdApplied {
            cutoff: outcome.cutoff,
        });
        self.render();
        true
    }

    /// Run and apply the current threshold inline.
    pub fn recompute_threshold(&mut self) -> bool {
        let job = self.set_threshold_value(self.threshold_value);
        self.apply_threshold(job.run())
    }

    // -- Strokes --------------------------------------------------------------

    /// Start a stroke at a view-space point.
    #[instrument(skip(self))]
    pub fn begin_stroke(&mut self, point: Point, viewport: Size) -> Result<()> {
        let mapping = ViewMapping::new(self.mask.size(), viewport)?;
        self.history.record(self.mask.clone());
        let at = mapping.to_working(point);
        self.paint(at, at, &mapping);
        self.publish_history();
        self.render();
        Ok(())
    }

    /// Extend the current stroke by a view-space segment.
    pub fn continue_stroke(&mut self, from: Point, to: Point, viewport: Size) -> Result<()> {
        let mapping = ViewMapping::new(self.mask.size(), viewport)?;
        self.paint(mapping.to_working(from), mapping.to_working(to), &mapping);
        self.render();
        Ok(())
    }

    fn paint(&mut self, from: Point, to: Point, mapping: &ViewMapping) {
        let radius = mapping.scale_length(f64::from(self.brush.size));
        self.renderer
            .apply_stroke(&mut self.mask, from, to, radius, self.brush.mode);
    }

    // -- History --------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(&self.mask) else {
            return false;
        };
        self.mask = previous;
        self.publish_history();
        self.render();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.mask) else {
            return false;
        };
        self.mask = next;
        self.publish_history();
        self.render();
        true
    }

    /// Clear the mask and history and return to the default threshold.
    #[must_use]
    pub fn reset(&mut self) -> ThresholdJob {
        self.mask.clear();
        self.history.clear();
        self.render();
        self.listeners.emit(&EditorEvent::Reset);
        self.publish_history();
        info!("Editor session reset");
        self.set_threshold_value(self.config.default_threshold)
    }

    // -- Export ---------------------------------------------------------------

    /// Export to the configured location in the OS temp directory.
    pub fn export(&self) -> Result<PathBuf> {
        self.export_to(&self.config.export_path())
    }

    /// Write the composited edit as a single-channel PNG at `path`.
    ///
    /// Any file already at `path` is removed first. On failure nothing is
    /// left at `path` and the session is unchanged.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn export_to(&self, path: &Path) -> Result<PathBuf> {
        remove_if_present(path)?;

        let base = self
            .base
            .as_ref()
            .ok_or_else(|| ThresholdError::Export("no thresholded image to export yet".into()))?;
        let composite = self.processor.composite(base, &self.mask);
        let (width, height) = composite.dimensions();
        let image = self
            .processor
            .make_image(composite.into_raw(), width, height)?;
        let bytes = self.processor.encode_png(&image)?;

        let partial = partial_path(path);
        if let Err(err) = std::fs::write(&partial, &bytes).and_then(|()| std::fs::rename(&partial, path)) {
            let _ = std::fs::remove_file(&partial);
            return Err(ThresholdError::Export(format!(
                "writing {} failed: {err}",
                path.display()
            )));
        }

        info!(bytes = bytes.len(), "Export written");
        self.listeners.emit(&EditorEvent::Exported {
            path: path.to_path_buf(),
        });
        Ok(path.to_path_buf())
    }

    // -- Source ---------------------------------------------------------------

    /// Swap in a new photo. The mask and history are kept.
    #[must_use]
    pub fn replace_source(&mut self, source: DynamicImage) -> ThresholdJob {
        let (working, degraded) = prepare(&self.processor, source);
        self.working = Arc::new(working);
        self.degraded = degraded;
        self.set_threshold_value(self.threshold_value)
    }

    // -- Brush ----------------------------------------------------------------

    pub fn set_brush_size(&mut self, size: f32) {
        self.brush = BrushSettings::new(size, self.brush.mode);
    }

    pub fn set_brush_preset(&mut self, preset: BrushSize) {
        self.set_brush_size(preset.radius());
    }

    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.brush.mode = mode;
    }

    // -- Observation ----------------------------------------------------------

    pub fn subscribe(&mut self, listener: impl Fn(&EditorEvent) + Send + 'static) {
        self.listeners.subscribe(listener);
    }

    pub fn threshold_value(&self) -> f64 {
        self.threshold_value
    }

    pub fn cutoff(&self) -> u8 {
        cutoff_from_value(self.threshold_value)
    }

    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    pub fn mask(&self) -> &BrushMask {
        &self.mask
    }

    pub fn working_image(&self) -> &DynamicImage {
        &self.working
    }

    /// Latest thresholded base, before brush overrides.
    pub fn base_image(&self) -> Option<&GrayImage> {
        self.base.as_ref()
    }

    /// Latest composite published to listeners.
    pub fn rendered_image(&self) -> Option<Arc<GrayImage>> {
        self.rendered.clone()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the working image is the raw source because crop/scale failed.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // -- Internals ------------------------------------------------------------

    fn render(&mut self) {
        let Some(base) = self.base.as_ref() else {
            return;
        };
        let composite = Arc::new(self.processor.composite(base, &self.mask));
        self.rendered = Some(Arc::clone(&composite));
        self.listeners.emit(&EditorEvent::Rendered(composite));
    }

    fn publish_history(&self) {
        self.listeners.emit(&EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("mask", &self.mask)
            .field("threshold_value", &self.threshold_value)
            .field("brush", &self.brush)
            .field("generation", &self.generation)
            .field("degraded", &self.degraded)
            .field("has_base", &self.base.is_some())
            .finish_non_exhaustive()
    }
}

/// Crop and scale `source`, falling back to the raw image on failure.
fn prepare(processor: &ImageProcessor, source: DynamicImage) -> (DynamicImage, bool) {
    match processor.prepare_working_image(&source) {
        Ok(working) => (working, false),
        Err(err) => {
            warn!(error = %err, "Working image preparation failed; using source as-is");
            (source, true)
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("export"));
    name.push(".partial");
    path.with_file_name(name)
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed previous export");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
