// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless editor driver.
//
// Usage examples:
//   threshold --input photo.jpg --threshold 140 --output edit.png
//   threshold --debug-image --mode white --stroke 100,100,300,400
//   threshold -i scan.png --viewport 1000x1000 --stroke 500,500,600,500 --brush-size 8

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use threshold_bridge::{PlatformBridge, platform_bridge};
use threshold_core::error::{Result, ThresholdError};
use threshold_core::human_errors::humanize_error;
use threshold_core::{BrushMode, EditorConfig, Point, Size};
use threshold_editor::{EditorController, EditorEvent, EditorHandle, EditorSession};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::coordinator::{AppCoordinator, Route};
use crate::data_dir;

/// Threshold headless editor.
///
/// Binarize a photo, paint black/white overrides, and export a PNG.
#[derive(Parser, Debug)]
#[command(name = "threshold", about = "Threshold black/white photo editor")]
pub struct CliArgs {
    /// Photo to edit. Without this (or --debug-image) the camera is used.
    #[arg(short, long, value_name = "FILE", conflicts_with = "debug_image")]
    pub input: Option<PathBuf>,

    /// Edit the built-in 200x250 test gradient.
    #[arg(long)]
    pub debug_image: bool,

    /// Threshold value, 1-255. Defaults to the configured value.
    #[arg(short, long, value_name = "1-255")]
    pub threshold: Option<f64>,

    /// Brush radius in view points, 2-80.
    #[arg(short, long, value_name = "POINTS")]
    pub brush_size: Option<f32>,

    /// Brush paint mode: black or white.
    #[arg(short, long, value_parser = parse_mode, value_name = "MODE")]
    pub mode: Option<BrushMode>,

    /// Stroke segment in view coordinates. Repeatable.
    #[arg(short, long = "stroke", value_name = "X0,Y0,X1,Y1")]
    pub strokes: Vec<StrokeArg>,

    /// Size of the view strokes are given in. Defaults to the working size.
    #[arg(long, value_name = "WxH")]
    pub viewport: Option<ViewportArg>,

    /// Output PNG path. Defaults to the temp-directory export location.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Editor settings JSON. Defaults to the saved settings in the data dir.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save the effective settings to the data dir for later runs.
    #[arg(long)]
    pub save_config: bool,
}

/// One straight stroke segment `x0,y0,x1,y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeArg {
    pub from: Point,
    pub to: Point,
}

impl FromStr for StrokeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| format!("invalid stroke '{s}': {err}"))?;
        match values.as_slice() {
            &[x0, y0, x1, y1] => Ok(Self {
                from: Point::new(x0, y0),
                to: Point::new(x1, y1),
            }),
            _ => Err(format!("stroke '{s}' needs four numbers: x0,y0,x1,y1")),
        }
    }
}

/// Viewport size `WxH` in view points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportArg(pub Size);

impl FromStr for ViewportArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("viewport '{s}' must look like WIDTHxHEIGHT"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite() && *n > 0.0)
                .ok_or_else(|| format!("viewport '{s}' has a non-positive dimension"))
        };
        Ok(Self(Size::new(parse(w)?, parse(h)?)))
    }
}

fn parse_mode(s: &str) -> std::result::Result<BrushMode, String> {
    BrushMode::from_name(s).ok_or_else(|| format!("unknown brush mode '{s}' (black|white)"))
}

/// Run one edit and return an OS exit code.
pub async fn run(args: CliArgs) -> ExitCode {
    match edit(args).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, "edit failed");
            eprintln!("error: {}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn edit(args: CliArgs) -> Result<PathBuf> {
    let config = resolve_config(&args)?;
    let bridge: Arc<dyn PlatformBridge> = Arc::from(platform_bridge());
    tracing::info!(platform = bridge.platform_name(), "bridge ready");

    let source = acquire(&args, Arc::clone(&bridge)).await?;
    let viewport = args
        .viewport
        .map(|ViewportArg(size)| size)
        .unwrap_or_else(|| config.working_size().as_size());

    let session = EditorSession::new(source, config)?;
    let handle = EditorController::spawn(session);
    let haptics = forward_haptics(&handle, Arc::clone(&bridge));

    let result = drive(&handle, &args, viewport).await;
    // Shutdown fails only when the controller already stopped.
    let _ = handle.shutdown();
    haptics.abort();
    result
}

fn resolve_config(args: &CliArgs) -> Result<EditorConfig> {
    resolve_config_with(args, data_dir::data_dir)
}

/// Explicit `--config` file, else saved settings, else defaults.
///
/// `locate_dir` is only consulted when settings are loaded from or saved to it.
fn resolve_config_with(args: &CliArgs, locate_dir: impl Fn() -> PathBuf) -> Result<EditorConfig> {
    let config = match &args.config {
        Some(path) => data_dir::read_config_file(path)?,
        None => data_dir::load_config(&locate_dir()).unwrap_or_default(),
    };
    if args.save_config {
        data_dir::persist_config(&locate_dir(), &config)?;
    }
    Ok(config)
}

async fn acquire(args: &CliArgs, bridge: Arc<dyn PlatformBridge>) -> Result<image::DynamicImage> {
    let mut coordinator = AppCoordinator::new(bridge);

    if let Some(path) = &args.input {
        let photo = std::fs::read(path).map_err(|err| {
            ThresholdError::Acquisition(format!("could not read {}: {err}", path.display()))
        });
        coordinator.handle_capture(photo);
    } else if args.debug_image {
        coordinator.load_debug_image();
    } else {
        match coordinator.start() {
            Route::Camera => {
                coordinator.capture().await;
            }
            Route::PermissionDenied => return Err(ThresholdError::CameraDenied),
            _ => {}
        }
    }

    match coordinator.route() {
        Route::Failure { reason } => return Err(ThresholdError::Acquisition(reason.clone())),
        Route::PermissionDenied => return Err(ThresholdError::CameraDenied),
        _ => {}
    }
    coordinator
        .take_editor_image()
        .ok_or_else(|| ThresholdError::Acquisition("no photo was captured".into()))
}

async fn drive(handle: &EditorHandle, args: &CliArgs, viewport: Size) -> Result<PathBuf> {
    if let Some(size) = args.brush_size {
        handle.set_brush_size(size)?;
    }
    if let Some(mode) = args.mode {
        handle.set_brush_mode(mode)?;
    }
    if let Some(value) = args.threshold {
        handle.set_threshold(value)?;
    }
    for stroke in &args.strokes {
        handle.begin_stroke(stroke.from, viewport)?;
        handle.continue_stroke(stroke.from, stroke.to, viewport)?;
    }

    let settled = handle.settled().await?;
    tracing::info!(
        cutoff = settled.cutoff,
        overridden = settled.overridden_pixels,
        degraded = settled.degraded,
        "edit settled"
    );

    match &args.output {
        Some(path) => handle.export_to(path).await,
        None => handle.export().await,
    }
}

/// Play haptic feedback for edit events until the event stream closes.
fn forward_haptics(handle: &EditorHandle, bridge: Arc<dyn PlatformBridge>) -> JoinHandle<()> {
    let mut events = handle.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(EditorEvent::HistoryChanged { .. }) | Ok(EditorEvent::Reset) => bridge.tap(),
                Ok(EditorEvent::Exported { .. }) => bridge.success(),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "haptics fell behind editor events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stroke_segments() {
        let stroke: StrokeArg = "1,2.5, 3 ,4".parse().unwrap();
        assert_eq!(stroke.from, Point::new(1.0, 2.5));
        assert_eq!(stroke.to, Point::new(3.0, 4.0));
        assert!("1,2,3".parse::<StrokeArg>().is_err());
        assert!("a,b,c,d".parse::<StrokeArg>().is_err());
    }

    #[test]
    fn parses_viewport() {
        let ViewportArg(size) = "1000x800".parse().unwrap();
        assert_eq!(size, Size::new(1000.0, 800.0));
        assert!("0x800".parse::<ViewportArg>().is_err());
        assert!("1000".parse::<ViewportArg>().is_err());
    }

    #[test]
    fn cli_accepts_full_edit() {
        let args = CliArgs::try_parse_from([
            "threshold",
            "--debug-image",
            "--threshold",
            "140",
            "--mode",
            "white",
            "--stroke",
            "0,0,10,10",
            "--stroke",
            "5,5,6,6",
            "--viewport",
            "200x250",
        ])
        .unwrap();
        assert_eq!(args.mode, Some(BrushMode::White));
        assert_eq!(args.strokes.len(), 2);
        assert!(CliArgs::try_parse_from(["threshold", "--mode", "grey"]).is_err());
        assert!(CliArgs::try_parse_from(["threshold", "-i", "a.png", "--debug-image"]).is_err());
    }

    #[test]
    fn explicit_config_leaves_data_dir_alone() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        std::fs::write(&config_path, r#"{ "debounce_ms": 5 }"#).unwrap();
        let args =
            CliArgs::try_parse_from(["threshold", "--config", config_path.to_str().unwrap()])
                .unwrap();

        let config = resolve_config_with(&args, || panic!("data dir resolved")).unwrap();
        assert_eq!(config.debounce_ms, 5);
    }

    #[test]
    fn save_config_writes_into_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs::try_parse_from(["threshold", "--save-config"]).unwrap();
        let config = resolve_config_with(&args, || dir.path().to_path_buf()).unwrap();
        assert_eq!(data_dir::load_config(dir.path()), Some(config));
    }

    #[tokio::test]
    async fn debug_image_edit_exports_png() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let config = EditorConfig {
            working_width: 40,
            working_height: 50,
            debounce_ms: 0,
            ..EditorConfig::default()
        };
        std::fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();
        let output = dir.path().join("edit.png");

        let args = CliArgs::try_parse_from([
            "threshold",
            "--debug-image",
            "--config",
            config_path.to_str().unwrap(),
            "--stroke",
            "0,0,40,50",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let written = edit(args).await.unwrap();
        assert_eq!(written, output);
        let image = image::open(&output).unwrap();
        assert_eq!((image.width(), image.height()), (40, 50));
    }

    #[tokio::test]
    async fn camera_on_desktop_is_denied() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, "{}").unwrap();
        let args =
            CliArgs::try_parse_from(["threshold", "--config", config_path.to_str().unwrap()])
        .unwrap();
        assert!(matches!(edit(args).await, Err(ThresholdError::CameraDenied)));
    }
}
