//! Render command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::config::{merge_cli_overrides, CliOverrides};
use crate::output::{frame_to_image, save_png, scale_image};
use crate::scene::{Scene, SceneError};

use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the render command
pub fn run_render(
    scene_path: &Path,
    output: &Path,
    config_path: Option<&Path>,
    scale: u8,
    overrides: &CliOverrides,
) -> ExitCode {
    let mut config = match resolve_config(config_path, scene_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    merge_cli_overrides(&mut config, overrides);

    let scene = match Scene::load(scene_path) {
        Ok(scene) => scene,
        Err(SceneError::Io(e)) => {
            eprintln!("Error: Cannot open scene file '{}': {}", scene_path.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (layer, palette) = match scene.build(&config) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let viewport = layer.viewport();
    let stride = viewport.width as usize;
    let mut frame = vec![0u32; stride * viewport.height as usize];
    let report = layer.render(&mut frame, stride, &palette);
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning.message);
    }

    let image = scale_image(frame_to_image(&frame, viewport.width, viewport.height, stride), scale);
    if let Err(e) = save_png(&image, output) {
        eprintln!("Error: Failed to save '{}': {}", output.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Saved: {} ({} sprites drawn)", output.display(), report.drawn);
    ExitCode::from(EXIT_SUCCESS)
}
