//! Info command: sprite geometry and visibility for a scene

use std::path::Path;
use std::process::ExitCode;

use crate::layer::SpriteLayer;
use crate::scene::{Scene, SceneError};

use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the info command
pub fn run_info(scene_path: &Path, config_path: Option<&Path>) -> ExitCode {
    let config = match resolve_config(config_path, scene_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let built = Scene::load(scene_path).and_then(|scene| scene.build(&config));
    let layer = match built {
        Ok((layer, _)) => layer,
        Err(SceneError::Io(e)) => {
            eprintln!("Error: Cannot open scene file '{}': {}", scene_path.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    print!("{}", describe(&layer));
    ExitCode::from(EXIT_SUCCESS)
}

/// One header line for the viewport, then one line per sprite back to front.
fn describe(layer: &SpriteLayer) -> String {
    let vp = layer.viewport();
    let mut out = format!(
        "viewport {}x{} at ({}, {}), {} sprites, {} visible\n",
        vp.width,
        vp.height,
        vp.scroll_x,
        vp.scroll_y,
        layer.len(),
        layer.visible_priorities().len()
    );

    for entry in layer.sprites() {
        let b = entry.bounds();
        let s = entry.slice();
        let (sh, sv) = entry.scale();
        out.push_str(&format!(
            "{:>6}  bounds [{}, {})x[{}, {})  slice {}x{}+{}+{}  scale {}/{}  {} {}  {}\n",
            entry.priority(),
            b.left,
            b.right,
            b.top,
            b.bottom,
            s.width(),
            s.height(),
            s.left,
            s.top,
            sh.get(),
            sv.get(),
            entry.format(),
            entry.blend_mode(),
            if layer.is_visible(entry.priority()) { "visible" } else { "hidden" },
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{Bitmap, PixelFormat};

    #[test]
    fn test_describe_lists_sprites() {
        let mut layer = SpriteLayer::new(32, 32);
        let bmp = Bitmap::new(4, 4, PixelFormat::Indexed4, vec![0u8; 8]).unwrap();
        layer.add_sprite(bmp.clone(), 1, 0, 0).unwrap();
        layer.add_sprite(bmp, 2, 100, 0).unwrap();

        let text = describe(&layer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("2 sprites, 1 visible"));
        assert!(lines[1].ends_with("visible"));
        assert!(lines[1].contains("4bpp alpha"));
        assert!(lines[2].ends_with("hidden"));
    }
}
