use std::collections::HashMap;
use std::path::{Path, PathBuf};

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};

// ---------------------------------------------------------------------------
// Company logo textures
// ---------------------------------------------------------------------------

/// Decoded logo textures, keyed by file path.
///
/// A logo that fails to decode is remembered as `None` so it is only tried
/// once; the marker then falls back to a pin.
#[derive(Default)]
pub struct LogoTextures {
    textures: HashMap<PathBuf, Option<TextureHandle>>,
}

impl LogoTextures {
    pub fn get(&mut self, ctx: &egui::Context, path: &Path) -> Option<&TextureHandle> {
        self.textures
            .entry(path.to_path_buf())
            .or_insert_with(|| match decode(path) {
                Ok(image) => {
                    log::debug!("Loaded logo {}", path.display());
                    Some(ctx.load_texture(path.display().to_string(), image, TextureOptions::LINEAR))
                }
                Err(e) => {
                    log::warn!("Cannot decode logo {}: {e}", path.display());
                    None
                }
            })
            .as_ref()
    }
}

fn decode(path: &Path) -> Result<ColorImage, image::ImageError> {
    let rgba = image::open(path)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_logos() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let ctx = egui::Context::default();
        let mut logos = LogoTextures::default();
        let texture = logos.get(&ctx, &path).expect("logo should load");
        assert_eq!(texture.size(), [3, 2]);
    }

    #[test]
    fn undecodable_logo_is_cached_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let ctx = egui::Context::default();
        let mut logos = LogoTextures::default();
        assert!(logos.get(&ctx, &path).is_none());
        assert!(logos.textures.contains_key(&path));
    }
}
