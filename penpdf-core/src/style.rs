use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Rgb;

pub const STYLE_FILE_NAME: &str = "style.toml";

/// Colors and stroke width used for newly created annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    /// Ink stroke diameter in points.
    pub ink_thickness: f32,
    pub ink_color: Rgb,
    pub highlight_color: Rgb,
    pub underline_color: Rgb,
    pub strikeout_color: Rgb,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            ink_thickness: 10.0,
            ink_color: Rgb::new(0.0, 0.0, 0.0),
            highlight_color: Rgb::new(1.0, 1.0, 0.0),
            underline_color: Rgb::new(0.0, 0.0, 1.0),
            strikeout_color: Rgb::new(1.0, 0.0, 0.0),
        }
    }
}

impl AnnotationStyle {
    /// `<platform config dir>/style.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("net", "penpdf", "penpdf").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join(STYLE_FILE_NAME))
    }

    /// Reads a style file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&raw).map_err(|source| ConfigError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let payload = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        let mut file = File::create(&tmp).map_err(io_err)?;
        file.write_all(payload.as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    /// Stroke radius the engine expects for ink.
    pub fn ink_radius(&self) -> f32 {
        self.ink_thickness * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let style = AnnotationStyle::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(style, AnnotationStyle::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(STYLE_FILE_NAME);
        fs::write(
            &path,
            "ink_thickness = 4.0\n[highlight_color]\nr = 0.5\ng = 1.0\nb = 0.5\n",
        )
        .unwrap();

        let style = AnnotationStyle::load(&path).unwrap();
        assert_eq!(style.ink_thickness, 4.0);
        assert_eq!(style.ink_radius(), 2.0);
        assert_eq!(style.highlight_color, Rgb::new(0.5, 1.0, 0.5));
        assert_eq!(style.ink_color, AnnotationStyle::default().ink_color);
    }

    #[test]
    fn save_then_load_restores_style() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(STYLE_FILE_NAME);
        let style = AnnotationStyle {
            ink_thickness: 3.0,
            strikeout_color: Rgb::new(0.25, 0.0, 0.75),
            ..AnnotationStyle::default()
        };

        style.save(&path).unwrap();
        assert_eq!(AnnotationStyle::load(&path).unwrap(), style);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn malformed_file_reports_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(STYLE_FILE_NAME);
        fs::write(&path, "ink_thickness = \"thick\"").unwrap();
        assert!(matches!(
            AnnotationStyle::load(&path),
            Err(ConfigError::Decode { .. })
        ));
    }
}
