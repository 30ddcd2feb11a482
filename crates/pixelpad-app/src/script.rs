//! Replayable editor scripts.
//!
//! A script is a JSON array of steps. Each step is either an editor intent
//! or a file step:
//!
//! ```json
//! [
//!   {"add_text": {"content": "Hello"}},
//!   {"import_image": {"path": "photo.jpg"}},
//!   "enter_freehand_draw",
//!   {"pointer": {"down": {"position": {"x": 10, "y": 10}}}},
//!   {"pointer": {"up": {"position": {"x": 90, "y": 40}}}},
//!   {"export_png": {}},
//!   {"export_pdf": {"path": "page.pdf"}}
//! ]
//! ```

use anyhow::{Context, Result};
use pixelpad_core::EditorIntent;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Steps that touch the filesystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStep {
    /// Import an image, relative to the script's directory.
    ImportImage { path: PathBuf },
    /// Write a PNG export, relative to the output directory.
    ExportPng {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// Write a PDF export, relative to the output directory.
    ExportPdf {
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

/// One script step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    File(FileStep),
    Intent(EditorIntent),
}

/// A parsed script and the directory its relative paths resolve against.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub steps: Vec<Step>,
    pub base_dir: PathBuf,
}

impl Script {
    pub fn from_json(json: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let steps: Vec<Step> = serde_json::from_str(json).context("invalid script")?;
        Ok(Self {
            steps,
            base_dir: base_dir.into(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let script = Self::from_json(&json, base_dir)
            .with_context(|| format!("failed to parse script {}", path.display()))?;
        log::info!("Loaded {} step(s) from {}", script.steps.len(), path.display());
        Ok(script)
    }

    /// Whether the script writes any export itself.
    pub fn has_exports(&self) -> bool {
        self.steps.iter().any(|step| {
            matches!(
                step,
                Step::File(FileStep::ExportPng { .. } | FileStep::ExportPdf { .. })
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelpad_core::StyleKind;

    #[test]
    fn test_parse_mixed_steps() {
        let script = Script::from_json(
            r#"[
                "enter_erase",
                {"import_image": {"path": "a.png"}},
                {"update_style": {"kind": "italic"}},
                {"export_png": {}},
                {"export_pdf": {"path": "x.pdf"}}
            ]"#,
            "/tmp",
        )
        .unwrap();

        assert_eq!(script.steps.len(), 5);
        assert_eq!(script.steps[0], Step::Intent(EditorIntent::EnterErase));
        assert_eq!(
            script.steps[1],
            Step::File(FileStep::ImportImage {
                path: PathBuf::from("a.png")
            })
        );
        assert_eq!(
            script.steps[2],
            Step::Intent(EditorIntent::UpdateStyle {
                kind: StyleKind::Italic
            })
        );
        assert_eq!(script.steps[3], Step::File(FileStep::ExportPng { path: None }));
        assert!(script.has_exports());
    }

    #[test]
    fn test_no_exports() {
        let script = Script::from_json(r#"["enter_freehand_draw"]"#, "").unwrap();
        assert!(!script.has_exports());
    }

    #[test]
    fn test_invalid_step() {
        assert!(Script::from_json(r#"["fly_to_moon"]"#, "").is_err());
    }
}
