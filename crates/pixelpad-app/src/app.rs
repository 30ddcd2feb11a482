//! Headless application: an editor driven by a script.

use crate::file_ops;
use crate::script::{FileStep, Script, Step};
use anyhow::{Context, Result};
use pixelpad_core::{DOCUMENT_FILE_NAME, Editor, EditorConfig, EditorError, RASTER_FILE_NAME};
use pixelpad_render::{FontBook, SoftwareEngine};
use std::path::{Path, PathBuf};

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Steps that were applied.
    pub applied: usize,
    /// Steps rejected by the editor (bad input, missing or undecodable images).
    pub rejected: usize,
    /// Files written, in order.
    pub written: Vec<PathBuf>,
}

/// An editor bound to the software engine plus an output directory.
pub struct App {
    editor: Editor<SoftwareEngine>,
    out_dir: PathBuf,
}

impl App {
    pub fn new(config: EditorConfig, fonts: FontBook, out_dir: impl Into<PathBuf>) -> Result<Self> {
        let editor = Editor::new(config, SoftwareEngine::with_fonts(fonts))
            .context("failed to create editor")?;
        Ok(Self {
            editor,
            out_dir: out_dir.into(),
        })
    }

    pub fn editor(&self) -> &Editor<SoftwareEngine> {
        &self.editor
    }

    /// Replay `script`. Writes `canvas.png` and `canvas.pdf` when the script
    /// has no export steps of its own.
    ///
    /// Rejected intents and imports, including unreadable import files, are
    /// logged and skipped; export failures abort the run.
    pub fn run(&mut self, script: &Script) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (index, step) in script.steps.iter().enumerate() {
            match self.run_step(step, &script.base_dir, &mut summary) {
                Ok(()) => summary.applied += 1,
                Err(StepError::Rejected(e)) => {
                    log::warn!("Step {} rejected: {e:#}", index + 1);
                    summary.rejected += 1;
                }
                Err(StepError::Fatal(e)) => {
                    return Err(e.context(format!("step {} failed", index + 1)));
                }
            }
        }

        if !script.has_exports() {
            self.export_png(None, &mut summary)?;
            self.export_pdf(None, &mut summary)?;
        }

        log::info!(
            "Run finished: {} applied, {} rejected, {} file(s) written",
            summary.applied,
            summary.rejected,
            summary.written.len()
        );
        Ok(summary)
    }

    fn run_step(
        &mut self,
        step: &Step,
        base_dir: &Path,
        summary: &mut RunSummary,
    ) -> Result<(), StepError> {
        match step {
            Step::Intent(intent) => self.editor.apply(intent.clone()).map_err(StepError::from),
            Step::File(FileStep::ImportImage { path }) => {
                let path = file_ops::resolve(base_dir, path);
                let bytes = file_ops::read_image(&path).map_err(StepError::Rejected)?;
                self.editor
                    .import_image(&bytes)
                    .map(|_| ())
                    .map_err(StepError::from)
            }
            Step::File(FileStep::ExportPng { path }) => self
                .export_png(path.as_deref(), summary)
                .map_err(StepError::Fatal),
            Step::File(FileStep::ExportPdf { path }) => self
                .export_pdf(path.as_deref(), summary)
                .map_err(StepError::Fatal),
        }
    }

    fn export_png(&mut self, path: Option<&Path>, summary: &mut RunSummary) -> Result<()> {
        let path = self.output_path(path, RASTER_FILE_NAME);
        let raster = self.editor.export_raster().context("raster export failed")?;
        file_ops::write_export(&path, &raster.bytes)?;
        summary.written.push(path);
        Ok(())
    }

    fn export_pdf(&mut self, path: Option<&Path>, summary: &mut RunSummary) -> Result<()> {
        let path = self.output_path(path, DOCUMENT_FILE_NAME);
        let bytes = self.editor.export_document().context("document export failed")?;
        file_ops::write_export(&path, &bytes)?;
        summary.written.push(path);
        Ok(())
    }

    fn output_path(&self, path: Option<&Path>, default_name: &str) -> PathBuf {
        match path {
            Some(path) => file_ops::resolve(&self.out_dir, path),
            None => self.out_dir.join(default_name),
        }
    }

    /// Release the editor's surface.
    pub fn shutdown(self) -> Result<()> {
        self.editor.dispose().context("failed to dispose editor")
    }
}

enum StepError {
    Rejected(anyhow::Error),
    Fatal(anyhow::Error),
}

impl From<EditorError> for StepError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::Decode(_) | EditorError::InvalidFontSize(_) => {
                StepError::Rejected(err.into())
            }
            other => StepError::Fatal(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelpad_core::Mode;
    use std::io::Cursor;

    fn png_file(dir: &Path, name: &str) -> PathBuf {
        let img = image::RgbaImage::from_pixel(20, 10, image::Rgba([0, 128, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, out.into_inner()).unwrap();
        path
    }

    fn small_config() -> EditorConfig {
        let mut config = EditorConfig::default();
        config.canvas.width = 200;
        config.canvas.height = 100;
        config
    }

    #[test]
    fn test_default_exports() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(small_config(), FontBook::new(), dir.path()).unwrap();
        let script = Script::from_json(r#"[{"add_text": {}}]"#, dir.path()).unwrap();

        let summary = app.run(&script).unwrap();
        assert_eq!(summary.applied, 1);
        assert_eq!(
            summary.written,
            vec![dir.path().join("canvas.png"), dir.path().join("canvas.pdf")]
        );

        let png = std::fs::read(dir.path().join("canvas.png")).unwrap();
        let image = image::load_from_memory(&png).unwrap();
        assert_eq!((image.width(), image.height()), (400, 200));

        let pdf = std::fs::read(dir.path().join("canvas.pdf")).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        app.shutdown().unwrap();
    }

    #[test]
    fn test_script_import_and_named_export() {
        let dir = tempfile::tempdir().unwrap();
        png_file(dir.path(), "leaf.png");
        let out = dir.path().join("out");
        let mut app = App::new(small_config(), FontBook::new(), &out).unwrap();

        let script = Script::from_json(
            r#"[
                {"import_image": {"path": "leaf.png"}},
                "enter_freehand_draw",
                {"change_font_size": {"size": 0}},
                {"export_png": {"path": "shot.png"}}
            ]"#,
            dir.path(),
        )
        .unwrap();
        let summary = app.run(&script).unwrap();

        assert_eq!(summary.applied, 3);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.written, vec![out.join("shot.png")]);
        assert!(!out.join("canvas.pdf").exists());
        assert_eq!(app.editor().scene().len(), 1);
        assert_eq!(app.editor().mode(), Mode::FreehandDraw);

        // image placed at (150, 150) is off this small canvas but still in the scene
        let png = std::fs::read(out.join("shot.png")).unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(image.get_pixel(10, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_corrupt_import_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"\x89PNG\r\n\x1a\nnope").unwrap();
        let mut app = App::new(small_config(), FontBook::new(), dir.path()).unwrap();
        let script = Script::from_json(
            r#"[{"import_image": {"path": "bad.png"}}, {"export_png": {}}]"#,
            dir.path(),
        )
        .unwrap();
        let summary = app.run(&script).unwrap();
        assert_eq!(summary.rejected, 1);
        assert!(app.editor().scene().is_empty());
    }

    #[test]
    fn test_missing_import_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(small_config(), FontBook::new(), dir.path()).unwrap();
        let script = Script::from_json(
            r#"[{"import_image": {"path": "missing.png"}}, {"add_text": {}}]"#,
            dir.path(),
        )
        .unwrap();
        let summary = app.run(&script).unwrap();
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.applied, 1);
        assert_eq!(app.editor().scene().len(), 1);
        assert!(dir.path().join("canvas.png").exists());
        assert!(dir.path().join("canvas.pdf").exists());
    }
}
