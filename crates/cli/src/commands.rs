//! Subcommand implementations, writing their report to any `Write`

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use mathpaste_core::codec::{drops_drawing, encode_png_data_url};
use mathpaste_core::{read_math_file, write_math_file, FileFormat, MathDocument, SettingsStore};

pub fn inspect(path: &Path, out: &mut impl Write) -> Result<()> {
    let (format, document) = read_math_file(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;

    writeln!(out, "format: {}", format)?;
    writeln!(out, "math: {} characters", document.math_text.chars().count())?;
    if document.has_drawing() {
        writeln!(
            out,
            "drawing: {} bytes of vector data",
            document.drawing_vector_data.len()
        )?;
    } else {
        writeln!(out, "drawing: none")?;
    }
    Ok(())
}

pub fn cat(path: &Path, out: &mut impl Write) -> Result<()> {
    let (_, document) = read_math_file(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;
    out.write_all(document.math_text.as_bytes())?;
    Ok(())
}

pub fn pack(
    output: &Path,
    math: &Path,
    format: FileFormat,
    drawing: Option<(PathBuf, PathBuf)>,
    out: &mut impl Write,
) -> Result<()> {
    let math_text = fs::read_to_string(math)
        .with_context(|| format!("Cannot read math from '{}'", math.display()))?;

    let document = match drawing {
        Some((data_path, png_path)) => {
            let vector_data = fs::read_to_string(&data_path).with_context(|| {
                format!("Cannot read drawing data from '{}'", data_path.display())
            })?;
            let png = fs::read(&png_path)
                .with_context(|| format!("Cannot read PNG from '{}'", png_path.display()))?;
            MathDocument::with_drawing(math_text, vector_data, encode_png_data_url(&png))
        }
        None => MathDocument::new(math_text),
    };

    if drops_drawing(format, &document) {
        warn!("Text files can't hold drawings, saving math only");
        writeln!(out, "warning: your drawing wasn't saved (use --format zip)")?;
    }

    write_math_file(output, format, &document)
        .with_context(|| format!("Cannot save '{}'", output.display()))?;
    info!("Wrote {} as {}", output.display(), format);
    writeln!(out, "wrote {} ({})", output.display(), format)?;
    Ok(())
}

pub fn zoom(store: &mut SettingsStore, percent: Option<u32>, out: &mut impl Write) -> Result<()> {
    if let Some(percent) = percent {
        let mut sync = mathpaste_core::ZoomSync::default();
        sync.slider_changed(percent);
        sync.finish_apply();
        store.settings_mut().zoom = sync.percent();
        store
            .save()
            .with_context(|| format!("Cannot save settings to '{}'", store.path().display()))?;
    }

    writeln!(out, "zoom: {}%", store.settings().zoom)?;
    Ok(())
}
