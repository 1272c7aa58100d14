use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use walkdir::WalkDir;

use crate::data::model::ImageRef;
use crate::error::IngestError;

const TIFF_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

// ---------------------------------------------------------------------------
// Resolving picture ids to files
// ---------------------------------------------------------------------------

/// Locations to try, in order, for a captured pattern. Empty for the dash.
///
/// The PNG mirror comes first, then the original capture directory. An id
/// that already carries an extension is tried verbatim before the guesses.
pub fn image_candidates(
    picture: Option<&ImageRef>,
    pattern_dir: &Path,
    png_dir: &Path,
) -> Vec<PathBuf> {
    let Some(picture) = picture else {
        return Vec::new();
    };
    let id = picture.as_str();

    let mut candidates = Vec::new();
    if Path::new(id).extension().is_some() {
        candidates.push(png_dir.join(id));
        candidates.push(pattern_dir.join(id));
    }
    candidates.push(png_dir.join(format!("{id}.png")));
    for ext in ["png", "tif", "tiff"] {
        candidates.push(pattern_dir.join(format!("{id}.{ext}")));
    }
    candidates
}

/// First candidate that exists on disk; `None` is the "no image" state.
pub fn resolve_image(picture: Option<&ImageRef>, pattern_dir: &Path, png_dir: &Path) -> Option<PathBuf> {
    image_candidates(picture, pattern_dir, png_dir)
        .into_iter()
        .find(|p| p.is_file())
}

// ---------------------------------------------------------------------------
// TIFF → PNG conversion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConvertReport {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Convert every TIFF under `in_dir` to PNG under `out_dir`, mirroring the
/// directory structure. Only the first frame is kept. Per-file failures are
/// counted and logged; the walk continues.
pub fn convert_tiff_tree(in_dir: &Path, out_dir: &Path, skip_existing: bool) -> Result<ConvertReport> {
    if !in_dir.is_dir() {
        return Err(IngestError::MissingSource {
            path: in_dir.to_path_buf(),
        }
        .into());
    }

    let mut sources = collect_tiffs(in_dir)?;
    sources.sort();

    let mut report = ConvertReport::default();
    for src in sources {
        report.total += 1;
        let rel = src.strip_prefix(in_dir).unwrap_or(&src);
        let dst = out_dir.join(rel).with_extension("png");

        if skip_existing && dst.exists() {
            report.skipped += 1;
            continue;
        }
        match convert_one(&src, &dst) {
            Ok(()) => {
                log::debug!("{} -> {}", src.display(), dst.display());
                report.converted += 1;
            }
            Err(e) => {
                log::warn!("failed to convert {}: {e:#}", src.display());
                report.failed += 1;
            }
        }
    }

    log::info!(
        "images: {} found, {} converted, {} skipped, {} failed",
        report.total,
        report.converted,
        report.skipped,
        report.failed
    );
    Ok(report)
}

/// TIFF files under `dir`. Symlinks are not followed, so a link back into
/// the tree cannot revisit it.
fn collect_tiffs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        if entry.file_type().is_file() && is_tiff(entry.path()) {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TIFF_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn convert_one(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let img = image::open(src).with_context(|| format!("decoding {}", src.display()))?;
    let img = match img.color() {
        image::ColorType::Rgb8 | image::ColorType::Rgba8 => img,
        image::ColorType::La8 | image::ColorType::La16 | image::ColorType::Rgba16 => {
            image::DynamicImage::ImageRgba8(img.to_rgba8())
        }
        _ => image::DynamicImage::ImageRgb8(img.to_rgb8()),
    };
    img.save_with_format(dst, image::ImageFormat::Png)
        .with_context(|| format!("encoding {}", dst.display()))?;
    Ok(())
}
