//! Destination resolution and installation of downloaded exports

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Resolves the directory an exported archive lands in.
///
/// Rules, in order: no destination given uses `<work_dir>/<archive_stem>`;
/// a destination flag without a value (empty string) uses `<work_dir>/patch`;
/// an absolute destination is taken verbatim; anything else is joined onto
/// the working directory.
pub fn resolve_export_destination(
    work_dir: &Path,
    destination: Option<&str>,
    archive_stem: &str,
) -> PathBuf {
    resolve(work_dir, destination, work_dir.join(archive_stem), "patch")
}

/// Resolves the directory a compiled code export lands in.
///
/// Same rules as [`resolve_export_destination`], except that no destination
/// means the working directory itself and an empty destination falls back to
/// `<work_dir>/patch/js`.
pub fn resolve_code_destination(work_dir: &Path, destination: Option<&str>) -> PathBuf {
    resolve(work_dir, destination, work_dir.to_path_buf(), "patch/js")
}

fn resolve(
    work_dir: &Path,
    destination: Option<&str>,
    when_unset: PathBuf,
    empty_leaf: &str,
) -> PathBuf {
    match destination {
        None => when_unset,
        Some("") => work_dir.join(empty_leaf),
        Some(dest) if Path::new(dest).is_absolute() => PathBuf::from(dest),
        Some(dest) => work_dir.join(dest),
    }
}

/// Installs the downloaded archive at its final location.
///
/// With extraction on, unpacks into `final_dir` (creating it as needed) and
/// deletes the temporary archive afterwards; on failure the temporary file
/// stays behind for inspection. With extraction off, the archive is moved to
/// the name formed by appending `<archive_stem>.zip` directly to the
/// directory string; callers depend on this naming.
///
/// Returns the directory when extracted, the moved file otherwise.
pub fn install_archive(
    temp_file: &Path,
    final_dir: &Path,
    archive_stem: &str,
    extract: bool,
) -> Result<PathBuf> {
    if extract {
        info!(dir = %final_dir.display(), "extracting");
        extract_archive(temp_file, final_dir)?;
        std::fs::remove_file(temp_file)?;
        info!("finished");
        Ok(final_dir.to_path_buf())
    } else {
        let final_file = PathBuf::from(format!("{}{}.zip", final_dir.display(), archive_stem));
        move_file(temp_file, &final_file)?;
        info!(path = %final_file.display(), "archive kept");
        Ok(final_file)
    }
}

/// Writes a compiled code export as `ops.js` inside `final_dir`.
pub fn install_code(code: &str, final_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(final_dir)?;
    let final_file = final_dir.join("ops.js");
    info!(path = %final_file.display(), "saving compiled patch code");
    std::fs::write(&final_file, code)?;
    Ok(final_file)
}

// Every failure in here maps to Extract so the archive taxonomy stays in
// one variant, including plain filesystem errors while writing entries out.
fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let extract_err = |reason: String| Error::Extract {
        archive: archive_path.to_path_buf(),
        reason,
    };

    std::fs::create_dir_all(dest_dir)
        .map_err(|e| extract_err(format!("failed to create {}: {}", dest_dir.display(), e)))?;

    let file = std::fs::File::open(archive_path).map_err(|e| extract_err(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| extract_err(format!("failed to read zip archive: {}", e)))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extract_err(format!("failed to read zip entry: {}", e)))?;

        let entry_path = match entry.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => {
                warn!(entry = entry.name(), "skipping entry with unsafe path");
                continue;
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&entry_path).map_err(|e| {
                extract_err(format!("failed to create {}: {}", entry_path.display(), e))
            })?;
        } else {
            if let Some(parent) = entry_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    extract_err(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
            let entry_name = entry.name().to_string();
            let mut outfile = std::fs::File::create(&entry_path).map_err(|e| {
                extract_err(format!("failed to create {}: {}", entry_path.display(), e))
            })?;
            std::io::copy(&mut entry, &mut outfile)
                .map_err(|e| extract_err(format!("failed to extract {}: {}", entry_name, e)))?;
        }
    }
    Ok(())
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        // a destination on another filesystem cannot be renamed into place
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => std::fs::copy(from, to)
            .and_then(|_| std::fs::remove_file(from))
            .map_err(|e| Error::Rename {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                reason: e.to_string(),
            }),
        Err(e) => Err(Error::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}
