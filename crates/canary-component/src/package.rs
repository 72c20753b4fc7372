//! Source packaging
//!
//! The synthetics Node.js runtime loads scripts from the
//! `nodejs/node_modules/` directory of the uploaded archive, so every
//! packaged file is placed under that prefix.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Prefix every archive entry is placed under
pub const ENTRY_PREFIX: &str = "nodejs/node_modules/";

/// Turns a source path into the archive uploaded as canary code
#[allow(async_fn_in_trait)]
pub trait SourcePackager: Send + Sync {
    async fn package(&self, src: &Path) -> Result<Vec<u8>>;
}

/// Packages a directory or an existing `.zip` file
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPackager;

impl SourcePackager for ZipPackager {
    async fn package(&self, src: &Path) -> Result<Vec<u8>> {
        let src = src.to_path_buf();
        tokio::task::spawn_blocking(move || package_blocking(&src))
            .await
            .context("Packaging task panicked")?
    }
}

fn package_blocking(src: &Path) -> Result<Vec<u8>> {
    let metadata =
        fs::metadata(src).with_context(|| format!("Source {} not found", src.display()))?;

    let bytes = if metadata.is_dir() {
        package_dir(src)?
    } else if src.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip")) {
        repackage_zip(src)?
    } else {
        anyhow::bail!(
            "Source {} must be a directory or a .zip file",
            src.display()
        );
    };

    debug!(src = %src.display(), bytes = bytes.len(), "Packaged canary source");
    Ok(bytes)
}

fn options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Archive-relative entry name with forward slashes
fn entry_name(relative: &Path) -> String {
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    format!("{ENTRY_PREFIX}{}", parts.join("/"))
}

/// All regular files below `root`, sorted for a stable archive layout.
///
/// Symlinks to files are packaged as their target's contents. Symlinks to
/// directories are not followed.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_symlink() && !path.is_file() {
                debug!(path = %path.display(), "Skipping symlink");
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn package_dir(root: &Path) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for path in collect_files(root)? {
        let relative = path.strip_prefix(root)?;
        let contents =
            fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;

        writer.start_file(entry_name(relative), options())?;
        writer.write_all(&contents)?;
    }

    Ok(writer.finish()?.into_inner())
}

fn repackage_zip(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive =
        ZipArchive::new(file).with_context(|| format!("Invalid zip file {}", path.display()))?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        // Entries escaping the archive root are dropped
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };

        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;

        writer.start_file(entry_name(&relative), options())?;
        writer.write_all(&contents)?;
    }

    Ok(writer.finish()?.into_inner())
}
