//! abigen CLI plumbing.
//!
//! The binary is a thin collaborator around [`abi_codegen::generate`]: it
//! reads the manifest, hands the parsed IR to the core, and writes each
//! returned file verbatim under the output directory. The core never
//! touches the filesystem and never logs; everything user-visible happens
//! here.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use abi_codegen::{generate, FileMap, GenerateError, GenerateOptions};
use abi_ir::Manifest;

/// Parsed command-line options.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub manifest_path: PathBuf,
    pub output_dir: PathBuf,
    pub language: String,
    pub overwrite: bool,
    pub verbose: bool,
}

/// CLI failure: everything the binary reports before exiting non-zero.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error(transparent)]
    Manifest(#[from] abi_ir::ManifestError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("file {0} already exists (use -overwrite to replace)")]
    WouldClobber(PathBuf),
}

fn io_error(path: &Path, err: &std::io::Error) -> CliError {
    CliError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub plugin_name: String,
    pub plugin_version: String,
    pub method_count: usize,
    pub written: Vec<PathBuf>,
}

/// Read, parse, generate, and write.
pub fn run(options: &Options) -> Result<RunSummary, CliError> {
    let data = fs::read_to_string(&options.manifest_path)
        .map_err(|e| io_error(&options.manifest_path, &e))?;
    let manifest = Manifest::parse(&data)?;

    tracing::info!(
        plugin = manifest.name,
        version = manifest.version,
        methods = manifest.methods.len(),
        "parsed manifest"
    );

    let files = generate(&manifest, &options.language, &GenerateOptions::default())?;
    let written = write_files(&options.output_dir, &files, options.overwrite)?;

    Ok(RunSummary {
        plugin_name: manifest.name,
        plugin_version: manifest.version,
        method_count: manifest.methods.len(),
        written,
    })
}

/// Write each generated file verbatim, creating parent directories.
/// Refuses to replace existing files unless `overwrite` is set; the check
/// runs over the whole map before anything is written, so a refused run
/// leaves the output directory untouched.
pub fn write_files(
    output_dir: &Path,
    files: &FileMap,
    overwrite: bool,
) -> Result<Vec<PathBuf>, CliError> {
    if !overwrite {
        for relative in files.keys() {
            let path = output_dir.join(relative);
            if path.exists() {
                return Err(CliError::WouldClobber(path));
            }
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for (relative, content) in files {
        let path = output_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }
        fs::write(&path, content).map_err(|e| io_error(&path, &e))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests;
