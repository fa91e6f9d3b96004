//! The tesseract command line tool as an [`OcrEngine`].
//!
//! Every call writes the frame to a temporary PNG and runs
//! `tesseract <png> stdout -l <language>`.

use std::{
    env,
    ffi::OsString,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context;
use image::{GrayImage, ImageFormat};
use tracing::{debug, info};

use super::OcrEngine;
use crate::error::{Error, Result};

/// Environment variable consulted when no command is configured
pub const TESSERACT_CMD_ENV: &str = "TESSERACT_CMD";

#[cfg(windows)]
const TESSERACT_BIN: &str = "tesseract.exe";
#[cfg(not(windows))]
const TESSERACT_BIN: &str = "tesseract";

fn default_locations() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![
            PathBuf::from(r"C:\Program Files\Tesseract-OCR\tesseract.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/bin/tesseract"),
            PathBuf::from("/usr/local/bin/tesseract"),
            PathBuf::from("/opt/homebrew/bin/tesseract"),
        ]
    }
}

/// Locates the tesseract executable.
///
/// Looks at, in order: `explicit`, the [`TESSERACT_CMD_ENV`] variable, every
/// directory of `PATH`, then the usual install locations. An explicit or
/// environment path that does not exist is an error rather than a reason to
/// keep searching.
pub fn resolve_tesseract_cmd(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_with(
        explicit,
        env::var_os(TESSERACT_CMD_ENV),
        env::var_os("PATH"),
        &default_locations(),
    )
}

fn resolve_with(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    path_var: Option<OsString>,
    defaults: &[PathBuf],
) -> Result<PathBuf> {
    if let Some(cmd) = explicit {
        return if cmd.is_file() {
            Ok(cmd.to_path_buf())
        } else {
            Err(Error::Configuration(format!(
                "configured tesseract command {cmd:?} does not exist"
            )))
        };
    }

    if let Some(cmd) = env_value.filter(|v| !v.is_empty()) {
        let cmd = PathBuf::from(cmd);
        return if cmd.is_file() {
            Ok(cmd)
        } else {
            Err(Error::Configuration(format!(
                "{TESSERACT_CMD_ENV}={cmd:?} does not exist"
            )))
        };
    }

    let on_path = path_var
        .iter()
        .flat_map(env::split_paths)
        .map(|dir| dir.join(TESSERACT_BIN));
    on_path
        .chain(defaults.iter().cloned())
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            Error::Configuration(format!(
                "tesseract not found: set `ocr.cmd`, {TESSERACT_CMD_ENV} or add it to PATH"
            ))
        })
}

pub struct TesseractEngine {
    cmd: PathBuf,
}

impl TesseractEngine {
    /// Uses `cmd` as is, without checking it exists
    pub fn new(cmd: impl Into<PathBuf>) -> Self {
        Self { cmd: cmd.into() }
    }

    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let cmd = resolve_tesseract_cmd(explicit)?;
        info!("using tesseract at {:?}", cmd);
        Ok(Self::new(cmd))
    }

    pub fn cmd(&self) -> &Path {
        &self.cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize_text(&mut self, image: &GrayImage, language: &str) -> anyhow::Result<String> {
        let mut input = tempfile::Builder::new()
            .prefix("arh-ocr-")
            .suffix(".png")
            .tempfile()
            .context("failed to create temporary image")?;
        {
            let mut writer = BufWriter::new(input.as_file_mut());
            image
                .write_to(&mut writer, ImageFormat::Png)
                .context("failed to encode image for tesseract")?;
            writer.flush().context("failed to write image for tesseract")?;
        }

        debug!("running {:?} on {:?}", self.cmd, input.path());
        let output = Command::new(&self.cmd)
            .arg(input.path())
            .arg("stdout")
            .args(["-l", language])
            .output()
            .with_context(|| format!("failed to run {:?}", self.cmd))?;

        if !output.status.success() {
            anyhow::bail!(
                "{:?} exited with {}: {}",
                self.cmd,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
