//! I/O operations for exported duplicate indexes.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::{ExportError, ExportTarget};
use crate::duplicates::DuplicateIndex;

/// Indentation of exported documents.
const INDENT: &[u8] = b"    ";

impl DuplicateIndex {
    /// Write the index as pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the sink fails.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        self.write_json_named(writer, &ExportTarget::Stdout)
    }

    fn write_json_named<W: Write>(
        &self,
        mut writer: W,
        target: &ExportTarget,
    ) -> Result<(), ExportError> {
        let mut ser =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(INDENT));
        self.serialize(&mut ser).map_err(|e| {
            if e.is_io() {
                ExportError::io(target, io::Error::from(e))
            } else {
                ExportError::Format(e)
            }
        })?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|e| ExportError::io(target, e))
    }

    /// Render the index as a pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        let mut buf = Vec::new();
        self.write_json(&mut buf)?;
        String::from_utf8(buf).map_err(|e| ExportError::io("<memory>", io::Error::other(e)))
    }

    /// Export the index to stdout or to a file.
    ///
    /// File exports go through a sibling temporary file that is renamed over
    /// the destination, so readers never observe a half-written document.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the destination cannot be written.
    pub fn export(&self, target: &ExportTarget) -> Result<(), ExportError> {
        log::info!(
            "Exporting results [unique hashes={}, destination={}]",
            self.len(),
            target
        );

        match target {
            ExportTarget::Stdout => {
                let stdout = io::stdout();
                self.write_json_named(stdout.lock(), target)
            }
            ExportTarget::File(path) => self.save(path),
        }
    }

    /// Save the index to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        let target = ExportTarget::File(path.to_path_buf());
        let tmp = temp_sibling(path);

        let result = File::create(&tmp)
            .map_err(|e| ExportError::io(tmp.display(), e))
            .and_then(|file| self.write_json_named(BufWriter::new(file), &target))
            .and_then(|()| fs::rename(&tmp, path).map_err(|e| ExportError::io(&target, e)));

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    /// Parse an index from a reader.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Format`] if the document is malformed or a
    /// group is missing a field, [`ExportError::Io`] if reading fails.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ExportError> {
        let index: Self = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                ExportError::io("<reader>", io::Error::from(e))
            } else {
                ExportError::Format(e)
            }
        })?;

        for (fingerprint, problem) in index.inconsistencies() {
            log::warn!("Imported group {} is inconsistent: {}", fingerprint, problem);
        }

        Ok(index)
    }

    /// Parse an index from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Format`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        Self::from_reader(json.as_bytes())
    }

    /// Load an index previously written by [`DuplicateIndex::export`].
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be opened and
    /// [`ExportError::Format`] if it is not a valid index.
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let file = File::open(path).map_err(|e| ExportError::io(path.display(), e))?;
        let index = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            ExportError::Io { source, .. } => ExportError::io(path.display(), source),
            other => other,
        })?;

        log::info!(
            "Imported {} fingerprints from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }
}

/// `dir/.name.tmp` next to `path`.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
