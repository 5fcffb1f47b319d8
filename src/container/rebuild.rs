/*!
 * In-place part replacement for zip containers.
 *
 * Entries that are not replaced are copied with `raw_copy_file`, so their
 * compressed bytes, names and order come through exactly as they were.
 */

use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::{PipelineError, Result};

/// Result of a rebuild
#[derive(Debug)]
pub struct RebuildOutcome {
    /// The new archive
    pub bytes: Vec<u8>,
    /// Names of the parts that were replaced
    pub replaced: Vec<String>,
    /// Optional parts that were requested but not present
    pub skipped: Vec<PipelineError>,
}

/// Collects replacement parts and applies them to an original archive
#[derive(Debug, Default)]
pub struct ContainerRebuilder {
    replacements: BTreeMap<String, String>,
    mandatory: BTreeSet<String>,
}

impl ContainerRebuilder {
    /// Create a rebuilder with no replacements
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a part as mandatory: if it is absent the rebuild fails
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.mandatory.insert(name.into());
        self
    }

    /// Queue new content for a part
    pub fn replace(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.replacements.insert(name.into(), content.into());
    }

    /// Number of queued replacements
    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    /// Whether no replacement is queued
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Write a new archive from `original` with the queued replacements
    pub fn rebuild(&self, original: &[u8]) -> Result<RebuildOutcome> {
        let mut archive = ZipArchive::new(Cursor::new(original))?;
        let present: BTreeSet<String> = archive.file_names().map(str::to_string).collect();

        for name in &self.mandatory {
            if !present.contains(name) {
                return Err(PipelineError::InvalidContainer(format!("missing mandatory part {}", name)));
            }
        }

        let mut skipped = Vec::new();
        for name in self.replacements.keys() {
            if !present.contains(name) {
                warn!("Skipping replacement for absent part {}", name);
                skipped.push(PipelineError::PartNotFound(name.clone()));
            }
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut replaced = Vec::new();

        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index)?;
            let name = entry.name().to_string();

            match self.replacements.get(&name) {
                Some(content) => {
                    let method = match entry.compression() {
                        CompressionMethod::Stored => CompressionMethod::Stored,
                        _ => CompressionMethod::Deflated,
                    };
                    drop(entry);
                    let options = SimpleFileOptions::default().compression_method(method);
                    writer.start_file(name.as_str(), options)?;
                    writer.write_all(content.as_bytes())?;
                    replaced.push(name);
                }
                None => writer.raw_copy_file(entry)?,
            }
        }

        let bytes = writer.finish()?.into_inner();
        debug!(
            "Rebuilt container: {} parts replaced, {} skipped, {} bytes",
            replaced.len(),
            skipped.len(),
            bytes.len()
        );

        Ok(RebuildOutcome {
            bytes,
            replaced,
            skipped,
        })
    }
}
