/*!
 * Archive reading and writing.
 *
 * A container is treated as an ordered set of named parts. Parts that look
 * like XML (`.xml`, `.rels`) and decode as UTF-8 are kept as strings, the
 * rest as raw bytes.
 */

use log::debug;
use std::io::{Cursor, Read, Write};
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::errors::{PipelineError, Result};

/// Content of one archive entry
#[derive(Debug, Clone, PartialEq)]
pub enum PartData {
    /// UTF-8 XML text
    Xml(String),
    /// Anything else (media, fonts, binary blobs)
    Binary(Vec<u8>),
}

impl PartData {
    /// Raw bytes of the part
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Xml(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

/// A named archive entry
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Path inside the archive
    pub name: String,
    /// Entry content
    pub data: PartData,
}

/// An archive decoded into parts, in archive order
#[derive(Debug, Clone, Default)]
pub struct Container {
    parts: Vec<Part>,
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an archive held in memory
    pub fn read(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let mut buffer = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buffer)?;

            let data = if is_xml_name(&name) {
                match String::from_utf8(buffer) {
                    Ok(text) => PartData::Xml(text),
                    Err(err) => PartData::Binary(err.into_bytes()),
                }
            } else {
                PartData::Binary(buffer)
            };

            parts.push(Part { name, data });
        }

        debug!("Read container with {} parts", parts.len());
        Ok(Self { parts })
    }

    /// Append a part
    pub fn push(&mut self, name: impl Into<String>, data: PartData) {
        self.parts.push(Part {
            name: name.into(),
            data,
        });
    }

    /// All parts in archive order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Part names in archive order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|part| part.name.as_str())
    }

    /// Look up a part by name
    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// XML text of a part
    pub fn xml(&self, name: &str) -> Result<&str> {
        match self.get(name).map(|part| &part.data) {
            Some(PartData::Xml(text)) => Ok(text),
            Some(PartData::Binary(_)) => Err(PipelineError::InvalidContainer(format!(
                "part {} is not UTF-8 XML",
                name
            ))),
            None => Err(PipelineError::PartNotFound(name.to_string())),
        }
    }

    /// Encode the parts as a fresh archive.
    ///
    /// Unlike `ContainerRebuilder` this recompresses every entry; use it to
    /// create new packages, not to edit existing ones.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for part in &self.parts {
            writer.start_file(part.name.as_str(), options)?;
            writer.write_all(part.data.as_bytes())?;
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// Whether an entry name is expected to hold XML
pub fn is_xml_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".xml") || lower.ends_with(".rels")
}
