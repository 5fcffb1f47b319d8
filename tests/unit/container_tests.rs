/*!
 * Tests for part discovery and container rebuild
 */

use anyhow::Result;
use zip::CompressionMethod;

use doctrans::container::{Container, ContainerRebuilder, text_bearing_parts};
use doctrans::errors::PipelineError;

use crate::common::{
    DOCUMENT_PART, FOOTER_PART, HEADER_PART, MEDIA_PART, build_archive, document_xml, paragraph, raw_entries,
    read_entry_string, sample_docx,
};

#[test]
fn test_textBearingParts_withSamplePackage_shouldListBodyHeaderFooter() -> Result<()> {
    let container = Container::read(&sample_docx(&[paragraph("Body")])?)?;

    let parts = text_bearing_parts(&container)?;

    assert_eq!(parts, vec![DOCUMENT_PART, HEADER_PART, FOOTER_PART]);
    Ok(())
}

#[test]
fn test_rebuild_shouldKeepOtherEntriesByteIdentical() -> Result<()> {
    let original = sample_docx(&[paragraph("Body")])?;
    let replacement = document_xml(&[paragraph("Cuerpo")]);
    let mut rebuilder = ContainerRebuilder::new().require(DOCUMENT_PART);
    rebuilder.replace(DOCUMENT_PART, replacement.clone());

    let outcome = rebuilder.rebuild(&original)?;

    let before = raw_entries(&original)?;
    let after = raw_entries(&outcome.bytes)?;
    assert_eq!(before.len(), after.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.0, new.0);
        if old.0 != DOCUMENT_PART {
            assert_eq!(old, new, "entry {} changed", old.0);
        }
    }
    assert_eq!(read_entry_string(&outcome.bytes, DOCUMENT_PART)?, replacement);
    assert_eq!(outcome.replaced, vec![DOCUMENT_PART.to_string()]);
    Ok(())
}

#[test]
fn test_rebuild_withStoredPart_shouldStayStored() -> Result<()> {
    let original = build_archive(&[
        (DOCUMENT_PART, document_xml(&[paragraph("Body")]).into_bytes(), CompressionMethod::Stored),
        (MEDIA_PART, vec![1, 2, 3], CompressionMethod::Stored),
    ])?;
    let mut rebuilder = ContainerRebuilder::new();
    rebuilder.replace(DOCUMENT_PART, document_xml(&[paragraph("Cuerpo")]));

    let outcome = rebuilder.rebuild(&original)?;

    let entries = raw_entries(&outcome.bytes)?;
    assert_eq!(entries[0].1, CompressionMethod::Stored);
    Ok(())
}

#[test]
fn test_rebuild_withMissingOptionalPart_shouldReportPartNotFound() -> Result<()> {
    let original = sample_docx(&[paragraph("Body")])?;
    let mut rebuilder = ContainerRebuilder::new().require(DOCUMENT_PART);
    rebuilder.replace("word/footnotes.xml", "<w:footnotes/>");

    let outcome = rebuilder.rebuild(&original)?;

    assert_eq!(
        outcome.skipped,
        vec![PipelineError::PartNotFound("word/footnotes.xml".to_string())]
    );
    assert_eq!(raw_entries(&outcome.bytes)?, raw_entries(&original)?);
    Ok(())
}

#[test]
fn test_rebuild_withMissingMandatoryPart_shouldBeInvalidContainer() -> Result<()> {
    let original = build_archive(&[(MEDIA_PART, vec![1, 2, 3], CompressionMethod::Stored)])?;
    let rebuilder = ContainerRebuilder::new().require(DOCUMENT_PART);

    let err = rebuilder.rebuild(&original).unwrap_err();

    assert!(matches!(err, PipelineError::InvalidContainer(_)));
    Ok(())
}
