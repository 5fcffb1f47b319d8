/*!
 * End-to-end tests for word-processing documents.
 *
 * Each test runs a whole request through `DocumentPipeline` and inspects
 * the rebuilt package.
 */

use anyhow::Result;
use std::sync::Arc;

use doctrans::document::DOCX_MIME;
use doctrans::errors::PipelineError;
use doctrans::providers::MockTranslator;
use doctrans::providers::mock::MockRequest;
use doctrans::{Config, DocumentPipeline, TranslationRequest};

use crate::common::recording_clients::RecordingTranslator;
use crate::common::{
    DOCUMENT_PART, FOOTER_PART, HEADER_PART, bold_paragraph, init_logging, minimal_docx, paragraph, raw_entries, read_entry_string,
    sample_docx, segment_texts,
};

fn pipeline(client: Arc<dyn doctrans::TranslationClient>) -> DocumentPipeline {
    DocumentPipeline::new(Config::default(), client)
}

fn spanish_scenario_a(_request: &MockRequest) -> String {
    "§Hola Mundo§Esta es una prueba§Probando traducción de documentos".to_string()
}

#[tokio::test]
async fn test_translate_scenarioA_shouldPlaceSpanishAtOriginalNodes() -> Result<()> {
    let docx = minimal_docx(&[
        paragraph("Hello World"),
        bold_paragraph("This is a test"),
        paragraph("Testing document translation"),
    ])?;
    let client = MockTranslator::identity().with_custom_response(spanish_scenario_a);

    let outcome = pipeline(Arc::new(client))
        .translate(TranslationRequest::new(docx, DOCX_MIME), None)
        .await?;

    let body = read_entry_string(&outcome.document.bytes, DOCUMENT_PART)?;
    assert!(body.contains("<w:p><w:r><w:t>Hola Mundo</w:t></w:r></w:p>"));
    assert!(body.contains("<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Esta es una prueba</w:t></w:r></w:p>"));
    assert!(body.contains("<w:p><w:r><w:t>Probando traducción de documentos</w:t></w:r></w:p>"));
    assert!(!body.contains('§'));
    assert_eq!(outcome.report.delimiter, '§');
    assert_eq!(outcome.report.translated_units, 3);
    assert!(outcome.report.is_complete());
    Ok(())
}

#[tokio::test]
async fn test_translate_withIdentityClient_shouldReproduceText() -> Result<()> {
    let paragraphs = [
        paragraph("Quarterly results"),
        bold_paragraph("Fish &amp; Chips"),
        "<w:p><w:r><w:t xml:space=\"preserve\">Leading </w:t></w:r><w:r><w:t>and trailing</w:t></w:r></w:p>".to_string(),
        paragraph("Revenue grew by 12%"),
    ];
    let docx = sample_docx(&paragraphs)?;

    let outcome = pipeline(Arc::new(MockTranslator::identity()))
        .translate(TranslationRequest::new(docx.clone(), "docx"), None)
        .await?;

    for part in [DOCUMENT_PART, HEADER_PART, FOOTER_PART] {
        let before = read_entry_string(&docx, part)?;
        let after = read_entry_string(&outcome.document.bytes, part)?;
        assert_eq!(segment_texts(part, &after)?, segment_texts(part, &before)?, "part {}", part);
    }
    Ok(())
}

#[tokio::test]
async fn test_translate_shouldPlaceEveryTranslationAtItsMarker() -> Result<()> {
    let paragraphs: Vec<String> = (1..=25).map(|n| paragraph(&format!("Item {}", n))).collect();
    let docx = minimal_docx(&paragraphs)?;

    let outcome = pipeline(Arc::new(MockTranslator::prefix("[es] ")))
        .translate(TranslationRequest::new(docx, DOCX_MIME), None)
        .await?;

    let body = read_entry_string(&outcome.document.bytes, DOCUMENT_PART)?;
    let expected: Vec<String> = (1..=25).map(|n| format!("[es] Item {}", n)).collect();
    assert_eq!(segment_texts(DOCUMENT_PART, &body)?, expected);
    Ok(())
}

#[tokio::test]
async fn test_translate_withNumericSegments_shouldPassThroughUnchanged() -> Result<()> {
    let docx = minimal_docx(&[
        paragraph("Invoice summary"),
        paragraph("2024-01-15"),
        paragraph("1,250.00 €"),
        paragraph("Due in 30 days"),
    ])?;
    let client = RecordingTranslator::new(|text| Ok(text.to_uppercase()));

    let outcome = pipeline(Arc::new(client.clone()))
        .translate(TranslationRequest::new(docx, DOCX_MIME), None)
        .await?;

    let body = read_entry_string(&outcome.document.bytes, DOCUMENT_PART)?;
    assert_eq!(
        segment_texts(DOCUMENT_PART, &body)?,
        vec!["INVOICE SUMMARY", "2024-01-15", "1,250.00 €", "DUE IN 30 DAYS"]
    );
    assert_eq!(outcome.report.passthrough_units, 2);

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "§Invoice summary§Due in 30 days");
    Ok(())
}

#[tokio::test]
async fn test_translate_withStrippedDelimiter_shouldFallBackWithoutMarkers() -> Result<()> {
    init_logging();
    let docx = sample_docx(&[paragraph("First paragraph"), paragraph("Second paragraph")])?;

    let outcome = pipeline(Arc::new(MockTranslator::stripping_delimiter()))
        .translate(TranslationRequest::new(docx.clone(), DOCX_MIME), None)
        .await?;

    let body = read_entry_string(&outcome.document.bytes, DOCUMENT_PART)?;
    assert!(!body.contains(outcome.report.delimiter));
    assert_eq!(
        segment_texts(DOCUMENT_PART, &body)?,
        vec!["First paragraph", "Second paragraph"]
    );
    assert!(matches!(
        outcome.report.issues[0].error,
        PipelineError::TranslationDegraded { chunk: 0, .. }
    ));
    assert_eq!(outcome.report.translated_units, 0);
    Ok(())
}

#[tokio::test]
async fn test_translate_shouldLeaveNonTextEntriesByteIdentical() -> Result<()> {
    let docx = sample_docx(&[paragraph("Translate me")])?;

    let outcome = pipeline(Arc::new(MockTranslator::uppercase()))
        .translate(TranslationRequest::new(docx.clone(), DOCX_MIME), None)
        .await?;

    let before = raw_entries(&docx)?;
    let after = raw_entries(&outcome.document.bytes)?;
    let names: Vec<&str> = after.iter().map(|entry| entry.0.as_str()).collect();
    assert_eq!(names, before.iter().map(|entry| entry.0.as_str()).collect::<Vec<_>>());

    for (old, new) in before.iter().zip(&after) {
        if [DOCUMENT_PART, HEADER_PART, FOOTER_PART].contains(&old.0.as_str()) {
            continue;
        }
        assert_eq!(old, new, "entry {} changed", old.0);
    }
    assert_eq!(
        segment_texts(HEADER_PART, &read_entry_string(&outcome.document.bytes, HEADER_PART)?)?,
        vec!["COMPANY CONFIDENTIAL"]
    );
    Ok(())
}

#[tokio::test]
async fn test_translate_withDelimiterInText_shouldUseNextCandidate() -> Result<()> {
    let docx = minimal_docx(&[paragraph("Clause § 4"), paragraph("Mark ¶ here")])?;
    let client = RecordingTranslator::echo();

    let outcome = pipeline(Arc::new(client.clone()))
        .translate(TranslationRequest::new(docx, DOCX_MIME), None)
        .await?;

    assert_eq!(outcome.report.delimiter, '†');
    assert_eq!(client.calls()[0].text, "†Clause § 4†Mark ¶ here");
    let body = read_entry_string(&outcome.document.bytes, DOCUMENT_PART)?;
    assert_eq!(segment_texts(DOCUMENT_PART, &body)?, vec!["Clause § 4", "Mark ¶ here"]);
    Ok(())
}

#[tokio::test]
async fn test_translate_withEscapedSectionSign_shouldStillTranslateEverything() -> Result<()> {
    let docx = minimal_docx(&[paragraph("Hello World"), paragraph("See &#167; 4"), paragraph("Goodbye")])?;

    let outcome = pipeline(Arc::new(MockTranslator::uppercase()))
        .translate(TranslationRequest::new(docx, DOCX_MIME), None)
        .await?;

    assert_ne!(outcome.report.delimiter, '§');
    assert!(outcome.report.issues.is_empty(), "{:?}", outcome.report.issues);
    assert_eq!(outcome.report.translated_units, 3);
    assert_eq!(outcome.report.fallback_units, 0);
    let body = read_entry_string(&outcome.document.bytes, DOCUMENT_PART)?;
    assert_eq!(segment_texts(DOCUMENT_PART, &body)?, vec!["HELLO WORLD", "SEE § 4", "GOODBYE"]);
    Ok(())
}

#[tokio::test]
async fn test_translate_withUnknownFormat_shouldRejectBeforeParsing() -> Result<()> {
    let client = RecordingTranslator::echo();
    let request = TranslationRequest::new(b"definitely not a zip".to_vec(), "application/unknown");

    let err = pipeline(Arc::new(client.clone())).translate(request, None).await.unwrap_err();

    assert_eq!(err, PipelineError::UnsupportedFormat("application/unknown".to_string()));
    assert_eq!(client.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_translate_withCorruptArchive_shouldBeInvalidContainer() -> Result<()> {
    let client = RecordingTranslator::echo();
    let request = TranslationRequest::new(b"PK\x03\x04 truncated".to_vec(), DOCX_MIME);

    let err = pipeline(Arc::new(client.clone())).translate(request, None).await.unwrap_err();

    assert!(matches!(err, PipelineError::InvalidContainer(_)));
    assert_eq!(client.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_translate_withRequestLanguages_shouldOverrideConfig() -> Result<()> {
    let docx = minimal_docx(&[paragraph("Good morning")])?;
    let client = RecordingTranslator::echo();

    pipeline(Arc::new(client.clone()))
        .translate(TranslationRequest::new(docx, DOCX_MIME).with_languages("en", "fr"), None)
        .await?;

    let calls = client.calls();
    assert_eq!(calls[0].source_language, "en");
    assert_eq!(calls[0].target_language, "fr");
    Ok(())
}

#[test]
fn test_translate_fromSyncCaller_shouldWorkWithBlockOn() -> Result<()> {
    let docx = minimal_docx(&[paragraph("Plain sync call")])?;
    let pipeline = pipeline(Arc::new(MockTranslator::uppercase()));

    let outcome = tokio_test::block_on(pipeline.translate(TranslationRequest::new(docx, DOCX_MIME), None))?;

    let body = read_entry_string(&outcome.document.bytes, DOCUMENT_PART)?;
    assert_eq!(segment_texts(DOCUMENT_PART, &body)?, vec!["PLAIN SYNC CALL"]);
    Ok(())
}
