/*!
 * End-to-end tests for plain text and PDF documents
 */

use anyhow::Result;
use std::sync::Arc;

use doctrans::document::DocumentFormat;
use doctrans::errors::PipelineError;
use doctrans::extraction::PdfTextExtractor;
use doctrans::providers::MockTranslator;
use doctrans::{Config, DocumentPipeline, TranslationRequest};

use crate::common::recording_clients::RecordingTranslator;
use crate::common::text_pdf;

fn uppercase_pipeline() -> DocumentPipeline {
    DocumentPipeline::new(Config::default(), Arc::new(MockTranslator::uppercase()))
}

#[derive(Debug)]
struct FixedPdfText(&'static str);

impl PdfTextExtractor for FixedPdfText {
    fn extract_text(&self, _bytes: &[u8]) -> doctrans::errors::Result<String> {
        Ok(self.0.to_string())
    }
}

#[tokio::test]
async fn test_translate_plainText_shouldKeepLayoutAndByteOrderMark() -> Result<()> {
    let text = "\u{feff}Title line\n\nFirst paragraph\nwraps here.\n\n\n2024-03-01\n";

    let outcome = uppercase_pipeline()
        .translate(TranslationRequest::new(text, "text/plain; charset=utf-8"), None)
        .await?;

    assert_eq!(
        String::from_utf8(outcome.document.bytes)?,
        "\u{feff}TITLE LINE\n\nFIRST PARAGRAPH\nWRAPS HERE.\n\n\n2024-03-01\n"
    );
    assert_eq!(outcome.report.segments, 3);
    assert_eq!(outcome.report.passthrough_units, 1);
    Ok(())
}

#[tokio::test]
async fn test_translate_plainText_withLongParagraph_shouldSplitIntoSentences() -> Result<()> {
    let paragraph = "This sentence is fairly short. ".repeat(10);
    let paragraph = paragraph.trim_end();
    let mut config = Config::default();
    config.extraction.plain_text_max_segment_chars = 80;
    let client = RecordingTranslator::new(|text| Ok(text.to_uppercase()));
    let pipeline = DocumentPipeline::new(config, Arc::new(client.clone()));

    let outcome = pipeline.translate(TranslationRequest::new(paragraph.to_string(), "txt"), None).await?;

    assert!(outcome.report.segments > 1);
    assert_eq!(String::from_utf8(outcome.document.bytes)?, paragraph.to_uppercase());
    Ok(())
}

#[tokio::test]
async fn test_translate_plainText_withInvalidUtf8_shouldBeInvalidContainer() {
    let request = TranslationRequest::new(vec![b'o', b'k', 0xc3, 0x28], "txt");

    let err = uppercase_pipeline().translate(request, None).await.unwrap_err();

    assert!(matches!(err, PipelineError::InvalidContainer(_)));
}

#[tokio::test]
async fn test_translate_pdf_shouldEmitTranslatedText() -> Result<()> {
    let pdf = text_pdf(&["Annual report", "Prepared by the finance team"])?;

    let outcome = uppercase_pipeline()
        .translate(TranslationRequest::new(pdf, "application/pdf"), None)
        .await?;

    assert_eq!(outcome.document.format, DocumentFormat::PlainText);
    assert_eq!(outcome.document.extension, "txt");
    assert_eq!(
        String::from_utf8(outcome.document.bytes)?,
        "ANNUAL REPORT\n\nPREPARED BY THE FINANCE TEAM"
    );
    Ok(())
}

#[tokio::test]
async fn test_translate_pdf_withInjectedExtractor_shouldUseIt() -> Result<()> {
    let pipeline = DocumentPipeline::new(Config::default(), Arc::new(MockTranslator::prefix("[fr] ")))
        .with_pdf_extractor(Arc::new(FixedPdfText("Scanned page\n\nSecond block")));

    let outcome = pipeline
        .translate(TranslationRequest::new(b"%PDF-1.7 opaque".to_vec(), "pdf"), None)
        .await?;

    assert_eq!(
        String::from_utf8(outcome.document.bytes)?,
        "[fr] Scanned page\n\n[fr] Second block"
    );
    Ok(())
}

#[tokio::test]
async fn test_translate_pdf_withoutHeader_shouldBeInvalidContainer() {
    let request = TranslationRequest::new(b"GIF89a not a pdf".to_vec(), "application/pdf");

    let err = uppercase_pipeline().translate(request, None).await.unwrap_err();

    assert!(matches!(err, PipelineError::InvalidContainer(_)));
}
