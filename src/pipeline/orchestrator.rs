/*!
 * Pipeline orchestrator for one document translation request.
 *
 * Stages run strictly in order:
 * 1. Extracting: route the document and pull segments out of it
 * 2. Chunking: group segments into units and units into chunks
 * 3. Translating: one client call per chunk, concurrently
 * 4. Reconstructing: match responses to segments, splice the skeleton
 * 5. Rebuilding: pack the reconstructed parts into the output document
 *
 * Format and container errors abort the request. Translation problems are
 * confined to their chunk and reported in the `PipelineReport`.
 */

use bytes::Bytes;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::progress::{PipelineStage, ProgressCallback, ProgressTracker};
use super::router::{FormatRouter, ProcessingPlan};
use super::strategy::DocumentStrategy;
use crate::app_config::Config;
use crate::document::{DocumentFormat, OutputDocument, SourceDocument};
use crate::errors::{PipelineError, Result};
use crate::extraction::{Extractor, PdfTextExtractor};
use crate::language_utils::{get_language_name, language_codes_match};
use crate::providers::TranslationClient;
use crate::translation::{BatchTranslator, ChunkIssue, Reconstructor, build_units, chunk_units};

/// One document to translate
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Raw document bytes
    pub document: Bytes,
    /// Declared format: MIME type or short tag
    pub format_tag: String,
    /// Overrides the configured source language
    pub source_language: Option<String>,
    /// Overrides the configured target language
    pub target_language: Option<String>,
}

impl TranslationRequest {
    pub fn new(document: impl Into<Bytes>, format_tag: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            format_tag: format_tag.into(),
            source_language: None,
            target_language: None,
        }
    }

    pub fn with_languages(mut self, source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        self.source_language = Some(source_language.into());
        self.target_language = Some(target_language.into());
        self
    }

    /// Size of the document in bytes
    pub fn size(&self) -> usize {
        self.document.len()
    }
}

/// What happened while processing a request
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub plan: ProcessingPlan,
    pub delimiter: char,
    pub segments: usize,
    pub units: usize,
    pub chunks: usize,
    /// Units replaced by their translation
    pub translated_units: usize,
    /// Units kept verbatim without a call
    pub passthrough_units: usize,
    /// Units kept in the original language after a failure or degradation
    pub fallback_units: usize,
    /// Per-chunk failures and degradations, in chunk order
    pub issues: Vec<ChunkIssue>,
    /// `PartNotFound` for optional parts that could not be replaced
    pub skipped_parts: Vec<PipelineError>,
    pub duration: Duration,
    pub stage: PipelineStage,
}

impl PipelineReport {
    /// Whether every unit sent for translation came back translated
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    /// Get a summary of the report
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("Duration: {:.2}s", self.duration.as_secs_f32()),
            format!(
                "Segments: {} in {} units / {} chunks ({})",
                self.segments, self.units, self.chunks, self.plan.strategy
            ),
            format!(
                "Translated: {}, passthrough: {}, fallback: {}",
                self.translated_units, self.passthrough_units, self.fallback_units
            ),
        ];
        if !self.issues.is_empty() {
            parts.push(format!("Issues: {}", self.issues.len()));
        }
        parts.join(" | ")
    }
}

/// Result of a successful request
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub document: OutputDocument,
    pub report: PipelineReport,
}

/// Document translation pipeline
///
/// Holds configuration and the injected client only; every request owns
/// its own intermediate data, so one pipeline can serve many documents
/// concurrently.
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    config: Config,
    client: Arc<dyn TranslationClient>,
    router: FormatRouter,
}

impl DocumentPipeline {
    /// Create a pipeline with the built-in strategies
    pub fn new(config: Config, client: Arc<dyn TranslationClient>) -> Self {
        let router = FormatRouter::new(config.routing.clone(), config.chunking.clone());
        Self { config, client, router }
    }

    /// Replace the strategy for a format
    pub fn with_strategy(mut self, format: DocumentFormat, strategy: Arc<dyn DocumentStrategy>) -> Self {
        self.router = self.router.with_strategy(format, strategy);
        self
    }

    /// Use a different PDF-to-text converter
    pub fn with_pdf_extractor(mut self, extractor: Arc<dyn PdfTextExtractor>) -> Self {
        self.router = self.router.with_pdf_extractor(extractor);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> &FormatRouter {
        &self.router
    }

    /// Routing decision for a request, without processing it
    pub fn plan(&self, request: &TranslationRequest) -> Result<ProcessingPlan> {
        self.router.plan(&request.format_tag, request.size())
    }

    /// Translate one document
    ///
    /// # Arguments
    /// * `request` - The document and its declared format
    /// * `progress` - Optional `(percentage, message)` sink
    pub async fn translate(
        &self,
        request: TranslationRequest,
        progress: Option<ProgressCallback>,
    ) -> Result<TranslationOutcome> {
        let tracker = ProgressTracker::new(progress);

        match self.run(request, &tracker).await {
            Ok(outcome) => {
                tracker.complete("Translation complete");
                info!("{}", outcome.report.summary());
                Ok(outcome)
            }
            Err(e) => {
                tracker.fail(&e);
                Err(e)
            }
        }
    }

    fn extractor(&self) -> Extractor {
        let extraction = &self.config.extraction;
        Extractor::new()
            .with_delimiters(extraction.delimiters.clone())
            .with_attributes(extraction.record_attributes)
            .with_plain_text_max_segment_chars(extraction.plain_text_max_segment_chars)
    }

    async fn run(&self, request: TranslationRequest, tracker: &ProgressTracker) -> Result<TranslationOutcome> {
        let start_time = Instant::now();

        // Routing comes first so unknown formats are rejected before parsing
        let plan = self.plan(&request)?;
        let strategy = self.router.strategy(plan.format)?;

        let source_language = request.source_language.unwrap_or_else(|| self.config.source_language.clone());
        let target_language = request.target_language.unwrap_or_else(|| self.config.target_language.clone());
        log_languages(&source_language, &target_language);

        let source = SourceDocument::new(request.document, plan.format);

        // Stage 1: extraction
        tracker.advance(PipelineStage::Extracting);
        tracker.report(5, &format!("Extracting text ({} strategy)", strategy.name()));
        let extraction = strategy.extract(&source, &self.extractor())?;
        tracker.report(15, &format!("Extracted {} segments", extraction.segments.len()));

        // Stage 2: chunking
        tracker.advance(PipelineStage::Chunking);
        let units = build_units(&extraction.segments, self.config.translation.unit);
        let chunks = chunk_units(&units, plan.limits);
        info!(
            "{} segments grouped into {} units and {} chunks",
            extraction.segments.len(),
            units.len(),
            chunks.len()
        );
        tracker.report(20, &format!("Prepared {} chunks", chunks.len()));

        // Stage 3: translation
        tracker.advance(PipelineStage::Translating);
        let translator = BatchTranslator::new(Arc::clone(&self.client))
            .with_concurrency(self.config.translation.concurrent_requests)
            .with_timeout(self.config.translation.request_timeout())
            .with_passthrough(self.config.translation.passthrough_numeric);
        let requests = translator.prepare(&chunks, &units, extraction.delimiter);
        let results = translator
            .translate_chunks(requests, &source_language, &target_language, |done, total| {
                let percent = 20 + (65 * done / total.max(1)) as u8;
                tracker.report(percent, &format!("Translated chunk {} of {}", done, total));
            })
            .await;

        // Stage 4: reconstruction
        tracker.advance(PipelineStage::Reconstructing);
        tracker.report(90, "Reconstructing document");
        let reconstructor = Reconstructor::new(extraction.delimiter, self.config.translation.redistribution);
        let resolution = reconstructor.resolve(&extraction.segments, &units, &results);
        let parts = reconstructor.apply(&extraction.skeleton, &resolution.segment_texts)?;

        // Stage 5: rebuild
        tracker.advance(PipelineStage::Rebuilding);
        tracker.report(95, "Rebuilding document");
        let rebuilt = strategy.rebuild(&source, parts)?;
        tracker.advance(PipelineStage::Done);

        for issue in &resolution.issues {
            warn!("Chunk {}: {}", issue.chunk_index + 1, issue.error);
        }

        let report = PipelineReport {
            plan,
            delimiter: extraction.delimiter,
            segments: extraction.segments.len(),
            units: units.len(),
            chunks: chunks.len(),
            translated_units: resolution.translated_units,
            passthrough_units: resolution.passthrough_units,
            fallback_units: resolution.fallback_units,
            issues: resolution.issues,
            skipped_parts: rebuilt.skipped,
            duration: start_time.elapsed(),
            stage: PipelineStage::Done,
        };

        Ok(TranslationOutcome {
            document: rebuilt.output,
            report,
        })
    }
}

fn log_languages(source_language: &str, target_language: &str) {
    match (get_language_name(source_language), get_language_name(target_language)) {
        (Ok(source), Ok(target)) => debug!("Translating from {} to {}", source, target),
        _ => debug!("Translating from {} to {}", source_language, target_language),
    }
    if language_codes_match(source_language, target_language) {
        warn!(
            "Source and target language are the same ({} / {})",
            source_language, target_language
        );
    }
}
