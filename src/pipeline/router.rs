/*!
 * Format routing: which strategy handles a document, and how it is chunked.
 */

use log::{info, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::strategy::{DocumentStrategy, PdfTextStrategy, PlainTextStrategy, WordprocessingStrategy};
use crate::app_config::{ChunkingConfig, RoutingConfig};
use crate::document::DocumentFormat;
use crate::errors::{PipelineError, Result};
use crate::extraction::PdfTextExtractor;
use crate::translation::ChunkLimits;

/// How a document is batched for translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStrategy {
    /// As few calls as the whole-document character budget allows
    WholeDocument,
    /// Many bounded calls
    Chunked,
}

impl fmt::Display for ProcessingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WholeDocument => write!(f, "whole-document"),
            Self::Chunked => write!(f, "chunked"),
        }
    }
}

/// The router's decision for one document
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingPlan {
    pub format: DocumentFormat,
    pub strategy: ProcessingStrategy,
    /// Whole-document processing of a document near the chunking threshold
    pub caution: bool,
    /// Expected processing time, for progress displays
    pub estimated: Duration,
    pub limits: ChunkLimits,
}

/// Maps format tags to strategies and sizes to processing plans
#[derive(Debug, Clone)]
pub struct FormatRouter {
    routing: RoutingConfig,
    chunking: ChunkingConfig,
    strategies: HashMap<DocumentFormat, Arc<dyn DocumentStrategy>>,
}

impl FormatRouter {
    /// Router with the built-in strategy for every format
    pub fn new(routing: RoutingConfig, chunking: ChunkingConfig) -> Self {
        let mut strategies: HashMap<DocumentFormat, Arc<dyn DocumentStrategy>> = HashMap::new();
        strategies.insert(DocumentFormat::WordProcessing, Arc::new(WordprocessingStrategy));
        strategies.insert(DocumentFormat::PlainText, Arc::new(PlainTextStrategy));
        strategies.insert(DocumentFormat::Pdf, Arc::new(PdfTextStrategy::default()));

        Self {
            routing,
            chunking,
            strategies,
        }
    }

    /// Replace the strategy for a format
    pub fn with_strategy(mut self, format: DocumentFormat, strategy: Arc<dyn DocumentStrategy>) -> Self {
        self.strategies.insert(format, strategy);
        self
    }

    /// Use a different PDF-to-text converter
    pub fn with_pdf_extractor(self, extractor: Arc<dyn PdfTextExtractor>) -> Self {
        self.with_strategy(DocumentFormat::Pdf, Arc::new(PdfTextStrategy::new(extractor)))
    }

    /// Expected processing time; grows with size
    pub fn estimate_processing_time(&self, size: usize) -> Duration {
        let per_kib = Duration::from_millis(self.routing.estimate_ms_per_kib);
        let scaled_nanos = per_kib.as_nanos() * size as u128 / 1024;
        Duration::from_millis(self.routing.estimate_base_ms)
            + Duration::from_nanos(u64::try_from(scaled_nanos).unwrap_or(u64::MAX))
    }

    /// Plan processing for a document of `size` bytes declared as `format_tag`.
    ///
    /// Unknown tags fail with `UnsupportedFormat`; no byte is inspected.
    pub fn plan(&self, format_tag: &str, size: usize) -> Result<ProcessingPlan> {
        let format: DocumentFormat = format_tag.parse()?;
        if !self.strategies.contains_key(&format) {
            return Err(PipelineError::UnsupportedFormat(format_tag.to_string()));
        }

        let (strategy, caution) = if size < self.routing.whole_document_max_bytes {
            (ProcessingStrategy::WholeDocument, false)
        } else if size < self.routing.caution_max_bytes {
            (ProcessingStrategy::WholeDocument, true)
        } else {
            (ProcessingStrategy::Chunked, false)
        };

        let limits = match strategy {
            ProcessingStrategy::WholeDocument => self.chunking.whole_document_limits(),
            ProcessingStrategy::Chunked => self.chunking.chunked_limits(),
        };

        let plan = ProcessingPlan {
            format,
            strategy,
            caution,
            estimated: self.estimate_processing_time(size),
            limits,
        };

        if caution {
            warn!(
                "Document of {} bytes is near the chunking threshold; processing whole with caution",
                size
            );
        }
        info!(
            "Routing {} ({} bytes): {} strategy, estimated {:?}",
            format, size, plan.strategy, plan.estimated
        );
        Ok(plan)
    }

    /// Strategy registered for `format`
    pub fn strategy(&self, format: DocumentFormat) -> Result<Arc<dyn DocumentStrategy>> {
        self.strategies
            .get(&format)
            .cloned()
            .ok_or_else(|| PipelineError::UnsupportedFormat(format.to_string()))
    }
}
