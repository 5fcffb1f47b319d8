/*!
 * # doctrans - structure-preserving document translation
 *
 * Translates office documents while keeping every byte of formatting that
 * is not text.
 *
 * ## Features
 *
 * - Extract text nodes from WordprocessingML packages, plain text and PDF
 * - Replace each node with a numbered marker built on a delimiter that
 *   never occurs in the document
 * - Batch segments into bounded chunks and translate them concurrently
 * - Splice translations back by marker; failed or degraded chunks fall back
 *   to the original text instead of failing the request
 * - Rebuild the container with untouched parts copied byte for byte
 * - Stage-based progress reporting
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Source and output documents, format tags
 * - `container`: Zip package reading, part discovery, rebuilding
 * - `extraction`: Segments, markers and skeletons:
 *   - `extraction::delimiter`: Delimiter choice and marker parsing
 *   - `extraction::scanner`: Text node discovery in XML and plain text
 *   - `extraction::attributes`: Run and paragraph formatting
 *   - `extraction::pdf`: PDF to plain text
 * - `translation`: Units, chunking, batch calls and reconstruction:
 *   - `translation::units`: Translation units and text redistribution
 *   - `translation::chunker`: Chunk boundaries and text splitting
 *   - `translation::batch`: Concurrent chunk translation
 *   - `translation::reconstruct`: Response matching and marker splicing
 * - `pipeline`: Routing, strategies, progress and orchestration
 * - `providers`: The translation client seam and a scripted mock
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod container;
pub mod document;
pub mod errors;
pub mod extraction;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{DocumentFormat, OutputDocument, SourceDocument};
pub use errors::{PipelineError, ProviderError};
pub use extraction::{Extraction, Extractor, Segment, Skeleton};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use pipeline::{DocumentPipeline, PipelineReport, PipelineStage, TranslationOutcome, TranslationRequest};
pub use providers::{MockTranslator, TranslationClient};
