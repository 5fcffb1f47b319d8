/*!
 * Document translation pipeline.
 *
 * - `router`: format tag and size to strategy and chunk limits
 * - `strategy`: per-format extraction and rebuild
 * - `progress`: stage machine and monotonic progress reporting
 * - `orchestrator`: runs one request through every stage
 */

pub use self::orchestrator::{DocumentPipeline, PipelineReport, TranslationOutcome, TranslationRequest};
pub use self::progress::{PipelineStage, ProgressCallback, ProgressTracker};
pub use self::router::{FormatRouter, ProcessingPlan, ProcessingStrategy};
pub use self::strategy::{
    DocumentStrategy, PLAIN_TEXT_PART, PdfTextStrategy, PlainTextStrategy, RebuiltDocument, WordprocessingStrategy,
};

pub mod orchestrator;
pub mod progress;
pub mod router;
pub mod strategy;
