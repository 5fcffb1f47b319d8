/*!
 * Translation of extracted segments.
 *
 * - `units`: grouping segments into the units sent to the provider
 * - `chunker`: packing units into provider-sized chunks, stream splitting
 * - `passthrough`: units kept verbatim instead of translated
 * - `batch`: concurrent per-chunk calls to the translation client
 * - `reconstruct`: matching responses to segments and splicing the skeleton
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, ChunkRequest, ChunkTranslation};
pub use self::chunker::{Chunk, ChunkLimits, chunk_units, split_stream};
pub use self::passthrough::is_passthrough;
pub use self::reconstruct::{ChunkIssue, RebuiltPart, Reconstructor, Resolution, ResponseSplit, split_response};
pub use self::units::{RedistributionPolicy, TranslationUnit, UnitKind, build_units};

// Submodules
pub mod batch;
pub mod chunker;
pub mod passthrough;
pub mod reconstruct;
pub mod units;
