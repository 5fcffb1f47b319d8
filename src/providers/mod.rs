/*!
 * Translation provider seam.
 *
 * The pipeline depends on a single capability: translate one delimited
 * batch of text. Real clients (HTTP APIs, local models) live with the
 * caller and are injected as `Arc<dyn TranslationClient>`.
 *
 * - `mock`: scripted in-process translator for tests and demos
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Capability the pipeline consumes, invoked once per chunk
///
/// The request text is a sequence of `delimiter + text` entries. An
/// implementation is expected to return the same delimiters, in order,
/// each followed by the translation of its entry.
#[async_trait]
pub trait TranslationClient: Send + Sync + Debug {
    /// Translate a delimited batch
    ///
    /// # Arguments
    /// * `text` - Delimited batch text
    /// * `source_language` - Source language code
    /// * `target_language` - Target language code
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String, ProviderError>;
}

pub mod mock;

pub use self::mock::{MockBehavior, MockTranslator};
