/*!
 * Batch translation processing.
 *
 * Chunks are turned into delimited request payloads and sent to the
 * translation client concurrently. Results always come back in chunk
 * order, whatever order the calls complete in.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use super::chunker::Chunk;
use super::passthrough::is_passthrough;
use super::units::TranslationUnit;
use crate::errors::ProviderError;
use crate::providers::TranslationClient;

/// One chunk ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRequest {
    pub chunk: Chunk,
    /// Positions (into the unit list) of the units in the payload, in order
    pub sent: Vec<usize>,
    /// `delimiter + text` for every sent unit; empty when nothing is sent
    pub payload: String,
}

/// Outcome of one chunk
#[derive(Debug, Clone)]
pub struct ChunkTranslation {
    pub chunk: Chunk,
    pub sent: Vec<usize>,
    /// `None` when the chunk held only passthrough units and no call was made
    pub response: Option<Result<String, ProviderError>>,
    pub duration: Duration,
}

/// Batch translator issuing one call per chunk
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// The injected translation client
    client: Arc<dyn TranslationClient>,

    /// Maximum number of concurrent requests
    max_concurrent_requests: usize,

    /// Per-call deadline
    request_timeout: Option<Duration>,

    /// Whether numeric/date/separator units bypass translation
    passthrough_numeric: bool,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(client: Arc<dyn TranslationClient>) -> Self {
        Self {
            client,
            max_concurrent_requests: 4,
            request_timeout: None,
            passthrough_numeric: true,
        }
    }

    pub fn with_concurrency(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests.max(1);
        self
    }

    pub fn with_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_passthrough(mut self, enabled: bool) -> Self {
        self.passthrough_numeric = enabled;
        self
    }

    /// Build the request payload for every chunk
    pub fn prepare(&self, chunks: &[Chunk], units: &[TranslationUnit], delimiter: char) -> Vec<ChunkRequest> {
        chunks
            .iter()
            .map(|chunk| {
                let sent: Vec<usize> = chunk
                    .range()
                    .filter(|&position| !(self.passthrough_numeric && is_passthrough(&units[position].text)))
                    .collect();

                let mut payload = String::new();
                for &position in &sent {
                    payload.push(delimiter);
                    payload.push_str(&units[position].text);
                }

                ChunkRequest {
                    chunk: chunk.clone(),
                    sent,
                    payload,
                }
            })
            .collect()
    }

    /// Translate every request, returning results sorted by chunk index
    pub async fn translate_chunks(
        &self,
        requests: Vec<ChunkRequest>,
        source_language: &str,
        target_language: &str,
        progress_callback: impl Fn(usize, usize) + Clone + Send,
    ) -> Vec<ChunkTranslation> {
        // Create a semaphore to limit concurrent requests
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_requests));

        // Track progress
        let total_chunks = requests.len();
        let processed_chunks = Arc::new(AtomicUsize::new(0));

        let mut results = stream::iter(requests)
            .map(|request| {
                let client = Arc::clone(&self.client);
                let semaphore = Arc::clone(&semaphore);
                let processed_chunks = Arc::clone(&processed_chunks);
                let progress_callback = progress_callback.clone();
                let request_timeout = self.request_timeout;

                async move {
                    let start_time = Instant::now();
                    let chunk_number = request.chunk.index + 1;

                    let response = if request.sent.is_empty() {
                        debug!("Chunk {} of {} is passthrough only, no call made", chunk_number, total_chunks);
                        None
                    } else {
                        // Acquire a permit from the semaphore
                        let _permit = semaphore.acquire().await.ok();
                        debug!(
                            "Processing chunk {} of {} ({} units, {} chars)",
                            chunk_number,
                            total_chunks,
                            request.sent.len(),
                            request.payload.chars().count()
                        );
                        Some(call(client.as_ref(), &request.payload, source_language, target_language, request_timeout).await)
                    };

                    let duration = start_time.elapsed();
                    match &response {
                        Some(Ok(_)) => debug!("Chunk {} completed in {:?}", chunk_number, duration),
                        Some(Err(e)) => warn!("Chunk {} failed: {}", chunk_number, e),
                        None => {}
                    }

                    // Update progress
                    let current = processed_chunks.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_chunks);

                    ChunkTranslation {
                        chunk: request.chunk,
                        sent: request.sent,
                        response,
                        duration,
                    }
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        // Sort results by chunk index to maintain original order
        results.sort_by_key(|result| result.chunk.index);

        let failed = results.iter().filter(|r| matches!(r.response, Some(Err(_)))).count();
        info!("Translated {} chunks ({} failed)", total_chunks, failed);
        results
    }
}

async fn call(
    client: &dyn TranslationClient,
    payload: &str,
    source_language: &str,
    target_language: &str,
    request_timeout: Option<Duration>,
) -> Result<String, ProviderError> {
    let translation = client.translate(payload, source_language, target_language);
    match request_timeout {
        Some(limit) => match tokio::time::timeout(limit, translation).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(whole_seconds(limit))),
        },
        None => translation.await,
    }
}

/// Seconds in `limit`, rounded up so sub-second deadlines never report 0
fn whole_seconds(limit: Duration) -> u64 {
    limit.as_secs() + u64::from(limit.subsec_nanos() > 0)
}
