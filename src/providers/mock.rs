/*!
 * Mock translator for tests and demos.
 *
 * Behaviours operate on the delimited batch format, taking the delimiter
 * from the first character of the request:
 * - `MockTranslator::uppercase()` - Uppercases every entry
 * - `MockTranslator::prefix(tag)` - Prefixes every entry with `tag`
 * - `MockTranslator::stripping_delimiter()` - Simulates marker corruption
 * - `MockTranslator::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::TranslationClient;

/// Request as seen by a custom response generator
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The delimited batch text
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock translator
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Returns the request unchanged
    Identity,
    /// Uppercases the whole response
    Uppercase,
    /// Prefixes every entry with a fixed tag
    Prefix(String),
    /// Removes every delimiter from the response
    StripDelimiter,
    /// Drops the last entry of the response
    DropLast,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Sleeps, then answers like `Identity` (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock translator with scripted behaviour
#[derive(Debug, Clone)]
pub struct MockTranslator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    pub fn prefix(tag: impl Into<String>) -> Self {
        Self::new(MockBehavior::Prefix(tag.into()))
    }

    pub fn stripping_delimiter() -> Self {
        Self::new(MockBehavior::StripDelimiter)
    }

    pub fn dropping_last() -> Self {
        Self::new(MockBehavior::DropLast)
    }

    /// Create an intermittently failing mock
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Create a failing mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator, used instead of the behaviour
    /// whenever the request succeeds
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn respond(&self, request: &MockRequest) -> String {
        if let Some(generator) = self.custom_response {
            return generator(request);
        }

        let text = &request.text;
        let Some(delimiter) = text.chars().next() else {
            return String::new();
        };

        match &self.behavior {
            MockBehavior::Uppercase => text.to_uppercase(),
            MockBehavior::Prefix(tag) => text
                .split(delimiter)
                .skip(1)
                .map(|entry| format!("{}{}{}", delimiter, tag, entry))
                .collect(),
            MockBehavior::StripDelimiter => text.replace(delimiter, " ").trim_start().to_string(),
            MockBehavior::DropLast => match text.rfind(delimiter) {
                Some(last) if last > 0 => text[..last].to_string(),
                _ => String::new(),
            },
            _ => text.clone(),
        }
    }
}

#[async_trait]
impl TranslationClient for MockTranslator {
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };

        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
            MockBehavior::Intermittent { fail_every } if count % fail_every == fail_every - 1 => {
                Err(ProviderError::ApiError {
                    message: format!("Simulated intermittent failure (request #{})", count + 1),
                    status_code: 503,
                })
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.respond(&request))
            }
            _ => Ok(self.respond(&request)),
        }
    }
}
