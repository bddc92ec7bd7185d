//! Mock provider for tests and offline development.
//!
//! Replies are consumed in order; once the script runs out the fallback
//! reply (if any) is repeated.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A canned resource bundle, fenced the way Gemini usually answers.
pub const SAMPLE_BUNDLE: &str = r#"```json
{
  "scholarships_grants": [
    {
      "title": "Women in STEM Scholarship",
      "description": "Tuition support for undergraduate women studying science or engineering.",
      "deadline": "2025-03-31",
      "amount": "$5,000",
      "eligibility": "Full-time undergraduate students",
      "website": "https://example.org/stem-scholarship"
    }
  ],
  "career_opportunities": [
    {
      "title": "Software Engineering Intern",
      "description": "Summer internship on a backend platform team.",
      "location": "Remote",
      "type": "Internship",
      "duration": "12 weeks",
      "format": "Remote",
      "level": "Entry",
      "website": "https://example.org/careers/intern"
    }
  ],
  "mentorship_programs": [
    {
      "title": "Next Gen Mentors",
      "description": "One-on-one mentoring with industry professionals.",
      "mentors_available": 40,
      "duration": "6 months",
      "website": "https://example.org/mentors"
    }
  ],
  "skill_development": [
    {
      "title": "Data Analysis Fundamentals",
      "description": "Self-paced courses covering spreadsheets, SQL and visualisation.",
      "number_of_courses": 8,
      "level": "Beginner",
      "format": "Online",
      "website": "https://example.org/data-skills"
    }
  ]
}
```"#;

/// One scripted reply.
#[derive(Debug)]
pub enum MockReply {
    /// Return this text.
    Text(String),
    /// Return a response with no text.
    Empty,
    /// Fail with this error.
    Fail(ProviderError),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }
}

/// Mock text provider.
pub struct MockTextProvider {
    script: Mutex<VecDeque<MockReply>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockTextProvider {
    /// Always answers with [`SAMPLE_BUNDLE`].
    pub fn sample() -> Self {
        Self::always(SAMPLE_BUNDLE)
    }

    /// Always answers with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(text.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers with `replies` in order, then fails with `NotConfigured`.
    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            fallback: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> MockReply {
        let scripted = self
            .script
            .lock()
            .map(|mut script| script.pop_front())
            .unwrap_or(None);

        match (scripted, &self.fallback) {
            (Some(reply), _) => reply,
            (None, Some(text)) => MockReply::Text(text.clone()),
            (None, None) => MockReply::Fail(ProviderError::NotConfigured(
                "mock script exhausted".to_string(),
            )),
        }
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.next_reply();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let text = match reply {
            MockReply::Text(text) => Some(text),
            MockReply::Empty => None,
            MockReply::Fail(e) => return Err(e),
        };

        Ok(ProviderResponse {
            output_tokens: text.as_ref().map_or(0, |t| t.len() as i32 / 4),
            text,
            input_tokens: prompt.len() as i32 / 4,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
