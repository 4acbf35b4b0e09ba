use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use crate::gemini::{GenerationError, GenerationRequest, Generator};
use crate::knowledge::{GENERIC_REPLIES, Topic, system_prompt};
use crate::metrics::EXTERNAL_LATENCY;
use crate::models::ChatMessage;
use crate::random::RandomSource;

// Text and analytics label sent back for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub message: String,
    pub intent: &'static str,
}

// Why a turn was answered locally
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FallbackReason {
    #[error("local path sampled")]
    Sampled,
    #[error("external model unavailable: {0}")]
    External(GenerationError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Result of a turn that passed validation. Both variants are successes
/// for the caller; `Fallback` means the reply came from canned text.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Generated(ChatReply),
    Fallback {
        reply: ChatReply,
        reason: FallbackReason,
    },
}

impl TurnOutcome {
    pub fn reply(&self) -> &ChatReply {
        match self {
            TurnOutcome::Generated(reply) => reply,
            TurnOutcome::Fallback { reply, .. } => reply,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, TurnOutcome::Fallback { .. })
    }
}

/// Analytics label: first matching keyword group, else `general`.
pub fn classify_intent(message: &str) -> &'static str {
    Topic::detect(&message.to_lowercase())
        .map(|topic| topic.intent())
        .unwrap_or("general")
}

/// Canned reply for `message`, picked at random within the matched group.
pub fn local_reply(message: &str, random: &dyn RandomSource) -> String {
    let replies = match Topic::detect(&message.to_lowercase()) {
        Some(topic) => topic.replies(),
        None => GENERIC_REPLIES,
    };
    replies[random.pick(replies.len())].to_string()
}

// Tunables for the external attempt
#[derive(Debug, Clone)]
pub struct ResponderSettings {
    pub external_share: f64,       // fraction of turns that try the external model
    pub external_timeout: Duration,
    pub context_turns: usize,      // history turns forwarded as context
    pub min_external_chars: usize, // external replies must be longer than this
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            external_share: 0.7,
            external_timeout: Duration::from_secs(5),
            context_turns: 10,
            min_external_chars: 50,
        }
    }
}

pub struct Responder {
    generator: Option<Arc<dyn Generator>>,
    random: Arc<dyn RandomSource>,
    settings: ResponderSettings,
    system_instruction: Arc<str>,
}

impl Responder {
    pub fn new(
        generator: Option<Arc<dyn Generator>>,
        random: Arc<dyn RandomSource>,
        settings: ResponderSettings,
    ) -> Self {
        Self {
            generator,
            random,
            settings,
            system_instruction: system_prompt().into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Answer an already sanitized message. Never fails: external errors
    /// come back as `TurnOutcome::Fallback`.
    pub async fn respond(&self, message: &str, history: &[ChatMessage]) -> TurnOutcome {
        let intent = classify_intent(message);

        let attempt = match &self.generator {
            Some(generator) if self.random.next_f64() < self.settings.external_share => {
                self.try_external(Arc::clone(generator), message, history).await
            }
            _ => Err(FallbackReason::Sampled),
        };

        match attempt {
            Ok(text) => TurnOutcome::Generated(ChatReply {
                message: text,
                intent,
            }),
            Err(reason) => {
                match &reason {
                    FallbackReason::Unexpected(_) => {
                        tracing::error!(%reason, "chat turn failed, using local reply")
                    }
                    _ => tracing::info!(%reason, "using local reply"),
                }
                TurnOutcome::Fallback {
                    reply: ChatReply {
                        message: local_reply(message, self.random.as_ref()),
                        intent,
                    },
                    reason,
                }
            }
        }
    }

    // One bounded attempt, no retries. The call runs in its own task so a
    // timeout aborts it (closing the connection) and a panic stays contained.
    async fn try_external(
        &self,
        generator: Arc<dyn Generator>,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<String, FallbackReason> {
        let skip = history.len().saturating_sub(self.settings.context_turns);
        let request = GenerationRequest {
            system_instruction: self.system_instruction.to_string(),
            history: history[skip..].to_vec(),
            message: message.to_string(),
        };

        let start_time = Instant::now();
        let mut task = tokio::spawn(async move { generator.generate(request).await });

        let result = tokio::time::timeout(self.settings.external_timeout, &mut task).await;
        EXTERNAL_LATENCY.observe(start_time.elapsed().as_secs_f64());

        let joined = match result {
            Ok(joined) => joined,
            Err(_) => {
                task.abort();
                return Err(FallbackReason::External(GenerationError::Timeout));
            }
        };

        let text = joined
            .map_err(|e| FallbackReason::Unexpected(e.to_string()))?
            .map_err(FallbackReason::External)?;

        let chars = text.chars().count();
        if chars <= self.settings.min_external_chars {
            return Err(FallbackReason::External(GenerationError::TooShort(chars)));
        }
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Role;
    use crate::random::FixedRandomSource;
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub(crate) const LONG_REPLY: &str =
        "I built a hotel management system with React, Node.js and MongoDB, plus several ML projects.";

    // Test double for the external model
    pub(crate) enum FakeGenerator {
        Reply(&'static str),
        Fail(GenerationError),
        Hang,
        Panic,
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn generate(&self, _request: GenerationRequest) -> Result<String, GenerationError> {
            match self {
                FakeGenerator::Reply(text) => Ok(text.to_string()),
                FakeGenerator::Fail(err) => Err(err.clone()),
                FakeGenerator::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(LONG_REPLY.to_string())
                }
                FakeGenerator::Panic => panic!("generator blew up"),
            }
        }
    }

    // Remembers the last request it saw
    struct RecordingGenerator {
        seen: Mutex<Option<GenerationRequest>>,
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
            *self.seen.lock().unwrap() = Some(request);
            Ok(LONG_REPLY.to_string())
        }
    }

    fn fixed(roll: f64, index: usize) -> Arc<dyn RandomSource> {
        Arc::new(FixedRandomSource { roll, index })
    }

    fn responder(generator: Option<Arc<dyn Generator>>, roll: f64) -> Responder {
        let settings = ResponderSettings {
            external_timeout: Duration::from_millis(50),
            ..ResponderSettings::default()
        };
        Responder::new(generator, fixed(roll, 0), settings)
    }

    #[test]
    fn intent_uses_first_matching_group() {
        assert_eq!(classify_intent("Hello there"), "greeting");
        assert_eq!(classify_intent("Tell me about your projects"), "projects");
        assert_eq!(classify_intent("What SKILLS do you have?"), "skills");
        assert_eq!(classify_intent("your career so far"), "experience");
        assert_eq!(classify_intent("can I email you"), "contact");
        assert_eq!(classify_intent("where did you study"), "education");
        assert_eq!(classify_intent("who are you"), "about");
        assert_eq!(classify_intent("xyz"), "general");
    }

    #[test]
    fn local_reply_picks_within_group() {
        let first = local_reply("tell me about your projects", &FixedRandomSource { roll: 0.0, index: 0 });
        let second = local_reply("tell me about your projects", &FixedRandomSource { roll: 0.0, index: 1 });
        assert_eq!(first, Topic::Projects.replies()[0]);
        assert_eq!(second, Topic::Projects.replies()[1]);
    }

    #[test]
    fn unmatched_message_gets_generic_reply() {
        let reply = local_reply("xyz", &FixedRandomSource { roll: 0.0, index: 2 });
        assert_eq!(reply, GENERIC_REPLIES[2]);
    }

    #[tokio::test]
    async fn long_external_reply_is_used() {
        let r = responder(Some(Arc::new(FakeGenerator::Reply(LONG_REPLY))), 0.0);
        let outcome = r.respond("tell me about your projects", &[]).await;
        assert_eq!(
            outcome,
            TurnOutcome::Generated(ChatReply {
                message: LONG_REPLY.to_string(),
                intent: "projects",
            })
        );
    }

    #[tokio::test]
    async fn short_external_reply_falls_back() {
        let r = responder(Some(Arc::new(FakeGenerator::Reply("Sure!"))), 0.0);
        let outcome = r.respond("tell me about your projects", &[]).await;
        assert_eq!(
            outcome,
            TurnOutcome::Fallback {
                reply: ChatReply {
                    message: Topic::Projects.replies()[0].to_string(),
                    intent: "projects",
                },
                reason: FallbackReason::External(GenerationError::TooShort(5)),
            }
        );
    }

    #[tokio::test]
    async fn timeout_falls_back() {
        let r = responder(Some(Arc::new(FakeGenerator::Hang)), 0.0);
        let outcome = r.respond("hello", &[]).await;
        match outcome {
            TurnOutcome::Fallback { reply, reason } => {
                assert_eq!(reason, FallbackReason::External(GenerationError::Timeout));
                assert_eq!(reply.intent, "greeting");
                assert!(!reply.message.is_empty());
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timed_out_calls_are_recorded_in_latency() {
        let count_before = EXTERNAL_LATENCY.get_sample_count();
        let sum_before = EXTERNAL_LATENCY.get_sample_sum();

        let r = responder(Some(Arc::new(FakeGenerator::Hang)), 0.0);
        assert!(r.respond("hello", &[]).await.is_fallback());

        // other tests share the histogram, so only growth is checked
        assert!(EXTERNAL_LATENCY.get_sample_count() > count_before);
        assert!(EXTERNAL_LATENCY.get_sample_sum() - sum_before >= 0.049);
    }

    #[tokio::test]
    async fn external_error_falls_back() {
        let err = GenerationError::Status(500, "boom".to_string());
        let r = responder(Some(Arc::new(FakeGenerator::Fail(err.clone()))), 0.0);
        let outcome = r.respond("hello", &[]).await;
        assert!(matches!(
            outcome,
            TurnOutcome::Fallback { reason: FallbackReason::External(e), .. } if e == err
        ));
    }

    #[tokio::test]
    async fn panicking_generator_is_contained() {
        let r = responder(Some(Arc::new(FakeGenerator::Panic)), 0.0);
        let outcome = r.respond("hello", &[]).await;
        assert!(matches!(
            outcome,
            TurnOutcome::Fallback { reason: FallbackReason::Unexpected(_), .. }
        ));
    }

    #[tokio::test]
    async fn high_roll_skips_external_model() {
        let r = responder(Some(Arc::new(FakeGenerator::Reply(LONG_REPLY))), 0.7);
        let outcome = r.respond("hello", &[]).await;
        assert!(matches!(
            outcome,
            TurnOutcome::Fallback { reason: FallbackReason::Sampled, .. }
        ));
    }

    #[tokio::test]
    async fn only_recent_history_is_forwarded() {
        let recorder = Arc::new(RecordingGenerator { seen: Mutex::new(None) });
        let generator: Arc<dyn Generator> = recorder.clone();
        let r = responder(Some(generator), 0.0);

        let history: Vec<ChatMessage> = (0..14)
            .map(|i| ChatMessage::new(if i % 2 == 0 { Role::User } else { Role::Assistant }, format!("turn {i}")))
            .collect();
        let outcome = r.respond("what skills", &history).await;
        assert!(!outcome.is_fallback());

        let seen = recorder.seen.lock().unwrap().take().unwrap();
        assert_eq!(seen.history.len(), 10);
        assert_eq!(seen.history[0].content, "turn 4");
        assert_eq!(seen.message, "what skills");
        assert!(seen.system_instruction.contains("Shivam Yadav"));
    }
}
