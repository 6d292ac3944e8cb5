use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Classification of a knowledge entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Frequently asked questions about the site and its author.
    Faq,
    /// Diagnostic guidance for problems visitors run into.
    Troubleshooting,
    /// Plans, availability, and specifications of showcased products.
    Product,
    /// Getting-started walkthrough content.
    Onboarding,
}

impl Category {
    /// All categories, for exhaustive per-category tables and stats.
    pub const ALL: [Category; 4] = [
        Category::Faq,
        Category::Troubleshooting,
        Category::Product,
        Category::Onboarding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faq => "faq",
            Self::Troubleshooting => "troubleshooting",
            Self::Product => "product",
            Self::Onboarding => "onboarding",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "faq" => Some(Self::Faq),
            "troubleshooting" => Some(Self::Troubleshooting),
            "product" => Some(Self::Product),
            "onboarding" => Some(Self::Onboarding),
            _ => None,
        }
    }
}

/// Intent label attached to a user utterance by the external classifier.
///
/// The classifier itself lives outside this core; its output is consumed as
/// an opaque `(intent, confidence)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Faq,
    Troubleshooting,
    Onboarding,
    Product,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faq => "faq",
            Self::Troubleshooting => "troubleshooting",
            Self::Onboarding => "onboarding",
            Self::Product => "product",
            Self::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "faq" => Some(Self::Faq),
            "troubleshooting" => Some(Self::Troubleshooting),
            "onboarding" => Some(Self::Onboarding),
            "product" => Some(Self::Product),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

/// Preferred length of composed responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLength {
    /// First two sentences only.
    Short,
    #[default]
    Medium,
    /// Medium plus background information and related concepts.
    Detailed,
}

/// Who authored a message in the conversation history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Upstream failure codes reported by external collaborators (the LLM call,
/// the transport). The composer turns these into user-facing text; they are
/// never propagated further.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamErrorKind {
    Timeout,
    ServiceUnavailable,
    RateLimit,
    InvalidInput,
    Unknown,
}

impl UpstreamErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ServiceUnavailable => "service_unavailable",
            Self::RateLimit => "rate_limit",
            Self::InvalidInput => "invalid_input",
            Self::Unknown => "unknown",
        }
    }
}

// =============================================================================
// Conversation state
// =============================================================================

/// One message in a conversation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Escalation tracking for troubleshooting conversations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroubleshootingState {
    /// Number of failed troubleshooting rounds in this session. Above 1, the
    /// composer offers a human-support handoff.
    pub escalation_level: u32,
}

/// Display preferences for a visitor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub preferred_response_length: ResponseLength,
}

/// Per-session conversation state.
///
/// Owned by the session layer; the composer only reads it. Mutations between
/// turns (appending messages, advancing the onboarding step, escalating) go
/// through the helpers here so the counters stay non-negative and monotonic.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    pub messages: Vec<Message>,
    pub current_intent: Option<Intent>,
    pub onboarding_step: Option<u32>,
    pub troubleshooting: Option<TroubleshootingState>,
    pub preferences: Option<UserPreferences>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages exchanged so far.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Advance the onboarding step counter, clamped to `total`.
    ///
    /// Returns the new step value.
    pub fn advance_onboarding(&mut self, total: u32) -> u32 {
        let next = self.onboarding_step.unwrap_or(0).saturating_add(1).min(total);
        self.onboarding_step = Some(next);
        next
    }

    /// Record another failed troubleshooting round.
    ///
    /// Returns the new escalation level.
    pub fn escalate_troubleshooting(&mut self) -> u32 {
        let state = self.troubleshooting.get_or_insert_with(TroubleshootingState::default);
        state.escalation_level = state.escalation_level.saturating_add(1);
        state.escalation_level
    }

    /// Current escalation level, 0 when no troubleshooting has happened.
    pub fn escalation_level(&self) -> u32 {
        self.troubleshooting.map(|t| t.escalation_level).unwrap_or(0)
    }

    /// Preferred response length, defaulting to medium.
    pub fn response_length(&self) -> ResponseLength {
        self.preferences
            .map(|p| p.preferred_response_length)
            .unwrap_or_default()
    }
}

// =============================================================================
// External collaborator shapes
// =============================================================================

/// Output of the external intent classifier for one utterance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,
    /// Classifier confidence in 0..1.
    pub confidence: f32,
    /// Whether this utterance continues the previous topic.
    #[serde(default)]
    pub is_follow_up: bool,
    #[serde(default)]
    pub previous_intent: Option<Intent>,
}

impl IntentClassification {
    pub fn new(intent: Intent, confidence: f32) -> Self {
        Self {
            intent,
            confidence,
            is_follow_up: false,
            previous_intent: None,
        }
    }
}

/// Draft reply produced by the external language-model collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmDraft {
    /// Raw draft text; may be empty when the upstream call failed.
    pub content: String,
    /// Identifier of the model that produced the draft.
    pub model: String,
    /// Wall-clock time the upstream call took, for response metadata.
    pub elapsed_ms: u64,
}

/// An upstream failure to be formatted instead of a normal reply.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamFailure {
    pub kind: UpstreamErrorKind,
    /// Extra detail interpolated for `invalid_input` and `unknown`.
    #[serde(default)]
    pub detail: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Enum round-trips ----

    #[test]
    fn test_category_as_str_parse_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(Category::parse("bogus"), None);
    }

    #[test]
    fn test_intent_as_str_parse_round_trip() {
        for intent in [
            Intent::Faq,
            Intent::Troubleshooting,
            Intent::Onboarding,
            Intent::Product,
            Intent::General,
        ] {
            assert_eq!(Intent::parse(intent.as_str()), Some(intent));
        }
        assert_eq!(Intent::parse(""), None);
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&Category::Troubleshooting).unwrap();
        assert_eq!(json, "\"troubleshooting\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::Troubleshooting);
    }

    #[test]
    fn test_upstream_error_kind_as_str() {
        assert_eq!(UpstreamErrorKind::ServiceUnavailable.as_str(), "service_unavailable");
        assert_eq!(UpstreamErrorKind::RateLimit.as_str(), "rate_limit");
    }

    // ---- Messages ----

    #[test]
    fn test_message_constructors() {
        let user = Message::user("hello");
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.content, "hello");

        let bot = Message::assistant("hi there");
        assert_eq!(bot.role, MessageRole::Assistant);
        assert_ne!(user.id, bot.id);
    }

    // ---- Conversation context ----

    #[test]
    fn test_context_starts_empty() {
        let ctx = ConversationContext::new();
        assert_eq!(ctx.message_count(), 0);
        assert!(ctx.current_intent.is_none());
        assert!(ctx.onboarding_step.is_none());
        assert_eq!(ctx.escalation_level(), 0);
    }

    #[test]
    fn test_advance_onboarding_from_none() {
        let mut ctx = ConversationContext::new();
        assert_eq!(ctx.advance_onboarding(5), 1);
        assert_eq!(ctx.onboarding_step, Some(1));
    }

    #[test]
    fn test_advance_onboarding_clamps_to_total() {
        let mut ctx = ConversationContext::new();
        ctx.onboarding_step = Some(5);
        assert_eq!(ctx.advance_onboarding(5), 5);
        assert_eq!(ctx.advance_onboarding(5), 5);
    }

    #[test]
    fn test_escalation_increments() {
        let mut ctx = ConversationContext::new();
        assert_eq!(ctx.escalate_troubleshooting(), 1);
        assert_eq!(ctx.escalate_troubleshooting(), 2);
        assert_eq!(ctx.escalation_level(), 2);
    }

    #[test]
    fn test_response_length_defaults_to_medium() {
        let ctx = ConversationContext::new();
        assert_eq!(ctx.response_length(), ResponseLength::Medium);

        let mut ctx = ConversationContext::new();
        ctx.preferences = Some(UserPreferences {
            preferred_response_length: ResponseLength::Short,
        });
        assert_eq!(ctx.response_length(), ResponseLength::Short);
    }

    #[test]
    fn test_context_serde_round_trip() {
        let mut ctx = ConversationContext::new();
        ctx.messages.push(Message::user("hi"));
        ctx.current_intent = Some(Intent::Faq);
        ctx.escalate_troubleshooting();

        let json = serde_json::to_string(&ctx).unwrap();
        let back: ConversationContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message_count(), 1);
        assert_eq!(back.current_intent, Some(Intent::Faq));
        assert_eq!(back.escalation_level(), 1);
    }

    // ---- Classification ----

    #[test]
    fn test_classification_constructor_defaults() {
        let c = IntentClassification::new(Intent::General, 0.8);
        assert!(!c.is_follow_up);
        assert!(c.previous_intent.is_none());
    }

    #[test]
    fn test_classification_deserializes_without_optional_fields() {
        let c: IntentClassification =
            serde_json::from_str(r#"{"intent":"faq","confidence":0.9}"#).unwrap();
        assert_eq!(c.intent, Intent::Faq);
        assert!(!c.is_follow_up);
    }
}
