//! Chat orchestrator: the session layer over store, search, and composer.
//!
//! Holds the injected knowledge store, routes each turn by its classified
//! intent, and owns the per-session conversation state. Everything here is
//! synchronous; the LLM call and intent classification happen outside and
//! arrive already resolved inside the [`TurnRequest`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use tracing::debug;
use uuid::Uuid;

use docent_core::config::DocentConfig;
use docent_core::types::{Category, ConversationContext, Intent, UserPreferences};
use docent_knowledge::{KnowledgeStore, SearchEngine, SearchOptions};

use crate::composer::ResponseComposer;
use crate::context::{Session, SessionManager};
use crate::error::ChatError;
use crate::types::{GeneratedResponse, TurnRequest};

/// Maximum message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Below this classifier confidence the turn is answered by the fallback
/// branch instead of trusting the intent.
const LOW_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Central coordinator for conversation turns.
pub struct ChatOrchestrator {
    store: KnowledgeStore,
    engine: SearchEngine,
    composer: ResponseComposer,
    session_manager: SessionManager,
    sessions: Mutex<HashMap<Uuid, Session>>,
    search_options: SearchOptions,
    onboarding_total_steps: u32,
}

impl ChatOrchestrator {
    /// Create an orchestrator over an injected knowledge store.
    pub fn new(store: KnowledgeStore, config: &DocentConfig) -> Self {
        Self {
            store,
            engine: SearchEngine::new(),
            composer: ResponseComposer::new(&config.chat),
            session_manager: SessionManager::new(
                config.chat.context_messages,
                config.chat.session_timeout_minutes,
            ),
            sessions: Mutex::new(HashMap::new()),
            search_options: SearchOptions {
                category: None,
                limit: config.search.default_limit,
                min_score: config.search.min_score,
            },
            onboarding_total_steps: config.chat.onboarding_total_steps,
        }
    }

    /// Handle one conversation turn.
    ///
    /// Returns the composed response and the session id (new or existing).
    /// Upstream failures inside the request are formatted, not propagated;
    /// the only errors here are invalid messages and lock trouble.
    pub fn handle(&self, request: TurnRequest) -> Result<(GeneratedResponse, Uuid), ChatError> {
        let started = Instant::now();

        if request.message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if request.message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ChatError::MessageTooLong(MAX_MESSAGE_LENGTH));
        }

        let mut sessions = self.lock_sessions()?;
        let sid = self.resolve_session(&mut sessions, request.session_id);
        let ctx = sessions
            .get(&sid)
            .map(|s| s.context.clone())
            .unwrap_or_default();

        // Prefer the upstream call's own measurement when a draft exists.
        let elapsed_ms = request
            .draft
            .as_ref()
            .map(|d| d.elapsed_ms)
            .unwrap_or_else(|| started.elapsed().as_millis() as u64);

        let intent = request.classification.intent;
        let response = if let Some(ref failure) = request.failure {
            self.composer.compose_error(failure, intent, elapsed_ms)
        } else if request.classification.confidence < LOW_CONFIDENCE_THRESHOLD {
            self.composer.compose_fallback(
                request.draft.as_ref().map(|d| d.content.as_str()),
                intent,
                elapsed_ms,
            )
        } else {
            match intent {
                Intent::Faq => {
                    let matches =
                        self.engine
                            .search(&self.store, &request.message, &self.search_options)?;
                    self.composer
                        .compose_faq(&matches, &request.classification, &ctx, elapsed_ms)
                }
                Intent::Troubleshooting => {
                    let solutions = if request.solutions.is_empty() {
                        self.knowledge_solutions(&request.message)?
                    } else {
                        request.solutions.clone()
                    };
                    self.composer.compose_troubleshooting(
                        &solutions,
                        &request.classification,
                        &ctx,
                        elapsed_ms,
                    )
                }
                Intent::Onboarding => {
                    let current = ctx.onboarding_step.unwrap_or(0);
                    self.composer.compose_onboarding(
                        current,
                        self.onboarding_total_steps,
                        &request.classification,
                        elapsed_ms,
                    )
                }
                Intent::Product => match request.product {
                    Some(ref info) => self.composer.compose_product(
                        info,
                        &request.classification,
                        &ctx,
                        elapsed_ms,
                    ),
                    // No structured record: answer from the knowledge base.
                    None => {
                        let options = SearchOptions {
                            category: Some(Category::Product),
                            ..self.search_options.clone()
                        };
                        let matches =
                            self.engine.search(&self.store, &request.message, &options)?;
                        self.composer.compose_faq(
                            &matches,
                            &request.classification,
                            &ctx,
                            elapsed_ms,
                        )
                    }
                },
                Intent::General => match request.draft {
                    Some(ref draft) if !draft.content.trim().is_empty() => {
                        let snippet = self.best_snippet(&request.message)?;
                        self.composer.compose_general(
                            draft,
                            &request.classification,
                            &ctx,
                            snippet.as_deref(),
                        )
                    }
                    _ => self.composer.compose_fallback(None, intent, elapsed_ms),
                },
            }
        };

        if let Some(session) = sessions.get_mut(&sid) {
            self.session_manager
                .record_turn(session, &request.message, &response, intent);
        }

        debug!(session = %sid, intent = intent.as_str(), "turn handled");
        Ok((response, sid))
    }

    /// Snapshot of a session's conversation context.
    pub fn context(&self, session_id: Uuid) -> Result<ConversationContext, ChatError> {
        let sessions = self.lock_sessions()?;
        sessions
            .get(&session_id)
            .map(|s| s.context.clone())
            .ok_or(ChatError::SessionNotFound(session_id))
    }

    /// Advance a session's onboarding step between turns.
    pub fn advance_onboarding(&self, session_id: Uuid) -> Result<u32, ChatError> {
        let total = self.onboarding_total_steps;
        self.with_session(session_id, |session| {
            session.context.advance_onboarding(total)
        })
    }

    /// Record another failed troubleshooting round for a session.
    pub fn escalate_troubleshooting(&self, session_id: Uuid) -> Result<u32, ChatError> {
        self.with_session(session_id, |session| {
            session.context.escalate_troubleshooting()
        })
    }

    /// Set a session's display preferences.
    pub fn set_preferences(
        &self,
        session_id: Uuid,
        preferences: UserPreferences,
    ) -> Result<(), ChatError> {
        self.with_session(session_id, |session| {
            session.context.preferences = Some(preferences);
        })
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.lock_sessions().map(|s| s.len()).unwrap_or(0)
    }

    // -- Private helpers --

    fn lock_sessions(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Session>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::SessionLock(e.to_string()))
    }

    fn with_session<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, ChatError> {
        let mut sessions = self.lock_sessions()?;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(ChatError::SessionNotFound(session_id))?;
        Ok(f(session))
    }

    /// Reuse the requested session when it is live; otherwise start fresh.
    fn resolve_session(
        &self,
        sessions: &mut HashMap<Uuid, Session>,
        requested: Option<Uuid>,
    ) -> Uuid {
        if let Some(id) = requested {
            if let Some(existing) = sessions.get(&id) {
                if !self.session_manager.is_expired(existing) {
                    return id;
                }
                sessions.remove(&id);
                debug!(session = %id, "expired session replaced");
            }
        }
        let session = self.session_manager.create_session();
        let id = session.id;
        sessions.insert(id, session);
        id
    }

    /// Candidate solutions for a troubleshooting turn, derived from the
    /// knowledge base in relevance order.
    fn knowledge_solutions(&self, query: &str) -> Result<Vec<String>, ChatError> {
        let options = SearchOptions {
            category: Some(Category::Troubleshooting),
            ..self.search_options.clone()
        };
        let matches = self.engine.search(&self.store, query, &options)?;
        Ok(matches.into_iter().map(|m| m.entry.answer).collect())
    }

    /// Best knowledge-base snippet for enhancing a generic draft.
    fn best_snippet(&self, query: &str) -> Result<Option<String>, ChatError> {
        let options = SearchOptions {
            limit: 1,
            ..self.search_options.clone()
        };
        let matches = self.engine.search(&self.store, query, &options)?;
        Ok(matches.into_iter().next().map(|m| m.entry.answer))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use docent_core::types::{
        IntentClassification, LlmDraft, ResponseLength, UpstreamErrorKind, UpstreamFailure,
    };
    use docent_knowledge::seed_store;

    fn orchestrator() -> ChatOrchestrator {
        let store = KnowledgeStore::new();
        seed_store(&store).unwrap();
        ChatOrchestrator::new(store, &DocentConfig::default())
    }

    fn request(message: &str, intent: Intent) -> TurnRequest {
        TurnRequest::new(message, IntentClassification::new(intent, 0.8))
    }

    fn draft(content: &str) -> LlmDraft {
        LlmDraft {
            content: content.to_string(),
            model: "demo-model".to_string(),
            elapsed_ms: 17,
        }
    }

    // ---- Validation ----

    #[test]
    fn test_empty_message_rejected() {
        let orch = orchestrator();
        let err = orch.handle(request("", Intent::General)).unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
    }

    #[test]
    fn test_overlong_message_rejected() {
        let orch = orchestrator();
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        let err = orch.handle(request(&long, Intent::General)).unwrap_err();
        assert!(matches!(err, ChatError::MessageTooLong(_)));
    }

    #[test]
    fn test_message_at_limit_accepted() {
        let orch = orchestrator();
        let exact = "x".repeat(MAX_MESSAGE_LENGTH);
        assert!(orch.handle(request(&exact, Intent::General)).is_ok());
    }

    // ---- Sessions ----

    #[test]
    fn test_new_session_created_when_none_given() {
        let orch = orchestrator();
        let (_, sid) = orch.handle(request("hello", Intent::Faq)).unwrap();
        assert_ne!(sid, Uuid::nil());
        assert_eq!(orch.session_count(), 1);
    }

    #[test]
    fn test_session_reused_across_turns() {
        let orch = orchestrator();
        let (_, sid) = orch.handle(request("what is a chatbot?", Intent::Faq)).unwrap();

        let mut second = request("and the stack?", Intent::Faq);
        second.session_id = Some(sid);
        let (_, sid2) = orch.handle(second).unwrap();

        assert_eq!(sid, sid2);
        assert_eq!(orch.session_count(), 1);
        // Two turns, four messages.
        assert_eq!(orch.context(sid).unwrap().message_count(), 4);
    }

    #[test]
    fn test_unknown_session_id_starts_fresh() {
        let orch = orchestrator();
        let mut req = request("hello", Intent::Faq);
        req.session_id = Some(Uuid::new_v4());
        let (_, sid) = orch.handle(req).unwrap();
        assert_ne!(sid, Uuid::nil());
        assert_eq!(orch.session_count(), 1);
    }

    #[test]
    fn test_turns_are_recorded_in_context() {
        let orch = orchestrator();
        let (resp, sid) = orch.handle(request("what is a chatbot?", Intent::Faq)).unwrap();
        let ctx = orch.context(sid).unwrap();
        assert_eq!(ctx.message_count(), 2);
        assert_eq!(ctx.messages[1].content, resp.content);
        assert_eq!(ctx.current_intent, Some(Intent::Faq));
    }

    // ---- FAQ routing ----

    #[test]
    fn test_faq_turn_answers_from_knowledge() {
        let orch = orchestrator();
        let (resp, _) = orch.handle(request("what is a chatbot?", Intent::Faq)).unwrap();
        assert!(resp.content.contains("chatbot"));
        assert_eq!(resp.metadata.model_used, "knowledge-base");
        assert!(resp.next_steps.is_some());
    }

    #[test]
    fn test_faq_turn_without_matches_apologizes() {
        let orch = orchestrator();
        // No vowels: immune even to single-letter partial matches.
        let (resp, _) = orch.handle(request("zzqqppffgg", Intent::Faq)).unwrap();
        assert!((resp.metadata.confidence - 0.3).abs() < 1e-6);
        assert!(!resp.suggestions.is_empty());
    }

    // ---- Troubleshooting routing ----

    #[test]
    fn test_troubleshooting_uses_supplied_solutions() {
        let orch = orchestrator();
        let mut req = request("the widget is stuck", Intent::Troubleshooting);
        req.solutions = vec!["Turn it off and on.".to_string()];
        let (resp, _) = orch.handle(req).unwrap();
        assert!(resp.content.contains("Most Likely: Turn it off and on."));
    }

    #[test]
    fn test_troubleshooting_derives_solutions_from_knowledge() {
        let orch = orchestrator();
        let (resp, _) = orch
            .handle(request("the demo will not load", Intent::Troubleshooting))
            .unwrap();
        // Seeded troubleshooting answer surfaces as the top tier.
        assert!(resp.content.contains("Most Likely:"));
        assert!(resp.content.contains("cache"));
    }

    // ---- Onboarding routing ----

    #[test]
    fn test_onboarding_turn_reports_progress() {
        let orch = orchestrator();
        let (resp, sid) = orch.handle(request("get me started", Intent::Onboarding)).unwrap();
        assert_eq!(resp.progress.unwrap().current_step, 0);

        orch.advance_onboarding(sid).unwrap();
        orch.advance_onboarding(sid).unwrap();

        let mut next = request("what's next?", Intent::Onboarding);
        next.session_id = Some(sid);
        let (resp, _) = orch.handle(next).unwrap();
        let progress = resp.progress.unwrap();
        assert_eq!(progress.current_step, 2);
        assert_eq!(progress.total_steps, 5);
        assert_eq!(progress.completion_percentage, 40);
    }

    // ---- Product routing ----

    #[test]
    fn test_product_turn_without_record_uses_knowledge() {
        let orch = orchestrator();
        let (resp, _) = orch.handle(request("what plans are available?", Intent::Product)).unwrap();
        assert!(resp.content.contains("Starter"));
        assert_eq!(resp.metadata.intent, Intent::Product);
    }

    #[test]
    fn test_product_turn_with_record_renders_it() {
        let orch = orchestrator();
        let mut req = request("tell me about pro", Intent::Product);
        req.product = Some(crate::types::ProductInfo {
            name: "Portfolio Pro".to_string(),
            description: None,
            pricing: None,
            availability: Some(crate::types::Availability::Available),
            specifications: None,
        });
        let (resp, _) = orch.handle(req).unwrap();
        assert!(resp.content.contains("Portfolio Pro"));
        assert!(resp.content.contains("Available now"));
    }

    // ---- General routing ----

    #[test]
    fn test_general_turn_formats_draft() {
        let orch = orchestrator();
        let mut req = request("tell me something", Intent::General);
        req.draft = Some(draft("Here is a general reply."));
        let (resp, _) = orch.handle(req).unwrap();
        assert!(resp.content.starts_with("Here is a general reply."));
        assert_eq!(resp.metadata.model_used, "demo-model");
        assert_eq!(resp.metadata.processing_time_ms, 17);
    }

    #[test]
    fn test_general_turn_without_draft_falls_back() {
        let orch = orchestrator();
        let (resp, _) = orch.handle(request("tell me something", Intent::General)).unwrap();
        assert_eq!(resp.metadata.model_used, "fallback");
        assert!((resp.metadata.confidence - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_low_confidence_classification_falls_back() {
        let orch = orchestrator();
        let mut req = TurnRequest::new(
            "mumble mumble",
            IntentClassification::new(Intent::Faq, 0.1),
        );
        req.draft = Some(draft("A hesitant guess."));
        let (resp, _) = orch.handle(req).unwrap();
        assert_eq!(resp.metadata.model_used, "fallback");
        assert!(resp.content.starts_with("A hesitant guess."));
    }

    // ---- Upstream failures ----

    #[test]
    fn test_upstream_failure_formatted_not_propagated() {
        let orch = orchestrator();
        let mut req = request("anything", Intent::General);
        req.failure = Some(UpstreamFailure {
            kind: UpstreamErrorKind::Timeout,
            detail: None,
        });
        let (resp, _) = orch.handle(req).unwrap();
        assert_eq!(resp.metadata.model_used, "error-handler");
        assert!(resp.content.contains("too long"));
    }

    // ---- Between-turn mutation ----

    #[test]
    fn test_escalation_changes_later_responses() {
        let orch = orchestrator();
        let (_, sid) = orch
            .handle(request("the demo will not load", Intent::Troubleshooting))
            .unwrap();

        orch.escalate_troubleshooting(sid).unwrap();
        orch.escalate_troubleshooting(sid).unwrap();

        let mut retry = request("still broken", Intent::Troubleshooting);
        retry.session_id = Some(sid);
        let (resp, _) = orch.handle(retry).unwrap();
        assert!(resp.content.contains("reach a human"));
    }

    #[test]
    fn test_set_preferences_shortens_responses() {
        let orch = orchestrator();
        let (_, sid) = orch.handle(request("hello", Intent::General)).unwrap();
        orch.set_preferences(
            sid,
            UserPreferences {
                preferred_response_length: ResponseLength::Short,
            },
        )
        .unwrap();

        let mut req = request("explain the site", Intent::General);
        req.session_id = Some(sid);
        req.draft = Some(draft("One. Two. Three. Four."));
        let (resp, _) = orch.handle(req).unwrap();
        assert!(resp.content.contains("One. Two."));
        assert!(!resp.content.contains("Three."));
    }

    #[test]
    fn test_mutators_on_unknown_session_fail() {
        let orch = orchestrator();
        let missing = Uuid::new_v4();
        assert!(matches!(
            orch.advance_onboarding(missing).unwrap_err(),
            ChatError::SessionNotFound(_)
        ));
        assert!(matches!(
            orch.escalate_troubleshooting(missing).unwrap_err(),
            ChatError::SessionNotFound(_)
        ));
        assert!(matches!(
            orch.context(missing).unwrap_err(),
            ChatError::SessionNotFound(_)
        ));
    }
}
