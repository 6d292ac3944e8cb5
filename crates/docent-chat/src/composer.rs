//! Response composition.
//!
//! Each intent is a terminal formatting mode over already-resolved inputs:
//! knowledge matches, a language-model draft, a product record, or an
//! upstream failure code. The composer reads conversation state but never
//! mutates it, and every branch degrades to safe canned text instead of
//! failing.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use docent_core::config::ChatConfig;
use docent_core::types::{
    Category, ConversationContext, Intent, IntentClassification, LlmDraft, ResponseLength,
    UpstreamErrorKind, UpstreamFailure,
};
use docent_knowledge::SearchResult;

use crate::tables;
use crate::types::{GeneratedResponse, ProductInfo, ProgressIndicators, RelatedLink, ResponseMetadata};

/// Model identifier for responses composed purely from the knowledge base.
const MODEL_KNOWLEDGE_BASE: &str = "knowledge-base";
/// Model identifier for formatted upstream failures.
const MODEL_ERROR: &str = "error-handler";
/// Model identifier for the fallback branch.
const MODEL_FALLBACK: &str = "fallback";

const FAQ_CONFIDENCE: f32 = 0.9;
const NO_KNOWLEDGE_CONFIDENCE: f32 = 0.3;
const ERROR_CONFIDENCE: f32 = 0.2;
const FALLBACK_CONFIDENCE: f32 = 0.1;

/// Markers for the textual onboarding progress bar, one per step.
const PROGRESS_FILLED: char = '█';
const PROGRESS_EMPTY: char = '░';

/// Sentence boundary: terminal punctuation followed by whitespace or end.
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("Invalid sentence regex"));

/// Composes structured replies from intent, knowledge, drafts, and state.
pub struct ResponseComposer {
    max_response_length: usize,
    suggestion_limit: usize,
}

impl ResponseComposer {
    /// Create a composer with limits from the chat configuration.
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            max_response_length: config.max_response_length,
            suggestion_limit: config.suggestion_limit,
        }
    }

    // -------------------------------------------------------------------------
    // FAQ
    // -------------------------------------------------------------------------

    /// Compose an answer from ranked knowledge matches.
    ///
    /// The top match's answer is the body; up to two further matches appear
    /// as related information. With no matches at all, a canned apology with
    /// generic suggestions is returned at low confidence.
    pub fn compose_faq(
        &self,
        matches: &[SearchResult],
        classification: &IntentClassification,
        ctx: &ConversationContext,
        elapsed_ms: u64,
    ) -> GeneratedResponse {
        let Some(top) = matches.first() else {
            debug!("faq composition with no knowledge matches");
            return GeneratedResponse {
                content: tables::NO_KNOWLEDGE_MESSAGE.to_string(),
                metadata: self.metadata(
                    MODEL_KNOWLEDGE_BASE,
                    NO_KNOWLEDGE_CONFIDENCE,
                    classification.intent,
                    elapsed_ms,
                ),
                suggestions: self.cap_static(tables::no_knowledge_suggestions()),
                next_steps: None,
                related_links: None,
                progress: None,
            };
        };

        let mut content = top.entry.answer.clone();
        if matches.len() > 1 {
            content.push_str("\n\nRelated Information:");
            for m in matches.iter().skip(1).take(2) {
                content.push_str(&format!("\n- {}", m.entry.question));
            }
        }
        let content = self.personalize(content, classification.intent, ctx);

        let mut suggestions: Vec<String> = matches
            .iter()
            .skip(1)
            .map(|m| m.entry.question.clone())
            .collect();
        suggestions.extend(
            tables::suggestions_for_intent(classification.intent)
                .iter()
                .map(|s| s.to_string()),
        );
        suggestions.truncate(self.suggestion_limit);

        let category = top.entry.category;
        GeneratedResponse {
            content,
            metadata: self.metadata(
                MODEL_KNOWLEDGE_BASE,
                FAQ_CONFIDENCE,
                classification.intent,
                elapsed_ms,
            ),
            suggestions,
            next_steps: Some(
                tables::next_steps_for_category(category)
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            related_links: Some(
                tables::related_links_for_category(category)
                    .iter()
                    .map(|(title, url)| RelatedLink {
                        title: title.to_string(),
                        url: url.to_string(),
                    })
                    .collect(),
            ),
            progress: None,
        }
    }

    // -------------------------------------------------------------------------
    // Onboarding
    // -------------------------------------------------------------------------

    /// Compose a progress report for the onboarding flow.
    ///
    /// The step counters are supplied by the caller and never mutated here.
    /// In-progress flows get a next-steps block; a finished flow gets the
    /// completion block instead.
    pub fn compose_onboarding(
        &self,
        current_step: u32,
        total_steps: u32,
        classification: &IntentClassification,
        elapsed_ms: u64,
    ) -> GeneratedResponse {
        let current = current_step.min(total_steps);
        let percentage = if total_steps == 0 {
            100
        } else {
            ((f64::from(current) / f64::from(total_steps)) * 100.0).round() as u32
        };

        let bar: String = std::iter::repeat(PROGRESS_FILLED)
            .take(current as usize)
            .chain(std::iter::repeat(PROGRESS_EMPTY).take((total_steps - current) as usize))
            .collect();

        let mut content = format!(
            "Setup progress: [{bar}] {percentage}% (step {current} of {total_steps})."
        );

        let complete = current >= total_steps;
        let next_steps = if complete {
            content.push_str("\n\n");
            content.push_str(tables::ONBOARDING_COMPLETE);
            None
        } else {
            content.push_str("\n\nNext steps:");
            let steps = tables::next_steps_for_category(Category::Onboarding);
            for step in steps {
                content.push_str(&format!("\n- {step}"));
            }
            Some(steps.iter().map(|s| s.to_string()).collect())
        };

        GeneratedResponse {
            content,
            metadata: self.metadata(
                MODEL_KNOWLEDGE_BASE,
                classification.confidence,
                classification.intent,
                elapsed_ms,
            ),
            suggestions: self.cap_static(tables::suggestions_for_intent(Intent::Onboarding)),
            next_steps,
            related_links: None,
            progress: Some(ProgressIndicators {
                current_step: current,
                total_steps,
                completion_percentage: percentage,
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Troubleshooting
    // -------------------------------------------------------------------------

    /// Compose a tiered fix list from candidate solutions.
    ///
    /// The caller's ordering is trusted; the first three tiers are relabeled
    /// and any remainder is numbered. Past escalation level 1 a human-support
    /// notice is appended; incrementing the level is the caller's job.
    pub fn compose_troubleshooting(
        &self,
        solutions: &[String],
        classification: &IntentClassification,
        ctx: &ConversationContext,
        elapsed_ms: u64,
    ) -> GeneratedResponse {
        let mut content = if solutions.is_empty() {
            "Tell me a bit more about what's going wrong and I'll suggest a fix.".to_string()
        } else {
            let mut body = String::from("Let's work through this, most likely fix first.");
            for (i, solution) in solutions.iter().enumerate() {
                let label = match tables::SOLUTION_TIERS.get(i) {
                    Some(tier) => (*tier).to_string(),
                    None => format!("Option {}", i + 1),
                };
                body.push_str(&format!("\n\n{label}: {solution}"));
            }
            body
        };

        if ctx.escalation_level() > 1 {
            content.push_str("\n\n");
            content.push_str(tables::ESCALATION_NOTICE);
        }

        GeneratedResponse {
            content,
            metadata: self.metadata(
                MODEL_KNOWLEDGE_BASE,
                classification.confidence,
                classification.intent,
                elapsed_ms,
            ),
            suggestions: self.cap_static(tables::suggestions_for_intent(Intent::Troubleshooting)),
            next_steps: Some(
                tables::next_steps_for_category(Category::Troubleshooting)
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            related_links: Some(
                tables::related_links_for_category(Category::Troubleshooting)
                    .iter()
                    .map(|(title, url)| RelatedLink {
                        title: title.to_string(),
                        url: url.to_string(),
                    })
                    .collect(),
            ),
            progress: None,
        }
    }

    // -------------------------------------------------------------------------
    // Product
    // -------------------------------------------------------------------------

    /// Compose a product overview from a structured record.
    ///
    /// Pricing, availability, and specification sections are each omitted
    /// entirely when the source field is absent.
    pub fn compose_product(
        &self,
        info: &ProductInfo,
        classification: &IntentClassification,
        ctx: &ConversationContext,
        elapsed_ms: u64,
    ) -> GeneratedResponse {
        let mut content = info.name.clone();
        if let Some(ref description) = info.description {
            content.push_str(&format!("\n{description}"));
        }

        if let Some(ref pricing) = info.pricing {
            content.push_str("\n\nPricing:");
            for plan in pricing {
                content.push_str(&format!(
                    "\n- {} ({}): {}",
                    plan.name,
                    plan.price,
                    plan.features.join(", ")
                ));
            }
        }

        if let Some(availability) = info.availability {
            content.push_str(&format!("\n\nAvailability: {}", availability.label()));
        }

        if let Some(ref specs) = info.specifications {
            content.push_str("\n\nSpecifications:");
            if !specs.requirements.is_empty() {
                content.push_str(&format!("\n- Requirements: {}", specs.requirements.join(", ")));
            }
            if !specs.compatibility.is_empty() {
                content.push_str(&format!(
                    "\n- Compatibility: {}",
                    specs.compatibility.join(", ")
                ));
            }
            if !specs.performance.is_empty() {
                content.push_str(&format!("\n- Performance: {}", specs.performance.join(", ")));
            }
        }

        let content = self.personalize(content, classification.intent, ctx);

        GeneratedResponse {
            content,
            metadata: self.metadata(
                MODEL_KNOWLEDGE_BASE,
                classification.confidence,
                classification.intent,
                elapsed_ms,
            ),
            suggestions: self.cap_static(tables::suggestions_for_intent(Intent::Product)),
            next_steps: Some(
                tables::next_steps_for_category(Category::Product)
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            related_links: Some(
                tables::related_links_for_category(Category::Product)
                    .iter()
                    .map(|(title, url)| RelatedLink {
                        title: title.to_string(),
                        url: url.to_string(),
                    })
                    .collect(),
            ),
            progress: None,
        }
    }

    // -------------------------------------------------------------------------
    // General pipeline
    // -------------------------------------------------------------------------

    /// Format a language-model draft for generic turns.
    ///
    /// Pipeline: truncate to the configured length, prepend a follow-up
    /// prefix keyed by the previous intent, append an intent-specific
    /// contextual notice, then append a knowledge snippet unless the draft
    /// already substantively contains it.
    pub fn compose_general(
        &self,
        draft: &LlmDraft,
        classification: &IntentClassification,
        ctx: &ConversationContext,
        snippet: Option<&str>,
    ) -> GeneratedResponse {
        let mut content = self.truncate_content(draft.content.trim());

        if classification.is_follow_up {
            if let Some(previous) = classification.previous_intent {
                content = format!("{}{content}", tables::follow_up_prefix(previous));
            }
        }

        if let Some(notice) = contextual_notice(classification.intent, ctx) {
            content.push_str("\n\n");
            content.push_str(&notice);
        }

        if let Some(snippet) = snippet {
            if !contains_prefix(&content, snippet) {
                content.push_str(&format!("\n\nFrom the knowledge base: {snippet}"));
            }
        }

        let content = self.personalize(content, classification.intent, ctx);

        GeneratedResponse {
            content,
            metadata: self.metadata(
                &draft.model,
                classification.confidence,
                classification.intent,
                draft.elapsed_ms,
            ),
            suggestions: self.cap_static(tables::suggestions_for_intent(classification.intent)),
            next_steps: None,
            related_links: None,
            progress: None,
        }
    }

    // -------------------------------------------------------------------------
    // Error and fallback
    // -------------------------------------------------------------------------

    /// Format an upstream failure as user-facing text.
    pub fn compose_error(
        &self,
        failure: &UpstreamFailure,
        intent: Intent,
        elapsed_ms: u64,
    ) -> GeneratedResponse {
        let mut content = tables::error_message(failure.kind).to_string();
        if matches!(
            failure.kind,
            UpstreamErrorKind::InvalidInput | UpstreamErrorKind::Unknown
        ) {
            if let Some(ref detail) = failure.detail {
                content.push_str(&format!(" ({detail})"));
            }
        }

        GeneratedResponse {
            content,
            metadata: self.metadata(MODEL_ERROR, ERROR_CONFIDENCE, intent, elapsed_ms),
            suggestions: self.cap_static(tables::error_suggestions(failure.kind)),
            next_steps: Some(
                tables::error_next_steps(failure.kind)
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            related_links: None,
            progress: None,
        }
    }

    /// Last-resort composition when nothing better is available.
    ///
    /// A non-empty draft is kept with a low-confidence disclaimer; otherwise
    /// a fully canned message is substituted.
    pub fn compose_fallback(
        &self,
        draft: Option<&str>,
        intent: Intent,
        elapsed_ms: u64,
    ) -> GeneratedResponse {
        let content = match draft {
            Some(text) if !text.trim().is_empty() => {
                format!(
                    "{}\n\n{}",
                    self.truncate_content(text.trim()),
                    tables::FALLBACK_DISCLAIMER
                )
            }
            _ => tables::FALLBACK_EMPTY_MESSAGE.to_string(),
        };

        GeneratedResponse {
            content,
            metadata: self.metadata(MODEL_FALLBACK, FALLBACK_CONFIDENCE, intent, elapsed_ms),
            suggestions: self.cap_static(tables::suggestions_for_intent(Intent::General)),
            next_steps: None,
            related_links: None,
            progress: None,
        }
    }

    // -------------------------------------------------------------------------
    // Shared helpers
    // -------------------------------------------------------------------------

    fn metadata(
        &self,
        model: &str,
        confidence: f32,
        intent: Intent,
        elapsed_ms: u64,
    ) -> ResponseMetadata {
        ResponseMetadata {
            processing_time_ms: elapsed_ms,
            model_used: model.to_string(),
            confidence,
            intent,
        }
    }

    fn cap_static(&self, items: &[&str]) -> Vec<String> {
        items
            .iter()
            .take(self.suggestion_limit)
            .map(|s| s.to_string())
            .collect()
    }

    /// Adjust content for the visitor's preferences and session length.
    fn personalize(&self, content: String, intent: Intent, ctx: &ConversationContext) -> String {
        let mut content = match ctx.response_length() {
            ResponseLength::Short => first_sentences(&content, 2),
            ResponseLength::Medium => content,
            ResponseLength::Detailed => {
                let mut detailed = content;
                detailed.push_str("\n\nBackground Information: ");
                detailed.push_str(tables::background_for_intent(intent));
                let concepts = tables::related_concepts(&detailed);
                if !concepts.is_empty() {
                    detailed.push_str("\n\nRelated Concepts:");
                    for line in concepts {
                        detailed.push_str(&format!("\n- {line}"));
                    }
                }
                detailed
            }
        };

        if let Some(greeting) = tables::welcome_back(ctx.message_count()) {
            content = format!("{greeting}\n\n{content}");
        }
        content
    }

    /// Truncate to the configured maximum length, appending an ellipsis.
    fn truncate_content(&self, text: &str) -> String {
        if text.chars().count() <= self.max_response_length {
            return text.to_string();
        }
        let cut: String = text
            .chars()
            .take(self.max_response_length.saturating_sub(3))
            .collect();
        format!("{}...", cut.trim_end())
    }
}

/// Intent-specific notice appended by the general pipeline.
fn contextual_notice(intent: Intent, ctx: &ConversationContext) -> Option<String> {
    match intent {
        Intent::Troubleshooting if ctx.escalation_level() > 0 => Some(
            "If this still doesn't help, I can hand you over to a human.".to_string(),
        ),
        Intent::Onboarding => ctx
            .onboarding_step
            .map(|step| format!("You're currently on step {step} of the setup guide.")),
        Intent::Product => {
            Some("Full details live in the product documentation at /docs.".to_string())
        }
        _ => None,
    }
}

/// Substring-prefix heuristic: is the start of `snippet` already present?
///
/// Deliberately not a full dedup; matching the first 40 characters is enough
/// to avoid repeating a snippet the draft already quoted.
fn contains_prefix(content: &str, snippet: &str) -> bool {
    let probe: String = snippet.chars().take(40).collect();
    let probe = probe.trim();
    !probe.is_empty() && content.contains(probe)
}

/// First `count` sentences of the text, or the whole text when it has fewer.
fn first_sentences(text: &str, count: usize) -> String {
    let mut end = 0;
    let mut seen = 0;
    for m in SENTENCE_END.find_iter(text) {
        seen += 1;
        end = m.end();
        if seen == count {
            break;
        }
    }
    if seen == 0 {
        text.to_string()
    } else {
        text[..end].trim_end().to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
