//! Canned-text lookup tables keyed by intent, category, and error kind.
//!
//! Everything user-facing that is not composed from live data lives here as
//! an exhaustive `match`, so adding an enum variant forces the corresponding
//! copy to exist.

use docent_core::types::{Category, Intent, UpstreamErrorKind};

// =============================================================================
// Per-category tables (FAQ branch)
// =============================================================================

/// Next steps offered after a knowledge answer of the given category.
pub fn next_steps_for_category(category: Category) -> &'static [&'static str] {
    match category {
        Category::Faq => &[
            "Browse the project pages for concrete examples",
            "Ask a follow-up question in the chat",
        ],
        Category::Troubleshooting => &[
            "Try the suggested fix and report back",
            "Note any error message you see for the next step",
        ],
        Category::Product => &[
            "Compare the plans on the pricing page",
            "Start with the free tier and upgrade later",
        ],
        Category::Onboarding => &[
            "Open the guided setup from your dashboard",
            "Publish a first draft page to see the flow end to end",
        ],
    }
}

/// Related links offered after a knowledge answer, as `(title, url)` pairs.
pub fn related_links_for_category(category: Category) -> &'static [(&'static str, &'static str)] {
    match category {
        Category::Faq => &[
            ("About this site", "/about"),
            ("Project gallery", "/projects"),
        ],
        Category::Troubleshooting => &[
            ("Known issues", "/help/known-issues"),
            ("Contact support", "/help/contact"),
        ],
        Category::Product => &[("Pricing", "/pricing"), ("Plan comparison", "/pricing#compare")],
        Category::Onboarding => &[
            ("Getting started guide", "/docs/getting-started"),
            ("Editor basics", "/docs/editor"),
        ],
    }
}

// =============================================================================
// Per-intent tables
// =============================================================================

/// Background paragraph appended for visitors preferring detailed responses.
pub fn background_for_intent(intent: Intent) -> &'static str {
    match intent {
        Intent::Faq => {
            "The knowledge base behind these answers is curated by hand and \
             covers the site, its projects, and the assistant itself."
        }
        Intent::Troubleshooting => {
            "Fixes are ordered from most to least likely based on what has \
             resolved similar reports before. Working through them in order \
             is usually fastest."
        }
        Intent::Onboarding => {
            "The setup flow is designed to be finished in one sitting, but \
             every step saves automatically so you can leave and come back."
        }
        Intent::Product => {
            "Plan differences are mostly about collaboration and API access; \
             the core editor is identical everywhere."
        }
        Intent::General => {
            "The assistant combines a curated knowledge base with a language \
             model, so answers outside the knowledge base are best-effort."
        }
    }
}

/// Prefix for a follow-up turn, keyed by the previous turn's intent.
pub fn follow_up_prefix(previous: Intent) -> &'static str {
    match previous {
        Intent::Faq => "Following up on your question: ",
        Intent::Troubleshooting => "Continuing with the troubleshooting: ",
        Intent::Onboarding => "Picking up where we left off in the setup: ",
        Intent::Product => "More on the product side: ",
        Intent::General => "To continue: ",
    }
}

/// Suggested follow-up utterances per intent.
pub fn suggestions_for_intent(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Faq => &[
            "Tell me more about this site",
            "What projects are showcased here?",
            "How was the assistant built?",
        ],
        Intent::Troubleshooting => &[
            "That fixed it",
            "It still doesn't work",
            "Show me another option",
        ],
        Intent::Onboarding => &[
            "What's the next step?",
            "Skip this step",
            "Start over",
        ],
        Intent::Product => &[
            "Compare the plans",
            "Is there a free tier?",
            "Tell me about the API",
        ],
        Intent::General => &[
            "Tell me more",
            "What can you help with?",
            "Show me the projects",
        ],
    }
}

// =============================================================================
// Related concepts (detailed personalization)
// =============================================================================

const CONCEPT_TRIGGERS: [(&str, &str); 5] = [
    ("api", "API access: embedding the assistant in your own pages"),
    ("config", "Configuration: tuning the assistant from the dashboard"),
    ("install", "Installation: adding the widget with a single script tag"),
    ("performance", "Performance: responses are composed in-process, with no database round-trips"),
    ("security", "Security: no conversation data is persisted across sessions"),
];

/// Canned concept lines triggered by keyword presence in the text, at most
/// three.
pub fn related_concepts(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    CONCEPT_TRIGGERS
        .iter()
        .filter(|(trigger, _)| lower.contains(trigger))
        .map(|(_, line)| *line)
        .take(3)
        .collect()
}

// =============================================================================
// Error taxonomy
// =============================================================================

/// Canned explanation for an upstream failure.
pub fn error_message(kind: UpstreamErrorKind) -> &'static str {
    match kind {
        UpstreamErrorKind::Timeout => {
            "The answer took too long to generate and the request was cut \
             off. This is usually momentary."
        }
        UpstreamErrorKind::ServiceUnavailable => {
            "The answering service is temporarily unavailable. Your message \
             was not lost."
        }
        UpstreamErrorKind::RateLimit => {
            "Things are a bit busy right now and new requests are being \
             slowed down."
        }
        UpstreamErrorKind::InvalidInput => {
            "That request couldn't be processed as written."
        }
        UpstreamErrorKind::Unknown => {
            "Something unexpected went wrong while preparing an answer."
        }
    }
}

/// Canned suggestions for an upstream failure.
pub fn error_suggestions(kind: UpstreamErrorKind) -> &'static [&'static str] {
    match kind {
        UpstreamErrorKind::Timeout => &[
            "Try asking again",
            "Ask a shorter question",
        ],
        UpstreamErrorKind::ServiceUnavailable => &[
            "Try again in a minute",
            "Browse the projects meanwhile",
        ],
        UpstreamErrorKind::RateLimit => &[
            "Wait a moment and retry",
            "Ask one question at a time",
        ],
        UpstreamErrorKind::InvalidInput => &[
            "Rephrase the question",
            "Ask about one topic at a time",
        ],
        UpstreamErrorKind::Unknown => &[
            "Try asking again",
            "Rephrase the question",
        ],
    }
}

/// Canned next steps for an upstream failure.
pub fn error_next_steps(kind: UpstreamErrorKind) -> &'static [&'static str] {
    match kind {
        UpstreamErrorKind::Timeout | UpstreamErrorKind::ServiceUnavailable => &[
            "Retry the request",
            "Check back shortly if the problem persists",
        ],
        UpstreamErrorKind::RateLimit => &[
            "Pause briefly before the next question",
        ],
        UpstreamErrorKind::InvalidInput | UpstreamErrorKind::Unknown => &[
            "Reword the request and try again",
            "Contact support if this keeps happening",
        ],
    }
}

// =============================================================================
// Fixed copy
// =============================================================================

/// Body of the FAQ branch when no knowledge matched.
pub const NO_KNOWLEDGE_MESSAGE: &str =
    "Sorry, I don't have anything on that in my knowledge base yet. I can \
     answer questions about this site, its projects, plans, and setup.";

/// Suggestions attached to the no-knowledge response.
pub fn no_knowledge_suggestions() -> &'static [&'static str] {
    &[
        "What is this site?",
        "What plans are available?",
        "How do I get started?",
    ]
}

/// Disclaimer appended to a low-confidence draft in the fallback branch.
pub const FALLBACK_DISCLAIMER: &str =
    "I'm not fully confident in this answer, so please double-check anything \
     important.";

/// Body of the fallback branch when no draft is available at all.
pub const FALLBACK_EMPTY_MESSAGE: &str =
    "I couldn't process that. Could you rephrase it, or ask about the site, \
     its projects, or getting started?";

/// Escalation notice appended after repeated troubleshooting failures.
pub const ESCALATION_NOTICE: &str =
    "Since this hasn't resolved after a couple of attempts, you can also \
     reach a human at /help/contact. Include what you've tried so far.";

/// Congratulations block for a completed onboarding flow.
pub const ONBOARDING_COMPLETE: &str =
    "That's every step done. Your page is live, nice work!";

/// Labels for the first three troubleshooting solution tiers.
pub const SOLUTION_TIERS: [&str; 3] = ["Most Likely", "Alternative", "Additional Option"];

/// Welcome-back greeting tiered by prior message count, `None` for fresh or
/// short sessions.
pub fn welcome_back(prior_messages: usize) -> Option<&'static str> {
    if prior_messages > 10 {
        Some("Good to have you back. We've covered a lot already.")
    } else if prior_messages > 5 {
        Some("Welcome back! Picking up from where we were.")
    } else {
        None
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Category tables ----

    #[test]
    fn test_every_category_has_next_steps_and_links() {
        for category in Category::ALL {
            assert!(!next_steps_for_category(category).is_empty());
            assert!(!related_links_for_category(category).is_empty());
        }
    }

    #[test]
    fn test_related_links_look_like_paths() {
        for category in Category::ALL {
            for (title, url) in related_links_for_category(category) {
                assert!(!title.is_empty());
                assert!(url.starts_with('/'), "unexpected url: {url}");
            }
        }
    }

    // ---- Intent tables ----

    #[test]
    fn test_every_intent_has_background_and_suggestions() {
        for intent in [
            Intent::Faq,
            Intent::Troubleshooting,
            Intent::Onboarding,
            Intent::Product,
            Intent::General,
        ] {
            assert!(!background_for_intent(intent).is_empty());
            assert!(!suggestions_for_intent(intent).is_empty());
            assert!(!follow_up_prefix(intent).is_empty());
        }
    }

    // ---- Related concepts ----

    #[test]
    fn test_related_concepts_trigger_on_keywords() {
        let concepts = related_concepts("Our API performance is great");
        assert_eq!(concepts.len(), 2);
        assert!(concepts[0].contains("API"));
    }

    #[test]
    fn test_related_concepts_empty_without_triggers() {
        assert!(related_concepts("nothing relevant here").is_empty());
    }

    #[test]
    fn test_related_concepts_capped_at_three() {
        let text = "api config install performance security";
        assert_eq!(related_concepts(text).len(), 3);
    }

    #[test]
    fn test_related_concepts_case_insensitive() {
        assert_eq!(related_concepts("SECURITY matters").len(), 1);
    }

    // ---- Error taxonomy ----

    #[test]
    fn test_every_error_kind_has_full_copy() {
        for kind in [
            UpstreamErrorKind::Timeout,
            UpstreamErrorKind::ServiceUnavailable,
            UpstreamErrorKind::RateLimit,
            UpstreamErrorKind::InvalidInput,
            UpstreamErrorKind::Unknown,
        ] {
            assert!(!error_message(kind).is_empty());
            assert!(!error_suggestions(kind).is_empty());
            assert!(!error_next_steps(kind).is_empty());
        }
    }

    // ---- Welcome back ----

    #[test]
    fn test_welcome_back_tiers() {
        assert!(welcome_back(0).is_none());
        assert!(welcome_back(5).is_none());
        let mid = welcome_back(6).unwrap();
        let long = welcome_back(11).unwrap();
        assert_ne!(mid, long);
        // Boundary: exactly 10 is still the lower tier.
        assert_eq!(welcome_back(10), Some(mid));
    }
}
