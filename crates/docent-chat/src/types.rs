//! Data shapes exchanged with the orchestration layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docent_core::types::{Intent, IntentClassification, LlmDraft, UpstreamFailure};

// =============================================================================
// Composed responses
// =============================================================================

/// Metadata envelope shared by every composed response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub processing_time_ms: u64,
    /// Identifier of whatever produced the body: an upstream model name,
    /// `"knowledge-base"`, `"error-handler"`, or `"fallback"`.
    pub model_used: String,
    pub confidence: f32,
    pub intent: Intent,
}

/// A link offered alongside a response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub title: String,
    pub url: String,
}

/// Progress through a multi-step flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressIndicators {
    pub current_step: u32,
    pub total_steps: u32,
    /// `round(current / total * 100)`.
    pub completion_percentage: u32,
}

/// The final structured reply handed back to the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratedResponse {
    pub content: String,
    pub metadata: ResponseMetadata,
    /// Suggested follow-up utterances, at most three.
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_links: Option<Vec<RelatedLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressIndicators>,
}

// =============================================================================
// Product records
// =============================================================================

/// Release status of a product, rendered through a fixed vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    ComingSoon,
    Beta,
    Deprecated,
}

impl Availability {
    /// Fixed display string for this status.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available now",
            Self::ComingSoon => "Coming soon",
            Self::Beta => "Available in beta",
            Self::Deprecated => "No longer offered",
        }
    }
}

/// One pricing tier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PricingPlan {
    pub name: String,
    pub price: String,
    pub features: Vec<String>,
}

/// Requirement/compatibility/performance bullet lists.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Specifications {
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub compatibility: Vec<String>,
    #[serde(default)]
    pub performance: Vec<String>,
}

/// Structured product record supplied by the caller. Sections absent here
/// are omitted entirely from the composed response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pricing: Option<Vec<PricingPlan>>,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub specifications: Option<Specifications>,
}

// =============================================================================
// Turn input
// =============================================================================

/// Everything the orchestrator needs for one conversation turn.
///
/// The intent classification and (optional) draft come from external
/// collaborators, already resolved; nothing here suspends.
#[derive(Clone, Debug)]
pub struct TurnRequest {
    pub message: String,
    /// Existing session to continue, or `None` to start one.
    pub session_id: Option<Uuid>,
    pub classification: IntentClassification,
    pub draft: Option<LlmDraft>,
    /// Upstream failure to format instead of a normal reply.
    pub failure: Option<UpstreamFailure>,
    /// Product record for product-intent turns.
    pub product: Option<ProductInfo>,
    /// Candidate solutions for troubleshooting turns, ordered by likelihood.
    pub solutions: Vec<String>,
}

impl TurnRequest {
    /// A minimal request with just a message and classification.
    pub fn new(message: impl Into<String>, classification: IntentClassification) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            classification,
            draft: None,
            failure: None,
            product: None,
            solutions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_labels() {
        assert_eq!(Availability::Available.label(), "Available now");
        assert_eq!(Availability::ComingSoon.label(), "Coming soon");
        assert_eq!(Availability::Beta.label(), "Available in beta");
        assert_eq!(Availability::Deprecated.label(), "No longer offered");
    }

    #[test]
    fn test_generated_response_omits_absent_sections() {
        let response = GeneratedResponse {
            content: "hello".to_string(),
            metadata: ResponseMetadata {
                processing_time_ms: 5,
                model_used: "knowledge-base".to_string(),
                confidence: 0.9,
                intent: Intent::Faq,
            },
            suggestions: vec![],
            next_steps: None,
            related_links: None,
            progress: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("next_steps"));
        assert!(!json.contains("related_links"));
        assert!(!json.contains("progress"));
    }

    #[test]
    fn test_product_info_deserializes_with_missing_sections() {
        let info: ProductInfo = serde_json::from_str(r#"{"name":"Portfolio Pro"}"#).unwrap();
        assert_eq!(info.name, "Portfolio Pro");
        assert!(info.pricing.is_none());
        assert!(info.availability.is_none());
        assert!(info.specifications.is_none());
    }

    #[test]
    fn test_turn_request_minimal() {
        let req = TurnRequest::new("hi", IntentClassification::new(Intent::General, 0.8));
        assert!(req.session_id.is_none());
        assert!(req.draft.is_none());
        assert!(req.solutions.is_empty());
    }
}
