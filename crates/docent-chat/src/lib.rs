//! Response composition for Docent.
//!
//! Turns intent classifications, knowledge matches, language-model drafts,
//! and per-session conversation state into structured replies: display text,
//! follow-up suggestions, next steps, related links, and progress indicators.

pub mod composer;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod tables;
pub mod types;

pub use composer::ResponseComposer;
pub use context::{Session, SessionManager};
pub use error::ChatError;
pub use orchestrator::ChatOrchestrator;
pub use types::{
    Availability, GeneratedResponse, PricingPlan, ProductInfo, ProgressIndicators, RelatedLink,
    ResponseMetadata, Specifications, TurnRequest,
};
