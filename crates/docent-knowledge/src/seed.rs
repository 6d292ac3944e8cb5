//! Fixed seed set the store is populated from at process start.
//!
//! The store is volatile; this list plus any runtime mutations is all the
//! knowledge the process ever has.

use tracing::info;

use docent_core::types::Category;

use crate::error::Result;
use crate::store::{ImportReport, KnowledgeStore, NewEntry};

/// The built-in knowledge set for the portfolio assistant.
pub fn seed_entries() -> Vec<NewEntry> {
    vec![
        NewEntry::new(
            Category::Faq,
            "What is this site?",
            "This is a demo portfolio showcasing selected projects, write-ups, and a live chat assistant that can answer questions about them.",
            &["site", "portfolio", "about"],
        ),
        NewEntry::new(
            Category::Faq,
            "What is a chatbot?",
            "A chatbot is a program that holds a conversation with visitors. The assistant on this site combines a knowledge base with a language model to answer questions.",
            &["chatbot", "ai", "assistant"],
        ),
        NewEntry::new(
            Category::Faq,
            "What stack powers this site?",
            "The backend is written in Rust; the knowledge base, search, and response composition all run in-process with no external database.",
            &["stack", "rust", "backend", "technology"],
        ),
        NewEntry::new(
            Category::Faq,
            "Can I see the source code?",
            "Most projects shown here link to their repositories from the project page. The chat assistant itself is part of the portfolio codebase.",
            &["source", "code", "repository", "github"],
        ),
        NewEntry::new(
            Category::Troubleshooting,
            "The live demo will not load",
            "Clear your browser cache and reload the page. If the demo still fails, check that third-party scripts are not blocked.",
            &["demo", "load", "cache", "blank"],
        ),
        NewEntry::new(
            Category::Troubleshooting,
            "The chat widget stopped responding",
            "Close and reopen the widget first. A stalled response usually means the upstream model call timed out; retrying almost always recovers.",
            &["chat", "widget", "frozen", "timeout"],
        ),
        NewEntry::new(
            Category::Troubleshooting,
            "Dark mode renders incorrectly",
            "Toggle the theme switch twice to reset the stored preference, then reload. Stale preference data in local storage is the usual culprit.",
            &["dark", "theme", "display", "rendering"],
        ),
        NewEntry::new(
            Category::Product,
            "What plans are available?",
            "There are three plans: Starter (free, public projects only), Pro (adds private projects and analytics), and Studio (adds team seats and priority support).",
            &["plans", "pricing", "tiers"],
        ),
        NewEntry::new(
            Category::Product,
            "Is there an API?",
            "Yes. Pro and Studio plans include API access for embedding the assistant in your own pages. The API is currently in beta.",
            &["api", "integration", "embed"],
        ),
        NewEntry::new(
            Category::Onboarding,
            "How do I get started?",
            "Create an account, pick a template, and publish your first project page. The guided setup walks you through each step.",
            &["start", "setup", "account", "guide"],
        ),
        NewEntry::new(
            Category::Onboarding,
            "How do I customize my page?",
            "Open the editor from your dashboard. Layout, theme, and section order are all adjustable; changes preview live before you publish.",
            &["customize", "editor", "theme", "layout"],
        ),
    ]
}

/// Populate a store from the seed set.
pub fn seed_store(store: &KnowledgeStore) -> Result<ImportReport> {
    let report = store.bulk_import(seed_entries())?;
    info!(
        imported = report.imported,
        skipped = report.skipped,
        "knowledge store seeded"
    );
    Ok(report)
}
