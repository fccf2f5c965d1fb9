// src/notifier/format.rs
use crate::types::MatchResult;
use crate::utils::{escape_markdown, truncate_chars};

/// Telegram rejects messages longer than this.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Telegram Markdown card for a single match. A long rationale is cut so the
/// whole card stays within [`MAX_MESSAGE_CHARS`].
pub fn match_message(result: &MatchResult) -> String {
    let job = &result.job;
    let mut head = format!(
        "🚀 *New Job Match!*\n\n📌 *{}*\n🏢 {}\n",
        escape_markdown(&job.title),
        escape_markdown(&job.company),
    );
    if !job.location.is_empty() {
        head.push_str(&format!("📍 {}\n", escape_markdown(&job.location)));
    }
    head.push_str(&format!(
        "🌐 Source: {}\n📊 *AI Match Score:* {}%\n\n*Analysis:*\n",
        job.site, result.score,
    ));
    let tail = format!("\n\n🔗 [Apply Here]({})", job.link.replace(')', "%29"));

    let budget = MAX_MESSAGE_CHARS.saturating_sub(head.chars().count() + tail.chars().count());
    let rationale = fit_rationale(&escape_markdown(&result.rationale), budget);
    format!("{head}{rationale}{tail}")
}

/// Cut escaped text to `budget` chars, ending with an ellipsis when shortened.
fn fit_rationale(escaped: &str, budget: usize) -> String {
    if escaped.chars().count() <= budget {
        return escaped.to_string();
    }
    let mut cut = truncate_chars(escaped, budget.saturating_sub(1)).to_string();
    // Never leave a dangling escape.
    let trailing = cut.chars().rev().take_while(|c| *c == '\\').count();
    if trailing % 2 == 1 {
        cut.pop();
    }
    cut.push('…');
    cut
}
