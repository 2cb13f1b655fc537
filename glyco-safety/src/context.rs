use glyco_core::config::SafetyConfig;
use glyco_core::models::KnowledgeBreakdown;

/// Everything a check may inspect. Borrowed for the duration of one audit;
/// audits are pure functions of this context.
pub struct AuditContext<'a> {
    pub answer: &'a str,
    pub query: &'a str,
    pub breakdown: &'a KnowledgeBreakdown,
    /// Text of the retrieval chunks that informed the answer.
    pub retrieval_texts: &'a [String],
    pub config: &'a SafetyConfig,
}

/// Clause-level helpers shared by the pattern checks.
pub(crate) mod clauses {
    /// The sentence containing byte offset `at`.
    pub fn sentence_around(text: &str, at: usize) -> &str {
        let bytes = text.as_bytes();
        let start = text[..at]
            .rfind(['.', '!', '?', '\n'])
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = text[at..]
            .find(['.', '!', '?', '\n'])
            .map(|i| at + i + 1)
            .unwrap_or(bytes.len());
        text[start..end].trim()
    }

    /// The clause containing byte offset `at`: the sentence segment between
    /// commas/semicolons. Hedging in a neighboring clause must not suppress
    /// a finding in this one.
    pub fn clause_around(text: &str, at: usize) -> &str {
        let sentence = sentence_around(text, at);
        let sentence_start = sentence.as_ptr() as usize - text.as_ptr() as usize;
        let rel = at.saturating_sub(sentence_start).min(sentence.len());
        let start = sentence[..rel].rfind([',', ';']).map(|i| i + 1).unwrap_or(0);
        let end = sentence[rel..]
            .find([',', ';'])
            .map(|i| rel + i)
            .unwrap_or(sentence.len());
        sentence[start..end].trim()
    }
}
