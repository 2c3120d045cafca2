//! Interpreting generator replies.

use serde_json::Value;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";
const NONE_SENTINEL: &str = "error";

/// Which context candidate, if any, the generator based its answer on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    /// 1-based position in the context list.
    Candidate(usize),
    NoneRelevant,
}

impl Relevance {
    /// Zero-based index into a context list of `count` candidates.
    pub fn resolve(self, count: usize) -> Option<usize> {
        match self {
            Relevance::Candidate(n) if (1..=count).contains(&n) => Some(n - 1),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub answer: String,
    pub relevance: Relevance,
}

/// Parses a reply of the form `{"answer": "...", "relevant": n | "error"}`.
///
/// A reply wrapped in a ```` ```json ```` fence is unwrapped first. Anything
/// that is not such an object becomes the answer text with no relevant
/// candidate.
pub fn parse_reply(raw: &str) -> GeneratedAnswer {
    let body = unfence(raw);

    let parsed: Option<serde_json::Map<String, Value>> = serde_json::from_str(body).ok();
    let Some(object) = parsed else {
        return GeneratedAnswer {
            answer: body.to_string(),
            relevance: Relevance::NoneRelevant,
        };
    };

    let answer = match object.get("answer") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let relevance = object
        .get("relevant")
        .map(relevance_of)
        .unwrap_or(Relevance::NoneRelevant);

    GeneratedAnswer { answer, relevance }
}

fn relevance_of(value: &Value) -> Relevance {
    let n = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) if s.trim().eq_ignore_ascii_case(NONE_SENTINEL) => None,
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match n {
        Some(n) if n >= 1 => Relevance::Candidate(n as usize),
        _ => Relevance::NoneRelevant,
    }
}

fn unfence(raw: &str) -> &str {
    let Some(start) = raw.find(FENCE_OPEN) else {
        return raw.trim();
    };
    let inner = &raw[start + FENCE_OPEN.len()..];
    match inner.find(FENCE_CLOSE) {
        Some(end) => inner[..end].trim(),
        None => raw.trim(),
    }
}
