//! Writing critique shapes and the local heuristic used when no text
//! generator is reachable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};

/// Layered critique returned to the user. Layers stay loosely typed because
/// generated critiques vary in shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritingCritique {
    pub doc_summary: String,
    pub layers: Value,
}

/// JSON schema sent alongside the text so the generator answers in shape.
pub fn critique_schema() -> Value {
    serde_json::json!({
        "doc_summary": "string",
        "layers": {
            "grammar": {"score": "int", "issues": [{"span": [0, 0], "fix": "string"}], "notes": "string"},
            "clarity": {"score": "int", "rewrites": [{"span": [0, 0], "text": "string"}]},
            "style": {"score": "int", "style_axis": {"tone": "string", "diction": "string"}, "examples": []},
            "content": {"score": "int", "gaps": [], "claims_to_check": [], "outline_fix": []},
            "target": {"goal": "string", "score": "int", "keywords": [], "title_tags": [], "meta_desc": ""},
            "related": {"reading_list": [], "exemplars": []}
        }
    })
}

/// Build the prompt payload for the generator.
pub fn critique_prompt(text: &str, mode: &str, target_detail: &str) -> String {
    serde_json::json!({
        "mode": mode,
        "targetDetail": target_detail,
        "schema": critique_schema(),
        "text": text,
    })
    .to_string()
}

/// Pull the outermost `{ ... }` span out of generated text and parse it.
pub fn parse_generated_critique(generated: &str) -> Result<WritingCritique> {
    let (Some(start), Some(end)) = (generated.find('{'), generated.rfind('}')) else {
        return Err(CoreError::invalid("generated critique contains no JSON object"));
    };
    if end < start {
        return Err(CoreError::invalid("generated critique contains no JSON object"));
    }
    Ok(serde_json::from_str(&generated[start..=end])?)
}

/// Word/sentence-count critique with fixed layer scores.
pub fn heuristic_critique(text: &str, mode: &str) -> WritingCritique {
    let words = text.split_whitespace().count();
    let sentences = text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count().max(1);
    let avg_len = words as f64 / sentences as f64;
    let clarity = 100 - ((avg_len - 22.0).max(0.0) * 2.0) as i64;

    WritingCritique {
        doc_summary: format!("{words} words; {sentences} sentences; avg {avg_len:.1} words/sentence."),
        layers: serde_json::json!({
            "grammar": {"score": 95, "issues": [], "notes": "Heuristic fallback"},
            "clarity": {"score": clarity, "rewrites": []},
            "style": {"score": 70, "style_axis": {"tone": "neutral", "diction": "plain"}, "examples": []},
            "content": {"score": 75, "gaps": [], "claims_to_check": [], "outline_fix": []},
            "target": {"goal": mode, "score": 72, "keywords": [], "title_tags": [], "meta_desc": ""},
            "related": {"reading_list": [], "exemplars": []}
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_counts_words_and_sentences() {
        let c = heuristic_critique("One two three. Four five!", "audience");
        assert_eq!(c.doc_summary, "5 words; 2 sentences; avg 2.5 words/sentence.");
        assert_eq!(c.layers["clarity"]["score"], 100);
        assert_eq!(c.layers["target"]["goal"], "audience");
    }

    #[test]
    fn long_sentences_cost_clarity() {
        let text = vec!["word"; 32].join(" ");
        let c = heuristic_critique(&text, "seo");
        // no terminator -> one sentence of 32 words -> 100 - 2*10
        assert_eq!(c.layers["clarity"]["score"], 80);
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let generated = "Sure! Here it is:\n{\"doc_summary\":\"ok\",\"layers\":{}}\nThanks";
        let c = parse_generated_critique(generated).unwrap();
        assert_eq!(c.doc_summary, "ok");
        assert!(parse_generated_critique("no json here").is_err());
    }
}
