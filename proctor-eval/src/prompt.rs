use proctor_common::EvaluationResult;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// One chat message in the OpenAI wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

const SYSTEM_PROMPT: &str = "You are a senior engineer reviewing a candidate's interview \
submission. Reply with a single JSON object and nothing else, shaped as \
{\"score\": 0-100, \"feedback\": string, \"suggestions\": [string], \
\"codeQuality\": {\"readability\": 0-100, \"efficiency\": 0-100, \"correctness\": 0-100}}.";

/// Build the system and user messages for one evaluation.
pub fn build_messages(
    code: &str,
    language: &str,
    output: &str,
    max_output_chars: usize,
) -> Vec<ChatMessage> {
    let mut prompt = format!(
        "Language: {}\n\nSubmitted code:\n```{}\n{}\n```\n",
        language, language, code
    );

    let truncated: String = output.chars().take(max_output_chars).collect();
    prompt.push_str("\nProgram output:\n```\n");
    prompt.push_str(&truncated);
    if truncated.len() < output.len() {
        prompt.push_str("\n... (output truncated)");
    }
    prompt.push_str("\n```\n\nEvaluate correctness, efficiency and readability.");

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}

/// Parse and validate the model reply.
pub fn parse_evaluation(reply: &str) -> EvalResult<EvaluationResult> {
    let json = extract_json_object(reply)
        .ok_or_else(|| EvalError::InvalidResponse("reply contains no JSON object".to_string()))?;
    let evaluation: EvaluationResult = serde_json::from_str(json)?;
    validate(&evaluation)?;
    Ok(evaluation)
}

fn validate(evaluation: &EvaluationResult) -> EvalResult<()> {
    check_range("score", evaluation.score)?;
    for (axis, value) in evaluation.code_quality.axes() {
        check_range(axis, value)?;
    }
    if evaluation.feedback.trim().is_empty() {
        return Err(EvalError::InvalidResponse("feedback is empty".to_string()));
    }
    Ok(())
}

fn check_range(field: &str, value: f64) -> EvalResult<()> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(EvalError::InvalidResponse(format!(
            "{} out of range: {}",
            field, value
        )))
    }
}

/// Locate the JSON object in a reply, preferring a fenced block when present.
fn extract_json_object(reply: &str) -> Option<&str> {
    let body = fenced_block(reply).unwrap_or(reply);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (end > start).then(|| &body[start..=end])
}

fn fenced_block(reply: &str) -> Option<&str> {
    let open = reply.find("```")?;
    let after_fence = &reply[open + 3..];
    // Skip the info string (e.g. "json") up to the end of the fence line.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"score": 75, "feedback": "Works", "suggestions": ["Name things"],
        "codeQuality": {"readability": 60, "efficiency": 80, "correctness": 90}}"#;

    #[test]
    fn test_parse_plain_json() {
        let evaluation = parse_evaluation(VALID).unwrap();
        assert_eq!(evaluation.score, 75.0);
        assert_eq!(evaluation.code_quality.correctness, 90.0);
    }

    #[test]
    fn test_parse_fenced_json_with_chatter() {
        let reply = format!("Here is my review:\n```json\n{}\n```\nGood luck!", VALID);
        let evaluation = parse_evaluation(&reply).unwrap();
        assert_eq!(evaluation.feedback, "Works");
    }

    #[test]
    fn test_rejects_out_of_range_score() {
        let reply = VALID.replace("\"score\": 75", "\"score\": 140");
        let err = parse_evaluation(&reply).unwrap_err();
        assert!(err.to_string().contains("score out of range"));
    }

    #[test]
    fn test_rejects_non_json_reply() {
        assert!(matches!(
            parse_evaluation("I cannot evaluate this."),
            Err(EvalError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_rejects_missing_fields() {
        assert!(matches!(
            parse_evaluation(r#"{"score": 10}"#),
            Err(EvalError::SerializationError(_))
        ));
    }

    #[test]
    fn test_prompt_truncates_output() {
        let output = "x".repeat(50);
        let messages = build_messages("print('x' * 50)", "python", &output, 10);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.contains("xxxxxxxxxx\n... (output truncated)"));
        assert!(!messages[1].content.contains(&"x".repeat(11)));
    }
}
