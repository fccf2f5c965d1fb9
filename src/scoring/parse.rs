// src/scoring/parse.rs
use crate::errors::ScoringError;

/// Split a model reply into its `Score:` value and the rest as rationale.
pub fn parse_score_response(text: &str) -> Result<(u8, String), ScoringError> {
    let mut score = None;
    let mut rationale = Vec::new();

    for line in text.lines() {
        if score.is_none() {
            if let Some(value) = score_value(line) {
                score = Some(parse_score(value)?);
                continue;
            }
        }
        rationale.push(line);
    }

    let score = score.ok_or(ScoringError::MissingScore)?;
    let rationale = rationale.join("\n").trim().to_string();
    if rationale.is_empty() {
        return Err(ScoringError::MissingRationale);
    }
    Ok((score, rationale))
}

/// The text after `score:` on a line, ignoring case and Markdown emphasis.
fn score_value(line: &str) -> Option<String> {
    let plain: String = line.chars().filter(|c| *c != '*').collect();
    let idx = plain.to_ascii_lowercase().find("score:")?;
    Some(plain[idx + "score:".len()..].trim().to_string())
}

fn parse_score(value: String) -> Result<u8, ScoringError> {
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ScoringError::NonNumericScore(value));
    }
    let score: u32 = digits
        .parse()
        .map_err(|_| ScoringError::NonNumericScore(value.clone()))?;
    if score > 100 {
        return Err(ScoringError::ScoreOutOfRange(score));
    }
    Ok(score as u8)
}
