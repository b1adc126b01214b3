use crate::conversation::Message;
use crate::openai::{respond, OpenAIClientTrait};
use crate::prompts::paraphrase_prompt;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Collapses internal whitespace runs to single spaces and trims.
pub fn normalize_question(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns raw multi-line paraphrase output into at most `limit` distinct
/// questions, keeping first-seen order and skipping blank lines.
pub fn dedup_variants(raw: &str, limit: usize) -> Vec<String> {
    collect_variants(raw, HashSet::new(), limit)
}

fn collect_variants(
    raw: &str,
    mut seen: HashSet<String>,
    limit: usize,
) -> Vec<String> {
    let mut variants = Vec::new();

    for line in raw.lines() {
        if variants.len() >= limit {
            break;
        }
        let question = normalize_question(line);
        if question.is_empty() || !seen.insert(question.clone()) {
            continue;
        }
        variants.push(question);
    }

    variants
}

/// Asks the paraphrase model for up to `k_perturbations` rephrasings of
/// `question`.
///
/// Rephrasings identical to the original question are dropped before the
/// limit is applied, so an echoed original does not cost a slot. An empty or
/// failed reply yields no variants; voting then runs on the original
/// question's answer alone.
#[instrument(skip(client, question))]
pub async fn request_variants(
    client: &dyn OpenAIClientTrait,
    model: &str,
    question: &str,
    k_perturbations: usize,
) -> Vec<String> {
    let prompt = paraphrase_prompt(question, k_perturbations);
    let raw = respond(client, model, &[Message::user_text(prompt)]).await;

    let original = normalize_question(question);
    let seen = HashSet::from([original.clone()]);
    let variants = collect_variants(&raw, seen, k_perturbations);

    if variants.is_empty() {
        warn!("No usable paraphrases for question: {}", original);
    } else {
        debug!("Collected {} paraphrases", variants.len());
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::fake::FakeOpenAIClient;

    #[test]
    fn test_dedup_stops_at_limit() {
        assert_eq!(dedup_variants("Q1\nQ1\nQ2\n\nQ3", 2), vec!["Q1", "Q2"]);
    }

    #[test]
    fn test_dedup_normalizes_whitespace_before_comparing() {
        assert_eq!(
            dedup_variants("  Is  AB tangent?\nIs AB\ttangent?  \r\nIs CD?", 5),
            vec!["Is AB tangent?", "Is CD?"]
        );
    }

    #[test]
    fn test_dedup_returns_fewer_when_input_runs_out() {
        assert_eq!(dedup_variants("only one\n\n   \n", 3), vec!["only one"]);
        assert!(dedup_variants("", 3).is_empty());
        assert!(dedup_variants("Q1\nQ2", 0).is_empty());
    }

    #[test]
    fn test_normalize_question() {
        assert_eq!(normalize_question("  a \t b\u{00a0}c  "), "a b c");
        assert_eq!(normalize_question(""), "");
    }

    #[tokio::test]
    async fn test_request_variants_drops_original() {
        let client = FakeOpenAIClient::new().with_response(
            "Which segment touches the circle?\nWhich  segment is tangent?\nWhat line is tangent to ⊙O?",
        );

        let variants = request_variants(
            &client,
            "paraphraser",
            "Which segment is tangent?",
            3,
        )
        .await;

        assert_eq!(
            variants,
            vec![
                "Which segment touches the circle?",
                "What line is tangent to ⊙O?"
            ]
        );
        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[0].model_name, "paraphraser");
    }

    #[tokio::test]
    async fn test_echoed_original_does_not_use_up_the_limit() {
        let client = FakeOpenAIClient::new()
            .with_response("Which segment is tangent?\nV1\nV2\nV3\nV4");

        let variants =
            request_variants(&client, "m", "Which segment is tangent?", 3)
                .await;

        assert_eq!(variants, vec!["V1", "V2", "V3"]);
    }

    #[tokio::test]
    async fn test_request_variants_degrades_on_failure() {
        let client = FakeOpenAIClient::new().with_failure("503");
        let variants = request_variants(&client, "m", "Q?", 3).await;
        assert!(variants.is_empty());
    }
}
