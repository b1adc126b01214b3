use geovote::category::Category;
use geovote::eval::run;
use geovote::judge::Tally;
use geovote::log_sink::RESULTS_FILE;
use geovote::openai::fake::FakeOpenAIClient;
use geovote::test_utils::{init_test_logging, write_question_file};
use geovote::EvalConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tracing::info;

fn tangent_question() -> Value {
    json!({
        "image": "/images/tangent.png",
        "question": "Which segment is tangent?",
        "answer": "[AD]",
        "question_type": "Position",
        "id": "Q1"
    })
}

#[tokio::test]
async fn test_tangent_question_end_to_end() {
    init_test_logging();
    let data = tempfile::tempdir().unwrap();
    let logs = tempfile::tempdir().unwrap();
    write_question_file(data.path(), "q1.json", &tangent_question()).unwrap();

    let client = Arc::new(FakeOpenAIClient::new().with_responses(vec![
        "Which segment touches the circle?\nName the tangent segment.\nWhat segment is tangent to the circle?",
        "AD",
        "AD",
        "AD",
        "BC",
    ]));
    let config = EvalConfig::new(data.path(), logs.path(), "qwen-vl");

    let report = run(&config, client.clone()).await.unwrap();
    info!("Run finished: {:?}", report);

    assert_eq!(
        report.counter.get(Category::Position),
        Tally {
            correct: 1,
            total: 1
        }
    );
    assert_eq!(report.evaluated, 1);
    assert_eq!(report.unmatched, 0);

    let log =
        fs::read_to_string(logs.path().join("correct_logs/Position/Q1.txt"))
            .unwrap();
    assert!(log.starts_with(
        "ID: Q1\nQuestion: Which segment is tangent?\nAnswer: [AD]\n"
    ));

    let summary: Value =
        serde_json::from_str(&fs::read_to_string(&report.summary_path).unwrap())
            .unwrap();
    assert_eq!(
        summary,
        json!({
            "Position": {"correct": 1, "total": 1, "accuracy": 1.0},
            "Geometry Shape": {"correct": 0, "total": 0, "accuracy": 0.0},
            "Geometric Relationship": {"correct": 0, "total": 0, "accuracy": 0.0},
            "total": {"correct": 1, "total": 1, "accuracy": 1.0}
        })
    );
}

#[tokio::test]
async fn test_mixed_dataset_with_unmatched_records() {
    init_test_logging();
    let data = tempfile::tempdir().unwrap();
    let logs = tempfile::tempdir().unwrap();

    write_question_file(
        data.path(),
        "a.json",
        &json!({
            "image": "/images/a.png",
            "question": "Which option gives the measure of ∠ABC?",
            "answer": "B",
            "question_type": "Geometric Relationship",
            "id": "R1"
        }),
    )
    .unwrap();
    write_question_file(
        data.path(),
        "b.json",
        &json!({
            "image": "/images/b.png",
            "question": "What is the area?",
            "answer": "12",
            "question_type": "Area",
            "id": "X1"
        }),
    )
    .unwrap();
    fs::write(data.path().join("c.json"), "{ truncated").unwrap();

    let client = Arc::new(FakeOpenAIClient::new().with_responses(vec![
        "Which choice is the size of ∠ABC?\nPick the measure of ∠ABC.",
        "A",
        "The answer is {B}",
        "I think it's B",
    ]));
    let config = EvalConfig::new(data.path(), logs.path(), "qwen-vl");

    let report = run(&config, client).await.unwrap();

    assert_eq!(report.evaluated, 1);
    assert_eq!(report.unmatched, 2);
    assert_eq!(
        report.counter.get(Category::GeometricRelationship),
        Tally {
            correct: 1,
            total: 1
        }
    );
    assert!(logs
        .path()
        .join("correct_logs/Geometric Relationship/R1.txt")
        .is_file());
    assert!(logs.path().join("unmatched_logs/Unknown/X1.txt").is_file());
    assert!(logs.path().join("unmatched_logs/Unknown/c.txt").is_file());

    let results =
        fs::read_to_string(logs.path().join(RESULTS_FILE)).unwrap();
    let outcomes: Vec<&str> = results
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(2).unwrap_or(""))
        .collect();
    assert_eq!(outcomes, vec!["correct", "unmatched", "unmatched"]);
}
