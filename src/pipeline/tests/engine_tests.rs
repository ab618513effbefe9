//! Tests for the sequential pipeline engine

use std::io::Write;

use maplit::btreemap;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

use crate::data::IoType;
use crate::execution::{ExecutionError, LogLevel};
use crate::model::{Block, Expr, Model, Pipeline, Span, TypeRef};
use crate::pipeline::{BlockState, PipelineEngine, PipelineRunReport};
use crate::test_helpers::{block, pipeline, TestEnv};

/* ===================== Fixtures ===================== */

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn extractor(name: &str, path: &str) -> Block {
    block(
        name,
        "LocalFileExtractor",
        btreemap! { "filePath".to_string() => Expr::text(path) },
    )
}

fn text_interpreter(name: &str) -> Block {
    block(name, "TextFileInterpreter", btreemap! {})
}

fn csv_interpreter(name: &str) -> Block {
    block(name, "CSVInterpreter", btreemap! {})
}

fn table_interpreter(name: &str) -> Block {
    let column = |name: &str, valuetype: &str| Expr::ValuetypeAssignment {
        name: name.to_string(),
        valuetype: TypeRef::new(valuetype),
        span: Span::default(),
    };
    block(
        name,
        "TableInterpreter",
        btreemap! {
            "columns".to_string() => Expr::collection(vec![
                column("name", "text"),
                column("hp", "integer"),
            ]),
        },
    )
}

fn env_for(pipeline: Pipeline) -> TestEnv {
    TestEnv::new(Model {
        pipelines: vec![pipeline],
        ..Model::default()
    })
}

async fn run(env: &TestEnv) -> Result<PipelineRunReport, ExecutionError> {
    PipelineEngine::new(env.env())
        .run(&env.model.pipelines[0], Box::new(env.logger.clone()))
        .await
}

fn states(report: &PipelineRunReport) -> Vec<(&str, BlockState)> {
    report
        .states
        .iter()
        .map(|(name, state)| (name.as_str(), *state))
        .collect()
}

/* ===================== Successful Runs ===================== */

#[tokio::test]
async fn test_chain_runs_in_pipe_order() {
    let file = csv_file("name,hp\nMazda RX4,110\nDatsun 710,93\n");
    let path = file.path().to_string_lossy().into_owned();
    // Declared out of order on purpose
    let env = env_for(pipeline(
        "CarsPipeline",
        vec![
            table_interpreter("CarsTableInterpreter"),
            csv_interpreter("CarsCSVInterpreter"),
            extractor("CarsExtractor", &path),
            text_interpreter("CarsTextFileInterpreter"),
        ],
        &[
            ("CarsExtractor", "CarsTextFileInterpreter"),
            ("CarsTextFileInterpreter", "CarsCSVInterpreter"),
            ("CarsCSVInterpreter", "CarsTableInterpreter"),
        ],
    ))
    .with_full_debug();

    let report = assert_ok!(run(&env).await);

    assert!(report.succeeded(), "{}", report.summary());
    assert!(report.finished_at.is_some());
    assert!(env.logger.contains(
        "[CarsPipeline > CarsTableInterpreter] Produced table with 2 rows and 2 columns"
    ));
    assert!(env.logger.contains("Pipeline finished: 4 succeeded, 0 failed, 0 skipped"));

    // Execution order is visible through the debug lines
    let executed: Vec<String> = env
        .logger
        .lines()
        .into_iter()
        .filter(|line| line.message.starts_with("Executing block"))
        .map(|line| line.location)
        .collect();
    assert_eq!(
        executed,
        vec![
            "CarsPipeline > CarsExtractor",
            "CarsPipeline > CarsTextFileInterpreter",
            "CarsPipeline > CarsCSVInterpreter",
            "CarsPipeline > CarsTableInterpreter",
        ]
    );
}

#[tokio::test]
async fn test_output_is_broadcast_to_every_successor() {
    let file = csv_file("a,b\n1,2\n");
    let path = file.path().to_string_lossy().into_owned();
    let env = env_for(pipeline(
        "Fanout",
        vec![
            extractor("Source", &path),
            text_interpreter("First"),
            text_interpreter("Second"),
        ],
        &[("Source", "First"), ("Source", "Second")],
    ))
    .with_full_debug();

    let report = assert_ok!(run(&env).await);

    assert!(report.succeeded());
    for consumer in ["First", "Second"] {
        let location = format!("[Fanout > {}] Produced text file", consumer);
        assert!(env.logger.contains(&location), "{consumer} got no input");
    }
}

/* ===================== Handled Failures ===================== */

#[tokio::test]
async fn test_handled_failure_skips_descendants_only() {
    let file = csv_file("a,b\n1,2\n");
    let path = file.path().to_string_lossy().into_owned();
    let env = env_for(pipeline(
        "Mixed",
        vec![
            extractor("Missing", "/definitely/not/here.csv"),
            text_interpreter("MissingText"),
            csv_interpreter("MissingSheet"),
            extractor("Present", &path),
            text_interpreter("PresentText"),
        ],
        &[
            ("Missing", "MissingText"),
            ("MissingText", "MissingSheet"),
            ("Present", "PresentText"),
        ],
    ));

    let report = assert_ok!(run(&env).await);

    assert!(!report.succeeded());
    assert_eq!(
        states(&report),
        vec![
            ("Missing", BlockState::Failed),
            ("MissingText", BlockState::Skipped),
            ("MissingSheet", BlockState::Skipped),
            ("Present", BlockState::Succeeded),
            ("PresentText", BlockState::Succeeded),
        ]
    );
    assert_eq!(report.summary(), "2 succeeded, 1 failed, 2 skipped");

    let finished = env
        .logger
        .lines()
        .into_iter()
        .find(|line| line.message.starts_with("Pipeline finished"))
        .unwrap();
    assert_eq!(finished.level, LogLevel::Error);
    assert_eq!(finished.location, "Mixed");
}

#[tokio::test]
async fn test_failure_in_middle_of_chain() {
    let file = csv_file("a,b\n1,2\n");
    let path = file.path().to_string_lossy().into_owned();
    let validator = block(
        "Validator",
        "TextFileInterpreter",
        btreemap! { "encoding".to_string() => Expr::text("klingon") },
    );
    let env = env_for(pipeline(
        "P",
        vec![extractor("Extractor", &path), validator, csv_interpreter("Loader")],
        &[("Extractor", "Validator"), ("Validator", "Loader")],
    ));

    let report = assert_ok!(run(&env).await);

    assert_eq!(
        states(&report),
        vec![
            ("Extractor", BlockState::Succeeded),
            ("Validator", BlockState::Failed),
            ("Loader", BlockState::Skipped),
        ]
    );
    let failure = env
        .logger
        .lines()
        .into_iter()
        .find(|line| line.level == LogLevel::Error && line.location == "P > Validator")
        .unwrap();
    assert!(failure.message.contains("Unsupported encoding 'klingon'"));
    assert!(!env.logger.lines().iter().any(|line| line.location == "P > Loader"));
}

/* ===================== Fatal Errors ===================== */

#[tokio::test]
async fn test_missing_input_is_fatal() {
    // Nothing feeds the interpreter, so it receives no value
    let env = env_for(pipeline("Orphan", vec![text_interpreter("Lonely")], &[]));

    let err = assert_err!(run(&env).await);

    assert!(matches!(
        err,
        ExecutionError::IoTypeMismatch {
            expected: IoType::File,
            actual: IoType::None,
            ..
        }
    ));
}

#[tokio::test]
async fn test_missing_runtime_parameter_is_fatal() {
    let extractor = block(
        "CarsExtractor",
        "LocalFileExtractor",
        btreemap! {
            "filePath".to_string() => Expr::RuntimeParameter {
                name: "CARS_FILE".to_string(),
                span: Span::default(),
            },
        },
    );
    let env = env_for(pipeline("P", vec![extractor], &[]));

    let err = assert_err!(run(&env).await);

    assert!(matches!(err, ExecutionError::MissingRuntimeParameter { .. }));

    // The error is attributed to the block that raised it
    let lines = env.logger.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].level, LogLevel::Error);
    assert_eq!(lines[0].location, "P > CarsExtractor");
    assert_eq!(lines[0].message, err.to_string());
    assert!(lines[0].message.contains("'filePath'"));
}

#[tokio::test]
async fn test_cycle_is_rejected_before_running() {
    let env = env_for(pipeline(
        "Loop",
        vec![csv_interpreter("A"), csv_interpreter("B")],
        &[("A", "B"), ("B", "A")],
    ));

    let err = assert_err!(run(&env).await);

    assert!(matches!(err, ExecutionError::Graph(_)));
    assert!(env.logger.lines().is_empty());
}
