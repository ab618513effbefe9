//! Tests for model validation

use maplit::btreemap;

use super::*;
use crate::model::{
    BinaryOperator, Block, Expr, Pipeline, Span, TransformDefinition, TransformPort, TypeRef,
};
use crate::test_helpers::{block, expression_constraint, pipeline, text_list, typed_constraint, valuetype};

// ============================================================================
// Helper Functions
// ============================================================================

fn model_with(pipelines: Vec<Pipeline>) -> Model {
    Model {
        pipelines,
        ..Model::default()
    }
}

/// Validate with the standard extensions and the given `-e` assignments
fn validate_with(model: &Model, assignments: &[&str]) -> Vec<ValidationError> {
    let extensions = ExtensionRegistry::std().unwrap();
    let params = RuntimeParameterProvider::from_assignments(
        assignments.iter().map(|a| a.to_string()),
    )
    .unwrap();
    let (_, diagnostics) = check_model(model, &extensions, &params);
    diagnostics.into_vec()
}

fn validate(model: &Model) -> Vec<ValidationError> {
    validate_with(model, &[])
}

/// Check if errors contain a specific rule
fn has_rule(errors: &[ValidationError], rule_id: &str) -> bool {
    errors.iter().any(|e| e.rule_id == rule_id)
}

/// Get errors for a specific rule
fn for_rule<'a>(errors: &'a [ValidationError], rule_id: &str) -> Vec<&'a ValidationError> {
    errors.iter().filter(|e| e.rule_id == rule_id).collect()
}

fn extractor(name: &str) -> Block {
    block(
        name,
        "LocalFileExtractor",
        btreemap! { "filePath".to_string() => Expr::text("cars.csv") },
    )
}

fn interpreter(name: &str) -> Block {
    block(name, "TextFileInterpreter", btreemap! {})
}

fn row_deleter(name: &str) -> Block {
    block(
        name,
        "RowDeleter",
        btreemap! { "delete".to_string() => Expr::collection(vec![]) },
    )
}

fn transform_ref(name: &str) -> Expr {
    Expr::TransformRef {
        name: name.to_string(),
        span: Span::default(),
    }
}

fn requires(name: &str) -> Expr {
    Expr::RuntimeParameter {
        name: name.to_string(),
        span: Span::default(),
    }
}

fn transform(name: &str, inputs: &[(&str, &str)], output: &str, body: Expr) -> TransformDefinition {
    TransformDefinition {
        name: name.to_string(),
        inputs: inputs
            .iter()
            .map(|(port, valuetype)| TransformPort {
                name: port.to_string(),
                valuetype: TypeRef::new(*valuetype),
            })
            .collect(),
        output: TypeRef::new(output),
        body,
        span: Span::default(),
    }
}

fn file_pipeline() -> Pipeline {
    pipeline(
        "CarsPipeline",
        vec![extractor("CarsExtractor"), interpreter("CarsTextInterpreter")],
        &[("CarsExtractor", "CarsTextInterpreter")],
    )
}

// ============================================================================
// Validator
// ============================================================================

#[test]
fn test_validator_registers_every_rule() {
    let ids: Vec<&str> = Validator::new().rules().map(|(id, _)| id).collect();
    assert_eq!(
        ids,
        vec![
            "unknown-block-type",
            "block-properties",
            "runtime-parameters",
            "pipe-structure",
            "transform-types",
            "valuetype-definitions",
            "constraint-definitions",
        ]
    );
}

#[test]
fn test_valid_model_passes() {
    let errors = validate(&model_with(vec![file_pipeline()]));
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

// ============================================================================
// Unknown Block Type Tests
// ============================================================================

#[test]
fn test_unknown_block_type() {
    let model = model_with(vec![pipeline(
        "P",
        vec![block("Reader", "ExcelExtractor", btreemap! {})],
        &[],
    )]);

    let errors = validate(&model);
    let unknown = for_rule(&errors, "unknown-block-type");
    assert_eq!(unknown.len(), 1);
    assert!(unknown[0].message.contains("'ExcelExtractor'"));
    // Properties of a block nobody knows cannot be checked
    assert!(!has_rule(&errors, "block-properties"));
}

// ============================================================================
// Block Properties Tests
// ============================================================================

#[test]
fn test_missing_required_property() {
    let model = model_with(vec![pipeline(
        "P",
        vec![block("CarsExtractor", "LocalFileExtractor", btreemap! {})],
        &[],
    )]);

    let errors = validate(&model);
    let props = for_rule(&errors, "block-properties");
    assert_eq!(props.len(), 1);
    assert_eq!(
        props[0].message,
        "Missing required property 'filePath' on block 'CarsExtractor'"
    );
}

#[test]
fn test_unknown_property() {
    let mut extractor = extractor("CarsExtractor");
    extractor
        .properties
        .insert("url".to_string(), Expr::text("https://example.com"));
    let errors = validate(&model_with(vec![pipeline("P", vec![extractor], &[])]));

    let props = for_rule(&errors, "block-properties");
    assert_eq!(props.len(), 1);
    assert!(props[0].message.contains("Unknown property 'url'"));
}

#[test]
fn test_property_of_wrong_type() {
    let extractor = block(
        "CarsExtractor",
        "LocalFileExtractor",
        btreemap! { "filePath".to_string() => Expr::integer(3) },
    );
    let errors = validate(&model_with(vec![pipeline("P", vec![extractor], &[])]));

    let props = for_rule(&errors, "block-properties");
    assert_eq!(props.len(), 1);
    assert!(props[0].message.contains("must be a text"));
}

#[test]
fn test_dangling_transform_reference() {
    let transformer = block(
        "Convert",
        "TableTransformer",
        btreemap! {
            "inputColumns".to_string() => text_list(&["temperature"]),
            "outputColumn".to_string() => Expr::text("fahrenheit"),
            "uses".to_string() => transform_ref("CelsiusToFahrenheit"),
        },
    );
    let errors = validate(&model_with(vec![pipeline("P", vec![transformer], &[])]));

    let props = for_rule(&errors, "block-properties");
    assert_eq!(props.len(), 1);
    assert_eq!(props[0].message, "Unknown transform 'CelsiusToFahrenheit'");
}

// ============================================================================
// Runtime Parameter Tests
// ============================================================================

fn required_path_model() -> Model {
    let extractor = block(
        "CarsExtractor",
        "LocalFileExtractor",
        btreemap! { "filePath".to_string() => requires("CARS_FILE") },
    );
    model_with(vec![pipeline("P", vec![extractor], &[])])
}

#[test]
fn test_missing_runtime_parameter() {
    let errors = validate(&required_path_model());

    let params = for_rule(&errors, "runtime-parameters");
    assert_eq!(params.len(), 1);
    assert!(params[0].message.contains("-e CARS_FILE=<value>"));
    // A reference is not a literal of the wrong type
    assert!(!has_rule(&errors, "block-properties"));
}

#[test]
fn test_supplied_runtime_parameter() {
    let errors = validate_with(&required_path_model(), &["CARS_FILE=cars.csv"]);
    assert!(!has_rule(&errors, "runtime-parameters"));
}

#[test]
fn test_runtime_parameter_of_wrong_type() {
    let constraint = typed_constraint(
        "ShortText",
        "text",
        "Length",
        btreemap! { "maxLength".to_string() => requires("MAX_LEN") },
    );
    let model = Model {
        constraints: vec![constraint],
        ..Model::default()
    };

    let errors = validate_with(&model, &["MAX_LEN=ten"]);
    let params = for_rule(&errors, "runtime-parameters");
    assert_eq!(params.len(), 1);
    assert_eq!(
        params[0].message,
        "Runtime parameter 'MAX_LEN' has value 'ten', which is not a valid integer"
    );
}

// ============================================================================
// Pipe Structure Tests
// ============================================================================

#[test]
fn test_pipe_to_unknown_block() {
    let model = model_with(vec![pipeline(
        "P",
        vec![extractor("CarsExtractor")],
        &[("CarsExtractor", "Missing")],
    )]);

    let errors = validate(&model);
    let pipes = for_rule(&errors, "pipe-structure");
    assert_eq!(pipes.len(), 1);
    assert!(pipes[0].message.contains("unknown block 'Missing'"));
}

#[test]
fn test_duplicate_block_names() {
    let model = model_with(vec![pipeline(
        "P",
        vec![extractor("Extractor"), extractor("Extractor")],
        &[],
    )]);

    let errors = validate(&model);
    assert!(for_rule(&errors, "pipe-structure")
        .iter()
        .any(|e| e.message.contains("used more than once")));
}

#[test]
fn test_multiple_inputs() {
    let model = model_with(vec![pipeline(
        "P",
        vec![extractor("A"), extractor("B"), interpreter("Text")],
        &[("A", "Text"), ("B", "Text")],
    )]);

    let errors = validate(&model);
    let pipes = for_rule(&errors, "pipe-structure");
    assert_eq!(pipes.len(), 1);
    assert_eq!(pipes[0].message, "Block 'Text' has more than one incoming pipe");
}

#[test]
fn test_mismatched_io_types() {
    let sheet_deleter = row_deleter("Cleanup");
    let model = model_with(vec![pipeline(
        "P",
        vec![extractor("CarsExtractor"), sheet_deleter],
        &[("CarsExtractor", "Cleanup")],
    )]);

    let errors = validate(&model);
    let pipes = for_rule(&errors, "pipe-structure");
    assert_eq!(pipes.len(), 1);
    assert_eq!(
        pipes[0].message,
        "Block 'CarsExtractor' produces File but block 'Cleanup' expects Sheet"
    );
}

#[test]
fn test_block_without_required_input() {
    let model = model_with(vec![pipeline("P", vec![interpreter("Text")], &[])]);

    let errors = validate(&model);
    let pipes = for_rule(&errors, "pipe-structure");
    assert_eq!(pipes.len(), 1);
    assert!(pipes[0].message.contains("expects File input but has no incoming pipe"));
}

#[test]
fn test_cycle() {
    let model = model_with(vec![pipeline(
        "P",
        vec![row_deleter("A"), row_deleter("B")],
        &[("A", "B"), ("B", "A")],
    )]);

    let errors = validate(&model);
    let pipes = for_rule(&errors, "pipe-structure");
    assert_eq!(pipes.len(), 1);
    assert_eq!(pipes[0].message, "Pipeline contains a cycle through block 'A'");
}

#[test]
fn test_empty_pipeline_is_only_a_warning() {
    let errors = validate(&model_with(vec![pipeline("Empty", vec![], &[])]));
    let pipes = for_rule(&errors, "pipe-structure");
    assert_eq!(pipes.len(), 1);
    assert!(!pipes[0].is_error());
}

// ============================================================================
// Transform Type Tests
// ============================================================================

fn model_with_transform(transform: TransformDefinition) -> Model {
    Model {
        transforms: vec![transform],
        ..Model::default()
    }
}

#[test]
fn test_well_typed_transform() {
    let body = Expr::binary(
        BinaryOperator::Add,
        Expr::binary(
            BinaryOperator::Mul,
            Expr::variable("celsius"),
            Expr::decimal(1.8),
        ),
        Expr::integer(32),
    );
    let model = model_with_transform(transform(
        "CelsiusToFahrenheit",
        &[("celsius", "decimal")],
        "decimal",
        body,
    ));

    assert!(!has_rule(&validate(&model), "transform-types"));
}

#[test]
fn test_transform_output_mismatch() {
    let body = Expr::binary(
        BinaryOperator::Div,
        Expr::variable("count"),
        Expr::integer(2),
    );
    let model = model_with_transform(transform("Half", &[("count", "integer")], "integer", body));

    let errors = validate(&model);
    let types = for_rule(&errors, "transform-types");
    assert_eq!(types.len(), 1);
    assert_eq!(
        types[0].message,
        "Transform 'Half' produces 'decimal' but declares output type 'integer'"
    );
}

#[test]
fn test_transform_with_unknown_port_type() {
    let model = model_with_transform(transform(
        "Identity",
        &[("x", "Celsius")],
        "decimal",
        Expr::variable("x"),
    ));

    let errors = validate(&model);
    let types = for_rule(&errors, "transform-types");
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].message, "Unknown value type 'Celsius'");
}

#[test]
fn test_transform_with_duplicate_ports() {
    let body = Expr::binary(BinaryOperator::Add, Expr::variable("x"), Expr::integer(1));
    let model = model_with_transform(transform(
        "Inc",
        &[("x", "integer"), ("x", "integer")],
        "integer",
        body,
    ));

    let errors = validate(&model);
    assert!(for_rule(&errors, "transform-types")
        .iter()
        .any(|e| e.message.contains("declares input 'x' more than once")));
}

// ============================================================================
// Value Type and Constraint Definition Tests
// ============================================================================

#[test]
fn test_valuetype_with_unknown_constraint() {
    let model = Model {
        valuetypes: vec![valuetype("Zip", "text", &["ZipFormat"])],
        ..Model::default()
    };

    let errors = validate(&model);
    let defs = for_rule(&errors, "valuetype-definitions");
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].message, "Value type 'Zip' uses unknown constraint 'ZipFormat'");
}

#[test]
fn test_constraint_on_incompatible_valuetype() {
    let model = Model {
        valuetypes: vec![valuetype("Zip", "text", &["Positive"])],
        constraints: vec![expression_constraint(
            "Positive",
            "integer",
            Expr::binary(BinaryOperator::Gt, Expr::ValueKeyword { span: Span::default() }, Expr::integer(0)),
        )],
        ..Model::default()
    };

    let errors = validate(&model);
    let defs = for_rule(&errors, "valuetype-definitions");
    assert_eq!(defs.len(), 1);
    assert!(defs[0].message.contains("cannot be used on value type 'Zip'"));
    assert!(!has_rule(&errors, "constraint-definitions"));
}

#[test]
fn test_constraint_with_unknown_kind() {
    let model = Model {
        constraints: vec![typed_constraint("Odd", "integer", "Parity", btreemap! {})],
        ..Model::default()
    };

    let errors = validate(&model);
    let defs = for_rule(&errors, "constraint-definitions");
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].message, "Constraint 'Odd' has unknown kind 'Parity'");
}

#[test]
fn test_typed_constraint_properties_are_checked() {
    let model = Model {
        constraints: vec![typed_constraint("Colors", "text", "Allowlist", btreemap! {})],
        ..Model::default()
    };

    let errors = validate(&model);
    let defs = for_rule(&errors, "constraint-definitions");
    assert_eq!(defs.len(), 1);
    assert_eq!(
        defs[0].message,
        "Missing required property 'allowlist' on constraint 'Colors'"
    );
}

#[test]
fn test_expression_constraint_must_be_boolean() {
    let model = Model {
        constraints: vec![expression_constraint(
            "Doubled",
            "integer",
            Expr::binary(
                BinaryOperator::Mul,
                Expr::ValueKeyword { span: Span::default() },
                Expr::integer(2),
            ),
        )],
        ..Model::default()
    };

    let errors = validate(&model);
    let defs = for_rule(&errors, "constraint-definitions");
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].message, "Constraint 'Doubled' must evaluate to boolean, got 'integer'");
}
