use std::io::Write;

use maplit::btreemap;

use super::*;
use crate::blocks::{BlockExecutor, BlockOutcome};
use crate::data::{BinaryFile, Sheet, Table, TableColumn, TextFile};
use crate::execution::LogLevel;
use crate::model::{
    BinaryOperator, Expr, Model, Span, TransformDefinition, TransformPort, TypeRef,
};
use crate::test_helpers::{block, text_list, typed_constraint, valuetype, TestEnv};
use crate::valuetypes::{InternalValue, ValueType};

fn cell_ranges(selectors: &[&str]) -> Expr {
    Expr::collection(
        selectors
            .iter()
            .map(|s| Expr::CellRange {
                selector: s.to_string(),
                span: Span::default(),
            })
            .collect(),
    )
}

fn column(name: &str, valuetype: &str) -> Expr {
    Expr::ValuetypeAssignment {
        name: name.to_string(),
        valuetype: TypeRef::new(valuetype),
        span: Span::default(),
    }
}

fn sheet(rows: &[&[&str]]) -> Sheet {
    Sheet::new(
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    )
}

fn text_file(lines: &[&str]) -> IoValue {
    IoValue::TextFile(TextFile {
        name: "cars.csv".to_string(),
        extension: "csv".to_string(),
        mime_type: "text/csv".to_string(),
        lines: lines.iter().map(|l| l.to_string()).collect(),
    })
}

fn produced(outcome: BlockOutcome) -> IoValue {
    match outcome {
        BlockOutcome::Produced(value) => value,
        BlockOutcome::HandledFailure => panic!("block reported a handled failure"),
    }
}

/* ===================== LocalFileExtractor ===================== */

#[tokio::test]
async fn test_extractor_reads_file() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(b"name,hp\nmazda,110\n").unwrap();

    let env = TestEnv::empty();
    let extractor = block(
        "Extractor",
        "LocalFileExtractor",
        btreemap! { "filePath".to_string() => Expr::text(file.path().to_string_lossy()) },
    );
    let mut ctx = env.block_context(&extractor);

    let outcome = LocalFileExtractor.execute(IoValue::None, &mut ctx).await.unwrap();
    let IoValue::File(binary) = produced(outcome) else {
        panic!("expected a file");
    };
    assert_eq!(binary.extension, "csv");
    assert_eq!(binary.mime_type, "text/csv");
    assert_eq!(binary.content, b"name,hp\nmazda,110\n");
}

#[tokio::test]
async fn test_extractor_missing_file_is_handled() {
    let env = TestEnv::empty();
    let extractor = block(
        "Extractor",
        "LocalFileExtractor",
        btreemap! { "filePath".to_string() => Expr::text("/nonexistent/cars.csv") },
    );
    let mut ctx = env.block_context(&extractor);

    let outcome = LocalFileExtractor.execute(IoValue::None, &mut ctx).await.unwrap();
    assert_eq!(outcome, BlockOutcome::HandledFailure);

    let lines = env.logger.lines();
    assert_eq!(lines[0].level, LogLevel::Error);
    assert!(lines[0].render().starts_with("[TestPipeline > Extractor] Could not read file"));
    assert!(lines[0].hint.is_some());
}

/* ===================== TextFileInterpreter ===================== */

#[test]
fn test_decode() {
    assert_eq!(decode(b"\xEF\xBB\xBFabc", "UTF-8").as_deref(), Some("abc"));
    assert_eq!(decode(b"caf\xE9", "latin1").as_deref(), Some("café"));
    assert_eq!(decode(b"caf\xE9", "ascii").as_deref(), Some("caf\u{FFFD}"));
    assert_eq!(decode(b"abc", "shift-jis"), None);
}

#[tokio::test]
async fn test_text_file_interpreter_splits_lines() {
    let env = TestEnv::empty();
    let interpreter = block("Text", "TextFileInterpreter", btreemap! {});
    let mut ctx = env.block_context(&interpreter);
    let input = IoValue::File(BinaryFile::from_path(
        std::path::Path::new("cars.csv"),
        b"a,b\r\n1,2\n".to_vec(),
    ));

    let outcome = TextFileInterpreter.execute(input, &mut ctx).await.unwrap();
    let IoValue::TextFile(file) = produced(outcome) else {
        panic!("expected a text file");
    };
    assert_eq!(file.lines, vec!["a,b", "1,2"]);
    assert_eq!(file.name, "cars.csv");
}

#[tokio::test]
async fn test_text_file_interpreter_unknown_encoding() {
    let env = TestEnv::empty();
    let interpreter = block(
        "Text",
        "TextFileInterpreter",
        btreemap! { "encoding".to_string() => Expr::text("ebcdic") },
    );
    let mut ctx = env.block_context(&interpreter);
    let input = IoValue::File(BinaryFile::from_path(std::path::Path::new("x.txt"), vec![]));

    let outcome = TextFileInterpreter.execute(input, &mut ctx).await.unwrap();
    assert_eq!(outcome, BlockOutcome::HandledFailure);
    assert!(env.logger.contains("Unsupported encoding 'ebcdic'"));
}

/* ===================== CSVInterpreter ===================== */

#[test]
fn test_parse_csv_enclosed_fields() {
    let rows = parse_csv(
        "name,motto\n\"Doe, John\",\"say \"\"hi\"\"\"\n\n\"multi\nline\",x",
        CsvDialect::default(),
    )
    .unwrap();
    assert_eq!(
        rows,
        vec![
            vec!["name", "motto"],
            vec!["Doe, John", "say \"hi\""],
            vec!["multi\nline", "x"],
        ]
    );
}

#[test]
fn test_parse_csv_custom_dialect() {
    let dialect = CsvDialect::from_properties(";", "'", "\\").unwrap();
    let rows = parse_csv("a;'b;\\'c'\n;", dialect).unwrap();
    assert_eq!(rows, vec![vec!["a", "b;'c"], vec!["", ""]]);

    let no_enclosing = CsvDialect::from_properties("\t", "", "").unwrap();
    let rows = parse_csv("\"a\"\tb", no_enclosing).unwrap();
    assert_eq!(rows, vec![vec!["\"a\"", "b"]]);
}

#[test]
fn test_parse_csv_errors() {
    assert_eq!(
        CsvDialect::from_properties(";;", "\"", "\"").unwrap_err(),
        CsvError::InvalidDelimiter(";;".to_string())
    );
    assert!(CsvDialect::from_properties("", "\"", "\"").is_err());
    assert_eq!(
        CsvDialect::from_properties(",", "\"", "\\\\").unwrap_err(),
        CsvError::InvalidEscape("\\\\".to_string())
    );
    assert_eq!(
        parse_csv("a\n\"b,c", CsvDialect::default()).unwrap_err(),
        CsvError::UnterminatedField(2)
    );
}

#[tokio::test]
async fn test_csv_interpreter_produces_sheet() {
    let env = TestEnv::empty();
    let interpreter = block(
        "Csv",
        "CSVInterpreter",
        btreemap! { "delimiter".to_string() => Expr::text(";") },
    );
    let mut ctx = env.block_context(&interpreter);

    let outcome = CsvInterpreter
        .execute(text_file(&["name;hp", "mazda;110", "fiat"]), &mut ctx)
        .await
        .unwrap();
    let IoValue::Sheet(sheet) = produced(outcome) else {
        panic!("expected a sheet");
    };
    assert_eq!(sheet.height(), 3);
    assert_eq!(sheet.width(), 2);
    assert_eq!(sheet.cell(2, 1), None);
}

/* ===================== Deleters ===================== */

#[tokio::test]
async fn test_column_deleter() {
    let env = TestEnv::empty();
    let deleter = block(
        "Deleter",
        "ColumnDeleter",
        btreemap! { "delete".to_string() => cell_ranges(&["column A", "column C"]) },
    );
    let mut ctx = env.block_context(&deleter);
    let input = IoValue::Sheet(sheet(&[&["id", "name", "hp"], &["1", "mazda", "110"]]));

    let outcome = ColumnDeleter.execute(input, &mut ctx).await.unwrap();
    assert_eq!(
        produced(outcome),
        IoValue::Sheet(sheet(&[&["name"], &["mazda"]]))
    );
}

#[tokio::test]
async fn test_column_deleter_rejects_partial_ranges() {
    let env = TestEnv::empty();
    let deleter = block(
        "Deleter",
        "ColumnDeleter",
        btreemap! { "delete".to_string() => cell_ranges(&["A1:B2"]) },
    );
    let mut ctx = env.block_context(&deleter);
    let input = IoValue::Sheet(sheet(&[&["id", "name"]]));

    let outcome = ColumnDeleter.execute(input, &mut ctx).await.unwrap();
    assert_eq!(outcome, BlockOutcome::HandledFailure);
    assert!(env.logger.contains("Cell range 'A1:B2' is not a whole column"));
}

#[tokio::test]
async fn test_row_deleter() {
    let env = TestEnv::empty();
    let deleter = block(
        "Deleter",
        "RowDeleter",
        btreemap! { "delete".to_string() => cell_ranges(&["row 2"]) },
    );
    let mut ctx = env.block_context(&deleter);
    let input = IoValue::Sheet(sheet(&[&["id"], &["junk"], &["1"]]));

    let outcome = RowDeleter.execute(input, &mut ctx).await.unwrap();
    assert_eq!(produced(outcome), IoValue::Sheet(sheet(&[&["id"], &["1"]])));

    let mut ctx = env.block_context(&deleter);
    let outcome = RowDeleter
        .execute(IoValue::Sheet(sheet(&[&["id"]])), &mut ctx)
        .await
        .unwrap();
    assert_eq!(outcome, BlockOutcome::HandledFailure);
    assert!(env.logger.contains("Cannot delete row 2"));
}

/* ===================== TableInterpreter ===================== */

fn zip_model() -> Model {
    Model {
        constraints: vec![typed_constraint(
            "NotPlaceholder",
            "text",
            "Denylist",
            btreemap! { "denylist".to_string() => text_list(&["00000"]) },
        )],
        valuetypes: vec![valuetype("Zip", "text", &["NotPlaceholder"])],
        ..Model::default()
    }
}

#[tokio::test]
async fn test_table_interpreter_matches_header_and_drops_invalid_rows() {
    let env = TestEnv::new(zip_model());
    let interpreter = block(
        "Table",
        "TableInterpreter",
        btreemap! {
            "columns".to_string() => Expr::collection(vec![
                column("zip", "Zip"),
                column("population", "integer"),
            ]),
        },
    );
    let mut ctx = env.block_context(&interpreter);
    let input = IoValue::Sheet(sheet(&[
        &["population", "name", "zip"],
        &["3500000", "Berlin", "10115"],
        &["many", "Nowhere", "99999"],
        &["12", "Placeholder", "00000"],
        &["600000", "Dresden", "01067"],
    ]));

    let outcome = TableInterpreter.execute(input, &mut ctx).await.unwrap();
    let IoValue::Table(table) = produced(outcome) else {
        panic!("expected a table");
    };
    assert_eq!(table.number_of_rows(), 2);
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["zip", "population"]);
    assert_eq!(
        table.column("population").unwrap().values,
        vec![InternalValue::Integer(3_500_000), InternalValue::Integer(600_000)]
    );
    assert_eq!(table.column("zip").unwrap().value_type.to_string(), "Zip");
    assert!(env.logger.contains("Dropped 2 row(s) with invalid values"));
}

#[tokio::test]
async fn test_table_interpreter_without_header_uses_positions() {
    let env = TestEnv::empty();
    let interpreter = block(
        "Table",
        "TableInterpreter",
        btreemap! {
            "header".to_string() => Expr::boolean(false),
            "columns".to_string() => Expr::collection(vec![
                column("name", "text"),
                column("rating", "decimal"),
            ]),
        },
    );
    let mut ctx = env.block_context(&interpreter);
    let input = IoValue::Sheet(sheet(&[&["mazda", "4,5"], &["fiat", "3"]]));

    let outcome = TableInterpreter.execute(input, &mut ctx).await.unwrap();
    let IoValue::Table(table) = produced(outcome) else {
        panic!("expected a table");
    };
    assert_eq!(
        table.column("rating").unwrap().values,
        vec![InternalValue::Decimal(4.5), InternalValue::Decimal(3.0)]
    );
}

#[tokio::test]
async fn test_table_interpreter_unknown_header_is_handled() {
    let env = TestEnv::empty();
    let interpreter = block(
        "Table",
        "TableInterpreter",
        btreemap! { "columns".to_string() => Expr::collection(vec![column("hp", "integer")]) },
    );
    let mut ctx = env.block_context(&interpreter);
    let input = IoValue::Sheet(sheet(&[&["name"], &["mazda"]]));

    let outcome = TableInterpreter.execute(input, &mut ctx).await.unwrap();
    assert_eq!(outcome, BlockOutcome::HandledFailure);
    assert!(env.logger.contains("Column 'hp' not found in the header row"));
}

/* ===================== TableTransformer ===================== */

fn inverse_model() -> Model {
    Model {
        transforms: vec![TransformDefinition {
            name: "Inverse".to_string(),
            inputs: vec![TransformPort {
                name: "x".to_string(),
                valuetype: TypeRef::new("integer"),
            }],
            output: TypeRef::new("decimal"),
            body: Expr::binary(BinaryOperator::Div, Expr::integer(10), Expr::variable("x")),
            span: Span::default(),
        }],
        ..Model::default()
    }
}

fn divisor_table() -> Table {
    let mut table = Table::new(3);
    table
        .add_column(TableColumn::new(
            "divisor",
            ValueType::Integer,
            vec![
                InternalValue::Integer(2),
                InternalValue::Integer(0),
                InternalValue::Integer(5),
            ],
        ))
        .unwrap();
    table
        .add_column(TableColumn::new(
            "label",
            ValueType::Text,
            vec![
                InternalValue::text("a"),
                InternalValue::text("b"),
                InternalValue::text("c"),
            ],
        ))
        .unwrap();
    table
}

fn transformer(input_column: &str) -> crate::model::Block {
    block(
        "Transformer",
        "TableTransformer",
        btreemap! {
            "inputColumns".to_string() => text_list(&[input_column]),
            "outputColumn".to_string() => Expr::text("share"),
            "uses".to_string() => Expr::TransformRef {
                name: "Inverse".to_string(),
                span: Span::default(),
            },
        },
    )
}

#[tokio::test]
async fn test_table_transformer_drops_failed_rows() {
    let env = TestEnv::new(inverse_model());
    let transformer = transformer("divisor");
    let mut ctx = env.block_context(&transformer);

    let outcome = TableTransformer
        .execute(IoValue::Table(divisor_table()), &mut ctx)
        .await
        .unwrap();
    let IoValue::Table(table) = produced(outcome) else {
        panic!("expected a table");
    };
    assert_eq!(table.number_of_rows(), 2);
    assert_eq!(
        table.column("share").unwrap().values,
        vec![InternalValue::Decimal(5.0), InternalValue::Decimal(2.0)]
    );
    assert_eq!(
        table.column("label").unwrap().values,
        vec![InternalValue::text("a"), InternalValue::text("c")]
    );
    assert!(env.logger.contains("Dropped 1 row(s) where transform 'Inverse' failed"));
}

#[tokio::test]
async fn test_table_transformer_rejects_incompatible_column() {
    let env = TestEnv::new(inverse_model());
    let transformer = transformer("label");
    let mut ctx = env.block_context(&transformer);

    let outcome = TableTransformer
        .execute(IoValue::Table(divisor_table()), &mut ctx)
        .await
        .unwrap();
    assert_eq!(outcome, BlockOutcome::HandledFailure);
    assert!(env
        .logger
        .contains("Column 'label' of type 'text' cannot be used as input 'x' of type 'integer'"));
}

/* ===================== PostgresLoader ===================== */

#[test]
fn test_sql_statements() {
    let table = divisor_table();
    assert_eq!(
        create_table_statement("Cars", &table).unwrap(),
        "CREATE TABLE IF NOT EXISTS \"Cars\" (\"divisor\" integer, \"label\" text);"
    );

    let inserts = insert_statements("Cars", &table, 2).unwrap();
    assert_eq!(
        inserts,
        vec![
            "INSERT INTO \"Cars\" (\"divisor\", \"label\") VALUES (2, 'a'), (0, 'b');",
            "INSERT INTO \"Cars\" (\"divisor\", \"label\") VALUES (5, 'c');",
        ]
    );
    assert!(insert_statements("Cars", &Table::new(0), 10).unwrap().is_empty());
}

#[tokio::test]
async fn test_loader_out_of_range_port_is_handled() {
    let env = TestEnv::empty();
    let loader = block(
        "Loader",
        "PostgresLoader",
        btreemap! {
            "host".to_string() => Expr::text("localhost"),
            "port".to_string() => Expr::integer(70_000),
        },
    );
    let mut ctx = env.block_context(&loader);

    let outcome = PostgresLoader
        .execute(IoValue::Table(Table::new(0)), &mut ctx)
        .await
        .unwrap();
    assert_eq!(outcome, BlockOutcome::HandledFailure);

    let lines = env.logger.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].level, LogLevel::Error);
    assert_eq!(lines[0].render(), "[TestPipeline > Loader] Port 70000 is out of range");
}

#[tokio::test]
#[ignore] // Requires database to be running
async fn test_loader_writes_table() {
    let env_var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_string());
    let env = TestEnv::empty();
    let loader = block(
        "Loader",
        "PostgresLoader",
        btreemap! {
            "host".to_string() => Expr::text(env_var("CONDUIT_TEST_PG_HOST", "localhost")),
            "username".to_string() => Expr::text(env_var("CONDUIT_TEST_PG_USER", "postgres")),
            "password".to_string() => Expr::text(env_var("CONDUIT_TEST_PG_PASSWORD", "postgres")),
            "database".to_string() => Expr::text(env_var("CONDUIT_TEST_PG_DATABASE", "postgres")),
            "table".to_string() => Expr::text("conduit_loader_test"),
        },
    );
    let mut ctx = env.block_context(&loader);

    let outcome = PostgresLoader
        .execute(IoValue::Table(divisor_table()), &mut ctx)
        .await
        .unwrap();
    assert_eq!(outcome, BlockOutcome::Produced(IoValue::None));
    assert!(env.logger.contains("Loaded 3 row(s) into table 'conduit_loader_test'"));
}
