//! Loads a table into Postgres, replacing any existing table of that name

use async_trait::async_trait;

use super::{integer_property, text_property, unexpected_input};
use crate::blocks::{BlockExecutor, BlockExecutorClass, BlockOutcome};
use crate::data::{IoType, IoValue, Table};
use crate::db::{create_pool, PostgresTarget};
use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::sql::{sql_column_type, sql_value_representation};
use crate::valuetypes::{InternalValue, ValueType, ValueTypeError};

const INSERT_BATCH_SIZE: usize = 500;

pub struct PostgresLoader;

pub(super) fn class() -> BlockExecutorClass {
    BlockExecutorClass {
        block_type: "PostgresLoader",
        input_type: IoType::Table,
        output_type: IoType::None,
        property_specs: vec![
            PropertySpec::required("host", ValueType::Text, "Database host"),
            PropertySpec::with_default(
                "port",
                ValueType::Integer,
                InternalValue::Integer(5432),
                "Database port",
            ),
            PropertySpec::required("username", ValueType::Text, "Login role"),
            PropertySpec::required("password", ValueType::Text, "Password of the login role"),
            PropertySpec::required("database", ValueType::Text, "Database name"),
            PropertySpec::required("table", ValueType::Text, "Target table, dropped and recreated"),
        ],
        factory,
    }
}

fn factory() -> Box<dyn BlockExecutor> {
    Box::new(PostgresLoader)
}

#[async_trait]
impl BlockExecutor for PostgresLoader {
    async fn execute(
        &self,
        input: IoValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<BlockOutcome, ExecutionError> {
        let IoValue::Table(table) = input else {
            return Err(unexpected_input(ctx, IoType::Table, &input));
        };
        let port = integer_property(ctx, "port")?;
        let Ok(port) = u16::try_from(port) else {
            ctx.log_error(
                format!("Port {} is out of range", port),
                Some("Use a port number between 0 and 65535"),
            );
            return Ok(BlockOutcome::HandledFailure);
        };
        let target = PostgresTarget {
            host: text_property(ctx, "host")?,
            port,
            username: text_property(ctx, "username")?,
            password: text_property(ctx, "password")?,
            database: text_property(ctx, "database")?,
        };
        let table_name = text_property(ctx, "table")?;

        let mut statements = vec![
            drop_table_statement(&table_name),
            create_table_statement(&table_name, &table)?,
        ];
        statements.extend(insert_statements(&table_name, &table, INSERT_BATCH_SIZE)?);
        ctx.log_debug(format!("Prepared {} statement(s)", statements.len()));

        match run_statements(&target, &statements).await {
            Ok(()) => {
                ctx.log_info(format!(
                    "Loaded {} row(s) into table '{}'",
                    table.number_of_rows(),
                    table_name
                ));
                Ok(BlockOutcome::Produced(IoValue::None))
            }
            Err(e) => {
                ctx.log_error(
                    format!("Could not load table '{}': {}", table_name, e),
                    Some("Check the connection properties and that the database is reachable"),
                );
                Ok(BlockOutcome::HandledFailure)
            }
        }
    }
}

/// Every statement in one transaction
async fn run_statements(target: &PostgresTarget, statements: &[String]) -> Result<(), sqlx::Error> {
    let pool = create_pool(target).await?;
    let mut tx = pool.begin().await?;
    for statement in statements {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    pool.close().await;
    Ok(())
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn drop_table_statement(table_name: &str) -> String {
    format!("DROP TABLE IF EXISTS {};", quote_identifier(table_name))
}

pub fn create_table_statement(table_name: &str, table: &Table) -> Result<String, ValueTypeError> {
    let columns = table
        .columns()
        .iter()
        .map(|column| {
            sql_column_type(&column.value_type)
                .map(|sql_type| format!("{} {}", quote_identifier(&column.name), sql_type))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        quote_identifier(table_name),
        columns.join(", ")
    ))
}

/// `INSERT` statements of at most `batch_size` rows each
pub fn insert_statements(
    table_name: &str,
    table: &Table,
    batch_size: usize,
) -> Result<Vec<String>, ValueTypeError> {
    let column_list = table
        .columns()
        .iter()
        .map(|column| quote_identifier(&column.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut tuples = Vec::with_capacity(table.number_of_rows());
    for row in 0..table.number_of_rows() {
        let literals = table
            .columns()
            .iter()
            .map(|column| match column.values.get(row) {
                Some(value) => sql_value_representation(value, &column.value_type),
                None => Ok("NULL".to_string()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        tuples.push(format!("({})", literals.join(", ")));
    }

    Ok(tuples
        .chunks(batch_size.max(1))
        .map(|chunk| {
            format!(
                "INSERT INTO {} ({}) VALUES {};",
                quote_identifier(table_name),
                column_list,
                chunk.join(", ")
            )
        })
        .collect())
}
