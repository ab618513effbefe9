use std::path::PathBuf;

use async_trait::async_trait;

use super::text_property;
use crate::blocks::{BlockExecutor, BlockExecutorClass, BlockOutcome};
use crate::data::{BinaryFile, IoType, IoValue};
use crate::execution::{ExecutionContext, ExecutionError, PropertySpec};
use crate::valuetypes::ValueType;

/// Reads a file from the local file system
pub struct LocalFileExtractor;

pub(super) fn class() -> BlockExecutorClass {
    BlockExecutorClass {
        block_type: "LocalFileExtractor",
        input_type: IoType::None,
        output_type: IoType::File,
        property_specs: vec![PropertySpec::required(
            "filePath",
            ValueType::Text,
            "Path of the file to read, relative to the working directory",
        )],
        factory,
    }
}

fn factory() -> Box<dyn BlockExecutor> {
    Box::new(LocalFileExtractor)
}

#[async_trait]
impl BlockExecutor for LocalFileExtractor {
    async fn execute(
        &self,
        _input: IoValue,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<BlockOutcome, ExecutionError> {
        let path = PathBuf::from(text_property(ctx, "filePath")?);

        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) => {
                ctx.log_error(
                    format!("Could not read file '{}': {}", path.display(), e),
                    Some("Check that filePath points to an existing, readable file"),
                );
                return Ok(BlockOutcome::HandledFailure);
            }
        };

        ctx.log_debug(format!("Read {} bytes from '{}'", content.len(), path.display()));
        Ok(BlockOutcome::Produced(IoValue::File(BinaryFile::from_path(
            &path, content,
        ))))
    }
}
