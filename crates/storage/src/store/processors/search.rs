#![forbid(unsafe_code)]

use super::{ProcessorContext, TaskProcessor};
use crate::store::support::{IndexKey, delete_task_associations_tx, replace_grams_tx};
use crate::store::{StoreError, TaskChangeSet};
use tp_core::model::{ContentType, TaskField};

const INDEXED_TEXT: [(TaskField, ContentType); 2] = [
    (TaskField::Title, ContentType::Title),
    (TaskField::Description, ContentType::Description),
];

/// Keeps the n-gram associations of task titles and descriptions current.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchIndexer;

impl SearchIndexer {
    fn reindex(
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        only_touched: bool,
    ) -> Result<(), StoreError> {
        let Some(task_id) = task.id() else {
            return Ok(());
        };
        for (field, content_type) in INDEXED_TEXT {
            if only_touched && !task.is_touched(field) {
                continue;
            }
            replace_grams_tx(
                ctx.tx(),
                ctx.ngrams(),
                IndexKey::task_text(task_id, content_type),
                task.text(field)?,
            )?;
        }
        Ok(())
    }
}

impl TaskProcessor for SearchIndexer {
    fn name(&self) -> &'static str {
        "search"
    }

    fn after_insert(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        _trusted: bool,
    ) -> Result<(), StoreError> {
        Self::reindex(ctx, task, false)
    }

    fn after_update(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        _trusted: bool,
    ) -> Result<(), StoreError> {
        Self::reindex(ctx, task, true)
    }

    fn after_delete(
        &self,
        ctx: &ProcessorContext<'_>,
        task: &TaskChangeSet,
        trusted: bool,
    ) -> Result<(), StoreError> {
        if trusted && let Some(task_id) = task.id() {
            delete_task_associations_tx(ctx.tx(), task_id)?;
        }
        Ok(())
    }
}
