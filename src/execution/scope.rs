//! RAII guard for the execution context's diagnostic stack

use std::ops::{Deref, DerefMut};

use super::ExecutionContext;

/// Pops the frame pushed by [`ExecutionContext::enter_node`] on drop.
///
/// Derefs to the context, so the guard is used in its place for the
/// duration of the frame.
pub struct ScopedContext<'guard, 'a> {
    context: &'guard mut ExecutionContext<'a>,
}

impl<'guard, 'a> ScopedContext<'guard, 'a> {
    pub(super) fn new(context: &'guard mut ExecutionContext<'a>) -> Self {
        Self { context }
    }
}

impl Drop for ScopedContext<'_, '_> {
    fn drop(&mut self) {
        self.context.exit_node();
    }
}

impl<'a> Deref for ScopedContext<'_, 'a> {
    type Target = ExecutionContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ScopedContext<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}
