use std::fmt::Debug;

use crate::Predicate;

/// Something that can produce the predicate a read should apply.
///
/// Filters are constructed by name through a [`crate::FilterRegistry`] and asked for their
/// predicate once per read task.
pub trait UnboundFilter: Debug + Send + Sync {
    fn predicate(&self) -> Predicate;
}

impl UnboundFilter for Predicate {
    fn predicate(&self) -> Predicate {
        self.clone()
    }
}
