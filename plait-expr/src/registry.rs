use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use hashbrown::HashMap;
use itertools::Itertools;
use plait_error::{PlaitResult, plait_err};

use crate::{Predicate, UnboundFilter};

pub type FilterRef = Arc<dyn UnboundFilter>;

/// Creates a fresh filter instance.
pub type FilterFactory = Arc<dyn Fn() -> FilterRef + Send + Sync>;

/// Maps filter identifiers, as they appear in job configuration, to filter factories.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<Arc<str>, FilterFactory>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `id`, replacing any previous registration.
    pub fn register<I, F>(&mut self, id: I, factory: F)
    where
        I: Into<Arc<str>>,
        F: Fn() -> FilterRef + Send + Sync + 'static,
    {
        self.filters.insert(id.into(), Arc::new(factory));
    }

    /// Builder-style [`FilterRegistry::register`].
    pub fn with<I, F>(mut self, id: I, factory: F) -> Self
    where
        I: Into<Arc<str>>,
        F: Fn() -> FilterRef + Send + Sync + 'static,
    {
        self.register(id, factory);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.filters.contains_key(id)
    }

    /// The registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&Arc<str>> {
        self.filters.keys().sorted().collect()
    }

    /// Instantiate the filter registered as `id`.
    pub fn create(&self, id: &str) -> PlaitResult<FilterRef> {
        let factory = self.filters.get(id).ok_or_else(|| {
            plait_err!(
                "unknown filter id: {id}, registered filters are [{}]",
                self.ids().iter().join(", ")
            )
        })?;
        Ok(factory())
    }

    /// Instantiate the filter registered as `id` and return its predicate.
    pub fn predicate(&self, id: &str) -> PlaitResult<Predicate> {
        Ok(self.create(id)?.predicate())
    }
}

impl Debug for FilterRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use plait_error::PlaitError;

    use super::*;
    use crate::{column, eq};

    #[derive(Debug)]
    struct ElectricCars;

    impl UnboundFilter for ElectricCars {
        fn predicate(&self) -> Predicate {
            column("engine.type", eq("ELECTRIC"))
        }
    }

    #[test]
    fn create_by_id() {
        let registry = FilterRegistry::new()
            .with("electric", || Arc::new(ElectricCars) as FilterRef)
            .with("tesla", || Arc::new(column("make", eq("Tesla"))) as FilterRef);
        assert!(registry.contains("electric"));
        assert_eq!(
            registry.predicate("electric").unwrap().to_string(),
            "engine.type = \"ELECTRIC\""
        );
        assert_eq!(
            registry.predicate("tesla").unwrap().to_string(),
            "make = \"Tesla\""
        );
    }

    #[test]
    fn unknown_id_is_invalid_argument() {
        let registry = FilterRegistry::new().with("electric", || Arc::new(ElectricCars) as FilterRef);
        let err = registry.create("petrol").unwrap_err();
        assert!(matches!(err, PlaitError::InvalidArgument(..)));
        assert!(err.to_string().contains("registered filters are [electric]"));
    }
}
