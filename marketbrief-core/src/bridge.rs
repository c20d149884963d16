//! Bridge between dataset descriptors and the provider adapters.
//!
//! The bridge is the only path from a descriptor to a network request: it
//! asks the factory for the right adapter and invokes it, so the pipeline
//! never touches concrete provider types. Swapping the factory swaps every
//! provider at once, which is how the end-to-end tests run without a
//! network.

use crate::registry::DatasetDescriptor;
use crate::sources::{FetchError, FetchOutcome, SourceFactory};

pub struct Bridge<'a> {
    factory: &'a dyn SourceFactory,
}

impl<'a> Bridge<'a> {
    pub fn new(factory: &'a dyn SourceFactory) -> Self {
        Self { factory }
    }

    /// Build the adapter for this descriptor and fetch its rows.
    ///
    /// Construction failures (bad credential) and fetch failures both come
    /// back as `FetchError`; the caller records them per dataset.
    pub fn fetch(&self, descriptor: &DatasetDescriptor) -> Result<FetchOutcome, FetchError> {
        let source = self.factory.create(descriptor)?;
        source.fetch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::rows::RowBatch;
    use crate::sources::{FetchOutcome, Source};

    struct EmptySource;

    impl Source for EmptySource {
        fn name(&self) -> &str {
            "empty"
        }

        fn fetch(&self) -> Result<FetchOutcome, FetchError> {
            Ok(FetchOutcome::new(RowBatch::Prices(Vec::new()), Vec::new()))
        }
    }

    struct EmptyFactory;

    impl SourceFactory for EmptyFactory {
        fn create(&self, _: &DatasetDescriptor) -> Result<Box<dyn Source>, FetchError> {
            Ok(Box::new(EmptySource))
        }
    }

    struct RefusingFactory;

    impl SourceFactory for RefusingFactory {
        fn create(&self, _: &DatasetDescriptor) -> Result<Box<dyn Source>, FetchError> {
            Err(FetchError::MissingCredential {
                env_var: "FRED_API_KEY".into(),
            })
        }
    }

    #[test]
    fn bridge_routes_through_the_factory() {
        let registry = Registry::builtin();
        let bridge = Bridge::new(&EmptyFactory);
        let outcome = bridge.fetch(&registry.list()[0]).unwrap();
        assert_eq!(outcome.meta.row_count, 0);
    }

    #[test]
    fn construction_failure_surfaces_as_fetch_error() {
        let registry = Registry::builtin();
        let bridge = Bridge::new(&RefusingFactory);
        let err = bridge.fetch(&registry.list()[0]).unwrap_err();
        assert!(err.is_credential());
    }
}
