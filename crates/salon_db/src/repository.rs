//! Repository factory trait
//!
//! Stores are built from a configuration value (usually a [`crate::DbClient`])
//! through this trait, so callers do not depend on a store's constructor.

/// A factory for repository instances, generic over the repository type
/// and the configuration it is built from.
pub trait RepositoryFactory<R, C> {
    fn create_repository(&self, config: C) -> R;
}
