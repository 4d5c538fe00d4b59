//! Error handling and pipeline statistics.
//!
//! This module provides:
//! - Typed errors for each pipeline operation
//! - [`FailureKind`] classification shared by all of them
//! - Pipeline statistics tracking (passes, resolutions, failures by kind)

mod stats;
mod types;

// Re-export public API
pub use stats::PipelineStats;
pub use types::{
    CollectionError, DatabaseError, FailureKind, GeolocationError, InitializationError,
    PayloadError, SessionSourceError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use strum::IntoEnumIterator;

    #[test]
    fn test_pipeline_stats_initialization() {
        let stats = PipelineStats::new();
        for kind in FailureKind::iter() {
            assert_eq!(stats.get_failure_count(kind), 0);
        }
        assert_eq!(stats.total_failures(), 0);
        assert_eq!(stats.collection_passes(), 0);
        assert_eq!(stats.last_collection_ms(), None);
    }

    #[test]
    fn test_pipeline_stats_increment() {
        let stats = PipelineStats::new();
        stats.increment_failure(FailureKind::Storage);
        stats.add_failures(FailureKind::DataShape, 3);
        stats.increment_failure(FailureKind::TransientDependency);

        assert_eq!(stats.get_failure_count(FailureKind::Storage), 1);
        assert_eq!(stats.get_failure_count(FailureKind::DataShape), 3);
        assert_eq!(stats.total_failures(), 5);
    }

    #[test]
    fn test_pipeline_stats_passes() {
        let stats = PipelineStats::new();
        stats.record_collection(1_704_067_200_000);
        stats.record_resolution_pass(2);
        stats.record_resolution_pass(0);

        assert_eq!(stats.collection_passes(), 1);
        assert_eq!(stats.last_collection_ms(), Some(1_704_067_200_000));
        assert_eq!(stats.resolution_passes(), 2);
        assert_eq!(stats.addresses_resolved(), 2);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            DatabaseError::UnknownAddress("10.0.0.1".into()).kind(),
            FailureKind::Storage
        );
        assert_eq!(
            SessionSourceError::Timeout(Duration::from_secs(1)).kind(),
            FailureKind::TransientDependency
        );
        assert_eq!(PayloadError::InvalidJson.kind(), FailureKind::DataShape);
        assert_eq!(
            GeolocationError::Status(503).kind(),
            FailureKind::TransientDependency
        );
        assert_eq!(
            GeolocationError::MissingLocation.kind(),
            FailureKind::TransientDependency
        );

        let collection: CollectionError =
            SessionSourceError::Timeout(Duration::from_secs(30)).into();
        assert_eq!(collection.kind(), FailureKind::TransientDependency);
        let collection: CollectionError = DatabaseError::FileCreationError("x".into()).into();
        assert_eq!(collection.kind(), FailureKind::Storage);
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::Storage.to_string(), "storage failure");
        assert_eq!(FailureKind::DataShape.to_string(), "data shape failure");
    }
}
