//! Session Aggregator: turns raw sessions into shared-address records.
//!
//! A collection pass reads every session of the configured scope, groups the
//! extracted addresses, keeps those used by more than one distinct identity,
//! and upserts them into the Record Store.

use std::collections::{BTreeMap, HashSet};

use log::{debug, info};

use crate::error_handling::{CollectionError, PayloadError};
use crate::sessions::{extract_address, SessionRow, SessionSource};
use crate::storage::RecordStore;

/// Outcome of one collection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Session rows returned by the source
    pub rows_read: usize,
    /// Rows dropped because the identity or address could not be read
    pub rows_skipped: usize,
    /// Addresses upserted as shared
    pub shared_addresses: usize,
}

/// Addresses grouped to the identities seen on them, plus the skip count.
#[derive(Debug, Default)]
pub struct Grouping {
    pub groups: BTreeMap<String, Vec<String>>,
    pub skipped: usize,
}

/// Groups session rows by extracted address.
///
/// Identities keep their session order and repeats. Rows without an identity
/// or a usable address are counted in `skipped`.
pub fn group_sessions(rows: &[SessionRow]) -> Grouping {
    let mut grouping = Grouping::default();
    for row in rows {
        let result = row
            .identity
            .as_deref()
            .ok_or(PayloadError::MissingIdentity)
            .and_then(|identity| extract_address(&row.payload).map(|ip| (ip, identity)));

        match result {
            Ok((address, identity)) => grouping
                .groups
                .entry(address)
                .or_default()
                .push(identity.to_string()),
            Err(e) => {
                debug!("Skipping session row: {e}");
                grouping.skipped += 1;
            }
        }
    }
    grouping
}

/// True when an address counts as shared.
///
/// Requires more than one entry *and* more than one distinct identity, so a
/// single user with several sessions on one address is not reported.
pub fn is_shared(identities: &[String]) -> bool {
    if identities.len() < 2 {
        return false;
    }
    let distinct: HashSet<&str> = identities.iter().map(String::as_str).collect();
    distinct.len() > 1
}

/// Keeps only the shared groups.
pub fn filter_shared(groups: BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
    groups
        .into_iter()
        .filter(|(_, identities)| is_shared(identities))
        .collect()
}

/// Runs collection passes against one session source and one store.
pub struct Aggregator<S> {
    source: S,
    store: RecordStore,
}

impl<S: SessionSource> Aggregator<S> {
    pub fn new(source: S, store: RecordStore) -> Self {
        Aggregator { source, store }
    }

    /// Runs one collection pass.
    ///
    /// The stored `user_count` is the raw number of sessions on the address,
    /// repeats included; only the shared check uses distinct identities.
    ///
    /// # Errors
    ///
    /// A session source failure aborts the pass before anything is written.
    /// A storage failure aborts the pass at the failing upsert; earlier upserts
    /// remain (each is independently valid).
    pub async fn collect(&self) -> Result<CollectionReport, CollectionError> {
        info!("Starting IP data collection...");

        let rows = self.source.fetch_sessions().await?;
        let grouping = group_sessions(&rows);
        let shared = filter_shared(grouping.groups);

        for (address, identities) in &shared {
            self.store
                .upsert(address, identities.len(), identities)
                .await?;
        }

        let report = CollectionReport {
            rows_read: rows.len(),
            rows_skipped: grouping.skipped,
            shared_addresses: shared.len(),
        };
        info!(
            "Collection complete: {} shared IPs from {} sessions ({} skipped)",
            report.shared_addresses, report.rows_read, report.rows_skipped
        );
        Ok(report)
    }
}
