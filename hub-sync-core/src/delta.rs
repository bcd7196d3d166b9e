//! Delta calculation between the local catalog and the published baseline.

use std::collections::HashSet;

use crate::contract::{PackageRecord, PublishedIdentity};

/// Local records whose `name@version` is not among the published identities.
///
/// Stable: the output keeps the order of `local`. Records sharing an identity
/// key collapse into the first one.
pub fn missing<'a>(
    local: &'a [PackageRecord],
    remote: &[PublishedIdentity],
) -> Vec<&'a PackageRecord> {
    let published: HashSet<String> = remote.iter().map(PublishedIdentity::identity_key).collect();
    let mut seen = HashSet::new();

    local
        .iter()
        .filter(|record| {
            let key = record.identity_key();
            !published.contains(&key) && seen.insert(key)
        })
        .collect()
}
