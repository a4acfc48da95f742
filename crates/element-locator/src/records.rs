//! Fingerprint back-fill for review records

use dom_snapshot::Document;
use element_fingerprint::capture;
use pinmark_core_types::ReviewRecord;
use tracing::{debug, info};

use crate::source::find_by_source_location;

/// Store a fingerprint on every record that has a source location but
/// none yet. Records whose element is not on the page are left alone.
///
/// Returns how many records were updated.
pub fn attach_fingerprints(records: &mut [ReviewRecord], doc: &Document) -> usize {
    let mut updated = 0;
    for record in records.iter_mut() {
        if record.path.is_empty() || record.has_stable_id() {
            continue;
        }
        let Some(fingerprint) = find_by_source_location(doc, &record.path)
            .and_then(|node| capture(doc, node))
        else {
            debug!(record = %record.id, path = %record.path, "no element for record");
            continue;
        };
        record.stable_id = Some(fingerprint.to_json());
        updated += 1;
    }
    info!(updated, total = records.len(), "attached element fingerprints");
    updated
}
