//! Snapshot loading and batch ingestion.
//!
//! A snapshot is a single JSON object mapping type names to lists of raw
//! documents, the cache format the original dataset ships in. The batch
//! driver feeds every raw document to [`DocBase::create`]; duplicates and
//! unregistered types are tolerated and counted, missing type tags or ids
//! abort the batch (the snapshot contract guarantees both fields).

use std::{collections::BTreeMap, fs::read_to_string, path::Path};

use serde_json::Value;

use crate::{base::DocBase, error::DocBaseError};

/// Outcome counts of a batch ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents created.
    pub created: usize,
    /// Documents skipped because their canonical id was already stored.
    pub duplicates: usize,
    /// Documents skipped because their type tag has no registered
    /// configuration.
    pub unknown_types: usize,
}

/// Read a snapshot file: one JSON object of `type name -> [raw documents]`.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Vec<Value>>, DocBaseError> {
    tracing::debug!("Reading document snapshot from {:?}", path.as_ref());
    Ok(serde_json::from_str(&read_to_string(path)?)?)
}

/// Ingest a full batch of raw documents into `base`.
///
/// Iterates type groups in name order and documents in listed order.
/// Creation order does not affect the final link graph; pending references
/// resolve whenever their target arrives.
pub fn ingest(
    base: &mut DocBase,
    batches: BTreeMap<String, Vec<Value>>,
) -> Result<IngestReport, DocBaseError> {
    let mut report = IngestReport::default();
    for (type_name, raws) in batches {
        for raw in raws {
            match base.create(raw) {
                Ok(_) => report.created += 1,
                Err(DocBaseError::Duplicate { id, .. }) => {
                    tracing::warn!("Skipping duplicate {type_name} document '{id}'");
                    report.duplicates += 1;
                }
                Err(DocBaseError::UnknownType(name)) => {
                    tracing::warn!("Skipping document of unregistered type '{name}'");
                    report.unknown_types += 1;
                }
                Err(other) => return Err(other),
            }
        }
    }
    tracing::debug!(
        "Ingested {} document(s), {} duplicate(s), {} of unknown type, {} unresolved target id(s)",
        report.created,
        report.duplicates,
        report.unknown_types,
        base.unresolved().count()
    );
    Ok(report)
}

/// Convenience: read a snapshot file and ingest it.
pub fn load_snapshot<P: AsRef<Path>>(
    base: &mut DocBase,
    path: P,
) -> Result<IngestReport, DocBaseError> {
    let batches = read_snapshot(path)?;
    ingest(base, batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeConfig;
    use serde_json::json;

    #[test]
    fn ingest_tolerates_duplicates_and_unknown_types() {
        let mut base = DocBase::with_types([
            TypeConfig::new("Patient"),
            TypeConfig::new("CareTeam").with_references(["subject"]),
        ]);
        let mut batches = BTreeMap::new();
        batches.insert(
            "Patient".to_string(),
            vec![
                json!({"resourceType": "Patient", "id": "p1"}),
                json!({"resourceType": "Patient", "id": "P1"}),
            ],
        );
        batches.insert(
            "CareTeam".to_string(),
            vec![json!({
                "resourceType": "CareTeam",
                "id": "t1",
                "subject": {"reference": "Patient/p1"},
            })],
        );
        batches.insert(
            "Ghost".to_string(),
            vec![json!({"resourceType": "Ghost", "id": "g1"})],
        );

        let report = ingest(&mut base, batches).unwrap();
        assert_eq!(
            report,
            IngestReport {
                created: 2,
                duplicates: 1,
                unknown_types: 1,
            }
        );
        let team = base.get("CareTeam", "t1").unwrap();
        assert_eq!(base.outgoing(team.key()).count(), 1);
    }

    #[test]
    fn missing_fields_abort_the_batch() {
        let mut base = DocBase::with_types([TypeConfig::new("Patient")]);
        let mut batches = BTreeMap::new();
        batches.insert(
            "Patient".to_string(),
            vec![json!({"resourceType": "Patient"})],
        );
        assert!(matches!(
            ingest(&mut base, batches),
            Err(DocBaseError::Validation(_))
        ));
    }
}
