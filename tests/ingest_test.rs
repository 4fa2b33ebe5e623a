//! End-to-end ingestion and connection-traversal scenarios.

mod common;

use docbase::{DocBase, Document, NameRule, TypeConfig};
use serde_json::{json, Value};

fn scenario_types() -> Vec<TypeConfig> {
    vec![
        TypeConfig::new("Parent").with_references(["subject", "team"]),
        TypeConfig::new("Patient")
            .with_index(["name.given", "name.family"])
            .with_references(["attachment"])
            .with_display_name(NameRule {
                path: "name".into(),
                prefer: Some(docbase::registry::EntryFilter {
                    key: "use".into(),
                    value: "official".into(),
                }),
                given: "given".into(),
                family: "family".into(),
            }),
        TypeConfig::new("CareTeam"),
        TypeConfig::new("Document"),
    ]
}

fn scenario_docs() -> Vec<Value> {
    vec![
        json!({
            "resourceType": "Parent",
            "id": 101,
            "subject": {"reference": "Patient/102"},
            "team": [
                {"reference": "CareTeam/103"},
                {"reference": "CareTeam/104"},
            ],
        }),
        json!({
            "resourceType": "Patient",
            "id": 102,
            "name": [{"use": "official", "given": ["Zoe"], "family": "Aberi"}],
            "attachment": {"reference": "Document/105"},
        }),
        json!({"resourceType": "CareTeam", "id": 103}),
        json!({"resourceType": "CareTeam", "id": 104}),
        json!({"resourceType": "Document", "id": 105}),
    ]
}

fn grouped_ids(base: &DocBase, key: docbase::DocKey) -> Vec<(String, Vec<String>)> {
    base.connections(key)
        .into_iter()
        .map(|(type_name, docs)| {
            (
                type_name,
                docs.iter().map(|doc| doc.id().to_string()).collect(),
            )
        })
        .collect()
}

#[test]
fn parent_connections_cover_the_whole_component() {
    common::init_logging();
    let mut base = DocBase::with_types(scenario_types());
    for raw in scenario_docs() {
        base.create(raw).unwrap();
    }
    assert_eq!(base.unresolved().count(), 0);

    let parent = base.get("Parent", "101").unwrap();
    assert_eq!(
        grouped_ids(&base, parent.key()),
        vec![
            ("CareTeam".to_string(), vec!["103".to_string(), "104".to_string()]),
            ("Document".to_string(), vec!["105".to_string()]),
            ("Patient".to_string(), vec!["102".to_string()]),
        ]
    );
}

#[test]
fn creation_order_does_not_change_the_graph() {
    common::init_logging();
    // Reverse order: every reference is a forward reference at creation time.
    let mut docs = scenario_docs();
    docs.reverse();

    let mut forward = DocBase::with_types(scenario_types());
    for raw in scenario_docs() {
        forward.create(raw).unwrap();
    }
    let mut reversed = DocBase::with_types(scenario_types());
    for raw in docs {
        reversed.create(raw).unwrap();
    }
    assert_eq!(reversed.unresolved().count(), 0);

    for base in [&forward, &reversed] {
        let parent = base.get("Parent", "101").unwrap();
        assert_eq!(
            grouped_ids(base, parent.key()),
            vec![
                ("CareTeam".to_string(), vec!["103".to_string(), "104".to_string()]),
                ("Document".to_string(), vec!["105".to_string()]),
                ("Patient".to_string(), vec!["102".to_string()]),
            ]
        );
        // Direct link sets converge too, not only the closure.
        let parent_children: Vec<_> = {
            let mut ids: Vec<_> = base
                .outgoing(parent.key())
                .map(|doc| doc.id().to_string())
                .collect();
            ids.sort();
            ids
        };
        assert_eq!(parent_children, vec!["102", "103", "104"]);
        let patient = base.get("Patient", "102").unwrap();
        let patient_parents: Vec<_> = base.incoming(patient.key()).map(Document::id).collect();
        assert_eq!(patient_parents, vec!["101"]);
    }
}

#[test]
fn every_document_is_retrievable_case_insensitively() {
    common::init_logging();
    let mut base = DocBase::with_types(scenario_types());
    for raw in scenario_docs() {
        base.create(raw).unwrap();
    }
    for (type_name, id) in [
        ("Parent", "101"),
        ("Patient", "102"),
        ("CareTeam", "103"),
        ("CareTeam", "104"),
        ("Document", "105"),
    ] {
        let doc = base.get(type_name, id).unwrap();
        assert_eq!(doc.type_name(), type_name);
        assert_eq!(doc.id(), id);
    }
}

#[test]
fn search_and_display_name_work_together() {
    common::init_logging();
    let mut base = DocBase::with_types(scenario_types());
    for raw in scenario_docs() {
        base.create(raw).unwrap();
    }
    let found: Vec<_> = base.find("Patient", "zoe aber").collect();
    assert_eq!(found.len(), 1);
    assert_eq!(base.display_name(found[0]).unwrap(), "Zoe Aberi");
    // Parent declares no display-name capability.
    let parent = base.get("Parent", "101").unwrap();
    assert_eq!(base.display_name(parent), None);
}
