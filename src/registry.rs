//! Per-type configuration records and the builtin type catalog.
//!
//! A [`TypeConfig`] declares, for one document type, which dotted field paths
//! feed the search index, which carry reference tokens, and optionally how to
//! assemble a human-readable display name. Declarations are static data: they
//! are registered once on an empty [`crate::DocBase`] before ingestion begins,
//! either from [`builtin_types`] or from a TOML declaration file.

use std::{fs::read_to_string, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::DocBaseError,
    extract::{extract, split_path},
};

/// Entry selector for [`NameRule`]: pick the first name object whose `key`
/// field equals `value` (e.g. `use == "official"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilter {
    pub key: String,
    pub value: String,
}

/// Declarative display-name assembly for types that support it.
///
/// `path` locates a list of name objects inside the payload. The selected
/// entry's `given` field (a list, space-joined) and `family` field are
/// combined as `"<given...> <family>"`. Types without a rule expose no
/// display name; callers check [`crate::DocBase::display_name`] for `Some`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRule {
    pub path: String,
    #[serde(default)]
    pub prefer: Option<EntryFilter>,
    pub given: String,
    pub family: String,
}

impl NameRule {
    /// The original catalog's name layout: a `name` list with `given` /
    /// `family` parts, optionally filtered on an entry field.
    fn standard(prefer: Option<(&str, &str)>) -> Self {
        NameRule {
            path: "name".to_string(),
            prefer: prefer.map(|(key, value)| EntryFilter {
                key: key.to_string(),
                value: value.to_string(),
            }),
            given: "given".to_string(),
            family: "family".to_string(),
        }
    }

    /// Assemble the display name from a payload, or `None` when the payload
    /// lacks the expected shape.
    pub fn apply(&self, payload: &Value) -> Option<String> {
        let entries = extract(payload, &split_path(&self.path))?.into_values();
        let entry = entries.into_iter().find(|entry| match &self.prefer {
            Some(filter) => {
                entry.get(&filter.key).and_then(Value::as_str) == Some(filter.value.as_str())
            }
            None => true,
        })?;
        let family = entry.get(&self.family).and_then(Value::as_str)?;
        let given = entry
            .get(&self.given)
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        if given.is_empty() {
            Some(family.to_string())
        } else {
            Some(format!("{given} {family}"))
        }
    }
}

/// Declarative per-type rules: which fields are indexed for search, which
/// fields carry reference tokens, and how to display the document.
///
/// Immutable once registered; see [`crate::DocBase::register`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeConfig {
    pub name: String,
    /// Dotted paths whose values feed the search index. Types with an empty
    /// list are not indexed (still retrievable by id).
    #[serde(default)]
    pub index: Vec<String>,
    /// Dotted paths whose values carry reference objects.
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub display_name: Option<NameRule>,
}

impl TypeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        TypeConfig {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_index<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.index = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_references<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.references = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_display_name(mut self, rule: NameRule) -> Self {
        self.display_name = Some(rule);
        self
    }
}

#[derive(Debug, Deserialize)]
struct TypeFile {
    #[serde(default)]
    types: Vec<TypeConfig>,
}

/// Parse type declarations from TOML content shaped as a list of
/// `[[types]]` tables.
pub fn types_from_toml(content: &str) -> Result<Vec<TypeConfig>, DocBaseError> {
    let file: TypeFile = toml::from_str(content)?;
    Ok(file.types)
}

/// Read type declarations from a TOML file.
pub fn types_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<TypeConfig>, DocBaseError> {
    tracing::debug!("Reading type declarations from {:?}", path.as_ref());
    types_from_toml(&read_to_string(path)?)
}

/// The builtin catalog of document types.
///
/// Mirrors the healthcare resource set this engine was built around: which
/// types are searchable by name and where each type keeps its references.
pub fn builtin_types() -> Vec<TypeConfig> {
    vec![
        TypeConfig::new("Patient")
            .with_index(["name.given", "name.family"])
            .with_display_name(NameRule::standard(Some(("use", "official")))),
        TypeConfig::new("Encounter").with_references([
            "subject",
            "participant.individual",
            "serviceProvider",
            "location.location",
        ]),
        TypeConfig::new("Organization"),
        TypeConfig::new("AllergyIntolerance").with_references(["patient"]),
        TypeConfig::new("CarePlan").with_references([
            "encounter",
            "subject",
            "careTeam",
            "addresses",
            "activity.detail.location",
        ]),
        TypeConfig::new("CareTeam").with_references([
            "encounter",
            "subject",
            "participant.role.member",
            "managingOrganization",
        ]),
        TypeConfig::new("Claim").with_references([
            "patient",
            "provider",
            "prescription",
            "item.encounter",
        ]),
        TypeConfig::new("Condition").with_references(["encounter", "subject"]),
        TypeConfig::new("Device").with_references(["patient"]),
        TypeConfig::new("DiagnosticReport").with_references(["encounter", "subject", "performer"]),
        TypeConfig::new("DocumentReference").with_references([
            "subject",
            "custodian",
            "author",
            "content.context",
        ]),
        TypeConfig::new("ExplanationOfBenefit").with_references([
            "patient",
            "provider",
            "facility",
            "careTeam.provider",
            "claim",
            "item.encounter",
            "contained.subject",
            "contained.requester",
            "contained.performer",
            "contained.beneficiary",
        ]),
        TypeConfig::new("ImagingStudy").with_references(["encounter", "subject", "location"]),
        TypeConfig::new("Immunization").with_references(["encounter", "patient", "location"]),
        TypeConfig::new("Location").with_references(["managingOrganization"]),
        TypeConfig::new("Medication"),
        TypeConfig::new("MedicationAdministration").with_references(["subject", "context"]),
        TypeConfig::new("MedicationRequest").with_references([
            "encounter",
            "subject",
            "requester",
            "reasonReference",
        ]),
        TypeConfig::new("Observation").with_references(["encounter", "subject"]),
        TypeConfig::new("Practitioner")
            .with_index(["name.given", "name.family"])
            .with_display_name(NameRule::standard(None)),
        TypeConfig::new("PractitionerRole").with_references([
            "organization",
            "practitioner",
            "location",
        ]),
        TypeConfig::new("Procedure").with_references(["encounter", "subject", "location"]),
        TypeConfig::new("Provenance").with_references(["target", "agent.who", "agent.onBehalfOf"]),
        TypeConfig::new("SupplyDelivery").with_references(["patient"]),
    ]
}
