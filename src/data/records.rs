use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("{table}: required column {column:?} is missing")]
    MissingColumn { table: String, column: String },
    #[error("person {name:?} belongs to organization {organization:?}, which has no anchor")]
    UnknownOrganization { name: String, organization: String },
    #[error("{side} endpoint {id:?} of edge {edge_source:?} -> {target:?} matches no person")]
    UnresolvedEndpoint {
        side: &'static str,
        id: String,
        edge_source: String,
        target: String,
    },
    #[error("people {first:?} and {second:?} collapse to the same identifier {id:?}")]
    DuplicateIdentifier {
        id: String,
        first: String,
        second: String,
    },
}

#[derive(Clone, Debug)]
pub struct PersonRecord {
    pub name: String,
    /// `sanitize_identifier(name)`; the key edge endpoints are matched against.
    pub id: String,
    pub role: String,
    pub organization: String,
    pub imp_of_people: f32,
    pub imp_of_organization: f32,
    pub cluster_size: f32,
}

#[derive(Clone, Debug)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub frequency: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeSet {
    Official,
    Unofficial,
}

impl EdgeSet {
    pub fn label(self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::Unofficial => "unofficial",
        }
    }
}

/// Strip every character outside the word class (letters, digits, underscore)
/// so names and edge endpoints compare exactly: "Jane Doe" -> "JaneDoe".
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// String -> f32 with a NaN sentinel: malformed or empty numeric fields are
/// not an error, they become NaN and fall out of threshold comparisons.
pub fn parse_numeric_field(raw: &str) -> f32 {
    raw.trim().parse().unwrap_or(f32::NAN)
}

/// Organization label -> ordered member indices, preserving first-seen bucket
/// order and insertion order within each bucket.
#[derive(Clone, Debug, Default)]
pub struct OrganizationBuckets {
    order: Vec<String>,
    members: HashMap<String, Vec<usize>>,
}

impl OrganizationBuckets {
    pub fn group(people: &[PersonRecord]) -> Self {
        let mut buckets = Self::default();
        for (index, person) in people.iter().enumerate() {
            if !buckets.members.contains_key(&person.organization) {
                buckets.order.push(person.organization.clone());
            }
            buckets
                .members
                .entry(person.organization.clone())
                .or_default()
                .push(index);
        }
        buckets
    }

    pub fn labels(&self) -> &[String] {
        &self.order
    }

    pub fn members(&self, label: &str) -> &[usize] {
        self.members.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Dataset {
    pub people: Vec<PersonRecord>,
    pub buckets: OrganizationBuckets,
    pub official: Vec<EdgeRecord>,
    pub unofficial: Vec<EdgeRecord>,
    /// Sanitized identifier -> index into `people`. Built once so edge
    /// endpoints resolve in O(1) instead of rescanning the person list.
    pub index_by_id: HashMap<String, usize>,
    /// Labels the anchor table is built from: the explicit configuration
    /// list when one was supplied, first-seen order from the data otherwise.
    pub anchor_labels: Vec<String>,
}

impl Dataset {
    pub fn edges(&self, set: EdgeSet) -> &[EdgeRecord] {
        match set {
            EdgeSet::Official => &self.official,
            EdgeSet::Unofficial => &self.unofficial,
        }
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    pub fn organization_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn person(name: &str, organization: &str) -> PersonRecord {
        PersonRecord {
            name: name.to_owned(),
            id: sanitize_identifier(name),
            role: "analyst".to_owned(),
            organization: organization.to_owned(),
            imp_of_people: 3.0,
            imp_of_organization: 1.0,
            cluster_size: 4.0,
        }
    }

    #[test]
    fn sanitize_strips_non_word_characters() {
        assert_eq!(sanitize_identifier("Jane Doe"), "JaneDoe");
        assert_eq!(sanitize_identifier("Orhan Strum-Çelik"), "OrhanStrumelik");
        assert_eq!(sanitize_identifier("under_score9"), "under_score9");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for raw in ["Jane Doe", "a.b-c", "", "x y z!", "plain"] {
            let once = sanitize_identifier(raw);
            assert_eq!(sanitize_identifier(&once), once);
        }
    }

    #[test]
    fn numeric_fields_coerce_or_become_nan() {
        assert_eq!(parse_numeric_field("5.1"), 5.1);
        assert_eq!(parse_numeric_field(" 7 "), 7.0);
        assert_eq!(parse_numeric_field("-2.5"), -2.5);
        assert!(parse_numeric_field("n/a").is_nan());
        assert!(parse_numeric_field("").is_nan());
    }

    #[test]
    fn grouping_preserves_first_seen_and_insertion_order() {
        let people = vec![
            person("A", "POK"),
            person("B", "GAS"),
            person("C", "POK"),
            person("D", "GAS"),
            person("E", "POK"),
        ];
        let buckets = OrganizationBuckets::group(&people);
        assert_eq!(buckets.labels(), vec!["POK".to_owned(), "GAS".to_owned()]);
        assert_eq!(buckets.members("POK"), vec![0, 2, 4]);
        assert_eq!(buckets.members("GAS"), vec![1, 3]);
        assert_eq!(buckets.members("unknown"), &[] as &[usize]);
        assert_eq!(buckets.len(), 2);
    }
}
