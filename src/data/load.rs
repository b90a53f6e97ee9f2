use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::csv::CsvTable;
use super::records::{
    DataError, Dataset, EdgeRecord, OrganizationBuckets, PersonRecord, parse_numeric_field,
    sanitize_identifier,
};

#[derive(Clone, Debug)]
pub struct LoadOptions {
    pub people_path: PathBuf,
    pub links_path: PathBuf,
    pub extra_links_path: Option<PathBuf>,
    /// Fixed anchor-table organization list. When absent the table derives
    /// from the people table in first-seen order, so it can never miss.
    pub organizations: Option<Vec<String>>,
}

/// Read and validate every input before anything downstream runs. The layout
/// and renderer only ever see a dataset that passed validation, so an
/// unmapped organization or a dangling edge endpoint is a reported error
/// here, never a garbage coordinate later.
pub fn load_dataset(options: &LoadOptions) -> Result<Dataset> {
    let people_text = read_input(&options.people_path)?;
    let links_text = read_input(&options.links_path)?;
    let extra_links_text = options
        .extra_links_path
        .as_ref()
        .map(|path| read_input(path))
        .transpose()?;

    build_dataset(
        &people_text,
        &links_text,
        extra_links_text.as_deref(),
        options.organizations.as_deref(),
    )
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn build_dataset(
    people_text: &str,
    links_text: &str,
    extra_links_text: Option<&str>,
    organizations: Option<&[String]>,
) -> Result<Dataset> {
    let people = parse_people(people_text, "people")?;
    let official = parse_links(links_text, "links")?;
    let unofficial = match extra_links_text {
        Some(text) => parse_links(text, "extra-links")?,
        None => Vec::new(),
    };

    let buckets = OrganizationBuckets::group(&people);

    let anchor_labels = match organizations {
        Some(labels) => {
            let labels = labels.to_vec();
            for person in &people {
                if !labels.contains(&person.organization) {
                    return Err(DataError::UnknownOrganization {
                        name: person.name.clone(),
                        organization: person.organization.clone(),
                    }
                    .into());
                }
            }
            labels
        }
        None => buckets.labels().to_vec(),
    };

    let mut index_by_id: HashMap<String, usize> = HashMap::with_capacity(people.len());
    for (index, person) in people.iter().enumerate() {
        if let Some(&existing) = index_by_id.get(&person.id) {
            return Err(DataError::DuplicateIdentifier {
                id: person.id.clone(),
                first: people[existing].name.clone(),
                second: person.name.clone(),
            }
            .into());
        }
        index_by_id.insert(person.id.clone(), index);
    }

    for edge in official.iter().chain(unofficial.iter()) {
        for (side, id) in [("source", &edge.source), ("target", &edge.target)] {
            if !index_by_id.contains_key(id) {
                return Err(DataError::UnresolvedEndpoint {
                    side,
                    id: id.clone(),
                    edge_source: edge.source.clone(),
                    target: edge.target.clone(),
                }
                .into());
            }
        }
    }

    Ok(Dataset {
        people,
        buckets,
        official,
        unofficial,
        index_by_id,
        anchor_labels,
    })
}

fn parse_people(text: &str, label: &str) -> Result<Vec<PersonRecord>> {
    let table = CsvTable::parse(text, label)?;
    let name = required_column(&table, label, "name")?;
    let role = required_column(&table, label, "role")?;
    let organization = required_column(&table, label, "organization")?;
    let imp_of_people = required_column(&table, label, "impOfPeople")?;
    let imp_of_organization = required_column(&table, label, "impOforganization")?;
    let cluster_size = required_column(&table, label, "clusterSize")?;

    let mut people = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let raw_name = table.field(row, name).to_owned();
        people.push(PersonRecord {
            id: sanitize_identifier(&raw_name),
            name: raw_name,
            role: table.field(row, role).to_owned(),
            organization: table.field(row, organization).to_owned(),
            imp_of_people: parse_numeric_field(table.field(row, imp_of_people)),
            imp_of_organization: parse_numeric_field(table.field(row, imp_of_organization)),
            cluster_size: parse_numeric_field(table.field(row, cluster_size)),
        });
    }
    Ok(people)
}

fn parse_links(text: &str, label: &str) -> Result<Vec<EdgeRecord>> {
    let table = CsvTable::parse(text, label)?;
    let source = required_column(&table, label, "source")?;
    let target = required_column(&table, label, "target")?;
    let frequency = required_column(&table, label, "frequency")?;

    let mut edges = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        edges.push(EdgeRecord {
            source: sanitize_identifier(table.field(row, source)),
            target: sanitize_identifier(table.field(row, target)),
            frequency: parse_numeric_field(table.field(row, frequency)),
        });
    }
    Ok(edges)
}

fn required_column(table: &CsvTable, label: &str, column: &str) -> Result<usize> {
    table.column(column).ok_or_else(|| {
        DataError::MissingColumn {
            table: label.to_owned(),
            column: column.to_owned(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PEOPLE: &str = "\
name,role,organization,impOfPeople,impOforganization,clusterSize
Jane Doe,Analyst,POK,5,2,4
Bob Om,Driver,GAS,3,1,4
Lin Tau,Clerk,POK,n/a,1,4
";

    const LINKS: &str = "\
source,target,frequency
Jane Doe,Bob Om,10
Bob Om,Lin Tau,3
";

    #[test]
    fn builds_dataset_with_sanitized_endpoints() {
        let dataset = build_dataset(PEOPLE, LINKS, None, None).unwrap();
        assert_eq!(dataset.person_count(), 3);
        assert_eq!(dataset.organization_count(), 2);
        assert_eq!(dataset.people[0].id, "JaneDoe");
        assert_eq!(dataset.official[0].source, "JaneDoe");
        assert_eq!(dataset.official[0].target, "BobOm");
        assert_eq!(dataset.index_by_id["BobOm"], 1);
        assert_eq!(dataset.anchor_labels, ["POK".to_owned(), "GAS".to_owned()]);
        assert!(dataset.unofficial.is_empty());
    }

    #[test]
    fn malformed_numeric_fields_become_nan_not_errors() {
        let dataset = build_dataset(PEOPLE, LINKS, None, None).unwrap();
        assert!(dataset.people[2].imp_of_people.is_nan());
        assert_eq!(dataset.people[2].imp_of_organization, 1.0);
    }

    #[test]
    fn explicit_organization_list_overrides_anchor_labels() {
        let labels = vec!["GAS".to_owned(), "POK".to_owned(), "Board".to_owned()];
        let dataset = build_dataset(PEOPLE, LINKS, None, Some(&labels)).unwrap();
        assert_eq!(dataset.anchor_labels, labels);
    }

    #[test]
    fn unknown_organization_is_a_reported_error() {
        let labels = vec!["GAS".to_owned()];
        let error = build_dataset(PEOPLE, LINKS, None, Some(&labels)).unwrap_err();
        let data_error = error.downcast_ref::<DataError>().unwrap();
        assert!(matches!(
            data_error,
            DataError::UnknownOrganization { organization, .. } if organization == "POK"
        ));
    }

    #[test]
    fn unresolved_edge_endpoint_is_a_reported_error() {
        let links = "source,target,frequency\nJane Doe,Nobody Here,9\n";
        let error = build_dataset(PEOPLE, links, None, None).unwrap_err();
        let data_error = error.downcast_ref::<DataError>().unwrap();
        assert!(matches!(
            data_error,
            DataError::UnresolvedEndpoint { id, .. } if id == "NobodyHere"
        ));
    }

    #[test]
    fn colliding_sanitized_names_are_rejected() {
        let people = "\
name,role,organization,impOfPeople,impOforganization,clusterSize
Jane Doe,Analyst,POK,5,2,4
JaneDoe,Clerk,POK,1,2,4
";
        let error = build_dataset(people, "source,target,frequency\n", None, None).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DataError>().unwrap(),
            DataError::DuplicateIdentifier { .. }
        ));
    }

    #[test]
    fn missing_column_is_a_reported_error() {
        let error = build_dataset("name,role\nA,B\n", LINKS, None, None).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DataError>().unwrap(),
            DataError::MissingColumn { column, .. } if column == "organization"
        ));
    }

    #[test]
    fn second_edge_table_loads_as_unofficial() {
        let extra = "source,target,frequency\nLin Tau,Jane Doe,8\n";
        let dataset = build_dataset(PEOPLE, LINKS, Some(extra), None).unwrap();
        assert_eq!(dataset.unofficial.len(), 1);
        assert_eq!(dataset.unofficial[0].source, "LinTau");
    }
}
