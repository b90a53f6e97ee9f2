use serde::Serialize;

use crate::data::Dataset;
use crate::graph::Scene;

use super::organization_fill;

/// Serializable snapshot of a settled layout, for downstream tooling.
#[derive(Debug, Serialize)]
pub struct LayoutReport {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
}

#[derive(Debug, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub name: String,
    pub role: String,
    pub organization: String,
    pub imp_of_people: f32,
    pub imp_of_organization: f32,
    pub cluster_size: f32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub fill: String,
}

#[derive(Debug, Serialize)]
pub struct EdgeLayout {
    pub source: String,
    pub target: String,
    pub frequency: f32,
}

/// Scene nodes are index-aligned with `dataset.people`, so the report can
/// carry the full person record next to the simulated coordinates.
pub fn layout_report(scene: &Scene, dataset: &Dataset) -> LayoutReport {
    let nodes = scene
        .nodes
        .iter()
        .zip(dataset.people.iter())
        .enumerate()
        .map(|(index, (node, person))| {
            let position = scene.position(index);
            NodeLayout {
                id: node.id.clone(),
                name: node.name.clone(),
                role: node.role.clone(),
                organization: node.organization.clone(),
                imp_of_people: person.imp_of_people,
                imp_of_organization: person.imp_of_organization,
                cluster_size: person.cluster_size,
                x: position.x,
                y: position.y,
                radius: node.draw_radius,
                fill: organization_fill(node.org_index),
            }
        })
        .collect();

    let edges = scene
        .edges
        .iter()
        .map(|edge| EdgeLayout {
            source: scene.nodes[edge.source].id.clone(),
            target: scene.nodes[edge.target].id.clone(),
            frequency: edge.frequency,
        })
        .collect();

    LayoutReport { nodes, edges }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::data::{EdgeSet, build_dataset};
    use crate::graph::{AnchorLayout, FREQUENCY_THRESHOLD, Scene};

    use super::*;

    #[test]
    fn report_round_trips_through_json() {
        let people = "\
name,role,organization,impOfPeople,impOforganization,clusterSize
Jane Doe,Analyst,POK,5,2,4
Lin Tau,Clerk,GAS,4,1,4
";
        let links = "source,target,frequency\nJane Doe,Lin Tau,10\n";
        let dataset = build_dataset(people, links, None, None).unwrap();
        let anchors = AnchorLayout::new(&dataset.anchor_labels);
        let mut scene = Scene::build(
            &dataset,
            &anchors,
            dataset.edges(EdgeSet::Official),
            FREQUENCY_THRESHOLD,
        )
        .unwrap();
        scene.settle();

        let report = layout_report(&scene, &dataset);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(value["nodes"][0]["id"], "JaneDoe");
        assert_eq!(value["nodes"][0]["fill"], "#1f77b4");
        assert_eq!(value["nodes"][0]["imp_of_people"], 5.0);
        assert_eq!(value["edges"][0]["source"], "JaneDoe");
        assert_eq!(value["edges"][0]["target"], "LinTau");
        assert!(value["nodes"][0]["x"].as_f64().unwrap().is_finite());
    }
}
