use eframe::egui::vec2;

use crate::data::{DataError, Dataset, EdgeRecord};
use crate::util::stable_pair;

use super::anchors::AnchorLayout;
use super::simulation::{Body, Simulation};
use super::{Scene, SceneEdge, SceneNode};

/// Spread of the deterministic initial jitter around each anchor.
const JITTER_RADIUS: f32 = 25.0;

impl Scene {
    /// Bind a validated dataset to render state. Every person becomes one
    /// node seeded near its organization's anchor; the given edge records
    /// are resolved and filtered. Fails (rather than inventing a coordinate)
    /// if a person's organization is somehow absent from the anchor table.
    pub fn build(
        dataset: &Dataset,
        anchors: &AnchorLayout,
        edges: &[EdgeRecord],
        frequency_threshold: f32,
    ) -> Result<Self, DataError> {
        let mut nodes = Vec::with_capacity(dataset.people.len());
        let mut bodies = Vec::with_capacity(dataset.people.len());

        for person in &dataset.people {
            let org_index = anchors.index(&person.organization).ok_or_else(|| {
                DataError::UnknownOrganization {
                    name: person.name.clone(),
                    organization: person.organization.clone(),
                }
            })?;
            let anchor = anchors
                .anchor(&person.organization)
                .expect("organization index resolved above");

            let draw_radius = (person.imp_of_people + 2.0) / 9.0 * 20.0;
            let (jx, jy) = stable_pair(&person.id);

            nodes.push(SceneNode {
                id: person.id.clone(),
                name: person.name.clone(),
                role: person.role.clone(),
                organization: person.organization.clone(),
                org_index,
                draw_radius: if draw_radius.is_finite() {
                    draw_radius
                } else {
                    0.0
                },
            });
            bodies.push(Body {
                pos: anchor + vec2(jx, jy) * JITTER_RADIUS,
                vel: vec2(0.0, 0.0),
                target: anchor,
                collide_radius: person.imp_of_people / 9.0 * 20.0 + 9.0,
            });
        }

        let mut scene = Self {
            nodes,
            bodies,
            edges: Vec::new(),
            index_by_id: dataset.index_by_id.clone(),
            simulation: Simulation::new(),
        };
        scene.set_edges(edges, frequency_threshold);
        Ok(scene)
    }

    /// Swap in another edge set (or threshold) without disturbing node
    /// positions. Endpoints were validated at load; a frequency that fails
    /// the strict threshold comparison (including NaN) is dropped.
    pub fn set_edges(&mut self, edges: &[EdgeRecord], frequency_threshold: f32) {
        self.edges = edges
            .iter()
            .filter(|edge| edge.frequency > frequency_threshold)
            .filter_map(|edge| {
                let source = *self.index_by_id.get(&edge.source)?;
                let target = *self.index_by_id.get(&edge.target)?;
                Some(SceneEdge {
                    source,
                    target,
                    frequency: edge.frequency,
                })
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::data::{EdgeSet, build_dataset};
    use crate::graph::{FADE_OPACITY, FREQUENCY_THRESHOLD, FULL_OPACITY, Hover};

    use super::*;

    const PEOPLE: &str = "\
name,role,organization,impOfPeople,impOforganization,clusterSize
Jane Doe,Analyst,POK,5,2,4
Bob Om,Driver,POK,3,1,4
Lin Tau,Clerk,GAS,4,1,4
Max Ray,Guard,GAS,2,1,4
Ada Vex,Chief,GAS,6,1,4
";

    const LINKS: &str = "\
source,target,frequency
Jane Doe,Lin Tau,10
";

    fn scene() -> Scene {
        let dataset = build_dataset(PEOPLE, LINKS, None, None).unwrap();
        let anchors = AnchorLayout::new(&dataset.anchor_labels);
        Scene::build(
            &dataset,
            &anchors,
            dataset.edges(EdgeSet::Official),
            FREQUENCY_THRESHOLD,
        )
        .unwrap()
    }

    #[test]
    fn five_people_one_edge_end_to_end() {
        let mut scene = scene();
        assert_eq!(scene.nodes.len(), 5);
        assert_eq!(scene.edges.len(), 1);
        scene.settle();
        assert!(scene.settled());

        // hovering the edge keeps both endpoints fully visible and fades
        // every other shape
        let hover = Hover::Edge(0);
        let edge = (scene.edges[0].source, scene.edges[0].target);
        for index in 0..scene.nodes.len() {
            let expected = if index == edge.0 || index == edge.1 {
                FULL_OPACITY
            } else {
                FADE_OPACITY
            };
            assert_eq!(scene.node_opacity(hover, index), expected);
        }
        assert_eq!(scene.edge_opacity(hover, 0), FULL_OPACITY);
    }

    #[test]
    fn node_hover_fades_untouched_shapes_and_restores() {
        let scene = scene();
        let edge = &scene.edges[0];
        let endpoint = edge.source;
        let bystander = (0..scene.nodes.len())
            .find(|index| !edge.touches(*index))
            .unwrap();

        let hover = Hover::Node(endpoint);
        assert_eq!(scene.node_opacity(hover, endpoint), FULL_OPACITY);
        assert_eq!(scene.node_opacity(hover, bystander), FADE_OPACITY);
        assert_eq!(scene.edge_opacity(hover, 0), FULL_OPACITY);

        let hover = Hover::Node(bystander);
        assert_eq!(scene.edge_opacity(hover, 0), FADE_OPACITY);

        // pointer leave restores everything
        for index in 0..scene.nodes.len() {
            assert_eq!(scene.node_opacity(Hover::None, index), FULL_OPACITY);
        }
        assert_eq!(scene.edge_opacity(Hover::None, 0), FULL_OPACITY);
    }

    #[test]
    fn edge_filter_is_strictly_greater_than_threshold() {
        let links = "\
source,target,frequency
Jane Doe,Bob Om,3
Jane Doe,Lin Tau,5
Bob Om,Lin Tau,5.1
Max Ray,Ada Vex,7
Ada Vex,Jane Doe,n/a
";
        let dataset = build_dataset(PEOPLE, links, None, None).unwrap();
        let anchors = AnchorLayout::new(&dataset.anchor_labels);
        let scene = Scene::build(
            &dataset,
            &anchors,
            dataset.edges(EdgeSet::Official),
            FREQUENCY_THRESHOLD,
        )
        .unwrap();

        let mut kept: Vec<f32> = scene.edges.iter().map(|edge| edge.frequency).collect();
        kept.sort_by(f32::total_cmp);
        assert_eq!(kept, [5.1, 7.0]);
    }

    #[test]
    fn nodes_seed_near_their_organization_anchor() {
        let scene = scene();
        let anchors = AnchorLayout::new(&["POK".to_owned(), "GAS".to_owned()]);
        for node in 0..scene.nodes.len() {
            let anchor = anchors.anchor(&scene.nodes[node].organization).unwrap();
            assert!((scene.position(node) - anchor).length() <= JITTER_RADIUS * 1.5);
            assert_eq!(scene.bodies[node].target, anchor);
        }
    }

    #[test]
    fn radius_formulas_follow_importance() {
        let scene = scene();
        // Jane Doe: impOfPeople = 5
        assert!((scene.nodes[0].draw_radius - (5.0 + 2.0) / 9.0 * 20.0).abs() < 1e-5);
        assert!((scene.bodies[0].collide_radius - (5.0 / 9.0 * 20.0 + 9.0)).abs() < 1e-5);
    }

    #[test]
    fn nan_importance_degrades_to_invisible_node() {
        let people = "\
name,role,organization,impOfPeople,impOforganization,clusterSize
Ghost,Unknown,POK,n/a,1,4
";
        let dataset = build_dataset(people, "source,target,frequency\n", None, None).unwrap();
        let anchors = AnchorLayout::new(&dataset.anchor_labels);
        let scene = Scene::build(&dataset, &anchors, &[], FREQUENCY_THRESHOLD).unwrap();
        assert_eq!(scene.nodes[0].draw_radius, 0.0);
        assert!(scene.bodies[0].collide_radius.is_nan());
    }

    #[test]
    fn settling_twice_is_deterministic() {
        let mut first = scene();
        let mut second = scene();
        first.settle();
        second.settle();
        for index in 0..first.nodes.len() {
            assert!((first.position(index) - second.position(index)).length() < 1e-6);
        }
    }

    #[test]
    fn switching_edge_sets_keeps_positions() {
        let extra = "source,target,frequency\nBob Om,Max Ray,9\n";
        let dataset = build_dataset(PEOPLE, LINKS, Some(extra), None).unwrap();
        let anchors = AnchorLayout::new(&dataset.anchor_labels);
        let mut scene = Scene::build(
            &dataset,
            &anchors,
            dataset.edges(EdgeSet::Official),
            FREQUENCY_THRESHOLD,
        )
        .unwrap();
        scene.settle();
        let before: Vec<_> = (0..scene.nodes.len()).map(|i| scene.position(i)).collect();

        scene.set_edges(dataset.edges(EdgeSet::Unofficial), FREQUENCY_THRESHOLD);
        assert_eq!(scene.edges.len(), 1);
        assert_eq!(scene.edges[0].frequency, 9.0);
        for (index, position) in before.iter().enumerate() {
            assert_eq!(scene.position(index), *position);
        }
    }
}
