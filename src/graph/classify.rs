//! Graph Ordering & Partitioning
//!
//! Turns a [`CrossReferenceMap`] into the render-ready [`RenderModel`]:
//! nodes sorted hub-first, filtered to the requested scope, and assigned to
//! a color bucket; one labeled edge per outgoing reference.

use serde::{Deserialize, Serialize};

use super::analysis::find_cycles;
use super::{Artifact, CrossReferenceMap, Scope, UniqueKey};
use crate::registry::{ArtifactKind, ArtifactRegistry};

/// Artifacts with at least this many outgoing references stand out
pub const DEFAULT_HIGH_FAN_OUT_THRESHOLD: usize = 6;

/// Color of the high fan-out bucket
pub const HIGH_FAN_OUT_COLOR: &str = "orange";

/// Rendering group a node is colored by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "bucket", content = "kind")]
pub enum Bucket {
    /// References at least the fan-out threshold of other artifacts
    HighFanOut,
    /// Regular per-kind color group
    Kind(ArtifactKind),
}

/// A node of the render model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderNode {
    pub key: UniqueKey,
    pub label: String,
    pub kind: ArtifactKind,
    pub bucket: Bucket,
    pub color: String,
    /// No outgoing references
    pub independent: bool,
    /// Independent but referenced: drawn on its own so it is not lost
    pub standalone: bool,
    pub incoming: usize,
    pub outgoing: usize,
}

/// A directed edge `source --> target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderEdge {
    pub source: UniqueKey,
    /// Source display label with its own token lines
    pub source_label: String,
    pub target: UniqueKey,
    /// Target display label, then one line per invoked member token
    pub label: String,
}

impl RenderEdge {
    pub fn label_lines(&self) -> impl Iterator<Item = &str> {
        self.label.lines()
    }
}

/// Everything a renderer needs for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderModel {
    /// Headings of the kinds in scope, e.g. `Triggers LWCs`
    pub heading: String,
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    /// Kind label -> color, for each kind with at least one node in its bucket
    pub kind_colors: Vec<(ArtifactKind, String)>,
    /// Circular dependency groups among the emitted edges
    pub cycles: Vec<Vec<UniqueKey>>,
    /// Hash of all scanned text
    pub fingerprint: String,
}

impl RenderModel {
    /// Sort, filter and partition `map`
    ///
    /// Returns `None` when nothing of the requested scope is in the map.
    pub fn build(
        map: &CrossReferenceMap,
        registry: &ArtifactRegistry,
        scope: &Scope,
        high_fan_out_threshold: usize,
    ) -> Option<Self> {
        let mut sorted: Vec<&Artifact> = map.values().collect();
        // stable: equal weights keep first-seen order
        sorted.sort_by(|a, b| b.weight().cmp(&a.weight()));

        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        for artifact in sorted.into_iter().filter(|a| scope.contains(a.kind)) {
            let outgoing = artifact.outgoing.len();
            let independent = outgoing == 0;
            // independent nodes never join the high fan-out bucket
            let bucket = if !independent && outgoing >= high_fan_out_threshold {
                Bucket::HighFanOut
            } else {
                Bucket::Kind(artifact.kind)
            };
            let color = match bucket {
                Bucket::HighFanOut => HIGH_FAN_OUT_COLOR,
                Bucket::Kind(kind) => registry.color(kind),
            };

            for target_id in &artifact.outgoing {
                let target = map.get(*target_id);
                edges.push(RenderEdge {
                    source: artifact.unique_key.clone(),
                    source_label: edge_label(artifact),
                    target: target.unique_key.clone(),
                    label: edge_label(target),
                });
            }

            nodes.push(RenderNode {
                key: artifact.unique_key.clone(),
                label: artifact.display_label.clone(),
                kind: artifact.kind,
                bucket,
                color: color.to_string(),
                independent,
                standalone: independent && artifact.incoming_count > 0,
                incoming: artifact.incoming_count,
                outgoing,
            });
        }

        if nodes.is_empty() {
            return None;
        }

        let mut kind_colors: Vec<(ArtifactKind, String)> = Vec::new();
        for node in &nodes {
            if let Bucket::Kind(kind) = node.bucket {
                if !kind_colors.iter().any(|(k, _)| *k == kind) {
                    kind_colors.push((kind, registry.color(kind).to_string()));
                }
            }
        }

        let cycles = find_cycles(&edges);

        Some(Self {
            heading: scope.heading(),
            nodes,
            edges,
            kind_colors,
            cycles,
            fingerprint: map.fingerprint(),
        })
    }

    /// Keys of the high fan-out bucket, in node order
    pub fn high_fan_out_keys(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.bucket == Bucket::HighFanOut)
            .map(|n| n.key.as_str())
            .collect()
    }

    /// Per-kind buckets in order of first appearance
    pub fn kind_groups(&self) -> Vec<(ArtifactKind, Vec<&str>)> {
        let mut groups: Vec<(ArtifactKind, Vec<&str>)> = Vec::new();
        for node in &self.nodes {
            let Bucket::Kind(kind) = node.bucket else {
                continue;
            };
            match groups.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, keys)) => keys.push(node.key.as_str()),
                None => groups.push((kind, vec![node.key.as_str()])),
            }
        }
        groups
    }

    /// Display labels of nodes without outgoing references
    pub fn independent_labels(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.independent)
            .map(|n| n.label.as_str())
            .collect()
    }

    /// Referenced leaves drawn as their own node
    pub fn standalone_nodes(&self) -> impl Iterator<Item = &RenderNode> {
        self.nodes.iter().filter(|n| n.standalone)
    }

    pub fn node(&self, key: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.key == key)
    }
}

fn edge_label(target: &Artifact) -> String {
    let mut label = target.display_label.clone();
    for token in &target.invoked_members {
        label.push('\n');
        label.push_str(token);
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiscoveredArtifact;

    fn class(name: &str) -> DiscoveredArtifact {
        DiscoveredArtifact::new(name, ArtifactKind::Class, format!("classes/{}.cls", name))
    }

    /// `hub` references every leaf; each leaf is referenced once
    fn hub_map(leaves: usize) -> (CrossReferenceMap, ArtifactRegistry) {
        let registry = ArtifactRegistry::standard();
        let mut map = CrossReferenceMap::new();
        let hub = map.register(&class("Hub"), &registry);
        for i in 0..leaves {
            let leaf = map.register(&class(&format!("Leaf{}", i)), &registry);
            map.record_reference(hub, leaf, vec!["run".into()]);
        }
        map.upsert(hub);
        (map, registry)
    }

    #[test]
    fn test_high_fan_out_bucket() {
        let (map, registry) = hub_map(6);
        let model = RenderModel::build(&map, &registry, &Scope::classes(), 6).unwrap();

        let hub = model.node("Hub-CLASS").unwrap();
        assert_eq!(hub.bucket, Bucket::HighFanOut);
        assert_eq!(hub.color, "orange");
        assert_eq!(model.high_fan_out_keys(), vec!["Hub-CLASS"]);
        assert_eq!(model.edges.len(), 6);

        let (map, registry) = hub_map(5);
        let model = RenderModel::build(&map, &registry, &Scope::classes(), 6).unwrap();
        assert_eq!(model.node("Hub-CLASS").unwrap().bucket, Bucket::Kind(ArtifactKind::Class));
        assert!(model.high_fan_out_keys().is_empty());
    }

    #[test]
    fn test_sorted_by_weight_ties_keep_seen_order() {
        let (map, registry) = hub_map(3);
        let model = RenderModel::build(&map, &registry, &Scope::classes(), 6).unwrap();

        let keys: Vec<&str> = model.nodes.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["Hub-CLASS", "Leaf0-CLASS", "Leaf1-CLASS", "Leaf2-CLASS"]);
    }

    #[test]
    fn test_independent_and_standalone() {
        let registry = ArtifactRegistry::standard();
        let mut map = CrossReferenceMap::new();
        let lonely = map.register(&class("Lonely"), &registry);
        let caller = map.register(&class("Caller"), &registry);
        let callee = map.register(&class("Callee"), &registry);
        map.record_reference(caller, callee, vec![]);
        map.upsert(lonely);
        map.upsert(caller);

        let model = RenderModel::build(&map, &registry, &Scope::classes(), 6).unwrap();

        let lonely = model.node("Lonely-CLASS").unwrap();
        assert!(lonely.independent);
        assert!(!lonely.standalone);
        assert_eq!(lonely.bucket, Bucket::Kind(ArtifactKind::Class));

        let callee = model.node("Callee-CLASS").unwrap();
        assert!(callee.independent);
        assert!(callee.standalone);

        assert!(!model.node("Caller-CLASS").unwrap().independent);
        assert_eq!(model.independent_labels(), vec!["Callee CLASS", "Lonely CLASS"]);
        assert_eq!(model.standalone_nodes().count(), 1);
    }

    #[test]
    fn test_edge_labels_carry_tokens() {
        let registry = ArtifactRegistry::standard();
        let mut map = CrossReferenceMap::new();
        let foo = map.register(&class("Foo"), &registry);
        let bar = map.register(&class("Bar"), &registry);
        map.record_reference(bar, foo, vec!["instantiation".into(), "run".into()]);
        map.upsert(bar);

        let model = RenderModel::build(&map, &registry, &Scope::classes(), 6).unwrap();
        let edge = &model.edges[0];
        assert_eq!(edge.source, "Bar-CLASS");
        assert_eq!(edge.target, "Foo-CLASS");
        assert_eq!(
            edge.label_lines().collect::<Vec<_>>(),
            vec!["Foo CLASS", "instantiation", "run"]
        );
    }

    #[test]
    fn test_source_label_keeps_its_own_tokens() {
        let registry = ArtifactRegistry::standard();
        let mut map = CrossReferenceMap::new();
        let logger = map.register(&class("Logger"), &registry);
        let service = map.register(&class("Service"), &registry);
        let handler = map.register(&class("Handler"), &registry);
        map.record_reference(handler, service, vec!["rate".into()]);
        map.record_reference(service, logger, vec!["flush".into()]);
        map.upsert(handler);
        map.upsert(service);

        let model = RenderModel::build(&map, &registry, &Scope::classes(), 6).unwrap();
        let edge = model.edges.iter().find(|e| e.source == "Service-CLASS").unwrap();
        assert_eq!(edge.source_label, "Service CLASS\nrate");
        assert_eq!(edge.label, "Logger CLASS\nflush");
    }

    #[test]
    fn test_zero_threshold_leaves_independent_nodes_alone() {
        let (map, registry) = hub_map(1);
        let model = RenderModel::build(&map, &registry, &Scope::classes(), 0).unwrap();

        assert_eq!(model.node("Hub-CLASS").unwrap().bucket, Bucket::HighFanOut);
        let leaf = model.node("Leaf0-CLASS").unwrap();
        assert!(leaf.independent);
        assert_eq!(leaf.bucket, Bucket::Kind(ArtifactKind::Class));
        assert_eq!(model.high_fan_out_keys(), vec!["Hub-CLASS"]);
    }

    #[test]
    fn test_scope_filter_and_no_results() {
        let (map, registry) = hub_map(2);
        assert!(RenderModel::build(&map, &registry, &Scope::of([ArtifactKind::Flow]), 6).is_none());
        let empty = CrossReferenceMap::new();
        assert!(RenderModel::build(&empty, &registry, &Scope::all(), 6).is_none());

        let model = RenderModel::build(&map, &registry, &Scope::all(), 6).unwrap();
        assert_eq!(model.kind_groups().len(), 1);
        assert_eq!(model.kind_colors, vec![(ArtifactKind::Class, "lightblue".to_string())]);
    }

    #[test]
    fn test_kind_groups_follow_node_order() {
        let registry = ArtifactRegistry::standard();
        let mut map = CrossReferenceMap::new();
        let trigger = map.register(
            &DiscoveredArtifact::new(
                "OnAccount",
                ArtifactKind::Trigger,
                "triggers/OnAccount.trigger",
            ),
            &registry,
        );
        let handler = map.register(&class("Handler"), &registry);
        map.record_reference(trigger, handler, vec![]);
        map.upsert(trigger);

        let model = RenderModel::build(&map, &registry, &Scope::all(), 6).unwrap();
        let groups = model.kind_groups();
        assert_eq!(groups[0], (ArtifactKind::Class, vec!["Handler-CLASS"]));
        assert_eq!(groups[1], (ArtifactKind::Trigger, vec!["OnAccount-TRIGGER"]));
        assert_eq!(
            model.heading,
            "Apex Classes Triggers Aura Components LWCs Visualforce Pages Flows Workflows"
        );
    }
}
