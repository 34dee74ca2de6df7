//! Artifact Dependency Graph
//!
//! Artifacts live in an arena owned by [`CrossReferenceMap`] and are
//! addressed by [`ArtifactId`]. The map additionally records which artifacts
//! have been *seen* during the run (scanned, or referenced by something that
//! was scanned) in first-seen order; that ordered view is what gets sorted
//! and rendered.
//!
//! Pipeline:
//! - `loader`: discover artifacts per kind
//! - `body`: resolve the text to scan for each artifact
//! - `patterns`: detect references in that text
//! - `builder`: accumulate references into the map
//! - `classify`: sort, filter and bucket the map for rendering
//! - `analysis`: circular dependency groups

pub mod analysis;
pub mod body;
pub mod builder;
pub mod classify;
pub mod loader;
pub mod patterns;

pub use analysis::find_cycles;
pub use body::resolve_text;
pub use builder::GraphBuilder;
pub use classify::{Bucket, RenderEdge, RenderModel, RenderNode};
pub use loader::discover;
pub use patterns::{DetectionPolicy, ReferenceDetector, Rule};

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::registry::{ArtifactKind, ArtifactRegistry, WorkflowSection};

/// `<name>-<KIND>`, unique across the whole run
pub type UniqueKey = String;

/// Index into the [`CrossReferenceMap`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactId(pub usize);

/// One logical item found by discovery, before it enters the map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredArtifact {
    pub name: String,
    pub kind: ArtifactKind,
    /// Set for workflow entries only
    pub section: Option<WorkflowSection>,
    /// Primary source file
    pub file_path: PathBuf,
}

impl DiscoveredArtifact {
    pub fn new(name: impl Into<String>, kind: ArtifactKind, file_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            section: None,
            file_path: file_path.into(),
        }
    }

    pub fn unique_key(&self) -> UniqueKey {
        format!("{}-{}", self.name, self.kind.label())
    }
}

/// A tracked artifact and the references accumulated for it
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub name: String,
    pub kind: ArtifactKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<WorkflowSection>,
    pub unique_key: UniqueKey,
    /// `<name> <KIND>`
    pub display_label: String,
    /// What other artifacts' text must contain to reference this one
    pub match_expression: String,
    pub file_path: PathBuf,
    /// Append-only; one entry per referencing pair, duplicates allowed
    pub outgoing: Vec<ArtifactId>,
    /// Number of scanning artifacts that referenced this one
    pub incoming_count: usize,
    /// Deduplicated tokens (`instantiation`, member names, `controller`, ...)
    pub invoked_members: IndexSet<String>,
}

impl Artifact {
    fn from_discovered(discovered: &DiscoveredArtifact, registry: &ArtifactRegistry) -> Self {
        let spec = registry.get(discovered.kind);
        Self {
            name: discovered.name.clone(),
            kind: discovered.kind,
            section: discovered.section,
            unique_key: discovered.unique_key(),
            display_label: format!("{} {}", discovered.name, discovered.kind.label()),
            match_expression: spec.match_expression(&discovered.name, discovered.section),
            file_path: discovered.file_path.clone(),
            outgoing: Vec::new(),
            incoming_count: 0,
            invoked_members: IndexSet::new(),
        }
    }

    /// Sort weight: how connected this artifact is
    pub fn weight(&self) -> usize {
        self.incoming_count + self.outgoing.len()
    }
}

/// Which kinds a run visualizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    kinds: BTreeSet<ArtifactKind>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::classes()
    }
}

impl Scope {
    /// Class-level dependencies only
    pub fn classes() -> Self {
        Self::of([ArtifactKind::Class])
    }

    pub fn all() -> Self {
        Self::of(ArtifactKind::ALL)
    }

    /// An empty iterator falls back to [`Scope::classes`]
    pub fn of(kinds: impl IntoIterator<Item = ArtifactKind>) -> Self {
        let kinds: BTreeSet<ArtifactKind> = kinds.into_iter().collect();
        if kinds.is_empty() {
            return Self::classes();
        }
        Self { kinds }
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
        self.kinds.iter().copied()
    }

    /// "Triggers LWCs Dependency Graph" style heading
    pub fn heading(&self) -> String {
        self.kinds()
            .map(|k| k.heading())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Arena of artifacts plus the ordered set of artifacts seen during a run
#[derive(Debug, Default)]
pub struct CrossReferenceMap {
    artifacts: Vec<Artifact>,
    by_key: HashMap<UniqueKey, ArtifactId>,
    /// Artifacts present in the map, in first-insertion order
    seen: IndexMap<UniqueKey, ArtifactId>,
    hasher: Sha256,
}

impl CrossReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch-or-create the arena record for a discovered artifact
    ///
    /// Two discoveries with the same unique key share one record.
    pub fn register(
        &mut self,
        discovered: &DiscoveredArtifact,
        registry: &ArtifactRegistry,
    ) -> ArtifactId {
        let key = discovered.unique_key();
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = ArtifactId(self.artifacts.len());
        self.artifacts.push(Artifact::from_discovered(discovered, registry));
        self.by_key.insert(key, id);
        id
    }

    /// Insert into the seen set; a no-op if already present
    pub fn upsert(&mut self, id: ArtifactId) {
        let key = self.artifacts[id.0].unique_key.clone();
        self.seen.entry(key).or_insert(id);
    }

    /// Record that `scanner` references `target`
    ///
    /// Bumps the target's incoming count once, merges the tokens, appends one
    /// outgoing edge to the scanner, and upserts the target.
    pub fn record_reference(
        &mut self,
        scanner: ArtifactId,
        target: ArtifactId,
        tokens: Vec<String>,
    ) {
        if scanner == target {
            return;
        }
        {
            let target_artifact = &mut self.artifacts[target.0];
            target_artifact.incoming_count += 1;
            target_artifact.invoked_members.extend(tokens);
        }
        self.artifacts[scanner.0].outgoing.push(target);
        self.upsert(target);
    }

    /// Feed scanned text into the run fingerprint
    pub(crate) fn absorb_text(&mut self, text: &str) {
        self.hasher.update(text.as_bytes());
    }

    /// SHA-256 of every scanned text, in scan order
    pub fn fingerprint(&self) -> String {
        format!("{:x}", self.hasher.clone().finalize())
    }

    pub fn get(&self, id: ArtifactId) -> &Artifact {
        &self.artifacts[id.0]
    }

    pub fn get_by_key(&self, key: &str) -> Option<&Artifact> {
        self.by_key.get(key).map(|id| &self.artifacts[id.0])
    }

    /// Whether the artifact with `key` has been seen during the run
    pub fn contains_key(&self, key: &str) -> bool {
        self.seen.contains_key(key)
    }

    /// Seen artifacts, in first-insertion order
    pub fn values(&self) -> impl Iterator<Item = &Artifact> {
        self.seen.values().map(|id| &self.artifacts[id.0])
    }

    /// Number of seen artifacts
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Number of registered artifacts, seen or not
    pub fn registered_count(&self) -> usize {
        self.artifacts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.values().map(|a| a.outgoing.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> DiscoveredArtifact {
        DiscoveredArtifact::new(name, ArtifactKind::Class, format!("classes/{}.cls", name))
    }

    #[test]
    fn test_register_is_fetch_or_create() {
        let registry = ArtifactRegistry::standard();
        let mut map = CrossReferenceMap::new();

        let a = map.register(&class("Foo"), &registry);
        let b = map.register(&class("Foo"), &registry);
        let c = map.register(
            &DiscoveredArtifact::new("Foo", ArtifactKind::Trigger, "triggers/Foo.trigger"),
            &registry,
        );

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(map.registered_count(), 2);
        assert_eq!(map.get(a).unique_key, "Foo-CLASS");
        assert_eq!(map.get(a).display_label, "Foo CLASS");
        assert_eq!(map.get(c).unique_key, "Foo-TRIGGER");
        // nothing seen until upserted
        assert!(map.is_empty());
    }

    #[test]
    fn test_record_reference_merges_tokens() {
        let registry = ArtifactRegistry::standard();
        let mut map = CrossReferenceMap::new();
        let foo = map.register(&class("Foo"), &registry);
        let bar = map.register(&class("Bar"), &registry);
        let baz = map.register(&class("Baz"), &registry);

        map.record_reference(bar, foo, vec!["run".into(), "instantiation".into()]);
        map.record_reference(baz, foo, vec!["run".into()]);
        map.upsert(bar);
        map.upsert(baz);

        let target = map.get(foo);
        assert_eq!(target.incoming_count, 2);
        assert_eq!(
            target.invoked_members.iter().cloned().collect::<Vec<_>>(),
            vec!["run".to_string(), "instantiation".to_string()]
        );
        assert_eq!(map.get(bar).outgoing, vec![foo]);
        assert_eq!(map.get(baz).outgoing, vec![foo]);

        // target first: it was inserted when referenced
        let order: Vec<&str> = map.values().map(|a| a.name.as_str()).collect();
        assert_eq!(order, vec!["Foo", "Bar", "Baz"]);
        assert_eq!(map.edge_count(), 2);
    }

    #[test]
    fn test_self_reference_is_ignored() {
        let registry = ArtifactRegistry::standard();
        let mut map = CrossReferenceMap::new();
        let foo = map.register(&class("Foo"), &registry);

        map.record_reference(foo, foo, vec!["run".into()]);

        assert_eq!(map.get(foo).incoming_count, 0);
        assert!(map.get(foo).outgoing.is_empty());
    }

    #[test]
    fn test_scope() {
        assert!(Scope::default().contains(ArtifactKind::Class));
        assert!(!Scope::default().contains(ArtifactKind::Trigger));
        assert_eq!(Scope::of([]), Scope::classes());

        let scope = Scope::of([ArtifactKind::LightningComponent, ArtifactKind::Trigger]);
        assert_eq!(scope.heading(), "Triggers LWCs");
        assert!(Scope::all().contains(ArtifactKind::WorkflowEntry));
    }
}
