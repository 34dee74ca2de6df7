//! Artifact Type Registry
//!
//! Declares every artifact kind the scanner knows about: where its files
//! live, how they are named, whether a body spans several files or one file
//! holds several logical entries, how it is colored, and which detection
//! policy applies when its text is scanned.
//!
//! ```text
//! force-app/main/default/
//! ├── classes/        Foo.cls
//! ├── triggers/       AccountTrigger.trigger
//! ├── aura/           myCmp/myCmp.cmp + myCmpController.js + myCmpHelper.js
//! ├── lwc/            myWidget/myWidget.html + myWidget.js
//! ├── pages/          Invoice.page
//! ├── components/     InvoiceLine.component
//! ├── flows/          Onboarding.flow-meta.xml
//! └── workflows/      Account.workflow-meta.xml  (5 sections)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::patterns::DetectionPolicy;

/// Closed set of artifact kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Apex class (`classes/*.cls`)
    Class,
    /// Apex trigger (`triggers/*.trigger`)
    Trigger,
    /// Aura component bundle (`aura/<name>/`)
    AuraComponent,
    /// Lightning web component bundle (`lwc/<name>/`)
    LightningComponent,
    /// Visualforce page or component
    VisualforcePage,
    /// Declarative flow
    Flow,
    /// One section of a workflow file
    WorkflowEntry,
}

impl ArtifactKind {
    /// Every kind, in scanning order
    pub const ALL: [ArtifactKind; 7] = [
        ArtifactKind::Class,
        ArtifactKind::Trigger,
        ArtifactKind::AuraComponent,
        ArtifactKind::LightningComponent,
        ArtifactKind::VisualforcePage,
        ArtifactKind::Flow,
        ArtifactKind::WorkflowEntry,
    ];

    /// Position in [`ArtifactKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Upper-case tag used in unique keys, display labels and style classes
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Class => "CLASS",
            ArtifactKind::Trigger => "TRIGGER",
            ArtifactKind::AuraComponent => "AURA",
            ArtifactKind::LightningComponent => "LWC",
            ArtifactKind::VisualforcePage => "VISUALFORCE",
            ArtifactKind::Flow => "FLOW",
            ArtifactKind::WorkflowEntry => "WORKFLOW",
        }
    }

    /// Plural heading used in rendered titles
    pub fn heading(&self) -> &'static str {
        match self {
            ArtifactKind::Class => "Apex Classes",
            ArtifactKind::Trigger => "Triggers",
            ArtifactKind::AuraComponent => "Aura Components",
            ArtifactKind::LightningComponent => "LWCs",
            ArtifactKind::VisualforcePage => "Visualforce Pages",
            ArtifactKind::Flow => "Flows",
            ArtifactKind::WorkflowEntry => "Workflows",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A section of a workflow file that becomes its own logical artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowSection {
    Alerts,
    OutboundMessages,
    Tasks,
    FieldUpdates,
    Rules,
}

/// Section tag and the `<type>` a rule uses when it triggers that action
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub section: WorkflowSection,
    pub tag: &'static str,
    pub action_type: Option<&'static str>,
}

/// One workflow file expands into exactly these entries
pub const WORKFLOW_SECTIONS: &[SectionSpec] = &[
    SectionSpec { section: WorkflowSection::Alerts, tag: "alerts", action_type: Some("Alert") },
    SectionSpec {
        section: WorkflowSection::OutboundMessages,
        tag: "outboundMessages",
        action_type: Some("OutboundMessage"),
    },
    SectionSpec { section: WorkflowSection::Tasks, tag: "tasks", action_type: Some("Task") },
    SectionSpec {
        section: WorkflowSection::FieldUpdates,
        tag: "fieldUpdates",
        action_type: Some("FieldUpdate"),
    },
    SectionSpec { section: WorkflowSection::Rules, tag: "rules", action_type: None },
];

impl WorkflowSection {
    pub fn spec(&self) -> &'static SectionSpec {
        WORKFLOW_SECTIONS
            .iter()
            .find(|s| s.section == *self)
            .unwrap_or(&WORKFLOW_SECTIONS[WORKFLOW_SECTIONS.len() - 1])
    }

    /// XML element name holding this section
    pub fn tag(&self) -> &'static str {
        self.spec().tag
    }

    /// `<type>` value rules use to trigger this action, `None` for rules
    pub fn action_type(&self) -> Option<&'static str> {
        self.spec().action_type
    }
}

/// Secondary script files concatenated to a bundle's primary markup
#[derive(Debug, Clone, Copy)]
pub struct CompanionScript {
    pub extension: &'static str,
    /// Suffixes inserted before the extension; `""` is the plain script
    pub variants: &'static [&'static str],
}

/// Extra folder whose files join the primary candidate set
#[derive(Debug, Clone, Copy)]
pub struct SecondaryFolder {
    pub folder: &'static str,
    pub extension: &'static str,
}

/// Static description of one artifact kind
#[derive(Debug, Clone)]
pub struct ArtifactTypeSpec {
    pub kind: ArtifactKind,
    /// Subdirectory of the source root
    pub folder: &'static str,
    /// Primary file suffix
    pub extension: &'static str,
    pub companion: Option<CompanionScript>,
    pub secondary: Option<SecondaryFolder>,
    /// Split each file into workflow sections
    pub multi_entry: bool,
    /// Drop candidates whose name contains "test"
    pub filters_tests: bool,
    /// Whether other artifacts can reference this kind at all
    pub referenceable: bool,
    /// References to this kind only count from the same physical file
    pub file_scoped: bool,
    pub color: &'static str,
    pub policy: DetectionPolicy,
}

impl ArtifactTypeSpec {
    pub fn has_companion_script(&self) -> bool {
        self.companion.is_some()
    }

    pub fn has_multiple_logical_entries(&self) -> bool {
        self.multi_entry
    }

    /// String other artifacts' text must contain to reference `name`
    pub fn match_expression(&self, name: &str, section: Option<WorkflowSection>) -> String {
        match self.kind {
            ArtifactKind::LightningComponent => format!("c-{}", to_kebab_case(name)),
            ArtifactKind::AuraComponent => format!("c:{} ", name),
            ArtifactKind::WorkflowEntry => match section.and_then(|s| s.action_type()) {
                Some(action_type) => format!("<type>{}</type>", action_type),
                None => name.to_string(),
            },
            _ => name.to_string(),
        }
    }
}

fn plain(
    kind: ArtifactKind,
    folder: &'static str,
    extension: &'static str,
    color: &'static str,
    policy: DetectionPolicy,
) -> ArtifactTypeSpec {
    ArtifactTypeSpec {
        kind,
        folder,
        extension,
        companion: None,
        secondary: None,
        multi_entry: false,
        filters_tests: true,
        referenceable: true,
        file_scoped: false,
        color,
        policy,
    }
}

const SCRIPT: CompanionScript = CompanionScript {
    extension: ".js",
    variants: &["", "Controller", "Helper"],
};

/// Registry of all artifact kinds, in scanning order
///
/// One entry per kind, stored at the kind's position in [`ArtifactKind::ALL`].
#[derive(Debug, Clone)]
pub struct ArtifactRegistry {
    specs: [ArtifactTypeSpec; ArtifactKind::ALL.len()],
}

impl Default for ArtifactRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ArtifactRegistry {
    /// The standard Salesforce DX source layout
    pub fn standard() -> Self {
        let specs = [
            plain(ArtifactKind::Class, "classes", ".cls", "lightblue", DetectionPolicy::Code),
            ArtifactTypeSpec {
                referenceable: false,
                ..plain(
                    ArtifactKind::Trigger,
                    "triggers",
                    ".trigger",
                    "cyan",
                    DetectionPolicy::Code,
                )
            },
            ArtifactTypeSpec {
                companion: Some(SCRIPT),
                filters_tests: false,
                ..plain(
                    ArtifactKind::AuraComponent,
                    "aura",
                    ".cmp",
                    "yellow",
                    DetectionPolicy::UiComponent,
                )
            },
            ArtifactTypeSpec {
                companion: Some(SCRIPT),
                filters_tests: false,
                ..plain(
                    ArtifactKind::LightningComponent,
                    "lwc",
                    ".html",
                    "lightgreen",
                    DetectionPolicy::UiComponent,
                )
            },
            ArtifactTypeSpec {
                secondary: Some(SecondaryFolder {
                    folder: "components",
                    extension: ".component",
                }),
                ..plain(
                    ArtifactKind::VisualforcePage,
                    "pages",
                    ".page",
                    "plum",
                    DetectionPolicy::Page,
                )
            },
            ArtifactTypeSpec {
                filters_tests: false,
                ..plain(
                    ArtifactKind::Flow,
                    "flows",
                    ".flow-meta.xml",
                    "pink",
                    DetectionPolicy::Flow,
                )
            },
            ArtifactTypeSpec {
                multi_entry: true,
                filters_tests: false,
                file_scoped: true,
                ..plain(
                    ArtifactKind::WorkflowEntry,
                    "workflows",
                    ".workflow-meta.xml",
                    "wheat",
                    DetectionPolicy::Workflow,
                )
            },
        ];

        Self { specs }
    }

    pub fn get(&self, kind: ArtifactKind) -> &ArtifactTypeSpec {
        &self.specs[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtifactTypeSpec> {
        self.specs.iter()
    }

    pub fn color(&self, kind: ArtifactKind) -> &'static str {
        self.get(kind).color
    }
}

/// `myWidget` / `MyWidget` -> `my-widget`
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
