//! Reference Detection
//!
//! Lexical, not syntactic: a scanner references a target when its text
//! contains the target's match expression. Per-kind rules then pull
//! normalized tokens out of the same text to say *how* it is referenced
//! (`instantiation`, a member name, `controller`, `imported`, ...).
//!
//! Detection never fails. A rule whose pattern does not compile simply finds
//! nothing. Member detection is approximate: calls split across lines or
//! spelled with extra whitespace are missed.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::registry::ArtifactKind;

/// How an artifact kind's text is scanned for references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionPolicy {
    /// Apex classes and triggers
    Code,
    /// Aura and Lightning web components (markup + scripts)
    UiComponent,
    /// Visualforce pages and components
    Page,
    /// Flow metadata XML
    Flow,
    /// Workflow sections
    Workflow,
}

impl DetectionPolicy {
    /// Rules applied when text under this policy is checked against `target`
    pub fn rules_for(&self, target: ArtifactKind) -> &'static [Rule] {
        use ArtifactKind as K;
        use DetectionPolicy as P;

        match (self, target) {
            (P::Code, K::Class) => &[Rule::Instantiation, Rule::MemberInvocation],
            (P::Code, K::Flow) => &[Rule::FlowInterview],
            (P::UiComponent, K::Class) => &[
                Rule::Instantiation,
                Rule::MemberInvocation,
                Rule::ControllerBinding,
                Rule::ApexImport,
            ],
            (P::Page, K::Class) => &[
                Rule::Instantiation,
                Rule::MemberInvocation,
                Rule::ControllerBinding,
            ],
            (P::Flow, K::Class) => &[Rule::ApexAction],
            (P::Flow, K::Flow) => &[Rule::Subflow],
            (P::Workflow, K::WorkflowEntry) => &[Rule::WorkflowAction],
            _ => &[],
        }
    }
}

/// A single detection pattern and how its matches normalize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// `new Foo(`
    Instantiation,
    /// `Foo.bar(`
    MemberInvocation,
    /// `controller="Foo"`
    ControllerBinding,
    /// `import x from '@salesforce/apex/Foo.bar';`
    ApexImport,
    /// `Flow.Interview.MyFlow`
    FlowInterview,
    /// `<actionName>Foo</actionName>` in a flow
    ApexAction,
    /// `<flowName>MyFlow</flowName>` in a flow
    Subflow,
    /// `<actions><name>X</name><type>FieldUpdate</type></actions>` in a workflow rule
    WorkflowAction,
}

impl Rule {
    /// Regex source for this rule against `target` (the target's name, or
    /// its match expression for workflow entries)
    pub fn pattern(&self, target: &str) -> String {
        let t = regex::escape(target);
        match self {
            Rule::Instantiation => format!(r"new {}\(", t),
            Rule::MemberInvocation => format!(r"{}\.([^ <>\.]*?)\(", t),
            Rule::ControllerBinding => format!(r#"controller="{}""#, t),
            Rule::ApexImport => format!(r"import .*? from '@salesforce/apex/{}\.(.*?)';", t),
            Rule::FlowInterview => format!(r"Flow\.Interview\.{}\b", t),
            Rule::ApexAction => format!(r"<actionName>{}</actionName>", t),
            Rule::Subflow => format!(r"<flowName>{}</flowName>", t),
            Rule::WorkflowAction => format!(r"<actions>\s*<name>([^<]+)</name>\s*{}", t),
        }
    }

    /// Token recorded for one match; `None` drops the match
    fn normalize(&self, captures: &regex::Captures<'_>) -> Option<String> {
        let token = match self {
            Rule::Instantiation => "instantiation",
            Rule::MemberInvocation | Rule::WorkflowAction => {
                let member = captures.get(1)?.as_str().trim();
                return (!member.is_empty()).then(|| member.to_string());
            }
            Rule::ControllerBinding => "controller",
            Rule::ApexImport => "imported",
            Rule::FlowInterview => "flow",
            Rule::ApexAction => "action",
            Rule::Subflow => "subflow",
        };
        Some(token.to_string())
    }

    /// Rules that match against the match expression instead of the name
    fn uses_match_expression(&self) -> bool {
        matches!(self, Rule::WorkflowAction)
    }
}

/// The subset of a target artifact detection needs
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub name: &'a str,
    pub kind: ArtifactKind,
    pub match_expression: &'a str,
}

/// Applies detection rules, caching compiled patterns across calls
#[derive(Debug, Default)]
pub struct ReferenceDetector {
    compiled: HashMap<String, Option<Regex>>,
}

impl ReferenceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Does `text` reference `target` at all?
    pub fn references(text: &str, target: &Target<'_>) -> bool {
        !target.match_expression.is_empty() && text.contains(target.match_expression)
    }

    /// Tokens describing how `text` uses `target`, deduplicated, in match order
    ///
    /// Returns `None` when `text` does not reference `target`; `Some(vec![])`
    /// when it does but no rule recognized the shape of the reference.
    pub fn detect(
        &mut self,
        policy: DetectionPolicy,
        text: &str,
        target: &Target<'_>,
    ) -> Option<Vec<String>> {
        if !Self::references(text, target) {
            return None;
        }

        let mut tokens: Vec<String> = Vec::new();
        for rule in policy.rules_for(target.kind) {
            for token in self.find_references(*rule, text, target) {
                if !tokens.contains(&token) {
                    tokens.push(token);
                }
            }
        }
        Some(tokens)
    }

    /// Normalized tokens for every match of one rule
    pub fn find_references(&mut self, rule: Rule, text: &str, target: &Target<'_>) -> Vec<String> {
        let subject = if rule.uses_match_expression() {
            target.match_expression
        } else {
            target.name
        };
        let Some(re) = self.regex(&rule.pattern(subject)) else {
            return Vec::new();
        };

        re.captures_iter(text)
            .filter_map(|caps| rule.normalize(&caps))
            .collect()
    }

    /// Raw matched fragments of one rule, before normalization
    pub fn raw_matches(&mut self, rule: Rule, text: &str, target: &Target<'_>) -> Vec<String> {
        let subject = if rule.uses_match_expression() {
            target.match_expression
        } else {
            target.name
        };
        match self.regex(&rule.pattern(subject)) {
            Some(re) => re.find_iter(text).map(|m| m.as_str().to_string()).collect(),
            None => Vec::new(),
        }
    }

    fn regex(&mut self, pattern: &str) -> Option<&Regex> {
        self.compiled
            .entry(pattern.to_string())
            .or_insert_with(|| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    warn!("Skipping detection pattern {}: {}", pattern, err);
                    None
                }
            })
            .as_ref()
    }
}
