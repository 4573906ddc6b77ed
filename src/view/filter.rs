//! Filtering and grouping for tabbed entity lists
//!
//! Each tab holds its full unfiltered list, fetched once on activation and
//! replaced wholesale on reload. Filtering is a conjunction of independent
//! predicates; grouping partitions the filtered list without losing or
//! duplicating entries.

use std::collections::HashMap;

use crate::api::{ApiResult, ArchlensApi};
use crate::entity::{CodeElement, Dependency, SecurityEntity, Service, Severity, Vulnerability};
use crate::view::context::Tab;

/// Ungrouped result sets beyond this size require an explicit expansion
pub const DISPLAY_THRESHOLD: usize = 50;

/// Field accessors the engine needs from a tab's records
pub trait TabRecord {
    fn record_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn file_path(&self) -> &str;
    /// The declared type field (element type, service type, entity type...)
    fn type_field(&self) -> &str;
    /// The second categorical field: language for code, provider for
    /// services and security entities, package manager for dependencies
    fn category(&self) -> &str;
    fn arn(&self) -> Option<&str> {
        None
    }
}

impl TabRecord for Dependency {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn display_name(&self) -> &str {
        &self.name
    }
    fn file_path(&self) -> &str {
        &self.file_path
    }
    fn type_field(&self) -> &str {
        if self.is_dev {
            "dev"
        } else {
            "runtime"
        }
    }
    fn category(&self) -> &str {
        &self.package_manager
    }
}

impl TabRecord for Service {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn display_name(&self) -> &str {
        &self.name
    }
    fn file_path(&self) -> &str {
        &self.file_path
    }
    fn type_field(&self) -> &str {
        &self.service_type
    }
    fn category(&self) -> &str {
        &self.provider
    }
}

impl TabRecord for CodeElement {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn display_name(&self) -> &str {
        &self.name
    }
    fn file_path(&self) -> &str {
        &self.file_path
    }
    fn type_field(&self) -> &str {
        &self.element_type
    }
    fn category(&self) -> &str {
        &self.language
    }
}

impl TabRecord for SecurityEntity {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn display_name(&self) -> &str {
        &self.name
    }
    fn file_path(&self) -> &str {
        &self.file_path
    }
    fn type_field(&self) -> &str {
        &self.entity_type
    }
    fn category(&self) -> &str {
        self.provider.as_deref().unwrap_or("")
    }
    fn arn(&self) -> Option<&str> {
        self.arn.as_deref()
    }
}

/// Filter criteria; every empty dimension matches everything
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Case-insensitive substring over name, file path, and ARN
    pub search: Option<String>,
    /// Exact match on the declared type field
    pub type_filter: Option<String>,
    /// Exact match on the second categorical field
    pub category: Option<String>,
    /// Entity has at least one vulnerability of this severity
    pub severity: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map_or(true, |s| s.trim().is_empty())
        }
        blank(&self.search)
            && blank(&self.type_filter)
            && blank(&self.category)
            && blank(&self.severity)
    }
}

/// Grouping keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// The declared type field
    Type,
    /// Language (code) or provider (services, security, dependencies)
    Category,
    /// Source file's directory
    Directory,
    /// Highest-ranked vulnerability severity (security tab)
    Severity,
}

/// A filtered, ungrouped view honoring the display threshold.
///
/// Past the threshold the full list is retained and an expansion is offered;
/// nothing is ever silently truncated away.
#[derive(Debug)]
pub struct ListView<'a, T> {
    items: Vec<&'a T>,
    expanded: bool,
}

impl<'a, T> ListView<'a, T> {
    pub fn new(items: Vec<&'a T>) -> Self {
        ListView {
            items,
            expanded: false,
        }
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// The slice to display right now
    pub fn visible(&self) -> &[&'a T] {
        if self.is_collapsed() {
            &self.items[..DISPLAY_THRESHOLD]
        } else {
            &self.items
        }
    }

    /// Whether a "show all" control should be offered
    pub fn is_collapsed(&self) -> bool {
        !self.expanded && self.items.len() > DISPLAY_THRESHOLD
    }

    pub fn hidden_count(&self) -> usize {
        self.total() - self.visible().len()
    }

    pub fn show_all(&mut self) {
        self.expanded = true;
    }
}

/// Per-tab entity lists plus the vulnerability index for the security tab
#[derive(Debug, Default)]
pub struct FilterEngine {
    pub dependencies: Vec<Dependency>,
    pub services: Vec<Service>,
    pub code_elements: Vec<CodeElement>,
    pub security_entities: Vec<SecurityEntity>,
    severities: HashMap<String, Vec<Severity>>,
}

impl FilterEngine {
    pub fn new() -> Self {
        FilterEngine::default()
    }

    /// Fetch and replace the given tab's list. Overview carries no list.
    pub async fn activate_tab(
        &mut self,
        client: &dyn ArchlensApi,
        repo_id: &str,
        tab: Tab,
    ) -> ApiResult<()> {
        match tab {
            Tab::Overview => {}
            Tab::Dependencies => self.load_dependencies(client.dependencies(repo_id).await?),
            Tab::Services => self.load_services(client.services(repo_id).await?),
            Tab::Code => self.load_code_elements(client.code_elements(repo_id).await?),
            Tab::Security => {
                let entities = client.security_entities(repo_id).await?;
                let vulns = client.vulnerabilities(repo_id).await?;
                self.load_security(entities, vulns);
            }
        }
        Ok(())
    }

    pub fn load_dependencies(&mut self, list: Vec<Dependency>) {
        self.dependencies = list;
    }

    pub fn load_services(&mut self, list: Vec<Service>) {
        self.services = list;
    }

    pub fn load_code_elements(&mut self, list: Vec<CodeElement>) {
        self.code_elements = list;
    }

    pub fn load_security(&mut self, entities: Vec<SecurityEntity>, vulns: Vec<Vulnerability>) {
        self.security_entities = entities;
        self.severities.clear();
        for vuln in vulns {
            self.severities
                .entry(vuln.entity_id.clone())
                .or_default()
                .push(vuln.severity);
        }
    }

    /// Highest-ranked severity among an entity's vulnerabilities
    pub fn highest_severity(&self, entity_id: &str) -> Option<&Severity> {
        self.severities.get(entity_id).and_then(|sevs| sevs.iter().max())
    }

    /// Names on the given tab, for navigation matching
    pub fn names_on_tab(&self, tab: Tab) -> Vec<&str> {
        match tab {
            Tab::Overview => Vec::new(),
            Tab::Dependencies => self.dependencies.iter().map(|d| d.name.as_str()).collect(),
            Tab::Services => self.services.iter().map(|s| s.name.as_str()).collect(),
            Tab::Code => self.code_elements.iter().map(|c| c.name.as_str()).collect(),
            Tab::Security => self
                .security_entities
                .iter()
                .map(|e| e.name.as_str())
                .collect(),
        }
    }

    /// Apply every non-empty criterion; the result is their conjunction
    pub fn filter<'a, T: TabRecord>(
        &self,
        list: &'a [T],
        criteria: &FilterCriteria,
    ) -> Vec<&'a T> {
        list.iter()
            .filter(|record| self.matches(*record, criteria))
            .collect()
    }

    fn matches<T: TabRecord>(&self, record: &T, criteria: &FilterCriteria) -> bool {
        if let Some(needle) = non_empty(&criteria.search) {
            let needle = needle.to_lowercase();
            let in_name = record.display_name().to_lowercase().contains(&needle);
            let in_path = record.file_path().to_lowercase().contains(&needle);
            let in_arn = record
                .arn()
                .map(|a| a.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_name && !in_path && !in_arn {
                return false;
            }
        }
        if let Some(wanted) = non_empty(&criteria.type_filter) {
            if record.type_field() != wanted {
                return false;
            }
        }
        if let Some(wanted) = non_empty(&criteria.category) {
            if record.category() != wanted {
                return false;
            }
        }
        if let Some(selected) = non_empty(&criteria.severity) {
            let has_match = self
                .severities
                .get(record.record_id())
                .map(|sevs| sevs.iter().any(|s| s.matches(selected)))
                .unwrap_or(false);
            if !has_match {
                return false;
            }
        }
        true
    }

    /// Partition into ordered `(label, members)` groups.
    ///
    /// Alphabetical by label, except severity which follows the fixed
    /// priority order with "no vulnerabilities" last. Members sort by name.
    pub fn group<'a, T: TabRecord>(
        &self,
        items: Vec<&'a T>,
        key: GroupKey,
    ) -> Vec<(String, Vec<&'a T>)> {
        if key == GroupKey::Severity {
            return self.group_by_severity(items);
        }

        let mut groups: std::collections::BTreeMap<String, Vec<&'a T>> =
            std::collections::BTreeMap::new();
        for item in items {
            let label = match key {
                GroupKey::Type => item.type_field().to_string(),
                GroupKey::Category => item.category().to_string(),
                GroupKey::Directory => directory_label(item.file_path()),
                GroupKey::Severity => unreachable!(),
            };
            groups.entry(label).or_default().push(item);
        }

        groups
            .into_iter()
            .map(|(label, mut members)| {
                members.sort_by(|a, b| a.display_name().cmp(b.display_name()));
                (label, members)
            })
            .collect()
    }

    fn group_by_severity<'a, T: TabRecord>(
        &self,
        items: Vec<&'a T>,
    ) -> Vec<(String, Vec<&'a T>)> {
        let mut ranked: Vec<(Option<Severity>, Vec<&'a T>)> = Vec::new();
        for item in items {
            let highest = self
                .severities
                .get(item.record_id())
                .and_then(|sevs| sevs.iter().max().cloned());
            match ranked.iter_mut().find(|(sev, _)| *sev == highest) {
                Some((_, members)) => members.push(item),
                None => ranked.push((highest, vec![item])),
            }
        }

        // Highest severity first; entities without vulnerabilities last
        ranked.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(x), Some(y)) => y.cmp(x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        ranked
            .into_iter()
            .map(|(sev, mut members)| {
                members.sort_by(|a, b| a.display_name().cmp(b.display_name()));
                let label = sev
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| "no vulnerabilities".to_string());
                (label, members)
            })
            .collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// A file's directory: the path minus its last segment; files at the root
/// collapse into a fixed "root" group
fn directory_label(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir.to_string(),
        _ => "root".to_string(),
    }
}
