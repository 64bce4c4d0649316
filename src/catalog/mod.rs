// Capability catalog
//
// The catalog is fetched once (or read from an outline file) and never
// mutated afterwards. Iteration order is the order the source listed the
// capabilities in, which is also the order they are offered for selection.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A named capability with its descriptive points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability<'a> {
    pub name: &'a str,
    pub points: &'a [String],
}

/// Read-only mapping of capability name to descriptive points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityCatalog {
    entries: IndexMap<String, Vec<String>>,
}

impl CapabilityCatalog {
    pub fn new(entries: IndexMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Parse the outline format used by capability files:
    ///
    /// ```text
    /// Communicating and consulting
    /// - Establishes rapport
    /// - Explores the patient's agenda
    /// ```
    ///
    /// A line not starting with `-` opens a new capability; `-` lines add
    /// points to it. Capabilities without any points are dropped.
    pub fn parse_outline(content: &str) -> Self {
        let mut entries = IndexMap::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for line in content.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()) {
            if line.starts_with('-') {
                if let Some((_, points)) = current.as_mut() {
                    points.push(line.trim_start_matches(&['-', ' '][..]).to_string());
                }
                continue;
            }
            if let Some((name, points)) = current.take() {
                if !points.is_empty() {
                    entries.insert(name, points);
                }
            }
            current = Some((line.to_string(), Vec::new()));
        }
        if let Some((name, points)) = current {
            if !points.is_empty() {
                entries.insert(name, points);
            }
        }

        Self { entries }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn points(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability<'_>> {
        self.entries.iter().map(|(name, points)| Capability {
            name,
            points,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
