use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const FEATURE_KEYWORD: &str = "Feature:";
const SCENARIO_KEYWORD: &str = "Scenario:";
const OUTLINE_KEYWORD: &str = "Scenario Outline:";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FeatureDocument {
    pub name: String,
    #[serde(default)]
    pub scenarios: Vec<ScenarioRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioRecord {
    pub name: String,
    pub kind: ScenarioKind,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Scenario,
    ScenarioOutline,
}

impl ScenarioKind {
    /// Label used in rendered tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scenario => "Scenario",
            Self::ScenarioOutline => "Scenario Outline",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Self::Scenario => SCENARIO_KEYWORD,
            Self::ScenarioOutline => OUTLINE_KEYWORD,
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("failed to read feature file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads a feature file from disk and parses it.
///
/// The only failure is an unreadable file; the grammar itself is lenient.
pub fn load_feature(path: impl AsRef<Path>) -> Result<FeatureDocument, FeatureError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| FeatureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_feature(&source);
    tracing::debug!(
        path = %path.display(),
        feature = %document.name,
        scenarios = document.scenarios.len(),
        "parsed feature file"
    );
    Ok(document)
}

/// Parses feature-file text in a single forward pass.
///
/// Lines that are neither `Feature:`, tag nor scenario lines are ignored.
pub fn parse_feature(source: &str) -> FeatureDocument {
    let mut name = String::new();
    let mut scenarios = Vec::new();
    let mut current_tags: Vec<String> = Vec::new();

    for line in source.lines() {
        if let Some(rest) = line.strip_prefix(FEATURE_KEYWORD) {
            // every match overwrites, so the last Feature: line wins
            name = rest.trim().to_string();
        } else if line.trim().starts_with('@') {
            current_tags = parse_tag_line(line);
        } else if let Some((kind, title)) = parse_scenario_line(line) {
            scenarios.push(ScenarioRecord {
                name: title.to_string(),
                kind,
                tags: std::mem::take(&mut current_tags),
            });
        }
    }

    FeatureDocument { name, scenarios }
}

fn parse_tag_line(line: &str) -> Vec<String> {
    line.split_whitespace()
        .filter(|token| token.starts_with('@'))
        .map(str::to_string)
        .collect()
}

fn parse_scenario_line(line: &str) -> Option<(ScenarioKind, &str)> {
    let trimmed = line.trim_start();
    [ScenarioKind::Scenario, ScenarioKind::ScenarioOutline]
        .into_iter()
        .find_map(|kind| {
            let rest = trimmed.strip_prefix(kind.keyword())?;
            // a keyword with nothing after it is not a scenario
            if rest.is_empty() {
                return None;
            }
            Some((kind, rest.trim()))
        })
}

impl FeatureDocument {
    pub fn summary(&self) -> FeatureSummary {
        let tags: BTreeSet<String> = self
            .scenarios
            .iter()
            .flat_map(|scenario| scenario.tags.iter().cloned())
            .collect();
        FeatureSummary {
            name: self.name.clone(),
            total_scenarios: self.scenarios.len(),
            outlines: self
                .scenarios
                .iter()
                .filter(|scenario| scenario.kind == ScenarioKind::ScenarioOutline)
                .count(),
            untagged: self
                .scenarios
                .iter()
                .filter(|scenario| scenario.tags.is_empty())
                .map(|scenario| scenario.name.clone())
                .collect(),
            tags: tags.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub name: String,
    pub total_scenarios: usize,
    pub outlines: usize,
    pub tags: Vec<String>,
    pub untagged: Vec<String>,
}

impl fmt::Display for FeatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() {
            "<unnamed>"
        } else {
            self.name.as_str()
        };
        writeln!(f, "Feature: {}", name)?;
        writeln!(
            f,
            "Scenarios: {} ({} outlines)",
            self.total_scenarios, self.outlines
        )?;
        if !self.tags.is_empty() {
            writeln!(f, "Tags:")?;
            for tag in &self.tags {
                writeln!(f, "  - {}", tag)?;
            }
        }
        if !self.untagged.is_empty() {
            writeln!(f, "Untagged scenarios:")?;
            for scenario in &self.untagged {
                writeln!(f, "  - {}", scenario)?;
            }
        }
        Ok(())
    }
}
