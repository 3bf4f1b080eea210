//! Locating and reading each stage's artifacts for a feature, and the content
//! fingerprints the regression detector compares.

use crate::classify::{classify, PathKind};
use crate::error::Result;
use crate::io;
use crate::project::Project;
use crate::store::FeatureState;
use crate::types::ArtifactKind;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Fingerprints
// ---------------------------------------------------------------------------

/// Lowercase hex SHA-256 of `bytes`.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Requirements anchors
// ---------------------------------------------------------------------------

/// A heading in the requirements document tagged `{#feature-id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub id: String,
    /// 1-based line of the heading.
    pub line: usize,
    /// The heading and its body, up to the next heading of equal or higher
    /// level.
    pub section: String,
}

static ANCHOR_RE: OnceLock<Regex> = OnceLock::new();

fn anchor_re() -> &'static Regex {
    ANCHOR_RE.get_or_init(|| {
        Regex::new(r"^#{1,6}\s+.*\{#([A-Za-z0-9][A-Za-z0-9_\-]*)\}\s*$").expect("static regex")
    })
}

/// Level of a markdown ATX heading, `None` for any other line.
fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    ((1..=6).contains(&hashes) && line[hashes..].starts_with(char::is_whitespace))
        .then_some(hashes)
}

/// Anchored sections in document order. A section ends at the next heading
/// of the same or a higher level; deeper headings stay inside it.
pub fn parse_anchors(text: &str) -> Vec<Anchor> {
    let mut anchors: Vec<Anchor> = Vec::new();
    let mut open_level = None;
    for (i, line) in text.lines().enumerate() {
        let level = heading_level(line);
        if let Some(caps) = anchor_re().captures(line) {
            anchors.push(Anchor {
                id: caps[1].to_string(),
                line: i + 1,
                section: String::new(),
            });
            open_level = level;
        } else if let (Some(level), Some(open)) = (level, open_level) {
            if level <= open {
                open_level = None;
            }
        }
        if open_level.is_none() {
            continue;
        }
        if let Some(current) = anchors.last_mut() {
            current.section.push_str(line);
            current.section.push('\n');
        }
    }
    anchors
}

/// Anchors in the project's requirements document. Missing document ⇒ none.
pub fn read_anchors(project: &Project) -> Result<Vec<Anchor>> {
    match io::read_optional(&project.prd_path())? {
        Some(bytes) => Ok(parse_anchors(&String::from_utf8_lossy(&bytes))),
        None => Ok(Vec::new()),
    }
}

pub fn anchor_for(project: &Project, feature: &str) -> Result<Option<Anchor>> {
    Ok(read_anchors(project)?.into_iter().find(|a| a.id == feature))
}

// ---------------------------------------------------------------------------
// Single-file artifacts
// ---------------------------------------------------------------------------

/// Files under `dir` that classify as `kind` and belong to `feature`.
fn files_in(
    project: &Project,
    dir: &str,
    kind: PathKind,
    feature: &str,
    feature_ids: &[String],
) -> Result<Vec<String>> {
    Ok(io::walk_files(&project.root().join(dir))?
        .into_iter()
        .map(|p| classify(project, &p, feature_ids))
        .filter(|c| c.kind == kind && c.feature.as_deref() == Some(feature))
        .map(|c| c.path)
        .collect())
}

/// Seed files for `feature`: `seeds/<id>.yaml` as well as anything nested
/// under `seeds/<id>/`.
pub fn seed_files(project: &Project, feature: &str, feature_ids: &[String]) -> Result<Vec<String>> {
    let dir = &project.config().layout.seeds_dir;
    files_in(project, dir, PathKind::SeedManifest, feature, feature_ids)
}

pub fn scenario_files(
    project: &Project,
    feature: &str,
    feature_ids: &[String],
) -> Result<Vec<String>> {
    let dir = &project.config().layout.bdd_dir;
    files_in(project, dir, PathKind::Scenario, feature, feature_ids)
}

// ---------------------------------------------------------------------------
// Multi-file artifacts
// ---------------------------------------------------------------------------

/// Every file under the configured test and source directories, with its
/// classification, deduplicated and sorted.
fn scan(
    project: &Project,
    feature_ids: &[String],
) -> Result<Vec<(String, PathKind, Option<String>)>> {
    let mut seen = BTreeSet::new();
    for dir in project.tests_dirs().into_iter().chain(project.src_dirs()) {
        for file in io::walk_files(&dir)? {
            seen.insert(file);
        }
    }
    Ok(seen
        .into_iter()
        .map(|p| {
            let c = classify(project, &p, feature_ids);
            (c.path, c.kind, c.feature)
        })
        .collect())
}

/// All test files in the project with their inferred feature.
pub fn scan_test_files(
    project: &Project,
    feature_ids: &[String],
) -> Result<Vec<(String, Option<String>)>> {
    Ok(scan(project, feature_ids)?
        .into_iter()
        .filter(|(_, kind, _)| *kind == PathKind::Test)
        .map(|(path, _, feature)| (path, feature))
        .collect())
}

/// Test files attributed to `feature` by structure alone.
pub fn structural_test_files(
    project: &Project,
    feature: &str,
    feature_ids: &[String],
) -> Result<Vec<String>> {
    Ok(scan_test_files(project, feature_ids)?
        .into_iter()
        .filter(|(_, f)| f.as_deref() == Some(feature))
        .map(|(path, _)| path)
        .collect())
}

/// Test files for `feature`: the recorded mappings that still exist, or the
/// structural scan when there are none.
pub fn resolve_test_files(
    project: &Project,
    feature: &str,
    feature_ids: &[String],
    state: Option<&FeatureState>,
) -> Result<Vec<String>> {
    let mapped: Vec<String> = state
        .map(|s| {
            s.test_mappings
                .iter()
                .filter(|p| project.root().join(p).is_file())
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    if !mapped.is_empty() {
        return Ok(mapped);
    }
    structural_test_files(project, feature, feature_ids)
}

pub fn implementation_files(
    project: &Project,
    feature: &str,
    feature_ids: &[String],
) -> Result<Vec<String>> {
    Ok(scan(project, feature_ids)?
        .into_iter()
        .filter(|(_, kind, f)| *kind == PathKind::Implementation && f.as_deref() == Some(feature))
        .map(|(path, _, _)| path)
        .collect())
}

// ---------------------------------------------------------------------------
// Reading an artifact kind
// ---------------------------------------------------------------------------

/// The observed content of one artifact kind for one feature.
#[derive(Debug, Clone)]
pub struct ArtifactContent {
    /// Display path; several files are joined with ", ".
    pub path: String,
    pub fingerprint: String,
}

/// Read and fingerprint `kind` for `feature`. `None` when nothing exists.
pub fn observe(
    project: &Project,
    feature: &str,
    kind: ArtifactKind,
    feature_ids: &[String],
    state: Option<&FeatureState>,
) -> Result<Option<ArtifactContent>> {
    match kind {
        ArtifactKind::RequirementsAnchor => Ok(anchor_for(project, feature)?.map(|a| {
            ArtifactContent {
                path: format!("{}#{}", project.config().layout.prd, a.id),
                fingerprint: fingerprint(a.section.as_bytes()),
            }
        })),
        ArtifactKind::SeedManifest => {
            observe_files(project, &seed_files(project, feature, feature_ids)?)
        }
        ArtifactKind::ScenarioFile => {
            observe_files(project, &scenario_files(project, feature, feature_ids)?)
        }
        ArtifactKind::TestFile => {
            let files = resolve_test_files(project, feature, feature_ids, state)?;
            observe_files(project, &files)
        }
        ArtifactKind::ImplementationFile => {
            let files = implementation_files(project, feature, feature_ids)?;
            observe_files(project, &files)
        }
    }
}

/// Fingerprint several files as one: each file's path and bytes feed the
/// hash in order. Files that vanished are skipped.
fn observe_files(project: &Project, rel_paths: &[String]) -> Result<Option<ArtifactContent>> {
    let mut hasher = Sha256::new();
    let mut present = Vec::new();
    for rel in rel_paths {
        let Some(bytes) = io::read_optional(&project.root().join(rel))? else {
            continue;
        };
        if rel_paths.len() > 1 {
            hasher.update(rel.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(&bytes);
        present.push(rel.as_str());
    }
    if present.is_empty() {
        return Ok(None);
    }
    Ok(Some(ArtifactContent {
        path: present.join(", "),
        fingerprint: format!("{:x}", hasher.finalize()),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
