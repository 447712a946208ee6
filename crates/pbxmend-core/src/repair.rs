//! Integrity repair.
//!
//! Repair runs a fixed sequence of passes. Each pass looks at a fresh parse
//! of the current text, queues edits in one [`EditBatch`] and records a
//! [`Fix`] per problem it resolves. Only entries that are provably broken or
//! redundant are touched; a second run over the output finds nothing to do.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::document::{line_of, Document, FieldValue, Object, RefSite, SiteKind};
use crate::edit::{whole_lines, EditBatch};
use crate::error::CoreError;
use crate::model::ObjectId;

/// Lists whose entries must name a defined object.
const MEMBER_KEYS: [&str; 2] = ["children", "files"];

/// Lists where the same id twice is always a mistake.
const UNIQUE_KEYS: [&str; 4] = ["children", "files", "buildPhases", "targets"];

#[derive(Debug, Clone, Copy)]
pub struct RepairOptions {
    /// Remove groups that were already empty, not just those emptied by
    /// this repair.
    pub prune_empty_groups: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            prune_empty_groups: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    PrematureTerminator,
    DuplicateDefinition,
    DuplicateFileReference,
    DuplicateBuildFile,
    UnresolvedBuildFile,
    DanglingMember,
    DuplicateMember,
    OrphanGroup,
}

impl std::fmt::Display for FixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FixKind::PrematureTerminator => "premature terminator",
            FixKind::DuplicateDefinition => "duplicate definition",
            FixKind::DuplicateFileReference => "duplicate file reference",
            FixKind::DuplicateBuildFile => "duplicate build file",
            FixKind::UnresolvedBuildFile => "unresolved build file",
            FixKind::DanglingMember => "dangling member",
            FixKind::DuplicateMember => "duplicate member",
            FixKind::OrphanGroup => "orphan group",
        };
        f.write_str(s)
    }
}

/// One problem found and resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Fix {
    pub kind: FixKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Identifiers whose definitions or references changed. For merges the
    /// survivor comes first.
    pub ids: Vec<ObjectId>,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairReport {
    pub fixes: Vec<Fix>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn count(&self, kind: FixKind) -> usize {
        self.fixes.iter().filter(|f| f.kind == kind).count()
    }
}

type Pass = fn(&Document, &str, &mut Vec<Fix>) -> Result<EditBatch, CoreError>;

/// Repair `text` and return the cleaned manifest with a report of every fix.
pub fn repair(text: &str, opts: &RepairOptions) -> Result<(String, RepairReport), CoreError> {
    let mut report = RepairReport::default();
    let mut current = text.to_string();
    let initially_empty = empty_groups(&Document::parse(text)?);

    let passes: [(&str, Pass); 6] = [
        ("terminators", premature_terminators),
        ("definitions", duplicate_definitions),
        ("file references", duplicate_file_references),
        ("build files", duplicate_build_files),
        ("dangling", dangling_references),
        ("members", duplicate_members),
    ];
    for (name, pass) in passes {
        let doc = Document::parse(&current)?;
        let before = report.fixes.len();
        let batch = pass(&doc, &current, &mut report.fixes)?;
        if !batch.is_empty() {
            current = batch.apply(&current)?;
        }
        tracing::debug!("Repair pass {name}: {} fix(es)", report.fixes.len() - before);
    }

    // each removal can empty the parent, so repeat until nothing changes
    loop {
        let doc = Document::parse(&current)?;
        let batch = orphan_groups(&doc, &current, opts, &initially_empty, &mut report.fixes)?;
        if batch.is_empty() {
            break;
        }
        current = batch.apply(&current)?;
    }

    let doc = Document::parse(&current)?;
    doc.ensure_well_formed()?;
    if report.is_clean() {
        tracing::info!("Manifest is clean");
    } else {
        tracing::info!("Applied {} repair(s)", report.fixes.len());
    }
    Ok((current, report))
}

fn premature_terminators(doc: &Document, text: &str, fixes: &mut Vec<Fix>) -> Result<EditBatch, CoreError> {
    let mut batch = EditBatch::default();
    for m in doc.malformations() {
        if m.needs_comma {
            batch.replace(m.span.clone(), ",");
        } else {
            batch.delete(whole_lines(text, m.span.clone()));
        }
        let section = doc.definitions(m.owner.as_str()).first().and_then(|o| o.section.clone());
        fixes.push(Fix {
            kind: FixKind::PrematureTerminator,
            section,
            ids: vec![m.owner.clone()],
            detail: format!("rejoined {}.{} at line {}", m.owner, m.key, line_of(text, m.span.start)),
        });
    }
    Ok(batch)
}

fn duplicate_definitions(doc: &Document, text: &str, fixes: &mut Vec<Fix>) -> Result<EditBatch, CoreError> {
    let mut batch = EditBatch::default();
    let mut seen: HashSet<&ObjectId> = HashSet::new();
    for object in doc.objects() {
        if seen.insert(&object.id) {
            continue;
        }
        batch.delete(whole_lines(text, object.span.clone()));
        fixes.push(Fix {
            kind: FixKind::DuplicateDefinition,
            section: object.section.clone(),
            ids: vec![object.id.clone()],
            detail: format!("dropped a second definition of {} ({})", object.id, object.display_name()),
        });
    }
    Ok(batch)
}

fn duplicate_file_references(doc: &Document, text: &str, fixes: &mut Vec<Fix>) -> Result<EditBatch, CoreError> {
    merge_duplicates(doc, text, "PBXFileReference", "children", FixKind::DuplicateFileReference, fixes)
}

fn duplicate_build_files(doc: &Document, text: &str, fixes: &mut Vec<Fix>) -> Result<EditBatch, CoreError> {
    merge_duplicates(doc, text, "PBXBuildFile", "files", FixKind::DuplicateBuildFile, fixes)
}

/// Collapse objects of `isa` with identical content and the same containers
/// (`member_key` lists) into the first one. Copies no container lists join
/// the attached copy when there is exactly one.
fn merge_duplicates(
    doc: &Document,
    text: &str,
    isa: &str,
    member_key: &str,
    kind: FixKind,
    fixes: &mut Vec<Fix>,
) -> Result<EditBatch, CoreError> {
    let objects = doc.objects();
    let index = doc.reference_index();

    let mut by_content: Vec<Vec<usize>> = Vec::new();
    let mut slots: HashMap<Vec<(String, String)>, usize> = HashMap::new();
    for (idx, object) in objects.iter().enumerate() {
        if object.isa() != Some(isa) || doc.definitions(object.id.as_str()).len() != 1 {
            continue;
        }
        let slot = *slots.entry(content_key(object, text)).or_insert_with(|| {
            by_content.push(Vec::new());
            by_content.len() - 1
        });
        by_content[slot].push(idx);
    }

    let mut rewriter = Rewriter::new(doc, text, &index);
    for same in by_content.into_iter().filter(|s| s.len() > 1) {
        let mut clusters: Vec<(Vec<&ObjectId>, Vec<usize>)> = Vec::new();
        let mut detached = Vec::new();
        for idx in same {
            let containers = containers(&index, objects, &objects[idx].id, member_key);
            if containers.is_empty() {
                detached.push(idx);
                continue;
            }
            match clusters.iter_mut().find(|(c, _)| *c == containers) {
                Some((_, members)) => members.push(idx),
                None => clusters.push((containers, vec![idx])),
            }
        }
        if let [(_, members)] = clusters.as_mut_slice() {
            members.extend(detached);
        } else {
            clusters.push((Vec::new(), detached));
        }

        for (_, members) in clusters.into_iter().filter(|(_, m)| m.len() > 1) {
            let survivor = &objects[members[0]];
            let losers: Vec<&Object> = members[1..].iter().map(|&i| &objects[i]).collect();
            for loser in &losers {
                rewriter.redirect(loser, &survivor.id);
            }
            let mut ids = vec![survivor.id.clone()];
            ids.extend(losers.iter().map(|o| o.id.clone()));
            fixes.push(Fix {
                kind,
                section: survivor.section.clone(),
                ids,
                detail: format!(
                    "merged {} copy(ies) of {} into {}",
                    losers.len(),
                    survivor.display_name(),
                    survivor.id
                ),
            });
        }
    }
    Ok(rewriter.batch)
}

/// Scalar fields, list contents and compacted dictionaries, sorted by key.
/// Labels are not part of the content.
fn content_key(object: &Object, text: &str) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = object
        .fields
        .iter()
        .map(|field| {
            let value = match &field.value {
                FieldValue::Scalar(s) => s.value.clone(),
                FieldValue::List(l) => l.ids().collect::<Vec<_>>().join(","),
                FieldValue::Dict(range) => text[range.clone()]
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect(),
            };
            (field.key.clone(), value)
        })
        .collect();
    key.sort();
    key
}

/// Owners of `member_key` lists that name `id`, sorted.
fn containers<'d>(
    index: &HashMap<String, Vec<RefSite>>,
    objects: &'d [Object],
    id: &ObjectId,
    member_key: &str,
) -> Vec<&'d ObjectId> {
    let mut owners: Vec<&ObjectId> = index
        .get(id.as_str())
        .into_iter()
        .flatten()
        .filter(|s| s.key == member_key && matches!(s.kind, SiteKind::Item { .. }))
        .map(|s| &objects[s.owner].id)
        .collect();
    owners.sort();
    owners.dedup();
    owners
}

/// Points every reference to a loser at its survivor, dropping list entries
/// that would then name the survivor twice.
struct Rewriter<'d> {
    doc: &'d Document,
    text: &'d str,
    index: &'d HashMap<String, Vec<RefSite>>,
    /// (owner, key, id) entries added to lists by earlier redirects.
    added: HashSet<(usize, String, ObjectId)>,
    batch: EditBatch,
}

impl<'d> Rewriter<'d> {
    fn new(doc: &'d Document, text: &'d str, index: &'d HashMap<String, Vec<RefSite>>) -> Self {
        Self {
            doc,
            text,
            index,
            added: HashSet::new(),
            batch: EditBatch::default(),
        }
    }

    fn redirect(&mut self, loser: &Object, survivor: &ObjectId) {
        let objects = self.doc.objects();
        for site in self.index.get(loser.id.as_str()).into_iter().flatten() {
            let owner = &objects[site.owner];
            match site.kind {
                SiteKind::Scalar => self.batch.replace(site.value_span.clone(), survivor.as_str()),
                SiteKind::Item { index } => {
                    let Some(list) = owner.list(&site.key) else {
                        continue;
                    };
                    let entry = (site.owner, site.key.clone(), survivor.clone());
                    if list.contains(survivor.as_str()) || self.added.contains(&entry) {
                        self.batch.delete(whole_lines(self.text, list.items[index].span.clone()));
                    } else {
                        self.batch.replace(site.value_span.clone(), survivor.as_str());
                        self.added.insert(entry);
                    }
                }
            }
        }
        self.batch.delete(whole_lines(self.text, loser.span.clone()));
    }
}

fn dangling_references(doc: &Document, text: &str, fixes: &mut Vec<Fix>) -> Result<EditBatch, CoreError> {
    let mut batch = EditBatch::default();
    let mut doomed: HashSet<&str> = HashSet::new();

    for build_file in doc.objects_with_isa("PBXBuildFile") {
        let target = build_file.scalar("fileRef").or_else(|| build_file.scalar("productRef"));
        let resolved = target.is_some_and(|t| doc.contains(t));
        if resolved {
            continue;
        }
        doomed.insert(build_file.id.as_str());
        batch.delete(whole_lines(text, build_file.span.clone()));
        fixes.push(Fix {
            kind: FixKind::UnresolvedBuildFile,
            section: build_file.section.clone(),
            ids: vec![build_file.id.clone()],
            detail: format!(
                "{} points at missing {}",
                build_file.id,
                target.unwrap_or("nothing")
            ),
        });
    }

    for owner in doc.objects() {
        for key in MEMBER_KEYS {
            let Some(list) = owner.list(key) else {
                continue;
            };
            for item in &list.items {
                let Some(value) = item.value.as_deref() else {
                    continue;
                };
                if doc.contains(value) && !doomed.contains(value) {
                    continue;
                }
                batch.delete(whole_lines(text, item.span.clone()));
                fixes.push(Fix {
                    kind: FixKind::DanglingMember,
                    section: owner.section.clone(),
                    ids: vec![owner.id.clone(), ObjectId::from(value)],
                    detail: format!("removed {value} from {}.{key}", owner.id),
                });
            }
        }
    }
    Ok(batch)
}

fn duplicate_members(doc: &Document, text: &str, fixes: &mut Vec<Fix>) -> Result<EditBatch, CoreError> {
    let mut batch = EditBatch::default();
    for owner in doc.objects() {
        for key in UNIQUE_KEYS {
            let Some(list) = owner.list(key) else {
                continue;
            };
            let mut seen = HashSet::new();
            for item in &list.items {
                let Some(value) = item.value.as_deref() else {
                    continue;
                };
                if seen.insert(value) {
                    continue;
                }
                batch.delete(whole_lines(text, item.span.clone()));
                fixes.push(Fix {
                    kind: FixKind::DuplicateMember,
                    section: owner.section.clone(),
                    ids: vec![owner.id.clone(), ObjectId::from(value)],
                    detail: format!("{value} listed twice in {}.{key}", owner.id),
                });
            }
        }
    }
    Ok(batch)
}

fn empty_groups(doc: &Document) -> HashSet<ObjectId> {
    doc.objects_with_isa("PBXGroup")
        .filter(|g| g.list("children").is_some_and(|l| l.items.is_empty()))
        .map(|g| g.id.clone())
        .collect()
}

/// Empty groups that nothing but `children` lists mention.
fn orphan_groups(
    doc: &Document,
    text: &str,
    opts: &RepairOptions,
    initially_empty: &HashSet<ObjectId>,
    fixes: &mut Vec<Fix>,
) -> Result<EditBatch, CoreError> {
    let project = doc.project().ok();
    let pinned: Vec<&str> = ["mainGroup", "productRefGroup"]
        .iter()
        .filter_map(|key| project.and_then(|p| p.scalar(key)))
        .collect();

    let index = doc.reference_index();
    let objects = doc.objects();
    let mut batch = EditBatch::default();
    for group in doc.objects_with_isa("PBXGroup") {
        if pinned.contains(&group.id.as_str()) || doc.definitions(group.id.as_str()).len() != 1 {
            continue;
        }
        if !group.list("children").is_some_and(|l| l.items.is_empty()) {
            continue;
        }
        if !opts.prune_empty_groups && initially_empty.contains(&group.id) {
            continue;
        }
        let sites: &[RefSite] = index.get(group.id.as_str()).map(Vec::as_slice).unwrap_or_default();
        if !sites
            .iter()
            .all(|s| s.key == "children" && matches!(s.kind, SiteKind::Item { .. }))
        {
            continue;
        }

        for site in sites {
            if let (SiteKind::Item { index: item }, Some(list)) = (site.kind, objects[site.owner].list("children")) {
                batch.delete(whole_lines(text, list.items[item].span.clone()));
            }
        }
        batch.delete(whole_lines(text, group.span.clone()));
        let mut ids = vec![group.id.clone()];
        ids.extend(sites.iter().map(|s| objects[s.owner].id.clone()));
        fixes.push(Fix {
            kind: FixKind::OrphanGroup,
            section: group.section.clone(),
            ids,
            detail: format!("removed empty group {}", group.display_name()),
        });
    }
    Ok(batch)
}
