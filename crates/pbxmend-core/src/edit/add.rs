use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::document::{Document, RefSite};
use crate::error::CoreError;
use crate::ids::{IdGenerator, IdStrategy};
use crate::locate::{infer_target, locate, resolve_group, resolve_phase, Anchor, GroupMatch};
use crate::model::{FileDescriptor, FileType, ObjectId, PhaseKind};
use crate::render::{BuildFileEntry, FileReferenceEntry, GroupEntry, MemberItem, Render};

use super::EditBatch;

/// What to do when a descriptor's path is already in its group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnExisting {
    #[default]
    Fail,
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub strategy: IdStrategy,
    /// Create missing trailing components of a group path.
    pub create_groups: bool,
    pub on_existing: OnExisting,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AddReport {
    pub added: Vec<AddedFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub created_groups: Vec<CreatedGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddedFile {
    pub path: String,
    pub group: ObjectId,
    pub file_ref: ObjectId,
    pub build_files: Vec<PhaseMembership>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseMembership {
    pub phase: ObjectId,
    pub build_file: ObjectId,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub group: ObjectId,
    pub existing: ObjectId,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedGroup {
    pub id: ObjectId,
    pub path: String,
    pub parent: ObjectId,
}

impl AddReport {
    /// Every identifier this transaction introduced.
    pub fn created_ids(&self) -> Vec<&ObjectId> {
        let mut ids: Vec<&ObjectId> = self.created_groups.iter().map(|g| &g.id).collect();
        for file in &self.added {
            ids.push(&file.file_ref);
            ids.extend(file.build_files.iter().map(|m| &m.build_file));
        }
        ids
    }

    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.created_groups.is_empty()
    }
}

/// Add one file. See [`add_files`].
pub fn add_file(
    text: &str,
    descriptor: &FileDescriptor,
    opts: &AddOptions,
) -> Result<(String, AddReport), CoreError> {
    add_files(text, std::slice::from_ref(descriptor), opts)
}

/// Add every descriptor as one transaction and return the new manifest text.
///
/// Each file gets a PBXFileReference, a PBXBuildFile per target, a
/// membership in its group's `children` and one in each target's build
/// phase `files`. All edits are planned against the same parse of `text`
/// and the result is re-parsed and checked before it is returned; on any
/// error nothing is returned and `text` remains the source of truth.
pub fn add_files(
    text: &str,
    descriptors: &[FileDescriptor],
    opts: &AddOptions,
) -> Result<(String, AddReport), CoreError> {
    let doc = Document::parse(text)?;
    doc.ensure_well_formed()?;

    let mut ids = IdGenerator::for_document(&doc, opts.strategy);
    let mut plan = Plan::default();
    for descriptor in descriptors {
        plan.add(&doc, &mut ids, descriptor, opts)?;
    }

    if plan.report.is_noop() {
        return Ok((text.to_string(), plan.report));
    }

    let report = plan.report.clone();
    let out = plan.into_edits(&doc, text)?.apply(text)?;
    verify(&out, &report)?;
    tracing::info!(
        "Added {} file(s), {} group(s)",
        report.added.len(),
        report.created_groups.len()
    );
    Ok((out, report))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GroupRef {
    Existing(ObjectId),
    Planned(usize),
}

#[derive(Debug, Default)]
struct Plan {
    file_refs: Vec<FileReferenceEntry>,
    build_files: Vec<BuildFileEntry>,
    /// Appends to existing lists, in queue order.
    members: Vec<(ObjectId, &'static str, MemberItem)>,
    groups: Vec<(GroupEntry, GroupRef)>,
    claimed: HashSet<(ObjectId, String)>,
    report: AddReport,
}

impl Plan {
    fn add(
        &mut self,
        doc: &Document,
        ids: &mut IdGenerator,
        desc: &FileDescriptor,
        opts: &AddOptions,
    ) -> Result<(), CoreError> {
        let group = self.group_for(doc, ids, &desc.group, opts.create_groups)?;
        let group_id = self.group_id(&group);

        if let Some(existing) = self.existing_file(doc, &group, desc)? {
            match opts.on_existing {
                OnExisting::Fail => {
                    return Err(CoreError::DuplicatePath {
                        path: desc.path.clone(),
                        group: desc.group.clone(),
                    })
                }
                OnExisting::Skip => {
                    tracing::warn!("Skipping {}: already in group {}", desc.path, desc.group);
                    self.report.skipped.push(SkippedFile {
                        path: desc.path.clone(),
                        group: group_id,
                        existing,
                    });
                    return Ok(());
                }
            }
        }

        let file_type = FileType::from_path(&desc.path);
        let phases = phases_for(doc, desc, file_type)?;

        let file_ref = FileReferenceEntry {
            id: ids.new_id(&format!("PBXFileReference:{group_id}/{}", desc.path))?,
            path: desc.path.clone(),
            comment: desc.label().to_string(),
            file_type: file_type.last_known,
        };
        self.claimed.insert((group_id.clone(), desc.path.clone()));
        self.push_child(&group, file_ref.member());

        let mut memberships = Vec::new();
        for (phase, kind) in phases {
            let build_file = BuildFileEntry {
                id: ids.new_id(&format!("PBXBuildFile:{phase}/{}", file_ref.id))?,
                file_ref: file_ref.id.clone(),
                comment: desc.label().to_string(),
                phase: kind,
            };
            self.members.push((phase.clone(), "files", build_file.member()));
            memberships.push(PhaseMembership {
                phase,
                build_file: build_file.id.clone(),
            });
            self.build_files.push(build_file);
        }

        self.report.added.push(AddedFile {
            path: desc.path.clone(),
            group: group_id,
            file_ref: file_ref.id.clone(),
            build_files: memberships,
        });
        self.file_refs.push(file_ref);
        Ok(())
    }

    fn group_for(
        &mut self,
        doc: &Document,
        ids: &mut IdGenerator,
        selector: &str,
        create: bool,
    ) -> Result<GroupRef, CoreError> {
        let (existing, missing) = match resolve_group(doc, selector)? {
            GroupMatch::Found(id) => return Ok(GroupRef::Existing(id)),
            GroupMatch::Partial { existing, missing } => (existing, missing),
        };
        if !create {
            return Err(CoreError::structural(format!(
                "group '{selector}' (missing '{}'; enable group creation to add it)",
                missing.join("/")
            )));
        }

        let mut parent = GroupRef::Existing(existing);
        for component in missing {
            if let Some(idx) = self
                .groups
                .iter()
                .position(|(entry, p)| *p == parent && entry.path == component)
            {
                parent = GroupRef::Planned(idx);
                continue;
            }
            let parent_id = self.group_id(&parent);
            let entry = GroupEntry {
                id: ids.new_id(&format!("PBXGroup:{parent_id}/{component}"))?,
                path: component,
                children: Vec::new(),
            };
            self.report.created_groups.push(CreatedGroup {
                id: entry.id.clone(),
                path: entry.path.clone(),
                parent: parent_id,
            });
            self.push_child(&parent, entry.member());
            self.groups.push((entry, parent));
            parent = GroupRef::Planned(self.groups.len() - 1);
        }
        Ok(parent)
    }

    fn group_id(&self, group: &GroupRef) -> ObjectId {
        match group {
            GroupRef::Existing(id) => id.clone(),
            GroupRef::Planned(idx) => self.groups[*idx].0.id.clone(),
        }
    }

    fn push_child(&mut self, group: &GroupRef, item: MemberItem) {
        match group {
            GroupRef::Existing(id) => self.members.push((id.clone(), "children", item)),
            GroupRef::Planned(idx) => self.groups[*idx].0.children.push(item),
        }
    }

    /// A file reference with the same path already in the group, either in
    /// the manifest or earlier in this batch.
    fn existing_file(
        &self,
        doc: &Document,
        group: &GroupRef,
        desc: &FileDescriptor,
    ) -> Result<Option<ObjectId>, CoreError> {
        let group_id = self.group_id(group);
        if self.claimed.contains(&(group_id.clone(), desc.path.clone())) {
            let planned = self
                .report
                .added
                .iter()
                .find(|a| a.group == group_id && a.path == desc.path)
                .map(|a| a.file_ref.clone())
                .unwrap_or_else(|| group_id.clone());
            return Ok(Some(planned));
        }
        let GroupRef::Existing(id) = group else {
            return Ok(None);
        };
        let Some(children) = doc.object(id.as_str())?.list("children") else {
            return Ok(None);
        };
        Ok(children
            .ids()
            .flat_map(|child| doc.definitions(child))
            .find(|o| o.isa() == Some("PBXFileReference") && o.scalar("path") == Some(desc.path.as_str()))
            .map(|o| o.id.clone()))
    }

    fn into_edits(self, doc: &Document, text: &str) -> Result<EditBatch, CoreError> {
        let mut batch = EditBatch::default();

        let flat: [(&str, Vec<String>); 3] = [
            ("PBXBuildFile", self.build_files.iter().map(Render::render).collect()),
            ("PBXFileReference", self.file_refs.iter().map(Render::render).collect()),
            ("PBXGroup", self.groups.iter().map(|(g, _)| g.render()).collect()),
        ];
        for (section, entries) in flat {
            if entries.is_empty() {
                continue;
            }
            let point = locate(doc, text, Anchor::Section(section))?;
            batch.insert(point.offset, entries.concat());
        }

        let mut lists: Vec<((ObjectId, &'static str), Vec<String>)> = Vec::new();
        for (owner, key, item) in &self.members {
            let rendered = item.render();
            match lists.iter_mut().find(|(k, _)| k.0 == *owner && k.1 == *key) {
                Some((_, items)) => items.push(rendered),
                None => lists.push(((owner.clone(), *key), vec![rendered])),
            }
        }
        for ((owner, key), items) in lists {
            let point = locate(
                doc,
                text,
                Anchor::List {
                    owner: owner.as_str(),
                    key,
                },
            )?;
            if let Some(at) = point.separator_at {
                batch.insert(at, ",");
            }
            batch.insert(point.offset, point.splice(&items));
        }
        Ok(batch)
    }
}

/// Build phases a descriptor joins.
///
/// An explicit phase id is used as given, whatever the file type. Target
/// selectors are followed to the phase the file type calls for, and files
/// that no phase builds (headers, docs) join none.
fn phases_for(
    doc: &Document,
    desc: &FileDescriptor,
    file_type: FileType,
) -> Result<Vec<(ObjectId, PhaseKind)>, CoreError> {
    let mut phases: Vec<(ObjectId, PhaseKind)> = Vec::new();
    if desc.targets.is_empty() {
        if let Some(kind) = file_type.phase {
            let target = infer_target(doc, desc.kind)?;
            phases.push((resolve_phase(doc, target.as_str(), kind)?, kind));
        }
        return Ok(phases);
    }

    for selector in &desc.targets {
        let resolved = match explicit_phase(doc, selector)? {
            Some(found) => Some(found),
            None => match file_type.phase {
                Some(kind) => Some((resolve_phase(doc, selector, kind)?, kind)),
                None => None,
            },
        };
        match resolved {
            Some(phase) if !phases.contains(&phase) => phases.push(phase),
            Some(_) => {}
            None => tracing::warn!(
                "{} ({}) is not built by any phase; ignoring target {selector}",
                desc.path,
                file_type.last_known
            ),
        }
    }
    Ok(phases)
}

fn explicit_phase(doc: &Document, selector: &str) -> Result<Option<(ObjectId, PhaseKind)>, CoreError> {
    if !doc.contains(selector) {
        return Ok(None);
    }
    let object = doc.object(selector)?;
    if !object.is_build_phase() {
        return Ok(None);
    }
    match object.isa().and_then(PhaseKind::from_isa) {
        Some(kind) => Ok(Some((object.id.clone(), kind))),
        None => Err(CoreError::structural(format!(
            "sources or resources phase {selector} (found {})",
            object.isa().unwrap_or("untyped")
        ))),
    }
}

fn sites<'i>(index: &'i HashMap<String, Vec<RefSite>>, id: &ObjectId) -> &'i [RefSite] {
    index.get(id.as_str()).map(Vec::as_slice).unwrap_or_default()
}

/// Check the post-conditions of an add against the re-parsed manifest.
fn verify(text: &str, report: &AddReport) -> Result<(), CoreError> {
    let doc = Document::parse(text)?;
    doc.ensure_well_formed()?;
    let index = doc.reference_index();
    let objects = doc.objects();

    let defined_as = |id: &ObjectId, isa: &str| -> Result<(), CoreError> {
        match doc.definitions(id.as_str()).as_slice() {
            [only] if only.isa() == Some(isa) => Ok(()),
            defs => Err(CoreError::IntegrityViolation(format!(
                "{id} should be defined once as {isa}, found {} definition(s)",
                defs.len()
            ))),
        }
    };

    for group in &report.created_groups {
        defined_as(&group.id, "PBXGroup")?;
        match sites(&index, &group.id) {
            [site] if site.key == "children" && objects[site.owner].id == group.parent => {}
            other => {
                return Err(CoreError::IntegrityViolation(format!(
                    "group {} should be a child of {} only, found {} reference(s)",
                    group.id,
                    group.parent,
                    other.len()
                )))
            }
        }
    }

    for added in &report.added {
        defined_as(&added.file_ref, "PBXFileReference")?;
        let refs = sites(&index, &added.file_ref);
        let in_group = refs
            .iter()
            .filter(|s| s.key == "children" && objects[s.owner].id == added.group)
            .count();
        let from_build_files = refs
            .iter()
            .filter(|s| s.key == "fileRef" && objects[s.owner].isa() == Some("PBXBuildFile"))
            .count();
        if in_group != 1
            || from_build_files != added.build_files.len()
            || refs.len() != in_group + from_build_files
        {
            return Err(CoreError::IntegrityViolation(format!(
                "{} ({}) has {} group membership(s) and {} build file(s), expected 1 and {}",
                added.file_ref,
                added.path,
                in_group,
                from_build_files,
                added.build_files.len()
            )));
        }

        for membership in &added.build_files {
            defined_as(&membership.build_file, "PBXBuildFile")?;
            let build_file = doc.object(membership.build_file.as_str())?;
            if build_file.scalar("fileRef") != Some(added.file_ref.as_str()) {
                return Err(CoreError::IntegrityViolation(format!(
                    "build file {} does not resolve to {}",
                    membership.build_file, added.file_ref
                )));
            }
            match sites(&index, &membership.build_file) {
                [site] if site.key == "files" && objects[site.owner].id == membership.phase => {}
                other => {
                    return Err(CoreError::IntegrityViolation(format!(
                        "build file {} should be in phase {} only, found {} reference(s)",
                        membership.build_file,
                        membership.phase,
                        other.len()
                    )))
                }
            }
        }
    }
    Ok(())
}
