use serde::Serialize;

use crate::document::{Document, Object, SiteKind};
use crate::error::CoreError;
use crate::locate::require_group;
use crate::model::ObjectId;

use super::{whole_lines, EditBatch};

#[derive(Debug, Clone, Serialize)]
pub struct RemoveReport {
    pub path: String,
    pub group: ObjectId,
    pub file_ref: ObjectId,
    pub build_files: Vec<ObjectId>,
    /// List entries removed across groups and build phases.
    pub memberships: usize,
}

/// Remove the file at `path` from `group`, undoing what an add created.
///
/// Target memberships are read from the manifest: every PBXBuildFile whose
/// `fileRef` is the file goes too, with every list entry naming either of
/// them. A scalar reference anywhere else (a target's `productReference`,
/// say) is left for the user to resolve and fails the removal.
pub fn remove_file(text: &str, group: &str, path: &str) -> Result<(String, RemoveReport), CoreError> {
    let doc = Document::parse(text)?;
    doc.ensure_well_formed()?;

    let group_id = require_group(&doc, group)?;
    let file_ref = find_in_group(&doc, &group_id, group, path)?;

    let index = doc.reference_index();
    let objects = doc.objects();
    let mut doomed: Vec<&ObjectId> = vec![&file_ref.id];
    for site in index.get(file_ref.id.as_str()).into_iter().flatten() {
        let owner = &objects[site.owner];
        if site.key == "fileRef" && owner.isa() == Some("PBXBuildFile") && !doomed.contains(&&owner.id) {
            doomed.push(&owner.id);
        }
    }

    let mut batch = EditBatch::default();
    let mut memberships = 0;
    for id in &doomed {
        for definition in doc.definitions(id.as_str()) {
            batch.delete(whole_lines(text, definition.span.clone()));
        }
        for site in index.get(id.as_str()).into_iter().flatten() {
            let owner = &objects[site.owner];
            if doomed.contains(&&owner.id) {
                continue;
            }
            match site.kind {
                SiteKind::Item { index: item } => {
                    let Some(list) = owner.list(&site.key) else {
                        continue;
                    };
                    batch.delete(whole_lines(text, list.items[item].span.clone()));
                    memberships += 1;
                }
                SiteKind::Scalar => {
                    return Err(CoreError::IntegrityViolation(format!(
                        "{id} is still referenced by {}.{} ({})",
                        owner.id,
                        site.key,
                        owner.display_name()
                    )))
                }
            }
        }
    }

    let out = batch.apply(text)?;
    let after = Document::parse(&out)?;
    for id in &doomed {
        if after.contains(id.as_str()) || !after.references_to(id.as_str()).is_empty() {
            return Err(CoreError::IntegrityViolation(format!(
                "{id} survived removal of {path}"
            )));
        }
    }

    let report = RemoveReport {
        path: path.to_string(),
        group: group_id,
        file_ref: file_ref.id.clone(),
        build_files: doomed[1..].iter().map(|id| (*id).clone()).collect(),
        memberships,
    };
    tracing::info!(
        "Removed {} ({} build file(s), {} membership(s))",
        report.path,
        report.build_files.len(),
        report.memberships
    );
    Ok((out, report))
}

fn find_in_group<'d>(
    doc: &'d Document,
    group_id: &ObjectId,
    selector: &str,
    path: &str,
) -> Result<&'d Object, CoreError> {
    let not_in_group = || CoreError::NotInGroup {
        path: path.to_string(),
        group: selector.to_string(),
    };
    let children = doc.object(group_id.as_str())?.list("children").ok_or_else(not_in_group)?;
    let matches: Vec<&Object> = children
        .ids()
        .flat_map(|child| doc.definitions(child))
        .filter(|o| o.isa() == Some("PBXFileReference") && o.scalar("path") == Some(path))
        .collect();
    match matches.as_slice() {
        [] => Err(not_in_group()),
        [only] => Ok(only),
        many => Err(CoreError::IntegrityViolation(format!(
            "{path} appears {} times in group {selector} (run `pbxmend repair`)",
            many.len()
        ))),
    }
}
