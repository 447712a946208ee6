//! Insertion points and selector resolution.
//!
//! Containers are always resolved through object ids: a group path is
//! walked child by child from the project's main group, and a target name is
//! matched against `PBXNativeTarget.name` before following its
//! `buildPhases`. Nothing here searches for text near a known neighbour.

use crate::document::{Document, Object};
use crate::error::CoreError;
use crate::model::{FileKind, ObjectId, PhaseKind};
use crate::render::ENTRY_INDENT;

/// Something new entries can be appended to.
#[derive(Debug, Clone, Copy)]
pub enum Anchor<'a> {
    /// A flat `/* Begin <name> section */` block.
    Section(&'a str),
    /// A list field of a single object, e.g. a group's `children`.
    List { owner: &'a str, key: &'a str },
}

impl std::fmt::Display for Anchor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anchor::Section(name) => write!(f, "{name} section"),
            Anchor::List { owner, key } => write!(f, "{owner}.{key}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// One entry per line, each prefixed with `indent`.
    Lines { indent: String },
    /// `()` or `(A, B)` on one line: items are broken onto their own lines.
    Inline {
        item_indent: String,
        close_indent: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPoint {
    pub offset: usize,
    pub layout: Layout,
    /// Offset where a `,` must be added because the current last item has none.
    pub separator_at: Option<usize>,
}

impl InsertionPoint {
    /// Text for appending already-rendered items at this point.
    pub fn splice(&self, items: &[String]) -> String {
        let mut out = String::new();
        match &self.layout {
            Layout::Lines { indent } => {
                for item in items {
                    out.push_str(indent);
                    out.push_str(item);
                    out.push('\n');
                }
            }
            Layout::Inline {
                item_indent,
                close_indent,
            } => {
                for item in items {
                    out.push('\n');
                    out.push_str(item_indent);
                    out.push_str(item);
                }
                out.push('\n');
                out.push_str(close_indent);
            }
        }
        out
    }
}

/// Find where new entries for `anchor` go: the end of the section or list.
pub fn locate(doc: &Document, text: &str, anchor: Anchor<'_>) -> Result<InsertionPoint, CoreError> {
    let point = match anchor {
        Anchor::Section(name) => {
            let section = doc
                .section(name)
                .ok_or_else(|| CoreError::structural(anchor.to_string()))?;
            InsertionPoint {
                offset: line_start(text, section.end.start),
                layout: Layout::Lines {
                    indent: ENTRY_INDENT.to_string(),
                },
                separator_at: None,
            }
        }
        Anchor::List { owner, key } => {
            let object = doc.object(owner)?;
            let list = object
                .list(key)
                .ok_or_else(|| CoreError::structural(anchor.to_string()))?;

            let separator_at = list
                .items
                .last()
                .filter(|item| !item.terminated)
                .map(|item| item.span.end);

            let close_line = line_start(text, list.close);
            if text[close_line..list.close].trim().is_empty() {
                let indent = list
                    .items
                    .iter()
                    .find(|item| {
                        text[line_start(text, item.span.start)..item.span.start]
                            .trim()
                            .is_empty()
                    })
                    .map(|item| indent_of(text, item.span.start).to_string())
                    .unwrap_or_else(|| format!("{}\t", indent_of(text, list.close)));
                InsertionPoint {
                    offset: close_line,
                    layout: Layout::Lines { indent },
                    separator_at,
                }
            } else {
                let close_indent = indent_of(text, list.open).to_string();
                InsertionPoint {
                    offset: list.close,
                    layout: Layout::Inline {
                        item_indent: format!("{close_indent}\t"),
                        close_indent,
                    },
                    separator_at,
                }
            }
        }
    };
    tracing::debug!("Located {anchor} at byte {}", point.offset);
    Ok(point)
}

/// Result of walking a group path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupMatch {
    Found(ObjectId),
    /// The walk stopped at `existing`; `missing` components do not exist yet.
    Partial {
        existing: ObjectId,
        missing: Vec<String>,
    },
}

/// Resolve a group selector: an object id, or a `/`-separated path of group
/// `path`s (falling back to `name`s) from the project's main group.
pub fn resolve_group(doc: &Document, selector: &str) -> Result<GroupMatch, CoreError> {
    if doc.contains(selector) {
        let object = doc.object(selector)?;
        if !object.is_group() {
            return Err(CoreError::structural(format!(
                "group {selector} (object is {})",
                object.isa().unwrap_or("untyped")
            )));
        }
        return Ok(GroupMatch::Found(object.id.clone()));
    }

    let project = doc.project()?;
    let main = project
        .scalar("mainGroup")
        .ok_or_else(|| CoreError::structural("PBXProject.mainGroup"))?;
    let mut current = doc.object(main)?;

    let components: Vec<&str> = selector.split('/').filter(|c| !c.is_empty()).collect();
    for (depth, component) in components.iter().enumerate() {
        match child_group(doc, current, component)? {
            Some(next) => current = next,
            None => {
                return Ok(GroupMatch::Partial {
                    existing: current.id.clone(),
                    missing: components[depth..].iter().map(|c| c.to_string()).collect(),
                })
            }
        }
    }
    Ok(GroupMatch::Found(current.id.clone()))
}

/// Like [`resolve_group`] but the group must already exist.
pub fn require_group(doc: &Document, selector: &str) -> Result<ObjectId, CoreError> {
    match resolve_group(doc, selector)? {
        GroupMatch::Found(id) => Ok(id),
        GroupMatch::Partial { missing, .. } => Err(CoreError::structural(format!(
            "group '{selector}' (missing '{}')",
            missing.join("/")
        ))),
    }
}

fn child_group<'d>(
    doc: &'d Document,
    parent: &'d Object,
    component: &str,
) -> Result<Option<&'d Object>, CoreError> {
    let Some(children) = parent.list("children") else {
        return Ok(None);
    };
    let groups: Vec<&Object> = children
        .ids()
        .filter_map(|id| match doc.definitions(id).as_slice() {
            [only] if only.is_group() => Some(*only),
            _ => None,
        })
        .collect();

    for key in ["path", "name"] {
        let matches: Vec<&Object> = groups
            .iter()
            .copied()
            .filter(|g| g.scalar(key) == Some(component))
            .collect();
        match matches.len() {
            0 => continue,
            1 => return Ok(Some(matches[0])),
            n => {
                return Err(CoreError::AmbiguousAnchor {
                    anchor: format!("group '{component}' under {}", parent.id),
                    matches: n,
                })
            }
        }
    }
    Ok(None)
}

/// Resolve a target selector to the build phase of `kind`. The selector is a
/// build phase id, a target id, or a `PBXNativeTarget` name.
pub fn resolve_phase(doc: &Document, selector: &str, kind: PhaseKind) -> Result<ObjectId, CoreError> {
    if doc.contains(selector) {
        let object = doc.object(selector)?;
        if object.is_build_phase() {
            if object.isa() != Some(kind.isa()) {
                return Err(CoreError::structural(format!(
                    "{} phase {selector} (found {})",
                    kind.label(),
                    object.isa().unwrap_or("untyped")
                )));
            }
            return Ok(object.id.clone());
        }
        if object.isa() == Some("PBXNativeTarget") {
            return target_phase(doc, object, kind);
        }
    }

    let targets: Vec<&Object> = doc
        .objects_with_isa("PBXNativeTarget")
        .filter(|t| t.scalar("name") == Some(selector))
        .collect();
    match targets.as_slice() {
        [] => Err(CoreError::structural(format!("target '{selector}'"))),
        [target] => target_phase(doc, target, kind),
        many => Err(CoreError::AmbiguousAnchor {
            anchor: format!("target '{selector}'"),
            matches: many.len(),
        }),
    }
}

fn target_phase(doc: &Document, target: &Object, kind: PhaseKind) -> Result<ObjectId, CoreError> {
    let anchor = format!("{} phase of target {}", kind.label(), target.display_name());
    let phases: Vec<&Object> = target
        .list("buildPhases")
        .ok_or_else(|| CoreError::structural(anchor.clone()))?
        .ids()
        .filter_map(|id| match doc.definitions(id).as_slice() {
            [only] => Some(*only),
            _ => None,
        })
        .filter(|phase| phase.isa() == Some(kind.isa()))
        .collect();
    match phases.as_slice() {
        [] => Err(CoreError::structural(anchor)),
        [phase] => Ok(phase.id.clone()),
        many => Err(CoreError::AmbiguousAnchor {
            anchor,
            matches: many.len(),
        }),
    }
}

/// Pick the target a descriptor without explicit targets builds into.
pub fn infer_target(doc: &Document, kind: FileKind) -> Result<ObjectId, CoreError> {
    let is_test = |t: &&Object| {
        t.scalar("productType")
            .is_some_and(|p| p.contains("unit-test") || p.contains("ui-testing"))
    };
    let candidates: Vec<&Object> = match kind {
        FileKind::Test => {
            let unit: Vec<&Object> = doc
                .objects_with_isa("PBXNativeTarget")
                .filter(|t| t.scalar("productType").is_some_and(|p| p.contains("unit-test")))
                .collect();
            if unit.is_empty() {
                doc.objects_with_isa("PBXNativeTarget").filter(is_test).collect()
            } else {
                unit
            }
        }
        FileKind::Source => doc
            .objects_with_isa("PBXNativeTarget")
            .filter(|t| !is_test(t))
            .collect(),
    };
    let anchor = match kind {
        FileKind::Test => "test target",
        FileKind::Source => "product target",
    };
    match candidates.as_slice() {
        [] => Err(CoreError::structural(anchor)),
        [only] => Ok(only.id.clone()),
        many => Err(CoreError::AmbiguousAnchor {
            anchor: format!("{anchor} (pass an explicit target)"),
            matches: many.len(),
        }),
    }
}

pub(crate) fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Leading whitespace of the line containing `offset`.
pub(crate) fn indent_of(text: &str, offset: usize) -> &str {
    let start = line_start(text, offset);
    let line = &text[start..];
    let len = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..len]
}
