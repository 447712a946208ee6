//! Structural model of a `project.pbxproj` manifest.
//!
//! Only the subset needed for safe edits is modelled: the `objects`
//! dictionary, each object's top-level fields, list items with their
//! labels, and the `/* Begin X section */` markers. Every node carries the
//! byte span it was parsed from so edits can be spliced into the original
//! text without re-serializing anything else.

mod lexer;
mod parser;

use std::collections::HashMap;
use std::ops::Range;

use crate::error::CoreError;
use crate::model::ObjectId;

pub(crate) use lexer::line_of;

/// A `/* Begin <name> section */ ... /* End <name> section */` block.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub begin: Range<usize>,
    pub end: Range<usize>,
}

/// One entry of the `objects` dictionary.
#[derive(Debug, Clone)]
pub struct Object {
    pub id: ObjectId,
    pub comment: Option<String>,
    /// From the key through the terminating `;`.
    pub span: Range<usize>,
    /// The `{ ... }` value.
    pub body: Range<usize>,
    pub section: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone)]
pub enum FieldValue {
    Scalar(Scalar),
    List(List),
    Dict(Range<usize>),
}

#[derive(Debug, Clone)]
pub struct Scalar {
    pub value: String,
    pub span: Range<usize>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct List {
    /// Offset of `(`.
    pub open: usize,
    /// Offset of the closing `)`.
    pub close: usize,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone)]
pub struct ListItem {
    /// `None` for nested dictionaries or lists.
    pub value: Option<String>,
    pub value_span: Range<usize>,
    pub comment: Option<String>,
    /// Value, label and trailing comma.
    pub span: Range<usize>,
    /// Whether a `,` follows the item.
    pub terminated: bool,
}

/// A list closed with `);` before its last item: the leftovers of an
/// insertion that spliced a new line after the closing parenthesis.
#[derive(Debug, Clone)]
pub struct Malformation {
    pub owner: ObjectId,
    pub key: String,
    /// The stray `);`.
    pub span: Range<usize>,
    /// The item before the terminator lacks its own comma.
    pub needs_comma: bool,
}

/// Where an id is mentioned outside of its own definition.
#[derive(Debug, Clone)]
pub struct RefSite {
    /// Index of the owning object in [`Document::objects`].
    pub owner: usize,
    pub key: String,
    pub kind: SiteKind,
    pub value_span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    Item { index: usize },
    Scalar,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    sections: Vec<Section>,
    objects: Vec<Object>,
    root_object: Option<ObjectId>,
    malformations: Vec<Malformation>,
    by_id: HashMap<ObjectId, Vec<usize>>,
}

impl Document {
    pub fn parse(src: &str) -> Result<Self, CoreError> {
        parser::Parser::new(src)?.parse()
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        for (idx, object) in self.objects.iter().enumerate() {
            self.by_id.entry(object.id.clone()).or_default().push(idx);
        }
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn malformations(&self) -> &[Malformation] {
        &self.malformations
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(&ObjectId::from(id))
    }

    /// Every definition of `id`; more than one means the manifest is corrupt.
    pub fn definitions(&self, id: &str) -> Vec<&Object> {
        self.by_id
            .get(&ObjectId::from(id))
            .map(|idxs| idxs.iter().map(|&i| &self.objects[i]).collect())
            .unwrap_or_default()
    }

    /// The single definition of `id`.
    pub fn object(&self, id: &str) -> Result<&Object, CoreError> {
        match self.definitions(id).as_slice() {
            [] => Err(CoreError::structural(format!("object {id}"))),
            [only] => Ok(only),
            many => Err(CoreError::IntegrityViolation(format!(
                "object {id} is defined {} times (run `pbxmend repair`)",
                many.len()
            ))),
        }
    }

    pub fn objects_with_isa<'d>(&'d self, isa: &'d str) -> impl Iterator<Item = &'d Object> + 'd {
        self.objects.iter().filter(move |o| o.isa() == Some(isa))
    }

    /// The PBXProject object named by `rootObject`.
    pub fn project(&self) -> Result<&Object, CoreError> {
        let root = self
            .root_object
            .as_ref()
            .ok_or_else(|| CoreError::structural("rootObject"))?;
        let project = self.object(root.as_str())?;
        if project.isa() != Some("PBXProject") {
            return Err(CoreError::structural(format!(
                "PBXProject at rootObject {root}"
            )));
        }
        Ok(project)
    }

    /// Refuse to edit a manifest with known syntax damage.
    pub fn ensure_well_formed(&self) -> Result<(), CoreError> {
        match self.malformations.first() {
            None => Ok(()),
            Some(m) => Err(CoreError::IntegrityViolation(format!(
                "{}.{} is terminated early ({} malformed list(s); run `pbxmend repair`)",
                m.owner,
                m.key,
                self.malformations.len()
            ))),
        }
    }

    /// Groups whose `children` include `id`.
    pub fn parent_groups(&self, id: &str) -> Vec<&Object> {
        self.objects
            .iter()
            .filter(|o| o.is_group())
            .filter(|o| o.list("children").is_some_and(|l| l.contains(id)))
            .collect()
    }

    /// Index of every list item and scalar value, keyed by its text.
    /// Lookups by object id yield all sites that point at that object.
    pub fn reference_index(&self) -> HashMap<String, Vec<RefSite>> {
        let mut index: HashMap<String, Vec<RefSite>> = HashMap::new();
        for (owner, object) in self.objects.iter().enumerate() {
            for field in &object.fields {
                match &field.value {
                    FieldValue::Scalar(scalar) => {
                        index.entry(scalar.value.clone()).or_default().push(RefSite {
                            owner,
                            key: field.key.clone(),
                            kind: SiteKind::Scalar,
                            value_span: scalar.span.clone(),
                        });
                    }
                    FieldValue::List(list) => {
                        for (i, item) in list.items.iter().enumerate() {
                            if let Some(value) = &item.value {
                                index.entry(value.clone()).or_default().push(RefSite {
                                    owner,
                                    key: field.key.clone(),
                                    kind: SiteKind::Item { index: i },
                                    value_span: item.value_span.clone(),
                                });
                            }
                        }
                    }
                    FieldValue::Dict(_) => {}
                }
            }
        }
        index
    }

    /// Sites referencing `id`, excluding `isa` and similar non-reference fields
    /// by construction (they never hold object ids).
    pub fn references_to(&self, id: &str) -> Vec<RefSite> {
        self.reference_index().remove(id).unwrap_or_default()
    }

    /// Object keys plus every value token, used to reserve identifiers.
    pub fn all_tokens(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().flat_map(|o| {
            std::iter::once(o.id.as_str()).chain(o.fields.iter().flat_map(|f| {
                let values: Vec<&str> = match &f.value {
                    FieldValue::Scalar(s) => vec![s.value.as_str()],
                    FieldValue::List(l) => l.items.iter().filter_map(|i| i.value.as_deref()).collect(),
                    FieldValue::Dict(_) => Vec::new(),
                };
                values
            }))
        })
    }
}

impl Object {
    pub fn isa(&self) -> Option<&str> {
        self.scalar("isa")
    }

    pub fn is_group(&self) -> bool {
        matches!(self.isa(), Some("PBXGroup") | Some("PBXVariantGroup"))
    }

    pub fn is_build_phase(&self) -> bool {
        self.isa().is_some_and(|isa| isa.ends_with("BuildPhase"))
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    pub fn scalar_field(&self, key: &str) -> Option<&Scalar> {
        match self.field(key)? {
            FieldValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.scalar_field(key).map(|s| s.value.as_str())
    }

    pub fn list(&self, key: &str) -> Option<&List> {
        match self.field(key)? {
            FieldValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// `name`, then `path`, then the label, then the id.
    pub fn display_name(&self) -> &str {
        self.scalar("name")
            .or_else(|| self.scalar("path"))
            .or(self.comment.as_deref())
            .unwrap_or(self.id.as_str())
    }
}

impl List {
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.value.as_deref() == Some(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|i| i.value.as_deref())
    }
}
