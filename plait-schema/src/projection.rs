//! A projection is the set of fields a read keeps, expressed as field paths.
//!
//! A path that stops at a group keeps the whole subtree below it; a longer path keeps only the
//! named branch. Paths are merged, so `["engine", "engine.type"]` keeps all of `engine`.

use std::collections::BTreeMap;

use plait_error::{PlaitResult, plait_bail};

use crate::{FieldName, FieldPath, GroupFields, NodeKind, Schema, SchemaNode};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Keep {
    All,
    Fields(BTreeMap<FieldName, Keep>),
}

impl Keep {
    fn insert(&mut self, parts: &[FieldName]) {
        let Keep::Fields(children) = self else {
            // Already keeping everything below this point.
            return;
        };
        match parts.split_first() {
            None => *self = Keep::All,
            Some((head, rest)) => children
                .entry(head.clone())
                .or_insert_with(|| Keep::Fields(BTreeMap::new()))
                .insert(rest),
        }
    }
}

/// The set of fields to keep when reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    root: Keep,
}

impl Projection {
    /// A projection keeping the given paths (and everything below them).
    pub fn new<I: IntoIterator<Item = FieldPath>>(paths: I) -> Self {
        let mut root = Keep::Fields(BTreeMap::new());
        for path in paths {
            root.insert(path.parts());
        }
        Self { root }
    }

    /// A projection keeping exactly the leaves of `requested`.
    pub fn from_schema(requested: &Schema) -> Self {
        Self::new(requested.leaves().into_iter().map(|c| c.path().clone()))
    }

    /// Apply this projection to `schema`, failing with a schema error if a kept name does not
    /// exist at its level.
    pub fn apply(&self, schema: &Schema) -> PlaitResult<Schema> {
        match &self.root {
            Keep::All => Ok(schema.clone()),
            Keep::Fields(keep) => {
                let fields = project_fields(schema.fields(), keep, &FieldPath::root())?;
                Schema::try_from_root(schema.root().with_fields(fields))
            }
        }
    }
}

fn project_fields(
    fields: &GroupFields,
    keep: &BTreeMap<FieldName, Keep>,
    parent: &FieldPath,
) -> PlaitResult<GroupFields> {
    if let Some(missing) = keep.keys().find(|name| fields.find_name(name).is_none()) {
        plait_bail!(Schema: "no field named {} in projection", parent.join(missing.clone()))
    }
    if keep.is_empty() {
        plait_bail!(Schema: "projection of {} keeps no fields", display_parent(parent))
    }

    let mut retained = Vec::with_capacity(keep.len());
    for field in fields.iter() {
        match keep.get(field.name()) {
            None => {}
            Some(Keep::All) => retained.push(field.clone()),
            Some(Keep::Fields(children)) => {
                retained.push(project_node(field, children, &parent.join(field.name().clone()))?)
            }
        }
    }
    GroupFields::try_new(retained)
}

fn project_node(
    node: &SchemaNode,
    keep: &BTreeMap<FieldName, Keep>,
    path: &FieldPath,
) -> PlaitResult<SchemaNode> {
    match node.kind() {
        NodeKind::Group(children) => Ok(node.with_fields(project_fields(children, keep, path)?)),
        NodeKind::Primitive(ptype) => {
            plait_bail!(Schema: "cannot select nested fields of {path}, it is a primitive {ptype}")
        }
    }
}

fn display_parent(path: &FieldPath) -> String {
    if path.is_root() {
        "the root".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{PType, Repetition};

    fn schema() -> Schema {
        Schema::try_new(
            "Car",
            [
                SchemaNode::required("make", PType::Utf8),
                SchemaNode::group(
                    "engine",
                    Repetition::Required,
                    [
                        SchemaNode::required("type", PType::Utf8),
                        SchemaNode::required("capacity", PType::F32),
                    ],
                )
                .unwrap(),
                SchemaNode::group(
                    "optionalExtra",
                    Repetition::Optional,
                    [SchemaNode::required("colour", PType::Utf8)],
                )
                .unwrap(),
            ],
        )
        .unwrap()
    }

    fn leaf_paths(schema: &Schema) -> Vec<String> {
        schema
            .leaves()
            .iter()
            .map(|c| c.path().to_string())
            .collect()
    }

    #[rstest]
    #[case(vec!["make"], vec!["make"])]
    #[case(vec!["engine.type"], vec!["engine.type"])]
    #[case(vec!["engine", "engine.type"], vec!["engine.type", "engine.capacity"])]
    #[case(vec!["engine.type", "engine"], vec!["engine.type", "engine.capacity"])]
    #[case(vec!["optionalExtra", "make"], vec!["make", "optionalExtra.colour"])]
    #[case(vec!["engine.capacity", "make", "engine.type"], vec!["make", "engine.type", "engine.capacity"])]
    fn keeps_original_order(#[case] keep: Vec<&str>, #[case] expected: Vec<&str>) {
        let projection = Projection::new(keep.into_iter().map(FieldPath::from));
        let projected = projection.apply(&schema()).unwrap();
        assert_eq!(leaf_paths(&projected), expected);
    }

    #[rstest]
    #[case(vec!["model"])]
    #[case(vec!["engine.fuel"])]
    #[case(vec!["make.first"])]
    #[case(vec![])]
    fn unknown_or_empty_is_schema_error(#[case] keep: Vec<&str>) {
        let err = Projection::new(keep.into_iter().map(FieldPath::from))
            .apply(&schema())
            .unwrap_err();
        assert!(matches!(err, plait_error::PlaitError::Schema(..)));
    }

    #[test]
    fn preserves_repetition() {
        let projected = Projection::new([FieldPath::from("optionalExtra.colour")])
            .apply(&schema())
            .unwrap();
        let extra = projected.fields().field("optionalExtra").unwrap();
        assert_eq!(extra.repetition(), Repetition::Optional);
        assert_eq!(projected.leaves()[0].max_def(), 1);
    }

    #[test]
    fn idempotent() {
        let projection = Projection::new([FieldPath::from("make"), FieldPath::from("engine.type")]);
        let once = projection.apply(&schema()).unwrap();
        let twice = projection.apply(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn root_path_keeps_everything() {
        assert_eq!(
            Projection::new([FieldPath::root()]).apply(&schema()).unwrap(),
            schema()
        );
    }
}
