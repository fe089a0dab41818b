//! Records from the Dremel paper, shared by the shredding and assembly tests.

use plait_scalar::{Record, Value};
use plait_schema::{PType, Repetition, Schema, SchemaNode};

/// The Dremel paper's `Document` schema.
pub fn document() -> Schema {
    Schema::try_new(
        "Document",
        [
            SchemaNode::required("DocId", PType::I64),
            SchemaNode::group(
                "Links",
                Repetition::Optional,
                [
                    SchemaNode::repeated("Backward", PType::I64),
                    SchemaNode::repeated("Forward", PType::I64),
                ],
            )
            .unwrap(),
            SchemaNode::group(
                "Name",
                Repetition::Repeated,
                [
                    SchemaNode::group(
                        "Language",
                        Repetition::Repeated,
                        [
                            SchemaNode::required("Code", PType::Utf8),
                            SchemaNode::optional("Country", PType::Utf8),
                        ],
                    )
                    .unwrap(),
                    SchemaNode::optional("Url", PType::Utf8),
                ],
            )
            .unwrap(),
        ],
    )
    .unwrap()
}

pub fn r1() -> Record {
    Record::new()
        .with("DocId", 10i64)
        .with("Links", Record::new().with("Forward", vec![20i64, 40, 60]))
        .with(
            "Name",
            vec![
                Record::new()
                    .with(
                        "Language",
                        vec![
                            Record::new().with("Code", "en-us").with("Country", "us"),
                            Record::new().with("Code", "en"),
                        ],
                    )
                    .with("Url", "http://A"),
                Record::new().with("Url", "http://B"),
                Record::new().with(
                    "Language",
                    vec![Record::new().with("Code", "en-gb").with("Country", "gb")],
                ),
            ],
        )
}

pub fn r2() -> Record {
    Record::new()
        .with("DocId", 20i64)
        .with(
            "Links",
            Record::new()
                .with("Backward", vec![10i64, 30])
                .with("Forward", vec![80i64]),
        )
        .with("Name", vec![Record::new().with("Url", "http://C")])
}

/// A document with an explicitly empty `Name` and no `Links`.
pub fn nameless() -> Record {
    Record::new()
        .with("DocId", 30i64)
        .with("Name", Vec::<Value>::new())
}
