use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::{Record, Value};

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "\"{v}\""),
            Value::Binary(v) => write!(f, "0x{}", v.iter().map(|b| format!("{b:02x}")).join("")),
            Value::List(values) => write!(f, "[{}]", values.iter().format(", ")),
            Value::Record(record) => write!(f, "{record}"),
        }
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter()
                .format_with(", ", |(name, value), g| g(&format_args!("{name}: {value}")))
        )
    }
}
