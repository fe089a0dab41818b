use std::fmt::{Display, Formatter};

use plait_scalar::Value;

/// The repetition and definition level of one value occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Levels {
    pub rep: u16,
    pub def: u16,
}

impl Levels {
    pub fn new(rep: u16, def: u16) -> Self {
        Self { rep, def }
    }

    /// True if this occurrence starts a new record.
    pub fn starts_record(&self) -> bool {
        self.rep == 0
    }
}

/// One occurrence in a column: its levels and, when `def` reaches the column's maximum, its
/// value. Placeholder occurrences carry [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct Triple {
    pub rep: u16,
    pub def: u16,
    pub value: Value,
}

impl Triple {
    pub fn new(rep: u16, def: u16, value: Value) -> Self {
        Self { rep, def, value }
    }

    /// A placeholder for an absent or empty ancestor.
    pub fn null(rep: u16, def: u16) -> Self {
        Self::new(rep, def, Value::Null)
    }

    pub fn levels(&self) -> Levels {
        Levels::new(self.rep, self.def)
    }
}

impl Display for Triple {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(r={}, d={}, {})", self.rep, self.def, self.value)
    }
}
