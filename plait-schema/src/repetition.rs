use std::fmt::{Display, Formatter};

/// How many times a field may occur within its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Repetition {
    /// Exactly once.
    #[default]
    Required,
    /// Zero or one time.
    Optional,
    /// Zero or more times.
    Repeated,
}

impl Repetition {
    /// Whether a value occurrence at this node raises the definition level.
    pub fn is_definable(&self) -> bool {
        !matches!(self, Repetition::Required)
    }

    /// Whether this node starts a new repetition depth.
    pub fn is_repeated(&self) -> bool {
        matches!(self, Repetition::Repeated)
    }

    /// The (definition, repetition) level increments contributed by a node with this marker.
    pub fn level_increments(&self) -> (u16, u16) {
        (u16::from(self.is_definable()), u16::from(self.is_repeated()))
    }
}

impl Display for Repetition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Repetition::Required => write!(f, "required"),
            Repetition::Optional => write!(f, "optional"),
            Repetition::Repeated => write!(f, "repeated"),
        }
    }
}
