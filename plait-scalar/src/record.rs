use plait_schema::{FieldName, FieldPath};

use crate::Value;

/// An ordered list of named values.
///
/// Field names are unique. Equality ignores field order, and a field that is missing on one side
/// equals a null or an empty list on the other. A record built by hand therefore compares equal to
/// the same record read back from a file, which always carries every field of its schema.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(FieldName, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style [`Record::insert`].
    pub fn with<N: Into<FieldName>, V: Into<Value>>(mut self, name: N, value: V) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, returning the previous value. A replaced field keeps its position.
    pub fn insert<N: Into<FieldName>, V: Into<Value>>(
        &mut self,
        name: N,
        value: V,
    ) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// Follow a path through nested records. Lists are not traversed.
    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        let (last, parents) = path.parts().split_last()?;
        let mut record = self;
        for name in parents {
            record = record.get(name)?.as_record()?;
        }
        record.get(last)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(n, _)| n.as_ref() == name)?;
        Some(self.fields.remove(idx).1)
    }

    /// This record without the field `name`.
    pub fn without(mut self, name: &str) -> Self {
        self.remove(name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &FieldName> + '_ {
        self.fields.iter().map(|(n, _)| n)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&FieldName, &Value)> + '_ {
        self.fields.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        fn covered_by(record: &Record, other: &Record) -> bool {
            record.iter().all(|(name, value)| match other.get(name) {
                Some(theirs) => theirs == value,
                None => match value {
                    Value::Null => true,
                    Value::List(elements) => elements.is_empty(),
                    _ => false,
                },
            })
        }
        covered_by(self, other) && covered_by(other, self)
    }
}

impl<N: Into<FieldName>, V: Into<Value>> FromIterator<(N, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (FieldName, Value);
    type IntoIter = std::vec::IntoIter<(FieldName, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
