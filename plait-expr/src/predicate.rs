use std::fmt::{Display, Formatter};

use plait_scalar::{Record, Value};
use plait_schema::{FieldName, FieldPath};

use crate::ColumnPredicate;

/// A boolean combination of column predicates.
#[derive(Debug, Clone)]
pub enum Predicate {
    Column(FieldPath, ColumnPredicate),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

/// Test the leaf column at `path`.
///
/// For a column below a repeated field the test holds if it holds for any occurrence in the
/// record. A record with no occurrence is tested once against [`Value::Null`].
///
/// ```
/// use plait_expr::{column, eq, and, gt};
///
/// let predicate = and(column("engine.type", eq("ELECTRIC")), column("year", gt(2010)));
/// assert_eq!(predicate.to_string(), "(engine.type = \"ELECTRIC\" and year > 2010)");
/// ```
pub fn column<P: Into<FieldPath>>(path: P, predicate: ColumnPredicate) -> Predicate {
    Predicate::Column(path.into(), predicate)
}

pub fn and(lhs: Predicate, rhs: Predicate) -> Predicate {
    Predicate::And(Box::new(lhs), Box::new(rhs))
}

pub fn or(lhs: Predicate, rhs: Predicate) -> Predicate {
    Predicate::Or(Box::new(lhs), Box::new(rhs))
}

pub fn not(predicate: Predicate) -> Predicate {
    Predicate::Not(Box::new(predicate))
}

/// Combine predicates with `and`, returning `None` if there are none.
pub fn and_all<I: IntoIterator<Item = Predicate>>(predicates: I) -> Option<Predicate> {
    predicates.into_iter().reduce(and)
}

impl Predicate {
    /// The distinct column paths this predicate tests, in first-use order.
    pub fn references(&self) -> Vec<&FieldPath> {
        let mut paths = Vec::new();
        self.collect_references(&mut paths);
        paths
    }

    fn collect_references<'a>(&'a self, paths: &mut Vec<&'a FieldPath>) {
        match self {
            Predicate::Column(path, _) => {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
            Predicate::And(lhs, rhs) | Predicate::Or(lhs, rhs) => {
                lhs.collect_references(paths);
                rhs.collect_references(paths);
            }
            Predicate::Not(child) => child.collect_references(paths),
        }
    }

    /// Evaluate against an assembled record.
    ///
    /// A path is followed through nested records and every element of a list on the way. The
    /// result is the same as evaluating the predicate against the record's columns.
    pub fn evaluate(&self, record: &Record) -> bool {
        match self {
            Predicate::Column(path, predicate) => {
                let mut values = Vec::new();
                collect_values(record, path.parts(), &mut values);
                if values.is_empty() {
                    predicate.evaluate(&Value::Null)
                } else {
                    values.into_iter().any(|v| predicate.evaluate(v))
                }
            }
            Predicate::And(lhs, rhs) => lhs.evaluate(record) && rhs.evaluate(record),
            Predicate::Or(lhs, rhs) => lhs.evaluate(record) || rhs.evaluate(record),
            Predicate::Not(child) => !child.evaluate(record),
        }
    }
}

fn collect_values<'a>(record: &'a Record, parts: &[FieldName], out: &mut Vec<&'a Value>) {
    let Some((head, rest)) = parts.split_first() else {
        return;
    };
    if let Some(child) = record.get(head) {
        collect_value(child, rest, out);
    }
}

fn collect_value<'a>(value: &'a Value, rest: &[FieldName], out: &mut Vec<&'a Value>) {
    match value {
        Value::Null => {}
        Value::List(elements) => elements.iter().for_each(|e| collect_value(e, rest, out)),
        Value::Record(record) => collect_values(record, rest, out),
        leaf => {
            if rest.is_empty() {
                out.push(leaf);
            }
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Column(path, predicate) => write!(f, "{path} {predicate}"),
            Predicate::And(lhs, rhs) => write!(f, "({lhs} and {rhs})"),
            Predicate::Or(lhs, rhs) => write!(f, "({lhs} or {rhs})"),
            Predicate::Not(child) => write!(f, "not {child}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{eq, gt, is_null, lt};

    fn car(kind: &str, services: Vec<i64>) -> Record {
        Record::new()
            .with("make", "Tesla")
            .with("engine", Record::new().with("type", kind))
            .with(
                "serviceHistory",
                Record::new().with(
                    "service",
                    services
                        .into_iter()
                        .map(|date| Record::new().with("date", date))
                        .collect::<Vec<_>>(),
                ),
            )
    }

    #[test]
    fn references_are_distinct() {
        let predicate = or(
            column("engine.type", eq("ELECTRIC")),
            and(column("make", eq("Tesla")), not(column("engine.type", is_null()))),
        );
        let refs: Vec<String> = predicate.references().iter().map(|p| p.to_string()).collect();
        assert_eq!(refs, vec!["engine.type", "make"]);
    }

    #[test]
    fn display() {
        let predicate = not(or(column("a", lt(1)), column("b.c", is_null())));
        assert_eq!(predicate.to_string(), "not (a < 1 or b.c is null)");
    }

    #[test]
    fn evaluate_record() {
        let electric = car("ELECTRIC", vec![1, 5]);
        assert!(column("engine.type", eq("ELECTRIC")).evaluate(&electric));
        assert!(!column("engine.type", eq("PETROL")).evaluate(&electric));
        // Any occurrence.
        assert!(column("serviceHistory.service.date", gt(4i64)).evaluate(&electric));
        assert!(!column("serviceHistory.service.date", gt(5i64)).evaluate(&electric));
        // No occurrence is a single null.
        let unserviced = car("PETROL", vec![]);
        assert!(column("serviceHistory.service.date", is_null()).evaluate(&unserviced));
        assert!(!column("serviceHistory.service.date", gt(0i64)).evaluate(&unserviced));
        assert!(and_all([]).is_none());
        assert!(
            and_all([column("make", eq("Tesla")), column("engine.type", eq("PETROL"))])
                .is_some_and(|p| p.evaluate(&unserviced))
        );
    }
}
