use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use plait_scalar::Value;

use crate::Operator;

/// A test applied to the value of a single column.
#[derive(Debug, Clone)]
pub enum ColumnPredicate {
    /// Compare the value with a literal. A null value never matches.
    Compare(Operator, Value),
    IsNull,
    IsNotNull,
    /// An arbitrary function of the value.
    UserDefined(UserDefined),
}

impl ColumnPredicate {
    /// Wrap a function of the column value. `name` is only used for display.
    pub fn user_defined<N, F>(name: N, f: F) -> Self
    where
        N: Into<Arc<str>>,
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        ColumnPredicate::UserDefined(UserDefined {
            name: name.into(),
            f: Arc::new(f),
        })
    }

    pub fn evaluate(&self, value: &Value) -> bool {
        match self {
            ColumnPredicate::Compare(op, literal) => value
                .compare(literal)
                .is_some_and(|ordering| op.holds(ordering)),
            ColumnPredicate::IsNull => value.is_null(),
            ColumnPredicate::IsNotNull => !value.is_null(),
            ColumnPredicate::UserDefined(udf) => (udf.f)(value),
        }
    }
}

impl Display for ColumnPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnPredicate::Compare(op, literal) => write!(f, "{op} {literal}"),
            ColumnPredicate::IsNull => write!(f, "is null"),
            ColumnPredicate::IsNotNull => write!(f, "is not null"),
            ColumnPredicate::UserDefined(udf) => write!(f, "matches {}", udf.name),
        }
    }
}

/// A named function over a column value.
#[derive(Clone)]
pub struct UserDefined {
    name: Arc<str>,
    f: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl UserDefined {
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }
}

impl Debug for UserDefined {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDefined")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Create a new [`ColumnPredicate`] that checks value equality.
///
/// ```
/// use plait_expr::eq;
/// use plait_scalar::Value;
///
/// let predicate = eq("ELECTRIC");
/// assert!(predicate.evaluate(&Value::from("ELECTRIC")));
/// assert!(!predicate.evaluate(&Value::Null));
/// ```
pub fn eq<V: Into<Value>>(value: V) -> ColumnPredicate {
    ColumnPredicate::Compare(Operator::Eq, value.into())
}

pub fn not_eq<V: Into<Value>>(value: V) -> ColumnPredicate {
    ColumnPredicate::Compare(Operator::NotEq, value.into())
}

pub fn gt<V: Into<Value>>(value: V) -> ColumnPredicate {
    ColumnPredicate::Compare(Operator::Gt, value.into())
}

pub fn gt_eq<V: Into<Value>>(value: V) -> ColumnPredicate {
    ColumnPredicate::Compare(Operator::Gte, value.into())
}

pub fn lt<V: Into<Value>>(value: V) -> ColumnPredicate {
    ColumnPredicate::Compare(Operator::Lt, value.into())
}

pub fn lt_eq<V: Into<Value>>(value: V) -> ColumnPredicate {
    ColumnPredicate::Compare(Operator::Lte, value.into())
}

pub fn is_null() -> ColumnPredicate {
    ColumnPredicate::IsNull
}

pub fn is_not_null() -> ColumnPredicate {
    ColumnPredicate::IsNotNull
}
