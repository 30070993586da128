/*! Implements the condition language used by [`Relation::select`] and the joins.

A condition is a boolean expression over literals and field references:

- literals: integers (`42`, `-1`), floats (`2.5`), strings (`'abc'` or `"abc"`),
  booleans (`true`, `True`, `false`, `False`) and null (`null`, `None`);
- field references: `name`, `Person.id`, or any name between backquotes
  (`` `Person x Details.id` ``);
- comparisons: `==`, `!=`, `<`, `<=`, `>`, `>=`, `in` and `not in` (substring);
- connectives: `and`, `or`, `not` and parentheses.

Values are never coerced: a comparison between values of different types is
false, so `1 == "1"` and `1 == 1.0` are both false.

**Example**:
```rust
use relalg_core::condition;

assert!(condition::evaluate("1 < 2 and (3 > 2)").unwrap());
assert!(condition::evaluate("'abc' == 'abc'").unwrap());
assert!(!condition::evaluate("1 == \"1\"").unwrap());
```

[`Relation::select`]: ../struct.Relation.html#method.select
*/
mod lexer;
mod parser;

use crate::{Error, Value};
use indexmap::IndexMap;
use parser::{Comparison, Expr};
use std::{cmp::Ordering, collections::HashMap, fmt};

/// Is the trait of types that resolve the field references of a [`Condition`].
///
/// [`Condition`]: ./struct.Condition.html
pub trait Scope {
    /// Returns the name of the scope (e.g., the name of a relation) for error reporting.
    fn name(&self) -> &str;

    /// Returns the value of the field `name`, if it exists in the receiver.
    fn lookup(&self, name: &str) -> Option<&Value>;
}

/// Is a [`Scope`] with no fields, for conditions over literals only.
///
/// [`Scope`]: ./trait.Scope.html
pub struct Literals;

impl Scope for Literals {
    fn name(&self) -> &str {
        "literals"
    }

    fn lookup(&self, _: &str) -> Option<&Value> {
        None
    }
}

impl Scope for IndexMap<String, Value> {
    fn name(&self) -> &str {
        "map"
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Scope for HashMap<String, Value> {
    fn name(&self) -> &str {
        "map"
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Is a parsed condition.
///
/// **Example**:
/// ```rust
/// use relalg_core::{Condition, Value};
/// use std::collections::HashMap;
///
/// let condition = Condition::parse("age >= 18 and name != 'Stove'").unwrap();
///
/// let mut row = HashMap::new();
/// row.insert("age".to_string(), Value::from(20));
/// row.insert("name".to_string(), Value::from("Poyz"));
///
/// assert!(condition.evaluate(&row).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct Condition {
    source: String,
    expr: Expr,
}

impl Condition {
    /// Parses `source` into a condition.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let expr = parser::parse(source).map_err(|reason| Error::ConditionSyntax {
            condition: source.to_string(),
            reason,
        })?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// Returns the text the receiver was parsed from.
    #[inline(always)]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates the receiver with the field references resolved in `scope`.
    pub fn evaluate<S: Scope + ?Sized>(&self, scope: &S) -> Result<bool, Error> {
        self.boolean(&self.expr, scope)
    }

    fn boolean<S: Scope + ?Sized>(&self, expr: &Expr, scope: &S) -> Result<bool, Error> {
        let value = self.value(expr, scope)?;
        value
            .as_bool()
            .ok_or_else(|| self.syntax(format!("expected a boolean, found `{}`", value)))
    }

    fn value<S: Scope + ?Sized>(&self, expr: &Expr, scope: &S) -> Result<Value, Error> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Field(name) => {
                scope
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| Error::UnknownField {
                        name: name.clone(),
                        relation: scope.name().to_string(),
                    })
            }
            Expr::Not(inner) => Ok(Value::Bool(!self.boolean(inner, scope)?)),
            Expr::And(left, right) => Ok(Value::Bool(
                self.boolean(left, scope)? && self.boolean(right, scope)?,
            )),
            Expr::Or(left, right) => Ok(Value::Bool(
                self.boolean(left, scope)? || self.boolean(right, scope)?,
            )),
            Expr::Compare(left, op, right) => {
                let left = self.value(left, scope)?;
                let right = self.value(right, scope)?;
                self.compare(&left, *op, &right).map(Value::Bool)
            }
        }
    }

    fn compare(&self, left: &Value, op: Comparison, right: &Value) -> Result<bool, Error> {
        if left.value_type() != right.value_type() {
            return Ok(false);
        }

        let result = match op {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            Comparison::Lt => order(left, right) == Some(Ordering::Less),
            Comparison::Le => matches!(order(left, right), Some(Ordering::Less | Ordering::Equal)),
            Comparison::Gt => order(left, right) == Some(Ordering::Greater),
            Comparison::Ge => matches!(
                order(left, right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Comparison::In | Comparison::NotIn => match (left, right) {
                (Value::Str(needle), Value::Str(haystack)) => {
                    haystack.contains(needle.as_str()) == (op == Comparison::In)
                }
                _ => {
                    return Err(self.syntax(format!(
                        "`in` expects string operands, found `{}` and `{}`",
                        left, right
                    )))
                }
            },
        };
        Ok(result)
    }

    fn syntax(&self, reason: String) -> Error {
        Error::ConditionSyntax {
            condition: self.source.clone(),
            reason,
        }
    }
}

/// Orders two values of the same type; nulls are not ordered.
fn order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
        (Value::Float(l), Value::Float(r)) => Some(l.cmp(r)),
        (Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parses and evaluates a condition over literals.
pub fn evaluate(source: &str) -> Result<bool, Error> {
    Condition::parse(source)?.evaluate(&Literals)
}

/// Returns `name` as it should be written in a condition: plain if it lexes as an
/// identifier, between backquotes otherwise.
pub(crate) fn quote_identifier(name: &str) -> String {
    let plain = name.split('.').all(|part| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    let keyword = matches!(
        name,
        "and" | "or" | "not" | "in" | "true" | "True" | "false" | "False" | "null" | "None"
    );
    if plain && !keyword {
        name.to_string()
    } else {
        format!("`{}`", name)
    }
}
