/*! Implements a small in-memory relational algebra over typed domains.

A [`Relation`] is a named list of [`Field`]s together with its tuples. Every
value inserted into a relation is validated against the [`Domain`] of its
field, which in turn is made of explicitly allowed values, allowed types and a
set of [`Constraint`]s. Relations support projection, selection (with
predicates written in a small [condition] language), cartesian products,
theta, equi, natural and outer joins, and union, intersection and difference
under a field mapping.

**Example**:
```rust
use relalg_core::{insert, Domain, Field, Relation, Value, ValueType};

let id = Field::new("id", Domain::new().with_types(vec![ValueType::Int]));
let name = Field::new("name", Domain::new().with_types(vec![ValueType::Str]));
let mut person = Relation::new("Person", vec![id, name]).unwrap();

insert!(person, "id" => 1, "name" => "Pupuce").unwrap();
insert!(person, "id" => 3, "name" => "Japon").unwrap();

let japon = person.select("id > 1").unwrap();
assert_eq!(1, japon.len());
assert_eq!(Some(&Value::from("Japon")), japon.rows().next().unwrap().get("name"));
```

[condition]: ./condition/index.html
*/
mod macros;

pub mod condition;
mod constraint;
mod domain;
mod field;
pub mod format;
mod relation;
mod tuple;
mod value;

pub use condition::{Condition, Scope};
pub use constraint::Constraint;
pub use domain::Domain;
pub use field::Field;
pub use relation::Relation;
pub use tuple::{Row, Tuple};
pub use value::{Value, ValueType};

use thiserror::Error;

/// Is the type of errors returned by the operations of this crate.
#[derive(Error, Clone, PartialEq, Debug)]
pub enum Error {
    /// Is returned when the arguments of an insert do not form valid
    /// field/value pairs for the target relation.
    #[error("invalid insert arguments for relation `{relation}`: {reason}")]
    Arity { relation: String, reason: String },

    /// Is returned when a field name cannot be found.
    #[error("field `{name}` does not exist in `{relation}`")]
    UnknownField { name: String, relation: String },

    /// Is returned when a value is rejected by the domain of its field.
    #[error("invalid value `{value}` for field `{field}`: {reason}")]
    Validation {
        field: String,
        value: Value,
        reason: String,
    },

    /// Is returned when inserting a tuple that already exists.
    #[error("tuple already exists in `{relation}`")]
    DuplicateRow { relation: String },

    /// Is returned when two fields of one relation would share a name.
    #[error("field `{name}` appears more than once in `{relation}`")]
    DuplicateField { name: String, relation: String },

    /// Is returned when combining constraints of different kinds.
    #[error("cannot combine a `{left}` constraint with a `{right}` constraint")]
    ConstraintKindMismatch {
        left: &'static str,
        right: &'static str,
    },

    /// Is returned when an operation over constraints produces an empty interval.
    #[error("{operation} of {kind} constraints is empty: [{min}, {max}]")]
    EmptyRange {
        kind: &'static str,
        operation: &'static str,
        min: String,
        max: String,
    },

    /// Is returned when a field mapping of a set operation refers to a missing field.
    #[error("field mapping refers to `{field}`, which is not a field of `{relation}`")]
    FieldMapping { field: String, relation: String },

    /// Is returned when a condition cannot be parsed or does not evaluate to a boolean.
    #[error("invalid condition `{condition}`: {reason}")]
    ConditionSyntax { condition: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            "field `age` does not exist in `Person`",
            Error::UnknownField {
                name: "age".to_string(),
                relation: "Person".to_string(),
            }
            .to_string()
        );
        assert_eq!(
            "invalid value `RAKOTOBE` for field `name`: expected string length in [1, 6], got 8",
            Error::Validation {
                field: "name".to_string(),
                value: Value::from("RAKOTOBE"),
                reason: "expected string length in [1, 6], got 8".to_string(),
            }
            .to_string()
        );
        assert_eq!(
            "intersection of Range constraints is empty: [7, 5]",
            Error::EmptyRange {
                kind: "Range",
                operation: "intersection",
                min: "7".to_string(),
                max: "5".to_string(),
            }
            .to_string()
        );
    }
}
