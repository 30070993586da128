use crate::{Domain, Error, Value};
use std::{fmt, rc::Rc};

/// Is a named column of a [`Relation`], whose values are drawn from a [`Domain`].
///
/// Fields are immutable; their domains are shared between copies of a relation.
///
/// [`Relation`]: ./struct.Relation.html
/// [`Domain`]: ./struct.Domain.html
#[derive(Clone, PartialEq, Debug)]
pub struct Field {
    name: String,
    domain: Rc<Domain>,
}

impl Field {
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        Self {
            name: name.into(),
            domain: Rc::new(domain),
        }
    }

    /// Creates a field that accepts any value that is not null.
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, Domain::any())
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Returns a field with the same domain as the receiver, named `name`.
    pub(crate) fn renamed(&self, name: String) -> Self {
        Self {
            name,
            domain: self.domain.clone(),
        }
    }

    /// Checks `value` against the domain of the receiver.
    #[inline(always)]
    pub fn check(&self, value: &Value) -> Result<(), String> {
        self.domain.check(value)
    }

    #[inline(always)]
    pub fn is_valid(&self, value: &Value) -> bool {
        self.domain.is_valid(value)
    }

    /// Returns a field named `<receiver>|<other>` over the union of both domains.
    pub fn union(&self, other: &Self) -> Result<Self, Error> {
        Ok(Self::new(
            self.merged_name(other),
            self.domain.union(&other.domain)?,
        ))
    }

    /// Returns a field named `<receiver>|<other>` over the intersection of both domains.
    pub fn intersection(&self, other: &Self) -> Result<Self, Error> {
        Ok(Self::new(
            self.merged_name(other),
            self.domain.intersection(&other.domain)?,
        ))
    }

    fn merged_name(&self, other: &Self) -> String {
        format!("{}|{}", self.name, other.name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field(name={}, domain={})", self.name, self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Constraint, ValueType};

    #[test]
    fn test_is_valid() {
        let age = Field::new(
            "age",
            Domain::new()
                .with_types(vec![ValueType::Int])
                .with_constraints(vec![Constraint::positive()]),
        );
        assert!(age.is_valid(&Value::from(16)));
        assert!(!age.is_valid(&Value::from(-16)));
        assert!(!age.is_valid(&Value::from("16")));
        assert!(age.check(&Value::from(-16)).is_err());
    }

    #[test]
    fn test_any() {
        let field = Field::any("anything");
        assert!(field.is_valid(&Value::from(1)));
        assert!(field.is_valid(&Value::from("one")));
        assert!(!field.is_valid(&Value::Null));
    }

    #[test]
    fn test_union() {
        let left = Field::new("a", Domain::new().with_values(vec![1, 2]));
        let right = Field::new("b", Domain::new().with_values(vec![2, 3]));
        let union = left.union(&right).unwrap();
        assert_eq!("a|b", union.name());
        assert_eq!(3, union.domain().allowed_values().len());
    }

    #[test]
    fn test_intersection() {
        let left = Field::new("a", Domain::new().with_values(vec![1, 2]));
        let right = Field::new("b", Domain::new().with_values(vec![2, 3]));
        let intersection = left.intersection(&right).unwrap();
        assert_eq!("a|b", intersection.name());
        assert!(intersection.is_valid(&Value::from(2)));
        assert!(!intersection.is_valid(&Value::from(1)));
    }

    #[test]
    fn test_renamed_shares_domain() {
        let field = Field::any("id");
        let renamed = field.renamed("Person.id".to_string());
        assert_eq!("Person.id", renamed.name());
        assert!(Rc::ptr_eq(&field.domain, &renamed.domain));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            "Field(name=id, domain=Domain(values={1}, types={}, constraints=[]))",
            Field::new("id", Domain::new().with_values(vec![1])).to_string()
        );
    }
}
