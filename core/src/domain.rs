use crate::{Constraint, Error, Value, ValueType};
use indexmap::IndexSet;
use std::fmt;

/// Is the set of legal values of a [`Field`]: a value belongs to a domain if it is
/// one of the explicitly allowed values, or if its type is allowed and it satisfies
/// every constraint of the domain. Null belongs to a domain only if it is listed
/// among the allowed values.
///
/// Domains are immutable; the set operations return new domains.
///
/// **Example**:
/// ```rust
/// use relalg_core::{Constraint, Domain, Value, ValueType};
///
/// let id = Domain::new()
///     .with_values(vec!["none"])
///     .with_types(vec![ValueType::Int])
///     .with_constraints(vec![Constraint::range(1, 5)]);
///
/// assert!(id.is_valid(&Value::from(3)));
/// assert!(id.is_valid(&Value::from("none")));
/// assert!(!id.is_valid(&Value::from(6)));
/// assert!(!id.is_valid(&Value::Null));
/// ```
///
/// [`Field`]: ./struct.Field.html
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Domain {
    allowed_values: IndexSet<Value>,
    allowed_types: IndexSet<ValueType>,
    constraints: Vec<Constraint>,
}

impl Domain {
    /// Creates an empty domain, which accepts no value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a domain accepting any value that is not null.
    pub fn any() -> Self {
        Self::new().with_types(vec![
            ValueType::Int,
            ValueType::Float,
            ValueType::Str,
            ValueType::Bool,
        ])
    }

    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed_values
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = ValueType>,
    {
        self.allowed_types.extend(types);
        self
    }

    pub fn with_constraints<I>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = Constraint>,
    {
        self.constraints.extend(constraints);
        self
    }

    #[inline(always)]
    pub fn allowed_values(&self) -> &IndexSet<Value> {
        &self.allowed_values
    }

    #[inline(always)]
    pub fn allowed_types(&self) -> &IndexSet<ValueType> {
        &self.allowed_types
    }

    #[inline(always)]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Checks `value` against the receiver and returns the reason of the rejection
    /// if it does not belong to the domain.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if self.allowed_values.contains(value) {
            return Ok(());
        }

        if value.is_null() {
            return Err(format!(
                "null is not one of the allowed values {}",
                braced(&self.allowed_values)
            ));
        }

        if self.allowed_types.contains(&value.value_type()) {
            for constraint in &self.constraints {
                constraint
                    .check(value)
                    .map_err(|reason| format!("{} violated: {}", constraint, reason))?;
            }
            return Ok(());
        }

        Err(format!(
            "not one of the allowed values {} and type `{}` is not one of the allowed types {}",
            braced(&self.allowed_values),
            value.value_type(),
            braced(&self.allowed_types)
        ))
    }

    /// Returns true if `value` belongs to the receiver.
    #[inline(always)]
    pub fn is_valid(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }

    /// Returns a domain with the values and types of both the receiver and `other`.
    /// Constraints of the same kind are combined by [`Constraint::union`]; a
    /// constraint that only one of the domains has is dropped.
    ///
    /// [`Constraint::union`]: ./enum.Constraint.html#method.union
    pub fn union(&self, other: &Self) -> Result<Self, Error> {
        self.combine(
            other,
            self.allowed_values
                .union(&other.allowed_values)
                .cloned()
                .collect(),
            self.allowed_types
                .union(&other.allowed_types)
                .cloned()
                .collect(),
            Constraint::union,
        )
    }

    /// Returns a domain with the values and types common to the receiver and `other`.
    /// Constraints of the same kind are combined by [`Constraint::intersection`]; a
    /// constraint that only one of the domains has is dropped.
    ///
    /// [`Constraint::intersection`]: ./enum.Constraint.html#method.intersection
    pub fn intersection(&self, other: &Self) -> Result<Self, Error> {
        self.combine(
            other,
            self.allowed_values
                .intersection(&other.allowed_values)
                .cloned()
                .collect(),
            self.allowed_types
                .intersection(&other.allowed_types)
                .cloned()
                .collect(),
            Constraint::intersection,
        )
    }

    /// Returns a domain with the values and types of the receiver that are not in
    /// `other`. Constraints of the same kind are combined by [`Constraint::difference`];
    /// a constraint that only one of the domains has is dropped.
    ///
    /// [`Constraint::difference`]: ./enum.Constraint.html#method.difference
    pub fn difference(&self, other: &Self) -> Result<Self, Error> {
        self.combine(
            other,
            self.allowed_values
                .difference(&other.allowed_values)
                .cloned()
                .collect(),
            self.allowed_types
                .difference(&other.allowed_types)
                .cloned()
                .collect(),
            Constraint::difference,
        )
    }

    fn combine(
        &self,
        other: &Self,
        allowed_values: IndexSet<Value>,
        allowed_types: IndexSet<ValueType>,
        operation: impl Fn(&Constraint, &Constraint) -> Result<Constraint, Error>,
    ) -> Result<Self, Error> {
        let mut constraints = Vec::new();
        for constraint in &self.constraints {
            if let Some(paired) = other.constraints.iter().find(|c| c.same_kind(constraint)) {
                constraints.push(operation(constraint, paired)?);
            }
        }

        Ok(Self {
            allowed_values,
            allowed_types,
            constraints,
        })
    }
}

fn braced<T: fmt::Display>(items: &IndexSet<T>) -> String {
    let items: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("{{{}}}", items.join(", "))
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constraints: Vec<String> = self.constraints.iter().map(ToString::to_string).collect();
        write!(
            f,
            "Domain(values={}, types={}, constraints=[{}])",
            braced(&self.allowed_values),
            braced(&self.allowed_types),
            constraints.join(", ")
        )
    }
}
