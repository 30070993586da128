mod join;
mod set_ops;

use crate::{format, Condition, Error, Field, Row, Tuple, Value};
use std::fmt;
use tracing::{debug, trace};

/// Is a named list of [`Field`]s together with the [`Tuple`]s stored under them.
///
/// Inserting is the only operation that modifies a relation; every algebraic
/// operator returns a new relation and leaves its operands untouched.
///
/// **Example**:
/// ```rust
/// use relalg_core::{insert, Constraint, Domain, Field, Relation, ValueType};
///
/// let age = Field::new(
///     "age",
///     Domain::new()
///         .with_types(vec![ValueType::Int])
///         .with_constraints(vec![Constraint::range(16, 32)]),
/// );
/// let mut details = Relation::new("PersonDetails", vec![Field::any("id"), age]).unwrap();
///
/// insert!(details, "id" => 1, "age" => 16).unwrap();
/// assert!(insert!(details, "id" => 2, "age" => 38).is_err());
/// assert_eq!(1, details.len());
/// ```
///
/// [`Field`]: ./struct.Field.html
/// [`Tuple`]: ./struct.Tuple.html
#[derive(Clone, Debug)]
pub struct Relation {
    name: String,
    fields: Vec<Field>,
    tuples: Vec<Tuple>,
}

impl Relation {
    /// Creates an empty relation named `name` over `fields`. Field names must be unique.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Self, Error> {
        Self::with_tuples(name.into(), fields, Vec::new())
    }

    pub(crate) fn with_tuples(
        name: String,
        fields: Vec<Field>,
        tuples: Vec<Tuple>,
    ) -> Result<Self, Error> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name() == field.name()) {
                return Err(Error::DuplicateField {
                    name: field.name().to_string(),
                    relation: name,
                });
            }
        }
        Ok(Self {
            name,
            fields,
            tuples,
        })
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field named `name`, if any.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(Field::name).collect()
    }

    #[inline(always)]
    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    /// Returns an iterator over the tuples of the receiver, viewed through its fields.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.tuples
            .iter()
            .map(move |t| Row::new(&self.name, &self.fields, t))
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Returns the position of the field `name` in the receiver.
    pub(crate) fn position(&self, name: &str) -> Result<usize, Error> {
        self.fields
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| Error::UnknownField {
                name: name.to_string(),
                relation: self.name.clone(),
            })
    }

    /// Inserts a tuple made of the given field/value pairs; fields that are not
    /// given are set to null. Every value is validated against the domain of its
    /// field before the tuple is stored, and a rejected insert leaves the receiver
    /// unchanged.
    ///
    /// **Example**:
    /// ```rust
    /// use relalg_core::{Error, Field, Relation};
    ///
    /// let mut r = Relation::new("R", vec![Field::any("id")]).unwrap();
    /// r.insert(vec![("id", 1)]).unwrap();
    ///
    /// assert_eq!(
    ///     Err(Error::DuplicateRow { relation: "R".to_string() }),
    ///     r.insert(vec![("id", 1)])
    /// );
    /// ```
    pub fn insert<I, N, V>(&mut self, pairs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<Value>,
    {
        let pairs: Vec<(N, Value)> = pairs.into_iter().map(|(n, v)| (n, v.into())).collect();
        match self.stage(&pairs) {
            Ok(tuple) => {
                debug!("inserted {:?} into `{}`", tuple.values(), self.name);
                self.tuples.push(tuple);
                Ok(())
            }
            Err(e) => {
                debug!("rejected insert into `{}`: {}", self.name, e);
                Err(e)
            }
        }
    }

    /// Inserts a tuple given as alternating field names and values:
    /// `[name1, value1, name2, value2, ...]`.
    ///
    /// **Example**:
    /// ```rust
    /// use relalg_core::{Error, Field, Relation, Value};
    ///
    /// let mut r = Relation::new("R", vec![Field::any("id"), Field::any("name")]).unwrap();
    /// r.insert_flat(&["id".into(), 1.into(), "name".into(), "Pupuce".into()]).unwrap();
    ///
    /// assert!(matches!(
    ///     r.insert_flat(&["id".into(), 2.into(), "name".into()]),
    ///     Err(Error::Arity { .. })
    /// ));
    /// ```
    pub fn insert_flat(&mut self, arguments: &[Value]) -> Result<(), Error> {
        if arguments.len() % 2 != 0 {
            return Err(self.arity(format!(
                "expected {} arguments instead of just {}",
                arguments.len() + 1,
                arguments.len()
            )));
        }

        let mut pairs = Vec::with_capacity(arguments.len() / 2);
        for (i, chunk) in arguments.chunks(2).enumerate() {
            match &chunk[0] {
                Value::Str(name) => pairs.push((name.as_str(), chunk[1].clone())),
                other => {
                    return Err(self.arity(format!(
                        "expected a field name at position {}, found `{}`",
                        2 * i,
                        other
                    )))
                }
            }
        }
        self.insert(pairs)
    }

    fn stage<N: AsRef<str>>(&self, pairs: &[(N, Value)]) -> Result<Tuple, Error> {
        if pairs.len() > self.fields.len() {
            return Err(self.arity(format!(
                "expected at most {} fields, got {}",
                self.fields.len(),
                pairs.len()
            )));
        }

        let mut values = vec![Value::Null; self.fields.len()];
        let mut assigned = vec![false; self.fields.len()];
        for (name, value) in pairs {
            let name = name.as_ref();
            let i = self.position(name)?;
            if assigned[i] {
                return Err(Error::DuplicateField {
                    name: name.to_string(),
                    relation: self.name.clone(),
                });
            }
            self.fields[i]
                .check(value)
                .map_err(|reason| Error::Validation {
                    field: name.to_string(),
                    value: value.clone(),
                    reason,
                })?;
            values[i] = value.clone();
            assigned[i] = true;
        }

        let tuple = Tuple::new(values);
        if self.tuples.contains(&tuple) {
            return Err(Error::DuplicateRow {
                relation: self.name.clone(),
            });
        }
        Ok(tuple)
    }

    fn arity(&self, reason: String) -> Error {
        Error::Arity {
            relation: self.name.clone(),
            reason,
        }
    }

    /// Returns a relation with only the fields in `names`, in the order they appear
    /// in the receiver; `"*"` stands for every field. Tuples are not de-duplicated.
    pub fn project(&self, names: &[&str]) -> Result<Self, Error> {
        for name in names.iter().filter(|&&n| n != "*") {
            self.position(name)?;
        }

        let all = names.contains(&"*");
        let positions: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| all || names.contains(&f.name()))
            .map(|(i, _)| i)
            .collect();

        let result = self.pick(self.name.clone(), &positions);
        trace!("projected `{}` on {:?}: {} tuples", self.name, names, result.len());
        Ok(result)
    }

    /// Returns the relation whose fields and tuple values are those of the receiver
    /// at `positions`.
    pub(crate) fn pick(&self, name: String, positions: &[usize]) -> Self {
        Self {
            name,
            fields: positions.iter().map(|&i| self.fields[i].clone()).collect(),
            tuples: self.tuples.iter().map(|t| t.pick(positions)).collect(),
        }
    }

    /// Returns the tuples of the receiver for which `predicate` holds, in a relation
    /// named `<name> where: <predicate>`.
    ///
    /// **Example**:
    /// ```rust
    /// use relalg_core::{insert, Field, Relation};
    ///
    /// let mut r = Relation::new("R", vec![Field::any("id")]).unwrap();
    /// for id in 1..=5 {
    ///     insert!(r, "id" => id).unwrap();
    /// }
    ///
    /// let selected = r.select("id >= 2 and id != 4").unwrap();
    /// assert_eq!("R where: id >= 2 and id != 4", selected.name());
    /// assert_eq!(3, selected.len());
    /// ```
    pub fn select(&self, predicate: &str) -> Result<Self, Error> {
        let condition = Condition::parse(predicate)?;
        let mut tuples = Vec::new();
        for row in self.rows() {
            if condition.evaluate(&row)? {
                tuples.push(row.tuple().clone());
            }
        }

        let result = Self {
            name: format!("{} where: {}", self.name, predicate),
            fields: self.fields.clone(),
            tuples,
        };
        trace!("selected {} of {} tuples of `{}`", result.len(), self.len(), self.name);
        Ok(result)
    }

    /// Returns a copy of the receiver. Fields (and their domains) are shared with the
    /// receiver; the list of tuples is copied.
    #[inline(always)]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Returns a copy of the receiver named `name`.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Returns a copy of the receiver whose field names are prefixed with `<prefix>.`.
    pub fn copy_with_renamed_fields(&self, prefix: &str) -> Self {
        Self {
            name: self.name.clone(),
            fields: self.prefixed_fields(prefix).collect(),
            tuples: self.tuples.clone(),
        }
    }

    fn prefixed_fields<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = Field> + 'a {
        self.fields
            .iter()
            .map(move |f| f.renamed(format!("{}.{}", prefix, f.name())))
    }

    /// Returns a copy of the receiver where the `<prefix>.` prefix is removed from the
    /// field names that have it.
    pub fn copy_with_removed_fields(&self, prefix: &str) -> Result<Self, Error> {
        let fields = self
            .fields
            .iter()
            .map(|f| strip(f, prefix).unwrap_or_else(|| f.clone()))
            .collect();
        Self::with_tuples(self.name.clone(), fields, self.tuples.clone())
    }
}

/// Returns `field` without the `<prefix>.` prefix, or `None` if it does not have it.
fn strip(field: &Field, prefix: &str) -> Option<Field> {
    field
        .name()
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('.'))
        .map(|rest| field.renamed(rest.to_string()))
}

impl PartialEq for Relation {
    /// Relations are equal if they have the same name, the same field names (in any
    /// order) and the same tuples in the same order.
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name
            || self.fields.len() != other.fields.len()
            || self.tuples.len() != other.tuples.len()
        {
            return false;
        }

        let positions: Option<Vec<usize>> = self
            .fields
            .iter()
            .map(|f| other.fields.iter().position(|g| g.name() == f.name()))
            .collect();
        match positions {
            Some(positions) => self
                .tuples
                .iter()
                .zip(&other.tuples)
                .all(|(left, right)| *left == right.pick(&positions)),
            None => false,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format::render(self))
    }
}
