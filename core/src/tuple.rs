use crate::{condition::Scope, Field, Value};
use indexmap::IndexMap;

/// Is a row of a [`Relation`]. The values of a tuple are stored in the order of the
/// fields of the relation that owns it; use [`Row`] to access them by name.
///
/// [`Relation`]: ./struct.Relation.html
/// [`Row`]: ./struct.Row.html
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Returns the values of the receiver in the order of the fields of its relation.
    #[inline(always)]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns a tuple made of the values at `positions`.
    pub(crate) fn pick(&self, positions: &[usize]) -> Self {
        Self::new(positions.iter().map(|&i| self.values[i].clone()).collect())
    }

    /// Returns the values of the receiver followed by the values of `other`.
    pub(crate) fn concat(&self, other: &Self) -> Self {
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend(self.values.iter().cloned());
        values.extend(other.values.iter().cloned());
        Self::new(values)
    }
}

/// Is a tuple viewed through the fields of the relation that owns it.
///
/// **Example**:
/// ```rust
/// use relalg_core::{insert, Field, Relation, Value};
///
/// let mut r = Relation::new("R", vec![Field::any("id"), Field::any("name")]).unwrap();
/// insert!(r, "id" => 1).unwrap();
///
/// let row = r.rows().next().unwrap();
/// assert_eq!(Some(&Value::from(1)), row.get("id"));
/// assert_eq!(Some(&Value::Null), row.get("name"));
/// assert_eq!(None, row.get("age"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
    relation: &'a str,
    fields: &'a [Field],
    tuple: &'a Tuple,
}

impl<'a> Row<'a> {
    pub(crate) fn new(relation: &'a str, fields: &'a [Field], tuple: &'a Tuple) -> Self {
        Self {
            relation,
            fields,
            tuple,
        }
    }

    /// Returns the value of the field named `name`.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let tuple = self.tuple;
        self.fields
            .iter()
            .position(|f| f.name() == name)
            .map(|i| &tuple.values[i])
    }

    #[inline(always)]
    pub fn tuple(&self) -> &'a Tuple {
        self.tuple
    }

    /// Returns an iterator over the field names and values of the receiver.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        let (fields, tuple) = (self.fields, self.tuple);
        fields.iter().map(Field::name).zip(tuple.values.iter())
    }

    /// Returns the receiver as an ordered map from field names to values.
    pub fn to_map(&self) -> IndexMap<String, Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

impl Scope for Row<'_> {
    fn name(&self) -> &str {
        self.relation
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}
