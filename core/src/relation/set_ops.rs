use super::Relation;
use crate::{Domain, Error, Field, Tuple};
use indexmap::IndexSet;
use std::collections::HashSet;
use tracing::trace;

/// Is a field mapping resolved against the two operands of a set operation.
struct Mapping {
    names: Vec<String>,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl Relation {
    fn mapping(&self, other: &Self, mapping: &[(&str, &str)]) -> Result<Mapping, Error> {
        let mut resolved = Mapping {
            names: Vec::with_capacity(mapping.len()),
            left: Vec::with_capacity(mapping.len()),
            right: Vec::with_capacity(mapping.len()),
        };
        for &(key, value) in mapping {
            resolved.left.push(self.mapped(key)?);
            resolved.right.push(other.mapped(value)?);
            resolved.names.push(key.to_string());
        }
        Ok(resolved)
    }

    fn mapped(&self, name: &str) -> Result<usize, Error> {
        self.position(name).map_err(|_| Error::FieldMapping {
            field: name.to_string(),
            relation: self.name.clone(),
        })
    }

    /// Builds the result of a set operation: one field per mapping key, over the
    /// domains of the mapped fields combined by `combine`.
    fn set_operation(
        &self,
        other: &Self,
        mapping: &Mapping,
        name: String,
        combine: impl Fn(&Domain, &Domain) -> Result<Domain, Error>,
        tuples: Vec<Tuple>,
    ) -> Result<Self, Error> {
        let mut fields = Vec::with_capacity(mapping.names.len());
        for ((key, &l), &r) in mapping.names.iter().zip(&mapping.left).zip(&mapping.right) {
            let domain = combine(self.fields[l].domain(), other.fields[r].domain())?;
            fields.push(Field::new(key.as_str(), domain));
        }
        let result = Self::with_tuples(name, fields, tuples)?;
        trace!("`{}`: {} tuples", result.name, result.len());
        Ok(result)
    }

    /// Returns the tuples of the receiver followed by the tuples of `other`, without
    /// repetitions. `mapping` pairs each field of the result, named after a field of the
    /// receiver, with a field of `other`.
    ///
    /// **Example**:
    /// ```rust
    /// use relalg_core::{insert, Field, Relation, Value};
    ///
    /// let mut r1 = Relation::new("Relation1", vec![Field::any("id")]).unwrap();
    /// let mut r2 = Relation::new("Relation2", vec![Field::any("key")]).unwrap();
    /// insert!(r1, "id" => 1).unwrap();
    /// insert!(r1, "id" => 2).unwrap();
    /// insert!(r2, "key" => 2).unwrap();
    /// insert!(r2, "key" => 3).unwrap();
    ///
    /// let union = r1.union(&r2, &[("id", "key")]).unwrap();
    /// assert_eq!("Relation1 union Relation2", union.name());
    /// assert_eq!(vec!["id"], union.field_names());
    /// assert_eq!(
    ///     vec![Value::from(1), Value::from(2), Value::from(3)],
    ///     union.rows().map(|row| row.get("id").unwrap().clone()).collect::<Vec<_>>()
    /// );
    /// ```
    pub fn union(&self, other: &Self, mapping: &[(&str, &str)]) -> Result<Self, Error> {
        let mapping = self.mapping(other, mapping)?;
        let tuples: IndexSet<Tuple> = self
            .tuples
            .iter()
            .map(|t| t.pick(&mapping.left))
            .chain(other.tuples.iter().map(|t| t.pick(&mapping.right)))
            .collect();

        self.set_operation(
            other,
            &mapping,
            format!("{} union {}", self.name, other.name),
            Domain::union,
            tuples.into_iter().collect(),
        )
    }

    /// Returns the tuples of the receiver that also appear in `other` under `mapping`.
    pub fn intersection(&self, other: &Self, mapping: &[(&str, &str)]) -> Result<Self, Error> {
        let mapping = self.mapping(other, mapping)?;
        let others = other.projected(&mapping.right);
        let tuples = self
            .tuples
            .iter()
            .map(|t| t.pick(&mapping.left))
            .filter(|t| others.contains(t))
            .collect();

        self.set_operation(
            other,
            &mapping,
            format!("{} intersection {}", self.name, other.name),
            Domain::intersection,
            tuples,
        )
    }

    /// Returns the tuples of the receiver that do not appear in `other` under `mapping`.
    pub fn difference(&self, other: &Self, mapping: &[(&str, &str)]) -> Result<Self, Error> {
        let mapping = self.mapping(other, mapping)?;
        let others = other.projected(&mapping.right);
        let tuples = self
            .tuples
            .iter()
            .map(|t| t.pick(&mapping.left))
            .filter(|t| !others.contains(t))
            .collect();

        self.set_operation(
            other,
            &mapping,
            format!("{} difference {}", self.name, other.name),
            Domain::difference,
            tuples,
        )
    }

    fn projected(&self, positions: &[usize]) -> HashSet<Tuple> {
        self.tuples.iter().map(|t| t.pick(positions)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{insert, Constraint, Value, ValueType};

    fn ids(relation: &Relation) -> Vec<Value> {
        relation
            .rows()
            .map(|row| row.get("id").cloned().unwrap_or(Value::Null))
            .collect()
    }

    fn relation(name: &str, field: &str, values: &[i64]) -> Relation {
        let domain = Domain::new().with_types(vec![ValueType::Int]);
        let mut r = Relation::new(name, vec![Field::new(field, domain), Field::any("tag")]).unwrap();
        for &v in values {
            insert!(r, field => v, "tag" => "x").unwrap();
        }
        r
    }

    fn relation1() -> Relation {
        relation("Relation1", "id", &[1, 2, 3])
    }

    fn relation2() -> Relation {
        relation("Relation2", "id", &[2, 3, 4])
    }

    #[test]
    fn test_union() {
        let union = relation1().union(&relation2(), &[("id", "id")]).unwrap();
        assert_eq!("Relation1 union Relation2", union.name());
        assert_eq!(
            vec![Value::from(1), Value::from(2), Value::from(3), Value::from(4)],
            ids(&union)
        );
    }

    #[test]
    fn test_union_removes_repetitions() {
        let r1 = relation1();
        let union = r1.union(&r1, &[("tag", "tag")]).unwrap();
        assert_eq!(vec!["tag"], union.field_names());
        assert_eq!(1, union.len());
    }

    #[test]
    fn test_intersection() {
        let intersection = relation1()
            .intersection(&relation2(), &[("id", "id")])
            .unwrap();
        assert_eq!("Relation1 intersection Relation2", intersection.name());
        assert_eq!(vec![Value::from(2), Value::from(3)], ids(&intersection));
    }

    #[test]
    fn test_difference() {
        let difference = relation1()
            .difference(&relation2(), &[("id", "id")])
            .unwrap();
        assert_eq!("Relation1 difference Relation2", difference.name());
        assert_eq!(vec![Value::from(1)], ids(&difference));
    }

    #[test]
    fn test_mapping_to_other_name() {
        let r1 = relation1();
        let r2 = relation("Relation2", "key", &[3, 4]);
        let intersection = r1.intersection(&r2, &[("id", "key")]).unwrap();
        assert_eq!(vec!["id"], intersection.field_names());
        assert_eq!(vec![Value::from(3)], ids(&intersection));
    }

    #[test]
    fn test_multiple_fields() {
        let r1 = relation1();
        let union = r1
            .union(&relation2(), &[("tag", "tag"), ("id", "id")])
            .unwrap();
        assert_eq!(vec!["tag", "id"], union.field_names());
        assert_eq!(
            vec![Value::from("x"), Value::from(1)],
            union.tuples()[0].values()
        );
        assert_eq!(4, union.len());
    }

    #[test]
    fn test_domains() {
        let ranged = |name: &str, min: i32, max: i32| {
            let domain = Domain::new()
                .with_types(vec![ValueType::Int])
                .with_constraints(vec![Constraint::range(min, max)]);
            Relation::new(name, vec![Field::new("id", domain)]).unwrap()
        };
        let r1 = ranged("R1", 1, 5);
        let r2 = ranged("R2", 3, 6);
        {
            let union = r1.union(&r2, &[("id", "id")]).unwrap();
            let field = union.field("id").unwrap();
            assert_eq!(&[Constraint::range(1, 6)], field.domain().constraints());
            assert!(field.is_valid(&Value::from(6)));
        }
        {
            let intersection = r1.intersection(&r2, &[("id", "id")]).unwrap();
            let field = intersection.field("id").unwrap();
            assert_eq!(&[Constraint::range(3, 5)], field.domain().constraints());
        }
        {
            let difference = r1.difference(&r2, &[("id", "id")]).unwrap();
            let field = difference.field("id").unwrap();
            assert_eq!(&[Constraint::range(1, 3)], field.domain().constraints());
        }
        {
            let difference = r1.difference(&r1, &[("id", "id")]).unwrap();
            let field = difference.field("id").unwrap();
            assert_eq!(&[Constraint::range(1, 5)], field.domain().constraints());
            assert!(difference.is_empty());
        }
    }

    #[test]
    fn test_difference_over_shared_domain() {
        let domain = Domain::new()
            .with_types(vec![ValueType::Int])
            .with_constraints(vec![Constraint::positive()]);
        let numbers = |name: &str, values: &[i64]| {
            let mut r = Relation::new(name, vec![Field::new("id", domain.clone())]).unwrap();
            for &v in values {
                insert!(r, "id" => v).unwrap();
            }
            r
        };
        let r1 = numbers("Relation1", &[1, 2, 3]);
        let r2 = numbers("Relation2", &[2, 3, 4]);

        let difference = r1.difference(&r2, &[("id", "id")]).unwrap();
        assert_eq!(vec![Value::from(1)], ids(&difference));
        assert_eq!(
            &[Constraint::positive()],
            difference.field("id").unwrap().domain().constraints()
        );
    }

    #[test]
    fn test_field_mapping_errors() {
        assert_eq!(
            Err(Error::FieldMapping {
                field: "key".to_string(),
                relation: "Relation1".to_string(),
            }),
            relation1().union(&relation2(), &[("key", "id")])
        );
        assert_eq!(
            Err(Error::FieldMapping {
                field: "key".to_string(),
                relation: "Relation2".to_string(),
            }),
            relation1().difference(&relation2(), &[("id", "key")])
        );
    }
}
