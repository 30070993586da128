use super::{strip, Relation};
use crate::{condition::quote_identifier, Error, Field, Tuple, Value};
use tracing::trace;

impl Relation {
    /// Returns every combination of a tuple of the receiver with a tuple of `other`,
    /// in a relation named `<receiver> x <other>`. Field names are prefixed with the
    /// name of the relation they come from.
    ///
    /// **Example**:
    /// ```rust
    /// use relalg_core::{insert, Field, Relation};
    ///
    /// let mut a = Relation::new("A", vec![Field::any("id")]).unwrap();
    /// let mut b = Relation::new("B", vec![Field::any("id"), Field::any("tag")]).unwrap();
    /// insert!(a, "id" => 1).unwrap();
    /// insert!(a, "id" => 2).unwrap();
    /// insert!(b, "id" => 1, "tag" => "x").unwrap();
    ///
    /// let product = a.cartesian_product(&b).unwrap();
    /// assert_eq!("A x B", product.name());
    /// assert_eq!(vec!["A.id", "B.id", "B.tag"], product.field_names());
    /// assert_eq!(2, product.len());
    /// ```
    pub fn cartesian_product(&self, other: &Self) -> Result<Self, Error> {
        let fields = self
            .prefixed_fields(&self.name)
            .chain(other.prefixed_fields(&other.name))
            .collect();

        let mut tuples = Vec::with_capacity(self.len() * other.len());
        for left in &self.tuples {
            for right in &other.tuples {
                tuples.push(left.concat(right));
            }
        }

        let result = Self::with_tuples(format!("{} x {}", self.name, other.name), fields, tuples)?;
        trace!(
            "cartesian product of `{}` and `{}`: {} tuples",
            self.name,
            other.name,
            result.len()
        );
        Ok(result)
    }

    /// Returns the tuples of the cartesian product of the receiver and `other` for
    /// which `predicate` holds. The predicate refers to fields by their prefixed names
    /// (e.g., `A.id == B.id`).
    pub fn theta_join(&self, other: &Self, predicate: &str) -> Result<Self, Error> {
        self.cartesian_product(other)?.select(predicate)
    }

    /// Returns the theta join of the receiver and `other` on the equality of the
    /// receiver's `left` field and `other`'s `right` field.
    pub fn equi_join(&self, other: &Self, left: &str, right: &str) -> Result<Self, Error> {
        self.position(left)?;
        other.position(right)?;
        let predicate = format!(
            "{} == {}",
            quote_identifier(&format!("{}.{}", self.name, left)),
            quote_identifier(&format!("{}.{}", other.name, right))
        );
        self.theta_join(other, &predicate)
    }

    /// Joins the receiver and `other` on the equality of paired fields: the given
    /// `pairs` of (receiver field, other field), or every field name the two relations
    /// share when `pairs` is `None`. The field of `other` in each pair is dropped and
    /// the remaining fields lose their prefix, unless that would make two fields share
    /// a name. Without pairs, the result is the cartesian product of the relations.
    ///
    /// **Example**:
    /// ```rust
    /// use relalg_core::{insert, Field, Relation, Value};
    ///
    /// let mut person = Relation::new("Person", vec![Field::any("id"), Field::any("name")]).unwrap();
    /// let mut details = Relation::new("Details", vec![Field::any("id"), Field::any("age")]).unwrap();
    /// insert!(person, "id" => 1, "name" => "Pupuce").unwrap();
    /// insert!(details, "id" => 1, "age" => 16).unwrap();
    ///
    /// let joined = person.natural_join(&details, None).unwrap();
    /// assert_eq!("Person |x| Details", joined.name());
    /// assert_eq!(vec!["id", "name", "age"], joined.field_names());
    /// assert_eq!(
    ///     vec![Value::from(1), Value::from("Pupuce"), Value::from(16)],
    ///     joined.tuples()[0].values()
    /// );
    /// ```
    pub fn natural_join(&self, other: &Self, pairs: Option<&[(&str, &str)]>) -> Result<Self, Error> {
        let pairs: Vec<(&str, &str)> = match pairs {
            Some(pairs) => pairs.to_vec(),
            None => self
                .fields
                .iter()
                .map(Field::name)
                .filter(|name| other.field(name).is_some())
                .map(|name| (name, name))
                .collect(),
        };

        let mut dropped = Vec::with_capacity(pairs.len());
        let mut conjuncts = Vec::with_capacity(pairs.len());
        for (left, right) in &pairs {
            self.position(left)?;
            dropped.push(self.fields.len() + other.position(right)?);
            conjuncts.push(format!(
                "{} == {}",
                quote_identifier(&format!("{}.{}", self.name, left)),
                quote_identifier(&format!("{}.{}", other.name, right))
            ));
        }

        let joined = if conjuncts.is_empty() {
            self.cartesian_product(other)?
        } else {
            self.theta_join(other, &conjuncts.join(" and "))?
        };

        let left_names: Vec<&str> = self.fields.iter().map(Field::name).collect();
        let mut positions = Vec::with_capacity(joined.fields.len());
        let mut fields = Vec::with_capacity(joined.fields.len());
        for (i, field) in joined.fields.iter().enumerate() {
            if dropped.contains(&i) {
                continue;
            }
            let stripped = if i < self.fields.len() {
                strip(field, &self.name)
            } else {
                strip(field, &other.name).filter(|f| !left_names.contains(&f.name()))
            };
            positions.push(i);
            fields.push(stripped.unwrap_or_else(|| field.clone()));
        }

        let tuples = joined.tuples.iter().map(|t| t.pick(&positions)).collect();
        let result = Self::with_tuples(format!("{} |x| {}", self.name, other.name), fields, tuples)?;
        trace!(
            "natural join of `{}` and `{}` on {:?}: {} tuples",
            self.name,
            other.name,
            pairs,
            result.len()
        );
        Ok(result)
    }

    /// Returns the theta join of the receiver and `other`, followed by the tuples of
    /// either side that match no tuple of the other, padded with nulls.
    ///
    /// **Example**:
    /// ```rust
    /// use relalg_core::{insert, Field, Relation, Value};
    ///
    /// let mut a = Relation::new("A", vec![Field::any("id")]).unwrap();
    /// let mut b = Relation::new("B", vec![Field::any("id")]).unwrap();
    /// insert!(a, "id" => 1).unwrap();
    /// insert!(a, "id" => 2).unwrap();
    /// insert!(b, "id" => 2).unwrap();
    /// insert!(b, "id" => 3).unwrap();
    ///
    /// let joined = a.outer_join(&b, "A.id == B.id").unwrap();
    /// assert_eq!("A full outer join B", joined.name());
    /// assert_eq!(
    ///     vec![
    ///         vec![Value::from(2), Value::from(2)],
    ///         vec![Value::from(1), Value::Null],
    ///         vec![Value::Null, Value::from(3)],
    ///     ],
    ///     joined.tuples().iter().map(|t| t.values().to_vec()).collect::<Vec<_>>()
    /// );
    /// ```
    pub fn outer_join(&self, other: &Self, predicate: &str) -> Result<Self, Error> {
        self.outer(other, predicate, Side::Both)
    }

    /// Returns the theta join of the receiver and `other`, followed by the tuples of
    /// the receiver that match no tuple of `other`, padded with nulls.
    pub fn left_outer_join(&self, other: &Self, predicate: &str) -> Result<Self, Error> {
        self.outer(other, predicate, Side::Left)
    }

    /// Returns the theta join of the receiver and `other`, followed by the tuples of
    /// `other` that match no tuple of the receiver, padded with nulls.
    pub fn right_outer_join(&self, other: &Self, predicate: &str) -> Result<Self, Error> {
        self.outer(other, predicate, Side::Right)
    }

    fn outer(&self, other: &Self, predicate: &str, side: Side) -> Result<Self, Error> {
        let joined = self.theta_join(other, predicate)?;
        let width = self.fields.len();
        let mut tuples = joined.tuples.clone();

        if side != Side::Right {
            let nulls = Tuple::new(vec![Value::Null; other.fields.len()]);
            for tuple in &self.tuples {
                if !joined.tuples.iter().any(|t| &t.values()[..width] == tuple.values()) {
                    tuples.push(tuple.concat(&nulls));
                }
            }
        }
        if side != Side::Left {
            let nulls = Tuple::new(vec![Value::Null; width]);
            for tuple in &other.tuples {
                if !joined.tuples.iter().any(|t| &t.values()[width..] == tuple.values()) {
                    tuples.push(nulls.concat(tuple));
                }
            }
        }

        let result = Self {
            name: format!("{} {} outer join {}", self.name, side, other.name),
            fields: joined.fields,
            tuples,
        };
        trace!(
            "{} outer join of `{}` and `{}`: {} tuples",
            side,
            self.name,
            other.name,
            result.len()
        );
        Ok(result)
    }
}

/// Is the side whose unmatched tuples are kept by an outer join.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Left,
    Right,
    Both,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
            Side::Both => f.write_str("full"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{insert, Constraint, Domain, ValueType};

    fn values(relation: &Relation) -> Vec<Vec<Value>> {
        relation.tuples().iter().map(|t| t.values().to_vec()).collect()
    }

    fn ids(name: &str, ids: &[i64]) -> Relation {
        let mut r = Relation::new(name, vec![Field::any("id")]).unwrap();
        for &id in ids {
            insert!(r, "id" => id).unwrap();
        }
        r
    }

    fn person() -> Relation {
        let mut r = Relation::new(
            "Person",
            vec![
                Field::new("id", Domain::new().with_types(vec![ValueType::Int])),
                Field::new(
                    "name",
                    Domain::new()
                        .with_types(vec![ValueType::Str])
                        .with_constraints(vec![Constraint::string_length(1, 6)]),
                ),
            ],
        )
        .unwrap();
        insert!(r, "id" => 1, "name" => "Pupuce").unwrap();
        insert!(r, "id" => 3, "name" => "Japon").unwrap();
        r
    }

    fn person_details() -> Relation {
        let mut r = Relation::new(
            "PersonDetails",
            vec![
                Field::new("id", Domain::new().with_types(vec![ValueType::Int])),
                Field::new(
                    "age",
                    Domain::new()
                        .with_types(vec![ValueType::Int])
                        .with_constraints(vec![Constraint::range(16, 32)]),
                ),
            ],
        )
        .unwrap();
        insert!(r, "id" => 1, "age" => 16).unwrap();
        insert!(r, "id" => 2, "age" => 18).unwrap();
        insert!(r, "id" => 3, "age" => 20).unwrap();
        r
    }

    #[test]
    fn test_cartesian_product() {
        let a = person();
        let b = person_details();
        let product = a.cartesian_product(&b).unwrap();
        assert_eq!(a.len() * b.len(), product.len());
        assert_eq!(a.fields().len() + b.fields().len(), product.fields().len());
        assert_eq!(
            vec!["Person.id", "Person.name", "PersonDetails.id", "PersonDetails.age"],
            product.field_names()
        );
        assert_eq!(
            vec![Value::from(1), Value::from("Pupuce"), Value::from(1), Value::from(16)],
            product.tuples()[0].values()
        );
    }

    #[test]
    fn test_cartesian_product_empty() {
        let a = person();
        let empty = ids("E", &[]);
        assert!(a.cartesian_product(&empty).unwrap().is_empty());
        assert!(empty.cartesian_product(&a).unwrap().is_empty());
    }

    #[test]
    fn test_cartesian_product_self() {
        let a = ids("A", &[1, 2]);
        assert_eq!(
            Err(Error::DuplicateField {
                name: "A.id".to_string(),
                relation: "A x A".to_string(),
            }),
            a.cartesian_product(&a)
        );
        let product = a.cartesian_product(&a.renamed("B")).unwrap();
        assert_eq!(4, product.len());
    }

    #[test]
    fn test_theta_join() {
        let a = ids("A", &[1, 2, 3]);
        let b = ids("B", &[2, 3, 4]);
        let joined = a.theta_join(&b, "A.id < B.id").unwrap();
        assert_eq!(
            vec![
                vec![Value::from(1), Value::from(2)],
                vec![Value::from(1), Value::from(3)],
                vec![Value::from(1), Value::from(4)],
                vec![Value::from(2), Value::from(3)],
                vec![Value::from(2), Value::from(4)],
                vec![Value::from(3), Value::from(4)],
            ],
            values(&joined)
        );
        assert!(matches!(
            a.theta_join(&b, "id < B.id"),
            Err(Error::UnknownField { .. })
        ));
    }

    #[test]
    fn test_equi_join() {
        let joined = person().equi_join(&person_details(), "id", "id").unwrap();
        assert_eq!(
            vec![
                vec![Value::from(1), Value::from("Pupuce"), Value::from(1), Value::from(16)],
                vec![Value::from(3), Value::from("Japon"), Value::from(3), Value::from(20)],
            ],
            values(&joined)
        );
        assert_eq!(
            Err(Error::UnknownField {
                name: "age".to_string(),
                relation: "Person".to_string(),
            }),
            person().equi_join(&person_details(), "age", "id")
        );
    }

    #[test]
    fn test_equi_join_quoted_names() {
        let a = ids("Relation one", &[1, 2]);
        let b = ids("Relation two", &[2]);
        let joined = a.equi_join(&b, "id", "id").unwrap();
        assert_eq!(vec![vec![Value::from(2), Value::from(2)]], values(&joined));
    }

    #[test]
    fn test_natural_join() {
        let joined = person().natural_join(&person_details(), None).unwrap();
        assert_eq!("Person |x| PersonDetails", joined.name());
        assert_eq!(vec!["id", "name", "age"], joined.field_names());
        assert_eq!(
            vec![
                vec![Value::from(1), Value::from("Pupuce"), Value::from(16)],
                vec![Value::from(3), Value::from("Japon"), Value::from(20)],
            ],
            values(&joined)
        );
    }

    #[test]
    fn test_natural_join_explicit_pairs() {
        let mut owner = Relation::new("Owner", vec![Field::any("person"), Field::any("id")]).unwrap();
        insert!(owner, "person" => 3, "id" => 100).unwrap();

        let joined = person()
            .natural_join(&owner, Some(&[("id", "person")][..]))
            .unwrap();
        assert_eq!(vec!["id", "name", "Owner.id"], joined.field_names());
        assert_eq!(
            vec![vec![Value::from(3), Value::from("Japon"), Value::from(100)]],
            values(&joined)
        );

        assert!(matches!(
            person().natural_join(&owner, Some(&[("id", "owner")][..])),
            Err(Error::UnknownField { .. })
        ));
    }

    #[test]
    fn test_natural_join_no_shared_fields() {
        let a = ids("A", &[1, 2]);
        let mut b = Relation::new("B", vec![Field::any("tag")]).unwrap();
        insert!(b, "tag" => "x").unwrap();

        let joined = a.natural_join(&b, None).unwrap();
        assert_eq!(vec!["id", "tag"], joined.field_names());
        assert_eq!(2, joined.len());
    }

    #[test]
    fn test_outer_join() {
        let a = ids("A", &[1, 2]);
        let b = ids("B", &[2, 3]);
        {
            let joined = a.outer_join(&b, "A.id == B.id").unwrap();
            assert_eq!(vec!["A.id", "B.id"], joined.field_names());
            assert_eq!(
                vec![
                    vec![Value::from(2), Value::from(2)],
                    vec![Value::from(1), Value::Null],
                    vec![Value::Null, Value::from(3)],
                ],
                values(&joined)
            );
        }
        {
            let joined = a.left_outer_join(&b, "A.id == B.id").unwrap();
            assert_eq!("A left outer join B", joined.name());
            assert_eq!(
                vec![
                    vec![Value::from(2), Value::from(2)],
                    vec![Value::from(1), Value::Null],
                ],
                values(&joined)
            );
        }
        {
            let joined = a.right_outer_join(&b, "A.id == B.id").unwrap();
            assert_eq!("A right outer join B", joined.name());
            assert_eq!(vec!["A.id", "B.id"], joined.field_names());
            assert_eq!(
                vec![
                    vec![Value::from(2), Value::from(2)],
                    vec![Value::Null, Value::from(3)],
                ],
                values(&joined)
            );
        }
    }

    #[test]
    fn test_outer_join_nothing_matches() {
        let a = ids("A", &[1]);
        let b = ids("B", &[2]);
        let joined = a.outer_join(&b, "false").unwrap();
        assert_eq!(
            vec![vec![Value::from(1), Value::Null], vec![Value::Null, Value::from(2)]],
            values(&joined)
        );
    }
}
