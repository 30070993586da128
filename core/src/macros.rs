/// Inserts a tuple into a relation, given as `field => value` pairs.
///
/// Expands to a call to [`Relation::insert`] and returns its result.
///
/// **Example**:
/// ```rust
/// use relalg_core::{insert, Field, Relation};
///
/// let mut r = Relation::new("Person", vec![Field::any("id"), Field::any("name")]).unwrap();
/// insert!(r, "id" => 1, "name" => "Pupuce").unwrap();
/// insert!(r, "id" => 3, "name" => "Japon",).unwrap();
/// assert_eq!(2, r.len());
/// ```
///
/// [`Relation::insert`]: ./struct.Relation.html#method.insert
#[macro_export]
macro_rules! insert {
    ($relation:expr, $($name:expr => $value:expr),* $(,)?) => {
        $relation.insert(::std::vec![$(($name, $crate::Value::from($value))),*])
    };
}
