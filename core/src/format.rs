//! Renders relations as fixed-width text tables.
use crate::Relation;

/// Returns `relation` as a text table: a header with the field names followed by
/// one line per tuple, or `Empty set` if the relation has no tuples. Every column
/// is as wide as its widest name or value.
///
/// **Example**:
/// ```rust
/// use relalg_core::{format, insert, Field, Relation};
///
/// let mut r = Relation::new("Person", vec![Field::any("id"), Field::any("name")]).unwrap();
/// assert_eq!("Empty set", format::render(&r));
///
/// insert!(r, "id" => 1, "name" => "Pupuce").unwrap();
/// assert_eq!(
///     "+----+--------+\n\
///      | id | name   |\n\
///      +----+--------+\n\
///      | 1  | Pupuce |\n\
///      +----+--------+",
///     format::render(&r)
/// );
/// ```
pub fn render(relation: &Relation) -> String {
    if relation.is_empty() {
        return "Empty set".to_string();
    }

    let rows: Vec<Vec<String>> = relation
        .tuples()
        .iter()
        .map(|t| t.values().iter().map(ToString::to_string).collect())
        .collect();

    let widths: Vec<usize> = relation
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(field.name().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = line(widths.iter().map(|&w| "-".repeat(w)), '+', '-');
    let header = line(
        relation
            .fields()
            .iter()
            .zip(&widths)
            .map(|(field, &w)| pad(field.name(), w)),
        '|',
        ' ',
    );

    let mut lines = vec![border.clone(), header, border.clone()];
    for row in &rows {
        lines.push(line(
            row.iter().zip(&widths).map(|(value, &w)| pad(value, w)),
            '|',
            ' ',
        ));
    }
    lines.push(border);
    lines.join("\n")
}

/// Joins `cells` into `<s><f>cell<f><s><f>cell<f><s>`.
fn line(cells: impl Iterator<Item = String>, separator: char, fill: char) -> String {
    let mut result = String::new();
    result.push(separator);
    for cell in cells {
        result.push(fill);
        result.push_str(&cell);
        result.push(fill);
        result.push(separator);
    }
    result
}

fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{insert, Field};

    #[test]
    fn test_empty() {
        let r = Relation::new("R", vec![Field::any("id")]).unwrap();
        assert_eq!("Empty set", render(&r));
        assert_eq!("Empty set", r.to_string());
    }

    #[test]
    fn test_render() {
        let mut r = Relation::new("Person", vec![Field::any("id"), Field::any("name")]).unwrap();
        insert!(r, "id" => 1, "name" => "Pupuce").unwrap();
        insert!(r, "id" => 1000, "name" => "Jo").unwrap();
        insert!(r, "id" => 3).unwrap();
        let expected = vec![
            "+------+--------+",
            "| id   | name   |",
            "+------+--------+",
            "| 1    | Pupuce |",
            "| 1000 | Jo     |",
            "| 3    | null   |",
            "+------+--------+",
        ]
        .join("\n");
        assert_eq!(expected, render(&r));
        assert_eq!(expected, r.to_string());
    }

    #[test]
    fn test_render_wide_characters() {
        let mut r = Relation::new("R", vec![Field::any("x")]).unwrap();
        insert!(r, "x" => "été").unwrap();
        assert_eq!("+-----+\n| x   |\n+-----+\n| été |\n+-----+", render(&r));
    }
}
