use relalg_core::{Constraint, Domain, Error, Field, Value, ValueType};

fn main() -> Result<(), Error> {
    let domain1 = Domain::new()
        .with_values(vec![1, 2, 3])
        .with_types(vec![ValueType::Int])
        .with_constraints(vec![Constraint::range(1, 5), Constraint::positive()]);
    let domain2 = Domain::new()
        .with_values(vec![2, 3, 4])
        .with_types(vec![ValueType::Int])
        .with_constraints(vec![Constraint::range(3, 6)]);

    println!("domain1:      {}", domain1);
    println!("domain2:      {}", domain2);
    println!("union:        {}", domain1.union(&domain2)?);
    println!("intersection: {}", domain1.intersection(&domain2)?);
    println!("difference:   {}", domain1.difference(&domain2)?);

    let age = Field::new("age", domain1);
    for value in vec![Value::from(4), Value::from(7), Value::from(-1), Value::from("4")] {
        match age.check(&value) {
            Ok(()) => println!("{} is a valid age", value),
            Err(reason) => println!("{} is not a valid age: {}", value, reason),
        }
    }

    match Constraint::range(1, 2).intersection(&Constraint::range(3, 4)) {
        Err(e) => println!("{}", e),
        Ok(c) => println!("unexpected intersection: {}", c),
    }
    match Constraint::range(1, 2).union(&Constraint::string_length(3, 4)) {
        Err(e) => println!("{}", e),
        Ok(c) => println!("unexpected union: {}", c),
    }

    Ok(())
}
