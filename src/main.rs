use anyhow::Result;
use relalg_core::{insert, Constraint, Domain, Error, Field, Relation, ValueType};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn person() -> Result<Relation> {
    let id = Field::new(
        "id",
        Domain::new()
            .with_values(vec![1, 2, 3, 4])
            .with_types(vec![ValueType::Str])
            .with_constraints(vec![Constraint::string_length(1, 2)]),
    );
    let name = Field::new(
        "name",
        Domain::new()
            .with_values(vec!["Pupuce", "Japon", "Bocdom", "Stove", "Poyz", "Salohy"])
            .with_constraints(vec![Constraint::string_length(1, 6)]),
    );
    let mut person = Relation::new("Person", vec![id, name])?;

    insert!(person, "id" => 1, "name" => "Pupuce")?;
    expect_rejection(insert!(person, "id" => 2, "name" => "RAKOTOBE"))?;
    insert!(person, "id" => 3, "name" => "Japon")?;
    insert!(person, "id" => "20", "name" => "Salohy")?;
    Ok(person)
}

fn person_details() -> Result<Relation> {
    let id = Field::new(
        "id",
        Domain::new()
            .with_types(vec![ValueType::Int, ValueType::Str])
            .with_constraints(vec![Constraint::range(1, 32)]),
    );
    let age = Field::new(
        "age",
        Domain::new()
            .with_types(vec![ValueType::Int])
            .with_constraints(vec![Constraint::range(16, 32), Constraint::positive()]),
    );
    let mut details = Relation::new("PersonDetails", vec![id, age])?;

    insert!(details, "id" => 1, "age" => 16)?;
    expect_rejection(insert!(details, "id" => 2, "age" => 38))?;
    insert!(details, "id" => 3, "age" => 20)?;
    expect_rejection(insert!(details, "id" => 100, "age" => 20))?;
    insert!(details, "id" => "20", "age" => 32)?;
    Ok(details)
}

fn numbers(name: &str, ids: &[i64]) -> Result<Relation> {
    let id = Field::new("id", Domain::new().with_types(vec![ValueType::Int]));
    let mut relation = Relation::new(name, vec![id])?;
    for &id in ids {
        insert!(relation, "id" => id)?;
    }
    Ok(relation)
}

/// Reports an insert that the domains are expected to reject; any other failure
/// is returned.
fn expect_rejection(result: Result<(), Error>) -> Result<()> {
    match result {
        Err(e @ Error::Validation { .. }) | Err(e @ Error::DuplicateRow { .. }) => {
            warn!("rejected: {}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
        Ok(()) => Err(anyhow::anyhow!("expected the insert to be rejected")),
    }
}

fn show(title: &str, relation: &Relation) {
    info!("{} ({} tuples)", title, relation.len());
    println!("{}\n{}\n", relation.name(), relation);
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let person = person()?;
    let details = person_details()?;
    show("person", &person);
    show("person details", &details);

    show("projection", &person.project(&["id"])?);
    show("selection", &person.select("name == 'Japon' or id == '20'")?);
    show("cartesian product", &person.cartesian_product(&details)?);
    show(
        "theta join",
        &person.theta_join(&details, "Person.id == PersonDetails.id and PersonDetails.age > 16")?,
    );
    show("equi join", &person.equi_join(&details, "id", "id")?);
    let natural = person.natural_join(&details, None)?;
    show("natural join", &natural);
    for row in natural.rows() {
        debug!("{:?}", row.to_map());
    }

    let a = numbers("A", &[1, 2])?;
    let b = numbers("B", &[2, 3])?;
    show("full outer join", &a.outer_join(&b, "A.id == B.id")?);
    show("left outer join", &a.left_outer_join(&b, "A.id == B.id")?);
    show("right outer join", &a.right_outer_join(&b, "A.id == B.id")?);

    let relation1 = numbers("Relation1", &[1, 2, 3])?;
    let relation2 = numbers("Relation2", &[2, 3, 4])?;
    let mapping = [("id", "id")];
    show("union", &relation1.union(&relation2, &mapping)?);
    show("intersection", &relation1.intersection(&relation2, &mapping)?);
    show("difference", &relation1.difference(&relation2, &mapping)?);

    Ok(())
}
