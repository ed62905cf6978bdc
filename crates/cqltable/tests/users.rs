use cqltable::{
    error::ValidationError,
    prelude::*,
};
use cqltable_testkit::MemorySession;
use serde_json::json;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct User {
    email: String,
    #[cql("password")]
    password: String,
    #[cql(rename = "active")]
    is_active: bool,
    created: DateTime<Utc>,
}

fn user(n: u32) -> User {
    User {
        email: format!("{n}@example.com"),
        password: "123456".to_string(),
        is_active: true,
        created: Utc::now(),
    }
}

fn setup() -> (Arc<MemorySession>, Keyspace, Crud<User>) {
    let session = MemorySession::shared();
    let keyspace = Keyspace::new("cqltable_test", session.clone());
    keyspace
        .create(
            &json!({ "class": "SimpleStrategy", "replication_factor": 1 }),
            true,
        )
        .unwrap();

    let users = Crud::new(keyspace.new_table(
        "users",
        ["email"],
        Vec::<String>::new(),
        User::default(),
    ));
    users.create().unwrap();

    (session, keyspace, users)
}

#[test]
fn user_lifecycle() {
    let (_, _, users) = setup();
    let originals = (1..=3).map(user).collect::<Vec<_>>();

    for record in &originals {
        users.insert(record).unwrap();
    }
    assert_eq!(users.list(&[]).unwrap().len(), 3);

    let mut found = users.get(&[Value::from("2@example.com")]).unwrap();
    assert_eq!(found, originals[1]);

    found.password = "654321".to_string();
    users.update(&found).unwrap();
    users.delete(&originals[2]).unwrap();

    let remaining = users.list(&[]).unwrap();
    assert_eq!(remaining.len(), 2);

    let updated = remaining
        .iter()
        .find(|record| record.email == "2@example.com")
        .unwrap();
    assert_eq!(updated.password, "654321");
    assert!(remaining.iter().all(|record| record.email != "3@example.com"));
}

#[test]
fn get_of_missing_row_is_not_found() {
    let (_, _, users) = setup();

    let err = users.get(&[Value::from("nobody@example.com")]).unwrap_err();

    assert!(err.is_not_found());
}

#[test]
fn key_validation_happens_before_any_statement() {
    let (session, _, users) = setup();
    let sent = session.statements().len();

    let short = users.get(&[]).unwrap_err();
    let blank = users
        .insert(&User {
            email: String::new(),
            ..user(1)
        })
        .unwrap_err();

    assert!(matches!(
        short,
        Error::Validation(ValidationError::TooFewKeys {
            found: 0,
            required: 1,
            ..
        })
    ));
    assert!(matches!(
        blank,
        Error::Validation(ValidationError::MissingKey { .. })
    ));
    assert_eq!(session.statements().len(), sent);
}

#[test]
fn keyspace_lists_created_tables() {
    let (_, keyspace, users) = setup();
    keyspace
        .new_table("audit", ["id"], Vec::<String>::new(), User::default())
        .drop()
        .unwrap_err();

    let tables = keyspace.tables().unwrap();
    assert_eq!(tables, ["users"]);

    users.drop().unwrap();
    assert!(keyspace.tables().unwrap().is_empty());

    keyspace.drop().unwrap();
}

#[test]
fn store_rejections_pass_through() {
    let (_, _, users) = setup();

    let err = users.create().unwrap_err();

    assert_eq!(err.class(), ErrorClass::Store);
    assert_eq!(err.to_string(), "table users already exists");
}
