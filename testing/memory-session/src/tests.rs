use super::*;
use crate::parser::{RelOp, Statement, Term, parse_statement};

fn session_with_logs() -> MemorySession {
    let session = MemorySession::new();
    session
        .execute(
            "CREATE KEYSPACE \"ks\" WITH REPLICATION = {'class': 'SimpleStrategy', 'replication_factor': 1} AND DURABLE_WRITES = true",
            &[],
        )
        .unwrap();
    session
        .execute(
            "CREATE TABLE \"ks\".\"logs\" (\"user_id\" text, \"id\" bigint, \"tags\" map<text, int>, \
             \"message\" text, PRIMARY KEY ((\"user_id\"), \"id\"))",
            &[],
        )
        .unwrap();

    session
}

fn insert_log(session: &MemorySession, user: &str, id: i64, message: &str) {
    session
        .execute(
            "INSERT INTO \"ks\".\"logs\" (\"user_id\", \"id\", \"message\") VALUES (?, ?, ?)",
            &[Value::from(user), Value::from(id), Value::from(message)],
        )
        .unwrap();
}

fn select(session: &MemorySession, statement: &str, params: &[Value]) -> Result<Vec<Row>, StoreError> {
    let mut cursor = session.stream(statement, params);
    let mut rows = Vec::new();
    while let Some(row) = cursor.scan_row() {
        rows.push(row);
    }
    cursor.close()?;

    Ok(rows)
}

fn ids(rows: &[Row]) -> Vec<i64> {
    rows.iter()
        .map(|row| match row.get("id") {
            Some(Value::BigInt(id)) => *id,
            other => panic!("unexpected id {other:?}"),
        })
        .collect()
}

//
// parser
//

#[test]
fn parses_quoted_and_bare_identifiers() {
    let statement = parse_statement("SELECT \"Mixed\", Bare FROM \"KS\".t WHERE a IN (?, ?)").unwrap();

    let Statement::Select {
        table,
        columns,
        filter,
        ..
    } = statement
    else {
        panic!("expected a select");
    };

    assert_eq!(table.keyspace.as_deref(), Some("KS"));
    assert_eq!(table.name, "t");
    assert_eq!(columns.unwrap(), ["Mixed", "bare"]);
    assert_eq!(filter[0].op, RelOp::In);
    assert_eq!(filter[0].terms, [Term::Param(0), Term::Param(1)]);
}

#[test]
fn doubled_quotes_unescape() {
    let statement = parse_statement("DROP KEYSPACE \"a\"\"b\"").unwrap();

    assert_eq!(
        statement,
        Statement::DropKeyspace {
            name: "a\"b".to_string()
        }
    );
}

#[test]
fn placeholders_number_in_order_of_appearance() {
    let statement =
        parse_statement("UPDATE ks.t SET a = ?, b = 'lit' WHERE k = ? AND c = 5").unwrap();

    let Statement::Update {
        assignments,
        filter,
        ..
    } = statement
    else {
        panic!("expected an update");
    };

    assert_eq!(assignments[0].1, Term::Param(0));
    assert_eq!(assignments[1].1, Term::Literal(Value::from("lit")));
    assert_eq!(filter[0].terms, [Term::Param(1)]);
    assert_eq!(filter[1].terms, [Term::Literal(Value::BigInt(5))]);
}

#[test]
fn rejects_trailing_garbage() {
    let err = parse_statement("DROP TABLE ks.t t2").unwrap_err();

    assert!(matches!(err, MemoryError::Syntax(_)));
}

//
// store
//

#[test]
fn keyspace_and_table_lifecycle() {
    let session = session_with_logs();

    let err = session
        .execute("CREATE TABLE \"ks\".\"logs\" (\"a\" int, PRIMARY KEY (\"a\"))", &[])
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<MemoryError>(),
        Some(&MemoryError::AlreadyExists("table logs".to_string()))
    );

    session.execute("DROP TABLE \"ks\".\"logs\"", &[]).unwrap();
    assert_eq!(session.row_count("ks", "logs"), None);

    session.execute("DROP KEYSPACE \"ks\"", &[]).unwrap();
    assert!(session.execute("DROP KEYSPACE \"ks\"", &[]).is_err());
}

#[test]
fn insert_upserts_by_primary_key() {
    let session = session_with_logs();
    insert_log(&session, "u", 1, "first");
    insert_log(&session, "u", 1, "second");

    let rows = select(&session, "SELECT * FROM \"ks\".\"logs\"", &[]).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["message"], Value::from("second"));
    assert_eq!(rows[0]["tags"], Value::Null);
}

#[test]
fn insert_rejects_missing_key_parts() {
    let session = session_with_logs();

    let err = session
        .execute(
            "INSERT INTO \"ks\".\"logs\" (\"user_id\", \"message\") VALUES (?, ?)",
            &[Value::from("u"), Value::from("m")],
        )
        .unwrap_err();

    assert!(err.to_string().contains("PRIMARY KEY part id"));
}

#[test]
fn rows_come_back_in_clustering_order() {
    let session = session_with_logs();
    for id in [3, 1, 4, 2] {
        insert_log(&session, "u", id, "m");
    }

    let asc = select(&session, "SELECT * FROM \"ks\".\"logs\" WHERE \"user_id\" = ?", &[Value::from("u")]).unwrap();
    let desc = select(
        &session,
        "SELECT * FROM \"ks\".\"logs\" WHERE \"user_id\" = ? ORDER BY id DESC LIMIT 3",
        &[Value::from("u")],
    )
    .unwrap();

    assert_eq!(ids(&asc), [1, 2, 3, 4]);
    assert_eq!(ids(&desc), [4, 3, 2]);
}

#[test]
fn clustering_order_property_sets_default_order() {
    let session = session_with_logs();
    session
        .execute(
            "CREATE TABLE \"ks\".\"recent\" (\"user_id\" text, \"id\" bigint, PRIMARY KEY ((\"user_id\"), \"id\")) \
             WITH CLUSTERING ORDER BY (id DESC) AND comment = 'newest first'",
            &[],
        )
        .unwrap();
    for id in [1_i64, 3, 2] {
        session
            .execute(
                "INSERT INTO \"ks\".\"recent\" (\"user_id\", \"id\") VALUES (?, ?)",
                &[Value::from("u"), Value::from(id)],
            )
            .unwrap();
    }

    let rows = select(&session, "SELECT * FROM \"ks\".\"recent\"", &[]).unwrap();

    assert_eq!(ids(&rows), [3, 2, 1]);
}

#[test]
fn filtering_requires_opt_in() {
    let session = session_with_logs();
    insert_log(&session, "u", 1, "a");
    insert_log(&session, "v", 2, "b");

    let plain = select(
        &session,
        "SELECT * FROM \"ks\".\"logs\" WHERE \"id\" > ?",
        &[Value::from(0_i64)],
    );
    let allowed = select(
        &session,
        "SELECT * FROM \"ks\".\"logs\" WHERE \"id\" > ? ALLOW FILTERING",
        &[Value::from(1_i64)],
    )
    .unwrap();

    assert!(plain.unwrap_err().to_string().contains("ALLOW FILTERING"));
    assert_eq!(ids(&allowed), [2]);
}

#[test]
fn where_in_and_projection() {
    let session = session_with_logs();
    for id in 1..=4 {
        insert_log(&session, "u", id, "m");
    }

    let rows = select(
        &session,
        "SELECT \"id\" FROM \"ks\".\"logs\" WHERE \"user_id\" = ? AND \"id\" IN (?, ?)",
        &[Value::from("u"), Value::from(2_i64), Value::from(4_i64)],
    )
    .unwrap();

    assert_eq!(ids(&rows), [2, 4]);
    assert_eq!(rows[0].len(), 1);
}

#[test]
fn update_creates_or_merges_and_delete_removes() {
    let session = session_with_logs();
    insert_log(&session, "u", 1, "old");

    session
        .execute(
            "UPDATE \"ks\".\"logs\" SET \"message\" = ? WHERE \"user_id\" = ? AND \"id\" = ?",
            &[Value::from("new"), Value::from("u"), Value::from(1_i64)],
        )
        .unwrap();
    session
        .execute(
            "UPDATE \"ks\".\"logs\" SET \"message\" = ? WHERE \"user_id\" = ? AND \"id\" = ?",
            &[Value::from("fresh"), Value::from("u"), Value::from(2_i64)],
        )
        .unwrap();

    let rows = select(&session, "SELECT * FROM \"ks\".\"logs\"", &[]).unwrap();
    assert_eq!(rows[0]["message"], Value::from("new"));
    assert_eq!(rows[1]["message"], Value::from("fresh"));

    session
        .execute(
            "DELETE FROM \"ks\".\"logs\" WHERE \"user_id\" = ? AND \"id\" = ?",
            &[Value::from("u"), Value::from(1_i64)],
        )
        .unwrap();
    assert_eq!(session.row_count("ks", "logs"), Some(1));
}

#[test]
fn update_rejects_partial_keys() {
    let session = session_with_logs();

    let err = session
        .execute(
            "UPDATE \"ks\".\"logs\" SET \"message\" = ? WHERE \"user_id\" = ?",
            &[Value::from("m"), Value::from("u")],
        )
        .unwrap_err();

    assert!(err.to_string().contains("missing"));
}

#[test]
fn schema_tables_lists_tables_per_keyspace() {
    let session = session_with_logs();

    let rows = select(
        &session,
        "SELECT table_name FROM system_schema.tables WHERE keyspace_name = ?",
        &[Value::from("ks")],
    )
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["table_name"], Value::from("logs"));
}

#[test]
fn failed_statement_surfaces_on_close() {
    let session = session_with_logs();

    let err = select(&session, "SELECT * FROM \"ks\".\"missing\"", &[]).unwrap_err();

    assert_eq!(err.to_string(), "unconfigured table missing");
    assert_eq!(session.closes(), 1);
}

#[test]
fn injected_close_failure_hits_next_cursor_only() {
    let session = session_with_logs();
    session.fail_next_close("read timeout");

    let first = select(&session, "SELECT * FROM \"ks\".\"logs\"", &[]);
    let second = select(&session, "SELECT * FROM \"ks\".\"logs\"", &[]);

    assert_eq!(first.unwrap_err().to_string(), "read timeout");
    assert!(second.is_ok());
    assert_eq!(session.closes(), 2);
}
