use relmap_core::db::open_db_in_memory;
use relmap_core::model::sql_types;
use relmap_core::types::standard::{INTEGER, NUMERIC_BOOLEAN, STRING, UUID, YES_NO};
use relmap_core::{QueryError, QueryParameterBindings, TypeConfiguration, TypeReference};
use rusqlite::Connection;

fn setup() -> (Connection, TypeConfiguration) {
    let conn = open_db_in_memory().expect("in-memory database");
    conn.execute_batch(
        "CREATE TABLE people (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            age INTEGER,
            active TEXT NOT NULL,
            verified INTEGER NOT NULL
        );",
    )
    .expect("create people table");
    (conn, TypeConfiguration::new().expect("configuration"))
}

fn insert_person(
    conn: &Connection,
    configuration: &TypeConfiguration,
    name: &str,
    age: Option<i32>,
    active: bool,
) -> uuid::Uuid {
    let id = uuid::Uuid::new_v4();
    let mut params = QueryParameterBindings::new();
    params.bind(1, &*UUID, Some(id)).expect("bind id");
    params
        .bind(2, &*STRING, Some(name.to_string()))
        .expect("bind name");
    params.bind(3, &*INTEGER, age).expect("bind age");
    params.bind(4, &*YES_NO, Some(active)).expect("bind active");
    params
        .bind(5, &*NUMERIC_BOOLEAN, Some(active))
        .expect("bind verified");

    let changed = params
        .execute(
            conn,
            "INSERT INTO people (id, name, age, active, verified) VALUES (?1, ?2, ?3, ?4, ?5);",
            configuration,
        )
        .expect("insert person");
    assert_eq!(changed, 1);
    id
}

#[test]
fn converter_output_is_written_to_sqlite() {
    let (conn, configuration) = setup();
    insert_person(&conn, &configuration, "ada", Some(36), true);
    insert_person(&conn, &configuration, "grace", None, false);

    let raw: Vec<(String, i64)> = conn
        .prepare("SELECT active, verified FROM people ORDER BY name;")
        .expect("prepare")
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("rows");
    assert_eq!(raw, vec![("Y".to_string(), 1), ("N".to_string(), 0)]);
}

#[test]
fn query_column_reads_values_back_through_the_converter() {
    let (conn, configuration) = setup();
    insert_person(&conn, &configuration, "ada", Some(36), true);
    insert_person(&conn, &configuration, "grace", None, false);

    let params = QueryParameterBindings::new();
    let active = params
        .query_column(
            &conn,
            "SELECT active FROM people ORDER BY name;",
            &configuration,
            &*YES_NO,
        )
        .expect("active column");
    assert_eq!(active, vec![Some(true), Some(false)]);

    let ages = params
        .query_column(
            &conn,
            "SELECT age FROM people ORDER BY name;",
            &configuration,
            &*INTEGER,
        )
        .expect("age column");
    assert_eq!(ages, vec![Some(36), None]);
}

#[test]
fn filter_parameters_use_the_bound_type() {
    let (conn, configuration) = setup();
    let ada = insert_person(&conn, &configuration, "ada", Some(36), true);
    insert_person(&conn, &configuration, "grace", Some(45), false);

    let mut params = QueryParameterBindings::new();
    params.bind(1, &*YES_NO, Some(true)).expect("bind filter");
    let ids = params
        .query_column(
            &conn,
            "SELECT id FROM people WHERE active = ?1;",
            &configuration,
            &*UUID,
        )
        .expect("filtered ids");
    assert_eq!(ids, vec![Some(ada)]);
}

#[test]
fn unresolvable_parameter_type_fails_before_execution() {
    let (conn, configuration) = setup();
    let unknown = TypeReference::<String>::new("json", 1111);

    let mut params = QueryParameterBindings::new();
    params
        .bind(1, &unknown, Some("{}".to_string()))
        .expect("binding defers resolution");
    let err = params
        .execute(&conn, "SELECT ?1;", &configuration)
        .expect_err("unknown type code");
    assert!(matches!(err, QueryError::Resolution(_)));
}

#[test]
fn immutable_variant_binds_like_its_source() {
    let (_conn, configuration) = setup();
    let reference = TypeReference::<String>::new("label", sql_types::VARCHAR).as_immutable();

    let mut params = QueryParameterBindings::new();
    params
        .bind(1, &reference, Some("x".to_string()))
        .expect("bind immutable");
    let values = params.to_sql_values(&configuration).expect("values");
    assert_eq!(values, vec![rusqlite::types::Value::Text("x".to_string())]);
    assert!(configuration.basic_type_registry().contains("imm_label"));
}
