use catalog_core::db::migrations::latest_version;
use catalog_core::db::open_db_in_memory;
use catalog_core::model::tipo::now_epoch_ms;
use catalog_core::{
    ConstraintError, NewTipo, RepoError, SqliteTipoRepository, TipoField, TipoRepository,
    TipoService,
};
use rusqlite::Connection;

#[test]
fn insert_new_tipo_assigns_first_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    let candidate = NewTipo::new("carnico", "test");
    let saved = repo.insert(&candidate).unwrap();

    assert_eq!(saved.id, 1);
    assert_eq!(saved.name, "carnico");
    assert_eq!(saved.user, "test");
    assert_eq!(Some(saved.created_at), candidate.created_at);
    assert!(saved.created_at <= now_epoch_ms());
}

#[test]
fn insert_assigns_sequential_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    let ids: Vec<_> = ["carnico", "lacteo", "vegetal"]
        .into_iter()
        .map(|name| repo.insert(&NewTipo::new(name, "test")).unwrap().id)
        .collect();

    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn insert_twice_is_rejected_as_duplicate_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    repo.insert(&NewTipo::new("carnico", "test")).unwrap();
    assert_eq!(repo.count().unwrap(), 1);

    let err = repo.insert(&NewTipo::new("carnico", "other")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Constraint(ConstraintError::DuplicateName(ref name)) if name == "carnico"
    ));
    assert_eq!(err.constraint().unwrap().code(), "duplicate-name");
    assert!(err.to_string().contains("duplicate-name"));
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn rejected_duplicate_does_not_consume_an_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    repo.insert(&NewTipo::new("carnico", "test")).unwrap();
    repo.insert(&NewTipo::new("carnico", "test")).unwrap_err();
    let next = repo.insert(&NewTipo::new("lacteo", "test")).unwrap();

    assert_eq!(next.id, 2);
}

#[test]
fn insert_without_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    let candidate = NewTipo::default().user("test").created_at(now_epoch_ms());
    let err = repo.insert(&candidate).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Constraint(ConstraintError::MissingField(TipoField::Name))
    ));
    assert!(err.to_string().contains("name"));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn insert_with_blank_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    let err = repo.insert(&NewTipo::new("   ", "test")).unwrap_err();

    assert_eq!(err.constraint().unwrap().code(), "missing-name");
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn insert_without_user_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    let candidate = NewTipo::default().name("carnico2").created_at(now_epoch_ms());
    let err = repo.insert(&candidate).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Constraint(ConstraintError::MissingField(TipoField::User))
    ));
    assert!(err.to_string().contains("user"));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn insert_without_created_at_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    let candidate = NewTipo::new("carnico2", "test").clear_created_at();
    let err = repo.insert(&candidate).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Constraint(ConstraintError::MissingField(TipoField::CreatedAt))
    ));
    assert_eq!(err.constraint().unwrap().code(), "missing-created-at");
    assert!(err.to_string().contains("createdAt"));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn engine_rejects_raw_duplicate_and_null_writes() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO tipos (nombre, usuario) VALUES ('carnico', 'test');",
        [],
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO tipos (nombre, usuario) VALUES ('carnico', 'test');",
        [],
    );
    assert!(duplicate.is_err());

    let null_user = conn.execute("INSERT INTO tipos (nombre) VALUES ('lacteo');", []);
    assert!(null_user.is_err());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM tipos;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn caller_supplied_created_at_is_persisted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    let candidate = NewTipo::new("carnico", "test").created_at(1_700_000_000_000);
    let saved = repo.insert(&candidate).unwrap();
    assert_eq!(saved.created_at, 1_700_000_000_000);

    let loaded = repo.find_by_id(saved.id).unwrap().unwrap();
    assert_eq!(loaded.created_at, 1_700_000_000_000);
    assert_eq!(loaded, saved);
}

#[test]
fn column_default_stamps_created_at() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO tipos (nombre, usuario) VALUES ('carnico', 'test');",
        [],
    )
    .unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    let loaded = repo.find_by_id(1).unwrap().unwrap();
    assert!(loaded.created_at > 0);
    assert!(loaded.created_at <= now_epoch_ms());
}

#[test]
fn find_all_on_empty_store_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn find_all_returns_inserted_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    repo.insert(&NewTipo::new("carnico", "test")).unwrap();

    let all = repo.find_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, 1);
    assert_eq!(all[0].name, "carnico");
    assert_eq!(all[0].user, "test");
    assert!(all[0].created_at <= now_epoch_ms());
}

#[test]
fn find_all_preserves_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    for name in ["vegetal", "carnico", "lacteo"] {
        repo.insert(&NewTipo::new(name, "test")).unwrap();
    }

    let names: Vec<_> = repo
        .find_all()
        .unwrap()
        .into_iter()
        .map(|tipo| tipo.name)
        .collect();
    assert_eq!(names, vec!["vegetal", "carnico", "lacteo"]);
}

#[test]
fn find_by_id_returns_none_or_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    assert!(repo.find_by_id(1).unwrap().is_none());

    let saved = repo.insert(&NewTipo::new("carnico", "test")).unwrap();

    assert_eq!(repo.find_by_id(1).unwrap(), Some(saved));
    assert!(repo.find_by_id(999).unwrap().is_none());
}

#[test]
fn read_paths_reject_invalid_persisted_rows() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE tipos (
            id INTEGER PRIMARY KEY,
            nombre TEXT,
            created_at INTEGER,
            usuario TEXT
        );
        INSERT INTO tipos (id, nombre, created_at, usuario) VALUES (1, 'carnico', 0, '');",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();

    let err = repo.find_by_id(1).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTipoRepository::try_new(&conn).unwrap();
    let service = TipoService::new(repo);

    let created = service.create_tipo("carnico", "test").unwrap();
    assert_eq!(created.id, 1);

    let err = service.create_tipo("carnico", "test").unwrap_err();
    assert_eq!(err.constraint().unwrap().code(), "duplicate-name");

    assert_eq!(service.find_by_id(created.id).unwrap(), Some(created));
    assert_eq!(service.find_all().unwrap().len(), 1);
    assert_eq!(service.count().unwrap(), 1);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteTipoRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_tipos_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTipoRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("tipos"))));
}

#[test]
fn repository_rejects_connection_missing_tipos_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE tipos (
            id INTEGER PRIMARY KEY,
            nombre TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTipoRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "tipos",
            column: "usuario"
        })
    ));
}
