#![allow(dead_code)]

use sea_orm::{Database, DatabaseConnection};

use engine::{Course, Engine, MoneyCents, Role};
use migration::MigratorTrait;

pub const PLATFORM: &str = "platform";
pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";
pub const CAROL: &str = "carol";
pub const ADMIN: &str = "root";

pub async fn migrated_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

/// Engine with the platform account, instructor `alice`, students `bob` and
/// `carol`, and the admin `root`.
pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = migrated_db().await;
    let engine = Engine::builder()
        .database(db.clone())
        .platform_account(PLATFORM)
        .build()
        .await
        .unwrap();
    seed_users(&engine).await;
    (engine, db)
}

pub async fn seed_users(engine: &Engine) {
    engine
        .create_user(PLATFORM, "Lectern", Role::Admin)
        .await
        .unwrap();
    engine
        .create_user(ALICE, "Alice Instructor", Role::Instructor)
        .await
        .unwrap();
    engine
        .create_user(BOB, "Bob Student", Role::Student)
        .await
        .unwrap();
    engine
        .create_user(CAROL, "Carol Student", Role::Student)
        .await
        .unwrap();
    engine
        .create_user(ADMIN, "Site Admin", Role::Admin)
        .await
        .unwrap();
}

pub async fn course(engine: &Engine, title: &str, cents: i64) -> Course {
    engine
        .create_course(ALICE, title, MoneyCents::new(cents))
        .await
        .unwrap()
}

pub async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    use sea_orm::{ConnectionTrait, Statement};

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}
