//! Runs the HTTP surface against a real MongoDB.
//!
//! Set `TEST_MONGODB_URI` and run with `cargo test -- --ignored`.

mod common;

use common::{memory_config, TestApp};
use mongodb::bson::doc;
use secrecy::Secret;
use serde_json::{json, Value};
use todo_service::config::{MongoConfig, StoreBackend, TodoConfig};
use todo_service::services::MongoTodoStore;

fn mongo_uri() -> String {
    std::env::var("TEST_MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

fn mongo_config(database: &str) -> TodoConfig {
    TodoConfig {
        store: StoreBackend::Mongo,
        mongodb: MongoConfig {
            uri: Secret::new(mongo_uri()),
            database: database.to_string(),
            collection: "todo".to_string(),
        },
        ..memory_config()
    }
}

async fn drop_database(database: &str) {
    let store = MongoTodoStore::connect(&mongo_uri(), database, "todo")
        .await
        .unwrap();
    store.database().drop(None).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires MongoDB at TEST_MONGODB_URI"]
async fn todo_lifecycle_against_mongodb() {
    let database = format!("todo_test_{}", uuid::Uuid::new_v4().simple());
    let app = TestApp::spawn_with_config(mongo_config(&database)).await;
    let client = reqwest::Client::new();
    let todos = format!("{}/todo/", app.address);

    let empty: Value = client.get(&todos).send().await.unwrap().json().await.unwrap();
    assert_eq!(empty, json!({ "message": "No todos in list", "data": [] }));

    let created: Value = client
        .post(&todos)
        .json(&json!({ "title": "buy milk", "completed": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["todo_id"].as_str().unwrap().to_string();

    let listed: Value = client.get(&todos).send().await.unwrap().json().await.unwrap();
    let original = listed["data"][0].clone();
    assert_eq!(original["id"], id.as_str());
    assert_eq!(original["completed"], false);

    let updated = client
        .put(format!("{}{}", todos, id))
        .json(&json!({ "title": "buy juice", "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);

    let listed: Value = client.get(&todos).send().await.unwrap().json().await.unwrap();
    assert_eq!(listed["data"][0]["title"], "buy juice");
    assert_eq!(listed["data"][0]["created_at"], original["created_at"]);

    let deleted = client.delete(format!("{}{}", todos, id)).send().await.unwrap();
    assert_eq!(deleted.status().as_u16(), 200);
    let again = client.delete(format!("{}{}", todos, id)).send().await.unwrap();
    assert_eq!(again.status().as_u16(), 404);

    app.stop().await.unwrap();
    drop_database(&database).await;
}

#[tokio::test]
#[ignore = "Requires MongoDB at TEST_MONGODB_URI"]
async fn startup_creates_created_at_index() {
    let database = format!("todo_test_{}", uuid::Uuid::new_v4().simple());
    let app = TestApp::spawn_with_config(mongo_config(&database)).await;
    app.stop().await.unwrap();

    let store = MongoTodoStore::connect(&mongo_uri(), &database, "todo")
        .await
        .unwrap();
    let indexes = store
        .database()
        .run_command(doc! { "listIndexes": "todo" }, None)
        .await
        .unwrap();
    let names: Vec<String> = indexes
        .get_document("cursor")
        .unwrap()
        .get_array("firstBatch")
        .unwrap()
        .iter()
        .filter_map(|index| index.as_document())
        .filter_map(|index| index.get_str("name").ok().map(str::to_string))
        .collect();
    assert!(names.contains(&"created_at_idx".to_string()));

    drop_database(&database).await;
}

#[tokio::test]
#[ignore = "Requires MongoDB at TEST_MONGODB_URI"]
async fn unreachable_mongodb_fails_startup() {
    let mut config = mongo_config("todo_unreachable");
    config.mongodb.uri =
        Secret::new("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=500".to_string());

    let result = todo_service::startup::Application::build(config).await;

    assert!(matches!(
        result,
        Err(service_core::error::AppError::DatabaseError(_))
    ));
}
