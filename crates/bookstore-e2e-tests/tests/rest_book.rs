use bookstore_e2e_tests::{base_url, launch_env, prepare_env};
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_health() {
    let (args, _config_guard) = prepare_env("test_health").unwrap();
    let base = base_url(&args);
    let client = launch_env(args).await.unwrap();

    let response = client.get(format!("{base}/health")).send().await.unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
#[traced_test]
async fn test_book_crud() {
    let (args, _config_guard) = prepare_env("test_book_crud").unwrap();
    let base = base_url(&args);
    let client = launch_env(args).await.unwrap();
    let api_url = format!("{base}/book");

    let payload = json!({"name":"Dune","author":"Herbert","publications":"Ace"});
    let response = client.post(&api_url).json(&payload).send().await.unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 200);
    let created: serde_json::Value = response.json().await.unwrap();
    let id = created.get("id").unwrap().as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(created.get("name").unwrap(), "Dune");
    assert_eq!(created.get("author").unwrap(), "Herbert");
    assert_eq!(created.get("publications").unwrap(), "Ace");

    let response = client.get(&api_url).send().await.unwrap();
    assert!(response.status().is_success());
    let books: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].get("name").unwrap(), "Dune");

    let record_url = format!("{api_url}/{id}");
    let response = client.get(&record_url).send().await.unwrap();
    assert!(response.status().is_success());
    let fetched: serde_json::Value = response.json().await.unwrap();
    assert_eq!(fetched, created);

    // Empty fields keep the stored values, non-empty ones overwrite.
    let patch = json!({"name":"","author":"Frank Herbert","publications":""});
    let response = client.put(&record_url).json(&patch).send().await.unwrap();
    info!("Response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated.get("name").unwrap(), "Dune");
    assert_eq!(updated.get("author").unwrap(), "Frank Herbert");
    assert_eq!(updated.get("publications").unwrap(), "Ace");

    let response = client.delete(&record_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let deleted: serde_json::Value = response.json().await.unwrap();
    assert_eq!(deleted.get("id").unwrap().as_i64().unwrap(), id);
    assert_eq!(deleted.get("name").unwrap(), "Dune");

    // Second delete still succeeds, with a zero-valued book.
    let response = client.delete(&record_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let deleted: serde_json::Value = response.json().await.unwrap();
    assert_eq!(deleted.get("id").unwrap().as_i64().unwrap(), 0);
    assert_eq!(deleted.get("name").unwrap(), "");

    let response = client.get(&record_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client.get(&api_url).send().await.unwrap();
    let books: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(books.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_book_create_empty() {
    let (args, _config_guard) = prepare_env("test_book_create_empty").unwrap();
    let base = base_url(&args);
    let client = launch_env(args).await.unwrap();

    // No field validation - missing fields decode to empty strings.
    let response = client
        .post(format!("{base}/book"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let created: serde_json::Value = response.json().await.unwrap();
    assert!(created.get("id").unwrap().as_i64().unwrap() > 0);
    assert_eq!(created.get("name").unwrap(), "");
    assert_eq!(created.get("author").unwrap(), "");
    assert_eq!(created.get("publications").unwrap(), "");
}

#[tokio::test]
#[traced_test]
async fn test_book_delete_absent() {
    let (args, _config_guard) = prepare_env("test_book_delete_absent").unwrap();
    let base = base_url(&args);
    let client = launch_env(args).await.unwrap();

    let response = client
        .delete(format!("{base}/book/9999"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let deleted: serde_json::Value = response.json().await.unwrap();
    assert_eq!(deleted.get("id").unwrap().as_i64().unwrap(), 0);
}

#[tokio::test]
#[traced_test]
async fn test_book_bad_requests() {
    let (args, _config_guard) = prepare_env("test_book_bad_requests").unwrap();
    let base = base_url(&args);
    let client = launch_env(args).await.unwrap();
    let api_url = format!("{base}/book");

    // Malformed JSON body is a 400, never a 500.
    let response = client
        .post(&api_url)
        .header("content-type", "application/json")
        .body("not json at all")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Wrong field type.
    let response = client
        .post(&api_url)
        .json(&json!({"name": 42}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Non-numeric path id.
    let response = client
        .get(format!("{api_url}/not-a-number"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .delete(format!("{api_url}/not-a-number"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Bad body on update.
    let book = client
        .post(&api_url)
        .json(&json!({"name":"X","author":"Y","publications":"Z"}))
        .send()
        .await
        .unwrap();
    let book: serde_json::Value = book.json().await.unwrap();
    let id = book.get("id").unwrap().as_i64().unwrap();
    let response = client
        .put(format!("{api_url}/{id}"))
        .header("content-type", "application/json")
        .body("{broken")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Update of an absent id is a 404.
    let response = client
        .put(format!("{api_url}/99999"))
        .json(&json!({"name":"New"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
