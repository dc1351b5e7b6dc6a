//! Runs against a real project. Needs SUPABASE_URL, SUPABASE_ANON_KEY,
//! TODOS_TEST_EMAIL and TODOS_TEST_PASSWORD, and the migrations applied.
//!
//!     cargo test --test live_supabase -- --ignored

use dotenv::dotenv;

use neon_todos::view::TodoStats;
use neon_todos::TodoClient;

#[tokio::test]
#[ignore]
async fn test_round_trip_against_project() {
    dotenv().ok();

    let (Ok(email), Ok(password)) = (
        std::env::var("TODOS_TEST_EMAIL"),
        std::env::var("TODOS_TEST_PASSWORD"),
    ) else {
        println!("Skipping: TODOS_TEST_EMAIL / TODOS_TEST_PASSWORD not set");
        return;
    };

    let client = TodoClient::from_env().expect("SUPABASE_URL and SUPABASE_ANON_KEY must be set");
    let session = client
        .auth()
        .sign_in_with_password(&email, &password)
        .await
        .expect("sign-in failed");

    let todos = client.todo_list();
    let before = todos.fetch().await.unwrap();
    let text = format!("live test {}", chrono::Utc::now().timestamp_millis());

    let items = todos.add(&text).await.unwrap();
    assert_eq!(items.len(), before.len() + 1);
    let added = items.iter().find(|item| item.task == text).unwrap().clone();
    assert_eq!(added.owner_id, session.user.id);

    let items = todos.toggle(added.id, true).await.unwrap();
    assert!(items.iter().any(|item| item.id == added.id && item.is_complete));
    assert!(TodoStats::from_items(&items).completed >= 1);

    let items = todos.remove(added.id).await.unwrap();
    assert!(items.iter().all(|item| item.id != added.id));

    client.auth().sign_out().await.unwrap();
}
