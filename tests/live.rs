//! Tests against a real Supabase project.
//!
//! Skipped unless `SUPABASE_TEST_URL` and `SUPABASE_TEST_KEY` are set.

use supabase_rs::{ClientOptions, SupabaseConfig};

fn config() -> Option<SupabaseConfig> {
    dotenvy::dotenv().ok();
    match SupabaseConfig::from_vars("SUPABASE_TEST_URL", "SUPABASE_TEST_KEY") {
        Ok(config) => Some(config),
        Err(_) => {
            eprintln!("SUPABASE_TEST_URL / SUPABASE_TEST_KEY not set, skipping");
            None
        }
    }
}

#[tokio::test]
async fn test_live_client_connects() {
    let Some(config) = config() else {
        return;
    };

    let client = config
        .connect(Some(ClientOptions::default().with_auto_refresh_token(false)))
        .await
        .unwrap();

    assert!(client.auth().get_session().await.unwrap().is_none());
    client.storage().list_buckets().await.unwrap();
}

#[tokio::test]
async fn test_live_realtime_join() {
    let Some(config) = config() else {
        return;
    };

    let client = config.connect(None).await.unwrap();
    let channel = client
        .channel("live-test", Default::default())
        .await;

    client.realtime().connect().await.unwrap();
    channel.subscribe().await.unwrap();
    client.remove_channel(&channel).await.unwrap();
    assert!(!client.realtime().is_connected().await);
}
