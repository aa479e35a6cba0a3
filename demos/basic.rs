use supabase_rs::{ClientOptions, RealtimeChannelOptions, SupabaseConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Reads SUPABASE_URL / SUPABASE_KEY, from .env when present
    let config = SupabaseConfig::from_env()?;
    let client = config
        .connect(Some(ClientOptions::default().with_schema("public")))
        .await?;
    println!("Client ready for {}", client.supabase_url());

    // Query
    let todos = client.table("todos").select("*").limit(5).execute().await?;
    println!("todos ({}): {}", todos.status, todos.data);

    // Storage
    for bucket in client.storage().list_buckets().await? {
        println!("bucket: {} (public: {})", bucket.name, bucket.public);
    }

    // Realtime
    let channel = client.channel("room1", RealtimeChannelOptions::default()).await;
    let mut rx = channel.on("message").await;
    client.realtime().connect().await?;
    channel.subscribe().await?;
    println!("Subscribed to {}, press Ctrl+C to exit", channel.topic());

    loop {
        tokio::select! {
            Some(payload) = rx.recv() => println!("message: {}", payload),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    client.remove_all_channels().await?;
    println!("Disconnected!");

    Ok(())
}
