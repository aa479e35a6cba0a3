use supabase_rs::{AuthChangeEvent, SupabaseConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("supabase_rs=debug")),
        )
        .init();

    let client = SupabaseConfig::from_env()?.connect(None).await?;

    let _subscription = client.auth().on_auth_state_change(|event, session| {
        println!(
            "auth event: {} (session: {})",
            event,
            session.is_some()
        );
    });

    let email = std::env::var("SUPABASE_EMAIL")?;
    let password = std::env::var("SUPABASE_PASSWORD")?;

    println!("Signing in as {}...", email);
    client.auth().sign_in_with_password(&email, &password).await?;
    println!(
        "Authorization after sign in: {:?}",
        client.postgrest().headers().get("Authorization")
    );
    println!("Realtime token: {:?}", client.realtime().access_token());

    println!("Signing out...");
    client.auth().sign_out().await?;
    println!(
        "Authorization after sign out: {:?}",
        client.storage().headers().get("Authorization")
    );

    // Apply a token obtained outside the auth client
    let session = supabase_rs::Session::new("external-jwt", "external-refresh");
    client.listen_to_auth_events(AuthChangeEvent::SignedIn, Some(&session));
    println!(
        "Authorization after manual event: {:?}",
        client.functions().headers().get("Authorization")
    );

    Ok(())
}
