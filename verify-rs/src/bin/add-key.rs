//! Provision an API key for a caller

use verify_rs::security::ApiKeyStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <user-id> [name] [database-url]", args[0]);
        eprintln!("Example: {} customer-42 \"production key\"", args[0]);
        std::process::exit(1);
    }

    let user_id = &args[1];
    let name = args.get(2).map(String::as_str).unwrap_or("default");
    let database_url = args.get(3).map(String::as_str).unwrap_or("sqlite://keys.db");

    println!("Provisioning API key for: {}", user_id);

    let store = ApiKeyStore::new(database_url).await?;
    let key = store.add_key(user_id, name).await?;

    println!("✅ API key created successfully");
    println!("   User: {}", user_id);
    println!("   Key:  {}", key);

    Ok(())
}
