//! Probe the database configured in .env / DB_* variables
//! 
//! Run with: cargo run --bin test_db_connection

use table_loader::{test_connection, ConnectionConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match ConnectionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Please set the connection in your .env file:");
            eprintln!("   DB_DIALECT=postgres");
            eprintln!("   DB_HOST=localhost");
            eprintln!("   DB_USER=postgres");
            eprintln!("   DB_PASSWORD=password");
            eprintln!("   DB_NAME=uploads");
            return Err(e.into());
        }
    };

    println!("🔌 Testing {} Connection...\n", config.dialect);
    println!("📡 Connecting to: {}:{}/{}", config.host, config.port, config.database);

    if test_connection(&config).await {
        println!("✅ Connected to {} database successfully!", config.dialect);
        Ok(())
    } else {
        eprintln!("❌ Connection failed (see the warning above)");
        eprintln!("\n💡 Troubleshooting:");
        eprintln!("   1. Is the {} server running?", config.dialect);
        eprintln!("   2. Is the database '{}' created?", config.database);
        eprintln!("   3. Are the username and password correct?");
        eprintln!("   4. Is port {} accessible?", config.port);
        Err("connection failed".into())
    }
}
