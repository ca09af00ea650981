//! Server command implementation

use std::path::Path;

use anyhow::Result;

use super::open_ledger;

pub async fn cmd_serve(
    db_path: &Path,
    config_path: Option<&Path>,
    host: &str,
    port: u16,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting Salesbook web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let ledger = open_ledger(db_path, config_path, no_encrypt)?;
    salesbook_server::serve(ledger, host, port).await?;

    Ok(())
}
