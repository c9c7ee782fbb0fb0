//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use cogcommit::config::CogCommitConfig;
use cogcommit::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &CogCommitConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `cogcommit import` to create it.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("CogCommit Health Report");
    println!("=======================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Row counts:");
    println!("  Commits:         {}", report.commit_count);
    println!("  Sessions:        {}", report.session_count);
    println!("  Turns:           {}", report.turn_count);
    println!("  Pending sync:    {}", report.pending_sync);
    println!();
    println!(
        "Sync backend:      {}",
        if config.sync.supabase_url.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Export what is still readable: cogcommit export -o backup.json");
        println!("  2. Move the damaged file aside: mv {0} {0}.bad", db_path.display());
        println!("  3. Reimport: cogcommit import backup.json --source json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
