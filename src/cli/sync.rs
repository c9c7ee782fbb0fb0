use anyhow::Result;

use cogcommit::config::CogCommitConfig;
use cogcommit::sync::{self, SupabaseClient};

pub async fn push(config: &CogCommitConfig, project: Option<&str>) -> Result<()> {
    let client = SupabaseClient::from_config(&config.sync)?;
    let conn = cogcommit::db::open_database(config.resolved_db_path())?;

    let report = sync::push(&conn, &client, project).await?;
    if report.pushed == 0 {
        println!("Nothing to push.");
    } else {
        println!("Pushed {} commits to {}", report.pushed, client.base_url());
    }
    Ok(())
}

pub async fn pull(config: &CogCommitConfig, project: Option<&str>) -> Result<()> {
    let client = SupabaseClient::from_config(&config.sync)?;
    let mut conn = cogcommit::db::open_database(config.resolved_db_path())?;

    let report = sync::pull(&mut conn, &client, project).await?;
    println!("Pulled {} commits from {}", report.pulled, client.base_url());
    if report.conflicts > 0 {
        println!(
            "  {} commit(s) have unpushed local edits and were kept; run `cogcommit sync push` to publish them.",
            report.conflicts
        );
    }
    Ok(())
}
