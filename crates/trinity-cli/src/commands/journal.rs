use crate::backend::AppContext;
use anyhow::Result;
use trinity_application::{Journal, Route};
use trinity_core::chat::format_timestamp_with_year;

pub async fn add(context: AppContext, text: &str) -> Result<()> {
    context.require(Route::Journal).await?;
    let journal = Journal::open(context.session.clone(), context.store.clone()).await?;

    let id = journal.add_entry(text).await?;
    println!("Saved entry {id}");

    journal.close().await;
    Ok(())
}

pub async fn list(context: AppContext) -> Result<()> {
    context.require(Route::Journal).await?;
    let journal = Journal::open(context.session.clone(), context.store.clone()).await?;

    let entries = journal.entries().await;
    if entries.is_empty() {
        println!("No journal entries yet.");
    }
    for entry in entries {
        println!("{}  ({})", format_timestamp_with_year(entry.created_at), entry.id);
        println!("{}\n", entry.text);
    }

    journal.close().await;
    Ok(())
}
