use crate::backend::AppContext;
use anyhow::Result;
use trinity_application::{ProgressTracker, Route};
use trinity_core::pillar::{self, PillarCategory};

pub async fn toggle(context: AppContext, pillar_id: &str) -> Result<()> {
    context.require(Route::Dashboard).await?;
    let tracker = ProgressTracker::open(context.session.clone(), context.store.clone()).await?;

    let completed = tracker.toggle(pillar_id).await?;
    let done = completed.iter().any(|id| id == pillar_id);
    let name = pillar::find(pillar_id).map_or(pillar_id, |pillar| pillar.name);
    println!("{name}: {}", if done { "completed" } else { "reopened" });

    tracker.close().await;
    Ok(())
}

pub async fn show(context: AppContext) -> Result<()> {
    context.require(Route::Dashboard).await?;
    let tracker = ProgressTracker::open(context.session.clone(), context.store.clone()).await?;
    let progress = tracker.progress().await;

    println!(
        "Welcome back, {}. Overall mastery: {:.0}% ({}/{})",
        context.session.greeting_name(),
        progress.percentage(),
        progress.completed_count(),
        pillar::TOTAL_PILLARS
    );
    for category in PillarCategory::ALL {
        let pillars = tracker.pillars(category);
        println!(
            "\n[{category}] {}/{}",
            progress.category_completed(category),
            pillars.len()
        );
        for pillar in pillars {
            let mark = if progress.is_completed(pillar.id) { "x" } else { " " };
            println!("  [{mark}] {:<9} {}", pillar.id, pillar.name);
        }
    }

    tracker.close().await;
    Ok(())
}
