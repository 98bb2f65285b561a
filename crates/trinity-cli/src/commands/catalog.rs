use anyhow::Result;
use trinity_core::agent::AGENTS;
use trinity_core::pillar::{self, PillarCategory};

pub fn agents() {
    for agent in AGENTS.iter() {
        println!("{:<8} {} - {}", agent.id.as_str(), agent.name, agent.archetype);
        println!("         {}", agent.summary);
    }
}

pub fn pillars(category: Option<&str>) -> Result<()> {
    let categories = match category {
        Some(name) => vec![name.parse::<PillarCategory>()?],
        None => PillarCategory::ALL.to_vec(),
    };

    for category in categories {
        println!("[{category}]");
        for pillar in pillar::by_category(category) {
            println!("  {:<9} {} - {}", pillar.id, pillar.name, pillar.tagline);
        }
    }
    Ok(())
}
