//! Built-in pillars.

use super::model::{Pillar, PillarCategory};

/// Fixed denominator for overall progress, independent of any category filter.
pub const TOTAL_PILLARS: usize = 30;

/// All pillars, grouped by category in display order.
pub static PILLARS: [Pillar; TOTAL_PILLARS] = [
    Pillar {
        id: "life-01",
        category: PillarCategory::Life,
        name: "Morning Command",
        tagline: "Win the first hour, win the day.",
        reflection_prompt: "What does your first hour say about your priorities?",
        major_move: "Wake at the same time for seven straight days.",
    },
    Pillar {
        id: "life-02",
        category: PillarCategory::Life,
        name: "Body as Temple",
        tagline: "Strength is the foundation of every other gain.",
        reflection_prompt: "Where is your body asking for more care?",
        major_move: "Train three times this week, no excuses.",
    },
    Pillar {
        id: "life-03",
        category: PillarCategory::Life,
        name: "Emotional Control",
        tagline: "Respond, never react.",
        reflection_prompt: "Which emotion ran your last bad decision?",
        major_move: "Pause ten seconds before every heated reply this week.",
    },
    Pillar {
        id: "life-04",
        category: PillarCategory::Life,
        name: "Circle of Five",
        tagline: "You become the average of your closest five.",
        reflection_prompt: "Who in your circle pulls you forward?",
        major_move: "Have one honest conversation with someone you admire.",
    },
    Pillar {
        id: "life-05",
        category: PillarCategory::Life,
        name: "Word as Bond",
        tagline: "Integrity is doing what you said.",
        reflection_prompt: "Which promise to yourself did you last break?",
        major_move: "Keep every commitment you make for seven days.",
    },
    Pillar {
        id: "life-06",
        category: PillarCategory::Life,
        name: "Deep Rest",
        tagline: "Recovery is part of the work.",
        reflection_prompt: "What keeps you from real rest?",
        major_move: "Protect eight hours of sleep for five nights.",
    },
    Pillar {
        id: "life-07",
        category: PillarCategory::Life,
        name: "Purpose Statement",
        tagline: "Know what you stand for.",
        reflection_prompt: "What would you do even if nobody paid you?",
        major_move: "Write your purpose in one sentence and read it daily.",
    },
    Pillar {
        id: "life-08",
        category: PillarCategory::Life,
        name: "Gratitude Practice",
        tagline: "What you appreciate appreciates.",
        reflection_prompt: "What are you taking for granted right now?",
        major_move: "Write three gratitudes every night for a week.",
    },
    Pillar {
        id: "life-09",
        category: PillarCategory::Life,
        name: "Digital Fast",
        tagline: "Attention is the new currency.",
        reflection_prompt: "How many hours did your phone take yesterday?",
        major_move: "Spend one full day offline.",
    },
    Pillar {
        id: "life-10",
        category: PillarCategory::Life,
        name: "Legacy Letter",
        tagline: "Live for the story they tell about you.",
        reflection_prompt: "What do you want said about you in fifty years?",
        major_move: "Write a letter to your future grandchildren.",
    },
    Pillar {
        id: "money-01",
        category: PillarCategory::Money,
        name: "Know Your Numbers",
        tagline: "You cannot grow what you do not measure.",
        reflection_prompt: "Do you know exactly where last month's money went?",
        major_move: "Track every expense for thirty days.",
    },
    Pillar {
        id: "money-02",
        category: PillarCategory::Money,
        name: "Emergency Fund",
        tagline: "Security buys you freedom to think.",
        reflection_prompt: "How many months could you survive without income?",
        major_move: "Save one month of expenses in a separate account.",
    },
    Pillar {
        id: "money-03",
        category: PillarCategory::Money,
        name: "Debt Demolition",
        tagline: "Debt is a claim on your future.",
        reflection_prompt: "Which debt costs you the most each month?",
        major_move: "List every debt and attack the highest rate first.",
    },
    Pillar {
        id: "money-04",
        category: PillarCategory::Money,
        name: "Second Stream",
        tagline: "One income is one point of failure.",
        reflection_prompt: "What skill could you sell outside your job?",
        major_move: "Earn your first dollar from a side stream.",
    },
    Pillar {
        id: "money-05",
        category: PillarCategory::Money,
        name: "Pay Yourself First",
        tagline: "Save before you spend.",
        reflection_prompt: "What percentage of income do you keep?",
        major_move: "Automate a transfer to savings on payday.",
    },
    Pillar {
        id: "money-06",
        category: PillarCategory::Money,
        name: "Ownership Mindset",
        tagline: "Employees trade time; owners build assets.",
        reflection_prompt: "What do you own that earns while you sleep?",
        major_move: "Buy or build your first income-producing asset.",
    },
    Pillar {
        id: "money-07",
        category: PillarCategory::Money,
        name: "Compound Interest",
        tagline: "Time in the market beats timing the market.",
        reflection_prompt: "What are you waiting for to start investing?",
        major_move: "Open a long-term investment account and fund it.",
    },
    Pillar {
        id: "money-08",
        category: PillarCategory::Money,
        name: "Negotiate Everything",
        tagline: "The first offer is rarely the best one.",
        reflection_prompt: "When did you last ask for more?",
        major_move: "Negotiate one bill or your salary this month.",
    },
    Pillar {
        id: "money-09",
        category: PillarCategory::Money,
        name: "Value Creation",
        tagline: "Money follows solved problems.",
        reflection_prompt: "What problem do people already ask you to solve?",
        major_move: "Write down three paid offers you could make today.",
    },
    Pillar {
        id: "money-10",
        category: PillarCategory::Money,
        name: "Generational Wealth",
        tagline: "Build what outlives you.",
        reflection_prompt: "What will you pass down besides money?",
        major_move: "Draft a simple will and name your beneficiaries.",
    },
    Pillar {
        id: "tech-01",
        category: PillarCategory::Tech,
        name: "Digital Literacy",
        tagline: "Speak the language of the new economy.",
        reflection_prompt: "Which tool do you use daily but do not understand?",
        major_move: "Learn the shortcuts of the tool you use most.",
    },
    Pillar {
        id: "tech-02",
        category: PillarCategory::Tech,
        name: "AI Partnership",
        tagline: "Work with machines, not against them.",
        reflection_prompt: "What task could an AI do for you tomorrow?",
        major_move: "Automate one weekly task with an AI assistant.",
    },
    Pillar {
        id: "tech-03",
        category: PillarCategory::Tech,
        name: "Learn to Code",
        tagline: "Code is leverage that never sleeps.",
        reflection_prompt: "What would you build if you could code?",
        major_move: "Finish an introductory programming course.",
    },
    Pillar {
        id: "tech-04",
        category: PillarCategory::Tech,
        name: "Personal Brand Online",
        tagline: "Your search results are your new resume.",
        reflection_prompt: "What does the internet say about you?",
        major_move: "Publish a profile that shows your best work.",
    },
    Pillar {
        id: "tech-05",
        category: PillarCategory::Tech,
        name: "Automation Mindset",
        tagline: "If you do it twice, automate it.",
        reflection_prompt: "What repetitive task drains your week?",
        major_move: "Build one automation that saves an hour a week.",
    },
    Pillar {
        id: "tech-06",
        category: PillarCategory::Tech,
        name: "Data Thinking",
        tagline: "Decisions beat opinions when backed by data.",
        reflection_prompt: "What decision are you making on gut feeling alone?",
        major_move: "Track one personal metric in a spreadsheet for a month.",
    },
    Pillar {
        id: "tech-07",
        category: PillarCategory::Tech,
        name: "Cyber Hygiene",
        tagline: "Protect what you build.",
        reflection_prompt: "How many accounts share the same password?",
        major_move: "Set up a password manager and two-factor authentication.",
    },
    Pillar {
        id: "tech-08",
        category: PillarCategory::Tech,
        name: "Build in Public",
        tagline: "Share the journey, attract the opportunity.",
        reflection_prompt: "What are you learning that others need to hear?",
        major_move: "Post about one thing you learned every week for a month.",
    },
    Pillar {
        id: "tech-09",
        category: PillarCategory::Tech,
        name: "Ship a Project",
        tagline: "Done is better than perfect.",
        reflection_prompt: "What project have you started but never finished?",
        major_move: "Launch one small project to real users.",
    },
    Pillar {
        id: "tech-10",
        category: PillarCategory::Tech,
        name: "Teach to Master",
        tagline: "Teaching is the final form of learning.",
        reflection_prompt: "What could you explain better than anyone you know?",
        major_move: "Teach a skill to someone else, start to finish.",
    },
];

pub fn find(id: &str) -> Option<&'static Pillar> {
    PILLARS.iter().find(|pillar| pillar.id == id)
}

pub fn by_category(category: PillarCategory) -> impl Iterator<Item = &'static Pillar> {
    PILLARS.iter().filter(move |pillar| pillar.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ten_pillars_per_category() {
        for category in PillarCategory::ALL {
            assert_eq!(by_category(category).count(), 10, "category {category}");
        }
    }

    #[test]
    fn test_pillar_ids_are_unique() {
        let ids: HashSet<&str> = PILLARS.iter().map(|pillar| pillar.id).collect();
        assert_eq!(ids.len(), TOTAL_PILLARS);
        assert!(find("money-03").is_some());
        assert!(find("money-11").is_none());
    }
}
