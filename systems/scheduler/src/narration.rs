//! Player-facing message text.

use world_level_catalog::BossDefinition;
use world_level_core::Task;
use world_level_system_contribution::Share;
use world_level_system_progression::ProgressionLedger;

/// Formats an amount with `,` thousands separators.
pub(crate) fn grouped(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// Where players should look for a category's members.
pub(crate) fn location(category: &str) -> &str {
    match category {
        "Forest/Surface" | "Surface" => "Surface and Forest areas",
        "Underground" => "Underground caves",
        "Corruption" => "corrupted lands",
        "Crimson" => "crimson territory",
        "Desert" => "desert wasteland",
        "Jungle" => "dangerous jungle",
        "Snow" => "frozen tundra",
        "Dungeon" => "ancient dungeon",
        "Underworld" => "depths of hell",
        "Mechanical" => "mechanical wasteland",
        "Hallow" => "holy lands",
        "Underground Jungle" => "underground jungle",
        "Temple" => "Lihzahrd Temple",
        "Ocean" => "deep ocean",
        "Space" => "outer space",
        other => other,
    }
}

pub(crate) fn task_announcement(level: u32, task: &Task, target_name: &str) -> [String; 4] {
    [
        format!("[World Level {level}] New Task Available!"),
        format!(
            "Hunt {} {target_name} in the {}",
            task.goal,
            location(&task.category)
        ),
        format!("Progress: 0/{} - Reward: {} XP", task.goal, task.reward_xp),
        format!("This will help prepare for {}!", task.boss_label()),
    ]
}

pub(crate) fn progress(task_progress: u32, goal: u32) -> String {
    format!("Task Progress: {task_progress}/{goal}")
}

pub(crate) fn contribution(group: Option<&str>, kills: u32, goal: u32) -> String {
    let share = f64::from(kills) * 100.0 / f64::from(goal.max(1));
    match group {
        Some(group) => format!("Your contribution ({group}): {kills} kills ({share:.1}% of goal)"),
        None => format!("Your contribution: {kills} kills ({share:.1}% of goal)"),
    }
}

pub(crate) fn top_contributor(name: &str, kills: u32) -> String {
    format!("Task Complete! Top contributor: {name} with {kills} kills!")
}

pub(crate) fn completion(reward_xp: u64, new_level: Option<u32>) -> Vec<String> {
    let mut lines = vec![format!("Task Complete! Earned {reward_xp} XP!")];
    if let Some(level) = new_level {
        lines.push(format!("World Level increased to {level}!"));
    }
    lines
}

pub(crate) fn payout_received(share: &Share, currency: &str) -> String {
    format!(
        "Received {} {currency} for contributing {} kills ({:.1}%) to task completion",
        grouped(share.amount),
        share.kills,
        share.share_percent
    )
}

pub(crate) fn help(is_admin: bool, reroll_cost: u64, currency: &str, daily_cap: u32) -> Vec<String> {
    let mut lines = vec![
        "World Level Commands".to_owned(),
        "/worldlevel - Show current status".to_owned(),
        "/wl status - Show detailed progress".to_owned(),
        "/wl task - Show current task details".to_owned(),
        format!(
            "/wl reroll - Reroll current task ({} {currency}, {daily_cap}/day)",
            grouped(reroll_cost)
        ),
    ];
    if is_admin {
        lines.extend(
            [
                "Admin Commands",
                "/wl admin setlevel <level>",
                "/wl admin addxp <amount>",
                "/wl admin newtask",
                "/wl admin updatexp",
            ]
            .map(str::to_owned),
        );
    }
    lines
}

pub(crate) fn status(ledger: &ProgressionLedger, hardmode: bool) -> Vec<String> {
    vec![
        "World Status".to_owned(),
        format!("Level: {}", ledger.level()),
        format!(
            "XP: {}/{}",
            grouped(ledger.current_xp()),
            grouped(ledger.required_xp())
        ),
        format!("Progress: {}%", ledger.percent_to_next()),
        format!("Remaining: {} XP", grouped(ledger.remaining_xp())),
        format!(
            "State: {}",
            if hardmode { "Hardmode" } else { "Pre-Hardmode" }
        ),
    ]
}

pub(crate) fn task_details(
    task: Option<&Task>,
    definition: Option<&BossDefinition>,
    target_name: &str,
) -> Vec<String> {
    let Some(task) = task else {
        return vec![
            "Current Task".to_owned(),
            "No active task available".to_owned(),
            "A new one will generate soon!".to_owned(),
        ];
    };

    let mut lines = vec![
        "Current Task".to_owned(),
        definition.map_or("Active Task", BossDefinition::task_title).to_owned(),
        format!("Target: {target_name}"),
    ];
    if let Some(definition) = definition {
        lines.push(format!("Objective: {}", definition.objective()));
    }
    lines.push(format!(
        "Progress: {}/{} ({}%)",
        task.progress,
        task.goal,
        task.percent_complete()
    ));
    lines.push(format!("Reward: {} XP", grouped(task.reward_xp)));
    lines
}

pub(crate) fn requirements_updated(ledger: &ProgressionLedger) -> Vec<String> {
    let level = ledger.level();
    let mut lines = vec![
        "XP requirements updated!".to_owned(),
        format!("Current World Level: {level}"),
        format!(
            "Current Progress: {}/{} XP",
            grouped(ledger.current_xp()),
            grouped(ledger.required_xp())
        ),
    ];
    for next in level.saturating_add(1)..=level.saturating_add(3) {
        lines.push(format!(
            "Level {next} requires: {} XP",
            grouped(ledger.curve().required_for(next))
        ));
    }
    lines
}
