//! Text rendering of battle events.

use arena_core::arena::BattleEvent;
use arena_core::FighterStatus;

const STATUS_SEPARATOR: &str = "  ---v---   ";

/// Render one event as display text, or `None` for events with no text form.
pub fn render_event(event: &BattleEvent) -> Option<String> {
    let text = match event {
        BattleEvent::BattleStarted { .. } => return None,
        BattleEvent::InitiativeTied { roll } => {
            format!("Initiative tied at {roll}, rolling again")
        }
        BattleEvent::InitiativeRolled {
            attacker,
            attacker_roll,
            defender,
            defender_roll,
        } => format!("{attacker} ({attacker_roll}) acts before {defender} ({defender_roll})\n"),
        BattleEvent::TurnStarted { .. } => return None,
        BattleEvent::AwarenessChanged(change) => {
            format!("{} became {}...", change.fighter, change.to.name())
        }
        BattleEvent::AttackHit {
            attacker,
            defender,
            attack,
            ..
        } => format!("{attacker} hit {defender} with {attack} (rolling for damage)"),
        BattleEvent::AttackMissed {
            attacker,
            defender,
            attack,
            ..
        } => format!("{attacker} missed {defender} with {attack}"),
        BattleEvent::DamageDealt {
            attacker,
            defender,
            attack,
            roll,
            ..
        } => format!(
            "{attacker}'s {attack} caused {} damage to {defender} {}",
            roll.total,
            roll.dice_display()
        ),
        BattleEvent::StatusUpdate { fighters } => format!("{}\n", status_line(fighters)),
        BattleEvent::FighterDefeated { defeated, victor } => {
            format!("{defeated} has perished in battle against {victor}")
        }
        BattleEvent::BattleEnded { .. } => return None,
    };
    Some(text)
}

/// `Chrulk (PRESENT): 86 HP  ---v---   Steve (FOCUSED): 72 HP`
pub fn status_line(fighters: &[FighterStatus]) -> String {
    fighters
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(STATUS_SEPARATOR)
}
