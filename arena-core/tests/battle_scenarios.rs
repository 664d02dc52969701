//! Deterministic battle scenarios driven by scripted rolls.
//!
//! Die results are consumed in call order: initiative (first, second),
//! opposed rolls (attacker, defender), then damage dice.

use arena_core::arena::{BattleArbiter, BattleError, BattleEvent, EndReason};
use arena_core::attack::Attack;
use arena_core::dice::DieType;
use arena_core::fighter::{Awareness, Fighter};
use arena_core::rng::GameRng;
use arena_core::testing::{trained_fighter, ScriptedRolls};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn acid_splash() -> Arc<Attack> {
    Arc::new(Attack::new("Acid Splash", DieType::D6, 4).unwrap())
}

fn pair(hp_a: i32, hp_b: i32) -> (Fighter, Fighter) {
    let attack = acid_splash();
    (
        trained_fighter("A", hp_a, &[attack.clone()]),
        trained_fighter("B", hp_b, &[attack]),
    )
}

fn collect<'a>(events: &'a mut Vec<BattleEvent>) -> impl FnMut(&BattleEvent) + 'a {
    move |e: &BattleEvent| events.push(e.clone())
}

// =============================================================================
// Single turns
// =============================================================================

#[test]
fn test_hit_with_plain_damage() {
    let (mut a, mut b) = pair(100, 100);
    let mut arbiter = BattleArbiter::new();
    let mut rng = ScriptedRolls::new()
        .with_awareness([Awareness::Present])
        .with_rolls([20, 1, 15, 5, 3, 4, 2, 5]);
    let mut events = Vec::new();

    arbiter.begin_battle(&a, &b).unwrap();
    let initiative = arbiter.roll_initiative(&mut a, &mut b, &mut rng, &mut collect(&mut events));
    assert!(initiative.first_attacks);

    let outcome = arbiter
        .play_turn(&mut a, &mut b, &mut rng, &mut collect(&mut events))
        .unwrap();

    assert_eq!(outcome.damage, Some(14));
    assert!(!outcome.defender_defeated);
    assert_eq!(b.hit_points, 86);
    assert_eq!(a.hit_points, 100);
    assert!(arbiter.in_progress());
    assert_eq!(rng.remaining_rolls(), 0);

    let dealt = events.iter().find_map(|e| match e {
        BattleEvent::DamageDealt {
            roll, remaining_hp, ..
        } => Some((roll.clone(), *remaining_hp)),
        _ => None,
    });
    let (roll, remaining_hp) = dealt.expect("damage event");
    assert_eq!(roll.rolls, vec![3, 4, 2, 5]);
    assert_eq!(roll.dropped, None);
    assert_eq!(remaining_hp, 86);
    assert!(!events
        .iter()
        .any(|e| matches!(e, BattleEvent::AwarenessChanged(_))));
}

#[test]
fn test_focused_attacker_drops_lowest() {
    let (mut a, mut b) = pair(100, 100);
    let mut arbiter = BattleArbiter::new();
    let mut rng = ScriptedRolls::new()
        .with_awareness([Awareness::Focused])
        .with_rolls([12, 8, 3, 4, 2, 5, 1]);
    let mut events = Vec::new();

    arbiter.begin_battle(&a, &b).unwrap();
    let outcome = arbiter
        .play_turn(&mut a, &mut b, &mut rng, &mut collect(&mut events))
        .unwrap();

    assert_eq!(outcome.damage, Some(14));
    assert_eq!(b.hit_points, 86);
    assert_eq!(a.awareness(), Awareness::Focused);
    assert!(matches!(
        &events[1],
        BattleEvent::AwarenessChanged(change)
            if change.from == Awareness::Present && change.to == Awareness::Focused
    ));
}

#[test]
fn test_distracted_attacker_drops_highest() {
    let (mut a, mut b) = pair(100, 100);
    let mut arbiter = BattleArbiter::new();
    let mut rng = ScriptedRolls::new()
        .with_awareness([Awareness::Distracted])
        .with_rolls([12, 8, 3, 4, 2, 5, 6]);

    arbiter.begin_battle(&a, &b).unwrap();
    let outcome = arbiter
        .play_turn(&mut a, &mut b, &mut rng, &mut |_: &BattleEvent| {})
        .unwrap();

    assert_eq!(outcome.damage, Some(14));
    assert_eq!(b.hit_points, 86);
}

#[test]
fn test_defeat_ends_battle() {
    let (mut a, mut b) = pair(100, 5);
    let mut arbiter = BattleArbiter::new();
    let mut rng = ScriptedRolls::new()
        .with_awareness([Awareness::Present])
        .with_rolls([15, 5, 3, 4, 2, 5]);
    let mut events = Vec::new();

    arbiter.begin_battle(&a, &b).unwrap();
    let outcome = arbiter
        .play_turn(&mut a, &mut b, &mut rng, &mut collect(&mut events))
        .unwrap();

    assert!(outcome.defender_defeated);
    assert_eq!(b.hit_points, -9);
    assert!(!arbiter.in_progress());
    assert!(events.contains(&BattleEvent::FighterDefeated {
        defeated: "B".to_string(),
        victor: "A".to_string(),
    }));

    // No more turns once the battle is over
    assert_eq!(
        arbiter.play_turn(&mut a, &mut b, &mut rng, &mut |_: &BattleEvent| {}),
        Err(BattleError::NotInProgress)
    );
}

// =============================================================================
// Full battles
// =============================================================================

#[test]
fn test_one_turn_battle_report() {
    let (mut a, mut b) = pair(10, 10);
    let mut arbiter = BattleArbiter::new();
    let mut rng = ScriptedRolls::new()
        .with_awareness([Awareness::Present])
        .with_rolls([20, 1, 15, 5, 3, 4, 2, 5]);

    let report = arbiter.start_battle(&mut a, &mut b, &mut rng).unwrap();

    assert_eq!(report.winner.as_deref(), Some("A"));
    assert_eq!(report.loser.as_deref(), Some("B"));
    assert_eq!(report.turns, 1);
    assert_eq!(report.reason, EndReason::Defeat);

    let kinds: Vec<&str> = report
        .events
        .iter()
        .map(|e| match e {
            BattleEvent::BattleStarted { .. } => "started",
            BattleEvent::InitiativeTied { .. } => "tied",
            BattleEvent::InitiativeRolled { .. } => "initiative",
            BattleEvent::TurnStarted { .. } => "turn",
            BattleEvent::AwarenessChanged(_) => "awareness",
            BattleEvent::AttackHit { .. } => "hit",
            BattleEvent::AttackMissed { .. } => "miss",
            BattleEvent::DamageDealt { .. } => "damage",
            BattleEvent::StatusUpdate { .. } => "status",
            BattleEvent::FighterDefeated { .. } => "defeated",
            BattleEvent::BattleEnded { .. } => "ended",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["started", "initiative", "turn", "hit", "damage", "defeated", "status", "ended"]
    );
}

#[test]
fn test_second_fighter_can_win_initiative() {
    let (mut a, mut b) = pair(10, 10);
    let mut arbiter = BattleArbiter::new();
    let mut rng = ScriptedRolls::new()
        .with_awareness([Awareness::Present])
        .with_rolls([3, 18, 19, 2, 6, 6, 6, 6]);

    let report = arbiter.start_battle(&mut a, &mut b, &mut rng).unwrap();

    assert_eq!(report.winner.as_deref(), Some("B"));
    assert_eq!(a.hit_points, -14);
    assert_eq!(b.hit_points, 10);
}

#[test]
fn test_observer_sees_every_event() {
    let (mut a, mut b) = pair(40, 40);
    let mut arbiter = BattleArbiter::new();
    let mut rng = GameRng::new(2024);
    let mut seen = 0usize;

    let report = arbiter
        .start_battle_observed(&mut a, &mut b, &mut rng, &mut |_: &BattleEvent| seen += 1)
        .unwrap();

    assert_eq!(seen, report.events.len());
    assert!(matches!(
        report.events.first(),
        Some(BattleEvent::BattleStarted { .. })
    ));
    assert!(matches!(
        report.events.last(),
        Some(BattleEvent::BattleEnded {
            reason: EndReason::Defeat,
            ..
        })
    ));
}

#[test]
fn test_events_serialize() {
    let (mut a, mut b) = pair(10, 10);
    let mut arbiter = BattleArbiter::new();
    let mut rng = ScriptedRolls::new()
        .with_awareness([Awareness::Present])
        .with_rolls([20, 1, 15, 5, 3, 4, 2, 5]);

    let report = arbiter.start_battle(&mut a, &mut b, &mut rng).unwrap();
    for event in &report.events {
        let json = serde_json::to_string(event).unwrap();
        let back: BattleEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, event);
    }
}

// =============================================================================
// Arbiter state
// =============================================================================

#[test]
fn test_fighter_without_attacks_is_rejected() {
    let mut a = trained_fighter("A", 10, &[acid_splash()]);
    let mut b = trained_fighter("Empty", 10, &[]);
    let mut arbiter = BattleArbiter::new();
    let mut rng = GameRng::new(1);

    let err = arbiter.start_battle(&mut a, &mut b, &mut rng).unwrap_err();
    assert_eq!(
        err,
        BattleError::NoAttacksAvailable {
            fighter: "Empty".to_string()
        }
    );
    assert!(!arbiter.in_progress());
}

#[test]
fn test_fighter_at_zero_hp_cannot_start() {
    let (mut a, mut b) = pair(10, 0);
    let mut arbiter = BattleArbiter::new();
    let mut rng = GameRng::new(1);

    let err = arbiter.start_battle(&mut a, &mut b, &mut rng).unwrap_err();
    assert_eq!(
        err,
        BattleError::AlreadyDefeated {
            fighter: "B".to_string(),
            hit_points: 0
        }
    );
    assert!(!arbiter.in_progress());
    assert_eq!(a.hit_points, 10);
}

#[test]
fn test_start_while_in_progress_fails() {
    let (mut a, mut b) = pair(10, 10);
    let mut arbiter = BattleArbiter::new();
    let mut rng = GameRng::new(1);

    arbiter.begin_battle(&a, &b).unwrap();
    assert_eq!(
        arbiter.start_battle(&mut a, &mut b, &mut rng).unwrap_err(),
        BattleError::AlreadyInProgress
    );
    // The running battle is untouched
    assert!(arbiter.in_progress());
}

#[test]
fn test_cancel_mid_battle() {
    let (mut a, mut b) = pair(1_000_000, 1_000_000);
    let flag = Arc::new(AtomicBool::new(false));
    let mut arbiter = BattleArbiter::new().with_cancel_flag(flag.clone());
    let mut rng = GameRng::new(9);

    let report = arbiter
        .start_battle_observed(&mut a, &mut b, &mut rng, &mut |e: &BattleEvent| {
            if let BattleEvent::TurnStarted { turn: 3, .. } = e {
                flag.store(true, Ordering::Relaxed);
            }
        })
        .unwrap();

    assert_eq!(report.reason, EndReason::Cancelled);
    assert_eq!(report.turns, 3);
    assert!(report.winner.is_none());
    assert!(!arbiter.in_progress());
}

#[test]
fn test_arbiter_is_reusable() {
    let mut arbiter = BattleArbiter::new();
    let mut rng = GameRng::new(31);

    for _ in 0..3 {
        let (mut a, mut b) = pair(20, 20);
        let report = arbiter.start_battle(&mut a, &mut b, &mut rng).unwrap();
        assert_eq!(report.reason, EndReason::Defeat);
        assert!(a.is_defeated() != b.is_defeated());
        assert!(!arbiter.in_progress());
    }
}
