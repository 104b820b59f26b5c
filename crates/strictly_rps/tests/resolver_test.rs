//! Tests for round resolution.

use std::collections::BTreeSet;

use strictly_rps::{InvalidRound, Move, resolve};

/// Every assignment of moves to `n` players named p0..pn.
fn all_rounds(n: usize) -> Vec<Vec<(String, Move)>> {
    let mut rounds = vec![Vec::new()];
    for i in 0..n {
        let mut next = Vec::new();
        for partial in &rounds {
            for mv in Move::ALL {
                let mut extended = partial.clone();
                extended.push((format!("p{i}"), mv));
                next.push(extended);
            }
        }
        rounds = next;
    }
    rounds
}

fn distinct_moves(round: &[(String, Move)]) -> BTreeSet<Move> {
    round.iter().map(|(_, mv)| *mv).collect()
}

#[test]
fn test_scenario_same_move_draw() {
    let outcome = resolve([("A", Move::Rock), ("B", Move::Rock)]).expect("Valid round");
    assert!(outcome.is_draw());
}

#[test]
fn test_scenario_rock_beats_scissors() {
    let outcome = resolve([("A", Move::Rock), ("B", Move::Scissors)]).expect("Valid round");
    assert_eq!(outcome.winners(), &BTreeSet::from(["A"]));
}

#[test]
fn test_scenario_all_three_draw() {
    let outcome = resolve([("A", Move::Paper), ("B", Move::Rock), ("C", Move::Scissors)])
        .expect("Valid round");
    assert!(outcome.is_draw());
}

#[test]
fn test_scenario_paper_beats_two_rocks() {
    let outcome =
        resolve([("A", Move::Rock), ("B", Move::Paper), ("C", Move::Rock)]).expect("Valid round");
    assert_eq!(outcome.winners(), &BTreeSet::from(["B"]));
}

#[test]
fn test_scenario_single_participant_rejected() {
    let result = resolve([("A", Move::Rock)]);
    assert_eq!(result, Err(InvalidRound::TooFewParticipants { count: 1 }));
}

#[test]
fn test_scenario_duplicate_participant_rejected() {
    let result = resolve([("A", Move::Rock), ("A", Move::Paper)]);
    assert_eq!(result, Err(InvalidRound::DuplicateParticipant("A".to_string())));
}

#[test]
fn test_unknown_move_rejected_before_resolving() {
    let err = "spock".parse::<Move>().expect_err("Should reject");
    assert!(err.to_string().contains("spock"));
}

#[test]
fn test_exhaustive_rules_up_to_five_players() {
    for n in 2..=5 {
        for round in all_rounds(n) {
            let distinct = distinct_moves(&round);
            let outcome = resolve(round.clone()).expect("Valid round");

            match distinct.len() {
                1 | 3 => assert!(outcome.is_draw(), "Expected draw for {round:?}"),
                2 => {
                    let mut pair = distinct.iter().copied();
                    let (a, b) = (pair.next().unwrap(), pair.next().unwrap());
                    let winning = if a.beats(b) { a } else { b };
                    let expected: BTreeSet<String> = round
                        .iter()
                        .filter(|(_, mv)| *mv == winning)
                        .map(|(p, _)| p.clone())
                        .collect();
                    assert!(!outcome.is_draw(), "Two moves never draw: {round:?}");
                    assert_eq!(outcome.winners(), &expected);
                }
                other => panic!("Impossible distinct count {other}"),
            }
        }
    }
}

#[test]
fn test_order_invariance() {
    for round in all_rounds(4) {
        let expected = resolve(round.clone()).expect("Valid round");

        let mut reversed = round.clone();
        reversed.reverse();
        assert_eq!(resolve(reversed).expect("Valid round"), expected);

        for shift in 1..round.len() {
            let mut rotated = round.clone();
            rotated.rotate_left(shift);
            assert_eq!(resolve(rotated).expect("Valid round"), expected);
        }
    }
}

#[test]
fn test_outcome_serializes_as_winner_list() {
    let outcome = resolve([("A", Move::Scissors), ("B", Move::Paper)]).expect("Valid round");
    let json = serde_json::to_value(&outcome).expect("Serialize failed");
    assert_eq!(json, serde_json::json!({ "winners": ["A"] }));
}

#[test]
fn test_move_wire_format() {
    let json = serde_json::to_string(&Move::Scissors).expect("Serialize failed");
    assert_eq!(json, "\"scissors\"");
    let parsed: Move = serde_json::from_str("\"rock\"").expect("Deserialize failed");
    assert_eq!(parsed, Move::Rock);
}
