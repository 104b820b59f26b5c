//! Tests for round submission through the service layer.

use strictly_rps::{InvalidRound, Move};
use tempfile::NamedTempFile;

use strictly_rps_server::{ChoiceSubmission, GameRepository, RoundService, ServiceError, seed_roster};

fn setup_service(auto_register: bool) -> (NamedTempFile, RoundService) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = GameRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    seed_roster(&repo, &["A", "B", "C"]).expect("Seed failed");

    (db_file, RoundService::new(repo, auto_register, 100))
}

fn round(entries: &[(&str, &str)]) -> Vec<ChoiceSubmission> {
    entries
        .iter()
        .map(|(name, choice)| ChoiceSubmission::new(name.to_string(), choice.to_string()))
        .collect()
}

#[test]
fn test_submit_two_way_win() {
    let (_db, service) = setup_service(false);
    let record = service
        .submit_round(&round(&[("A", "rock"), ("B", "scissors")]))
        .expect("Submit failed");
    assert_eq!(record.winners(), vec!["A"]);
}

#[test]
fn test_submit_three_way_draw() {
    let (_db, service) = setup_service(false);
    let record = service
        .submit_round(&round(&[("A", "paper"), ("B", "rock"), ("C", "scissors")]))
        .expect("Submit failed");
    assert!(record.winners().is_empty());
}

#[test]
fn test_submit_two_moves_among_three_players() {
    let (_db, service) = setup_service(false);
    let record = service
        .submit_round(&round(&[("A", "rock"), ("B", "paper"), ("C", "rock")]))
        .expect("Submit failed");
    assert_eq!(record.winners(), vec!["B"]);
    let moves: Vec<Move> = record.choices().iter().map(|c| *c.choice()).collect();
    assert_eq!(moves, vec![Move::Rock, Move::Paper, Move::Rock]);
}

#[test]
fn test_single_participant_rejected_and_not_stored() {
    let (_db, service) = setup_service(false);
    let err = service
        .submit_round(&round(&[("A", "rock")]))
        .expect_err("Should reject");
    assert!(matches!(
        err,
        ServiceError::InvalidRound(InvalidRound::TooFewParticipants { count: 1 })
    ));
    assert!(service.list_games().expect("List failed").is_empty());
}

#[test]
fn test_duplicate_participant_rejected() {
    let (_db, service) = setup_service(false);
    let err = service
        .submit_round(&round(&[("A", "rock"), ("A", "paper")]))
        .expect_err("Should reject");
    assert!(matches!(
        err,
        ServiceError::InvalidRound(InvalidRound::DuplicateParticipant(ref name)) if name == "A"
    ));
}

#[test]
fn test_unknown_move_rejected() {
    let (_db, service) = setup_service(false);
    let err = service
        .submit_round(&round(&[("A", "rock"), ("B", "dynamite")]))
        .expect_err("Should reject");
    assert!(matches!(
        err,
        ServiceError::InvalidRound(InvalidRound::UnknownMove(_))
    ));
}

#[test]
fn test_unknown_player_rejected_without_auto_register() {
    let (_db, service) = setup_service(false);
    let err = service
        .submit_round(&round(&[("A", "rock"), ("Stranger", "paper")]))
        .expect_err("Should reject");
    assert!(matches!(err, ServiceError::UnknownPlayer(ref n) if n == "Stranger"));
    assert!(service.list_games().expect("List failed").is_empty());
}

#[test]
fn test_unknown_player_registered_with_auto_register() {
    let (_db, service) = setup_service(true);
    let record = service
        .submit_round(&round(&[("A", "rock"), ("Stranger", "paper")]))
        .expect("Submit failed");
    assert_eq!(record.winners(), vec!["Stranger"]);
    assert_eq!(service.list_players().expect("List failed").len(), 4);
}

#[test]
fn test_blank_player_rejected() {
    let (_db, service) = setup_service(false);
    let err = service
        .submit_round(&round(&[("A", "rock"), ("   ", "paper")]))
        .expect_err("Should reject");
    assert!(matches!(err, ServiceError::UnknownPlayer(ref n) if n.is_empty()));
    assert!(service.list_games().expect("List failed").is_empty());
}

#[test]
fn test_rejected_round_registers_nobody() {
    let (_db, service) = setup_service(true);
    let before = service.list_players().expect("List failed").len();

    let err = service
        .submit_round(&round(&[("Newbie", "rock"), ("   ", "paper")]))
        .expect_err("Should reject");
    assert!(matches!(err, ServiceError::UnknownPlayer(_)));

    let names: Vec<String> = service
        .list_players()
        .expect("List failed")
        .iter()
        .map(|p| p.name().clone())
        .collect();
    assert_eq!(names.len(), before);
    assert!(!names.iter().any(|n| n == "Newbie"));
    assert!(service.analysis().expect("Analysis failed").win_rates().is_empty());
}

#[test]
fn test_unknown_player_rejected_before_any_write() {
    let (_db, service) = setup_service(false);
    service
        .submit_round(&round(&[("A", "rock"), ("B", "paper"), ("Ghost", "rock")]))
        .expect_err("Should reject");
    assert_eq!(service.list_players().expect("List failed").len(), 3);
    assert!(service.list_games().expect("List failed").is_empty());
}

#[test]
fn test_delete_missing_game() {
    let (_db, service) = setup_service(false);
    let err = service.delete_game(42).expect_err("Should be missing");
    assert!(matches!(err, ServiceError::GameNotFound(42)));
}

#[test]
fn test_analysis_empty_without_games() {
    let (_db, service) = setup_service(false);
    let analysis = service.analysis().expect("Analysis failed");
    assert!(analysis.win_rates().is_empty());
    assert!(analysis.predictions().is_empty());
}

#[test]
fn test_analysis_after_rounds() {
    let (_db, service) = setup_service(false);
    service
        .submit_round(&round(&[("A", "rock"), ("B", "scissors")]))
        .expect("Submit failed");
    service
        .submit_round(&round(&[("A", "paper"), ("B", "scissors")]))
        .expect("Submit failed");

    let analysis = service.analysis().expect("Analysis failed");
    assert_eq!(analysis.win_rates()["A"], 50.0);
    assert_eq!(analysis.win_rates()["B"], 50.0);
    assert_eq!(analysis.win_rates()["C"], 0.0);
    assert_eq!(*analysis.choice_patterns()["B"].scissors(), 2);
    assert_eq!(analysis.predictions()["A"], Move::Scissors);
    assert_eq!(analysis.predictions()["B"], Move::Rock);
    assert_eq!(analysis.predictions()["C"], Move::Rock);
}

#[test]
fn test_player_profile() {
    let (_db, service) = setup_service(false);
    service
        .submit_round(&round(&[("A", "rock"), ("B", "scissors")]))
        .expect("Submit failed");

    let profile = service.player_profile("A").expect("Profile failed");
    assert_eq!(*profile.total_games(), 1);
    assert_eq!(*profile.wins(), 1);
    assert_eq!(profile.choice_distribution()[&Move::Rock], 1.0);

    let err = service.player_profile("C").expect_err("C never played");
    assert!(matches!(err, ServiceError::PlayerNotFound(_)));
}
