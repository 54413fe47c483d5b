use std::time::Duration;

use digipost_lookup::{
    IdentifierKind, LookupError, LookupOutcome, LookupStatus, Pipeline, classify_all,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::utils::{ScriptedRegistry, cpr, cprs, test_config};

/// Registry with a random delay per identifier, so completion order is
/// shuffled relative to input order
fn shuffled_registry(ids: &[String], seed: u64) -> ScriptedRegistry {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut registry = ScriptedRegistry::new();
    for id in ids {
        registry = registry.delayed(id, Duration::from_millis(rng.random_range(1..=50)));
    }
    registry
}

/// A mixed batch: valid CPR/CVR numbers, invalid tokens and duplicates
fn mixed_input() -> Vec<String> {
    let mut input = cprs(30);
    input.insert(3, "ABC123".to_string());
    input.insert(7, "55133018".to_string());
    input.insert(11, String::new());
    input.insert(15, "3213011234".to_string());
    input.push(input[0].clone());
    input
}

/// N inputs give N rows with positions covering 0..N in order
#[tokio::test(start_paused = true)]
async fn test_one_row_per_input_in_input_order() {
    let input = mixed_input();
    let valid: Vec<String> = classify_all(&input)
        .iter()
        .filter_map(|r| r.normalized().map(str::to_string))
        .collect();
    let registry = shuffled_registry(&valid, 7).registered(valid.iter().step_by(3).cloned());
    let pipeline = Pipeline::new(registry, test_config().with_thread_count(4)).unwrap();

    let table = pipeline.run(&input).await.unwrap();

    assert_eq!(table.len(), input.len());
    let positions: Vec<usize> = table.iter().map(LookupOutcome::position).collect();
    assert_eq!(positions, (0..input.len()).collect::<Vec<_>>());
    for (outcome, raw) in table.iter().zip(&input) {
        assert_eq!(outcome.identifier().raw_input(), raw);
    }
}

/// Concurrency changes timing only, never content
#[tokio::test(start_paused = true)]
async fn test_thread_count_does_not_change_result() {
    let input = mixed_input();
    let valid: Vec<String> = classify_all(&input)
        .iter()
        .filter_map(|r| r.normalized().map(str::to_string))
        .collect();

    let build = |threads: usize| {
        let registry = shuffled_registry(&valid, 99)
            .registered(valid.iter().step_by(2).cloned())
            .failing(&valid[5], LookupError::NotFound);
        Pipeline::new(registry, test_config().with_thread_count(threads)).unwrap()
    };

    let sequential = build(1).run(&input).await.unwrap();
    let parallel = build(8).run(&input).await.unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(
        serde_json::to_vec(&sequential).unwrap(),
        serde_json::to_vec(&parallel).unwrap()
    );
}

/// Invalid tokens become visible error rows and never reach the registry
#[tokio::test]
async fn test_invalid_tokens_are_not_looked_up() {
    let input = vec![
        "ABC123".to_string(),
        cpr(1),
        "   ".to_string(),
        "12345".to_string(),
    ];
    let pipeline = Pipeline::new(ScriptedRegistry::new(), test_config()).unwrap();

    let table = pipeline.run(&input).await.unwrap();

    assert_eq!(pipeline.client().calls(), vec![cpr(1)]);
    for position in [0, 2, 3] {
        let outcome = table.get(position).unwrap();
        assert_eq!(outcome.identifier().kind(), IdentifierKind::Invalid);
        assert_eq!(outcome.status(), LookupStatus::Error);
        assert!(outcome.error_detail().is_some_and(|d| !d.is_empty()));
        assert_eq!(outcome.identifier().normalized(), None);
    }
    assert_eq!(table.get(0).unwrap().identifier().raw_input(), "ABC123");
    assert_eq!(table.get(1).unwrap().status(), LookupStatus::NotRegistered);
}

/// One failing lookup only marks its own row
#[tokio::test(start_paused = true)]
async fn test_single_failure_in_large_batch() {
    let input = cprs(200);
    let broken = input[117].clone();
    let registry = shuffled_registry(&input, 3)
        .registered(input.clone())
        .failing(&broken, LookupError::Authentication("401 Unauthorized".to_string()));
    let pipeline = Pipeline::new(registry, test_config().with_thread_count(8)).unwrap();

    let table = pipeline.run(&input).await.unwrap();

    let errors: Vec<usize> = table
        .iter()
        .filter(|o| o.is_error())
        .map(LookupOutcome::position)
        .collect();
    assert_eq!(errors, vec![117]);
    assert_eq!(table.summary().count(LookupStatus::RegisteredDigitalPost), 199);
}

/// "Not found" and "not registered" stay distinguishable
#[tokio::test]
async fn test_not_found_differs_from_not_registered() {
    let input = cprs(2);
    let registry = ScriptedRegistry::new().failing(&input[0], LookupError::NotFound);
    let pipeline = Pipeline::new(registry, test_config()).unwrap();

    let table = pipeline.run(&input).await.unwrap();

    assert_eq!(table.get(0).unwrap().status(), LookupStatus::Error);
    assert_eq!(
        table.get(0).unwrap().error_detail(),
        Some("identifier not found in registry")
    );
    assert_eq!(table.get(1).unwrap().status(), LookupStatus::NotRegistered);
    assert_eq!(table.get(1).unwrap().error_detail(), None);
}

/// Organizations are looked up too
#[tokio::test]
async fn test_organization_lookup() {
    let input = vec!["DK55133018".to_string()];
    let registry = ScriptedRegistry::new().registered(["55133018"]);
    let pipeline = Pipeline::new(registry, test_config()).unwrap();

    let table = pipeline.run(&input).await.unwrap();

    let outcome = table.get(0).unwrap();
    assert_eq!(outcome.identifier().kind(), IdentifierKind::Organization);
    assert_eq!(outcome.identifier().normalized(), Some("55133018"));
    assert_eq!(outcome.status(), LookupStatus::RegisteredDigitalPost);
}

/// Empty input gives an empty table without error
#[tokio::test]
async fn test_empty_input() {
    let pipeline = Pipeline::new(ScriptedRegistry::new(), test_config()).unwrap();
    let input: Vec<String> = Vec::new();
    let table = pipeline.run(&input).await.unwrap();
    assert!(table.is_empty());
    assert!(pipeline.client().calls().is_empty());
}

/// Zero threads is a configuration error
#[test]
fn test_zero_threads_rejected() {
    let result = Pipeline::new(ScriptedRegistry::new(), test_config().with_thread_count(0));
    assert!(result.is_err());
}
