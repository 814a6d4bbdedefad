use std::fs;

use tempfile::TempDir;
use wildslot::app::api;
use wildslot::{
    AppError, MoveMode, MoveOutcome, MoveTarget, ResolveInput, ResolveOptions, Selection, SlotKey,
    WildslotConfig, open_at,
};

#[test]
fn public_api_lifecycle() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    fs::write(root.join("animals.txt"), "cat\ndog\n").unwrap();

    let service = open_at(root.clone(), WildslotConfig::default()).expect("open failed");
    assert_eq!(api::list(&service, None).unwrap(), vec![SlotKey::new("animals").unwrap()]);

    api::put(&service, "m/pet", "- {animals}").expect("put failed");
    api::put(&service, "m/template", "- a {m/pet}").expect("put failed");

    let outcome = api::resolve(
        &service,
        &ResolveInput::Generate,
        &ResolveOptions { selections: vec!["animals=dog".into()], ..Default::default() },
        Some(5),
    )
    .expect("resolve failed");
    assert_eq!(outcome.text, "a dog");
    assert!(outcome.warnings.is_empty());

    let last = api::last(&service).unwrap();
    assert_eq!(last.get("animals").map(String::as_str), Some("dog"));
    assert_eq!(last.get("m/pet").map(String::as_str), Some("dog"));

    // A fresh service sees everything persisted.
    let reopened = open_at(root, WildslotConfig::default()).unwrap();
    let keys: Vec<String> =
        api::list(&reopened, None).unwrap().iter().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["m/pet", "m/template", "animals"]);
}

#[test]
fn move_conflict_leaves_registry_untouched() {
    let temp = TempDir::new().unwrap();
    let service = open_at(temp.path(), WildslotConfig::default()).unwrap();
    api::put(&service, "a/x", "- one").unwrap();
    api::put(&service, "b/x", "- two").unwrap();

    let target = MoveTarget::Group(Some("b".into()));
    let outcome = api::move_slot(&service, "a/x", &target, MoveMode::Move, false).unwrap();
    assert_eq!(outcome, MoveOutcome::Conflict { key: SlotKey::new("b/x").unwrap() });
    assert_eq!(api::show(&service, "b/x").unwrap().raw_text, "- two");

    let outcome = api::move_slot(&service, "a/x", &target, MoveMode::Copy, true).unwrap();
    assert_eq!(outcome, MoveOutcome::Moved { key: SlotKey::new("b/x").unwrap() });
    assert_eq!(api::show(&service, "a/x").unwrap().raw_text, "- one");
    assert_eq!(api::show(&service, "b/x").unwrap().raw_text, "- one");
}

#[test]
fn errors_carry_kinds() {
    let temp = TempDir::new().unwrap();
    let service = open_at(temp.path(), WildslotConfig::default()).unwrap();

    let err = api::show(&service, "nope").unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);

    let err = api::put(&service, "bad key!", "- x").unwrap_err();
    assert!(matches!(err, AppError::InvalidSlotKey(_)));

    let err = api::put(&service, "c", "- ((a => x").unwrap_err();
    assert!(matches!(err, AppError::InvalidCondition { .. }));
}

#[test]
fn similar_value_lookup() {
    assert_eq!(api::similar("Blu", &["red", "blue"]), Selection::Value("blue".into()));
    assert_eq!(api::similar("zzz", &["red"]), Selection::Random);
}
