//! Concurrent query tests
//!
//! Engines, shapes and cascades are frozen after construction; these tests
//! share one instance across rayon workers and check every worker sees the
//! same answers as a sequential run.

use crate::{
    CheckerOptions, CompatChecker, DefaultCascade, FieldDescriptor, NarrowError, NarrowingEngine,
    OverloadSet, ShapeDescriptor, SignatureDescriptor, TypeTag, Value, ValueGuard,
    resolve_defaults,
};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_query_types_are_send_and_sync() {
    assert_send_sync::<NarrowingEngine>();
    assert_send_sync::<ShapeDescriptor>();
    assert_send_sync::<OverloadSet>();
    assert_send_sync::<DefaultCascade>();
    assert_send_sync::<TypeTag>();
}

fn zoo_engine(calls: Arc<AtomicUsize>) -> NarrowingEngine {
    let fish = ShapeDescriptor::build([FieldDescriptor::new("swim", TypeTag::BOOLEAN)]).unwrap();
    let bird = ShapeDescriptor::build([FieldDescriptor::new("fly", TypeTag::BOOLEAN)]).unwrap();
    NarrowingEngine::builder()
        .register(
            "fish",
            fish,
            ValueGuard::custom(move |value| {
                calls.fetch_add(1, Ordering::Relaxed);
                value.get("swim").is_some()
            }),
        )
        .unwrap()
        .register("bird", bird, ValueGuard::in_property("fly"))
        .unwrap()
        .build()
}

fn animal(i: usize) -> Value {
    match i % 3 {
        0 => Value::object([("swim", Value::Bool(true))]),
        1 => Value::object([("fly", Value::Bool(true))]),
        _ => Value::object([("walk", Value::Bool(true))]),
    }
}

#[test]
fn test_concurrent_narrowing_matches_sequential() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = zoo_engine(Arc::clone(&calls));
    let values: Vec<Value> = (0..1000).map(animal).collect();

    let sequential: Vec<Option<String>> = values
        .iter()
        .map(|value| engine.narrow(value).ok().map(|tag| tag.to_string()))
        .collect();
    let parallel: Vec<Option<String>> = values
        .par_iter()
        .map(|value| engine.narrow(value).ok().map(|tag| tag.to_string()))
        .collect();

    assert_eq!(sequential, parallel);
    // The first guard runs once per value per pass; nothing is cached.
    assert_eq!(calls.load(Ordering::Relaxed), 2000);
}

#[test]
fn test_concurrent_no_match_is_reported_per_call() {
    let engine = zoo_engine(Arc::new(AtomicUsize::new(0)));
    let walkers: Vec<Value> = (0..200).map(|i| animal(i * 3 + 2)).collect();
    let all_missed = walkers
        .par_iter()
        .all(|value| engine.narrow(value) == Err(NarrowError::NoMatch));
    assert!(all_missed);
}

#[test]
fn test_concurrent_filter_by_variant() {
    let engine = zoo_engine(Arc::new(AtomicUsize::new(0)));
    let values: Vec<Value> = (0..300).map(animal).collect();

    let counts: Vec<usize> = (0..16)
        .into_par_iter()
        .map(|_| {
            engine
                .filter_by_variant(&values, "bird")
                .filter(Result::is_ok)
                .count()
        })
        .collect();
    assert!(counts.iter().all(|&count| count == 100));
}

#[test]
fn test_concurrent_overload_validation() {
    let date = TypeTag::named("Date");
    let set = OverloadSet::build(
        [
            SignatureDescriptor::positional([TypeTag::NUMBER], [], date.clone()).unwrap(),
            SignatureDescriptor::positional(
                [TypeTag::NUMBER, TypeTag::NUMBER, TypeTag::NUMBER],
                [],
                date.clone(),
            )
            .unwrap(),
        ],
        SignatureDescriptor::positional(
            [TypeTag::NUMBER],
            [TypeTag::NUMBER, TypeTag::NUMBER],
            date,
        )
        .unwrap(),
    )
    .unwrap();
    let options = CheckerOptions::default();

    let all_ok = (0..500)
        .into_par_iter()
        .all(|_| CompatChecker::new(&options).validate_implementation(&set).is_ok());
    assert!(all_ok);
}

#[test]
fn test_concurrent_default_resolution() {
    let shape = ShapeDescriptor::build([
        FieldDescriptor::new("a", TypeTag::STRING),
        FieldDescriptor::new("b", TypeTag::NUMBER),
    ])
    .unwrap();
    let cascade = DefaultCascade::new(shape)
        .with_object_default(Value::object([("a", Value::from("foo"))]))
        .unwrap()
        .with_field_default("b", Value::from(0))
        .unwrap();
    let options = CheckerOptions::default();

    let results: Vec<bool> = (0..1000)
        .into_par_iter()
        .map(|i| {
            if i % 2 == 0 {
                resolve_defaults(None, &cascade, &options).is_ok()
            } else {
                resolve_defaults(Some(&Value::empty_object()), &cascade, &options).is_err()
            }
        })
        .collect();
    assert!(results.into_iter().all(|ok| ok));
}
