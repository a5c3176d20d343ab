//! Lookup Invariants
//!
//! - get_option is Some exactly when get succeeds, with the same value
//! - a missing tag fails with MissingService naming the tag
//! - indexing panics with the same message instead of returning garbage

use crate::common::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tagctx::{is_context, Context, ContextError, Reference, Tag};

#[test]
fn test_get_option_agrees_with_get() {
    let tags = Tags::new();
    let context = server_context(&tags);

    assert_eq!(context.get_option(&tags.port), context.get(&tags.port).ok());
    assert_eq!(context.get_option(&tags.timeout), context.get(&tags.timeout).ok());
    assert!(context.get_option(&tags.database).is_none());
    assert!(context.get(&tags.database).is_err());
}

#[test]
fn test_missing_service_names_global_key() {
    let tags = Tags::new();
    let err = server_context(&tags).get(&tags.database).unwrap_err();
    assert_eq!(err.reason_code(), "missing_service");
    assert!(err.to_string().contains("DATABASE_URL"));
}

#[test]
fn test_missing_service_separates_unpopulated_from_wrong_tag() {
    let tags = Tags::new();

    match Context::empty().get(&tags.port) {
        Err(ContextError::MissingService(err)) => assert!(err.is_unpopulated()),
        other => panic!("Expected MissingService, got {:?}", other),
    }

    match server_context(&tags).get(&tags.database) {
        Err(ContextError::MissingService(err)) => {
            assert!(!err.is_unpopulated());
            assert_eq!(err.available, 2);
        }
        other => panic!("Expected MissingService, got {:?}", other),
    }
}

#[test]
fn test_index_panic_matches_get_error() {
    let tags = Tags::new();
    let context = Context::make(&tags.port, port(1));
    let expected = context.get(&tags.database).unwrap_err().to_string();

    let payload = catch_unwind(AssertUnwindSafe(|| {
        let _ = &context[&tags.database];
    }))
    .unwrap_err();
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert_eq!(message, expected);
}

#[test]
fn test_failed_lookup_leaves_context_intact() {
    let tags = Tags::new();
    let context = server_context(&tags);
    let before = context.clone();
    let _ = context.get(&tags.database);
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let _ = &context[&tags.database];
    }));
    assert_eq!(context, before);
}

#[test]
fn test_get_shared_preserves_identity_services() {
    let pool_tag = Tag::<ConnectionPool>::global("POOL");
    let context = Context::make(&pool_tag, ConnectionPool { size: 8 });
    let a = context.get_shared(&pool_tag).unwrap();
    let b = context.get_shared(&pool_tag).unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(a.size, 8);
}

#[test]
fn test_reference_lookup_is_total() {
    let retries = Reference::global("RETRIES", 3u32);
    assert_eq!(*Context::empty().get_reference(&retries), 3);
    let tuned = Context::make(retries.tag(), 7u32);
    assert_eq!(*tuned.get_reference(&retries), 7);
}

#[test]
fn test_get_option_on_type_mismatch_is_quiet() {
    let as_port = Tag::<Port>::global("SHARED");
    let as_timeout = Tag::<Timeout>::global("SHARED");
    let context = Context::make(&as_port, port(1));

    let quiet = capture_logs(|| {
        assert!(context.get_option(&as_timeout).is_none());
        assert_eq!(context.get_option(&as_port), Some(&port(1)));
    });
    assert!(quiet.is_empty(), "unexpected events: {}", quiet);

    let checked = capture_logs(|| {
        assert!(context.get(&as_timeout).is_err());
    });
    assert!(checked.contains("Service type mismatch"));
}

#[test]
fn test_is_context_guard() {
    assert!(is_context(&Context::empty()));
    assert!(!is_context(&Tag::<Port>::new()));
    assert!(!is_context(&"context"));
}
