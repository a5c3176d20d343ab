//! Algebra Invariants
//!
//! - add never mutates its receiver and overwrites on collision
//! - merge is right-biased with `empty` as identity
//! - pick yields exactly the listed tags that are present

use crate::common::*;
use tagctx::{AnyTag, Context, Tag};

// =============================================================================
// add
// =============================================================================

#[test]
fn test_add_returns_new_context() {
    let tags = Tags::new();
    let base = Context::make(&tags.port, port(80));
    let derived = base.add(&tags.timeout, timeout(10));
    assert_eq!(base.len(), 1);
    assert_eq!(derived.len(), 2);
    assert!(base.get_option(&tags.timeout).is_none());
}

#[test]
fn test_add_last_write_wins() {
    let tags = Tags::new();
    let context = Context::make(&tags.port, port(80)).add(&tags.port, port(8080));
    assert_eq!(context.len(), 1);
    assert_eq!(context[&tags.port], port(8080));
}

#[test]
fn test_add_idempotent_on_equal_value() {
    let tags = Tags::new();
    let base = server_context(&tags);
    let once = base.add(&tags.database, DatabaseUrl("sqlite::memory:".into()));
    let twice = once.add(&tags.database, DatabaseUrl("sqlite::memory:".into()));
    assert_eq!(once, twice);
}

// =============================================================================
// merge
// =============================================================================

#[test]
fn test_merge_right_bias() {
    init_tracing();
    let tags = Tags::new();
    let defaults = Context::make(&tags.port, port(80)).add(&tags.timeout, timeout(1000));
    let overrides = Context::make(&tags.port, port(8080));

    let merged = defaults.merge(&overrides);
    assert_eq!(merged[&tags.port], port(8080));
    assert_eq!(merged[&tags.timeout], timeout(1000));

    let reversed = overrides.merge(&defaults);
    assert_eq!(reversed[&tags.port], port(80));
}

#[test]
fn test_merge_identity_element() {
    let tags = Tags::new();
    let context = server_context(&tags);
    assert_eq!(context.merge(&Context::empty()), context);
    assert_eq!(Context::empty().merge(&context), context);
    assert_eq!(Context::empty().merge(&Context::empty()), Context::empty());
}

#[test]
fn test_merge_leaves_operands_untouched() {
    let tags = Tags::new();
    let left = Context::make(&tags.port, port(1));
    let right = Context::make(&tags.port, port(2)).add(&tags.timeout, timeout(3));
    let _ = left.merge(&right);
    assert_eq!(left, Context::make(&tags.port, port(1)));
    assert_eq!(right.len(), 2);
}

#[test]
fn test_merge_is_associative() {
    let tags = Tags::new();
    let a = Context::make(&tags.port, port(1));
    let b = Context::make(&tags.port, port(2)).add(&tags.timeout, timeout(2));
    let c = Context::make(&tags.timeout, timeout(3));
    assert_eq!(a.merge(&b).merge(&c), a.merge(&b.merge(&c)));
}

#[test]
fn test_merge_all_matches_chained_merge() {
    let tags = Tags::new();
    let a = Context::make(&tags.port, port(1));
    let b = Context::make(&tags.timeout, timeout(2));
    let c = Context::make(&tags.port, port(3));
    assert_eq!(Context::merge_all([&a, &b, &c]), a.merge(&b).merge(&c));
}

// =============================================================================
// pick / omit
// =============================================================================

#[test]
fn test_pick_subset_law() {
    let tags = Tags::new();
    let context = server_context(&tags);
    let stranger = Tag::<Port>::new();
    let requested: Vec<AnyTag> = vec![tags.port.erase(), tags.database.erase(), stranger.erase()];

    let picked = context.pick(&requested);
    for tag in picked.tags() {
        assert!(requested.contains(tag), "picked tag must be requested");
        assert!(context.contains(tag), "picked tag must come from source");
    }
    assert_eq!(picked.len(), 1);
}

#[test]
fn test_pick_preserves_values() {
    let tags = Tags::new();
    let context = server_context(&tags);
    let picked = context.pick([tags.port.as_ref(), tags.timeout.as_ref()]);
    assert_eq!(picked, context);
}

#[test]
fn test_pick_and_omit_partition() {
    let tags = Tags::new();
    let context = server_context(&tags);
    let selection = [tags.port.erase()];
    let kept = context.pick(&selection);
    let dropped = context.omit(&selection);
    assert_eq!(kept.merge(&dropped), context);
    assert_eq!(kept.len() + dropped.len(), context.len());
}
