use reclaim::{AccessType, ArcReplacer, ClockReplacer, ReplacementPolicy};

/// Behaviors every policy must share, regardless of its victim selection.
fn exercise<P: ReplacementPolicy>(replacer: &P) {
    assert_eq!(None, replacer.evict());
    assert_eq!(None, replacer.peek());
    assert_eq!(0, replacer.size());
    assert_eq!(4, replacer.capacity());

    // A recorded access admits the frame as an eviction candidate.
    replacer.record_access(0, 100).unwrap();
    replacer
        .record_access_with(1, 101, AccessType::Lookup)
        .unwrap();
    assert_eq!(2, replacer.size());

    // Pinned frames never come back from the victim scan.
    replacer.pin(0).unwrap();
    assert_eq!(1, replacer.size());
    assert_eq!(Some(1), replacer.evict());
    assert_eq!(None, replacer.evict());

    replacer.unpin(0).unwrap();
    assert_eq!(Some(0), replacer.peek());
    assert_eq!(Some(0), replacer.evict());
    assert_eq!(0, replacer.size());
}

#[test]
fn clock_honors_the_contract() {
    exercise(&ClockReplacer::new(4));
}

#[test]
fn arc_honors_the_contract() {
    exercise(&ArcReplacer::new(4));
}
