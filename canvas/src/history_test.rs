use super::*;

#[test]
fn undo_returns_snapshots_newest_first() {
    let mut history = UndoHistory::new();
    history.record(vec![1]);
    history.record(vec![1, 2]);

    assert_eq!(history.undo(), Some(vec![1, 2]));
    assert_eq!(history.undo(), Some(vec![1]));
    assert_eq!(history.undo(), None);
}

#[test]
fn empty_history_cannot_undo() {
    let mut history: UndoHistory<u32> = UndoHistory::new();
    assert!(!history.can_undo());
    assert!(history.is_empty());
    assert_eq!(history.undo(), None);
}

#[test]
fn default_cap_is_fifty() {
    let mut history = UndoHistory::new();
    for i in 0..60 {
        history.record(i);
    }
    assert_eq!(history.len(), HISTORY_LIMIT);
    // The ten oldest were evicted.
    let mut last = None;
    while let Some(v) = history.undo() {
        last = Some(v);
    }
    assert_eq!(last, Some(10));
}

#[test]
fn custom_limit_evicts_oldest() {
    let mut history = UndoHistory::with_limit(2);
    history.record('a');
    history.record('b');
    history.record('c');
    assert_eq!(history.undo(), Some('c'));
    assert_eq!(history.undo(), Some('b'));
    assert_eq!(history.undo(), None);
}

#[test]
fn zero_limit_keeps_one() {
    let mut history = UndoHistory::with_limit(0);
    history.record(1);
    history.record(2);
    assert_eq!(history.len(), 1);
    assert_eq!(history.undo(), Some(2));
}

#[test]
fn clear_empties() {
    let mut history = UndoHistory::new();
    history.record(1);
    history.clear();
    assert!(!history.can_undo());
}
