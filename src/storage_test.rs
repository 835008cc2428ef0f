use canvas::comment::{CommentStore, NewComment};
use canvas::geom::Point;

use super::*;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sketchboard-{name}-{}.json", uuid::Uuid::new_v4()))
}

#[test]
fn missing_file_reads_as_empty() {
    let storage = FileStorage::new(scratch_path("missing"));
    assert_eq!(storage.get("anything").unwrap(), None);
}

#[test]
fn set_then_get_survives_a_new_handle() {
    let path = scratch_path("roundtrip");
    let mut storage = FileStorage::new(&path);
    storage.set("a", "1").unwrap();
    storage.set("b", "2").unwrap();
    storage.set("a", "3").unwrap();

    let reopened = FileStorage::new(&path);
    assert_eq!(reopened.get("a").unwrap().as_deref(), Some("3"));
    assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
    std::fs::remove_file(path).unwrap();
}

#[test]
fn malformed_file_is_a_json_error() {
    let path = scratch_path("malformed");
    std::fs::write(&path, "not json").unwrap();
    let storage = FileStorage::new(&path);
    assert!(matches!(storage.get("a"), Err(CommentError::Json(_))));
    std::fs::remove_file(path).unwrap();
}

#[test]
fn comment_store_persists_through_file() {
    let path = scratch_path("comments");
    let mut storage = FileStorage::new(&path);
    let mut store = CommentStore::new();
    store.add_comment(NewComment {
        content: "check this".into(),
        author: "ana".into(),
        position: Point::new(10.0, 20.0),
        ..NewComment::default()
    });
    store.save(&mut storage).unwrap();

    let mut loaded = CommentStore::new();
    loaded.load(&FileStorage::new(&path)).unwrap();
    assert_eq!(loaded.comments().len(), 1);
    assert_eq!(loaded.comments()[0].content, "check this");
    std::fs::remove_file(path).unwrap();
}
