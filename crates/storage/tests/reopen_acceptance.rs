use std::sync::Arc;

use desk_storage::{FileStore, KeyValueStore};

#[test]
fn values_survive_reopening_the_store() {
    let dir = tempfile::tempdir().expect("tempdir");

    {
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::open(dir.path()).expect("open store"));
        store
            .set_string("desk-shortcuts", r#"[{"id":"1","name":"Sitting","heightMM":850}]"#)
            .expect("write shortcuts");
        store
            .set_string("desk-logs", "[]")
            .expect("write logs");
    }

    let reopened = FileStore::open(dir.path()).expect("reopen store");
    assert_eq!(
        reopened
            .get_string("desk-shortcuts")
            .expect("read shortcuts")
            .as_deref(),
        Some(r#"[{"id":"1","name":"Sitting","heightMM":850}]"#)
    );
    assert_eq!(
        reopened.get_string("desk-logs").expect("read logs").as_deref(),
        Some("[]")
    );
}
