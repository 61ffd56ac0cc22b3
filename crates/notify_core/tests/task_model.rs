use notify_core::{Importance, Reminder, Task};

#[test]
fn task_serializes_with_nullable_id() {
    let unsaved = serde_json::to_value(Task::new("t", "d")).unwrap();
    assert_eq!(
        unsaved,
        serde_json::json!({ "id": null, "title": "t", "description": "d" })
    );

    let saved: Task =
        serde_json::from_str(r#"{"id":4,"title":"x","description":""}"#).unwrap();
    assert_eq!(saved, Task::with_id(4, "x", ""));
}

#[test]
fn default_task_is_unsaved_and_empty() {
    let task = Task::default();
    assert!(!task.is_persisted());
    assert!(task.title.is_empty());
    assert!(task.description.is_empty());
}

#[test]
fn reminder_payload_uses_snake_case_fields() {
    let value = serde_json::to_value(Reminder::for_task(&Task::with_id(2, "a", "b"))).unwrap();
    assert_eq!(value["channel_id"], "task_reminders");
    assert_eq!(value["task_id"], 2);
    assert_eq!(serde_json::to_value(Importance::High).unwrap(), "high");
}
