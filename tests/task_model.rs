mod common;

#[cfg(test)]
mod tests {
    use super::common::task_json;
    use chrono::{NaiveDate, TimeZone, Utc};
    use dincharya::libs::task::{parse_due_date, Category, NewTask, Status, Task, TaskChanges};

    fn sample() -> Task {
        Task::from_entry("k1", &task_json("Groceries", "personal", "2026-10-19T08:00:00.000Z")).unwrap()
    }

    #[test]
    fn test_from_entry_uses_key_as_id() {
        let mut value = task_json("Groceries", "personal", "2026-10-19T08:00:00.000Z");
        value["id"] = "something-else".into();

        let task = Task::from_entry("k1", &value).unwrap();

        assert_eq!(task.id, "k1");
        assert_eq!(task.category, Category::Personal);
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let mut value = task_json("Groceries", "personal", "2026-10-19T08:00:00.000Z");
        value.as_object_mut().unwrap().remove("description");

        assert_eq!(Task::from_entry("k1", &value).unwrap().description, "");
    }

    #[test]
    fn test_unknown_category_is_malformed() {
        let value = task_json("Groceries", "hobby", "2026-10-19T08:00:00.000Z");

        assert!(Task::from_entry("k1", &value).is_err());
    }

    #[test]
    fn test_new_task_trims_and_validates() {
        let due = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();

        let task = NewTask::new("  Plan trip  ", " two weeks ", Category::Future, due);
        assert_eq!(task.title, "Plan trip");
        assert_eq!(task.description, "two weeks");
        assert!(task.validate().is_ok());

        assert!(NewTask::new(" ", "", Category::Future, due).validate().is_err());
    }

    #[test]
    fn test_changes_keep_only_differences() {
        let task = sample();
        let changes = TaskChanges {
            title: Some("Groceries".to_string()),
            description: Some("milk and eggs".to_string()),
            category: Some(Category::Personal),
            due_date: Some(task.due_date),
        };

        let changes = changes.diff_against(&task);

        assert_eq!(
            changes,
            TaskChanges {
                description: Some("milk and eggs".to_string()),
                ..TaskChanges::default()
            }
        );
    }

    #[test]
    fn test_change_fields_always_carry_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 30, 0).unwrap();
        let changes = TaskChanges {
            due_date: Some(NaiveDate::from_ymd_opt(2026, 12, 24).unwrap()),
            category: Some(Category::Business),
            ..TaskChanges::default()
        };

        let fields = changes.to_fields(at);

        assert_eq!(fields.len(), 3);
        assert_eq!(fields["dueDate"], "2026-12-24");
        assert_eq!(fields["category"], "business");
        assert_eq!(fields["updatedAt"], "2026-10-19T12:30:00.000Z");
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(parse_due_date(" 2026-02-28 ").unwrap(), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert!(parse_due_date("2026-02-30").is_err());
        assert!(parse_due_date("tomorrow").is_err());
    }

    #[test]
    fn test_category_and_status_text() {
        assert_eq!("Business".parse::<Category>().unwrap(), Category::Business);
        assert!("hobby".parse::<Category>().is_err());
        assert_eq!(Category::default(), Category::Personal);
        assert_eq!(Status::Pending.toggled(), Status::Completed);
        assert_eq!(Status::Completed.toggled(), Status::Pending);
        assert_eq!(Status::Completed.to_string(), "completed");
    }
}
