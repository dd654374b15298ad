mod common;

#[cfg(test)]
mod tests {
    use super::common::user;
    use chrono::NaiveDate;
    use dincharya::api::memory::MemoryStore;
    use dincharya::api::store::task_path;
    use dincharya::libs::error::AppError;
    use dincharya::libs::push_id::PUSH_ID_LEN;
    use dincharya::libs::repository::TaskRepository;
    use dincharya::libs::session::SessionState;
    use dincharya::libs::sync::TaskListSynchronizer;
    use dincharya::libs::task::{Category, NewTask, Status, TaskChanges};
    use test_context::{test_context, AsyncTestContext};
    use tokio::sync::watch;

    struct RepositoryTestContext {
        store: MemoryStore,
        session: watch::Sender<SessionState>,
        repository: TaskRepository<MemoryStore>,
        sync: TaskListSynchronizer<MemoryStore>,
    }

    impl AsyncTestContext for RepositoryTestContext {
        async fn setup() -> Self {
            let store = MemoryStore::new();
            let (session, identity) = watch::channel(SessionState {
                user: Some(user("alice")),
                loading: false,
            });
            let repository = TaskRepository::new(store.clone(), identity);
            let mut sync = TaskListSynchronizer::new(store.clone());
            sync.subscribe("alice");

            RepositoryTestContext {
                store,
                session,
                repository,
                sync,
            }
        }
    }

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 31).unwrap()
    }

    fn new_task(title: &str, category: Category) -> NewTask {
        NewTask::new(title, "details", category, due())
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_create_adds_one_pending_task(ctx: &mut RepositoryTestContext) {
        let id = ctx.repository.create(new_task("  Write report ", Category::Business)).await.unwrap();

        let tasks = ctx.sync.state().tasks;
        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert_eq!(task.id, id);
        assert_eq!(id.len(), PUSH_ID_LEN);
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, "details");
        assert_eq!(task.category, Category::Business);
        assert_eq!(task.due_date, due());
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_created_record_layout(ctx: &mut RepositoryTestContext) {
        let id = ctx.repository.create(new_task("Call mom", Category::Personal)).await.unwrap();

        let record = ctx.store.snapshot(&task_path("alice", &id)).unwrap();
        assert_eq!(record["id"], id.as_str());
        assert_eq!(record["category"], "personal");
        assert_eq!(record["dueDate"], "2026-10-31");
        assert_eq!(record["status"], "pending");
        let created_at = record["createdAt"].as_str().unwrap();
        assert!(created_at.ends_with('Z'));
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_newest_task_listed_first(ctx: &mut RepositoryTestContext) {
        ctx.repository.create(new_task("first", Category::Personal)).await.unwrap();
        ctx.repository.create(new_task("second", Category::Personal)).await.unwrap();
        ctx.repository.create(new_task("third", Category::Personal)).await.unwrap();

        let titles: Vec<String> = ctx.sync.state().tasks.into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_update_status_changes_only_target(ctx: &mut RepositoryTestContext) {
        let keep = ctx.repository.create(new_task("keep", Category::Personal)).await.unwrap();
        let done = ctx.repository.create(new_task("done", Category::Personal)).await.unwrap();
        let before = ctx.sync.state().tasks;

        ctx.repository.update_status(&done, Status::Completed).await.unwrap();

        let after = ctx.sync.state().tasks;
        assert_eq!(after.len(), before.len());
        let untouched_before = before.iter().find(|t| t.id == keep).unwrap();
        let untouched_after = after.iter().find(|t| t.id == keep).unwrap();
        assert_eq!(untouched_before, untouched_after);

        let changed = after.iter().find(|t| t.id == done).unwrap();
        assert_eq!(changed.status, Status::Completed);
        assert_eq!(changed.title, "done");
        assert!(changed.updated_at >= changed.created_at);
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_update_status_is_idempotent(ctx: &mut RepositoryTestContext) {
        let id = ctx.repository.create(new_task("twice", Category::Personal)).await.unwrap();

        ctx.repository.update_status(&id, Status::Completed).await.unwrap();
        ctx.repository.update_status(&id, Status::Completed).await.unwrap();

        let tasks = ctx.sync.state().tasks;
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].is_completed());
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_update_fields_applies_partial_edit(ctx: &mut RepositoryTestContext) {
        let id = ctx.repository.create(new_task("draft", Category::Personal)).await.unwrap();
        let changes = TaskChanges {
            title: Some("final".to_string()),
            category: Some(Category::Future),
            ..TaskChanges::default()
        };

        ctx.repository.update_fields(&id, &changes).await.unwrap();

        let task = ctx.sync.state().tasks.into_iter().next().unwrap();
        assert_eq!(task.title, "final");
        assert_eq!(task.category, Category::Future);
        assert_eq!(task.description, "details");
        assert_eq!(task.status, Status::Pending);
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_empty_edit_sends_nothing(ctx: &mut RepositoryTestContext) {
        let id = ctx.repository.create(new_task("same", Category::Personal)).await.unwrap();
        let operations = ctx.store.acknowledged_operations();

        ctx.repository.update_fields(&id, &TaskChanges::default()).await.unwrap();

        assert_eq!(ctx.store.acknowledged_operations(), operations);
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_delete_removes_task(ctx: &mut RepositoryTestContext) {
        let keep = ctx.repository.create(new_task("keep", Category::Personal)).await.unwrap();
        let gone = ctx.repository.create(new_task("gone", Category::Personal)).await.unwrap();

        ctx.repository.delete(&gone).await.unwrap();

        let ids: Vec<String> = ctx.sync.state().tasks.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![keep]);
        assert!(ctx.store.snapshot(&task_path("alice", &gone)).is_none());
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_delete_removes_partial_node_hidden_from_list(ctx: &mut RepositoryTestContext) {
        let id = ctx.repository.create(new_task("raced", Category::Personal)).await.unwrap();
        ctx.repository.delete(&id).await.unwrap();

        ctx.repository.update_status(&id, Status::Completed).await.unwrap();
        assert!(ctx.store.snapshot(&task_path("alice", &id)).is_some());
        assert!(ctx.sync.state().tasks.is_empty());

        ctx.repository.delete(&id).await.unwrap();

        assert!(ctx.store.snapshot(&task_path("alice", &id)).is_none());
        assert!(ctx.sync.state().tasks.is_empty());
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_delete_missing_task_succeeds_without_change(ctx: &mut RepositoryTestContext) {
        ctx.repository.create(new_task("stay", Category::Personal)).await.unwrap();
        let before = ctx.sync.state();

        ctx.repository.delete("-NotThere0000000000").await.unwrap();

        assert_eq!(ctx.sync.state(), before);
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_signed_out_operations_are_refused(ctx: &mut RepositoryTestContext) {
        ctx.session.send_replace(SessionState {
            user: None,
            loading: false,
        });

        let error = ctx.repository.create(new_task("nope", Category::Personal)).await.unwrap_err();
        assert!(matches!(error.downcast_ref::<AppError>(), Some(AppError::AuthenticationRequired)));

        let error = ctx.repository.delete("any").await.unwrap_err();
        assert!(matches!(error.downcast_ref::<AppError>(), Some(AppError::AuthenticationRequired)));
        assert_eq!(ctx.store.acknowledged_operations(), 0);
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_writes_go_to_current_user(ctx: &mut RepositoryTestContext) {
        ctx.session.send_replace(SessionState {
            user: Some(user("bob")),
            loading: false,
        });

        let id = ctx.repository.create(new_task("bob's", Category::Personal)).await.unwrap();

        assert!(ctx.store.snapshot(&task_path("bob", &id)).is_some());
        assert!(ctx.sync.state().tasks.is_empty());
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_rejected_write_leaves_list_intact(ctx: &mut RepositoryTestContext) {
        ctx.repository.create(new_task("existing", Category::Personal)).await.unwrap();
        let before = ctx.sync.state();
        ctx.store.fail_next_operation("permission denied");

        let error = ctx.repository.create(new_task("rejected", Category::Personal)).await.unwrap_err();

        assert!(matches!(error.downcast_ref::<AppError>(), Some(AppError::StoreOperationFailed(_))));
        assert_eq!(ctx.sync.state(), before);
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_blank_title_is_rejected(ctx: &mut RepositoryTestContext) {
        let error = ctx.repository.create(new_task("   ", Category::Personal)).await.unwrap_err();

        assert!(matches!(error.downcast_ref::<AppError>(), Some(AppError::Validation(_))));
        assert_eq!(ctx.store.acknowledged_operations(), 0);
    }

    #[test_context(RepositoryTestContext)]
    #[tokio::test]
    async fn test_ids_outside_task_subtree_are_rejected(ctx: &mut RepositoryTestContext) {
        for id in ["", "a/b", "../x", "a.b", "#1", "$x", "[0]"] {
            let error = ctx.repository.update_status(id, Status::Completed).await.unwrap_err();
            assert!(matches!(error.downcast_ref::<AppError>(), Some(AppError::Validation(_))), "id {:?}", id);
        }
        assert_eq!(ctx.store.acknowledged_operations(), 0);
    }
}
