use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};
use tasks_server::entities::task;
use tasks_server::task::{Task, TaskFilter, TaskService, TaskServiceError, TaskStatus};

mod common;

/// Test helper to insert a task row with an explicit status.
async fn insert_task(
    db: &DatabaseConnection,
    title: &str,
    description: &str,
    status: TaskStatus,
) -> task::Model {
    let active_model = task::ActiveModel {
        title: ActiveValue::Set(title.to_string()),
        description: ActiveValue::Set(description.to_string()),
        status: ActiveValue::Set(status),
        ..Default::default()
    };
    active_model.insert(db).await.expect("Failed to insert task")
}

#[tokio::test]
async fn can_create_task_with_open_status() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let created_task = task_service
        .create_task("Buy milk".to_string(), "From the store".to_string())
        .await
        .expect("Failed to create task");

    let expected_task = Task::new(
        created_task.id(), // The ID is generated, so we use the created task's ID
        "Buy milk".to_string(),
        "From the store".to_string(),
        TaskStatus::Open,
    );
    assert_eq!(created_task, expected_task);
}

#[tokio::test]
async fn can_get_task_by_id() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let inserted = insert_task(&state.db, "Walk dog", "Around the block", TaskStatus::Open).await;

    let found = task_service
        .get_task_by_id(inserted.id as u32)
        .await
        .expect("Failed to get task");

    assert_eq!(found, Task::from(inserted));
}

#[tokio::test]
async fn can_handle_get_when_task_not_found() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let inserted = insert_task(&state.db, "Walk dog", "Around the block", TaskStatus::Open).await;

    let non_existent_id = (inserted.id + 1) as u32;
    let result = task_service.get_task_by_id(non_existent_id).await;
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(
            e.to_string(),
            format!("Task with ID '{}' not found", non_existent_id)
        );
    }
}

#[tokio::test]
async fn can_update_task_status() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let inserted = insert_task(&state.db, "Buy milk", "From the store", TaskStatus::Open).await;

    let updated = task_service
        .update_task_status(inserted.id as u32, TaskStatus::Done)
        .await
        .expect("Failed to update task status");
    assert_eq!(updated.status(), TaskStatus::Done);

    // The mutation must be persisted, not just reflected in the returned value.
    let fetched = task_service
        .get_task_by_id(inserted.id as u32)
        .await
        .expect("Failed to fetch updated task");
    assert_eq!(fetched.status(), TaskStatus::Done);
}

#[tokio::test]
async fn can_handle_update_when_task_not_found() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let result = task_service.update_task_status(999, TaskStatus::Done).await;
    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(999))));
}

#[tokio::test]
async fn can_delete_task() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let inserted = insert_task(&state.db, "Buy milk", "From the store", TaskStatus::Open).await;

    task_service
        .delete_task(inserted.id as u32)
        .await
        .expect("Failed to delete task");

    let result = task_service.get_task_by_id(inserted.id as u32).await;
    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(_))));
}

#[tokio::test]
async fn can_handle_delete_when_task_not_found() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let result = task_service.delete_task(999).await;
    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(999))));
}

#[tokio::test]
async fn can_get_all_tasks_without_filter() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    insert_task(&state.db, "Buy milk", "From the store", TaskStatus::Open).await;
    insert_task(&state.db, "Walk dog", "Around the block", TaskStatus::Done).await;

    let tasks = task_service
        .get_tasks(&TaskFilter::default())
        .await
        .expect("Failed to get tasks");
    assert_eq!(tasks.len(), 2);
}

#[tokio::test]
async fn can_filter_tasks_by_status() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    insert_task(&state.db, "Buy milk", "From the store", TaskStatus::Open).await;
    let done = insert_task(&state.db, "Walk dog", "Around the block", TaskStatus::Done).await;

    let filter = TaskFilter {
        status: Some(TaskStatus::Done),
        search: None,
    };
    let tasks = task_service
        .get_tasks(&filter)
        .await
        .expect("Failed to get tasks");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0], Task::from(done));
}

#[tokio::test]
async fn can_filter_tasks_by_search() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let milk = insert_task(&state.db, "Buy milk", "From the store", TaskStatus::Open).await;
    insert_task(&state.db, "Walk dog", "Around the block", TaskStatus::Done).await;

    let filter = TaskFilter {
        status: None,
        search: Some("milk".to_string()),
    };
    let tasks = task_service
        .get_tasks(&filter)
        .await
        .expect("Failed to get tasks");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0], Task::from(milk));
}

#[tokio::test]
async fn can_search_in_description() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let store = insert_task(&state.db, "Buy milk", "From the store", TaskStatus::Open).await;
    insert_task(&state.db, "Walk dog", "Around the block", TaskStatus::Open).await;

    let filter = TaskFilter {
        status: None,
        search: Some("store".to_string()),
    };
    let tasks = task_service
        .get_tasks(&filter)
        .await
        .expect("Failed to get tasks");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0], Task::from(store));
}

#[tokio::test]
async fn can_combine_status_and_search_filters_with_and() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    insert_task(&state.db, "Buy milk", "From the store", TaskStatus::Open).await;
    insert_task(&state.db, "Walk dog", "Around the block", TaskStatus::Done).await;

    // "milk" only matches an OPEN task, so combining with status DONE
    // must yield nothing.
    let filter = TaskFilter {
        status: Some(TaskStatus::Done),
        search: Some("milk".to_string()),
    };
    let tasks = task_service
        .get_tasks(&filter)
        .await
        .expect("Failed to get tasks");

    assert!(tasks.is_empty());
}

#[tokio::test]
async fn can_handle_empty_task_list() {
    let state = common::setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let tasks = task_service
        .get_tasks(&TaskFilter::default())
        .await
        .expect("Failed to get tasks");
    assert!(tasks.is_empty());
}
