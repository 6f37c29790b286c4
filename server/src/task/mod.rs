use crate::entities::*;
use sea_orm::*;
use std::str::FromStr;
use std::sync::Arc;

pub mod api;

pub use crate::entities::task::TaskStatus;

/// Error returned when a raw status string does not name a known status.
/// Carries the normalized (uppercased) offending value.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0} is an invalid status")]
pub struct InvalidStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = InvalidStatusError;

    /// Normalizes a raw status string to uppercase, then checks membership
    /// in the closed status set.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.to_uppercase();
        match normalized.as_str() {
            "OPEN" => Ok(TaskStatus::Open),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            _ => Err(InvalidStatusError(normalized)),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Task {
    id: u32,
    title: String,
    description: String,
    status: TaskStatus,
}

impl Task {
    pub fn new(id: u32, title: String, description: String, status: TaskStatus) -> Self {
        Self {
            id,
            title,
            description,
            status,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description of the task.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status of the task.
    pub fn status(&self) -> TaskStatus {
        self.status
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id as u32,
            model.title,
            model.description,
            model.status,
        )
    }
}

/// Optional predicates applied when listing tasks. Absent fields impose no
/// predicate; present fields combine with logical AND.
#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub search: Option<String>,
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a task not found error.
    #[error("Task with ID '{0}' not found")]
    TaskNotFound(u32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Shared state handed to the task routers.
#[derive(Clone, Debug)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// Translates task operations into queries against the `task` table.
pub struct TaskRepository<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskRepository<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskRepository {
        TaskRepository { db }
    }

    /// Retrieves all tasks matching the given filter.
    ///
    /// A present `status` restricts rows to an equal status; a present
    /// `search` restricts rows whose title or description contains the
    /// search substring. Both predicates combine with AND.
    #[tracing::instrument(skip(self))]
    pub async fn get_tasks(&self, filter: &TaskFilter) -> Result<Vec<task::Model>, DbErr> {
        let mut query = task::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(task::Column::Status.eq(status));
        }

        if let Some(search) = &filter.search {
            query = query.filter(
                Condition::any()
                    .add(task::Column::Title.contains(search.as_str()))
                    .add(task::Column::Description.contains(search.as_str())),
            );
        }

        query.all(self.db).await
    }

    /// Inserts a new task row. The status is always `OPEN` on creation,
    /// regardless of what the client supplied.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(
        &self,
        title: String,
        description: String,
    ) -> Result<task::Model, DbErr> {
        let active_model = task::ActiveModel {
            title: ActiveValue::Set(title),
            description: ActiveValue::Set(description),
            status: ActiveValue::Set(TaskStatus::Open),
            ..Default::default()
        };
        active_model.insert(self.db).await
    }

    /// Retrieves the task row with the given ID, if any.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, id: u32) -> Result<Option<task::Model>, DbErr> {
        task::Entity::find_by_id(id as i32).one(self.db).await
    }

    /// Deletes the task row with the given ID and returns the number of
    /// affected rows (0 or 1).
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: u32) -> Result<u64, DbErr> {
        let result = task::Entity::delete_by_id(id as i32).exec(self.db).await?;
        Ok(result.rows_affected)
    }

    /// Persists a new status for an existing task row and returns the
    /// updated row.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        model: task::Model,
        status: TaskStatus,
    ) -> Result<task::Model, DbErr> {
        let mut active_model: task::ActiveModel = model.into();
        active_model.status = ActiveValue::Set(status);
        active_model.update(self.db).await
    }
}

pub struct TaskService<'a> {
    repository: TaskRepository<'a>,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService {
        TaskService {
            repository: TaskRepository::new(db),
        }
    }

    /// Retrieves all tasks matching the given filter.
    ///
    /// # Arguments
    ///
    /// * `filter` - Optional status and search predicates.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = self
            .repository
            .get_tasks(filter)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: u32) -> Result<Task, TaskServiceError> {
        let task_model = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;
        Ok(Task::from(task_model))
    }

    /// Creates a new task with the given title and description. The created
    /// task always starts in the `OPEN` status.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the task.
    /// * `description` - The description of the task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(
        &self,
        title: String,
        description: String,
    ) -> Result<Task, TaskServiceError> {
        let created_model = self.repository.create_task(title, description).await?;
        Ok(Task::from(created_model))
    }

    /// Deletes a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to delete.
    ///
    /// # Returns
    ///
    /// An empty `Result` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: u32) -> Result<(), TaskServiceError> {
        let affected = self.repository.delete_by_id(id).await?;
        if affected == 0 {
            return Err(TaskServiceError::TaskNotFound(id));
        }
        Ok(())
    }

    /// Updates the status of a task by its ID. Transitions are
    /// unrestricted; any status may move to any other status.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `status` - The new status for the task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_status(
        &self,
        id: u32,
        status: TaskStatus,
    ) -> Result<Task, TaskServiceError> {
        let task_to_update = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let updated_model = self.repository.update_status(task_to_update, status).await?;
        Ok(Task::from(updated_model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_lowercase_status() {
        let status: TaskStatus = "done".parse().expect("Failed to parse status");
        assert_eq!(status, TaskStatus::Done);
    }

    #[test]
    fn can_parse_exact_status() {
        let status: TaskStatus = "IN_PROGRESS".parse().expect("Failed to parse status");
        assert_eq!(status, TaskStatus::InProgress);
    }

    #[test]
    fn can_reject_unknown_status() {
        let result = "finished".parse::<TaskStatus>();
        assert_eq!(result, Err(InvalidStatusError("FINISHED".to_string())));
        assert_eq!(
            result.unwrap_err().to_string(),
            "FINISHED is an invalid status"
        );
    }

    #[test]
    fn can_reject_empty_status() {
        assert!("".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn can_report_missing_task_in_error_message() {
        let error = TaskServiceError::TaskNotFound(42);
        assert_eq!(error.to_string(), "Task with ID '42' not found");
    }
}
