use super::AppContext;
use crate::{
    api::database::RealtimeDatabase,
    libs::{
        dashboard::Dashboard,
        error::user_message,
        messages::Message,
        repository::TaskRepository,
        task::{parse_due_date, Category, NewTask, Status, Task, TaskChanges, DUE_DATE_FORMAT},
        view::View,
    },
    msg_error, msg_info, msg_success,
};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: Option<TaskCommand>,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Add a new task
    Add {
        /// Task title; prompted for when omitted
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_enum)]
        category: Option<Category>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks of one category
    List {
        #[arg(short, long, value_enum)]
        category: Option<Category>,
        /// Show every category
        #[arg(short, long, conflicts_with = "category")]
        all: bool,
    },
    /// Mark a task as completed
    Done { id: String },
    /// Mark a task as pending again
    Pending { id: String },
    /// Flip a task between pending and completed
    Toggle { id: String },
    /// Edit a task; prompts for every field when no option is given
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_enum)]
        category: Option<Category>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Repository and a mounted dashboard for the signed-in user.
struct Workspace {
    repository: TaskRepository<RealtimeDatabase>,
    dashboard: Dashboard<RealtimeDatabase>,
}

impl Workspace {
    /// `None` after telling the user why the tasks could not be opened.
    async fn open(context: &AppContext, category: Category) -> Result<Option<Self>> {
        let store = context.store();
        let identity = context.session.on_identity_change();
        let mut dashboard = Dashboard::new(store.clone(), identity.clone(), category);

        if let Err(e) = dashboard.mount() {
            msg_error!(e.message());
            return Ok(None);
        }
        if let Err(e) = dashboard.load().await {
            tracing::error!(error = %e, "failed to load tasks");
            msg_error!(e.message());
            return Ok(None);
        }

        Ok(Some(Self {
            repository: TaskRepository::new(store, identity),
            dashboard,
        }))
    }

    fn find(&self, task_id: &str) -> Option<Task> {
        let task = self.dashboard.find(task_id);
        if task.is_none() {
            msg_error!(Message::TaskNotFound(task_id.to_string()));
        }
        task
    }
}

pub async fn cmd(args: TaskArgs) -> Result<()> {
    let context = AppContext::start().await?;

    match args.command {
        Some(TaskCommand::Add {
            title,
            description,
            category,
            due,
        }) => handle_add(&context, title, description, category, due).await,
        Some(TaskCommand::List { category, all }) => handle_list(&context, category, all).await,
        Some(TaskCommand::Done { id }) => with_workspace(&context, |ws| handle_status(ws, id, Some(Status::Completed))).await,
        Some(TaskCommand::Pending { id }) => with_workspace(&context, |ws| handle_status(ws, id, Some(Status::Pending))).await,
        Some(TaskCommand::Toggle { id }) => with_workspace(&context, |ws| handle_status(ws, id, None)).await,
        Some(TaskCommand::Edit {
            id,
            title,
            description,
            category,
            due,
        }) => {
            let due_date = match due.as_deref().map(parse_due_date).transpose() {
                Ok(due_date) => due_date,
                Err(_) => {
                    msg_error!(Message::InvalidDueDate(due.unwrap_or_default()));
                    return Ok(());
                }
            };
            let changes = TaskChanges {
                title,
                description,
                category,
                due_date,
            };
            with_workspace(&context, |ws| handle_edit(ws, id, changes)).await
        }
        Some(TaskCommand::Delete { id, yes }) => with_workspace(&context, |ws| handle_delete(ws, id, yes)).await,
        None => handle_interactive(&context).await,
    }
}

async fn with_workspace<F, Fut>(context: &AppContext, handler: F) -> Result<()>
where
    F: FnOnce(Workspace) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    match Workspace::open(context, context.category(None)).await? {
        Some(workspace) => handler(workspace).await,
        None => Ok(()),
    }
}

async fn handle_add(
    context: &AppContext,
    title: Option<String>,
    description: Option<String>,
    category: Option<Category>,
    due: Option<String>,
) -> Result<()> {
    let user = match context.session.require_user() {
        Ok(user) => user,
        Err(e) => {
            msg_error!(e.message());
            return Ok(());
        }
    };

    let interactive = title.is_none();
    let title = match title {
        Some(title) => title,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptTaskTitle.to_string())
            .interact_text()?,
    };
    let description = match description {
        Some(description) => description,
        None if interactive => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptTaskDescription.to_string())
            .allow_empty(true)
            .interact_text()?,
        None => String::new(),
    };
    let category = match category {
        Some(category) => category,
        None if interactive => prompt_category(context.category(None))?,
        None => context.category(None),
    };
    let due_date = match due {
        Some(raw) => match parse_due_date(&raw) {
            Ok(date) => date,
            Err(_) => {
                msg_error!(Message::InvalidDueDate(raw));
                return Ok(());
            }
        },
        None if interactive => prompt_due_date(Local::now().date_naive())?,
        None => Local::now().date_naive(),
    };

    let fields = NewTask::new(&title, &description, category, due_date);
    let repository = TaskRepository::new(context.store(), context.session.on_identity_change());
    match repository.create(fields).await {
        Ok(id) => {
            tracing::debug!(task_id = %id, uid = %user.uid, "task added");
            msg_success!(Message::TaskCreated(title.trim().to_string()));
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to add task");
            msg_error!(user_message(&e, Message::TaskCreateFailed));
        }
    }
    Ok(())
}

async fn handle_list(context: &AppContext, category: Option<Category>, all: bool) -> Result<()> {
    let selected = context.category(category);
    let Some(mut workspace) = Workspace::open(context, selected).await? else {
        return Ok(());
    };

    let categories: Vec<Category> = if all { Category::ALL.to_vec() } else { vec![selected] };
    for category in categories {
        workspace.dashboard.select_category(category);
        View::dashboard(&workspace.dashboard.state(), category, &workspace.dashboard.visible_tasks())?;
    }

    workspace.dashboard.unmount();
    Ok(())
}

/// Sets the status, or flips it when `status` is `None`.
async fn handle_status(workspace: Workspace, task_id: String, status: Option<Status>) -> Result<()> {
    let Some(task) = workspace.find(&task_id) else {
        return Ok(());
    };
    let status = status.unwrap_or_else(|| task.status.toggled());

    match workspace.repository.update_status(&task.id, status).await {
        Ok(()) => msg_success!(Message::TaskStatusChanged(task.title, status)),
        Err(e) => {
            tracing::error!(error = %e, task_id = %task.id, "failed to update task status");
            msg_error!(user_message(&e, Message::TaskUpdateFailed));
        }
    }
    Ok(())
}

async fn handle_edit(workspace: Workspace, task_id: String, changes: TaskChanges) -> Result<()> {
    let Some(task) = workspace.find(&task_id) else {
        return Ok(());
    };

    let changes = if changes.is_empty() { prompt_changes(&task)? } else { changes };
    let changes = changes.diff_against(&task);
    if changes.is_empty() {
        msg_info!(Message::NoChangesDetected);
        return Ok(());
    }

    let title = changes.title.clone().unwrap_or_else(|| task.title.clone());
    match workspace.repository.update_fields(&task.id, &changes).await {
        Ok(()) => msg_success!(Message::TaskUpdated(title.trim().to_string())),
        Err(e) => {
            tracing::error!(error = %e, task_id = %task.id, "failed to update task");
            msg_error!(user_message(&e, Message::TaskUpdateFailed));
        }
    }
    Ok(())
}

/// Deletes by id even when the task is not in the list: a node that does not
/// decode as a task is hidden from the list but must still be removable.
async fn handle_delete(workspace: Workspace, task_id: String, confirmed: bool) -> Result<()> {
    let label = match workspace.dashboard.find(&task_id) {
        Some(task) => task.title,
        None => {
            tracing::warn!(task_id = %task_id, "task not in the loaded list, deleting by id");
            task_id.clone()
        }
    };

    let confirmed = confirmed
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteTask(label.clone()).to_string())
            .default(false)
            .interact()?;
    if !confirmed {
        msg_info!(Message::OperationCancelled);
        return Ok(());
    }

    match workspace.repository.delete(&task_id).await {
        Ok(()) => msg_success!(Message::TaskDeleted(label)),
        Err(e) => {
            tracing::error!(error = %e, task_id = %task_id, "failed to delete task");
            msg_error!(user_message(&e, Message::TaskDeleteFailed));
        }
    }
    Ok(())
}

async fn handle_interactive(context: &AppContext) -> Result<()> {
    let options = vec!["Add task", "List tasks", "Toggle task status", "Edit task", "Delete task"];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::SelectTaskAction.to_string())
        .items(&options)
        .interact()?;

    match selection {
        0 => handle_add(context, None, None, None, None).await,
        1 => handle_list(context, None, false).await,
        _ => {
            let Some(workspace) = Workspace::open(context, context.category(None)).await? else {
                return Ok(());
            };
            let Some(task_id) = select_task(&workspace)? else {
                return Ok(());
            };
            match selection {
                2 => handle_status(workspace, task_id, None).await,
                3 => handle_edit(workspace, task_id, TaskChanges::default()).await,
                _ => handle_delete(workspace, task_id, false).await,
            }
        }
    }
}

fn select_task(workspace: &Workspace) -> Result<Option<String>> {
    let tasks = workspace.dashboard.state().tasks;
    if tasks.is_empty() {
        msg_info!(Message::NoTasksFound);
        return Ok(None);
    }

    let items: Vec<String> = tasks
        .iter()
        .map(|t| format!("{} {} [{}] due {}", t.category.icon(), t.title, t.status, t.due_date.format(DUE_DATE_FORMAT)))
        .collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::SelectTask.to_string())
        .items(&items)
        .default(0)
        .interact()?;

    Ok(Some(tasks[selection].id.clone()))
}

fn prompt_changes(task: &Task) -> Result<TaskChanges> {
    let title: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptTaskTitle.to_string())
        .default(task.title.clone())
        .interact_text()?;
    let description: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptTaskDescription.to_string())
        .default(task.description.clone())
        .allow_empty(true)
        .interact_text()?;
    let category = prompt_category(task.category)?;
    let due_date = prompt_due_date(task.due_date)?;

    Ok(TaskChanges {
        title: Some(title),
        description: Some(description),
        category: Some(category),
        due_date: Some(due_date),
    })
}

fn prompt_category(default: Category) -> Result<Category> {
    let names: Vec<String> = Category::ALL.iter().map(|c| format!("{} {}", c.icon(), c.title())).collect();
    let current = Category::ALL.iter().position(|c| *c == default).unwrap_or(0);
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptTaskCategory.to_string())
        .items(&names)
        .default(current)
        .interact()?;
    Ok(Category::ALL[selection])
}

fn prompt_due_date(default: NaiveDate) -> Result<NaiveDate> {
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptTaskDueDate.to_string())
        .default(default.format(DUE_DATE_FORMAT).to_string())
        .validate_with(|input: &String| -> Result<(), String> {
            parse_due_date(input).map(|_| ()).map_err(|_| Message::InvalidDueDate(input.clone()).to_string())
        })
        .interact_text()?;
    Ok(parse_due_date(&raw)?)
}
