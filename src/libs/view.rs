use super::messages::Message;
use super::sync::TaskListState;
use super::task::{Category, Task, DUE_DATE_FORMAT};
use crate::{msg_error, msg_info, msg_print};
use anyhow::Result;
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn tasks(tasks: &[Task]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "TITLE", "DESCRIPTION", "STATUS", "DUE"]);
        for task in tasks {
            let status = if task.is_completed() { "✅ completed" } else { "⏳ pending" };
            table.add_row(row![
                task.id,
                task.title,
                task.description,
                status,
                task.due_date.format(DUE_DATE_FORMAT)
            ]);
        }
        table.printstd();

        Ok(())
    }

    /// Renders one category of the dashboard: header, then loading, error, empty or table.
    pub fn dashboard(state: &TaskListState, category: Category, visible: &[Task]) -> Result<()> {
        msg_print!(Message::TasksHeader(category), true);

        if state.loading {
            msg_info!(Message::TasksLoading);
            return Ok(());
        }
        if state.error.is_some() {
            msg_error!(Message::TasksLoadFailed);
        }
        if visible.is_empty() {
            msg_print!(Message::NoTasksFound);
            msg_print!(Message::NoTasksFoundHint);
            return Ok(());
        }

        Self::tasks(visible)
    }
}
