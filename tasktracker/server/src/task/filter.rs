use crate::entities::sea_orm_active_enums::{Priority, Status};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters accepted by `GET /tasks`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTasksQuery {
    /// Page number, starting at 1. Only used together with `limit`.
    pub page: Option<u64>,
    /// Page size. Only used together with `page`.
    pub limit: Option<u64>,
    /// Exact status match
    pub status: Option<Status>,
    /// Exact priority match
    pub priority: Option<Priority>,
    /// Only tasks past their due date that are not completed
    #[serde(default)]
    pub overdue: bool,
    /// Case-insensitive title prefix
    pub starttitle: Option<String>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    /// Case-insensitive title suffix
    pub endtitle: Option<String>,
}

/// The single selection applied when listing tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    TitleStartsWith(String),
    TitleEndsWith(String),
    Search(String),
    Page { page: u64, limit: u64 },
    Overdue,
    Status(Status),
    Priority(Priority),
    All,
}

impl From<ListTasksQuery> for TaskFilter {
    /// Picks the first applicable filter; every later parameter is ignored.
    fn from(query: ListTasksQuery) -> Self {
        if let Some(prefix) = non_empty(query.starttitle) {
            return TaskFilter::TitleStartsWith(prefix);
        }
        if let Some(suffix) = non_empty(query.endtitle) {
            return TaskFilter::TitleEndsWith(suffix);
        }
        if let Some(needle) = non_empty(query.search) {
            return TaskFilter::Search(needle);
        }
        if let (Some(page), Some(limit)) = (query.page, query.limit) {
            return TaskFilter::Page { page, limit };
        }
        if query.overdue {
            return TaskFilter::Overdue;
        }
        if let Some(status) = query.status {
            return TaskFilter::Status(status);
        }
        if let Some(priority) = query.priority {
            return TaskFilter::Priority(priority);
        }
        TaskFilter::All
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}
