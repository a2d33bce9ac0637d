pub mod error;
pub mod service;

pub use error::TodoFeatureError;
pub use service::{
    CreateTodoInput, ListTodosQuery, Pagination, PriorityCounts, StatusCounts, TodoPage,
    TodoService, TodoStatistics, UpdateTodoInput,
};
