pub mod error;
pub mod user;
pub mod todo;

pub use error::DomainError;
pub use user::{User, UserRepository};
pub use todo::{
    NewTodo, SortBy, SortOrder, Todo, TodoFilter, TodoPatch, TodoPriority, TodoRepository,
    TodoStatus,
};
