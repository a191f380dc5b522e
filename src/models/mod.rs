pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskListQuery};
pub use user::{CreateUserInput, PublicUser, Role, UpdateUserInput, User};
