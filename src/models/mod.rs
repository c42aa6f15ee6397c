pub mod todo;
pub mod user;

pub use todo::{ListTodos, SortBy, Todo, TodoInput, TodoQuery};
pub use user::{NewUser, Role, SignInInput, SignUpInput, UpdateUserInput, User, UserChanges};
