pub mod todo;

pub use todo::{TodoFilter, TodoModel, TodoPatch};
