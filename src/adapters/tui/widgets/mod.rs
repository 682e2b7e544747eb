pub mod task_form;
pub mod text_input;

pub use task_form::TaskFormView;
pub use text_input::TextInput;
