pub mod edit_form;
pub mod follow_list;
pub mod help;
pub mod log_view;
pub mod profile_view;
pub mod text;
pub mod theme;
