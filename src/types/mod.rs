pub mod columns;
pub mod date_window;
pub mod endpoint;
