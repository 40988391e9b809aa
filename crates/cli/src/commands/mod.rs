//! Command implementations.

mod list;
mod menu;
mod send;
mod validate;

pub use list::run_list;
pub use menu::run_menu;
pub use send::run_send;
pub use validate::run_validate;
