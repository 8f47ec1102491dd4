//! Menu-driven dialog: states, the menu table and the dispatcher

pub mod content;
pub mod dispatcher;
pub mod history;
pub mod menu;
pub mod state;

pub use content::default_menu_table;
pub use dispatcher::{Dispatcher, Outcome};
pub use history::{DEFAULT_HISTORY_LIMIT, SearchEntry, SearchHistory};
pub use menu::{Action, InputKind, Menu, MenuOption, MenuTable, Next};
pub use state::MenuState;
