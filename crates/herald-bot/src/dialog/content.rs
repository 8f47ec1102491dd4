//! Built-in menu layout and static texts

use super::menu::{Action, InputKind, Menu, MenuOption, MenuTable};
use super::MenuState;
use crate::error::DialogError;

pub const WELCOME_TEXT: &str = "👋 <b>Welcome to Herald!</b>\n\
    I can tell you about heroes, classes and guides, search the hero list \
    or pass a question to our assistant.";

pub const HELP_TEXT: &str = "<b>Herald commands</b>\n\
    /start - back to the main menu\n\
    /help - show this help\n\
    /search - search heroes by name\n\
    /history - show your recent searches\n\n\
    Use the keyboard buttons to move between menus.";

pub const UNRECOGNIZED_TEXT: &str =
    "Sorry, I didn't understand that. Please pick one of the options below.";

pub const NO_RESULTS_TEXT: &str = "No heroes match your search.";

pub const EMPTY_CLASS_TEXT: &str = "No heroes of this class yet.";

pub const UNKNOWN_HERO_TEXT: &str = "⚠️ That hero is no longer available.";

pub const THINKING_TEXT: &str = "Let me think about that…";

pub const BACK_LABEL: &str = "back";

/// Class labels shown in the classes menu
pub const CLASS_LABELS: [&str; 5] = ["warrior", "mage", "ranger", "healer", "assassin"];

const GUIDE_BEGINNER: &str = "<b>Beginner guide</b>\n\
    1. Finish the tutorial to unlock your first three heroes.\n\
    2. Claim the daily login reward.\n\
    3. Join a guild as soon as you reach level 10.";

const GUIDE_LEVELING: &str = "<b>Leveling guide</b>\n\
    Run the daily dungeons first, then spend stamina on campaign stages \
    two levels below your team. Event quests give double experience on weekends.";

const GUIDE_GEAR: &str = "<b>Gear guide</b>\n\
    Upgrade weapons before armor. Keep epic sets for your main carry and \
    salvage duplicates for enhancement stones.";

const FAQ_ACCOUNT: &str = "<b>Account</b>\n\
    Link your account in Settings → Account to keep progress across devices. \
    A linked account cannot be moved to another login.";

const FAQ_PAYMENTS: &str = "<b>Payments</b>\n\
    Purchases arrive within a few minutes. If a purchase is missing after an \
    hour, restart the game and check the in-game mailbox.";

const FAQ_SUPPORT: &str = "<b>Support</b>\n\
    Write to support from Settings → Help. Include your player ID and a \
    screenshot of the problem.";

/// The menu table the bot ships with
pub fn default_menu_table() -> Result<MenuTable, DialogError> {
    let mut classes = Menu::new(
        MenuState::ClassesMenu,
        "Pick a class to see its heroes:",
        InputKind::Options,
    )
    .per_row(3);
    for class in CLASS_LABELS {
        classes = classes.option(MenuOption::show(class, Action::ListClass(class.to_string())));
    }
    classes = classes.option(MenuOption::go(BACK_LABEL, MenuState::CharactersMenu));

    MenuTable::new([
        Menu::new(
            MenuState::MainMenu,
            "<b>Main menu</b>\nWhat would you like to do?",
            InputKind::Options,
        )
            .per_row(3)
            .option(MenuOption::go("characters", MenuState::CharactersMenu))
            .option(MenuOption::go("guides", MenuState::GuidesMenu))
            .option(MenuOption::go("faq", MenuState::FaqMenu))
            .option(MenuOption::go("search", MenuState::SearchPerforming))
            .option(MenuOption::show("history", Action::ShowHistory))
            .option(MenuOption::go("ask", MenuState::AskAssistant)),
        Menu::new(
            MenuState::CharactersMenu,
            "<b>Characters</b>\nBrowse by class or search by name.",
            InputKind::Options,
        )
            .option(MenuOption::go("classes", MenuState::ClassesMenu))
            .option(MenuOption::go("search", MenuState::SearchPerforming))
            .option(MenuOption::go(BACK_LABEL, MenuState::MainMenu)),
        classes,
        Menu::new(MenuState::GuidesMenu, "<b>Guides</b>\nPick a topic:", InputKind::Options)
            .per_row(3)
            .option(MenuOption::show("beginner", Action::Text(GUIDE_BEGINNER.to_string())))
            .option(MenuOption::show("leveling", Action::Text(GUIDE_LEVELING.to_string())))
            .option(MenuOption::show("gear", Action::Text(GUIDE_GEAR.to_string())))
            .option(MenuOption::go(BACK_LABEL, MenuState::MainMenu)),
        Menu::new(MenuState::FaqMenu, "<b>FAQ</b>\nPick a question:", InputKind::Options)
            .per_row(3)
            .option(MenuOption::show("account", Action::Text(FAQ_ACCOUNT.to_string())))
            .option(MenuOption::show("payments", Action::Text(FAQ_PAYMENTS.to_string())))
            .option(MenuOption::show("support", Action::Text(FAQ_SUPPORT.to_string())))
            .option(MenuOption::go(BACK_LABEL, MenuState::MainMenu)),
        Menu::new(
            MenuState::SearchPerforming,
            "🔎 Type a hero name (or part of it) to search:",
            InputKind::HeroSearch,
        ),
        Menu::new(
            MenuState::SearchHeroResults,
            "Pick a hero to see the details:",
            InputKind::ResultPick,
        )
        .option(MenuOption::go(BACK_LABEL, MenuState::MainMenu)),
        Menu::new(
            MenuState::AskAssistant,
            "💬 Ask me anything about the game. Send /start to leave.",
            InputKind::AssistantQuery,
        ),
    ])
}
