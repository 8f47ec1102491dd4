//! Response formatting utilities
//!
//! All output is Telegram HTML; user-provided and data-file text is escaped.

use crate::dialog::SearchHistory;
use crate::heroes::Hero;

/// Escape the three characters Telegram's HTML mode treats specially
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Full hero card
pub fn hero_detail(hero: &Hero) -> String {
    format!(
        "<b>{}</b>\nClass: {}\nRole: {}\n❤️ HP: {}\n⚔️ Attack: {}\n🛡 Defense: {}",
        escape_html(&hero.name),
        escape_html(&hero.class),
        escape_html(&hero.role),
        hero.hp,
        hero.attack,
        hero.defense,
    )
}

/// Compact hero listing under a heading
pub fn hero_list(heading: &str, heroes: &[&Hero]) -> String {
    let mut output = format!("<b>{}</b>\n", escape_html(heading));
    for hero in heroes {
        output.push_str(&format!(
            "\n• {} ({})",
            escape_html(&hero.name),
            escape_html(&hero.role)
        ));
    }
    output
}

/// Numbered list of past search queries
pub fn search_history(history: &SearchHistory) -> String {
    if history.is_empty() {
        return "Your search history is empty.".to_string();
    }

    let mut output = String::from("<b>Your recent searches</b>\n");
    for (i, query) in history.queries().iter().enumerate() {
        output.push_str(&format!("\n{}. {}", i + 1, escape_html(query)));
    }
    output
}
