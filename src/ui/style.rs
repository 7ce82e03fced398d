//! Central UI style constants and helpers.
use serenity::builder::{CreateEmbed, CreateEmbedFooter};

pub const COLOR_MOCHI: u32 = 0xFFB6C1; // Pink
pub const COLOR_SUCCESS: u32 = 0x00FF00;
pub const COLOR_INFO: u32 = 0x3498DB; // Blue
pub const COLOR_GOLD: u32 = 0xFFD700;
pub const COLOR_WARNING: u32 = 0xF39C12; // Orange
pub const COLOR_ALERT: u32 = 0xE74C3C; // Red
pub const COLOR_PURPLE: u32 = 0x9B59B6;
pub const COLOR_GREEN: u32 = 0x2ECC71;
pub const COLOR_KUMPUL: u32 = 0xFF4500;

pub const EMOJI_COIN: &str = "💰";
pub const EMOJI_LUCK: &str = "🍀";

/// Convenience builder for an alert/error-styled embed.
pub fn error_embed<T: Into<String>, U: Into<String>>(title: T, description: U) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(COLOR_ALERT)
}

pub fn success_embed<T: Into<String>, U: Into<String>>(title: T, description: U) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(COLOR_SUCCESS)
}

pub fn footer(text: impl Into<String>) -> CreateEmbedFooter {
    CreateEmbedFooter::new(text)
}

/// Help embeds share one layout: a title, a one-line blurb, then `(section, lines)` fields.
pub fn help_embed(title: &str, blurb: &str, color: u32, sections: &[(&str, String)]) -> CreateEmbed {
    sections.iter().fold(
        CreateEmbed::new().title(title).description(blurb).color(color),
        |embed, (name, body)| embed.field(*name, body, false),
    )
}
