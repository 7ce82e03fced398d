//! Misc small utilities shared across modules: number formatting and argument parsing.
use crate::error::CommandError;
use chrono::Duration;

/// Formats an integer with `,` thousands separators (`1234567` -> `1,234,567`).
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        format!("-{out}")
    } else {
        out
    }
}

/// Same as [`thousands`] for floats, keeping `decimals` fractional digits.
pub fn thousands_f(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };
    let int_value: i64 = int_part.parse().unwrap_or(0);
    let mut out = thousands(int_value);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    if value < 0.0 && value.abs() >= 0.5 * 10f64.powi(-(decimals as i32)) {
        format!("-{out}")
    } else {
        out
    }
}

/// Rupiah display used by every money field: `Rp 1,500,000`.
pub fn rp(value: i64) -> String {
    format!("Rp {}", thousands(value))
}

/// Signed variant for profit/loss lines: `+1,000` / `-250`.
pub fn signed(value: i64) -> String {
    if value >= 0 {
        format!("+{}", thousands(value))
    } else {
        thousands(value)
    }
}

/// Formats a `chrono::Duration` into a compact string (`2d 3h`, `4m 10s`).
pub fn format_duration(dur: Duration) -> String {
    let days = dur.num_days();
    let hours = dur.num_hours() % 24;
    let minutes = dur.num_minutes() % 60;
    let seconds = dur.num_seconds() % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 && days == 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 && days == 0 && hours == 0 {
        parts.push(format!("{seconds}s"));
    }

    if parts.is_empty() {
        "less than a second".to_string()
    } else {
        parts.join(" ")
    }
}

/// Leaderboard position marker: medals for the podium, `` `n.` `` afterwards.
pub fn medal(position: usize) -> String {
    match position {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("`{n}.`"),
    }
}

pub fn parse_i64(raw: &str) -> Result<i64, CommandError> {
    raw.replace(['_', ','], "")
        .parse::<i64>()
        .map_err(|_| CommandError::NotANumber(raw.to_string()))
}

pub fn parse_f64(raw: &str) -> Result<f64, CommandError> {
    raw.replace(['_', ','], "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::NotANumber(raw.to_string()))
}

/// Parses an optional count argument, clamping it into `1..=max`.
pub fn parse_limit(raw: Option<&&str>, default: i64, max: i64) -> Result<i64, CommandError> {
    match raw {
        Some(r) => Ok(parse_i64(r)?.clamp(1, max)),
        None => Ok(default),
    }
}

/// True when the argument is a user mention (`<@123>` or `<@!123>`).
pub fn is_mention(raw: &str) -> bool {
    raw.starts_with("<@") && raw.ends_with('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(-1_234_567), "-1,234,567");
        assert_eq!(rp(50_000), "Rp 50,000");
    }

    #[test]
    fn thousands_f_keeps_fraction() {
        assert_eq!(thousands_f(1234.5678, 2), "1,234.57");
        assert_eq!(thousands_f(-0.001, 2), "0.00");
        assert_eq!(thousands_f(-1500.0, 0), "-1,500");
    }

    #[test]
    fn duration_is_compact() {
        assert_eq!(format_duration(Duration::seconds(75)), "1m 15s");
        assert_eq!(format_duration(Duration::hours(50)), "2d 2h");
        assert_eq!(format_duration(Duration::zero()), "less than a second");
    }

    #[test]
    fn numbers_accept_separators() {
        assert_eq!(parse_i64("1,000,000").unwrap(), 1_000_000);
        assert!(matches!(parse_i64("abc"), Err(CommandError::NotANumber(_))));
        assert_eq!(parse_limit(Some(&"500"), 10, 50).unwrap(), 50);
        assert_eq!(parse_limit(None, 10, 50).unwrap(), 10);
    }
}
