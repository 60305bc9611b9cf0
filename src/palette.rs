//! Colors derived from message data: avatar fallbacks, author and accent colors.

/// Author name color when the member has no colored role.
pub const DEFAULT_AUTHOR_COLOR: &str = "#f2f3f5";

/// Embed bar color when the embed sets none.
pub const DEFAULT_EMBED_COLOR: &str = "#5865f2";

/// Stable hue (0..360) for an id, using an FNV-1a hash so the same user
/// always gets the same avatar color.
pub fn id_hue(id: &str) -> u32 {
    let mut hash: u64 = 1469598103934665603u64;
    for b in id.as_bytes() {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(1099511628211u64);
    }
    (hash % 360) as u32
}

/// Background color for the letter avatar shown when a user has no image.
pub fn avatar_color(user_id: &str) -> String {
    format!("hsl({}, 70%, 50%)", id_hue(user_id))
}

/// `#rrggbb` for a 24-bit color integer.
pub fn hex_color(color: u32) -> String {
    format!("#{:06x}", color & 0x00ff_ffff)
}

/// Author name color: the role color if the member has one.
pub fn author_color(role_color: Option<u32>) -> String {
    match role_color {
        Some(c) if c != 0 => hex_color(c),
        _ => DEFAULT_AUTHOR_COLOR.to_string(),
    }
}

pub fn embed_color(color: Option<u32>) -> String {
    match color {
        Some(c) if c != 0 => hex_color(c),
        _ => DEFAULT_EMBED_COLOR.to_string(),
    }
}

/// First character of a name, upper-cased, for letter avatars.
pub fn initial(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}
