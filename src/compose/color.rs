/// Parses `#RRGGBB` or `#RRGGBBAA` (the `#` is optional). Anything else is
/// opaque black rather than an error.
pub fn parse_color(value: &str) -> [u8; 4] {
    const FALLBACK: [u8; 4] = [0, 0, 0, 255];
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return FALLBACK;
    }
    let channel = |idx: usize| u8::from_str_radix(&hex[idx * 2..idx * 2 + 2], 16).ok();
    let (Some(r), Some(g), Some(b)) = (channel(0), channel(1), channel(2)) else {
        return FALLBACK;
    };
    let a = if hex.len() == 8 {
        match channel(3) {
            Some(alpha) => alpha,
            None => return FALLBACK,
        }
    } else {
        255
    };
    [r, g, b, a]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_and_eight_digit_hex() {
        assert_eq!(parse_color("#FF0000"), [255, 0, 0, 255]);
        assert_eq!(parse_color("00FF0040"), [0, 255, 0, 64]);
        assert_eq!(parse_color("#f5f5f5"), [245, 245, 245, 255]);
    }

    #[test]
    fn malformed_input_is_opaque_black() {
        assert_eq!(parse_color("invalid"), [0, 0, 0, 255]);
        assert_eq!(parse_color(""), [0, 0, 0, 255]);
        assert_eq!(parse_color("#FFF"), [0, 0, 0, 255]);
        assert_eq!(parse_color("#GG0000"), [0, 0, 0, 255]);
        assert_eq!(parse_color("#+F0000"), [0, 0, 0, 255]);
        assert_eq!(parse_color("#ÄÄÄÄ"), [0, 0, 0, 255]);
    }
}
