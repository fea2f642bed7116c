//! Parsing for the color strings used by room data and profiles:
//! `#rgb`, `#rrggbb`, and `rgba(r,g,b,a)`.

/// Parses a color string into RGBA channels. Malformed input degrades to
/// opaque white rather than failing the frame.
pub fn parse_rgba(value: &str) -> (u8, u8, u8, u8) {
    let value = value.trim();

    if let Some(body) = value
        .strip_prefix("rgba(")
        .and_then(|v| v.strip_suffix(')'))
    {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() == 4 {
            let r = parts[0].parse::<u8>().unwrap_or(255);
            let g = parts[1].parse::<u8>().unwrap_or(255);
            let b = parts[2].parse::<u8>().unwrap_or(255);
            let a = parts[3]
                .parse::<f32>()
                .map(|a| (a.clamp(0.0, 1.0) * 255.0) as u8)
                .unwrap_or(255);
            return (r, g, b, a);
        }
        return (255, 255, 255, 255);
    }

    let hex = value.trim_start_matches('#');
    match hex.len() {
        3 => {
            let digit = |i: usize| {
                u8::from_str_radix(&hex[i..=i], 16)
                    .map(|v| v * 17)
                    .unwrap_or(255)
            };
            (digit(0), digit(1), digit(2), 255)
        }
        6 => {
            let channel =
                |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(255);
            (channel(0..2), channel(2..4), channel(4..6), 255)
        }
        _ => (255, 255, 255, 255),
    }
}

pub fn sdl(value: &str) -> sdl2::pixels::Color {
    let (r, g, b, a) = parse_rgba(value);
    sdl2::pixels::Color::RGBA(r, g, b, a)
}

pub fn egui(value: &str) -> egui_sdl2::egui::Color32 {
    let (r, g, b, a) = parse_rgba(value);
    egui_sdl2::egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::parse_rgba;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_rgba("#3b82f6"), (0x3b, 0x82, 0xf6, 255));
        assert_eq!(parse_rgba("#fff"), (255, 255, 255, 255));
    }

    #[test]
    fn parses_rgba_form() {
        assert_eq!(parse_rgba("rgba(255,255,255,0.4)"), (255, 255, 255, 102));
    }

    #[test]
    fn malformed_input_degrades_to_white() {
        assert_eq!(parse_rgba("teal"), (255, 255, 255, 255));
        assert_eq!(parse_rgba("#12"), (255, 255, 255, 255));
    }
}
