//! Terminal color definitions and ANSI conversion
//!
//! Provides the Color enum used by TUI rendering, the editor palette, and
//! ANSI escape sequence generation.

/// Terminal color definition - supporting Reset, RGB, and 16-color ANSI fallback
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Color {
    Reset,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Rgb { r: u8, g: u8, b: u8 },
}

const fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r, g, b }
}

impl Color {
    /// Convert Color enum to ANSI foreground color code
    pub fn to_ansi_fg_code(self) -> String {
        match self {
            Color::Reset => "39".to_string(),
            Color::Rgb { r, g, b } => format!("38;2;{};{};{}", r, g, b),
            named => (30 + named.ansi_offset()).to_string(),
        }
    }

    /// Convert Color enum to ANSI background color code
    pub fn to_ansi_bg_code(self) -> String {
        match self {
            Color::Reset => "49".to_string(),
            Color::Rgb { r, g, b } => format!("48;2;{};{};{}", r, g, b),
            named => (40 + named.ansi_offset()).to_string(),
        }
    }

    /// Offset of a named color from the base SGR code; bright colors sit 60 higher
    fn ansi_offset(self) -> u8 {
        match self {
            Color::Black => 0,
            Color::Red => 1,
            Color::Green => 2,
            Color::Yellow => 3,
            Color::Blue => 4,
            Color::Magenta => 5,
            Color::Cyan => 6,
            Color::White => 7,
            Color::BrightBlack => 60,
            Color::BrightRed => 61,
            Color::BrightGreen => 62,
            Color::BrightYellow => 63,
            Color::BrightBlue => 64,
            Color::BrightMagenta => 65,
            Color::BrightCyan => 66,
            Color::BrightWhite => 67,
            Color::Reset | Color::Rgb { .. } => 9,
        }
    }

    /// Convert RGB color to nearest 16-color ANSI for terminals without TrueColor
    pub fn to_ansi_fallback(self) -> Self {
        match self {
            Color::Rgb { r, g, b } => {
                let luminance = (r as u32 + g as u32 + b as u32) / 3;
                let bright = luminance > 127;
                let threshold = 85;

                let has_r = r > threshold;
                let has_g = g > threshold;
                let has_b = b > threshold;

                match (has_r, has_g, has_b, bright) {
                    (false, false, false, false) => Color::Black,
                    (false, false, false, true) => Color::BrightBlack,
                    (true, false, false, false) => Color::Red,
                    (true, false, false, true) => Color::BrightRed,
                    (false, true, false, false) => Color::Green,
                    (false, true, false, true) => Color::BrightGreen,
                    (true, true, false, false) => Color::Yellow,
                    (true, true, false, true) => Color::BrightYellow,
                    (false, false, true, false) => Color::Blue,
                    (false, false, true, true) => Color::BrightBlue,
                    (true, false, true, false) => Color::Magenta,
                    (true, false, true, true) => Color::BrightMagenta,
                    (false, true, true, false) => Color::Cyan,
                    (false, true, true, true) => Color::BrightCyan,
                    (true, true, true, false) => Color::White,
                    (true, true, true, true) => Color::BrightWhite,
                }
            }
            other => other,
        }
    }
}

/// Whether the terminal advertises 24-bit color
pub fn supports_truecolor() -> bool {
    if let Ok(colorterm) = std::env::var("COLORTERM") {
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return true;
        }
    }
    std::env::var("TERM").is_ok_and(|term| {
        term.contains("24bit") || term.contains("truecolor") || term.starts_with("xterm-kitty")
    })
}

/// Colors for each region of the editor screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub gutter_fg: Color,
    pub selection_bg: Color,
    pub cursor_fg: Color,
    pub cursor_bg: Color,
    pub tab_bg: Color,
    pub tab_fg: Color,
    pub active_tab_bg: Color,
    pub active_tab_fg: Color,
    pub separator_fg: Color,
    pub output_fg: Color,
    pub error_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
}

impl Palette {
    /// Dracula
    pub const fn dark() -> Self {
        let bg = (40, 42, 54);
        let fg = (248, 248, 242);
        let purple = (189, 147, 249);
        let selection = (68, 71, 90);
        let comment = (98, 114, 164);
        let red = (255, 85, 85);
        let green = (80, 250, 123);
        Self {
            bg: rgb(bg),
            fg: rgb(fg),
            gutter_fg: rgb(comment),
            selection_bg: rgb(selection),
            cursor_fg: rgb(bg),
            cursor_bg: rgb(fg),
            tab_bg: rgb((33, 34, 44)),
            tab_fg: rgb(comment),
            active_tab_bg: rgb(purple),
            active_tab_fg: rgb(bg),
            separator_fg: rgb(purple),
            output_fg: rgb(green),
            error_fg: rgb(red),
            status_bg: rgb(selection),
            status_fg: rgb(fg),
        }
    }

    /// The same palette reduced to the 16 ANSI colors
    pub fn ansi(self) -> Self {
        let f = Color::to_ansi_fallback;
        Self {
            bg: Color::Reset,
            fg: Color::Reset,
            gutter_fg: f(self.gutter_fg),
            selection_bg: f(self.selection_bg),
            cursor_fg: f(self.cursor_fg),
            cursor_bg: f(self.cursor_bg),
            tab_bg: f(self.tab_bg),
            tab_fg: f(self.tab_fg),
            active_tab_bg: f(self.active_tab_bg),
            active_tab_fg: f(self.active_tab_fg),
            separator_fg: f(self.separator_fg),
            output_fg: f(self.output_fg),
            error_fg: f(self.error_fg),
            status_bg: f(self.status_bg),
            status_fg: f(self.status_fg),
        }
    }

    /// Pick the dark palette at the depth the terminal supports
    pub fn detect() -> Self {
        if supports_truecolor() {
            Self::dark()
        } else {
            Self::dark().ansi()
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ansi_codes() {
        assert_eq!(Color::Red.to_ansi_fg_code(), "31");
        assert_eq!(Color::Red.to_ansi_bg_code(), "41");
        assert_eq!(Color::BrightWhite.to_ansi_fg_code(), "97");
        assert_eq!(Color::BrightBlack.to_ansi_bg_code(), "100");
        assert_eq!(Color::Reset.to_ansi_fg_code(), "39");
        assert_eq!(
            Color::Rgb { r: 1, g: 2, b: 3 }.to_ansi_bg_code(),
            "48;2;1;2;3"
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(Color::Rgb { r: 255, g: 85, b: 85 }.to_ansi_fallback(), Color::BrightRed);
        assert_eq!(Color::Rgb { r: 0, g: 0, b: 0 }.to_ansi_fallback(), Color::Black);
        assert_eq!(Color::Blue.to_ansi_fallback(), Color::Blue);
    }

    #[test]
    fn test_ansi_palette_has_no_rgb() {
        let palette = Palette::dark().ansi();
        for color in [
            palette.bg,
            palette.selection_bg,
            palette.active_tab_bg,
            palette.error_fg,
            palette.status_bg,
        ] {
            assert!(!matches!(color, Color::Rgb { .. }));
        }
    }
}
