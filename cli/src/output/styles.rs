//! Terminal stylesheet. Plain by default; [`Styles::colored`] when stdout is
//! a color-capable TTY.

use owo_colors::Style;

#[derive(Default, Clone, Copy)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub info: Style,
    /// Secondary text: key labels, listed config keys.
    pub dim: Style,
    pub bold: Style,
    pub header: Style,
    /// Versions and config keys the engine just touched.
    pub highlight: Style,
}

impl Styles {
    #[must_use]
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            info: Style::new().blue(),
            dim: Style::new().dimmed(),
            bold: Style::new().bold(),
            header: Style::new().bold().cyan(),
            highlight: Style::new().magenta(),
        }
    }
}
