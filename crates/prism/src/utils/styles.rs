use anstyle::{AnsiColor, Color, RgbColor, Style};
use clap::builder::Styles;

use crate::utils::{CHECK, MARK};

// Extension colors
const PRISM: RgbColor = RgbColor(188, 127, 255); // #BC7FFF
const PRISM_DARK: RgbColor = RgbColor(173, 102, 255); // #AD66FF
const RUNTIME: RgbColor = RgbColor(119, 119, 119); // #777777

pub(crate) fn get_styles() -> Styles {
    Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Rgb(PRISM_DARK))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Rgb(PRISM_DARK))),
        )
        .literal(Style::new().fg_color(Some(Color::Rgb(PRISM))))
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Rgb(PRISM))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Rgb(RUNTIME))))
}

fn fmt_style(msg: &str, style: &Style) -> String {
    format!("{style}{msg}{style:#}")
}

pub(crate) fn fmt_accent(msg: &str) -> String {
    let style = Style::new().fg_color(Some(Color::Rgb(PRISM)));
    fmt_style(msg, &style)
}

pub(crate) fn fmt_red(msg: &str) -> String {
    let red = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
    fmt_style(msg, &red)
}

pub(crate) fn fmt_green(msg: &str) -> String {
    let green = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
    fmt_style(msg, &green)
}

pub(crate) fn fmt_bold(msg: &str) -> String {
    let bold = Style::new().bold();
    fmt_style(msg, &bold)
}

pub(crate) fn fmt_dimmed(msg: &str) -> String {
    let dimmed = Style::new().dimmed();
    fmt_style(msg, &dimmed)
}

pub(crate) fn fmt_success(msg: &str) -> String {
    format!("{} {msg}", fmt_green(CHECK))
}

pub(crate) fn fmt_error(msg: &str) -> String {
    format!("{} {msg}", fmt_red(MARK))
}
