// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! SGR (select graphic rendition) escape sequences. Only the subset that the
//! [`crate::SpanId`] vocabulary needs is modelled here. Every span has an *open* code and
//! a matching *close* code that undoes only that attribute, so nested spans can be exited
//! one at a time.
//!
//! More info:
//! - <https://doc.rust-lang.org/reference/tokens.html#ascii-escapes>
//! - <https://notes.burke.libbey.me/ansi-escape-codes/>
//! - <https://en.wikipedia.org/wiki/ANSI_escape_code#SGR_(Select_Graphic_Rendition)_parameters>

use std::fmt::{Display, Formatter, Result};

/// The escape character. Its presence in a `write` payload is fatal, see
/// [`crate::EffectError::EscapeInWrite`].
pub const ESC: char = '\x1b';

const CSI: &str = "\x1b[";
const SGR: &str = "m";

/// The 16 colors that every terminal supports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AnsiColor16 {
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
}

impl AnsiColor16 {
    /// Offset added to the foreground (30 / 90) or background (40 / 100) base.
    #[rustfmt::skip]
    fn offset_and_is_bright(self) -> (u8, bool) {
        match self {
            AnsiColor16::Black         => (0, false),
            AnsiColor16::Red           => (1, false),
            AnsiColor16::Green         => (2, false),
            AnsiColor16::Yellow        => (3, false),
            AnsiColor16::Blue          => (4, false),
            AnsiColor16::Magenta       => (5, false),
            AnsiColor16::Cyan          => (6, false),
            AnsiColor16::White         => (7, false),
            AnsiColor16::BrightBlack   => (0, true),
            AnsiColor16::BrightRed     => (1, true),
            AnsiColor16::BrightGreen   => (2, true),
            AnsiColor16::BrightYellow  => (3, true),
            AnsiColor16::BrightBlue    => (4, true),
            AnsiColor16::BrightMagenta => (5, true),
            AnsiColor16::BrightCyan    => (6, true),
            AnsiColor16::BrightWhite   => (7, true),
        }
    }

    fn foreground_code(self) -> u8 {
        let (offset, is_bright) = self.offset_and_is_bright();
        if is_bright { 90 + offset } else { 30 + offset }
    }

    fn background_code(self) -> u8 {
        let (offset, is_bright) = self.offset_and_is_bright();
        if is_bright { 100 + offset } else { 40 + offset }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SgrCode {
    Reset,
    Bold,
    Dim,
    Italic,
    Underline,
    Overline,
    Invert,
    Hidden,
    Strikethrough,
    /// Closes both [`SgrCode::Bold`] and [`SgrCode::Dim`].
    NormalIntensity,
    NotItalic,
    NotUnderline,
    NotOverline,
    NotInvert,
    NotHidden,
    NotStrikethrough,
    Foreground(AnsiColor16),
    ForegroundAnsi256(u8),
    ForegroundDefault,
    Background(AnsiColor16),
    BackgroundAnsi256(u8),
    BackgroundDefault,
}

impl Display for SgrCode {
    /// SGR: set graphics mode command.
    /// More info:
    /// - <https://notes.burke.libbey.me/ansi-escape-codes/>
    /// - <https://commons.wikimedia.org/wiki/File:Xterm_256color_chart.svg>
    #[rustfmt::skip]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            SgrCode::Reset                    => write!(f, "{CSI}0{SGR}"),
            SgrCode::Bold                     => write!(f, "{CSI}1{SGR}"),
            SgrCode::Dim                      => write!(f, "{CSI}2{SGR}"),
            SgrCode::Italic                   => write!(f, "{CSI}3{SGR}"),
            SgrCode::Underline                => write!(f, "{CSI}4{SGR}"),
            SgrCode::Invert                   => write!(f, "{CSI}7{SGR}"),
            SgrCode::Hidden                   => write!(f, "{CSI}8{SGR}"),
            SgrCode::Strikethrough            => write!(f, "{CSI}9{SGR}"),
            SgrCode::NormalIntensity          => write!(f, "{CSI}22{SGR}"),
            SgrCode::NotItalic                => write!(f, "{CSI}23{SGR}"),
            SgrCode::NotUnderline             => write!(f, "{CSI}24{SGR}"),
            SgrCode::NotInvert                => write!(f, "{CSI}27{SGR}"),
            SgrCode::NotHidden                => write!(f, "{CSI}28{SGR}"),
            SgrCode::NotStrikethrough         => write!(f, "{CSI}29{SGR}"),
            SgrCode::ForegroundDefault        => write!(f, "{CSI}39{SGR}"),
            SgrCode::BackgroundDefault        => write!(f, "{CSI}49{SGR}"),
            SgrCode::Overline                 => write!(f, "{CSI}53{SGR}"),
            SgrCode::NotOverline              => write!(f, "{CSI}55{SGR}"),
            SgrCode::Foreground(color)        => write!(f, "{CSI}{}{SGR}", color.foreground_code()),
            SgrCode::Background(color)        => write!(f, "{CSI}{}{SGR}", color.background_code()),
            SgrCode::ForegroundAnsi256(index) => write!(f, "{CSI}38;5;{index}{SGR}"),
            SgrCode::BackgroundAnsi256(index) => write!(f, "{CSI}48;5;{index}{SGR}"),
        }
    }
}
