// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The closed vocabulary of span identifiers, and the tables that map each one to its
//! open / close escape strings.
//!
//! Span names arrive as arbitrary strings on the wire. They are validated once, by
//! [`lookup_span()`], against the closed [`SpanId`] enum. An unknown name is rejected
//! with [`EffectError::UnknownSpan`] instead of falling through to some unintended
//! value. After that point a [`StyleTable`] lookup is total.

use std::{fmt::Debug, str::FromStr};

use strum_macros::{Display, EnumIter, EnumString};

use crate::{AnsiColor16, EffectError, EffectResult, InlineString, SgrCode};

/// Span names follow the `ansi-styles` vocabulary (camelCase), plus `orange`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum SpanId {
    // Modifiers.
    Reset,
    Bold,
    Dim,
    Italic,
    Underline,
    Overline,
    Inverse,
    Hidden,
    Strikethrough,

    // Foreground colors.
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    #[strum(to_string = "blackBright", serialize = "gray", serialize = "grey")]
    BlackBright,
    RedBright,
    GreenBright,
    YellowBright,
    BlueBright,
    MagentaBright,
    CyanBright,
    WhiteBright,
    Orange,

    // Background colors.
    BgBlack,
    BgRed,
    BgGreen,
    BgYellow,
    BgBlue,
    BgMagenta,
    BgCyan,
    BgWhite,
    #[strum(to_string = "bgBlackBright", serialize = "bgGray", serialize = "bgGrey")]
    BgBlackBright,
    BgRedBright,
    BgGreenBright,
    BgYellowBright,
    BgBlueBright,
    BgMagentaBright,
    BgCyanBright,
    BgWhiteBright,
}

/// Validate a span name from the wire.
///
/// # Errors
///
/// Returns [`EffectError::UnknownSpan`] if `name` is not part of the [`SpanId`]
/// vocabulary.
pub fn lookup_span(name: &str) -> EffectResult<SpanId> {
    SpanId::from_str(name).map_err(|_| EffectError::UnknownSpan { name: name.into() })
}

/// The pair of escape strings for one span.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SpanEscapes {
    pub open: InlineString,
    pub close: InlineString,
}

/// Maps a span to the escape strings that turn it on and off. Read only.
pub trait StyleTable: Debug + Send + Sync {
    fn lookup(&self, span: SpanId) -> SpanEscapes;
}

/// The default table, emits SGR escape sequences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnsiStyleTable;

impl AnsiStyleTable {
    /// The `(open, close)` codes for a span.
    #[rustfmt::skip]
    pub fn sgr_codes(span: SpanId) -> (SgrCode, SgrCode) {
        use AnsiColor16 as C;
        use SgrCode::{Background as Bg, BackgroundDefault as BgOff,
                      Foreground as Fg, ForegroundDefault as FgOff};

        match span {
            SpanId::Reset           => (SgrCode::Reset, SgrCode::Reset),
            SpanId::Bold            => (SgrCode::Bold, SgrCode::NormalIntensity),
            SpanId::Dim             => (SgrCode::Dim, SgrCode::NormalIntensity),
            SpanId::Italic          => (SgrCode::Italic, SgrCode::NotItalic),
            SpanId::Underline       => (SgrCode::Underline, SgrCode::NotUnderline),
            SpanId::Overline        => (SgrCode::Overline, SgrCode::NotOverline),
            SpanId::Inverse         => (SgrCode::Invert, SgrCode::NotInvert),
            SpanId::Hidden          => (SgrCode::Hidden, SgrCode::NotHidden),
            SpanId::Strikethrough   => (SgrCode::Strikethrough, SgrCode::NotStrikethrough),

            SpanId::Black           => (Fg(C::Black), FgOff),
            SpanId::Red             => (Fg(C::Red), FgOff),
            SpanId::Green           => (Fg(C::Green), FgOff),
            SpanId::Yellow          => (Fg(C::Yellow), FgOff),
            SpanId::Blue            => (Fg(C::Blue), FgOff),
            SpanId::Magenta         => (Fg(C::Magenta), FgOff),
            SpanId::Cyan            => (Fg(C::Cyan), FgOff),
            SpanId::White           => (Fg(C::White), FgOff),
            SpanId::BlackBright     => (Fg(C::BrightBlack), FgOff),
            SpanId::RedBright       => (Fg(C::BrightRed), FgOff),
            SpanId::GreenBright     => (Fg(C::BrightGreen), FgOff),
            SpanId::YellowBright    => (Fg(C::BrightYellow), FgOff),
            SpanId::BlueBright      => (Fg(C::BrightBlue), FgOff),
            SpanId::MagentaBright   => (Fg(C::BrightMagenta), FgOff),
            SpanId::CyanBright      => (Fg(C::BrightCyan), FgOff),
            SpanId::WhiteBright     => (Fg(C::BrightWhite), FgOff),
            SpanId::Orange          => (SgrCode::ForegroundAnsi256(208), FgOff),

            SpanId::BgBlack         => (Bg(C::Black), BgOff),
            SpanId::BgRed           => (Bg(C::Red), BgOff),
            SpanId::BgGreen         => (Bg(C::Green), BgOff),
            SpanId::BgYellow        => (Bg(C::Yellow), BgOff),
            SpanId::BgBlue          => (Bg(C::Blue), BgOff),
            SpanId::BgMagenta       => (Bg(C::Magenta), BgOff),
            SpanId::BgCyan          => (Bg(C::Cyan), BgOff),
            SpanId::BgWhite         => (Bg(C::White), BgOff),
            SpanId::BgBlackBright   => (Bg(C::BrightBlack), BgOff),
            SpanId::BgRedBright     => (Bg(C::BrightRed), BgOff),
            SpanId::BgGreenBright   => (Bg(C::BrightGreen), BgOff),
            SpanId::BgYellowBright  => (Bg(C::BrightYellow), BgOff),
            SpanId::BgBlueBright    => (Bg(C::BrightBlue), BgOff),
            SpanId::BgMagentaBright => (Bg(C::BrightMagenta), BgOff),
            SpanId::BgCyanBright    => (Bg(C::BrightCyan), BgOff),
            SpanId::BgWhiteBright   => (Bg(C::BrightWhite), BgOff),
        }
    }
}

impl StyleTable for AnsiStyleTable {
    fn lookup(&self, span: SpanId) -> SpanEscapes {
        let (open, close) = Self::sgr_codes(span);
        SpanEscapes {
            open: open.to_string().into(),
            close: close.to_string().into(),
        }
    }
}

/// Every span maps to empty strings. Used when output should carry no color at all (eg:
/// when piping to a file). Push / pop discipline is still enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoColorStyleTable;

impl StyleTable for NoColorStyleTable {
    fn lookup(&self, _span: SpanId) -> SpanEscapes { SpanEscapes::default() }
}
