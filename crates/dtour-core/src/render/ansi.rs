//! ANSI SGR escapes to inline-styled spans

use std::iter::Peekable;
use std::str::Chars;

use super::escape_html;

const ESC: char = '\u{1b}';
const BEL: char = '\u{7}';

const BASIC: [&str; 8] = [
    "#000000", "#aa0000", "#00aa00", "#aa5500", "#0000aa", "#aa00aa", "#00aaaa", "#aaaaaa",
];
const BRIGHT: [&str; 8] = [
    "#555555", "#ff5555", "#55ff55", "#ffff55", "#5555ff", "#ff55ff", "#55ffff", "#ffffff",
];
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Style {
    fg: Option<String>,
    bg: Option<String>,
    bold: bool,
    italic: bool,
    underline: bool,
}

impl Style {
    fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    fn css(&self) -> String {
        let mut rules = Vec::new();
        if let Some(fg) = &self.fg {
            rules.push(format!("color:{}", fg));
        }
        if let Some(bg) = &self.bg {
            rules.push(format!("background-color:{}", bg));
        }
        if self.bold {
            rules.push("font-weight:bold".to_string());
        }
        if self.italic {
            rules.push("font-style:italic".to_string());
        }
        if self.underline {
            rules.push("text-decoration:underline".to_string());
        }
        rules.join(";")
    }

    fn apply(&mut self, params: &[u32]) {
        if params.is_empty() {
            *self = Self::default();
            return;
        }
        let mut i = 0;
        while i < params.len() {
            match params[i] {
                0 => *self = Self::default(),
                1 => self.bold = true,
                3 => self.italic = true,
                4 => self.underline = true,
                22 => self.bold = false,
                23 => self.italic = false,
                24 => self.underline = false,
                code @ 30..=37 => self.fg = Some(BASIC[(code - 30) as usize].to_string()),
                code @ 90..=97 => self.fg = Some(BRIGHT[(code - 90) as usize].to_string()),
                code @ 40..=47 => self.bg = Some(BASIC[(code - 40) as usize].to_string()),
                code @ 100..=107 => self.bg = Some(BRIGHT[(code - 100) as usize].to_string()),
                39 => self.fg = None,
                49 => self.bg = None,
                code @ (38 | 48) => {
                    let (color, consumed) = extended_color(&params[i + 1..]);
                    if code == 38 {
                        self.fg = color;
                    } else {
                        self.bg = color;
                    }
                    i += consumed;
                }
                _ => {}
            }
            i += 1;
        }
    }
}

/// Parse `5;n` or `2;r;g;b`; returns the color and how many params it used
fn extended_color(rest: &[u32]) -> (Option<String>, usize) {
    match rest {
        [5, n, ..] => (Some(palette_256(*n)), 2),
        [2, r, g, b, ..] => (
            Some(format!("#{:02x}{:02x}{:02x}", (*r).min(255), (*g).min(255), (*b).min(255))),
            4,
        ),
        _ => (None, rest.len()),
    }
}

fn palette_256(n: u32) -> String {
    match n {
        0..=7 => BASIC[n as usize].to_string(),
        8..=15 => BRIGHT[(n - 8) as usize].to_string(),
        16..=231 => {
            let idx = n - 16;
            let r = CUBE_LEVELS[(idx / 36) as usize];
            let g = CUBE_LEVELS[((idx / 6) % 6) as usize];
            let b = CUBE_LEVELS[(idx % 6) as usize];
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        }
        _ => {
            let level = 8 + 10 * (n.min(255) - 232);
            format!("#{:02x}{:02x}{:02x}", level, level, level)
        }
    }
}

/// Convert text with ANSI escapes to escaped markup with styled spans
///
/// Only SGR sequences change the output; other control sequences are dropped.
pub fn ansi_to_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut style = Style::default();
    let mut span_open = false;
    let mut text = String::new();
    let mut chars = input.chars().peekable();

    let flush = |text: &mut String, out: &mut String| {
        if !text.is_empty() {
            out.push_str(&escape_html(text));
            text.clear();
        }
    };

    while let Some(c) = chars.next() {
        if c != ESC {
            text.push(c);
            continue;
        }
        match chars.peek() {
            Some('[') => {
                chars.next();
                let (params, final_byte) = read_csi(&mut chars);
                if final_byte == Some('m') {
                    let mut next = style.clone();
                    next.apply(&params);
                    if next != style {
                        flush(&mut text, &mut out);
                        if span_open {
                            out.push_str("</span>");
                            span_open = false;
                        }
                        if !next.is_plain() {
                            out.push_str(&format!("<span style=\"{}\">", next.css()));
                            span_open = true;
                        }
                        style = next;
                    }
                }
            }
            Some(']') => {
                chars.next();
                skip_osc(&mut chars);
            }
            _ => {}
        }
    }

    flush(&mut text, &mut out);
    if span_open {
        out.push_str("</span>");
    }
    out
}

/// Read CSI parameters up to and including the final byte
fn read_csi(chars: &mut Peekable<Chars<'_>>) -> (Vec<u32>, Option<char>) {
    let mut raw = String::new();
    for c in chars.by_ref() {
        if ('\u{40}'..='\u{7e}').contains(&c) {
            let params = raw
                .split(';')
                .map(|p| p.parse::<u32>().unwrap_or(0))
                .collect::<Vec<_>>();
            let params = if raw.is_empty() { Vec::new() } else { params };
            return (params, Some(c));
        }
        raw.push(c);
    }
    (Vec::new(), None)
}

/// Skip an operating system command terminated by BEL or `ESC \`
fn skip_osc(chars: &mut Peekable<Chars<'_>>) {
    while let Some(c) = chars.next() {
        if c == BEL {
            return;
        }
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}
