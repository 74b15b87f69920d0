//! Terminal rendering of text with embedded math.
//!
//! Segmentation comes from [`crate::math`]; this module is the typesetter.
//! It maps a small subset of TeX to Unicode and leaves anything it does not
//! understand in its source form, so malformed math never breaks a line.

use crate::math::{segment, split_lines, Piece, Segment};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const DISPLAY_INDENT: &str = "    ";

const SYMBOLS: &[(&str, &str)] = &[
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("theta", "θ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("pi", "π"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("phi", "φ"),
    ("omega", "ω"),
    ("Delta", "Δ"),
    ("Sigma", "Σ"),
    ("Omega", "Ω"),
    ("sum", "∑"),
    ("prod", "∏"),
    ("int", "∫"),
    ("infty", "∞"),
    ("partial", "∂"),
    ("nabla", "∇"),
    ("sqrt", "√"),
    ("cdot", "·"),
    ("times", "×"),
    ("div", "÷"),
    ("pm", "±"),
    ("leq", "≤"),
    ("le", "≤"),
    ("geq", "≥"),
    ("ge", "≥"),
    ("neq", "≠"),
    ("ne", "≠"),
    ("approx", "≈"),
    ("equiv", "≡"),
    ("to", "→"),
    ("rightarrow", "→"),
    ("leftarrow", "←"),
    ("Rightarrow", "⇒"),
    ("in", "∈"),
    ("subset", "⊂"),
    ("cup", "∪"),
    ("cap", "∩"),
    ("forall", "∀"),
    ("exists", "∃"),
    ("circ", "∘"),
    ("ldots", "…"),
    ("cdots", "⋯"),
];

/// Groups nested deeper than this are shown as source text.
const MAX_GROUP_DEPTH: usize = 16;

/// Commands whose single argument is shown as plain text.
const TEXT_COMMANDS: &[&str] = &["text", "mathrm", "mathbf", "mathit", "operatorname"];

fn math_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::ITALIC)
}

/// Renders `text` into lines, typesetting inline and display math.
pub fn render_math_text(text: &str, base: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for seg in segment(text) {
        match seg {
            Segment::Literal(literal) => {
                for piece in split_lines(literal) {
                    match piece {
                        Piece::Text(fragment) => {
                            let fragment = fragment.trim_end_matches('\r');
                            if !fragment.is_empty() {
                                current.push(Span::styled(fragment.to_string(), base));
                            }
                        }
                        Piece::LineBreak => lines.push(Line::from(std::mem::take(&mut current))),
                    }
                }
            }
            Segment::Math {
                content,
                display: false,
            } => current.push(Span::styled(typeset(content), math_style())),
            Segment::Math {
                content,
                display: true,
            } => {
                if !current.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current)));
                }
                for row in typeset(content).lines() {
                    lines.push(Line::from(vec![
                        Span::raw(DISPLAY_INDENT),
                        Span::styled(row.trim().to_string(), math_style()),
                    ]));
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

/// Collapses `text` onto one plain line with its math typeset, for labels.
pub fn math_text_line(text: &str) -> String {
    render_math_text(text, Style::default())
        .iter()
        .map(|line| line.to_string().trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Best-effort TeX to Unicode conversion.
pub fn typeset(source: &str) -> String {
    typeset_at(source, 0)
}

fn typeset_at(source: &str, depth: usize) -> String {
    let chars: Vec<char> = source.trim().chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => i = typeset_command(&chars, i, depth, &mut out),
            marker @ ('^' | '_') => {
                let map = if marker == '^' { superscript } else { subscript };
                let (group, after) = match read_group(&chars, i + 1) {
                    Some(group) => group,
                    None => match chars.get(i + 1) {
                        Some(&c) if c != '\\' && c != '{' => (c.to_string(), i + 2),
                        _ => {
                            out.push(marker);
                            i += 1;
                            continue;
                        }
                    },
                };
                match group.chars().map(map).collect::<Option<String>>() {
                    Some(converted) if !converted.is_empty() => out.push_str(&converted),
                    _ => {
                        out.push(marker);
                        out.push_str(&parenthesize(typeset_group(&group, depth)));
                    }
                }
                i = after;
            }
            '{' | '}' => i += 1,
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Handles the command starting at `chars[start] == '\\'`; returns the next index.
fn typeset_command(chars: &[char], start: usize, depth: usize, out: &mut String) -> usize {
    let name_start = start + 1;
    let mut name_end = name_start;
    while name_end < chars.len() && chars[name_end].is_ascii_alphabetic() {
        name_end += 1;
    }

    if name_end == name_start {
        return match chars.get(name_start) {
            Some(',' | ';' | ' ' | ':') => {
                out.push(' ');
                name_start + 1
            }
            Some('!') => name_start + 1,
            Some(&c) => {
                out.push(c);
                name_start + 1
            }
            None => {
                out.push('\\');
                name_start
            }
        };
    }

    let name: String = chars[name_start..name_end].iter().collect();
    let mut next = name_end;

    if name == "frac"
        && let Some((numerator, after_num)) = read_group(chars, next)
        && let Some((denominator, after_den)) = read_group(chars, after_num)
    {
        out.push_str(&parenthesize(typeset_group(&numerator, depth)));
        out.push('/');
        out.push_str(&parenthesize(typeset_group(&denominator, depth)));
        return after_den;
    }

    if TEXT_COMMANDS.contains(&name.as_str())
        && let Some((inner, after)) = read_group(chars, next)
    {
        out.push_str(&inner);
        return after;
    }

    match SYMBOLS.iter().find(|(command, _)| *command == name) {
        Some((_, symbol)) => {
            out.push_str(symbol);
            // "\pi r" keeps its space, "\pi{}" swallows the empty group.
            if chars.get(next) == Some(&'{') && chars.get(next + 1) == Some(&'}') {
                next += 2;
            }
        }
        None => {
            out.push('\\');
            out.push_str(&name);
        }
    }
    next
}

/// Typesets the inside of a group found at `depth`, or returns it untouched
/// once the nesting limit is reached.
fn typeset_group(group: &str, depth: usize) -> String {
    if depth >= MAX_GROUP_DEPTH {
        group.to_string()
    } else {
        typeset_at(group, depth + 1)
    }
}

/// Reads a balanced `{…}` group at `start`, returning its inner text and the
/// index after the closing brace.
fn read_group(chars: &[char], start: usize) -> Option<(String, usize)> {
    if chars.get(start) != Some(&'{') {
        return None;
    }
    let mut depth = 0usize;
    for (offset, &c) in chars[start..].iter().enumerate() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let inner = chars[start + 1..start + offset].iter().collect();
                    return Some((inner, start + offset + 1));
                }
            }
            _ => {}
        }
    }
    None
}

fn parenthesize(s: String) -> String {
    if s.chars().count() > 1 {
        format!("({})", s)
    } else {
        s
    }
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'o' => 'ₒ',
        'x' => 'ₓ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        't' => 'ₜ',
        _ => return None,
    })
}
