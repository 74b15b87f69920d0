//! Splits question text into literal prose and embedded math.
//!
//! Block math is wrapped in `$$ … $$` and may span lines; inline math is
//! wrapped in single `$` and may not contain a newline or another `$`.
//! At each `$` the block form is tried first, then the inline form; a `$`
//! that opens neither stays literal. Math content is not validated here.

const BLOCK_DELIMITER: &str = "$$";
const INLINE_DELIMITER: &str = "$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Math { content: &'a str, display: bool },
}

/// One visual line of a literal segment, or the break between two of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Text(&'a str),
    LineBreak,
}

pub fn segment(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    // '$' is ASCII, so it never matches inside a multi-byte sequence and
    // every index where it is found is a char boundary.
    while pos < bytes.len() {
        if bytes[pos] != b'$' {
            pos += 1;
            continue;
        }

        let span = match_block(text, pos)
            .map(|(content, end)| (content, end, true))
            .or_else(|| match_inline(text, pos).map(|(content, end)| (content, end, false)));

        match span {
            Some((content, end, display)) => {
                if literal_start < pos {
                    segments.push(Segment::Literal(&text[literal_start..pos]));
                }
                segments.push(Segment::Math { content, display });
                pos = end;
                literal_start = end;
            }
            None => pos += 1,
        }
    }

    if literal_start < text.len() {
        segments.push(Segment::Literal(&text[literal_start..]));
    }

    segments
}

/// `$$` + at least one char (newlines allowed) + the nearest following `$$`.
fn match_block(text: &str, start: usize) -> Option<(&str, usize)> {
    if !text[start..].starts_with(BLOCK_DELIMITER) {
        return None;
    }
    let content_start = start + BLOCK_DELIMITER.len();
    let first = text[content_start..].chars().next()?;
    let search_from = content_start + first.len_utf8();
    let close = search_from + text[search_from..].find(BLOCK_DELIMITER)?;
    Some((&text[content_start..close], close + BLOCK_DELIMITER.len()))
}

/// `$` + one or more chars that are neither `$` nor a newline + `$`.
fn match_inline(text: &str, start: usize) -> Option<(&str, usize)> {
    let content_start = start + INLINE_DELIMITER.len();
    let rest = &text[content_start..];
    let stop = rest.find(['$', '\n'])?;
    if stop == 0 || !rest[stop..].starts_with(INLINE_DELIMITER) {
        return None;
    }
    Some((&rest[..stop], content_start + stop + INLINE_DELIMITER.len()))
}

/// Splits literal text at newlines, with a break between fragments and none
/// after the last one.
pub fn split_lines(literal: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    for (i, line) in literal.split('\n').enumerate() {
        if i > 0 {
            pieces.push(Piece::LineBreak);
        }
        pieces.push(Piece::Text(line));
    }
    pieces
}

/// Rebuilds the source text from segments, re-inserting delimiters.
pub fn reconstruct(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Math { content, display } => {
                let delimiter = if *display {
                    BLOCK_DELIMITER
                } else {
                    INLINE_DELIMITER
                };
                out.push_str(delimiter);
                out.push_str(content);
                out.push_str(delimiter);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_math_alone() {
        assert_eq!(
            segment("$$x^2$$"),
            vec![Segment::Math {
                content: "x^2",
                display: true
            }]
        );
    }

    #[test]
    fn test_inline_math_between_prose() {
        assert_eq!(
            segment("a $b$ c"),
            vec![
                Segment::Literal("a "),
                Segment::Math {
                    content: "b",
                    display: false
                },
                Segment::Literal(" c"),
            ]
        );
    }

    #[test]
    fn test_newline_splits_literal_into_fragments() {
        let segments = segment("line1\nline2");
        assert_eq!(segments, vec![Segment::Literal("line1\nline2")]);
        assert_eq!(
            split_lines("line1\nline2"),
            vec![Piece::Text("line1"), Piece::LineBreak, Piece::Text("line2")]
        );
    }

    #[test]
    fn test_no_break_after_last_fragment() {
        let pieces = split_lines("only");
        assert_eq!(pieces, vec![Piece::Text("only")]);
        let pieces = split_lines("a\n");
        assert_eq!(pieces.last(), Some(&Piece::Text("")));
    }

    #[test]
    fn test_block_preferred_over_inline() {
        let segments = segment("see $$a+b$$ now");
        assert_eq!(
            segments,
            vec![
                Segment::Literal("see "),
                Segment::Math {
                    content: "a+b",
                    display: true
                },
                Segment::Literal(" now"),
            ]
        );
    }

    #[test]
    fn test_block_math_spans_newlines() {
        let segments = segment("$$\\sum_i\nx_i$$");
        assert_eq!(
            segments,
            vec![Segment::Math {
                content: "\\sum_i\nx_i",
                display: true
            }]
        );
    }

    #[test]
    fn test_inline_math_cannot_cross_newline() {
        let segments = segment("$a\nb$");
        assert_eq!(segments, vec![Segment::Literal("$a\nb$")]);
    }

    #[test]
    fn test_unbalanced_dollar_stays_literal() {
        assert_eq!(segment("costs $5"), vec![Segment::Literal("costs $5")]);
        assert_eq!(segment("$$"), vec![Segment::Literal("$$")]);
        assert_eq!(segment("$$$$"), vec![Segment::Literal("$$$$")]);
    }

    #[test]
    fn test_unclosed_block_falls_back_to_inline() {
        assert_eq!(
            segment("$$x$"),
            vec![
                Segment::Literal("$"),
                Segment::Math {
                    content: "x",
                    display: false
                },
            ]
        );
    }

    #[test]
    fn test_adjacent_inline_and_block() {
        assert_eq!(
            segment("$a$$$b$$"),
            vec![
                Segment::Math {
                    content: "a",
                    display: false
                },
                Segment::Math {
                    content: "b",
                    display: true
                },
            ]
        );
    }

    #[test]
    fn test_malformed_math_content_is_still_delimited() {
        let segments = segment("bad $\\frac{1}{$ ok");
        assert_eq!(
            segments[1],
            Segment::Math {
                content: "\\frac{1}{",
                display: false
            }
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_round_trip_reconstructs_input() {
        let inputs = [
            "",
            "plain",
            "a $b$ c",
            "$$x^2$$",
            "costs $5 and $10",
            "$$\nmulti\nline\n$$ then $y$",
            "π ≈ $3.14$ · ünïcödé $$∑$$",
            "$$x$",
            "$$$$$",
            "line1\nline2\n",
            "$a\nb$",
        ];
        for input in inputs {
            assert_eq!(reconstruct(&segment(input)), input, "input: {:?}", input);
        }
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let text = "Let $x$ be $$x^2 + 1$$\nand more";
        assert_eq!(segment(text), segment(text));
    }
}
