use crate::font::{FontMetrics, SpanFont};
use crate::geometry::{Position, Space};
use crate::layout::{Alignment, LayoutContext};
use crate::page::{PageTracker, EPSILON};
use crate::{LayoutError, LayoutWarning, Pt};

/// One line of laid out text
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    /// Top-left corner of the line box
    pub position: Position,
    /// Start of the baseline, which is where PDF text operators position text
    pub coords: (Pt, Pt),
    pub width: Pt,
    /// Extra spacing added to every space character of a justified line
    pub word_spacing: Pt,
}

/// How a flow of text ended
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Fits,
    /// The page ran out; `offset` is the byte offset into the text of the first line that
    /// did not fit
    Overflow { offset: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub lines: Vec<SpanLayout>,
    /// Distance from the start position down to the bottom of the last line
    pub height: Pt,
    pub outcome: FlowOutcome,
}

/// Expands tabs and normalizes line endings, which every other offset into text assumes
/// has happened
pub fn normalize_text(text: &str, tab_size: usize) -> String {
    text.replace('\t', &" ".repeat(tab_size))
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// What to flow and where
pub(crate) struct FlowRequest<'t> {
    pub text: &'t str,
    pub font: SpanFont,
    /// Top-left of the first line
    pub start: Position,
    /// Horizontal limits every line stays within
    pub bounds: Space,
    pub alignment: Alignment,
    /// Place the first line even if it does not fit vertically
    pub force: bool,
}

/// Flows text line by line down the page starting at `request.start`, wrapping around
/// anything already placed. Each line is filled greedily across the free intervals at
/// its height, breaking after whitespace where possible. Words are only broken
/// mid-word when nothing at all has been placed on a line, so long tokens cannot stall
/// the flow.
///
/// Nothing is recorded on `page` except warnings; the caller adds the footprint of what
/// it keeps.
pub(crate) fn flow_text(
    ctx: &LayoutContext,
    page: &mut PageTracker,
    request: FlowRequest,
) -> Result<Flow, LayoutError> {
    let FlowRequest {
        text,
        font,
        start,
        bounds,
        alignment,
        force,
    } = request;
    let chars: Vec<char> = text.chars().collect();
    let line_height = ctx.metrics.line_height(&font)?;
    let ascent = ctx.metrics.ascent(&font)?;

    let mut lines: Vec<SpanLayout> = Vec::new();
    let mut y = start.y;
    let mut ci = 0usize;
    let mut first = true;

    while ci < chars.len() {
        let forced = force && lines.is_empty();
        if y - line_height < page.content_box.y1 - EPSILON {
            if !forced {
                return Ok(Flow {
                    lines,
                    height: start.y - y,
                    outcome: FlowOutcome::Overflow {
                        offset: byte_offset(&chars, ci),
                    },
                });
            }
            page.warn(LayoutWarning::LineForced {
                height: line_height,
            });
        }

        let min_x = if first { start.x } else { bounds.start };
        let mut spaces: Vec<Space> = page
            .open_spaces_on(Position::new(min_x, y), first, Pt::ZERO, line_height)
            .into_iter()
            .filter_map(|s| clip(s, bounds, min_x))
            .collect();
        if spaces.is_empty() && forced {
            spaces.push(Space::at_height(min_x, bounds.end.max(min_x), y));
        }

        let mut placed_on_line = false;
        for (si, space) in spaces.iter().enumerate() {
            if ci >= chars.len() || chars[ci] == '\n' {
                break;
            }
            let char_break = si + 1 == spaces.len() && !placed_on_line;
            let end = fit(ctx.metrics, &font, &chars, ci, space.width(), char_break)?;
            if end == ci {
                continue;
            }

            let segment: String = chars[ci..end].iter().collect();
            let segment = segment.trim_end();
            let mut next = end;
            while next < chars.len() && chars[next].is_whitespace() && chars[next] != '\n' {
                next += 1;
            }
            ci = next;
            placed_on_line = true;
            if segment.is_empty() {
                continue;
            }

            let width = ctx.metrics.width_of(segment, &font)?;
            let last_line = next >= chars.len() || chars[next] == '\n';
            let (x, word_spacing) = align_line(alignment, space, width, segment, last_line);
            lines.push(SpanLayout {
                text: segment.to_string(),
                font,
                position: Position::new(x, y),
                coords: (x, y - ascent),
                width,
                word_spacing,
            });
        }

        if ci < chars.len() && chars[ci] == '\n' {
            ci += 1;
        }
        y -= line_height;
        first = false;
    }

    Ok(Flow {
        lines,
        height: start.y - y,
        outcome: FlowOutcome::Fits,
    })
}

/// Wraps text into lines no wider than `width`, for content boxed in by something
/// other than the page (table cells)
pub(crate) fn wrap_lines(
    metrics: &dyn FontMetrics,
    font: &SpanFont,
    text: &str,
    width: Pt,
) -> Result<Vec<String>, LayoutError> {
    let chars: Vec<char> = text.chars().collect();
    let mut lines = Vec::new();
    let mut ci = 0usize;
    while ci < chars.len() {
        let end = fit(metrics, font, &chars, ci, width, true)?;
        let line: String = chars[ci..end].iter().collect();
        lines.push(line.trim_end().to_string());
        ci = end;
        while ci < chars.len() && chars[ci].is_whitespace() && chars[ci] != '\n' {
            ci += 1;
        }
        if ci < chars.len() && chars[ci] == '\n' {
            ci += 1;
        }
    }
    Ok(lines)
}

/// Finds where the line starting at `from` has to end to fit in `max_width`, preferring to
/// break just after whitespace. Whitespace itself may hang past the edge. Returns `from`
/// when nothing fits, unless `char_break` allows cutting mid-word, in which case at
/// least one character is always taken.
fn fit(
    metrics: &dyn FontMetrics,
    font: &SpanFont,
    chars: &[char],
    from: usize,
    max_width: Pt,
    char_break: bool,
) -> Result<usize, LayoutError> {
    let mut width = Pt::ZERO;
    let mut last_break: Option<usize> = None;
    let mut buf = [0u8; 4];
    let mut ci = from;
    while ci < chars.len() {
        let ch = chars[ci];
        if ch == '\n' {
            break;
        }
        let advance = metrics.width_of(ch.encode_utf8(&mut buf), font)?;
        if width + advance > max_width + EPSILON && !ch.is_whitespace() {
            return Ok(match last_break {
                Some(at) => at,
                None if char_break => ci.max(from + 1),
                None => from,
            });
        }
        width += advance;
        if ch.is_whitespace() {
            last_break = Some(ci + 1);
        }
        ci += 1;
    }
    Ok(ci)
}

fn clip(space: Space, bounds: Space, min_x: Pt) -> Option<Space> {
    let start = space.start.max(bounds.start).max(min_x);
    let end = space.end.min(bounds.end);
    (end - start > EPSILON).then(|| Space {
        start,
        end,
        valid_at_height: space.valid_at_height,
    })
}

fn align_line(
    alignment: Alignment,
    space: &Space,
    width: Pt,
    text: &str,
    last_line: bool,
) -> (Pt, Pt) {
    let slack = (space.width() - width).max(Pt::ZERO);
    match alignment {
        Alignment::Left => (space.start, Pt::ZERO),
        Alignment::Right => (space.start + slack, Pt::ZERO),
        Alignment::Centered => (space.start + slack / 2.0, Pt::ZERO),
        Alignment::Justified => {
            let gaps = text.matches(' ').count();
            if last_line || gaps == 0 {
                (space.start, Pt::ZERO)
            } else {
                (space.start, slack / gaps as f32)
            }
        }
    }
}

fn byte_offset(chars: &[char], ci: usize) -> usize {
    chars[..ci].iter().map(|c| c.len_utf8()).sum()
}
