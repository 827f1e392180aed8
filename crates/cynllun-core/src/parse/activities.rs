//! Splits free-form generated activity text into display cards.
//!
//! A block begins at any line carrying a recognizable marker: a numbered
//! prefix (`1.` / `1)`), a heading (one to three `#`), or a bold prefix
//! (`**1...` or a whole-line `**...**`). The marker line becomes the card
//! title; the following lines become the body. Text before the first
//! marker is discarded. Input with no markers yields no cards, which
//! callers treat as the signal to fall back to verbatim display.

/// One parsed activity card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub title: String,
    pub body: Vec<String>,
}

/// Parse generated text into activity cards. Never fails; an empty result
/// means the text had no recognizable structure.
pub fn parse_activities(text: &str) -> Vec<ActivityCard> {
    let mut cards = Vec::new();
    let mut current: Option<ActivityCard> = None;

    for line in text.lines() {
        if is_marker(line) {
            flush(&mut cards, current.take());
            current = Some(ActivityCard {
                title: clean_title(line),
                body: Vec::new(),
            });
        } else if let Some(card) = current.as_mut() {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                card.body.push(normalize_body_line(trimmed));
            }
        }
    }
    flush(&mut cards, current.take());
    cards
}

/// Titles shorter than this many characters are treated as noise and the
/// whole block is discarded.
const MIN_TITLE_LEN: usize = 3;

fn flush(cards: &mut Vec<ActivityCard>, card: Option<ActivityCard>) {
    if let Some(card) = card {
        if card.title.chars().count() >= MIN_TITLE_LEN {
            cards.push(card);
        }
    }
}

fn is_marker(line: &str) -> bool {
    numbered_marker(line) || heading_marker(line) || bold_marker(line)
}

/// `1. ` or `1) ` -- one or more digits, dot or parenthesis, whitespace.
fn numbered_marker(line: &str) -> bool {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return false;
    }
    let rest = &line[digits..];
    let mut chars = rest.chars();
    matches!(chars.next(), Some('.') | Some(')')) && chars.next().is_some_and(char::is_whitespace)
}

/// One to three `#` followed by whitespace.
fn heading_marker(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=3).contains(&hashes)
        && line[hashes..].chars().next().is_some_and(char::is_whitespace)
}

/// `**1...` (bold-numbered) or a whole-line `**...**` (bold-only).
fn bold_marker(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("**") else {
        return false;
    };
    if rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return true;
    }
    rest.strip_suffix("**")
        .is_some_and(|inner| !inner.is_empty() && !inner.contains('*'))
}

/// Strip leading digits, punctuation, heading and bold markers from a
/// marker line to recover the title.
fn clean_title(line: &str) -> String {
    let stripped = line.trim_start_matches(|c: char| {
        c.is_ascii_digit() || c == '.' || c == ')' || c == '#' || c == '*' || c.is_whitespace()
    });
    stripped.replace("**", "").trim().to_string()
}

/// Normalize one body line: a leading `**Label**:` becomes a `Label:`
/// prefix, leading bullet markers are stripped.
fn normalize_body_line(line: &str) -> String {
    let line = match bold_label(line) {
        Some((label, rest)) => format!("{label}:{rest}"),
        None => line.to_string(),
    };
    let line = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('•'))
        .map(str::trim_start)
        .unwrap_or(&line);
    line.to_string()
}

/// Split a leading `**Label**` (optionally followed by `:`) from a line.
fn bold_label(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("**")?;
    let end = rest.find("**")?;
    let label = &rest[..end];
    if label.is_empty() || label.contains('*') {
        return None;
    }
    let tail = &rest[end + 2..];
    Some((label, tail.strip_prefix(':').unwrap_or(tail)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbered_and_bold_blocks() {
        let text = "1. Pond Dipping Detectives\nExplore the local stream.\n\n2. **Storytelling Circle**\n- Use bilingual vocabulary";
        let cards = parse_activities(text);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Pond Dipping Detectives");
        assert_eq!(cards[0].body, ["Explore the local stream."]);
        assert_eq!(cards[1].title, "Storytelling Circle");
        assert_eq!(cards[1].body, ["Use bilingual vocabulary"]);
    }

    #[test]
    fn unstructured_text_yields_no_cards() {
        let text = "Here are some thoughts about your lesson plan, written as one\nplain paragraph without any numbering or headings at all.";
        assert!(parse_activities(text).is_empty());
    }

    #[test]
    fn empty_input_yields_no_cards() {
        assert!(parse_activities("").is_empty());
    }

    #[test]
    fn heading_markers_start_blocks() {
        let text = "## Rhyme Time 🎵\nSing together.\n### Cynefin Walk\nExplore the local area.";
        let cards = parse_activities(text);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Rhyme Time 🎵");
        assert_eq!(cards[1].title, "Cynefin Walk");
    }

    #[test]
    fn four_hashes_is_not_a_heading_marker() {
        assert!(parse_activities("#### deep heading\nbody").is_empty());
    }

    #[test]
    fn numbered_marker_requires_trailing_whitespace() {
        // "3.14159" must not start a block.
        assert!(parse_activities("3.14159 is pi\nmore text").is_empty());
    }

    #[test]
    fn bold_numbered_marker_starts_block() {
        let cards = parse_activities("**1. Castle Builders**\nBuild a motte and bailey.");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Castle Builders");
    }

    #[test]
    fn preamble_before_first_marker_is_discarded() {
        let text = "Here are six ideas for you:\n\n1. Seaside Survey\nCount the shells.";
        let cards = parse_activities(text);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Seaside Survey");
    }

    #[test]
    fn short_titles_are_noise_filtered() {
        let cards = parse_activities("1. ab\nbody line\n\n2. Real Activity\ncontent");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Real Activity");
    }

    #[test]
    fn bold_labels_become_colon_prefixes() {
        let cards = parse_activities("1. Woodland Art\n**Differentiation**: offer templates\n**Welsh link** use local place names");
        assert_eq!(
            cards[0].body,
            ["Differentiation: offer templates", "Welsh link: use local place names"]
        );
    }

    #[test]
    fn blank_body_lines_are_dropped() {
        let cards = parse_activities("1. Walking Tour\n\n\nVisit the chapel.\n   \nDraw the bridge.");
        assert_eq!(cards[0].body, ["Visit the chapel.", "Draw the bridge."]);
    }

    #[test]
    fn bullet_markers_are_stripped() {
        let cards = parse_activities("1. Market Day\n- plan a stall\n• count takings\n-no space bullet");
        assert_eq!(
            cards[0].body,
            ["plan a stall", "count takings", "no space bullet"]
        );
    }
}
