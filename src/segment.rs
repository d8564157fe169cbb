//! Splits an AI reply into interleaved prose and fenced code segments.

/// One piece of the reply, in original document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Prose between or around code fences, trimmed.
    Text { content: String },
    /// The body of a triple-backtick fence, trimmed, with its language tag.
    Code { language: String, content: String },
}

/// Language tag used when a fence carries none.
const UNLABELED: &str = "txt";

fn is_tag_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'-'
}

/// Scan `reply` for fenced code blocks and return the ordered segment list.
///
/// An opening fence is three backticks, an optional tag of word characters
/// and hyphens, then a newline; the body runs to the nearest later triple
/// backtick. An opening fence with no closer is left as ordinary text.
pub fn extract(reply: &str) -> Vec<Segment> {
    let bytes = reply.as_bytes();
    let mut segments = Vec::new();
    // End of the last complete fence; everything before it is already emitted.
    let mut emitted = 0;
    let mut pos = 0;

    while let Some(off) = reply[pos..].find("```") {
        let open = pos + off;

        let tag_start = open + 3;
        let mut tag_end = tag_start;
        while tag_end < bytes.len() && is_tag_char(bytes[tag_end]) {
            tag_end += 1;
        }

        // A fence needs a newline right after the tag. Advance a single
        // character on failure so a longer backtick run can still open a
        // fence one position later.
        if tag_end >= bytes.len() || bytes[tag_end] != b'\n' {
            pos = open + 1;
            continue;
        }

        let body_start = tag_end + 1;
        let Some(close_off) = reply[body_start..].find("```") else {
            // Unterminated fence: no match here, and no closer exists for
            // anything later either.
            break;
        };
        let close = body_start + close_off;

        let gap = reply[emitted..open].trim();
        if !gap.is_empty() {
            segments.push(Segment::Text {
                content: gap.to_string(),
            });
        }

        let tag = &reply[tag_start..tag_end];
        segments.push(Segment::Code {
            language: if tag.is_empty() {
                UNLABELED.to_string()
            } else {
                tag.to_string()
            },
            content: reply[body_start..close].trim().to_string(),
        });

        emitted = close + 3;
        pos = emitted;
    }

    let tail = reply[emitted..].trim();
    if !tail.is_empty() {
        segments.push(Segment::Text {
            content: tail.to_string(),
        });
    }

    segments
}
