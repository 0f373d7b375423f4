//! Trace block parsing.
//!
//! After the header, the dump is a sequence of blocks separated by
//! `-----------+------------` lines. A block lists one sampled stack:
//!
//! ```text
//!       bytes:  100MB                 <- heap views only
//!     100MB   bytes.growSlice         <- magnitude [percent] endpoint
//!             bytes.(*Buffer).grow    <- direct caller of the endpoint
//!             ...
//!             net/http.(*conn).serve  <- outermost frame
//! ```
//!
//! Frames are kept in the order printed, innermost first.

use log::debug;

use hotpath_common::Unit;

use crate::domain::ParseError;

/// One sampled call path.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// Function the sample was taken in.
    pub endpoint: String,
    /// Native value in the dump's unit (ns, bytes or count).
    pub magnitude: i64,
    /// Share of the dump total, in percentage points.
    pub percent: f64,
    /// Value of the heap `bytes:` line preceding the block header, if any.
    pub allocation_size: Option<i64>,
    /// Callers of `endpoint`, innermost first; the last frame is the root.
    pub frames: Vec<String>,
}

impl RawSample {
    /// Outermost frame, or the endpoint itself for a frameless sample.
    pub fn root(&self) -> &str {
        self.frames.last().map_or(self.endpoint.as_str(), String::as_str)
    }
}

/// `---+---`: one or more dashes, a plus, one or more dashes.
pub fn is_delimiter(line: &str) -> bool {
    let line = line.trim();
    let Some((left, right)) = line.split_once('+') else {
        return false;
    };
    !left.is_empty() && !right.is_empty() && left.bytes().all(|b| b == b'-') && right.bytes().all(|b| b == b'-')
}

/// Split dump text into the header lines and the lines of each block.
pub(crate) fn split_sections(text: &str) -> (Vec<&str>, Vec<Vec<&str>>) {
    let mut header = Vec::new();
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in text.lines() {
        if is_delimiter(line) {
            blocks.push(Vec::new());
        } else if let Some(block) = blocks.last_mut() {
            block.push(line);
        } else {
            header.push(line);
        }
    }
    (header, blocks)
}

/// `bytes:  4kB` or `handler:  /api/orders`: a sample tag printed above the
/// value line.
fn tag_line(line: &str) -> Option<(&str, &str)> {
    let (label, value) = line.split_once(':')?;
    (!label.is_empty() && !label.contains(char::is_whitespace)).then_some((label, value.trim()))
}

/// Function name without the ` (inline)` marker.
fn function_name(text: &str) -> &str {
    text.strip_suffix("(inline)").map_or(text, str::trim_end)
}

/// Parse one block (1-based `block` number for error messages).
///
/// Returns `Ok(None)` for blank blocks and for summary rows whose magnitude
/// starts with `-`. Tag lines above the value line are skipped, except
/// `bytes:` which becomes the allocation size.
///
/// # Errors
/// Fails when the header line has fewer than two fields or the magnitude is
/// not a valid `unit` quantity.
pub(crate) fn parse_block(block: usize, lines: &[&str], unit: Unit) -> Result<Option<RawSample>, ParseError> {
    let mut lines = lines.iter().map(|line| line.trim()).filter(|line| !line.is_empty());

    let Some(mut header) = lines.next() else {
        return Ok(None);
    };

    let mut allocation_size = None;
    while let Some((label, value)) = tag_line(header) {
        if label == "bytes" {
            allocation_size = Some(Unit::Bytes.parse(value).map_err(|source| ParseError::Magnitude { block, source })?);
        } else {
            debug!("Skipping sample tag {label:?} = {value:?} in trace block {block}");
        }
        match lines.next() {
            Some(next) => header = next,
            None => return Err(ParseError::MalformedBlock { block, line: header.to_owned() }),
        }
    }

    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(ParseError::MalformedBlock { block, line: header.to_owned() });
    }
    if fields[0].starts_with('-') {
        return Ok(None);
    }

    let magnitude = unit.parse(fields[0]).map_err(|source| ParseError::Magnitude { block, source })?;

    // An optional "12.5%" column sits between magnitude and endpoint.
    let endpoint_fields = if fields.len() > 2 && fields[1].ends_with('%') { &fields[2..] } else { &fields[1..] };

    Ok(Some(RawSample {
        endpoint: function_name(&endpoint_fields.join(" ")).to_owned(),
        magnitude,
        percent: 0.0,
        allocation_size,
        frames: lines.map(|frame| function_name(frame).to_owned()).collect(),
    }))
}
