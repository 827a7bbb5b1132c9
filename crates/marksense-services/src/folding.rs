//! Folding ranges.
//!
//! Computed straight from one scanner pass, without building a tree. Open
//! elements and `#region` markers share one stack; a closing construct pops
//! back to its nearest matching frame, so unbalanced markup still folds the
//! parts that do match.
//!
//! ```text
//! text → Scanner → stack of open frames → FoldingRange* → limit_ranges()
//! ```

use std::collections::HashSet;

use marksense_scanner::{is_void_element, Scanner, TokenType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::line_index::LineIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldingRangeKind {
    Region,
    Comment,
}

/// A collapsible line span. `kind` is `None` for element folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldingRange {
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FoldingRangeKind>,
}

impl FoldingRange {
    pub fn new(start_line: u32, end_line: u32, kind: Option<FoldingRangeKind>) -> Self {
        Self {
            start_line,
            end_line,
            kind,
        }
    }
}

/// Folding request settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldingOptions {
    /// Maximum number of ranges to return. `None` or `0` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_limit: Option<usize>,
}

impl FoldingOptions {
    pub fn with_range_limit(range_limit: usize) -> Self {
        Self {
            range_limit: Some(range_limit),
        }
    }

    fn effective_limit(&self) -> Option<usize> {
        self.range_limit.filter(|&limit| limit > 0)
    }
}

/// Compute the folding ranges of `text`.
///
/// Element ranges end on the line before the closing tag, region ranges
/// include both marker lines, and multi-line comments fold as a whole. At most
/// one range starts on any line; the first one emitted keeps it.
pub fn folding_ranges(text: &str, options: &FoldingOptions) -> Vec<FoldingRange> {
    let mut collector = FoldingCollector::new(text);
    collector.collect();
    let ranges = collector.ranges;

    match options.effective_limit() {
        Some(limit) if ranges.len() > limit => {
            let limited = limit_ranges(&ranges, limit);
            debug!(total = ranges.len(), kept = limited.len(), limit, "limited folding ranges");
            limited
        }
        _ => {
            debug!(total = ranges.len(), "computed folding ranges");
            ranges
        }
    }
}

/// An open element, or a region when `tag_name` is empty.
#[derive(Debug, Clone, Copy)]
struct StackFrame<'a> {
    start_line: u32,
    tag_name: &'a str,
}

impl StackFrame<'_> {
    fn is_region(&self) -> bool {
        self.tag_name.is_empty()
    }
}

struct FoldingCollector<'a> {
    scanner: Scanner<'a>,
    lines: LineIndex,
    stack: Vec<StackFrame<'a>>,
    ranges: Vec<FoldingRange>,
    used_start_lines: HashSet<u32>,
    last_tag_name: Option<&'a str>,
}

impl<'a> FoldingCollector<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            scanner: Scanner::new(text),
            lines: LineIndex::new(text),
            stack: Vec::new(),
            ranges: Vec::new(),
            used_start_lines: HashSet::new(),
            last_tag_name: None,
        }
    }

    fn collect(&mut self) {
        loop {
            match self.scanner.scan() {
                TokenType::Eos => break,
                TokenType::StartTag => {
                    let tag_name = self.scanner.token_text();
                    let start_line = self.lines.line(self.scanner.token_offset());
                    self.stack.push(StackFrame {
                        start_line,
                        tag_name,
                    });
                    self.last_tag_name = Some(tag_name);
                }
                TokenType::EndTag => {
                    self.last_tag_name = Some(self.scanner.token_text());
                }
                TokenType::StartTagClose => {
                    if self.last_tag_name.is_some_and(is_void_element) {
                        self.close_element();
                    }
                }
                TokenType::EndTagClose | TokenType::StartTagSelfClose => self.close_element(),
                TokenType::Comment => self.comment(),
                _ => {}
            }
        }
    }

    /// Pop back to the nearest frame named like the last seen tag.
    fn close_element(&mut self) {
        let Some(tag_name) = self.last_tag_name else {
            return;
        };
        let Some(index) = self
            .stack
            .iter()
            .rposition(|frame| !frame.is_region() && frame.tag_name == tag_name)
        else {
            return;
        };
        let frame = self.stack[index];
        self.stack.truncate(index);

        let line = self.lines.line(self.scanner.token_offset());
        if let Some(end_line) = line.checked_sub(1) {
            self.add_range(FoldingRange::new(frame.start_line, end_line, None));
        }
    }

    fn comment(&mut self) {
        let text = self.scanner.token_text();
        let start_line = self.lines.line(self.scanner.token_offset());
        match region_marker(text) {
            Some(RegionMarker::Start) => self.stack.push(StackFrame {
                start_line,
                tag_name: "",
            }),
            Some(RegionMarker::End) => {
                let Some(index) = self.stack.iter().rposition(StackFrame::is_region) else {
                    return;
                };
                let frame = self.stack[index];
                self.stack.truncate(index);
                self.add_range(FoldingRange::new(
                    frame.start_line,
                    start_line,
                    Some(FoldingRangeKind::Region),
                ));
            }
            None => {
                let end_line = self.lines.line(self.scanner.token_end());
                self.add_range(FoldingRange::new(
                    start_line,
                    end_line,
                    Some(FoldingRangeKind::Comment),
                ));
            }
        }
    }

    fn add_range(&mut self, range: FoldingRange) {
        if range.end_line > range.start_line && self.used_start_lines.insert(range.start_line) {
            self.ranges.push(range);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegionMarker {
    Start,
    End,
}

/// Recognise `region` / `endregion` (optionally `#`-prefixed) at the start of
/// a comment body.
fn region_marker(comment: &str) -> Option<RegionMarker> {
    let body = comment.trim_start();
    let body = body.strip_prefix('#').unwrap_or(body);
    let (marker, rest) = if let Some(rest) = body.strip_prefix("endregion") {
        (RegionMarker::End, rest)
    } else if let Some(rest) = body.strip_prefix("region") {
        (RegionMarker::Start, rest)
    } else {
        return None;
    };
    let at_word_boundary = !rest
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    at_word_boundary.then_some(marker)
}

/// Reduce `ranges` to at most `range_limit` entries, keeping the outermost
/// levels first.
///
/// Ranges are sorted by start then end line, assigned a nesting level, and
/// then kept level by level while the budget allows. The level that overflows
/// the budget is cut in sorted order; deeper levels are dropped.
pub fn limit_ranges(ranges: &[FoldingRange], range_limit: usize) -> Vec<FoldingRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort_by_key(|range| (range.start_line, range.end_line));
    let levels = nesting_levels(&sorted);
    filter_by_level(&sorted, &levels, range_limit)
}

/// Nesting level of each range in a sorted slice.
///
/// A range nested inside the current innermost open range goes one level
/// deeper; a range after it pops finished ancestors and becomes their
/// sibling. Ranges that start on the same line as the open range, or start
/// inside it and end outside it, get no level.
pub fn nesting_levels(sorted: &[FoldingRange]) -> Vec<Option<usize>> {
    let mut levels = Vec::with_capacity(sorted.len());
    let mut top: Option<&FoldingRange> = None;
    let mut ancestors: Vec<&FoldingRange> = Vec::new();

    for range in sorted {
        let level = match top {
            None => {
                top = Some(range);
                Some(0)
            }
            Some(current) if range.start_line > current.start_line => {
                if range.end_line <= current.end_line {
                    ancestors.push(current);
                    top = Some(range);
                    Some(ancestors.len())
                } else if range.start_line > current.end_line {
                    let mut parent = ancestors.pop();
                    while let Some(candidate) = parent {
                        if range.start_line > candidate.end_line {
                            parent = ancestors.pop();
                        } else {
                            break;
                        }
                    }
                    if let Some(candidate) = parent {
                        ancestors.push(candidate);
                    }
                    top = Some(range);
                    Some(ancestors.len())
                } else {
                    None
                }
            }
            Some(_) => None,
        };
        levels.push(level);
    }
    levels
}

fn filter_by_level(
    sorted: &[FoldingRange],
    levels: &[Option<usize>],
    range_limit: usize,
) -> Vec<FoldingRange> {
    let depth = levels.iter().flatten().max().map_or(0, |max| max + 1);
    let mut counts = vec![0usize; depth];
    for &level in levels.iter().flatten() {
        counts[level] += 1;
    }

    let mut kept = 0;
    let mut cutoff = depth;
    for (level, &count) in counts.iter().enumerate() {
        if kept + count > range_limit {
            cutoff = level;
            break;
        }
        kept += count;
    }

    let mut budget = range_limit - kept;
    let mut result = Vec::with_capacity(kept + budget);
    for (range, level) in sorted.iter().zip(levels) {
        match *level {
            Some(level) if level < cutoff => result.push(*range),
            Some(level) if level == cutoff && budget > 0 => {
                budget -= 1;
                result.push(*range);
            }
            _ => {}
        }
    }
    result
}
