/// Default width of a report section separator line.
pub const SECTION_WIDTH: usize = 56;

/// Drop `start` lines from the top and `end` lines from the bottom.
///
/// Lossy by nature: cutting from the top then the bottom does not give the
/// original back.
pub fn cut_lines(output: &str, start: usize, end: usize) -> String {
    let lines: Vec<&str> = output.split('\n').collect();
    let stop = lines.len().saturating_sub(end);
    if start >= stop {
        return String::new();
    }
    lines[start..stop].join("\n")
}

/// Remove trailing blank lines, plus one trailing line containing
/// `last_line` if given (e.g. "Command completed successfully.").
pub fn sanitize_stdout(output: &str, last_line: Option<&str>) -> String {
    let mut lines: Vec<&str> = output.split('\n').collect();
    trim_trailing_blank(&mut lines);
    if let (Some(marker), Some(last)) = (last_line.filter(|m| !m.is_empty()), lines.last()) {
        if last.contains(marker) {
            lines.pop();
        }
    }
    trim_trailing_blank(&mut lines);
    lines.join("\n")
}

fn trim_trailing_blank(lines: &mut Vec<&str>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
}

/// True if the line is a section separator: only dashes, at least `width` of them.
pub fn is_separator(line: &str, width: usize) -> bool {
    let t = line.trim();
    t.len() >= width && t.bytes().all(|b| b == b'-')
}

/// Split a report into the sections between separator lines.
///
/// Sections keep their position: a blank section between two separators
/// comes back as an empty string. Blank runs before the first and after the
/// last separator are dropped.
pub fn split_sections(text: &str, width: usize) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if is_separator(line, width) {
            sections.push(take_section(&mut current));
        } else {
            current.push(line);
        }
    }
    sections.push(take_section(&mut current));

    let Some(first) = sections.iter().position(|s| !s.is_empty()) else {
        return Vec::new();
    };
    let last = sections.iter().rposition(|s| !s.is_empty()).unwrap_or(first);
    sections.drain(first..=last).collect()
}

fn take_section(current: &mut Vec<&str>) -> String {
    let section = if current.iter().any(|l| !l.trim().is_empty()) {
        current.join("\n")
    } else {
        String::new()
    };
    current.clear();
    section
}

/// Split text into blank-line delimited paragraphs.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_lines_strips_banner_and_footer() {
        let text = "banner\n----\nbody 1\nbody 2\nfooter";
        assert_eq!(cut_lines(text, 2, 1), "body 1\nbody 2");
        assert_eq!(cut_lines(text, 0, 0), text);
    }

    #[test]
    fn cut_lines_handles_empty_and_overlong_cuts() {
        assert_eq!(cut_lines("", 4, 0), "");
        assert_eq!(cut_lines("a\nb", 1, 5), "");
        assert_eq!(cut_lines("a\nb", 3, 0), "");
    }

    #[test]
    fn cut_lines_is_lossy() {
        let text = "one\ntwo\nthree\nfour";
        let head_cut = cut_lines(text, 1, 0);
        let both = cut_lines(&head_cut, 0, 2);
        assert_eq!(both, "two");
        assert_ne!(both, text);
    }

    #[test]
    fn cut_lines_keeps_internal_blank_lines() {
        let text = "x\na\n\nb\ny";
        assert_eq!(cut_lines(text, 1, 1), "a\n\nb");
    }

    #[test]
    fn sanitize_drops_terminator_and_trailing_blanks() {
        let out = "Controllers found: 1\nbody\n\nCommand completed successfully.\n\n";
        assert_eq!(sanitize_stdout(out, Some("Command ")), "Controllers found: 1\nbody");
    }

    #[test]
    fn sanitize_keeps_last_line_without_terminator() {
        assert_eq!(sanitize_stdout("a\nb\n\n", Some("Command ")), "a\nb");
        assert_eq!(sanitize_stdout("a\nCommand x\n", None), "a\nCommand x");
        assert_eq!(sanitize_stdout("", Some("Command ")), "");
        assert_eq!(sanitize_stdout("\n\n", None), "");
    }

    #[test]
    fn splits_on_separator_lines_only() {
        let dashes = "-".repeat(56);
        let text = format!(
            "Mode : RAID\nNote : ----------------------------------------------------------------\n   {dashes}\n   Header\n   {dashes}\n   Key : v"
        );
        let sections = split_sections(&text, 56);
        assert_eq!(sections.len(), 3);
        assert!(sections[0].contains("Note : ---"));
        assert_eq!(sections[1].trim(), "Header");
        assert_eq!(sections[2].trim(), "Key : v");
    }

    #[test]
    fn short_dash_runs_do_not_split() {
        let text = format!("a : 1\n{}\nb : 2", "-".repeat(20));
        assert_eq!(split_sections(&text, 56).len(), 1);
        assert_eq!(split_sections(&text, 16).len(), 2);
    }

    #[test]
    fn blank_sections_keep_their_position() {
        let dashes = "-".repeat(64);
        let text = format!("a : 1\n{dashes}\n   \n{dashes}\nb : 2");
        assert_eq!(split_sections(&text, 64), vec!["a : 1".to_string(), String::new(), "b : 2".to_string()]);
    }

    #[test]
    fn outer_blank_sections_are_dropped() {
        let dashes = "-".repeat(56);
        let text = format!("\n{dashes}\na : 1\n{dashes}\n\n{dashes}\n  \n");
        assert_eq!(split_sections(&text, 56), vec!["a : 1".to_string()]);
        assert!(split_sections("", 56).is_empty());
        assert!(split_sections(&format!("{dashes}\n{dashes}"), 56).is_empty());
    }

    #[test]
    fn paragraphs_split_on_blank_runs() {
        let text = "a\nb\n\n\n   \nc\n";
        assert_eq!(paragraphs(text), vec!["a\nb".to_string(), "c".to_string()]);
        assert!(paragraphs("").is_empty());
    }
}
