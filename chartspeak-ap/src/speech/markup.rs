//! Markdown stripping for synthesis

/// Longest heading marker (`######`)
const MAX_HEADING_LEVEL: usize = 6;

/// Remove emphasis markers, heading markers and backticks
///
/// Strips `**`, `*`, backticks, and any run of one to six `#` followed by a
/// whitespace character (the whitespace goes too). Everything else, newlines
/// included, is kept.
pub fn strip_markup(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' | '`' => i += 1,
            '#' => {
                let run = chars[i..].iter().take_while(|c| **c == '#').count();
                let followed_by_space = chars.get(i + run).is_some_and(|c| c.is_whitespace());
                if followed_by_space {
                    // Only the last six hashes and the whitespace form a marker
                    let kept = run.saturating_sub(MAX_HEADING_LEVEL);
                    out.extend(std::iter::repeat('#').take(kept));
                    i += run + 1;
                } else {
                    out.extend(std::iter::repeat('#').take(run));
                    i += run;
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}
