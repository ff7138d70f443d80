// ─── Ignore Patterns ───
// Glob-style matching used to exclude files from integrity validation.

/// How a single `*` behaves when a glob is translated to a regex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StarMode {
    /// `*` stops at path separators (full-path matching).
    WithinSegment,
    /// `*` crosses path separators (basename matching).
    AnySpan,
}

/// Check if a file path matches any of the ignore patterns.
///
/// Supported syntax:
/// - `*` matches any characters except the path separator
/// - `**` matches any characters including path separators
/// - `?` matches a single character
///
/// Matching is case-insensitive and accepts both `/` and `\` as
/// separators. An empty pattern set never matches.
pub fn matches_pattern(file_path: &str, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let normalized_path = file_path.replace('\\', "/");

    for pattern in patterns {
        let normalized_pattern = pattern.replace('\\', "/");

        if glob_matches(&normalized_pattern, &normalized_path, StarMode::WithinSegment) {
            return true;
        }

        // A bare filename pattern should match at any directory depth, so
        // the pattern's last segment is also tried against the path's
        // basename. In this mode `*` is allowed to span separators.
        let file_name = basename(&normalized_path);
        let file_name_pattern = basename(&normalized_pattern);
        if glob_matches(file_name_pattern, file_name, StarMode::AnySpan) {
            return true;
        }
    }

    false
}

/// Last path segment, ignoring trailing separators (so `mods/` has the
/// basename `mods`).
fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Anchored, case-insensitive glob match of `text` against `pattern`.
fn glob_matches(pattern: &str, text: &str, star_mode: StarMode) -> bool {
    let source = glob_to_regex(pattern, star_mode);
    // The translation escapes every literal character, so the source is
    // always a valid regex.
    regex::RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

fn glob_to_regex(pattern: &str, star_mode: StarMode) -> String {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    source.push_str(".*");
                } else {
                    match star_mode {
                        StarMode::WithinSegment => source.push_str("[^/]*"),
                        StarMode::AnySpan => source.push_str(".*"),
                    }
                }
            }
            '?' => source.push('.'),
            other => {
                let mut buf = [0u8; 4];
                source.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }

    source.push('$');
    source
}
