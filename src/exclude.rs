//! Glob-style exclusion of entry names.
//!
//! Patterns are shell globs matched against a single name (never a path), translated to anchored
//! regular expressions: `*` is any run of characters, `?` one character, `[abc]` / `[!abc]`
//! a character class. Matching is case-sensitive and knows nothing about the directory level a
//! name was found at.

use regex::RegexSet;

use crate::ArchiverError;

/// macOS Finder metadata file and the resource-fork folder macOS zip tools add.
pub const DEFAULT_EXCLUDES: &[&str] = &["*.DS_Store", "__MACOSX"];

#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    patterns: Vec<String>,
    set: RegexSet,
}

impl Default for ExclusionMatcher {
    fn default() -> Self {
        // The default globs are static and translate to valid regexes.
        Self::new(DEFAULT_EXCLUDES).unwrap_or_else(|_| Self::empty())
    }
}

impl ExclusionMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ArchiverError> {
        let patterns: Vec<String> = patterns.iter().map(|p| p.as_ref().to_string()).collect();
        let set = RegexSet::new(patterns.iter().map(|p| glob_to_regex(p)))
            .map_err(|e| ArchiverError::Usage(format!("Invalid exclusion pattern: {}", e)))?;
        Ok(Self { patterns, set })
    }

    /// Default patterns followed by `extra`.
    pub fn with_defaults<S: AsRef<str>>(extra: &[S]) -> Result<Self, ArchiverError> {
        let mut all: Vec<&str> = DEFAULT_EXCLUDES.to_vec();
        all.extend(extra.iter().map(|s| s.as_ref()));
        Self::new(&all)
    }

    pub fn empty() -> Self {
        Self { patterns: Vec::new(), set: RegexSet::empty() }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.set.is_match(name)
    }
}

/// Translates a shell glob into an anchored regex source string.
pub fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len() * 2 + 6);
    // `*` must also cross newlines, which are legal in file names
    out.push_str("(?s)^");
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push('[');
                    let mut j = i + 1;
                    if chars[j] == '!' || chars[j] == '^' {
                        out.push('^');
                        j += 1;
                    }
                    for &c in &chars[j..end] {
                        if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
                            out.push('\\');
                        }
                        out.push(c);
                    }
                    out.push(']');
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
        i += 1;
    }
    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `start`, if the class is well formed.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if j < chars.len() && (chars[j] == '!' || chars[j] == '^') {
        j += 1;
    }
    // a leading ']' is a literal member
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() {
        if chars[j] == ']' {
            return Some(j);
        }
        j += 1;
    }
    None
}
