//! Name transcoding into a legacy single/double-byte encoding.
//!
//! Every name that ends up in the archive goes through two steps:
//!
//! 1. Characters that are unsafe in file names (`< > : " / \ | ? *`) are swapped for their
//!    full-width counterparts, one for one, so the name keeps its length and shape.
//! 2. JIS X 0208 code points that have a distinct twin in the Windows/WHATWG table (wave dash,
//!    minus sign, em dash and friends) are folded onto that twin, so names typed on systems that
//!    use the JIS mapping still land on the same legacy bytes.
//! 3. The folded name is encoded into the target encoding (Shift_JIS by default) and decoded
//!    back. Anything the encoding cannot carry makes the round trip fail, and so does a round trip
//!    that comes back as a different string (e.g. `¥` folding onto `\`).
//!
//! The result is a pure function of the input name and the target encoding.

use std::ffi::OsStr;

use encoding_rs::Encoding;

use crate::ArchiverError;

/// WHATWG label of the encoding used when none is configured.
pub const DEFAULT_ENCODING: &str = "Shift_JIS";

/// Maps a file-name-unsafe ASCII character to its full-width form.
fn fullwidth(c: char) -> Option<char> {
    match c {
        '<' => Some('\u{FF1C}'),
        '>' => Some('\u{FF1E}'),
        ':' => Some('\u{FF1A}'),
        '"' => Some('\u{FF02}'),
        '/' => Some('\u{FF0F}'),
        '\\' => Some('\u{FF3C}'),
        '|' => Some('\u{FF5C}'),
        '?' => Some('\u{FF1F}'),
        '*' => Some('\u{FF0A}'),
        _ => None,
    }
}

/// Replaces `< > : " / \ | ? *` with their full-width forms, character by character.
pub fn sanitize(name: &str) -> String {
    name.chars().map(|c| fullwidth(c).unwrap_or(c)).collect()
}

/// CP932 twin of a character as mapped by JIS X 0208.
fn cp932_twin(c: char) -> Option<char> {
    match c {
        '\u{301C}' => Some('\u{FF5E}'), // wave dash
        '\u{2212}' => Some('\u{FF0D}'), // minus sign
        '\u{2016}' => Some('\u{2225}'), // double vertical line
        '\u{2014}' => Some('\u{2015}'), // em dash
        '\u{00A2}' => Some('\u{FFE0}'),
        '\u{00A3}' => Some('\u{FFE1}'),
        '\u{00AC}' => Some('\u{FFE2}'),
        _ => None,
    }
}

/// Folds JIS-mapped characters onto the forms the legacy encoders accept.
pub fn fold_jis_variants(name: &str) -> String {
    name.chars().map(|c| cp932_twin(c).unwrap_or(c)).collect()
}

#[derive(Debug, Clone, Copy)]
pub struct NameTranscoder {
    encoding: &'static Encoding,
}

impl Default for NameTranscoder {
    fn default() -> Self {
        Self { encoding: encoding_rs::SHIFT_JIS }
    }
}

impl NameTranscoder {
    /// Builds a transcoder for a WHATWG encoding label such as `Shift_JIS`, `EUC-JP` or `cp932`.
    ///
    /// Labels whose encoder would silently write UTF-8 instead (UTF-16 variants, `replacement`)
    /// are rejected.
    pub fn for_label(label: &str) -> Result<Self, ArchiverError> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| ArchiverError::Usage(format!("Unknown encoding '{}'.", label)))?;
        if encoding.output_encoding() != encoding {
            return Err(ArchiverError::Usage(format!(
                "Encoding '{}' cannot be used for file names.",
                label
            )));
        }
        Ok(Self { encoding })
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Sanitizes `name` and checks that it survives the legacy encoding unchanged.
    pub fn transcode(&self, name: &str) -> Result<String, ArchiverError> {
        let sanitized = fold_jis_variants(&sanitize(name));
        let (encoded, _, unmappable) = self.encoding.encode(&sanitized);
        if unmappable {
            return Err(self.failure(name));
        }
        let (decoded, malformed) = self.encoding.decode_without_bom_handling(&encoded);
        if malformed || decoded != sanitized {
            return Err(self.failure(name));
        }
        Ok(decoded.into_owned())
    }

    /// Same as [`transcode`](Self::transcode) for names read from the filesystem.
    /// Names that are not valid Unicode cannot be transcoded at all.
    pub fn transcode_os(&self, name: &OsStr) -> Result<String, ArchiverError> {
        match name.to_str() {
            Some(s) => self.transcode(s),
            None => Err(self.failure(&name.to_string_lossy())),
        }
    }

    fn failure(&self, name: &str) -> ArchiverError {
        ArchiverError::NameTranscode { name: name.to_string(), encoding: self.encoding.name() }
    }
}
