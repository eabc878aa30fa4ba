//! The keyword manifest: a text file enumerated line-by-line, `token-code
//! spelling` per line, loaded once at driver startup into the repr-tab with
//! the keyword flag set — the Rust equivalent of `read_keywords`/
//! `toreprtab` in the reference compiler this front end's grammar is
//! modeled on.
//!
//! A default manifest covering this surface syntax's reserved words is
//! embedded with `include_str!` so the crate is usable with no external
//! files; [`Driver::with_keyword_manifest`](crate::driver::Driver) overrides
//! it from a caller-supplied path or string.

use loomc_core::ReprTable;

/// Token codes for the keywords the parser matches on by name rather than by
/// spelling. These must agree with the `token-code` column of whichever
/// manifest is loaded — the default manifest assigns exactly these values.
pub mod code {
    pub const INT: u32 = 1;
    pub const FLOAT: u32 = 2;
    pub const CHAR: u32 = 3;
    pub const VOID: u32 = 4;
    pub const STRUCT: u32 = 5;
    pub const IF: u32 = 6;
    pub const ELSE: u32 = 7;
    pub const WHILE: u32 = 8;
    pub const DO: u32 = 9;
    pub const FOR: u32 = 10;
    pub const SWITCH: u32 = 11;
    pub const CASE: u32 = 12;
    pub const DEFAULT: u32 = 13;
    pub const BREAK: u32 = 14;
    pub const CONTINUE: u32 = 15;
    pub const RETURN: u32 = 16;
    pub const GOTO: u32 = 17;
    pub const PRINT: u32 = 18;
    pub const PRINTF: u32 = 19;
    pub const GET: u32 = 20;
    pub const T_CREATE_DIRECT: u32 = 21;
}

pub const DEFAULT_MANIFEST: &str = include_str!("default_manifest.txt");

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("keyword manifest line {line}: expected `<code> <spelling>`, found {text:?}")]
    Malformed { line: usize, text: String },
    #[error("keyword manifest line {line}: invalid token code {text:?}")]
    InvalidCode { line: usize, text: String },
}

/// Parse a manifest and intern every entry into `reprs` with the keyword
/// flag set.
pub fn load_manifest(manifest: &str, reprs: &mut ReprTable) -> Result<(), ManifestError> {
    for (index, raw_line) in manifest.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(2, char::is_whitespace);
        let code_text = parts.next().unwrap_or("");
        let spelling = parts.next().map(str::trim).unwrap_or("");
        if spelling.is_empty() {
            return Err(ManifestError::Malformed { line: index + 1, text: line.to_owned() });
        }
        let code: u32 = code_text
            .parse()
            .map_err(|_| ManifestError::InvalidCode { line: index + 1, text: code_text.to_owned() })?;
        reprs.intern_keyword(spelling, code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manifest_loads_without_error() {
        let mut reprs = ReprTable::new();
        load_manifest(DEFAULT_MANIFEST, &mut reprs).unwrap();
        let if_repr = reprs.lookup("if").expect("if keyword present");
        assert_eq!(reprs.keyword_code(if_repr), Some(code::IF));
    }

    #[test]
    fn malformed_line_is_rejected() {
        let mut reprs = ReprTable::new();
        let err = load_manifest("5\n", &mut reprs).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { line: 1, .. }));
    }
}
