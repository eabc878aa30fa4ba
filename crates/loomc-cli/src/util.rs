use std::fs;
use std::io::{self, Read};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("failed to read {path}: {source}")]
    File { path: String, #[source] source: io::Error },
}

/// Read a file given on the CLI, or stdin if the path is `-`.
pub fn load_text(path: &Path) -> Result<String, LoadError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(LoadError::Stdin)?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|source| LoadError::File { path: path.display().to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_text_from_a_real_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "int main() {{ return 0; }}").unwrap();
        let text = load_text(file.path()).unwrap();
        assert_eq!(text, "int main() { return 0; }");
    }

    #[test]
    fn missing_file_reports_its_path() {
        let missing = Path::new("/nonexistent/does-not-exist.lang");
        let err = load_text(missing).unwrap_err();
        assert!(matches!(err, LoadError::File { .. }));
    }
}
