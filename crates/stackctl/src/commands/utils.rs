//! Helpers shared across service commands

use serde_json::{Map, Value};

use crate::error::{Result as CliResult, StackCtlError};

/// Read a JSON object from a string, a file (`@path`) or stdin (`-`)
pub fn read_json_object(data: &str) -> CliResult<Map<String, Value>> {
    let (source, json_str) = if data == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| StackCtlError::InvalidInput {
                message: format!("Failed to read from stdin: {}", e),
            })?;
        ("stdin".to_string(), buffer)
    } else if let Some(file_path) = data.strip_prefix('@') {
        let content =
            std::fs::read_to_string(file_path).map_err(|e| StackCtlError::FileError {
                path: file_path.to_string(),
                message: e.to_string(),
            })?;
        (file_path.to_string(), content)
    } else {
        ("--payload".to_string(), data.to_string())
    };

    match serde_json::from_str::<Value>(&json_str) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StackCtlError::InvalidInput {
            message: format!("payload from {} must be a JSON object", source),
        }),
        Err(e) => Err(StackCtlError::InvalidInput {
            message: format!("invalid JSON in {}: {}", source, e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_inline_object() {
        let map = read_json_object(r#"{"region": "eu01"}"#).unwrap();
        assert_eq!(map["region"], "eu01");
    }

    #[test]
    fn test_file_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"nodes": 3}}"#).unwrap();
        let arg = format!("@{}", file.path().display());
        let map = read_json_object(&arg).unwrap();
        assert_eq!(map["nodes"], 3);
    }

    #[test]
    fn test_missing_file() {
        let err = read_json_object("@/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, StackCtlError::FileError { .. }));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(
            read_json_object("[1, 2]"),
            Err(StackCtlError::InvalidInput { .. })
        ));
        assert!(matches!(
            read_json_object("{not json"),
            Err(StackCtlError::InvalidInput { .. })
        ));
    }
}
