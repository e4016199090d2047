use thiserror::Error;

use super::tree::Program;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("codec error: json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("codec error: postcard: {0}")]
    Postcard(#[from] postcard::Error),
}

pub fn to_json(program: &Program) -> Result<String, CodecError> {
    Ok(serde_json::to_string(program)?)
}

pub fn to_json_pretty(program: &Program) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(program)?)
}

pub fn from_json(json: &str) -> Result<Program, CodecError> {
    Ok(serde_json::from_str(json)?)
}

/// Compact binary encoding for handing a program to an executor.
pub fn to_bytes(program: &Program) -> Result<Vec<u8>, CodecError> {
    Ok(postcard::to_allocvec(program)?)
}

pub fn from_bytes(bytes: &[u8]) -> Result<Program, CodecError> {
    Ok(postcard::from_bytes(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::tree::{CallMode, Expr, Stmt};

    fn sample() -> Program {
        Program {
            body: vec![
                Stmt::Let {
                    name: "x".to_string(),
                    init: Expr::literal(2.5_f64),
                },
                Stmt::Expr(Expr::call(
                    Expr::path("console.log"),
                    vec![Expr::ident("x"), Expr::literal("hi")],
                    CallMode::Plain,
                )),
            ],
        }
    }

    #[test]
    fn test_postcard_preserves_program() {
        let program = sample();
        let bytes = to_bytes(&program).unwrap();
        assert_eq!(from_bytes(&bytes).unwrap(), program);
    }

    #[test]
    fn test_json_shape() {
        let json = to_json(&sample()).unwrap();
        assert!(json.contains("\"Let\""));
        assert!(json.contains("\"Plain\""));
        assert_eq!(from_json(&json).unwrap(), sample());
    }

    #[test]
    fn test_truncated_bytes() {
        let bytes = to_bytes(&sample()).unwrap();
        let err = from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, CodecError::Postcard(_)));
    }
}
