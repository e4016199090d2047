use thiserror::Error;

use crate::lang::flow::Head;

/// Reason a flow could not be compiled.
///
/// Compilation stops at the first failure and returns no partial program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// No control construct, composite form or lookup table entry matches
    /// the block's opcode.
    #[error(
        "compile error: cannot process \"{0}\" block\n  hint: the opcode is neither a control construct nor listed in the lookup tables"
    )]
    UnsupportedOpcode(String),

    /// An increment block whose first argument is not a variable or a
    /// context attribute.
    #[error(
        "compile error: \"{opcode}\" cannot assign to {target}\n  hint: the first argument must be a box reference"
    )]
    InvalidTarget { opcode: String, target: String },
}

impl CompileError {
    pub fn unsupported(head: &Head) -> Self {
        CompileError::UnsupportedOpcode(head.opcode())
    }

    /// The opcode that failed to resolve.
    pub fn opcode(&self) -> &str {
        match self {
            CompileError::UnsupportedOpcode(op) => op,
            CompileError::InvalidTarget { opcode, .. } => opcode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let err = CompileError::UnsupportedOpcode("unknownblock".to_string());

        let msg = err.to_string();
        assert!(msg.contains("cannot process"));
        assert!(msg.contains("\"unknownblock\""));
        assert!(msg.contains("hint"));
    }

    #[test]
    fn test_unsupported_keeps_composite_text() {
        let err = CompileError::unsupported(&Head::decode("foo_bar"));
        assert_eq!(err.opcode(), "foo_bar");
    }

    #[test]
    fn test_invalid_target_display() {
        let err = CompileError::InvalidTarget {
            opcode: "increment".to_string(),
            target: "\"n\"".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("\"increment\" cannot assign to \"n\""));
        assert!(msg.contains("box reference"));
        assert_eq!(err.opcode(), "increment");
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = CompileError::UnsupportedOpcode("x".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
