//! Process exit codes reported by the driver.
//!
//! Each pipeline stage that can reject an input owns one code. The driver
//! maps the first failing stage to its code and stops; success is 0.

use std::fmt;

/// Exit-code taxonomy for the `mcc` binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitCode {
    /// Compilation succeeded.
    Success,
    /// Bad invocation (wrong argument count).
    Usage,
    /// The input file does not exist.
    InputNotFound,
    /// An unrecognized flag was passed.
    InvalidFlag,
    /// The lexer produced invalid tokens.
    Lex,
    /// The parser rejected the token stream.
    Parse,
    /// A semantic pass rejected the AST.
    Semantic,
    /// Internal codegen assertion failed.
    Codegen,
}

impl ExitCode {
    /// The numeric process exit code.
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Usage => 1,
            ExitCode::InputNotFound => 2,
            ExitCode::InvalidFlag => 3,
            ExitCode::Lex => 4,
            ExitCode::Parse => 5,
            ExitCode::Semantic => 6,
            ExitCode::Codegen => 7,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExitCode::Success => "ok",
            ExitCode::Usage => "usage error",
            ExitCode::InputNotFound => "input file not found",
            ExitCode::InvalidFlag => "invalid flag",
            ExitCode::Lex => "lex error",
            ExitCode::Parse => "parse error",
            ExitCode::Semantic => "semantic error",
            ExitCode::Codegen => "codegen error",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::Usage.code(), 1);
        assert_eq!(ExitCode::InputNotFound.code(), 2);
        assert_eq!(ExitCode::InvalidFlag.code(), 3);
        assert_eq!(ExitCode::Lex.code(), 4);
        assert_eq!(ExitCode::Parse.code(), 5);
        assert_eq!(ExitCode::Semantic.code(), 6);
        assert_eq!(ExitCode::Codegen.code(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ExitCode::Lex), "lex error");
    }
}
