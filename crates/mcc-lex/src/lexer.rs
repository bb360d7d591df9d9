//! Main lexer implementation for the mcc compiler.
//!
//! The [`Lexer`] transforms preprocessed C source into a stream of tokens.
//! It makes a single pass with at most two characters of lookahead,
//! dispatching on the lead character and applying maximal munch for
//! multi-character operators (`>>=` before `>>` before `>=` before `>`).
//!
//! Lexing never aborts: unrecognized input produces a [`TokenKind::Invalid`]
//! token plus a diagnostic, and scanning continues so one run surfaces every
//! lexical error in the file.

use mcc_util::{Handler, Span};

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, LiteralValue, Token, TokenKind};

/// The lexer for mcc source code.
///
/// # Example
///
/// ```
/// use mcc_util::Handler;
/// use mcc_lex::{Lexer, TokenKind};
///
/// let mut handler = Handler::new();
/// let mut lexer = Lexer::new("return 2;", &mut handler);
///
/// assert_eq!(lexer.next_token().kind, TokenKind::KwReturn);
/// assert_eq!(lexer.next_token().kind, TokenKind::IntLiteral);
/// ```
pub struct Lexer<'a> {
    /// Character cursor for traversing source.
    cursor: Cursor<'a>,

    /// Diagnostic handler for error reporting.
    handler: &'a mut Handler,

    /// Start byte offset of the current token.
    token_start: usize,

    /// Start line of the current token.
    token_start_line: u32,

    /// Start column of the current token.
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over `source`, reporting errors into `handler`.
    pub fn new(source: &'a str, handler: &'a mut Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Lexes the whole input, returning the token sequence terminated by
    /// an [`TokenKind::Eof`] token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    /// Returns the next token from the source.
    ///
    /// Skips whitespace and comments, then dispatches on the first
    /// character of the token.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.cursor.skip_whitespace();
            self.mark_token_start();

            if self.cursor.is_at_end() {
                return self.make_token(TokenKind::Eof);
            }

            // Line comment: consume to end of line.
            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '/' {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
                continue;
            }

            // Block comment: consume to `*/`; C block comments do not nest.
            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '*' {
                self.cursor.advance();
                self.cursor.advance();
                if !self.skip_block_comment() {
                    self.report_error("unterminated block comment");
                    return self.make_token(TokenKind::Invalid);
                }
                continue;
            }

            break;
        }

        match self.cursor.current_char() {
            // Single-character symbols
            '(' => self.single(TokenKind::OpenParen),
            ')' => self.single(TokenKind::CloseParen),
            '{' => self.single(TokenKind::OpenBrace),
            '}' => self.single(TokenKind::CloseBrace),
            '[' => self.single(TokenKind::OpenBracket),
            ']' => self.single(TokenKind::CloseBracket),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '?' => self.single(TokenKind::Question),
            '~' => self.single(TokenKind::Tilde),

            // Multi-character operators
            '+' => self.lex_plus(),
            '-' => self.lex_minus(),
            '*' => self.lex_star(),
            '/' => self.lex_slash(),
            '%' => self.lex_percent(),
            '=' => self.lex_equals(),
            '!' => self.lex_bang(),
            '<' => self.lex_less(),
            '>' => self.lex_greater(),
            '&' => self.lex_ampersand(),
            '|' => self.lex_pipe(),
            '^' => self.lex_caret(),

            // Literals
            '\'' => self.lex_char(),
            '"' => self.lex_string(),
            c if c.is_ascii_digit() => self.lex_number(),

            // Identifiers and keywords
            c if is_ident_start(c) => self.lex_identifier(),

            // Unknown byte
            c => {
                self.cursor.advance();
                self.report_error(format!("unexpected character '{}'", c));
                self.make_token(TokenKind::Invalid)
            }
        }
    }

    /// Records the position of the token about to be lexed.
    fn mark_token_start(&mut self) {
        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();
    }

    /// Consumes one character and produces the given token kind.
    fn single(&mut self, kind: TokenKind) -> Token {
        self.cursor.advance();
        self.make_token(kind)
    }

    /// Builds a token from the current lexeme slice.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            self.cursor.slice_from(self.token_start),
            self.token_start_line,
            self.token_start_column,
        )
    }

    /// Builds a literal token from the current lexeme slice.
    fn make_literal(&self, kind: TokenKind, value: LiteralValue) -> Token {
        Token::literal(
            kind,
            self.cursor.slice_from(self.token_start),
            self.token_start_line,
            self.token_start_column,
            value,
        )
    }

    /// Lexes an identifier or keyword.
    fn lex_identifier(&mut self) -> Token {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        match keyword_from_ident(text) {
            Some(kind) => self.make_token(kind),
            None => self.make_token(TokenKind::Identifier),
        }
    }

    /// Lexes a numeric literal.
    ///
    /// Consumes a digit run, then either switches to the floating-point
    /// path (on `.` or an exponent) or consumes an optional integer suffix
    /// (`L`, `U`, `UL`/`LU` in either case). The token kind is determined
    /// by the suffix and by magnitude: a plain literal wider than `int`
    /// promotes to `long`, an unsigned literal wider than `unsigned int`
    /// promotes to `unsigned long`.
    fn lex_number(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        let is_double = (self.cursor.current_char() == '.'
            && self.cursor.peek_char(1).is_ascii_digit())
            || self.cursor.current_char() == 'e'
            || self.cursor.current_char() == 'E';
        if is_double {
            return self.lex_double();
        }

        let digits_end = self.cursor.position();

        // Consume the suffix run: any trailing identifier characters.
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let digits = &self.cursor.slice_from(self.token_start)
            [..digits_end - self.token_start];
        let suffix = self.cursor.slice_from(digits_end);

        let (unsigned_req, long_req) = match classify_suffix(suffix) {
            Some(flags) => flags,
            None => {
                self.report_error(format!("invalid integer literal suffix '{}'", suffix));
                return self.make_token(TokenKind::Invalid);
            }
        };

        let value = match digits.parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                self.report_error(format!("integer literal '{}' is out of range", digits));
                return self.make_token(TokenKind::Invalid);
            }
        };

        if unsigned_req {
            if !long_req && value <= u64::from(u32::MAX) {
                self.make_literal(TokenKind::UIntLiteral, LiteralValue::UInt(value as u32))
            } else {
                self.make_literal(TokenKind::ULongLiteral, LiteralValue::ULong(value))
            }
        } else if long_req {
            if value > i64::MAX as u64 {
                self.report_error(format!("integer literal '{}' is out of range", digits));
                return self.make_token(TokenKind::Invalid);
            }
            self.make_literal(TokenKind::LongLiteral, LiteralValue::Long(value as i64))
        } else if value <= i32::MAX as u64 {
            self.make_literal(TokenKind::IntLiteral, LiteralValue::Int(value as i32))
        } else if value <= i64::MAX as u64 {
            // Magnitude promotion: too wide for int, still fits in long.
            self.make_literal(TokenKind::LongLiteral, LiteralValue::Long(value as i64))
        } else {
            self.report_error(format!("integer literal '{}' is out of range", digits));
            self.make_token(TokenKind::Invalid)
        }
    }

    /// Lexes the fractional and exponent parts of a double literal.
    fn lex_double(&mut self) -> Token {
        if self.cursor.current_char() == '.' {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        if self.cursor.current_char() == 'e' || self.cursor.current_char() == 'E' {
            self.cursor.advance();
            if self.cursor.current_char() == '+' || self.cursor.current_char() == '-' {
                self.cursor.advance();
            }
            if !self.cursor.current_char().is_ascii_digit() {
                self.report_error("no digits in floating-point exponent");
                return self.make_token(TokenKind::Invalid);
            }
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        // A suffix run after a double literal is not accepted.
        if is_ident_continue(self.cursor.current_char()) {
            while is_ident_continue(self.cursor.current_char()) {
                self.cursor.advance();
            }
            self.report_error("invalid floating-point literal suffix");
            return self.make_token(TokenKind::Invalid);
        }

        let text = self.cursor.slice_from(self.token_start);
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                self.make_literal(TokenKind::DoubleLiteral, LiteralValue::Double(value))
            }
            _ => {
                self.report_error(format!("invalid floating-point literal '{}'", text));
                self.make_token(TokenKind::Invalid)
            }
        }
    }

    /// Lexes a character literal with simple escape sequences.
    fn lex_char(&mut self) -> Token {
        self.cursor.advance();

        let c = match self.cursor.current_char() {
            '\0' | '\n' => {
                self.report_error("unterminated character literal");
                return self.make_token(TokenKind::Invalid);
            }
            '\'' => {
                self.cursor.advance();
                self.report_error("empty character literal");
                return self.make_token(TokenKind::Invalid);
            }
            '\\' => {
                self.cursor.advance();
                match self.parse_escape() {
                    Some(c) => c,
                    None => return self.make_token(TokenKind::Invalid),
                }
            }
            c => {
                self.cursor.advance();
                c
            }
        };

        if !self.cursor.match_char('\'') {
            self.report_error("unterminated character literal");
            return self.make_token(TokenKind::Invalid);
        }

        self.make_literal(TokenKind::CharLiteral, LiteralValue::Char(c))
    }

    /// Lexes a string literal with simple escape sequences.
    fn lex_string(&mut self) -> Token {
        self.cursor.advance();

        loop {
            match self.cursor.current_char() {
                '\0' | '\n' => {
                    self.report_error("unterminated string literal");
                    return self.make_token(TokenKind::Invalid);
                }
                '"' => {
                    self.cursor.advance();
                    break;
                }
                '\\' => {
                    self.cursor.advance();
                    if self.parse_escape().is_none() {
                        return self.make_token(TokenKind::Invalid);
                    }
                }
                _ => self.cursor.advance(),
            }
        }

        self.make_token(TokenKind::StringLiteral)
    }

    /// Parses one escape sequence after a consumed backslash.
    fn parse_escape(&mut self) -> Option<char> {
        let c = self.cursor.current_char();
        self.cursor.advance();
        match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '0' => Some('\0'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            _ => {
                self.report_error(format!("unknown escape sequence '\\{}'", c));
                None
            }
        }
    }

    /// Lexes `+=`, `++`, or `+`.
    fn lex_plus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(TokenKind::PlusAssign)
        } else if self.cursor.match_char('+') {
            self.make_token(TokenKind::PlusPlus)
        } else {
            self.make_token(TokenKind::Plus)
        }
    }

    /// Lexes `-=`, `--`, or `-`.
    fn lex_minus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(TokenKind::MinusAssign)
        } else if self.cursor.match_char('-') {
            self.make_token(TokenKind::MinusMinus)
        } else {
            self.make_token(TokenKind::Minus)
        }
    }

    /// Lexes `*=` or `*`.
    fn lex_star(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(TokenKind::StarAssign)
        } else {
            self.make_token(TokenKind::Star)
        }
    }

    /// Lexes `/=` or `/`. Comments were consumed before dispatch.
    fn lex_slash(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(TokenKind::SlashAssign)
        } else {
            self.make_token(TokenKind::Slash)
        }
    }

    /// Lexes `%=` or `%`.
    fn lex_percent(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(TokenKind::PercentAssign)
        } else {
            self.make_token(TokenKind::Percent)
        }
    }

    /// Lexes `==` or `=`.
    fn lex_equals(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(TokenKind::Equal)
        } else {
            self.make_token(TokenKind::Assign)
        }
    }

    /// Lexes `!=` or `!`.
    fn lex_bang(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(TokenKind::NotEqual)
        } else {
            self.make_token(TokenKind::Bang)
        }
    }

    /// Lexes `<<=`, `<<`, `<=`, or `<`.
    fn lex_less(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('<') {
            if self.cursor.match_char('=') {
                self.make_token(TokenKind::LeftShiftAssign)
            } else {
                self.make_token(TokenKind::LeftShift)
            }
        } else if self.cursor.match_char('=') {
            self.make_token(TokenKind::LessEqual)
        } else {
            self.make_token(TokenKind::Less)
        }
    }

    /// Lexes `>>=`, `>>`, `>=`, or `>`.
    fn lex_greater(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('>') {
            if self.cursor.match_char('=') {
                self.make_token(TokenKind::RightShiftAssign)
            } else {
                self.make_token(TokenKind::RightShift)
            }
        } else if self.cursor.match_char('=') {
            self.make_token(TokenKind::GreaterEqual)
        } else {
            self.make_token(TokenKind::Greater)
        }
    }

    /// Lexes `&&`, `&=`, or `&`.
    fn lex_ampersand(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('&') {
            self.make_token(TokenKind::LogicalAnd)
        } else if self.cursor.match_char('=') {
            self.make_token(TokenKind::AmpAssign)
        } else {
            self.make_token(TokenKind::Ampersand)
        }
    }

    /// Lexes `||`, `|=`, or `|`.
    fn lex_pipe(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('|') {
            self.make_token(TokenKind::LogicalOr)
        } else if self.cursor.match_char('=') {
            self.make_token(TokenKind::PipeAssign)
        } else {
            self.make_token(TokenKind::Pipe)
        }
    }

    /// Lexes `^=` or `^`.
    fn lex_caret(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.make_token(TokenKind::CaretAssign)
        } else {
            self.make_token(TokenKind::Caret)
        }
    }

    /// Scans past the body of a block comment whose `/*` was consumed.
    ///
    /// Returns false if the input ends before the terminator.
    fn skip_block_comment(&mut self) -> bool {
        while !self.cursor.is_at_end() {
            if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance();
                self.cursor.advance();
                return true;
            }
            self.cursor.advance();
        }
        false
    }

    /// Reports a lexical error spanning the current token.
    fn report_error(&mut self, message: impl Into<String>) {
        let span = Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        );
        self.handler.error(message, span);
    }
}

/// An iterator over tokens, ending before `Eof`.
impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Returns true for `[A-Za-z_]`.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns true for `[A-Za-z0-9_]`.
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Classifies an integer literal suffix.
///
/// Returns `(unsigned, long)` or `None` for an invalid suffix.
fn classify_suffix(suffix: &str) -> Option<(bool, bool)> {
    match suffix {
        "" => Some((false, false)),
        "l" | "L" => Some((false, true)),
        "u" | "U" => Some((true, false)),
        "ul" | "uL" | "Ul" | "UL" | "lu" | "lU" | "Lu" | "LU" => Some((true, true)),
        _ => None,
    }
}
