use std::fmt;

use crate::error::ParseError;
use TokenKind::*;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum TokenKind {
    SOF,
    END_OF_INPUT,
    BANG,
    DOLLAR,
    AMP,
    PAREN_L,
    PAREN_R,
    SPREAD,
    COLON,
    EQUALS,
    AT,
    BRACKET_L,
    BRACKET_R,
    BRACE_L,
    PIPE,
    BRACE_R,
    NAME,
    INT,
    FLOAT,
    STRING,
    BLOCK_STRING,
}

/// One-based line and column of a character in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub value: Option<String>,
    pub position: Position,
}

impl Token {
    fn simple_token(kind: TokenKind, index: usize, position: Position) -> Token {
        Token {
            kind,
            start: index,
            end: index + 1,
            value: None,
            position,
        }
    }

    /// The token text for names, numbers and strings, empty for punctuators.
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

/// On-demand tokenizer. Whitespace, commas and comments are skipped.
#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    line_starts: Vec<usize>,
    current_index: usize,
    token: Token,
    prev: Token,
}

impl Lexer {
    pub fn new(source: &str) -> Lexer {
        let chars: Vec<char> = source.chars().collect();
        let mut line_starts = vec![0];
        for (index, c) in chars.iter().enumerate() {
            let crlf = *c == '\r' && chars.get(index + 1) == Some(&'\n');
            if *c == '\n' || (*c == '\r' && !crlf) {
                line_starts.push(index + 1);
            }
        }
        let start_of_file = Token {
            kind: SOF,
            start: 0,
            end: 0,
            value: None,
            position: Position { line: 1, column: 1 },
        };
        Lexer {
            chars,
            line_starts,
            current_index: 0,
            token: start_of_file.clone(),
            prev: start_of_file,
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    pub fn prev_token(&self) -> &Token {
        &self.prev
    }

    pub fn advance(&mut self) -> Result<&Token, ParseError> {
        if self.token.kind == END_OF_INPUT {
            return Ok(&self.token);
        }
        let new_token = self.read_next(self.current_index)?;
        self.current_index = new_token.end;
        self.prev = std::mem::replace(&mut self.token, new_token);
        Ok(&self.token)
    }

    /// The token after the current one, without consuming anything.
    pub fn lookahead(&self) -> Result<Token, ParseError> {
        if self.token.kind == END_OF_INPUT {
            return Ok(self.token.clone());
        }
        self.read_next(self.current_index)
    }

    pub fn position(&self, index: usize) -> Position {
        let line = match self.line_starts.binary_search(&index) {
            Ok(line) => line,
            Err(next_line) => next_line - 1,
        };
        Position {
            line: line + 1,
            column: index - self.line_starts[line] + 1,
        }
    }

    fn error<T>(&self, message: impl Into<String>, index: usize) -> Result<T, ParseError> {
        Err(ParseError::new(message, self.position(index)))
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    fn read_next(&self, index: usize) -> Result<Token, ParseError> {
        let index = self.position_after_ignored(index);
        if index >= self.chars.len() {
            return Ok(Token {
                kind: END_OF_INPUT,
                start: self.chars.len(),
                end: self.chars.len(),
                value: None,
                position: self.position(self.chars.len()),
            });
        }
        self.read_token(index)
    }

    fn position_after_ignored(&self, mut index: usize) -> usize {
        while let Some(c) = self.char_at(index) {
            match c {
                '\u{0020}' | '\u{0009}' | '\u{feff}' | ',' | '\n' | '\r' => index += 1,
                '#' => {
                    index += 1;
                    index += self.count_while(index, |c| c != '\n' && c != '\r');
                }
                _ => break,
            }
        }
        index
    }

    fn count_while<F>(&self, start: usize, while_fn: F) -> usize
    where
        F: Fn(char) -> bool,
    {
        self.chars[start.min(self.chars.len())..]
            .iter()
            .take_while(|c| while_fn(**c))
            .count()
    }

    fn range_string(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    fn read_token(&self, index: usize) -> Result<Token, ParseError> {
        let position = self.position(index);
        let kind = match self.chars[index] {
            '{' => BRACE_L,
            '}' => BRACE_R,
            '!' => BANG,
            '|' => PIPE,
            ':' => COLON,
            '[' => BRACKET_L,
            ']' => BRACKET_R,
            '$' => DOLLAR,
            '@' => AT,
            '&' => AMP,
            '(' => PAREN_L,
            ')' => PAREN_R,
            '=' => EQUALS,
            '"' => return self.read_string_or_block_string(index),
            '.' => return self.read_spread(index),
            'A'..='Z' | '_' | 'a'..='z' => return Ok(self.read_name(index)),
            '0'..='9' | '-' => return self.read_number(index),
            c => {
                return self.error(
                    format!("unexpected character '{}'", c.escape_default()),
                    index,
                )
            }
        };
        Ok(Token::simple_token(kind, index, position))
    }

    fn read_spread(&self, index: usize) -> Result<Token, ParseError> {
        if self.char_at(index + 1) != Some('.') || self.char_at(index + 2) != Some('.') {
            return self.error("unexpected character '.'", index);
        }
        Ok(Token {
            kind: SPREAD,
            start: index,
            end: index + 3,
            value: None,
            position: self.position(index),
        })
    }

    fn read_name(&self, index: usize) -> Token {
        let counter =
            self.count_while(index, |c| matches!(c, '_' | '0'..='9' | 'A'..='Z' | 'a'..='z'));
        Token {
            kind: NAME,
            start: index,
            end: index + counter,
            value: Some(self.range_string(index, index + counter)),
            position: self.position(index),
        }
    }

    fn read_number(&self, index: usize) -> Result<Token, ParseError> {
        let mut position = index;
        let mut is_float = false;
        if self.char_at(position) == Some('-') {
            position += 1;
        }
        if self.char_at(position) == Some('0') {
            position += 1;
            if let Some(c @ '0'..='9') = self.char_at(position) {
                return self.error(format!("invalid number, unexpected digit after 0: '{}'", c), position);
            }
        } else {
            position = self.read_digits(position)?;
        }
        if self.char_at(position) == Some('.') {
            is_float = true;
            position = self.read_digits(position + 1)?;
        }
        if let Some('e') | Some('E') = self.char_at(position) {
            is_float = true;
            position += 1;
            if let Some('+') | Some('-') = self.char_at(position) {
                position += 1;
            }
            position = self.read_digits(position)?;
        }
        if let Some(c @ ('.' | '_' | 'A'..='Z' | 'a'..='z')) = self.char_at(position) {
            return self.error(format!("invalid number, expected digit but got '{}'", c), position);
        }
        Ok(Token {
            kind: if is_float {
                FLOAT
            } else {
                INT
            },
            start: index,
            end: position,
            value: Some(self.range_string(index, position)),
            position: self.position(index),
        })
    }

    fn read_digits(&self, start: usize) -> Result<usize, ParseError> {
        match self.char_at(start) {
            Some('0'..='9') => Ok(start + self.count_while(start, |c| c.is_ascii_digit())),
            Some(c) => self.error(format!("invalid number, expected digit but got '{}'", c), start),
            None => self.error("invalid number, expected digit but got end of input", start),
        }
    }

    fn read_string_or_block_string(&self, index: usize) -> Result<Token, ParseError> {
        if self.is_triple_quote(index) {
            self.read_block_string(index)
        } else {
            self.read_string(index)
        }
    }

    fn read_string(&self, index: usize) -> Result<Token, ParseError> {
        // we have at least "
        let mut value = String::new();
        let mut position = index + 1;
        while let Some(c) = self.char_at(position) {
            match c {
                '"' => {
                    return Ok(Token {
                        kind: STRING,
                        start: index,
                        end: position + 1,
                        value: Some(value),
                        position: self.position(index),
                    });
                }
                '\n' | '\r' => break,
                '\\' => {
                    let (escaped, length) = self.read_escape(position)?;
                    value.push(escaped);
                    position += length;
                }
                c if c < '\u{0020}' && c != '\u{0009}' => {
                    return self.error(
                        format!("invalid character within string: {}", c.escape_unicode()),
                        position,
                    );
                }
                c => {
                    value.push(c);
                    position += 1;
                }
            }
        }
        self.error("unterminated string", index)
    }

    /// Decodes the escape sequence starting at the backslash at `index`.
    fn read_escape(&self, index: usize) -> Result<(char, usize), ParseError> {
        let escaped = match self.char_at(index + 1) {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{0008}',
            Some('f') => '\u{000c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => {
                let hex: String = self.chars[(index + 2).min(self.chars.len())..]
                    .iter()
                    .take(4)
                    .collect();
                return match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(c) if hex.len() == 4 => Ok((c, 6)),
                    _ => self.error(format!("invalid unicode escape sequence \\u{}", hex), index),
                };
            }
            _ => return self.error("invalid escape sequence", index),
        };
        Ok((escaped, 2))
    }

    fn read_block_string(&self, index: usize) -> Result<Token, ParseError> {
        // we know it starts with triple quote
        let mut position = index + 3;
        let mut chunk_start = position;
        let mut raw_value = String::new();
        while position < self.chars.len() {
            if self.is_triple_quote(position) {
                raw_value.push_str(&self.range_string(chunk_start, position));
                return Ok(Token {
                    kind: BLOCK_STRING,
                    start: index,
                    end: position + 3,
                    value: Some(block_string_value(&raw_value)),
                    position: self.position(index),
                });
            }
            let code = self.chars[position];
            if code < '\u{0020}' && !matches!(code, '\u{0009}' | '\u{000a}' | '\u{000d}') {
                return self.error(
                    format!("invalid character within string: {}", code.escape_unicode()),
                    position,
                );
            }
            if code == '\\' && self.is_triple_quote(position + 1) {
                raw_value.push_str(&self.range_string(chunk_start, position));
                raw_value.push_str("\"\"\"");
                position += 4;
                chunk_start = position;
            } else {
                position += 1;
            }
        }
        self.error("unterminated block string", index)
    }

    fn is_triple_quote(&self, position: usize) -> bool {
        (0..3).all(|offset| self.char_at(position + offset) == Some('"'))
    }
}

/// Strips the common indentation and the blank leading and trailing lines of
/// a raw block string.
pub fn block_string_value(raw: &str) -> String {
    let lines: Vec<&str> = raw
        .split("\r\n")
        .flat_map(|l| l.split(&['\n', '\r'][..]))
        .collect();
    let common_indent = lines
        .iter()
        .skip(1)
        .filter(|line| !is_blank(line))
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);
    let mut lines: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.to_string()
            } else {
                line.chars().skip(common_indent).collect()
            }
        })
        .collect();
    while lines.first().map_or(false, |l| is_blank(l)) {
        lines.remove(0);
    }
    while lines.last().map_or(false, |l| is_blank(l)) {
        lines.pop();
    }
    lines.join("\n")
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

#[cfg(test)]
mod tests {
    macro_rules! test_token {
        ($name:ident $source:literal $token_kind:ident) => {
            #[test]
            fn $name() {
                let tokens = tokens($source);
                assert_eq!(tokens[0].kind, $token_kind);
            }
        };
        ($name:ident $source:literal $token_kind:ident $value:literal) => {
            #[test]
            fn $name() {
                let tokens = tokens($source);
                assert_eq!(tokens[0].kind, $token_kind);
                assert_eq!(tokens[0].value, Some(String::from($value)));
            }
        };
    }

    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut result = Vec::new();
        loop {
            let token = lexer.advance().unwrap().clone();
            if token.kind == END_OF_INPUT {
                return result;
            }
            result.push(token);
        }
    }

    fn lex_error(source: &str) -> ParseError {
        let mut lexer = Lexer::new(source);
        loop {
            match lexer.advance() {
                Ok(token) if token.kind == END_OF_INPUT => panic!("no error in {}", source),
                Ok(_) => {}
                Err(error) => return error,
            }
        }
    }

    test_token!(name_starting_with_underscore "_someName" NAME "_someName");
    test_token!(block_string r#""""string""""# BLOCK_STRING "string");
    test_token!(block_string_triple_quote_escaped r#""""string\"""""""# BLOCK_STRING r#"string""""#);
    test_token!(bang "!" BANG);
    test_token!(equals "=" EQUALS);
    test_token!(pipe "|" PIPE);
    test_token!(at "@" AT);
    test_token!(ampersand "&" AMP);
    test_token!(spread "..." SPREAD);
    test_token!(integer "1234" INT "1234");
    test_token!(zero "0" INT "0");
    test_token!(minus_zero "-0" INT "-0");
    test_token!(minus_int "-4" INT "-4");
    test_token!(float "0.123" FLOAT "0.123");
    test_token!(float_e_notation "123e4" FLOAT "123e4");
    test_token!(float_e_notation_2 "57.123E4" FLOAT "57.123E4");
    test_token!(float_e_notation_3 "123e-4" FLOAT "123e-4");
    test_token!(float_e_notation_4 "-1.123E+4" FLOAT "-1.123E+4");
    test_token!(string_with_escapes r#""a\"b\nA""# STRING "a\"b\nA");

    #[test]
    fn skips_whitespace_commas_and_comments() {
        let kinds: Vec<TokenKind> = tokens(" #hello\n , { foo } # trailing")
            .iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(kinds, vec![BRACE_L, NAME, BRACE_R]);
    }

    #[test]
    fn brackets_and_parentheses() {
        let kinds: Vec<TokenKind> = tokens("[]()").iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BRACKET_L,
                BRACKET_R,
                PAREN_L,
                PAREN_R
            ]
        );
    }

    #[test]
    fn lookahead_does_not_consume() {
        let mut lexer = Lexer::new("type Foo");
        lexer.advance().unwrap();
        assert_eq!(lexer.lookahead().unwrap().value(), "Foo");
        assert_eq!(lexer.current_token().value(), "type");
        lexer.advance().unwrap();
        assert_eq!(lexer.prev_token().value(), "type");
        assert_eq!(lexer.current_token().value(), "Foo");
    }

    #[test]
    fn block_string_removes_common_indentation() {
        let tokens = tokens("\"\"\"\n    Hello,\n      World!\n\n    Yours\n  \"\"\"");
        assert_eq!(tokens[0].value(), "Hello,\n  World!\n\nYours");
    }

    #[test]
    fn correct_position() {
        let tokens = tokens(
            r" #comment1
        type Foo {
          #comment2
            field: Int #comment3
    }
        ",
        );
        let positions: Vec<(usize, usize)> = tokens
            .iter()
            .map(|t| (t.position.line, t.position.column))
            .collect();
        assert_eq!(
            positions,
            vec![(2, 9), (2, 14), (2, 18), (4, 13), (4, 18), (4, 20), (5, 5)]
        );
    }

    #[test]
    fn reports_unterminated_string() {
        let error = lex_error("\n  \"abc");
        assert_eq!(error.message, "unterminated string");
        assert_eq!(error.position, Position { line: 2, column: 3 });
    }

    #[test]
    fn rejects_leading_zero() {
        let error = lex_error("0123");
        assert!(error.message.starts_with("invalid number"));
    }

    #[test]
    fn rejects_unexpected_character() {
        let error = lex_error("type ?");
        assert_eq!(error.message, "unexpected character '?'");
        assert_eq!(error.position.column, 6);
    }
}
