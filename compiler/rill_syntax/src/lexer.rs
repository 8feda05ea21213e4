//! Lexer for the Rill language

use crate::token::{Token, TokenType};
use memchr::memchr;
use rill_common::{CompileResult, Position, Span, Stage};
use unicode_xid::UnicodeXID;

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    current_pos: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0, current_pos: Position::origin() }
    }

    /// Tokenizes the entire input, ending with an `EndOfFile` token.
    pub fn tokenize(&mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenType::EndOfFile;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> CompileResult<Token> {
        self.skip_whitespace_and_comments()?;

        let start = self.current_pos;
        let Some(c) = self.current_char() else {
            return Ok(Token::new(TokenType::EndOfFile, Span::point(start)));
        };

        let token_type = match c {
            '(' => self.single(TokenType::LeftParen),
            ')' => self.single(TokenType::RightParen),
            '{' => self.single(TokenType::LeftBrace),
            '}' => self.single(TokenType::RightBrace),
            ',' => self.single(TokenType::Comma),
            ';' => self.single(TokenType::Semicolon),
            '+' => self.single(TokenType::Plus),
            '-' => self.single(TokenType::Minus),
            '*' => self.single(TokenType::Multiply),
            '/' => self.single(TokenType::Divide),
            '%' => self.single(TokenType::Modulo),
            '<' => self.single(TokenType::Less),
            '>' => self.single(TokenType::Greater),
            '=' => self.single(TokenType::Assign),
            ':' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    TokenType::Define
                } else {
                    return Err(Stage::Lex.error_at(start, "unexpected character ':'"));
                }
            }
            '"' => self.scan_string(start)?,
            c if c.is_ascii_digit() => self.scan_number(start)?,
            c if UnicodeXID::is_xid_start(c) || c == '_' => self.scan_identifier(),
            other => {
                return Err(
                    Stage::Lex.error_at(start, format!("unexpected character {:?}", other))
                );
            }
        };

        Ok(Token::new(token_type, Span::new(start, self.current_pos)))
    }

    fn single(&mut self, token_type: TokenType) -> TokenType {
        self.advance();
        token_type
    }

    fn scan_identifier(&mut self) -> TokenType {
        let begin = self.position;
        while let Some(c) = self.current_char() {
            if UnicodeXID::is_xid_continue(c) || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.input[begin..self.position];
        TokenType::keyword(text).unwrap_or_else(|| TokenType::Identifier(text.to_string()))
    }

    fn scan_number(&mut self, start: Position) -> CompileResult<TokenType> {
        if self.input[self.position..].starts_with("0x")
            || self.input[self.position..].starts_with("0X")
        {
            self.advance();
            self.advance();
            let begin = self.position;
            while self.current_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            }
            if begin == self.position {
                return Err(Stage::Lex.error_at(start, "hexadecimal literal has no digits"));
            }
            let text = self.input[begin..self.position].to_string();
            return Ok(TokenType::IntegerLiteral { text, radix: 16 });
        }

        let begin = self.position;
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let text = self.input[begin..self.position].to_string();
        Ok(TokenType::IntegerLiteral { text, radix: 10 })
    }

    fn scan_string(&mut self, start: Position) -> CompileResult<TokenType> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.current_char() {
                None => {
                    return Err(Stage::Lex.error_at(start, "unterminated string literal"));
                }
                Some('"') => {
                    self.advance();
                    return Ok(TokenType::StringLiteral(text));
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.current_char() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('0') => '\0',
                        other => {
                            return Err(Stage::Lex.error_at(
                                self.current_pos,
                                format!(
                                    "unknown escape sequence {:?}",
                                    other.map(String::from).unwrap_or_default()
                                ),
                            ));
                        }
                    };
                    text.push(escaped);
                    self.advance();
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> CompileResult<()> {
        loop {
            match self.current_char() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_char() == Some('/') => {
                    // line comment: jump to the next newline
                    let rest = &self.input.as_bytes()[self.position..];
                    match memchr(b'\n', rest) {
                        Some(offset) => self.advance_bytes(offset),
                        None => self.advance_bytes(rest.len()),
                    }
                }
                Some('/') if self.peek_char() == Some('*') => {
                    let start = self.current_pos;
                    self.advance();
                    self.advance();
                    loop {
                        match self.current_char() {
                            None => {
                                return Err(
                                    Stage::Lex.error_at(start, "unterminated block comment")
                                );
                            }
                            Some('*') if self.peek_char() == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => self.advance(),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_char(&self) -> Option<char> {
        let mut chars = self.input[self.position..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            self.position += c.len_utf8();
            if c == '\n' {
                self.current_pos.line += 1;
                self.current_pos.column = 1;
            } else {
                self.current_pos.column += 1;
            }
        }
    }

    /// Advances over a run of bytes known to contain no newline.
    fn advance_bytes(&mut self, count: usize) {
        self.position += count;
        self.current_pos.column += count as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenType> {
        Lexer::new(source).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("func main var x"),
            vec![
                TokenType::KeywordFunc,
                TokenType::Identifier("main".into()),
                TokenType::KeywordVar,
                TokenType::Identifier("x".into()),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn integer_literals_keep_radix() {
        assert_eq!(
            kinds("42 0xB"),
            vec![
                TokenType::IntegerLiteral { text: "42".into(), radix: 10 },
                TokenType::IntegerLiteral { text: "B".into(), radix: 16 },
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""hi\n" "a\"b""#),
            vec![
                TokenType::StringLiteral("hi\n".into()),
                TokenType::StringLiteral("a\"b".into()),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let source = "a // trailing\n/* block\ncomment */ b";
        assert_eq!(
            kinds(source),
            vec![
                TokenType::Identifier("a".into()),
                TokenType::Identifier("b".into()),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn operators_and_define() {
        assert_eq!(
            kinds("a := b + c < d"),
            vec![
                TokenType::Identifier("a".into()),
                TokenType::Define,
                TokenType::Identifier("b".into()),
                TokenType::Plus,
                TokenType::Identifier("c".into()),
                TokenType::Less,
                TokenType::Identifier("d".into()),
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn positions_track_lines() {
        let tokens = Lexer::new("a\n  b").tokenize().unwrap();
        assert_eq!(tokens[0].span.start.line, 1);
        assert_eq!(tokens[1].span.start.line, 2);
        assert_eq!(tokens[1].span.start.column, 3);
    }

    #[test]
    fn stray_character_is_an_error() {
        let err = Lexer::new("a $ b").tokenize().unwrap_err();
        assert_eq!(err.stage, Stage::Lex);
        assert_eq!(err.pos, Some(Position::new(1, 3)));
        assert!(err.to_string().contains("unexpected character"));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::new("\"oops").tokenize().unwrap_err();
        assert!(err.to_string().contains("unterminated string"));
    }
}
