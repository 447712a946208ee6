use std::ops::Range;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    Equals,
    Semicolon,
    Comma,
    Word,
    Quoted,
    Comment,
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn is_value(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::Quoted)
    }

    /// Unquoted text of a word or string token, inner text of a comment.
    pub fn text(&self, src: &str) -> String {
        let raw = &src[self.span.clone()];
        match self.kind {
            TokenKind::Quoted => unescape(&raw[1..raw.len() - 1]),
            TokenKind::Comment => {
                if let Some(inner) = raw.strip_prefix("/*") {
                    inner.strip_suffix("*/").unwrap_or(inner).trim().to_string()
                } else {
                    raw.trim_start_matches('/').trim().to_string()
                }
            }
            _ => raw.to_string(),
        }
    }
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of(src: &str, offset: usize) -> usize {
    src.as_bytes()[..offset.min(src.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

fn parse_error(src: &str, offset: usize, message: impl Into<String>) -> CoreError {
    CoreError::Parse {
        line: line_of(src, offset),
        message: message.into(),
    }
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'{' | b'}' | b'(' | b')' | b'=' | b';' | b',' | b'"')
}

/// Split manifest text into tokens. Comments are kept as tokens because
/// section markers and entry labels live in them.
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, CoreError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let kind = match b {
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'=' => TokenKind::Equals,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = src[i + 2..]
                    .find("*/")
                    .ok_or_else(|| parse_error(src, start, "unterminated comment"))?;
                i += 2 + end + 2;
                tokens.push(Token {
                    kind: TokenKind::Comment,
                    span: start..i,
                });
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Comment,
                    span: start..i,
                });
                continue;
            }
            b'"' => {
                i += 1;
                loop {
                    match bytes.get(i) {
                        None => return Err(parse_error(src, start, "unterminated string")),
                        Some(b'\\') => i += 2,
                        Some(b'"') => break,
                        Some(_) => i += 1,
                    }
                }
                i += 1;
                tokens.push(Token {
                    kind: TokenKind::Quoted,
                    span: start..i,
                });
                continue;
            }
            _ => {
                while i < bytes.len() && !is_delimiter(bytes[i]) {
                    if bytes[i] == b'/' && matches!(bytes.get(i + 1), Some(b'*') | Some(b'/')) {
                        break;
                    }
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Word,
                    span: start..i,
                });
                continue;
            }
        };
        i += 1;
        tokens.push(Token {
            kind,
            span: start..i,
        });
    }

    Ok(tokens)
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_entry_line() {
        let src = "AB12 /* A.swift */ = {isa = PBXFileReference; path = A.swift; sourceTree = \"<group>\"; };";
        let tokens = tokenize(src).unwrap();
        assert_eq!(tokens[0].text(src), "AB12");
        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert_eq!(tokens[1].text(src), "A.swift");
        let quoted = tokens.iter().find(|t| t.kind == TokenKind::Quoted).unwrap();
        assert_eq!(quoted.text(src), "<group>");
    }

    #[test]
    fn test_words_with_slashes_and_header_comment() {
        let src = "// !$*UTF8*$!\n{ path = Core/Models/A.swift; }";
        assert_eq!(
            kinds(src),
            vec![
                TokenKind::Comment,
                TokenKind::LBrace,
                TokenKind::Word,
                TokenKind::Equals,
                TokenKind::Word,
                TokenKind::Semicolon,
                TokenKind::RBrace,
            ]
        );
        let tokens = tokenize(src).unwrap();
        assert_eq!(tokens[4].text(src), "Core/Models/A.swift");
    }

    #[test]
    fn test_escaped_quote() {
        let src = r#"name = "say \"hi\"";"#;
        let tokens = tokenize(src).unwrap();
        assert_eq!(tokens[2].text(src), "say \"hi\"");
    }

    #[test]
    fn test_unterminated_comment_reports_line() {
        let err = tokenize("{\n\n/* open").unwrap_err();
        match err {
            CoreError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
