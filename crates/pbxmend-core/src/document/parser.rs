use std::ops::Range;

use crate::error::CoreError;
use crate::model::ObjectId;

use super::lexer::{line_of, tokenize, Token, TokenKind};
use super::{Document, Field, FieldValue, List, ListItem, Malformation, Object, Scalar, Section};

pub(super) struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    doc: Document,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Result<Self, CoreError> {
        Ok(Self {
            src,
            tokens: tokenize(src)?,
            pos: 0,
            doc: Document::default(),
        })
    }

    pub fn parse(mut self) -> Result<Document, CoreError> {
        self.expect(TokenKind::LBrace)?;
        loop {
            let tok = self.next_sig()?;
            if tok.kind == TokenKind::RBrace {
                break;
            }
            let key = self.key_text(&tok)?;
            self.take_comment();
            self.expect(TokenKind::Equals)?;

            match key.as_str() {
                "objects" if self.peek_kind(0) == Some(TokenKind::LBrace) => {
                    self.next_sig()?;
                    self.parse_objects()?;
                }
                "rootObject" => {
                    let value = self.next_sig()?;
                    self.doc.root_object = Some(ObjectId(self.value_text(&value)?));
                    self.take_comment();
                }
                _ => {
                    let first = self.next_sig()?;
                    self.skip_value(&first)?;
                }
            }
            self.expect(TokenKind::Semicolon)?;
        }

        self.doc.reindex();
        Ok(self.doc)
    }

    fn parse_objects(&mut self) -> Result<(), CoreError> {
        let mut open_section: Option<(String, Range<usize>)> = None;

        loop {
            let tok = self
                .tokens
                .get(self.pos)
                .cloned()
                .ok_or_else(|| self.error_at(self.src.len(), "unterminated objects dictionary"))?;

            match tok.kind {
                TokenKind::Comment => {
                    self.pos += 1;
                    let text = tok.text(self.src);
                    if let Some(name) = section_marker(&text, "Begin ") {
                        open_section = Some((name.to_string(), tok.span.clone()));
                    } else if let Some(name) = section_marker(&text, "End ") {
                        if let Some((open, begin)) = open_section.take() {
                            if open == name {
                                self.doc.sections.push(Section {
                                    name: open,
                                    begin,
                                    end: tok.span.clone(),
                                });
                            }
                        }
                    }
                }
                TokenKind::RBrace => {
                    self.pos += 1;
                    return Ok(());
                }
                TokenKind::Word | TokenKind::Quoted => {
                    self.pos += 1;
                    let section = open_section.as_ref().map(|(name, _)| name.clone());
                    self.parse_object(&tok, section)?;
                }
                _ => return Err(self.unexpected(&tok)),
            }
        }
    }

    fn parse_object(&mut self, key: &Token, section: Option<String>) -> Result<(), CoreError> {
        let id = ObjectId(self.value_text(key)?);
        let comment = self.take_comment();
        self.expect(TokenKind::Equals)?;

        let first = self.next_sig()?;
        if first.kind != TokenKind::LBrace {
            self.skip_value(&first)?;
            self.expect(TokenKind::Semicolon)?;
            return Ok(());
        }

        let (fields, body) = self.parse_object_body(&id, &first)?;
        let semi = self.expect(TokenKind::Semicolon)?;
        self.doc.objects.push(Object {
            id,
            comment,
            span: key.span.start..semi.span.end,
            body,
            section,
            fields,
        });
        Ok(())
    }

    fn parse_object_body(
        &mut self,
        owner: &ObjectId,
        open: &Token,
    ) -> Result<(Vec<Field>, Range<usize>), CoreError> {
        let mut fields = Vec::new();
        loop {
            let tok = self.next_sig()?;
            if tok.kind == TokenKind::RBrace {
                return Ok((fields, open.span.start..tok.span.end));
            }
            let key = self.key_text(&tok)?;
            self.take_comment();
            self.expect(TokenKind::Equals)?;

            let first = self.next_sig()?;
            let value = match first.kind {
                TokenKind::LParen => FieldValue::List(self.parse_list(owner, &key, &first)?),
                TokenKind::LBrace => FieldValue::Dict(self.skip_value(&first)?),
                TokenKind::Word | TokenKind::Quoted => FieldValue::Scalar(Scalar {
                    value: self.value_text(&first)?,
                    span: first.span.clone(),
                    comment: self.take_comment(),
                }),
                _ => return Err(self.unexpected(&first)),
            };
            self.expect(TokenKind::Semicolon)?;
            fields.push(Field { key, value });
        }
    }

    fn parse_list(&mut self, owner: &ObjectId, key: &str, open: &Token) -> Result<List, CoreError> {
        let mut items: Vec<ListItem> = Vec::new();
        loop {
            let tok = self.next_sig()?;
            match tok.kind {
                TokenKind::RParen => {
                    if self.is_premature_terminator() {
                        let semi = self.expect(TokenKind::Semicolon)?;
                        tracing::debug!(
                            "Premature terminator in {owner}.{key} at line {}",
                            line_of(self.src, tok.span.start)
                        );
                        self.doc.malformations.push(Malformation {
                            owner: owner.clone(),
                            key: key.to_string(),
                            span: tok.span.start..semi.span.end,
                            needs_comma: items.last().is_some_and(|item| !item.terminated),
                        });
                        continue;
                    }
                    return Ok(List {
                        open: open.span.start,
                        close: tok.span.start,
                        items,
                    });
                }
                TokenKind::Word | TokenKind::Quoted | TokenKind::LBrace | TokenKind::LParen => {
                    let (value, value_span) = if tok.is_value() {
                        (Some(self.value_text(&tok)?), tok.span.clone())
                    } else {
                        (None, self.skip_value(&tok)?)
                    };
                    let mut end = value_span.end;
                    let comment = self.take_comment_with_end(&mut end);
                    let terminated = match self.peek_kind(0) {
                        Some(TokenKind::Comma) => {
                            end = self.next_sig()?.span.end;
                            true
                        }
                        Some(TokenKind::RParen) => false,
                        _ => {
                            let next = self.next_sig()?;
                            return Err(self.unexpected(&next));
                        }
                    };
                    items.push(ListItem {
                        value,
                        span: value_span.start..end,
                        value_span,
                        comment,
                        terminated,
                    });
                }
                _ => return Err(self.unexpected(&tok)),
            }
        }
    }

    /// `)` followed by `;` and then either another list item or the list's
    /// real `);`, rather than `key =`.
    fn is_premature_terminator(&self) -> bool {
        if self.peek_kind(0) != Some(TokenKind::Semicolon) {
            return false;
        }
        match self.peek_kind(1) {
            Some(TokenKind::Word) | Some(TokenKind::Quoted) => matches!(
                self.peek_kind(2),
                Some(TokenKind::Comma) | Some(TokenKind::RParen)
            ),
            Some(TokenKind::RParen) => self.peek_kind(2) == Some(TokenKind::Semicolon),
            _ => false,
        }
    }

    /// Consume a whole value starting at `first`, returning its span.
    fn skip_value(&mut self, first: &Token) -> Result<Range<usize>, CoreError> {
        match first.kind {
            TokenKind::Word | TokenKind::Quoted => Ok(first.span.clone()),
            TokenKind::LBrace | TokenKind::LParen => {
                let mut depth = 1usize;
                loop {
                    let tok = self.next_sig()?;
                    match tok.kind {
                        TokenKind::LBrace | TokenKind::LParen => depth += 1,
                        TokenKind::RBrace | TokenKind::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                return Ok(first.span.start..tok.span.end);
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => Err(self.unexpected(first)),
        }
    }

    fn take_comment(&mut self) -> Option<String> {
        let mut end = 0;
        self.take_comment_with_end(&mut end)
    }

    fn take_comment_with_end(&mut self, end: &mut usize) -> Option<String> {
        let tok = self.tokens.get(self.pos)?;
        if tok.kind != TokenKind::Comment {
            return None;
        }
        *end = tok.span.end;
        self.pos += 1;
        Some(tok.text(self.src))
    }

    fn peek_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .nth(n)
            .map(|t| t.kind)
    }

    fn next_sig(&mut self) -> Result<Token, CoreError> {
        while let Some(tok) = self.tokens.get(self.pos) {
            self.pos += 1;
            if tok.kind != TokenKind::Comment {
                return Ok(tok.clone());
            }
        }
        Err(self.error_at(self.src.len(), "unexpected end of manifest"))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CoreError> {
        let tok = self.next_sig()?;
        if tok.kind != kind {
            return Err(self.unexpected(&tok));
        }
        Ok(tok)
    }

    fn key_text(&self, tok: &Token) -> Result<String, CoreError> {
        self.value_text(tok)
    }

    fn value_text(&self, tok: &Token) -> Result<String, CoreError> {
        if !tok.is_value() {
            return Err(self.unexpected(tok));
        }
        Ok(tok.text(self.src))
    }

    fn unexpected(&self, tok: &Token) -> CoreError {
        self.error_at(
            tok.span.start,
            format!("unexpected '{}'", &self.src[tok.span.clone()]),
        )
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> CoreError {
        CoreError::Parse {
            line: line_of(self.src, offset),
            message: message.into(),
        }
    }
}

fn section_marker<'t>(comment: &'t str, prefix: &str) -> Option<&'t str> {
    comment.strip_prefix(prefix)?.strip_suffix(" section")
}
