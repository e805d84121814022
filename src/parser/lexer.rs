use super::types::{Source, Span, Token, TokenKind};
use crate::error::SyntaxError;

/// Split source text into tokens, honoring `"`/`'` strings and `//` comments.
pub fn tokenize(source: &Source) -> Result<Vec<Token>, SyntaxError> {
    let text = source.text();
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let ch = bytes[i];

        if ch.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if ch == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        let start = i;

        let leading_dot = ch == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
        if ch.is_ascii_digit() || leading_dot {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            let literal = &text[start..i];
            let value: f64 = literal.parse().map_err(|_| {
                SyntaxError::at(source, start, format!("invalid number `{literal}`"))
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                span: Span::new(start, i),
            });
            continue;
        }

        if ch == b'"' || ch == b'\'' {
            let quote = ch;
            i += 1;
            let mut value = String::new();
            let mut escaped = false;
            loop {
                let Some(c) = text[i..].chars().next() else {
                    return Err(SyntaxError::at(source, start, "unterminated string literal"));
                };
                i += c.len_utf8();
                if escaped {
                    value.push(match c {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c as u32 == quote as u32 {
                    break;
                } else if c == '\n' {
                    return Err(SyntaxError::at(source, start, "unterminated string literal"));
                } else {
                    value.push(c);
                }
            }
            tokens.push(Token {
                kind: TokenKind::Str(value),
                span: Span::new(start, i),
            });
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == b'_' || ch == b'$' {
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
            {
                i += 1;
            }
            let word = &text[start..i];
            let kind = match word {
                "let" => TokenKind::Let,
                "var" => TokenKind::Var,
                "debugger" => TokenKind::Debugger,
                "this" => TokenKind::This,
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                "null" => TokenKind::Null,
                "undefined" => TokenKind::Undefined,
                _ => TokenKind::Ident(word.to_string()),
            };
            tokens.push(Token {
                kind,
                span: Span::new(start, i),
            });
            continue;
        }

        let next = bytes.get(i + 1).copied();
        let (kind, len) = match (ch, next) {
            (b'=', Some(b'=')) => (TokenKind::EqEq, 2),
            (b'!', Some(b'=')) => (TokenKind::NotEq, 2),
            (b'<', Some(b'=')) => (TokenKind::Le, 2),
            (b'>', Some(b'=')) => (TokenKind::Ge, 2),
            (b'=', _) => (TokenKind::Assign, 1),
            (b'!', _) => (TokenKind::Bang, 1),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'>', _) => (TokenKind::Gt, 1),
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b'{', _) => (TokenKind::LBrace, 1),
            (b'}', _) => (TokenKind::RBrace, 1),
            (b';', _) => (TokenKind::Semicolon, 1),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'%', _) => (TokenKind::Percent, 1),
            _ => {
                let c = text[i..].chars().next().unwrap_or('?');
                return Err(SyntaxError::at(source, start, format!("unexpected character `{c}`")));
            }
        };
        i += len;
        tokens.push(Token {
            kind,
            span: Span::new(start, i),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(bytes.len(), bytes.len()),
    });
    Ok(tokens)
}
