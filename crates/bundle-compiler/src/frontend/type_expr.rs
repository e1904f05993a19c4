//! Parser for member type expressions.
//!
//! Accepted forms:
//!
//! ```text
//! u32  String  crate::model::Item         primitives and paths
//! Option<T>  Vec<T>                        wrappers
//! HashMap<K, V>  BTreeMap<K, V>            any container ending in `Map`
//! Box<[T]>  NdArray<T, 3>                  arrays of rank 1 and N
//! (A, B)  (A,)                             tuples
//! ```

use crate::diagnostic::{CompilerError, SchemaLocation};
use crate::ir::{PrimitiveKind, TypeExpr};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Path(String),
    Int(usize),
    Lt,
    Gt,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '<' => Token::Lt,
            '>' => Token::Gt,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            c if c.is_ascii_alphanumeric() || c == '_' || c == ':' || c == '#' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == ':' || c == '#' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let word = &text[start..end];
                tokens.push(if word.bytes().all(|b| b.is_ascii_digit()) {
                    Token::Int(word.parse().map_err(|_| format!("'{}' is too large", word))?)
                } else {
                    Token::Path(word.to_string())
                });
                continue;
            }
            other => return Err(format!("unexpected character '{}'", other)),
        };
        tokens.push(token);
        chars.next();
    }
    Ok(tokens)
}

/// A generic argument: a type, a slice type `[T]`, or an integer.
enum Arg {
    Type(TypeExpr),
    Slice(TypeExpr),
    Int(usize),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected {:?}, found {:?}", expected, token)),
            None => Err(format!("expected {:?}, found end of input", expected)),
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, String> {
        match self.next() {
            Some(Token::LParen) => self.parse_tuple(),
            Some(Token::Path(path)) => {
                if path.starts_with(':') || path.ends_with(':') || path.contains(":::") {
                    return Err(format!("malformed path '{}'", path));
                }
                if self.peek() == Some(&Token::Lt) {
                    self.next();
                    let args = self.parse_args()?;
                    generic(&path, args)
                } else if let Some(kind) = PrimitiveKind::from_name(&path) {
                    Ok(TypeExpr::Primitive(kind))
                } else {
                    Ok(TypeExpr::Named(path))
                }
            }
            Some(token) => Err(format!("expected a type, found {:?}", token)),
            None => Err("expected a type, found end of input".to_string()),
        }
    }

    fn parse_tuple(&mut self) -> Result<TypeExpr, String> {
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(&Token::RParen) {
                self.next();
                break;
            }
            items.push(self.parse_type()?);
            match self.next() {
                Some(Token::Comma) => {}
                Some(Token::RParen) => break,
                _ => return Err("expected ',' or ')' in tuple".to_string()),
            }
        }
        if items.is_empty() {
            return Err("the unit type carries no data".to_string());
        }
        Ok(TypeExpr::Tuple(items))
    }

    fn parse_args(&mut self) -> Result<Vec<Arg>, String> {
        let mut args = Vec::new();
        loop {
            let arg = match self.peek() {
                Some(Token::LBracket) => {
                    self.next();
                    let inner = self.parse_type()?;
                    self.expect(Token::RBracket)?;
                    Arg::Slice(inner)
                }
                Some(Token::Int(n)) => {
                    let n = *n;
                    self.next();
                    Arg::Int(n)
                }
                _ => Arg::Type(self.parse_type()?),
            };
            args.push(arg);
            match self.next() {
                Some(Token::Comma) => {}
                Some(Token::Gt) => return Ok(args),
                _ => return Err("expected ',' or '>' in generic arguments".to_string()),
            }
        }
    }
}

fn generic(path: &str, args: Vec<Arg>) -> Result<TypeExpr, String> {
    let name = path.rsplit("::").next().unwrap_or(path);
    let mut args = args.into_iter();
    let (first, second, rest) = (args.next(), args.next(), args.next());
    if rest.is_some() {
        return Err(format!("too many type arguments for '{}'", path));
    }
    match (name, first, second) {
        ("Option", Some(Arg::Type(inner)), None) => Ok(TypeExpr::Option(Box::new(inner))),
        ("Vec", Some(Arg::Type(inner)), None) => Ok(TypeExpr::List(Box::new(inner))),
        ("Box", Some(Arg::Slice(inner)), None) => Ok(TypeExpr::Array {
            rank: 1,
            element: Box::new(inner),
        }),
        ("NdArray", Some(Arg::Type(inner)), Some(Arg::Int(rank))) => {
            if rank < 2 {
                return Err("NdArray needs a rank of at least 2; use Box<[T]> for one dimension".to_string());
            }
            Ok(TypeExpr::Array {
                rank,
                element: Box::new(inner),
            })
        }
        (name, Some(Arg::Type(key)), Some(Arg::Type(value))) if name.ends_with("Map") => {
            Ok(TypeExpr::Map {
                container: path.to_string(),
                key: Box::new(key),
                value: Box::new(value),
            })
        }
        _ => Err(format!("unsupported generic type '{}'", path)),
    }
}

/// Parses one member type expression.
pub fn parse_type_expr(text: &str, location: &SchemaLocation) -> Result<TypeExpr, CompilerError> {
    let fail = |message: String| CompilerError::TypeSyntax {
        record: location.record.clone().unwrap_or_default(),
        member: location.member.clone().unwrap_or_default(),
        type_text: text.to_string(),
        message,
    };

    let tokens = tokenize(text).map_err(&fail)?;
    let mut parser = Parser { tokens, pos: 0 };
    let ty = parser.parse_type().map_err(&fail)?;
    if let Some(token) = parser.peek() {
        return Err(fail(format!("unexpected {:?} after the type", token)));
    }
    tracing::trace!(%location, %ty, "parsed member type");
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<TypeExpr, CompilerError> {
        parse_type_expr(text, &SchemaLocation::new("test.json").record("R").member("m"))
    }

    #[test]
    fn test_primitives_and_paths() {
        assert_eq!(parse("u64").unwrap(), TypeExpr::Primitive(PrimitiveKind::U64));
        assert_eq!(parse(" String ").unwrap(), TypeExpr::Primitive(PrimitiveKind::String));
        assert_eq!(
            parse("crate::model::Item").unwrap(),
            TypeExpr::Named("crate::model::Item".to_string())
        );
    }

    #[test]
    fn test_nested_generics() {
        let ty = parse("Option<Vec<HashMap<String, Box<[i32]>>>>").unwrap();
        assert_eq!(ty.to_string(), "Option<Vec<HashMap<String, Box<[i32]>>>>");

        let ty = parse("std::collections::BTreeMap<u8, (bool, char)>").unwrap();
        assert!(matches!(ty, TypeExpr::Map { ref container, .. } if container == "std::collections::BTreeMap"));
    }

    #[test]
    fn test_arrays() {
        assert_eq!(
            parse("NdArray<f32, 3>").unwrap(),
            TypeExpr::Array {
                rank: 3,
                element: Box::new(TypeExpr::Primitive(PrimitiveKind::F32)),
            }
        );
        assert!(parse("NdArray<f32, 1>").is_err());
        assert!(parse("Box<u8>").is_err());
    }

    #[test]
    fn test_tuples() {
        assert_eq!(
            parse("(u8,)").unwrap(),
            TypeExpr::Tuple(vec![TypeExpr::Primitive(PrimitiveKind::U8)])
        );
        assert_eq!(parse("(u8, Item)").unwrap().to_string(), "(u8, Item)");
        assert!(parse("()").is_err());
    }

    #[test]
    fn test_errors_carry_location() {
        let err = parse("Vec<u8").unwrap_err();
        match err {
            CompilerError::TypeSyntax { record, member, type_text, .. } => {
                assert_eq!(record, "R");
                assert_eq!(member, "m");
                assert_eq!(type_text, "Vec<u8");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(parse("Vec<u8> extra").is_err());
        assert!(parse("Rc<u8>").is_err());
        assert!(parse("u8 | u16").is_err());
    }
}
