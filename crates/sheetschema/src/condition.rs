//! Visibility conditions
//!
//! A Visibility cell either holds a plain value (read as a boolean constant)
//! or a formula in a small grammar:
//!
//! ```text
//! rule  := TRUE | FALSE | exact | NOT ( exact )
//! exact := EXACT ( arg , arg )      one arg a cell reference, the other a literal
//! ```
//!
//! Keywords are case-sensitive. Anything else is rejected as a whole.
//! References may name their own worksheet (`'Sensor'!G5`) but no other.

use sheetschema_core::{CellAddress, CellValue};

use crate::convert::to_bool;
use crate::dictionary::Header;
use crate::error::{CompileError, CompileResult, ErrorTarget, ParseError};
use crate::header::HeaderTable;
use crate::model::{Condition, SchemaField};
use crate::options::CompilerOptions;
use crate::source::CellSource;

/// A parsed visibility cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityRule {
    Constant(bool),
    /// Show when the answer of `field` equals `value` (hide, if `invert`)
    Exact {
        field: String,
        value: String,
        invert: bool,
    },
}

/// Parse a visibility formula (with or without its leading `=`) found on
/// `worksheet`
pub fn parse_visibility(formula: &str, worksheet: &str) -> CompileResult<VisibilityRule> {
    let text = formula.trim();
    let text = text.strip_prefix('=').unwrap_or(text);

    let mut parser = RuleParser::new(text, worksheet);
    let rule = parser.parse_rule()?;
    if parser.current != Token::Eof {
        return Err(parser.unexpected());
    }
    Ok(rule)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    String(String),
    Number(String),
    LeftParen,
    RightParen,
    Comma,
    Invalid(char),
    Eof,
}

struct RuleParser<'a> {
    input: &'a str,
    worksheet: &'a str,
    pos: usize,
    current: Token,
}

impl<'a> RuleParser<'a> {
    fn new(input: &'a str, worksheet: &'a str) -> Self {
        let mut parser = Self {
            input,
            worksheet,
            pos: 0,
            current: Token::Eof,
        };
        parser.advance_token();
        parser
    }

    // === Token scanning ===

    fn advance_token(&mut self) {
        self.current = self.scan_token();
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Token::Eof;
        };

        match c {
            '(' => {
                self.advance();
                Token::LeftParen
            }
            ')' => {
                self.advance();
                Token::RightParen
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            '"' => self.scan_string(),
            '\'' => self.scan_quoted_reference(),
            c if c.is_ascii_digit() || c == '-' || c == '.' => self.scan_number(),
            c if c.is_alphabetic() || c == '$' || c == '_' => self.scan_identifier(),
            c => {
                self.advance();
                Token::Invalid(c)
            }
        }
    }

    fn scan_string(&mut self) -> Token {
        self.advance();

        let mut s = String::new();
        while let Some(c) = self.peek_char() {
            self.advance();
            if c == '"' {
                // "" is an escaped quote
                if self.peek_char() == Some('"') {
                    s.push('"');
                    self.advance();
                } else {
                    return Token::String(s);
                }
            } else {
                s.push(c);
            }
        }
        Token::Invalid('"')
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        self.advance();
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_digit() || c == '.')
        {
            self.advance();
        }
        Token::Number(self.input[start..self.pos].to_string())
    }

    /// `'Sheet name'!A1`
    fn scan_quoted_reference(&mut self) -> Token {
        let start = self.pos;
        self.advance();
        while let Some(c) = self.peek_char() {
            self.advance();
            if c == '\'' {
                if self.peek_char() == Some('\'') {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if self.peek_char() != Some('!') {
            return Token::Invalid('\'');
        }
        self.advance();
        self.scan_identifier_from(start)
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        self.scan_identifier_from(start)
    }

    fn scan_identifier_from(&mut self, start: usize) -> Token {
        while self
            .peek_char()
            .map_or(false, |c| c.is_alphanumeric() || matches!(c, '$' | '_' | '.' | '!'))
        {
            self.advance();
        }
        Token::Ident(self.input[start..self.pos].to_string())
    }

    // === Helpers ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, char::is_whitespace) {
            self.advance();
        }
    }

    fn consume(&mut self) -> Token {
        let token = std::mem::replace(&mut self.current, Token::Eof);
        self.advance_token();
        token
    }

    fn expect(&mut self, expected: Token) -> CompileResult<()> {
        if self.current == expected {
            self.consume();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> CompileError {
        let found = match &self.current {
            Token::Ident(s) => s.clone(),
            Token::String(s) => format!("\"{}\"", s),
            Token::Number(s) => s.clone(),
            Token::LeftParen => "(".into(),
            Token::RightParen => ")".into(),
            Token::Comma => ",".into(),
            Token::Invalid(c) => c.to_string(),
            Token::Eof => "end of formula".into(),
        };
        CompileError::Condition(format!("unexpected {} in {}", found, self.input))
    }

    // === Grammar ===

    fn parse_rule(&mut self) -> CompileResult<VisibilityRule> {
        match self.consume() {
            Token::Ident(name) => match name.as_str() {
                "TRUE" => Ok(VisibilityRule::Constant(true)),
                "FALSE" => Ok(VisibilityRule::Constant(false)),
                "EXACT" => self.parse_exact(false),
                "NOT" => {
                    self.expect(Token::LeftParen)?;
                    match self.consume() {
                        Token::Ident(inner) if inner == "EXACT" => {}
                        _ => {
                            return Err(CompileError::Condition(format!(
                                "NOT must wrap EXACT in {}",
                                self.input
                            )))
                        }
                    }
                    let rule = self.parse_exact(true)?;
                    self.expect(Token::RightParen)?;
                    Ok(rule)
                }
                other => Err(CompileError::Condition(format!(
                    "unsupported function {} in {}",
                    other, self.input
                ))),
            },
            _ => Err(CompileError::Condition(format!(
                "unsupported formula {}",
                self.input
            ))),
        }
    }

    /// Arguments of EXACT, after the function name
    fn parse_exact(&mut self, invert: bool) -> CompileResult<VisibilityRule> {
        self.expect(Token::LeftParen)?;
        let first = self.parse_argument()?;
        self.expect(Token::Comma)?;
        let second = self.parse_argument()?;
        self.expect(Token::RightParen)?;

        let (field, value) = match (first, second) {
            (Argument::Reference(field), Argument::Literal(value))
            | (Argument::Literal(value), Argument::Reference(field)) => (field, value),
            _ => {
                return Err(CompileError::Condition(format!(
                    "EXACT needs one cell reference and one value in {}",
                    self.input
                )))
            }
        };

        Ok(VisibilityRule::Exact {
            field,
            value,
            invert,
        })
    }

    fn parse_argument(&mut self) -> CompileResult<Argument> {
        match self.consume() {
            Token::String(s) => Ok(Argument::Literal(s)),
            Token::Number(n) => Ok(Argument::Literal(n)),
            Token::Ident(name) if name == "TRUE" || name == "FALSE" => Ok(Argument::Literal(name)),
            Token::Ident(name) => {
                let cell = match name.rsplit_once('!') {
                    Some((sheet, cell)) => {
                        if !same_sheet(sheet, self.worksheet) {
                            return Err(CompileError::Condition(format!(
                                "{} refers to another worksheet",
                                name
                            )));
                        }
                        cell
                    }
                    None => name.as_str(),
                };
                let address = CellAddress::parse(cell).map_err(|_| {
                    CompileError::Condition(format!("{} is not a cell reference", name))
                })?;
                Ok(Argument::Reference(address.to_path()))
            }
            _ => Err(CompileError::Condition(format!(
                "expected a cell reference or a value in {}",
                self.input
            ))),
        }
    }
}

enum Argument {
    Reference(String),
    Literal(String),
}

/// Sheet names compare case-insensitively; quoted names unescape `''`
fn same_sheet(qualifier: &str, worksheet: &str) -> bool {
    let name = match qualifier
        .strip_prefix('\'')
        .and_then(|q| q.strip_suffix('\''))
    {
        Some(quoted) => quoted.replace("''", "'"),
        None => qualifier.to_string(),
    };
    name.to_lowercase() == worksheet.to_lowercase()
}

/// Reads the Visibility column into conditions and hidden flags
pub struct ConditionReader<'a, S: CellSource> {
    source: &'a S,
    headers: &'a HeaderTable,
    options: &'a CompilerOptions,
}

impl<'a, S: CellSource> ConditionReader<'a, S> {
    pub fn new(source: &'a S, headers: &'a HeaderTable, options: &'a CompilerOptions) -> Self {
        Self {
            source,
            headers,
            options,
        }
    }

    /// Apply the visibility cell of `row` to the fields it governs.
    ///
    /// Formula rules are merged into `conditions` by (driving field, value).
    pub fn read(
        &self,
        row: u32,
        fields: &mut [SchemaField],
        conditions: &mut Vec<Condition>,
    ) -> Option<ParseError> {
        let col = self.headers.column(Header::Visibility)?;
        let answer_col = self.headers.column(Header::Answer)?;
        let name = CellAddress::new(row, answer_col).to_path();
        let index = fields.iter().position(|f| f.name == name)?;

        let rule = match self.source.formula(row, col) {
            Some(formula) => match parse_visibility(&formula, self.source.name()) {
                Ok(rule) => rule,
                Err(err) => {
                    return Some(
                        ParseError::from_error(self.source.name(), &err)
                            .at(row, col)
                            .with_target(ErrorTarget::Condition(name)),
                    )
                }
            },
            None => match self.source.value(row, col) {
                CellValue::Boolean(b) => VisibilityRule::Constant(b),
                value if value.is_blank() => return None,
                value => VisibilityRule::Constant(to_bool(
                    &value.to_text(),
                    &self.options.dictionary,
                )),
            },
        };

        match rule {
            VisibilityRule::Constant(true) => None,
            VisibilityRule::Constant(false) => {
                fields[index].hidden = true;
                None
            }
            VisibilityRule::Exact {
                field,
                value,
                invert,
            } => {
                if !fields.iter().any(|f| f.name == field) {
                    return Some(
                        ParseError::from_error(self.source.name(), &CompileError::FieldNotFound(field))
                            .at(row, col)
                            .with_target(ErrorTarget::Field(name)),
                    );
                }
                match conditions.iter_mut().find(|c| c.same_rule(&field, &value)) {
                    Some(condition) => condition.add_target(name, invert),
                    None => {
                        let mut condition = Condition::new(field, value);
                        condition.add_target(name, invert);
                        conditions.push(condition);
                    }
                }
                None
            }
        }
    }
}
