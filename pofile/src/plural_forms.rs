/* Copyright (C) 2018 Olivier Goffart <ogoffart@woboq.com>

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense,
and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so,
subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or substantial
portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES
OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
*/

//! The `Plural-Forms` header value.
//!
//! Only a single shape of rule is understood:
//!
//! ```text
//! nplurals=<digits>; plural=(n <op> <digits>);
//! ```
//!
//! where `<op>` is one of `!=`, `==`, `<`, `<=` or `>`. The rule selects
//! between two forms: form 1 when the comparison holds, form 0 otherwise.

use std::fmt;
use std::str::FromStr;

use crate::error::{one_of, ParseErrorKind};

const VALID_PLURAL_FORMS: &str = "a valid plural forms value";

/// The comparison applied between the count `n` and the rule's operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralOperator {
    NotEqual,
    Equal,
    Smaller,
    SmallerOrEqual,
    Greater,
}

const OPERATORS: [(&str, PluralOperator); 5] = [
    ("!=", PluralOperator::NotEqual),
    ("==", PluralOperator::Equal),
    ("<", PluralOperator::Smaller),
    ("<=", PluralOperator::SmallerOrEqual),
    (">", PluralOperator::Greater),
];

impl PluralOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotEqual => "!=",
            Self::Equal => "==",
            Self::Smaller => "<",
            Self::SmallerOrEqual => "<=",
            Self::Greater => ">",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|(text, _)| *text == token)
            .map(|(_, op)| *op)
    }

    fn apply(self, lhs: u64, rhs: u64) -> bool {
        match self {
            Self::NotEqual => lhs != rhs,
            Self::Equal => lhs == rhs,
            Self::Smaller => lhs < rhs,
            Self::SmallerOrEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
        }
    }
}

impl fmt::Display for PluralOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two message forms a count selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralForm {
    /// Form index 0.
    Singular,
    /// Form index 1.
    Plural,
}

impl PluralForm {
    pub fn index(self) -> usize {
        match self {
            Self::Singular => 0,
            Self::Plural => 1,
        }
    }
}

/// A parsed `Plural-Forms` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluralRule {
    plural_count: u32,
    operator: PluralOperator,
    operand: u64,
}

impl PluralRule {
    /// The declared `nplurals`, always at least 1.
    pub fn plural_count(&self) -> u32 {
        self.plural_count
    }

    pub fn operator(&self) -> PluralOperator {
        self.operator
    }

    pub fn operand(&self) -> u64 {
        self.operand
    }

    /// Whether `n` should use the message form with index 1.
    pub fn is_form1(&self, n: u64) -> bool {
        self.operator.apply(n, self.operand)
    }

    pub fn form(&self, n: u64) -> PluralForm {
        if self.is_form1(n) {
            PluralForm::Plural
        } else {
            PluralForm::Singular
        }
    }
}

/// `nplurals=2; plural=(n != 1);`, the germanic rule gettext assumes when no
/// rule is declared.
impl Default for PluralRule {
    fn default() -> Self {
        Self {
            plural_count: 2,
            operator: PluralOperator::NotEqual,
            operand: 1,
        }
    }
}

impl fmt::Display for PluralRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nplurals={}; plural=(n {} {});",
            self.plural_count, self.operator, self.operand
        )
    }
}

impl FromStr for PluralRule {
    type Err = PluralFormsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_plural_forms(value)
    }
}

/// Failure to read a `Plural-Forms` value. It carries no location: the header
/// parser attaches one when converting it to a [`crate::ParseError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}: expected {expected}, found `{actual}`")]
pub struct PluralFormsError {
    pub(crate) kind: ParseErrorKind,
    pub(crate) message: String,
    pub(crate) expected: String,
    pub(crate) actual: String,
}

impl PluralFormsError {
    fn syntax(detail: &str, value: &str) -> Self {
        Self {
            kind: ParseErrorKind::InvalidPluralForms,
            message: format!("Invalid plural forms value: expected `{}`", detail),
            expected: VALID_PLURAL_FORMS.to_owned(),
            actual: value.to_owned(),
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn actual(&self) -> &str {
        &self.actual
    }
}

/// The tokens of a rule, before any of them is interpreted.
struct RawRule<'a> {
    nplurals: &'a str,
    operator: &'a str,
    operand: &'a str,
}

/// Parses `nplurals=<digits>; plural=(n <op> <digits>);`.
///
/// The shape is checked first, then the plural count, then the operator, so
/// the reported error is always the first problem in that order.
pub fn parse_plural_forms(value: &str) -> Result<PluralRule, PluralFormsError> {
    let raw = tokenize(value.trim())
        .map_err(|detail| PluralFormsError::syntax(detail, value))?;

    let plural_count: u32 = raw.nplurals.parse().map_err(|_| PluralFormsError {
        kind: ParseErrorKind::InvalidPluralCount,
        message: "Invalid nplurals value".to_owned(),
        expected: "a number".to_owned(),
        actual: raw.nplurals.to_owned(),
    })?;
    if plural_count == 0 {
        return Err(PluralFormsError {
            kind: ParseErrorKind::InvalidPluralCount,
            message: "Invalid nplurals value".to_owned(),
            expected: "a number greater than zero".to_owned(),
            actual: raw.nplurals.to_owned(),
        });
    }

    let operator = PluralOperator::from_token(raw.operator).ok_or_else(|| PluralFormsError {
        kind: ParseErrorKind::InvalidPluralOperator,
        message: "Invalid plural forms operator".to_owned(),
        expected: one_of(OPERATORS.iter().map(|(text, _)| text)),
        actual: if raw.operator.is_empty() {
            "undefined".to_owned()
        } else {
            raw.operator.to_owned()
        },
    })?;

    let operand: u64 = raw.operand.parse().map_err(|_| PluralFormsError {
        kind: ParseErrorKind::InvalidPluralCount,
        message: "Invalid plural operand".to_owned(),
        expected: "a number".to_owned(),
        actual: raw.operand.to_owned(),
    })?;

    Ok(PluralRule {
        plural_count,
        operator,
        operand,
    })
}

fn tokenize(value: &str) -> Result<RawRule<'_>, &'static str> {
    let rest = value.as_bytes();
    let rest = expect(rest, "nplurals=")?;
    let (nplurals, rest) = take_while(rest, |c| c.is_ascii_digit());
    if nplurals.is_empty() {
        return Err("<digits>");
    }
    let rest = expect(rest, "; plural=(n")?;
    let rest = skip_whitespace(rest);
    let (operator, rest) = take_while(rest, |c| matches!(c, b'!' | b'=' | b'<' | b'>'));
    let rest = skip_whitespace(rest);
    let (operand, rest) = take_while(rest, |c| c.is_ascii_digit());
    if operand.is_empty() {
        return Err("<digits>");
    }
    let rest = expect(rest, ");")?;
    if !rest.is_empty() {
        return Err("end of value");
    }
    Ok(RawRule {
        nplurals,
        operator,
        operand,
    })
}

fn expect<'a>(string: &'a [u8], token: &'static str) -> Result<&'a [u8], &'static str> {
    string.strip_prefix(token.as_bytes()).ok_or(token)
}

/// Splits off the longest ASCII prefix matching `pred`.
fn take_while(string: &[u8], pred: impl Fn(u8) -> bool) -> (&str, &[u8]) {
    let end = string
        .iter()
        .position(|&c| !pred(c))
        .unwrap_or(string.len());
    let (head, rest) = string.split_at(end);
    // `pred` only ever accepts ASCII bytes
    (std::str::from_utf8(head).unwrap_or_default(), rest)
}

fn skip_whitespace(string: &[u8]) -> &[u8] {
    string.trim_ascii_start()
}
