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

//! Placeholder substitution in translated strings.
//!
//! Placeholders are written `{key:type}`, where both `key` and `type` are made
//! of ASCII letters, digits and `_`. The type is a hint for translators and
//! tooling (`number` or anything else for text); values are always inserted
//! through their `Display` implementation.
//!
//! Braces that do not form a placeholder, and placeholders with no matching
//! argument, are copied to the output as written.

use std::fmt::{self, Display};

/// The declared type of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// `{key:number}`
    Number,
    /// Any other type name.
    Text,
}

/// A `{key:type}` token found in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder<'a> {
    pub key: &'a str,
    pub type_name: &'a str,
}

impl Placeholder<'_> {
    pub fn kind(&self) -> PlaceholderKind {
        if self.type_name == "number" {
            PlaceholderKind::Number
        } else {
            PlaceholderKind::Text
        }
    }

    /// Whether `value` fits the declared type.
    pub fn accepts(&self, value: &str) -> bool {
        match self.kind() {
            PlaceholderKind::Number => value.trim().parse::<f64>().is_ok(),
            PlaceholderKind::Text => true,
        }
    }
}

impl Display for Placeholder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}:{}}}", self.key, self.type_name)
    }
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|c| c.is_ascii_alphanumeric() || c == b'_')
}

/// Reads a placeholder at the start of `s`, which begins with `{`. Returns it
/// along with the length of its text.
fn parse_placeholder(s: &str) -> Option<(Placeholder<'_>, usize)> {
    let end = s.find('}')?;
    let (key, type_name) = s.get(1..end)?.split_once(':')?;
    if !is_word(key) || !is_word(type_name) {
        return None;
    }
    Some((Placeholder { key, type_name }, end + 1))
}

/// Iterator over the placeholders of a template, in order of appearance.
#[derive(Debug, Clone)]
pub struct Placeholders<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Placeholders<'a> {
    type Item = Placeholder<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut rest = self.rest;
        while let Some(p) = rest.find('{') {
            let candidate = &rest[p..];
            if let Some((placeholder, len)) = parse_placeholder(candidate) {
                self.rest = &candidate[len..];
                return Some(placeholder);
            }
            rest = &candidate[1..];
        }
        self.rest = "";
        None
    }
}

pub fn placeholders(template: &str) -> Placeholders<'_> {
    Placeholders { rest: template }
}

/// A template and its arguments; formatting it performs the substitution.
///
/// Usually built through the [`po_format!`](crate::po_format) macro.
pub struct FormatArgs<'a> {
    pub template: &'a str,
    pub args: &'a [(&'a str, &'a dyn Display)],
}

impl FormatArgs<'_> {
    fn lookup(&self, key: &str) -> Option<&dyn Display> {
        self.args.iter().find(|(name, _)| *name == key).map(|(_, value)| *value)
    }
}

impl Display for FormatArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pos = 0;
        while let Some(p) = self.template[pos..].find('{') {
            let p = pos + p;
            // format the part before the '{'
            self.template[pos..p].fmt(f)?;
            match parse_placeholder(&self.template[p..]) {
                Some((placeholder, len)) => {
                    match self.lookup(placeholder.key) {
                        Some(value) => value.fmt(f)?,
                        None => self.template[p..p + len].fmt(f)?,
                    }
                    pos = p + len;
                }
                None => {
                    "{".fmt(f)?;
                    pos = p + 1;
                }
            }
        }
        self.template[pos..].fmt(f)
    }
}

/// Substitutes `{key:type}` placeholders.
///
/// ```
/// # use pofile::po_format;
/// let s = 3;
/// assert_eq!(po_format!("Time: {s:number} seconds", s = s), "Time: 3 seconds");
/// assert_eq!(po_format!("No placeholders"), "No placeholders");
/// ```
#[macro_export]
macro_rules! po_format {
    ($template:expr) => {{
        let template = $template;
        $crate::runtime_format::FormatArgs {
            template: AsRef::<str>::as_ref(&template),
            args: &[],
        }
        .to_string()
    }};
    ($template:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let template = $template;
        $crate::runtime_format::FormatArgs {
            template: AsRef::<str>::as_ref(&template),
            args: &[ $( (stringify!($key), &$value as &dyn ::std::fmt::Display) ),+ ],
        }
        .to_string()
    }};
}
