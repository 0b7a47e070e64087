//! Single-slot format templates.
//!
//! A greeting template holds exactly one substitution slot, written `%s`
//! or positionally as `%1$s`. `%%` is a literal percent sign. Anything
//! else after a `%` is rejected at parse time, so rendering cannot fail.

use crate::catalog::I18nError;

/// The value substituted before any name has been entered.
pub const EMPTY_NAME: &str = "";

/// A parsed template with exactly one slot.
///
/// # Example
///
/// ```
/// use greet_i18n::Template;
///
/// let t = Template::parse("Hello, %s!").unwrap();
/// assert_eq!(t.render(""), "Hello, !");
/// assert_eq!(t.render("Ken"), "Hello, Ken!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    prefix: String,
    suffix: String,
    source: String,
}

impl Template {
    /// Parse `text`, requiring exactly one slot.
    pub fn parse(text: &str) -> Result<Self, I18nError> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut slots = 0usize;
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            let out = if slots == 0 { &mut prefix } else { &mut suffix };
            if ch != '%' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('%') => out.push('%'),
                Some('s') => slots += 1,
                Some('1') if chars.peek() == Some(&'$') => {
                    chars.next();
                    if chars.next() != Some('s') {
                        return Err(bad_directive("%1$", text));
                    }
                    slots += 1;
                }
                Some(other) => return Err(bad_directive(&format!("%{other}"), text)),
                None => return Err(bad_directive("%", text)),
            }
        }

        if slots != 1 {
            return Err(I18nError::SlotCount {
                found: slots,
                template: text.to_string(),
            });
        }

        Ok(Self {
            prefix,
            suffix,
            source: text.to_string(),
        })
    }

    /// Substitute `value` into the slot verbatim.
    #[must_use]
    pub fn render(&self, value: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + value.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(value);
        out.push_str(&self.suffix);
        out
    }

    /// The template text as written in the catalog.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

fn bad_directive(directive: &str, template: &str) -> I18nError {
    I18nError::BadDirective {
        directive: directive.to_string(),
        template: template.to_string(),
    }
}
