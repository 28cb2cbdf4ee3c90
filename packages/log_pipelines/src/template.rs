use std::fmt::Write;

use crate::{Error, Field};

/// A message template, parsed once at registration time so no pipeline pays parse
/// cost on the logging call path.
///
/// Template text is literal text interleaved with `{name}` placeholders, where
/// each name refers to a structured argument by its [`Field::name()`]. Literal
/// brace characters are not supported; a template is rejected rather than
/// guessed at.
///
/// # Examples
///
/// ```
/// use log_pipelines::{Field, Template};
///
/// let template = Template::parse("x={x} y={y} z={z}")?;
///
/// let mut rendered = String::new();
/// template.format_into(
///     &mut rendered,
///     &[
///         Field::new("x", 100),
///         Field::new("y", 200),
///         Field::new("z", 300),
///     ],
/// );
///
/// assert_eq!(rendered, "x=100 y=200 z=300");
/// # Ok::<(), log_pipelines::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Template {
    text: String,
    segments: Vec<Segment>,
}

#[derive(Clone, Debug)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

impl Template {
    /// Parses template text into its literal and placeholder segments.
    ///
    /// # Errors
    ///
    /// Returns an error when the text is empty, contains an unbalanced or stray
    /// brace, or contains a `{}` placeholder with no name.
    pub fn parse(text: impl Into<String>) -> crate::Result<Self> {
        let text = text.into();

        if text.is_empty() {
            return Err(Error::EmptyTemplate);
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut name = String::new();
        let mut placeholder_start: Option<usize> = None;

        for (position, character) in text.char_indices() {
            if let Some(start) = placeholder_start {
                match character {
                    '}' => {
                        if name.is_empty() {
                            return Err(Error::EmptyPlaceholder {
                                template: text.clone(),
                                position: start,
                            });
                        }

                        segments.push(Segment::Placeholder(std::mem::take(&mut name)));
                        placeholder_start = None;
                    }
                    '{' => {
                        return Err(Error::UnbalancedBrace {
                            template: text.clone(),
                            position: start,
                        });
                    }
                    other => name.push(other),
                }
            } else {
                match character {
                    '{' => {
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }

                        placeholder_start = Some(position);
                    }
                    '}' => {
                        return Err(Error::UnbalancedBrace {
                            template: text.clone(),
                            position,
                        });
                    }
                    other => literal.push(other),
                }
            }
        }

        if let Some(start) = placeholder_start {
            return Err(Error::UnbalancedBrace {
                template: text,
                position: start,
            });
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { text, segments })
    }

    /// Returns the original template text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the number of placeholders in the template.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Placeholder(_)))
            .count()
    }

    /// Appends the rendered message to `out`, resolving placeholders against
    /// `fields` by name.
    ///
    /// Rendering never fails: a placeholder with no matching field renders as the
    /// literal `{name}`, because a formatting failure in the middle of a
    /// measurement run would be worse than a visibly unresolved placeholder in
    /// discarded output.
    pub fn format_into(&self, out: &mut String, fields: &[Field]) {
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                Segment::Placeholder(name) => {
                    match fields.iter().find(|field| field.name() == name) {
                        Some(field) => write!(out, "{}", field.value())
                            .expect("writing to a String never fails"),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                }
            }
        }
    }
}
