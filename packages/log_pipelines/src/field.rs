/// One structured key/value argument attached to a log call, distinct from the
/// free-text message.
///
/// The benchmark payload is integer-valued because that is the representative
/// shape for hot-path structured logging (identifiers, counts, sizes); keeping the
/// value a plain `i64` also keeps per-call capture cost independent of the value.
///
/// # Examples
///
/// ```
/// use log_pipelines::Field;
///
/// let field = Field::new("request_bytes", 4096);
///
/// assert_eq!(field.name(), "request_bytes");
/// assert_eq!(field.value(), 4096);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Field {
    name: &'static str,
    value: i64,
}

impl Field {
    /// Creates a structured argument from a name and an integer value.
    #[must_use]
    pub fn new(name: &'static str, value: i64) -> Self {
        Self { name, value }
    }

    /// Returns the argument's name, as referenced by `{name}` template placeholders.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the argument's value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.value
    }
}
