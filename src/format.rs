//! Human-readable value formatting
//!
//! Formatting is a chain of responsibility: each [`ValueFormatter`] in a
//! [`FormatterChain`] may claim a value by returning `Some`. Unclaimed values
//! fall back to the built-in rendering. Array and container formatters render
//! their children through the chain, so a formatter registered for dates also
//! applies to dates inside arrays and nested containers.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use once_cell::sync::Lazy;

use crate::models::{ContainerView, Value};

static SHARED: Lazy<FormatterChain> = Lazy::new(FormatterChain::new);

/// One link in a [`FormatterChain`].
pub trait ValueFormatter: Send + Sync {
    /// Render `value`, or return `None` to pass it down the chain.
    fn format(&self, value: &Value, chain: &FormatterChain) -> Option<String>;
}

/// Ordered list of formatters with a built-in fallback.
///
/// # Example
///
/// ```rust
/// use property_container::format::{FloatFormatter, FormatterChain};
/// use property_container::models::Value;
///
/// let chain = FormatterChain::new().with(FloatFormatter::new(2));
/// assert_eq!(chain.format(&Value::Double(1.0 / 3.0)), "0.33");
/// assert_eq!(chain.format(&Value::from(vec![0.5, 2.0])), "[0.50, 2.00]");
/// ```
#[derive(Default)]
pub struct FormatterChain {
    formatters: Vec<Box<dyn ValueFormatter>>,
}

impl std::fmt::Debug for FormatterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterChain")
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

impl FormatterChain {
    /// Chain with only the built-in fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain used by `Display` implementations.
    pub fn shared() -> &'static FormatterChain {
        &SHARED
    }

    /// Append a formatter; earlier formatters take precedence.
    pub fn with(mut self, formatter: impl ValueFormatter + 'static) -> Self {
        self.push(formatter);
        self
    }

    pub fn push(&mut self, formatter: impl ValueFormatter + 'static) {
        self.formatters.push(Box::new(formatter));
    }

    /// Insert a formatter ahead of all others.
    pub fn prepend(&mut self, formatter: impl ValueFormatter + 'static) {
        self.formatters.insert(0, Box::new(formatter));
    }

    pub fn format(&self, value: &Value) -> String {
        self.formatters
            .iter()
            .find_map(|f| f.format(value, self))
            .unwrap_or_else(|| self.fallback(value))
    }

    /// Render a container as `{Name: value, ...}`.
    pub fn format_container(&self, container: &dyn ContainerView) -> String {
        let fields: Vec<String> = container
            .properties()
            .iter()
            .map(|pv| format!("{}: {}", pv.name(), self.format(&pv.value)))
            .collect();
        format!("{{{}}}", fields.join(", "))
    }

    fn fallback(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::String(s) => s.clone(),
            Value::DateTime(dt) => dt.to_rfc3339(),
            Value::LocalDate(d) => d.format("%Y-%m-%d").to_string(),
            Value::LocalDateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Value::LocalTime(t) => t.format("%H:%M:%S%.f").to_string(),
            Value::Guid(id) => id.hyphenated().to_string(),
            Value::Bytes(bytes) => BASE64.encode(bytes),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|item| self.format(item)).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Container(container) => self.format_container(container),
            Value::Object(json) => json.to_string(),
        }
    }
}

/// Renders `Null` as a fixed text.
pub struct NullFormatter {
    text: String,
}

impl NullFormatter {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ValueFormatter for NullFormatter {
    fn format(&self, value: &Value, _chain: &FormatterChain) -> Option<String> {
        value.is_null().then(|| self.text.clone())
    }
}

/// Renders booleans with custom words.
pub struct BoolFormatter {
    true_text: String,
    false_text: String,
}

impl BoolFormatter {
    pub fn new(true_text: impl Into<String>, false_text: impl Into<String>) -> Self {
        Self {
            true_text: true_text.into(),
            false_text: false_text.into(),
        }
    }
}

impl ValueFormatter for BoolFormatter {
    fn format(&self, value: &Value, _chain: &FormatterChain) -> Option<String> {
        value.as_bool().map(|b| {
            if b {
                self.true_text.clone()
            } else {
                self.false_text.clone()
            }
        })
    }
}

/// Renders doubles with a fixed number of decimal places.
pub struct FloatFormatter {
    precision: usize,
}

impl FloatFormatter {
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }
}

impl ValueFormatter for FloatFormatter {
    fn format(&self, value: &Value, _chain: &FormatterChain) -> Option<String> {
        match value {
            Value::Double(v) => Some(format!("{:.*}", self.precision, v)),
            _ => None,
        }
    }
}

/// Renders dates and times with chrono format patterns.
pub struct DateFormatter {
    date_pattern: String,
    date_time_pattern: String,
    time_pattern: String,
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self {
            date_pattern: "%Y-%m-%d".to_string(),
            date_time_pattern: "%Y-%m-%d %H:%M:%S".to_string(),
            time_pattern: "%H:%M:%S".to_string(),
        }
    }
}

impl DateFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.date_pattern = pattern.into();
        self
    }

    pub fn with_date_time_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.date_time_pattern = pattern.into();
        self
    }

    pub fn with_time_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.time_pattern = pattern.into();
        self
    }
}

impl ValueFormatter for DateFormatter {
    fn format(&self, value: &Value, _chain: &FormatterChain) -> Option<String> {
        match value {
            Value::LocalDate(d) => Some(d.format(&self.date_pattern).to_string()),
            Value::LocalDateTime(dt) => Some(dt.format(&self.date_time_pattern).to_string()),
            Value::DateTime(dt) => Some(dt.format(&self.date_time_pattern).to_string()),
            Value::LocalTime(t) => Some(t.format(&self.time_pattern).to_string()),
            _ => None,
        }
    }
}

/// Renders arrays with a custom separator and brackets.
pub struct ArrayFormatter {
    separator: String,
    open: String,
    close: String,
}

impl ArrayFormatter {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            open: String::new(),
            close: String::new(),
        }
    }

    pub fn with_brackets(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.open = open.into();
        self.close = close.into();
        self
    }
}

impl ValueFormatter for ArrayFormatter {
    fn format(&self, value: &Value, chain: &FormatterChain) -> Option<String> {
        let items = value.as_array()?;
        let parts: Vec<String> = items.iter().map(|item| chain.format(item)).collect();
        Some(format!(
            "{}{}{}",
            self.open,
            parts.join(&self.separator),
            self.close
        ))
    }
}
