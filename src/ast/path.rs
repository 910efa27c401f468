use std::fmt;

/// Canonical segment separator used when a path is displayed.
pub const SEPARATOR: char = '/';

/// A non-empty, ordered list of field names.
///
/// Paths may be written with `/`, `.` or `\` between segments; all three
/// normalize to the same path.
///
/// ```
/// use clause_lang::FieldPath;
///
/// let path = FieldPath::parse("order.customer\\name").unwrap();
/// assert_eq!(path.segments(), ["order", "customer", "name"]);
/// assert_eq!(path.to_string(), "order/customer/name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Splits `text` into segments. Returns `None` when no segment remains.
    pub fn parse(text: &str) -> Option<FieldPath> {
        let segments: Vec<String> = text
            .split(['/', '.', '\\'])
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            None
        } else {
            Some(FieldPath { segments })
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// All but the last segment: the edges walked before the attribute.
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn leaf(&self) -> &str {
        // never empty
        &self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}
