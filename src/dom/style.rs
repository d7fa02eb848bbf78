/// Ordered inline style declarations of one element.
///
/// Setting an existing property replaces its value in place, so the
/// serialized css text keeps the order properties were first set in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `prop: value; prop: value` css text. Malformed fragments are
    /// dropped the way a browser would.
    pub fn parse(css_text: &str) -> Self {
        let mut style = Self::new();
        for fragment in css_text.split(';') {
            if let Some((property, value)) = fragment.split_once(':') {
                let property = property.trim();
                let value = value.trim();
                if !property.is_empty() && !value.is_empty() {
                    style.set(property, value);
                }
            }
        }
        style
    }

    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let property = property.to_ascii_lowercase();
        let value = value.into();
        match self.declarations.iter_mut().find(|(p, _)| *p == property) {
            Some(existing) => existing.1 = value,
            None => self.declarations.push((property, value)),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        let property = property.to_ascii_lowercase();
        self.declarations
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, property: &str) {
        let property = property.to_ascii_lowercase();
        self.declarations.retain(|(p, _)| *p != property);
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
