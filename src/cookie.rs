//! In-memory cookie jar.
use std::fmt::Write;

/// Ambient cookie store of a session.
///
/// Writes follow `document.cookie` semantics: a write with the name of an existing cookie
/// replaces it, attributes after the first `;` are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<(String, String)>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cookie, replacing any cookie with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.cookies.iter_mut().find(|(key, _)| *key == name) {
            Some((_, old)) => *old = value,
            None => self.cookies.push((name, value)),
        }
    }

    /// Write a raw `name=value[; attributes]` cookie string.
    ///
    /// Returns `false` if the string has no `=`.
    pub fn write(&mut self, cookie: &str) -> bool {
        let pair = cookie.split(';').next().unwrap_or_default();
        match pair.split_once('=') {
            Some((name, value)) => {
                self.set(name.trim(), value.trim());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.cookies.iter().position(|(key, _)| key == name)?;
        Some(self.cookies.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the `Cookie` request header value, `None` if the jar is empty.
    pub fn header_value(&self) -> Option<String> {
        let mut iter = self.iter();
        let (name, value) = iter.next()?;
        let mut out = format!("{name}={value}");
        for (name, value) in iter {
            let _ = write!(out, "; {name}={value}");
        }
        Some(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_jar() {
        let mut jar = CookieJar::new();
        assert_eq!(jar.header_value(), None);

        assert!(jar.write("session=abc; Path=/; HttpOnly"));
        assert!(jar.write("theme = dark"));
        assert!(!jar.write("garbage"));
        jar.set("session", "xyz");

        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get("session"), Some("xyz"));
        assert_eq!(jar.get("theme"), Some("dark"));
        assert_eq!(jar.header_value().as_deref(), Some("session=xyz; theme=dark"));

        assert_eq!(jar.remove("session").as_deref(), Some("xyz"));
        assert_eq!(jar.header_value().as_deref(), Some("theme=dark"));
        jar.clear();
        assert!(jar.is_empty());
    }
}
