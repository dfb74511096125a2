//! People who coded a project, and when each last saved it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coder {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<DateTime<Utc>>,
}

impl Coder {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            last_saved: None,
        }
    }
}

/// The project's coder list, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coders(Vec<Coder>);

impl Coders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coder> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Coder> {
        self.0.iter().find(|c| c.name == name)
    }

    /// Most recently saving coder.
    pub fn latest(&self) -> Option<&Coder> {
        self.0.iter().filter(|c| c.last_saved.is_some()).max_by_key(|c| c.last_saved)
    }

    /// Record a save by `name` now. A new coder is appended; a known one
    /// gets its email refreshed when a non-empty one is given.
    pub fn touch(&mut self, name: &str, email: &str) -> &Coder {
        self.touch_at(name, email, Utc::now())
    }

    pub fn touch_at(&mut self, name: &str, email: &str, at: DateTime<Utc>) -> &Coder {
        let index = match self.0.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.0.push(Coder::new(name, email));
                self.0.len() - 1
            }
        };
        let coder = &mut self.0[index];
        if !email.is_empty() {
            coder.email = email.to_string();
        }
        coder.last_saved = Some(at);
        coder
    }
}

/// Parse a `Name <email>` coder string; the email part is optional.
pub fn parse_coder(input: &str) -> Option<(String, String)> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match (input.find('<'), input.rfind('>')) {
        (Some(open), Some(close)) if open < close => {
            let name = input[..open].trim();
            let email = input[open + 1..close].trim();
            (!name.is_empty()).then(|| (name.to_string(), email.to_string()))
        }
        _ => Some((input.to_string(), String::new())),
    }
}
