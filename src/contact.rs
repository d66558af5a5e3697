use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::identity::Identity;
use crate::profile::ProfileId;
use crate::Result;

pub const DEFAULT_EMAIL_DOMAIN: &str = "example.com";

/// Unreserved characters of RFC 3986 are left as they are.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Fixed parts of every contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactTemplate {
    pub domain: String,
    /// Greeting used as subject and first body line; `{name}` is replaced
    /// with the recipient's display name.
    pub greeting: String,
    /// Attribution line; `{name}` and `{email}` describe the sender.
    pub signature: String,
    pub anonymous: String,
}

impl Default for ContactTemplate {
    fn default() -> Self {
        Self {
            domain: DEFAULT_EMAIL_DOMAIN.to_owned(),
            greeting: "مرحبا {name}".to_owned(),
            signature: "من: {name} <{email}>".to_owned(),
            anonymous: "من: مرسل مجهول".to_owned(),
        }
    }
}

/// Characters that survive into the mailbox name.
fn allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_arabic_letter(c)
}

fn is_arabic_letter(c: char) -> bool {
    matches!(c,
        '\u{0621}'..='\u{063A}'
        | '\u{0641}'..='\u{064A}'
        | '\u{066E}'..='\u{066F}'
        | '\u{0671}'..='\u{06D3}'
        | '\u{06D5}'
        | '\u{06EE}'..='\u{06EF}'
        | '\u{06FA}'..='\u{06FC}'
        | '\u{06FF}')
}

/// Mailbox name for a profile: the display name without whitespace,
/// lowercased, reduced to Arabic letters, ASCII letters and digits, and
/// suffixed with the id.
pub fn local_part(name: &str, id: ProfileId) -> String {
    let mut local: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .filter(|c| allowed(*c))
        .collect();
    local.push_str(&id.to_string());
    local
}

fn encode(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

/// Builds `mailto:` links addressed to profiles.
#[derive(Debug, Clone, Default)]
pub struct ContactLink {
    template: ContactTemplate,
}

impl ContactLink {
    pub fn new(template: ContactTemplate) -> Self {
        Self { template }
    }

    pub fn address(&self, name: &str, id: ProfileId) -> String {
        format!("{}@{}", local_part(name, id), self.template.domain)
    }

    pub fn subject(&self, name: &str) -> String {
        self.template.greeting.replace("{name}", name)
    }

    pub fn body(&self, name: &str, sender: Option<&Identity>) -> String {
        let attribution = match sender {
            Some(identity) => self
                .template
                .signature
                .replace("{name}", &identity.name)
                .replace("{email}", &identity.email),
            None => self.template.anonymous.clone(),
        };
        format!("{}\n\n{}", self.subject(name), attribution)
    }

    pub fn build(
        &self,
        name: &str,
        id: ProfileId,
        sender: Option<&Identity>,
    ) -> Result<Url> {
        let link = format!(
            "mailto:{}?subject={}&body={}",
            self.address(name, id),
            encode(&self.subject(name)),
            encode(&self.body(name, sender)),
        );
        Ok(Url::parse(&link)?)
    }
}
