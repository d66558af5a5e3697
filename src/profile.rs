use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::{FeedError, Result};

pub type ProfileId = u64;

pub const DEFAULT_PHOTO_TEMPLATE: &str =
    "https://picsum.photos/seed/profile{id}/400/400";

const ID_PLACEHOLDER: &str = "{id}";

/// Lightweight record listed by the index resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: ProfileId,
    pub name: String,
    pub hobby: String,
    pub photo: Url,
}

/// Full record fetched on demand for a single profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetail {
    pub id: ProfileId,
    pub name: String,
    pub age: u32,
    pub city: String,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub hobby: String,
    pub photo: Url,
}

/// Values used for the fields a summary cannot provide when a detail
/// has to be synthesized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailDefaults {
    pub age: u32,
    pub city: String,
    pub height_cm: u32,
    pub weight_kg: u32,
}

impl ProfileDetail {
    pub fn placeholder(
        summary: &ProfileSummary,
        defaults: &DetailDefaults,
    ) -> Self {
        Self {
            id: summary.id,
            name: summary.name.clone(),
            age: defaults.age,
            city: defaults.city.clone(),
            height_cm: defaults.height_cm,
            weight_kg: defaults.weight_kg,
            hobby: summary.hobby.clone(),
            photo: summary.photo.clone(),
        }
    }
}

/// Builds deterministic placeholder image URLs from a template
/// containing `{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFallback {
    template: String,
}

impl PhotoFallback {
    /// Accepts a template only if it yields a valid URL at both ends of
    /// the id range, so `{id}` cannot sit in a bounded spot like a port.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) {
            return Err(FeedError::Config(format!(
                "photo template `{}` has no {} placeholder",
                template, ID_PLACEHOLDER
            )));
        }
        for sample in [ProfileId::MIN, ProfileId::MAX] {
            Url::parse(&fill(&template, sample)).map_err(|err| {
                FeedError::Config(format!(
                    "photo template `{}` is invalid for id {}: {}",
                    template, sample, err
                ))
            })?;
        }
        Ok(Self { template })
    }

    pub fn url(&self, id: ProfileId) -> Result<Url> {
        Ok(Url::parse(&fill(&self.template, id))?)
    }

    /// Generated photo for `id`, falling back to the built-in template
    /// if this one does not produce a URL.
    pub fn generated(&self, id: ProfileId) -> Url {
        self.url(id).unwrap_or_else(|err| {
            log::warn!(
                "profile/{}: photo template `{}` failed ({}), using built-in",
                id,
                self.template,
                err
            );
            builtin_photo(id)
        })
    }

    fn resolve(&self, id: ProfileId, photo: Option<String>) -> Url {
        match photo.filter(|p| !p.trim().is_empty()) {
            Some(raw) => Url::parse(raw.trim()).unwrap_or_else(|err| {
                log::warn!(
                    "profile/{}: invalid photo `{}` ({}), using fallback",
                    id,
                    raw,
                    err
                );
                self.generated(id)
            }),
            None => self.generated(id),
        }
    }
}

fn fill(template: &str, id: ProfileId) -> String {
    template.replace(ID_PLACEHOLDER, &id.to_string())
}

fn builtin_photo(id: ProfileId) -> Url {
    // The built-in template only takes the id in its path.
    Url::parse(&fill(DEFAULT_PHOTO_TEMPLATE, id))
        .expect("built-in photo template is valid for every id")
}

impl Default for PhotoFallback {
    fn default() -> Self {
        Self {
            template: DEFAULT_PHOTO_TEMPLATE.to_owned(),
        }
    }
}

/// Index entry as served over the wire, before the photo is resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRecord {
    pub id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub hobby: String,
    #[serde(default)]
    pub photo: Option<String>,
}

impl SummaryRecord {
    pub fn resolve(self, photos: &PhotoFallback) -> ProfileSummary {
        ProfileSummary {
            id: self.id,
            photo: photos.resolve(self.id, self.photo),
            name: self.name,
            hobby: self.hobby,
        }
    }
}

/// Detail entry as served over the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailRecord {
    pub id: ProfileId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: u32,
    #[serde(default)]
    pub city: String,
    #[serde(default, alias = "height", deserialize_with = "lenient_number")]
    pub height_cm: u32,
    #[serde(default, alias = "weight", deserialize_with = "lenient_number")]
    pub weight_kg: u32,
    #[serde(default)]
    pub hobby: String,
    #[serde(default)]
    pub photo: Option<String>,
}

impl DetailRecord {
    pub fn resolve(self, photos: &PhotoFallback) -> ProfileDetail {
        ProfileDetail {
            id: self.id,
            photo: photos.resolve(self.id, self.photo),
            name: self.name,
            age: self.age,
            city: self.city,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            hobby: self.hobby,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u32),
    Text(String),
}

/// Accepts `165` as well as `"165"`; blank strings and nulls become zero.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(0),
        Some(NumberOrText::Number(n)) => Ok(n),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(0),
        Some(NumberOrText::Text(s)) => {
            s.trim().parse().map_err(serde::de::Error::custom)
        }
    }
}

const FALLBACK_PROFILES: [(ProfileId, &str, &str); 5] = [
    (1, "ليلى الخطيب", "القراءة"),
    (2, "نور المصري", "التصوير"),
    (3, "سارة الهاشمي", "الطبخ"),
    (4, "مريم الأحمد", "الرياضة"),
    (5, "هناء عمر", "الموسيقى"),
];

/// Built-in index used whenever the index resource is unavailable.
pub fn fallback_profiles(photos: &PhotoFallback) -> Vec<ProfileSummary> {
    FALLBACK_PROFILES
        .iter()
        .map(|(id, name, hobby)| ProfileSummary {
            id: *id,
            name: (*name).to_owned(),
            hobby: (*hobby).to_owned(),
            photo: photos.generated(*id),
        })
        .collect()
}
