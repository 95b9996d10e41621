use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The site settings as one typed value. Reads start from the documented
/// defaults and overlay whatever rows exist in the datastore, so fallback
/// lives in exactly one place instead of at every call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteSettings {
    pub restaurant_name: String,
    pub tagline: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub instagram_url: String,
    pub facebook_url: String,
    pub seo_description: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            restaurant_name: "Osteria".into(),
            tagline: "Cucina casalinga".into(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            instagram_url: String::new(),
            facebook_url: String::new(),
            seo_description: String::new(),
        }
    }
}

/// key, category, description, type tag — the row metadata written on upsert.
pub(crate) const KNOWN_KEYS: &[(&str, &str, &str, &str)] = &[
    ("restaurant_name", "general", "Public name of the restaurant", "string"),
    ("tagline", "general", "Short slogan under the name", "string"),
    ("phone", "contact", "Phone number shown in the footer", "string"),
    ("email", "contact", "Contact email address", "string"),
    ("address", "contact", "Street address", "string"),
    ("instagram_url", "social", "Instagram profile link", "url"),
    ("facebook_url", "social", "Facebook page link", "url"),
    ("seo_description", "seo", "Meta description for search engines", "string"),
];

pub(crate) fn key_metadata(key: &str) -> Option<(&'static str, &'static str, &'static str)> {
    KNOWN_KEYS
        .iter()
        .find(|entry| entry.0 == key)
        .map(|entry| (entry.1, entry.2, entry.3))
}

impl SiteSettings {
    /// Returns false for keys this application does not know.
    pub fn apply(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            "restaurant_name" => &mut self.restaurant_name,
            "tagline" => &mut self.tagline,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "address" => &mut self.address,
            "instagram_url" => &mut self.instagram_url,
            "facebook_url" => &mut self.facebook_url,
            "seo_description" => &mut self.seo_description,
            _ => return false,
        };
        *slot = value.to_string();
        true
    }

    /// Defaults layered under the live rows.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut settings = Self::default();
        for (key, value) in rows {
            settings.apply(key, value);
        }
        settings
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub settings: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub success: bool,
    pub settings: SiteSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_when_no_rows_exist() {
        let settings = SiteSettings::from_rows([]);
        assert_eq!(settings, SiteSettings::default());
        assert_eq!(settings.restaurant_name, "Osteria");
    }

    #[test]
    fn live_rows_overlay_defaults() {
        let settings = SiteSettings::from_rows([
            ("restaurant_name", "Trattoria da Mario"),
            ("phone", "+39 06 1234567"),
        ]);
        assert_eq!(settings.restaurant_name, "Trattoria da Mario");
        assert_eq!(settings.phone, "+39 06 1234567");
        // Untouched fields keep their defaults.
        assert_eq!(settings.tagline, "Cucina casalinga");
    }

    #[test]
    fn unknown_keys_are_reported() {
        let mut settings = SiteSettings::default();
        assert!(!settings.apply("favorite_color", "blue"));
        assert!(settings.apply("email", "ciao@osteria.example"));
    }

    #[test]
    fn every_known_key_is_applicable() {
        let mut settings = SiteSettings::default();
        for entry in KNOWN_KEYS {
            assert!(settings.apply(entry.0, "x"), "key {} not applicable", entry.0);
        }
    }
}
