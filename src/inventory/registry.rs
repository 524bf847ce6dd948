// src/inventory/registry.rs

use super::normalize::tokens;
use super::Category;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("model {model:?} is listed as both {first} and {second}")]
    Overlap {
        model: String,
        first: &'static str,
        second: &'static str,
    },
    #[error("empty model identifier in the {set} set")]
    EmptyModel { set: &'static str },
    #[error("default phone model {model:?} is not one of the phone models")]
    UnknownDefaultPhone { model: String },
}

/// Known desktop, laptop and phone model identifiers.
///
/// Lookups are case-insensitive; labels keep the spelling given at construction.
/// The three sets are disjoint, which [`ModelRegistry::new`] enforces.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    index: HashMap<String, (Category, String)>,
    default_phone: String,
}

impl ModelRegistry {
    pub fn new<S: AsRef<str>>(
        desktops: &[S],
        laptops: &[S],
        phones: &[S],
        default_phone: &str,
    ) -> Result<Self, RegistryError> {
        let mut index: HashMap<String, (Category, String)> = HashMap::new();

        for (category, models) in [
            (Category::Desktops, desktops),
            (Category::Laptops, laptops),
            (Category::Phones, phones),
        ] {
            for model in models {
                let model = model.as_ref().trim();
                if model.is_empty() {
                    return Err(RegistryError::EmptyModel {
                        set: category.name(),
                    });
                }
                let key = model.to_lowercase();
                if let Some((existing, _)) = index.get(&key) {
                    // Repeating a model inside one set is harmless.
                    if *existing != category {
                        return Err(RegistryError::Overlap {
                            model: model.to_string(),
                            first: existing.name(),
                            second: category.name(),
                        });
                    }
                    continue;
                }
                index.insert(key, (category, model.to_string()));
            }
        }

        let default_phone = match index.get(&default_phone.trim().to_lowercase()) {
            Some((Category::Phones, label)) => label.clone(),
            _ => {
                return Err(RegistryError::UnknownDefaultPhone {
                    model: default_phone.to_string(),
                });
            }
        };

        Ok(Self {
            index,
            default_phone,
        })
    }

    pub fn default_phone_model(&self) -> &str {
        &self.default_phone
    }

    /// Resolve a single normalized token to a model. A trailing plural `s`
    /// is accepted ("a35s", "5340s").
    pub fn lookup_token(&self, token: &str) -> Option<(Category, &str)> {
        let hit = self
            .index
            .get(token)
            .or_else(|| token.strip_suffix('s').and_then(|t| self.index.get(t)))?;
        Some((hit.0, hit.1.as_str()))
    }

    /// Desktop or laptop model for a bare numeral such as "5340".
    pub fn lookup_numeric(&self, numeral: &str) -> Option<(Category, &str)> {
        match self.index.get(numeral) {
            Some((category @ (Category::Desktops | Category::Laptops), label)) => {
                Some((*category, label.as_str()))
            }
            _ => None,
        }
    }

    /// Whether `numeral` is a registered model of exactly `category`.
    pub fn is_model_of(&self, category: Category, numeral: &str) -> Option<&str> {
        match self.index.get(numeral) {
            Some((c, label)) if *c == category => Some(label.as_str()),
            _ => None,
        }
    }

    /// First phone model appearing as a whole word in normalized text.
    pub fn find_phone_model(&self, normalized: &str) -> Option<&str> {
        tokens(normalized).find_map(|token| match self.lookup_token(token) {
            Some((Category::Phones, label)) => Some(label),
            _ => None,
        })
    }
}
