use crate::inventory::{ModelRegistry, RegistryError};
use serde::Deserialize;
use std::{fs, path::Path};
use toml_edit::{DocumentMut, value};

#[derive(Deserialize)]
pub struct Config {
    #[serde(rename = "gmail_oauth", default)]
    pub gmail: Option<GmailConfig>,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    /// JSON array of reports to parse instead of fetching mail.
    #[serde(default)]
    pub reports_file: Option<String>,
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

fn default_db_path() -> String {
    "msgstore/reports.db".to_string()
}

fn default_output_path() -> String {
    "inventory.json".to_string()
}

#[derive(Deserialize)]
pub struct GmailConfig {
    pub client_id: String,
    pub client_secret: String,
    pub tokens: Tokens,
    pub urls: AuthUrls,
}

#[derive(Deserialize)]
pub struct Tokens {
    pub refresh_token: String,
    pub access_token: String,
}

#[derive(Deserialize)]
pub struct AuthUrls {
    pub token_url: String,
    pub auth_url: String,
}

#[derive(Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    pub user: String,
    pub query: String,
    /// Only the newest N matches are fetched when set.
    pub max_messages: Option<usize>,
    pub signature_triggers: Vec<String>,
    pub inventory_marker: Option<String>,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            user: "me".to_string(),
            query: "subject:\"hardware collected\"".to_string(),
            max_messages: None,
            signature_triggers: ["Kind regards", "Best regards", "Sent from my", "Sincerely"]
                .map(String::from)
                .to_vec(),
            inventory_marker: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub desktop_models: Vec<String>,
    pub laptop_models: Vec<String>,
    pub phone_models: Vec<String>,
    pub default_phone_model: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            desktop_models: ["3000", "3010"].map(String::from).to_vec(),
            laptop_models: ["5330", "5340", "5531", "5540"].map(String::from).to_vec(),
            phone_models: ["A32", "A34", "A35"].map(String::from).to_vec(),
            default_phone_model: "A35".to_string(),
        }
    }
}

impl RegistryConfig {
    pub fn build(&self) -> Result<ModelRegistry, RegistryError> {
        ModelRegistry::new(
            self.desktop_models.as_slice(),
            self.laptop_models.as_slice(),
            self.phone_models.as_slice(),
            &self.default_phone_model,
        )
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn update_access_token(
        path: impl AsRef<Path>,
        new_token: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = fs::read_to_string(&path)?;
        let mut doc = content.parse::<DocumentMut>()?;

        doc["gmail_oauth"]["tokens"]["access_token"] = value(new_token);

        fs::write(&path, doc.to_string())?;
        Ok(())
    }
}
