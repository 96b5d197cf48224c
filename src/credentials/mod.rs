use thiserror::Error;

/// Game API token
pub const ENV_API_TOKEN: &str = "CR_API_TOKEN";
/// Spreadsheet holding the excuse and rating sheets
pub const ENV_SPREADSHEET_ID: &str = "GSHEET_SPREADSHEET_ID";
/// OAuth access token for the Sheets API
pub const ENV_SHEETS_TOKEN: &str = "GSHEETS_ACCESS_TOKEN";
/// Discord webhook for promotion announcements
pub const ENV_DISCORD_WEBHOOK: &str = "DISCORD_WEBHOOK";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("The environment variable '{0}' is missing. Set it or add it to a .env file.")]
    Missing(&'static str),
}

/// Read an environment variable, treating empty values as unset.
pub fn get_from_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(val) => {
            let trimmed = val.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

/// Read a required environment variable.
pub fn require(name: &'static str) -> Result<String, CredentialError> {
    get_from_env(name).ok_or(CredentialError::Missing(name))
}

/// Everything needed to talk to the outside world.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_token: String,
    /// `None` when sheets are kept in a local directory
    pub sheets: Option<SheetsCredentials>,
    pub discord_webhook: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SheetsCredentials {
    pub spreadsheet_id: String,
    pub access_token: String,
}

impl Credentials {
    /// Load credentials from the environment. Sheets credentials are only
    /// required when `need_sheets` is set.
    pub fn from_env(need_sheets: bool) -> Result<Self, CredentialError> {
        let api_token = require(ENV_API_TOKEN)?;
        let sheets = if need_sheets {
            Some(SheetsCredentials {
                spreadsheet_id: require(ENV_SPREADSHEET_ID)?,
                access_token: require(ENV_SHEETS_TOKEN)?,
            })
        } else {
            None
        };
        Ok(Self {
            api_token,
            sheets,
            discord_webhook: get_from_env(ENV_DISCORD_WEBHOOK),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_missing() {
        std::env::set_var("CLAN_RATING_TEST_BLANK", "   ");
        assert_eq!(get_from_env("CLAN_RATING_TEST_BLANK"), None);
        std::env::set_var("CLAN_RATING_TEST_SET", " token \n");
        assert_eq!(get_from_env("CLAN_RATING_TEST_SET"), Some("token".to_string()));
        assert_eq!(get_from_env("CLAN_RATING_TEST_UNSET"), None);
    }

    #[test]
    fn test_missing_message_names_variable() {
        let err = CredentialError::Missing(ENV_API_TOKEN);
        assert!(err.to_string().contains("CR_API_TOKEN"));
    }
}
