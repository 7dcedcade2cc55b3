use std::env;
use std::str::FromStr;

/// How exported folders are laid out when the tree is rebuilt from flat records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderLayout {
    /// Split folder paths on `/` and rebuild genuinely nested folders
    #[default]
    Nested,
    /// One folder per distinct path, named with the full path
    Flat,
}

impl FromStr for FolderLayout {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nested" => Ok(Self::Nested),
            "flat" => Ok(Self::Flat),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Server
    pub host: String,
    pub port: u16,
    pub log_json: bool,

    // Import / export
    pub max_import_depth: usize,
    pub max_upload_bytes: usize,
    pub folder_layout: FolderLayout,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if exists

        Ok(Self {
            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 100)?,

            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000)?,
            log_json: match env::var("LOG_FORMAT") {
                Ok(format) => match format.to_ascii_lowercase().as_str() {
                    "json" => true,
                    "text" => false,
                    _ => return Err(ConfigError::Invalid("LOG_FORMAT")),
                },
                Err(_) => false,
            },

            // Import / export
            max_import_depth: parse_or("MAX_IMPORT_DEPTH", 32)?,
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            folder_layout: parse_or("EXPORT_FOLDER_LAYOUT", FolderLayout::Nested)?,
        })
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read an optional variable, falling back to `default` when it is unset
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_layout_parse() {
        assert_eq!("nested".parse::<FolderLayout>(), Ok(FolderLayout::Nested));
        assert_eq!(" FLAT ".parse::<FolderLayout>(), Ok(FolderLayout::Flat));
        assert!("tree".parse::<FolderLayout>().is_err());
    }
}
