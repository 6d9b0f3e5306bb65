use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub google: Option<GoogleConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_request_body_size: usize,
    pub session_ttl: Duration,
    pub session_cookie_secure: bool,
}

/// Which persistence strategy backs the report store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Single JSON document on local disk
    File,
    /// Remote spreadsheet, photos kept on local disk
    Sheets,
    /// Remote spreadsheet, photos hosted on remote file storage
    SheetsDrive,
}

impl StorageBackend {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "file" | "json" => Ok(Self::File),
            "sheets" => Ok(Self::Sheets),
            "sheets_drive" | "sheets+drive" => Ok(Self::SheetsDrive),
            other => Err(format!(
                "Invalid STORAGE_BACKEND '{}': expected file, sheets or sheets_drive",
                other
            )),
        }
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::File)
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Path of the JSON document used by the file backend
    pub data_file: PathBuf,
    /// Directory where uploaded photos are written
    pub upload_dir: PathBuf,
}

/// Google service-account settings for the remote backends
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub credentials_file: PathBuf,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub drive_folder_id: Option<String>,
    pub sheets_api_base: String,
    pub drive_api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let storage = StorageConfig::from_env()?;
        let google = if storage.backend.is_remote() {
            Some(GoogleConfig::from_env(storage.backend)?)
        } else {
            None
        };

        Ok(Config {
            app: AppConfig::from_env()?,
            storage,
            google,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 16 * 1024 * 1024; // 16MB
    const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SESSION_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_TTL_SECS must be a valid number".to_string())?;

        let session_cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            max_request_body_size,
            session_ttl: Duration::from_secs(session_ttl_secs),
            session_cookie_secure,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let backend =
            StorageBackend::parse(&env::var("STORAGE_BACKEND").unwrap_or_else(|_| "file".into()))?;

        let data_file = env::var("DATA_FILE").unwrap_or_else(|_| "data/reports.json".to_string());
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "static/uploads".to_string());

        Ok(Self {
            backend,
            data_file: PathBuf::from(data_file),
            upload_dir: PathBuf::from(upload_dir),
        })
    }
}

impl GoogleConfig {
    pub const DEFAULT_SHEETS_API_BASE: &'static str = "https://sheets.googleapis.com";
    pub const DEFAULT_DRIVE_API_BASE: &'static str = "https://www.googleapis.com";

    pub fn from_env(backend: StorageBackend) -> Result<Self, String> {
        let credentials_file = env::var("GOOGLE_CREDENTIALS_FILE")
            .unwrap_or_else(|_| "google_api/credentials.json".to_string());

        let spreadsheet_id = env::var("SPREADSHEET_ID")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "SPREADSHEET_ID is required for the sheets backends".to_string())?;

        let sheet_name = env::var("SHEET_NAME").unwrap_or_else(|_| "ApartmentReports".to_string());

        let drive_folder_id = env::var("DRIVE_FOLDER_ID").ok().filter(|s| !s.is_empty());
        if backend == StorageBackend::SheetsDrive && drive_folder_id.is_none() {
            return Err("DRIVE_FOLDER_ID is required for the sheets_drive backend".to_string());
        }

        let sheets_api_base = env::var("GOOGLE_SHEETS_API_BASE")
            .unwrap_or_else(|_| Self::DEFAULT_SHEETS_API_BASE.to_string());
        let drive_api_base = env::var("GOOGLE_DRIVE_API_BASE")
            .unwrap_or_else(|_| Self::DEFAULT_DRIVE_API_BASE.to_string());

        Ok(Self {
            credentials_file: PathBuf::from(credentials_file),
            spreadsheet_id,
            sheet_name,
            drive_folder_id,
            sheets_api_base,
            drive_api_base,
        })
    }
}
