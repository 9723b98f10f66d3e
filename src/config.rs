use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "mongodb://mongo_db:27017/";
pub const DEFAULT_DATABASE_NAME: &str = "dealershipsDB";

#[derive(Clone, Debug)]
pub struct ReviewsConfig {
    pub database_url: String,
    pub database_name: String,
    pub max_connections: u32,
    pub port: u16,
    pub fixtures_dir: PathBuf,
    pub frontend_path: Option<PathBuf>,
}

impl ReviewsConfig {
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let database_name =
            std::env::var("DATABASE_NAME").unwrap_or_else(|_| DEFAULT_DATABASE_NAME.to_string());

        let max_connections = std::env::var("MAX_CONNECTIONS")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(15);

        let port = std::env::var("PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(3030);

        // fixtures live next to the binary's working directory unless told otherwise
        let fixtures_dir =
            PathBuf::from(std::env::var("FIXTURES_DIR").unwrap_or_else(|_| ".".to_string()));

        let frontend_path = std::env::var("FRONTEND_DIST_PATH")
            .ok()
            .filter(|val| !val.is_empty())
            .map(PathBuf::from);

        Self {
            database_url,
            database_name,
            max_connections,
            port,
            fixtures_dir,
            frontend_path,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
