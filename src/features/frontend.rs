use crate::AppState;
use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Client-side routes of the single page frontend.
///
/// Each one is answered with the SPA entry document, the page component is picked
/// in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaRoute {
    Login,
    Register,
    Dealers,
}

impl SpaRoute {
    pub const ALL: [SpaRoute; 3] = [SpaRoute::Login, SpaRoute::Register, SpaRoute::Dealers];

    pub fn path(&self) -> &'static str {
        match self {
            SpaRoute::Login => "/login",
            SpaRoute::Register => "/register",
            SpaRoute::Dealers => "/dealers",
        }
    }
}

pub fn frontend_router(dist_dir: &Path) -> Router<AppState> {
    let index = dist_dir.join("index.html");

    let mut router = Router::new();
    for route in SpaRoute::ALL {
        router = router.route_service(route.path(), ServeFile::new(&index));
    }

    // built js/css/images
    router.fallback_service(ServeDir::new(dist_dir))
}
