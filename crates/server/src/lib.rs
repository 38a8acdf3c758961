//! HTTP service of the schoolhouse directory.
//!
//! Two endpoints make up the API:
//!
//! | Route                  | Method | Reply                                   |
//! |------------------------|--------|-----------------------------------------|
//! | `/api/addSchool`       | `POST` | `201 {success, id, imageUrl}`           |
//! | `/api/getSchools`      | `GET`  | `200 {success, data}`                   |
//!
//! Failures reply `{success: false, message}` with `400`, `405` or `500`.
//! When images are kept on local disk they are served under the configured prefix.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use salvo::prelude::*;
//! use schoolhouse_server::blob::LocalBlobStore;
//! use schoolhouse_server::config::DatabaseConfig;
//! use schoolhouse_server::handlers::AppState;
//! use schoolhouse_server::storage::Database;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect(&DatabaseConfig::default()).await?;
//! db.migrate().await?;
//! let state = AppState {
//!     db,
//!     blobs: Arc::new(LocalBlobStore::new("public/schoolImages", "/schoolImages")),
//!     max_upload_size: 5 * 1024 * 1024,
//! };
//! let acceptor = TcpListener::new("0.0.0.0:5800").bind().await;
//! Server::new(acceptor).serve(schoolhouse_server::route(state)).await;
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod blob;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod storage;

use salvo::affix_state;
use salvo::logging::Logger;
use salvo::prelude::*;
use salvo::serve_static::StaticDir;

pub use error::{AppError, AppResult};
pub use handlers::AppState;

/// Builds the service router around `state`.
pub fn route(state: AppState) -> Router {
    let mut router = Router::new()
        .hoop(Logger::default())
        .hoop(affix_state::inject(state.clone()))
        .push(
            Router::with_path("api")
                .push(Router::with_path("addSchool").goal(handlers::add_school))
                .push(Router::with_path("getSchools").goal(handlers::get_schools)),
        );

    if let Some((prefix, dir)) = state.blobs.served_dir() {
        let path = format!("{}/{{**path}}", prefix.trim_matches('/'));
        tracing::debug!(%path, dir = %dir.display(), "serving local images");
        router = router.push(Router::with_path(path).get(StaticDir::new(vec![dir.to_path_buf()])));
    }
    router
}
