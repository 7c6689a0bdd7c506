//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, ServerSettings};
pub use state_builders::{ServiceDependencies, build_http_state_over};

use state_builders::build_http_state;

use std::time::Duration;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::comments::{
    create_comment, delete_comment, list_comments, update_comment,
};
use crate::inbound::http::communities::{
    create_community, delete_community, get_community, list_communities,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::{json_config, query_config};
use crate::inbound::http::posts::{create_post, delete_post, get_post, list_posts, update_post};
use crate::inbound::http::profiles::{get_profile, update_profile};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{delete_account, login, sign_up};
use crate::inbound::http::votes::{vote_on_comment, vote_on_post};
use crate::middleware::{RequestTimeout, Trace};

/// Register every `/api/v1` handler on `cfg`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(sign_up)
        .service(login)
        .service(delete_account)
        .service(get_profile)
        .service(update_profile)
        .service(create_community)
        .service(list_communities)
        .service(get_community)
        .service(delete_community)
        .service(create_post)
        .service(list_posts)
        .service(get_post)
        .service(update_post)
        .service(delete_post)
        .service(create_comment)
        .service(list_comments)
        .service(update_comment)
        .service(delete_comment)
        .service(vote_on_post)
        .service(vote_on_comment);
}

/// Shared state handed to every worker's application factory.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub request_timeout: Duration,
}

/// Assemble the application: tracing outermost, then the time budget, then
/// the versioned API, health probes and (debug builds only) Swagger UI.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        request_timeout,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .wrap(RequestTimeout::new(request_timeout))
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] carrying the bind address, token
///   service and optional database pool.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        request_timeout: config.request_timeout,
    };
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, persistent = config.db_pool.is_some(), "server listening");
    health_state.mark_ready();
    Ok(server)
}
