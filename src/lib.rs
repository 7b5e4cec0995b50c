mod auth;
mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;
mod util;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::db::stage_stores;
use crate::middleware::RequestLogger;
use crate::middleware::view_throttle::ViewThrottle;
use crate::routes as app_routes;
use crate::service::token::TokenCodec;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::okapi::openapi3::{OpenApi, RefOr, SecurityScheme, SecuritySchemeData};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG overrides the configured level, e.g. RUST_LOG=info,bugshelf::database=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // a global subscriber may already be installed (tests build many instances)
    let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
}

fn build_cors(cors_config: &config::CorsConfig) -> Result<CorsOptions, String> {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    if is_wildcard && cors_config.allow_credentials {
        return Err("Invalid CORS configuration: wildcard origins (*) cannot be combined with credentials".to_string());
    }

    let allowed_origins = if cors_config.allowed_origins.is_empty() {
        AllowedOrigins::some_exact::<&str>(&[])
    } else if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    Ok(CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Put, Method::Delete, Method::Options, Method::Head]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    })
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return config::DEFAULT_API_BASE_PATH.to_string();
    }

    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    while normalized.ends_with('/') && normalized.len() > 1 {
        normalized.pop();
    }

    normalized
}

fn join_base_path(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let suffix = path.trim_start_matches('/');

    if base.is_empty() {
        format!("/{}", suffix)
    } else {
        format!("{}/{}", base, suffix)
    }
}

struct RouteSpec {
    path: &'static str,
    routes: Vec<rocket::Route>,
    openapi: rocket_okapi::okapi::openapi3::OpenApi,
}

fn collect_route_specs() -> Vec<RouteSpec> {
    let (bug_routes, bug_openapi) = app_routes::bug::routes();
    let (toy_routes, toy_openapi) = app_routes::toy::routes();
    let (auth_routes, auth_openapi) = app_routes::auth::routes();
    let (user_routes, user_openapi) = app_routes::user::routes();
    let (health_routes, health_openapi) = app_routes::health::routes();

    vec![
        RouteSpec {
            path: "/bug",
            routes: bug_routes,
            openapi: bug_openapi,
        },
        RouteSpec {
            path: "/toy",
            routes: toy_routes,
            openapi: toy_openapi,
        },
        RouteSpec {
            path: "/auth",
            routes: auth_routes,
            openapi: auth_openapi,
        },
        RouteSpec {
            path: "/user",
            routes: user_routes,
            openapi: user_openapi,
        },
        RouteSpec {
            path: "/health",
            routes: health_routes,
            openapi: health_openapi,
        },
    ]
}

/// Points every cookie security scheme at the configured session cookie.
fn document_cookie_name(openapi: &mut OpenApi, cookie_name: &str) {
    let Some(components) = openapi.components.as_mut() else {
        return;
    };
    for scheme in components.security_schemes.values_mut() {
        if let RefOr::Object(SecurityScheme {
            data: SecuritySchemeData::ApiKey { name, location, .. },
            ..
        }) = scheme
            && location == "cookie"
        {
            *name = cookie_name.to_string();
        }
    }
}

fn mount_api_routes(mut rocket: Rocket<Build>, base_path: &str, api: &config::ApiConfig, cookie_name: &str) -> Rocket<Build> {
    let route_specs = collect_route_specs();

    if !api.enable_swagger {
        for spec in route_specs {
            rocket = rocket.mount(join_base_path(base_path, spec.path), spec.routes);
        }
        return rocket;
    }

    let mut openapi_list = Vec::new();
    for spec in route_specs {
        rocket = rocket.mount(join_base_path(base_path, spec.path), spec.routes);
        openapi_list.push((spec.path, spec.openapi));
    }

    match marge_spec_list(&openapi_list) {
        Ok(mut openapi_docs) => {
            document_cookie_name(&mut openapi_docs, cookie_name);
            let settings = rocket_okapi::settings::OpenApiSettings::default();
            rocket = rocket.mount(base_path, vec![get_openapi_route(openapi_docs, &settings)]);

            let openapi_url = join_base_path(base_path, "openapi.json");
            let swagger_config = SwaggerUIConfig {
                url: openapi_url,
                ..Default::default()
            };
            rocket = rocket.mount(join_base_path(base_path, "docs"), make_swagger_ui(&swagger_config));
        }
        Err(err) => warn!(error = %err, "could not merge OpenAPI documents, serving the API without docs"),
    }

    rocket
}

fn rocket_figment(server: &config::ServerConfig) -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("address", server.address.clone()))
        .merge(("port", server.port))
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);

    if config.auth.uses_fallback_secret() {
        warn!("SECRET1 is not set, login tokens are encrypted with the built-in fallback secret");
    }

    let base_path = normalize_base_path(&config.api.base_path);
    let tokens = TokenCodec::new(&config.auth.secret, config.auth.token_ttl_seconds);
    let throttle = ViewThrottle::new(&config.view_throttle);

    let mut rocket = rocket::custom(rocket_figment(&config.server))
        .attach(RequestLogger)
        .attach(stage_stores(config.store.clone()))
        .manage(tokens)
        .manage(throttle);

    match build_cors(&config.cors).map(|options| options.to_cors()) {
        Ok(Ok(cors)) => rocket = rocket.attach(cors),
        Ok(Err(e)) => warn!(error = %e, "CORS disabled: could not build the CORS fairing"),
        Err(e) => warn!(error = %e, "CORS disabled"),
    }

    rocket = mount_api_routes(rocket, &base_path, &config.api, &config.auth.cookie_name);
    rocket = rocket.register(
        base_path.as_str(),
        catchers![
            app_routes::error::bad_request,
            app_routes::error::unauthorized,
            app_routes::error::forbidden,
            app_routes::error::not_found,
            app_routes::error::conflict,
            app_routes::error::unprocessable_entity,
            app_routes::error::too_many_requests,
            app_routes::error::internal_error,
        ],
    );

    rocket.manage(config)
}
