use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use academy_server::{
    app_state::AppState, auth::{AuthMiddleware, JwtService}, config::Config, handlers,
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let checked = config.validate().and_then(|()| match config.is_production() {
        true => config.validate_for_production(),
        false => Ok(()),
    });
    if let Err(err) = checked {
        log::error!("Refusing to start: {}", err);
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()));
    }

    let state = AppState::new(config.clone()).await.map_err(|err| {
        log::error!("Failed to initialise application state: {}", err);
        std::io::Error::other(err.to_string())
    })?;

    let jwt_service = web::Data::new(JwtService::new(
        &config.jwt_secret,
        config.jwt_expiration_hours,
    ));
    let state = web::Data::new(state);
    let frontend_url = config.frontend_url.clone();
    let bind_address = (config.web_server_host.clone(), config.web_server_port);

    log::info!(
        "Starting academy-server {} at http://{}:{}",
        env!("CARGO_PKG_VERSION"),
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(jwt_service.clone())
            .wrap(AuthMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(cors)
            .wrap(Logger::new(r#"%a "%r" %s %b %{x-request-id}o %Dms"#))
            .configure(handlers::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
