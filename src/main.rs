use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use koinonia::config::{Config, init_config};
use koinonia::database::init_database;
use koinonia::handlers::{ai, auth, invitations, platform};
use koinonia::middleware::RequestId;

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Koinonia API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    println!("🚀 Starting Koinonia API server...");

    // Load configuration
    let config = init_config(Config::from_env()?);
    println!(
        "📋 Configuration loaded (environment: {})",
        config.environment
    );

    // Initialize database
    init_database(&config.database_url).await?;
    println!("✅ Database initialized");

    let server_address = config.server_address();
    println!("🌐 Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allowed_origin(&config.client_base_url)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::scope("/invitations")
                            .route("", web::post().to(invitations::create))
                            .route("", web::get().to(invitations::list))
                            .route("/validate/{token}", web::get().to(invitations::validate))
                            .route("/accept", web::post().to(invitations::accept))
                            .route("/{id}", web::delete().to(invitations::revoke)),
                    )
                    .service(
                        web::scope("/ai")
                            .route("/chat", web::post().to(ai::chat))
                            .route("/access", web::get().to(ai::access))
                            .route("/history", web::get().to(ai::history_list))
                            .route("/history", web::post().to(ai::history_save)),
                    )
                    .service(
                        web::scope("/platform")
                            .route(
                                "/churches/{church_id}/features",
                                web::get().to(platform::get_features),
                            )
                            .route(
                                "/churches/{church_id}/features",
                                web::put().to(platform::update_features),
                            )
                            .route(
                                "/churches/{church_id}/trial",
                                web::post().to(platform::enable_trial),
                            )
                            .route(
                                "/churches/{church_id}/users/{user_id}/features",
                                web::put().to(platform::set_user_features),
                            ),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
