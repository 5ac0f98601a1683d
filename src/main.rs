use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use janlog::auth;
use janlog::game::repository::InMemoryGameRepository;
use janlog::router::build_router;
use janlog::section::repository::InMemorySectionRepository;
use janlog::shared::AppState;
use janlog::user::models::UserModel;
use janlog::user::repository::{InMemoryUserRepository, UserRepository};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "janlog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting janlog score server");

    // Create shared application state with dependency injection
    // Easy to switch between implementations:
    let user_repository = Arc::new(InMemoryUserRepository::new());
    let section_repository = Arc::new(InMemorySectionRepository::new());
    let game_repository = Arc::new(InMemoryGameRepository::new());

    // For production with PostgreSQL:
    // let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    // let pool = sqlx::PgPool::connect(&database_url).await.expect("Failed to connect to database");
    // let user_repository = Arc::new(janlog::user::repository::PostgresUserRepository::new(pool.clone()));
    // let section_repository = Arc::new(janlog::section::repository::PostgresSectionRepository::new(pool.clone()));
    // let game_repository = Arc::new(janlog::game::repository::PostgresGameRepository::new(pool));

    let token_secret =
        std::env::var("TOKEN_SECRET").unwrap_or_else(|_| "janlog-dev-secret".to_string());

    // Seed an initial administrator so a fresh in-memory instance is
    // usable; the logged token authenticates the first requests.
    let admin = UserModel::new("admin".to_string(), true);
    user_repository
        .create_user(&admin)
        .await
        .expect("Failed to seed admin user");
    match auth::encode_actor_token(&token_secret, &admin.id, true) {
        Ok(token) => info!(user_id = %admin.id, "Seeded admin user; dev actor token: {}", token),
        Err(err) => tracing::warn!(?err, "Failed to issue dev actor token"),
    }

    let app_state = AppState::new(
        user_repository,
        section_repository,
        game_repository,
        token_secret,
    );

    let app = build_router(app_state);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
