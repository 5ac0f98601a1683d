use std::sync::Arc;

use axum::Router;

use janlog::{
    auth,
    game::repository::InMemoryGameRepository,
    router::build_router,
    section::repository::InMemorySectionRepository,
    shared::AppState,
    user::{
        models::UserModel,
        repository::{InMemoryUserRepository, UserRepository},
    },
};

pub const TEST_SECRET: &str = "test-secret";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub display_name: String,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub admin: TestUser,
    pub players: Vec<TestUser>,
}

impl TestApp {
    pub fn player(&self, display_name: &str) -> &TestUser {
        self.players
            .iter()
            .find(|p| p.display_name == display_name)
            .unwrap_or_else(|| panic!("no seeded player named {}", display_name))
    }

    pub fn participant_ids(&self) -> Vec<String> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    /// A syntactically valid token for a user that is not on the roster
    pub fn stranger_token(&self) -> String {
        auth::encode_actor_token(TEST_SECRET, "stranger-id", false).unwrap()
    }
}

pub struct TestAppBuilder {
    player_names: Vec<String>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            player_names: vec![],
        }
    }

    pub fn with_players(mut self, names: Vec<&str>) -> Self {
        self.player_names = names.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_four_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "chiyo", "daiki"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "chiyo"])
    }

    pub async fn build(self) -> TestApp {
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let section_repository = Arc::new(InMemorySectionRepository::new());
        let game_repository = Arc::new(InMemoryGameRepository::new());

        let admin_model = UserModel::new("admin".to_string(), true);
        user_repository.create_user(&admin_model).await.unwrap();
        let admin = TestUser {
            token: auth::encode_actor_token(TEST_SECRET, &admin_model.id, true).unwrap(),
            id: admin_model.id,
            display_name: admin_model.display_name,
        };

        let mut players = Vec::new();
        for name in &self.player_names {
            let model = UserModel::new(name.clone(), false);
            user_repository.create_user(&model).await.unwrap();
            players.push(TestUser {
                token: auth::encode_actor_token(TEST_SECRET, &model.id, false).unwrap(),
                id: model.id,
                display_name: model.display_name,
            });
        }

        let app_state = AppState::new(
            user_repository,
            section_repository,
            game_repository,
            TEST_SECRET.to_string(),
        );

        TestApp {
            router: build_router(app_state),
            admin,
            players,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
