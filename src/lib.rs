pub mod auth;
pub mod config;
pub mod domain {
    pub mod caller;
    pub mod error;
    pub mod payment;
}
pub mod gateways;
pub mod http {
    pub mod error;
    pub mod handlers {
        pub mod ops;
        pub mod payments;
    }
    pub mod middleware {
        pub mod rate_limit;
    }
    pub mod routes;
}
pub mod repo {
    pub mod memory_store;
    pub mod payment_store;
    pub mod payments_repo;
}
pub mod service {
    pub mod payment_service;
}

use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub payment_service: service::payment_service::PaymentService,
    pub jwt: auth::token::JwtKeys,
    pub redis_client: redis::Client,
}

impl FromRef<AppState> for auth::token::JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
