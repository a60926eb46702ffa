use authn::SessionSecret;
use axum::extract::FromRef;

use crate::backend::Backend;

#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub jwt_secret: SessionSecret,
}

impl FromRef<AppState> for SessionSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

impl FromRef<AppState> for Backend {
    fn from_ref(state: &AppState) -> Self {
        state.backend.clone()
    }
}
