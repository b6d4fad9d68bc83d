use anyhow::anyhow;
use axum::{extract::State, Json};

use crate::{
    app::AppState,
    error::AppResult,
    model::ButtonResp,
    service::input::{ButtonPress, ButtonSource},
};

pub async fn press(State(state): State<AppState>) -> AppResult<Json<ButtonResp>> {
    state
        .buttons
        .send(ButtonPress::now(ButtonSource::Http))
        .await
        .map_err(|_| anyhow!("button channel closed"))?;
    Ok(Json(ButtonResp { ok: true }))
}
