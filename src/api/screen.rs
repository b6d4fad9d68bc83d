use axum::{extract::State, Json};

use crate::{
    app::AppState,
    model::{ScreenOut, SiteOut, SitesResp},
};

pub async fn current_screen(State(state): State<AppState>) -> Json<ScreenOut> {
    Json(state.screen.snapshot())
}

pub async fn list_sites(State(state): State<AppState>) -> Json<SitesResp> {
    let last = state.sites.len().saturating_sub(1);
    let next_index = state.store.read_current_index(last).await;
    let sites = state
        .sites
        .iter()
        .enumerate()
        .map(|(index, site)| SiteOut {
            index,
            name: site.name.clone(),
            url: site.url.clone(),
        })
        .collect();

    Json(SitesResp { next_index, sites })
}
