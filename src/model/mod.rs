use serde::{Deserialize, Serialize};

/// What the display currently shows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenOut {
    pub text: String,
    pub font_size: u32,
    pub status: Option<String>,
    pub fetching: bool,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SiteOut {
    pub index: usize,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SitesResp {
    pub next_index: usize,
    pub sites: Vec<SiteOut>,
}

#[derive(Debug, Serialize)]
pub struct ButtonResp {
    pub ok: bool,
}
