//! connection settings for [`crate::ChallongeProvider`].

use url::Url;

/// where and how to reach a single Challonge tournament.
///
/// `tournament` is the Challonge "id or url" path segment (e.g. `my_event`
/// or, for tournaments under a subdomain, `subdomain-my_event`).
#[derive(Debug, Clone)]
pub struct ChallongeConfig {
    pub base_url: Url,
    pub username: String,
    pub api_key: String,
    pub tournament: String,
}

impl ChallongeConfig {
    /// `base_url` defaults to the public Challonge API root; override it in
    /// tests to point at a local stub server.
    pub fn new(username: impl Into<String>, api_key: impl Into<String>, tournament: impl Into<String>) -> Self {
        Self {
            base_url: Url::parse("https://api.challonge.com/v1").expect("static URL"),
            username: username.into(),
            api_key: api_key.into(),
            tournament: tournament.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// loads username/api_key/tournament from `CHALLONGE_USERNAME`,
    /// `CHALLONGE_API_KEY` and `CHALLONGE_TOURNAMENT`, after loading a local
    /// `.env` file if present (test support only, mirrors the teacher's
    /// `dotenvy`-gated `test_support` feature in `db_postgres`).
    #[cfg(feature = "test_support")]
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::new(
            std::env::var("CHALLONGE_USERNAME")?,
            std::env::var("CHALLONGE_API_KEY")?,
            std::env::var("CHALLONGE_TOURNAMENT")?,
        ))
    }
}
