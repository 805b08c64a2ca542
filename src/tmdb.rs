use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::media::{
    Credits, DetailBundle, MediaId, MediaType, PageResponse, Person, Title, TitleDetails,
    TmdbTitle,
};
use crate::settings::AppSettings;

const BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const STORE_TTL_SECONDS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("request failed: {code} {text}")]
    Status { code: u16, text: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    pub fn path_token(self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

/// Sub-resources that can ride along on a details request via
/// `append_to_response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Append {
    Credits,
    Videos,
    Images,
    Reviews,
}

impl Append {
    fn token(self) -> &'static str {
        match self {
            Append::Credits => "credits",
            Append::Videos => "videos",
            Append::Images => "images",
            Append::Reviews => "reviews",
        }
    }
}

pub fn append_param(extras: &[Append]) -> String {
    extras
        .iter()
        .map(|e| e.token())
        .collect::<Vec<_>>()
        .join(",")
}

/// Details response with appended sub-resources. Only credits are given a
/// typed slot; the rest of the body flattens into the details record.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleDetailsBundle {
    #[serde(flatten)]
    pub details: TitleDetails,
    pub credits: Option<Credits>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W500,
    W780,
    W1280,
    Original,
}

impl ImageSize {
    pub fn token(self) -> &'static str {
        match self {
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::W1280 => "w1280",
            ImageSize::Original => "original",
        }
    }
}

pub(crate) fn media_type_path(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Movie => "movie",
        MediaType::TvSeries => "tv",
    }
}

#[derive(Debug)]
struct StoreEntry {
    data: PageResponse<Title>,
    created_at: Instant,
}

impl StoreEntry {
    fn new(data: PageResponse<Title>) -> Self {
        Self {
            data,
            created_at: Instant::now(),
        }
    }

    fn is_valid(&self) -> bool {
        self.created_at.elapsed() < Duration::from_secs(STORE_TTL_SECONDS)
    }
}

/// Keyed store for list requests: resolved pages are served from memory
/// for a short window, and concurrent identical requests share a single
/// network call through a per-key cell. A failed fetch leaves nothing
/// behind, so the next trigger goes back to the network.
#[derive(Clone, Default)]
pub(crate) struct RequestStore {
    resolved: Arc<RwLock<HashMap<String, StoreEntry>>>,
    in_flight: Arc<Mutex<HashMap<String, Arc<OnceCell<PageResponse<Title>>>>>>,
}

impl RequestStore {
    fn get(&self, key: &str) -> Option<PageResponse<Title>> {
        self.resolved
            .read()
            .ok()?
            .get(key)
            .filter(|e| e.is_valid())
            .map(|e| e.data.clone())
    }

    fn insert(&self, key: String, data: PageResponse<Title>) {
        if let Ok(mut resolved) = self.resolved.write() {
            resolved.insert(key, StoreEntry::new(data));
        }
    }

    pub(crate) async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        fetch: F,
    ) -> Result<PageResponse<Title>, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PageResponse<Title>, ApiError>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let cell = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.entry(key.to_string()).or_default().clone()
        };

        let result = cell.get_or_try_init(fetch).await.cloned();

        let mut in_flight = self.in_flight.lock().await;
        match &result {
            Ok(page) => {
                self.insert(key.to_string(), page.clone());
                in_flight.remove(key);
            }
            Err(_) => {
                if let Some(existing) = in_flight.get(key) {
                    if Arc::ptr_eq(existing, &cell) && cell.get().is_none() {
                        in_flight.remove(key);
                    }
                }
            }
        }
        result
    }
}

pub(crate) fn list_fingerprint(path: &str, params: &[(&str, String)]) -> String {
    let mut key = String::from(path);
    for (i, (name, value)) in params.iter().enumerate() {
        key.push(if i == 0 { '?' } else { '&' });
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

pub async fn fetch_image_bytes(url: String) -> Result<Vec<u8>, String> {
    reqwest::get(&url)
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| e.to_string())
}

#[derive(Clone)]
pub struct TmdbClient {
    access_token: String,
    language: String,
    base_url: String,
    image_base_url: String,
    http_client: Arc<reqwest::Client>,
    store: RequestStore,
}

impl TmdbClient {
    pub fn new(access_token: String, language: String) -> Self {
        Self {
            access_token,
            language,
            base_url: String::from(BASE_URL),
            image_base_url: String::from(IMAGE_BASE_URL),
            http_client: Arc::new(reqwest::Client::new()),
            store: RequestStore::default(),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        let language = if settings.language.is_empty() {
            String::from("en-US")
        } else {
            settings.language.clone()
        };
        Self::new(settings.access_token.clone(), language)
    }

    /// Builds the CDN URL for an image path fragment. Absent or empty
    /// paths yield `None`; construction is pure and deferred to the view
    /// layer.
    pub fn image_url(&self, path: Option<&str>, size: ImageSize) -> Option<String> {
        let path = path?;
        if path.is_empty() {
            return None;
        }
        Some(format!("{}/{}{}", self.image_base_url, size.token(), path))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "tmdb request");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("language", self.language.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                text: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn fetch_list(
        &self,
        path: String,
        params: Vec<(&'static str, String)>,
        fallback: MediaType,
    ) -> Result<PageResponse<Title>, ApiError> {
        let key = list_fingerprint(&path, &params);
        let client = self.clone();
        self.store
            .get_or_fetch(&key, move || async move {
                let page: PageResponse<TmdbTitle> = client.get_json(&path, &params).await?;
                debug!(
                    page = page.page,
                    total_pages = page.total_pages,
                    total_results = page.total_results,
                    "list fetched"
                );
                Ok(page.map_results(|raw| raw.into_title(fallback)))
            })
            .await
    }

    pub async fn popular_titles(
        &self,
        media_type: MediaType,
        page: u32,
    ) -> Result<PageResponse<Title>, ApiError> {
        let path = format!("/{}/popular", media_type_path(media_type));
        self.fetch_list(path, vec![("page", page.to_string())], media_type)
            .await
    }

    pub async fn trending_titles(
        &self,
        media_type: MediaType,
        window: TimeWindow,
        page: u32,
    ) -> Result<PageResponse<Title>, ApiError> {
        let path = format!(
            "/trending/{}/{}",
            media_type_path(media_type),
            window.path_token()
        );
        self.fetch_list(path, vec![("page", page.to_string())], media_type)
            .await
    }

    pub async fn titles_by_genre(
        &self,
        media_type: MediaType,
        genre_id: u64,
        page: u32,
    ) -> Result<PageResponse<Title>, ApiError> {
        let path = format!("/discover/{}", media_type_path(media_type));
        let params = vec![
            ("with_genres", genre_id.to_string()),
            ("sort_by", String::from("popularity.desc")),
            ("page", page.to_string()),
        ];
        self.fetch_list(path, params, media_type).await
    }

    pub async fn search_titles(
        &self,
        media_type: MediaType,
        query: &str,
        page: u32,
    ) -> Result<PageResponse<Title>, ApiError> {
        let path = format!("/search/{}", media_type_path(media_type));
        let params = vec![("query", query.to_string()), ("page", page.to_string())];
        self.fetch_list(path, params, media_type).await
    }

    pub async fn title_details(
        &self,
        media_type: MediaType,
        id: MediaId,
    ) -> Result<TitleDetails, ApiError> {
        self.get_json(&format!("/{}/{}", media_type_path(media_type), id), &[])
            .await
    }

    /// One combined request: details plus the given sub-resources.
    pub async fn title_details_with(
        &self,
        media_type: MediaType,
        id: MediaId,
        extras: &[Append],
    ) -> Result<TitleDetailsBundle, ApiError> {
        let params = [("append_to_response", append_param(extras))];
        self.get_json(
            &format!("/{}/{}", media_type_path(media_type), id),
            &params,
        )
        .await
    }

    pub async fn credits(&self, media_type: MediaType, id: MediaId) -> Result<Credits, ApiError> {
        self.get_json(
            &format!("/{}/{}/credits", media_type_path(media_type), id),
            &[],
        )
        .await
    }

    pub async fn person_details(&self, id: u64) -> Result<Person, ApiError> {
        self.get_json(&format!("/person/{}", id), &[]).await
    }
}

/// Detail-page bundle for a movie: details and credits requested
/// concurrently, first failure wins.
pub async fn load_movie_detail(client: TmdbClient, id: MediaId) -> Result<DetailBundle, ApiError> {
    let (details, credits) = tokio::try_join!(
        client.title_details(MediaType::Movie, id),
        client.credits(MediaType::Movie, id),
    )?;
    Ok(DetailBundle {
        media_type: MediaType::Movie,
        details,
        credits,
    })
}

/// Detail-page bundle for a series: one combined request with appended
/// credits.
pub async fn load_series_detail(client: TmdbClient, id: MediaId) -> Result<DetailBundle, ApiError> {
    let bundle = client
        .title_details_with(MediaType::TvSeries, id, &[Append::Credits])
        .await?;
    Ok(DetailBundle {
        media_type: MediaType::TvSeries,
        details: bundle.details,
        credits: bundle.credits.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn client() -> TmdbClient {
        TmdbClient::new(String::from("test-token"), String::from("en-US"))
    }

    fn page_of(ids: &[MediaId]) -> PageResponse<Title> {
        PageResponse {
            page: 1,
            results: ids
                .iter()
                .map(|&id| crate::media::tests::sample_title(id, "t", "t"))
                .collect(),
            total_pages: 1,
            total_results: ids.len() as u32,
        }
    }

    #[test]
    fn image_url_is_none_for_absent_or_empty_path() {
        let client = client();
        assert_eq!(client.image_url(None, ImageSize::W500), None);
        assert_eq!(client.image_url(Some(""), ImageSize::Original), None);
    }

    #[test]
    fn image_url_joins_base_size_and_path() {
        let client = client();
        let url = client.image_url(Some("/abc.jpg"), ImageSize::W500);
        assert_eq!(
            url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        // pure: repeated calls agree
        assert_eq!(client.image_url(Some("/abc.jpg"), ImageSize::W500), url);
        assert_eq!(
            client
                .image_url(Some("/abc.jpg"), ImageSize::Original)
                .as_deref(),
            Some("https://image.tmdb.org/t/p/original/abc.jpg")
        );
    }

    #[test]
    fn append_param_is_comma_joined() {
        assert_eq!(append_param(&[Append::Credits]), "credits");
        assert_eq!(
            append_param(&[Append::Credits, Append::Videos, Append::Images, Append::Reviews]),
            "credits,videos,images,reviews"
        );
    }

    #[test]
    fn time_window_tokens() {
        assert_eq!(TimeWindow::Day.path_token(), "day");
        assert_eq!(TimeWindow::Week.path_token(), "week");
    }

    #[test]
    fn fingerprints_distinguish_params() {
        let a = list_fingerprint("/discover/movie", &[("with_genres", String::from("28"))]);
        let b = list_fingerprint("/discover/movie", &[("with_genres", String::from("35"))]);
        assert_ne!(a, b);
        assert_eq!(
            a,
            list_fingerprint("/discover/movie", &[("with_genres", String::from("28"))])
        );
        assert_eq!(list_fingerprint("/movie/popular", &[]), "/movie/popular");
    }

    #[test]
    fn parses_list_envelope() {
        let json = serde_json::json!({
            "page": 2,
            "results": [
                {
                    "id": 603,
                    "title": "The Matrix",
                    "original_title": "The Matrix",
                    "overview": "A computer hacker learns the truth.",
                    "poster_path": "/matrix.jpg",
                    "release_date": "1999-03-30",
                    "original_language": "en",
                    "vote_average": 8.2,
                    "vote_count": 26000,
                    "popularity": 85.5
                }
            ],
            "total_pages": 10,
            "total_results": 200
        });

        let page: PageResponse<TmdbTitle> = serde_json::from_value(json).unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 10);
        let titles = page.map_results(|raw| raw.into_title(MediaType::Movie));
        assert_eq!(titles.results[0].title, "The Matrix");
        assert_eq!(titles.results[0].release_year(), Some(1999));
    }

    #[test]
    fn parses_movie_details() {
        let json = serde_json::json!({
            "id": 27205,
            "title": "Inception",
            "original_title": "Inception",
            "overview": "A thief who steals corporate secrets.",
            "tagline": "Your mind is the scene of the crime.",
            "release_date": "2010-07-16",
            "runtime": 148,
            "budget": 160000000u64,
            "revenue": 825532764u64,
            "status": "Released",
            "vote_average": 8.4,
            "vote_count": 34000,
            "genres": [
                { "id": 28, "name": "Action" },
                { "id": 878, "name": "Science Fiction" }
            ],
            "production_companies": [
                { "id": 9996, "name": "Syncopy", "logo_path": null, "origin_country": "GB" }
            ],
            "production_countries": [
                { "iso_3166_1": "US", "name": "United States of America" }
            ],
            "spoken_languages": [
                { "english_name": "English", "iso_639_1": "en", "name": "English" }
            ]
        });

        let details: TitleDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.title, "Inception");
        assert_eq!(details.runtime, Some(148));
        assert_eq!(details.budget, Some(160_000_000));
        assert_eq!(details.genres.len(), 2);
        assert_eq!(details.release_year(), Some(2010));
        assert!(details.number_of_seasons.is_none());
    }

    #[test]
    fn parses_series_details_via_aliases() {
        let json = serde_json::json!({
            "id": 1396,
            "name": "Breaking Bad",
            "original_name": "Breaking Bad",
            "overview": "A chemistry teacher turns to crime.",
            "first_air_date": "2008-01-20",
            "last_air_date": "2013-09-29",
            "number_of_seasons": 5,
            "number_of_episodes": 62,
            "vote_average": 8.9,
            "genres": [{ "id": 18, "name": "Drama" }]
        });

        let details: TitleDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.title, "Breaking Bad");
        assert_eq!(details.release_year(), Some(2008));
        assert_eq!(details.number_of_seasons, Some(5));
        assert_eq!(details.runtime, None);
    }

    #[test]
    fn parses_details_with_appended_credits() {
        let json = serde_json::json!({
            "id": 1396,
            "name": "Breaking Bad",
            "first_air_date": "2008-01-20",
            "credits": {
                "cast": [
                    {
                        "id": 17419,
                        "name": "Bryan Cranston",
                        "character": "Walter White",
                        "profile_path": "/cranston.jpg",
                        "order": 0
                    }
                ],
                "crew": [
                    {
                        "id": 66633,
                        "name": "Vince Gilligan",
                        "job": "Executive Producer",
                        "department": "Production",
                        "profile_path": null
                    }
                ]
            }
        });

        let bundle: TitleDetailsBundle = serde_json::from_value(json).unwrap();
        assert_eq!(bundle.details.title, "Breaking Bad");
        let credits = bundle.credits.unwrap();
        assert_eq!(credits.cast[0].character, "Walter White");
        assert_eq!(credits.crew[0].department, "Production");
    }

    #[test]
    fn parses_person() {
        let json = serde_json::json!({
            "id": 6384,
            "name": "Keanu Reeves",
            "biography": "Keanu Charles Reeves is a Canadian actor.",
            "birthday": "1964-09-02",
            "deathday": null,
            "place_of_birth": "Beirut, Lebanon",
            "known_for_department": "Acting",
            "profile_path": "/keanu.jpg",
            "popularity": 45.2
        });

        let person: Person = serde_json::from_value(json).unwrap();
        assert_eq!(person.name, "Keanu Reeves");
        assert_eq!(person.birthday.as_deref(), Some("1964-09-02"));
        assert!(person.deathday.is_none());
    }

    #[tokio::test]
    async fn store_serves_resolved_entries_without_refetching() {
        let store = RequestStore::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let result = store
                .get_or_fetch("key", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(page_of(&[1, 2]))
                })
                .await
                .unwrap();
            assert_eq!(result.results.len(), 2);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn store_shares_one_call_between_concurrent_requests() {
        let store = RequestStore::default();
        let calls = AtomicUsize::new(0);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(page_of(&[9]))
        };

        let (a, b) = tokio::join!(
            store.get_or_fetch("key", fetch),
            store.get_or_fetch("key", fetch)
        );
        assert_eq!(a.unwrap().results[0].id, 9);
        assert_eq!(b.unwrap().results[0].id, 9);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn store_failure_is_not_sticky() {
        let store = RequestStore::default();
        let calls = AtomicUsize::new(0);

        let err = store
            .get_or_fetch("key", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Status {
                    code: 500,
                    text: String::from("Internal Server Error"),
                })
            })
            .await;
        assert!(err.is_err());

        let ok = store
            .get_or_fetch("key", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(page_of(&[4]))
            })
            .await;
        assert_eq!(ok.unwrap().results[0].id, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
