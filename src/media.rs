use std::collections::{HashMap, HashSet};

use iced::widget::image::Handle;
use iced::Color;
use serde::Deserialize;

use crate::tmdb::ApiError;

pub const BACKGROUND_BLACK: Color = Color::from_rgb(0.0, 0.0, 0.0);
pub const SURFACE_DARK_GRAY: Color = Color::from_rgb(0.078, 0.078, 0.078);
pub const ACCENT_RED: Color = Color::from_rgb(0.898, 0.035, 0.078);
pub const TEXT_WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);
pub const TEXT_GRAY: Color = Color::from_rgb(0.702, 0.702, 0.702);
pub const STAR_GOLD: Color = Color::from_rgb(0.961, 0.788, 0.196);

pub const SECTION_IDS: [&str; 10] = [
    "section-0",
    "section-1",
    "section-2",
    "section-3",
    "section-4",
    "section-5",
    "section-6",
    "section-7",
    "section-8",
    "section-9",
];

pub fn section_id(index: usize) -> Option<&'static str> {
    SECTION_IDS.get(index).copied()
}

pub type MediaId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Movie,
    TvSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Movies,
    Series,
    MovieDetail(MediaId),
    SeriesDetail(MediaId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Movies,
    Series,
}

#[derive(Debug, Clone)]
pub enum ScrollDirection {
    Left,
    Right,
}

/// A fixed carousel category backed by one TMDB genre id.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub label: &'static str,
    pub genre_id: u64,
}

pub const MOVIE_CATEGORIES: [Category; 6] = [
    Category { label: "Action", genre_id: 28 },
    Category { label: "Comedy", genre_id: 35 },
    Category { label: "Drama", genre_id: 18 },
    Category { label: "Animation", genre_id: 16 },
    Category { label: "Thriller", genre_id: 53 },
    Category { label: "Horror", genre_id: 27 },
];

pub const SERIES_CATEGORIES: [Category; 6] = [
    Category { label: "Action & Adventure", genre_id: 10759 },
    Category { label: "Comedy", genre_id: 35 },
    Category { label: "Drama", genre_id: 18 },
    Category { label: "Animation", genre_id: 16 },
    Category { label: "Sci-Fi & Fantasy", genre_id: 10765 },
    Category { label: "Crime", genre_id: 80 },
];

/// Carousel index of the first genre strip on each listing page. The
/// popular strip is always index 0; the movies page inserts a trending
/// strip before the genres.
pub const MOVIE_GENRE_SECTION_BASE: usize = 2;
pub const SERIES_GENRE_SECTION_BASE: usize = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// One movie or series as it appears in list responses. Image fields
/// hold path fragments, never full URLs.
#[derive(Debug, Clone)]
pub struct Title {
    pub id: MediaId,
    pub media_type: MediaType,
    pub title: String,
    pub original_title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub original_language: String,
    pub adult: bool,
    pub popularity: f32,
    pub vote_average: f32,
    pub vote_count: u32,
}

impl Title {
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_ref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }
}

/// Raw list-entry shape shared by every TMDB list endpoint. Movies carry
/// `title`/`release_date`, series carry `name`/`first_air_date`; trending
/// responses additionally tag each entry with `media_type`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTitle {
    pub id: MediaId,
    pub title: Option<String>,
    pub name: Option<String>,
    pub original_title: Option<String>,
    pub original_name: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub media_type: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub popularity: f32,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
}

impl TmdbTitle {
    /// `fallback` types entries from per-kind endpoints (`/movie/popular`,
    /// `/discover/tv`, ...) where TMDB omits the `media_type` tag.
    pub fn into_title(self, fallback: MediaType) -> Title {
        let media_type = match self.media_type.as_deref() {
            Some("tv") => MediaType::TvSeries,
            Some("movie") => MediaType::Movie,
            _ => fallback,
        };
        let title = self.title.or(self.name).unwrap_or_default();
        Title {
            id: self.id,
            media_type,
            original_title: self
                .original_title
                .or(self.original_name)
                .unwrap_or_else(|| title.clone()),
            title,
            overview: self.overview,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            release_date: self.release_date.or(self.first_air_date),
            original_language: self.original_language,
            adult: self.adult,
            popularity: self.popularity,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
        }
    }
}

/// Pagination envelope returned by every TMDB list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse<T> {
    pub page: u32,
    pub results: Vec<T>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl<T> PageResponse<T> {
    pub fn map_results<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            page: self.page,
            results: self.results.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductionCompany {
    pub id: u64,
    pub name: String,
    pub logo_path: Option<String>,
    #[serde(default)]
    pub origin_country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductionCountry {
    pub iso_3166_1: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpokenLanguage {
    pub english_name: String,
    pub iso_639_1: String,
    pub name: String,
}

/// Full detail record for one title. Field aliases absorb the
/// movie/series naming split (`title`/`name`, `release_date`/
/// `first_air_date`); kind-specific fields stay optional.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleDetails {
    pub id: MediaId,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(alias = "original_name", default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(alias = "first_air_date")]
    pub release_date: Option<String>,
    pub last_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub popularity: f32,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    #[serde(default)]
    pub production_countries: Vec<ProductionCountry>,
    #[serde(default)]
    pub spoken_languages: Vec<SpokenLanguage>,
    // movies only
    pub runtime: Option<u32>,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
    // series only
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
}

impl TitleDetails {
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_ref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

/// Details and credits for one title, fetched together for the detail
/// page.
#[derive(Debug, Clone)]
pub struct DetailBundle {
    pub media_type: MediaType,
    pub details: TitleDetails,
    pub credits: Credits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub biography: String,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub known_for_department: String,
    pub profile_path: Option<String>,
    #[serde(default)]
    pub popularity: f32,
}

/// In-memory image cache: URL -> decoded handle, plus a pending set so a
/// URL is only fetched once and a one-way failed set backing the
/// placeholder fallback (a failed image is never retried).
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    cache: HashMap<String, Handle>,
    pending: HashSet<String>,
    failed: HashSet<String>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&Handle> {
        self.cache.get(url)
    }

    pub fn insert(&mut self, url: String, handle: Handle) {
        self.pending.remove(&url);
        self.cache.insert(url, handle);
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    pub fn mark_pending(&mut self, url: String) {
        self.pending.insert(url);
    }

    pub fn mark_failed(&mut self, url: String) {
        self.pending.remove(&url);
        self.failed.insert(url);
    }

    pub fn has_failed(&self, url: &str) -> bool {
        self.failed.contains(url)
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Setup(crate::settings::SetupMessage),
    NavigateTo(Page),
    SearchQueryChanged(String),
    ClearSearch,
    PopularMoviesLoaded(u64, Result<Vec<Title>, ApiError>),
    TrendingMoviesLoaded(u64, Result<Vec<Title>, ApiError>),
    PopularSeriesLoaded(u64, Result<Vec<Title>, ApiError>),
    GenrePageLoaded(MediaType, usize, u64, Result<PageResponse<Title>, ApiError>),
    GenreLoadMore(MediaType, usize),
    DetailLoaded(u64, Result<Box<DetailBundle>, ApiError>),
    HoverCard(Option<MediaId>),
    HoverSection(Option<usize>),
    ToggleFavorite(MediaId),
    PlayContent(MediaId),
    AddToList(MediaId),
    ScrollSection(usize, ScrollDirection),
    AnimateScroll(usize),
    SectionScrolled(usize, f32),
    LoadImage(String),
    ImageLoaded(String, Result<Handle, String>),
    RetryLoad,
}

/// Case-insensitive substring match against both the display and the
/// original title. A blank query matches everything.
pub fn matches_query(title: &Title, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    title.title.to_lowercase().contains(&query)
        || title.original_title.to_lowercase().contains(&query)
}

pub fn filter_titles<'a>(items: &'a [Title], query: &str) -> Vec<&'a Title> {
    items
        .iter()
        .filter(|title| matches_query(title, query))
        .collect()
}

pub fn truncate_overview(overview: &str, max_chars: usize) -> String {
    if overview.chars().count() <= max_chars {
        return overview.to_string();
    }
    let truncated: String = overview.chars().take(max_chars).collect();
    format!(
        "{}...",
        truncated
            .rfind(' ')
            .map_or(truncated.as_str(), |i| &truncated[..i])
    )
}

pub fn format_runtime(minutes: u32) -> String {
    let (h, m) = (minutes / 60, minutes % 60);
    match (h, m) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

pub fn format_dollars(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_title(id: MediaId, name: &str, original: &str) -> Title {
        Title {
            id,
            media_type: MediaType::Movie,
            title: name.to_string(),
            original_title: original.to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            original_language: String::from("en"),
            adult: false,
            popularity: 0.0,
            vote_average: 0.0,
            vote_count: 0,
        }
    }

    #[test]
    fn filter_matches_display_and_original_title() {
        let items = vec![
            sample_title(1, "The Matrix", "The Matrix"),
            sample_title(2, "Amélie", "Le Fabuleux Destin d'Amélie Poulain"),
            sample_title(3, "Seven Samurai", "Shichinin no Samurai"),
        ];

        let hits = filter_titles(&items, "matrix");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        // matches via the original title only
        let hits = filter_titles(&items, "shichinin");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 3);

        let hits = filter_titles(&items, "SAMURAI");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn blank_query_matches_everything() {
        let items = vec![sample_title(1, "A", "A"), sample_title(2, "B", "B")];
        assert_eq!(filter_titles(&items, "").len(), 2);
        assert_eq!(filter_titles(&items, "   ").len(), 2);
    }

    #[test]
    fn truncate_cuts_at_word_boundary_with_ellipsis() {
        let text = "An ordinary office worker discovers a hidden world";
        let out = truncate_overview(text, 20);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 23);
        assert_eq!(truncate_overview("short", 20), "short");
    }

    #[test]
    fn truncate_is_safe_on_multibyte_text() {
        let text = "Amélie é uma jovem garçonete que decide mudar a vida das pessoas";
        let out = truncate_overview(text, 10);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn list_entry_typing_prefers_explicit_media_type_tag() {
        let raw = TmdbTitle {
            id: 7,
            title: None,
            name: Some(String::from("Dark")),
            original_title: None,
            original_name: Some(String::from("Dark")),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            media_type: Some(String::from("tv")),
            release_date: None,
            first_air_date: Some(String::from("2017-12-01")),
            original_language: String::from("de"),
            adult: false,
            popularity: 0.0,
            vote_average: 8.4,
            vote_count: 5000,
        };
        let title = raw.clone().into_title(MediaType::Movie);
        assert_eq!(title.media_type, MediaType::TvSeries);
        assert_eq!(title.title, "Dark");
        assert_eq!(title.release_year(), Some(2017));

        // untagged entries fall back to the endpoint's kind
        let mut untagged = raw;
        untagged.media_type = None;
        assert_eq!(
            untagged.into_title(MediaType::TvSeries).media_type,
            MediaType::TvSeries
        );
    }

    #[test]
    fn runtime_and_currency_formatting() {
        assert_eq!(format_runtime(148), "2h 28m");
        assert_eq!(format_runtime(60), "1h");
        assert_eq!(format_runtime(45), "45m");
        assert_eq!(format_dollars(160_000_000), "$160,000,000");
        assert_eq!(format_dollars(999), "$999");
    }
}
