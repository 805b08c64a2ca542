mod cards;
mod components;
mod detail_page;
mod handlers;
mod hero;
mod loaders;
mod media;
mod settings;
mod tmdb;

use std::collections::HashSet;

use iced::widget::container;
use iced::{Element, Font, Length, Size, Task, Theme};
use tracing_subscriber::EnvFilter;

use loaders::{GenreListing, SectionLoad};
use media::{
    DetailBundle, ImageCache, MediaId, Message, Page, Title, BACKGROUND_BLACK, MOVIE_CATEGORIES,
    SERIES_CATEGORIES,
};
use settings::{AppSettings, SetupPage};
use tmdb::TmdbClient;

pub struct Marquee {
    pub setup_page: Option<SetupPage>,
    pub current_page: Page,
    pub search_query: String,
    pub favorites: HashSet<MediaId>,
    pub hovered_card: Option<MediaId>,
    pub hovered_section: Option<usize>,
    pub section_scroll_offsets: Vec<f32>,
    pub section_scroll_targets: Vec<f32>,
    pub image_cache: ImageCache,
    pub client: Option<TmdbClient>,
    pub popular_movies: SectionLoad<Vec<Title>>,
    pub trending_movies: SectionLoad<Vec<Title>>,
    pub movie_genres: Vec<GenreListing>,
    pub popular_series: SectionLoad<Vec<Title>>,
    pub series_genres: Vec<GenreListing>,
    pub detail: SectionLoad<DetailBundle>,
}

impl Default for Marquee {
    fn default() -> Self {
        Self {
            setup_page: None,
            current_page: Page::Movies,
            search_query: String::new(),
            favorites: HashSet::new(),
            hovered_card: None,
            hovered_section: None,
            section_scroll_offsets: Vec::new(),
            section_scroll_targets: Vec::new(),
            image_cache: ImageCache::new(),
            client: None,
            popular_movies: SectionLoad::default(),
            trending_movies: SectionLoad::default(),
            movie_genres: MOVIE_CATEGORIES
                .iter()
                .map(|category| GenreListing::new(category.genre_id))
                .collect(),
            popular_series: SectionLoad::default(),
            series_genres: SERIES_CATEGORIES
                .iter()
                .map(|category| GenreListing::new(category.genre_id))
                .collect(),
            detail: SectionLoad::default(),
        }
    }
}

impl Marquee {
    fn new() -> (Self, Task<Message>) {
        let settings = match AppSettings::load() {
            Some(s) if s.is_valid() => s,
            _ => {
                return (
                    Self {
                        setup_page: Some(SetupPage::default()),
                        ..Default::default()
                    },
                    Task::none(),
                );
            }
        };

        let mut app = Self {
            client: Some(TmdbClient::from_settings(&settings)),
            ..Default::default()
        };
        let task = handlers::handle_message(&mut app, Message::NavigateTo(Page::Movies));
        (app, task)
    }

    fn initialize_with_settings(&mut self, settings: AppSettings) -> Task<Message> {
        self.client = Some(TmdbClient::from_settings(&settings));
        self.setup_page = None;
        handlers::handle_message(self, Message::NavigateTo(Page::Movies))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        if let Message::Setup(setup_message) = message {
            if let Some(ref mut setup) = self.setup_page {
                if let Some(settings) = setup.update(setup_message) {
                    return self.initialize_with_settings(settings);
                }
            }
            return Task::none();
        }
        handlers::handle_message(self, message)
    }

    fn view(&self) -> Element<'_, Message> {
        if let Some(ref setup) = self.setup_page {
            return setup.view().map(Message::Setup);
        }

        container(self.view_main_content())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            })
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marquee=info")),
        )
        .init();

    iced::application(Marquee::new, Marquee::update, Marquee::view)
        .title("Marquee")
        .theme(Marquee::theme)
        .window_size(Size::new(1280.0, 720.0))
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .default_font(Font::DEFAULT)
        .run()
}
