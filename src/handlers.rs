use chrono::Datelike;
use iced::Task;
use tracing::{info, warn};

use crate::cards::{strip_content_width, VIEWPORT_WIDTH};
use crate::hero::select_featured;
use crate::media::{
    section_id, DetailBundle, MediaId, MediaType, Message, Page, PageResponse, ScrollDirection,
    Title, SERIES_GENRE_SECTION_BASE,
};
use crate::tmdb::{
    fetch_image_bytes, load_movie_detail, load_series_detail, ApiError, ImageSize, TimeWindow,
};
use crate::Marquee;

const SCROLL_AMOUNT: f32 = 500.0;
/// Distance from the strip end at which the next genre page is requested.
const LOAD_MORE_MARGIN: f32 = 200.0;
const POSTER_PREFETCH: usize = 20;

pub fn handle_message(app: &mut Marquee, message: Message) -> Task<Message> {
    match message {
        Message::Setup(_) => Task::none(),
        Message::NavigateTo(page) => handle_navigate(app, page),
        Message::SearchQueryChanged(query) => {
            app.search_query = query;
            Task::none()
        }
        Message::ClearSearch => {
            app.search_query.clear();
            Task::none()
        }
        Message::PopularMoviesLoaded(generation, result) => {
            handle_popular_movies_loaded(app, generation, result)
        }
        Message::TrendingMoviesLoaded(generation, result) => {
            handle_trending_movies_loaded(app, generation, result)
        }
        Message::PopularSeriesLoaded(generation, result) => {
            handle_popular_series_loaded(app, generation, result)
        }
        Message::GenrePageLoaded(media_type, index, generation, result) => {
            handle_genre_page_loaded(app, media_type, index, generation, result)
        }
        Message::GenreLoadMore(media_type, index) => handle_genre_load_more(app, media_type, index),
        Message::DetailLoaded(generation, result) => handle_detail_loaded(app, generation, result),
        Message::HoverCard(id) => handle_hover_card(app, id),
        Message::HoverSection(index) => {
            app.hovered_section = index;
            Task::none()
        }
        Message::ToggleFavorite(id) => {
            if !app.favorites.insert(id) {
                app.favorites.remove(&id);
            }
            Task::none()
        }
        Message::PlayContent(id) => {
            info!(media_id = id, "playback requested (not wired)");
            Task::none()
        }
        Message::AddToList(id) => {
            info!(media_id = id, "add to list requested (not wired)");
            Task::none()
        }
        Message::ScrollSection(index, direction) => handle_scroll_section(app, index, direction),
        Message::AnimateScroll(index) => handle_animate_scroll(app, index),
        Message::SectionScrolled(index, offset) => handle_section_scrolled(app, index, offset),
        Message::LoadImage(url) => handle_load_image(app, url),
        Message::ImageLoaded(url, result) => handle_image_loaded(app, url, result),
        Message::RetryLoad => handle_retry_load(app),
    }
}

fn handle_navigate(app: &mut Marquee, page: Page) -> Task<Message> {
    app.current_page = page;
    app.search_query.clear();
    app.hovered_card = None;
    app.hovered_section = None;
    app.section_scroll_offsets.clear();
    app.section_scroll_targets.clear();

    match page {
        Page::Movies => {
            app.detail.reset();
            start_movies_page(app)
        }
        Page::Series => {
            app.detail.reset();
            start_series_page(app)
        }
        Page::MovieDetail(id) => start_detail(app, MediaType::Movie, id),
        Page::SeriesDetail(id) => start_detail(app, MediaType::TvSeries, id),
    }
}

fn start_movies_page(app: &mut Marquee) -> Task<Message> {
    let Some(client) = app.client.clone() else {
        return Task::none();
    };
    let mut tasks = Vec::new();

    let generation = app.popular_movies.begin();
    let popular_client = client.clone();
    tasks.push(Task::perform(
        async move {
            popular_client
                .popular_titles(MediaType::Movie, 1)
                .await
                .map(|page| page.results)
        },
        move |result| Message::PopularMoviesLoaded(generation, result),
    ));

    let generation = app.trending_movies.begin();
    let trending_client = client.clone();
    tasks.push(Task::perform(
        async move {
            trending_client
                .trending_titles(MediaType::Movie, TimeWindow::Week, 1)
                .await
                .map(|page| page.results)
        },
        move |result| Message::TrendingMoviesLoaded(generation, result),
    ));

    for (index, listing) in app.movie_genres.iter_mut().enumerate() {
        let generation = listing.begin_first_page();
        let genre_id = listing.genre_id;
        let genre_client = client.clone();
        tasks.push(Task::perform(
            async move {
                genre_client
                    .titles_by_genre(MediaType::Movie, genre_id, 1)
                    .await
            },
            move |result| Message::GenrePageLoaded(MediaType::Movie, index, generation, result),
        ));
    }

    Task::batch(tasks)
}

fn start_series_page(app: &mut Marquee) -> Task<Message> {
    let Some(client) = app.client.clone() else {
        return Task::none();
    };
    let mut tasks = Vec::new();

    let generation = app.popular_series.begin();
    let popular_client = client.clone();
    tasks.push(Task::perform(
        async move {
            popular_client
                .popular_titles(MediaType::TvSeries, 1)
                .await
                .map(|page| page.results)
        },
        move |result| Message::PopularSeriesLoaded(generation, result),
    ));

    for (index, listing) in app.series_genres.iter_mut().enumerate() {
        let generation = listing.begin_first_page();
        let genre_id = listing.genre_id;
        let genre_client = client.clone();
        tasks.push(Task::perform(
            async move {
                genre_client
                    .titles_by_genre(MediaType::TvSeries, genre_id, 1)
                    .await
            },
            move |result| Message::GenrePageLoaded(MediaType::TvSeries, index, generation, result),
        ));
    }

    Task::batch(tasks)
}

fn start_detail(app: &mut Marquee, media_type: MediaType, id: MediaId) -> Task<Message> {
    let Some(client) = app.client.clone() else {
        return Task::none();
    };
    let generation = app.detail.begin();
    match media_type {
        MediaType::Movie => Task::perform(load_movie_detail(client, id), move |result| {
            Message::DetailLoaded(generation, result.map(Box::new))
        }),
        MediaType::TvSeries => Task::perform(load_series_detail(client, id), move |result| {
            Message::DetailLoaded(generation, result.map(Box::new))
        }),
    }
}

fn handle_popular_movies_loaded(
    app: &mut Marquee,
    generation: u64,
    result: Result<Vec<Title>, ApiError>,
) -> Task<Message> {
    if let Err(error) = &result {
        warn!(error = %error, "popular movies load failed");
    }
    if !app.popular_movies.apply(generation, result) {
        return Task::none();
    }
    let Some(items) = app.popular_movies.value() else {
        return Task::none();
    };
    Task::batch([
        poster_load_tasks(app, items, POSTER_PREFETCH),
        featured_backdrop_task(app, items),
    ])
}

fn handle_trending_movies_loaded(
    app: &mut Marquee,
    generation: u64,
    result: Result<Vec<Title>, ApiError>,
) -> Task<Message> {
    if let Err(error) = &result {
        warn!(error = %error, "trending movies load failed");
    }
    if !app.trending_movies.apply(generation, result) {
        return Task::none();
    }
    match app.trending_movies.value() {
        Some(items) => poster_load_tasks(app, items, POSTER_PREFETCH),
        None => Task::none(),
    }
}

fn handle_popular_series_loaded(
    app: &mut Marquee,
    generation: u64,
    result: Result<Vec<Title>, ApiError>,
) -> Task<Message> {
    if let Err(error) = &result {
        warn!(error = %error, "popular series load failed");
    }
    if !app.popular_series.apply(generation, result) {
        return Task::none();
    }
    let Some(items) = app.popular_series.value() else {
        return Task::none();
    };
    Task::batch([
        poster_load_tasks(app, items, POSTER_PREFETCH),
        featured_backdrop_task(app, items),
    ])
}

fn handle_genre_page_loaded(
    app: &mut Marquee,
    media_type: MediaType,
    index: usize,
    generation: u64,
    result: Result<PageResponse<Title>, ApiError>,
) -> Task<Message> {
    if let Err(error) = &result {
        warn!(error = %error, genre_index = index, "genre listing load failed");
    }
    let listing = match media_type {
        MediaType::Movie => app.movie_genres.get_mut(index),
        MediaType::TvSeries => app.series_genres.get_mut(index),
    };
    let Some(listing) = listing else {
        return Task::none();
    };
    if !listing.apply_page(generation, result) {
        return Task::none();
    }

    let items = match media_type {
        MediaType::Movie => app.movie_genres[index].items(),
        MediaType::TvSeries => app.series_genres[index].items(),
    };
    poster_load_tasks(app, items, items.len())
}

fn handle_genre_load_more(
    app: &mut Marquee,
    media_type: MediaType,
    index: usize,
) -> Task<Message> {
    let Some(client) = app.client.clone() else {
        return Task::none();
    };
    let listing = match media_type {
        MediaType::Movie => app.movie_genres.get_mut(index),
        MediaType::TvSeries => app.series_genres.get_mut(index),
    };
    let Some(listing) = listing else {
        return Task::none();
    };
    // the listing enforces the no-op rules: in flight or exhausted
    let Some((generation, next_page)) = listing.begin_load_more() else {
        return Task::none();
    };
    let genre_id = listing.genre_id;

    Task::perform(
        async move {
            client
                .titles_by_genre(media_type, genre_id, next_page)
                .await
        },
        move |result| Message::GenrePageLoaded(media_type, index, generation, result),
    )
}

fn handle_detail_loaded(
    app: &mut Marquee,
    generation: u64,
    result: Result<Box<DetailBundle>, ApiError>,
) -> Task<Message> {
    if let Err(error) = &result {
        warn!(error = %error, "detail load failed");
    }
    if !app.detail.apply(generation, result.map(|bundle| *bundle)) {
        return Task::none();
    }
    match app.detail.value() {
        Some(bundle) => detail_image_tasks(app, bundle),
        None => Task::none(),
    }
}

fn handle_hover_card(app: &mut Marquee, id: Option<MediaId>) -> Task<Message> {
    app.hovered_card = id;
    let Some(media_id) = id else {
        return Task::none();
    };
    // the expanded overlay wants the backdrop, fetched on demand
    let Some(item) = find_title(app, media_id) else {
        return Task::none();
    };
    image_load_task(app, item.backdrop_path.as_deref(), ImageSize::W780)
}

fn find_title(app: &Marquee, id: MediaId) -> Option<&Title> {
    let lists = [
        app.popular_movies.value(),
        app.trending_movies.value(),
        app.popular_series.value(),
    ];
    for list in lists.into_iter().flatten() {
        if let Some(item) = list.iter().find(|t| t.id == id) {
            return Some(item);
        }
    }
    for listing in app.movie_genres.iter().chain(app.series_genres.iter()) {
        if let Some(item) = listing.items().iter().find(|t| t.id == id) {
            return Some(item);
        }
    }
    None
}

fn handle_scroll_section(
    app: &mut Marquee,
    section_index: usize,
    direction: ScrollDirection,
) -> Task<Message> {
    while app.section_scroll_offsets.len() <= section_index {
        app.section_scroll_offsets.push(0.0);
    }
    while app.section_scroll_targets.len() <= section_index {
        app.section_scroll_targets.push(0.0);
    }

    let current_target = app.section_scroll_targets[section_index];
    let new_target = match direction {
        ScrollDirection::Left => (current_target - SCROLL_AMOUNT).max(0.0),
        ScrollDirection::Right => current_target + SCROLL_AMOUNT,
    };
    app.section_scroll_targets[section_index] = new_target;
    Task::done(Message::AnimateScroll(section_index))
}

fn handle_animate_scroll(app: &mut Marquee, section_index: usize) -> Task<Message> {
    if section_index >= app.section_scroll_offsets.len()
        || section_index >= app.section_scroll_targets.len()
    {
        return Task::none();
    }

    let current = app.section_scroll_offsets[section_index];
    let target = app.section_scroll_targets[section_index];
    let diff = target - current;

    let Some(section_id_str) = section_id(section_index) else {
        return Task::none();
    };
    let id = iced::widget::Id::new(section_id_str);

    if diff.abs() < 1.0 {
        app.section_scroll_offsets[section_index] = target;
        let offset = iced::widget::scrollable::AbsoluteOffset { x: target, y: 0.0 };
        return iced::widget::operation::scroll_to(id, offset);
    }

    let new_offset = current + diff * 0.15;
    app.section_scroll_offsets[section_index] = new_offset;
    let offset = iced::widget::scrollable::AbsoluteOffset {
        x: new_offset,
        y: 0.0,
    };

    Task::batch([
        iced::widget::operation::scroll_to(id, offset),
        Task::perform(
            async { tokio::time::sleep(std::time::Duration::from_millis(16)).await },
            move |_| Message::AnimateScroll(section_index),
        ),
    ])
}

fn handle_section_scrolled(app: &mut Marquee, section_index: usize, offset: f32) -> Task<Message> {
    while app.section_scroll_offsets.len() <= section_index {
        app.section_scroll_offsets.push(0.0);
    }
    app.section_scroll_offsets[section_index] = offset;
    maybe_load_more(app, section_index, offset)
}

/// Scrolling near the end of a series genre strip requests its next page.
/// Movie strips cap their display at 20 cards, so only series strips
/// paginate.
fn maybe_load_more(app: &Marquee, section_index: usize, offset: f32) -> Task<Message> {
    if app.current_page != Page::Series || section_index < SERIES_GENRE_SECTION_BASE {
        return Task::none();
    }
    let genre_index = section_index - SERIES_GENRE_SECTION_BASE;
    let Some(listing) = app.series_genres.get(genre_index) else {
        return Task::none();
    };
    if listing.in_flight() || !listing.has_more() {
        return Task::none();
    }
    let content_width = strip_content_width(listing.items().len());
    if offset < content_width - VIEWPORT_WIDTH - LOAD_MORE_MARGIN {
        return Task::none();
    }
    Task::done(Message::GenreLoadMore(MediaType::TvSeries, genre_index))
}

fn handle_load_image(app: &mut Marquee, url: String) -> Task<Message> {
    if app.image_cache.get(&url).is_some()
        || app.image_cache.is_pending(&url)
        || app.image_cache.has_failed(&url)
    {
        return Task::none();
    }
    app.image_cache.mark_pending(url.clone());
    let image_url = url.clone();

    Task::perform(
        async move { fetch_image_bytes(image_url).await },
        move |result| {
            Message::ImageLoaded(
                url.clone(),
                result.map(iced::widget::image::Handle::from_bytes),
            )
        },
    )
}

fn handle_image_loaded(
    app: &mut Marquee,
    url: String,
    result: Result<iced::widget::image::Handle, String>,
) -> Task<Message> {
    match result {
        Ok(handle) => app.image_cache.insert(url, handle),
        Err(error) => {
            warn!(url = %url, error = %error, "image load failed");
            app.image_cache.mark_failed(url);
        }
    }
    Task::none()
}

fn handle_retry_load(app: &mut Marquee) -> Task<Message> {
    match app.current_page {
        Page::Movies => start_movies_page(app),
        Page::Series => start_series_page(app),
        Page::MovieDetail(id) => start_detail(app, MediaType::Movie, id),
        Page::SeriesDetail(id) => start_detail(app, MediaType::TvSeries, id),
    }
}

fn image_load_task(
    app: &Marquee,
    path: Option<&str>,
    size: ImageSize,
) -> Task<Message> {
    let Some(client) = &app.client else {
        return Task::none();
    };
    let Some(url) = client.image_url(path, size) else {
        return Task::none();
    };
    if app.image_cache.get(&url).is_some()
        || app.image_cache.is_pending(&url)
        || app.image_cache.has_failed(&url)
    {
        return Task::none();
    }
    Task::done(Message::LoadImage(url))
}

fn poster_load_tasks(app: &Marquee, items: &[Title], cap: usize) -> Task<Message> {
    let tasks: Vec<Task<Message>> = items
        .iter()
        .take(cap)
        .map(|item| image_load_task(app, item.poster_path.as_deref(), ImageSize::W500))
        .collect();
    Task::batch(tasks)
}

fn featured_backdrop_task(app: &Marquee, items: &[Title]) -> Task<Message> {
    let current_year = chrono::Utc::now().year();
    let Some(featured) = select_featured(items, current_year) else {
        return Task::none();
    };
    image_load_task(app, featured.backdrop_path.as_deref(), ImageSize::Original)
}

fn detail_image_tasks(app: &Marquee, bundle: &DetailBundle) -> Task<Message> {
    let mut tasks = vec![
        image_load_task(app, bundle.details.backdrop_path.as_deref(), ImageSize::Original),
        image_load_task(app, bundle.details.poster_path.as_deref(), ImageSize::W500),
    ];
    for member in bundle.credits.cast.iter().take(10) {
        tasks.push(image_load_task(
            app,
            member.profile_path.as_deref(),
            ImageSize::W500,
        ));
    }
    for (_, members) in crate::detail_page::crew_groups(&bundle.credits.crew) {
        for member in members {
            tasks.push(image_load_task(
                app,
                member.profile_path.as_deref(),
                ImageSize::W500,
            ));
        }
    }
    Task::batch(tasks)
}
