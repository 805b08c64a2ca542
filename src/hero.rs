use chrono::Datelike;
use iced::widget::{button, column, container, row, text, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::media::{
    truncate_overview, MediaId, MediaType, Message, Page, Title, ACCENT_RED, STAR_GOLD,
    SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::tmdb::ImageSize;
use crate::Marquee;

const HERO_HEIGHT: f32 = 620.0;
const ICON_PLAY_FILL: char = '\u{F4F4}';
const ICON_INFO_CIRCLE: char = '\u{F431}';
const ICON_STAR_FILL: char = '\u{F586}';
const ICON_STAR_HALF: char = '\u{F587}';
const ICON_STAR: char = '\u{F588}';

/// Titles whose names match one of these get a scoring bonus; the list
/// leans toward franchise blockbusters that make strong banner art.
const FEATURED_KEYWORDS: [&str; 29] = [
    "avengers",
    "spider",
    "batman",
    "superman",
    "iron man",
    "thor",
    "captain",
    "wonder woman",
    "black panther",
    "guardians",
    "x-men",
    "deadpool",
    "hero",
    "heroes",
    "super",
    "power",
    "justice",
    "league",
    "squad",
    "fast",
    "furious",
    "mission impossible",
    "bond",
    "john wick",
    "transformers",
    "terminator",
    "predator",
    "alien",
    "matrix",
];

pub fn featured_score(title: &Title) -> f64 {
    let mut score =
        f64::from(title.vote_count) / 1000.0 + f64::from(title.vote_average) * 2.0;
    let display = title.title.to_lowercase();
    let original = title.original_title.to_lowercase();
    for keyword in FEATURED_KEYWORDS {
        if display.contains(keyword) || original.contains(keyword) {
            score += 10.0;
        }
    }
    score
}

/// Picks the banner title from a batch. Candidates are restricted to
/// releases from the last 5 calendar years when any exist; a left fold
/// with strict `>` keeps the first-encountered candidate on equal
/// scores.
pub fn select_featured(titles: &[Title], current_year: i32) -> Option<&Title> {
    let recent: Vec<&Title> = titles
        .iter()
        .filter(|t| {
            t.release_year()
                .is_some_and(|y| y > current_year - 5 && y <= current_year)
        })
        .collect();

    let candidates = if recent.is_empty() {
        titles.iter().collect()
    } else {
        recent
    };

    candidates.into_iter().reduce(|best, current| {
        if featured_score(current) > featured_score(best) {
            current
        } else {
            best
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Star {
    Full,
    Half,
    Empty,
}

/// Maps a 0-10 score onto five glyphs with half-star granularity.
pub fn star_glyphs(rating: f32) -> [Star; 5] {
    let rating = rating.clamp(0.0, 10.0);
    let full = (rating / 2.0).floor() as usize;
    let half = rating % 2.0 >= 1.0;

    let mut glyphs = [Star::Empty; 5];
    for (i, glyph) in glyphs.iter_mut().enumerate() {
        if i < full {
            *glyph = Star::Full;
        } else if i == full && half {
            *glyph = Star::Half;
        }
    }
    glyphs
}

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn star_row<'a>(rating: f32) -> Element<'a, Message> {
    let glyphs: Vec<Element<'a, Message>> = star_glyphs(rating)
        .into_iter()
        .map(|star| {
            let (glyph, color) = match star {
                Star::Full => (ICON_STAR_FILL, STAR_GOLD),
                Star::Half => (ICON_STAR_HALF, STAR_GOLD),
                Star::Empty => (ICON_STAR, TEXT_GRAY),
            };
            icon(glyph).size(14).color(color).into()
        })
        .collect();

    iced::widget::Row::with_children(glyphs)
        .spacing(2)
        .align_y(iced::Alignment::Center)
        .into()
}

impl Marquee {
    pub fn view_hero_section(&self, titles: &[Title]) -> Element<'_, Message> {
        let current_year = chrono::Utc::now().year();
        match select_featured(titles, current_year) {
            Some(featured) => self.view_hero_with_content(featured),
            None => self.view_hero_placeholder(),
        }
    }

    pub fn view_hero_placeholder(&self) -> Element<'_, Message> {
        container(text("No featured title available").size(24).color(TEXT_GRAY))
            .width(Length::Fill)
            .height(Length::Fixed(HERO_HEIGHT))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            })
            .into()
    }

    fn view_hero_with_content(&self, featured: &Title) -> Element<'_, Message> {
        let hero_title = self.view_hero_title(featured);
        let badge_row = self.view_hero_badges(featured);
        let rating_row = self.view_hero_rating(featured);
        let hero_description = container(
            text(truncate_overview(&featured.overview, 200))
                .size(16)
                .color(TEXT_GRAY),
        )
        .max_width(500.0);

        let media_id = featured.id;
        let detail_page = match featured.media_type {
            MediaType::Movie => Page::MovieDetail(media_id),
            MediaType::TvSeries => Page::SeriesDetail(media_id),
        };
        let button_row = row![
            self.view_hero_play_button(media_id),
            self.view_hero_more_info_button(detail_page),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center);

        let hero_text_content = column![
            hero_title,
            badge_row,
            rating_row,
            hero_description,
            button_row
        ]
        .spacing(20)
        .padding(Padding::new(64.0).left(64.0).right(64.0));

        let hero_left_gradient = container(hero_text_content)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_y(iced::alignment::Vertical::Center)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(0.0)
                        .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.99))
                        .add_stop(0.35, Color::from_rgba(0.0, 0.0, 0.0, 0.8))
                        .add_stop(0.6, Color::from_rgba(0.0, 0.0, 0.0, 0.4))
                        .add_stop(0.9, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });

        let hero_bottom_gradient = container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(std::f32::consts::PI)
                        .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.15))
                        .add_stop(0.08, Color::from_rgba(0.0, 0.0, 0.0, 0.05))
                        .add_stop(0.15, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });

        iced::widget::stack![
            self.view_hero_backdrop(featured),
            hero_bottom_gradient,
            hero_left_gradient
        ]
        .width(Length::Fill)
        .height(Length::Fixed(HERO_HEIGHT))
        .into()
    }

    fn view_hero_title(&self, featured: &Title) -> Element<'_, Message> {
        let main_title = text(featured.title.clone())
            .size(48)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            });

        if featured.original_title != featured.title {
            return column![
                main_title,
                text(format!("({})", featured.original_title))
                    .size(18)
                    .color(TEXT_GRAY)
            ]
            .spacing(4)
            .into();
        }
        main_title.into()
    }

    fn view_hero_badges(&self, featured: &Title) -> Element<'_, Message> {
        let mut items: Vec<Element<'_, Message>> = Vec::new();

        items.push(
            container(
                text("FEATURED")
                    .size(12)
                    .color(TEXT_WHITE)
                    .font(iced::Font {
                        weight: iced::font::Weight::Bold,
                        ..Default::default()
                    }),
            )
            .padding(Padding::new(3.0).left(8.0).right(8.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(ACCENT_RED)),
                border: Border {
                    radius: 3.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .into(),
        );

        if let Some(year) = featured.release_year() {
            items.push(text(year.to_string()).size(14).color(TEXT_GRAY).into());
        }

        let age_badge = if featured.adult { "18+" } else { "All ages" };
        items.push(
            container(text(age_badge).size(12).color(TEXT_WHITE))
                .padding(Padding::new(2.0).left(6.0).right(6.0))
                .style(|_theme| container::Style {
                    border: Border {
                        color: TEXT_GRAY,
                        width: 1.0,
                        radius: 2.0.into(),
                    },
                    ..Default::default()
                })
                .into(),
        );

        items.push(
            text(featured.original_language.to_uppercase())
                .size(14)
                .color(TEXT_GRAY)
                .into(),
        );

        iced::widget::Row::with_children(items)
            .spacing(10)
            .align_y(iced::Alignment::Center)
            .into()
    }

    fn view_hero_rating(&self, featured: &Title) -> Element<'_, Message> {
        row![
            star_row(featured.vote_average),
            text(format!(
                "{:.1}/10 ({} votes)",
                featured.vote_average, featured.vote_count
            ))
            .size(14)
            .color(TEXT_GRAY)
        ]
        .spacing(10)
        .align_y(iced::Alignment::Center)
        .into()
    }

    fn view_hero_backdrop(&self, featured: &Title) -> Element<'_, Message> {
        let Some(client) = &self.client else {
            return self.view_hero_backdrop_placeholder();
        };
        let Some(image_url) =
            client.image_url(featured.backdrop_path.as_deref(), ImageSize::Original)
        else {
            return self.view_hero_backdrop_placeholder();
        };
        let Some(handle) = self.image_cache.get(&image_url) else {
            return self.view_hero_backdrop_placeholder();
        };
        iced::widget::image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(HERO_HEIGHT))
            .content_fit(iced::ContentFit::Cover)
            .into()
    }

    fn view_hero_backdrop_placeholder(&self) -> Element<'_, Message> {
        container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fixed(HERO_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            })
            .into()
    }

    fn view_hero_play_button(&self, media_id: MediaId) -> Element<'_, Message> {
        button(
            row![
                icon(ICON_PLAY_FILL).size(14).color(TEXT_WHITE),
                text("Watch Now").size(16).color(TEXT_WHITE)
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(12.0).left(24.0).right(24.0))
        .style(|_theme, status| {
            let background_color = match status {
                button::Status::Hovered => Color::from_rgb(0.698, 0.027, 0.063),
                _ => ACCENT_RED,
            };
            button::Style {
                background: Some(iced::Background::Color(background_color)),
                text_color: TEXT_WHITE,
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 4.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::PlayContent(media_id))
        .into()
    }

    fn view_hero_more_info_button(&self, detail_page: Page) -> Element<'_, Message> {
        button(
            row![
                icon(ICON_INFO_CIRCLE).size(14).color(TEXT_WHITE),
                text("More Info").size(16).color(TEXT_WHITE)
            ]
            .spacing(8)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(12.0).left(24.0).right(24.0))
        .style(|_theme, status| {
            let background_color = match status {
                button::Status::Hovered => Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                _ => Color::TRANSPARENT,
            };
            button::Style {
                background: Some(iced::Background::Color(background_color)),
                text_color: TEXT_WHITE,
                border: Border {
                    color: TEXT_WHITE,
                    width: 1.0,
                    radius: 4.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::NavigateTo(detail_page))
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::tests::sample_title;

    fn scored_title(
        id: u64,
        name: &str,
        year: &str,
        vote_average: f32,
        vote_count: u32,
    ) -> Title {
        let mut title = sample_title(id, name, name);
        title.release_date = Some(format!("{}-06-01", year));
        title.vote_average = vote_average;
        title.vote_count = vote_count;
        title
    }

    #[test]
    fn stars_follow_half_star_rule() {
        use Star::*;
        assert_eq!(star_glyphs(7.5), [Full, Full, Full, Half, Empty]);
        assert_eq!(star_glyphs(10.0), [Full, Full, Full, Full, Full]);
        assert_eq!(star_glyphs(0.0), [Empty, Empty, Empty, Empty, Empty]);
        assert_eq!(star_glyphs(9.0), [Full, Full, Full, Full, Half]);
        assert_eq!(star_glyphs(6.9), [Full, Full, Full, Empty, Empty]);
    }

    #[test]
    fn stars_always_total_five() {
        for tenth in 0..=100 {
            let glyphs = star_glyphs(tenth as f32 / 10.0);
            assert_eq!(glyphs.len(), 5);
        }
    }

    #[test]
    fn keyword_bonus_outweighs_raw_votes() {
        let plain = scored_title(1, "Quiet Drama", "2024", 8.0, 2000); // 2 + 16 = 18
        let franchise = scored_title(2, "Spider Legacy", "2024", 7.0, 1000); // 1 + 14 + 10 = 25
        let batch = vec![plain, franchise];
        assert_eq!(select_featured(&batch, 2025).unwrap().id, 2);
    }

    #[test]
    fn first_candidate_wins_ties() {
        let first = scored_title(1, "Twin A", "2024", 7.0, 1000);
        let second = scored_title(2, "Twin B", "2024", 7.0, 1000);
        let batch = vec![first, second];
        assert_eq!(select_featured(&batch, 2025).unwrap().id, 1);

        // and the pick is stable across repeated evaluation
        assert_eq!(select_featured(&batch, 2025).unwrap().id, 1);
    }

    #[test]
    fn recent_titles_shadow_older_ones() {
        let classic = scored_title(1, "Old Classic", "1999", 9.5, 20000); // high score, too old
        let recent = scored_title(2, "New Release", "2023", 6.0, 500);
        let batch = vec![classic, recent];
        assert_eq!(select_featured(&batch, 2025).unwrap().id, 2);
    }

    #[test]
    fn full_batch_is_used_when_nothing_is_recent() {
        let a = scored_title(1, "Older", "1995", 7.0, 4000);
        let b = scored_title(2, "Oldest", "1990", 6.0, 1000);
        let batch = vec![a, b];
        assert_eq!(select_featured(&batch, 2025).unwrap().id, 1);
    }

    #[test]
    fn empty_batch_selects_nothing() {
        assert!(select_featured(&[], 2025).is_none());
    }
}
