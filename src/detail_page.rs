use iced::widget::{button, column, container, row, scrollable, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::hidden_vertical_scrollbar_style;
use crate::hero::star_row;
use crate::media::{
    format_dollars, format_runtime, CastMember, CrewMember, DetailBundle, MediaId, MediaType,
    Message, Page, TitleDetails, ACCENT_RED, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::tmdb::ImageSize;
use crate::Marquee;

const ICON_CHEVRON_LEFT: char = '\u{F284}';
const ICON_PERSON_FILL: char = '\u{F4DA}';

const BACKDROP_HEIGHT: f32 = 420.0;
const POSTER_WIDTH: f32 = 200.0;
const POSTER_HEIGHT: f32 = 300.0;
const PROFILE_SIZE: f32 = 90.0;
const MAIN_CAST_LIMIT: usize = 10;

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

/// Groups the crew the way the detail page presents it: every director,
/// then up to three producers and three writers.
pub fn crew_groups(crew: &[CrewMember]) -> Vec<(&'static str, Vec<&CrewMember>)> {
    let directors: Vec<&CrewMember> = crew
        .iter()
        .filter(|p| p.job == "Director" || p.department == "Directing")
        .collect();
    let producers: Vec<&CrewMember> = crew
        .iter()
        .filter(|p| p.job == "Producer" || p.department == "Production")
        .take(3)
        .collect();
    let writers: Vec<&CrewMember> = crew
        .iter()
        .filter(|p| p.job == "Writer" || p.department == "Writing")
        .take(3)
        .collect();

    [
        ("Directing", directors),
        ("Production", producers),
        ("Writing", writers),
    ]
    .into_iter()
    .filter(|(_, members)| !members.is_empty())
    .collect()
}

impl Marquee {
    pub fn view_detail_page(&self, _id: MediaId) -> Element<'_, Message> {
        let body: Element<'_, Message> = if self.detail.is_loading() {
            self.view_detail_loading()
        } else if let Some(error) = self.detail.error() {
            self.view_detail_error(error)
        } else if let Some(bundle) = self.detail.value() {
            self.view_detail_content(bundle)
        } else {
            self.view_detail_loading()
        };

        iced::widget::stack![
            scrollable(body)
                .direction(scrollable::Direction::Vertical(
                    scrollable::Scrollbar::new().width(0).scroller_width(0),
                ))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(hidden_vertical_scrollbar_style),
            self.view_header()
        ]
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    fn listing_page_for_current_detail(&self) -> Page {
        match self.current_page {
            Page::SeriesDetail(_) => Page::Series,
            _ => Page::Movies,
        }
    }

    fn view_detail_loading(&self) -> Element<'_, Message> {
        container(text("Loading details...").size(18).color(TEXT_GRAY))
            .width(Length::Fill)
            .height(Length::Fixed(600.0))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn view_detail_error<'a>(&'a self, error_message: &'a str) -> Element<'a, Message> {
        container(
            column![
                text("Could not load this title").size(22).color(TEXT_WHITE),
                text(error_message).size(14).color(ACCENT_RED),
                self.view_back_button()
            ]
            .spacing(16)
            .align_x(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fixed(600.0))
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
    }

    fn view_back_button(&self) -> Element<'_, Message> {
        button(
            row![
                icon(ICON_CHEVRON_LEFT).size(14).color(TEXT_WHITE),
                text("Back").size(14).color(TEXT_WHITE)
            ]
            .spacing(6)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(8.0).left(16.0).right(16.0))
        .style(|_theme, status| {
            let bg_alpha = match status {
                button::Status::Hovered => 0.6,
                _ => 0.4,
            };
            button::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, bg_alpha,
                ))),
                text_color: TEXT_WHITE,
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.3),
                    width: 1.0,
                    radius: 4.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::NavigateTo(self.listing_page_for_current_detail()))
        .into()
    }

    fn view_detail_content(&self, bundle: &DetailBundle) -> Element<'_, Message> {
        let header = self.view_detail_header(bundle);
        let overview = self.view_detail_overview(&bundle.details);
        let facts = self.view_detail_facts(bundle);
        let cast = self.view_cast_grid(&bundle.credits.cast);
        let crew = self.view_crew_sections(&bundle.credits.crew);

        column![header, overview, facts, cast, crew]
            .spacing(32)
            .padding(Padding::new(0.0).bottom(64.0))
            .width(Length::Fill)
            .into()
    }

    fn view_detail_header(&self, bundle: &DetailBundle) -> Element<'_, Message> {
        let details = &bundle.details;

        let backdrop: Element<'_, Message> = {
            let handle = self
                .client
                .as_ref()
                .and_then(|client| {
                    client.image_url(details.backdrop_path.as_deref(), ImageSize::Original)
                })
                .and_then(|url| self.image_cache.get(&url).cloned());
            match handle {
                Some(handle) => iced::widget::image(handle)
                    .width(Length::Fill)
                    .height(Length::Fixed(BACKDROP_HEIGHT))
                    .content_fit(iced::ContentFit::Cover)
                    .into(),
                None => container(Space::new().width(Length::Fill).height(Length::Fill))
                    .width(Length::Fill)
                    .height(Length::Fixed(BACKDROP_HEIGHT))
                    .style(|_theme| container::Style {
                        background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                        ..Default::default()
                    })
                    .into(),
            }
        };

        let dim_overlay = container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fixed(BACKDROP_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(std::f32::consts::PI)
                        .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.95))
                        .add_stop(0.5, Color::from_rgba(0.0, 0.0, 0.0, 0.6))
                        .add_stop(1.0, Color::from_rgba(0.0, 0.0, 0.0, 0.3)),
                ))),
                ..Default::default()
            });

        let info = self.view_detail_title_block(bundle);
        let header_content = container(
            column![self.view_back_button(), info]
                .spacing(24)
                .padding(Padding::new(24.0).left(48.0).right(48.0).top(96.0)),
        )
        .width(Length::Fill)
        .height(Length::Fixed(BACKDROP_HEIGHT))
        .align_y(iced::alignment::Vertical::Bottom);

        iced::widget::stack![backdrop, dim_overlay, header_content]
            .width(Length::Fill)
            .height(Length::Fixed(BACKDROP_HEIGHT))
            .into()
    }

    fn view_detail_title_block(&self, bundle: &DetailBundle) -> Element<'_, Message> {
        let details = &bundle.details;

        let poster: Element<'_, Message> = {
            let handle = self
                .client
                .as_ref()
                .and_then(|client| client.image_url(details.poster_path.as_deref(), ImageSize::W500))
                .and_then(|url| self.image_cache.get(&url).cloned());
            match handle {
                Some(handle) => container(
                    iced::widget::image(handle)
                        .width(Length::Fixed(POSTER_WIDTH))
                        .height(Length::Fixed(POSTER_HEIGHT))
                        .content_fit(iced::ContentFit::Cover),
                )
                .style(|_theme| container::Style {
                    border: Border {
                        radius: 8.0.into(),
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .into(),
                None => container(text("No poster").size(14).color(TEXT_GRAY))
                    .width(Length::Fixed(POSTER_WIDTH))
                    .height(Length::Fixed(POSTER_HEIGHT))
                    .center_x(Length::Fill)
                    .center_y(Length::Fill)
                    .style(|_theme| container::Style {
                        background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                        border: Border {
                            radius: 8.0.into(),
                            ..Default::default()
                        },
                        ..Default::default()
                    })
                    .into(),
            }
        };

        let mut title_column: Vec<Element<'_, Message>> = Vec::new();
        title_column.push(
            text(details.title.clone())
                .size(36)
                .color(TEXT_WHITE)
                .font(iced::Font {
                    weight: iced::font::Weight::Bold,
                    ..Default::default()
                })
                .into(),
        );
        if !details.original_title.is_empty() && details.original_title != details.title {
            title_column.push(
                text(details.original_title.clone())
                    .size(18)
                    .color(TEXT_GRAY)
                    .into(),
            );
        }
        if !details.tagline.is_empty() {
            title_column.push(
                text(format!("\"{}\"", details.tagline))
                    .size(14)
                    .color(TEXT_GRAY)
                    .into(),
            );
        }
        title_column.push(self.view_detail_meta_row(bundle));
        title_column.push(self.view_genre_pills(details));

        row![
            poster,
            Column::with_children(title_column).spacing(10)
        ]
        .spacing(32)
        .align_y(iced::Alignment::End)
        .into()
    }

    fn view_detail_meta_row(&self, bundle: &DetailBundle) -> Element<'_, Message> {
        let details = &bundle.details;
        let mut items: Vec<Element<'_, Message>> = Vec::new();

        items.push(star_row(details.vote_average));
        items.push(
            text(format!(
                "{:.1} ({} votes)",
                details.vote_average, details.vote_count
            ))
            .size(14)
            .color(TEXT_GRAY)
            .into(),
        );

        if let Some(year) = details.release_year() {
            items.push(text(year.to_string()).size(14).color(TEXT_GRAY).into());
        }

        match bundle.media_type {
            MediaType::Movie => {
                if let Some(runtime) = details.runtime {
                    items.push(
                        text(format_runtime(runtime)).size(14).color(TEXT_GRAY).into(),
                    );
                }
            }
            MediaType::TvSeries => {
                if let Some(seasons) = details.number_of_seasons {
                    let episodes = details.number_of_episodes.unwrap_or(0);
                    items.push(
                        text(format!("{} seasons / {} episodes", seasons, episodes))
                            .size(14)
                            .color(TEXT_GRAY)
                            .into(),
                    );
                }
            }
        }

        Row::with_children(items)
            .spacing(12)
            .align_y(iced::Alignment::Center)
            .into()
    }

    fn view_genre_pills(&self, details: &TitleDetails) -> Element<'_, Message> {
        let pills: Vec<Element<'_, Message>> = details
            .genres
            .iter()
            .map(|genre| {
                container(text(genre.name.clone()).size(12).color(TEXT_WHITE))
                    .padding(Padding::new(4.0).left(10.0).right(10.0))
                    .style(|_theme| container::Style {
                        background: Some(iced::Background::Color(Color::from_rgba(
                            1.0, 1.0, 1.0, 0.1,
                        ))),
                        border: Border {
                            radius: 12.0.into(),
                            ..Default::default()
                        },
                        ..Default::default()
                    })
                    .into()
            })
            .collect();

        Row::with_children(pills)
            .spacing(8)
            .align_y(iced::Alignment::Center)
            .into()
    }

    fn view_detail_overview(&self, details: &TitleDetails) -> Element<'_, Message> {
        if details.overview.is_empty() {
            return column![].into();
        }
        container(
            column![
                text("Overview").size(22).color(TEXT_WHITE).font(iced::Font {
                    weight: iced::font::Weight::Bold,
                    ..Default::default()
                }),
                container(text(details.overview.clone()).size(15).color(TEXT_GRAY))
                    .max_width(800.0)
            ]
            .spacing(12),
        )
        .padding(Padding::new(0.0).left(48.0).right(48.0))
        .into()
    }

    fn view_detail_facts(&self, bundle: &DetailBundle) -> Element<'_, Message> {
        let details = &bundle.details;
        let mut facts: Vec<(String, String)> = Vec::new();

        if !details.status.is_empty() {
            facts.push((String::from("Status"), details.status.clone()));
        }
        if !details.original_language.is_empty() {
            facts.push((
                String::from("Language"),
                details.original_language.to_uppercase(),
            ));
        }
        match bundle.media_type {
            MediaType::Movie => {
                if let Some(budget) = details.budget.filter(|&b| b > 0) {
                    facts.push((String::from("Budget"), format_dollars(budget)));
                }
                if let Some(revenue) = details.revenue.filter(|&r| r > 0) {
                    facts.push((String::from("Revenue"), format_dollars(revenue)));
                }
            }
            MediaType::TvSeries => {
                if let Some(last) = &details.last_air_date {
                    facts.push((String::from("Last aired"), last.clone()));
                }
            }
        }
        if !details.production_companies.is_empty() {
            let names: Vec<&str> = details
                .production_companies
                .iter()
                .map(|c| c.name.as_str())
                .collect();
            facts.push((String::from("Production"), names.join(", ")));
        }
        if !details.production_countries.is_empty() {
            let names: Vec<&str> = details
                .production_countries
                .iter()
                .map(|c| c.name.as_str())
                .collect();
            facts.push((String::from("Countries"), names.join(", ")));
        }
        if !details.spoken_languages.is_empty() {
            let names: Vec<&str> = details
                .spoken_languages
                .iter()
                .map(|l| l.english_name.as_str())
                .collect();
            facts.push((String::from("Spoken languages"), names.join(", ")));
        }

        let entries: Vec<Element<'_, Message>> = facts
            .into_iter()
            .map(|(label, value)| {
                column![
                    text(label).size(12).color(TEXT_GRAY),
                    text(value).size(14).color(TEXT_WHITE)
                ]
                .spacing(4)
                .into()
            })
            .collect();

        container(
            Row::with_children(entries)
                .spacing(40)
                .align_y(iced::Alignment::Start),
        )
        .padding(Padding::new(0.0).left(48.0).right(48.0))
        .into()
    }

    fn view_cast_grid(&self, cast: &[CastMember]) -> Element<'_, Message> {
        if cast.is_empty() {
            return column![].into();
        }

        let mut main_cast: Vec<&CastMember> = cast.iter().collect();
        main_cast.sort_by_key(|member| member.order);
        main_cast.truncate(MAIN_CAST_LIMIT);

        let mut rows: Vec<Element<'_, Message>> = Vec::new();
        for chunk in main_cast.chunks(5) {
            let cells: Vec<Element<'_, Message>> = chunk
                .iter()
                .map(|member| {
                    self.view_person_cell(
                        &member.name,
                        &member.character,
                        member.profile_path.as_deref(),
                    )
                })
                .collect();
            rows.push(
                Row::with_children(cells)
                    .spacing(24)
                    .align_y(iced::Alignment::Start)
                    .into(),
            );
        }

        container(
            column![
                text("Main Cast").size(22).color(TEXT_WHITE).font(iced::Font {
                    weight: iced::font::Weight::Bold,
                    ..Default::default()
                }),
                Column::with_children(rows).spacing(24)
            ]
            .spacing(16),
        )
        .padding(Padding::new(0.0).left(48.0).right(48.0))
        .into()
    }

    fn view_crew_sections(&self, crew: &[CrewMember]) -> Element<'_, Message> {
        let groups = crew_groups(crew);
        if groups.is_empty() {
            return column![].into();
        }

        let mut sections: Vec<Element<'_, Message>> = vec![text("Crew")
            .size(22)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            })
            .into()];

        for (label, members) in groups {
            let cells: Vec<Element<'_, Message>> = members
                .iter()
                .map(|member| {
                    self.view_person_cell(&member.name, &member.job, member.profile_path.as_deref())
                })
                .collect();
            sections.push(
                column![
                    text(label).size(16).color(TEXT_GRAY),
                    Row::with_children(cells)
                        .spacing(24)
                        .align_y(iced::Alignment::Start)
                ]
                .spacing(10)
                .into(),
            );
        }

        container(Column::with_children(sections).spacing(20))
            .padding(Padding::new(0.0).left(48.0).right(48.0))
            .into()
    }

    fn view_person_cell(
        &self,
        name: &str,
        role: &str,
        profile_path: Option<&str>,
    ) -> Element<'_, Message> {
        let photo: Element<'_, Message> = {
            let handle = self
                .client
                .as_ref()
                .and_then(|client| client.image_url(profile_path, ImageSize::W500))
                .filter(|url| !self.image_cache.has_failed(url))
                .and_then(|url| self.image_cache.get(&url).cloned());
            match handle {
                Some(handle) => container(
                    iced::widget::image(handle)
                        .width(Length::Fixed(PROFILE_SIZE))
                        .height(Length::Fixed(PROFILE_SIZE))
                        .content_fit(iced::ContentFit::Cover),
                )
                .style(|_theme| container::Style {
                    border: Border {
                        radius: (PROFILE_SIZE / 2.0).into(),
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .into(),
                None => container(if profile_path.is_none() {
                    text(initials(name)).size(24).color(TEXT_GRAY)
                } else {
                    icon(ICON_PERSON_FILL).size(32).color(TEXT_GRAY)
                })
                .width(Length::Fixed(PROFILE_SIZE))
                .height(Length::Fixed(PROFILE_SIZE))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                    border: Border {
                        radius: (PROFILE_SIZE / 2.0).into(),
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .into(),
            }
        };

        column![
            photo,
            text(name.to_string())
                .size(13)
                .color(TEXT_WHITE)
                .wrapping(text::Wrapping::Word),
            text(role.to_string())
                .size(12)
                .color(TEXT_GRAY)
                .wrapping(text::Wrapping::Word)
        ]
        .spacing(6)
        .width(Length::Fixed(140.0))
        .align_x(iced::Alignment::Center)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crew_member(id: u64, name: &str, job: &str, department: &str) -> CrewMember {
        CrewMember {
            id,
            name: name.to_string(),
            job: job.to_string(),
            department: department.to_string(),
            profile_path: None,
        }
    }

    #[test]
    fn initials_take_first_two_words() {
        assert_eq!(initials("Bryan Cranston"), "BC");
        assert_eq!(initials("Cher"), "C");
        assert_eq!(initials("Jean Claude Van Damme"), "JC");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn crew_grouping_caps_producers_and_writers() {
        let crew = vec![
            crew_member(1, "Director One", "Director", "Directing"),
            crew_member(2, "Director Two", "Director", "Directing"),
            crew_member(3, "Producer A", "Producer", "Production"),
            crew_member(4, "Producer B", "Producer", "Production"),
            crew_member(5, "Producer C", "Producer", "Production"),
            crew_member(6, "Producer D", "Producer", "Production"),
            crew_member(7, "Writer A", "Writer", "Writing"),
        ];

        let groups = crew_groups(&crew);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, "Directing");
        assert_eq!(groups[0].1.len(), 2);
        // producers cap at three
        assert_eq!(groups[1].1.len(), 3);
        assert_eq!(groups[2].1.len(), 1);
    }

    #[test]
    fn empty_crew_groups_are_omitted() {
        let crew = vec![crew_member(1, "Only Director", "Director", "Directing")];
        let groups = crew_groups(&crew);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "Directing");
    }
}
