use iced::widget::{button, column, container, row, scrollable, text, text_input, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::loaders::GenreListing;
use crate::media::{
    filter_titles, Message, NavItem, Page, Title, ACCENT_RED, MOVIE_CATEGORIES, SERIES_CATEGORIES,
    SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::Marquee;

const ICON_SEARCH: char = '\u{F52A}';

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn hidden_vertical_scrollbar_style(
    _theme: &iced::Theme,
    _status: scrollable::Status,
) -> scrollable::Style {
    scrollable::Style {
        container: container::Style::default(),
        vertical_rail: scrollable::Rail {
            background: None,
            border: Border::default(),
            scroller: scrollable::Scroller {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
            },
        },
        horizontal_rail: scrollable::Rail {
            background: None,
            border: Border::default(),
            scroller: scrollable::Scroller {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
            },
        },
        gap: None,
        auto_scroll: scrollable::AutoScroll {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
            shadow: Shadow::default(),
            icon: Color::TRANSPARENT,
        },
    }
}

/// One declared strip on a listing page, before search filtering.
pub struct SectionSource<'a> {
    pub label: &'static str,
    pub items: &'a [Title],
    pub display_cap: Option<usize>,
}

/// A strip that survived filtering. `index` is the declared position, so
/// scroll state stays attached to the right strip while others come and
/// go with the query.
pub struct SectionView<'a> {
    pub index: usize,
    pub label: &'static str,
    pub items: Vec<&'a Title>,
}

pub fn visible_sections<'a>(
    sources: &[SectionSource<'a>],
    query: &str,
) -> Vec<SectionView<'a>> {
    sources
        .iter()
        .enumerate()
        .filter_map(|(index, source)| {
            let mut items = filter_titles(source.items, query);
            if let Some(cap) = source.display_cap {
                items.truncate(cap);
            }
            if items.is_empty() {
                None
            } else {
                Some(SectionView {
                    index,
                    label: source.label,
                    items,
                })
            }
        })
        .collect()
}

pub fn movies_page_sections<'a>(
    popular: &'a [Title],
    trending: &'a [Title],
    genres: &'a [GenreListing],
) -> Vec<SectionSource<'a>> {
    let mut sources = vec![
        SectionSource {
            label: "Popular Now",
            items: popular,
            display_cap: Some(20),
        },
        SectionSource {
            label: "Trending This Week",
            items: trending,
            display_cap: Some(20),
        },
    ];
    for (category, listing) in MOVIE_CATEGORIES.iter().zip(genres) {
        sources.push(SectionSource {
            label: category.label,
            items: listing.items(),
            display_cap: Some(20),
        });
    }
    sources
}

/// Series genre strips carry no display cap so load-more growth stays
/// visible.
pub fn series_page_sections<'a>(
    popular: &'a [Title],
    genres: &'a [GenreListing],
) -> Vec<SectionSource<'a>> {
    let mut sources = vec![SectionSource {
        label: "Popular Series",
        items: popular,
        display_cap: Some(20),
    }];
    for (category, listing) in SERIES_CATEGORIES.iter().zip(genres) {
        sources.push(SectionSource {
            label: category.label,
            items: listing.items(),
            display_cap: None,
        });
    }
    sources
}

fn nav_item_for(page: Page) -> NavItem {
    match page {
        Page::Movies | Page::MovieDetail(_) => NavItem::Movies,
        Page::Series | Page::SeriesDetail(_) => NavItem::Series,
    }
}

impl Marquee {
    pub fn view_header(&self) -> Element<'_, Message> {
        let logo = text("MARQUEE")
            .size(28)
            .color(ACCENT_RED)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            });

        let navigation = self.view_navigation();
        let search_bar = self.view_search_bar();

        let left_section = row![logo, navigation]
            .spacing(32)
            .align_y(iced::Alignment::Center);

        let header_content = row![
            left_section,
            Space::new().width(Length::Fill),
            search_bar
        ]
        .padding(Padding::new(16.0).left(48.0).right(48.0))
        .align_y(iced::Alignment::Center);

        container(header_content)
            .width(Length::Fill)
            .height(Length::Fixed(80.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, 0.5,
                ))),
                ..Default::default()
            })
            .into()
    }

    fn view_navigation(&self) -> Element<'_, Message> {
        let nav_items = [
            (NavItem::Movies, "Movies", Page::Movies),
            (NavItem::Series, "Series", Page::Series),
        ];

        let nav_buttons: Vec<Element<'_, Message>> = nav_items
            .into_iter()
            .map(|(nav_item, label, page)| self.view_nav_button(nav_item, label, page))
            .collect();

        Row::with_children(nav_buttons)
            .spacing(24)
            .align_y(iced::Alignment::Center)
            .into()
    }

    fn view_nav_button(
        &self,
        nav_item: NavItem,
        label: &'static str,
        page: Page,
    ) -> Element<'_, Message> {
        let is_active = nav_item_for(self.current_page) == nav_item;
        let text_color = if is_active { TEXT_WHITE } else { TEXT_GRAY };

        let button_content: Element<'_, Message> = if is_active {
            let label_text = text(label).size(14).color(text_color);
            let underline = container(Space::new().width(Length::Fill).height(2)).style(
                |_theme| container::Style {
                    background: Some(iced::Background::Color(ACCENT_RED)),
                    ..Default::default()
                },
            );
            column![label_text, underline]
                .spacing(4)
                .align_x(iced::Alignment::Center)
                .into()
        } else {
            text(label).size(14).color(text_color).into()
        };

        button(button_content)
            .padding(Padding::new(8.0).left(12.0).right(12.0))
            .style(move |_theme, status| {
                let final_color = match status {
                    button::Status::Hovered => TEXT_WHITE,
                    _ if is_active => TEXT_WHITE,
                    _ => TEXT_GRAY,
                };
                button::Style {
                    background: Some(iced::Background::Color(Color::TRANSPARENT)),
                    text_color: final_color,
                    border: Border::default(),
                    shadow: Shadow::default(),
                    snap: false,
                }
            })
            .on_press(Message::NavigateTo(page))
            .into()
    }

    fn view_search_bar(&self) -> Element<'_, Message> {
        let search_icon = icon(ICON_SEARCH).size(14).color(TEXT_GRAY);

        let search_input = text_input("Search titles...", &self.search_query)
            .on_input(Message::SearchQueryChanged)
            .padding(8)
            .width(Length::Fixed(180.0))
            .style(|_theme, _status| text_input::Style {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
                icon: TEXT_GRAY,
                placeholder: TEXT_GRAY,
                value: TEXT_WHITE,
                selection: ACCENT_RED,
            });

        let mut content = row![search_icon, search_input]
            .spacing(8)
            .align_y(iced::Alignment::Center);

        if !self.search_query.is_empty() {
            let clear_button = button(text("Clear").size(12).color(TEXT_GRAY))
                .padding(Padding::new(4.0).left(8.0).right(8.0))
                .style(|_theme, _status| button::Style {
                    background: Some(iced::Background::Color(Color::TRANSPARENT)),
                    text_color: TEXT_GRAY,
                    border: Border::default(),
                    shadow: Shadow::default(),
                    snap: false,
                })
                .on_press(Message::ClearSearch);
            content = content.push(clear_button);
        }

        container(content)
            .padding(Padding::new(4.0).left(12.0).right(8.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, 0.7,
                ))),
                border: Border {
                    color: TEXT_GRAY,
                    width: 1.0,
                    radius: 24.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    pub fn view_main_content(&self) -> Element<'_, Message> {
        match self.current_page {
            Page::Movies => self.view_movies_page(),
            Page::Series => self.view_series_page(),
            Page::MovieDetail(id) | Page::SeriesDetail(id) => self.view_detail_page(id),
        }
    }

    fn view_movies_page(&self) -> Element<'_, Message> {
        // the popular strip is the page's soft gate
        if self.popular_movies.is_loading() {
            return self.view_loading_placeholder();
        }
        if let Some(error) = self.popular_movies.error() {
            return self.view_error_state(error);
        }

        let popular = self
            .popular_movies
            .value()
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let trending = self
            .trending_movies
            .value()
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let sources = movies_page_sections(popular, trending, &self.movie_genres);
        let hero = self.view_hero_section(popular);
        self.view_listing_page(hero, &sources)
    }

    fn view_series_page(&self) -> Element<'_, Message> {
        if self.popular_series.is_loading() {
            return self.view_loading_placeholder();
        }
        if let Some(error) = self.popular_series.error() {
            return self.view_error_state(error);
        }

        let popular = self
            .popular_series
            .value()
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let sources = series_page_sections(popular, &self.series_genres);
        let hero = self.view_hero_section(popular);
        self.view_listing_page(hero, &sources)
    }

    fn view_listing_page<'a>(
        &'a self,
        hero: Element<'a, Message>,
        sources: &[SectionSource<'a>],
    ) -> Element<'a, Message> {
        let sections = visible_sections(sources, &self.search_query);
        let query_is_blank = self.search_query.trim().is_empty();

        let body: Element<'a, Message> = if sections.is_empty() && !query_is_blank {
            self.view_no_results()
        } else {
            let strips: Vec<Element<'a, Message>> = sections
                .iter()
                .map(|section| {
                    container(self.view_carousel(section.index, section.label, &section.items))
                        .padding(Padding::new(0.0).left(48.0).right(48.0))
                        .into()
                })
                .collect();
            Column::with_children(strips)
                .spacing(48)
                .padding(Padding::new(32.0).top(0.0))
                .width(Length::Fill)
                .into()
        };

        let page_column = column![hero, body].width(Length::Fill);

        iced::widget::stack![
            scrollable(page_column)
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

    fn view_no_results(&self) -> Element<'_, Message> {
        container(
            column![
                text(format!("No titles found for \"{}\"", self.search_query.trim()))
                    .size(22)
                    .color(TEXT_WHITE),
                text("Try a different search term.").size(14).color(TEXT_GRAY)
            ]
            .spacing(8)
            .align_x(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(Padding::new(80.0))
        .center_x(Length::Fill)
        .into()
    }

    pub fn view_error_state<'a>(&'a self, error_message: &'a str) -> Element<'a, Message> {
        let error_text = text(error_message).size(18).color(ACCENT_RED);
        let retry_button = button(text("Retry").size(16).color(TEXT_WHITE))
            .padding(Padding::new(12.0).left(24.0).right(24.0))
            .style(|_theme, _status| button::Style {
                background: Some(iced::Background::Color(ACCENT_RED)),
                text_color: TEXT_WHITE,
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 4.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            })
            .on_press(Message::RetryLoad);

        container(
            column![error_text, retry_button]
                .spacing(16)
                .align_x(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
    }

    pub fn view_loading_placeholder(&self) -> Element<'_, Message> {
        let hero_skeleton = container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fixed(500.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            });

        let sections: Vec<Element<'_, Message>> =
            (0..3).map(|_| self.view_skeleton_section()).collect();

        column![
            hero_skeleton,
            Column::with_children(sections)
                .spacing(24)
                .padding(Padding::new(24.0).left(48.0).right(48.0))
                .width(Length::Fill)
        ]
        .width(Length::Fill)
        .into()
    }

    fn view_skeleton_section(&self) -> Element<'_, Message> {
        let title_skeleton =
            container(Space::new().width(150.0).height(24.0)).style(skeleton_style(4.0));

        let card_skeletons: Vec<Element<'_, Message>> = (0..6)
            .map(|_| {
                container(Space::new().width(150.0).height(225.0))
                    .style(skeleton_style(8.0))
                    .into()
            })
            .collect();

        let cards_row = Row::with_children(card_skeletons)
            .spacing(12)
            .align_y(iced::Alignment::Start);

        column![title_skeleton, cards_row]
            .spacing(16)
            .width(Length::Fill)
            .into()
    }
}

fn skeleton_style(radius: f32) -> impl Fn(&iced::Theme) -> container::Style {
    move |_theme| container::Style {
        background: Some(iced::Background::Color(Color::from_rgba(
            0.2, 0.2, 0.2, 0.5,
        ))),
        border: Border {
            radius: radius.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::tests::sample_title;

    fn batch(count: usize, name: &str) -> Vec<Title> {
        (0..count)
            .map(|i| sample_title(i as u64 + 1, &format!("{} {}", name, i), name))
            .collect()
    }

    #[test]
    fn mounting_with_empty_categories_yields_only_the_popular_strip() {
        let popular = batch(25, "Popular");
        let trending: Vec<Title> = Vec::new();
        let genres: Vec<GenreListing> = MOVIE_CATEGORIES
            .iter()
            .map(|c| GenreListing::new(c.genre_id))
            .collect();

        let sources = movies_page_sections(&popular, &trending, &genres);
        let sections = visible_sections(&sources, "");

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label, "Popular Now");
        assert_eq!(sections[0].index, 0);
        // the 25-item batch is truncated to the 20-card display cap
        assert_eq!(sections[0].items.len(), 20);
    }

    #[test]
    fn genre_strips_start_at_their_declared_base_index() {
        let popular = batch(1, "Popular");
        let trending = batch(1, "Trending");
        let movie_genres: Vec<GenreListing> = MOVIE_CATEGORIES
            .iter()
            .map(|c| GenreListing::new(c.genre_id))
            .collect();
        let series_genres: Vec<GenreListing> = SERIES_CATEGORIES
            .iter()
            .map(|c| GenreListing::new(c.genre_id))
            .collect();

        let movie_sources = movies_page_sections(&popular, &trending, &movie_genres);
        assert_eq!(
            movie_sources[crate::media::MOVIE_GENRE_SECTION_BASE].label,
            MOVIE_CATEGORIES[0].label
        );

        let series_sources = series_page_sections(&popular, &series_genres);
        assert_eq!(
            series_sources[crate::media::SERIES_GENRE_SECTION_BASE].label,
            SERIES_CATEGORIES[0].label
        );
    }

    #[test]
    fn empty_strips_disappear_entirely() {
        let popular = batch(3, "Popular");
        let action = batch(2, "Action");
        let sources = vec![
            SectionSource {
                label: "Popular Now",
                items: &popular,
                display_cap: Some(20),
            },
            SectionSource {
                label: "Comedy",
                items: &[],
                display_cap: Some(20),
            },
            SectionSource {
                label: "Action",
                items: &action,
                display_cap: Some(20),
            },
        ];

        let sections = visible_sections(&sources, "");
        assert_eq!(sections.len(), 2);
        // declared indices survive so scroll state stays attached
        assert_eq!(sections[0].index, 0);
        assert_eq!(sections[1].index, 2);
    }

    #[test]
    fn query_filters_each_strip_independently() {
        let popular = batch(5, "Galaxy");
        let action = batch(5, "Harbor");
        let sources = vec![
            SectionSource {
                label: "Popular Now",
                items: &popular,
                display_cap: Some(20),
            },
            SectionSource {
                label: "Action",
                items: &action,
                display_cap: Some(20),
            },
        ];

        let sections = visible_sections(&sources, "galaxy");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label, "Popular Now");
        assert_eq!(sections[0].items.len(), 5);

        // no strip survives a query that matches nothing
        assert!(visible_sections(&sources, "zzzz").is_empty());
    }
}
