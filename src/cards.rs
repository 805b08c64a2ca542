use iced::widget::{button, column, container, row, scrollable, text, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::hero::star_row;
use crate::media::{
    section_id, truncate_overview, MediaId, MediaType, Message, Page, ScrollDirection, Title,
    ACCENT_RED, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::tmdb::ImageSize;
use crate::Marquee;

const ICON_PLAY_FILL: char = '\u{F4F4}';
const ICON_PLUS_LG: char = '\u{F64D}';
const ICON_HEART: char = '\u{F417}';
const ICON_HEART_FILL: char = '\u{F415}';
const ICON_FILM: char = '\u{F3A9}';
const ICON_CHEVRON_LEFT: char = '\u{F284}';
const ICON_CHEVRON_RIGHT: char = '\u{F285}';

pub const CARD_WIDTH: f32 = 150.0;
pub const CARD_HEIGHT: f32 = 225.0;
pub const CARD_SPACING: f32 = 16.0;
const EXPANDED_WIDTH: f32 = 400.0;
const EXPANDED_HEIGHT: f32 = 225.0;
const OVERVIEW_BUDGET: usize = 120;

/// Width of the visible strip area: the window minus the page gutters.
pub const VIEWPORT_WIDTH: f32 = 1184.0;
/// The right control disappears once the offset is within this distance
/// of the content end.
pub const SCROLL_END_THRESHOLD: f32 = 10.0;

pub fn strip_content_width(card_count: usize) -> f32 {
    if card_count == 0 {
        return 0.0;
    }
    card_count as f32 * (CARD_WIDTH + CARD_SPACING) - CARD_SPACING
}

pub fn can_scroll_left(offset: f32, target: f32) -> bool {
    target > 0.0 || offset > 1.0
}

pub fn can_scroll_right(offset: f32, target: f32, content_width: f32) -> bool {
    content_width > VIEWPORT_WIDTH
        && target.max(offset) < content_width - VIEWPORT_WIDTH - SCROLL_END_THRESHOLD
}

fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

fn hidden_horizontal_scrollbar_style(
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

fn detail_page_for(item: &Title) -> Page {
    match item.media_type {
        MediaType::Movie => Page::MovieDetail(item.id),
        MediaType::TvSeries => Page::SeriesDetail(item.id),
    }
}

impl Marquee {
    /// One titled horizontal strip. An empty item set renders nothing at
    /// all, not an empty shell.
    pub fn view_carousel(
        &self,
        section_index: usize,
        label: &str,
        items: &[&Title],
    ) -> Element<'_, Message> {
        if items.is_empty() {
            return column![].into();
        }

        let section_title = text(label.to_string())
            .size(24)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            });

        let cards: Vec<Element<'_, Message>> = items
            .iter()
            .map(|&item| self.view_title_card(item))
            .collect();

        let cards_row = Row::with_children(cards)
            .spacing(CARD_SPACING)
            .align_y(iced::Alignment::Start);

        let Some(section_id_str) = section_id(section_index) else {
            return column![section_title, cards_row].spacing(20).into();
        };
        let scrollable_cards = scrollable(cards_row)
            .id(iced::widget::Id::new(section_id_str))
            .on_scroll(move |viewport| {
                Message::SectionScrolled(section_index, viewport.absolute_offset().x)
            })
            .direction(scrollable::Direction::Horizontal(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .width(Length::Fill)
            .style(hidden_horizontal_scrollbar_style);

        let is_hovered = self.hovered_section == Some(section_index);
        let scroll_offset = self
            .section_scroll_offsets
            .get(section_index)
            .copied()
            .unwrap_or(0.0);
        let scroll_target = self
            .section_scroll_targets
            .get(section_index)
            .copied()
            .unwrap_or(0.0);

        let content_width = strip_content_width(items.len());
        let show_left = is_hovered && can_scroll_left(scroll_offset, scroll_target);
        let show_right =
            is_hovered && can_scroll_right(scroll_offset, scroll_target, content_width);

        let strip = self.view_strip_with_controls(
            scrollable_cards.into(),
            section_index,
            show_left,
            show_right,
        );

        let section_content = column![section_title, strip].spacing(20).width(Length::Fill);

        iced::widget::mouse_area(section_content)
            .on_enter(Message::HoverSection(Some(section_index)))
            .on_exit(Message::HoverSection(None))
            .into()
    }

    fn view_strip_with_controls<'a>(
        &'a self,
        strip: Element<'a, Message>,
        section_index: usize,
        show_left: bool,
        show_right: bool,
    ) -> Element<'a, Message> {
        let left_control: Element<'a, Message> = if show_left {
            self.view_scroll_control(section_index, ScrollDirection::Left)
        } else {
            container(Space::new().width(0).height(0)).into()
        };

        let right_control: Element<'a, Message> = if show_right {
            self.view_scroll_control(section_index, ScrollDirection::Right)
        } else {
            container(Space::new().width(0).height(0)).into()
        };

        let left_overlay = container(left_control)
            .width(Length::Fill)
            .height(Length::Fixed(CARD_HEIGHT))
            .align_x(iced::alignment::Horizontal::Left)
            .align_y(iced::alignment::Vertical::Center);

        let right_overlay = container(right_control)
            .width(Length::Fill)
            .height(Length::Fixed(CARD_HEIGHT))
            .align_x(iced::alignment::Horizontal::Right)
            .align_y(iced::alignment::Vertical::Center);

        iced::widget::stack![strip, left_overlay, right_overlay]
            .width(Length::Fill)
            .height(Length::Fixed(CARD_HEIGHT))
            .into()
    }

    fn view_scroll_control(
        &self,
        section_index: usize,
        direction: ScrollDirection,
    ) -> Element<'_, Message> {
        let icon_char = match direction {
            ScrollDirection::Left => ICON_CHEVRON_LEFT,
            ScrollDirection::Right => ICON_CHEVRON_RIGHT,
        };

        button(
            container(icon(icon_char).size(24).color(TEXT_WHITE))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .width(Length::Fixed(48.0))
        .height(Length::Fixed(80.0))
        .padding(0)
        .style(|_theme, status| {
            let bg_alpha = match status {
                button::Status::Hovered => 0.9,
                _ => 0.7,
            };
            button::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, bg_alpha,
                ))),
                text_color: TEXT_WHITE,
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 4.0.into(),
                },
                shadow: Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
                    offset: iced::Vector::new(0.0, 2.0),
                    blur_radius: 8.0,
                },
                snap: false,
            }
        })
        .on_press(Message::ScrollSection(section_index, direction))
        .into()
    }

    pub fn view_title_card(&self, item: &Title) -> Element<'_, Message> {
        let media_id = item.id;
        if self.hovered_card == Some(media_id) {
            return self.view_expanded_card(item);
        }

        let card_container = container(self.view_card_poster(item))
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(CARD_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 8.0.into(),
                },
                shadow: Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.3),
                    offset: iced::Vector::new(0.0, 4.0),
                    blur_radius: 8.0,
                },
                ..Default::default()
            });

        iced::widget::mouse_area(card_container)
            .on_enter(Message::HoverCard(Some(media_id)))
            .on_exit(Message::HoverCard(None))
            .on_press(Message::NavigateTo(detail_page_for(item)))
            .into()
    }

    fn view_expanded_card(&self, item: &Title) -> Element<'_, Message> {
        let media_id = item.id;

        let stacked = iced::widget::stack![
            self.view_card_backdrop(item),
            self.view_expanded_overlay(item)
        ];

        let card_container = container(stacked)
            .width(Length::Fixed(EXPANDED_WIDTH))
            .height(Length::Fixed(EXPANDED_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 8.0.into(),
                },
                shadow: Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
                    offset: iced::Vector::new(0.0, 6.0),
                    blur_radius: 12.0,
                },
                ..Default::default()
            });

        iced::widget::mouse_area(card_container)
            .on_enter(Message::HoverCard(Some(media_id)))
            .on_exit(Message::HoverCard(None))
            .on_press(Message::NavigateTo(detail_page_for(item)))
            .into()
    }

    fn view_card_backdrop(&self, item: &Title) -> Element<'_, Message> {
        let handle = self
            .client
            .as_ref()
            .and_then(|client| client.image_url(item.backdrop_path.as_deref(), ImageSize::W780))
            .filter(|url| !self.image_cache.has_failed(url))
            .and_then(|url| self.image_cache.get(&url).cloned());

        match handle {
            Some(handle) => container(
                iced::widget::image(handle)
                    .width(Length::Fixed(EXPANDED_WIDTH))
                    .height(Length::Fixed(EXPANDED_HEIGHT))
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
            None => container(Space::new().width(EXPANDED_WIDTH).height(EXPANDED_HEIGHT))
                .width(Length::Fixed(EXPANDED_WIDTH))
                .height(Length::Fixed(EXPANDED_HEIGHT))
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
    }

    fn view_expanded_overlay(&self, item: &Title) -> Element<'_, Message> {
        let media_id = item.id;

        let title_text = text(item.title.clone())
            .size(16)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            })
            .wrapping(text::Wrapping::Word);

        let mut meta: Vec<Element<'_, Message>> = Vec::new();
        if let Some(year) = item.release_year() {
            meta.push(text(year.to_string()).size(12).color(TEXT_GRAY).into());
        }
        meta.push(
            text(if item.adult { "18+" } else { "All" })
                .size(12)
                .color(TEXT_GRAY)
                .into(),
        );
        meta.push(
            text(item.original_language.to_uppercase())
                .size(12)
                .color(TEXT_GRAY)
                .into(),
        );
        let meta_row = Row::with_children(meta)
            .spacing(8)
            .align_y(iced::Alignment::Center);

        let rating_row = row![
            star_row(item.vote_average),
            text(format!("{:.1}", item.vote_average))
                .size(12)
                .color(TEXT_GRAY)
        ]
        .spacing(6)
        .align_y(iced::Alignment::Center);

        let description = text(truncate_overview(&item.overview, OVERVIEW_BUDGET))
            .size(12)
            .color(TEXT_GRAY)
            .wrapping(text::Wrapping::Word);

        let actions = row![
            self.view_card_play_button(media_id),
            self.view_card_action_button(ICON_PLUS_LG, Message::AddToList(media_id)),
            self.view_card_favorite_button(media_id),
        ]
        .spacing(6)
        .align_y(iced::Alignment::Center);

        let content = column![title_text, meta_row, rating_row, description, actions]
            .spacing(6)
            .padding(Padding::new(12.0));

        let content_container = container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(iced::alignment::Horizontal::Left)
            .align_y(iced::alignment::Vertical::Bottom);

        let bottom_gradient = container(Space::new().width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(std::f32::consts::PI)
                        .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.9))
                        .add_stop(0.45, Color::from_rgba(0.0, 0.0, 0.0, 0.55))
                        .add_stop(0.8, Color::from_rgba(0.0, 0.0, 0.0, 0.15))
                        .add_stop(1.0, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });

        container(
            iced::widget::stack![bottom_gradient, content_container]
                .width(Length::Fill)
                .height(Length::Fill),
        )
        .width(Length::Fixed(EXPANDED_WIDTH))
        .height(Length::Fixed(EXPANDED_HEIGHT))
        .style(|_theme| container::Style {
            border: Border {
                radius: 8.0.into(),
                ..Default::default()
            },
            ..Default::default()
        })
        .into()
    }

    fn view_card_play_button(&self, media_id: MediaId) -> Element<'_, Message> {
        button(
            row![
                icon(ICON_PLAY_FILL).size(14).color(TEXT_WHITE),
                text("Play").size(13).color(TEXT_WHITE)
            ]
            .spacing(6)
            .align_y(iced::Alignment::Center),
        )
        .padding(Padding::new(8.0).left(12.0).right(14.0))
        .style(|_theme, status| {
            let bg_color = match status {
                button::Status::Hovered => Color::from_rgb(0.698, 0.027, 0.063),
                _ => ACCENT_RED,
            };
            button::Style {
                background: Some(iced::Background::Color(bg_color)),
                text_color: TEXT_WHITE,
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 6.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::PlayContent(media_id))
        .into()
    }

    fn view_card_action_button(
        &self,
        icon_char: char,
        message: Message,
    ) -> Element<'_, Message> {
        let button_size = 32.0;
        button(
            container(icon(icon_char).size(14).color(TEXT_WHITE))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .width(Length::Fixed(button_size))
        .height(Length::Fixed(button_size))
        .padding(0)
        .style(|_theme, status| {
            let bg_color = match status {
                button::Status::Hovered => Color::from_rgba(1.0, 1.0, 1.0, 0.25),
                _ => Color::from_rgba(0.0, 0.0, 0.0, 0.5),
            };
            button::Style {
                background: Some(iced::Background::Color(bg_color)),
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
        .on_press(message)
        .into()
    }

    fn view_card_favorite_button(&self, media_id: MediaId) -> Element<'_, Message> {
        let icon_char = if self.favorites.contains(&media_id) {
            ICON_HEART_FILL
        } else {
            ICON_HEART
        };
        self.view_card_action_button(icon_char, Message::ToggleFavorite(media_id))
    }

    fn view_card_poster(&self, item: &Title) -> Element<'_, Message> {
        let handle = self
            .client
            .as_ref()
            .and_then(|client| client.image_url(item.poster_path.as_deref(), ImageSize::W500))
            .filter(|url| !self.image_cache.has_failed(url))
            .and_then(|url| self.image_cache.get(&url).cloned());

        match handle {
            Some(handle) => iced::widget::image(handle)
                .width(Length::Fixed(CARD_WIDTH))
                .height(Length::Fixed(CARD_HEIGHT))
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => self.view_card_placeholder(&item.title),
        }
    }

    fn view_card_placeholder(&self, label: &str) -> Element<'_, Message> {
        container(
            column![
                icon(ICON_FILM).size(48).color(TEXT_GRAY),
                text(truncate_overview(label, 30)).size(12).color(TEXT_GRAY)
            ]
            .spacing(8)
            .align_x(iced::Alignment::Center),
        )
        .width(Length::Fixed(CARD_WIDTH))
        .height(Length::Fixed(CARD_HEIGHT))
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
            ..Default::default()
        })
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_control_hidden_at_origin() {
        assert!(!can_scroll_left(0.0, 0.0));
        assert!(can_scroll_left(120.0, 120.0));
        assert!(can_scroll_left(0.0, 500.0));
    }

    #[test]
    fn right_control_hidden_near_content_end() {
        let content = strip_content_width(20);
        assert!(can_scroll_right(0.0, 0.0, content));
        // sitting just before the end threshold
        let end = content - VIEWPORT_WIDTH;
        assert!(!can_scroll_right(end - 5.0, end - 5.0, content));
        assert!(!can_scroll_right(end, end, content));
    }

    #[test]
    fn right_control_hidden_when_everything_fits() {
        let content = strip_content_width(4);
        assert!(content < VIEWPORT_WIDTH);
        assert!(!can_scroll_right(0.0, 0.0, content));
    }

    #[test]
    fn strip_width_accounts_for_spacing() {
        assert_eq!(strip_content_width(0), 0.0);
        assert_eq!(strip_content_width(1), CARD_WIDTH);
        assert_eq!(
            strip_content_width(2),
            CARD_WIDTH * 2.0 + CARD_SPACING
        );
    }
}
