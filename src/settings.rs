use std::path::PathBuf;

use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length};
use serde::{Deserialize, Serialize};

use crate::media::{ACCENT_RED, BACKGROUND_BLACK, TEXT_GRAY, TEXT_WHITE};

/// Persisted client configuration: the TMDB API read access token (sent
/// as a bearer header) and the catalog language.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppSettings {
    pub access_token: String,
    pub language: String,
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("marquee")
                .join("config.json")
        })
    }

    pub fn load() -> Option<Self> {
        let path = Self::config_path()?;
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path().ok_or("Could not determine config path")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())
    }

    pub fn is_valid(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum SetupMessage {
    AccessTokenChanged(String),
    LanguageChanged(String),
    Submit,
}

pub struct SetupPage {
    pub access_token: String,
    pub language: String,
    pub error: Option<String>,
}

impl Default for SetupPage {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            language: String::from("en-US"),
            error: None,
        }
    }
}

impl SetupPage {
    pub fn update(&mut self, message: SetupMessage) -> Option<AppSettings> {
        match message {
            SetupMessage::AccessTokenChanged(token) => {
                self.access_token = token;
                self.error = None;
                None
            }
            SetupMessage::LanguageChanged(language) => {
                self.language = language;
                None
            }
            SetupMessage::Submit => {
                if self.access_token.trim().is_empty() {
                    self.error = Some(String::from("An API read access token is required"));
                    return None;
                }
                let settings = AppSettings {
                    access_token: self.access_token.trim().to_string(),
                    language: if self.language.trim().is_empty() {
                        String::from("en-US")
                    } else {
                        self.language.trim().to_string()
                    },
                };
                if let Err(e) = settings.save() {
                    self.error = Some(format!("Failed to save: {}", e));
                    return None;
                }
                Some(settings)
            }
        }
    }

    pub fn view(&self) -> Element<'_, SetupMessage> {
        let logo = text("MARQUEE").size(48).color(ACCENT_RED);

        let title = text("Welcome to Marquee").size(28).color(TEXT_WHITE);
        let subtitle = text("Configure your TMDB API access to get started")
            .size(14)
            .color(TEXT_GRAY);

        let token_label = text("TMDB API Read Access Token").size(14).color(TEXT_WHITE);
        let token_hint = text("Create one for free at themoviedb.org/settings/api")
            .size(12)
            .color(TEXT_GRAY);
        let token_input = text_input("Paste your access token...", &self.access_token)
            .on_input(SetupMessage::AccessTokenChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let lang_label = text("Language").size(14).color(TEXT_WHITE);
        let lang_hint = text("Examples: en-US, de-DE, fr-FR, pt-BR")
            .size(12)
            .color(TEXT_GRAY);
        let lang_input = text_input("en-US", &self.language)
            .on_input(SetupMessage::LanguageChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let submit_button = button(text("Get Started").size(16).color(TEXT_WHITE))
            .padding([12, 32])
            .style(|_theme, status| {
                let bg = match status {
                    button::Status::Hovered => iced::Color::from_rgb(0.7, 0.02, 0.06),
                    _ => ACCENT_RED,
                };
                button::Style {
                    background: Some(iced::Background::Color(bg)),
                    text_color: TEXT_WHITE,
                    border: iced::Border::default().rounded(4),
                    ..Default::default()
                }
            })
            .on_press(SetupMessage::Submit);

        let error_text = if let Some(ref err) = self.error {
            text(err).size(14).color(ACCENT_RED)
        } else {
            text("").size(14)
        };

        let spacer = || Space::new().height(16);
        let small_spacer = || Space::new().height(4);

        let form = column![
            logo,
            spacer(),
            title,
            small_spacer(),
            subtitle,
            spacer(),
            spacer(),
            token_label,
            small_spacer(),
            token_hint,
            small_spacer(),
            token_input,
            spacer(),
            lang_label,
            small_spacer(),
            lang_hint,
            small_spacer(),
            lang_input,
            spacer(),
            error_text,
            small_spacer(),
            row![submit_button].width(Length::Fill),
        ]
        .width(Length::Fixed(400.0))
        .align_x(Alignment::Start);

        container(form)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            })
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_through_json() {
        let settings = AppSettings {
            access_token: String::from("token-123"),
            language: String::from("pt-BR"),
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.access_token, "token-123");
        assert_eq!(back.language, "pt-BR");
    }

    #[test]
    fn setup_requires_a_token() {
        let mut setup = SetupPage::default();
        assert!(setup.update(SetupMessage::Submit).is_none());
        assert!(setup.error.is_some());

        setup.update(SetupMessage::AccessTokenChanged(String::from("  ")));
        assert!(setup.update(SetupMessage::Submit).is_none());
    }
}
