//! Bot handlers
//!
//! Listing submission and owner moderation form posts.

use axum::{extract::Path, http::HeaderMap, response::Response, Extension, Form};
use serde::Deserialize;

use super::{dispatch, Client};
use crate::app::ViewAction;
use crate::domain::entities::{BotType, NewBotListing};
use crate::error::AppError;

/// Form body for POST /bots
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BotForm {
    pub name: String,
    /// One of the stored type values; missing means Discord
    #[serde(rename = "type")]
    pub bot_type: Option<String>,
    pub website: String,
    pub phone: String,
    pub discord: String,
}

impl TryFrom<BotForm> for NewBotListing {
    type Error = AppError;

    fn try_from(form: BotForm) -> Result<Self, Self::Error> {
        let bot_type = match form.bot_type.as_deref() {
            None | Some("") => BotType::default(),
            Some(value) => value.parse().map_err(AppError::BadRequest)?,
        };

        Ok(NewBotListing {
            name: form.name,
            bot_type,
            website: form.website,
            discord_link: form.discord,
            phone: form.phone,
        })
    }
}

/// POST /bots
pub async fn submit_bot(
    Extension(client): Extension<Client>,
    headers: HeaderMap,
    Form(form): Form<BotForm>,
) -> Result<Response, AppError> {
    let input = NewBotListing::try_from(form)?;
    Ok(dispatch(&client, &headers, ViewAction::SubmitBot(input)).await)
}

/// POST /bots/:id/verify
pub async fn verify_bot(
    Extension(client): Extension<Client>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    dispatch(&client, &headers, ViewAction::Verify(id.into())).await
}

/// POST /bots/:id/ban
pub async fn ban_bot(
    Extension(client): Extension<Client>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    dispatch(&client, &headers, ViewAction::Ban(id.into())).await
}

/// POST /bots/:id/delete
pub async fn delete_bot(
    Extension(client): Extension<Client>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    dispatch(&client, &headers, ViewAction::Delete(id.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(bot_type: Option<&str>) -> BotForm {
        BotForm {
            name: "HelpBot".to_string(),
            bot_type: bot_type.map(str::to_string),
            website: "https://help.example".to_string(),
            phone: "+49 123".to_string(),
            discord: "https://discord.gg/help".to_string(),
        }
    }

    #[test]
    fn form_maps_to_new_listing() {
        let input = NewBotListing::try_from(form(Some("WhatsApp"))).unwrap();

        assert_eq!(input.name, "HelpBot");
        assert_eq!(input.bot_type, BotType::WhatsApp);
        assert_eq!(input.discord_link, "https://discord.gg/help");
        assert_eq!(input.phone, "+49 123");
    }

    #[test]
    fn missing_type_defaults_to_discord() {
        assert_eq!(
            NewBotListing::try_from(form(None)).unwrap().bot_type,
            BotType::Discord
        );
        assert_eq!(
            NewBotListing::try_from(form(Some(""))).unwrap().bot_type,
            BotType::Discord
        );
    }

    #[test]
    fn beides_selects_both() {
        assert_eq!(
            NewBotListing::try_from(form(Some("Beides"))).unwrap().bot_type,
            BotType::Both
        );
    }

    #[test]
    fn unknown_type_is_bad_request() {
        let result = NewBotListing::try_from(form(Some("Telegram")));

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
