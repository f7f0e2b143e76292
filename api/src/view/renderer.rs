//! Page renderer
//!
//! Renders the directory page model to a self-contained HTML document.
//! Every interactive element is a plain form post so the page works without scripts.

use crate::app::{AuthMode, BotCard, FormState, Notice, PageModel};
use crate::domain::entities::BotType;

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; }
.light { background: #f8fafc; color: #0f172a; }
.dark { background: #0f172a; color: #e2e8f0; }
header { padding: 20px; display: flex; justify-content: space-between; align-items: center; background: #020617; color: #fff; }
header h1 { color: #38bdf8; margin: 0; }
header form { display: inline; }
section, main { padding: 20px; }
input, select, button { margin: 4px; padding: 6px 10px; }
.link { background: none; border: none; color: #38bdf8; cursor: pointer; padding: 0; }
.notice { margin: 20px; padding: 12px 16px; border-radius: 8px; display: flex; justify-content: space-between; }
.notice.info { background: #0ea5e9; color: #fff; }
.notice.error { background: #dc2626; color: #fff; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 20px; }
.card { padding: 16px; background: #020617; border-radius: 12px; color: #fff; border: none; }
.card.owner { border: 2px solid gold; }
.card a { color: #38bdf8; }
.card form { display: inline; }
"#;

/// Render a full page
pub fn render_page(page: &PageModel) -> String {
    let mut buf = String::new();

    buf.push_str("<!DOCTYPE html>\n<html lang=\"de\">\n<head>\n");
    buf.push_str("<meta charset=\"utf-8\">\n");
    buf.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    buf.push_str("<title>BotHub</title>\n");
    buf.push_str(&format!("<style>{}</style>\n", STYLE));
    buf.push_str("</head>\n");
    buf.push_str(&format!("<body class=\"{}\">\n", page.theme.as_str()));

    buf.push_str(&render_header(page));

    if let Some(notice) = &page.notice {
        buf.push_str(&render_notice(notice));
    }

    match &page.account {
        None => buf.push_str(&render_auth_form(page.auth_mode, &page.form)),
        Some(_) => {
            buf.push_str("<main>\n");
            if page.show_submission_form {
                buf.push_str(&render_submission_form(&page.form));
            }
            buf.push_str(&render_grid(&page.bots));
            buf.push_str("</main>\n");
        }
    }

    buf.push_str("</body>\n</html>\n");
    buf
}

fn render_header(page: &PageModel) -> String {
    let mut buf = String::new();
    buf.push_str("<header>\n<h1>🤖 BotHub</h1>\n<div>\n");
    buf.push_str(&post_button("/theme", "🌗", None));

    match &page.account {
        Some(account) => buf.push_str(&post_button(
            "/logout",
            &format!("Logout ({})", escape(&account.email)),
            None,
        )),
        None => buf.push_str(&post_button("/auth/show", "Login/Register", None)),
    }

    buf.push_str("</div>\n</header>\n");
    buf
}

fn render_notice(notice: &Notice) -> String {
    let (class, message) = match notice {
        Notice::Info(message) => ("info", message),
        Notice::Error(message) => ("error", message),
    };

    format!(
        "<div class=\"notice {}\" role=\"alert\">\n<span>{}</span>\n{}</div>\n",
        class,
        escape(message),
        post_button("/notice/dismiss", "OK", None)
    )
}

fn render_auth_form(mode: AuthMode, form: &FormState) -> String {
    let (title, submit) = match mode {
        AuthMode::Login => ("Anmelden", "Login"),
        AuthMode::Register => ("Registrieren", "Registrieren"),
    };

    let mut buf = String::new();
    buf.push_str("<section>\n");
    buf.push_str(&format!("<h2>{}</h2>\n", title));
    buf.push_str("<form method=\"post\" action=\"/auth\">\n");
    buf.push_str(&format!(
        "<input name=\"email\" type=\"email\" placeholder=\"Email\" value=\"{}\">\n",
        escape(&form.email)
    ));
    // The password is never echoed back
    buf.push_str("<input name=\"password\" type=\"password\" placeholder=\"Passwort\">\n");
    buf.push_str(&format!("<button type=\"submit\">{}</button>\n", submit));
    buf.push_str("</form>\n");
    buf.push_str(&post_button("/auth/mode", "Konto wechseln", Some("link")));
    buf.push_str("</section>\n");
    buf
}

fn render_submission_form(form: &FormState) -> String {
    let mut buf = String::new();
    buf.push_str("<section>\n<h2>Bot hinzufügen</h2>\n");
    buf.push_str("<form method=\"post\" action=\"/bots\">\n");
    buf.push_str(&text_input("name", "Bot Name", &form.bot_name));

    buf.push_str("<select name=\"type\">\n");
    for bot_type in BotType::ALL {
        let selected = if bot_type == form.bot_type {
            " selected"
        } else {
            ""
        };
        buf.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            bot_type.as_str(),
            selected,
            escape(bot_type.label())
        ));
    }
    buf.push_str("</select>\n");

    buf.push_str(&text_input("website", "Website", &form.bot_website));
    buf.push_str(&text_input("phone", "WhatsApp Nummer", &form.bot_phone));
    buf.push_str(&text_input("discord", "Discord Link", &form.bot_discord));
    buf.push_str("<button type=\"submit\">Hinzufügen</button>\n");
    buf.push_str("</form>\n</section>\n");
    buf
}

fn render_grid(bots: &[BotCard]) -> String {
    let mut buf = String::new();
    buf.push_str("<h2>Alle Bots</h2>\n<div class=\"grid\">\n");
    for bot in bots {
        buf.push_str(&render_card(bot));
    }
    buf.push_str("</div>\n");
    buf
}

fn render_card(bot: &BotCard) -> String {
    let mut buf = String::new();
    let class = if bot.owner_listing {
        "card owner"
    } else {
        "card"
    };
    buf.push_str(&format!("<div class=\"{}\">\n", class));

    let badge = if bot.verified { " ✔" } else { "" };
    buf.push_str(&format!("<h3>{}{}</h3>\n", escape(&bot.name), badge));
    buf.push_str(&format!("<p>Type: {}</p>\n", bot.bot_type.as_str()));

    if let Some(website) = &bot.website {
        buf.push_str(&render_link("🌐", website, "Website"));
    }
    if let Some(discord) = &bot.discord_link {
        buf.push_str(&render_link("💬", discord, "Discord Link"));
    }
    if let Some(phone) = &bot.phone {
        buf.push_str(&format!("<p>📱 {}</p>\n", escape(phone)));
    }

    let id = urlencoding::encode(&bot.id.0);
    if bot.can_verify {
        buf.push_str(&post_button(
            &format!("/bots/{}/verify", id),
            "Verifizieren",
            None,
        ));
    }
    if bot.can_ban {
        buf.push_str(&post_button(&format!("/bots/{}/ban", id), "Sperren", None));
    }
    if bot.can_delete {
        buf.push_str(&post_button(&format!("/bots/{}/delete", id), "Löschen", None));
    }

    buf.push_str("</div>\n");
    buf
}

/// Submitted links only become anchors for http(s) targets; anything else is shown as text.
fn render_link(icon: &str, url: &str, label: &str) -> String {
    if is_web_url(url) {
        format!(
            "<p>{} <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></p>\n",
            icon,
            escape(url),
            label
        )
    } else {
        format!("<p>{} {}</p>\n", icon, escape(url))
    }
}

fn is_web_url(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    url.starts_with("https://") || url.starts_with("http://")
}

fn text_input(name: &str, placeholder: &str, value: &str) -> String {
    format!(
        "<input name=\"{}\" placeholder=\"{}\" value=\"{}\">\n",
        name,
        placeholder,
        escape(value)
    )
}

/// A single-button form posting to `action`. `label` must already be escaped.
fn post_button(action: &str, label: &str, class: Option<&str>) -> String {
    let class = class
        .map(|c| format!(" class=\"{}\"", c))
        .unwrap_or_default();
    format!(
        "<form method=\"post\" action=\"{}\"><button type=\"submit\"{}>{}</button></form>\n",
        escape(action),
        class,
        label
    )
}

/// Escape text for HTML element content and quoted attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
