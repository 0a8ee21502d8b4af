// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification text templates.
//!
//! The rendered body is stored with each push log and resent verbatim on
//! retry, so templates only run at first dispatch.

use gamepush_core::{ContactType, GameInfo, PromotionWindow};

const UNKNOWN_DATE: &str = "待定";

fn period(game: &GameInfo) -> String {
    format!(
        "{} ~ {}",
        game.start_date.as_deref().unwrap_or(UNKNOWN_DATE),
        game.end_date.as_deref().unwrap_or(UNKNOWN_DATE)
    )
}

/// WeChat customer-service text accepts anchors; other channels get the bare URL.
fn claim_link(game: &GameInfo, contact_type: ContactType) -> String {
    match contact_type {
        ContactType::WechatOfficial => format!("<a href=\"{}\">点击前往领取</a>", game.url),
        ContactType::Qq => game.url.clone(),
    }
}

/// Render the notification for one game in one window.
pub fn render(window: PromotionWindow, game: &GameInfo, contact_type: ContactType) -> String {
    match window {
        PromotionWindow::Current => render_current(game, contact_type),
        PromotionWindow::Next => render_next(std::slice::from_ref(game)),
    }
}

fn render_current(game: &GameInfo, contact_type: ContactType) -> String {
    let mut lines = vec![
        "🎮 Epic 本周免费游戏".to_string(),
        format!("《{}》", game.title),
        format!("领取地址：{}", claim_link(game, contact_type)),
        format!("限免时间：{}", period(game)),
    ];
    if let Some(thumbnail) = game.thumbnail.as_deref().filter(|t| !t.is_empty()) {
        lines.push(format!("封面：{thumbnail}"));
    }
    lines.push(String::new());
    lines.push("收到请回复「确认」，领取后回复「领取」。".to_string());
    lines.join("\n")
}

/// Preview of upcoming games: titles and dates only, no action links.
pub fn render_next(games: &[GameInfo]) -> String {
    let mut lines = vec!["📅 Epic 下周免费预告".to_string()];
    for game in games {
        lines.push(format!("  · 《{}》 {}", game.title, period(game)));
    }
    lines.push(String::new());
    lines.push("开放领取时会再提醒你。".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> GameInfo {
        GameInfo {
            title: "Game One".into(),
            slug: "g1".into(),
            url: "https://store.example/p/g1".into(),
            start_date: Some("2026-10-15 15:00:00".into()),
            end_date: None,
            thumbnail: Some("https://cdn.example/g1.jpg".into()),
        }
    }

    #[test]
    fn current_template_has_link_and_reply_hint() {
        let qq = render(PromotionWindow::Current, &game(), ContactType::Qq);
        assert!(qq.contains("《Game One》"));
        assert!(qq.contains("https://store.example/p/g1"));
        assert!(qq.contains("2026-10-15 15:00:00 ~ 待定"));
        assert!(qq.contains("「确认」"));
        assert!(qq.contains("「领取」"));
        assert!(!qq.contains("<a href"));

        let wechat = render(PromotionWindow::Current, &game(), ContactType::WechatOfficial);
        assert!(wechat.contains("<a href=\"https://store.example/p/g1\">"));
    }

    #[test]
    fn next_template_has_no_action_link() {
        let body = render(PromotionWindow::Next, &game(), ContactType::Qq);
        assert!(body.contains("《Game One》"));
        assert!(!body.contains("https://store.example/p/g1"));
        assert!(!body.contains("「确认」"));
    }
}
