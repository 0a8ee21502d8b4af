// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache key layout.
//!
//! | Key                        | Value                          |
//! |----------------------------|--------------------------------|
//! | `games:<window>`           | list of JSON-encoded GameInfo  |
//! | `notified:<window>:<slug>` | set of subscriber ids          |
//! | `status:<window>:<slug>`   | subscriber id -> status label  |

use gamepush_core::PromotionWindow;

pub fn games_key(window: PromotionWindow) -> String {
    format!("games:{}", window.as_str())
}

pub fn notified_key(window: PromotionWindow, slug: &str) -> String {
    format!("notified:{}:{slug}", window.as_str())
}

pub fn status_key(window: PromotionWindow, slug: &str) -> String {
    format!("status:{}:{slug}", window.as_str())
}

/// Prefixes covering all per-game state of one window.
pub fn window_state_prefixes(window: PromotionWindow) -> Vec<String> {
    vec![
        format!("notified:{}:", window.as_str()),
        format!("status:{}:", window.as_str()),
    ]
}
