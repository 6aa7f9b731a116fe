// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword intent routing.
//!
//! An ordered table of trigger-substring rules evaluated before any
//! semantic lookup. The first category whose trigger is contained in the
//! normalized query wins and short-circuits the pipeline.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

use crate::config::RouteRuleConfig;
use crate::kb::KbEntry;

/// Route categories, listed in built-in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCategory {
    Greeting,
    Farewell,
    Thanks,
    Menu,
    KidsMenu,
    Hours,
    Reservation,
    Delivery,
    Contact,
}

impl fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteCategory::Greeting => "greeting",
            RouteCategory::Farewell => "farewell",
            RouteCategory::Thanks => "thanks",
            RouteCategory::Menu => "menu",
            RouteCategory::KidsMenu => "kids-menu",
            RouteCategory::Hours => "hours",
            RouteCategory::Reservation => "reservation",
            RouteCategory::Delivery => "delivery",
            RouteCategory::Contact => "contact",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RouteCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "greeting" => Ok(RouteCategory::Greeting),
            "farewell" => Ok(RouteCategory::Farewell),
            "thanks" => Ok(RouteCategory::Thanks),
            "menu" => Ok(RouteCategory::Menu),
            "kids-menu" | "kids_menu" => Ok(RouteCategory::KidsMenu),
            "hours" | "opening-hours" => Ok(RouteCategory::Hours),
            "reservation" => Ok(RouteCategory::Reservation),
            "delivery" => Ok(RouteCategory::Delivery),
            "contact" => Ok(RouteCategory::Contact),
            other => Err(format!("Unknown route category: {}", other)),
        }
    }
}

impl RouteCategory {
    /// Whether the response is rendered from the live knowledge base
    /// rather than a fixed string.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, RouteCategory::Menu | RouteCategory::KidsMenu)
    }

    fn builtin_response(&self) -> &'static str {
        match self {
            RouteCategory::Greeting => {
                "👋 Hello! Welcome to **Java Restaurant**. How can I help you today?"
            }
            RouteCategory::Farewell => "👋 Goodbye! Hope to see you soon at Java Restaurant.",
            RouteCategory::Thanks => "😊 You’re welcome! Anything else I can help with?",
            RouteCategory::Hours => "⏰ We are open daily from 9 AM to 11 PM.",
            RouteCategory::Reservation => {
                "📞 You can reserve a table by calling us at +254 700 000 000 or asking here."
            }
            RouteCategory::Delivery => {
                "🚚 We offer delivery within Nairobi. Delivery charges may apply."
            }
            RouteCategory::Contact => {
                "📧 You can reach us at java@example.com or call +254 700 000 000."
            }
            // Dynamic categories never reach here through route()
            RouteCategory::Menu | RouteCategory::KidsMenu => "",
        }
    }
}

/// One trigger rule. `response` of `None` means the built-in fixed string
/// for the category, or dynamic rendering for menu categories.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub category: RouteCategory,
    pub triggers: Vec<String>,
    pub response: Option<String>,
}

impl RouteRule {
    fn new(category: RouteCategory, triggers: &[&str]) -> Self {
        Self {
            category,
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            response: None,
        }
    }

    fn fires(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t.as_str()))
    }
}

/// A fired route.
#[derive(Debug, Clone)]
pub struct Routed {
    pub category: RouteCategory,
    pub response: String,
}

/// Ordered set of route rules; table order is priority order.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// The built-in table with the stock triggers, in priority order.
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                RouteRule::new(
                    RouteCategory::Greeting,
                    &["hello", "hi", "hey", "good morning", "good afternoon"],
                ),
                RouteRule::new(RouteCategory::Farewell, &["bye", "goodbye", "see you"]),
                RouteRule::new(RouteCategory::Thanks, &["thank you", "thanks", "thx"]),
                RouteRule::new(
                    RouteCategory::Menu,
                    &["menu", "our menu", "what do you serve", "food options"],
                ),
                RouteRule::new(
                    RouteCategory::KidsMenu,
                    &["kids menu", "menu for kids", "children menu"],
                ),
                RouteRule::new(
                    RouteCategory::Hours,
                    &["opening hours", "hours", "open", "close", "time"],
                ),
                RouteRule::new(
                    RouteCategory::Reservation,
                    &["reserve", "reservation", "book a table"],
                ),
                RouteRule::new(
                    RouteCategory::Delivery,
                    &["delivery", "deliver", "home delivery"],
                ),
                RouteRule::new(
                    RouteCategory::Contact,
                    &["contact", "phone", "number", "email"],
                ),
            ],
        }
    }

    /// Builds a table from a configuration override; rule order in the
    /// file becomes priority order.
    pub fn from_config(rules: &[RouteRuleConfig]) -> Result<Self> {
        let mut parsed = Vec::with_capacity(rules.len());
        for rule in rules {
            let category = match rule.category.parse::<RouteCategory>() {
                Ok(category) => category,
                Err(err) => bail!("Invalid route table: {}", err),
            };
            parsed.push(RouteRule {
                category,
                triggers: rule.triggers.iter().map(|t| t.to_lowercase()).collect(),
                response: rule.response.clone(),
            });
        }
        Ok(Self { rules: parsed })
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Evaluates categories in priority order against the normalized
    /// query; the first that fires wins and later rules are skipped.
    pub fn route(&self, query: &str, entries: &[KbEntry]) -> Option<Routed> {
        let normalized = query.to_lowercase().trim().to_string();

        for rule in &self.rules {
            if !rule.fires(&normalized) {
                continue;
            }

            let response = match rule.category {
                RouteCategory::Menu => render_menu(entries),
                RouteCategory::KidsMenu => render_kids_menu(entries),
                _ => rule
                    .response
                    .clone()
                    .unwrap_or_else(|| rule.category.builtin_response().to_string()),
            };

            tracing::debug!(category = %rule.category, "keyword route fired");
            return Some(Routed {
                category: rule.category,
                response,
            });
        }

        None
    }
}

fn render_line(prefix: &str, entry: &KbEntry) -> String {
    let mut line = format!("{} {}: {}", prefix, entry.question, entry.answer);
    let flair = entry.annotations();
    if !flair.is_empty() {
        line.push_str(" | ");
        line.push_str(&flair.join(" | "));
    }
    line
}

/// Menu = entries carrying a price or prep time, in knowledge-base order.
fn render_menu(entries: &[KbEntry]) -> String {
    entries
        .iter()
        .filter(|e| e.is_menu_item())
        .map(|e| render_line("🍽", e))
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Kids menu = entries tagged `Kids`, falling back to a case-sensitive
/// `Mini`/`Kids` substring match on the question text when none is tagged.
fn render_kids_menu(entries: &[KbEntry]) -> String {
    let tagged: Vec<&KbEntry> = entries.iter().filter(|e| e.age_tag == "Kids").collect();
    let selected: Vec<&KbEntry> = if tagged.is_empty() {
        entries
            .iter()
            .filter(|e| e.question.contains("Mini") || e.question.contains("Kids"))
            .collect()
    } else {
        tagged
    };

    selected
        .iter()
        .map(|e| render_line("🍭", e))
        .collect::<Vec<_>>()
        .join("<br>")
}
