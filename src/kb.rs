// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-base loading and normalization.
//!
//! Reads restaurant menu/FAQ entries from a JSON source (primary) or a CSV
//! source (fallback), maps alternate field names onto the canonical entry
//! shape, and appends the built-in FAQ set. The resulting entry order is
//! the display order and the embedding index order: external entries
//! first, built-in FAQ last.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::errors::ConfigurationError;

/// A single question/answer entry.
///
/// Optional fields are empty strings when absent. Entries are immutable
/// after load; the full set is rebuilt once per process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KbEntry {
    pub question: String,
    pub answer: String,
    pub price: String,
    pub prep_time: String,
    pub diet: String,
    pub age_tag: String,
}

impl KbEntry {
    /// FAQ-style entry with no menu annotations.
    pub fn faq(question: &str, answer: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            price: String::new(),
            prep_time: String::new(),
            diet: String::new(),
            age_tag: String::new(),
        }
    }

    /// An entry counts as a menu item when it carries a price or prep time.
    pub fn is_menu_item(&self) -> bool {
        !self.price.is_empty() || !self.prep_time.is_empty()
    }

    /// Present annotations as display fragments, in fixed order.
    pub fn annotations(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if !self.price.is_empty() {
            parts.push(format!("💰 {}", self.price));
        }
        if !self.prep_time.is_empty() {
            parts.push(format!("⏱ {} mins", self.prep_time));
        }
        if !self.diet.is_empty() {
            parts.push(format!("🥗 {}", self.diet));
        }
        parts
    }
}

// Accepted alternate names per canonical field; first non-empty value wins.
const QUESTION_KEYS: &[&str] = &["Name / Question", "Name"];
const ANSWER_KEYS: &[&str] = &["Details / Answer", "Details"];
const PRICE_KEYS: &[&str] = &["Price_KES", "Price"];
const PREP_TIME_KEYS: &[&str] = &["Estimated_Prep_Time_mins", "Estimated prep time (minutes)"];
const DIET_KEYS: &[&str] = &["Tags_Dietary_Info", "Dietary tags"];
const AGE_KEYS: &[&str] = &["Tags_Age", "Age tag"];

/// Loads the knowledge base from the JSON source, falling back to the CSV
/// source, and appends the built-in FAQ entries.
///
/// Absence of both sources is fatal: the returned error wraps
/// [`ConfigurationError`] and the caller must not start serving.
pub fn load(json_path: &Path, csv_path: &Path) -> Result<Vec<KbEntry>> {
    let mut entries = if json_path.exists() {
        load_json(json_path)?
    } else if csv_path.exists() {
        load_csv(csv_path)?
    } else {
        return Err(ConfigurationError {
            json_path: json_path.to_path_buf(),
            csv_path: csv_path.to_path_buf(),
        }
        .into());
    };

    entries.extend(builtin_faq());
    tracing::debug!(count = entries.len(), "knowledge base loaded");
    Ok(entries)
}

fn load_json(path: &Path) -> Result<Vec<KbEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read knowledge base: {}", path.display()))?;
    let raw: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse knowledge base: {}", path.display()))?;

    let entries = raw
        .iter()
        .map(|record| KbEntry {
            question: json_field(record, QUESTION_KEYS),
            answer: json_field(record, ANSWER_KEYS),
            price: json_field(record, PRICE_KEYS),
            prep_time: json_field(record, PREP_TIME_KEYS),
            diet: json_field(record, DIET_KEYS),
            age_tag: json_field(record, AGE_KEYS),
        })
        .collect();

    Ok(entries)
}

fn load_csv(path: &Path) -> Result<Vec<KbEntry>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to read knowledge base: {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
        .clone();

    let mut entries = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("Malformed CSV row in {}", path.display()))?;
        entries.push(KbEntry {
            question: csv_field(&headers, &row, QUESTION_KEYS),
            answer: csv_field(&headers, &row, ANSWER_KEYS),
            price: csv_field(&headers, &row, PRICE_KEYS),
            prep_time: csv_field(&headers, &row, PREP_TIME_KEYS),
            diet: csv_field(&headers, &row, DIET_KEYS),
            age_tag: csv_field(&headers, &row, AGE_KEYS),
        });
    }

    Ok(entries)
}

/// First non-empty value among the accepted keys. Bare numbers (a price of
/// `350`) render as their decimal string.
fn json_field(record: &Value, keys: &[&str]) -> String {
    for key in keys {
        match record.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    String::new()
}

fn csv_field(headers: &csv::StringRecord, row: &csv::StringRecord, keys: &[&str]) -> String {
    for key in keys {
        if let Some(pos) = headers.iter().position(|h| h == *key) {
            if let Some(value) = row.get(pos) {
                if !value.is_empty() {
                    return value.to_string();
                }
            }
        }
    }
    String::new()
}

/// Built-in FAQ entries, always appended after the external rows.
pub fn builtin_faq() -> Vec<KbEntry> {
    vec![
        KbEntry::faq(
            "What are your opening hours?",
            "⏰ We are open daily from 9 AM to 11 PM.",
        ),
        KbEntry::faq(
            "Do you offer delivery?",
            "🚚 We deliver within Nairobi. Delivery charges may apply.",
        ),
        KbEntry::faq(
            "Can I reserve a table?",
            "📞 You can reserve a table by calling us or asking here.",
        ),
        KbEntry::faq(
            "Do you have vegetarian options?",
            "Yes! We have several vegetarian dishes like Veggie Burger, Potato Wedges, and Mushroom Chips.",
        ),
        KbEntry::faq(
            "What is your contact number?",
            "📧 You can reach us at java@gmail.com or call +254 722 123 456.",
        ),
        KbEntry::faq(
            "Do you have Wi-Fi?",
            "Yes, our restaurant has free Wi-Fi for all customers.",
        ),
        KbEntry::faq(
            "Are pets allowed?",
            "Service animals only. No other pets are allowed inside.",
        ),
        KbEntry::faq("Payment methods?", "We accept cash, cards, and M-Pesa."),
        KbEntry::faq(
            "Do you have outdoor seating?",
            "Yes, we have a comfortable outdoor seating area.",
        ),
        KbEntry::faq(
            "Can I order for pickup?",
            "Yes, you can order ahead and pick up your order at the restaurant.",
        ),
    ]
}

/// Ordered question list of the live knowledge base.
pub fn questions(entries: &[KbEntry]) -> Vec<String> {
    entries.iter().map(|e| e.question.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_json_with_aliases() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("kb.json");
        fs::write(
            &json,
            r#"[
                {"Name / Question": "Veggie Burger", "Details / Answer": "A grilled veggie patty",
                 "Price_KES": 350, "Estimated_Prep_Time_mins": "10", "Tags_Dietary_Info": "Vegetarian"},
                {"Name": "Chips", "Details": "Crispy fries"}
            ]"#,
        )
        .unwrap();

        let entries = load(&json, &dir.path().join("missing.csv")).unwrap();
        assert_eq!(entries[0].question, "Veggie Burger");
        assert_eq!(entries[0].price, "350");
        assert_eq!(entries[0].prep_time, "10");
        assert_eq!(entries[0].diet, "Vegetarian");
        assert_eq!(entries[1].question, "Chips");
        assert_eq!(entries[1].answer, "Crispy fries");
        assert_eq!(entries[1].price, "");
    }

    #[test]
    fn csv_fallback_when_json_absent() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("kb.csv");
        fs::write(
            &csv_path,
            "Name / Question,Details / Answer,Price_KES\nPizza,Wood-fired pizza,700\n",
        )
        .unwrap();

        let entries = load(&dir.path().join("missing.json"), &csv_path).unwrap();
        assert_eq!(entries[0].question, "Pizza");
        assert_eq!(entries[0].price, "700");
    }

    #[test]
    fn missing_both_sources_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("a.json"), &dir.path().join("b.csv")).unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());
    }

    #[test]
    fn faq_appended_after_external_entries() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("kb.json");
        fs::write(&json, r#"[{"Name": "Burger", "Details": "Beef burger"}]"#).unwrap();

        let entries = load(&json, &dir.path().join("missing.csv")).unwrap();
        assert_eq!(entries.len(), 1 + builtin_faq().len());
        assert_eq!(entries[0].question, "Burger");
        assert_eq!(entries[1].question, "What are your opening hours?");
        assert_eq!(entries.last().unwrap().question, "Can I order for pickup?");
    }

    #[test]
    fn menu_item_detection() {
        let mut entry = KbEntry::faq("Tea", "Hot tea");
        assert!(!entry.is_menu_item());
        entry.prep_time = "5".to_string();
        assert!(entry.is_menu_item());
    }

    #[test]
    fn annotations_keep_fixed_order() {
        let entry = KbEntry {
            question: "Veggie Burger".into(),
            answer: "A grilled veggie patty".into(),
            price: "350".into(),
            prep_time: "10".into(),
            diet: "Vegetarian".into(),
            age_tag: String::new(),
        };
        assert_eq!(
            entry.annotations(),
            vec!["💰 350", "⏱ 10 mins", "🥗 Vegetarian"]
        );
    }
}
