//! Item catalogue: the immutable list of entries a gallery browses.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GalleryError;

/// One browsable entry. Owned by the host; the gallery never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub label: String,
    pub image_url: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub sold_count: Option<u64>,
}

impl GalleryItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            image_url: image_url.into(),
            price: None,
            sold_count: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_sold_count(mut self, sold: u64) -> Self {
        self.sold_count = Some(sold);
        self
    }

    /// Formatted price label, e.g. `$1,234.50`.
    pub fn price_label(&self) -> Option<String> {
        self.price.filter(|p| p.is_finite()).map(format_price)
    }

    /// Formatted sold-count label, e.g. `1,234 sold`.
    pub fn sold_label(&self) -> Option<String> {
        self.sold_count.map(|n| format!("{} sold", group_thousands(n)))
    }
}

/// Which collection the catalogue describes; decides the navigation route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    #[default]
    Product,
    Category,
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" | "products" => Ok(Self::Product),
            "category" | "categories" => Ok(Self::Category),
            other => Err(format!("unknown item kind '{other}'")),
        }
    }
}

/// Reads a catalogue file. `.json` files are parsed as JSON, anything else as YAML.
pub fn load_catalogue(path: impl AsRef<Path>) -> Result<Vec<GalleryItem>, GalleryError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| GalleryError::CatalogueIo {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(&text).map_err(|err| err.to_string())
    } else {
        serde_yaml::from_str(&text).map_err(|err| err.to_string())
    };
    parsed.map_err(|message| GalleryError::CatalogueParse {
        path: path.to_path_buf(),
        message,
    })
}

fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_is_grouped_with_two_decimals() {
        let item = GalleryItem::new("p1", "Lamp", "lamp.png").with_price(1234.5);
        assert_eq!(item.price_label().as_deref(), Some("$1,234.50"));
        let cheap = GalleryItem::new("p2", "Pin", "pin.png").with_price(0.99);
        assert_eq!(cheap.price_label().as_deref(), Some("$0.99"));
    }

    #[test]
    fn sold_count_is_grouped() {
        let item = GalleryItem::new("p1", "Lamp", "lamp.png").with_sold_count(1_234_567);
        assert_eq!(item.sold_label().as_deref(), Some("1,234,567 sold"));
        let few = GalleryItem::new("p2", "Pin", "pin.png").with_sold_count(12);
        assert_eq!(few.sold_label().as_deref(), Some("12 sold"));
    }

    #[test]
    fn missing_optional_fields_produce_no_labels() {
        let item = GalleryItem::new("c1", "Shoes", "shoes.png");
        assert!(item.price_label().is_none());
        assert!(item.sold_label().is_none());
    }

    #[test]
    fn kind_parses_singular_and_plural() {
        assert_eq!("Product".parse::<ItemKind>(), Ok(ItemKind::Product));
        assert_eq!("categories".parse::<ItemKind>(), Ok(ItemKind::Category));
        assert!("vouchers".parse::<ItemKind>().is_err());
    }
}
