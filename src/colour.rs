//! Display colours attached to predictors, conditions and VOIs.
//!
//! Components are kept as plain integers: values read from a file or given by
//! the user are not range-checked. Only [`combine`] clamps its result.

use crate::error::{BvError, Result};
use rand::Rng;
use rgb::RGB;

/// A red, green and blue triple.
pub type Colour = RGB<i32>;

/// A colour with every component drawn uniformly from `0..=255`.
pub fn random() -> Colour {
    let mut rng = rand::thread_rng();
    RGB::new(
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
    )
}

/// Parse a colour from three whitespace separated integers.
pub fn parse(text: &str) -> Result<Colour> {
    let values = text
        .split_whitespace()
        .map(|t| t.parse::<i32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| BvError::InvalidColour(text.trim().to_string()))?;
    from_slice(&values).ok_or_else(|| BvError::InvalidColour(text.trim().to_string()))
}

/// Build a colour from the first three values of a sequence.
pub fn from_slice(values: &[i32]) -> Option<Colour> {
    match values {
        [r, g, b, ..] => Some(RGB::new(*r, *g, *b)),
        _ => None,
    }
}

/// Parse a run of colours, three integers each, all separated by whitespace.
pub fn parse_many(text: &str) -> Result<Vec<Colour>> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() % 3 != 0 {
        return Err(BvError::InvalidColour(text.trim().to_string()));
    }
    tokens.chunks(3).map(|c| parse(&c.join(" "))).collect()
}

/// Component-wise sum of two colours, saturating at 255.
pub fn combine(a: Colour, b: Colour) -> Colour {
    RGB::new(
        a.r.saturating_add(b.r).min(255),
        a.g.saturating_add(b.g).min(255),
        a.b.saturating_add(b.b).min(255),
    )
}

/// Render a colour as `r g b`.
pub fn render(c: &Colour) -> String {
    format!("{} {} {}", c.r, c.g, c.b)
}
