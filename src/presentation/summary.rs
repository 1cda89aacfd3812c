//! Deal and price summary strings for hover previews.
//!
//! Summaries are deterministic functions of the transaction-type flags and
//! price fields. A set flag with a missing price renders the explicit
//! [`UNPRICED`] marker rather than being omitted, so the hover box never
//! shows an empty price line for an offered deal type.

use crate::domain::Node;
use crate::listing::Pin;
use crate::utils::formatting::format_price_compact;

/// Marker shown for an offered deal type whose price is not set yet.
pub const UNPRICED: &str = "—";

/// Separator between deal-type parts of a summary line.
const PART_SEPARATOR: &str = " · ";

/// Builds the one-line deal summary for a single pin.
///
/// One part per set transaction flag, in sale → jeonse → rent order:
/// `"매매 3억 2,000 · 전세 —"`. Returns a placeholder when no flag is set.
pub fn deal_summary(pin: &Pin) -> String {
    let mut parts = Vec::new();

    if pin.is_sale {
        parts.push(format!("매매 {}", price_or_unpriced(pin.sale_price)));
    }
    if pin.is_jeonse {
        parts.push(format!("전세 {}", price_or_unpriced(pin.jeonse_deposit)));
    }
    if pin.is_rent {
        parts.push(format!(
            "월세 {}/{}",
            price_or_unpriced(pin.rent_deposit),
            price_or_unpriced(pin.rent_monthly)
        ));
    }

    if parts.is_empty() {
        "매물 정보 없음".to_string()
    } else {
        parts.join(PART_SEPARATOR)
    }
}

/// Builds the aggregated summary for a same-coordinate stack.
///
/// Shows the unit count and the primary-price range across members:
/// `"3세대 · 2억 ~ 3억 5,000"`. Falls back to the count alone when no member
/// carries a price.
pub fn stack_summary(items: &[Pin]) -> String {
    let prices: Vec<u64> = items.iter().filter_map(primary_price).collect();
    let count = format!("{}세대", items.len());

    match (prices.iter().min(), prices.iter().max()) {
        (Some(&min), Some(&max)) if min != max => format!(
            "{}{}{} ~ {}",
            count,
            PART_SEPARATOR,
            format_price_compact(min),
            format_price_compact(max)
        ),
        (Some(&min), Some(_)) => {
            format!("{}{}{}", count, PART_SEPARATOR, format_price_compact(min))
        }
        _ => count,
    }
}

/// Returns the hover-box title for a node.
pub fn hover_title(node: &Node) -> String {
    match node {
        Node::Single { pin, .. } => pin.display_name().to_string(),
        Node::Stack { items, title, .. } => title
            .clone()
            .unwrap_or_else(|| items[0].display_name().to_string()),
        // Cluster previews lead with the first member.
        Node::Cluster { items, .. } => items[0].display_name().to_string(),
    }
}

/// Returns the hover-box summary line for a node.
///
/// Singles and clusters summarize one pin (a cluster previews its first
/// member); stacks aggregate across all members. Keywords of the previewed
/// pin ride along after the prices.
pub fn hover_summary(node: &Node) -> String {
    match node {
        Node::Single { pin, .. } => pin_preview_line(pin),
        Node::Stack { items, .. } => stack_summary(items),
        Node::Cluster { items, .. } => pin_preview_line(&items[0]),
    }
}

/// One pin's preview line: deal summary plus its keywords, if any.
fn pin_preview_line(pin: &Pin) -> String {
    let mut line = deal_summary(pin);
    if !pin.keywords.is_empty() {
        line.push_str(PART_SEPARATOR);
        line.push_str(&pin.keywords.join(", "));
    }
    line
}

/// Returns the first set deal type's price, in sale → jeonse → rent order.
fn primary_price(pin: &Pin) -> Option<u64> {
    if pin.is_sale {
        pin.sale_price
    } else if pin.is_jeonse {
        pin.jeonse_deposit
    } else if pin.is_rent {
        pin.rent_deposit
    } else {
        None
    }
}

fn price_or_unpriced(price: Option<u64>) -> String {
    price.map(format_price_compact).unwrap_or_else(|| UNPRICED.to_string())
}
