//! Pricing and ticketing block.

use serde_json::Value;

use crate::models::Offer;
use crate::utils::json;

/// Build an `Offer` from an event's `cost` and `reservation` blocks.
///
/// Price comes from an explicit `from`/`to` range (lower bound first), else
/// the flat `ga` (general admission) price. The booking URL is attached
/// independently, so an offer may carry only a URL. Returns `None` when
/// there is neither.
pub fn build_offer(evt: &Value) -> Option<Offer> {
    let price = json::object(evt, "cost").and_then(resolve_price);
    let url = json::object(evt, "reservation").and_then(|r| json::text(r, "website"));

    if price.is_none() && url.is_none() {
        return None;
    }

    Some(Offer {
        kind: "Offer".to_string(),
        price_currency: price.as_ref().map(|_| Offer::CURRENCY.to_string()),
        price,
        url,
    })
}

fn resolve_price(cost: &Value) -> Option<Value> {
    if cost.get("from").is_some() || cost.get("to").is_some() {
        price_value(cost.get("from")).or_else(|| price_value(cost.get("to")))
    } else {
        price_value(cost.get("ga"))
    }
}

fn price_value(value: Option<&Value>) -> Option<Value> {
    match value? {
        v @ Value::Number(_) => Some(v.clone()),
        Value::String(s) if !s.trim().is_empty() => Some(Value::String(s.trim().to_string())),
        _ => None,
    }
}
