//! Checkout choices collected across the checkout scenes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Pickup,
    Delivery,
}

/// Payment methods offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Payme,
    Click,
}

/// When the order should be ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderTime {
    Asap,
    At { hour: u8, minute: u8 },
}

impl fmt::Display for OrderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderTime::Asap => f.write_str("asap"),
            OrderTime::At { hour, minute } => write!(f, "{:02}:{:02}", hour, minute),
        }
    }
}

impl FromStr for OrderTime {
    type Err = ValidationError;

    /// Parses `HH:MM` (24h) or `asap`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("asap") {
            return Ok(OrderTime::Asap);
        }

        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| ValidationError::invalid_format("order_time", "expected HH:MM"))?;
        let hour: u8 = hour
            .trim()
            .parse()
            .map_err(|_| ValidationError::invalid_format("order_time", "hour is not a number"))?;
        let minute: u8 = minute
            .trim()
            .parse()
            .map_err(|_| ValidationError::invalid_format("order_time", "minute is not a number"))?;

        if hour > 23 {
            return Err(ValidationError::out_of_range("order_time.hour", 0, 23, i64::from(hour)));
        }
        if minute > 59 {
            return Err(ValidationError::out_of_range(
                "order_time.minute",
                0,
                59,
                i64::from(minute),
            ));
        }
        Ok(OrderTime::At { hour, minute })
    }
}

/// A point shared by the user's client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where a delivery order goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryAddress {
    Text { address: String },
    Location { point: GeoPoint },
}

/// Choices made so far in checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CheckoutDraft {
    #[serde(default)]
    pub address: Option<DeliveryAddress>,
    #[serde(default)]
    pub order_time: Option<OrderTime>,
    #[serde(default)]
    pub payment: Option<PaymentMethod>,
    #[serde(default)]
    pub cutlery: Option<bool>,
}

impl CheckoutDraft {
    /// True once time, payment and cutlery have been chosen.
    pub fn is_complete(&self) -> bool {
        self.order_time.is_some() && self.payment.is_some() && self.cutlery.is_some()
    }
}

/// Normalizes a phone number: keeps digits and an optional leading `+`.
///
/// # Errors
///
/// - `InvalidFormat` if anything other than digits, spaces, dashes or
///   parentheses is present, or the digit count is outside 9..=15
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("phone"));
    }

    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' => {}
            other => {
                return Err(ValidationError::invalid_format(
                    "phone",
                    format!("unexpected character '{}'", other),
                ))
            }
        }
    }

    if !(9..=15).contains(&digits.len()) {
        return Err(ValidationError::out_of_range(
            "phone.digits",
            9,
            15,
            digits.len() as i64,
        ));
    }

    Ok(if plus { format!("+{}", digits) } else { digits })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod order_time {
        use super::*;

        #[test]
        fn parses_twenty_four_hour_time() {
            assert_eq!(
                "19:30".parse::<OrderTime>().unwrap(),
                OrderTime::At { hour: 19, minute: 30 }
            );
        }

        #[test]
        fn parses_asap() {
            assert_eq!("ASAP".parse::<OrderTime>().unwrap(), OrderTime::Asap);
        }

        #[test]
        fn rejects_out_of_range_values() {
            assert!("24:00".parse::<OrderTime>().is_err());
            assert!("12:60".parse::<OrderTime>().is_err());
            assert!("noon".parse::<OrderTime>().is_err());
        }

        #[test]
        fn displays_zero_padded() {
            assert_eq!(OrderTime::At { hour: 9, minute: 5 }.to_string(), "09:05");
        }
    }

    mod phone {
        use super::*;

        #[test]
        fn strips_separators_and_keeps_plus() {
            assert_eq!(normalize_phone("+998 (90) 123-45-67").unwrap(), "+998901234567");
        }

        #[test]
        fn accepts_local_numbers_without_plus() {
            assert_eq!(normalize_phone("901234567").unwrap(), "901234567");
        }

        #[test]
        fn rejects_letters() {
            assert!(matches!(
                normalize_phone("call me"),
                Err(ValidationError::InvalidFormat { .. })
            ));
        }

        #[test]
        fn rejects_too_short_numbers() {
            assert!(normalize_phone("12345").is_err());
        }

        #[test]
        fn rejects_empty_input() {
            assert!(matches!(
                normalize_phone("   "),
                Err(ValidationError::EmptyField { .. })
            ));
        }
    }

    #[test]
    fn draft_is_complete_once_all_choices_made() {
        let mut draft = CheckoutDraft::default();
        assert!(!draft.is_complete());

        draft.order_time = Some(OrderTime::Asap);
        draft.payment = Some(PaymentMethod::Cash);
        assert!(!draft.is_complete());

        draft.cutlery = Some(false);
        assert!(draft.is_complete());
    }
}
