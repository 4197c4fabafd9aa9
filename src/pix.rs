//! PIX "copia e cola" payload encoding (BR Code / EMV-QR merchant-presented).
//!
//! Builds the static payment string a banking app resolves into a payment
//! request: a sequence of `ID(2) + LEN(2) + VALUE` fields closed by a
//! CRC-16/CCITT-FALSE checksum. The key is embedded as-is; BR Code generators
//! do not validate key ownership or format, and neither does this one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

const PAYLOAD_FORMAT_INDICATOR: &str = "01";
const GUI_BCB_PIX: &str = "BR.GOV.BCB.PIX";
const MERCHANT_CATEGORY_CODE: &str = "0000";
const CURRENCY_BRL: &str = "986";
const COUNTRY_BR: &str = "BR";
const DEFAULT_REFERENCE: &str = "***";

const MERCHANT_NAME_MAX: usize = 25;
const MERCHANT_CITY_MAX: usize = 15;

/// Recipient of a PIX charge: key plus the merchant name/city shown by the
/// payer's bank. Name and city are normalized and truncated at encode time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixIdentity {
    pub key: String,
    pub name: String,
    pub city: String,
}

impl PixIdentity {
    pub fn new(key: impl Into<String>, name: impl Into<String>, city: impl Into<String>) -> Self {
        Self { key: key.into(), name: name.into(), city: city.into() }
    }
}

/// A single static charge. Encoding is pure: the same charge always renders
/// the same string, so re-opening a payment modal never changes the code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PixCharge {
    pub identity: PixIdentity,
    pub amount: Decimal,
    pub reference_label: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PixError {
    #[error("PIX key must not be empty")]
    EmptyKey,

    #[error("charge amount must not be negative")]
    NegativeAmount,
}

impl PixCharge {
    pub fn new(identity: PixIdentity, amount: Decimal) -> Self {
        Self { identity, amount, reference_label: DEFAULT_REFERENCE.to_string() }
    }

    pub fn with_reference(mut self, label: impl Into<String>) -> Self {
        self.reference_label = label.into();
        self
    }

    /// Encodes the charge as a complete BR Code string, checksum included.
    pub fn encode(&self) -> Result<String, PixError> {
        if self.identity.key.is_empty() {
            return Err(PixError::EmptyKey);
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(PixError::NegativeAmount);
        }

        let account = field("00", GUI_BCB_PIX) + &field("01", &self.identity.key);
        let reference = field("05", &self.reference_label);
        let amount = format!("{:.2}", self.amount.round_dp(2));
        let name = sanitize(&self.identity.name, MERCHANT_NAME_MAX);
        let city = sanitize(&self.identity.city, MERCHANT_CITY_MAX);

        let mut payload = String::with_capacity(128);
        payload.push_str(&field("00", PAYLOAD_FORMAT_INDICATOR));
        payload.push_str(&field("26", &account));
        payload.push_str(&field("52", MERCHANT_CATEGORY_CODE));
        payload.push_str(&field("53", CURRENCY_BRL));
        payload.push_str(&field("54", &amount));
        payload.push_str(&field("58", COUNTRY_BR));
        payload.push_str(&field("59", &name));
        payload.push_str(&field("60", &city));
        payload.push_str(&field("62", &reference));
        // Checksum field header is part of the checksummed input.
        payload.push_str("6304");
        let crc = crc16_ccitt_false(&payload);
        payload.push_str(&format!("{crc:04X}"));
        Ok(payload)
    }
}

/// TLV helper: `id` + zero-padded value length + value.
fn field(id: &str, value: &str) -> String {
    format!("{id}{:02}{value}", value.len())
}

/// NFD-decomposes, drops combining marks (U+0300..=U+036F) and truncates.
fn sanitize(input: &str, max_chars: usize) -> String {
    input
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .take(max_chars)
        .collect()
}

/// CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, no final XOR.
pub fn crc16_ccitt_false(payload: &str) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for byte in payload.bytes() {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn charge() -> PixCharge {
        PixCharge::new(
            PixIdentity::new("+5563981221181", "Arte do Sabor", "Palmas"),
            dec!(12.50),
        )
    }

    /// Walks the TLV stream checking every declared length against the value
    /// that follows, and returns the decoded (id, value) pairs.
    fn decode_fields(payload: &str) -> Vec<(String, String)> {
        let mut fields = vec![];
        let mut rest = payload;
        while !rest.is_empty() {
            let id = &rest[..2];
            let len: usize = rest[2..4].parse().unwrap();
            let value = &rest[4..4 + len];
            fields.push((id.to_string(), value.to_string()));
            rest = &rest[4 + len..];
        }
        fields
    }

    #[test]
    fn encode_is_deterministic() {
        let c = charge();
        assert_eq!(c.encode().unwrap(), c.encode().unwrap());
    }

    #[test]
    fn checksum_validates() {
        let s = charge().encode().unwrap();
        let (body, declared) = s.split_at(s.len() - 4);
        assert_eq!(format!("{:04X}", crc16_ccitt_false(body)), declared);
    }

    #[test]
    fn field_lengths_match_values() {
        let s = charge().encode().unwrap();
        // decode_fields panics on any length that overruns the payload.
        let fields = decode_fields(&s);
        let ids: Vec<&str> = fields.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["00", "26", "52", "53", "54", "58", "59", "60", "62", "63"]);
    }

    #[test]
    fn end_to_end_example() {
        let s = charge().encode().unwrap();
        let fields = decode_fields(&s);
        let get = |id: &str| &fields.iter().find(|(i, _)| i == id).unwrap().1;
        assert_eq!(get("00"), "01");
        assert_eq!(get("52"), "0000");
        assert_eq!(get("53"), "986");
        assert_eq!(get("54"), "12.50");
        assert_eq!(get("58"), "BR");
        assert_eq!(get("59"), "Arte do Sabor");
        assert_eq!(get("60"), "Palmas");
        assert_eq!(get("26"), "0014BR.GOV.BCB.PIX0114+5563981221181");
        assert_eq!(get("62"), "0503***");
    }

    #[test]
    fn long_name_truncates_to_25() {
        let c = PixCharge::new(
            PixIdentity::new("key", "A".repeat(40), "Palmas"),
            dec!(1),
        );
        let s = c.encode().unwrap();
        let fields = decode_fields(&s);
        let name = &fields.iter().find(|(i, _)| i == "59").unwrap().1;
        assert_eq!(name.len(), 25);
        assert!(s.contains(&format!("5925{}", "A".repeat(25))));
    }

    #[test]
    fn diacritics_are_stripped() {
        let c = PixCharge::new(PixIdentity::new("key", "José", "Brasília"), dec!(1));
        let s = c.encode().unwrap();
        assert!(s.contains("5904Jose"));
        assert!(s.contains("6008Brasilia"));
    }

    #[test]
    fn amount_renders_two_decimals() {
        let c = PixCharge::new(PixIdentity::new("key", "N", "C"), dec!(7));
        assert!(c.encode().unwrap().contains("54047.00"));
    }

    #[test]
    fn custom_reference_label() {
        let s = charge().with_reference("PED123").encode().unwrap();
        assert!(s.contains("62100506PED123"));
    }

    #[test]
    fn rejects_empty_key_and_negative_amount() {
        let c = PixCharge::new(PixIdentity::new("", "N", "C"), dec!(1));
        assert_eq!(c.encode(), Err(PixError::EmptyKey));
        let c = PixCharge::new(PixIdentity::new("key", "N", "C"), dec!(-0.01));
        assert_eq!(c.encode(), Err(PixError::NegativeAmount));
    }
}
