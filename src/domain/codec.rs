//! Node payload codec
//!
//! The config characteristic carries UTF-8 JSON, the command characteristic
//! carries plain ASCII command text.

use crate::domain::models::{ConfigForm, ConfigPayload, DeviceConfig};
use thiserror::Error;

/// Command that makes the node stop its BLE service
pub const CLOSE_AP_COMMAND: &[u8] = b"CLOSE_AP";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} is not a number")]
    NotANumber { field: &'static str },
}

/// Decode a configuration read from the config characteristic
pub fn decode_config(bytes: &[u8]) -> Result<DeviceConfig, CodecError> {
    let text = String::from_utf8_lossy(bytes);
    Ok(serde_json::from_str(&text)?)
}

/// Coerce the form into the outgoing payload.
///
/// With `strict` unset, non-numeric integer fields become the
/// not-a-number sentinel and are sent as-is.
pub fn payload_from_form(form: &ConfigForm, strict: bool) -> Result<ConfigPayload, CodecError> {
    let payload = ConfigPayload {
        node_id: parse_leading_int(&form.node_id),
        network_id: form.network_id.clone(),
        interval: parse_leading_int(&form.interval),
        default_dest: parse_leading_int(&form.default_dest),
    };

    if strict {
        for (field, value) in [
            ("nodeId", payload.node_id),
            ("interval", payload.interval),
            ("defaultDest", payload.default_dest),
        ] {
            if value.is_none() {
                return Err(CodecError::NotANumber { field });
            }
        }
    }

    Ok(payload)
}

/// Serialize an outgoing payload to the bytes written on the wire
pub fn encode_payload(payload: &ConfigPayload) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(payload)?)
}

/// Lenient leading-integer parse.
///
/// Skips leading whitespace, accepts an optional sign and an optional
/// `0x`/`0X` prefix, then consumes the longest run of digits. Anything after
/// the digits is ignored. No digits (or overflow) yields `None`.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let mut rest = input.trim_start();

    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let mut radix = 10;
    if rest.starts_with("0x") || rest.starts_with("0X") {
        radix = 16;
        rest = &rest[2..];
    }

    let digits_len = rest
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());

    if digits_len == 0 {
        return None;
    }

    let magnitude = i64::from_str_radix(&rest[..digits_len], radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(node_id: &str, network_id: &str, interval: &str, default_dest: &str) -> ConfigForm {
        ConfigForm {
            node_id: node_id.to_string(),
            network_id: network_id.to_string(),
            interval: interval.to_string(),
            default_dest: default_dest.to_string(),
        }
    }

    #[test]
    fn test_decode_sample_payload() {
        let config =
            decode_config(br#"{"nodeId":5,"networkId":"net-A","interval":60,"defaultDest":1}"#)
                .unwrap();
        assert_eq!(config.node_id, 5);
        assert_eq!(config.network_id, "net-A");
        assert_eq!(config.interval, 60);
        assert_eq!(config.default_dest, 1);
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        assert!(decode_config(b"not json").is_err());
        assert!(decode_config(br#"{"nodeId":5,"networkId":"a","interval":60}"#).is_err());
        assert!(decode_config(br#"{"nodeId":"5","networkId":"a","interval":60,"defaultDest":1}"#).is_err());
        assert!(decode_config(b"").is_err());
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let config = decode_config(
            br#"{"nodeId":1,"networkId":"n","interval":2,"defaultDest":3,"fw":"1.2"}"#,
        )
        .unwrap();
        assert_eq!(config.default_dest, 3);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  -7"), Some(-7));
        assert_eq!(parse_leading_int("+3"), Some(3));
        assert_eq!(parse_leading_int("12abc"), Some(12));
        assert_eq!(parse_leading_int("1.9"), Some(1));
        assert_eq!(parse_leading_int("1e3"), Some(1));
        assert_eq!(parse_leading_int("0x1A"), Some(26));
        assert_eq!(parse_leading_int("0x"), None);
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("0xZZ"), None);
    }

    #[test]
    fn test_well_formed_form_serializes_integers() {
        let payload = payload_from_form(&form("5", " net-A ", "60", "1"), false).unwrap();
        let bytes = encode_payload(&payload).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["nodeId"], 5);
        assert_eq!(value["networkId"], " net-A ");
        assert_eq!(value["interval"], 60);
        assert_eq!(value["defaultDest"], 1);
    }

    #[test]
    fn test_non_numeric_field_is_sent_as_sentinel() {
        let payload = payload_from_form(&form("node", "net", "60", "1"), false).unwrap();
        assert_eq!(payload.node_id, None);
        let bytes = encode_payload(&payload).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["nodeId"].is_null());
        assert_eq!(value["interval"], 60);
    }

    #[test]
    fn test_strict_mode_rejects_sentinel() {
        let err = payload_from_form(&form("5", "net", "soon", "1"), true).unwrap_err();
        assert!(matches!(err, CodecError::NotANumber { field: "interval" }));
        assert!(payload_from_form(&form("5", "net", "60", "1"), true).is_ok());
    }

    #[test]
    fn test_save_then_read_round_trip() {
        let written = payload_from_form(&form("17", "mesh-9", "300", "4"), false).unwrap();
        let echoed = decode_config(&encode_payload(&written).unwrap()).unwrap();
        assert_eq!(
            echoed,
            DeviceConfig {
                node_id: 17,
                network_id: "mesh-9".to_string(),
                interval: 300,
                default_dest: 4,
            }
        );
    }

    #[test]
    fn test_close_command_bytes() {
        assert_eq!(CLOSE_AP_COMMAND, "CLOSE_AP".as_bytes());
    }
}
