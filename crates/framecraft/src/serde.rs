//! Serializable frame settings.
//!
//! These types mirror [crate::FrameConfig] so frame settings can be read from a
//! configuration file (for example JSON) and converted with `.into()`.

use serde::{Deserialize, Serialize};

/// Byte order of multi-byte values in a frame.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrderDef {
    /// Host byte order.
    #[default]
    Host,
    /// Big-endian network order.
    Network,
}

/// Settings for constructing a [crate::Frame].
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct FrameConfigDef {
    /// Defaults to host order when absent.
    #[serde(default)]
    pub byte_order: ByteOrderDef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{ByteOrder, FrameConfig};

    #[test]
    fn test_config_from_json() {
        let def: FrameConfigDef = serde_json::from_str(r#"{ "byte_order": "Network" }"#).unwrap();
        let config: FrameConfig = def.into();
        assert_eq!(config.byte_order, ByteOrder::Network);
    }

    #[test]
    fn test_byte_order_defaults_to_host() {
        let def: FrameConfigDef = serde_json::from_str("{}").unwrap();
        assert_eq!(FrameConfig::from(def), FrameConfig::default());
    }

    #[test]
    fn test_config_serializes() {
        let def = FrameConfigDef {
            byte_order: ByteOrderDef::Network,
        };
        assert_eq!(
            serde_json::to_string(&def).unwrap(),
            r#"{"byte_order":"Network"}"#
        );
    }
}
