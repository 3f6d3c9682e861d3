//! Keyswitch router settings
//!
//! Covers the two router flags of the device's manager block; the MPE flag
//! sharing that block lives on [`crate::models::settings::Settings`].

use serde::{Deserialize, Serialize};

use crate::models::device::ManagerBlock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Router {
    pub track_must_be_armed: bool,
    pub router_exclusive: bool,
}

impl Default for Router {
    fn default() -> Self {
        Router {
            track_must_be_armed: true,
            router_exclusive: false,
        }
    }
}

impl Router {
    pub fn from_device(block: &ManagerBlock) -> Router {
        Router {
            track_must_be_armed: block.router_track != 0,
            router_exclusive: block.router_filter != 0,
        }
    }

    /// Projects the router fields; the caller fills in the MPE flag.
    pub fn to_device(&self, mpe_support: bool) -> ManagerBlock {
        ManagerBlock {
            router_track: self.track_must_be_armed as i64,
            router_filter: self.router_exclusive as i64,
            mpe_support_button: mpe_support as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_roundtrip() {
        let router = Router {
            track_must_be_armed: false,
            router_exclusive: true,
        };
        let block = router.to_device(true);
        assert_eq!(block.router_track, 0);
        assert_eq!(block.router_filter, 1);
        assert_eq!(block.mpe_support_button, 1);
        assert_eq!(Router::from_device(&block), router);
    }
}
