//! Icom model definitions.
//!
//! Each rig is described by an [`IcomModel`] carrying its factory-default
//! CI-V address and serial speed. Models are factory functions (e.g.
//! [`ic_706mk2g()`]) returning a populated [`IcomModel`]:
//!
//! | Model      | CI-V   | Baud    |
//! |------------|--------|---------|
//! | IC-706MkIIG| `0x58` | 19200   |
//! | IC-718     | `0x5E` | 9600    |
//! | IC-7000    | `0x70` | 19200   |
//! | IC-7100    | `0x88` | 19200   |
//! | IC-7300    | `0x94` | 115200  |
//! | IC-7610    | `0x98` | 115200  |
//! | IC-9700    | `0xA2` | 115200  |
//! | IC-705     | `0xA4` | 115200  |

/// Static model definition for an Icom transceiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcomModel {
    /// Human-readable model name (e.g. "IC-7300").
    pub name: &'static str,
    /// Factory-default CI-V bus address. Users can change it in the rig's
    /// menu.
    pub default_civ_address: u8,
    /// Default serial baud rate.
    pub default_baud_rate: u32,
}

/// Icom IC-706MkIIG: HF/VHF/UHF mobile.
pub fn ic_706mk2g() -> IcomModel {
    IcomModel {
        name: "IC-706MkIIG",
        default_civ_address: 0x58,
        default_baud_rate: 19_200,
    }
}

/// Icom IC-718: HF.
pub fn ic_718() -> IcomModel {
    IcomModel {
        name: "IC-718",
        default_civ_address: 0x5E,
        default_baud_rate: 9_600,
    }
}

/// Icom IC-7000: HF/VHF/UHF mobile.
pub fn ic_7000() -> IcomModel {
    IcomModel {
        name: "IC-7000",
        default_civ_address: 0x70,
        default_baud_rate: 19_200,
    }
}

/// Icom IC-7100: HF/VHF/UHF with D-STAR.
pub fn ic_7100() -> IcomModel {
    IcomModel {
        name: "IC-7100",
        default_civ_address: 0x88,
        default_baud_rate: 19_200,
    }
}

/// Icom IC-7300: HF + 6m direct-sampling SDR.
pub fn ic_7300() -> IcomModel {
    IcomModel {
        name: "IC-7300",
        default_civ_address: 0x94,
        default_baud_rate: 115_200,
    }
}

/// Icom IC-7610: HF + 6m dual-receiver SDR.
pub fn ic_7610() -> IcomModel {
    IcomModel {
        name: "IC-7610",
        default_civ_address: 0x98,
        default_baud_rate: 115_200,
    }
}

/// Icom IC-9700: VHF/UHF/23cm.
pub fn ic_9700() -> IcomModel {
    IcomModel {
        name: "IC-9700",
        default_civ_address: 0xA2,
        default_baud_rate: 115_200,
    }
}

/// Icom IC-705: portable HF/VHF/UHF.
pub fn ic_705() -> IcomModel {
    IcomModel {
        name: "IC-705",
        default_civ_address: 0xA4,
        default_baud_rate: 115_200,
    }
}

/// All known models.
pub fn all_models() -> Vec<IcomModel> {
    vec![
        ic_706mk2g(),
        ic_718(),
        ic_7000(),
        ic_7100(),
        ic_7300(),
        ic_7610(),
        ic_9700(),
        ic_705(),
    ]
}

/// Look up a model by name, ignoring case (e.g. `"ic-7300"`).
pub fn find_model(name: &str) -> Option<IcomModel> {
    all_models()
        .into_iter()
        .find(|m| m.name.eq_ignore_ascii_case(name))
}
