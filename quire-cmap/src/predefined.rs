//! The predefined CMaps shipped with the crate.

#[cfg(feature = "embed-cmaps")]
static CMAPS: phf::Map<&'static str, &'static [u8]> = phf::phf_map! {
    "Identity-H" => include_bytes!("../resources/Identity-H"),
    "Identity-V" => include_bytes!("../resources/Identity-V"),
};

/// Load the data of a predefined CMap, by name.
#[cfg(feature = "embed-cmaps")]
pub(crate) fn load(name: &str) -> Option<&'static [u8]> {
    CMAPS.get(name).copied()
}

#[cfg(not(feature = "embed-cmaps"))]
pub(crate) fn load(_: &str) -> Option<&'static [u8]> {
    None
}
