//! Dictionary keys and name values used by the parsers.

#![allow(missing_docs)]

macro_rules! key {
    ($i:ident, $e:expr) => {
        pub const $i: &str = $e;
    };
}

key!(AHX, "AHx");
key!(ASCII_HEX_DECODE, "ASCIIHexDecode");
key!(BITS_PER_COMPONENT, "BitsPerComponent");
key!(CATALOG, "Catalog");
key!(CID_SYSTEM_INFO, "CIDSystemInfo");
key!(CMAP_NAME, "CMapName");
key!(CMAP_TYPE, "CMapType");
key!(CMAP_VERSION, "CMapVersion");
key!(COLORS, "Colors");
key!(COLUMNS, "Columns");
key!(DECODE_PARMS, "DecodeParms");
key!(ENCRYPT, "Encrypt");
key!(FILTER, "Filter");
key!(FIRST, "First");
key!(FL, "Fl");
key!(FLATE_DECODE, "FlateDecode");
key!(ID, "ID");
key!(INDEX, "Index");
key!(INFO, "Info");
key!(LENGTH, "Length");
key!(N, "N");
key!(OBJ_STM, "ObjStm");
key!(ORDERING, "Ordering");
key!(PREDICTOR, "Predictor");
key!(PREV, "Prev");
key!(REGISTRY, "Registry");
key!(ROOT, "Root");
key!(SIZE, "Size");
key!(SUPPLEMENT, "Supplement");
key!(TYPE, "Type");
key!(W, "W");
key!(WMODE, "WMode");
key!(XREF, "XRef");
key!(XREF_STM, "XRefStm");
