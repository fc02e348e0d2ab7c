//! Value codec
//!
//! Bridges the wire representation (`serde_json::Value`, objects in insertion
//! order) and [`NativeValue`], the dynamic value the host side works with.
//!
//! ```rust
//! use toolscope_core::codec::{decode, encode, parse_object_text, NativeValue};
//!
//! let args = parse_object_text(r#"{"path": "/tmp", "depth": 2}"#).unwrap();
//! let wire = toolscope_core::codec::encode_map(&args);
//! assert_eq!(wire.to_string(), r#"{"path":"/tmp","depth":2}"#);
//! let native = NativeValue::Map(args);
//! assert_eq!(decode(&encode(&native)), native);
//! ```

mod json;
mod value;

pub use json::{
    decode, encode, encode_map, json_kind, parse_arguments_text, parse_object_text, parse_text,
    render_error_value, CodecError, CodecResult,
};
pub use value::{NativeMap, NativeValue};
