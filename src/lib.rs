//! OData protocol bridge between V4 callers and V2-only services
//!
//! This crate converts in both directions:
//! - Outbound, V4 system query options become the flat V2 parameter list,
//!   with `$filter` literals rewritten per property type
//! - Inbound, `d`-enveloped V2 response bodies become V4-shaped JSON with
//!   the legacy primitive encodings decoded
//!
//! Conversion is driven by an EDM schema loaded from YAML and exposed
//! through the [`edm_catalog::MetadataLookup`] capability. The
//! [`requestor::ProtocolAdapter`] trait packages everything a generic
//! HTTP layer needs: header sets, the readiness gate, and the conversion
//! entry points.

pub mod edm_catalog;
pub mod edm_codec;
pub mod filter_parser;
pub mod query_translator;
pub mod requestor;
pub mod response_converter;
