//! nvzone - host-side NVRAM zone builder
//!
//! Loads property files into a tuple store and serializes it into a
//! fixed-size, checksum-protected zone image.
//!
//! - `validator`: property name grammar
//! - `tuple`: bounded name/value store
//! - `loader`: property file parser with imports and filters
//! - `zone`: header, commit and read-back of zone images
//! - `observability`: JSON-line event logging
//! - `cli`: the `gen_nvram_zone` tool

pub mod cli;
pub mod loader;
pub mod observability;
pub mod tuple;
pub mod validator;
pub mod zone;
