// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Maps Home-Assistant entity states to the discrete event properties of a smart home API.

#![forbid(non_ascii_idents)]
#![deny(unsafe_code)]

pub mod configuration;
pub mod errors;
pub mod property;
pub mod state;

pub use property::{EventInstance, EventProperty, Property, PropertyType, get_properties};
pub use state::State;

/// Build information generated by `build.rs`.
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
    include!(concat!(env!("OUT_DIR"), "/git_built.rs"));
}

/// Version from `git describe`, or the package version with a `-non-git` suffix.
pub const APP_VERSION: &str = const_format::formatcp!(
    "{}{}",
    match built_info::GIT_VERSION {
        Some(v) => v,
        None => const_format::formatcp!("{}-non-git", built_info::PKG_VERSION),
    },
    if built_info::GIT_DIRTY.is_some() {
        "-dirty"
    } else {
        ""
    }
);
